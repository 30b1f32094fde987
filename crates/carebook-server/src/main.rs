//! # Carebook Server
//!
//! Main entry point: loads configuration, wires the configured backends,
//! and serves the REST API until SIGINT or SIGTERM.

use axum::routing::get;
use carebook_config::{AppConfig, ConfigLoader, ObservabilityConfig};
use carebook_core::{CarebookError, CarebookResult};
use carebook_rest::create_router;
use carebook_server::{di, telemetry};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get().await,
        Err(e) => {
            telemetry::init_logging(&ObservabilityConfig::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    telemetry::init_logging(&config.observability);

    info!("Starting Carebook Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> CarebookResult<()> {
    let metrics = if config.observability.metrics_enabled {
        Some(telemetry::install_metrics()?)
    } else {
        None
    };

    let wiring = di::build_module(&config).await?;

    let mut router = create_router(
        wiring.module.as_ref(),
        wiring.health_checks.clone(),
        &config.server,
    );
    if let Some(handle) = metrics {
        info!("Serving metrics at {}", config.observability.metrics_path);
        router = router.route(
            &config.observability.metrics_path,
            get(move || std::future::ready(handle.render())),
        );
    }

    let addr = config.server.addr();
    info!("Starting REST server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CarebookError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CarebookError::Internal(format!("REST server error: {}", e)));

    wiring.shutdown().await;
    served?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
