//! Address controller. Routes hang off `/patients/:id`.

use crate::{
    extractors::ValidatedJson,
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use carebook_core::{Address, ErrorResponse};
use carebook_service::UpsertAddressRequest;
use tracing::debug;

/// Creates the address router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/:id/addresses",
            get(list_addresses).put(upsert_new_address),
        )
        .route(
            "/:id/addresses/:address_id",
            get(get_address).put(upsert_address),
        )
}

/// List every address of a patient.
#[utoipa::path(
    get,
    path = "/patients/{id}/addresses",
    tag = "addresses",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Addresses of the patient", body = Vec<Address>),
        (status = 400, description = "Malformed ID", body = ErrorResponse)
    )
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> ApiResult<Vec<Address>> {
    let addresses = state.address_service.get_by_patient_id(&patient_id).await?;
    ok(addresses)
}

/// Get one address of a patient.
#[utoipa::path(
    get,
    path = "/patients/{id}/addresses/{address_id}",
    tag = "addresses",
    params(
        ("id" = String, Path, description = "Patient ID"),
        ("address_id" = String, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Address found", body = Address),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Address not found", body = ErrorResponse)
    )
)]
pub async fn get_address(
    State(state): State<AppState>,
    Path((patient_id, address_id)): Path<(String, String)>,
) -> ApiResult<Address> {
    let address = state
        .address_service
        .get_by_id(&patient_id, &address_id)
        .await?;
    ok(address)
}

/// Add an address with a generated ID.
#[utoipa::path(
    put,
    path = "/patients/{id}/addresses",
    tag = "addresses",
    params(("id" = String, Path, description = "Patient ID")),
    request_body = UpsertAddressRequest,
    responses(
        (status = 200, description = "Address stored", body = Address),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn upsert_new_address(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpsertAddressRequest>,
) -> ApiResult<Address> {
    debug!("Upsert address request for patient: {}", patient_id);

    let address = state
        .address_service
        .upsert(&patient_id, None, request)
        .await?;
    ok(address)
}

/// Insert or replace the address with the given ID.
#[utoipa::path(
    put,
    path = "/patients/{id}/addresses/{address_id}",
    tag = "addresses",
    params(
        ("id" = String, Path, description = "Patient ID"),
        ("address_id" = String, Path, description = "Address ID")
    ),
    request_body = UpsertAddressRequest,
    responses(
        (status = 200, description = "Address stored", body = Address),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Address ID owned by another patient", body = ErrorResponse)
    )
)]
pub async fn upsert_address(
    State(state): State<AppState>,
    Path((patient_id, address_id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<UpsertAddressRequest>,
) -> ApiResult<Address> {
    debug!("Upsert address {} for patient {}", address_id, patient_id);

    let address = state
        .address_service
        .upsert(&patient_id, Some(&address_id), request)
        .await?;
    ok(address)
}
