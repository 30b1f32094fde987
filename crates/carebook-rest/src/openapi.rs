//! OpenAPI documentation configuration.

use crate::controllers::{ComponentHealth, HealthResponse, ReadinessResponse};
use carebook_core::{Address, AddressId, ErrorResponse, FieldError, Patient, PatientId};
use carebook_service::{
    CreatePatientRequest, PatientCountResponse, PatientListResponse, UpdatePatientRequest,
    UpsertAddressRequest,
};
use utoipa::OpenApi;

/// OpenAPI documentation for the Carebook API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carebook API",
        version = "1.0.0",
        description = "Patient and address records",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Patient endpoints
        crate::controllers::patient_controller::list_patients,
        crate::controllers::patient_controller::count_patients,
        crate::controllers::patient_controller::create_patient,
        crate::controllers::patient_controller::get_patient,
        crate::controllers::patient_controller::update_patient,
        // Address endpoints
        crate::controllers::address_controller::list_addresses,
        crate::controllers::address_controller::get_address,
        crate::controllers::address_controller::upsert_new_address,
        crate::controllers::address_controller::upsert_address,
        // Health endpoints
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            PatientId,
            AddressId,
            Patient,
            Address,
            ErrorResponse,
            FieldError,
            CreatePatientRequest,
            UpdatePatientRequest,
            PatientListResponse,
            PatientCountResponse,
            UpsertAddressRequest,
            HealthResponse,
            ReadinessResponse,
            ComponentHealth,
        )
    ),
    tags(
        (name = "patients", description = "Patient records"),
        (name = "addresses", description = "Patient addresses"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;
