//! Patient controller.

use crate::{
    extractors::{PatientCountQuery, PatientListQuery, ValidatedJson},
    responses::{created, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use carebook_core::{ErrorResponse, Patient, PatientFilter, PatientQuery};
use carebook_service::{
    CreatePatientRequest, PatientCountResponse, PatientListResponse, UpdatePatientRequest,
};
use tracing::debug;

/// Creates the patient router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route("/count", get(count_patients))
        .route("/:id", get(get_patient).put(update_patient))
}

/// List patients, one page at a time.
#[utoipa::path(
    get,
    path = "/patients",
    tag = "patients",
    params(PatientListQuery),
    responses(
        (status = 200, description = "One page of patients", body = PatientListResponse),
        (status = 400, description = "Invalid limit or name filter", body = ErrorResponse)
    )
)]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<PatientListQuery>,
) -> ApiResult<PatientListResponse> {
    debug!("List patients request");

    let query = PatientQuery::from(params);
    let items = state.patient_service.list(&query).await?;
    let total = state.patient_service.count(&query.filter).await?;
    ok(PatientListResponse::new(items, total, &query))
}

/// Count patients matching an optional name filter.
#[utoipa::path(
    get,
    path = "/patients/count",
    tag = "patients",
    params(PatientCountQuery),
    responses(
        (status = 200, description = "Number of matching patients", body = PatientCountResponse),
        (status = 400, description = "Invalid name filter", body = ErrorResponse)
    )
)]
pub async fn count_patients(
    State(state): State<AppState>,
    Query(params): Query<PatientCountQuery>,
) -> ApiResult<PatientCountResponse> {
    let count = state
        .patient_service
        .count(&PatientFilter::from(params))
        .await?;
    ok(PatientCountResponse { count })
}

/// Create a patient.
#[utoipa::path(
    post,
    path = "/patients",
    tag = "patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Duplicate id or phone", body = ErrorResponse)
    )
)]
pub async fn create_patient(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), AppError> {
    debug!("Create patient request");

    let patient = state.patient_service.create(request).await?;
    Ok(created(patient))
}

/// Get a patient by ID.
#[utoipa::path(
    get,
    path = "/patients/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient found", body = Patient),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Patient> {
    let patient = state.patient_service.get_by_id(&id).await?;
    ok(patient)
}

/// Update a patient.
#[utoipa::path(
    put,
    path = "/patients/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "Patient ID")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 409, description = "Phone already registered", body = ErrorResponse)
    )
)]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePatientRequest>,
) -> ApiResult<Patient> {
    debug!("Update patient request: {}", id);

    let patient = state.patient_service.update(&id, request).await?;
    ok(patient)
}
