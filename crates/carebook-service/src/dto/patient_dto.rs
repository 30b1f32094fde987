//! Patient-related DTOs.

use carebook_core::{Patient, PatientQuery};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a patient.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePatientRequest {
    /// Caller-assigned identifier. Generated when absent.
    #[validate(length(min = 1, max = 64, message = "Patient id must be 1-64 characters"))]
    pub id: Option<String>,

    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    pub date_of_birth: NaiveDate,

    /// Any common formatting; stored as 10-15 digits.
    #[validate(length(min = 10, max = 32, message = "Phone must be 10-32 characters"))]
    pub phone: String,

    #[validate(length(min = 1, max = 64, message = "State must be 1-64 characters"))]
    pub state: String,
}

/// Request to update a patient's mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePatientRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    pub date_of_birth: NaiveDate,

    #[validate(length(min = 10, max = 32, message = "Phone must be 10-32 characters"))]
    pub phone: String,

    #[validate(length(min = 1, max = 64, message = "State must be 1-64 characters"))]
    pub state: String,

    /// Who is making the edit.
    #[validate(length(min = 1, max = 100, message = "Editor must be 1-100 characters"))]
    pub edited_by: Option<String>,
}

/// One page of patients plus the filtered total.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientListResponse {
    pub items: Vec<Patient>,
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
}

impl PatientListResponse {
    /// Wraps a page fetched for `query`.
    #[must_use]
    pub fn new(items: Vec<Patient>, total: u64, query: &PatientQuery) -> Self {
        Self {
            items,
            total,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// Patient count response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientCountResponse {
    pub count: u64,
}
