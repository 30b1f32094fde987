//! Address-related DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to insert or replace an address.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertAddressRequest {
    #[validate(length(min = 1, max = 200, message = "Line 1 must be 1-200 characters"))]
    pub line1: String,

    #[validate(length(max = 200, message = "Line 2 cannot exceed 200 characters"))]
    pub line2: Option<String>,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: String,

    /// Two-letter state code.
    #[validate(length(equal = 2, message = "State must be a 2-letter code"))]
    pub state: String,

    /// Five-digit zip code.
    #[validate(length(equal = 5, message = "Zip must be 5 digits"))]
    pub zip: String,
}
