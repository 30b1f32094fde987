//! Address entity.

use crate::{
    has_control_chars, now_millis, rules, validate_length, AddressId, CarebookError,
    CarebookResult, PatientId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on an address line, in characters.
pub const ADDRESS_LINE_MAX_LEN: usize = 200;

/// Upper bound on a city name, in characters.
pub const CITY_MAX_LEN: usize = 100;

/// A postal address belonging to exactly one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Address {
    pub id: AddressId,
    /// Owning patient. Always stamped by the repository.
    pub patient_id: PatientId,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Five-digit zip code.
    pub zip: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-controlled part of an address, as handed to an upsert.
///
/// An absent `id` asks the repository to generate one. There is no owner
/// field: the owning patient comes from the upsert call itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDraft {
    pub id: Option<AddressId>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Server time of the write. Becomes `created_at` on insert.
    pub stamped_at: DateTime<Utc>,
}

impl AddressDraft {
    /// Creates a draft stamped with the current time.
    #[must_use]
    pub fn new(
        id: Option<AddressId>,
        line1: impl Into<String>,
        line2: Option<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            id,
            line1: line1.into().trim().to_string(),
            line2: line2
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty()),
            city: city.into().trim().to_string(),
            state: state.into().trim().to_string(),
            zip: zip.into().trim().to_string(),
            stamped_at: now_millis(),
        }
    }

    /// Checks the address invariants.
    pub fn validate(&self) -> CarebookResult<()> {
        validate_length("line1", &self.line1, 1, ADDRESS_LINE_MAX_LEN)?;
        if let Some(line2) = &self.line2 {
            validate_length("line2", line2, 1, ADDRESS_LINE_MAX_LEN)?;
        }
        validate_length("city", &self.city, 1, CITY_MAX_LEN)?;
        rules::state_code(&self.state).map_err(|_| CarebookError::validation("state: state_code"))?;
        rules::zip_code(&self.zip).map_err(|_| CarebookError::validation("zip: zip_code"))?;

        let free_text = [Some(&self.line1), self.line2.as_ref(), Some(&self.city)];
        if free_text.into_iter().flatten().any(|s| has_control_chars(s)) {
            return Err(CarebookError::validation("address: control characters"));
        }
        Ok(())
    }

    /// Resolves the draft into an address owned by `patient_id`.
    ///
    /// `id` is the final identifier; `created_at` is kept from the stored
    /// record on update, or taken from the draft stamp on insert.
    #[must_use]
    pub fn into_address(
        self,
        id: AddressId,
        patient_id: PatientId,
        created_at: Option<DateTime<Utc>>,
    ) -> Address {
        Address {
            id,
            patient_id,
            line1: self.line1,
            line2: self.line2,
            city: self.city,
            state: self.state,
            zip: self.zip,
            created_at: created_at.unwrap_or(self.stamped_at),
            updated_at: self.stamped_at,
        }
    }
}
