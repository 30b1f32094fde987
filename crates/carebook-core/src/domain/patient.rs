//! Patient entity.

use crate::{
    has_control_chars, normalize_phone, now_millis, validate_length, CarebookError,
    CarebookResult, PatientId,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Bounds on a patient's name, in characters.
pub const PATIENT_NAME_MIN_LEN: usize = 2;
pub const PATIENT_NAME_MAX_LEN: usize = 100;

/// Upper bound on the free-text state/region field.
pub const PATIENT_STATE_MAX_LEN: usize = 64;

/// A patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Patient {
    /// Unique, immutable identifier.
    pub id: PatientId,

    /// Display name.
    pub name: String,

    /// Date of birth.
    pub date_of_birth: NaiveDate,

    /// Phone number, normalized to digits only. Unique across patients.
    pub phone: String,

    /// State or region.
    pub state: String,

    /// Creation timestamp, stamped by the server.
    pub created_at: DateTime<Utc>,

    /// Who made the last edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,

    /// When the last edit happened, stamped by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

impl Patient {
    /// Creates a new patient stamped with the current time.
    ///
    /// The phone is normalized to its digits; the result is validated.
    pub fn new(
        id: PatientId,
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        phone: &str,
        state: impl Into<String>,
    ) -> CarebookResult<Self> {
        let patient = Self {
            id,
            name: name.into().trim().to_string(),
            date_of_birth,
            phone: normalize_phone(phone)?,
            state: state.into().trim().to_string(),
            created_at: now_millis(),
            edited_by: None,
            edited_at: None,
        };
        patient.validate()?;
        Ok(patient)
    }

    /// Checks the entity invariants.
    pub fn validate(&self) -> CarebookResult<()> {
        validate_length("name", &self.name, PATIENT_NAME_MIN_LEN, PATIENT_NAME_MAX_LEN)?;
        validate_length("state", &self.state, 1, PATIENT_STATE_MAX_LEN)?;
        if has_control_chars(&self.name) || has_control_chars(&self.state) {
            return Err(CarebookError::validation("patient: control characters"));
        }
        if normalize_phone(&self.phone)? != self.phone {
            return Err(CarebookError::validation("phone: not normalized"));
        }
        if let Some(editor) = &self.edited_by {
            validate_length("edited_by", editor, 1, PATIENT_NAME_MAX_LEN)?;
        }
        Ok(())
    }

    /// Overwrites the mutable fields with those of `changes`.
    ///
    /// The identifier and creation time are left untouched.
    pub fn apply_update(&mut self, changes: &Patient) {
        self.name.clone_from(&changes.name);
        self.date_of_birth = changes.date_of_birth;
        self.phone.clone_from(&changes.phone);
        self.state.clone_from(&changes.state);
        self.edited_by.clone_from(&changes.edited_by);
        self.edited_at = changes.edited_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(1980, 4, 2).unwrap()
    }

    #[test]
    fn test_new_patient_normalizes_phone() {
        let patient =
            Patient::new(PatientId::parse("P100").unwrap(), "Ada", dob(), "(555) 111-2222", "CA")
                .unwrap();
        assert_eq!(patient.phone, "5551112222");
        assert!(patient.edited_at.is_none());
    }

    #[test]
    fn test_new_patient_rejects_short_name() {
        let err = Patient::new(PatientId::parse("P100").unwrap(), "A", dob(), "5551112222", "CA")
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_apply_update_keeps_identity() {
        let mut patient =
            Patient::new(PatientId::parse("P100").unwrap(), "Ada", dob(), "5551112222", "CA")
                .unwrap();
        let created_at = patient.created_at;

        let mut changes = patient.clone();
        changes.id = PatientId::parse("P999").unwrap();
        changes.name = "Bea".to_string();
        changes.created_at = now_millis() + chrono::Duration::days(1);
        changes.edited_by = Some("nurse-1".to_string());
        changes.edited_at = Some(now_millis());

        patient.apply_update(&changes);
        assert_eq!(patient.id.as_str(), "P100");
        assert_eq!(patient.created_at, created_at);
        assert_eq!(patient.name, "Bea");
        assert_eq!(patient.edited_by.as_deref(), Some("nurse-1"));
    }
}
