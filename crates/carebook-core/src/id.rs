//! Typed ID wrappers for domain entities.
//!
//! Both identifiers are plain strings on the wire and in the document
//! store. Parsing goes through the identifier shape check, so a value of
//! either type is always safe to place in a query filter or a cache key.

use crate::{validate_identifier, CarebookError, CarebookResult, MAX_PATIENT_ID_LEN};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

/// Last suffix handed out by [`AddressId::generate`].
static LAST_ADDRESS_SUFFIX: AtomicI64 = AtomicI64::new(0);

/// A strongly-typed wrapper for patient IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Parses and validates a caller-supplied patient ID.
    pub fn parse(value: &str) -> CarebookResult<Self> {
        validate_identifier("patient id", value)?;
        if value.len() > MAX_PATIENT_ID_LEN {
            return Err(CarebookError::validation("patient id: identifier_too_long"));
        }
        Ok(Self(value.to_string()))
    }

    /// Generates a new patient ID (`P` followed by a time-ordered UUID).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("P{}", Uuid::now_v7().simple()))
    }

    /// Wraps a value read back from a trusted store.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A strongly-typed wrapper for address IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct AddressId(String);

impl AddressId {
    /// Parses and validates a caller-supplied address ID.
    pub fn parse(value: &str) -> CarebookResult<Self> {
        validate_identifier("address id", value)?;
        Ok(Self(value.to_string()))
    }

    /// Generates an address ID owned by `patient_id`.
    ///
    /// The suffix is a microsecond timestamp that is strictly increasing
    /// across the process, so two calls never yield the same ID.
    #[must_use]
    pub fn generate(patient_id: &PatientId) -> Self {
        let now = Utc::now().timestamp_micros();
        let previous = LAST_ADDRESS_SUFFIX
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        let suffix = now.max(previous + 1);
        Self(format!("{patient_id}-{suffix}"))
    }

    /// Wraps a value read back from a trusted store.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AddressId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_parsing() {
        assert_eq!(PatientId::parse("P100").unwrap().as_str(), "P100");
        assert!(PatientId::parse("P1;admin:all").unwrap_err().is_validation());
        assert!(PatientId::parse("").is_err());
        assert!(PatientId::parse(&"P".repeat(MAX_PATIENT_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_generated_patient_id_is_valid_and_unique() {
        let a = PatientId::generate();
        let b = PatientId::generate();
        assert_ne!(a, b);
        assert!(PatientId::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_generated_address_id_fits_for_longest_patient_id() {
        let patient = PatientId::parse(&"P".repeat(MAX_PATIENT_ID_LEN)).unwrap();
        let id = AddressId::generate(&patient);
        assert!(AddressId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_generated_address_ids_embed_patient_and_increase() {
        let patient = PatientId::parse("P100").unwrap();
        let ids: Vec<AddressId> = (0..50).map(|_| AddressId::generate(&patient)).collect();

        for window in ids.windows(2) {
            let a: i64 = window[0].as_str().rsplit('-').next().unwrap().parse().unwrap();
            let b: i64 = window[1].as_str().rsplit('-').next().unwrap().parse().unwrap();
            assert!(b > a);
        }
        assert!(ids.iter().all(|id| id.as_str().starts_with("P100-")));
        assert!(ids.iter().all(|id| AddressId::parse(id.as_str()).is_ok()));
    }
}
