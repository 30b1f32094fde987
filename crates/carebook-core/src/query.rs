//! Query shapes shared by every repository backend.

use crate::{has_control_chars, CarebookError, CarebookResult, Patient};
use serde::{Deserialize, Serialize};

/// Default page size when the caller gives none.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size a caller may ask for.
pub const MAX_LIMIT: u32 = 100;

/// Longest accepted name filter, in characters after trimming.
pub const MAX_NAME_FILTER_LEN: usize = 100;

/// Filter applied by `list` and `count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientFilter {
    /// Case-insensitive substring of the patient name, matched literally.
    pub name: Option<String>,
}

impl PatientFilter {
    /// Creates a filter on the given name fragment.
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Returns the trimmed name fragment, or `None` when it is absent or
    /// blank. Both backends and the cache key builder read the filter
    /// through here, so `" Ada "` and `"Ada"` are the same query.
    #[must_use]
    pub fn name_fragment(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Returns true if `patient` satisfies the filter.
    #[must_use]
    pub fn matches(&self, patient: &Patient) -> bool {
        self.name_fragment().map_or(true, |fragment| {
            patient
                .name
                .to_lowercase()
                .contains(&fragment.to_lowercase())
        })
    }

    /// Checks the filter is safe to hand to a backend.
    pub fn validate(&self) -> CarebookResult<()> {
        let Some(name) = &self.name else {
            return Ok(());
        };
        let len = name.trim().chars().count();
        if len == 0 || len > MAX_NAME_FILTER_LEN {
            return Err(CarebookError::validation(format!(
                "name: length must be between 1 and {MAX_NAME_FILTER_LEN}"
            )));
        }
        if has_control_chars(name) {
            return Err(CarebookError::validation("name: control characters"));
        }
        Ok(())
    }
}

/// A paginated patient listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientQuery {
    pub filter: PatientFilter,
    pub limit: u32,
    pub offset: u64,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            filter: PatientFilter::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PatientQuery {
    /// Creates a query; `limit` falls back to [`DEFAULT_LIMIT`].
    #[must_use]
    pub fn new(name: Option<String>, limit: Option<u32>, offset: Option<u64>) -> Self {
        Self {
            filter: PatientFilter { name },
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    /// Checks the limit bounds and the filter.
    pub fn validate(&self) -> CarebookResult<()> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(CarebookError::validation(format!(
                "limit: must be between 1 and {MAX_LIMIT}"
            )));
        }
        self.filter.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatientId;
    use chrono::NaiveDate;

    fn patient(name: &str) -> Patient {
        Patient::new(
            PatientId::parse("P1").unwrap(),
            name,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            "5551112222",
            "CA",
        )
        .unwrap()
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let filter = PatientFilter::by_name(" ADA ");
        assert!(filter.matches(&patient("Ada Lovelace")));
        assert!(filter.matches(&patient("Lady Adams")));
        assert!(!filter.matches(&patient("Grace Hopper")));
        assert!(PatientFilter::default().matches(&patient("Grace Hopper")));
    }

    #[test]
    fn test_filter_treats_pattern_characters_literally() {
        assert!(!PatientFilter::by_name(".*").matches(&patient("Ada Lovelace")));
        assert!(!PatientFilter::by_name("(unclosed").matches(&patient("Ada Lovelace")));
        assert!(PatientFilter::by_name("(unclosed").matches(&patient("Ada (unclosed")));
    }

    #[test]
    fn test_query_validation() {
        assert!(PatientQuery::default().validate().is_ok());
        assert!(PatientQuery::new(None, Some(0), None).validate().is_err());
        assert!(PatientQuery::new(None, Some(101), None).validate().is_err());
        assert!(PatientQuery::new(Some("  ".to_string()), None, None)
            .validate()
            .is_err());
        assert!(PatientQuery::new(Some("x".repeat(101)), None, None)
            .validate()
            .is_err());
        assert!(PatientQuery::new(Some(".*".to_string()), Some(100), Some(12))
            .validate()
            .is_ok());
    }
}
