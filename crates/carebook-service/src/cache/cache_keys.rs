//! Cache key builder.
//!
//! Every key is `{prefix}:{family}:...`. Identifiers are shape-checked and
//! free text is lowercased and percent-encoded, so no user input can carry
//! the `:` delimiter into a key. Inputs that fail the checks map to the
//! constant `{prefix}:invalid:{family}` key, which callers treat as a
//! guaranteed miss.

use carebook_core::{rules, PatientFilter, PatientQuery};
use std::fmt;

/// The kind of value a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    Patient,
    PatientList,
    PatientCount,
    Address,
    AddressList,
}

impl KeyFamily {
    /// Returns the family name used in keys and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::PatientList => "patients",
            Self::PatientCount => "patient_count",
            Self::Address => "address",
            Self::AddressList => "addresses",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A built cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    value: String,
    family: KeyFamily,
    invalid: bool,
}

impl CacheKey {
    /// Returns the key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the family this key belongs to.
    #[must_use]
    pub const fn family(&self) -> KeyFamily {
        self.family
    }

    /// Returns true if the key lies in the invalid namespace.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        self.invalid
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Builds cache keys under a fixed prefix. Holds no other state.
#[derive(Debug, Clone, Copy)]
pub struct CacheKeys<'a> {
    prefix: &'a str,
}

impl<'a> CacheKeys<'a> {
    /// Creates a key builder for `prefix`.
    #[must_use]
    pub const fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// Key for a single patient.
    #[must_use]
    pub fn patient_by_id(&self, id: &str) -> CacheKey {
        if !is_identifier(id) {
            return self.invalid(KeyFamily::Patient);
        }
        self.key(KeyFamily::Patient, format!("id:{id}"))
    }

    /// Key for one page of a patient listing.
    #[must_use]
    pub fn patient_list(&self, query: &PatientQuery) -> CacheKey {
        if query.validate().is_err() {
            return self.invalid(KeyFamily::PatientList);
        }
        self.key(
            KeyFamily::PatientList,
            format!(
                "name={}:limit={}:offset={}",
                encode_filter(&query.filter),
                query.limit,
                query.offset
            ),
        )
    }

    /// Key for a filtered patient count.
    #[must_use]
    pub fn patient_count(&self, filter: &PatientFilter) -> CacheKey {
        if filter.validate().is_err() {
            return self.invalid(KeyFamily::PatientCount);
        }
        self.key(
            KeyFamily::PatientCount,
            format!("name={}", encode_filter(filter)),
        )
    }

    /// Key for one address of a patient.
    #[must_use]
    pub fn address_by_id(&self, patient_id: &str, address_id: &str) -> CacheKey {
        if !is_identifier(patient_id) || !is_identifier(address_id) {
            return self.invalid(KeyFamily::Address);
        }
        self.key(
            KeyFamily::Address,
            format!("patient:{patient_id}:id:{address_id}"),
        )
    }

    /// Key for every address of a patient.
    #[must_use]
    pub fn addresses_by_patient(&self, patient_id: &str) -> CacheKey {
        if !is_identifier(patient_id) {
            return self.invalid(KeyFamily::AddressList);
        }
        self.key(KeyFamily::AddressList, format!("patient:{patient_id}"))
    }

    fn key(&self, family: KeyFamily, rest: String) -> CacheKey {
        CacheKey {
            value: format!("{}:{}:{}", self.prefix, family, rest),
            family,
            invalid: false,
        }
    }

    fn invalid(&self, family: KeyFamily) -> CacheKey {
        CacheKey {
            value: format!("{}:invalid:{}", self.prefix, family),
            family,
            invalid: true,
        }
    }
}

fn is_identifier(value: &str) -> bool {
    rules::identifier(value).is_ok()
}

/// Canonical form of a name filter: trimmed, lowercased, percent-encoded.
/// An absent or blank filter encodes as the empty string.
fn encode_filter(filter: &PatientFilter) -> String {
    filter
        .name_fragment()
        .map(|name| url::form_urlencoded::byte_serialize(name.to_lowercase().as_bytes()).collect())
        .unwrap_or_default()
}
