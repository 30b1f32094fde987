//! Validation utilities.
//!
//! Everything that reaches a query filter or a cache key passes through
//! here first: identifier shape checks, length bounds, phone normalization,
//! and escaping of free-text search input.

use crate::{CarebookError, CarebookResult, FieldError};
use validator::{Validate, ValidationErrors};

/// Maximum identifier length. Leaves room for generated address ids,
/// which embed the owning patient id.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Maximum patient identifier length.
pub const MAX_PATIENT_ID_LEN: usize = 64;

/// Bounds on the number of digits a normalized phone may carry.
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CarebookError` on failure.
    fn validate_request(&self) -> CarebookResult<()> {
        self.validate().map_err(validation_errors_to_carebook_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), |m| m.to_string()),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `CarebookError`.
#[must_use]
pub fn validation_errors_to_carebook_error(errors: ValidationErrors) -> CarebookError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    CarebookError::Validation(message)
}

/// Rejects identifiers that fail the shape check.
///
/// `field` names the offending input in the error message. The raw value
/// is deliberately left out of the message.
pub fn validate_identifier(field: &str, value: &str) -> CarebookResult<()> {
    rules::identifier(value)
        .map_err(|e| CarebookError::validation(format!("{field}: {}", e.code)))
}

/// Rejects strings whose trimmed character count falls outside `[min, max]`.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> CarebookResult<()> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(CarebookError::validation(format!(
            "{field}: length must be between {min} and {max}"
        )));
    }
    Ok(())
}

/// Strips formatting from a phone number and returns its digits.
///
/// Accepted formatting: spaces, `-`, `.`, parentheses, and a single leading
/// `+`. Anything else, or a digit count outside 10..=15, is rejected.
pub fn normalize_phone(phone: &str) -> CarebookResult<String> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(CarebookError::validation("phone: invalid character")),
        }
    }

    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len()) {
        return Err(CarebookError::validation(format!(
            "phone: must contain between {PHONE_MIN_DIGITS} and {PHONE_MAX_DIGITS} digits"
        )));
    }
    Ok(digits)
}

/// Escapes free text so the document store's regex engine treats every
/// character literally.
#[must_use]
pub fn escape_query_text(text: &str) -> String {
    regex::escape(text)
}

/// Returns true if the string carries any control character.
#[must_use]
pub fn has_control_chars(value: &str) -> bool {
    value.chars().any(char::is_control)
}

/// Common validation functions, usable from `#[validate(custom(...))]`.
pub mod rules {
    use super::{normalize_phone, MAX_IDENTIFIER_LEN};
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates identifier shape: 1..=128 ASCII alphanumerics, `-` or `_`,
    /// starting with an alphanumeric.
    pub fn identifier(value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::new("identifier_empty"));
        }
        if value.len() > MAX_IDENTIFIER_LEN {
            return Err(ValidationError::new("identifier_too_long"));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::new("identifier_invalid_characters"));
        }
        if !value.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::new("identifier_must_start_alphanumeric"));
        }
        Ok(())
    }

    /// Validates a phone number that normalizes to 10..=15 digits.
    pub fn phone(value: &str) -> Result<(), ValidationError> {
        normalize_phone(value)
            .map(|_| ())
            .map_err(|_| ValidationError::new("phone"))
    }

    /// Validates a two-letter uppercase state code.
    pub fn state_code(value: &str) -> Result<(), ValidationError> {
        if value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(())
        } else {
            Err(ValidationError::new("state_code"))
        }
    }

    /// Validates a five-digit numeric zip code.
    pub fn zip_code(value: &str) -> Result<(), ValidationError> {
        if value.len() == 5 && value.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(ValidationError::new("zip_code"))
        }
    }

    /// Rejects values carrying control characters.
    pub fn printable(value: &str) -> Result<(), ValidationError> {
        if super::has_control_chars(value) {
            return Err(ValidationError::new("control_characters"));
        }
        Ok(())
    }
}
