//! Result type aliases for Carebook.

use crate::CarebookError;

/// A specialized `Result` type for Carebook operations.
pub type CarebookResult<T> = Result<T, CarebookError>;
