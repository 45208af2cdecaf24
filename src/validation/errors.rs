//! Validation error type
//!
//! Error code: CABINET_VALIDATION_FAILED (REJECT). The operation is refused
//! and nothing is written.

use thiserror::Error;

use crate::record::RecordField;

/// A single rejected field, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    field: RecordField,
    reason: String,
}

impl ValidationError {
    pub fn new(field: RecordField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// The offending field.
    pub fn field(&self) -> RecordField {
        self.field
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn code(&self) -> &'static str {
        "CABINET_VALIDATION_FAILED"
    }
}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;
