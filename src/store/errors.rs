//! Store error types
//!
//! Error codes:
//! - CABINET_VALIDATION_FAILED (REJECT) - input refused, nothing written
//! - CABINET_RECORD_NOT_FOUND (REJECT) - edit of an id with no visible record
//! - CABINET_MALFORMED_STORE (FATAL) - backing file cannot be trusted
//! - CABINET_IO_ERROR (ERROR) - disk failure, propagated unchanged

use std::fmt;
use std::io;

use thiserror::Error;

use crate::record::RecordId;
use crate::validation::ValidationError;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request refused, store unchanged
    Reject,
    /// Operation failed, store remains usable
    Error,
    /// Store instance must not be used further
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Errors surfaced by every `RecordStore` operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("record #{id} not found")]
    NotFound { id: RecordId },

    #[error("malformed store: {reason}")]
    MalformedStore { reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn not_found(id: RecordId) -> Self {
        StoreError::NotFound { id }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        StoreError::MalformedStore {
            reason: reason.into(),
        }
    }

    /// Malformed-store error with byte offset context
    pub fn malformed_at(offset: u64, reason: impl Into<String>) -> Self {
        StoreError::MalformedStore {
            reason: format!("{} (byte_offset: {})", reason.into(), offset),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "CABINET_VALIDATION_FAILED",
            StoreError::NotFound { .. } => "CABINET_RECORD_NOT_FOUND",
            StoreError::MalformedStore { .. } => "CABINET_MALFORMED_STORE",
            StoreError::Io { .. } => "CABINET_IO_ERROR",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StoreError::Validation(_) | StoreError::NotFound { .. } => Severity::Reject,
            StoreError::Io { .. } => Severity::Error,
            StoreError::MalformedStore { .. } => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordField;

    #[test]
    fn test_error_codes() {
        let validation = StoreError::from(ValidationError::new(RecordField::Sex, "bad"));
        assert_eq!(validation.code(), "CABINET_VALIDATION_FAILED");
        assert_eq!(StoreError::not_found(4).code(), "CABINET_RECORD_NOT_FOUND");
        assert_eq!(StoreError::malformed("x").code(), "CABINET_MALFORMED_STORE");
        assert_eq!(
            StoreError::io("write", io::Error::new(io::ErrorKind::Other, "disk")).code(),
            "CABINET_IO_ERROR"
        );
    }

    #[test]
    fn test_only_malformed_is_fatal() {
        assert!(StoreError::malformed("bad length").is_fatal());
        assert!(!StoreError::not_found(1).is_fatal());
        assert_eq!(StoreError::not_found(1).severity(), Severity::Reject);
    }

    #[test]
    fn test_display_contains_context() {
        let err = StoreError::malformed_at(554, "deleted flag is 7");
        let display = err.to_string();
        assert!(display.contains("deleted flag is 7"));
        assert!(display.contains("byte_offset: 554"));

        assert_eq!(StoreError::not_found(9).to_string(), "record #9 not found");
    }
}
