//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit status. Store
//! errors keep their own code so scripts can tell a rejected record from a
//! broken store file.

use std::fmt;
use std::io;

use crate::codec::CodecError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout, import/export files)
    IoError,
    /// Argument that parsed but makes no sense for the command
    InvalidInput,
    /// Write refused because it would drop data the command never loaded
    UnsafeWrite,
    /// Error raised by the record store, with the store's code
    Store(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CABINET_CLI_CONFIG_ERROR",
            Self::IoError => "CABINET_CLI_IO_ERROR",
            Self::InvalidInput => "CABINET_CLI_INVALID_INPUT",
            Self::UnsafeWrite => "CABINET_CLI_UNSAFE_WRITE",
            Self::Store(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    pub fn unsafe_write(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::UnsafeWrite, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::Store(e.code()), e.to_string())
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        StoreError::from(e).into()
    }
}

impl From<CodecError> for CliError {
    fn from(e: CodecError) -> Self {
        Self::io_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
