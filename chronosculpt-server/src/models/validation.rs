//! Validation error types

use std::fmt;

/// Rejected request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Path segment was missing
    Empty { field: &'static str },

    /// Value is not a whole number
    NotAnInteger { field: &'static str, value: String },

    /// Epoch milliseconds outside the representable range
    TimestampOutOfRange { value: i64 },

    /// Request body missing, not JSON, or missing fields
    MalformedBody { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::NotAnInteger { field, value } => {
                write!(f, "{} must be an integer, got '{}'", field, value)
            }
            Self::TimestampOutOfRange { value } => {
                write!(f, "timestamp {} is out of range", value)
            }
            Self::MalformedBody { reason } => write!(f, "invalid request body: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}
