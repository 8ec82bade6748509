//! Form-level errors
//!
//! Raised locally before anything is sent to the backend.

use thiserror::Error;

/// Errors produced while editing [`FormData`](crate::models::FormData)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The field name is not part of the form
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    /// The value cannot be stored in the field
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// An invoice UUID must never be stored empty
    #[error("Invoice UUID is empty")]
    EmptyUuid,
}

/// Result type for form operations
pub type FormResult<T> = Result<T, FormError>;
