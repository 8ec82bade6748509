//! Client error types

use shared::FormError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or connectivity failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, body kept as context
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Authentication required
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business-level failure reported in a 200 response (`exitoso: false`)
    #[error("{}", business_message(.mensaje, .errores))]
    Business {
        mensaje: String,
        errores: Option<String>,
    },

    /// Action needs an invoice UUID and none was given
    #[error("Invoice UUID is required")]
    MissingUuid,

    /// Local pre-check failed, nothing was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bad client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form edit rejected
    #[error(transparent)]
    Form(#[from] FormError),
}

fn business_message(mensaje: &str, errores: &Option<String>) -> String {
    match errores {
        Some(errores) => format!("{mensaje}: {errores}"),
        None => mensaje.to_string(),
    }
}

impl ClientError {
    /// Whether the failure came from the network layer rather than the
    /// backend's business rules or a local check
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
