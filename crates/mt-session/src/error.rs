//! Error types for credential decoding

/// Reasons a stored credential token cannot be decoded
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
