use thiserror::Error;

/// Failure of a single API operation.
///
/// Transport failures and non-2xx statuses are handled identically by the
/// coordinator: the `Display` text is recorded against the affected item.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    /// Server-provided message for validation errors (e.g. missing description)
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}
