//! Transport API client error types.

use std::fmt;

/// Errors from fetching a departure board.
#[derive(Debug)]
pub enum TransportApiError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// Invalid app id / key
    Unauthorized,

    /// Demo board data could not be loaded
    Demo(String),
}

impl fmt::Display for TransportApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportApiError::Http(e) => write!(f, "HTTP error: {e}"),
            TransportApiError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            TransportApiError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            TransportApiError::RateLimited => write!(f, "rate limited by Transport API"),
            TransportApiError::Unauthorized => write!(f, "unauthorized (invalid app id or key)"),
            TransportApiError::Demo(msg) => write!(f, "demo data error: {msg}"),
        }
    }
}

impl std::error::Error for TransportApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportApiError {
    fn from(err: reqwest::Error) -> Self {
        TransportApiError::Http(err)
    }
}
