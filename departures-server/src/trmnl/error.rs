//! Device platform client error types.

/// Errors from the OAuth handshake and account lookup.
#[derive(Debug, thiserror::Error)]
pub enum TrmnlError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured URL could not be parsed
    #[error("invalid URL: {0}")]
    Url(String),

    /// Platform returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
