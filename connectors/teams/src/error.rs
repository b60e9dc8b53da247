use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token request rejected: HTTP {status} - {message}")]
    Rejected { status: u16, message: String },
    #[error("Identity provider unreachable: {0}")]
    Unreachable(String),
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
    #[error("Missing credential configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Failed to parse response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Completion request failed: {0}")]
    Transport(String),
    #[error("Completion API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse completion response: {0}")]
    Decode(String),
    #[error("LLM backend not configured: {0}")]
    Config(String),
}

/// Failures that abort a whole request. Per-transcript and per-summary
/// failures never reach this type.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Authentication failed: {0}")]
    Auth(AuthError),
    #[error("Transcript listing failed: {0}")]
    Fetch(FetchError),
}

impl From<AuthError> for ConnectorError {
    fn from(err: AuthError) -> Self {
        ConnectorError::Auth(err)
    }
}

impl From<FetchError> for ConnectorError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Auth(auth) => ConnectorError::Auth(auth),
            other => ConnectorError::Fetch(other),
        }
    }
}
