use reqwest::StatusCode;

/// Failures talking to the ordering backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid phone or password")]
    InvalidCredentials,

    /// Not logged in, or the refresh token was rejected too.
    #[error("not authorized, log in again")]
    Unauthorized,

    #[error("session expired, log in again")]
    SessionExpired,

    #[error("rejected by server: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid http client config: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// Whether the user has to log in again.
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::SessionExpired | Self::InvalidCredentials
        )
    }
}
