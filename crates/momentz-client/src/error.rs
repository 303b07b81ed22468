use thiserror::Error;

use momentz_media::MediaError;
use momentz_shared::ValidationError;
use momentz_store::StoreError;

/// Failure of a single API call, as seen by the coordinator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network unreachable, connection reset, timeout.
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response other than an expired session.
    #[error("Server rejected the request ({status}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected { status: u16, message: Option<String> },

    /// 401 on an authenticated call. The session is already gone.
    #[error("Session expired")]
    AuthExpired,

    /// A 2xx body that did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// An authenticated call was attempted without a session.
    #[error("Not logged in")]
    NoSession,
}

impl ApiError {
    /// The message the server attached to a rejection, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::AuthExpired => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Umbrella error for callers that drive the whole client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to build HTTP client: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
