pub mod gateway;
pub mod wire;

use thiserror::Error;

/// Failure taxonomy for backend calls.
///
/// The caller's policy per variant: `Auth` forces re-authentication,
/// `Validation` is surfaced to the user and never retried, `NotFound`
/// means the task vanished and should be dropped from the local store,
/// `Server` and `Network` are transient and may be retried manually.
/// Nothing is retried automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required: {0}")]
    Auth(String),

    #[error("request rejected: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
