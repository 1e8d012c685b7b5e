//! Error types for the client.

use crate::config::ConfigError;
use bazaar_api::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The server answered with a structured error body.
    #[error("{code}: {message}")]
    Api {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("No session: a bearer token is required")]
    NoSession,
}

impl ClientError {
    /// Error code of a structured server error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
