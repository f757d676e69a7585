use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {}", body.text().unwrap_or("no details"))]
    Status { status: u16, body: ApiError },
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{}", message.as_deref().unwrap_or("request rejected by server"))]
    Rejected { message: Option<String> },
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Message text supplied by the backend, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.text(),
            Self::Rejected { message } => message
                .as_deref()
                .map(str::trim)
                .filter(|message| !message.is_empty()),
            _ => None,
        }
    }

    /// Text for a toast: the server's own message when it sent one, else the
    /// caller's generic fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Status { status, body } => {
                Some(body.code.unwrap_or_else(|| ErrorCode::from_status(*status)))
            }
            _ => None,
        }
    }
}
