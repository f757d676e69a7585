//! UI/backend events and error modeling for the dashboard controller.

use std::path::PathBuf;

use client_core::{error::ClientError, resource::RequestTicket};
use shared::{
    domain::{EntityId, EntityKind},
    error::ErrorCode,
    protocol::{ActionResponse, BulkDeleteResponse, ImportResponse},
};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    ListLoaded {
        kind: EntityKind,
        ticket: RequestTicket,
        result: Result<Vec<serde_json::Value>, ClientError>,
    },
    DetailLoaded {
        kind: EntityKind,
        id: EntityId,
        result: Result<serde_json::Value, ClientError>,
    },
    /// `id` is `None` for a create.
    Saved {
        kind: EntityKind,
        id: Option<EntityId>,
        result: Result<ActionResponse, ClientError>,
    },
    Deleted {
        kind: EntityKind,
        id: EntityId,
        result: Result<ActionResponse, ClientError>,
    },
    BulkDeleted {
        kind: EntityKind,
        ids: Vec<EntityId>,
        result: Result<BulkDeleteResponse, ClientError>,
    },
    Exported {
        kind: EntityKind,
        result: Result<PathBuf, ClientError>,
    },
    Imported {
        kind: EntityKind,
        result: Result<ImportResponse, ClientError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Load,
    Save,
    Delete,
    Export,
    Import,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("token")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnected")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Classifies by variant and status code; the message is the server's
    /// text when it sent one, else `fallback`.
    pub fn from_client_error(context: UiErrorContext, err: &ClientError, fallback: &str) -> Self {
        let category = match err {
            ClientError::Transport(_) | ClientError::Io(_) => UiErrorCategory::Transport,
            ClientError::Settings(_) => UiErrorCategory::Validation,
            ClientError::Decode(_) | ClientError::Rejected { .. } => UiErrorCategory::Server,
            ClientError::Status { .. } => match err.code() {
                Some(ErrorCode::Unauthorized | ErrorCode::Forbidden) => UiErrorCategory::Auth,
                Some(ErrorCode::Validation | ErrorCode::Conflict) => UiErrorCategory::Validation,
                Some(ErrorCode::Unknown) | None => UiErrorCategory::Unknown,
                Some(_) => UiErrorCategory::Server,
            },
        };
        Self {
            category,
            context,
            message: err.user_message(fallback),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn title(&self) -> &'static str {
        match self.context {
            UiErrorContext::BackendStartup => "Startup failed",
            UiErrorContext::Load => "Load failed",
            UiErrorContext::Save => "Save failed",
            UiErrorContext::Delete => "Delete failed",
            UiErrorContext::Export => "Export failed",
            UiErrorContext::Import => "Import failed",
            UiErrorContext::General => "Error",
        }
    }
}
