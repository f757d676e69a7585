//! Backend commands queued from UI to backend worker.

use client_core::resource::RequestTicket;
use shared::domain::{EntityId, EntityKind};
use std::path::PathBuf;

#[derive(Debug)]
pub enum BackendCommand {
    /// Replaces any in-flight load of the same kind.
    Load {
        kind: EntityKind,
        ticket: RequestTicket,
    },
    CancelLoad {
        kind: EntityKind,
    },
    Detail {
        kind: EntityKind,
        id: EntityId,
    },
    Create {
        kind: EntityKind,
        body: serde_json::Value,
    },
    Update {
        kind: EntityKind,
        id: EntityId,
        body: serde_json::Value,
    },
    Delete {
        kind: EntityKind,
        id: EntityId,
    },
    BulkDelete {
        kind: EntityKind,
        ids: Vec<EntityId>,
    },
    Export {
        kind: EntityKind,
        ids: Vec<EntityId>,
        path: PathBuf,
    },
    Import {
        kind: EntityKind,
        path: PathBuf,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Load { .. } => "load",
            BackendCommand::CancelLoad { .. } => "cancel_load",
            BackendCommand::Detail { .. } => "detail",
            BackendCommand::Create { .. } => "create",
            BackendCommand::Update { .. } => "update",
            BackendCommand::Delete { .. } => "delete",
            BackendCommand::BulkDelete { .. } => "bulk_delete",
            BackendCommand::Export { .. } => "export",
            BackendCommand::Import { .. } => "import",
        }
    }
}
