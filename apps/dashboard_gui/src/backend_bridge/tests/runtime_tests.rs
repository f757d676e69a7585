use super::*;
use async_trait::async_trait;
use client_core::{error::ClientError, resource::RequestTicket};
use crossbeam_channel::{bounded, Receiver as EventReceiver};
use serde_json::{json, Value};
use shared::{
    domain::EntityId,
    protocol::{ActionResponse, BulkDeleteResponse, ImportResponse, ImportSummary},
};
use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

const WAIT: Duration = Duration::from_secs(5);

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Product lists hang until aborted; every other kind answers at once.
struct FakeApi {
    entered: Sender<EntityKind>,
    aborted: Arc<AtomicBool>,
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, ClientError> {
        let _ = self.entered.send(kind);
        if kind == EntityKind::Product {
            let _guard = DropFlag(Arc::clone(&self.aborted));
            std::future::pending::<()>().await;
        }
        Ok(vec![json!({ "_id": "o1", "orderNumber": "ORD-1" })])
    }

    async fn detail(&self, _kind: EntityKind, id: &EntityId) -> Result<Value, ClientError> {
        Ok(json!({ "_id": id.as_str() }))
    }

    async fn create(&self, _kind: EntityKind, _body: Value) -> Result<ActionResponse, ClientError> {
        Ok(ActionResponse {
            success: true,
            message: Some("created".into()),
        })
    }

    async fn update(
        &self,
        _kind: EntityKind,
        _id: &EntityId,
        _body: Value,
    ) -> Result<ActionResponse, ClientError> {
        Err(ClientError::Rejected {
            message: Some("stale revision".into()),
        })
    }

    async fn delete(&self, _kind: EntityKind, _id: &EntityId) -> Result<ActionResponse, ClientError> {
        Ok(ActionResponse {
            success: true,
            message: None,
        })
    }

    async fn bulk_delete(
        &self,
        _kind: EntityKind,
        _ids: Vec<EntityId>,
    ) -> Result<BulkDeleteResponse, ClientError> {
        Ok(BulkDeleteResponse {
            success: true,
            message: None,
            failed_ids: Vec::new(),
        })
    }

    async fn export(&self, _kind: EntityKind, _ids: Vec<EntityId>) -> Result<Vec<u8>, ClientError> {
        Ok(b"PK-sheet".to_vec())
    }

    async fn import(
        &self,
        _kind: EntityKind,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<ImportResponse, ClientError> {
        Ok(ImportResponse {
            success: true,
            message: Some(file_name),
            summary: ImportSummary {
                total: bytes.len() as u64,
                successful: bytes.len() as u64,
                failed: 0,
                duplicates: 0,
            },
            details: Default::default(),
        })
    }
}

struct Harness {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: EventReceiver<UiEvent>,
    entered_rx: EventReceiver<EntityKind>,
    aborted: Arc<AtomicBool>,
    worker: thread::JoinHandle<()>,
}

fn start() -> Harness {
    let (cmd_tx, cmd_rx) = bounded(16);
    let (ui_tx, ui_rx) = bounded(16);
    let (entered_tx, entered_rx) = bounded(16);
    let aborted = Arc::new(AtomicBool::new(false));
    let api = Arc::new(FakeApi {
        entered: entered_tx,
        aborted: Arc::clone(&aborted),
    });
    let worker = spawn_worker(api, cmd_rx, ui_tx);

    let ready = ui_rx.recv_timeout(WAIT).expect("ready event");
    assert!(matches!(ready, UiEvent::Info(_)));

    Harness {
        cmd_tx,
        ui_rx,
        entered_rx,
        aborted,
        worker,
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dashboard-gui-{}-{name}", std::process::id()))
}

#[test]
fn cancel_load_aborts_the_in_flight_request() {
    let harness = start();
    harness
        .cmd_tx
        .send(BackendCommand::Load {
            kind: EntityKind::Product,
            ticket: RequestTicket(1),
        })
        .unwrap();
    assert_eq!(harness.entered_rx.recv_timeout(WAIT).unwrap(), EntityKind::Product);

    harness
        .cmd_tx
        .send(BackendCommand::CancelLoad {
            kind: EntityKind::Product,
        })
        .unwrap();

    let deadline = Instant::now() + WAIT;
    while !harness.aborted.load(Ordering::SeqCst) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(harness.aborted.load(Ordering::SeqCst));
    assert!(harness.ui_rx.try_recv().is_err());
}

#[test]
fn load_echoes_the_ticket() {
    let harness = start();
    harness
        .cmd_tx
        .send(BackendCommand::Load {
            kind: EntityKind::Order,
            ticket: RequestTicket(7),
        })
        .unwrap();

    match harness.ui_rx.recv_timeout(WAIT).unwrap() {
        UiEvent::ListLoaded {
            kind,
            ticket,
            result,
        } => {
            assert_eq!(kind, EntityKind::Order);
            assert_eq!(ticket, RequestTicket(7));
            assert_eq!(result.unwrap().len(), 1);
        }
        _ => panic!("expected ListLoaded"),
    }
}

#[test]
fn actions_report_back_with_their_ids() {
    let harness = start();
    let ids = vec![EntityId::from("c1"), EntityId::from("c2")];
    harness
        .cmd_tx
        .send(BackendCommand::BulkDelete {
            kind: EntityKind::Customer,
            ids: ids.clone(),
        })
        .unwrap();
    match harness.ui_rx.recv_timeout(WAIT).unwrap() {
        UiEvent::BulkDeleted {
            ids: echoed,
            result,
            ..
        } => {
            assert_eq!(echoed, ids);
            assert!(result.unwrap().failed_ids.is_empty());
        }
        _ => panic!("expected BulkDeleted"),
    }

    harness
        .cmd_tx
        .send(BackendCommand::Update {
            kind: EntityKind::Customer,
            id: EntityId::from("c1"),
            body: json!({}),
        })
        .unwrap();
    match harness.ui_rx.recv_timeout(WAIT).unwrap() {
        UiEvent::Saved { id, result, .. } => {
            assert_eq!(id, Some(EntityId::from("c1")));
            assert_eq!(result.unwrap_err().user_message("x"), "stale revision");
        }
        _ => panic!("expected Saved"),
    }
}

#[test]
fn export_and_import_go_through_files() {
    let harness = start();
    let out = temp_path("export.xlsx");
    harness
        .cmd_tx
        .send(BackendCommand::Export {
            kind: EntityKind::Payment,
            ids: Vec::new(),
            path: out.clone(),
        })
        .unwrap();
    match harness.ui_rx.recv_timeout(WAIT).unwrap() {
        UiEvent::Exported { result, .. } => assert_eq!(result.unwrap(), out),
        _ => panic!("expected Exported"),
    }
    assert_eq!(std::fs::read(&out).unwrap(), b"PK-sheet");

    harness
        .cmd_tx
        .send(BackendCommand::Import {
            kind: EntityKind::Payment,
            path: out.clone(),
        })
        .unwrap();
    match harness.ui_rx.recv_timeout(WAIT).unwrap() {
        UiEvent::Imported { result, .. } => {
            let response = result.unwrap();
            assert_eq!(response.summary.total, 8);
            assert_eq!(response.message.as_deref(), out.file_name().and_then(|n| n.to_str()));
        }
        _ => panic!("expected Imported"),
    }
    let _ = std::fs::remove_file(&out);

    harness
        .cmd_tx
        .send(BackendCommand::Import {
            kind: EntityKind::Payment,
            path: temp_path("missing.xlsx"),
        })
        .unwrap();
    match harness.ui_rx.recv_timeout(WAIT).unwrap() {
        UiEvent::Imported { result, .. } => {
            assert!(matches!(result, Err(ClientError::Io(_))))
        }
        _ => panic!("expected Imported"),
    }
}

#[test]
fn worker_stops_when_ui_drops_its_sender() {
    let harness = start();
    drop(harness.cmd_tx);
    harness.worker.join().expect("worker thread");
}
