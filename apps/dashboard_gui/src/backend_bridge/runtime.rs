//! Runtime bridge between UI command queue and backend event intake.

use std::{collections::HashMap, sync::Arc, thread};

use client_core::{settings::Settings, AdminApi, HttpAdminApi};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::domain::EntityKind;
use tokio::task::JoinHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    match HttpAdminApi::new(&settings) {
        Ok(api) => {
            tracing::info!(base_url = %api.base_url(), "admin api configured");
            spawn_worker(Arc::new(api), cmd_rx, ui_tx);
        }
        Err(err) => {
            tracing::error!("invalid api settings: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err}"),
            )));
        }
    }
}

/// Runs the command loop on its own thread and tokio runtime. The thread
/// exits once every command sender is dropped.
pub fn spawn_worker(
    api: Arc<dyn AdminApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(serve_commands(api, cmd_rx, ui_tx));
    })
}

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => tracing::warn!("ui event queue full; dropping event"),
        Err(TrySendError::Disconnected(_)) => tracing::debug!("ui closed; dropping event"),
    }
}

async fn serve_commands(
    api: Arc<dyn AdminApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    emit(&ui_tx, UiEvent::Info("Backend worker ready".to_string()));

    let mut loads: HashMap<EntityKind, JoinHandle<()>> = HashMap::new();
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::Load { kind, ticket } => {
                if let Some(previous) = loads.remove(&kind) {
                    previous.abort();
                }
                let api = Arc::clone(&api);
                let ui_tx = ui_tx.clone();
                let task = tokio::spawn(async move {
                    let result = api.list(kind).await;
                    emit(&ui_tx, UiEvent::ListLoaded { kind, ticket, result });
                });
                loads.insert(kind, task);
            }
            BackendCommand::CancelLoad { kind } => {
                if let Some(previous) = loads.remove(&kind) {
                    if !previous.is_finished() {
                        tracing::debug!(%kind, "aborting in-flight list request");
                    }
                    previous.abort();
                }
            }
            other => {
                tokio::spawn(run_action(Arc::clone(&api), other, ui_tx.clone()));
            }
        }
        loads.retain(|_, task| !task.is_finished());
    }

    for task in loads.into_values() {
        task.abort();
    }
    tracing::info!("backend worker stopped");
}

async fn run_action(api: Arc<dyn AdminApi>, cmd: BackendCommand, ui_tx: Sender<UiEvent>) {
    let event = match cmd {
        BackendCommand::Detail { kind, id } => {
            let result = api.detail(kind, &id).await;
            UiEvent::DetailLoaded { kind, id, result }
        }
        BackendCommand::Create { kind, body } => {
            let result = api.create(kind, body).await;
            UiEvent::Saved {
                kind,
                id: None,
                result,
            }
        }
        BackendCommand::Update { kind, id, body } => {
            let result = api.update(kind, &id, body).await;
            UiEvent::Saved {
                kind,
                id: Some(id),
                result,
            }
        }
        BackendCommand::Delete { kind, id } => {
            let result = api.delete(kind, &id).await;
            UiEvent::Deleted { kind, id, result }
        }
        BackendCommand::BulkDelete { kind, ids } => {
            let result = api.bulk_delete(kind, ids.clone()).await;
            UiEvent::BulkDeleted { kind, ids, result }
        }
        BackendCommand::Export { kind, ids, path } => {
            let result = match api.export(kind, ids).await {
                Ok(bytes) => tokio::fs::write(&path, bytes)
                    .await
                    .map(|()| path)
                    .map_err(Into::into),
                Err(err) => Err(err),
            };
            UiEvent::Exported { kind, result }
        }
        BackendCommand::Import { kind, path } => {
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let file_name = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .unwrap_or("import.xlsx")
                        .to_string();
                    api.import(kind, file_name, bytes).await
                }
                Err(err) => Err(err.into()),
            };
            UiEvent::Imported { kind, result }
        }
        BackendCommand::Load { .. } | BackendCommand::CancelLoad { .. } => return,
    };
    emit(&ui_tx, event);
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
