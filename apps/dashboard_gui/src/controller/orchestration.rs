//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub const QUEUE_FULL_STATUS: &str = "UI command queue is full; please retry";
pub const DISCONNECTED_STATUS: &str =
    "Backend command processor disconnected (possible startup/runtime failure); restart the dashboard";

/// Queues `cmd` without blocking the UI thread. Returns whether it was
/// accepted; on failure `status` explains why.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui->backend queue full");
            *status = QUEUE_FULL_STATUS.to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = DISCONNECTED_STATUS.to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::domain::EntityKind;

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();
        let cancel = || BackendCommand::CancelLoad {
            kind: EntityKind::Order,
        };

        assert!(dispatch_backend_command(&tx, cancel(), &mut status));
        assert!(status.is_empty());

        assert!(!dispatch_backend_command(&tx, cancel(), &mut status));
        assert_eq!(status, QUEUE_FULL_STATUS);

        drop(rx);
        assert!(!dispatch_backend_command(&tx, cancel(), &mut status));
        assert_eq!(status, DISCONNECTED_STATUS);
    }
}
