//! A list controller bound to the API for as long as its view is mounted.

use std::sync::Arc;

use shared::domain::EntityId;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::debug;

use crate::{
    controller::{BulkDeleteOutcome, ListController},
    fetch_rows,
    notifications::Notifier,
    resource::RequestTicket,
    rows::ListRow,
    AdminApi,
};

/// Owns the in-flight load of one mounted list. Starting another load, or
/// unmounting, aborts the previous request.
pub struct MountedList<R: ListRow> {
    api: Arc<dyn AdminApi>,
    controller: Arc<Mutex<ListController<R>>>,
    in_flight: Option<JoinHandle<()>>,
}

impl<R: ListRow> MountedList<R> {
    /// Must be called from within a tokio runtime; starts the initial load.
    pub fn mount(api: Arc<dyn AdminApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::mount_with(api, ListController::new(notifier))
    }

    pub fn mount_with(api: Arc<dyn AdminApi>, mut controller: ListController<R>) -> Self {
        let ticket = controller.begin_load();
        let mut list = Self {
            api,
            controller: Arc::new(Mutex::new(controller)),
            in_flight: None,
        };
        list.spawn_fetch(ticket);
        list
    }

    pub fn controller(&self) -> Arc<Mutex<ListController<R>>> {
        Arc::clone(&self.controller)
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn reload(&mut self) {
        self.abort_in_flight();
        let ticket = self.controller.lock().await.begin_load();
        self.spawn_fetch(ticket);
    }

    fn spawn_fetch(&mut self, ticket: RequestTicket) {
        let api = Arc::clone(&self.api);
        let controller = Arc::clone(&self.controller);
        self.in_flight = Some(tokio::spawn(async move {
            let result = fetch_rows::<R>(api.as_ref()).await;
            controller.lock().await.finish_load(ticket, result);
        }));
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!(kind = %R::KIND, "aborting in-flight list request");
            }
            handle.abort();
        }
    }

    /// Waits for the current load, if any, to settle.
    pub async fn wait_idle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let _ = handle.await;
        }
    }

    /// Sends the pending confirmed bulk delete. `None` when nothing was
    /// awaiting confirmation.
    pub async fn bulk_delete_confirmed(&self) -> Option<BulkDeleteOutcome> {
        let ids = self.controller.lock().await.confirm_bulk_delete()?;
        let result = self.api.bulk_delete(R::KIND, ids.clone()).await;
        Some(self.controller.lock().await.apply_bulk_delete(&ids, result))
    }

    pub async fn delete_one(&self, id: &EntityId) -> bool {
        let result = self.api.delete(R::KIND, id).await;
        self.controller.lock().await.apply_delete(id, result)
    }

    pub async fn unmount(mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            let _ = handle.await;
        }
        debug!(kind = %R::KIND, "list unmounted");
    }
}

impl<R: ListRow> Drop for MountedList<R> {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
