use super::*;
use crate::{
    controller::BulkDeletePrompt,
    error::ClientError,
    notifications::NotificationCenter,
    rows::ProductRow,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::EntityKind,
    error::ApiError,
    protocol::{ActionResponse, BulkDeleteResponse, ImportResponse},
};
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::Notify;

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// `None` in the queue makes that list call hang until it is aborted.
#[derive(Default)]
struct FakeApi {
    lists: std::sync::Mutex<VecDeque<Option<Vec<Value>>>>,
    entered: Notify,
    aborted: Arc<AtomicBool>,
    bulk_calls: AtomicUsize,
    fail_bulk: bool,
}

impl FakeApi {
    fn with_lists(lists: Vec<Option<Vec<Value>>>) -> Arc<Self> {
        Arc::new(Self {
            lists: std::sync::Mutex::new(lists.into()),
            ..Self::default()
        })
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn list(&self, _kind: EntityKind) -> Result<Vec<Value>, ClientError> {
        let next = self.lists.lock().unwrap().pop_front();
        match next {
            Some(Some(values)) => Ok(values),
            Some(None) => {
                let _guard = DropFlag(Arc::clone(&self.aborted));
                self.entered.notify_one();
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
            None => Err(ClientError::Status {
                status: 500,
                body: ApiError::default(),
            }),
        }
    }

    async fn detail(&self, _kind: EntityKind, _id: &EntityId) -> Result<Value, ClientError> {
        Ok(json!({}))
    }

    async fn create(&self, _kind: EntityKind, _body: Value) -> Result<ActionResponse, ClientError> {
        Ok(ActionResponse {
            success: true,
            message: None,
        })
    }

    async fn update(
        &self,
        _kind: EntityKind,
        _id: &EntityId,
        _body: Value,
    ) -> Result<ActionResponse, ClientError> {
        Ok(ActionResponse {
            success: true,
            message: None,
        })
    }

    async fn delete(&self, _kind: EntityKind, _id: &EntityId) -> Result<ActionResponse, ClientError> {
        Ok(ActionResponse {
            success: true,
            message: Some("Product removed".into()),
        })
    }

    async fn bulk_delete(
        &self,
        _kind: EntityKind,
        _ids: Vec<EntityId>,
    ) -> Result<BulkDeleteResponse, ClientError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bulk {
            return Err(ClientError::Rejected {
                message: Some("Products are referenced by orders".into()),
            });
        }
        Ok(BulkDeleteResponse {
            success: true,
            message: None,
            failed_ids: Vec::new(),
        })
    }

    async fn export(&self, _kind: EntityKind, _ids: Vec<EntityId>) -> Result<Vec<u8>, ClientError> {
        Ok(Vec::new())
    }

    async fn import(
        &self,
        _kind: EntityKind,
        _file_name: String,
        _bytes: Vec<u8>,
    ) -> Result<ImportResponse, ClientError> {
        Err(ClientError::Rejected { message: None })
    }
}

fn products(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({ "_id": format!("p{i}"), "name": format!("Product {i}"), "price": 10 + i, "stock": i }))
        .collect()
}

fn notifier() -> Arc<NotificationCenter> {
    Arc::new(NotificationCenter::default())
}

#[tokio::test]
async fn mount_loads_and_normalizes_rows() {
    let api = FakeApi::with_lists(vec![Some(products(3))]);
    let mut list = MountedList::<ProductRow>::mount(api, notifier());
    list.wait_idle().await;

    let controller = list.controller();
    let controller = controller.lock().await;
    let items = controller.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1].id, EntityId::from("p1"));
    assert_eq!(items[1].price, "€11.00");
    assert!(!list.is_request_in_flight());
}

#[tokio::test]
async fn failed_mount_records_fixed_message() {
    let api = FakeApi::with_lists(Vec::new());
    let mut list = MountedList::<ProductRow>::mount(api, notifier());
    list.wait_idle().await;

    let controller = list.controller();
    let controller = controller.lock().await;
    assert_eq!(
        controller.state().error(),
        Some("Failed to load products. Please try again later.")
    );
}

#[tokio::test]
async fn reload_replaces_a_hanging_request() {
    let api = FakeApi::with_lists(vec![None, Some(products(1))]);
    let mut list = MountedList::<ProductRow>::mount(api.clone(), notifier());
    api.entered.notified().await;
    assert!(list.is_request_in_flight());

    list.reload().await;
    list.wait_idle().await;

    let controller = list.controller();
    assert_eq!(controller.lock().await.items().len(), 1);
}

#[tokio::test]
async fn unmount_aborts_the_in_flight_request() {
    let api = FakeApi::with_lists(vec![None]);
    let list = MountedList::<ProductRow>::mount(api.clone(), notifier());
    api.entered.notified().await;
    assert!(!api.aborted.load(Ordering::SeqCst));

    list.unmount().await;
    assert!(api.aborted.load(Ordering::SeqCst));
}

#[tokio::test]
async fn dropping_the_list_aborts_the_in_flight_request() {
    let api = FakeApi::with_lists(vec![None]);
    let list = MountedList::<ProductRow>::mount(api.clone(), notifier());
    api.entered.notified().await;

    drop(list);
    let settled = tokio::time::timeout(Duration::from_secs(1), async {
        while !api.aborted.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(settled.is_ok());
}

#[tokio::test]
async fn confirmed_bulk_delete_removes_rows() {
    let api = FakeApi::with_lists(vec![Some(products(3))]);
    let mut list = MountedList::<ProductRow>::mount(api.clone(), notifier());
    list.wait_idle().await;

    assert_eq!(list.bulk_delete_confirmed().await, None);
    assert_eq!(api.bulk_calls.load(Ordering::SeqCst), 0);

    {
        let controller = list.controller();
        let mut controller = controller.lock().await;
        controller.toggle_row_selection(&EntityId::from("p0"));
        controller.toggle_row_selection(&EntityId::from("p2"));
        assert!(matches!(
            controller.request_bulk_delete(),
            BulkDeletePrompt::ConfirmationRequired { .. }
        ));
    }

    let outcome = list.bulk_delete_confirmed().await;
    assert_eq!(outcome, Some(BulkDeleteOutcome::Deleted { count: 2 }));
    assert_eq!(api.bulk_calls.load(Ordering::SeqCst), 1);

    let controller = list.controller();
    let controller = controller.lock().await;
    let remaining: Vec<&str> = controller.items().iter().map(|row| row.id.as_str()).collect();
    assert_eq!(remaining, vec!["p1"]);
    assert_eq!(controller.selected_count(), 0);
}

#[tokio::test]
async fn rejected_bulk_delete_keeps_rows_and_selection() {
    let api = Arc::new(FakeApi {
        lists: std::sync::Mutex::new(vec![Some(products(2))].into()),
        fail_bulk: true,
        ..FakeApi::default()
    });
    let center = notifier();
    let mut list = MountedList::<ProductRow>::mount(api.clone(), center.clone());
    list.wait_idle().await;

    {
        let controller = list.controller();
        let mut controller = controller.lock().await;
        controller.toggle_select_all();
        controller.request_bulk_delete();
    }

    let outcome = list.bulk_delete_confirmed().await;
    assert_eq!(
        outcome,
        Some(BulkDeleteOutcome::Failed {
            message: "Products are referenced by orders".into()
        })
    );

    let controller = list.controller();
    let controller = controller.lock().await;
    assert_eq!(controller.items().len(), 2);
    assert_eq!(controller.selected_count(), 2);
    let last = center.pending().pop().unwrap();
    assert_eq!(last.message, "Products are referenced by orders");
}

#[tokio::test]
async fn delete_one_removes_the_row() {
    let api = FakeApi::with_lists(vec![Some(products(2))]);
    let mut list = MountedList::<ProductRow>::mount(api, notifier());
    list.wait_idle().await;

    assert!(list.delete_one(&EntityId::from("p0")).await);
    let controller = list.controller();
    assert_eq!(controller.lock().await.items().len(), 1);
}
