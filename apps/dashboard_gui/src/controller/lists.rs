//! One list controller per entity kind, addressed by [`EntityKind`].

use std::sync::Arc;

use client_core::{
    controller::{BulkDeleteOutcome, BulkDeletePrompt, ListController},
    error::ClientError,
    notifications::Notifier,
    resource::RequestTicket,
    rows::{decode_rows, CustomerRow, LiveEventRow, OrderRow, PaymentRow, ProductRow},
};
use shared::{
    domain::{EntityId, EntityKind},
    protocol::{ActionResponse, BulkDeleteResponse},
};

/// Runs `$body` with `$list` bound to the controller for `$kind`. Each arm
/// is monomorphic, so the body may call generic code.
macro_rules! with_list {
    ($lists:expr, $kind:expr, $list:ident => $body:expr) => {
        match $kind {
            ::shared::domain::EntityKind::Product => {
                let $list = &mut $lists.products;
                $body
            }
            ::shared::domain::EntityKind::Order => {
                let $list = &mut $lists.orders;
                $body
            }
            ::shared::domain::EntityKind::Customer => {
                let $list = &mut $lists.customers;
                $body
            }
            ::shared::domain::EntityKind::Payment => {
                let $list = &mut $lists.payments;
                $body
            }
            ::shared::domain::EntityKind::LiveEvent => {
                let $list = &mut $lists.live_events;
                $body
            }
        }
    };
}
pub(crate) use with_list;

pub struct EntityLists {
    pub products: ListController<ProductRow>,
    pub orders: ListController<OrderRow>,
    pub customers: ListController<CustomerRow>,
    pub payments: ListController<PaymentRow>,
    pub live_events: ListController<LiveEventRow>,
}

impl EntityLists {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            products: ListController::new(notifier.clone()),
            orders: ListController::new(notifier.clone()),
            customers: ListController::new(notifier.clone()),
            payments: ListController::new(notifier.clone()),
            live_events: ListController::new(notifier),
        }
    }

    pub fn begin_load(&mut self, kind: EntityKind) -> RequestTicket {
        with_list!(self, kind, list => list.begin_load())
    }

    /// Decodes the raw records for `kind` and applies them under `ticket`.
    pub fn finish_load(
        &mut self,
        kind: EntityKind,
        ticket: RequestTicket,
        result: Result<Vec<serde_json::Value>, ClientError>,
    ) -> bool {
        with_list!(self, kind, list => list.finish_load(ticket, result.and_then(decode_rows)))
    }

    pub fn is_loading(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Product => self.products.state().is_loading(),
            EntityKind::Order => self.orders.state().is_loading(),
            EntityKind::Customer => self.customers.state().is_loading(),
            EntityKind::Payment => self.payments.state().is_loading(),
            EntityKind::LiveEvent => self.live_events.state().is_loading(),
        }
    }

    pub fn request_bulk_delete(&mut self, kind: EntityKind) -> BulkDeletePrompt {
        with_list!(self, kind, list => list.request_bulk_delete())
    }

    pub fn pending_bulk_delete(&self, kind: EntityKind) -> Option<&[EntityId]> {
        match kind {
            EntityKind::Product => self.products.pending_bulk_delete(),
            EntityKind::Order => self.orders.pending_bulk_delete(),
            EntityKind::Customer => self.customers.pending_bulk_delete(),
            EntityKind::Payment => self.payments.pending_bulk_delete(),
            EntityKind::LiveEvent => self.live_events.pending_bulk_delete(),
        }
    }

    pub fn cancel_bulk_delete(&mut self, kind: EntityKind) {
        with_list!(self, kind, list => list.cancel_bulk_delete())
    }

    pub fn confirm_bulk_delete(&mut self, kind: EntityKind) -> Option<Vec<EntityId>> {
        with_list!(self, kind, list => list.confirm_bulk_delete())
    }

    pub fn apply_bulk_delete(
        &mut self,
        kind: EntityKind,
        ids: &[EntityId],
        result: Result<BulkDeleteResponse, ClientError>,
    ) -> BulkDeleteOutcome {
        with_list!(self, kind, list => list.apply_bulk_delete(ids, result))
    }

    pub fn apply_delete(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        result: Result<ActionResponse, ClientError>,
    ) -> bool {
        with_list!(self, kind, list => list.apply_delete(id, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::notifications::NotificationCenter;
    use serde_json::json;

    fn lists() -> EntityLists {
        EntityLists::new(Arc::new(NotificationCenter::default()))
    }

    #[test]
    fn pending_bulk_delete_reads_through_a_shared_borrow() {
        let mut lists = lists();
        let ticket = lists.begin_load(EntityKind::Customer);
        assert!(lists.finish_load(
            EntityKind::Customer,
            ticket,
            Ok(vec![json!({ "_id": "c1" }), json!({ "_id": "c2" })]),
        ));
        lists.customers.toggle_row_selection(&EntityId::from("c2"));
        lists.request_bulk_delete(EntityKind::Customer);

        let shared: &EntityLists = &lists;
        assert_eq!(
            shared.pending_bulk_delete(EntityKind::Customer),
            Some([EntityId::from("c2")].as_slice())
        );
        assert_eq!(shared.pending_bulk_delete(EntityKind::Order), None);
    }

    #[test]
    fn populated_references_do_not_fail_an_order_load() {
        let mut lists = lists();
        let ticket = lists.begin_load(EntityKind::Order);
        lists.finish_load(
            EntityKind::Order,
            ticket,
            Ok(vec![json!({
                "_id": "o1",
                "customer": { "name": "Ana" },
                "createdAt": "2024-01-01T00:00:00Z",
                "date": "2024-01-01",
            })]),
        );
        assert_eq!(lists.orders.state().error(), None);
        assert_eq!(lists.orders.items()[0].customer, "Ana");
    }
}
