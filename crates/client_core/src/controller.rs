//! Remote list controller: owns the fetched rows of one entity kind together
//! with the view parameters, row selection and the bulk-delete flow.

use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::{EntityId, SortDirection},
    protocol::{ActionResponse, BulkDeleteResponse},
};
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    notifications::Notifier,
    resource::{RemoteResource, RequestTicket, TrackedResource},
    rows::ListRow,
    view::{derive, DerivedView, SortSpec, ViewQuery},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkDeletePrompt {
    /// Nothing selected; a warning was raised and no request may be sent.
    NothingSelected,
    ConfirmationRequired { ids: Vec<EntityId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkDeleteOutcome {
    Deleted { count: usize },
    PartiallyDeleted { deleted: usize, failed: Vec<EntityId> },
    Failed { message: String },
}

pub fn load_error_message(plural: &str) -> String {
    format!("Failed to load {plural}. Please try again later.")
}

pub struct ListController<R: ListRow> {
    rows: TrackedResource<Vec<R>>,
    selected: HashSet<EntityId>,
    query: ViewQuery,
    page_size: usize,
    pending_delete: Option<Vec<EntityId>>,
    notifier: Arc<dyn Notifier>,
}

impl<R: ListRow> ListController<R> {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_page_size(notifier, R::KIND.page_size())
    }

    pub fn with_page_size(notifier: Arc<dyn Notifier>, page_size: usize) -> Self {
        Self {
            rows: TrackedResource::default(),
            selected: HashSet::new(),
            query: ViewQuery::default(),
            page_size: page_size.max(1),
            pending_delete: None,
            notifier,
        }
    }

    pub fn state(&self) -> &RemoteResource<Vec<R>> {
        self.rows.state()
    }

    pub fn items(&self) -> &[R] {
        self.rows.state().data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Starts a (re)load. Any previously issued ticket becomes stale.
    pub fn begin_load(&mut self) -> RequestTicket {
        self.selected.clear();
        self.pending_delete = None;
        let ticket = self.rows.begin();
        debug!(kind = %R::KIND, ticket = ticket.0, "list load started");
        ticket
    }

    /// Applies a load result. Returns `false` when the ticket is stale and
    /// the result was discarded.
    pub fn finish_load(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<R>, ClientError>,
    ) -> bool {
        let result = match result {
            Ok(rows) => {
                info!(kind = %R::KIND, ticket = ticket.0, rows = rows.len(), "list loaded");
                Ok(rows)
            }
            Err(err) => {
                warn!(kind = %R::KIND, ticket = ticket.0, "list load failed: {err}");
                Err(load_error_message(R::KIND.plural()))
            }
        };

        let applied = self.rows.resolve(ticket, result);
        if applied {
            self.prune_selection();
        } else {
            debug!(kind = %R::KIND, ticket = ticket.0, "discarding stale list response");
        }
        applied
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
        self.query.page = 1;
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.query.filter = filter.into();
        self.query.page = 1;
    }

    /// Header-click behaviour: a new key sorts ascending, the same key flips
    /// direction.
    pub fn sort_by(&mut self, key: &str) {
        let direction = match &self.query.sort {
            Some(spec) if spec.key == key => spec.direction.toggled(),
            _ => SortDirection::Ascending,
        };
        self.set_sort(key, direction);
    }

    pub fn set_sort(&mut self, key: &str, direction: SortDirection) {
        self.query.sort = Some(SortSpec {
            key: key.to_string(),
            direction,
        });
        self.query.page = 1;
    }

    /// Jumps to `page` without clamping; an out-of-range page renders empty.
    pub fn set_page(&mut self, page: usize) {
        self.query.page = page.max(1);
    }

    pub fn next_page(&mut self) -> bool {
        let total_pages = self.view().total_pages;
        if self.query.page < total_pages {
            self.query.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.query.page > 1 {
            self.query.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn view(&self) -> DerivedView<'_, R> {
        derive(self.items(), &self.query, self.page_size)
    }

    pub fn visible_ids(&self) -> Vec<EntityId> {
        self.view().rows.iter().map(|row| row.id().clone()).collect()
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in row order.
    pub fn selected_ids(&self) -> Vec<EntityId> {
        self.items()
            .iter()
            .map(|row| row.id())
            .filter(|id| self.selected.contains(*id))
            .cloned()
            .collect()
    }

    /// Ids that are not currently loaded are ignored.
    pub fn toggle_row_selection(&mut self, id: &EntityId) {
        if self.selected.remove(id) {
            return;
        }
        if self.items().iter().any(|row| row.id() == id) {
            self.selected.insert(id.clone());
        }
    }

    pub fn all_visible_selected(&self) -> bool {
        let visible = self.visible_ids();
        !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id))
    }

    /// Selects every row of the current page, or deselects them if they are
    /// all selected already. Other pages are never touched.
    pub fn toggle_select_all(&mut self) {
        let visible = self.visible_ids();
        if visible.iter().all(|id| self.selected.contains(id)) {
            for id in &visible {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(visible);
        }
    }

    fn prune_selection(&mut self) {
        let present: HashSet<&EntityId> = self
            .rows
            .state()
            .data()
            .map(|rows| rows.iter().map(|row| row.id()).collect())
            .unwrap_or_default();
        self.selected.retain(|id| present.contains(id));
    }

    pub fn request_bulk_delete(&mut self) -> BulkDeletePrompt {
        let ids = self.selected_ids();
        if ids.is_empty() {
            self.pending_delete = None;
            self.notifier.warning(
                "Nothing selected",
                &format!("Select at least one {} to delete.", R::KIND.label().to_lowercase()),
            );
            return BulkDeletePrompt::NothingSelected;
        }
        self.pending_delete = Some(ids.clone());
        BulkDeletePrompt::ConfirmationRequired { ids }
    }

    pub fn pending_bulk_delete(&self) -> Option<&[EntityId]> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_bulk_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Takes the confirmed id list. `None` when no confirmation is pending.
    pub fn confirm_bulk_delete(&mut self) -> Option<Vec<EntityId>> {
        self.pending_delete.take()
    }

    pub fn apply_bulk_delete(
        &mut self,
        ids: &[EntityId],
        result: Result<BulkDeleteResponse, ClientError>,
    ) -> BulkDeleteOutcome {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(kind = %R::KIND, count = ids.len(), "bulk delete failed: {err}");
                let message = err.user_message(&format!(
                    "Failed to delete the selected {}.",
                    R::KIND.plural()
                ));
                self.notifier.error("Delete failed", &message);
                return BulkDeleteOutcome::Failed { message };
            }
        };

        let failed: HashSet<&EntityId> = response.failed_ids.iter().collect();
        let deleted: Vec<EntityId> = ids
            .iter()
            .filter(|id| !failed.contains(id))
            .cloned()
            .collect();
        self.remove_rows(&deleted);

        if failed.is_empty() {
            self.selected.clear();
            info!(kind = %R::KIND, count = deleted.len(), "bulk delete succeeded");
            self.notifier.success(
                "Deleted",
                &format!("Deleted {} {}.", deleted.len(), R::KIND.plural()),
            );
            return BulkDeleteOutcome::Deleted {
                count: deleted.len(),
            };
        }

        let failed: Vec<EntityId> = ids
            .iter()
            .filter(|id| failed.contains(id))
            .cloned()
            .collect();
        self.selected = failed.iter().cloned().collect();
        self.prune_selection();
        warn!(
            kind = %R::KIND,
            deleted = deleted.len(),
            failed = failed.len(),
            "bulk delete partially failed"
        );
        let detail = response
            .message
            .as_deref()
            .map(|message| format!(" {message}"))
            .unwrap_or_default();
        self.notifier.warning(
            "Partially deleted",
            &format!(
                "Deleted {} of {} {}; {} could not be deleted.{detail}",
                deleted.len(),
                ids.len(),
                R::KIND.plural(),
                failed.len()
            ),
        );
        BulkDeleteOutcome::PartiallyDeleted {
            deleted: deleted.len(),
            failed,
        }
    }

    /// Applies the result of a single-row delete.
    pub fn apply_delete(
        &mut self,
        id: &EntityId,
        result: Result<ActionResponse, ClientError>,
    ) -> bool {
        match result {
            Ok(response) => {
                self.remove_rows(std::slice::from_ref(id));
                let message = response
                    .message
                    .unwrap_or_else(|| format!("{} deleted.", R::KIND.label()));
                self.notifier.success("Deleted", &message);
                true
            }
            Err(err) => {
                warn!(kind = %R::KIND, id = %id, "delete failed: {err}");
                let message = err.user_message(&format!(
                    "Failed to delete {}.",
                    R::KIND.label().to_lowercase()
                ));
                self.notifier.error("Delete failed", &message);
                false
            }
        }
    }

    fn remove_rows(&mut self, ids: &[EntityId]) {
        if ids.is_empty() {
            return;
        }
        let doomed: HashSet<&EntityId> = ids.iter().collect();
        if let Some(rows) = self.rows.state_mut().data_mut() {
            rows.retain(|row| !doomed.contains(row.id()));
        }
        self.prune_selection();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
