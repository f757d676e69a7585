//! Dashboard shell: entity tabs, list panel, modal windows and the event pump
//! that applies backend results.

use std::{path::PathBuf, sync::Arc, time::Duration};

use client_core::{
    controller::{BulkDeleteOutcome, BulkDeletePrompt},
    notifications::{NotificationCenter, Notifier},
    resource::RemoteResource,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{EntityId, EntityKind},
    protocol::ImportResponse,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    lists::{with_list, EntityLists},
    orchestration::dispatch_backend_command,
};
use crate::ui::{
    forms::{CustomerForm, DetailView, FormOutcome, LiveEventForm, WizardWindow},
    table::{filter_label, show_list, ListAction},
    toasts::ToastStack,
};

/// Issues listed in the import warning toast before it is truncated.
const IMPORT_ISSUE_PREVIEW: usize = 5;

const REAUTH_HINT: &str =
    "Authentication failed; set PAYONLIVE_API_TOKEN or pass --token and restart";

fn default_export_dir() -> Option<PathBuf> {
    dirs::download_dir()
        .or_else(dirs::desktop_dir)
        .or_else(dirs::document_dir)
        .or_else(dirs::home_dir)
}

pub fn import_summary(response: &ImportResponse) -> String {
    let summary = response.summary;
    format!(
        "Imported {} of {} rows ({} failed, {} duplicates).",
        summary.successful, summary.total, summary.failed, summary.duplicates
    )
}

/// `None` when the import reported no per-row problems.
pub fn import_issues(response: &ImportResponse) -> Option<String> {
    let issues: Vec<String> = response
        .details
        .failed
        .iter()
        .map(|issue| format!("Failed {}", issue.describe()))
        .chain(
            response
                .details
                .duplicates
                .iter()
                .map(|issue| format!("Duplicate {}", issue.describe())),
        )
        .collect();
    if issues.is_empty() {
        return None;
    }
    let mut lines: Vec<String> = issues.iter().take(IMPORT_ISSUE_PREVIEW).cloned().collect();
    if issues.len() > IMPORT_ISSUE_PREVIEW {
        lines.push(format!("…and {} more", issues.len() - IMPORT_ISSUE_PREVIEW));
    }
    Some(lines.join("\n"))
}

pub struct DashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    notifications: Arc<NotificationCenter>,
    lists: EntityLists,
    active: EntityKind,
    mounted: Option<EntityKind>,
    status: String,
    detail: Option<DetailView>,
    wizard: Option<WizardWindow>,
    customer_form: Option<CustomerForm>,
    live_event_form: Option<LiveEventForm>,
    pending_delete: Option<(EntityKind, EntityId)>,
    toasts: ToastStack,
}

impl DashboardApp {
    /// Builds the shell and mounts the products tab.
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        let notifier: Arc<dyn Notifier> = notifications.clone();
        let mut app = Self {
            cmd_tx,
            ui_rx,
            notifications,
            lists: EntityLists::new(notifier),
            active: EntityKind::Product,
            mounted: None,
            status: "Starting backend worker".to_string(),
            detail: None,
            wizard: None,
            customer_form: None,
            live_event_form: None,
            pending_delete: None,
            toasts: ToastStack::default(),
        };
        app.mount(EntityKind::Product);
        app
    }

    pub fn active(&self) -> EntityKind {
        self.active
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status)
    }

    /// Unmounts the current tab (aborting its load) and loads `kind` fresh.
    pub fn mount(&mut self, kind: EntityKind) {
        if let Some(previous) = self.mounted.take() {
            if previous != kind {
                self.dispatch(BackendCommand::CancelLoad { kind: previous });
            }
        }
        self.active = kind;
        self.mounted = Some(kind);
        self.pending_delete = None;
        self.reload(kind);
    }

    pub fn reload(&mut self, kind: EntityKind) {
        let ticket = self.lists.begin_load(kind);
        self.dispatch(BackendCommand::Load { kind, ticket });
    }

    fn reload_if_mounted(&mut self, kind: EntityKind) {
        if self.mounted == Some(kind) {
            self.reload(kind);
        }
    }

    fn report(&mut self, error: UiError) {
        tracing::warn!(context = ?error.context(), category = ?error.category(), "{}", error.message());
        self.notifications.error(error.title(), error.message());
        self.status = if error.requires_reauth() {
            REAUTH_HINT.to_string()
        } else {
            error.message().to_string()
        };
    }

    pub fn request_bulk_delete(&mut self, kind: EntityKind) {
        if let BulkDeletePrompt::ConfirmationRequired { ids } = self.lists.request_bulk_delete(kind)
        {
            tracing::debug!(%kind, count = ids.len(), "bulk delete awaiting confirmation");
        }
    }

    pub fn confirm_bulk_delete(&mut self, kind: EntityKind) {
        if let Some(ids) = self.lists.confirm_bulk_delete(kind) {
            self.status = format!("Deleting {} {}…", ids.len(), kind.plural());
            self.dispatch(BackendCommand::BulkDelete { kind, ids });
        }
    }

    pub fn request_export(&mut self, kind: EntityKind, ids: Vec<EntityId>, path: PathBuf) {
        self.status = format!("Exporting {}…", kind.plural());
        self.dispatch(BackendCommand::Export { kind, ids, path });
    }

    pub fn request_import(&mut self, kind: EntityKind, path: PathBuf) {
        self.status = format!("Importing {} from {}…", kind.plural(), path.display());
        self.dispatch(BackendCommand::Import { kind, path });
    }

    pub fn open_detail(&mut self, kind: EntityKind, id: EntityId) {
        self.detail = Some(DetailView::loading(kind, id.clone()));
        self.dispatch(BackendCommand::Detail { kind, id });
    }

    fn open_create(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Product => self.wizard = Some(WizardWindow::default()),
            EntityKind::Customer => self.customer_form = Some(CustomerForm::create()),
            EntityKind::LiveEvent => self.live_event_form = Some(LiveEventForm::create()),
            EntityKind::Order | EntityKind::Payment => {}
        }
    }

    fn open_edit(&mut self, kind: EntityKind, id: &EntityId) {
        match kind {
            EntityKind::Customer => {
                self.customer_form = self
                    .lists
                    .customers
                    .items()
                    .iter()
                    .find(|row| &row.id == id)
                    .map(CustomerForm::edit);
            }
            EntityKind::LiveEvent => {
                self.live_event_form = self
                    .lists
                    .live_events
                    .items()
                    .iter()
                    .find(|row| &row.id == id)
                    .map(LiveEventForm::edit);
            }
            _ => {}
        }
    }

    fn submit_form(&mut self, kind: EntityKind, id: Option<EntityId>, body: serde_json::Value) {
        let sent = match id {
            Some(id) => self.dispatch(BackendCommand::Update { kind, id, body }),
            None => self.dispatch(BackendCommand::Create { kind, body }),
        };
        if !sent {
            self.form_failed(kind);
        }
    }

    fn form_failed(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Product => {
                if let Some(window) = self.wizard.as_mut() {
                    window.save_failed();
                }
            }
            EntityKind::Customer => {
                if let Some(form) = self.customer_form.as_mut() {
                    form.save_failed();
                }
            }
            EntityKind::LiveEvent => {
                if let Some(form) = self.live_event_form.as_mut() {
                    form.save_failed();
                }
            }
            EntityKind::Order | EntityKind::Payment => {}
        }
    }

    fn close_form(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Product => self.wizard = None,
            EntityKind::Customer => self.customer_form = None,
            EntityKind::LiveEvent => self.live_event_form = None,
            EntityKind::Order | EntityKind::Payment => {}
        }
    }

    pub fn handle_list_action(&mut self, kind: EntityKind, action: ListAction) {
        match action {
            ListAction::Reload => self.reload(kind),
            ListAction::Add => self.open_create(kind),
            ListAction::Export { ids } => {
                let mut dialog = rfd::FileDialog::new()
                    .set_file_name(kind.export_file_name())
                    .add_filter("Excel", &["xlsx"]);
                if let Some(dir) = default_export_dir() {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.save_file() {
                    self.request_export(kind, ids, path);
                }
            }
            ListAction::Import => {
                let mut dialog = rfd::FileDialog::new().add_filter("Excel", &["xlsx", "xls"]);
                if let Some(dir) = default_export_dir() {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_file() {
                    self.request_import(kind, path);
                }
            }
            ListAction::RequestBulkDelete => self.request_bulk_delete(kind),
            ListAction::View(id) => self.open_detail(kind, id),
            ListAction::Edit(id) => self.open_edit(kind, &id),
            ListAction::Delete(id) => self.pending_delete = Some((kind, id)),
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Error(error) => self.report(error),
            UiEvent::ListLoaded {
                kind,
                ticket,
                result,
            } => {
                let auth_failure = result
                    .as_ref()
                    .err()
                    .map(|err| {
                        UiError::from_client_error(UiErrorContext::Load, err, "").requires_reauth()
                    })
                    .unwrap_or(false);
                if self.lists.finish_load(kind, ticket, result) && auth_failure {
                    self.status = REAUTH_HINT.to_string();
                }
            }
            UiEvent::DetailLoaded { kind, id, result } => {
                let Some(detail) = self
                    .detail
                    .as_mut()
                    .filter(|detail| detail.kind == kind && detail.id == id)
                else {
                    return;
                };
                detail.state = match result {
                    Ok(record) => RemoteResource::Ready(record),
                    Err(err) => RemoteResource::Failed(err.user_message(&format!(
                        "Failed to load {}.",
                        kind.label().to_lowercase()
                    ))),
                };
            }
            UiEvent::Saved { kind, id, result } => match result {
                Ok(response) => {
                    let verb = if id.is_some() { "updated" } else { "created" };
                    let message = response
                        .message
                        .unwrap_or_else(|| format!("{} {verb}.", kind.label()));
                    tracing::info!(%kind, "{} {verb}", kind.label());
                    self.notifications.success("Saved", &message);
                    self.close_form(kind);
                    self.reload_if_mounted(kind);
                }
                Err(err) => {
                    self.form_failed(kind);
                    self.report(UiError::from_client_error(
                        UiErrorContext::Save,
                        &err,
                        &format!("Failed to save {}.", kind.label().to_lowercase()),
                    ));
                }
            },
            UiEvent::Deleted { kind, id, result } => {
                self.lists.apply_delete(kind, &id, result);
            }
            UiEvent::BulkDeleted { kind, ids, result } => {
                self.status = match self.lists.apply_bulk_delete(kind, &ids, result) {
                    BulkDeleteOutcome::Deleted { count } => {
                        format!("Deleted {count} {}", kind.plural())
                    }
                    BulkDeleteOutcome::PartiallyDeleted { deleted, failed } => format!(
                        "Deleted {deleted} {}; {} still selected",
                        kind.plural(),
                        failed.len()
                    ),
                    BulkDeleteOutcome::Failed { message } => message,
                };
            }
            UiEvent::Exported { kind, result } => match result {
                Ok(path) => {
                    self.status = format!("Exported {} to {}", kind.plural(), path.display());
                    self.notifications.success(
                        "Exported",
                        &format!("Saved {} to {}.", kind.plural(), path.display()),
                    );
                }
                Err(err) => self.report(UiError::from_client_error(
                    UiErrorContext::Export,
                    &err,
                    &format!("Failed to export {}.", kind.plural()),
                )),
            },
            UiEvent::Imported { kind, result } => match result {
                Ok(response) => {
                    let summary = import_summary(&response);
                    self.status = summary.clone();
                    self.notifications.success("Import finished", &summary);
                    if let Some(issues) = import_issues(&response) {
                        self.notifications.warning("Some rows were skipped", &issues);
                    }
                    self.reload_if_mounted(kind);
                }
                Err(err) => self.report(UiError::from_client_error(
                    UiErrorContext::Import,
                    &err,
                    &format!("Failed to import {}.", kind.plural()),
                )),
            },
        }
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn show_tabs(&mut self, ctx: &egui::Context) {
        let mut selected = self.active;
        egui::TopBottomPanel::top("entity_tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("PayOnLive Admin");
                ui.separator();
                for kind in EntityKind::ALL {
                    let mut title = filter_label(kind.plural());
                    if self.lists.is_loading(kind) {
                        title.push_str(" ⟳");
                    }
                    if ui.selectable_label(selected == kind, title).clicked() {
                        selected = kind;
                    }
                }
            });
        });
        if selected != self.active {
            self.mount(selected);
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(self.status.as_str());
            });
        });
    }

    fn show_bulk_delete_confirm(&mut self, ctx: &egui::Context) {
        let kind = self.active;
        let Some(count) = self.lists.pending_bulk_delete(kind).map(|ids| ids.len()) else {
            return;
        };
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Delete {} selected {}? This cannot be undone.",
                    count,
                    kind.plural()
                ));
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
        if confirmed {
            self.confirm_bulk_delete(kind);
        } else if cancelled {
            self.lists.cancel_bulk_delete(kind);
        }
    }

    fn show_delete_confirm(&mut self, ctx: &egui::Context) {
        let Some((kind, id)) = self.pending_delete.clone() else {
            return;
        };
        let mut confirmed = false;
        let mut open = true;
        egui::Window::new("Delete record")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("Delete {} {id}?", kind.label().to_lowercase()));
                if ui.button("Delete").clicked() {
                    confirmed = true;
                }
            });
        if confirmed {
            self.pending_delete = None;
            self.dispatch(BackendCommand::Delete { kind, id });
        } else if !open {
            self.pending_delete = None;
        }
    }

    fn show_forms(&mut self, ctx: &egui::Context) {
        let mut outcomes = Vec::new();
        if let Some(window) = self.wizard.as_mut() {
            outcomes.push((EntityKind::Product, window.show(ctx)));
        }
        if let Some(form) = self.customer_form.as_mut() {
            outcomes.push((EntityKind::Customer, form.show(ctx)));
        }
        if let Some(form) = self.live_event_form.as_mut() {
            outcomes.push((EntityKind::LiveEvent, form.show(ctx)));
        }
        for (kind, outcome) in outcomes {
            match outcome {
                FormOutcome::Open => {}
                FormOutcome::Submit { id, body } => self.submit_form(kind, id, body),
                FormOutcome::Closed => self.close_form(kind),
            }
        }

        if let Some(detail) = self.detail.as_ref() {
            if !detail.show(ctx) {
                self.detail = None;
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.show_tabs(ctx);
        self.show_status_bar(ctx);

        let kind = self.active;
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                with_list!(self.lists, kind, list => show_list(ui, list))
            })
            .inner;
        for action in actions {
            self.handle_list_action(kind, action);
        }

        self.show_bulk_delete_confirm(ctx);
        self.show_delete_confirm(ctx);
        self.show_forms(ctx);
        self.toasts.show(ctx, &self.notifications);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
