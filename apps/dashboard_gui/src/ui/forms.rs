//! Modal windows: product wizard, customer/live event forms, record detail.

use client_core::{
    resource::RemoteResource,
    rows::{CustomerRow, LiveEventRow},
    validation::{
        CustomerDraft, FieldErrors, LiveEventDraft, CUSTOMER_STATUSES, PRODUCT_STATUSES,
    },
    wizard::{ProductWizard, WizardStep},
};
use eframe::egui;
use serde_json::Value;
use shared::domain::{EntityId, EntityKind};

use super::table::filter_label;

pub const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Open,
    Submit { id: Option<EntityId>, body: Value },
    Closed,
}

pub fn field(ui: &mut egui::Ui, label: &str, value: &mut String, error: Option<&str>) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(value).desired_width(320.0));
    if let Some(error) = error {
        ui.colored_label(ERROR_COLOR, error);
    }
    ui.add_space(4.0);
}

fn choice(
    ui: &mut egui::Ui,
    salt: &str,
    label: &str,
    value: &mut String,
    options: &[&str],
    error: Option<&str>,
) {
    ui.label(label);
    egui::ComboBox::from_id_salt(salt)
        .selected_text(filter_label(value))
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, option.to_string(), filter_label(option));
            }
        });
    if let Some(error) = error {
        ui.colored_label(ERROR_COLOR, error);
    }
    ui.add_space(4.0);
}

/// Drafts that can be edited in a single-page [`EntityForm`].
pub trait FormDraft: Default {
    const KIND: EntityKind;

    fn validate(&self) -> Result<Value, FieldErrors>;

    fn edit_fields(&mut self, ui: &mut egui::Ui, errors: &FieldErrors);
}

impl FormDraft for CustomerDraft {
    const KIND: EntityKind = EntityKind::Customer;

    fn validate(&self) -> Result<Value, FieldErrors> {
        CustomerDraft::validate(self)
    }

    fn edit_fields(&mut self, ui: &mut egui::Ui, errors: &FieldErrors) {
        field(ui, "Name", &mut self.name, errors.get("name"));
        field(ui, "Email", &mut self.email, errors.get("email"));
        field(ui, "Phone (optional)", &mut self.phone, errors.get("phone"));
        choice(
            ui,
            "customer_status",
            "Status",
            &mut self.status,
            CUSTOMER_STATUSES,
            errors.get("status"),
        );
    }
}

impl FormDraft for LiveEventDraft {
    const KIND: EntityKind = EntityKind::LiveEvent;

    fn validate(&self) -> Result<Value, FieldErrors> {
        LiveEventDraft::validate(self)
    }

    fn edit_fields(&mut self, ui: &mut egui::Ui, errors: &FieldErrors) {
        field(ui, "Title", &mut self.title, errors.get("title"));
        field(ui, "Host", &mut self.host, errors.get("host"));
        field(
            ui,
            "Scheduled at (YYYY-MM-DD HH:MM)",
            &mut self.scheduled_at,
            errors.get("scheduled_at"),
        );
        ui.label("Description");
        ui.add(
            egui::TextEdit::multiline(&mut self.description)
                .desired_rows(3)
                .desired_width(320.0),
        );
    }
}

pub struct EntityForm<D: FormDraft> {
    editing: Option<EntityId>,
    pub draft: D,
    errors: FieldErrors,
    saving: bool,
}

pub type CustomerForm = EntityForm<CustomerDraft>;
pub type LiveEventForm = EntityForm<LiveEventDraft>;

impl<D: FormDraft> EntityForm<D> {
    pub fn create() -> Self {
        Self::with_draft(None, D::default())
    }

    pub fn with_draft(editing: Option<EntityId>, draft: D) -> Self {
        Self {
            editing,
            draft,
            errors: FieldErrors::default(),
            saving: false,
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Validates the draft; on success the form stays locked until
    /// [`Self::save_failed`] or the window closes.
    pub fn submit(&mut self) -> FormOutcome {
        match self.draft.validate() {
            Ok(body) => {
                self.errors = FieldErrors::default();
                self.saving = true;
                FormOutcome::Submit {
                    id: self.editing.clone(),
                    body,
                }
            }
            Err(errors) => {
                self.errors = errors;
                FormOutcome::Open
            }
        }
    }

    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    pub fn title(&self) -> String {
        let label = D::KIND.label().to_lowercase();
        match self.editing {
            Some(_) => format!("Edit {label}"),
            None => format!("New {label}"),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> FormOutcome {
        let mut open = true;
        let mut outcome = FormOutcome::Open;
        egui::Window::new(self.title())
            .id(egui::Id::new(("entity_form", D::KIND.plural())))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!self.saving, |ui| {
                    self.draft.edit_fields(ui, &self.errors);
                });
                ui.separator();
                ui.horizontal(|ui| {
                    let label = if self.editing.is_some() { "Save" } else { "Create" };
                    if ui
                        .add_enabled(!self.saving, egui::Button::new(label))
                        .clicked()
                    {
                        outcome = self.submit();
                    }
                    if ui.button("Cancel").clicked() {
                        outcome = FormOutcome::Closed;
                    }
                    if self.saving {
                        ui.spinner();
                    }
                });
            });
        if open {
            outcome
        } else {
            FormOutcome::Closed
        }
    }
}

impl CustomerForm {
    pub fn edit(row: &CustomerRow) -> Self {
        Self::with_draft(Some(row.id.clone()), CustomerDraft::from_row(row))
    }
}

impl LiveEventForm {
    pub fn edit(row: &LiveEventRow) -> Self {
        Self::with_draft(Some(row.id.clone()), LiveEventDraft::from_row(row))
    }
}

#[derive(Default)]
pub struct WizardWindow {
    pub wizard: ProductWizard,
    saving: bool,
}

impl WizardWindow {
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    pub fn submit(&mut self) -> FormOutcome {
        match self.wizard.submit() {
            Ok(body) => {
                self.saving = true;
                FormOutcome::Submit { id: None, body }
            }
            Err(_) => FormOutcome::Open,
        }
    }

    fn step_fields(&mut self, ui: &mut egui::Ui) {
        let errors = self.wizard.errors().clone();
        let step = self.wizard.step();
        let draft = &mut self.wizard.draft;
        match step {
            WizardStep::Basics => {
                field(ui, "Name", &mut draft.name, errors.get("name"));
                field(ui, "SKU", &mut draft.sku, errors.get("sku"));
                field(ui, "Category", &mut draft.category, errors.get("category"));
                ui.label("Description");
                ui.add(
                    egui::TextEdit::multiline(&mut draft.description)
                        .desired_rows(3)
                        .desired_width(320.0),
                );
            }
            WizardStep::Pricing => {
                field(ui, "Price (€)", &mut draft.price, errors.get("price"));
            }
            WizardStep::Inventory => {
                field(ui, "Stock", &mut draft.stock, errors.get("stock"));
                choice(
                    ui,
                    "product_status",
                    "Status",
                    &mut draft.status,
                    PRODUCT_STATUSES,
                    errors.get("status"),
                );
            }
            WizardStep::Review => {
                egui::Grid::new("product_review")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (label, value) in [
                            ("Name", &draft.name),
                            ("SKU", &draft.sku),
                            ("Category", &draft.category),
                            ("Price", &draft.price),
                            ("Stock", &draft.stock),
                            ("Status", &draft.status),
                        ] {
                            ui.strong(label);
                            ui.label(value.as_str());
                            ui.end_row();
                        }
                    });
                for (field, message) in errors.iter() {
                    ui.colored_label(ERROR_COLOR, format!("{field}: {message}"));
                }
            }
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> FormOutcome {
        let mut open = true;
        let mut outcome = FormOutcome::Open;
        egui::Window::new("New product")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for step in WizardStep::ALL {
                        let text = format!("{}. {}", step.index() + 1, step.title());
                        if step == self.wizard.step() {
                            ui.strong(text);
                        } else {
                            ui.weak(text);
                        }
                    }
                });
                ui.separator();
                ui.add_enabled_ui(!self.saving, |ui| self.step_fields(ui));
                ui.separator();
                ui.horizontal(|ui| {
                    let step = self.wizard.step();
                    if ui
                        .add_enabled(
                            !self.saving && step != WizardStep::Basics,
                            egui::Button::new("Back"),
                        )
                        .clicked()
                    {
                        self.wizard.back();
                    }
                    if step == WizardStep::Review {
                        if ui
                            .add_enabled(!self.saving, egui::Button::new("Create product"))
                            .clicked()
                        {
                            outcome = self.submit();
                        }
                    } else if ui.button("Next").clicked() {
                        self.wizard.next();
                    }
                    if ui.button("Cancel").clicked() {
                        outcome = FormOutcome::Closed;
                    }
                    if self.saving {
                        ui.spinner();
                    }
                });
            });
        if open {
            outcome
        } else {
            FormOutcome::Closed
        }
    }
}

pub struct DetailView {
    pub kind: EntityKind,
    pub id: EntityId,
    pub state: RemoteResource<Value>,
}

impl DetailView {
    pub fn loading(kind: EntityKind, id: EntityId) -> Self {
        Self {
            kind,
            id,
            state: RemoteResource::Loading,
        }
    }

    /// Returns `false` once the user closes the window.
    pub fn show(&self, ctx: &egui::Context) -> bool {
        let mut open = true;
        egui::Window::new(format!("{} {}", self.kind.label(), self.id))
            .id(egui::Id::new("detail_view"))
            .open(&mut open)
            .default_width(420.0)
            .show(ctx, |ui| match &self.state {
                RemoteResource::Idle | RemoteResource::Loading => {
                    ui.spinner();
                }
                RemoteResource::Failed(message) => {
                    ui.colored_label(ERROR_COLOR, message.as_str());
                }
                RemoteResource::Ready(record) => {
                    egui::ScrollArea::vertical().max_height(480.0).show(ui, |ui| {
                        egui::Grid::new("detail_fields")
                            .num_columns(2)
                            .striped(true)
                            .show(ui, |ui| {
                                for (key, value) in detail_fields(record) {
                                    ui.strong(key);
                                    ui.label(value);
                                    ui.end_row();
                                }
                            });
                    });
                }
            });
        open
    }
}

/// Flattens a record into label/value pairs; nested values render as JSON.
pub fn detail_fields(record: &Value) -> Vec<(String, String)> {
    match record {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text.clone(),
                    Value::Null => "—".to_string(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect(),
        other => vec![("value".to_string(), other.to_string())],
    }
}
