//! Generic list panel: toolbar, search, filter tabs, sortable grid, pager.

use client_core::{
    controller::ListController,
    resource::RemoteResource,
    rows::ListRow,
    view::ALL_FILTER,
};
use eframe::egui;
use shared::domain::{EntityId, EntityKind, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Reload,
    Add,
    Export { ids: Vec<EntityId> },
    Import,
    RequestBulkDelete,
    View(EntityId),
    Edit(EntityId),
    Delete(EntityId),
}

pub fn can_create(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Product | EntityKind::Customer | EntityKind::LiveEvent
    )
}

pub fn can_edit(kind: EntityKind) -> bool {
    matches!(kind, EntityKind::Customer | EntityKind::LiveEvent)
}

/// `out_of_stock` -> `Out of stock`.
pub fn filter_label(filter: &str) -> String {
    let spaced = filter.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn header_label(label: &str, key: &str, sort: Option<(&str, SortDirection)>) -> String {
    match sort {
        Some((active, SortDirection::Ascending)) if active == key => format!("{label} ⏶"),
        Some((active, SortDirection::Descending)) if active == key => format!("{label} ⏷"),
        _ => label.to_string(),
    }
}

struct VisibleRow {
    id: EntityId,
    cells: Vec<String>,
    selected: bool,
}

fn toolbar<R: ListRow>(ui: &mut egui::Ui, list: &ListController<R>, actions: &mut Vec<ListAction>) {
    let kind = R::KIND;
    let selected = list.selected_count();
    ui.horizontal(|ui| {
        if ui.button("⟳ Reload").clicked() {
            actions.push(ListAction::Reload);
        }
        if can_create(kind) && ui.button(format!("➕ Add {}", kind.label().to_lowercase())).clicked()
        {
            actions.push(ListAction::Add);
        }
        ui.separator();
        let export_label = if selected > 0 {
            format!("Export selected ({selected})")
        } else {
            "Export all".to_string()
        };
        if ui.button(export_label).clicked() {
            actions.push(ListAction::Export {
                ids: list.selected_ids(),
            });
        }
        if ui.button("Import…").clicked() {
            actions.push(ListAction::Import);
        }
        ui.separator();
        let delete = ui.add_enabled(
            selected > 0,
            egui::Button::new(format!("🗑 Delete selected ({selected})")),
        );
        if delete.clicked() {
            actions.push(ListAction::RequestBulkDelete);
        }
    });
}

fn search_and_filter<R: ListRow>(ui: &mut egui::Ui, list: &mut ListController<R>) {
    ui.horizontal(|ui| {
        let mut search = list.query().search.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut search)
                .hint_text(format!("Search {}…", R::KIND.plural()))
                .desired_width(280.0),
        );
        if response.changed() {
            list.set_search(search);
        }

        let mut filter = list.query().filter.clone();
        egui::ComboBox::from_id_salt(("list_filter", R::KIND.plural()))
            .selected_text(filter_label(&filter))
            .show_ui(ui, |ui| {
                for option in R::KIND.filters() {
                    ui.selectable_value(&mut filter, option.to_string(), filter_label(option));
                }
            });
        if filter != list.query().filter {
            list.set_filter(filter);
        }
        if list.query().filter != ALL_FILTER && ui.small_button("Clear filter").clicked() {
            list.set_filter(ALL_FILTER);
        }
    });
}

pub fn show_list<R: ListRow>(ui: &mut egui::Ui, list: &mut ListController<R>) -> Vec<ListAction> {
    let mut actions = Vec::new();
    toolbar(ui, list, &mut actions);
    ui.add_space(6.0);

    match list.state() {
        RemoteResource::Idle => {
            ui.weak(format!("{} not loaded yet.", R::KIND.label()));
            return actions;
        }
        RemoteResource::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Loading {}…", R::KIND.plural()));
            });
            return actions;
        }
        RemoteResource::Failed(message) => {
            ui.colored_label(egui::Color32::from_rgb(220, 80, 80), message.as_str());
            if ui.button("Retry").clicked() {
                actions.push(ListAction::Reload);
            }
            return actions;
        }
        RemoteResource::Ready(_) => {}
    }

    search_and_filter(ui, list);
    ui.add_space(6.0);

    let (rows, filtered_count, total_pages, page, has_previous, has_next) = {
        let view = list.view();
        let rows: Vec<VisibleRow> = view
            .rows
            .iter()
            .map(|row| VisibleRow {
                id: row.id().clone(),
                cells: R::COLUMNS.iter().map(|column| row.cell(column.key)).collect(),
                selected: list.is_selected(row.id()),
            })
            .collect();
        (
            rows,
            view.filtered_count,
            view.total_pages,
            view.page,
            view.has_previous(),
            view.has_next(),
        )
    };

    if filtered_count == 0 {
        ui.weak(format!("No {} match the current search.", R::KIND.plural()));
        return actions;
    }

    let sort = list
        .query()
        .sort
        .as_ref()
        .map(|spec| (spec.key.clone(), spec.direction));
    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .max_height((ui.available_height() - 36.0).max(120.0))
        .show(ui, |ui| {
            egui::Grid::new(("list_grid", R::KIND.plural()))
                .striped(true)
                .num_columns(R::COLUMNS.len() + 2)
                .show(ui, |ui| {
                    let mut all_selected = list.all_visible_selected();
                    if ui
                        .checkbox(&mut all_selected, "")
                        .on_hover_text("Select every row on this page")
                        .changed()
                    {
                        list.toggle_select_all();
                    }
                    for column in R::COLUMNS {
                        let text = header_label(
                            column.label,
                            column.key,
                            sort.as_ref().map(|(key, dir)| (key.as_str(), *dir)),
                        );
                        if ui
                            .add(egui::Button::new(egui::RichText::new(text).strong()).frame(false))
                            .clicked()
                        {
                            list.sort_by(column.key);
                        }
                    }
                    ui.label("");
                    ui.end_row();

                    for row in &rows {
                        let mut checked = row.selected;
                        if ui.checkbox(&mut checked, "").changed() {
                            list.toggle_row_selection(&row.id);
                        }
                        for (cell, column) in row.cells.iter().zip(R::COLUMNS) {
                            if column.numeric {
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| ui.label(cell),
                                );
                            } else {
                                ui.label(cell);
                            }
                        }
                        ui.horizontal(|ui| {
                            if ui.small_button("View").clicked() {
                                actions.push(ListAction::View(row.id.clone()));
                            }
                            if can_edit(R::KIND) && ui.small_button("Edit").clicked() {
                                actions.push(ListAction::Edit(row.id.clone()));
                            }
                            if ui.small_button("Delete").clicked() {
                                actions.push(ListAction::Delete(row.id.clone()));
                            }
                        });
                        ui.end_row();
                    }
                });
        });

    ui.separator();
    ui.horizontal(|ui| {
        if ui
            .add_enabled(has_previous, egui::Button::new("◀ Previous"))
            .clicked()
        {
            list.previous_page();
        }
        ui.label(format!(
            "Page {page} of {total_pages} · {filtered_count} {}",
            R::KIND.plural()
        ));
        if ui
            .add_enabled(has_next, egui::Button::new("Next ▶"))
            .clicked()
        {
            list.next_page();
        }
        if page > total_pages && ui.small_button("Back to first page").clicked() {
            list.set_page(1);
        }
    });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_labels_are_human_readable() {
        assert_eq!(filter_label("out_of_stock"), "Out of stock");
        assert_eq!(filter_label("all"), "All");
        assert_eq!(filter_label(""), "");
    }

    #[test]
    fn header_marks_active_sort_column() {
        assert_eq!(
            header_label("Price", "price", Some(("price", SortDirection::Descending))),
            "Price ⏷"
        );
        assert_eq!(
            header_label("Name", "name", Some(("price", SortDirection::Ascending))),
            "Name"
        );
        assert_eq!(header_label("Name", "name", None), "Name");
    }

    #[test]
    fn only_some_kinds_have_forms() {
        assert!(can_create(EntityKind::Product));
        assert!(!can_create(EntityKind::Payment));
        assert!(can_edit(EntityKind::LiveEvent));
        assert!(!can_edit(EntityKind::Product));
    }
}
