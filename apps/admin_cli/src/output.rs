//! Plain-text rendering for terminal output.

use client_core::{
    notifications::{Notification, NotificationLevel},
    rows::ListRow,
    view::DerivedView,
};
use shared::protocol::ImportResponse;

const MAX_CELL_WIDTH: usize = 32;

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

/// Id column first, then the kind's columns, padded to the widest cell.
pub fn render_table<R: ListRow>(rows: &[&R]) -> String {
    let mut header = vec!["ID".to_string()];
    header.extend(R::COLUMNS.iter().map(|column| column.label.to_string()));

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![clip(row.id().as_str())];
            cells.extend(R::COLUMNS.iter().map(|column| clip(&row.cell(column.key))));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&header)];
    out.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(body.iter().map(|cells| line(cells)));
    out.join("\n")
}

pub fn render_footer<R>(view: &DerivedView<'_, R>, plural: &str) -> String {
    if view.filtered_count == 0 {
        return format!("No {plural} found.");
    }
    format!(
        "Page {} of {} ({} {plural})",
        view.page, view.total_pages, view.filtered_count
    )
}

pub fn render_notification(notification: &Notification) -> String {
    let level = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    format!("[{level}] {}: {}", notification.title, notification.message)
}

pub fn render_import(response: &ImportResponse) -> String {
    let summary = response.summary;
    let mut lines = vec![format!(
        "Imported {} of {} rows ({} failed, {} duplicates)",
        summary.successful, summary.total, summary.failed, summary.duplicates
    )];
    if let Some(message) = response.message.as_deref() {
        lines.push(message.to_string());
    }
    lines.extend(
        response
            .details
            .failed
            .iter()
            .map(|issue| format!("  failed: {}", issue.describe())),
    );
    lines.extend(
        response
            .details
            .duplicates
            .iter()
            .map(|issue| format!("  duplicate: {}", issue.describe())),
    );
    lines.join("\n")
}

#[cfg(test)]
#[path = "tests/output_tests.rs"]
mod tests;
