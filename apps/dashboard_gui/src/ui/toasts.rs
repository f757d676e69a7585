//! Bottom-right toast stack over the shared notification queue.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use client_core::notifications::{Notification, NotificationCenter, NotificationLevel};
use eframe::egui;

pub const TOAST_LIFETIME: Duration = Duration::from_secs(6);

#[derive(Debug, Default)]
pub struct ToastStack {
    first_seen: HashMap<u64, Instant>,
}

impl ToastStack {
    /// Non-error toasts older than [`TOAST_LIFETIME`]. Errors stay until the
    /// user dismisses them.
    pub fn expired_ids(&mut self, pending: &[Notification], now: Instant) -> Vec<u64> {
        self.first_seen
            .retain(|id, _| pending.iter().any(|item| item.id == *id));
        pending
            .iter()
            .filter(|item| {
                let seen = *self.first_seen.entry(item.id).or_insert(now);
                item.level != NotificationLevel::Error
                    && now.saturating_duration_since(seen) >= TOAST_LIFETIME
            })
            .map(|item| item.id)
            .collect()
    }

    pub fn show(&mut self, ctx: &egui::Context, center: &NotificationCenter) {
        let pending = center.pending();
        for id in self.expired_ids(&pending, Instant::now()) {
            center.dismiss(id);
        }

        let visible: Vec<Notification> = center.pending();
        if visible.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toast_stack"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -40.0))
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                for item in visible.iter().rev().take(5).rev() {
                    let accent = level_color(item.level);
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, accent))
                        .show(ui, |ui| {
                            ui.set_min_width(280.0);
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&item.title).strong().color(accent));
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("✕").clicked() {
                                            center.dismiss(item.id);
                                        }
                                    },
                                );
                            });
                            ui.label(item.message.as_str());
                        });
                    ui.add_space(6.0);
                }
            });
    }
}

fn level_color(level: NotificationLevel) -> egui::Color32 {
    match level {
        NotificationLevel::Info => egui::Color32::from_rgb(110, 160, 230),
        NotificationLevel::Success => egui::Color32::from_rgb(90, 180, 120),
        NotificationLevel::Warning => egui::Color32::from_rgb(225, 170, 70),
        NotificationLevel::Error => egui::Color32::from_rgb(220, 80, 80),
    }
}
