//! UI layer for the dashboard: app shell, list panel, forms and toasts.

pub mod app;
pub mod forms;
pub mod table;
pub mod toasts;

pub use app::DashboardApp;
