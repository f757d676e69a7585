use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use clap::Parser;
use client_core::{
    notifications::NotificationCenter,
    settings::{load_settings_from, Settings, SETTINGS_FILE},
};
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use ui::DashboardApp;

#[derive(Debug, Parser)]
#[command(name = "dashboard_gui", about = "PayOnLive admin dashboard")]
struct Args {
    /// Overrides `api_url` from the settings file and environment.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    /// Settings file; defaults to ./payonlive.toml, then the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn settings_path(explicit: Option<PathBuf>, local: &Path, config_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if local.exists() {
        return local.to_path_buf();
    }
    config_dir
        .map(|dir| dir.join("payonlive").join(SETTINGS_FILE))
        .unwrap_or_else(|| local.to_path_buf())
}

fn resolve_settings(args: Args) -> Settings {
    let path = settings_path(args.config, Path::new(SETTINGS_FILE), dirs::config_dir());
    tracing::info!(path = %path.display(), "loading settings");
    let mut settings = load_settings_from(&path, |key| std::env::var(key).ok());
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(token) = args.token {
        settings.api_token = Some(token);
    }
    settings
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let settings = resolve_settings(Args::parse());

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(settings, cmd_rx, ui_tx);

    let notifications = Arc::new(NotificationCenter::default());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PayOnLive Admin")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "PayOnLive Admin",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(cmd_tx, ui_rx, notifications)))),
    )
}
