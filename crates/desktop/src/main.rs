//! Bihua admin console: desktop entry.

mod app;
mod logger;
mod tasks;
mod views;

use anyhow::Context as _;
use eframe::egui;
use std::sync::Arc;

use lib::auth::FileTokenStore;
use lib::config;

fn main() -> anyhow::Result<()> {
    logger::init();
    let (config, config_path) = config::load_config(None)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let token_store = Arc::new(FileTokenStore::in_dir(&config::config_dir(&config_path)));
    let startup = app::Startup {
        config,
        config_path,
        token_store,
        runtime,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Bihua",
        options,
        Box::new(|cc| Box::new(app::AdminApp::new(cc, startup))),
    )
    .map_err(|e| anyhow::anyhow!("desktop exited with error: {}", e))
}
