#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod error;
mod export;
mod io;
mod layout;
mod model;
mod ui;

use tracing_subscriber::EnvFilter;

use config::AppSettings;

fn init_logging(settings: &AppSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> eframe::Result<()> {
    let settings_path = AppSettings::default_path();
    let settings = AppSettings::load(&settings_path);
    init_logging(&settings);
    tracing::info!(settings = %settings_path.display(), data = %settings.data_dir().display(), "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 480.0])
            .with_title("Timeline Board"),
        ..Default::default()
    };

    eframe::run_native(
        "Timeline Board",
        options,
        Box::new(|cc| Ok(Box::new(app::TimelineApp::new(cc, settings, settings_path)))),
    )
}
