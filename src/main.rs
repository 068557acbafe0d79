#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use gantt_timeline::config::AppConfig;
use gantt_timeline::logging;

fn main() -> eframe::Result<()> {
    let config_path = AppConfig::default_path();
    let (config, config_error) = match AppConfig::load_from(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Warning: {}", e);
    }
    if let Some(e) = config_error {
        tracing::warn!(path = %config_path.display(), error = %e, "using default configuration");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Gantt Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Timeline",
        options,
        Box::new(move |cc| Ok(Box::new(app::GanttApp::new(cc, config, config_path)))),
    )
}
