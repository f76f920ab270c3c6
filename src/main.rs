mod app;
mod color;
mod config;
mod data;
mod selection;
mod state;
mod ui;

use std::path::PathBuf;

use app::SalaryLensApp;
use config::ViewerConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::resolve(std::env::args_os().nth(1).map(PathBuf::from));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Salary Lens – Data Science Salaries",
        options,
        Box::new(|_cc| Ok(Box::new(SalaryLensApp::new(config)))),
    )
}
