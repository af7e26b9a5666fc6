//! Student Arrears DSS - Arrears Monitoring Dashboard
//!
//! Loads a CSV of student fee records, classifies arrears risk and priority,
//! and shows filtered KPIs, charts and a table with CSV export.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use config::DashboardConfig;
use eframe::egui;
use gui::ArrearsApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::load_or_default();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Student Arrears Monitoring System"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Student Arrears DSS",
        options,
        Box::new(|cc| Ok(Box::new(ArrearsApp::new(cc, config)))),
    )
}
