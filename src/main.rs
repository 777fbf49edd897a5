mod app;
mod ui;

use app::HeartExplorerApp;
use clap::Parser;
use eframe::egui;
use heart_explorer::config::Config;
use heart_explorer::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::parse();

    let mut state = AppState::new(config.clone());
    if let Some(uri) = &config.data {
        state.open(uri);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Heart Disease data exploration dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(HeartExplorerApp { state }))),
    )
}
