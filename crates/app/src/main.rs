mod state;
mod ui;

use eframe::egui;
use state::AppState;
use std::path::PathBuf;

const LAST_FILE_KEY: &str = "last_topics_file";

struct BubblesApp {
    state: AppState,
}

impl BubblesApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut state = AppState::new();
        if let Some(last) = cc.storage.and_then(|s| s.get_string(LAST_FILE_KEY)) {
            let path = PathBuf::from(last);
            if path.is_file() {
                state.start_load(path);
            }
        }
        Self { state }
    }
}

impl eframe::App for BubblesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(file) = &self.state.file {
            storage.set_string(LAST_FILE_KEY, file.display().to_string());
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Topic Bubbles",
        options,
        Box::new(|cc| Ok(Box::new(BubblesApp::new(cc)))),
    )
}
