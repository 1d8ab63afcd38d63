//! Analog Clock Widget, an always-on-top analog clock for the desktop
//!
//! Draws the face and hands from SVG assets, remembers where it sat relative
//! to its monitor, and quits when its window closes.

mod app;
mod input;
mod monitors;

use app::AnalogClockApp;
use clockcore::render::{render_icon, AssetSlot};
use clockcore::Settings;
use eframe::NativeOptions;
use std::path::PathBuf;
use std::sync::Arc;

const APP_NAME: &str = "Analog Clock Widget";
const DEFAULT_SIZE: [f32; 2] = [200.0, 200.0];
const ICON_SIDE: u32 = 64;

/// Load settings and write them straight back so every key is present on
/// disk from the first run on.
fn load_settings() -> (Settings, Option<PathBuf>) {
    let path = match Settings::default_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("settings will not be saved: {e}");
            return (Settings::default(), None);
        }
    };
    let settings = Settings::load_or_default(&path);
    if let Err(e) = settings.save_to(&path) {
        tracing::warn!(path = %path.display(), "could not rewrite settings: {e}");
    }
    tracing::info!(path = %path.display(), "settings loaded");
    (settings, Some(path))
}

fn load_icon(settings: &Settings) -> Option<egui::IconData> {
    let tree = AssetSlot::Preview
        .load(settings)
        .map_err(|e| tracing::warn!("no window icon: {e}"))
        .ok()?;
    let (rgba, side) = render_icon(&tree, ICON_SIDE)?;
    Some(egui::IconData {
        rgba,
        width: side,
        height: side,
    })
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (settings, settings_path) = load_settings();

    let mut viewport = egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size(DEFAULT_SIZE)
        .with_window_level(egui::WindowLevel::AlwaysOnTop)
        .with_transparent(true)
        .with_decorations(settings.framed)
        .with_taskbar(false);

    if let Some(rect) = settings.window_rect() {
        viewport = viewport
            .with_position([rect.left(), rect.top()])
            .with_inner_size([rect.size.width, rect.size.height]);
    }
    if let Some(icon) = load_icon(&settings) {
        viewport = viewport.with_icon(Arc::new(icon));
    }

    let options = NativeOptions {
        viewport,
        ..Default::default()
    };

    let result = eframe::run_native(
        APP_NAME,
        options,
        Box::new(|cc| Box::new(AnalogClockApp::new(cc, settings, settings_path))),
    );
    tracing::info!("clock closed");
    result
}
