//! Display enumeration and change detection
//!
//! Displays come from `display-info` with their real desktop origin. egui
//! places windows in points, so every display is scaled by the window's
//! pixels-per-point before it reaches the widget.

use clockcore::{Monitor, Rect};
use display_info::DisplayInfo;

/// Desktop rect of a display, in egui points.
///
/// macOS reports displays in points already, the other platforms in
/// physical pixels.
pub fn display_rect(x: i32, y: i32, width: u32, height: u32, pixels_per_point: f32) -> Rect {
    let scale = if cfg!(target_os = "macos") || pixels_per_point <= 0.0 {
        1.0
    } else {
        pixels_per_point
    };
    Rect::new(
        x as f32 / scale,
        y as f32 / scale,
        width as f32 / scale,
        height as f32 / scale,
    )
}

/// Every attached display, sorted by id. Empty if enumeration fails.
pub fn enumerate(pixels_per_point: f32) -> Vec<Monitor> {
    let displays = match DisplayInfo::all() {
        Ok(displays) => displays,
        Err(e) => {
            tracing::warn!("could not enumerate displays: {e}");
            return Vec::new();
        }
    };
    let mut monitors: Vec<Monitor> = displays
        .iter()
        .map(|d| {
            let rect = display_rect(d.x, d.y, d.width, d.height, pixels_per_point);
            let monitor = Monitor::new(u64::from(d.id), rect).named(d.name.clone());
            if d.is_primary {
                monitor.primary()
            } else {
                monitor
            }
        })
        .collect();
    monitors.sort_by_key(|m| m.id);
    monitors
}

#[derive(Default)]
pub struct MonitorWatch {
    last: Option<Vec<Monitor>>,
}

impl MonitorWatch {
    /// Returns the monitor set when it differs from the last one seen.
    ///
    /// An empty set means enumeration failed and is never reported, so the
    /// widget keeps the last layout it knew.
    pub fn observe(&mut self, monitors: Vec<Monitor>) -> Option<Vec<Monitor>> {
        if monitors.is_empty() || self.last.as_ref() == Some(&monitors) {
            return None;
        }
        for m in &monitors {
            tracing::info!(
                id = m.id,
                name = m.name.as_deref().unwrap_or("?"),
                primary = m.primary,
                "display {:?}",
                m.available
            );
        }
        self.last = Some(monitors.clone());
        Some(monitors)
    }
}
