//! Screen-relative window placement
//!
//! The widget remembers where it sits as a fraction of the monitor it is on,
//! not as absolute coordinates. When displays come and go (docking a laptop,
//! unplugging a projector) the fraction is reapplied to whichever monitor now
//! hosts the widget, so the clock lands in the "same" spot.
//!
//! There is no final clamp: a fraction near 1.0 on a much smaller monitor can
//! still leave the window partly off-screen.

use crate::geometry::{Monitor, Point, Rect};
use serde::{Deserialize, Serialize};

/// Top-left of the window as a fraction of its monitor's available area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenAnchor {
    pub x: f32,
    pub y: f32,
}

impl Default for ScreenAnchor {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl ScreenAnchor {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Fraction of `area` at which `position` sits. `None` for degenerate
    /// areas, which carry no usable scale.
    pub fn from_position(position: Point, area: &Rect) -> Option<Self> {
        if area.size.is_empty() {
            return None;
        }
        Some(Self {
            x: (position.x - area.left()) / area.size.width,
            y: (position.y - area.top()) / area.size.height,
        })
    }

    /// Absolute position this fraction maps to inside `area`.
    pub fn resolve(&self, area: &Rect) -> Point {
        Point::new(
            area.left() + self.x * area.size.width,
            area.top() + self.y * area.size.height,
        )
    }
}

/// Pick the monitor a window belongs to.
///
/// Preference order: the monitor holding the window's center, the one with
/// the largest overlap, the primary, then the first reported.
pub fn best_fit_monitor<'a>(window: &Rect, monitors: &'a [Monitor]) -> Option<&'a Monitor> {
    let center = window.center();
    if let Some(m) = monitors.iter().find(|m| m.available.contains_point(center)) {
        return Some(m);
    }

    let overlapping = monitors
        .iter()
        .map(|m| (m, m.available.overlap_area(window)))
        .filter(|(_, area)| *area > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| m);

    overlapping
        .or_else(|| monitors.iter().find(|m| m.primary))
        .or_else(|| monitors.first())
}

/// Tracks the anchor of one window across moves and display changes.
#[derive(Debug, Clone, Default)]
pub struct ScreenTracker {
    anchor: ScreenAnchor,
    monitor: Option<u64>,
}

impl ScreenTracker {
    pub fn new(anchor: ScreenAnchor) -> Self {
        Self { anchor, monitor: None }
    }

    pub fn anchor(&self) -> ScreenAnchor {
        self.anchor
    }

    /// Id of the monitor the anchor is currently relative to.
    pub fn monitor(&self) -> Option<u64> {
        self.monitor
    }

    /// Recompute the anchor after the window moved. Without a usable monitor
    /// the previous anchor is kept.
    pub fn window_moved(&mut self, window: &Rect, monitors: &[Monitor]) {
        let Some(monitor) = best_fit_monitor(window, monitors) else {
            return;
        };
        if let Some(anchor) = ScreenAnchor::from_position(window.origin, &monitor.available) {
            self.anchor = anchor;
            self.monitor = Some(monitor.id);
        }
    }

    /// React to a changed monitor set or monitor geometry.
    ///
    /// Returns the new window origin when the window is no longer fully
    /// inside its monitor, `None` when it can stay where it is or there is
    /// nothing to place it on.
    pub fn monitors_changed(&mut self, window: &Rect, monitors: &[Monitor]) -> Option<Point> {
        let tracked = self
            .monitor
            .and_then(|id| monitors.iter().find(|m| m.id == id));

        // A resized monitor stays the reference; only a vanished one hands
        // over to the best fit for the current layout.
        let monitor = match tracked {
            Some(m) => m,
            None => best_fit_monitor(window, monitors)?,
        };
        if self.monitor != Some(monitor.id) {
            tracing::debug!(
                from = ?self.monitor,
                to = monitor.id,
                "anchor monitor re-resolved"
            );
        }
        self.monitor = Some(monitor.id);

        if monitor.available.contains_rect(window) {
            return None;
        }
        let target = self.anchor.resolve(&monitor.available);
        tracing::debug!(x = target.x, y = target.y, "repositioning onto monitor {}", monitor.id);
        Some(target)
    }
}
