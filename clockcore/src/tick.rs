//! Once-per-second repaint scheduling
//!
//! egui only repaints on input or when asked. `TickController` sits between
//! the widget and egui's scheduler: at the end of every frame it asks for the
//! next repaint at the coming wall-clock second boundary, and at the start of
//! a frame it tells the caller whether the displayed second has changed.
//!
//! Call [`TickController::begin_frame`] at the top of `update()` and
//! [`TickController::end_frame`] at the bottom.

use chrono::Timelike;
use std::time::Duration;

/// Lower bound for the wait, so a frame landing right on a boundary does not
/// spin.
const MIN_WAIT: Duration = Duration::from_millis(5);

/// Why the current frame is being painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReason {
    /// First frame, always paint
    Init,
    /// A new wall-clock second began
    Tick,
    /// Anything else: pointer, resize, menu
    Other,
}

pub struct TickController {
    /// Second of the day shown by the previous frame
    shown: Option<u32>,
    frame: u64,
    reason: FrameReason,
}

impl Default for TickController {
    fn default() -> Self {
        Self::new()
    }
}

impl TickController {
    pub fn new() -> Self {
        Self {
            shown: None,
            frame: 0,
            reason: FrameReason::Init,
        }
    }

    pub fn reason(&self) -> FrameReason {
        self.reason
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns true when `now` falls in a different second than the last
    /// frame, i.e. the clock needs a new image.
    pub fn begin_frame<T: Timelike>(&mut self, now: &T) -> bool {
        let second = now.num_seconds_from_midnight();
        let ticked = self.shown != Some(second);
        self.reason = if self.frame == 0 {
            FrameReason::Init
        } else if ticked {
            FrameReason::Tick
        } else {
            FrameReason::Other
        };
        self.shown = Some(second);
        ticked
    }

    /// Schedule the repaint for the next second boundary.
    pub fn end_frame<T: Timelike>(&mut self, ctx: &egui::Context, now: &T) {
        self.frame += 1;
        ctx.request_repaint_after(until_next_second(now));
    }
}

/// Time left until the next whole second.
pub fn until_next_second<T: Timelike>(now: &T) -> Duration {
    // nanosecond() exceeds 1e9 during a leap second
    let into = Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));
    Duration::from_secs(1).saturating_sub(into).max(MIN_WAIT)
}
