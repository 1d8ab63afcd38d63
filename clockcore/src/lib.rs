//! clockcore: the toolkit-independent half of the analog clock widget
//!
//! Hand angles, screen-relative placement, drag and frame handling, settings
//! and SVG compositing. The application crate feeds window-system events into
//! [`ClockWidget`] and carries out the [`Effect`]s it returns.

pub mod anchor;
pub mod config;
pub mod geometry;
pub mod hands;
pub mod interaction;
pub mod render;
pub mod tick;
pub mod widget;

pub use anchor::{ScreenAnchor, ScreenTracker};
pub use config::Settings;
pub use geometry::{Monitor, Point, Rect, Size};
pub use hands::HandAngles;
pub use tick::TickController;
pub use widget::{ClockState, ClockWidget, Effect, Event, MenuAction};
