//! Pointer dragging and frame toggling
//!
//! The widget has no title bar when frameless, so it moves itself: a primary
//! press starts a drag and every pointer move shifts the window by the pointer
//! delta since the press. Toggling the frame keeps the clock face where it is
//! on screen by converting between client and frame rectangles.

use crate::geometry::{Point, Rect, Size};

/// Pointer buttons the widget distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Thickness of the window manager's decorations around the client area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInsets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for FrameInsets {
    /// A thin border with a title bar, used until the real decorations have
    /// been observed.
    fn default() -> Self {
        Self {
            left: 1.0,
            top: 30.0,
            right: 1.0,
            bottom: 1.0,
        }
    }
}

impl FrameInsets {
    /// Insets implied by a framed window's outer and client rectangles.
    /// `None` when the client is not inside the outer rect or nothing
    /// separates them.
    pub fn between(outer: &Rect, client: &Rect) -> Option<Self> {
        let insets = Self {
            left: client.left() - outer.left(),
            top: client.top() - outer.top(),
            right: outer.right() - client.right(),
            bottom: outer.bottom() - client.bottom(),
        };
        let valid = [insets.left, insets.top, insets.right, insets.bottom]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        let any = insets.left + insets.top + insets.right + insets.bottom > 0.0;
        (valid && any).then_some(insets)
    }

    pub fn frame_rect(&self, client: &Rect) -> Rect {
        Rect::from_origin_size(
            Point::new(client.left() - self.left, client.top() - self.top),
            Size::new(
                client.size.width + self.left + self.right,
                client.size.height + self.top + self.bottom,
            ),
        )
    }

    pub fn client_rect(&self, frame: &Rect) -> Rect {
        Rect::from_origin_size(
            Point::new(frame.left() + self.left, frame.top() + self.top),
            Size::new(
                (frame.size.width - self.left - self.right).max(0.0),
                (frame.size.height - self.top - self.bottom).max(0.0),
            ),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragPhase {
    Idle,
    Dragging { press: Point, origin: Point },
}

/// Outcome of a frame toggle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameChange {
    pub framed: bool,
    /// Outer window rect after the change
    pub window: Rect,
}

#[derive(Debug, Clone)]
pub struct Interaction {
    drag: DragPhase,
    framed: bool,
    insets: FrameInsets,
    suppress_hide_on_close: bool,
}

impl Interaction {
    pub fn new(framed: bool) -> Self {
        Self {
            drag: DragPhase::Idle,
            framed,
            insets: FrameInsets::default(),
            suppress_hide_on_close: false,
        }
    }

    pub fn is_framed(&self) -> bool {
        self.framed
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragPhase::Dragging { .. })
    }

    pub fn insets(&self) -> FrameInsets {
        self.insets
    }

    pub fn set_insets(&mut self, insets: FrameInsets) {
        self.insets = insets;
    }

    /// Begin a drag if `button` is primary. `window_origin` is the outer
    /// top-left at press time.
    pub fn pointer_down(&mut self, button: PointerButton, at: Point, window_origin: Point) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        self.drag = DragPhase::Dragging {
            press: at,
            origin: window_origin,
        };
        true
    }

    /// New window origin while dragging, `None` otherwise.
    pub fn pointer_move(&self, at: Point) -> Option<Point> {
        match self.drag {
            DragPhase::Dragging { press, origin } => Some(origin + (at - press)),
            DragPhase::Idle => None,
        }
    }

    /// Ends a drag on primary release. Returns whether a drag ended.
    pub fn pointer_up(&mut self, button: PointerButton) -> bool {
        if button != PointerButton::Primary || !self.is_dragging() {
            return false;
        }
        self.drag = DragPhase::Idle;
        true
    }

    /// Flip between framed and frameless, keeping the client area fixed.
    ///
    /// The window manager hides and re-shows the window while its
    /// decorations change; the next hide or close request is therefore
    /// flagged as part of the toggle.
    pub fn toggle_frame(&mut self, window: &Rect) -> FrameChange {
        let (framed, window) = if self.framed {
            (false, self.insets.client_rect(window))
        } else {
            (true, self.insets.frame_rect(window))
        };
        self.framed = framed;
        self.suppress_hide_on_close = true;
        FrameChange { framed, window }
    }

    /// Consume the toggle guard. True means the pending hide/close belongs
    /// to a frame toggle and must not end the application.
    pub fn take_hide_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_hide_on_close)
    }

    #[cfg(test)]
    pub fn is_hide_suppressed(&self) -> bool {
        self.suppress_hide_on_close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_sequence() {
        let mut i = Interaction::new(false);
        let origin = Point::new(100.0, 100.0);
        let press = Point::new(150.0, 120.0);
        assert!(i.pointer_down(PointerButton::Primary, press, origin));
        assert!(i.is_dragging());

        let q = Point::new(400.0, 90.0);
        assert_eq!(i.pointer_move(q), Some(Point::new(350.0, 70.0)));
        // moves are relative to the press, not cumulative
        assert_eq!(i.pointer_move(q), Some(Point::new(350.0, 70.0)));

        assert!(i.pointer_up(PointerButton::Primary));
        assert_eq!(i.pointer_move(Point::new(0.0, 0.0)), None);
        assert!(!i.pointer_up(PointerButton::Primary));
    }

    #[test]
    fn test_secondary_button_does_not_drag() {
        let mut i = Interaction::new(true);
        assert!(!i.pointer_down(PointerButton::Secondary, Point::ZERO, Point::ZERO));
        assert_eq!(i.pointer_move(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_secondary_release_keeps_dragging() {
        let mut i = Interaction::new(true);
        i.pointer_down(PointerButton::Primary, Point::ZERO, Point::ZERO);
        assert!(!i.pointer_up(PointerButton::Secondary));
        assert!(i.is_dragging());
    }

    #[test]
    fn test_frame_toggle_preserves_client_rect() {
        let mut i = Interaction::new(false);
        i.set_insets(FrameInsets { left: 4.0, top: 28.0, right: 4.0, bottom: 4.0 });
        let client = Rect::new(300.0, 200.0, 200.0, 200.0);

        let on = i.toggle_frame(&client);
        assert!(on.framed);
        assert_eq!(on.window, Rect::new(296.0, 172.0, 208.0, 232.0));
        assert_eq!(i.insets().client_rect(&on.window), client);

        let off = i.toggle_frame(&on.window);
        assert!(!off.framed);
        assert_eq!(off.window, client);
    }

    #[test]
    fn test_toggle_sets_one_shot_suppression() {
        let mut i = Interaction::new(true);
        assert!(!i.take_hide_suppression());
        i.toggle_frame(&Rect::new(0.0, 0.0, 200.0, 230.0));
        assert!(i.is_hide_suppressed());
        assert!(i.take_hide_suppression());
        assert!(!i.take_hide_suppression());
    }

    #[test]
    fn test_insets_between() {
        let outer = Rect::new(10.0, 10.0, 210.0, 240.0);
        let client = Rect::new(15.0, 40.0, 200.0, 200.0);
        let insets = FrameInsets::between(&outer, &client).unwrap();
        assert_eq!(insets, FrameInsets { left: 5.0, top: 30.0, right: 5.0, bottom: 10.0 });

        assert!(FrameInsets::between(&client, &client).is_none());
        assert!(FrameInsets::between(&client, &outer).is_none());
    }
}
