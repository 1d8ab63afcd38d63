//! The clock widget as a state machine
//!
//! `ClockWidget::handle` takes one event from the windowing layer and returns
//! the effects the shell has to carry out. It never talks to the toolkit
//! itself, which keeps every behaviour here testable without a display.

use crate::anchor::{ScreenAnchor, ScreenTracker};
use crate::geometry::{Monitor, Point, Rect};
use crate::interaction::{FrameInsets, Interaction, PointerButton};

/// User-visible preferences that survive restarts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    pub show_second_hand: bool,
    /// 0.0 = invisible, 1.0 = opaque
    pub opacity: f32,
    pub framed: bool,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            show_second_hand: true,
            opacity: 1.0,
            framed: true,
        }
    }
}

/// Entries of the context menu
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    ToggleFrame,
    SetSecondHand(bool),
    /// Opacity in percent
    SetOpacity(u8),
    About,
    Close,
}

/// Opacity steps offered by the menu, most opaque first
pub const OPACITY_STEPS: [u8; 10] = [100, 90, 80, 70, 60, 50, 40, 30, 20, 10];

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Once per wall-clock second
    Tick,
    /// The window manager reports the outer and client rectangles
    Geometry { outer: Rect, client: Rect },
    PointerDown { button: PointerButton, at: Point },
    PointerMove { at: Point },
    PointerUp { button: PointerButton, at: Point },
    DoubleClick,
    /// Full monitor set after any add, removal or geometry change
    MonitorsChanged(Vec<Monitor>),
    Menu(MenuAction),
    /// The window manager asks to close the window
    CloseRequested,
    /// The window was hidden
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Redraw,
    /// Place the outer top-left of the window here
    MoveWindow(Point),
    SetDecorations(bool),
    ShowAbout,
    /// Keep the window open despite the pending close request
    CancelClose,
    /// Write settings to disk
    Persist,
    Quit,
}

pub struct ClockWidget {
    state: ClockState,
    tracker: ScreenTracker,
    interaction: Interaction,
    window: Rect,
    monitors: Vec<Monitor>,
    /// Origin of a move we requested that the window manager has not
    /// reported back yet
    settling: Option<Point>,
    closing: bool,
}

impl ClockWidget {
    /// `window` is the outer rect restored from the previous session.
    pub fn new(state: ClockState, anchor: ScreenAnchor, window: Rect) -> Self {
        Self {
            interaction: Interaction::new(state.framed),
            state,
            tracker: ScreenTracker::new(anchor),
            window,
            monitors: Vec::new(),
            settling: None,
            closing: false,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn anchor(&self) -> ScreenAnchor {
        self.tracker.anchor()
    }

    /// Outer window rect as last reported or requested
    pub fn window(&self) -> Rect {
        self.window
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    /// Id of the monitor the anchor is relative to
    pub fn monitor(&self) -> Option<u64> {
        self.tracker.monitor()
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Tick => {
                // the frame toggle's hide/show cycle is long over by now
                self.interaction.take_hide_suppression();
                self.settling = None;
                vec![Effect::Redraw]
            }
            Event::Geometry { outer, client } => self.geometry(outer, client),
            Event::PointerDown { button, at } => {
                self.interaction.pointer_down(button, at, self.window.origin);
                Vec::new()
            }
            Event::PointerMove { at } => match self.interaction.pointer_move(at) {
                Some(origin) if origin != self.window.origin => {
                    self.window = self.window.with_origin(origin);
                    vec![Effect::MoveWindow(origin)]
                }
                _ => Vec::new(),
            },
            Event::PointerUp { button, .. } => {
                if self.interaction.pointer_up(button) {
                    self.tracker.window_moved(&self.window, &self.monitors);
                }
                Vec::new()
            }
            Event::DoubleClick => self.toggle_frame(),
            Event::MonitorsChanged(monitors) => {
                self.monitors = monitors;
                match self.tracker.monitors_changed(&self.window, &self.monitors) {
                    Some(origin) => {
                        self.window = self.window.with_origin(origin);
                        self.settling = Some(origin);
                        vec![Effect::MoveWindow(origin)]
                    }
                    None => Vec::new(),
                }
            }
            Event::Menu(action) => self.menu(action),
            Event::CloseRequested => {
                if self.closing {
                    Vec::new()
                } else if self.interaction.take_hide_suppression() {
                    vec![Effect::CancelClose]
                } else {
                    self.closing = true;
                    vec![Effect::Persist]
                }
            }
            Event::Hidden => {
                if self.interaction.take_hide_suppression() {
                    Vec::new()
                } else {
                    self.close()
                }
            }
        }
    }

    fn geometry(&mut self, outer: Rect, client: Rect) -> Vec<Effect> {
        if self.interaction.is_framed() {
            if let Some(insets) = FrameInsets::between(&outer, &client) {
                self.interaction.set_insets(insets);
            }
        }

        let resized = outer.size != self.window.size;
        let moved = outer.origin != self.window.origin;
        self.window = outer;

        if self.settling == Some(outer.origin) {
            self.settling = None;
        }
        // positions the window manager picks while our own move is in
        // flight say nothing about where the user wants the clock
        if moved && !self.interaction.is_dragging() && self.settling.is_none() {
            self.tracker.window_moved(&self.window, &self.monitors);
        }
        if resized {
            vec![Effect::Redraw]
        } else {
            Vec::new()
        }
    }

    fn toggle_frame(&mut self) -> Vec<Effect> {
        let change = self.interaction.toggle_frame(&self.window);
        self.state.framed = change.framed;
        self.window = change.window;
        self.settling = Some(change.window.origin);
        vec![
            Effect::SetDecorations(change.framed),
            Effect::MoveWindow(change.window.origin),
            Effect::Redraw,
        ]
    }

    fn menu(&mut self, action: MenuAction) -> Vec<Effect> {
        match action {
            MenuAction::ToggleFrame => self.toggle_frame(),
            MenuAction::SetSecondHand(show) => {
                self.state.show_second_hand = show;
                vec![Effect::Redraw]
            }
            MenuAction::SetOpacity(percent) => {
                self.state.opacity = (f32::from(percent) / 100.0).clamp(0.0, 1.0);
                vec![Effect::Redraw]
            }
            MenuAction::About => vec![Effect::ShowAbout],
            MenuAction::Close => self.close(),
        }
    }

    fn close(&mut self) -> Vec<Effect> {
        if self.closing {
            return Vec::new();
        }
        self.closing = true;
        self.interaction.take_hide_suppression();
        vec![Effect::Persist, Effect::Quit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn frameless() -> ClockState {
        ClockState {
            framed: false,
            ..ClockState::default()
        }
    }

    fn widget_at(x: f32, y: f32) -> ClockWidget {
        ClockWidget::new(frameless(), ScreenAnchor::default(), Rect::new(x, y, 200.0, 200.0))
    }

    fn full_hd() -> Monitor {
        Monitor::new(1, Rect::new(0.0, 0.0, 1920.0, 1080.0)).primary()
    }

    #[test]
    fn test_tick_always_redraws() {
        let mut w = widget_at(0.0, 0.0);
        assert_eq!(w.handle(Event::Tick), vec![Effect::Redraw]);
        assert_eq!(w.handle(Event::Tick), vec![Effect::Redraw]);
    }

    #[test]
    fn test_drag_moves_then_stops() {
        let mut w = widget_at(100.0, 100.0);
        w.handle(Event::MonitorsChanged(vec![full_hd()]));

        let p = Point::new(150.0, 150.0);
        w.handle(Event::PointerDown { button: PointerButton::Primary, at: p });
        let fx = w.handle(Event::PointerMove { at: Point::new(250.0, 450.0) });
        assert_eq!(fx, vec![Effect::MoveWindow(Point::new(200.0, 400.0))]);
        assert!(w.is_dragging());

        w.handle(Event::PointerUp { button: PointerButton::Primary, at: Point::new(250.0, 450.0) });
        assert!(!w.is_dragging());
        assert!(w.handle(Event::PointerMove { at: Point::new(900.0, 900.0) }).is_empty());

        // anchor follows the drop position
        assert_eq!(w.anchor(), ScreenAnchor::new(200.0 / 1920.0, 400.0 / 1080.0));
    }

    #[test]
    fn test_move_report_updates_anchor() {
        let mut w = widget_at(0.0, 0.0);
        w.handle(Event::MonitorsChanged(vec![full_hd()]));
        let outer = Rect::new(960.0, 270.0, 200.0, 200.0);
        assert!(w.handle(Event::Geometry { outer, client: outer }).is_empty());
        assert_eq!(w.anchor(), ScreenAnchor::new(0.5, 0.25));
    }

    #[test]
    fn test_resize_redraws() {
        let mut w = widget_at(0.0, 0.0);
        let outer = Rect::new(0.0, 0.0, 300.0, 300.0);
        assert_eq!(w.handle(Event::Geometry { outer, client: outer }), vec![Effect::Redraw]);
        assert_eq!(w.window().size, Size::new(300.0, 300.0));
    }

    #[test]
    fn test_docking_scenario() {
        let mut w = widget_at(960.0, 540.0);
        w.handle(Event::MonitorsChanged(vec![full_hd()]));
        let outer = w.window();
        w.handle(Event::Geometry { outer, client: outer });
        assert_eq!(w.anchor(), ScreenAnchor::new(0.5, 0.5));

        let laptop = Monitor::new(2, Rect::new(0.0, 0.0, 1280.0, 720.0)).primary();
        let fx = w.handle(Event::MonitorsChanged(vec![laptop]));
        assert_eq!(fx, vec![Effect::MoveWindow(Point::new(640.0, 360.0))]);
        assert_eq!(w.window().origin, Point::new(640.0, 360.0));
    }

    #[test]
    fn test_secondary_monitor_shrinks() {
        let secondary = Monitor::new(2, Rect::new(1920.0, 0.0, 1920.0, 1080.0));
        let mut w = widget_at(0.0, 0.0);
        w.handle(Event::MonitorsChanged(vec![full_hd(), secondary]));
        let outer = Rect::new(3400.0, 800.0, 200.0, 200.0);
        w.handle(Event::Geometry { outer, client: outer });
        assert_eq!(w.monitor(), Some(2));

        let smaller = Monitor::new(2, Rect::new(1920.0, 0.0, 1280.0, 720.0));
        let fx = w.handle(Event::MonitorsChanged(vec![full_hd(), smaller]));
        let Effect::MoveWindow(target) = fx[0] else {
            panic!("expected a move, got {fx:?}");
        };
        assert!((target.x - (1920.0 + 1480.0 / 1920.0 * 1280.0)).abs() < 1e-2);
        assert!((target.y - 800.0 / 1080.0 * 720.0).abs() < 1e-2);
        assert_eq!(w.monitor(), Some(2));
    }

    #[test]
    fn test_window_manager_moves_during_reposition_keep_anchor() {
        let laptop = Monitor::new(2, Rect::new(0.0, 0.0, 1280.0, 720.0)).primary();
        let external = Monitor::new(3, Rect::new(1280.0, 0.0, 1920.0, 1080.0));
        let mut w = widget_at(0.0, 0.0);
        w.handle(Event::MonitorsChanged(vec![laptop.clone(), external]));
        let outer = Rect::new(2240.0, 540.0, 200.0, 200.0);
        w.handle(Event::Geometry { outer, client: outer });
        let anchor = w.anchor();
        assert_eq!(anchor, ScreenAnchor::new(0.5, 0.5));

        // undock: external display gone
        let fx = w.handle(Event::MonitorsChanged(vec![laptop]));
        assert_eq!(fx, vec![Effect::MoveWindow(Point::new(640.0, 360.0))]);

        // the window manager parks the window somewhere first
        let parked = Rect::new(1080.0, 0.0, 200.0, 200.0);
        w.handle(Event::Geometry { outer: parked, client: parked });
        assert_eq!(w.anchor(), anchor);

        // then our move lands
        let landed = Rect::new(640.0, 360.0, 200.0, 200.0);
        w.handle(Event::Geometry { outer: landed, client: landed });
        assert_eq!(w.anchor(), anchor);

        // later moves count again
        let moved = Rect::new(320.0, 180.0, 200.0, 200.0);
        w.handle(Event::Geometry { outer: moved, client: moved });
        assert_eq!(w.anchor(), ScreenAnchor::new(0.25, 0.25));
    }

    #[test]
    fn test_startup_reposition_uses_persisted_anchor() {
        // saved on a monitor that is no longer attached
        let mut w = ClockWidget::new(
            frameless(),
            ScreenAnchor::new(0.25, 0.75),
            Rect::new(4000.0, 300.0, 200.0, 200.0),
        );
        let fx = w.handle(Event::MonitorsChanged(vec![full_hd()]));
        assert_eq!(fx, vec![Effect::MoveWindow(Point::new(480.0, 810.0))]);
    }

    #[test]
    fn test_empty_monitor_set_is_ignored() {
        let mut w = widget_at(5000.0, 5000.0);
        assert!(w.handle(Event::MonitorsChanged(Vec::new())).is_empty());
    }

    #[test]
    fn test_double_click_toggles_and_restores() {
        let mut w = widget_at(300.0, 200.0);
        let original = w.window();

        let fx = w.handle(Event::DoubleClick);
        assert_eq!(fx[0], Effect::SetDecorations(true));
        assert!(w.state().framed);
        let framed = w.window();
        assert_eq!(fx[1], Effect::MoveWindow(framed.origin));
        assert!(framed.left() < original.left() && framed.top() < original.top());

        let fx = w.handle(Event::Menu(MenuAction::ToggleFrame));
        assert_eq!(fx[0], Effect::SetDecorations(false));
        assert!(!w.state().framed);
        assert_eq!(w.window(), original);
    }

    #[test]
    fn test_learned_insets_are_used() {
        let mut w = ClockWidget::new(ClockState::default(), ScreenAnchor::default(), Rect::default());
        let outer = Rect::new(100.0, 100.0, 210.0, 235.0);
        let client = Rect::new(105.0, 130.0, 200.0, 200.0);
        w.handle(Event::Geometry { outer, client });

        let fx = w.handle(Event::DoubleClick);
        assert_eq!(fx[1], Effect::MoveWindow(client.origin));
        assert_eq!(w.window(), client);
    }

    #[test]
    fn test_hide_during_toggle_is_not_a_close() {
        let mut w = widget_at(0.0, 0.0);
        w.handle(Event::DoubleClick);
        assert!(w.handle(Event::Hidden).is_empty());
        assert!(!w.is_closing());

        // a second hide is a real one
        assert_eq!(w.handle(Event::Hidden), vec![Effect::Persist, Effect::Quit]);
    }

    #[test]
    fn test_close_request_during_toggle_is_cancelled() {
        let mut w = widget_at(0.0, 0.0);
        w.handle(Event::Menu(MenuAction::ToggleFrame));
        assert_eq!(w.handle(Event::CloseRequested), vec![Effect::CancelClose]);
        assert_eq!(w.handle(Event::CloseRequested), vec![Effect::Persist]);
        assert!(w.is_closing());
    }

    #[test]
    fn test_menu_close_right_after_toggle_still_quits() {
        let mut w = widget_at(0.0, 0.0);
        w.handle(Event::DoubleClick);
        assert_eq!(w.handle(Event::Menu(MenuAction::Close)), vec![Effect::Persist, Effect::Quit]);
        // the close our own Quit triggers comes back from the window manager
        let fx = w.handle(Event::CloseRequested);
        assert!(!fx.contains(&Effect::CancelClose));
        assert!(fx.is_empty());
    }

    #[test]
    fn test_tick_expires_suppression() {
        let mut w = widget_at(0.0, 0.0);
        w.handle(Event::DoubleClick);
        w.handle(Event::Tick);
        assert_eq!(w.handle(Event::Hidden), vec![Effect::Persist, Effect::Quit]);
    }

    #[test]
    fn test_close_persists_once() {
        let mut w = widget_at(0.0, 0.0);
        assert_eq!(w.handle(Event::Menu(MenuAction::Close)), vec![Effect::Persist, Effect::Quit]);
        // the resulting window-manager close must not save again
        assert!(w.handle(Event::CloseRequested).is_empty());
        assert!(w.handle(Event::Menu(MenuAction::Close)).is_empty());
    }

    #[test]
    fn test_menu_updates_state() {
        let mut w = widget_at(0.0, 0.0);
        assert_eq!(w.handle(Event::Menu(MenuAction::SetSecondHand(false))), vec![Effect::Redraw]);
        assert!(!w.state().show_second_hand);

        for step in OPACITY_STEPS {
            w.handle(Event::Menu(MenuAction::SetOpacity(step)));
            assert!((w.state().opacity - f32::from(step) / 100.0).abs() < 1e-6);
        }
        w.handle(Event::Menu(MenuAction::SetOpacity(250)));
        assert_eq!(w.state().opacity, 1.0);

        assert_eq!(w.handle(Event::Menu(MenuAction::About)), vec![Effect::ShowAbout]);
    }
}
