//! egui viewport and pointer state, translated into widget events

use clockcore::interaction::PointerButton;
use clockcore::{Event, Monitor, Point, Rect, Size};

fn to_rect(r: egui::Rect) -> Rect {
    Rect::new(r.min.x, r.min.y, r.width(), r.height())
}

/// Window-manager state from the previous frame
#[derive(Default)]
pub struct ViewportWatch {
    geometry: Option<(egui::Rect, egui::Rect)>,
    minimized: bool,
}

impl ViewportWatch {
    /// True when the outer or client rect differs from the last frame.
    pub fn geometry_changed(&self, info: &egui::ViewportInfo) -> bool {
        match (info.outer_rect, info.inner_rect) {
            (Some(outer), Some(inner)) => self.geometry != Some((outer, inner)),
            _ => false,
        }
    }

    /// Top-left of the client area on the desktop
    pub fn client_origin(&self) -> egui::Pos2 {
        self.geometry
            .map(|(_, inner)| inner.min)
            .unwrap_or(egui::Pos2::ZERO)
    }

    pub fn client_size(&self) -> Option<Size> {
        self.geometry
            .map(|(_, inner)| Size::new(inner.width(), inner.height()))
    }

    /// Events for one frame, in dispatch order.
    ///
    /// A changed monitor set comes before geometry: the window manager often
    /// moves the window while it rearranges displays, and that move must not
    /// be mistaken for the user placing the clock.
    pub fn events(&mut self, info: &egui::ViewportInfo, monitors: Option<Vec<Monitor>>) -> Vec<Event> {
        let mut events = Vec::new();

        if let Some(monitors) = monitors {
            events.push(Event::MonitorsChanged(monitors));
        }

        if let (Some(outer), Some(inner)) = (info.outer_rect, info.inner_rect) {
            if self.geometry != Some((outer, inner)) {
                self.geometry = Some((outer, inner));
                events.push(Event::Geometry {
                    outer: to_rect(outer),
                    client: to_rect(inner),
                });
            }
        }

        let minimized = info.minimized.unwrap_or(false);
        if minimized && !self.minimized {
            events.push(Event::Hidden);
        }
        self.minimized = minimized;

        if info.close_requested() {
            events.push(Event::CloseRequested);
        }
        events
    }
}

/// Primary-button pointer state for one frame, in client coordinates
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerSample {
    /// Press position, on the frame a drag starts
    pub drag_started: Option<egui::Pos2>,
    pub pos: Option<egui::Pos2>,
    pub released: bool,
}

/// Turn one frame of pointer state into desktop-coordinate events.
///
/// `dragging` is the widget's state before this frame. `fallback` stands in
/// for the release position when the pointer has already left the window.
pub fn pointer_events(
    sample: &PointerSample,
    client_origin: egui::Pos2,
    dragging: bool,
    fallback: Point,
) -> Vec<Event> {
    let to_screen = |p: egui::Pos2| Point::new(client_origin.x + p.x, client_origin.y + p.y);
    let mut events = Vec::new();

    if let Some(press) = sample.drag_started {
        events.push(Event::PointerDown {
            button: PointerButton::Primary,
            at: to_screen(press),
        });
    }
    if !dragging && sample.drag_started.is_none() {
        return events;
    }

    if sample.released {
        let at = sample.pos.map(to_screen).unwrap_or(fallback);
        events.push(Event::PointerUp {
            button: PointerButton::Primary,
            at,
        });
    } else if let Some(pos) = sample.pos {
        events.push(Event::PointerMove { at: to_screen(pos) });
    }
    events
}
