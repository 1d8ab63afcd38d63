//! The eframe application: turns egui input into widget events and widget
//! effects into viewport commands.

use crate::input::{pointer_events, PointerSample, ViewportWatch};
use crate::monitors::{self, MonitorWatch};
use chrono::{Local, Timelike};
use clockcore::render::{render_clock, ClockAssets};
use clockcore::widget::OPACITY_STEPS;
use clockcore::{ClockWidget, Effect, Event, HandAngles, MenuAction, Rect, Settings, Size, TickController};
use egui::{Align2, CentralPanel, Color32, ColorImage, Context, Sense, TextureHandle, TextureOptions, Vec2};
use std::path::PathBuf;

/// What the cached texture was rendered for
#[derive(Clone, Copy, PartialEq)]
struct RenderKey {
    width: u32,
    height: u32,
    second_of_day: u32,
    show_second_hand: bool,
}

pub struct AnalogClockApp {
    widget: ClockWidget,
    settings: Settings,
    settings_path: Option<PathBuf>,
    /// `None` only if even the bundled assets failed to parse
    assets: Option<ClockAssets>,
    texture: Option<TextureHandle>,
    rendered: Option<RenderKey>,
    needs_redraw: bool,
    tick: TickController,
    monitors: MonitorWatch,
    viewport: ViewportWatch,
    client_size: Size,
    show_about: bool,
}

impl AnalogClockApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings, settings_path: Option<PathBuf>) -> Self {
        let assets = ClockAssets::load(&settings)
            .map_err(|e| tracing::error!("clock assets unavailable: {e}"))
            .ok();
        let window = settings
            .window_rect()
            .unwrap_or(Rect::new(0.0, 0.0, 200.0, 200.0));

        Self {
            widget: ClockWidget::new(settings.clock_state(), settings.screen_percent, window),
            client_size: window.size,
            settings,
            settings_path,
            assets,
            texture: None,
            rendered: None,
            needs_redraw: true,
            tick: TickController::new(),
            monitors: MonitorWatch::default(),
            viewport: ViewportWatch::default(),
            show_about: false,
        }
    }

    fn dispatch(&mut self, ctx: &Context, event: Event) {
        tracing::trace!(?event, "event");
        for effect in self.widget.handle(event) {
            match effect {
                Effect::Redraw => {
                    self.needs_redraw = true;
                    ctx.request_repaint();
                }
                Effect::MoveWindow(p) => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(p.x, p.y)));
                }
                Effect::SetDecorations(framed) => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Decorations(framed));
                }
                Effect::ShowAbout => self.show_about = true,
                Effect::CancelClose => ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose),
                Effect::Persist => self.persist(),
                Effect::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            }
        }
    }

    fn persist(&mut self) {
        self.settings.record_session(
            self.widget.state(),
            self.widget.anchor(),
            self.widget.window(),
            self.client_size,
        );
        let Some(path) = &self.settings_path else {
            tracing::debug!("no settings path, not saving");
            return;
        };
        match self.settings.save_to(path) {
            Ok(()) => tracing::info!(path = %path.display(), "settings saved"),
            Err(e) => tracing::warn!(path = %path.display(), "could not save settings: {e}"),
        }
    }

    /// Feed window-manager state (monitors, geometry, visibility, close
    /// requests) into the widget. Displays are enumerated on every tick and
    /// whenever the window moved or resized.
    fn window_events(&mut self, ctx: &Context, ticked: bool) {
        let info = ctx.input(|i| i.viewport().clone());

        let monitors = if ticked || self.viewport.geometry_changed(&info) {
            self.monitors.observe(monitors::enumerate(ctx.pixels_per_point()))
        } else {
            None
        };
        let layout_changed = monitors.is_some();

        let events = self.viewport.events(&info, monitors);
        if let Some(size) = self.viewport.client_size() {
            self.client_size = size;
        }
        for event in events {
            self.dispatch(ctx, event);
        }
        if layout_changed {
            tracing::debug!(monitor = ?self.widget.monitor(), "clock anchored after layout change");
        }
    }

    /// Translate primary-button dragging into widget pointer events, in
    /// desktop coordinates.
    fn pointer_events(&mut self, ctx: &Context, response: &egui::Response) {
        let drag_started = if response.drag_started_by(egui::PointerButton::Primary) {
            ctx.input(|i| i.pointer.press_origin())
        } else {
            None
        };
        let (pos, released) = ctx.input(|i| (i.pointer.interact_pos(), i.pointer.primary_released()));
        let sample = PointerSample {
            drag_started,
            pos,
            released,
        };

        let events = pointer_events(
            &sample,
            self.viewport.client_origin(),
            self.widget.is_dragging(),
            self.widget.window().origin,
        );
        for event in events {
            self.dispatch(ctx, event);
        }
        if self.widget.is_dragging() {
            ctx.set_cursor_icon(egui::CursorIcon::Move);
        }
    }

    /// Re-render the clock image if the time, size or hand set changed.
    fn refresh_texture(&mut self, ctx: &Context, size: Vec2) {
        let Some(assets) = &self.assets else {
            return;
        };
        let ppp = ctx.pixels_per_point();
        let now = Local::now();
        let key = RenderKey {
            width: (size.x * ppp).round() as u32,
            height: (size.y * ppp).round() as u32,
            second_of_day: now.num_seconds_from_midnight(),
            show_second_hand: self.widget.state().show_second_hand,
        };
        if !self.needs_redraw && self.rendered == Some(key) {
            return;
        }

        let angles = HandAngles::from_time(&now);
        let Some(pixmap) = render_clock(assets, key.width, key.height, angles, key.show_second_hand) else {
            return;
        };
        let image = ColorImage::from_rgba_premultiplied([key.width as usize, key.height as usize], pixmap.data());
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => self.texture = Some(ctx.load_texture("clock", image, TextureOptions::LINEAR)),
        }
        self.rendered = Some(key);
        self.needs_redraw = false;
    }

    fn context_menu(&self, ui: &mut egui::Ui, actions: &mut Vec<MenuAction>) {
        let state = self.widget.state();

        if ui.button("Toggle Frame").clicked() {
            actions.push(MenuAction::ToggleFrame);
            ui.close_menu();
        }
        let mut show_second_hand = state.show_second_hand;
        if ui.checkbox(&mut show_second_hand, "Second Hand").clicked() {
            actions.push(MenuAction::SetSecondHand(show_second_hand));
            ui.close_menu();
        }
        ui.menu_button("Opacity", |ui| {
            let current = (state.opacity * 100.0).round() as u8;
            for step in OPACITY_STEPS {
                if ui.radio(current == step, format!("{step}%")).clicked() {
                    actions.push(MenuAction::SetOpacity(step));
                    ui.close_menu();
                }
            }
        });
        ui.separator();
        if ui.button("About").clicked() {
            actions.push(MenuAction::About);
            ui.close_menu();
        }
        if ui.button("Close").clicked() {
            actions.push(MenuAction::Close);
            ui.close_menu();
        }
    }

    fn draw_about(&mut self, ctx: &Context) {
        if !self.show_about {
            return;
        }
        egui::Window::new("About")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Analog Clock");
                    ui.label(format!("version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(4.0);
                    ui.label("Post Meridian");
                    ui.add_space(8.0);
                    if ui.button("ok").clicked() {
                        self.show_about = false;
                    }
                });
            });
    }
}

impl eframe::App for AnalogClockApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = Local::now();
        let ticked = self.tick.begin_frame(&now);
        if ticked {
            self.dispatch(ctx, Event::Tick);
        }
        tracing::trace!(reason = ?self.tick.reason(), frame = self.tick.frame(), "frame");

        self.window_events(ctx, ticked);

        let area = ctx.screen_rect();
        self.refresh_texture(ctx, area.size());

        let mut actions = Vec::new();
        let response = CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let response = ui.allocate_rect(area, Sense::click_and_drag());
                if let Some(texture) = &self.texture {
                    let tint = Color32::WHITE.gamma_multiply(self.widget.state().opacity);
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    ui.painter().image(texture.id(), area, uv, tint);
                }
                response.clone().context_menu(|ui| self.context_menu(ui, &mut actions));
                response
            })
            .inner;

        if response.double_clicked() {
            self.dispatch(ctx, Event::DoubleClick);
        }
        self.pointer_events(ctx, &response);
        for action in actions {
            self.dispatch(ctx, Event::Menu(action));
        }

        self.draw_about(ctx);
        self.tick.end_frame(ctx, &now);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0; 4]
    }
}
