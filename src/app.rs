use eframe::egui;
use image::RgbaImage;

use crate::controller::{ClickEvent, InputEvent, MeasureError, MeasurementSession, Outcome, LENGTH_PROMPT};
use crate::geometry::Point;
use crate::options::Options;
use crate::scale::DialogResult;
use crate::view::{self, DrawCommand};

pub const INSTRUCTIONS: &str = "Pick scale with right mouse button, circles with left.";

const MARKER_HALF_SIZE: f32 = 6.0;
const SCALE_TICK_HALF_LENGTH: f32 = 10.0;
const LABEL_PADDING: f32 = 4.0;

// ── App ─────────────────────────────────────────────────────────────────────

pub struct MeasureApp {
    pending_image: Option<RgbaImage>,
    texture: Option<egui::TextureHandle>,
    image_size: (f32, f32),

    session: MeasurementSession,
    options: Options,

    // Some while the scale length prompt is open
    length_input: Option<String>,
    status: String,

    // pan & zoom
    pan: egui::Vec2,
    zoom: f32,
    panning: bool,
}

impl MeasureApp {
    pub fn new(image: RgbaImage, options: Options) -> Self {
        let image_size = (image.width() as f32, image.height() as f32);
        Self {
            pending_image: Some(image),
            texture: None,
            image_size,
            session: MeasurementSession::new(options.palette.len()),
            options,
            length_input: None,
            status: String::new(),
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            panning: false,
        }
    }

    /// Convert image-space coords to screen-space
    fn image_to_screen(&self, canvas_rect: egui::Rect, img_pos: Point) -> egui::Pos2 {
        let center = canvas_rect.center();
        let img_pos = egui::vec2(img_pos.x as f32, img_pos.y as f32);
        center
            + self.pan
            + (img_pos - egui::vec2(self.image_size.0, self.image_size.1) * 0.5) * self.zoom
    }

    /// Convert screen-space coords to image-space
    fn screen_to_image(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> Point {
        let center = canvas_rect.center();
        let rel = screen_pos - center - self.pan;
        Point::new(
            (rel.x / self.zoom + self.image_size.0 * 0.5) as f64,
            (rel.y / self.zoom + self.image_size.1 * 0.5) as f64,
        )
    }

    fn image_rect_on_screen(&self, canvas_rect: egui::Rect) -> egui::Rect {
        let top_left = self.image_to_screen(canvas_rect, Point::new(0.0, 0.0));
        let bot_right = self.image_to_screen(
            canvas_rect,
            Point::new(self.image_size.0 as f64, self.image_size.1 as f64),
        );
        egui::Rect::from_min_max(top_left, bot_right)
    }

    fn contains_image_point(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.image_size.0 as f64 && p.y < self.image_size.1 as f64
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let Some(rgba) = self.pending_image.take() else {
            return;
        };
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("micrograph", color_image, egui::TextureOptions::LINEAR));
    }

    // ── Session input ───────────────────────────────────────────────────────

    fn dispatch(&mut self, ctx: &egui::Context, event: InputEvent) {
        match self.session.handle_event(event) {
            Ok(outcome) => {
                if let Outcome::LengthRequested { .. } = outcome {
                    self.length_input = Some(String::new());
                }
                self.status = self.describe(&outcome);
            }
            Err(e) => self.notify(&e),
        }
        ctx.request_repaint();
    }

    fn describe(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::ScaleEndpointAdded { replaced_scale: true } => {
                "Previous scale discarded; pick the second scale endpoint".to_string()
            }
            Outcome::ScaleEndpointAdded { replaced_scale: false } => {
                "Pick the second scale endpoint".to_string()
            }
            Outcome::LengthRequested { prompt } => prompt.to_string(),
            Outcome::ScaleCommitted(scale) => format!(
                "{} over {:.1} px",
                view::scale_label(scale.physical_length, &self.options),
                scale.pixel_length
            ),
            Outcome::PointPicked { pending } => format!("Circle: {pending}/3 points"),
            Outcome::CircleRecorded(m) => format!(
                "Circle #{}: {}",
                m.index + 1,
                view::radius_label(m.physical_radius, &self.options)
            ),
        }
    }

    /// Blocking notice for a rejected operation.
    fn notify(&mut self, error: &MeasureError) {
        self.status = error.to_string();
        let level = if error.is_error() {
            rfd::MessageLevel::Error
        } else {
            rfd::MessageLevel::Warning
        };
        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(error.title())
            .set_description(error.to_string())
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn handle_click(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect, response: &egui::Response) {
        let click: fn(f64, f64) -> ClickEvent = if response.clicked_by(egui::PointerButton::Primary) {
            ClickEvent::primary
        } else if response.clicked_by(egui::PointerButton::Secondary) {
            ClickEvent::secondary
        } else {
            return;
        };
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let p = self.screen_to_image(canvas_rect, pos);
        if !self.contains_image_point(p) {
            log::debug!("ignoring click outside the image at ({:.1}, {:.1})", p.x, p.y);
            return;
        }
        self.dispatch(ctx, InputEvent::Click(click(p.x, p.y)));
    }

    fn show_length_dialog(&mut self, ctx: &egui::Context) {
        let Some(buffer) = self.length_input.as_mut() else {
            return;
        };
        let unit = &self.options.unit_label;

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Set Scale Length")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(LENGTH_PROMPT);
                    ui.text_edit_singleline(buffer).request_focus();
                    ui.label(unit.trim());
                });
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    confirmed = ui.button("OK").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });
        ctx.input(|i| {
            confirmed |= i.key_pressed(egui::Key::Enter);
            cancelled |= i.key_pressed(egui::Key::Escape);
        });

        let answer = if confirmed {
            DialogResult::Submitted(self.length_input.take().unwrap_or_default())
        } else if cancelled {
            self.length_input = None;
            DialogResult::Cancelled
        } else {
            return;
        };
        self.dispatch(ctx, InputEvent::Dialog(answer));
    }

    // ── Rendering ───────────────────────────────────────────────────────────

    fn draw_session(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        for command in view::draw_commands(&self.session, &self.options) {
            match command {
                DrawCommand::Marker { at, fill, edge } => {
                    let s = self.image_to_screen(canvas_rect, at);
                    let d = egui::vec2(MARKER_HALF_SIZE, MARKER_HALF_SIZE);
                    let d_flip = egui::vec2(MARKER_HALF_SIZE, -MARKER_HALF_SIZE);
                    for (stroke_width, color) in [(4.5_f32, edge), (2.0_f32, fill)] {
                        let stroke = egui::Stroke::new(stroke_width, color.to_egui());
                        painter.line_segment([s - d, s + d], stroke);
                        painter.line_segment([s - d_flip, s + d_flip], stroke);
                    }
                }
                DrawCommand::ScaleLine {
                    from,
                    to,
                    label,
                    label_at,
                    color,
                } => {
                    let stroke = egui::Stroke::new(self.options.scale_thickness, color.to_egui());
                    let a = self.image_to_screen(canvas_rect, from);
                    let b = self.image_to_screen(canvas_rect, to);
                    painter.line_segment([a, b], stroke);
                    let tick = egui::vec2(0.0, SCALE_TICK_HALF_LENGTH);
                    painter.line_segment([a - tick, a + tick], stroke);
                    painter.line_segment([b - tick, b + tick], stroke);
                    self.draw_label(
                        painter,
                        self.image_to_screen(canvas_rect, label_at),
                        label,
                        egui::Color32::from_white_alpha(217),
                    );
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    label,
                    color,
                } => {
                    let c = self.image_to_screen(canvas_rect, center);
                    painter.circle_stroke(
                        c,
                        radius as f32 * self.zoom,
                        egui::Stroke::new(self.options.circle_thickness, color.to_egui()),
                    );
                    self.draw_label(painter, c, label, color.with_alpha(0.85).to_egui());
                }
            }
        }
    }

    fn draw_label(&self, painter: &egui::Painter, at: egui::Pos2, text: String, background: egui::Color32) {
        let galley = painter.layout_no_wrap(
            text,
            egui::FontId::proportional(self.options.label_font_size),
            egui::Color32::BLACK,
        );
        let rect = egui::Rect::from_center_size(at, galley.size()).expand(LABEL_PADDING);
        painter.rect_filled(rect, 2.0, background);
        painter.rect_stroke(
            rect,
            2.0,
            egui::Stroke::new(1.0, egui::Color32::from_gray(178)),
            egui::StrokeKind::Middle,
        );
        painter.galley(rect.min + egui::vec2(LABEL_PADDING, LABEL_PADDING), galley, egui::Color32::BLACK);
    }

    fn draw_crosshair(&self, ctx: &egui::Context, painter: &egui::Painter, image_rect: egui::Rect, pos: egui::Pos2) {
        if !image_rect.contains(pos) {
            return;
        }
        ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
        let stroke = egui::Stroke::new(1.0, self.options.cursor_color.to_egui());
        painter.hline(image_rect.x_range(), pos.y, stroke);
        painter.vline(pos.x, image_rect.y_range(), stroke);
    }

    fn show_measurement_panel(&self, ctx: &egui::Context) {
        egui::SidePanel::right("measurements").show(ctx, |ui| {
            ui.heading("Circles");
            if let Some(scale) = self.session.scale() {
                ui.label(format!(
                    "{} = {:.1} px",
                    view::scale_label(scale.physical_length, &self.options),
                    scale.pixel_length
                ));
            } else {
                ui.label("Scale not set");
            }
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("circle_table").striped(true).show(ui, |ui| {
                    ui.strong("#");
                    ui.strong("Center (px)");
                    ui.strong("Radius (px)");
                    ui.strong(format!("Radius ({})", self.options.unit_label.trim()));
                    ui.end_row();

                    for m in self.session.measurements().iter() {
                        let color = self.options.palette_color(m.color_index).to_egui();
                        ui.colored_label(color, format!("● {}", m.index + 1));
                        ui.label(format!("{:.1}, {:.1}", m.center.x, m.center.y));
                        ui.label(format!("{:.2}", m.radius));
                        ui.label(format!("{:.4}", m.physical_radius));
                        ui.end_row();
                    }
                });
            });
        });
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for MeasureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        // Top bar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(INSTRUCTIONS);
                ui.separator();
                ui.label(self.status.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Zoom: {:.0}%", self.zoom * 100.0));
                });
            });
        });

        self.show_measurement_panel(ctx);

        // Canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;
            let image_rect = self.image_rect_on_screen(canvas_rect);

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
            if let Some(ref tex) = self.texture {
                painter.image(
                    tex.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            self.draw_session(&painter, canvas_rect);
            if let Some(pos) = response.hover_pos() {
                self.draw_crosshair(ctx, &painter, image_rect, pos);
            }

            // Handle pan (middle mouse button)
            let middle_down = ctx.input(|i| i.pointer.middle_down());
            if middle_down {
                let delta = ctx.input(|i| i.pointer.delta());
                self.pan += delta;
                self.panning = true;
            } else {
                self.panning = false;
            }

            // Handle zoom (scroll wheel)
            let scroll_delta = ctx.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 && response.hovered() {
                let zoom_factor = 1.0 + scroll_delta * 0.002;
                let new_zoom = (self.zoom * zoom_factor).clamp(0.1, 20.0);
                if let Some(cursor) = response.hover_pos() {
                    let center = canvas_rect.center();
                    let cursor_rel = cursor - center - self.pan;
                    self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
                }
                self.zoom = new_zoom;
            }

            // Click dispatch is suspended while the length prompt is open
            if !self.panning && !self.session.awaiting_length() {
                self.handle_click(ctx, canvas_rect, &response);
            }
        });

        self.show_length_dialog(ctx);
    }
}
