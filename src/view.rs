//! Drawable primitives for the renderer, in image space.

use crate::controller::MeasurementSession;
use crate::geometry::Point;
use crate::options::{Color4, Options};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// A picked point.
    Marker { at: Point, fill: Color4, edge: Color4 },
    ScaleLine {
        from: Point,
        to: Point,
        label: String,
        label_at: Point,
        color: Color4,
    },
    Circle {
        center: Point,
        radius: f64,
        label: String,
        color: Color4,
    },
}

pub fn scale_label(physical_length: f64, options: &Options) -> String {
    format!("Scale length: {:.2}{}", physical_length, options.unit_label)
}

pub fn radius_label(physical_radius: f64, options: &Options) -> String {
    format!("Radius: {:.4}{}", physical_radius, options.unit_label)
}

/// Everything the session wants on screen, back to front: scale, circles,
/// then markers on top.
pub fn draw_commands(session: &MeasurementSession, options: &Options) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    let marker = |at: Point| DrawCommand::Marker {
        at,
        fill: options.marker_fill,
        edge: options.marker_edge,
    };

    match session.scale() {
        Some(scale) => commands.push(DrawCommand::ScaleLine {
            from: scale.endpoints[0],
            to: scale.endpoints[1],
            label: scale_label(scale.physical_length, options),
            label_at: scale.midpoint(),
            color: options.scale_color,
        }),
        None => commands.extend(session.calibration().endpoints().iter().copied().map(marker)),
    }

    for m in session.measurements().iter() {
        commands.push(DrawCommand::Circle {
            center: m.center,
            radius: m.radius,
            label: radius_label(m.physical_radius, options),
            color: options.palette_color(m.color_index),
        });
    }

    let recorded_points = session.measurements().iter().flat_map(|m| m.points);
    commands.extend(
        recorded_points
            .chain(session.pending_points().iter().copied())
            .map(marker),
    );
    commands
}
