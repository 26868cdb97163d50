use crate::geometry::{Circle, Point};

/// A recorded circle. `physical_radius` is frozen at creation: later changes
/// to the scale do not touch existing measurements.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleMeasurement {
    pub index: usize,
    pub points: [Point; 3],
    pub center: Point,
    pub radius: f64,
    pub color_index: usize,
    pub physical_radius: f64,
}

/// Append-only list of measurements for the session.
#[derive(Clone, Debug)]
pub struct CircleAnnotationStore {
    measurements: Vec<CircleMeasurement>,
    palette_size: usize,
}

impl CircleAnnotationStore {
    pub fn new(palette_size: usize) -> Self {
        Self {
            measurements: Vec::new(),
            palette_size: palette_size.max(1),
        }
    }

    pub fn record(
        &mut self,
        points: [Point; 3],
        circle: Circle,
        units_per_pixel: f64,
    ) -> &CircleMeasurement {
        let index = self.measurements.len();
        self.measurements.push(CircleMeasurement {
            index,
            points,
            center: circle.center,
            radius: circle.radius,
            color_index: index % self.palette_size,
            physical_radius: circle.radius * units_per_pixel,
        });
        &self.measurements[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CircleMeasurement> {
        self.measurements.iter()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}
