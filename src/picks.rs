use crate::geometry::Point;
use crate::scale::ScaleCalibration;

const POINTS_PER_CIRCLE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PickError {
    #[error("please set the scale before picking circles")]
    ScaleNotReady,
}

/// Boundary points of the circle currently being picked.
#[derive(Clone, Debug, Default)]
pub struct PointPickBuffer {
    points: Vec<Point>,
}

impl PointPickBuffer {
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(POINTS_PER_CIRCLE),
        }
    }

    /// Add a boundary point. Returns the completed triple on the third point,
    /// with the buffer already emptied for the next circle.
    pub fn add_point(
        &mut self,
        p: Point,
        calibration: &ScaleCalibration,
    ) -> Result<Option<[Point; 3]>, PickError> {
        if !calibration.is_ready() {
            return Err(PickError::ScaleNotReady);
        }
        if self.points.len() >= POINTS_PER_CIRCLE {
            self.points.clear();
        }
        self.points.push(p);

        if let [a, b, c] = self.points[..] {
            self.points.clear();
            return Ok(Some([a, b, c]));
        }
        Ok(None)
    }

    pub fn pending(&self) -> &[Point] {
        &self.points
    }
}
