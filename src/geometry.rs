/// A point in image space (pixels, origin top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("two of the picked points are vertically aligned; pick three new points")]
    VerticalChord,
    #[error("the picked points lie on a straight line; pick three new points")]
    CollinearPoints,
    #[error("the first two picked points are horizontally aligned; pick three new points")]
    DegenerateSlope,
    #[error("the picked points do not fit a circle of finite size; pick three new points")]
    NonFinite,
}

/// Circle through three points, from the intersection of the perpendicular
/// bisectors of the chords p1-p2 and p2-p3.
///
/// Both chords need a finite, distinct slope and the first one must not be
/// horizontal, otherwise the bisector solve divides by zero.
pub fn circle_from_three_points(p1: Point, p2: Point, p3: Point) -> Result<Circle, GeometryError> {
    if !(p1.is_finite() && p2.is_finite() && p3.is_finite()) {
        return Err(GeometryError::NonFinite);
    }
    if p1.x == p2.x || p3.x == p2.x {
        return Err(GeometryError::VerticalChord);
    }

    let (x1, y1, x2, y2, x3, y3) = (p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);
    let slope_1 = (y1 - y2) / (x1 - x2);
    let slope_2 = (y3 - y2) / (x3 - x2);

    if slope_1 == slope_2 {
        return Err(GeometryError::CollinearPoints);
    }
    if slope_1 == 0.0 {
        return Err(GeometryError::DegenerateSlope);
    }

    let cx = (slope_1 * slope_2 * (y3 - y1) + slope_1 * (x2 + x3) - slope_2 * (x1 + x2))
        / (2.0 * (slope_1 - slope_2));
    let cy = -(1.0 / slope_1) * (cx - (x1 + x2) / 2.0) + (y1 + y2) / 2.0;
    let radius = (x2 - cx).hypot(y2 - cy);
    if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    Ok(Circle {
        center: Point::new(cx, cy),
        radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn fit(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Result<Circle, GeometryError> {
        circle_from_three_points(Point::new(a.0, a.1), Point::new(b.0, b.1), Point::new(c.0, c.1))
    }

    #[test]
    fn fits_circle_centered_at_origin() {
        let circle = fit((2.0, 0.0), (0.0, 2.0), (-2.0, 0.0)).unwrap();
        assert_abs_diff_eq!(circle.center.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(circle.center.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(circle.radius, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn fits_offset_circle() {
        let circle = fit((10.0, 10.0), (20.0, 0.0), (30.0, 10.0)).unwrap();
        assert_abs_diff_eq!(circle.center.x, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(circle.center.y, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(circle.radius, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn every_input_point_lies_on_the_fitted_circle() {
        let (cx, cy, r) = (3.5_f64, -7.25_f64, 12.0_f64);
        let on = |deg: f64| {
            let t = deg.to_radians();
            Point::new(cx + r * t.cos(), cy + r * t.sin())
        };
        let points = [on(20.0), on(135.0), on(250.0)];
        let circle = circle_from_three_points(points[0], points[1], points[2]).unwrap();
        assert_abs_diff_eq!(circle.center.x, cx, epsilon = 1e-9);
        assert_abs_diff_eq!(circle.center.y, cy, epsilon = 1e-9);
        for p in points {
            let d = ((p.x - circle.center.x).powi(2) + (p.y - circle.center.y).powi(2)).sqrt();
            assert_abs_diff_eq!(d, circle.radius, epsilon = 1e-9);
        }
    }

    #[test]
    fn collinear_points_are_rejected() {
        assert_eq!(fit((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)), Err(GeometryError::CollinearPoints));
    }

    #[test]
    fn vertical_chords_are_rejected() {
        assert_eq!(fit((1.0, 0.0), (1.0, 5.0), (3.0, 2.0)), Err(GeometryError::VerticalChord));
        assert_eq!(fit((0.0, 0.0), (4.0, 1.0), (4.0, 3.0)), Err(GeometryError::VerticalChord));
    }

    #[test]
    fn horizontal_first_chord_is_rejected() {
        assert_eq!(fit((0.0, 0.0), (2.0, 0.0), (3.0, 1.0)), Err(GeometryError::DegenerateSlope));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert_eq!(fit((f64::NAN, 0.0), (2.0, 1.0), (3.0, 0.0)), Err(GeometryError::NonFinite));
    }

    #[test]
    fn overflowing_radius_is_rejected() {
        assert_eq!(
            fit((0.0, 0.0), (1e308, 1e308), (1.7e308, 0.0)),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn large_but_representable_circle_is_kept() {
        // squaring these offsets overflows, the radius itself does not
        let circle = fit((0.0, 0.0), (1e200, 1e200), (2e200, 0.0)).unwrap();
        assert_abs_diff_eq!(circle.center.x / 1e200, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(circle.radius / 1e200, 1.0, epsilon = 1e-9);
    }
}
