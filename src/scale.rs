//! Two-endpoint scale calibration.
//!
//! The operator picks both ends of a reference segment (a scale bar burnt into
//! the micrograph) and then declares its physical length. Only the horizontal
//! separation of the endpoints counts as the segment's pixel length, so the
//! reference bar is expected to be horizontal.

use crate::geometry::Point;

/// Answer of the modal length prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum DialogResult {
    Submitted(String),
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("enter the scale length before picking more points")]
    AwaitingLength,
    #[error("no scale length was requested")]
    NoPendingQuery,
    #[error("scale calibration cancelled; pick both scale endpoints again")]
    Cancelled,
    #[error("scale length needs to be a number, got {0:?}; pick both scale endpoints again")]
    InvalidInput(String),
    #[error("scale length must be positive, got {0}; pick both scale endpoints again")]
    NonPositiveLength(f64),
    #[error("scale endpoints have no usable horizontal separation; pick both scale endpoints again")]
    ZeroPixelSpan,
    #[error("please set the scale before picking circles")]
    NotCalibrated,
}

/// A committed calibration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub endpoints: [Point; 2],
    pub physical_length: f64,
    pub pixel_length: f64,
    pub units_per_pixel: f64,
}

impl Scale {
    fn from_endpoints(a: Point, b: Point, physical_length: f64) -> Result<Self, CalibrationError> {
        let pixel_length = (a.x - b.x).abs();
        let units_per_pixel = physical_length / pixel_length;
        if pixel_length == 0.0 || !units_per_pixel.is_finite() {
            return Err(CalibrationError::ZeroPixelSpan);
        }
        Ok(Self {
            endpoints: [a, b],
            physical_length,
            pixel_length,
            units_per_pixel,
        })
    }

    /// Label anchor: horizontal and vertical middle of the segment.
    pub fn midpoint(&self) -> Point {
        let [a, b] = self.endpoints;
        Point::new(
            a.x.min(b.x) + self.pixel_length / 2.0,
            a.y.min(b.y) + (a.y - b.y).abs() / 2.0,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
enum State {
    #[default]
    Empty,
    OnePoint(Point),
    AwaitingLength([Point; 2]),
    Committed(Scale),
}

/// What `add_endpoint` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleStep {
    /// First endpoint stored. `replaced` is set when a committed scale was
    /// discarded to make room for it.
    FirstEndpoint { replaced: bool },
    /// Second endpoint stored; a physical length must be submitted next.
    LengthRequested,
}

#[derive(Clone, Debug, Default)]
pub struct ScaleCalibration {
    state: State,
}

impl ScaleCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_endpoint(&mut self, p: Point) -> Result<ScaleStep, CalibrationError> {
        match self.state {
            State::Empty => {
                self.state = State::OnePoint(p);
                Ok(ScaleStep::FirstEndpoint { replaced: false })
            }
            State::OnePoint(first) => {
                self.state = State::AwaitingLength([first, p]);
                Ok(ScaleStep::LengthRequested)
            }
            State::AwaitingLength(_) => Err(CalibrationError::AwaitingLength),
            State::Committed(_) => {
                log::info!("discarding committed scale for a new calibration");
                self.state = State::OnePoint(p);
                Ok(ScaleStep::FirstEndpoint { replaced: true })
            }
        }
    }

    /// Feed the operator's answer to a pending length request.
    ///
    /// Every failure drops both endpoints, so a failed attempt leaves no
    /// partial state behind.
    pub fn submit_length(&mut self, answer: DialogResult) -> Result<Scale, CalibrationError> {
        let State::AwaitingLength([a, b]) = self.state else {
            return Err(CalibrationError::NoPendingQuery);
        };
        self.state = State::Empty;

        let physical_length = match answer {
            DialogResult::Cancelled => return Err(CalibrationError::Cancelled),
            DialogResult::Submitted(text) => parse_length(&text)?,
        };
        let scale = Scale::from_endpoints(a, b, physical_length)?;
        self.state = State::Committed(scale);
        Ok(scale)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Committed(_))
    }

    pub fn awaiting_length(&self) -> bool {
        matches!(self.state, State::AwaitingLength(_))
    }

    pub fn current_factor(&self) -> Result<f64, CalibrationError> {
        self.scale()
            .map(|s| s.units_per_pixel)
            .ok_or(CalibrationError::NotCalibrated)
    }

    pub fn scale(&self) -> Option<&Scale> {
        match &self.state {
            State::Committed(scale) => Some(scale),
            _ => None,
        }
    }

    /// Endpoints picked so far, committed or not.
    pub fn endpoints(&self) -> &[Point] {
        match &self.state {
            State::Empty => &[],
            State::OnePoint(p) => std::slice::from_ref(p),
            State::AwaitingLength(pair) => pair,
            State::Committed(scale) => &scale.endpoints,
        }
    }
}

fn parse_length(text: &str) -> Result<f64, CalibrationError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| CalibrationError::InvalidInput(text.to_string()))?;
    if !value.is_finite() {
        return Err(CalibrationError::InvalidInput(text.to_string()));
    }
    if value <= 0.0 {
        return Err(CalibrationError::NonPositiveLength(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn awaiting(a: (f64, f64), b: (f64, f64)) -> ScaleCalibration {
        let mut cal = ScaleCalibration::new();
        cal.add_endpoint(Point::new(a.0, a.1)).unwrap();
        assert_eq!(cal.add_endpoint(Point::new(b.0, b.1)), Ok(ScaleStep::LengthRequested));
        cal
    }

    fn submitted(text: &str) -> DialogResult {
        DialogResult::Submitted(text.to_string())
    }

    #[test]
    fn derives_factor_from_horizontal_span() {
        let mut cal = awaiting((10.0, 0.0), (50.0, 0.0));
        let scale = cal.submit_length(submitted("4.0")).unwrap();
        assert_relative_eq!(scale.pixel_length, 40.0);
        assert_relative_eq!(scale.units_per_pixel, 0.1);
        assert!(cal.is_ready());
        assert_relative_eq!(cal.current_factor().unwrap(), 0.1);
    }

    #[test]
    fn vertical_offset_is_ignored() {
        let mut cal = awaiting((50.0, 30.0), (10.0, 0.0));
        let scale = cal.submit_length(submitted(" 4 ")).unwrap();
        assert_relative_eq!(scale.pixel_length, 40.0);
        let mid = scale.midpoint();
        assert_relative_eq!(mid.x, 30.0);
        assert_relative_eq!(mid.y, 15.0);
    }

    #[test]
    fn factor_is_unavailable_until_committed() {
        let mut cal = ScaleCalibration::new();
        assert_eq!(cal.current_factor(), Err(CalibrationError::NotCalibrated));
        cal.add_endpoint(Point::new(1.0, 1.0)).unwrap();
        assert!(!cal.is_ready());
        cal.add_endpoint(Point::new(5.0, 1.0)).unwrap();
        assert!(cal.awaiting_length());
        assert_eq!(cal.current_factor(), Err(CalibrationError::NotCalibrated));
    }

    #[test]
    fn third_endpoint_restarts_calibration() {
        let mut cal = awaiting((10.0, 0.0), (50.0, 0.0));
        cal.submit_length(submitted("4")).unwrap();

        let step = cal.add_endpoint(Point::new(7.0, 8.0)).unwrap();
        assert_eq!(step, ScaleStep::FirstEndpoint { replaced: true });
        assert!(!cal.is_ready());
        assert_eq!(cal.endpoints(), &[Point::new(7.0, 8.0)]);
        assert!(cal.scale().is_none());
    }

    #[test]
    fn endpoints_are_locked_while_length_is_pending() {
        let mut cal = awaiting((10.0, 0.0), (50.0, 0.0));
        assert_eq!(cal.add_endpoint(Point::new(99.0, 0.0)), Err(CalibrationError::AwaitingLength));
        assert_eq!(cal.endpoints(), &[Point::new(10.0, 0.0), Point::new(50.0, 0.0)]);
    }

    #[test]
    fn cancel_reverts_to_empty() {
        let mut cal = awaiting((10.0, 0.0), (50.0, 0.0));
        assert_eq!(cal.submit_length(DialogResult::Cancelled), Err(CalibrationError::Cancelled));
        assert!(cal.endpoints().is_empty());
        assert!(!cal.awaiting_length());
    }

    #[test]
    fn bad_lengths_revert_to_empty() {
        for (text, expected) in [
            ("abc", CalibrationError::InvalidInput("abc".into())),
            ("", CalibrationError::InvalidInput(String::new())),
            ("inf", CalibrationError::InvalidInput("inf".into())),
            ("0", CalibrationError::NonPositiveLength(0.0)),
            ("-3", CalibrationError::NonPositiveLength(-3.0)),
        ] {
            let mut cal = awaiting((10.0, 0.0), (50.0, 0.0));
            assert_eq!(cal.submit_length(submitted(text)), Err(expected));
            assert!(cal.endpoints().is_empty(), "input {text:?} left endpoints behind");
        }
    }

    #[test]
    fn zero_horizontal_span_is_rejected() {
        let mut cal = awaiting((10.0, 0.0), (10.0, 40.0));
        assert_eq!(cal.submit_length(submitted("4")), Err(CalibrationError::ZeroPixelSpan));
        assert!(cal.endpoints().is_empty());
    }

    #[test]
    fn subnormal_horizontal_span_is_rejected() {
        let mut cal = awaiting((0.0, 0.0), (1e-320, 0.0));
        assert_eq!(cal.submit_length(submitted("1")), Err(CalibrationError::ZeroPixelSpan));
        assert!(!cal.is_ready());
        assert!(cal.endpoints().is_empty());
    }

    #[test]
    fn answer_without_request_is_rejected() {
        let mut cal = ScaleCalibration::new();
        assert_eq!(cal.submit_length(submitted("4")), Err(CalibrationError::NoPendingQuery));
    }
}
