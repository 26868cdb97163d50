//! Routes operator input to the scale calibration and the circle picker.
//!
//! All session state lives in [`MeasurementSession`]. Input arrives as tagged
//! [`InputEvent`]s through [`MeasurementSession::handle_event`], so a whole
//! session can be replayed without a window.

use crate::annotations::{CircleAnnotationStore, CircleMeasurement};
use crate::geometry::{circle_from_three_points, GeometryError, Point};
use crate::picks::{PickError, PointPickBuffer};
use crate::scale::{CalibrationError, DialogResult, Scale, ScaleCalibration, ScaleStep};

pub const LENGTH_PROMPT: &str = "Set the length of the scale:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    /// Picks circle boundary points.
    Primary,
    /// Picks scale endpoints.
    Secondary,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickEvent {
    pub button: Button,
    pub x: f64,
    pub y: f64,
}

impl ClickEvent {
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            button: Button::Primary,
            x,
            y,
        }
    }

    pub fn secondary(x: f64, y: f64) -> Self {
        Self {
            button: Button::Secondary,
            x,
            y,
        }
    }

    fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Click(ClickEvent),
    Dialog(DialogResult),
}

/// Observable effect of an accepted event.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    ScaleEndpointAdded { replaced_scale: bool },
    /// The operator must now answer a length prompt; clicks are rejected until
    /// a `InputEvent::Dialog` arrives.
    LengthRequested { prompt: &'static str },
    ScaleCommitted(Scale),
    PointPicked { pending: usize },
    CircleRecorded(CircleMeasurement),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MeasureError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Pick(#[from] PickError),
}

impl MeasureError {
    /// Title for the notice shown to the operator.
    pub fn title(&self) -> &'static str {
        match self {
            MeasureError::Geometry(_) => "Circle not recorded",
            MeasureError::Calibration(CalibrationError::InvalidInput(_))
            | MeasureError::Calibration(CalibrationError::NonPositiveLength(_)) => "Bad input",
            MeasureError::Calibration(_) => "Scale",
            MeasureError::Pick(_) => "Error",
        }
    }

    /// Whether the notice is an error rather than a warning.
    pub fn is_error(&self) -> bool {
        matches!(self, MeasureError::Pick(_) | MeasureError::Geometry(_))
    }
}

/// Blocking numeric prompt, for collaborators that can answer synchronously.
pub trait NumericInput {
    fn request_numeric_input(&mut self, prompt: &str) -> DialogResult;
}

#[derive(Clone, Debug)]
pub struct MeasurementSession {
    calibration: ScaleCalibration,
    picks: PointPickBuffer,
    store: CircleAnnotationStore,
}

impl MeasurementSession {
    pub fn new(palette_size: usize) -> Self {
        Self {
            calibration: ScaleCalibration::new(),
            picks: PointPickBuffer::new(),
            store: CircleAnnotationStore::new(palette_size),
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Result<Outcome, MeasureError> {
        let result = match event {
            InputEvent::Click(click) => self.on_click(click),
            InputEvent::Dialog(answer) => self.on_dialog(answer),
        };
        if let Err(e) = &result {
            log::warn!("rejected: {e}");
        }
        result
    }

    /// Handle a click and, if it asks for a scale length, answer the prompt
    /// through `input` before returning.
    pub fn dispatch_click(
        &mut self,
        click: ClickEvent,
        input: &mut impl NumericInput,
    ) -> Result<Outcome, MeasureError> {
        match self.handle_event(InputEvent::Click(click))? {
            Outcome::LengthRequested { prompt } => {
                let answer = input.request_numeric_input(prompt);
                self.handle_event(InputEvent::Dialog(answer))
            }
            outcome => Ok(outcome),
        }
    }

    fn on_click(&mut self, click: ClickEvent) -> Result<Outcome, MeasureError> {
        if self.calibration.awaiting_length() {
            return Err(CalibrationError::AwaitingLength.into());
        }
        log::debug!("{:?} click at ({:.1}, {:.1})", click.button, click.x, click.y);
        match click.button {
            Button::Primary => self.pick_circle_point(click.point()),
            Button::Secondary => self.pick_scale_endpoint(click.point()),
        }
    }

    fn pick_circle_point(&mut self, p: Point) -> Result<Outcome, MeasureError> {
        let Some([a, b, c]) = self.picks.add_point(p, &self.calibration)? else {
            return Ok(Outcome::PointPicked {
                pending: self.picks.pending().len(),
            });
        };

        let circle = circle_from_three_points(a, b, c)?;
        let factor = self.calibration.current_factor()?;
        if !(circle.radius * factor).is_finite() {
            return Err(GeometryError::NonFinite.into());
        }
        let m = self.store.record([a, b, c], circle, factor);
        log::info!(
            "circle #{} recorded: center ({:.2}, {:.2}), radius {:.3} px, {:.4} units",
            m.index + 1,
            m.center.x,
            m.center.y,
            m.radius,
            m.physical_radius
        );
        Ok(Outcome::CircleRecorded(m.clone()))
    }

    fn pick_scale_endpoint(&mut self, p: Point) -> Result<Outcome, MeasureError> {
        match self.calibration.add_endpoint(p)? {
            ScaleStep::FirstEndpoint { replaced } => Ok(Outcome::ScaleEndpointAdded {
                replaced_scale: replaced,
            }),
            ScaleStep::LengthRequested => Ok(Outcome::LengthRequested {
                prompt: LENGTH_PROMPT,
            }),
        }
    }

    fn on_dialog(&mut self, answer: DialogResult) -> Result<Outcome, MeasureError> {
        let scale = self.calibration.submit_length(answer)?;
        log::info!(
            "scale committed: {} px = {} units ({:.6} units/px)",
            scale.pixel_length,
            scale.physical_length,
            scale.units_per_pixel
        );
        Ok(Outcome::ScaleCommitted(scale))
    }

    pub fn calibration(&self) -> &ScaleCalibration {
        &self.calibration
    }

    pub fn scale(&self) -> Option<&Scale> {
        self.calibration.scale()
    }

    pub fn awaiting_length(&self) -> bool {
        self.calibration.awaiting_length()
    }

    pub fn pending_points(&self) -> &[Point] {
        self.picks.pending()
    }

    pub fn measurements(&self) -> &CircleAnnotationStore {
        &self.store
    }
}
