//! Measure circular features on a micrograph.
//!
//! Calibrate the scale with two right clicks on a reference bar, then pick
//! three boundary points per circle with the left button.

pub mod annotations;
pub mod app;
pub mod controller;
pub mod geometry;
pub mod options;
pub mod picks;
pub mod scale;
pub mod view;

pub use annotations::{CircleAnnotationStore, CircleMeasurement};
pub use app::MeasureApp;
pub use controller::{
    Button, ClickEvent, InputEvent, MeasureError, MeasurementSession, NumericInput, Outcome,
};
pub use geometry::{circle_from_three_points, Circle, GeometryError, Point};
pub use options::Options;
pub use picks::{PickError, PointPickBuffer};
pub use scale::{CalibrationError, DialogResult, Scale, ScaleCalibration};
