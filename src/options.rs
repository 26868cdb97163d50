//! Display options, read from a TOML file.
//!
//! Every field has a default, so a partial file (or no file at all) works.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "circle_measure.toml";

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color4 {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_egui(&self) -> egui::Color32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        )
    }
}

/// yellow, orange, red, violet, light blue
pub const DEFAULT_PALETTE: [Color4; 5] = [
    Color4::rgb(1.0, 1.0, 0.0),
    Color4::rgb(1.0, 0.647, 0.0),
    Color4::rgb(1.0, 0.0, 0.0),
    Color4::rgb(0.933, 0.51, 0.933),
    Color4::rgb(0.678, 0.847, 0.902),
];

// ── Options ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Appended to every physical length, e.g. "E-6 m" for micrometres.
    pub unit_label: String,
    pub palette: Vec<Color4>,
    pub marker_fill: Color4,
    pub marker_edge: Color4,
    pub scale_color: Color4,
    pub cursor_color: Color4,
    pub circle_thickness: f32,
    pub scale_thickness: f32,
    pub label_font_size: f32,
    pub window_size: [f32; 2],
}

impl Default for Options {
    fn default() -> Self {
        Self {
            unit_label: "E-6 m".to_string(),
            palette: DEFAULT_PALETTE.to_vec(),
            marker_fill: Color4::rgb(1.0, 1.0, 1.0),
            marker_edge: Color4::rgb(0.0, 0.0, 1.0),
            scale_color: Color4::rgb(0.0, 0.5, 0.0),
            cursor_color: Color4::rgb(0.0, 1.0, 0.0),
            circle_thickness: 4.0,
            scale_thickness: 3.0,
            label_font_size: 14.0,
            window_size: [1200.0, 800.0],
        }
    }
}

impl Options {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let mut options: Options = toml::from_str(text)?;
        if options.palette.is_empty() {
            log::warn!("empty palette in options, using the default palette");
            options.palette = DEFAULT_PALETTE.to_vec();
        }
        Ok(options)
    }

    /// Load options, falling back to defaults when the file is missing or
    /// malformed.
    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(options) => {
                    log::info!("options loaded from {}", path.display());
                    options
                }
                Err(e) => {
                    log::warn!("malformed options file {}, using defaults: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("no options file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// `circle_measure.toml` next to the executable.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    pub fn palette_color(&self, color_index: usize) -> Color4 {
        self.palette
            .get(color_index % self.palette.len().max(1))
            .copied()
            .unwrap_or(DEFAULT_PALETTE[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let options = Options::from_toml("unit_label = \" mm\"\ncircle_thickness = 2.5\n").unwrap();
        assert_eq!(options.unit_label, " mm");
        assert_eq!(options.circle_thickness, 2.5);
        assert_eq!(options.palette, DEFAULT_PALETTE.to_vec());
        assert_eq!(options.window_size, [1200.0, 800.0]);
    }

    #[test]
    fn custom_palette_and_alpha_default() {
        let text = r#"
            palette = [
                { r = 0.0, g = 0.0, b = 1.0 },
                { r = 1.0, g = 0.0, b = 0.0, a = 0.5 },
            ]
        "#;
        let options = Options::from_toml(text).unwrap();
        assert_eq!(options.palette.len(), 2);
        assert_eq!(options.palette[0].a, 1.0);
        assert_eq!(options.palette_color(3), Color4::rgb(1.0, 0.0, 0.0).with_alpha(0.5));
    }

    #[test]
    fn empty_palette_falls_back() {
        let options = Options::from_toml("palette = []").unwrap();
        assert_eq!(options.palette, DEFAULT_PALETTE.to_vec());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = std::env::temp_dir().join(format!("circle-measure-opts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "circle_thickness = \"thick\"").unwrap();
        assert_eq!(Options::load_from_file(&path), Options::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = Path::new("/nonexistent/circle_measure.toml");
        assert_eq!(Options::load_from_file(path), Options::default());
    }

    #[test]
    fn color_conversion_rounds_and_clamps() {
        let c = Color4::rgb(1.0, 0.5, 2.0).with_alpha(-1.0).to_egui();
        assert_eq!(c, egui::Color32::from_rgba_unmultiplied(255, 128, 255, 0));
    }
}
