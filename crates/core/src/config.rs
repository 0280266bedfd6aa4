use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Name of the bundled score legend.
pub const DEFAULT_LEGEND: &str = "score-legend.svg";

/// Options controlling the drawing and the pipeline around it.
///
/// Every field has a default, so a partial JSON object is enough.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Pixels per layout unit (default: 30.0)
    pub scale: f64,
    /// Margin around the nominal canvas in pixels (default: 40.0)
    pub padding: f64,
    /// Backbone stroke width (default: 2.0)
    pub backbone_width: f64,
    /// Backbone stroke color (default: "#595959")
    pub backbone_color: String,
    /// Pair bond stroke width (default: 3.0)
    pub pair_width: f64,
    /// Pair bond stroke color (default: "#1f3b9e")
    pub pair_color: String,
    /// Base marker circle radius (default: 10.0)
    pub base_radius: f64,
    /// Base marker outline color (default: "#656565")
    pub base_outline: String,
    /// Base marker outline width (default: 1.0)
    pub base_stroke_width: f64,
    /// Whether to print residue symbols inside the markers (default: true)
    pub show_labels: bool,
    /// Label font size in pixels (default: 11.0)
    pub font_size: f64,
    /// Legend resource merged under the structure (default: "score-legend.svg")
    pub legend: String,
    /// Directory for temporary artifacts (default: the system temp dir)
    pub temp_dir: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 30.0,
            padding: 40.0,
            backbone_width: 2.0,
            backbone_color: "#595959".into(),
            pair_width: 3.0,
            pair_color: "#1f3b9e".into(),
            base_radius: 10.0,
            base_outline: "#656565".into(),
            base_stroke_width: 1.0,
            show_labels: true,
            font_size: 11.0,
            legend: DEFAULT_LEGEND.into(),
            temp_dir: None,
        }
    }
}

/// Read options from a JSON file, or return the defaults when no path is given.
pub fn load_options(path: Option<&Path>) -> Result<RenderOptions> {
    let Some(path) = path else {
        return Ok(RenderOptions::default());
    };
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
