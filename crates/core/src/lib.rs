pub mod bbox;
pub mod color;
pub mod compose;
pub mod config;
pub mod document;
mod error;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod structure;
pub mod style;
pub mod svg;

use serde::Serialize;

pub use color::{ColorScale, Rgb, COLOR_SCALE, DEFAULT_FILL};
pub use compose::{BundledResources, Compositor, DirectoryResources, ResourceLocator};
pub use config::{load_options, RenderOptions};
pub use document::SvgDocument;
pub use error::{Error, LayoutError, Result, StructureError};
pub use layout::{LayoutEngine, Point, PolygonLayout};
pub use model::DrawableModel;
pub use pipeline::{ComparisonMapper, FragmentComparison, StructureDeriver, Visualizer};
pub use structure::DotBracket;

#[derive(Serialize)]
struct LayoutDump<'a> {
    sequence: &'a str,
    structure: &'a str,
    pairs: Vec<Option<usize>>,
    nicks: &'a [usize],
    positions: Vec<Point>,
}

/// Partner table and unit coordinates of `structure` as JSON.
pub fn layout_json(structure: &DotBracket, engine: &dyn LayoutEngine) -> Result<String> {
    let model = DrawableModel::from_dot_bracket(structure)?;
    let pairs = model.pairs();
    let positions = engine.compute_layout(&pairs, model.nicks())?;
    let dump = LayoutDump {
        sequence: structure.sequence(),
        structure: structure.structure(),
        pairs,
        nicks: model.nicks(),
        positions,
    };
    Ok(serde_json::to_string(&dump)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_json_lists_pairs_and_positions() {
        let json = layout_json(&DotBracket::new("GAC", "(.)"), &PolygonLayout::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pairs"], serde_json::json!([2, null, 0]));
        assert_eq!(value["nicks"], serde_json::json!([0]));
        assert_eq!(value["positions"].as_array().unwrap().len(), 3);
        assert_eq!(value["positions"][0]["x"], 0.0);
    }

    #[test]
    fn layout_json_rejects_bad_structure() {
        let err = layout_json(&DotBracket::new("GA", "(("), &PolygonLayout::default()).unwrap_err();
        assert!(matches!(err, Error::Layout(LayoutError::UnmatchedOpening(_))));
    }
}
