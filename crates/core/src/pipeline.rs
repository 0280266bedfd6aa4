//! The rendering façade.
//!
//! [`Visualizer`] runs styling, layout, normalization and legend merging in
//! order. Every stage returns a `Result`; the façade logs any failure and
//! hands back [`SvgDocument::empty`] instead, so callers always get a
//! well-formed document.

use std::sync::Arc;

use crate::bbox;
use crate::color::COLOR_SCALE;
use crate::compose::{BundledResources, Compositor, ResourceLocator};
use crate::config::RenderOptions;
use crate::document::SvgDocument;
use crate::error::{Result, StructureError};
use crate::layout::{LayoutEngine, PolygonLayout};
use crate::model::DrawableModel;
use crate::render::PlanarRenderer;
use crate::structure::DotBracket;
use crate::style::apply_scores;

/// Result of comparing a structural fragment against a reference.
pub trait FragmentComparison {
    /// Per-residue comparison record.
    type Residue;
    /// Descriptor of a torsion angle type taken into account.
    type AngleType;

    fn residue_comparisons(&self) -> &[Self::Residue];
    fn angle_types(&self) -> &[Self::AngleType];
}

/// Turns per-residue comparison records into one score per residue.
pub trait ComparisonMapper<C: FragmentComparison> {
    fn map(&self, residues: &[C::Residue], angle_types: &[C::AngleType]) -> Vec<Option<f64>>;
}

impl<C, F> ComparisonMapper<C> for F
where
    C: FragmentComparison,
    F: Fn(&[C::Residue], &[C::AngleType]) -> Vec<Option<f64>>,
{
    fn map(&self, residues: &[C::Residue], angle_types: &[C::AngleType]) -> Vec<Option<f64>> {
        self(residues, angle_types)
    }
}

/// Extracts the canonical secondary structure of a compared fragment.
pub trait StructureDeriver<C> {
    fn derive(&self, comparison: &C) -> std::result::Result<DotBracket, StructureError>;
}

impl<C, F> StructureDeriver<C> for F
where
    F: Fn(&C) -> std::result::Result<DotBracket, StructureError>,
{
    fn derive(&self, comparison: &C) -> std::result::Result<DotBracket, StructureError> {
        self(comparison)
    }
}

#[derive(Clone)]
pub struct Visualizer {
    renderer: PlanarRenderer,
    compositor: Compositor,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::with_options(RenderOptions::default())
    }
}

impl Visualizer {
    pub fn new(
        engine: Arc<dyn LayoutEngine + Send + Sync>,
        resources: Arc<dyn ResourceLocator + Send + Sync>,
        options: RenderOptions,
    ) -> Self {
        let compositor = Compositor::new(resources, options.legend.clone());
        Self {
            renderer: PlanarRenderer::new(engine, options),
            compositor,
        }
    }

    /// Polygon layout and the bundled legend.
    pub fn with_options(options: RenderOptions) -> Self {
        Self::new(
            Arc::new(PolygonLayout::default()),
            Arc::new(BundledResources),
            options,
        )
    }

    pub fn options(&self) -> &RenderOptions {
        self.renderer.options()
    }

    /// Render `structure` coloured by `scores`, merged with the legend.
    ///
    /// Never fails: on any error the cause is logged and an empty document
    /// is returned.
    pub fn visualize(&self, structure: &DotBracket, scores: &[Option<f64>]) -> SvgDocument {
        self.try_visualize(structure, scores).unwrap_or_else(|e| {
            log::error!("Failed to visualize secondary structure:\n{structure}: {e}");
            SvgDocument::empty()
        })
    }

    /// Like [`visualize`](Self::visualize) but hands the error back.
    pub fn try_visualize(
        &self,
        structure: &DotBracket,
        scores: &[Option<f64>],
    ) -> Result<SvgDocument> {
        let mut model = DrawableModel::from_dot_bracket(structure)?;
        apply_scores(model.nodes_mut(), scores, &COLOR_SCALE);
        log::debug!("styled {} of {} residues", scores.len().min(model.len()), model.len());

        let mut primary = self.renderer.render(&model)?;
        bbox::normalize(&mut primary)?;
        self.compositor.compose(primary)
    }

    /// Derive the structure of `comparison`, score it with `mapper` and
    /// render the result.
    pub fn visualize_comparison<C, M, D>(&self, comparison: &C, mapper: &M, deriver: &D) -> SvgDocument
    where
        C: FragmentComparison,
        M: ComparisonMapper<C> + ?Sized,
        D: StructureDeriver<C> + ?Sized,
    {
        let structure = match deriver.derive(comparison) {
            Ok(structure) => structure,
            Err(e) => {
                log::error!("Failed to extract canonical secondary structure: {e}");
                return SvgDocument::empty();
            }
        };
        let scores = mapper.map(comparison.residue_comparisons(), comparison.angle_types());
        self.visualize(&structure, &scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{DEFAULT_FILL, YL_OR_RD_4};
    use crate::error::LayoutError;
    use crate::layout::Point;

    struct Comparison {
        deltas: Vec<f64>,
        angles: Vec<&'static str>,
    }

    impl FragmentComparison for Comparison {
        type Residue = f64;
        type AngleType = &'static str;

        fn residue_comparisons(&self) -> &[f64] {
            &self.deltas
        }

        fn angle_types(&self) -> &[&'static str] {
            &self.angles
        }
    }

    fn fills(doc: &SvgDocument) -> Vec<String> {
        doc.root()
            .descendants_named("circle")
            .iter()
            .filter(|c| c.attribute("data-index").is_some())
            .filter_map(|c| c.attribute("fill").map(str::to_string))
            .collect()
    }

    #[test]
    fn malformed_input_yields_empty_document() {
        let vis = Visualizer::default();
        for (seq, db) in [
            ("GGA", "(()"),
            ("GA", ")("),
            ("GGAA", "((.."),
            ("GGAACC", "((.)"),
            ("G1", ".."),
            ("GAC", "(x)"),
        ] {
            let doc = vis.visualize(&DotBracket::new(seq, db), &[Some(0.5)]);
            assert_eq!(doc, SvgDocument::empty(), "{seq} {db}");
        }
    }

    #[test]
    fn hairpin_with_short_scores() {
        let vis = Visualizer::default();
        let scores = [Some(0.0), Some(1.0 / 3.0), Some(2.0 / 3.0), Some(1.0)];
        let doc = vis.visualize(&DotBracket::new("GGAACC", "((..))"), &scores);
        let expected: Vec<String> = YL_OR_RD_4
            .iter()
            .chain([DEFAULT_FILL, DEFAULT_FILL].iter())
            .map(ToString::to_string)
            .collect();
        assert_eq!(fills(&doc), expected);

        let regions: Vec<_> = doc.root().elements().collect();
        assert_eq!(regions[0].attribute("id"), Some("structure"));
        assert_eq!(regions[1].attribute("id"), Some("legend"));
    }

    struct Broken;

    impl LayoutEngine for Broken {
        fn compute_layout(
            &self,
            pairs: &[Option<usize>],
            _: &[usize],
        ) -> std::result::Result<Vec<Point>, LayoutError> {
            Err(LayoutError::Crossing(0, pairs.len()))
        }
    }

    #[test]
    fn layout_failure_is_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            temp_dir: Some(dir.path().to_path_buf()),
            ..RenderOptions::default()
        };
        let vis = Visualizer::new(Arc::new(Broken), Arc::new(BundledResources), options);
        let doc = vis.visualize(&DotBracket::new("GC", "()"), &[]);
        assert!(doc.is_blank());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_legend_is_absorbed() {
        let options = RenderOptions {
            legend: "missing.svg".into(),
            ..RenderOptions::default()
        };
        let vis = Visualizer::with_options(options);
        assert!(vis.visualize(&DotBracket::new("GC", "()"), &[]).is_blank());
    }

    #[test]
    fn comparison_path() {
        let comparison = Comparison {
            deltas: vec![0.0, 90.0, 180.0, 45.0],
            angles: vec!["alpha", "chi"],
        };
        let mapper = |deltas: &[f64], angles: &[&'static str]| -> Vec<Option<f64>> {
            assert_eq!(angles.len(), 2);
            deltas.iter().map(|d| Some(d / 180.0)).collect()
        };
        let deriver = |_: &Comparison| -> std::result::Result<DotBracket, StructureError> {
            DotBracket::from_pairs("GACC", &[Some(3), None, None, Some(0)])
        };
        let doc = Visualizer::default().visualize_comparison(&comparison, &mapper, &deriver);
        let fills = fills(&doc);
        assert_eq!(fills.len(), 4);
        assert_eq!(fills[0], YL_OR_RD_4[0].to_string());
        assert_eq!(fills[2], YL_OR_RD_4[3].to_string());
    }

    #[test]
    fn failed_derivation_yields_empty_document() {
        let comparison = Comparison {
            deltas: vec![],
            angles: vec![],
        };
        let mapper = |_: &[f64], _: &[&'static str]| -> Vec<Option<f64>> {
            panic!("mapper must not run when derivation fails")
        };
        let deriver = |_: &Comparison| -> std::result::Result<DotBracket, StructureError> {
            Err(StructureError::Invalid("no base pairs".into()))
        };
        let doc = Visualizer::default().visualize_comparison(&comparison, &mapper, &deriver);
        assert_eq!(doc, SvgDocument::empty());
    }
}
