use crate::color::ColorScale;
use crate::model::Node;

/// Colour residue `i` by `scores[i]`.
///
/// Residues past the end of `scores` keep their current style and scores
/// past the last residue are ignored.
pub fn apply_scores(nodes: &mut [Node], scores: &[Option<f64>], scale: &ColorScale) {
    for (node, &score) in nodes.iter_mut().zip(scores) {
        node.style.fill = Some(scale.color_for(score));
    }
}
