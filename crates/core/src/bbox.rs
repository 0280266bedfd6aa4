use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::document::SvgDocument;
use crate::error::{Error, Result};

static FONTS: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

/// Axis-aligned box in root user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Tight visual extent of everything drawn in `doc`, strokes included.
///
/// The root's viewBox, width and height are dropped before measuring, so
/// the result is in root user units and does not depend on an earlier
/// normalization. Returns `None` when nothing is drawn.
pub fn bounding_box(doc: &SvgDocument) -> Result<Option<BoundingBox>> {
    let mut root = doc.root().clone();
    for key in ["viewBox", "width", "height"] {
        root.remove_attribute(key);
    }
    let text = SvgDocument::from_root(root).to_string();

    let options = usvg::Options {
        fontdb: FONTS.clone(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(&text, &options).map_err(|e| Error::Document(e.to_string()))?;
    let group = tree.root();
    if group.children().is_empty() {
        return Ok(None);
    }

    let r = group.abs_stroke_bounding_box();
    let bbox = BoundingBox {
        min_x: r.left() as f64,
        min_y: r.top() as f64,
        max_x: r.right() as f64,
        max_y: r.bottom() as f64,
    };
    Ok([bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y]
        .iter()
        .all(|v| v.is_finite())
        .then_some(bbox))
}

/// Rewrite the root viewBox, width and height to the tight extent.
///
/// A document with nothing drawn gets a `0 0 0 0` viewport.
pub fn normalize(doc: &mut SvgDocument) -> Result<Option<BoundingBox>> {
    let bbox = bounding_box(doc)?;
    let (x, y, w, h) = bbox
        .map(|b| (b.min_x, b.min_y, b.width(), b.height()))
        .unwrap_or_default();
    let root = doc.root_mut();
    root.set_attribute(
        "viewBox",
        format!("{} {} {} {}", fmt_num(x), fmt_num(y), fmt_num(w), fmt_num(h)),
    );
    root.set_attribute("width", fmt_num(w));
    root.set_attribute("height", fmt_num(h));
    log::debug!("normalized viewBox to {x} {y} {w} {h}");
    Ok(bbox)
}

/// Shortest decimal form, rounded to 1e-4 so float noise never shows up.
pub(crate) fn fmt_num(v: f64) -> String {
    let r = (v * 1e4).round() / 1e4;
    let r = if r == 0.0 { 0.0 } else { r };
    format!("{r}")
}

/// Parse a length, accepting an optional `px` suffix.
pub(crate) fn parse_length(value: &str) -> Option<f64> {
    let v = value.trim();
    let v = v.strip_suffix("px").unwrap_or(v);
    v.trim().parse().ok().filter(|n: &f64| n.is_finite())
}

/// Parse a `viewBox` value into (x, y, width, height).
pub(crate) fn parse_view_box(value: &str) -> Option<(f64, f64, f64, f64)> {
    let nums: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match nums[..] {
        [x, y, w, h] => Some((x, y, w, h)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> SvgDocument {
        SvgDocument::parse(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="-500 -500 2000 2000" width="2000" height="2000">{body}</svg>"#
        ))
        .unwrap()
    }

    fn measure(body: &str) -> BoundingBox {
        bounding_box(&doc(body)).unwrap().unwrap()
    }

    // stroke outlines are flattened, so allow a small tolerance
    fn assert_box(b: BoundingBox, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        let close = |a: f64, e: f64| (a - e).abs() < 0.05;
        assert!(
            close(b.min_x, min_x) && close(b.min_y, min_y) && close(b.max_x, max_x) && close(b.max_y, max_y),
            "got {b:?}, expected ({min_x}, {min_y}, {max_x}, {max_y})"
        );
    }

    #[test]
    fn circles_and_strokes() {
        let b = measure(r#"<circle cx="10" cy="20" r="5"/><circle cx="40" cy="20" r="5" stroke="black" stroke-width="2"/>"#);
        assert_box(b, 5.0, 14.0, 46.0, 26.0);
    }

    #[test]
    fn lines_with_round_caps() {
        let b = measure(
            r##"<g stroke="#000" stroke-width="4" stroke-linecap="round"><line x1="0" y1="0" x2="10" y2="0"/></g>"##,
        );
        assert_box(b, -2.0, -2.0, 12.0, 2.0);
    }

    #[test]
    fn group_transforms_apply() {
        let b = measure(r#"<g transform="translate(100 50) scale(2)"><rect x="0" y="0" width="10" height="5"/></g>"#);
        assert_box(b, 100.0, 50.0, 120.0, 60.0);
    }

    #[test]
    fn nested_viewport_maps_into_parent() {
        let b = measure(r#"<svg x="10" y="20" width="50" height="50" viewBox="0 0 100 100"><rect x="0" y="0" width="100" height="100"/></svg>"#);
        assert_box(b, 10.0, 20.0, 60.0, 70.0);
    }

    #[test]
    fn referenced_content_counts() {
        let b = measure(
            r##"<defs><circle id="c" r="10"/></defs><use xlink:href="#c" x="200" y="200"/><rect width="1" height="1"/>"##,
        );
        assert_box(b, 0.0, 0.0, 210.0, 210.0);
    }

    #[test]
    fn defs_and_hidden_are_ignored() {
        let b = measure(r#"<defs><rect width="1000" height="1000"/></defs><rect display="none" width="500" height="500"/><rect x="1" y="1" width="2" height="2"/>"#);
        assert_box(b, 1.0, 1.0, 3.0, 3.0);
    }

    #[test]
    fn normalize_rewrites_root() {
        let mut d = doc(r#"<rect x="1.5" y="-2" width="10" height="4"/>"#);
        let b = normalize(&mut d).unwrap().unwrap();
        assert_box(b, 1.5, -2.0, 11.5, 2.0);
        let root = d.root();
        assert_eq!(root.attribute("viewBox"), Some("1.5 -2 10 4"));
        assert_eq!(root.attribute("width"), Some("10"));
        assert_eq!(root.attribute("height"), Some("4"));
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut d = doc(r#"<g transform="rotate(30)"><circle cx="3" cy="7" r="2.25" stroke="red"/><path d="M0 0 C 10 -20 30 20 40 0"/></g>"#);
        normalize(&mut d).unwrap();
        let once = d.clone();
        normalize(&mut d).unwrap();
        for attr in ["viewBox", "width", "height"] {
            assert_eq!(d.root().attribute(attr), once.root().attribute(attr));
        }
    }

    #[test]
    fn normalize_empty_document() {
        let mut d = SvgDocument::empty();
        assert_eq!(normalize(&mut d).unwrap(), None);
        assert_eq!(d.root().attribute("viewBox"), Some("0 0 0 0"));
        assert_eq!(d.root().attribute("width"), Some("0"));
        // a zero-sized root still measures
        assert_eq!(normalize(&mut d).unwrap(), None);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(-0.00001), "0");
        assert_eq!(fmt_num(3.14159265), "3.1416");
        assert_eq!(parse_length("12px"), Some(12.0));
        assert_eq!(parse_length("auto"), None);
        assert_eq!(parse_view_box("0, 0 10 20"), Some((0.0, 0.0, 10.0, 20.0)));
        assert_eq!(parse_view_box("0 0 10"), None);
    }
}
