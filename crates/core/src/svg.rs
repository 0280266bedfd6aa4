use std::fmt::Write as _;
use std::io;

use crate::color::DEFAULT_FILL;
use crate::config::RenderOptions;
use crate::layout::Point;
use crate::model::DrawableModel;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Serialize a laid-out model as a standalone SVG document.
///
/// `positions` holds one point per residue in layout units. The canvas is
/// the padded extent of the residue centres, not the tight visual extent.
pub fn write_model<W: io::Write>(
    out: &mut W,
    model: &DrawableModel,
    positions: &[Point],
    opts: &RenderOptions,
) -> io::Result<()> {
    let svg = render(model, positions, opts);
    out.write_all(svg.as_bytes())
}

fn render(model: &DrawableModel, positions: &[Point], opts: &RenderOptions) -> String {
    let scale = opts.scale;
    let pts: Vec<(f64, f64)> = positions
        .iter()
        .map(|p| (p.x * scale, p.y * scale))
        .collect();

    let (min_x, min_y, max_x, max_y) = pts.iter().fold(
        (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64),
        |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    );
    let pad = opts.padding + opts.base_radius;
    let vb_x = min_x - pad;
    let vb_y = min_y - pad;
    let vb_w = (max_x - min_x) + 2.0 * pad;
    let vb_h = (max_y - min_y) + 2.0 * pad;

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        r#"<svg xmlns="{SVG_NS}" version="1.1" viewBox="{vb_x:.2} {vb_y:.2} {vb_w:.2} {vb_h:.2}" width="{vb_w:.2}" height="{vb_h:.2}">"#,
    );

    // Layer order (back → front): backbone, pair bonds, base markers, labels
    render_backbone(&mut svg, &pts, model.nicks(), opts);
    render_pair_bonds(&mut svg, &pts, model, opts);
    render_base_markers(&mut svg, &pts, model, opts);
    if opts.show_labels {
        render_labels(&mut svg, &pts, model, opts);
    }

    svg.push_str("</svg>");
    svg
}

fn render_backbone(svg: &mut String, pts: &[(f64, f64)], nicks: &[usize], opts: &RenderOptions) {
    if pts.len() < 2 {
        return;
    }
    svg.push_str(r#"<g class="backbone">"#);
    for i in 1..pts.len() {
        // no backbone across a strand break
        if nicks.contains(&i) {
            continue;
        }
        let (x1, y1) = pts[i - 1];
        let (x2, y2) = pts[i];
        let _ = write!(
            svg,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke-linecap="round" stroke-width="{}" stroke="{}"/>"#,
            opts.backbone_width,
            escape_attr(&opts.backbone_color)
        );
    }
    svg.push_str("</g>");
}

fn render_pair_bonds(
    svg: &mut String,
    pts: &[(f64, f64)],
    model: &DrawableModel,
    opts: &RenderOptions,
) {
    svg.push_str(r#"<g class="pairs">"#);
    for (i, node) in model.nodes().iter().enumerate() {
        let Some(j) = node.partner.filter(|&j| j > i) else {
            continue;
        };
        let (x1, y1) = pts[i];
        let (x2, y2) = pts[j];
        let _ = write!(
            svg,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke-linecap="round" stroke-width="{}" stroke="{}"/>"#,
            opts.pair_width,
            escape_attr(&opts.pair_color)
        );
    }
    svg.push_str("</g>");
}

fn render_base_markers(
    svg: &mut String,
    pts: &[(f64, f64)],
    model: &DrawableModel,
    opts: &RenderOptions,
) {
    svg.push_str(r#"<g class="bases">"#);
    for (i, (node, &(cx, cy))) in model.nodes().iter().zip(pts).enumerate() {
        let fill = node.style.fill.unwrap_or(DEFAULT_FILL);
        let _ = write!(
            svg,
            r#"<circle data-index="{i}" cx="{cx:.2}" cy="{cy:.2}" r="{}" fill="{fill}" stroke-width="{}" stroke="{}"/>"#,
            opts.base_radius,
            opts.base_stroke_width,
            escape_attr(&opts.base_outline)
        );
    }
    svg.push_str("</g>");
}

fn render_labels(svg: &mut String, pts: &[(f64, f64)], model: &DrawableModel, opts: &RenderOptions) {
    svg.push_str(r#"<g class="labels">"#);
    for (node, &(x, y)) in model.nodes().iter().zip(pts) {
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            opts.font_size, node.symbol
        );
    }
    svg.push_str("</g>");
}

pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}
