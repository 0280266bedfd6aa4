use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bbox::{fmt_num, parse_length, parse_view_box};
use crate::document::{Element, SvgDocument};
use crate::error::{Error, Result};

const BUNDLED: &[(&str, &str)] = &[(
    crate::config::DEFAULT_LEGEND,
    include_str!("../assets/score-legend.svg"),
)];

/// Looks up static SVG resources by logical name.
pub trait ResourceLocator {
    fn load(&self, name: &str) -> Result<String>;
}

/// Resources compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledResources;

impl ResourceLocator for BundledResources {
    fn load(&self, name: &str) -> Result<String> {
        BUNDLED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| Error::Resource {
                name: name.to_string(),
                reason: "no bundled resource with this name".into(),
            })
    }
}

/// Resources read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLocator for DirectoryResources {
    fn load(&self, name: &str) -> Result<String> {
        let resource = |reason: String| Error::Resource {
            name: name.to_string(),
            reason,
        };
        // names are logical, never paths
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(resource("not a plain resource name".into()));
        }
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|e| resource(format!("{}: {e}", path.display())))
    }
}

/// Merges a rendered structure with the legend resource.
#[derive(Clone)]
pub struct Compositor {
    locator: Arc<dyn ResourceLocator + Send + Sync>,
    legend: String,
}

impl Compositor {
    pub fn new(locator: Arc<dyn ResourceLocator + Send + Sync>, legend: impl Into<String>) -> Self {
        Self {
            locator,
            legend: legend.into(),
        }
    }

    pub fn load_legend(&self) -> Result<SvgDocument> {
        let text = self.locator.load(&self.legend)?;
        SvgDocument::parse(&text).map_err(|e| Error::Resource {
            name: self.legend.clone(),
            reason: e.to_string(),
        })
    }

    pub fn compose(&self, primary: SvgDocument) -> Result<SvgDocument> {
        let legend = self.load_legend()?;
        Ok(merge(primary, legend))
    }
}

/// Stack `primary` above `legend` as two nested `<svg>` regions.
///
/// Neither region is rescaled. The result's viewport is exactly the union
/// of the two regions, and the primary region comes first in document order.
pub fn merge(primary: SvgDocument, legend: SvgDocument) -> SvgDocument {
    let mut top = region(primary.into_root(), "structure", 0.0);
    let (top_w, top_h) = region_size(&top);
    let mut bottom = region(legend.into_root(), "legend", top_h);
    let (bottom_w, bottom_h) = region_size(&bottom);

    // nested regions inherit the namespace from the merged root
    top.remove_attribute("xmlns");
    bottom.remove_attribute("xmlns");

    let (w, h) = (top_w.max(bottom_w), top_h + bottom_h);
    let mut merged = SvgDocument::empty();
    let root = merged.root_mut();
    for (key, value) in top.attributes().chain(bottom.attributes()) {
        if key.starts_with("xmlns:") && root.attribute(key).is_none() {
            root.set_attribute(key, value);
        }
    }
    root.set_attribute("viewBox", format!("0 0 {} {}", fmt_num(w), fmt_num(h)));
    root.set_attribute("width", fmt_num(w));
    root.set_attribute("height", fmt_num(h));
    root.push(top);
    root.push(bottom);
    merged
}

fn region(mut root: Element, id: &str, y: f64) -> Element {
    let (w, h) = region_size(&root);
    root.set_attribute("id", id);
    root.set_attribute("x", "0");
    root.set_attribute("y", fmt_num(y));
    if root.attribute("width").is_none() {
        root.set_attribute("width", fmt_num(w));
    }
    if root.attribute("height").is_none() {
        root.set_attribute("height", fmt_num(h));
    }
    root
}

/// Width and height of an `<svg>` element, falling back to its viewBox.
fn region_size(root: &Element) -> (f64, f64) {
    let view_box = root.attribute("viewBox").and_then(parse_view_box);
    let w = root
        .attribute("width")
        .and_then(parse_length)
        .or(view_box.map(|v| v.2))
        .unwrap_or(0.0);
    let h = root
        .attribute("height")
        .and_then(parse_length)
        .or(view_box.map(|v| v.3))
        .unwrap_or(0.0);
    (w, h)
}
