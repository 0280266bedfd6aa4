use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::svg::{escape_attr, SVG_NS};

/// An owned SVG tree.
///
/// Parsing goes through `roxmltree`; the result is detached from the source
/// text so it can be edited and merged. Comments and processing
/// instructions are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    root: Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<SvgNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SvgNode {
    Element(Element),
    Text(String),
}

impl SvgDocument {
    /// A root `<svg>` with nothing drawn in it.
    pub fn empty() -> Self {
        let mut root = Element::new("svg");
        root.set_attribute("xmlns", SVG_NS);
        root.set_attribute("version", "1.1");
        Self { root }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text).map_err(|e| Error::Document(e.to_string()))?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(Error::Document(format!(
                "root element is <{}>, expected <svg>",
                root.tag_name().name()
            )));
        }
        let element = build_element(root);
        Ok(Self { root: element })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn from_root(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// True when the root has no child elements.
    pub fn is_blank(&self) -> bool {
        !self
            .root
            .children
            .iter()
            .any(|c| matches!(c, SvgNode::Element(_)))
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let at = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(at).1)
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(SvgNode::Element(child));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            SvgNode::Element(e) => Some(e),
            SvgNode::Text(_) => None,
        })
    }

    /// All descendant elements named `name`, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_named(self, name, &mut found);
        found
    }

    /// Concatenated text content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                SvgNode::Text(t) => out.push_str(t),
                SvgNode::Element(e) => out.push_str(&e.text()),
            }
        }
        out
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (k, v) in &self.attributes {
            write!(f, " {k}=\"{}\"", escape_attr(v))?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            match child {
                SvgNode::Element(e) => e.fmt(f)?,
                SvgNode::Text(t) => f.write_str(&escape_text(t))?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

fn collect_named<'a>(element: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in element.elements() {
        if child.name == name {
            found.push(child);
        }
        collect_named(child, name, found);
    }
}

/// Qualified name for a node or attribute in namespace `ns`.
fn qualified(node: roxmltree::Node<'_, '_>, ns: Option<&str>, local: &str) -> String {
    match ns {
        Some(uri) if uri != SVG_NS => match node.lookup_prefix(uri) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
            _ if uri == "http://www.w3.org/XML/1998/namespace" => format!("xml:{local}"),
            _ => local.to_string(),
        },
        _ => local.to_string(),
    }
}

/// `xmlns` attributes for the namespaces `node` brings into scope.
fn namespace_decls(node: roxmltree::Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    let mut decls: Vec<(String, String)> = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| {
            let key = match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            (key, ns.uri().to_string())
        })
        .collect();
    decls.sort();
    decls.dedup_by(|a, b| a.0 == b.0);
    decls
}

fn build_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(qualified(node, tag.namespace(), tag.name()));
    element.attributes = namespace_decls(node);
    for a in node.attributes() {
        element
            .attributes
            .push((qualified(node, a.namespace(), a.name()), a.value().to_string()));
    }

    let keeps_whitespace = matches!(tag.name(), "text" | "tspan" | "textPath" | "style");
    for child in node.children() {
        if child.is_element() {
            element.children.push(SvgNode::Element(build_element(child)));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if keeps_whitespace || !text.trim().is_empty() {
                element.children.push(SvgNode::Text(text.to_string()));
            }
        }
    }
    element
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
