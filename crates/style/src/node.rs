//! The styled node tree handed over by the rendering substrate.
//!
//! A `StyledNode` carries the computed style the substrate resolved for the element,
//! the raw inline `style` attribute and the natural content box measured in source
//! layout pixels. The tree is plain data: cloning it is how the export pipeline gets
//! a detached copy it may rewrite.

use crate::parsers::{parse_length, parse_vertical_box, run_parser};
use crate::variables::referenced_variable_names;
use folio_types::{ContentPadding, ImageSrc, NodePath};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Computed style properties by name. Custom properties keep their leading `--`.
pub type ComputedStyle = BTreeMap<String, String>;

/// Marks the node whose padding defines the printable content area.
pub const PRINTABLE_AREA_ATTRIBUTE: &str = "data-printable-area";

/// A box in source-layout pixels, relative to the exported root.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutBox {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeContent {
    #[default]
    Element,
    Text {
        text: String,
    },
    Image {
        src: String,
    },
    StyleSheet {
        css: String,
    },
}

fn default_tag() -> String {
    "div".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyledNode {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub computed: ComputedStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutBox>,
    #[serde(default)]
    pub content: NodeContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StyledNode>,
}

impl Default for StyledNode {
    fn default() -> Self {
        Self::element(default_tag())
    }
}

impl StyledNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            computed: ComputedStyle::new(),
            inline_style: None,
            layout: None,
            content: NodeContent::Element,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: NodeContent::Text { text: text.into() },
            ..Self::element("#text")
        }
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self {
            content: NodeContent::Image { src: src.into() },
            ..Self::element("img")
        }
    }

    pub fn stylesheet(css: impl Into<String>) -> Self {
        Self {
            content: NodeContent::StyleSheet { css: css.into() },
            ..Self::element("style")
        }
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.computed.insert(property.into(), value.into());
        self
    }

    pub fn with_inline_style(mut self, style: impl Into<String>) -> Self {
        self.inline_style = Some(style.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_layout(mut self, layout: LayoutBox) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_child(mut self, child: StyledNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.computed.get(property).map(String::as_str)
    }

    /// Reads a computed length in source pixels.
    pub fn style_px(&self, property: &str) -> Option<f32> {
        self.style(property)
            .and_then(|value| run_parser(parse_length, value).ok())
    }

    pub fn image_src(&self) -> Option<ImageSrc> {
        match &self.content {
            NodeContent::Image { src } => Some(ImageSrc::from(src.as_str())),
            _ => None,
        }
    }

    /// Visits every node depth-first, pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&NodePath, &'a StyledNode)) {
        self.walk_from(&NodePath::root(), visit);
    }

    fn walk_from<'a>(&'a self, path: &NodePath, visit: &mut impl FnMut(&NodePath, &'a StyledNode)) {
        visit(path, self);
        for (index, child) in self.children.iter().enumerate() {
            child.walk_from(&path.child(index), visit);
        }
    }

    /// Distinct image sources in the subtree, in a stable order.
    pub fn image_sources(&self) -> BTreeSet<ImageSrc> {
        let mut sources = BTreeSet::new();
        self.walk(&mut |_, node| {
            if let Some(src) = node.image_src() {
                sources.insert(src);
            }
        });
        sources
    }

    /// Every custom property name referenced through `var()` anywhere in the subtree.
    pub fn referenced_variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.walk(&mut |_, node| {
            for value in node.computed.values().chain(node.inline_style.iter()) {
                names.extend(referenced_variable_names(value));
            }
        });
        names
    }

    /// The first node flagged with [`PRINTABLE_AREA_ATTRIBUTE`], or the root itself.
    pub fn printable_area(&self) -> &StyledNode {
        let mut found: Option<&StyledNode> = None;
        self.walk(&mut |_, node| {
            if found.is_none() && node.attributes.contains_key(PRINTABLE_AREA_ATTRIBUTE) {
                found = Some(node);
            }
        });
        found.unwrap_or(self)
    }

    /// Top and bottom padding of the printable content area, if it can be determined.
    pub fn content_padding(&self) -> Option<ContentPadding> {
        let area = self.printable_area();
        let longhands = area
            .style_px("padding-top")
            .zip(area.style_px("padding-bottom"));
        let (top, bottom) = match longhands {
            Some(pair) => pair,
            None => parse_vertical_box(area.style("padding")?).ok()?,
        };
        ContentPadding::new(top, bottom).validated()
    }
}
