//! The rasterization seam.
//!
//! A [`Rasterizer`] turns a mounted, normalized node tree into a single RGBA bitmap.
//! Everything it needs travels in a [`RasterRequest`]: the node, the capture options,
//! the images settled before capture and the stylesheet filter scoped to this call.

use folio_style::{StyledNode, StylesheetFilter};
use folio_types::ImageSrc;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("Unsupported color function in '{property}': {value}")]
    UnsupportedColor { property: String, value: String },

    #[error("Font embedding failed: {0}")]
    Font(String),

    #[error("Node has no measurable size")]
    EmptyNode,

    #[error("Capture of {width}x{height} px exceeds the rasterizer limit")]
    TooLarge { width: u32, height: u32 },

    #[error("Rasterization failed: {0}")]
    Failed(String),
}

/// Outcome of loading one embedded image before capture.
#[derive(Debug, Clone)]
pub enum ImageSettlement {
    Loaded(Arc<image::RgbaImage>),
    Failed(String),
}

impl ImageSettlement {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ImageSettlement::Loaded(_))
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            ImageSettlement::Loaded(image) => Some(image),
            ImageSettlement::Failed(_) => None,
        }
    }
}

/// Every distinct image source of the captured subtree, settled.
pub type SettledImages = BTreeMap<ImageSrc, ImageSettlement>;

#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Bypass any cached copy of embedded resources.
    pub cache_bust: bool,
    /// Raster pixels per source-layout pixel.
    pub pixel_ratio: f32,
    pub background_color: String,
    /// Skip web font embedding; used on the retry path.
    pub skip_fonts: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            cache_bust: true,
            pixel_ratio: 2.0,
            background_color: "#ffffff".to_string(),
            skip_fonts: false,
        }
    }
}

impl RasterOptions {
    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn without_fonts(mut self) -> Self {
        self.skip_fonts = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    pub node: &'a StyledNode,
    pub options: &'a RasterOptions,
    pub images: &'a SettledImages,
    /// Applied to stylesheet text for this call only.
    pub stylesheet_filter: Option<&'a dyn StylesheetFilter>,
}

impl<'a> RasterRequest<'a> {
    pub fn new(node: &'a StyledNode, options: &'a RasterOptions, images: &'a SettledImages) -> Self {
        Self {
            node,
            options,
            images,
            stylesheet_filter: None,
        }
    }

    pub fn with_stylesheet_filter(mut self, filter: &'a dyn StylesheetFilter) -> Self {
        self.stylesheet_filter = Some(filter);
        self
    }

    /// Stylesheet text as the rasterizer should parse it.
    pub fn filtered_css(&self, css: &str) -> String {
        match self.stylesheet_filter {
            Some(filter) => filter.filter(css),
            None => css.to_string(),
        }
    }
}

pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        request: RasterRequest<'_>,
    ) -> impl Future<Output = Result<RgbaImage, RasterError>> + Send;

    fn name(&self) -> &str;
}
