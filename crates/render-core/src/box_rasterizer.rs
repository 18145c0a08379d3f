//! A reference rasterizer that paints layout boxes.
//!
//! It understands the root layout box, `background-color` on any node with a box,
//! and settled images scaled into their boxes. Like the browser-side rasterizer the
//! pipeline is built around, it refuses color functions it cannot parse and
//! stylesheets with at-rules its parser does not know.

use folio_style::{AtRuleFilter, ColorFunctions, CustomProperties, NodeContent, StyledNode, VarScope};
use folio_style::variables::extract_custom_properties;
use folio_traits::{RasterError, RasterRequest, Rasterizer, SettledImages};
use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};
use log::debug;

/// Largest bitmap edge the rasterizer will allocate.
pub const MAX_RASTER_EDGE_PX: u32 = 65_535;

#[derive(Debug, Clone)]
pub struct BoxRasterizer {
    unsupported: ColorFunctions,
    rejected_at_rules: AtRuleFilter,
}

impl Default for BoxRasterizer {
    fn default() -> Self {
        Self {
            unsupported: ColorFunctions::default(),
            rejected_at_rules: AtRuleFilter::default(),
        }
    }
}

impl BoxRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unsupported_colors(mut self, functions: ColorFunctions) -> Self {
        self.unsupported = functions;
        self
    }

    fn parse_color(&self, text: &str) -> Option<Rgba<u8>> {
        let color = csscolorparser::parse(text.trim()).ok()?;
        Some(Rgba(color.to_rgba8()))
    }

    fn check_node(&self, node: &StyledNode) -> Result<(), RasterError> {
        let inline = node.inline_style.iter().map(|v| ("style", v.as_str()));
        let computed = node.computed.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        for (property, value) in computed.chain(inline) {
            if self.unsupported.appears_in(value) {
                return Err(RasterError::UnsupportedColor {
                    property: property.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_stylesheet(&self, css: &str) -> Result<(), RasterError> {
        match self.rejected_at_rules.first_disallowed(css) {
            Some(rule) => Err(RasterError::Failed(format!("cannot parse stylesheet rule {}", rule))),
            None => Ok(()),
        }
    }

    fn paint(
        &self,
        canvas: &mut RgbaImage,
        node: &StyledNode,
        inherited: &CustomProperties,
        ratio: f32,
        request: &RasterRequest<'_>,
        is_root: bool,
    ) -> Result<(), RasterError> {
        self.check_node(node)?;
        if let NodeContent::StyleSheet { css } = &node.content {
            self.check_stylesheet(&request.filtered_css(css))?;
        }

        if let Some(layout) = node.layout {
            let (x, y) = if is_root { (0.0, 0.0) } else { (layout.x, layout.y) };
            let rect = Rect::scaled(x, y, layout.width, layout.height, ratio);
            let scope = VarScope::new(&node.computed, inherited);
            if let Some(background) = node.style("background-color") {
                match scope.resolve(background).ok().and_then(|v| self.parse_color(&v)) {
                    Some(color) => fill_rect(canvas, rect, color),
                    None => debug!("Unpaintable background '{}' on <{}>", background, node.tag),
                }
            }
            if let Some(src) = node.image_src() {
                draw_image(canvas, rect, request.images, &src);
            }
        }

        let mut child_scope = inherited.clone();
        child_scope.extend(extract_custom_properties(&node.computed));
        for child in &node.children {
            self.paint(canvas, child, &child_scope, ratio, request, false)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: i64,
    y: i64,
    width: u32,
    height: u32,
}

impl Rect {
    fn scaled(x: f32, y: f32, width: f32, height: f32, ratio: f32) -> Self {
        Self {
            x: (x * ratio).round() as i64,
            y: (y * ratio).round() as i64,
            width: (width * ratio).round().max(0.0) as u32,
            height: (height * ratio).round().max(0.0) as u32,
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let x0 = rect.x.max(0) as u32;
    let y0 = rect.y.max(0) as u32;
    let x1 = (rect.x + i64::from(rect.width)).clamp(0, i64::from(canvas.width())) as u32;
    let y1 = (rect.y + i64::from(rect.height)).clamp(0, i64::from(canvas.height())) as u32;
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.get_pixel_mut(x, y).blend(&color);
        }
    }
}

fn draw_image(canvas: &mut RgbaImage, rect: Rect, images: &SettledImages, src: &folio_types::ImageSrc) {
    let Some(image) = images.get(src).and_then(|settled| settled.image()) else {
        debug!("Image '{}' not settled as loaded, leaving its box empty", src);
        return;
    };
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let scaled = imageops::resize(image, rect.width, rect.height, FilterType::Triangle);
    imageops::overlay(canvas, &scaled, rect.x, rect.y);
}

impl Rasterizer for BoxRasterizer {
    async fn rasterize(&self, request: RasterRequest<'_>) -> Result<RgbaImage, RasterError> {
        let layout = request.node.layout.ok_or(RasterError::EmptyNode)?;
        let ratio = request.options.pixel_ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(RasterError::Failed(format!("invalid pixel ratio {}", ratio)));
        }
        let width = (layout.width * ratio).round();
        let height = (layout.height * ratio).round();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(RasterError::EmptyNode);
        }
        if width > MAX_RASTER_EDGE_PX as f32 || height > MAX_RASTER_EDGE_PX as f32 {
            return Err(RasterError::TooLarge {
                width: width as u32,
                height: height as u32,
            });
        }

        let background = self
            .parse_color(&request.options.background_color)
            .unwrap_or(Rgba([255, 255, 255, 255]));
        let mut canvas = RgbaImage::from_pixel(width as u32, height as u32, background);
        self.paint(&mut canvas, request.node, &CustomProperties::new(), ratio, &request, true)?;
        debug!("Rasterized {}x{} px", canvas.width(), canvas.height());
        Ok(canvas)
    }

    fn name(&self) -> &str {
        "BoxRasterizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::LayoutBox;
    use folio_traits::{ImageSettlement, RasterOptions};
    use folio_types::ImageSrc;
    use std::sync::Arc;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn resume() -> StyledNode {
        StyledNode::element("main")
            .with_layout(LayoutBox::new(40.0, 900.0, 100.0, 60.0))
            .with_style("--band", "rgb(0, 0, 255)")
            .with_child(
                StyledNode::element("header")
                    .with_layout(LayoutBox::new(0.0, 0.0, 100.0, 10.0))
                    .with_style("background-color", "var(--band)"),
            )
            .with_child(StyledNode::image("avatar.png").with_layout(LayoutBox::new(10.0, 20.0, 5.0, 5.0)))
    }

    async fn rasterize(node: &StyledNode, images: &SettledImages) -> Result<RgbaImage, RasterError> {
        init_logger();
        let options = RasterOptions::default();
        BoxRasterizer::new()
            .rasterize(RasterRequest::new(node, &options, images))
            .await
    }

    #[tokio::test]
    async fn test_paints_boxes_at_pixel_ratio() {
        let avatar = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let mut images = SettledImages::new();
        images.insert(ImageSrc::from("avatar.png"), ImageSettlement::Loaded(Arc::new(avatar)));

        let canvas = rasterize(&resume(), &images).await.unwrap();
        assert_eq!(canvas.dimensions(), (200, 120));
        assert_eq!(canvas.get_pixel(5, 5).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(5, 30).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(25, 45).0, [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_failed_images_leave_box_empty() {
        let mut images = SettledImages::new();
        images.insert(ImageSrc::from("avatar.png"), ImageSettlement::Failed("gone".to_string()));
        let canvas = rasterize(&resume(), &images).await.unwrap();
        assert_eq!(canvas.get_pixel(25, 45).0, [255, 255, 255, 255]);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_color_functions() {
        let node = resume().with_child(StyledNode::text("x").with_inline_style("color: oklch(0.5 0.1 20)"));
        let err = rasterize(&node, &SettledImages::new()).await.unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedColor { property, .. } if property == "style"));
    }

    #[tokio::test]
    async fn test_stylesheet_needs_filter() {
        let node = resume().with_child(StyledNode::stylesheet("@layer base { p { color: red } }"));
        let err = rasterize(&node, &SettledImages::new()).await.unwrap_err();
        assert!(matches!(err, RasterError::Failed(_)));

        let options = RasterOptions::default();
        let images = SettledImages::new();
        let filter = AtRuleFilter::default();
        let request = RasterRequest::new(&node, &options, &images).with_stylesheet_filter(&filter);
        assert!(BoxRasterizer::new().rasterize(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_similar_at_rule_names_are_accepted() {
        let node = resume().with_child(StyledNode::stylesheet("@layer-ish { p { color: red } }"));
        assert!(rasterize(&node, &SettledImages::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_requires_a_box() {
        let err = rasterize(&StyledNode::element("main"), &SettledImages::new())
            .await
            .unwrap_err();
        assert_eq!(err, RasterError::EmptyNode);
    }
}
