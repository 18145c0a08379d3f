use folio::{CustomProperties, LayoutBox, StyledNode};
use folio_style::PRINTABLE_AREA_ATTRIBUTE;
use image::{Rgba, RgbaImage};

pub const PAGE_INK: [u8; 4] = [32, 32, 32, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// A resume root of `width`x`height` source px painted dark, with a header using an
/// `oklch()` accent and a body text node.
pub fn resume(width: f32, height: f32) -> StyledNode {
    StyledNode::element("main")
        .with_layout(LayoutBox::new(0.0, 0.0, width, height))
        .with_style("background-color", "rgb(32, 32, 32)")
        .with_style("--accent", "oklch(0.62 0.19 255)")
        .with_child(
            StyledNode::element("header")
                .with_layout(LayoutBox::new(0.0, 0.0, width, 40.0))
                .with_style("background-color", "var(--accent)")
                .with_child(StyledNode::text("Ada Lovelace")),
        )
        .with_child(
            StyledNode::element("section")
                .with_inline_style("border-color: oklab(0.5 0.1 0.1); font-weight: 600")
                .with_child(StyledNode::text("Analytical Engine, 1843")),
        )
}

/// [`resume`] with padding on the printable content area.
pub fn padded_resume(width: f32, height: f32, top: f32, bottom: f32) -> StyledNode {
    resume(width, height)
        .with_attribute(PRINTABLE_AREA_ATTRIBUTE, "")
        .with_style("padding-top", format!("{}px", top))
        .with_style("padding-bottom", format!("{}px", bottom))
}

/// Custom properties a resume inherits from the page it is rendered in.
pub fn page_scope() -> CustomProperties {
    CustomProperties::from([(
        "--brand".to_string(),
        "oklch(0.45 0.12 140)".to_string(),
    )])
}

pub fn is_row(image: &RgbaImage, y: u32, color: [u8; 4]) -> bool {
    (0..image.width()).all(|x| image.get_pixel(x, y).0 == color)
}

pub fn is_white_row(image: &RgbaImage, y: u32) -> bool {
    is_row(image, y, WHITE)
}

pub fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}
