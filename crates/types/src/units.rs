//! Conversions between source-layout pixels, millimeters and PDF points.
//!
//! Source-layout pixels are CSS pixels: 96 per inch.

pub const CSS_PX_PER_INCH: f32 = 96.0;
pub const MM_PER_INCH: f32 = 25.4;
pub const PT_PER_INCH: f32 = 72.0;

pub fn px_to_mm(px: f32) -> f32 {
    px * MM_PER_INCH / CSS_PX_PER_INCH
}

pub fn mm_to_px(mm: f32) -> f32 {
    mm * CSS_PX_PER_INCH / MM_PER_INCH
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_INCH / MM_PER_INCH
}
