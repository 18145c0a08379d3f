use folio_types::units::px_to_mm;

/// Convert a top-left based y coordinate to a bottom-left based one (PDF origin).
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// Physical length in millimetres of `raster_px` capture pixels once the capture
/// scale is undone and the width scale applied.
pub fn raster_px_to_mm(raster_px: u32, capture_scale: f32, width_scale: f32) -> f32 {
    px_to_mm(raster_px as f32 / capture_scale) * width_scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_y() {
        assert_eq!(flip_y(0.0, 842.0), 842.0);
        assert_eq!(flip_y(842.0, 842.0), 0.0);
    }

    #[test]
    fn test_raster_px_to_mm() {
        // 192 raster px at scale 2 is one inch.
        assert!((raster_px_to_mm(192, 2.0, 1.0) - 25.4).abs() < 1e-4);
        assert!((raster_px_to_mm(192, 2.0, 0.5) - 12.7).abs() < 1e-4);
    }
}
