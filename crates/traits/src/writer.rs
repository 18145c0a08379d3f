//! The multi-page document writer seam.

use folio_types::{Orientation, PaperProfile};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("No document has been started")]
    NoDocument,

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Document encoding failed: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an image lands on the current page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl ImagePlacement {
    pub fn new(x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32) -> Self {
        Self {
            x_mm,
            y_mm,
            width_mm,
            height_mm,
        }
    }

    pub fn validate(&self) -> Result<(), WriterError> {
        let values = [self.x_mm, self.y_mm, self.width_mm, self.height_mm];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(WriterError::InvalidPlacement(format!("{:?}", self)));
        }
        if self.width_mm <= 0.0 || self.height_mm <= 0.0 {
            return Err(WriterError::InvalidPlacement(format!(
                "non-positive size {}x{} mm",
                self.width_mm, self.height_mm
            )));
        }
        Ok(())
    }
}

/// Receives page images in order and produces the final document.
///
/// `new_document` opens the first page; every further page is opened with
/// `add_page` before its image is added.
pub trait DocumentWriter {
    fn new_document(&mut self, paper: &PaperProfile) -> Result<(), WriterError>;

    fn add_page(&mut self, paper: &PaperProfile, orientation: Orientation) -> Result<(), WriterError>;

    /// Adds a PNG-encoded image to the current page.
    fn add_image(&mut self, png: &[u8], placement: ImagePlacement) -> Result<(), WriterError>;

    fn save(&mut self, path: &Path) -> Result<(), WriterError>;

    fn page_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_validation() {
        assert!(ImagePlacement::new(0.0, 0.0, 210.0, 297.0).validate().is_ok());
        assert!(ImagePlacement::new(0.0, 0.0, 0.0, 297.0).validate().is_err());
        assert!(ImagePlacement::new(f32::NAN, 0.0, 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_writer_error_display() {
        let err = WriterError::InvalidImage("truncated".to_string());
        assert!(err.to_string().contains("truncated"));
        let io: WriterError = std::io::Error::other("disk full").into();
        assert!(matches!(io, WriterError::Io(_)));
    }
}
