use crate::error::AssembleError;
use crate::utils::raster_px_to_mm;
use folio_pagination::{Slice, SlicePlan};
use folio_traits::{DocumentWriter, ImagePlacement};
use folio_types::{Orientation, PaperProfile};
use image::imageops;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::{debug, info, warn};
use std::io::Cursor;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// One output page: the slice re-padded with white bands, PNG encoded, and where it
/// goes on the paper.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub index: usize,
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub x_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageImage {
    pub fn placement(&self) -> ImagePlacement {
        ImagePlacement::new(self.x_mm, 0.0, self.width_mm, self.height_mm)
    }
}

/// Outcome of one assembly run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembled {
    pub page_count: usize,
    /// Indices into the plan of slices that had no rows.
    pub skipped_slices: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct PageAssembler {
    paper: PaperProfile,
}

impl PageAssembler {
    pub fn new(paper: PaperProfile) -> Self {
        Self { paper }
    }

    pub fn paper(&self) -> &PaperProfile {
        &self.paper
    }

    /// Builds the page image for one slice. Returns `None` for a slice without rows.
    pub fn compose_page(
        &self,
        pixels: &RgbaImage,
        plan: &SlicePlan,
        slice_index: usize,
        page_index: usize,
    ) -> Result<Option<PageImage>, AssembleError> {
        let Some(slice) = plan.slices.get(slice_index).copied() else {
            return Ok(None);
        };
        if slice.is_empty() {
            return Ok(None);
        }
        self.check_bounds(pixels, slice, slice_index)?;

        let width_px = pixels.width();
        let height_px = slice.height_px + plan.top_band_px + plan.bottom_band_px;
        let mut canvas = RgbaImage::from_pixel(width_px, height_px, WHITE);
        let rows = imageops::crop_imm(pixels, 0, slice.source_offset_px, width_px, slice.height_px)
            .to_image();
        imageops::overlay(&mut canvas, &rows, 0, i64::from(plan.top_band_px));

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let width_mm = raster_px_to_mm(width_px, plan.capture_scale, plan.width_scale)
            .min(self.paper.width_mm);
        let height_mm = raster_px_to_mm(height_px, plan.capture_scale, plan.width_scale)
            .min(self.paper.height_mm);
        let x_mm = (self.paper.width_mm - width_mm) / 2.0;

        Ok(Some(PageImage {
            index: page_index,
            png,
            width_px,
            height_px,
            x_mm,
            width_mm,
            height_mm,
        }))
    }

    fn check_bounds(&self, pixels: &RgbaImage, slice: Slice, index: usize) -> Result<(), AssembleError> {
        if slice.end_px() > pixels.height() {
            return Err(AssembleError::SliceOutOfBounds {
                index,
                offset: slice.source_offset_px,
                end: slice.end_px(),
                available: pixels.height(),
            });
        }
        Ok(())
    }

    /// Writes every slice of `plan` as one page, in order.
    ///
    /// Opens the document on the writer, then composes and hands over one page at a
    /// time so only a single page buffer is alive.
    pub fn assemble<W>(
        &self,
        pixels: &RgbaImage,
        plan: &SlicePlan,
        writer: &mut W,
    ) -> Result<Assembled, AssembleError>
    where
        W: DocumentWriter + ?Sized,
    {
        writer.new_document(&self.paper)?;
        let mut assembled = Assembled::default();

        for slice_index in 0..plan.slices.len() {
            let Some(page) = self.compose_page(pixels, plan, slice_index, assembled.page_count)?
            else {
                warn!("Skipping slice {} with no rows", slice_index);
                assembled.skipped_slices.push(slice_index);
                continue;
            };
            if page.index > 0 {
                writer.add_page(&self.paper, Orientation::Portrait)?;
            }
            debug!(
                "Page {}: {}x{} px placed at x={:.2}mm as {:.2}x{:.2}mm",
                page.index, page.width_px, page.height_px, page.x_mm, page.width_mm, page.height_mm
            );
            writer.add_image(&page.png, page.placement())?;
            assembled.page_count += 1;
        }

        info!(
            "Assembled {} page(s) on {} paper",
            assembled.page_count, self.paper.size
        );
        Ok(assembled)
    }
}
