use folio_types::units::{mm_to_px, px_to_mm};
use folio_types::{ContentPadding, MarginProfile, PaperProfile};
use itertools::Itertools;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// Everything the planner needs to know about one capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanInput {
    pub capture_height_px: u32,
    /// Raster pixels per source-layout pixel.
    pub capture_scale: f32,
    /// Natural width of the captured node in source-layout pixels, if known.
    pub css_width_px: Option<f32>,
    pub paper: PaperProfile,
    pub margins: MarginProfile,
    pub padding: Option<ContentPadding>,
}

/// One page worth of source rows: `[source_offset_px, source_offset_px + height_px)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub source_offset_px: u32,
    pub height_px: u32,
}

impl Slice {
    pub fn end_px(&self) -> u32 {
        self.source_offset_px + self.height_px
    }

    pub fn is_empty(&self) -> bool {
        self.height_px == 0
    }
}

/// A degraded path the planner took instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanFallback {
    /// Capture scale was non-finite or not positive; 1.0 was used.
    InvalidCaptureScale,
    /// Content padding could not be read; full page, zero margins, zero padding.
    UnknownPadding,
    /// Margins left no printable height; full page, zero margins, zero padding.
    NonPositivePrintableHeight,
    /// Padding swallowed the whole capture; the whole buffer became content.
    NonPositiveContentHeight,
}

impl fmt::Display for PlanFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PlanFallback::InvalidCaptureScale => "invalid capture scale, using 1.0",
            PlanFallback::UnknownPadding => "content padding unknown, using full page",
            PlanFallback::NonPositivePrintableHeight => {
                "margins leave no printable height, using full page"
            }
            PlanFallback::NonPositiveContentHeight => {
                "padding exceeds capture height, using whole buffer"
            }
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlicePlan {
    pub slices: Vec<Slice>,
    pub start_offset_px: u32,
    pub content_height_px: u32,
    pub inner_page_height_px: u32,
    pub inner_height_mm: f32,
    pub width_scale: f32,
    pub capture_scale: f32,
    /// White rows re-synthesized above every slice.
    pub top_band_px: u32,
    /// White rows re-synthesized below every slice.
    pub bottom_band_px: u32,
    pub fallbacks: Vec<PlanFallback>,
}

impl SlicePlan {
    pub fn page_count(&self) -> usize {
        self.slices.len()
    }

    pub fn total_height(&self) -> u32 {
        self.slices.iter().map(|slice| slice.height_px).sum()
    }

    /// True when the slices start at the content start and each one begins where
    /// the previous one ended.
    pub fn is_contiguous(&self) -> bool {
        let starts_right = self
            .slices
            .first()
            .is_none_or(|first| first.source_offset_px == self.start_offset_px);
        starts_right
            && self
                .slices
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.end_px() == b.source_offset_px)
    }

    pub fn has_fallback(&self, fallback: PlanFallback) -> bool {
        self.fallbacks.contains(&fallback)
    }
}

/// Shrink factor that fits the source width onto the paper. Never above 1.0.
fn width_scale(css_width_px: Option<f32>, paper: &PaperProfile) -> f32 {
    match css_width_px {
        Some(width) if width.is_finite() && width > 0.0 => {
            (paper.width_mm / px_to_mm(width)).min(1.0)
        }
        _ => 1.0,
    }
}

/// Plans the slices for one capture.
pub fn plan_slices(input: &PlanInput) -> SlicePlan {
    let mut fallbacks = Vec::new();

    let capture_scale = if input.capture_scale.is_finite() && input.capture_scale > 0.0 {
        input.capture_scale
    } else {
        fallbacks.push(PlanFallback::InvalidCaptureScale);
        1.0
    };
    let width_scale = width_scale(input.css_width_px, &input.paper);
    let paper_height_mm = input.paper.height_mm;

    let (inner_height_mm, padding, (margin_top, margin_bottom)) =
        match input.padding.and_then(ContentPadding::validated) {
            None => {
                fallbacks.push(PlanFallback::UnknownPadding);
                (paper_height_mm, ContentPadding::default(), (0.0, 0.0))
            }
            Some(padding) => {
                let margins_mm = px_to_mm(input.margins.top + input.margins.bottom) * width_scale;
                let inner = paper_height_mm - margins_mm;
                if inner > 0.0 {
                    (inner, padding, (input.margins.top, input.margins.bottom))
                } else {
                    fallbacks.push(PlanFallback::NonPositivePrintableHeight);
                    (paper_height_mm, ContentPadding::default(), (0.0, 0.0))
                }
            }
        };

    let inner_page_height_px =
        ((mm_to_px(inner_height_mm / width_scale) * capture_scale).round() as u32).max(1);

    let top_px = (padding.top * capture_scale).round() as u64;
    let bottom_px = (padding.bottom * capture_scale).round() as u64;
    let height = u64::from(input.capture_height_px);

    // Bands never fall short of the page margins, so a full page fills the paper.
    let top_band = top_px.max((margin_top * capture_scale).round() as u64);
    let bottom_band = bottom_px.max((margin_bottom * capture_scale).round() as u64);

    let (start_offset_px, content_height_px, top_band_px, bottom_band_px) =
        if height > top_px + bottom_px {
            (
                top_px as u32,
                (height - top_px - bottom_px) as u32,
                top_band as u32,
                bottom_band as u32,
            )
        } else {
            fallbacks.push(PlanFallback::NonPositiveContentHeight);
            (0, input.capture_height_px, 0, 0)
        };

    let page_count = content_height_px.div_ceil(inner_page_height_px).max(1);
    let slices = (0..page_count)
        .map(|index| {
            let offset = index * inner_page_height_px;
            Slice {
                source_offset_px: start_offset_px + offset,
                height_px: inner_page_height_px.min(content_height_px - offset.min(content_height_px)),
            }
        })
        .collect();

    for fallback in &fallbacks {
        warn!("Pagination fallback: {}", fallback);
    }
    debug!(
        "Planned {} page(s): content {}px from offset {}, inner page {}px, width scale {:.4}, capture scale {}",
        page_count, content_height_px, start_offset_px, inner_page_height_px, width_scale, capture_scale
    );

    SlicePlan {
        slices,
        start_offset_px,
        content_height_px,
        inner_page_height_px,
        inner_height_mm,
        width_scale,
        capture_scale,
        top_band_px,
        bottom_band_px,
        fallbacks,
    }
}
