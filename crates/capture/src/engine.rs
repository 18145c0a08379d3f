use crate::error::CaptureError;
use crate::settle::settle_images;
use crate::staging::StagingArea;
use folio_style::{
    AtRuleFilter, ColorSpaceNormalizer, ComputedStyle, CustomProperties, LayoutBox,
    NormalizeWarning, StyledNode, StylesheetFilter, VarScope,
};
use folio_style::variables::referenced_variable_names;
use folio_traits::{ImageSettlement, RasterError, RasterOptions, RasterRequest, Rasterizer, ResourceProvider};
use folio_types::{ImageSrc, NodePath, PaperProfile, PaperSize};
use image::RgbaImage;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which paper height a short document is stretched to before capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinHeightPolicy {
    /// The height of the paper being exported to.
    #[default]
    SelectedProfile,
    /// The tallest supported paper, whatever was selected.
    TallestProfile,
}

impl MinHeightPolicy {
    /// Minimum capture height in source pixels, floored so it never spills onto a second page.
    pub fn min_height_px(self, paper: &PaperProfile) -> f32 {
        match self {
            MinHeightPolicy::SelectedProfile => paper.height_px_floor(),
            MinHeightPolicy::TallestProfile => PaperSize::tallest().profile().height_px_floor(),
        }
    }
}

/// A degraded path taken during capture.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureWarning {
    ImageFailed { src: ImageSrc, reason: String },
    FontsSkipped { reason: RasterError },
    Color(NormalizeWarning),
}

#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub pixels: RgbaImage,
    pub width_px: u32,
    pub height_px: u32,
    /// Raster pixels per source-layout pixel.
    pub capture_scale: f32,
    pub css_width_px: Option<f32>,
    pub warnings: Vec<CaptureWarning>,
}

pub struct CaptureRequest<'a> {
    /// The live node; only its natural layout box is read.
    pub source: &'a StyledNode,
    /// A detached, already normalized copy of `source` that may be rewritten.
    pub clone: StyledNode,
    /// Custom properties visible at `source` from its ancestors.
    pub outer_scope: &'a CustomProperties,
    pub paper: &'a PaperProfile,
}

pub struct CaptureEngine<R: Rasterizer> {
    rasterizer: R,
    resources: Arc<dyn ResourceProvider>,
    normalizer: ColorSpaceNormalizer,
    stylesheet_filter: Box<dyn StylesheetFilter>,
    pixel_ratio: f32,
    min_height_policy: MinHeightPolicy,
}

impl<R: Rasterizer> CaptureEngine<R> {
    pub fn new(rasterizer: R, resources: Arc<dyn ResourceProvider>) -> Self {
        Self {
            rasterizer,
            resources,
            normalizer: ColorSpaceNormalizer::default(),
            stylesheet_filter: Box::new(AtRuleFilter::default()),
            pixel_ratio: 2.0,
            min_height_policy: MinHeightPolicy::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: ColorSpaceNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_stylesheet_filter(mut self, filter: Box<dyn StylesheetFilter>) -> Self {
        self.stylesheet_filter = filter;
        self
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_min_height_policy(mut self, policy: MinHeightPolicy) -> Self {
        self.min_height_policy = policy;
        self
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn normalizer(&self) -> &ColorSpaceNormalizer {
        &self.normalizer
    }

    /// Captures the clone into one continuous bitmap.
    ///
    /// The clone is mounted in `staging` for the duration of the call and unmounted
    /// on every exit path.
    pub async fn capture(
        &self,
        staging: &mut StagingArea,
        request: CaptureRequest<'_>,
    ) -> Result<CaptureResult, CaptureError> {
        let mut warnings = Vec::new();
        let mut clone = request.clone;
        let css_width_px = natural_box(request.source).map(|layout| layout.width);

        self.force_dimensions(&mut clone, request.source, request.paper);
        warnings.extend(
            self.inline_outer_variables(&mut clone, request.outer_scope)
                .into_iter()
                .map(CaptureWarning::Color),
        );

        let guard = staging.mount(clone);
        let images = settle_images(guard.node(), Arc::clone(&self.resources)).await;
        for (src, settlement) in &images {
            if let ImageSettlement::Failed(reason) = settlement {
                warnings.push(CaptureWarning::ImageFailed {
                    src: src.clone(),
                    reason: reason.clone(),
                });
            }
        }

        let options = RasterOptions::default().with_pixel_ratio(self.pixel_ratio);
        let raster_request = RasterRequest::new(guard.node(), &options, &images)
            .with_stylesheet_filter(self.stylesheet_filter.as_ref());
        let pixels = match self.rasterizer.rasterize(raster_request).await {
            Ok(pixels) => pixels,
            Err(first) => {
                warn!(
                    "{} failed ({}), retrying without web fonts",
                    self.rasterizer.name(),
                    first
                );
                let retry_options = options.clone().without_fonts();
                let retry_request = RasterRequest::new(guard.node(), &retry_options, &images)
                    .with_stylesheet_filter(self.stylesheet_filter.as_ref());
                match self.rasterizer.rasterize(retry_request).await {
                    Ok(pixels) => {
                        warnings.push(CaptureWarning::FontsSkipped { reason: first });
                        pixels
                    }
                    Err(retry) => return Err(CaptureError::Rasterize { first, retry }),
                }
            }
        };
        drop(guard);

        let (width_px, height_px) = pixels.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(CaptureError::EmptyCapture {
                width: width_px,
                height: height_px,
            });
        }
        let capture_scale = match css_width_px {
            Some(css_width) => width_px as f32 / css_width,
            None => 1.0,
        };
        info!(
            "Captured {}x{} px at scale {:.3} with {} warning(s)",
            width_px,
            height_px,
            capture_scale,
            warnings.len()
        );

        Ok(CaptureResult {
            pixels,
            width_px,
            height_px,
            capture_scale,
            css_width_px,
            warnings,
        })
    }

    /// Pins the clone to the source's natural box, stretched to the minimum page height.
    fn force_dimensions(&self, clone: &mut StyledNode, source: &StyledNode, paper: &PaperProfile) {
        let Some(natural) = natural_box(source) else {
            debug!("Source has no natural box, capturing the clone at its own size");
            return;
        };
        let min_height = self.min_height_policy.min_height_px(paper);
        let height = if natural.height < min_height {
            debug!(
                "Stretching {}px tall content to the {}px minimum page height",
                natural.height, min_height
            );
            clone
                .computed
                .insert("min-height".to_string(), format!("{}px", min_height));
            min_height
        } else {
            natural.height
        };
        clone
            .computed
            .insert("width".to_string(), format!("{}px", natural.width));
        clone
            .computed
            .insert("height".to_string(), format!("{}px", height));
        clone.layout = Some(LayoutBox::new(0.0, 0.0, natural.width, height));
    }

    /// Copies custom properties the clone references but only the outer scope defines
    /// onto the clone root, normalized. Names referenced by an inlined value are
    /// followed until the chain closes.
    fn inline_outer_variables(
        &self,
        clone: &mut StyledNode,
        outer_scope: &CustomProperties,
    ) -> Vec<NormalizeWarning> {
        let mut failures = Vec::new();
        let empty = ComputedStyle::new();
        let scope = VarScope::new(&empty, outer_scope);
        let mut pending: Vec<String> = clone.referenced_variables().into_iter().rev().collect();
        while let Some(name) = pending.pop() {
            if clone.computed.contains_key(&name) {
                continue;
            }
            let Some(value) = outer_scope.get(&name) else {
                continue;
            };
            let outcome = self.normalizer.normalize_value(value, &scope);
            for (expression, reason) in outcome.failures {
                warn!("Inlined variable '{}' keeps unconvertible '{}': {}", name, expression, reason);
                failures.push(NormalizeWarning {
                    path: NodePath::root(),
                    property: name.clone(),
                    expression,
                    reason,
                });
            }
            debug!("Inlining outer variable {} = {}", name, outcome.text);
            pending.extend(
                referenced_variable_names(&outcome.text)
                    .into_iter()
                    .filter(|next| !clone.computed.contains_key(next)),
            );
            clone.computed.insert(name, outcome.text);
        }
        failures
    }
}

fn natural_box(node: &StyledNode) -> Option<LayoutBox> {
    node.layout
        .filter(|layout| layout.width.is_finite() && layout.width > 0.0 && layout.height.is_finite())
}
