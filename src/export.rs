use crate::config::ExportConfig;
use crate::error::ExportError;
use folio_capture::{CaptureEngine, CaptureRequest, CaptureWarning, StagingArea};
use folio_pagination::{plan_slices, PlanFallback, PlanInput, SlicePlan};
use folio_render_core::PageAssembler;
use folio_render_lopdf::LopdfDocumentWriter;
use folio_style::{ColorSpaceNormalizer, CustomProperties, NormalizeWarning, StyledNode};
use folio_traits::{DocumentWriter, Rasterizer};
use folio_types::{MarginProfile, PaperSize};
use log::{debug, info, warn};
use std::fmt;
use std::path::PathBuf;

/// One export call.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// The rendered document. `None` fails the export with [`ExportError::MissingNode`].
    pub node: Option<StyledNode>,
    pub file_name: PathBuf,
    /// Falls back to the configured paper.
    pub paper_size: Option<PaperSize>,
    /// Falls back to the configured margins.
    pub page_margins: Option<MarginProfile>,
    /// Custom properties the node inherits from its ancestors.
    pub scope: CustomProperties,
}

impl ExportRequest {
    pub fn new(node: StyledNode, file_name: impl Into<PathBuf>) -> Self {
        Self {
            node: Some(node),
            file_name: file_name.into(),
            paper_size: None,
            page_margins: None,
            scope: CustomProperties::new(),
        }
    }

    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.paper_size = Some(paper_size);
        self
    }

    pub fn with_margins(mut self, margins: MarginProfile) -> Self {
        self.page_margins = Some(margins);
        self
    }

    pub fn with_scope(mut self, scope: CustomProperties) -> Self {
        self.scope = scope;
        self
    }
}

/// A degraded path taken during one export.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportWarning {
    Color(NormalizeWarning),
    Capture(CaptureWarning),
    Plan(PlanFallback),
    SkippedSlice { index: usize },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportWarning::Color(w) | ExportWarning::Capture(CaptureWarning::Color(w)) => write!(
                f,
                "kept '{}' in {} at {}: {}",
                w.expression, w.property, w.path, w.reason
            ),
            ExportWarning::Capture(CaptureWarning::ImageFailed { src, reason }) => {
                write!(f, "image '{}' not loaded: {}", src, reason)
            }
            ExportWarning::Capture(CaptureWarning::FontsSkipped { reason }) => {
                write!(f, "captured without web fonts after: {}", reason)
            }
            ExportWarning::Plan(fallback) => write!(f, "pagination: {}", fallback),
            ExportWarning::SkippedSlice { index } => write!(f, "slice {} had no rows", index),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub page_count: usize,
    pub plan: SlicePlan,
    pub warnings: Vec<ExportWarning>,
}

/// Runs the export pipeline: normalize, capture, plan, assemble.
///
/// Exports run one at a time: the exporter owns the single staging area the
/// capture mounts into, so every export borrows it mutably.
pub struct Exporter<R: Rasterizer> {
    config: ExportConfig,
    normalizer: ColorSpaceNormalizer,
    engine: CaptureEngine<R>,
    staging: StagingArea,
}

impl<R: Rasterizer> Exporter<R> {
    pub(crate) fn new(config: ExportConfig, engine: CaptureEngine<R>) -> Self {
        Self {
            normalizer: config.normalizer(),
            config,
            engine,
            staging: StagingArea::new(),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn engine(&self) -> &CaptureEngine<R> {
        &self.engine
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Exports to a PDF file at `request.file_name`.
    pub async fn export(&mut self, request: ExportRequest) -> Result<ExportSummary, ExportError> {
        let mut writer = LopdfDocumentWriter::new();
        self.export_with_writer(request, &mut writer).await
    }

    /// Exports through `writer` and asks it to save to `request.file_name`.
    pub async fn export_with_writer<W>(
        &mut self,
        request: ExportRequest,
        writer: &mut W,
    ) -> Result<ExportSummary, ExportError>
    where
        W: DocumentWriter + ?Sized,
    {
        let ExportRequest {
            node,
            file_name,
            paper_size,
            page_margins,
            scope,
        } = request;
        let node = node.ok_or(ExportError::MissingNode)?;
        let paper = paper_size.unwrap_or(self.config.paper_size).profile();
        let margins = page_margins.unwrap_or(self.config.margins).clamped();
        info!(
            "Exporting to {} on {} paper",
            file_name.display(),
            paper.size
        );

        let mut warnings = Vec::new();
        let padding = node.content_padding();
        if padding.is_none() {
            debug!("No readable content padding on the printable area");
        }

        let normalized = self.normalizer.normalize(&node, &scope);
        debug!(
            "Normalized {} color expression(s) with {} warning(s)",
            normalized.report.rewrites,
            normalized.report.warnings.len()
        );
        warnings.extend(normalized.report.warnings.into_iter().map(ExportWarning::Color));

        let capture = self
            .engine
            .capture(
                &mut self.staging,
                CaptureRequest {
                    source: &node,
                    clone: normalized.node,
                    outer_scope: &scope,
                    paper: &paper,
                },
            )
            .await?;
        warnings.extend(capture.warnings.iter().cloned().map(ExportWarning::Capture));

        let plan = plan_slices(&PlanInput {
            capture_height_px: capture.height_px,
            capture_scale: capture.capture_scale,
            css_width_px: capture.css_width_px,
            paper,
            margins,
            padding,
        });
        warnings.extend(plan.fallbacks.iter().copied().map(ExportWarning::Plan));

        let assembled = PageAssembler::new(paper).assemble(&capture.pixels, &plan, writer)?;
        warnings.extend(
            assembled
                .skipped_slices
                .iter()
                .map(|&index| ExportWarning::SkippedSlice { index }),
        );

        writer.save(&file_name)?;
        if !warnings.is_empty() {
            warn!(
                "Export finished degraded: {}",
                warnings.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
            );
        }
        info!(
            "Saved {} page(s) to {} with {} warning(s)",
            assembled.page_count,
            file_name.display(),
            warnings.len()
        );

        Ok(ExportSummary {
            page_count: assembled.page_count,
            plan,
            warnings,
        })
    }
}
