//! Raster document export.
//!
//! Takes a rendered, continuously flowing document as a [`StyledNode`] tree and
//! writes it as a paginated PDF:
//!
//! 1. color functions the rasterizer cannot consume are rewritten to `rgb()`
//! 2. a detached copy is captured off-screen into one tall bitmap
//! 3. the bitmap is planned into page-sized slices
//! 4. each slice is re-padded with the page margins and placed on its own page
//!
//! ```no_run
//! use folio::{ExportRequest, ExporterBuilder};
//! use folio::{PaperSize, StyledNode};
//!
//! # async fn run(node: StyledNode) -> Result<(), folio::ExportError> {
//! let mut exporter = ExporterBuilder::new().with_resource_dir("assets").build()?;
//! let summary = exporter
//!     .export(ExportRequest::new(node, "resume.pdf").with_paper_size(PaperSize::A4))
//!     .await?;
//! println!("{} page(s)", summary.page_count);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod export;

pub use builder::ExporterBuilder;
pub use config::ExportConfig;
pub use error::ExportError;
pub use export::{ExportRequest, ExportSummary, ExportWarning, Exporter};

pub use folio_capture::MinHeightPolicy;
pub use folio_pagination::{PlanFallback, SlicePlan};
pub use folio_render_core::BoxRasterizer;
pub use folio_style::{CustomProperties, LayoutBox, StyledNode};
pub use folio_traits::{DocumentWriter, Rasterizer, ResourceProvider};
pub use folio_types::{MarginProfile, PaperSize};
