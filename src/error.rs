use folio_capture::CaptureError;
use folio_render_core::AssembleError;
use folio_traits::WriterError;
use folio_types::PaperSizeError;
use thiserror::Error;

/// Everything that can stop an export.
///
/// Degraded paths (unconvertible colors, images that fail to load, planner fallbacks)
/// never surface here; they are reported as warnings on the summary.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No node was given to export")]
    MissingNode,

    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Page assembly failed: {0}")]
    Assemble(#[from] AssembleError),

    #[error("Document writer failed: {0}")]
    Writer(#[from] WriterError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    PaperSize(#[from] PaperSizeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
