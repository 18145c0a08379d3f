//! Capture of a normalized node tree into one continuous bitmap.
//!
//! The clone is mounted in an off-screen [`StagingArea`], its embedded images are
//! settled concurrently, and the [`Rasterizer`](folio_traits::Rasterizer) is invoked
//! once, with a single retry that skips web fonts.

mod engine;
mod error;
mod settle;
mod staging;

pub use engine::{CaptureEngine, CaptureRequest, CaptureResult, CaptureWarning, MinHeightPolicy};
pub use error::CaptureError;
pub use settle::{decode_data_uri, settle_images};
pub use staging::{MountGuard, StagingArea};
