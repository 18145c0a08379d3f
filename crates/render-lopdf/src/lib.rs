//! PDF output for raster page images using lopdf.
//!
//! Every page holds one full-page image XObject. Nothing time-dependent is written,
//! so identical page images produce identical bytes.

mod writer;

pub use writer::LopdfDocumentWriter;
