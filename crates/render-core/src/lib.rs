//! Page assembly for the folio export pipeline.
//!
//! - [`PageAssembler`] cuts a continuous capture into margin-padded page images and
//!   feeds them to a [`DocumentWriter`](folio_traits::DocumentWriter) in order
//! - [`BoxRasterizer`] is a reference [`Rasterizer`](folio_traits::Rasterizer) that
//!   paints layout boxes, background colors and settled images

mod assembler;
mod box_rasterizer;
mod error;
pub mod utils;

pub use assembler::{Assembled, PageAssembler, PageImage};
pub use box_rasterizer::BoxRasterizer;
pub use error::AssembleError;
