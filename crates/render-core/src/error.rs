use folio_traits::WriterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Slice {index} covers rows {offset}..{end} but the capture is only {available} px tall")]
    SliceOutOfBounds {
        index: usize,
        offset: u32,
        end: u32,
        available: u32,
    },

    #[error("Page image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Document writer error: {0}")]
    Writer(#[from] WriterError),
}
