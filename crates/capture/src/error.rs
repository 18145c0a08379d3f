use folio_traits::RasterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Rasterization failed ({first}) and the retry without fonts failed too ({retry})")]
    Rasterize {
        first: RasterError,
        retry: RasterError,
    },

    #[error("Rasterizer returned an empty {width}x{height} bitmap")]
    EmptyCapture { width: u32, height: u32 },
}
