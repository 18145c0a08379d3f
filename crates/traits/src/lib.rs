pub mod rasterizer;
pub mod resource;
pub mod writer;

pub use rasterizer::{
    ImageSettlement, RasterError, RasterOptions, RasterRequest, Rasterizer, SettledImages,
};
pub use resource::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};
pub use writer::{DocumentWriter, ImagePlacement, WriterError};
