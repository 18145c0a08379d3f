//! Resource providers for embedded image sources.
//!
//! - [`FilesystemResourceProvider`]: sources relative to a base directory
//! - [`InMemoryResourceProvider`]: pre-populated bytes, re-exported from `folio-traits`

mod filesystem;

pub use filesystem::FilesystemResourceProvider;

pub use folio_traits::InMemoryResourceProvider;
