//! Image sources resolved against a base directory.
//!
//! A source may be a plain relative path (`img/avatar.png`) or a `file:` URL with a
//! relative path. Resolved paths must stay inside the base directory; absolute paths
//! and `..` escapes are refused.

use folio_traits::{ResourceError, ResourceProvider, SharedResourceData};
use log::debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct FilesystemResourceProvider {
    base_path: PathBuf,
    canonical_base: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base_path = base_path.as_ref().to_path_buf();
        let canonical_base = base_path.canonicalize().ok();
        Self {
            base_path,
            canonical_base,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    fn strip_scheme(src: &str) -> &str {
        let src = src.strip_prefix("file://").unwrap_or(src);
        src.strip_prefix("file:").unwrap_or(src)
    }

    /// Returns `None` when the source would escape the base directory.
    fn resolve(&self, src: &str) -> Option<PathBuf> {
        let relative = Path::new(Self::strip_scheme(src));
        if relative.is_absolute() || relative.as_os_str().is_empty() {
            return None;
        }
        if relative
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return None;
        }

        let full_path = self.base_path.join(relative);
        match (full_path.canonicalize(), &self.canonical_base) {
            // Symlinks may still point outside the base.
            (Ok(canonical), Some(base)) => canonical.starts_with(base).then_some(canonical),
            _ => Some(full_path),
        }
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, src: &str) -> Result<SharedResourceData, ResourceError> {
        let path = self
            .resolve(src)
            .ok_or_else(|| ResourceError::NotFound(format!("{} (outside base directory)", src)))?;
        debug!("Loading image source '{}' from {}", src, path.display());

        std::fs::read(&path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(src.to_string())
            } else {
                ResourceError::LoadFailed {
                    src: src.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, src: &str) -> bool {
        self.resolve(src).is_some_and(|path| path.is_file())
    }

    fn base_path(&self) -> Option<&str> {
        self.base_path.to_str()
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}
