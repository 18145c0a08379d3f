//! Byte loading for embedded image sources.
//!
//! The capture engine never touches the filesystem or network itself: every
//! `src` of an embedded image is handed to a [`ResourceProvider`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{src}': {message}")]
    LoadFailed { src: String, message: String },

    #[error("Invalid resource format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

pub type SharedResourceData = Arc<Vec<u8>>;

/// Loads the raw bytes behind an image `src`.
///
/// Implementations are shared across the blocking tasks that settle images,
/// hence `Send + Sync`. `load` may block.
pub trait ResourceProvider: Send + Sync + Debug {
    fn load(&self, src: &str) -> Result<SharedResourceData, ResourceError>;

    fn exists(&self, src: &str) -> bool;

    /// Base location relative sources are resolved against, if any.
    fn base_path(&self) -> Option<&str> {
        None
    }

    fn name(&self) -> &'static str;
}

/// Pre-populated image bytes keyed by `src`.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert). The store is owned here, so a
    /// poisoned lock is recovered instead of dropping the resource.
    pub fn with_resource(mut self, src: impl Into<String>, data: Vec<u8>) -> Self {
        self.resources
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(src.into(), Arc::new(data));
        self
    }

    /// Adds or replaces a resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn insert(&self, src: impl Into<String>, data: Vec<u8>) -> Result<(), ResourceError> {
        let src = src.into();
        let mut resources = self.resources.write().map_err(|_| ResourceError::LoadFailed {
            src: src.clone(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources.insert(src, Arc::new(data));
        Ok(())
    }

    pub fn remove(&self, src: &str) -> Option<SharedResourceData> {
        self.resources.write().ok()?.remove(src)
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, src: &str) -> Result<SharedResourceData, ResourceError> {
        let resources = self.resources.read().map_err(|_| ResourceError::LoadFailed {
            src: src.to_string(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources
            .get(src)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(src.to_string()))
    }

    fn exists(&self, src: &str) -> bool {
        self.resources
            .read()
            .map(|r| r.contains_key(src))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_load() {
        let provider = InMemoryResourceProvider::new();
        provider.insert("avatar.png", b"png bytes".to_vec()).unwrap();

        let data = provider.load("avatar.png").unwrap();
        assert_eq!(&*data, b"png bytes");
        assert!(provider.exists("avatar.png"));
    }

    #[test]
    fn test_missing_source() {
        let provider = InMemoryResourceProvider::new();
        assert!(matches!(
            provider.load("missing.png"),
            Err(ResourceError::NotFound(_))
        ));
        assert!(!provider.exists("missing.png"));
        assert!(provider.base_path().is_none());
    }

    #[test]
    fn test_builder_overwrites() {
        let provider = InMemoryResourceProvider::new()
            .with_resource("a.png", vec![1])
            .with_resource("a.png", vec![2]);
        assert_eq!(provider.len(), 1);
        assert_eq!(&*provider.load("a.png").unwrap(), &[2]);
    }

    #[test]
    fn test_builder_keeps_resource_after_poisoning() {
        let provider = Arc::new(InMemoryResourceProvider::new());
        let shared = Arc::clone(&provider);
        let _ = std::thread::spawn(move || {
            let _guard = shared.resources.write().unwrap();
            panic!("poison the store");
        })
        .join();
        assert!(provider.insert("b.png", vec![0]).is_err());

        let provider = Arc::try_unwrap(provider).unwrap().with_resource("a.png", vec![1]);
        let store = provider
            .resources
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        assert_eq!(store.get("a.png").map(|data| data.as_slice()), Some(&[1u8][..]));
    }

    #[test]
    fn test_remove() {
        let provider = InMemoryResourceProvider::new().with_resource("a.png", vec![1]);
        assert!(provider.remove("a.png").is_some());
        assert!(provider.remove("a.png").is_none());
        assert!(provider.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = ResourceError::LoadFailed {
            src: "logo.png".to_string(),
            message: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("logo.png"));
        assert!(err.to_string().contains("permission denied"));

        let io: ResourceError = std::io::Error::other("broken pipe").into();
        assert!(matches!(io, ResourceError::Io(_)));
    }
}
