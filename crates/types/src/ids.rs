//! Newtype wrappers for image sources and node locations
//!
//! These keep image URIs and tree paths from being confused with the plain strings
//! and index lists that surround them in style values.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// The `src` of an embedded raster image.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ImageSrc(Arc<str>);

impl ImageSrc {
    pub fn new(src: impl Into<Arc<str>>) -> Self {
        Self(src.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Inline `data:` URIs need no loading.
    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl From<String> for ImageSrc {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ImageSrc {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for ImageSrc {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageSrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Child indices leading from a subtree root to a node. The root is the empty path.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_src_creation() {
        let a = ImageSrc::new("avatar.png");
        let b = ImageSrc::from("avatar.png");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "avatar.png");
        assert!(!a.is_data_uri());
        assert!(ImageSrc::from("data:image/png;base64,AAAA").is_data_uri());
    }

    #[test]
    fn test_node_path_display() {
        let path = NodePath::root().child(0).child(3);
        assert_eq!(path.to_string(), "/0/3");
        assert_eq!(path.depth(), 2);
        assert_eq!(NodePath::root().to_string(), "/");
    }

    #[test]
    fn test_hash_map_usage() {
        use std::collections::HashMap;

        let mut loaded = HashMap::new();
        loaded.insert(ImageSrc::new("logo.png"), 42);
        assert_eq!(loaded.get(&ImageSrc::new("logo.png")), Some(&42));
    }
}
