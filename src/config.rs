use crate::error::ExportError;
use folio_capture::MinHeightPolicy;
use folio_style::{AtRuleFilter, ColorFunctions, ColorSpaceNormalizer};
use folio_types::{MarginProfile, PaperSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

fn default_capture_scale() -> f32 {
    2.0
}

fn default_color_functions() -> Vec<String> {
    ColorFunctions::default().names().to_vec()
}

fn default_at_rules() -> Vec<String> {
    AtRuleFilter::default().disallowed().to_vec()
}

/// Export settings. Every field has a default, so `{}` is a valid configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Paper used when a request does not name one.
    #[serde(default)]
    pub paper_size: PaperSize,
    /// Margins used when a request does not carry its own.
    #[serde(default)]
    pub margins: MarginProfile,
    /// Raster pixels per source pixel requested from the rasterizer.
    #[serde(default = "default_capture_scale")]
    pub capture_scale: f32,
    #[serde(default)]
    pub min_height_policy: MinHeightPolicy,
    #[serde(default = "default_color_functions")]
    pub unsupported_color_functions: Vec<String>,
    #[serde(default = "default_at_rules")]
    pub disallowed_at_rules: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::default(),
            margins: MarginProfile::default(),
            capture_scale: default_capture_scale(),
            min_height_policy: MinHeightPolicy::default(),
            unsupported_color_functions: default_color_functions(),
            disallowed_at_rules: default_at_rules(),
        }
    }
}

impl ExportConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ExportError> {
        let config: ExportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            ExportError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read config from '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json_str(&source)
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if !(self.capture_scale.is_finite() && self.capture_scale > 0.0) {
            return Err(ExportError::Config(format!(
                "captureScale must be a positive number, got {}",
                self.capture_scale
            )));
        }
        Ok(())
    }

    pub fn color_functions(&self) -> ColorFunctions {
        ColorFunctions::new(self.unsupported_color_functions.iter().map(String::as_str))
    }

    pub fn normalizer(&self) -> ColorSpaceNormalizer {
        ColorSpaceNormalizer::new(self.color_functions())
    }

    pub fn at_rule_filter(&self) -> AtRuleFilter {
        AtRuleFilter::new(self.disallowed_at_rules.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = ExportConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ExportConfig::default());
        assert_eq!(config.capture_scale, 2.0);
        assert_eq!(config.unsupported_color_functions, vec!["oklab", "oklch"]);
        assert_eq!(config.disallowed_at_rules, vec!["@property", "@layer"]);
    }

    #[test]
    fn test_full_config() {
        let config = ExportConfig::from_json_str(
            r#"{
                "paperSize": "legal",
                "margins": { "top": 24, "bottom": 500 },
                "captureScale": 3,
                "minHeightPolicy": "tallest_profile",
                "unsupportedColorFunctions": ["oklch", "LAB"],
                "disallowedAtRules": ["layer"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.paper_size, PaperSize::Legal);
        assert_eq!(config.margins.top, 24.0);
        assert_eq!(config.margins.bottom, 128.0);
        assert_eq!(config.capture_scale, 3.0);
        assert_eq!(config.min_height_policy, MinHeightPolicy::TallestProfile);
        assert!(config.color_functions().appears_in("lab(50% 0 0)"));
        assert_eq!(config.at_rule_filter().disallowed(), ["@layer"]);
    }

    #[test]
    fn test_rejects_bad_capture_scale() {
        let err = ExportConfig::from_json_str(r#"{ "captureScale": 0 }"#).unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
        assert!(ExportConfig::from_json_str(r#"{ "paperSize": "tabloid" }"#).is_err());
    }

    #[test]
    fn test_from_missing_file() {
        let err = ExportConfig::from_file("/nonexistent/folio.json").unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
