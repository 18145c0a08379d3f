//! Color functions the rasterizer cannot consume, and their conversion to `rgb()`.
use crate::parsers::contains_function;
use crate::variables::VarError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("could not resolve variables: {0}")]
    Variable(#[from] VarError),

    #[error("could not parse '{expression}': {message}")]
    Parse { expression: String, message: String },

    #[error("unbalanced parentheses in '{0}'")]
    Unbalanced(String),
}

/// The set of color function names that must be rewritten before capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFunctions {
    names: Vec<String>,
}

impl Default for ColorFunctions {
    fn default() -> Self {
        Self::new(["oklch", "oklab"])
    }
}

impl ColorFunctions {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.into().trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True if the text calls any of the unsupported functions.
    pub fn appears_in(&self, text: &str) -> bool {
        self.names.iter().any(|name| contains_function(text, name))
    }
}

/// Converts one fully resolved color expression into `rgb()`/`rgba()` text.
pub fn convert_to_rgb(expression: &str) -> Result<String, ColorError> {
    let color = csscolorparser::parse(expression).map_err(|e| ColorError::Parse {
        expression: expression.to_string(),
        message: e.to_string(),
    })?;
    let [r, g, b, _] = color.to_rgba8();
    let alpha = (f64::from(color.a) * 1000.0).round() / 1000.0;
    if alpha >= 1.0 {
        Ok(format!("rgb({}, {}, {})", r, g, b))
    } else {
        Ok(format!("rgba({}, {}, {}, {})", r, g, b, alpha.max(0.0)))
    }
}
