//! The fixed table of supported paper profiles.
use crate::units::mm_to_px;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown paper size: {0}")]
pub struct PaperSizeError(pub String);

/// A named paper size. `Short` is US letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaperSize {
    Short,
    #[default]
    A4,
    Legal,
}

/// Physical dimensions of a paper size plus the tag the document writer knows it by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperProfile {
    pub size: PaperSize,
    pub width_mm: f32,
    pub height_mm: f32,
    pub format_tag: &'static str,
}

const SHORT: PaperProfile = PaperProfile {
    size: PaperSize::Short,
    width_mm: 215.9,
    height_mm: 279.4,
    format_tag: "letter",
};

const A4: PaperProfile = PaperProfile {
    size: PaperSize::A4,
    width_mm: 210.0,
    height_mm: 297.0,
    format_tag: "a4",
};

const LEGAL: PaperProfile = PaperProfile {
    size: PaperSize::Legal,
    width_mm: 215.9,
    height_mm: 355.6,
    format_tag: "legal",
};

impl PaperSize {
    pub const ALL: [PaperSize; 3] = [PaperSize::Short, PaperSize::A4, PaperSize::Legal];

    pub fn profile(self) -> PaperProfile {
        match self {
            PaperSize::Short => SHORT,
            PaperSize::A4 => A4,
            PaperSize::Legal => LEGAL,
        }
    }

    /// The profile with the greatest height.
    pub fn tallest() -> PaperSize {
        PaperSize::ALL
            .into_iter()
            .max_by(|a, b| a.profile().height_mm.total_cmp(&b.profile().height_mm))
            .unwrap_or(PaperSize::Legal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaperSize::Short => "short",
            PaperSize::A4 => "a4",
            PaperSize::Legal => "legal",
        }
    }
}

impl PaperProfile {
    /// Paper height in source-layout pixels, floored so forced heights never exceed a page.
    pub fn height_px_floor(&self) -> f32 {
        (mm_to_px(self.height_mm) + 1e-3).floor()
    }

    pub fn width_px(&self) -> f32 {
        mm_to_px(self.width_mm)
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperSize {
    type Err = PaperSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "letter" => Ok(PaperSize::Short),
            "a4" => Ok(PaperSize::A4),
            "legal" => Ok(PaperSize::Legal),
            _ => Err(PaperSizeError(s.to_string())),
        }
    }
}

impl Serialize for PaperSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaperSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Page orientation passed to the document writer when starting a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}
