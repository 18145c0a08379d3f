//! Page margins and content padding, both in source-layout pixels.
use serde::{de, Deserialize, Deserializer, Serialize};

/// Upper bound applied to every margin side.
pub const MAX_MARGIN_PX: f32 = 128.0;

fn clamp_side(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, MAX_MARGIN_PX)
    } else {
        0.0
    }
}

/// Margins requested for every output page.
///
/// Each side is clamped to `[0, 128]` on construction. Only `top` and `bottom`
/// take part in pagination; `left` and `right` are consumed by the layout that
/// produced the node.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct MarginProfile {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl MarginProfile {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top: clamp_side(top),
            right: clamp_side(right),
            bottom: clamp_side(bottom),
            left: clamp_side(left),
        }
    }

    pub fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Re-applies the clamp, for values that were assembled field by field.
    pub fn clamped(self) -> Self {
        Self::new(self.top, self.right, self.bottom, self.left)
    }

    /// Parse a length with an optional `px` suffix.
    fn parse_length(input: &str) -> Result<f32, String> {
        let input = input.trim();
        let number = input.strip_suffix("px").unwrap_or(input);
        number
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("Invalid number '{}': {}", input, e))
    }

    /// Parse CSS-style margin shorthand (1, 2, or 4 values)
    fn parse_shorthand(input: &str) -> Result<Self, String> {
        let values = input
            .split_whitespace()
            .map(Self::parse_length)
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [all] => Ok(Self::all(*all)),
            [y, x] => Ok(Self::new(*y, *x, *y, *x)),
            [top, right, bottom, left] => Ok(Self::new(*top, *right, *bottom, *left)),
            _ => Err(format!(
                "Invalid margin shorthand: expected 1, 2, or 4 values, got {}",
                values.len()
            )),
        }
    }
}

impl<'de> Deserialize<'de> for MarginProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MarginsVisitor;
        impl<'de> de::Visitor<'de> for MarginsVisitor {
            type Value = MarginProfile;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number, a string like '24px 16px', or a map")
            }

            fn visit_str<E>(self, value: &str) -> Result<MarginProfile, E>
            where
                E: de::Error,
            {
                MarginProfile::parse_shorthand(value).map_err(E::custom)
            }

            fn visit_f64<E>(self, value: f64) -> Result<MarginProfile, E>
            where
                E: de::Error,
            {
                Ok(MarginProfile::all(value as f32))
            }

            fn visit_u64<E>(self, value: u64) -> Result<MarginProfile, E>
            where
                E: de::Error,
            {
                Ok(MarginProfile::all(value as f32))
            }

            fn visit_i64<E>(self, value: i64) -> Result<MarginProfile, E>
            where
                E: de::Error,
            {
                Ok(MarginProfile::all(value as f32))
            }

            fn visit_map<A>(self, mut map: A) -> Result<MarginProfile, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut margins = MarginProfile::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "top" => margins.top = map.next_value()?,
                        "right" => margins.right = map.next_value()?,
                        "bottom" => margins.bottom = map.next_value()?,
                        "left" => margins.left = map.next_value()?,
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }
                Ok(margins.clamped())
            }
        }
        deserializer.deserialize_any(MarginsVisitor)
    }
}

/// Padding found at the top and bottom of the printable content node.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct ContentPadding {
    pub top: f32,
    pub bottom: f32,
}

impl ContentPadding {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    /// `None` when either side is negative or not a number.
    pub fn validated(self) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        (valid(self.top) && valid(self.bottom)).then_some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_are_clamped() {
        let margins = MarginProfile::new(-4.0, 300.0, 24.0, f32::NAN);
        assert_eq!(margins, MarginProfile { top: 0.0, right: 128.0, bottom: 24.0, left: 0.0 });
    }

    #[test]
    fn test_shorthand() {
        let m: MarginProfile = serde_json::from_str("\"24px 16\"").unwrap();
        assert_eq!(m, MarginProfile::new(24.0, 16.0, 24.0, 16.0));

        let m: MarginProfile = serde_json::from_str("\"1 2 3 4\"").unwrap();
        assert_eq!(m, MarginProfile::new(1.0, 2.0, 3.0, 4.0));

        assert!(serde_json::from_str::<MarginProfile>("\"1 2 3\"").is_err());
    }

    #[test]
    fn test_map_form_is_clamped() {
        let m: MarginProfile =
            serde_json::from_str(r#"{"top": 500, "bottom": 24, "extra": true}"#).unwrap();
        assert_eq!(m.top, MAX_MARGIN_PX);
        assert_eq!(m.bottom, 24.0);
        assert_eq!(m.left, 0.0);
    }

    #[test]
    fn test_number_form() {
        let m: MarginProfile = serde_json::from_str("32").unwrap();
        assert_eq!(m, MarginProfile::all(32.0));
    }

    #[test]
    fn test_padding_validation() {
        assert!(ContentPadding::new(24.0, 24.0).validated().is_some());
        assert!(ContentPadding::new(-1.0, 24.0).validated().is_none());
        assert!(ContentPadding::new(24.0, f32::NAN).validated().is_none());
    }
}
