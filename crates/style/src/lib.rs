pub mod color;
pub mod node;
pub mod normalizer;
pub mod parsers;
pub mod stylesheet;
pub mod variables;

pub use color::{ColorError, ColorFunctions};
pub use node::{ComputedStyle, LayoutBox, NodeContent, StyledNode, PRINTABLE_AREA_ATTRIBUTE};
pub use normalizer::{ColorSpaceNormalizer, NormalizationReport, NormalizeWarning, Normalized};
pub use parsers::StyleParseError;
pub use stylesheet::{AtRuleFilter, StylesheetFilter};
pub use variables::{CustomProperties, VarError, VarScope};
