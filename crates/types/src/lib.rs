pub mod ids;
pub mod margins;
pub mod paper;
pub mod units;

pub use ids::{ImageSrc, NodePath};
pub use margins::{ContentPadding, MarginProfile, MAX_MARGIN_PX};
pub use paper::{Orientation, PaperProfile, PaperSize, PaperSizeError};
