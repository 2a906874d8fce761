//! Set, color and custom-group views over resolved cards.

pub mod by_color;
pub mod by_set;
pub mod custom;

pub use by_color::{group_by_color, ColorBucket, ColorCategory, ColorlessKind};
pub use by_set::{group_by_set, SetCard, SetGroup};
pub use custom::{group_by_custom, CustomGrouping, GroupedSets};
