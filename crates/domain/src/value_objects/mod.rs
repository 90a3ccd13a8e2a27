//! Value objects - Immutable objects defined by their attributes

mod attribute_bar;
mod modifier;
mod property;
mod roll_key;

pub use attribute_bar::{AttributeBar, BarAdjustment, BarBound, BarDefinition, BarDisplay};
pub use modifier::{
    apply_modifiers, Modifier, ModifierDefinition, ModifierGroups, ModifierOperator,
    ModifierSource,
};
pub use property::{format_number, PropertyMap, PropertyValue, ROW_DELETED_FLAG};
pub use roll_key::{RollKey, RowFilter};
