//! Entities - sheet documents and the things attached to them

mod active_effect;
mod actor;
mod component;
mod item;
mod sheet_layout;

pub use active_effect::{ActiveEffect, ActiveEffectTable};
pub use actor::{
    Actor, ActorKind, ItemAttachment, RejectedItem, RejectionReason, TemplateReload, Tombstone,
    TombstoneTarget,
};
pub use component::{
    Component, Container, ContentEntry, Dropdown, DynamicTable, InputField, Label, Meter,
    NumberField,
};
pub use item::{Item, ItemKind};
pub use sheet_layout::{HiddenProperty, SheetLayout, NAME_KEY};
