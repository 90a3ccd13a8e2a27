//! SheetForge domain - templates, formulas, and derived-property resolution
//!
//! Everything here is synchronous and free of I/O. The engine crate loads
//! actors, calls into this crate, and persists the results.

pub mod derived;
pub mod entities;
pub mod error;
pub mod formula;
pub mod ids;
pub mod schema;
pub mod value_objects;

pub use derived::{
    aggregate_modifiers, resolve, resolve_bars, resolve_roll, strip_computed, ComputedPhrase,
    DerivedData, Resolution, ResolveError, RollError, RollTable,
};
pub use entities::{
    ActiveEffect, ActiveEffectTable, Actor, ActorKind, Component, Container, ContentEntry,
    Dropdown, DynamicTable, HiddenProperty, InputField, Item, ItemAttachment, ItemKind, Label,
    Meter, NumberField, RejectedItem, RejectionReason, SheetLayout, TemplateReload, Tombstone,
    TombstoneTarget,
};
pub use error::DomainError;
pub use formula::{
    DiceRoller, EvalOptions, Evaluation, ExpressionEvaluator, FixedRoller, FormulaError,
    FormulaEvaluator,
};
pub use ids::{ActorId, EffectId, ItemId};
pub use schema::{split_table_key, SheetSchema};
pub use value_objects::{
    apply_modifiers, AttributeBar, BarAdjustment, BarBound, BarDefinition, BarDisplay, Modifier,
    ModifierDefinition, ModifierGroups, ModifierOperator, ModifierSource, PropertyMap,
    PropertyValue, RollKey, RowFilter,
};
