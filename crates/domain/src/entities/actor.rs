//! Actor entity - a character sheet or the template it is built from
//!
//! # Derived data
//!
//! [`Actor::prepare_derived_data`] runs the whole computation pipeline with
//! explicit inputs only: the actor's layout, raw props, items, and effects,
//! plus an injected [`FormulaEvaluator`].
//!
//! # Template reload
//!
//! Reloading copies the template layout wholesale. Raw props whose key is no
//! longer declared, and bars the template dropped, come back as [`Tombstone`]s
//! and are removed from the actor.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{ActiveEffect, Component, Item, SheetLayout, NAME_KEY};
use crate::derived::{
    aggregate_modifiers, resolve, resolve_bars, resolve_roll, ComputedPhrase, DerivedData,
    ResolveError, RollError, RollTable,
};
use crate::formula::FormulaEvaluator;
use crate::value_objects::{
    AttributeBar, BarAdjustment, BarDisplay, PropertyMap, PropertyValue, ROW_DELETED_FLAG,
};
use crate::{ActorId, DomainError, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorKind {
    #[default]
    Character,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    #[serde(default)]
    pub kind: ActorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<ActorId>,
    #[serde(default)]
    pub layout: SheetLayout,
    #[serde(default)]
    pub props: PropertyMap,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,
}

// =============================================================================
// Template reload / item attachment results
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TombstoneTarget {
    Property,
    AttributeBar,
}

/// Marks an entry removed by a template reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    pub target: TombstoneTarget,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReload {
    pub template_id: ActorId,
    pub tombstones: Vec<Tombstone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionReason {
    /// Templates never hold items
    TemplateActor,
    NotEquippable,
    /// A unique item from the same source is already attached
    DuplicateUnique,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedItem {
    pub item_id: ItemId,
    pub name: String,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttachment {
    pub accepted: Vec<ItemId>,
    pub rejected: Vec<RejectedItem>,
}

impl Actor {
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind,
            template_id: None,
            layout: SheetLayout::default(),
            props: PropertyMap::new(),
            items: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn character(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Character)
    }

    pub fn template(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Template)
    }

    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_prop(mut self, path: &str, value: impl Into<PropertyValue>) -> Self {
        self.props.set(path, value);
        self
    }

    pub fn is_template(&self) -> bool {
        self.kind == ActorKind::Template
    }

    pub fn roll_table(&self) -> RollTable {
        RollTable::from_schema(&self.layout.schema())
    }

    // =========================================================================
    // Derived data
    // =========================================================================

    /// Resolve every computable property and bar of this actor.
    ///
    /// The actor name is visible to formulas as `name` unless a prop shadows it.
    pub fn prepare_derived_data(
        &self,
        evaluator: &dyn FormulaEvaluator,
    ) -> Result<DerivedData, ResolveError> {
        let schema = self.layout.schema();

        let mut raw = self.props.clone();
        if !raw.contains(NAME_KEY) {
            raw.set(NAME_KEY, self.name.as_str());
        }

        let modifiers = aggregate_modifiers(
            &self.items,
            &self.layout.active_effects,
            &self.effects,
            &raw,
            evaluator,
        );
        let resolution = resolve(&schema, &modifiers, &raw, evaluator)?;
        let bars = resolve_bars(
            &self.layout.bar_definitions(&schema),
            &resolution.props,
            evaluator,
        );

        tracing::debug!(
            actor_id = %self.id,
            passes = resolution.passes,
            unresolved = resolution.unresolved.len(),
            bars = bars.len(),
            "Derived data prepared"
        );

        Ok(DerivedData {
            props: resolution.props,
            bars,
            unresolved: resolution.unresolved,
            passes: resolution.passes,
        })
    }

    /// Evaluate a roll against already derived data.
    pub fn roll(
        &self,
        derived: &DerivedData,
        key: &str,
        alternative: bool,
        evaluator: &dyn FormulaEvaluator,
    ) -> Result<ComputedPhrase, RollError> {
        resolve_roll(key, alternative, &self.roll_table(), &derived.props, evaluator)
    }

    // =========================================================================
    // Bars
    // =========================================================================

    /// Apply token HUD input to a resolved bar, storing the new value in props.
    pub fn adjust_bar(
        &mut self,
        derived: &DerivedData,
        key: &str,
        adjustment: BarAdjustment,
        display: BarDisplay,
    ) -> Result<AttributeBar, DomainError> {
        let bar = derived
            .bar(key)
            .ok_or_else(|| DomainError::not_found("Attribute bar", key))?;

        let value = adjustment.apply(bar, display);
        self.props.set(key, value);
        Ok(AttributeBar::new(key, value, bar.max))
    }

    // =========================================================================
    // Template reload
    // =========================================================================

    /// Copy `template`'s layout into this actor and drop undeclared entries.
    pub fn reload_template(&mut self, template: &Actor) -> Result<TemplateReload, DomainError> {
        if !template.is_template() {
            return Err(DomainError::validation(format!(
                "'{}' is not a template",
                template.name
            )));
        }
        if self.id == template.id {
            return Err(DomainError::validation("A template cannot reload from itself"));
        }

        let declared = template.layout.keys();
        let mut tombstones: Vec<Tombstone> = self
            .props
            .keys()
            .filter(|key| !declared.contains(*key))
            .map(|key| Tombstone {
                target: TombstoneTarget::Property,
                key: key.clone(),
            })
            .collect();

        let kept_bars: BTreeSet<&String> = template.layout.attribute_bars.keys().collect();
        tombstones.extend(
            self.layout
                .attribute_bars
                .keys()
                .filter(|key| !kept_bars.contains(key))
                .map(|key| Tombstone {
                    target: TombstoneTarget::AttributeBar,
                    key: key.clone(),
                }),
        );

        for tombstone in &tombstones {
            if tombstone.target == TombstoneTarget::Property {
                self.props.remove(&tombstone.key);
            }
        }
        self.layout = template.layout.clone();
        self.template_id = Some(template.id);

        tracing::info!(
            actor_id = %self.id,
            template_id = %template.id,
            tombstones = tombstones.len(),
            "Template reloaded"
        );

        Ok(TemplateReload {
            template_id: template.id,
            tombstones,
        })
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Attach what the rules allow; report the rest.
    pub fn attach_items(&mut self, candidates: Vec<Item>) -> ItemAttachment {
        let mut attachment = ItemAttachment::default();

        for item in candidates {
            let reason = if self.is_template() {
                Some(RejectionReason::TemplateActor)
            } else if !item.is_equippable() {
                Some(RejectionReason::NotEquippable)
            } else if item.unique && self.has_item_from(item.source_id.as_deref()) {
                Some(RejectionReason::DuplicateUnique)
            } else {
                None
            };

            match reason {
                Some(reason) => attachment.rejected.push(RejectedItem {
                    item_id: item.id,
                    name: item.name,
                    reason,
                }),
                None => {
                    attachment.accepted.push(item.id);
                    self.items.push(item);
                }
            }
        }

        attachment
    }

    pub fn detach_item(&mut self, item_id: ItemId) -> Result<Item, DomainError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| DomainError::not_found("Item", item_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    fn has_item_from(&self, source_id: Option<&str>) -> bool {
        source_id.is_some_and(|source| {
            self.items
                .iter()
                .any(|item| item.source_id.as_deref() == Some(source))
        })
    }

    // =========================================================================
    // Dynamic tables
    // =========================================================================

    /// Add a live row and return its id (the next free integer).
    pub fn insert_row(&mut self, table: &str) -> Result<String, DomainError> {
        self.require_table(table)?;

        let next = self
            .props
            .get(table)
            .and_then(PropertyValue::as_map)
            .map(|rows| {
                rows.keys()
                    .filter_map(|row| row.parse::<u64>().ok())
                    .max()
                    .map_or(0, |max| max + 1)
            })
            .unwrap_or(0);
        let row_id = next.to_string();

        let mut row = BTreeMap::new();
        row.insert(ROW_DELETED_FLAG.to_string(), PropertyValue::Bool(false));
        self.props.set(&format!("{}.{}", table, row_id), row);
        Ok(row_id)
    }

    /// Soft-delete a row: it keeps its id and cells but stops being expanded.
    pub fn delete_row(&mut self, table: &str, row_id: &str) -> Result<(), DomainError> {
        self.require_row(table, row_id)?;
        self.props
            .set(&format!("{}.{}.{}", table, row_id, ROW_DELETED_FLAG), true);
        Ok(())
    }

    /// Exchange the contents of two rows.
    pub fn swap_rows(&mut self, table: &str, first: &str, second: &str) -> Result<(), DomainError> {
        self.require_row(table, first)?;
        self.require_row(table, second)?;

        let first_path = format!("{}.{}", table, first);
        let second_path = format!("{}.{}", table, second);
        let first_row = self.props.remove(&first_path).unwrap_or_default();
        let second_row = self.props.remove(&second_path).unwrap_or_default();
        self.props.set(&first_path, second_row);
        self.props.set(&second_path, first_row);
        Ok(())
    }

    /// Append columns to a dynamic table of this actor's layout.
    pub fn add_table_columns(
        &mut self,
        table: &str,
        columns: Vec<Component>,
    ) -> Result<(), DomainError> {
        self.layout
            .find_dynamic_table_mut(table)
            .ok_or_else(|| DomainError::not_found("Dynamic table", table))?
            .add_columns(columns)
    }

    fn require_table(&self, table: &str) -> Result<(), DomainError> {
        self.layout
            .find_dynamic_table(table)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Dynamic table", table))
    }

    fn require_row(&self, table: &str, row_id: &str) -> Result<(), DomainError> {
        self.require_table(table)?;
        match self.props.get(&format!("{}.{}", table, row_id)) {
            Some(row) if row.is_map() => Ok(()),
            _ => Err(DomainError::not_found(
                "Table row",
                format!("{}.{}", table, row_id),
            )),
        }
    }
}
