//! Item entity - equipment that can grant modifiers to its owner
//!
//! Items keep their own property bag. Their modifier formulas are evaluated
//! against that bag, never against the owning actor.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ModifierDefinition, PropertyMap, PropertyValue};
use crate::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    #[default]
    Equippable,
    /// Sub-templates, user-input templates and other non-attachable kinds
    Other,
}

/// An item attached to (or offered to) an actor.
///
/// Plain data struct; attachment rules live on [`Actor`](super::Actor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub kind: ItemKind,
    /// At most one item per `source_id` may be attached
    #[serde(default)]
    pub unique: bool,
    /// Identifier of the compendium/world item this was copied from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default = "default_equipped")]
    pub equipped: bool,
    #[serde(default)]
    pub props: PropertyMap,
    #[serde(default)]
    pub modifiers: Vec<ModifierDefinition>,
}

fn default_equipped() -> bool {
    true
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            unique: false,
            source_id: None,
            equipped: true,
            props: PropertyMap::new(),
            modifiers: Vec::new(),
        }
    }

    pub fn equippable(name: impl Into<String>) -> Self {
        Self::new(name, ItemKind::Equippable)
    }

    pub fn unique_from(mut self, source_id: impl Into<String>) -> Self {
        self.unique = true;
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_prop(mut self, path: &str, value: impl Into<PropertyValue>) -> Self {
        self.props.set(path, value);
        self
    }

    pub fn with_modifier(mut self, modifier: ModifierDefinition) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn is_equippable(&self) -> bool {
        self.kind == ItemKind::Equippable
    }

    /// Equipped equippable items feed the modifier aggregation.
    pub fn contributes_modifiers(&self) -> bool {
        self.is_equippable() && self.equipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": "5f0c7a0e-6f4b-4a8e-9b0a-3c1d2e4f5a6b",
            "name": "Longsword",
            "modifiers": [{ "key": "str", "formula": "1", "operator": "+" }]
        }))
        .unwrap();

        assert!(item.is_equippable());
        assert!(item.equipped);
        assert!(!item.unique);
        assert_eq!(item.modifiers.len(), 1);
    }

    #[test]
    fn only_equipped_equippables_contribute() {
        let mut sword = Item::equippable("Sword");
        assert!(sword.contributes_modifiers());
        sword.equipped = false;
        assert!(!sword.contributes_modifiers());
        assert!(!Item::new("Template", ItemKind::Other).contributes_modifiers());
    }
}
