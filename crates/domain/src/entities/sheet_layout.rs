//! Sheet layout - the structure an actor copies from its template

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{ActiveEffectTable, Component, DynamicTable};
use crate::schema::{split_table_key, SheetSchema};
use crate::value_objects::BarDefinition;

/// Key of the actor name, always part of the template key set.
pub const NAME_KEY: &str = "name";

/// A computed attribute declared on the template but not rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenProperty {
    pub name: String,
    pub value: String,
}

impl HiddenProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Component>,
    #[serde(default)]
    pub hidden: Vec<HiddenProperty>,
    /// Bars declared outside the component tree
    #[serde(default)]
    pub attribute_bars: BTreeMap<String, BarDefinition>,
    #[serde(default)]
    pub active_effects: ActiveEffectTable,
}

impl SheetLayout {
    /// Header, then body, then hidden properties.
    pub fn schema(&self) -> SheetSchema {
        SheetSchema::extract_all(self.header.iter().chain(self.body.iter())).with_hidden(&self.hidden)
    }

    /// Every key a template declares: keyed components, hidden names, and `name`.
    pub fn keys(&self) -> BTreeSet<String> {
        let mut keys = self.schema().keyed_properties;
        keys.extend(self.hidden.iter().map(|property| property.name.clone()));
        keys.insert(NAME_KEY.to_string());
        keys
    }

    /// Layout bars overlaid by component bars; table-field bars excluded.
    pub fn bar_definitions(&self, schema: &SheetSchema) -> BTreeMap<String, BarDefinition> {
        self.attribute_bars
            .iter()
            .chain(schema.attribute_bars.iter())
            .filter(|(key, _)| split_table_key(key).is_none())
            .map(|(key, definition)| (key.clone(), definition.clone()))
            .collect()
    }

    pub fn find_dynamic_table(&self, key: &str) -> Option<&DynamicTable> {
        self.roots().find_map(|root| root.find_dynamic_table(key))
    }

    pub fn find_dynamic_table_mut(&mut self, key: &str) -> Option<&mut DynamicTable> {
        self.header
            .iter_mut()
            .chain(self.body.iter_mut())
            .find_map(|root| root.find_dynamic_table_mut(key))
    }

    fn roots(&self) -> impl Iterator<Item = &Component> {
        self.header.iter().chain(self.body.iter())
    }
}
