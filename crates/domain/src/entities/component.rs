//! Component tree - the layout of a sheet template
//!
//! A template's header and body are trees of [`Component`]s. Layout nodes
//! (panels, tabs, static tables) only hold children. Data nodes carry a `key`
//! and optionally a formula (`value`), roll messages, or a bar maximum
//! (`maxVal`). A [`DynamicTable`] describes one row through its `rowLayout`;
//! each row's cells are stored under `<tableKey>.<rowId>.<column>`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::value_objects::BarBound;
use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Component {
    Panel(Container),
    TabbedPanel(Container),
    Tab(Container),
    /// Static table: `contents` holds rows, each an array of cells
    Table(Container),
    DynamicTable(DynamicTable),
    Label(Label),
    TextField(InputField),
    Checkbox(InputField),
    Dropdown(Dropdown),
    NumberField(NumberField),
    Meter(Meter),
    /// Any component type this engine does not know; carries no data or children.
    /// Re-serializes as a bare `{"type": "unknown"}`.
    #[serde(other)]
    Unknown,
}

/// Entry of a container's `contents`: a single child or a static-table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentEntry {
    Row(Vec<Component>),
    Single(Component),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub contents: Vec<ContentEntry>,
}

impl Container {
    pub fn new(contents: Vec<Component>) -> Self {
        Self {
            key: None,
            title: None,
            contents: contents.into_iter().map(ContentEntry::Single).collect(),
        }
    }

    /// Static-table layout: one entry per row.
    pub fn rows(rows: Vec<Vec<Component>>) -> Self {
        Self {
            key: None,
            title: None,
            contents: rows.into_iter().map(ContentEntry::Row).collect(),
        }
    }
}

/// Computed text, optionally rollable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_roll_message: Option<String>,
}

impl Label {
    pub fn computed(key: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(formula.into()),
            ..Self::default()
        }
    }

    pub fn with_roll(mut self, formula: impl Into<String>) -> Self {
        self.roll_message = Some(formula.into());
        self
    }

    pub fn with_alt_roll(mut self, formula: impl Into<String>) -> Self {
        self.alt_roll_message = Some(formula.into());
        self
    }
}

/// User-entered text or checkbox value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl InputField {
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            label: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dropdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// User-entered number, optionally capped (and shown as a bar) by `maxVal`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_val: Option<BarBound>,
}

impl NumberField {
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            max_val: None,
        }
    }

    pub fn with_max(mut self, max: impl Into<BarBound>) -> Self {
        self.max_val = Some(max.into());
        self
    }
}

/// Computed gauge: a formula value and a maximum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_val: Option<BarBound>,
}

/// Repeating table whose rows live in the actor's props.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicTable {
    pub key: String,
    #[serde(default)]
    pub row_layout: Vec<Component>,
    #[serde(default)]
    pub head: bool,
    #[serde(default)]
    pub delete_warning: bool,
}

impl DynamicTable {
    pub fn new(key: impl Into<String>, row_layout: Vec<Component>) -> Self {
        Self {
            key: key.into(),
            row_layout,
            head: true,
            delete_warning: false,
        }
    }

    /// Keys of the columns currently declared.
    pub fn column_keys(&self) -> BTreeSet<String> {
        self.row_layout
            .iter()
            .filter_map(|column| column.key().map(str::to_string))
            .collect()
    }

    /// Append columns, rejecting the whole batch if any key is already taken.
    pub fn add_columns(&mut self, columns: Vec<Component>) -> Result<(), DomainError> {
        let mut taken = self.column_keys();
        for column in &columns {
            if let Some(key) = column.key() {
                if !taken.insert(key.to_string()) {
                    return Err(DomainError::constraint(format!(
                        "Duplicate column key '{}' in table '{}'",
                        key, self.key
                    )));
                }
            }
        }
        self.row_layout.extend(columns);
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

impl Component {
    /// Data key; empty keys count as absent.
    pub fn key(&self) -> Option<&str> {
        match self {
            Component::Panel(c) | Component::TabbedPanel(c) | Component::Tab(c) | Component::Table(c) => {
                non_empty(&c.key)
            }
            Component::DynamicTable(table) => Some(table.key.as_str()).filter(|key| !key.is_empty()),
            Component::Label(label) => non_empty(&label.key),
            Component::TextField(field) | Component::Checkbox(field) => non_empty(&field.key),
            Component::Dropdown(dropdown) => non_empty(&dropdown.key),
            Component::NumberField(field) => non_empty(&field.key),
            Component::Meter(meter) => non_empty(&meter.key),
            Component::Unknown => None,
        }
    }

    /// Formula that makes this node computable.
    pub fn value_formula(&self) -> Option<&str> {
        match self {
            Component::Label(label) => non_empty(&label.value),
            Component::Meter(meter) => non_empty(&meter.value),
            _ => None,
        }
    }

    pub fn roll_message(&self) -> Option<&str> {
        match self {
            Component::Label(label) => non_empty(&label.roll_message),
            _ => None,
        }
    }

    pub fn alt_roll_message(&self) -> Option<&str> {
        match self {
            Component::Label(label) => non_empty(&label.alt_roll_message),
            _ => None,
        }
    }

    /// Bar maximum that makes this node a bar source.
    pub fn max_val(&self) -> Option<&BarBound> {
        let max = match self {
            Component::NumberField(field) => field.max_val.as_ref(),
            Component::Meter(meter) => meter.max_val.as_ref(),
            _ => None,
        };
        max.filter(|bound| !bound.is_blank())
    }

    /// Children in document order, static-table rows flattened one level.
    pub fn children(&self) -> Vec<&Component> {
        match self {
            Component::Panel(c) | Component::TabbedPanel(c) | Component::Tab(c) | Component::Table(c) => c
                .contents
                .iter()
                .flat_map(|entry| match entry {
                    ContentEntry::Row(cells) => cells.iter().collect::<Vec<_>>(),
                    ContentEntry::Single(child) => vec![child],
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Find a dynamic table anywhere below (or at) this node.
    pub fn find_dynamic_table(&self, key: &str) -> Option<&DynamicTable> {
        match self {
            Component::DynamicTable(table) if table.key == key => Some(table),
            _ => self
                .children()
                .into_iter()
                .find_map(|child| child.find_dynamic_table(key)),
        }
    }

    pub fn find_dynamic_table_mut(&mut self, key: &str) -> Option<&mut DynamicTable> {
        match self {
            Component::DynamicTable(table) if table.key == key => Some(table),
            Component::Panel(c) | Component::TabbedPanel(c) | Component::Tab(c) | Component::Table(c) => {
                c.contents.iter_mut().find_map(|entry| match entry {
                    ContentEntry::Row(cells) => cells
                        .iter_mut()
                        .find_map(|cell| cell.find_dynamic_table_mut(key)),
                    ContentEntry::Single(child) => child.find_dynamic_table_mut(key),
                })
            }
            _ => None,
        }
    }

    pub fn is_dynamic_table(&self, key: &str) -> bool {
        matches!(self, Component::DynamicTable(table) if table.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_tree() {
        let root: Component = serde_json::from_value(serde_json::json!({
            "type": "panel",
            "contents": [
                { "type": "label", "key": "hpMax", "value": "10 + con" },
                [
                    { "type": "numberField", "key": "hp", "maxVal": "hpMax" },
                    { "type": "textField", "key": "" }
                ],
                {
                    "type": "dynamicTable",
                    "key": "attacks",
                    "rowLayout": [{ "type": "textField", "key": "name" }]
                }
            ]
        }))
        .unwrap();

        let children = root.children();
        assert_eq!(children.len(), 4);
        assert_eq!(children[0].value_formula(), Some("10 + con"));
        assert_eq!(children[1].max_val(), Some(&BarBound::from("hpMax")));
        assert_eq!(children[2].key(), None);
        assert!(children[3].is_dynamic_table("attacks"));
    }

    #[test]
    fn unknown_component_types_are_inert() {
        let root: Component = serde_json::from_value(serde_json::json!({
            "type": "panel",
            "contents": [
                {
                    "type": "radarChart",
                    "key": "stats",
                    "value": "str + dex",
                    "contents": [{ "type": "label", "key": "hidden", "value": "1" }]
                },
                { "type": "numberField", "key": "str" }
            ]
        }))
        .unwrap();

        let children = root.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], &Component::Unknown);
        assert!(children[0].key().is_none());
        assert!(children[0].value_formula().is_none());
        assert!(children[0].children().is_empty());
        assert_eq!(children[1].key(), Some("str"));
    }

    #[test]
    fn add_columns_rejects_duplicates_without_mutating() {
        let mut table = DynamicTable::new(
            "attacks",
            vec![Component::TextField(InputField::keyed("name"))],
        );

        let err = table
            .add_columns(vec![
                Component::Label(Label::computed("damage", "1d8")),
                Component::TextField(InputField::keyed("name")),
            ])
            .unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));
        assert_eq!(table.row_layout.len(), 1);

        table
            .add_columns(vec![Component::Label(Label::computed("damage", "1d8"))])
            .unwrap();
        assert!(table.column_keys().contains("damage"));
    }

    #[test]
    fn finds_nested_dynamic_table() {
        let mut root = Component::Panel(Container::new(vec![Component::Tab(Container::new(vec![
            Component::DynamicTable(DynamicTable::new("spells", Vec::new())),
        ]))]));

        assert!(root.find_dynamic_table_mut("spells").is_some());
        assert!(root.find_dynamic_table_mut("attacks").is_none());
    }
}
