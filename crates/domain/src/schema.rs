//! Schema extraction - flattening a component tree into formula maps
//!
//! Extraction is a pure fold: every visit returns a fresh [`SheetSchema`] and
//! parents merge their children's results in document order, later entries
//! winning. Dynamic-table columns are registered as `<tableKey>.<column>`.

use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{Component, HiddenProperty};
use crate::value_objects::BarDefinition;

/// Formula maps extracted from a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSchema {
    /// key -> value formula
    pub computable: BTreeMap<String, String>,
    /// key -> roll message
    pub rollable: BTreeMap<String, String>,
    /// key -> alternative roll message
    pub alt_rollable: BTreeMap<String, String>,
    /// key -> bar declared by a `maxVal`
    pub attribute_bars: BTreeMap<String, BarDefinition>,
    pub keyed_properties: BTreeSet<String>,
}

impl SheetSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the schema of one tree.
    pub fn extract(root: &Component) -> Self {
        visit(root, "")
    }

    /// Extract and merge several trees in order (header, then body).
    pub fn extract_all<'a>(roots: impl IntoIterator<Item = &'a Component>) -> Self {
        roots
            .into_iter()
            .fold(Self::new(), |schema, root| schema.merge(Self::extract(root)))
    }

    /// Combine with `later`; on key collisions `later` wins.
    pub fn merge(mut self, later: SheetSchema) -> Self {
        self.computable.extend(later.computable);
        self.rollable.extend(later.rollable);
        self.alt_rollable.extend(later.alt_rollable);
        self.attribute_bars.extend(later.attribute_bars);
        self.keyed_properties.extend(later.keyed_properties);
        self
    }

    /// Register hidden properties as computable keys.
    pub fn with_hidden(mut self, hidden: &[HiddenProperty]) -> Self {
        for property in hidden.iter().filter(|p| !p.name.is_empty()) {
            self.computable
                .insert(property.name.clone(), property.value.clone());
            self.keyed_properties.insert(property.name.clone());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.computable.is_empty()
            && self.rollable.is_empty()
            && self.alt_rollable.is_empty()
            && self.attribute_bars.is_empty()
            && self.keyed_properties.is_empty()
    }
}

/// Split a dynamic-table field key into `(table, column)`.
pub fn split_table_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('.')
}

fn visit(node: &Component, prefix: &str) -> SheetSchema {
    let mut schema = SheetSchema::new();

    if let Some(key) = node.key() {
        let full_key = format!("{}{}", prefix, key);
        if let Some(formula) = node.roll_message() {
            schema.rollable.insert(full_key.clone(), formula.to_string());
        }
        if let Some(formula) = node.alt_roll_message() {
            schema.alt_rollable.insert(full_key.clone(), formula.to_string());
        }
        if let Some(formula) = node.value_formula() {
            schema.computable.insert(full_key.clone(), formula.to_string());
        }
        if let Some(max) = node.max_val() {
            schema
                .attribute_bars
                .insert(full_key.clone(), BarDefinition { max: max.clone(), value: None });
        }
        schema.keyed_properties.insert(full_key);
    }

    let mut schema = node
        .children()
        .into_iter()
        .fold(schema, |acc, child| acc.merge(visit(child, prefix)));

    if let Component::DynamicTable(table) = node {
        let column_prefix = format!("{}{}.", prefix, table.key);
        schema = table
            .row_layout
            .iter()
            .fold(schema, |acc, column| acc.merge(visit(column, &column_prefix)));
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Container, DynamicTable, InputField, Label, NumberField};

    fn sheet() -> Component {
        Component::Panel(Container::new(vec![
            Component::Label(Label::computed("hpMax", "10 + con").with_roll("${1d20 + con}$")),
            Component::NumberField(NumberField::keyed("hp").with_max("hpMax")),
            Component::Table(Container::rows(vec![vec![
                Component::TextField(InputField::keyed("notes")),
                Component::Label(Label {
                    key: None,
                    value: Some("ignored".to_string()),
                    ..Label::default()
                }),
            ]])),
            Component::DynamicTable(DynamicTable::new(
                "attacks",
                vec![
                    Component::TextField(InputField::keyed("name")),
                    Component::Label(
                        Label::computed("damage", "bonus + str")
                            .with_roll("${1d8 + damage}$")
                            .with_alt_roll("${2d8 + damage}$"),
                    ),
                ],
            )),
        ]))
    }

    #[test]
    fn extracts_all_maps() {
        let schema = SheetSchema::extract(&sheet());

        assert_eq!(schema.computable.get("hpMax").map(String::as_str), Some("10 + con"));
        assert_eq!(
            schema.computable.get("attacks.damage").map(String::as_str),
            Some("bonus + str")
        );
        assert!(schema.rollable.contains_key("hpMax"));
        assert!(schema.rollable.contains_key("attacks.damage"));
        assert!(schema.alt_rollable.contains_key("attacks.damage"));
        assert!(schema.attribute_bars.contains_key("hp"));

        let keyed: Vec<&str> = schema.keyed_properties.iter().map(String::as_str).collect();
        assert_eq!(
            keyed,
            vec!["attacks", "attacks.damage", "attacks.name", "hp", "hpMax", "notes"]
        );
    }

    #[test]
    fn later_declaration_wins() {
        let header = Component::Label(Label::computed("ac", "10"));
        let body = Component::Panel(Container::new(vec![
            Component::Label(Label::computed("ac", "12")),
            Component::Label(Label::computed("ac", "14")),
        ]));

        let schema = SheetSchema::extract_all([&header, &body]);
        assert_eq!(schema.computable.get("ac").map(String::as_str), Some("14"));
    }

    #[test]
    fn hidden_properties_are_computable() {
        let schema = SheetSchema::extract(&sheet()).with_hidden(&[HiddenProperty::new(
            "proficiency",
            "2 + floor(level / 4)",
        )]);
        assert!(schema.computable.contains_key("proficiency"));
        assert!(schema.keyed_properties.contains("proficiency"));
    }

    #[test]
    fn keyless_tree_yields_empty_schema() {
        let schema = SheetSchema::extract(&Component::Panel(Container::default()));
        assert!(schema.is_empty());
    }

    #[test]
    fn splits_table_keys() {
        assert_eq!(split_table_key("attacks.damage"), Some(("attacks", "damage")));
        assert_eq!(split_table_key("hp"), None);
    }
}
