//! Modifiers granted by items and active effects
//!
//! A [`ModifierDefinition`] is what gets stored on an item or in an actor's
//! active-effect table. Aggregation turns each definition into a [`Modifier`]
//! carrying its resolved number, grouped by target key in [`ModifierGroups`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{DomainError, ItemId};

/// How a modifier's value is folded into the running property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModifierOperator {
    #[default]
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "=")]
    Set,
}

impl ModifierOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ModifierOperator::Add => "+",
            ModifierOperator::Subtract => "-",
            ModifierOperator::Multiply => "*",
            ModifierOperator::Divide => "/",
            ModifierOperator::Set => "=",
        }
    }

    /// Combine `current` with `operand`. Division by zero leaves `current` untouched.
    pub fn apply(&self, current: f64, operand: f64) -> f64 {
        match self {
            ModifierOperator::Add => current + operand,
            ModifierOperator::Subtract => current - operand,
            ModifierOperator::Multiply => current * operand,
            ModifierOperator::Divide => {
                if operand == 0.0 {
                    current
                } else {
                    current / operand
                }
            }
            ModifierOperator::Set => operand,
        }
    }
}

impl fmt::Display for ModifierOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for ModifierOperator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "+" | "add" => Ok(ModifierOperator::Add),
            "-" | "subtract" => Ok(ModifierOperator::Subtract),
            "*" | "x" | "multiply" => Ok(ModifierOperator::Multiply),
            "/" | "divide" => Ok(ModifierOperator::Divide),
            "=" | "set" => Ok(ModifierOperator::Set),
            other => Err(DomainError::parse(format!(
                "Unknown modifier operator: '{}'",
                other
            ))),
        }
    }
}

/// A stored modifier: target key, formula, and operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierDefinition {
    pub key: String,
    pub formula: String,
    #[serde(default)]
    pub operator: ModifierOperator,
}

impl ModifierDefinition {
    pub fn new(
        key: impl Into<String>,
        formula: impl Into<String>,
        operator: ModifierOperator,
    ) -> Self {
        Self {
            key: key.into(),
            formula: formula.into(),
            operator,
        }
    }

    /// Shorthand for an additive modifier.
    pub fn add(key: impl Into<String>, formula: impl Into<String>) -> Self {
        Self::new(key, formula, ModifierOperator::Add)
    }

    /// Shorthand for a multiplicative modifier.
    pub fn multiply(key: impl Into<String>, formula: impl Into<String>) -> Self {
        Self::new(key, formula, ModifierOperator::Multiply)
    }
}

/// Where an aggregated modifier came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModifierSource {
    Item { item_id: ItemId, name: String },
    Effect { status_id: String },
}

/// A modifier after aggregation, with its formula resolved to a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub key: String,
    pub formula: String,
    pub operator: ModifierOperator,
    pub value: f64,
    pub source: ModifierSource,
}

impl Modifier {
    pub fn resolved(definition: &ModifierDefinition, value: f64, source: ModifierSource) -> Self {
        Self {
            key: definition.key.clone(),
            formula: definition.formula.clone(),
            operator: definition.operator,
            value,
            source,
        }
    }
}

/// Fold `modifiers` onto `base` in order.
///
/// Order matters: `+2` then `*1.5` on 10 gives 18, the reverse gives 17.
pub fn apply_modifiers(base: f64, modifiers: &[Modifier]) -> f64 {
    modifiers
        .iter()
        .fold(base, |current, modifier| modifier.operator.apply(current, modifier.value))
}

/// Modifiers grouped by target key, each group in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierGroups(BTreeMap<String, Vec<Modifier>>);

impl ModifierGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.0.entry(modifier.key.clone()).or_default().push(modifier);
    }

    pub fn get(&self, key: &str) -> &[Modifier] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply the group registered for `key` to `base`.
    pub fn apply(&self, key: &str, base: f64) -> f64 {
        apply_modifiers(base, self.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(key: &str, operator: ModifierOperator, value: f64) -> Modifier {
        Modifier {
            key: key.to_string(),
            formula: value.to_string(),
            operator,
            value,
            source: ModifierSource::Effect {
                status_id: "blessed".to_string(),
            },
        }
    }

    #[test]
    fn modifiers_apply_in_declared_order() {
        let mut groups = ModifierGroups::new();
        groups.push(modifier("hp.max", ModifierOperator::Add, 2.0));
        groups.push(modifier("hp.max", ModifierOperator::Multiply, 1.5));

        assert_eq!(groups.apply("hp.max", 10.0), 18.0);
        assert_eq!(groups.apply("unrelated", 10.0), 10.0);
    }

    #[test]
    fn divide_by_zero_is_ignored() {
        assert_eq!(ModifierOperator::Divide.apply(9.0, 0.0), 9.0);
        assert_eq!(ModifierOperator::Divide.apply(9.0, 3.0), 3.0);
        assert_eq!(ModifierOperator::Set.apply(9.0, 4.0), 4.0);
    }

    #[test]
    fn operator_serializes_as_symbol() {
        let json = serde_json::to_string(&ModifierOperator::Multiply).unwrap();
        assert_eq!(json, "\"*\"");

        let definition: ModifierDefinition = serde_json::from_value(serde_json::json!({
            "key": "ac",
            "formula": "2"
        }))
        .unwrap();
        assert_eq!(definition.operator, ModifierOperator::Add);
    }

    #[test]
    fn operator_parses_names_and_symbols() {
        assert_eq!("*".parse::<ModifierOperator>().unwrap(), ModifierOperator::Multiply);
        assert_eq!("Set".parse::<ModifierOperator>().unwrap(), ModifierOperator::Set);
        assert!("^".parse::<ModifierOperator>().is_err());
    }
}
