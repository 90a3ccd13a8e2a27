//! Roll resolution
//!
//! Finds the roll formula for a roll key and evaluates it with explanation
//! tracking. A filter clause (`attacks(name=Sword).damage`) selects a table
//! row whose path becomes the evaluator's reference scope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::formula::{EvalOptions, FormulaError, FormulaEvaluator};
use crate::schema::{split_table_key, SheetSchema};
use crate::value_objects::{PropertyMap, PropertyValue, RollKey};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RollError {
    #[error("Malformed roll key: {0}")]
    Malformed(String),

    #[error("Roll not found: {key}")]
    NotFound { key: String },

    #[error("Roll '{key}' failed: {source}")]
    Evaluation {
        key: String,
        #[source]
        source: FormulaError,
    },
}

impl RollError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}

/// Main and alternative roll formulas by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollTable {
    pub main: BTreeMap<String, String>,
    pub alternative: BTreeMap<String, String>,
}

impl RollTable {
    pub fn from_schema(schema: &SheetSchema) -> Self {
        Self {
            main: schema.rollable.clone(),
            alternative: schema.alt_rollable.clone(),
        }
    }

    pub fn formula(&self, key: &str, alternative: bool) -> Option<&str> {
        let table = if alternative {
            &self.alternative
        } else {
            &self.main
        };
        table.get(key).map(String::as_str)
    }
}

/// Result of a roll, ready to be posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedPhrase {
    pub formula: String,
    pub result: PropertyValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Row path the formula was scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Resolve and evaluate `key` against resolved `props`.
///
/// Besides the filter form, a plain `<table>.<rowId>.<column>` key falls back
/// to the `<table>.<column>` formula scoped to that row.
pub fn resolve_roll(
    key: &str,
    alternative: bool,
    rolls: &RollTable,
    props: &PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> Result<ComputedPhrase, RollError> {
    let roll_key: RollKey = key
        .parse()
        .map_err(|e: crate::DomainError| RollError::Malformed(e.to_string()))?;

    let (schema_key, reference) = match roll_key.filter() {
        Some(filter) => {
            let row = find_row(props, &filter.table, &filter.column, &filter.value)
                .ok_or_else(|| RollError::not_found(key))?;
            (
                roll_key.schema_key(),
                Some(format!("{}.{}", filter.table, row)),
            )
        }
        None => row_path_fallback(roll_key.path(), alternative, rolls),
    };

    let formula = rolls
        .formula(&schema_key, alternative)
        .ok_or_else(|| RollError::not_found(key))?;

    let mut options = EvalOptions::new().explained();
    if let Some(reference) = &reference {
        options = options.with_reference(reference.clone());
    }

    let evaluation = evaluator
        .evaluate(formula, props, &options)
        .map_err(|source| RollError::Evaluation {
            key: key.to_string(),
            source,
        })?;

    tracing::debug!(roll_key = %key, reference = ?reference, "Roll evaluated");

    Ok(ComputedPhrase {
        formula: formula.to_string(),
        result: evaluation.value,
        explanation: evaluation.explanation,
        reference,
    })
}

/// First key-ordered live row of `table` whose `column` displays as `value`.
fn find_row(props: &PropertyMap, table: &str, column: &str, value: &str) -> Option<String> {
    props.live_rows(table).into_iter().find(|row| {
        props
            .get(&format!("{}.{}.{}", table, row, column))
            .is_some_and(|cell| cell.to_string() == value)
    })
}

fn row_path_fallback(path: &str, alternative: bool, rolls: &RollTable) -> (String, Option<String>) {
    if rolls.formula(path, alternative).is_none() {
        if let Some((table, rest)) = split_table_key(path) {
            if let Some((row, column)) = rest.split_once('.') {
                let table_key = format!("{}.{}", table, column);
                if rolls.formula(&table_key, alternative).is_some() {
                    return (table_key, Some(format!("{}.{}", table, row)));
                }
            }
        }
    }
    (path.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{ExpressionEvaluator, FixedRoller};
    use std::sync::Arc;

    fn evaluator() -> ExpressionEvaluator {
        ExpressionEvaluator::new(Arc::new(FixedRoller(5)))
    }

    fn rolls() -> RollTable {
        let mut rolls = RollTable::default();
        rolls
            .main
            .insert("attacks.damage".to_string(), "${1d8 + bonus}$".to_string());
        rolls
            .alternative
            .insert("attacks.damage".to_string(), "${2d8 + bonus}$".to_string());
        rolls
            .main
            .insert("initiative".to_string(), "${1d20 + dex}$".to_string());
        rolls
    }

    fn props() -> PropertyMap {
        PropertyMap::new()
            .with("dex", 3)
            .with("attacks.a1.name", "Sword")
            .with("attacks.a1.bonus", 2)
            .with("attacks.a1.deleted", false)
            .with("attacks.a2.name", "Axe")
            .with("attacks.a2.bonus", 4)
            .with("attacks.a2.deleted", false)
            .with("attacks.a3.name", "Sword")
            .with("attacks.a3.bonus", 9)
            .with("attacks.a3.deleted", true)
    }

    #[test]
    fn filter_selects_matching_row() {
        let phrase =
            resolve_roll("attacks(name=Sword).damage", false, &rolls(), &props(), &evaluator())
                .unwrap();

        assert_eq!(phrase.reference.as_deref(), Some("attacks.a1"));
        assert_eq!(phrase.result, PropertyValue::Number(7.0));
        assert_eq!(phrase.explanation.as_deref(), Some("[1d8: 5] + 2"));
    }

    #[test]
    fn missing_row_is_not_found() {
        let err = resolve_roll("attacks(name=Bow).damage", false, &rolls(), &props(), &evaluator())
            .unwrap_err();
        assert_eq!(err, RollError::not_found("attacks(name=Bow).damage"));
    }

    #[test]
    fn alternative_flag_selects_alt_formula() {
        let phrase =
            resolve_roll("attacks(name=Axe).damage", true, &rolls(), &props(), &evaluator())
                .unwrap();
        assert_eq!(phrase.formula, "${2d8 + bonus}$");
        assert_eq!(phrase.result, PropertyValue::Number(14.0));
    }

    #[test]
    fn plain_keys_and_row_paths() {
        let phrase = resolve_roll("initiative", false, &rolls(), &props(), &evaluator()).unwrap();
        assert_eq!(phrase.result, PropertyValue::Number(8.0));
        assert!(phrase.reference.is_none());

        let phrase =
            resolve_roll("attacks.a2.damage", false, &rolls(), &props(), &evaluator()).unwrap();
        assert_eq!(phrase.reference.as_deref(), Some("attacks.a2"));
        assert_eq!(phrase.result, PropertyValue::Number(9.0));
    }

    #[test]
    fn unknown_or_malformed_keys_fail() {
        assert!(matches!(
            resolve_roll("perception", false, &rolls(), &props(), &evaluator()),
            Err(RollError::NotFound { .. })
        ));
        assert!(matches!(
            resolve_roll("initiative", true, &rolls(), &props(), &evaluator()),
            Err(RollError::NotFound { .. })
        ));
        assert!(matches!(
            resolve_roll("attacks(name=Sword", false, &rolls(), &props(), &evaluator()),
            Err(RollError::Malformed(_))
        ));
    }

    #[test]
    fn evaluation_failures_are_reported() {
        let mut rolls = rolls();
        rolls.main.insert("broken".to_string(), "${1d20 + luck}$".to_string());

        let err = resolve_roll("broken", false, &rolls, &props(), &evaluator()).unwrap_err();
        assert!(matches!(err, RollError::Evaluation { .. }));
    }
}
