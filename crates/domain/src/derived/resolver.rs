//! Fixed-point property resolution
//!
//! Formulas may reference each other in any order. Each pass evaluates every
//! pending key against the working context; keys whose dependencies are not
//! there yet come back [`FormulaError::Unresolvable`] and wait for the next
//! pass. The loop ends when nothing is pending or a pass resolves nothing,
//! which is also how cycles surface: their keys never resolve.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::formula::{EvalOptions, FormulaError, FormulaEvaluator};
use crate::schema::{split_table_key, SheetSchema};
use crate::value_objects::{ModifierGroups, PropertyMap, PropertyValue};

/// A formula failed for a reason other than a missing reference.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Failed to compute '{key}' from '{formula}': {source}")]
    Evaluation {
        key: String,
        formula: String,
        #[source]
        source: FormulaError,
    },
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub props: PropertyMap,
    /// Keys left uncomputed, with their formulas.
    pub unresolved: BTreeMap<String, String>,
    pub passes: usize,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Remove every computable slot from `raw` so stale results never count as input.
pub fn strip_computed(schema: &SheetSchema, raw: &PropertyMap) -> PropertyMap {
    let mut props = raw.clone();

    for key in schema.computable.keys() {
        if split_table_key(key).is_none() {
            props.remove(key);
        }
    }
    props.prune_empty();

    // Rows are kept even when emptied, so they are still expanded below.
    for key in schema.computable.keys() {
        if let Some((table, column)) = split_table_key(key) {
            for row in props.live_rows(table) {
                props.remove(&format!("{}.{}.{}", table, row, column));
            }
        }
    }

    props
}

enum Attempt {
    Resolved,
    Deferred(String),
}

/// Resolve every computable key of `schema` against `raw`.
pub fn resolve(
    schema: &SheetSchema,
    modifiers: &ModifierGroups,
    raw: &PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> Result<Resolution, ResolveError> {
    let mut props = strip_computed(schema, raw);
    let mut pending: BTreeMap<&str, &str> = schema
        .computable
        .iter()
        .map(|(key, formula)| (key.as_str(), formula.as_str()))
        .collect();
    let mut passes = 0;

    while !pending.is_empty() {
        passes += 1;
        let mut resolved = Vec::new();

        for (&key, &formula) in &pending {
            let attempt = match split_table_key(key) {
                None => resolve_plain(key, formula, modifiers, &mut props, evaluator)?,
                Some((table, column)) => {
                    resolve_table_field(key, table, column, formula, &mut props, evaluator)?
                }
            };
            match attempt {
                Attempt::Resolved => resolved.push(key),
                Attempt::Deferred(reference) => {
                    tracing::trace!(key = %key, missing = %reference, "Deferring property");
                }
            }
        }

        tracing::debug!(
            pass = passes,
            resolved = resolved.len(),
            pending = pending.len() - resolved.len(),
            "Resolution pass finished"
        );

        if resolved.is_empty() {
            break;
        }
        for key in resolved {
            pending.remove(key);
        }
    }

    let unresolved: BTreeMap<String, String> = pending
        .into_iter()
        .map(|(key, formula)| (key.to_string(), formula.to_string()))
        .collect();

    if !unresolved.is_empty() {
        tracing::warn!(
            count = unresolved.len(),
            keys = ?unresolved.keys().collect::<Vec<_>>(),
            "Properties left uncomputed"
        );
    }

    Ok(Resolution {
        props,
        unresolved,
        passes,
    })
}

fn resolve_plain(
    key: &str,
    formula: &str,
    modifiers: &ModifierGroups,
    props: &mut PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> Result<Attempt, ResolveError> {
    let evaluation = match evaluator.evaluate(formula, props, &EvalOptions::new()) {
        Ok(evaluation) => evaluation,
        Err(FormulaError::Unresolvable { reference }) => return Ok(Attempt::Deferred(reference)),
        Err(source) => return Err(fatal(key, formula, source)),
    };

    let group = modifiers.get(key);
    let value = match (evaluation.value.as_number(), group.is_empty()) {
        (Some(base), false) => PropertyValue::Number(modifiers.apply(key, base)),
        (None, false) => {
            tracing::warn!(key = %key, "Modifiers target a non-numeric property, ignoring them");
            evaluation.value
        }
        (_, true) => evaluation.value,
    };

    props.set(key, value);
    Ok(Attempt::Resolved)
}

/// All live rows resolve together or the key is deferred as a whole.
fn resolve_table_field(
    key: &str,
    table: &str,
    column: &str,
    formula: &str,
    props: &mut PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> Result<Attempt, ResolveError> {
    let mut values = Vec::new();

    for row in props.live_rows(table) {
        let options = EvalOptions::new().with_reference(format!("{}.{}", table, row));
        match evaluator.evaluate(formula, props, &options) {
            Ok(evaluation) => values.push((row, evaluation.value)),
            Err(FormulaError::Unresolvable { reference }) => {
                return Ok(Attempt::Deferred(reference))
            }
            Err(source) => return Err(fatal(key, formula, source)),
        }
    }

    for (row, value) in values {
        props.set(&format!("{}.{}.{}", table, row, column), value);
    }
    Ok(Attempt::Resolved)
}

fn fatal(key: &str, formula: &str, source: FormulaError) -> ResolveError {
    ResolveError::Evaluation {
        key: key.to_string(),
        formula: formula.to_string(),
        source,
    }
}
