//! Bar resolution
//!
//! Turns bar definitions into `{value, max}` pairs once properties are
//! resolved. Bars never fail: anything that cannot be computed shows as 0.

use std::collections::BTreeMap;

use crate::formula::{EvalOptions, FormulaEvaluator};
use crate::schema::split_table_key;
use crate::value_objects::{AttributeBar, BarBound, BarDefinition, PropertyMap, PropertyValue};

/// Resolve every bar not declared inside a dynamic table.
pub fn resolve_bars(
    definitions: &BTreeMap<String, BarDefinition>,
    props: &PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> BTreeMap<String, AttributeBar> {
    definitions
        .iter()
        .filter(|(key, _)| split_table_key(key).is_none())
        .map(|(key, definition)| {
            let max = bound_value(key, &definition.max, props, evaluator);
            let value = match &definition.value {
                Some(bound) => bound_value(key, bound, props, evaluator),
                None => current_value(key, props, evaluator),
            };
            (key.clone(), AttributeBar::new(key.clone(), value, max))
        })
        .collect()
}

fn bound_value(
    key: &str,
    bound: &BarBound,
    props: &PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> f64 {
    bound
        .as_number()
        .unwrap_or_else(|| evaluate_number(key, &bound.formula(), props, evaluator))
}

/// The property stored at the bar key, evaluated as a formula when it is text.
fn current_value(key: &str, props: &PropertyMap, evaluator: &dyn FormulaEvaluator) -> f64 {
    match props.get(key) {
        Some(PropertyValue::Text(text)) if text.trim().parse::<f64>().is_err() => {
            evaluate_number(key, text, props, evaluator)
        }
        Some(value) => value.as_number().unwrap_or(0.0),
        None => 0.0,
    }
}

fn evaluate_number(
    key: &str,
    formula: &str,
    props: &PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> f64 {
    if formula.trim().is_empty() {
        return 0.0;
    }
    match evaluator.evaluate(formula, props, &EvalOptions::new().with_default(0)) {
        Ok(evaluation) => evaluation.value.as_number().unwrap_or(0.0),
        Err(e) => {
            tracing::warn!(bar = %key, formula = %formula, error = %e, "Bar formula failed, using 0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{ExpressionEvaluator, FixedRoller};
    use std::sync::Arc;

    fn evaluator() -> ExpressionEvaluator {
        ExpressionEvaluator::new(Arc::new(FixedRoller(1)))
    }

    #[test]
    fn max_formula_and_stored_value() {
        let mut definitions = BTreeMap::new();
        definitions.insert("hp".to_string(), BarDefinition::new("10+str"));
        let props = PropertyMap::new().with("hp", 7).with("str", 2);

        let bars = resolve_bars(&definitions, &props, &evaluator());

        assert_eq!(bars.get("hp"), Some(&AttributeBar::new("hp", 7.0, 12.0)));
    }

    #[test]
    fn value_override_and_fallbacks() {
        let mut definitions = BTreeMap::new();
        definitions.insert(
            "mana".to_string(),
            BarDefinition::new(20.0).with_value("int * 2"),
        );
        definitions.insert("stamina".to_string(), BarDefinition::new("missing * 2"));
        definitions.insert("focus".to_string(), BarDefinition::new("5"));
        definitions.insert("attacks.ammo".to_string(), BarDefinition::new(10.0));
        let props = PropertyMap::new().with("int", 4).with("focus", "int - 1");

        let bars = resolve_bars(&definitions, &props, &evaluator());

        assert_eq!(bars.get("mana"), Some(&AttributeBar::new("mana", 8.0, 20.0)));
        assert_eq!(bars.get("stamina"), Some(&AttributeBar::new("stamina", 0.0, 0.0)));
        assert_eq!(bars.get("focus"), Some(&AttributeBar::new("focus", 3.0, 5.0)));
        assert!(!bars.contains_key("attacks.ammo"));
    }

    #[test]
    fn failing_formula_falls_back_to_zero() {
        let mut definitions = BTreeMap::new();
        definitions.insert("hp".to_string(), BarDefinition::new("10 / 0"));

        let bars = resolve_bars(&definitions, &PropertyMap::new(), &evaluator());

        assert_eq!(bars.get("hp").map(|bar| bar.max), Some(0.0));
    }
}
