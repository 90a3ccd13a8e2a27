//! Modifier aggregation
//!
//! Item modifiers are evaluated against the item's own props, effect
//! modifiers against the actor's raw props. Neither context depends on the
//! resolution in progress, so failures fall back to 0 instead of deferring.

use crate::entities::{ActiveEffect, ActiveEffectTable, Item};
use crate::formula::{EvalOptions, FormulaEvaluator};
use crate::value_objects::{
    Modifier, ModifierDefinition, ModifierGroups, ModifierSource, PropertyMap,
};

/// Group every applicable modifier by target key: items first, then effects.
pub fn aggregate_modifiers(
    items: &[Item],
    effect_table: &ActiveEffectTable,
    effects: &[ActiveEffect],
    actor_props: &PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> ModifierGroups {
    let mut groups = ModifierGroups::new();

    for item in items.iter().filter(|item| item.contributes_modifiers()) {
        for definition in &item.modifiers {
            if let Some(value) = evaluate_modifier(definition, &item.props, evaluator) {
                groups.push(Modifier::resolved(
                    definition,
                    value,
                    ModifierSource::Item {
                        item_id: item.id,
                        name: item.name.clone(),
                    },
                ));
            }
        }
    }

    for effect in effects {
        let Some(status_id) = effect.status_id.as_deref() else {
            continue;
        };
        for definition in effect_table.get(status_id) {
            if let Some(value) = evaluate_modifier(definition, actor_props, evaluator) {
                groups.push(Modifier::resolved(
                    definition,
                    value,
                    ModifierSource::Effect {
                        status_id: status_id.to_string(),
                    },
                ));
            }
        }
    }

    groups
}

/// Resolve one modifier to a number; `None` when it has no key or formula.
fn evaluate_modifier(
    definition: &ModifierDefinition,
    context: &PropertyMap,
    evaluator: &dyn FormulaEvaluator,
) -> Option<f64> {
    if definition.key.is_empty() || definition.formula.trim().is_empty() {
        return None;
    }

    let options = EvalOptions::new().with_default(0);
    let value = match evaluator.evaluate(&definition.formula, context, &options) {
        Ok(evaluation) => evaluation.value.as_number().unwrap_or_else(|| {
            tracing::warn!(
                key = %definition.key,
                formula = %definition.formula,
                value = %evaluation.value,
                "Modifier did not evaluate to a number, using 0"
            );
            0.0
        }),
        Err(e) => {
            tracing::warn!(
                key = %definition.key,
                formula = %definition.formula,
                error = %e,
                "Modifier formula failed, using 0"
            );
            0.0
        }
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ItemKind;
    use crate::formula::{ExpressionEvaluator, FixedRoller};
    use crate::value_objects::{ModifierOperator, PropertyValue};
    use std::sync::Arc;

    fn evaluator() -> ExpressionEvaluator {
        ExpressionEvaluator::new(Arc::new(FixedRoller(1)))
    }

    #[test]
    fn items_come_before_effects_and_use_their_own_props() {
        let ring = Item::equippable("Ring of Vigor")
            .with_prop("bonus", 2)
            .with_modifier(ModifierDefinition::add("hp.max", "bonus"));
        let mut table = ActiveEffectTable::new();
        table.insert(
            "blessed",
            vec![ModifierDefinition::multiply("hp.max", "multiplier")],
        );
        let effects = vec![ActiveEffect::with_status("Blessed", "blessed")];
        let actor_props = PropertyMap::new().with("multiplier", 1.5).with("bonus", 99);

        let groups = aggregate_modifiers(&[ring], &table, &effects, &actor_props, &evaluator());
        let group = groups.get("hp.max");

        assert_eq!(group.len(), 2);
        assert_eq!(group[0].value, 2.0);
        assert!(matches!(group[0].source, ModifierSource::Item { .. }));
        assert_eq!(group[1].value, 1.5);
        assert_eq!(group[1].operator, ModifierOperator::Multiply);
        assert_eq!(groups.apply("hp.max", 10.0), 18.0);
    }

    #[test]
    fn failing_formulas_default_to_zero() {
        let item = Item::equippable("Cursed Blade")
            .with_prop("label", "cursed")
            .with_modifier(ModifierDefinition::add("str", "missing + 1"))
            .with_modifier(ModifierDefinition::add("dex", "label"))
            .with_modifier(ModifierDefinition::add("con", "1 / 0"));

        let groups = aggregate_modifiers(
            &[item],
            &ActiveEffectTable::new(),
            &[],
            &PropertyMap::new(),
            &evaluator(),
        );

        assert_eq!(groups.get("str")[0].value, 1.0);
        assert_eq!(groups.get("dex")[0].value, 0.0);
        assert_eq!(groups.get("con")[0].value, 0.0);
    }

    #[test]
    fn skips_unequipped_items_and_unknown_statuses() {
        let mut unequipped = Item::equippable("Shield")
            .with_modifier(ModifierDefinition::add("ac", "2"));
        unequipped.equipped = false;
        let trinket = Item::new("Trinket", ItemKind::Other)
            .with_modifier(ModifierDefinition::add("ac", "1"));
        let effects = vec![
            ActiveEffect::with_status("Poisoned", "poisoned"),
            ActiveEffect::new("Untracked"),
        ];

        let groups = aggregate_modifiers(
            &[unequipped, trinket],
            &ActiveEffectTable::new(),
            &effects,
            &PropertyMap::new().with("ac", PropertyValue::Number(10.0)),
            &evaluator(),
        );

        assert!(groups.is_empty());
    }
}
