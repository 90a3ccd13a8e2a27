//! Shared fixtures for use case tests.

use std::sync::Arc;

use sheetforge_domain::{
    Actor, Component, Container, DynamicTable, ExpressionEvaluator, FixedRoller,
    FormulaEvaluator, HiddenProperty, InputField, Label, NumberField, SheetLayout,
};

pub fn evaluator(die_face: u32) -> Arc<dyn FormulaEvaluator> {
    Arc::new(ExpressionEvaluator::new(Arc::new(FixedRoller(die_face))))
}

/// Template with a computed max, a bar, and an `attacks` dynamic table.
pub fn template() -> Actor {
    Actor::template("Adventurer").with_layout(SheetLayout {
        body: Some(Component::Panel(Container::new(vec![
            Component::NumberField(NumberField::keyed("str")),
            Component::Label(
                Label::computed("hpMax", "8 + str * 3").with_roll("${1d4 + str * 2}$"),
            ),
            Component::NumberField(NumberField::keyed("hp").with_max("hpMax")),
            Component::DynamicTable(DynamicTable::new(
                "attacks",
                vec![
                    Component::TextField(InputField::keyed("weapon")),
                    Component::NumberField(NumberField::keyed("bonus")),
                    Component::Label(
                        Label::computed("toHit", "bonus + str").with_roll("${1d20 + toHit}$"),
                    ),
                ],
            )),
        ]))),
        hidden: vec![HiddenProperty::new("title", "'Sir ' + name")],
        ..SheetLayout::default()
    })
}

/// "Aria", built from [`template`]: str 2, hp 9, a Sword (+3) and an Axe (+1).
pub fn sheet() -> Actor {
    let template = template();
    let mut actor = Actor::character("Aria")
        .with_prop("str", 2)
        .with_prop("hp", 9)
        .with_prop("attacks.0.weapon", "Sword")
        .with_prop("attacks.0.bonus", 3)
        .with_prop("attacks.0.deleted", false)
        .with_prop("attacks.1.weapon", "Axe")
        .with_prop("attacks.1.bonus", 1)
        .with_prop("attacks.1.deleted", false);
    actor.layout = template.layout.clone();
    actor.template_id = Some(template.id);
    actor
}
