//! Active effects (status conditions) and the modifiers they grant

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value_objects::ModifierDefinition;
use crate::EffectId;

/// A status effect currently applied to an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub id: EffectId,
    pub label: String,
    /// Status identifier used to look up modifiers in the actor's table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
}

impl ActiveEffect {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: EffectId::new(),
            label: label.into(),
            status_id: None,
        }
    }

    pub fn with_status(label: impl Into<String>, status_id: impl Into<String>) -> Self {
        Self {
            status_id: Some(status_id.into()),
            ..Self::new(label)
        }
    }
}

/// Modifier definitions per status identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveEffectTable(BTreeMap<String, Vec<ModifierDefinition>>);

impl ActiveEffectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, status_id: impl Into<String>, modifiers: Vec<ModifierDefinition>) {
        self.0.insert(status_id.into(), modifiers);
    }

    /// Definitions for `status_id`, empty when the status is unknown.
    pub fn get(&self, status_id: &str) -> &[ModifierDefinition] {
        self.0.get(status_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}
