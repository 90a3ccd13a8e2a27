//! Derived data - everything computed from an actor on each refresh
//!
//! The pipeline runs synchronously per actor:
//! schema extraction and modifier aggregation, then fixed-point resolution,
//! then bar resolution. Rolls are resolved on demand against the result.

mod aggregate;
mod bars;
mod resolver;
mod rolls;

pub use aggregate::aggregate_modifiers;
pub use bars::resolve_bars;
pub use resolver::{resolve, strip_computed, Resolution, ResolveError};
pub use rolls::{resolve_roll, ComputedPhrase, RollError, RollTable};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value_objects::{AttributeBar, PropertyMap};

/// Resolved view of an actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedData {
    pub props: PropertyMap,
    pub bars: BTreeMap<String, AttributeBar>,
    /// Keys left uncomputed, with their formulas.
    pub unresolved: BTreeMap<String, String>,
    pub passes: usize,
}

impl DerivedData {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn bar(&self, key: &str) -> Option<&AttributeBar> {
        self.bars.get(key)
    }
}
