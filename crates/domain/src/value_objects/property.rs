//! PropertyValue and PropertyMap - the actor's raw and resolved property store
//!
//! Properties form a nested map. Plain keys sit at the top level, dynamic-table
//! cells live at `<table>.<rowId>.<column>`. Rows are never physically removed
//! by table edits; they carry a `deleted` flag instead.
//!
//! Maps are ordered (`BTreeMap`) so that row iteration, and therefore roll
//! filters and resolution passes, are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the per-row soft-delete flag.
pub const ROW_DELETED_FLAG: &str = "deleted";

/// A single property value as stored on an actor or produced by a formula.
///
/// Serialized untagged so that actor documents stay plain JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Numeric view of the value. Text is accepted when it parses as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(value) => Some(*value),
            PropertyValue::Text(value) => value.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, PropertyValue::Map(_))
    }

    /// Truthiness used by conditional formulas.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Null => false,
            PropertyValue::Bool(value) => *value,
            PropertyValue::Number(value) => *value != 0.0 && !value.is_nan(),
            PropertyValue::Text(value) => !value.is_empty(),
            PropertyValue::List(_) | PropertyValue::Map(_) => true,
        }
    }

    /// Whether this value is a table row flagged as deleted.
    pub fn is_deleted_row(&self) -> bool {
        self.as_map()
            .and_then(|row| row.get(ROW_DELETED_FLAG))
            .map(PropertyValue::is_truthy)
            .unwrap_or(false)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => Ok(()),
            PropertyValue::Bool(value) => write!(f, "{}", value),
            PropertyValue::Number(value) => write!(f, "{}", format_number(*value)),
            PropertyValue::Text(value) => write!(f, "{}", value),
            PropertyValue::List(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
            PropertyValue::Map(_) => write!(f, "[object]"),
        }
    }
}

/// Formats integral floats without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<BTreeMap<String, PropertyValue>> for PropertyValue {
    fn from(value: BTreeMap<String, PropertyValue>) -> Self {
        PropertyValue::Map(value)
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        PropertyValue::Map(value.0)
    }
}

/// The nested property store of an actor or item.
///
/// All accessors take dotted paths (`hp`, `attacks.a1.damage`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<String, PropertyValue>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, value: impl Into<PropertyValue>) -> Self {
        self.set(path, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Top-level keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    /// Look up a value by dotted path.
    pub fn get(&self, path: &str) -> Option<&PropertyValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a value by dotted path, creating (or replacing non-map) intermediates.
    pub fn set(&mut self, path: &str, value: impl Into<PropertyValue>) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut map = &mut self.0;
        for segment in segments {
            let entry = map
                .entry(segment.to_string())
                .or_insert_with(|| PropertyValue::Map(BTreeMap::new()));
            if !entry.is_map() {
                *entry = PropertyValue::Map(BTreeMap::new());
            }
            let PropertyValue::Map(next) = entry else {
                return;
            };
            map = next;
        }
        map.insert(last.to_string(), value.into());
    }

    /// Remove a value by dotted path, returning it.
    pub fn remove(&mut self, path: &str) -> Option<PropertyValue> {
        remove_in(&mut self.0, path)
    }

    /// Ids of the rows of `table` that are not flagged as deleted, in key order.
    ///
    /// Only map-valued children count as rows.
    pub fn live_rows(&self, table: &str) -> Vec<String> {
        self.get(table)
            .and_then(PropertyValue::as_map)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, row)| row.is_map() && !row.is_deleted_row())
                    .map(|(row_id, _)| row_id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deep merge: maps merge recursively, everything else in `other` overwrites.
    pub fn merge(&mut self, other: PropertyMap) {
        merge_into(&mut self.0, other.0);
    }

    /// Drop null leaves and map branches left empty.
    pub fn prune_empty(&mut self) {
        prune_in(&mut self.0);
    }
}

impl From<BTreeMap<String, PropertyValue>> for PropertyMap {
    fn from(value: BTreeMap<String, PropertyValue>) -> Self {
        Self(value)
    }
}

impl FromIterator<(String, PropertyValue)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, PropertyValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn remove_in(map: &mut BTreeMap<String, PropertyValue>, path: &str) -> Option<PropertyValue> {
    match path.split_once('.') {
        None => map.remove(path),
        Some((head, rest)) => remove_in(map.get_mut(head)?.as_map_mut()?, rest),
    }
}

fn merge_into(target: &mut BTreeMap<String, PropertyValue>, source: BTreeMap<String, PropertyValue>) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(PropertyValue::Map(existing)), PropertyValue::Map(incoming)) => {
                merge_into(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

fn prune_in(map: &mut BTreeMap<String, PropertyValue>) {
    map.retain(|_, value| {
        if let PropertyValue::Map(inner) = value {
            prune_in(inner);
            !inner.is_empty()
        } else {
            !value.is_null()
        }
    });
}
