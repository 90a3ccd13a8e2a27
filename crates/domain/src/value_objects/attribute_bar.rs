//! Attribute bars - progress-bar style properties such as hit points
//!
//! A bar is declared either in the actor layout (`attributeBars`) or by a
//! component carrying `maxVal`. After resolution every bar becomes a concrete
//! [`AttributeBar`] pair that the token HUD can adjust with `=`, `+`, `-` input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::property::format_number;
use crate::DomainError;

/// Literal number or formula text for a bar bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BarBound {
    Number(f64),
    Formula(String),
}

impl BarBound {
    /// The literal number, if the bound is numeric or numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            BarBound::Number(value) => Some(*value),
            BarBound::Formula(text) => text.trim().parse::<f64>().ok(),
        }
    }

    /// Formula text to hand to the evaluator.
    pub fn formula(&self) -> String {
        match self {
            BarBound::Number(value) => format_number(*value),
            BarBound::Formula(text) => text.clone(),
        }
    }

    /// Empty formula text counts as no bound at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, BarBound::Formula(text) if text.trim().is_empty())
    }
}

impl From<f64> for BarBound {
    fn from(value: f64) -> Self {
        BarBound::Number(value)
    }
}

impl From<&str> for BarBound {
    fn from(value: &str) -> Self {
        BarBound::Formula(value.to_string())
    }
}

/// Bar declaration: a max bound and an optional value override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarDefinition {
    pub max: BarBound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<BarBound>,
}

impl BarDefinition {
    pub fn new(max: impl Into<BarBound>) -> Self {
        Self {
            max: max.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<BarBound>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A resolved bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBar {
    pub key: String,
    pub value: f64,
    pub max: f64,
}

impl AttributeBar {
    pub fn new(key: impl Into<String>, value: f64, max: f64) -> Self {
        Self {
            key: key.into(),
            value,
            max,
        }
    }
}

/// How a bar is shown on the token: as a bar or as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarDisplay {
    #[default]
    Bar,
    Value,
}

/// Parsed token HUD input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarAdjustment {
    /// `=7` or `7`
    Set(f64),
    /// `+3` or `-3`
    Delta(f64),
}

impl BarAdjustment {
    /// New bar value. Only deltas on [`BarDisplay::Bar`] are clamped to `max`.
    pub fn apply(&self, bar: &AttributeBar, display: BarDisplay) -> f64 {
        match self {
            BarAdjustment::Set(value) => *value,
            BarAdjustment::Delta(delta) => {
                let value = bar.value + delta;
                match display {
                    BarDisplay::Bar => value.min(bar.max),
                    BarDisplay::Value => value,
                }
            }
        }
    }
}

impl FromStr for BarAdjustment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let number = |text: &str| {
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| {
                    DomainError::validation(format!("Invalid bar adjustment: '{}'", input))
                })
        };

        if let Some(rest) = input.strip_prefix('=') {
            Ok(BarAdjustment::Set(number(rest)?))
        } else if let Some(rest) = input.strip_prefix('+') {
            Ok(BarAdjustment::Delta(number(rest)?))
        } else if let Some(rest) = input.strip_prefix('-') {
            Ok(BarAdjustment::Delta(-number(rest)?))
        } else {
            Ok(BarAdjustment::Set(number(input)?))
        }
    }
}

impl fmt::Display for BarAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarAdjustment::Set(value) => write!(f, "={}", format_number(*value)),
            BarAdjustment::Delta(delta) if *delta < 0.0 => write!(f, "{}", format_number(*delta)),
            BarAdjustment::Delta(delta) => write!(f, "+{}", format_number(*delta)),
        }
    }
}
