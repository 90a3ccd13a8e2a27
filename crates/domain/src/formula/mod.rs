//! Formula evaluation boundary
//!
//! The resolver only depends on [`FormulaEvaluator`]. The one thing it needs
//! to tell apart is [`FormulaError::Unresolvable`] (a referenced property is
//! not in the context yet) from every other failure, which is fatal.
//!
//! [`ExpressionEvaluator`] is the bundled implementation.

mod dice;
mod evaluator;
mod parser;

pub use dice::{DiceOutcome, DiceRoller, DiceTerm, FixedRoller, MAX_DICE_COUNT, MAX_DIE_SIZE};
pub use evaluator::ExpressionEvaluator;
pub use parser::{parse_expression, parse_phrase, BinaryOp, Expr, Phrase, Segment, UnaryOp};

use thiserror::Error;

use crate::value_objects::{PropertyMap, PropertyValue};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// A referenced property is missing from the context.
    #[error("Unresolvable reference: {reference}")]
    Unresolvable { reference: String },

    #[error("Syntax error in '{formula}': {message}")]
    Syntax { formula: String, message: String },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid dice: {0}")]
    InvalidDice(String),
}

impl FormulaError {
    pub fn unresolvable(reference: impl Into<String>) -> Self {
        Self::Unresolvable {
            reference: reference.into(),
        }
    }

    pub fn syntax(formula: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            formula: formula.into(),
            message: message.into(),
        }
    }

    /// True when the failure may go away once more properties are resolved.
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, FormulaError::Unresolvable { .. })
    }
}

/// Per-call evaluation settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalOptions {
    /// Substituted for missing references instead of failing as unresolvable.
    pub default_value: Option<PropertyValue>,
    /// Row path (`attacks.a1`) tried before the bare name on every lookup.
    pub reference: Option<String>,
    /// Record a human-readable rendering of the evaluation.
    pub explain: bool,
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn explained(mut self) -> Self {
        self.explain = true;
        self
    }
}

/// Result of a successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: PropertyValue,
    /// Present only when [`EvalOptions::explain`] was set.
    pub explanation: Option<String>,
}

/// Evaluates formula strings against a property context.
#[cfg_attr(test, mockall::automock)]
pub trait FormulaEvaluator: Send + Sync {
    fn evaluate(
        &self,
        formula: &str,
        context: &PropertyMap,
        options: &EvalOptions,
    ) -> Result<Evaluation, FormulaError>;
}
