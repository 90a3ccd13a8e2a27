//! Dice terms (`NdM`) and the roller seam
//!
//! The domain never touches an RNG directly. Callers inject a [`DiceRoller`];
//! the engine adapts its `RandomPort` into one, tests use [`FixedRoller`].

use std::fmt;

use super::FormulaError;

/// Largest number of dice a single term may roll.
pub const MAX_DICE_COUNT: u32 = 100;
/// Largest die size a term may use.
pub const MAX_DIE_SIZE: u32 = 1000;

/// Source of die results.
pub trait DiceRoller: Send + Sync {
    /// Roll one die, returning a value in `1..=sides`.
    fn roll(&self, sides: u32) -> u32;
}

/// Always rolls the same face (capped at the die size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRoller(pub u32);

impl DiceRoller for FixedRoller {
    fn roll(&self, sides: u32) -> u32 {
        self.0.clamp(1, sides.max(1))
    }
}

/// A parsed dice term such as `2d6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceTerm {
    pub count: u32,
    pub sides: u32,
}

impl DiceTerm {
    pub fn new(count: u32, sides: u32) -> Result<Self, FormulaError> {
        if count == 0 || count > MAX_DICE_COUNT {
            return Err(FormulaError::InvalidDice(format!(
                "dice count must be between 1 and {}, got {}",
                MAX_DICE_COUNT, count
            )));
        }
        if !(2..=MAX_DIE_SIZE).contains(&sides) {
            return Err(FormulaError::InvalidDice(format!(
                "die size must be between 2 and {}, got {}",
                MAX_DIE_SIZE, sides
            )));
        }
        Ok(Self { count, sides })
    }

    pub fn roll(&self, roller: &dyn DiceRoller) -> DiceOutcome {
        let rolls = (0..self.count)
            .map(|_| roller.roll(self.sides).clamp(1, self.sides))
            .collect();
        DiceOutcome { term: *self, rolls }
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Individual die results of one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceOutcome {
    pub term: DiceTerm,
    pub rolls: Vec<u32>,
}

impl DiceOutcome {
    pub fn total(&self) -> u32 {
        self.rolls.iter().sum()
    }
}

impl fmt::Display for DiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rolls: Vec<String> = self.rolls.iter().map(ToString::to_string).collect();
        write!(f, "[{}: {}]", self.term, rolls.join(", "))
    }
}
