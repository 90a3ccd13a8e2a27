//! Clock and random implementations.

use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};
use sheetforge_domain::DiceRoller;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Rolls formula dice through a [`RandomPort`].
pub struct RandomDiceRoller {
    random: Arc<dyn RandomPort>,
}

impl RandomDiceRoller {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }
}

impl DiceRoller for RandomDiceRoller {
    fn roll(&self, sides: u32) -> u32 {
        let max = i32::try_from(sides).unwrap_or(i32::MAX).max(1);
        u32::try_from(self.random.gen_range(1, max)).unwrap_or(1)
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fixed random for testing.
#[cfg(test)]
pub struct FixedRandom(pub i32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, _min: i32, _max: i32) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockRandomPort;
    use mockall::predicate::eq;

    #[test]
    fn dice_roller_asks_for_one_to_sides() {
        let mut random = MockRandomPort::new();
        random
            .expect_gen_range()
            .with(eq(1), eq(20))
            .times(1)
            .returning(|_, _| 17);

        let roller = RandomDiceRoller::new(Arc::new(random));
        assert_eq!(roller.roll(20), 17);
    }

    #[test]
    fn system_random_stays_in_range() {
        let roller = RandomDiceRoller::new(Arc::new(SystemRandom::new()));
        for _ in 0..100 {
            let value = roller.roll(6);
            assert!((1..=6).contains(&value));
        }
    }
}
