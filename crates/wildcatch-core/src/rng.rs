//! Random rolls used by the resolvers.
//!
//! Every probabilistic decision in the core goes through the [`Dice`] trait so
//! that tests can script exact rolls and the service can stay deterministic.
//! The service itself rolls with a seeded [`ChaCha8Rng`].

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of uniform random rolls.
pub trait Dice {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f32;

    /// Uniform value in `[lo, hi)`.
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit() * (hi - lo)
    }

    /// Uniform index in `[0, n)`. Returns 0 when `n` is 0.
    fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let i = (self.unit() * n as f32) as usize;
        i.min(n - 1)
    }

    /// Returns true with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p.clamp(0.0, 1.0)
    }
}

impl Dice for ChaCha8Rng {
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }

    fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            0
        } else {
            self.gen_range(0..n)
        }
    }
}

/// Replays a fixed sequence of unit rolls, then repeats a fallback value.
///
/// # Example
///
/// ```
/// use wildcatch_core::rng::{Dice, ScriptedDice};
///
/// let mut dice = ScriptedDice::new([0.25, 0.9]);
/// assert_eq!(dice.unit(), 0.25);
/// assert_eq!(dice.unit(), 0.9);
/// assert_eq!(dice.unit(), 0.5); // fallback
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: VecDeque<f32>,
    fallback: f32,
}

impl ScriptedDice {
    /// Creates dice that replay `rolls` then return `0.5` forever.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = f32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 0.5,
        }
    }

    /// Overrides the value returned once the script runs out.
    #[must_use]
    pub fn with_fallback(mut self, fallback: f32) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of scripted rolls not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn unit(&mut self) -> f32 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}
