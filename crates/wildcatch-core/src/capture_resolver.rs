//! Capture probability and shake count.
//!
//! ```text
//! chance = clamp01(clamp01(catch_rate) · max(0, multiplier))
//! success = critical || (chance > 0 && roll <= chance)
//! shakes  = 3 on success, otherwise 1 or 2
//! ```

use serde::{Deserialize, Serialize};

use crate::rng::Dice;

/// Shakes shown before a successful capture.
pub const SUCCESS_SHAKES: u8 = 3;

/// Result of one capture roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    /// The creature was caught.
    pub success: bool,
    /// Success came from the critical short-circuit.
    pub critical: bool,
    /// Shakes to play before revealing the result (1..=3).
    pub shakes: u8,
    /// The computed capture probability.
    pub chance: f32,
}

/// Capture probability in `[0, 1]`.
///
/// Non-finite inputs count as zero.
#[must_use]
pub fn capture_chance(catch_rate: f32, multiplier: f32) -> f32 {
    let rate = if catch_rate.is_finite() {
        catch_rate.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let multiplier = if multiplier.is_finite() {
        multiplier.max(0.0)
    } else {
        0.0
    };
    (rate * multiplier).clamp(0.0, 1.0)
}

/// Rolls a capture.
///
/// The critical roll is only drawn when `critical_chance > 0`, so disabling
/// it leaves the roll sequence unchanged.
pub fn resolve_capture(
    catch_rate: f32,
    multiplier: f32,
    critical_chance: f32,
    dice: &mut dyn Dice,
) -> CaptureOutcome {
    let chance = capture_chance(catch_rate, multiplier);

    let critical = critical_chance > 0.0 && dice.chance(critical_chance);
    let success = critical || (chance > 0.0 && dice.unit() <= chance);

    let shakes = if success {
        SUCCESS_SHAKES
    } else {
        1 + u8::from(dice.index(2) == 1)
    };

    CaptureOutcome {
        success,
        critical,
        shakes,
        chance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedDice;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn doubled_half_rate_is_certain() {
        assert!((capture_chance(0.5, 2.0) - 1.0).abs() < f32::EPSILON);
        let mut dice = ScriptedDice::new([0.999_999]);
        let outcome = resolve_capture(0.5, 2.0, 0.0, &mut dice);
        assert!(outcome.success);
        assert_eq!(outcome.shakes, 3);
    }

    #[test]
    fn zero_chance_never_succeeds() {
        let mut dice = ScriptedDice::new([0.0, 0.0]);
        let outcome = resolve_capture(0.0, 5.0, 0.0, &mut dice);
        assert!(!outcome.success);
        assert_eq!(outcome.shakes, 1);
    }

    #[test]
    fn negative_multiplier_is_zero() {
        assert!(capture_chance(0.8, -2.0).abs() < f32::EPSILON);
        assert!(capture_chance(f32::NAN, 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn failure_shakes_follow_roll() {
        let mut dice = ScriptedDice::new([0.9, 0.7]);
        let outcome = resolve_capture(0.2, 1.0, 0.0, &mut dice);
        assert!(!outcome.success);
        assert_eq!(outcome.shakes, 2);
    }

    #[test]
    fn critical_short_circuits() {
        let mut dice = ScriptedDice::new([0.05]);
        let outcome = resolve_capture(0.0, 0.0, 0.1, &mut dice);
        assert!(outcome.success);
        assert!(outcome.critical);
        assert_eq!(outcome.shakes, 3);
    }

    proptest! {
        #[test]
        fn outcome_is_consistent(
            rate in -1.0f32..2.0,
            mult in -1.0f32..4.0,
            crit in 0.0f32..0.5,
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = resolve_capture(rate, mult, crit, &mut rng);
            prop_assert!((0.0..=1.0).contains(&outcome.chance));
            prop_assert!((1..=3).contains(&outcome.shakes));
            if outcome.success {
                prop_assert_eq!(outcome.shakes, 3);
            } else {
                prop_assert!(outcome.shakes < 3);
            }
        }
    }
}
