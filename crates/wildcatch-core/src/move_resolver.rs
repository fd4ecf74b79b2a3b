//! Hit and damage computation for moves.
//!
//! Everything here is a pure function of its inputs plus the rolls drawn from
//! a [`Dice`]. Nothing mutates a record; the turn controller applies results.
//!
//! # Damage
//!
//! ```text
//! base  = ((2·L/5 + 2) · P · A / max(1, D)) / 50 + 2
//! total = floor(base · stab · crit · effectiveness), at least 1
//! ```
//!
//! `A`/`D` are Attack/Defense for physical moves and Special Attack/Special
//! Defense for special ones. Status and zero-power moves deal nothing.

use crate::creature::{CreatureRecord, ElementType, MoveCategory, MoveDef, Species};
use crate::rng::Dice;

/// Damage multiplier for a same-type attack.
pub const STAB_MULTIPLIER: f32 = 1.5;
/// Damage multiplier for a critical hit.
pub const CRIT_MULTIPLIER: f32 = 1.5;
/// One critical hit in this many damaging moves.
pub const CRIT_ODDS: usize = 24;

/// Type effectiveness lookup.
///
/// Returns the damage multiplier for an attack of `attack` type against a
/// defender of `defender` species (e.g. 2.0 super effective, 0.0 immune).
pub trait TypeChart {
    /// Multiplier for `attack` hitting `defender`.
    fn effectiveness(&self, attack: ElementType, defender: &Species) -> f32;
}

/// Chart where every matchup is neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralChart;

impl TypeChart for NeutralChart {
    fn effectiveness(&self, _attack: ElementType, _defender: &Species) -> f32 {
        1.0
    }
}

/// Result of one damage roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRoll {
    /// HP to remove.
    pub amount: u16,
    /// The crit multiplier applied.
    pub critical: bool,
    /// The same-type bonus applied.
    pub stab: bool,
    /// Type effectiveness used.
    pub effectiveness: f32,
}

/// True when the move's element matches either of the user's types.
#[must_use]
pub fn has_stab(user: &Species, mv: &MoveDef) -> bool {
    user.has_type(mv.element)
}

/// Rolls `[0, 100)` and hits if the roll is within the clamped accuracy.
pub fn accuracy_check(accuracy: u8, dice: &mut dyn Dice) -> bool {
    let accuracy = f32::from(accuracy.clamp(1, 100));
    dice.range(0.0, 100.0) <= accuracy
}

/// Damage for a known crit outcome.
///
/// Returns 0 for moves that do not deal direct damage.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn damage_with(
    attacker: &CreatureRecord,
    defender: &CreatureRecord,
    mv: &MoveDef,
    critical: bool,
    chart: &dyn TypeChart,
) -> u16 {
    if !mv.is_damaging() {
        return 0;
    }

    let (attack, defense) = match mv.category {
        MoveCategory::Special => (attacker.stats().sp_attack, defender.stats().sp_defense),
        _ => (attacker.stats().attack, defender.stats().defense),
    };
    let level = f32::from(attacker.level().max(1));
    let base = ((2.0 * level / 5.0 + 2.0) * f32::from(mv.power) * f32::from(attack)
        / f32::from(defense.max(1)))
        / 50.0
        + 2.0;

    let stab = if has_stab(attacker.species(), mv) {
        STAB_MULTIPLIER
    } else {
        1.0
    };
    let crit = if critical { CRIT_MULTIPLIER } else { 1.0 };
    let effectiveness = chart.effectiveness(mv.element, defender.species()).max(0.0);

    let total = (base * stab * crit * effectiveness).floor();
    total.clamp(1.0, f32::from(u16::MAX)) as u16
}

/// Rolls for a critical hit and computes damage.
pub fn roll_damage(
    attacker: &CreatureRecord,
    defender: &CreatureRecord,
    mv: &MoveDef,
    chart: &dyn TypeChart,
    dice: &mut dyn Dice,
) -> DamageRoll {
    if !mv.is_damaging() {
        return DamageRoll {
            amount: 0,
            critical: false,
            stab: false,
            effectiveness: 1.0,
        };
    }
    let critical = dice.index(CRIT_ODDS) == 0;
    DamageRoll {
        amount: damage_with(attacker, defender, mv, critical, chart),
        critical,
        stab: has_stab(attacker.species(), mv),
        effectiveness: chart.effectiveness(mv.element, defender.species()),
    }
}
