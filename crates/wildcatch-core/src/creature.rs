//! Creature data: species, moves, stats and the per-individual record.
//!
//! A [`CreatureRecord`] is the persistent state of one creature. The core only
//! ever mutates it through the methods here, which keep two invariants:
//!
//! - `0 <= current_hp <= max_hp`
//! - occupied move slots are contiguous at the front of the 4-slot array
//!
//! Species and move definitions are shared, immutable data behind [`Arc`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Number of move slots a creature has.
pub const MOVE_SLOTS: usize = 4;

/// Highest reachable level.
pub const MAX_LEVEL: u8 = 100;

// =============================================================================
// Types and moves
// =============================================================================

/// Elemental type shared by species and moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

/// Which stat pair a move uses, or none for status moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    /// Attack vs Defense.
    Physical,
    /// Special Attack vs Special Defense.
    Special,
    /// No direct damage.
    Status,
}

/// Immutable definition of a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDef {
    /// Display name, also used as the identity when learning moves.
    pub name: String,
    /// Elemental type.
    pub element: ElementType,
    /// Damage category.
    pub category: MoveCategory,
    /// Base power; 0 for moves without direct damage.
    pub power: u16,
    /// Hit chance in percent (values outside 1..=100 are clamped on use).
    pub accuracy: u8,
    /// Uses available when fully restored.
    pub max_uses: u8,
}

impl MoveDef {
    /// Creates a move definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        element: ElementType,
        category: MoveCategory,
        power: u16,
        accuracy: u8,
        max_uses: u8,
    ) -> Self {
        Self {
            name: name.into(),
            element,
            category,
            power,
            accuracy,
            max_uses,
        }
    }

    /// True when the move deals direct damage.
    #[must_use]
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.power > 0
    }
}

/// A learned move with its remaining uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSlot {
    def: Arc<MoveDef>,
    current_uses: u8,
    max_uses: u8,
}

impl MoveSlot {
    /// Creates a fully restored slot for `def`.
    #[must_use]
    pub fn new(def: Arc<MoveDef>) -> Self {
        let max_uses = def.max_uses;
        Self {
            def,
            current_uses: max_uses,
            max_uses,
        }
    }

    /// The move this slot holds.
    #[must_use]
    pub fn def(&self) -> &Arc<MoveDef> {
        &self.def
    }

    /// Remaining uses.
    #[must_use]
    pub const fn current_uses(&self) -> u8 {
        self.current_uses
    }

    /// Uses when fully restored.
    #[must_use]
    pub const fn max_uses(&self) -> u8 {
        self.max_uses
    }

    /// True when at least one use remains.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.current_uses > 0
    }

    /// Spends `amount` uses. Fails without change if fewer remain.
    pub fn try_consume(&mut self, amount: u8) -> bool {
        if amount == 0 || self.current_uses < amount {
            return false;
        }
        self.current_uses -= amount;
        true
    }

    /// Restores all uses.
    pub fn restore(&mut self) {
        self.current_uses = self.max_uses;
    }
}

// =============================================================================
// Species
// =============================================================================

/// How a wild creature behaves in the overworld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviorKind {
    /// Wanders near its spawn and turns to look at the player.
    #[default]
    Friendly,
    /// Chases the player when close.
    Aggressive,
    /// Stays put.
    Idle,
}

/// Experience curve group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum GrowthRate {
    Fast,
    #[default]
    MediumFast,
    MediumSlow,
    Slow,
    Fluctuating,
    Erratic,
}

impl GrowthRate {
    /// Experience needed to advance from `level - 1` to `level`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn experience_for_level(self, level: u8) -> u32 {
        let n = f64::from(level);
        let cube = n.powi(3);
        let exp = match self {
            Self::Fast => 4.0 * cube / 5.0,
            Self::MediumFast => cube,
            Self::MediumSlow => 1.2 * cube - 15.0 * n * n + 100.0 * n - 140.0,
            Self::Slow => 5.0 * cube / 4.0,
            Self::Fluctuating => {
                if level <= 15 {
                    cube * (((n + 1.0) / 3.0).floor() + 24.0) / 50.0
                } else if level <= 36 {
                    cube * (n + 14.0) / 50.0
                } else {
                    cube * ((n / 2.0).floor() + 32.0) / 50.0
                }
            }
            Self::Erratic => {
                if level <= 50 {
                    cube * (100.0 - n) / 50.0
                } else if level <= 68 {
                    cube * (150.0 - n) / 100.0
                } else if level <= 98 {
                    cube * ((1911.0 - 10.0 * n) / 3.0) / 500.0
                } else {
                    cube * (160.0 - n) / 100.0
                }
            }
        };
        exp.floor().max(0.0) as u32
    }
}

/// Base stat values of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BaseStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

/// A move a species learns on reaching `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnableMove {
    /// Level the move becomes available at.
    pub level: u8,
    /// The move.
    pub def: Arc<MoveDef>,
}

/// Immutable species data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    /// Species name.
    pub name: String,
    /// Primary elemental type.
    pub primary_type: ElementType,
    /// Optional secondary elemental type.
    pub secondary_type: Option<ElementType>,
    /// Base capture probability in `[0, 1]`.
    pub catch_rate: f32,
    /// Base stat values.
    pub base_stats: BaseStats,
    /// Overworld behaviour.
    pub behavior: BehaviorKind,
    /// Experience curve.
    pub growth_rate: GrowthRate,
    /// Level-up learnset in learn order.
    pub learnset: Vec<LearnableMove>,
}

impl Species {
    /// True when `element` is one of the species' own types.
    #[must_use]
    pub fn has_type(&self, element: ElementType) -> bool {
        self.primary_type == element || self.secondary_type == Some(element)
    }
}

// =============================================================================
// Stats
// =============================================================================

/// Stats a nature can raise or lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Stat {
    Attack,
    Defense,
    Speed,
    SpAttack,
    SpDefense,
}

const NATURE_STATS: [Stat; 5] = [
    Stat::Attack,
    Stat::Defense,
    Stat::Speed,
    Stat::SpAttack,
    Stat::SpDefense,
];

/// Personality that raises one stat by 10% and lowers another by 10%.
///
/// Natures are laid out in a 5x5 grid: the row picks the raised stat, the
/// column the lowered one. The diagonal natures are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Nature {
    #[default]
    Hardy,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

impl Nature {
    /// Every nature in grid order.
    pub const ALL: [Nature; 25] = [
        Self::Hardy,
        Self::Lonely,
        Self::Brave,
        Self::Adamant,
        Self::Naughty,
        Self::Bold,
        Self::Docile,
        Self::Relaxed,
        Self::Impish,
        Self::Lax,
        Self::Timid,
        Self::Hasty,
        Self::Serious,
        Self::Jolly,
        Self::Naive,
        Self::Modest,
        Self::Mild,
        Self::Quiet,
        Self::Bashful,
        Self::Rash,
        Self::Calm,
        Self::Gentle,
        Self::Sassy,
        Self::Careful,
        Self::Quirky,
    ];

    /// The raised and lowered stats, or `None` for neutral natures.
    #[must_use]
    pub fn modified_stats(self) -> Option<(Stat, Stat)> {
        let i = self as usize;
        let (up, down) = (i / 5, i % 5);
        (up != down).then(|| (NATURE_STATS[up], NATURE_STATS[down]))
    }

    /// Applies the nature to a computed stat value.
    #[must_use]
    pub fn apply(self, stat: Stat, value: u16) -> u16 {
        match self.modified_stats() {
            #[allow(clippy::cast_possible_truncation)]
            Some((up, _)) if up == stat => (u32::from(value) * 11 / 10) as u16,
            Some((_, down)) if down == stat => (u32::from(value) * 9 / 10) as u16,
            _ => value,
        }
    }
}

/// Per-stat individual or effort values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct StatSpread {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

impl StatSpread {
    /// Same value for every stat.
    #[must_use]
    pub const fn uniform(value: u8) -> Self {
        Self {
            hp: value,
            attack: value,
            defense: value,
            sp_attack: value,
            sp_defense: value,
            speed: value,
        }
    }

    /// Perfect individual values.
    #[must_use]
    pub const fn max_ivs() -> Self {
        Self::uniform(31)
    }
}

/// Computed stat block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct StatBlock {
    pub max_hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

impl StatBlock {
    /// Computes stats from base values, level, IVs, EVs and nature.
    #[must_use]
    pub fn compute(
        base: &BaseStats,
        level: u8,
        ivs: &StatSpread,
        evs: &StatSpread,
        nature: Nature,
    ) -> Self {
        let core = |b: u16, iv: u8, ev: u8| -> u32 {
            (2 * u32::from(b) + u32::from(iv) + u32::from(ev) / 4) * u32::from(level) / 100
        };
        #[allow(clippy::cast_possible_truncation)]
        let other = |stat: Stat, b: u16, iv: u8, ev: u8| -> u16 {
            let raw = (core(b, iv, ev) + 5).min(u32::from(u16::MAX)) as u16;
            nature.apply(stat, raw)
        };
        #[allow(clippy::cast_possible_truncation)]
        let max_hp = (core(base.hp, ivs.hp, evs.hp) + u32::from(level) + 10)
            .min(u32::from(u16::MAX)) as u16;

        Self {
            max_hp,
            attack: other(Stat::Attack, base.attack, ivs.attack, evs.attack),
            defense: other(Stat::Defense, base.defense, ivs.defense, evs.defense),
            sp_attack: other(Stat::SpAttack, base.sp_attack, ivs.sp_attack, evs.sp_attack),
            sp_defense: other(
                Stat::SpDefense,
                base.sp_defense,
                ivs.sp_defense,
                evs.sp_defense,
            ),
            speed: other(Stat::Speed, base.speed, ivs.speed, evs.speed),
        }
    }
}

// =============================================================================
// CreatureRecord
// =============================================================================

/// Unique identity of a creature across party, boxes and the world.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(u64);

impl CreatureId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CreatureId({})", self.0)
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Persistent state of one creature.
///
/// Deserialization clamps the level and HP, caps move uses and re-compacts
/// the move slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCreatureRecord")]
pub struct CreatureRecord {
    id: CreatureId,
    species: Arc<Species>,
    level: u8,
    nature: Nature,
    ivs: StatSpread,
    evs: StatSpread,
    experience: u32,
    stats: StatBlock,
    current_hp: u16,
    moves: [Option<MoveSlot>; MOVE_SLOTS],
}

/// Wire shape of [`CreatureRecord`] before its invariants are restored.
#[derive(Deserialize)]
struct RawCreatureRecord {
    id: CreatureId,
    species: Arc<Species>,
    level: u8,
    nature: Nature,
    ivs: StatSpread,
    evs: StatSpread,
    experience: u32,
    stats: StatBlock,
    current_hp: u16,
    moves: [Option<MoveSlot>; MOVE_SLOTS],
}

impl From<RawCreatureRecord> for CreatureRecord {
    fn from(raw: RawCreatureRecord) -> Self {
        let mut record = Self {
            id: raw.id,
            species: raw.species,
            level: raw.level.clamp(1, MAX_LEVEL),
            nature: raw.nature,
            ivs: raw.ivs,
            evs: raw.evs,
            experience: raw.experience,
            stats: raw.stats,
            current_hp: raw.current_hp.min(raw.stats.max_hp),
            moves: raw.moves,
        };
        for slot in record.moves.iter_mut().flatten() {
            slot.current_uses = slot.current_uses.min(slot.max_uses);
        }
        record.compact_moves();
        record
    }
}

impl CreatureRecord {
    /// Creates a creature with perfect IVs, no EVs and a neutral nature.
    #[must_use]
    pub fn new(id: CreatureId, species: Arc<Species>, level: u8) -> Self {
        Self::with_genetics(
            id,
            species,
            level,
            Nature::Hardy,
            StatSpread::max_ivs(),
            StatSpread::default(),
        )
    }

    /// Creates a creature with explicit nature, IVs and EVs.
    ///
    /// The level is clamped to `1..=100`, HP starts full, and the first four
    /// learnset entries at or below the level are learned in order.
    #[must_use]
    pub fn with_genetics(
        id: CreatureId,
        species: Arc<Species>,
        level: u8,
        nature: Nature,
        ivs: StatSpread,
        evs: StatSpread,
    ) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        let stats = StatBlock::compute(&species.base_stats, level, &ivs, &evs, nature);

        let mut moves: [Option<MoveSlot>; MOVE_SLOTS] = Default::default();
        for (slot, entry) in moves.iter_mut().zip(
            species
                .learnset
                .iter()
                .filter(|entry| entry.level <= level),
        ) {
            *slot = Some(MoveSlot::new(Arc::clone(&entry.def)));
        }

        Self {
            id,
            species,
            level,
            nature,
            ivs,
            evs,
            experience: 0,
            stats,
            current_hp: stats.max_hp,
            moves,
        }
    }

    /// Unique identity.
    #[must_use]
    pub const fn id(&self) -> CreatureId {
        self.id
    }

    /// Species data.
    #[must_use]
    pub fn species(&self) -> &Species {
        &self.species
    }

    /// Shared handle to the species data.
    #[must_use]
    pub fn species_arc(&self) -> &Arc<Species> {
        &self.species
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Nature.
    #[must_use]
    pub const fn nature(&self) -> Nature {
        self.nature
    }

    /// Individual values.
    #[must_use]
    pub const fn ivs(&self) -> &StatSpread {
        &self.ivs
    }

    /// Effort values.
    #[must_use]
    pub const fn evs(&self) -> &StatSpread {
        &self.evs
    }

    /// Experience accumulated towards the next level.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }

    /// Computed stats.
    #[must_use]
    pub const fn stats(&self) -> &StatBlock {
        &self.stats
    }

    /// Current HP.
    #[must_use]
    pub const fn current_hp(&self) -> u16 {
        self.current_hp
    }

    /// Maximum HP.
    #[must_use]
    pub const fn max_hp(&self) -> u16 {
        self.stats.max_hp
    }

    /// True at 0 HP.
    #[must_use]
    pub const fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// All four move slots; occupied slots come first.
    #[must_use]
    pub fn moves(&self) -> &[Option<MoveSlot>; MOVE_SLOTS] {
        &self.moves
    }

    /// The move in slot `index`, if any.
    #[must_use]
    pub fn move_slot(&self, index: usize) -> Option<&MoveSlot> {
        self.moves.get(index).and_then(Option::as_ref)
    }

    /// Number of occupied move slots.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.moves.iter().filter(|slot| slot.is_some()).count()
    }

    /// Spends one use of the move in `index`.
    ///
    /// Returns `false` (and changes nothing) if the slot is empty or exhausted.
    pub fn consume_move_use(&mut self, index: usize) -> bool {
        self.moves
            .get_mut(index)
            .and_then(Option::as_mut)
            .is_some_and(|slot| slot.try_consume(1))
    }

    /// Removes up to `amount` HP and returns how much was actually removed.
    pub fn apply_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Restores up to `amount` HP and returns how much was actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let healed = amount.min(self.stats.max_hp.saturating_sub(self.current_hp));
        self.current_hp += healed;
        healed
    }

    /// Sets HP directly, clamped to `[0, max_hp]`.
    pub fn set_current_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.stats.max_hp);
    }

    /// Full HP and all move uses restored.
    pub fn restore_all(&mut self) {
        self.current_hp = self.stats.max_hp;
        for slot in self.moves.iter_mut().flatten() {
            slot.restore();
        }
    }

    /// Shifts occupied move slots to the front, preserving their order.
    pub fn compact_moves(&mut self) {
        let mut write = 0;
        for read in 0..MOVE_SLOTS {
            if self.moves[read].is_some() {
                if read != write {
                    self.moves[write] = self.moves[read].take();
                }
                write += 1;
            }
        }
    }

    /// Learns `def` into the first free slot.
    ///
    /// When all four slots are taken the oldest move (slot 0) is forgotten and
    /// returned. Learning a move already known does nothing.
    pub fn learn_move(&mut self, def: Arc<MoveDef>) -> Option<Arc<MoveDef>> {
        if self.knows_move(&def.name) {
            return None;
        }
        if let Some(free) = self.moves.iter_mut().find(|slot| slot.is_none()) {
            *free = Some(MoveSlot::new(def));
            return None;
        }
        let forgotten = self.moves[0].take().map(|slot| slot.def);
        self.compact_moves();
        self.moves[MOVE_SLOTS - 1] = Some(MoveSlot::new(def));
        forgotten
    }

    /// Removes the move in `index` and closes the gap.
    pub fn forget_move(&mut self, index: usize) -> Option<MoveSlot> {
        let removed = self.moves.get_mut(index).and_then(Option::take);
        self.compact_moves();
        removed
    }

    /// True when a move with this name is in any slot.
    #[must_use]
    pub fn knows_move(&self, name: &str) -> bool {
        self.moves
            .iter()
            .flatten()
            .any(|slot| slot.def.name == name)
    }

    /// Adds experience, levelling up as many times as it affords.
    ///
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32) -> u8 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.level < MAX_LEVEL {
            let needed = self.species.growth_rate.experience_for_level(self.level + 1);
            if self.experience < needed {
                break;
            }
            self.experience -= needed;
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        let previous_max = self.stats.max_hp;
        self.level += 1;
        self.stats = StatBlock::compute(
            &self.species.base_stats,
            self.level,
            &self.ivs,
            &self.evs,
            self.nature,
        );
        let gained_hp = self.stats.max_hp.saturating_sub(previous_max);
        self.current_hp = self
            .current_hp
            .saturating_add(gained_hp)
            .min(self.stats.max_hp);

        let unlocked: Vec<Arc<MoveDef>> = self
            .species
            .learnset
            .iter()
            .filter(|entry| entry.level == self.level)
            .map(|entry| Arc::clone(&entry.def))
            .collect();
        for def in unlocked {
            self.learn_move(def);
        }

        info!(
            creature = %self.id,
            species = %self.species.name,
            level = self.level,
            "creature levelled up"
        );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tackle() -> Arc<MoveDef> {
        Arc::new(MoveDef::new(
            "Tackle",
            ElementType::Normal,
            MoveCategory::Physical,
            40,
            100,
            35,
        ))
    }

    fn named(name: &str) -> Arc<MoveDef> {
        Arc::new(MoveDef::new(
            name,
            ElementType::Normal,
            MoveCategory::Physical,
            50,
            100,
            10,
        ))
    }

    fn species_with_learnset(learnset: Vec<LearnableMove>) -> Arc<Species> {
        Arc::new(Species {
            name: "Testmon".into(),
            primary_type: ElementType::Normal,
            secondary_type: None,
            catch_rate: 0.5,
            base_stats: BaseStats {
                hp: 45,
                attack: 49,
                defense: 49,
                sp_attack: 65,
                sp_defense: 65,
                speed: 45,
            },
            behavior: BehaviorKind::Friendly,
            growth_rate: GrowthRate::MediumFast,
            learnset,
        })
    }

    fn record(level: u8) -> CreatureRecord {
        let learnset = vec![LearnableMove { level: 1, def: tackle() }];
        CreatureRecord::new(CreatureId::new(1), species_with_learnset(learnset), level)
    }

    mod stat_tests {
        use super::*;

        #[test]
        fn level_fifty_stats_match_formula() {
            let base = BaseStats {
                hp: 45,
                attack: 49,
                defense: 49,
                sp_attack: 65,
                sp_defense: 65,
                speed: 45,
            };
            let stats = StatBlock::compute(
                &base,
                50,
                &StatSpread::max_ivs(),
                &StatSpread::default(),
                Nature::Hardy,
            );
            // (2*45 + 31) * 50 / 100 = 60 -> 60 + 50 + 10
            assert_eq!(stats.max_hp, 120);
            // (2*49 + 31) * 50 / 100 = 64 -> 64 + 5
            assert_eq!(stats.attack, 69);
            assert_eq!(stats.sp_attack, 85);
        }

        #[test]
        fn nature_raises_and_lowers() {
            assert_eq!(
                Nature::Adamant.modified_stats(),
                Some((Stat::Attack, Stat::SpAttack))
            );
            assert_eq!(Nature::Adamant.apply(Stat::Attack, 100), 110);
            assert_eq!(Nature::Adamant.apply(Stat::SpAttack, 100), 90);
            assert_eq!(Nature::Adamant.apply(Stat::Speed, 100), 100);
        }

        #[test]
        fn diagonal_natures_are_neutral() {
            for nature in [
                Nature::Hardy,
                Nature::Docile,
                Nature::Serious,
                Nature::Bashful,
                Nature::Quirky,
            ] {
                assert_eq!(nature.modified_stats(), None);
            }
        }

        #[test]
        fn growth_curves_are_non_negative() {
            for rate in [
                GrowthRate::Fast,
                GrowthRate::MediumFast,
                GrowthRate::MediumSlow,
                GrowthRate::Slow,
                GrowthRate::Fluctuating,
                GrowthRate::Erratic,
            ] {
                for level in 1..=MAX_LEVEL {
                    let _ = rate.experience_for_level(level);
                }
            }
            assert_eq!(GrowthRate::MediumSlow.experience_for_level(1), 0);
            assert_eq!(GrowthRate::MediumFast.experience_for_level(10), 1000);
        }
    }

    mod hp_tests {
        use super::*;

        #[test]
        fn damage_clamps_at_zero() {
            let mut mon = record(5);
            let max = mon.max_hp();
            assert_eq!(mon.apply_damage(max + 50), max);
            assert_eq!(mon.current_hp(), 0);
            assert!(mon.is_fainted());
        }

        #[test]
        fn heal_clamps_at_max() {
            let mut mon = record(5);
            mon.apply_damage(3);
            assert_eq!(mon.heal(100), 3);
            assert_eq!(mon.current_hp(), mon.max_hp());
        }

        #[test]
        fn set_current_hp_clamps() {
            let mut mon = record(5);
            mon.set_current_hp(u16::MAX);
            assert_eq!(mon.current_hp(), mon.max_hp());
        }

        proptest! {
            #[test]
            fn hp_stays_in_bounds(
                ops in proptest::collection::vec((any::<bool>(), 0u16..500), 0..40)
            ) {
                let mut mon = record(20);
                for (is_damage, amount) in ops {
                    if is_damage {
                        mon.apply_damage(amount);
                    } else {
                        mon.heal(amount);
                    }
                    prop_assert!(mon.current_hp() <= mon.max_hp());
                }
            }
        }
    }

    mod move_tests {
        use super::*;

        #[test]
        fn initial_moves_follow_learnset_order() {
            let learnset = (1..=6)
                .map(|i| LearnableMove {
                    level: i,
                    def: named(&format!("Move{i}")),
                })
                .collect();
            let mon = CreatureRecord::new(CreatureId::new(3), species_with_learnset(learnset), 10);
            assert_eq!(mon.move_count(), 4);
            assert_eq!(mon.move_slot(0).unwrap().def().name, "Move1");
            assert_eq!(mon.move_slot(3).unwrap().def().name, "Move4");
        }

        #[test]
        fn consume_never_underflows() {
            let mut mon = record(5);
            let uses = mon.move_slot(0).unwrap().current_uses();
            for _ in 0..uses {
                assert!(mon.consume_move_use(0));
            }
            assert!(!mon.consume_move_use(0));
            assert_eq!(mon.move_slot(0).unwrap().current_uses(), 0);
            assert!(!mon.consume_move_use(3));
        }

        #[test]
        fn forget_keeps_slots_compacted() {
            let learnset = (1..=4)
                .map(|i| LearnableMove {
                    level: 1,
                    def: named(&format!("Move{i}")),
                })
                .collect();
            let mut mon =
                CreatureRecord::new(CreatureId::new(4), species_with_learnset(learnset), 5);
            mon.forget_move(1);
            assert_eq!(mon.move_count(), 3);
            assert!(mon.moves()[3].is_none());
            assert_eq!(mon.move_slot(1).unwrap().def().name, "Move3");
        }

        #[test]
        fn learning_fifth_move_forgets_oldest() {
            let learnset = (1..=4)
                .map(|i| LearnableMove {
                    level: 1,
                    def: named(&format!("Move{i}")),
                })
                .collect();
            let mut mon =
                CreatureRecord::new(CreatureId::new(5), species_with_learnset(learnset), 5);
            let forgotten = mon.learn_move(named("Fresh"));
            assert_eq!(forgotten.unwrap().name, "Move1");
            assert_eq!(mon.move_slot(0).unwrap().def().name, "Move2");
            assert_eq!(mon.move_slot(3).unwrap().def().name, "Fresh");
        }

        #[test]
        fn restore_all_refills_uses_and_hp() {
            let mut mon = record(5);
            mon.consume_move_use(0);
            mon.apply_damage(5);
            mon.restore_all();
            assert_eq!(mon.current_hp(), mon.max_hp());
            let slot = mon.move_slot(0).unwrap();
            assert_eq!(slot.current_uses(), slot.max_uses());
        }
    }

    mod experience_tests {
        use super::*;

        #[test]
        fn level_up_adds_hp_delta_and_learns_moves() {
            let learnset = vec![
                LearnableMove { level: 1, def: tackle() },
                LearnableMove { level: 6, def: named("Bite") },
            ];
            let mut mon =
                CreatureRecord::new(CreatureId::new(6), species_with_learnset(learnset), 5);
            mon.apply_damage(2);
            let hp_before = mon.current_hp();
            let max_before = mon.max_hp();

            let needed = GrowthRate::MediumFast.experience_for_level(6);
            assert_eq!(mon.gain_experience(needed), 1);

            assert_eq!(mon.level(), 6);
            assert_eq!(mon.current_hp(), hp_before + (mon.max_hp() - max_before));
            assert!(mon.knows_move("Bite"));
        }

        #[test]
        fn level_caps_at_max() {
            let mut mon = record(99);
            mon.gain_experience(u32::MAX);
            assert_eq!(mon.level(), MAX_LEVEL);
        }
    }

    mod serde_tests {
        use super::*;

        fn two_moves() -> CreatureRecord {
            let learnset = vec![
                LearnableMove { level: 1, def: tackle() },
                LearnableMove { level: 1, def: named("Bite") },
            ];
            CreatureRecord::new(CreatureId::new(9), species_with_learnset(learnset), 10)
        }

        #[test]
        fn loaded_hp_is_clamped_to_max() {
            let mon = record(10);
            let mut value = serde_json::to_value(&mon).unwrap();
            value["current_hp"] = serde_json::json!(60_000);

            let mut loaded: CreatureRecord = serde_json::from_value(value).unwrap();
            assert_eq!(loaded.current_hp(), loaded.max_hp());
            assert_eq!(loaded.heal(1), 0);
            assert_eq!(loaded.current_hp(), loaded.max_hp());
        }

        #[test]
        fn loaded_moves_are_compacted_and_uses_clamped() {
            let mon = two_moves();
            let mut value = serde_json::to_value(&mon).unwrap();
            let second = value["moves"][1].clone();
            value["moves"][1] = serde_json::Value::Null;
            value["moves"][2] = second;
            value["moves"][0]["current_uses"] = serde_json::json!(250);

            let loaded: CreatureRecord = serde_json::from_value(value).unwrap();
            assert_eq!(loaded.move_count(), 2);
            assert!(loaded.moves()[1].is_some());
            assert!(loaded.moves()[2].is_none());
            let first = loaded.move_slot(0).unwrap();
            assert_eq!(first.current_uses(), first.max_uses());
        }

        #[test]
        fn valid_record_survives_unchanged() {
            let mut mon = two_moves();
            mon.apply_damage(4);
            let json = serde_json::to_string(&mon).unwrap();
            let loaded: CreatureRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(loaded, mon);
        }
    }
}
