//! Turn actions, the player's pending-action slot, and action execution.
//!
//! The [`TurnController`] is owned by an encounter. It never decides *when* a
//! turn happens; the encounter's state machine calls
//! [`TurnController::take_player_decision`] while waiting on the player and
//! [`TurnController::execute`] once an action is known.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::combatant::{Combatant, Side};
use crate::config::TurnPacing;
use crate::creature::{CreatureId, CreatureRecord, MoveDef};
use crate::error::EncounterError;
use crate::event::{ActionOutcome, WasteReason};
use crate::move_resolver::{accuracy_check, has_stab, roll_damage, TypeChart};
use crate::rng::Dice;
use crate::world::World;

/// One side's choice for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnAction {
    /// Use the move in this slot.
    UseMove(usize),
    /// Run from the encounter.
    Flee,
    /// Spend the turn on a capture (the physical throw goes through the service).
    AttemptCapture,
    /// Swap in another party member; spends the turn.
    SwitchTo(CreatureId),
}

/// What the player side supplied for its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerDecision {
    /// An explicit action.
    Action(TurnAction),
    /// The turn was spent elsewhere, e.g. on a failed capture.
    Consumed,
}

/// Result of executing an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Execution {
    /// What happened.
    pub outcome: ActionOutcome,
    /// Presentation pause before the next phase.
    pub delay: f32,
}

/// Pending-action bookkeeping and action execution for one encounter.
#[derive(Debug, Clone)]
pub struct TurnController {
    player: Combatant,
    enemy: Combatant,
    queued: Option<TurnAction>,
    consumed: bool,
}

impl TurnController {
    /// Creates a controller for two combatants.
    #[must_use]
    pub const fn new(player: Combatant, enemy: Combatant) -> Self {
        Self {
            player,
            enemy,
            queued: None,
            consumed: false,
        }
    }

    /// The player-side combatant.
    #[must_use]
    pub const fn player(&self) -> Combatant {
        self.player
    }

    /// The enemy-side combatant.
    #[must_use]
    pub const fn enemy(&self) -> Combatant {
        self.enemy
    }

    /// The combatant fighting for `side`.
    #[must_use]
    pub const fn combatant(&self, side: Side) -> Combatant {
        match side {
            Side::Player => self.player,
            Side::Enemy => self.enemy,
        }
    }

    /// Stores the player's action for the current or next player turn.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::ActionAlreadyQueued`] if an action is
    /// already waiting.
    pub fn queue_player_action(&mut self, action: TurnAction) -> Result<(), EncounterError> {
        if self.queued.is_some() {
            return Err(EncounterError::ActionAlreadyQueued);
        }
        self.queued = Some(action);
        Ok(())
    }

    /// Marks the player's current or next turn as already spent.
    pub fn consume_player_turn(&mut self) {
        self.consumed = true;
    }

    /// True when an action or a consumed flag is waiting.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.queued.is_some() || self.consumed
    }

    /// Takes whatever the player supplied. A consumed flag wins over a queued
    /// action, which is then dropped.
    pub fn take_player_decision(&mut self) -> Option<PlayerDecision> {
        if std::mem::take(&mut self.consumed) {
            if let Some(dropped) = self.queued.take() {
                debug!(?dropped, "queued action dropped, turn already consumed");
            }
            return Some(PlayerDecision::Consumed);
        }
        self.queued.take().map(PlayerDecision::Action)
    }

    /// Clears any pending player input.
    pub fn clear(&mut self) {
        self.queued = None;
        self.consumed = false;
    }

    /// Picks the enemy's action. `None` means nothing is usable.
    pub fn choose_enemy_action(
        &self,
        world: &dyn World,
        dice: &mut dyn Dice,
    ) -> Option<TurnAction> {
        let record = self.enemy.record(world)?;
        choose_move(record, dice).map(TurnAction::UseMove)
    }

    /// Executes `action` for `side`.
    pub fn execute(
        &self,
        side: Side,
        action: TurnAction,
        world: &mut dyn World,
        chart: &dyn TypeChart,
        dice: &mut dyn Dice,
        pacing: &TurnPacing,
    ) -> Execution {
        let outcome = match action {
            TurnAction::UseMove(index) => self.execute_move(side, index, world, chart, dice),
            TurnAction::Flee => ActionOutcome::Fled,
            TurnAction::AttemptCapture | TurnAction::SwitchTo(_) => ActionOutcome::TurnConsumed,
        };
        Execution {
            outcome,
            delay: delay_for(outcome, pacing),
        }
    }

    fn execute_move(
        &self,
        side: Side,
        index: usize,
        world: &mut dyn World,
        chart: &dyn TypeChart,
        dice: &mut dyn Dice,
    ) -> ActionOutcome {
        let attacker = self.combatant(side);
        let defender = self.combatant(side.opponent());

        let def: Arc<MoveDef> = match attacker.record(world).map(|r| r.move_slot(index)) {
            Some(Some(slot)) => Arc::clone(slot.def()),
            _ => {
                warn!(%side, slot = index, "move slot is empty, turn wasted");
                return ActionOutcome::Wasted(WasteReason::EmptySlot);
            }
        };

        let consumed = world
            .record_mut(attacker.actor())
            .is_some_and(|record| record.consume_move_use(index));
        if !consumed {
            warn!(%side, mv = %def.name, "move has no uses left, turn wasted");
            return ActionOutcome::Wasted(WasteReason::NoUsesLeft);
        }

        if !accuracy_check(def.accuracy, dice) {
            info!(%side, mv = %def.name, "move missed");
            return ActionOutcome::Missed;
        }

        let roll = match (attacker.record(world), defender.record(world)) {
            (Some(a), Some(d)) => roll_damage(a, d, &def, chart, dice),
            _ => return ActionOutcome::Missed,
        };
        let damage = defender.apply_damage(world, roll.amount);
        info!(
            %side,
            mv = %def.name,
            damage,
            critical = roll.critical,
            "move hit"
        );
        ActionOutcome::Hit {
            damage,
            critical: roll.critical,
        }
    }
}

fn delay_for(outcome: ActionOutcome, pacing: &TurnPacing) -> f32 {
    match outcome {
        ActionOutcome::Hit { .. } => pacing.move_hit,
        ActionOutcome::Missed => pacing.move_miss,
        ActionOutcome::Wasted(_) | ActionOutcome::Skipped => pacing.wasted,
        ActionOutcome::TurnConsumed => pacing.non_move,
        ActionOutcome::Fled => 0.0,
    }
}

/// Heuristic move choice for a wild creature.
///
/// Usable damaging moves are weighted by `max(1, power) · accuracy/100 · stab`
/// and drawn at random. Without one, a usable status move is picked
/// uniformly. Returns `None` when no move has uses left.
pub fn choose_move(record: &CreatureRecord, dice: &mut dyn Dice) -> Option<usize> {
    let usable = || {
        record
            .moves()
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().filter(|s| s.is_usable()).map(|s| (i, s)))
    };

    let weighted: Vec<(usize, f32)> = usable()
        .filter(|(_, slot)| slot.def().is_damaging())
        .map(|(i, slot)| {
            let def = slot.def();
            let stab = if has_stab(record.species(), def) { 1.5 } else { 1.0 };
            let accuracy = f32::from(def.accuracy.clamp(1, 100)) / 100.0;
            let score = f32::from(def.power.max(1)) * accuracy * stab;
            (i, score)
        })
        .collect();

    if !weighted.is_empty() {
        let total: f32 = weighted.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Some(weighted[dice.index(weighted.len())].0);
        }
        let mut pick = dice.unit() * total;
        for &(i, w) in &weighted {
            if pick < w {
                return Some(i);
            }
            pick -= w;
        }
        return weighted.last().map(|(i, _)| *i);
    }

    let status: Vec<usize> = usable().map(|(i, _)| i).collect();
    if status.is_empty() {
        None
    } else {
        Some(status[dice.index(status.len())])
    }
}
