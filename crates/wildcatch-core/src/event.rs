//! Notifications emitted by the core for the host (UI, audio, logging).
//!
//! Events are queued on the [`EncounterService`](crate::service::EncounterService)
//! during `tick` and the capture protocol calls, and handed over in emission
//! order by `drain_events`. They are informational only: nothing in the core
//! waits on a host reaction to an event.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::capture::CaptureId;
use crate::combatant::Side;
use crate::encounter::{EncounterId, EncounterResult};
use crate::inventory::ItemId;
use crate::turn::TurnAction;

/// Why a move did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WasteReason {
    /// The selected slot holds no move.
    EmptySlot,
    /// The move has no uses left.
    NoUsesLeft,
}

/// What executing a turn action produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The move connected.
    Hit {
        /// HP removed from the defender.
        damage: u16,
        /// A critical hit was rolled.
        critical: bool,
    },
    /// The move failed its accuracy check.
    Missed,
    /// Nothing happened.
    Wasted(WasteReason),
    /// The player ran away.
    Fled,
    /// The turn was spent without a move (capture, switch, or failed throw).
    TurnConsumed,
    /// The enemy had nothing usable.
    Skipped,
}

/// Why a throw was refused before launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Another attempt holds the encounter latch.
    LatchHeld,
    /// No units of the item left.
    ItemUnavailable,
    /// The inventory refused to hand one over.
    ConsumeRefused,
}

/// Why an attempt failed outside the capture roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    /// It landed on the ground and rolled to a stop.
    Terrain,
    /// The safety lifetime ran out.
    Timeout,
    /// The struck creature had no record.
    NoRecord,
    /// Storage had no room for the creature.
    StorageFull,
}

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterEvent {
    /// Both combatants were bound and positioning began.
    EncounterStarted {
        /// Encounter.
        encounter: EncounterId,
        /// Player creature actor.
        player: ActorId,
        /// Wild creature actor.
        enemy: ActorId,
        /// Arena centre.
        center: Vec3,
    },
    /// The player should pick an action.
    PlayerTurnStarted {
        /// Encounter.
        encounter: EncounterId,
        /// 1-based turn number.
        turn: u32,
    },
    /// The enemy is about to act.
    EnemyTurnStarted {
        /// Encounter.
        encounter: EncounterId,
        /// 1-based turn number.
        turn: u32,
    },
    /// An action was executed.
    ActionResolved {
        /// Encounter.
        encounter: EncounterId,
        /// Acting side.
        side: Side,
        /// The action, or `None` when the enemy skipped or the player turn was already spent.
        action: Option<TurnAction>,
        /// What happened.
        outcome: ActionOutcome,
    },
    /// A combatant reached 0 HP.
    CombatantFainted {
        /// Encounter.
        encounter: EncounterId,
        /// Side that fainted.
        side: Side,
        /// Actor that fainted.
        actor: ActorId,
    },
    /// A capture device left the thrower's hand.
    CaptureLaunched {
        /// Session.
        session: CaptureId,
        /// Device thrown.
        item: ItemId,
        /// Intended target.
        target: ActorId,
    },
    /// The device struck its target and started shaking.
    CaptureStruck {
        /// Session.
        session: CaptureId,
        /// Creature struck.
        target: ActorId,
        /// Where the device came to rest.
        rest: Vec3,
    },
    /// One shake began.
    CaptureShake {
        /// Session.
        session: CaptureId,
        /// 1-based shake index.
        shake: u8,
    },
    /// The shakes finished and the outcome is known.
    CaptureResolved {
        /// Session.
        session: CaptureId,
        /// Creature targeted.
        target: ActorId,
        /// The creature was caught.
        success: bool,
        /// Number of shakes played.
        shakes: u8,
        /// Probability used.
        chance: f32,
    },
    /// The attempt failed for a reason other than the capture roll.
    CaptureMissed {
        /// Session.
        session: CaptureId,
        /// Why.
        reason: MissReason,
    },
    /// A throw was refused before launch; nothing was consumed.
    CaptureRejected {
        /// Device requested.
        item: ItemId,
        /// Why.
        reason: RejectReason,
    },
    /// An in-flight session was cancelled by a forced end.
    CaptureAborted {
        /// Session.
        session: CaptureId,
    },
    /// The encounter reached a terminal result. Emitted once per encounter.
    EncounterEnded {
        /// Encounter.
        encounter: EncounterId,
        /// Terminal result.
        result: EncounterResult,
    },
}
