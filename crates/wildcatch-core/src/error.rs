//! Error types surfaced by the core.
//!
//! None of these are fatal. Operations that the game treats as "silently
//! unavailable" (a second encounter, a second concurrent throw, an empty
//! move slot) still report *why* through these types and log at `warn`, so
//! callers can ignore the `Err` without leaving anything half-applied.

use crate::actor::ActorId;
use crate::creature::CreatureRecord;
use crate::inventory::ItemId;

/// Errors from starting, driving or ending an encounter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncounterError {
    /// An encounter is already running.
    #[error("an encounter is already active")]
    AlreadyActive,

    /// The actor does not exist in the world.
    #[error("actor {0} is missing from the world")]
    MissingActor(ActorId),

    /// The actor exists but has no creature record bound to it.
    #[error("actor {0} has no creature record")]
    MissingRecord(ActorId),

    /// Both sides of the request name the same actor.
    #[error("actor {0} cannot fight itself")]
    SameActor(ActorId),

    /// The enemy is hidden or a capture device is still deciding its fate.
    #[error("actor {0} is unavailable while hidden or targeted by a capture")]
    TargetBusy(ActorId),

    /// The operation needs an active encounter.
    #[error("no encounter is active")]
    NoActiveEncounter,

    /// A player action is already waiting to be executed.
    #[error("a player action is already queued")]
    ActionAlreadyQueued,
}

/// Errors from the capture protocol.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    /// Another capture attempt already holds the encounter latch.
    #[error("a capture attempt is already in flight for this encounter")]
    LatchHeld,

    /// The inventory has none of this item left.
    #[error("capture item {0} is not available")]
    ItemUnavailable(ItemId),

    /// The inventory reported stock but refused to hand one over.
    #[error("inventory refused to consume capture item {0}")]
    ConsumeRefused(ItemId),

    /// The struck creature has no record to capture.
    #[error("actor {0} has no creature record to capture")]
    NoTargetRecord(ActorId),
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value outside its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable constraint.
        reason: String,
    },
}

/// Errors from party/box storage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    /// Party and every box are full; the record is handed back.
    #[error("party and storage boxes are full; {} was not stored", .0.species().name)]
    Full(Box<CreatureRecord>),
}
