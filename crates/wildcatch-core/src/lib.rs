//! # Wildcatch Core
//!
//! Encounter, turn and capture core for a creature-collecting game.
//!
//! This crate turns a chance meeting between a player-controlled creature and a
//! wild creature into a deterministic sequence of turns, move resolution, and a
//! probabilistic capture mini-game, while pausing and resuming the world actors
//! that take part.
//!
//! ## Architecture
//!
//! Everything is driven by the host's per-tick update. Nothing here blocks or
//! spawns threads: every "wait" is a stored continuation state advanced by
//! [`EncounterService::tick`](service::EncounterService::tick).
//!
//! - **Leaves**: [`combatant`], [`move_resolver`], [`capture_resolver`], [`projectile`]
//! - **Turn layer**: [`turn`] arbitrates actions and applies move results
//! - **Encounter layer**: [`encounter`] owns the arena ring and the turn loop
//! - **Capture layer**: [`capture`] flies a capture device and runs the shake sequence
//! - **Root**: [`service`] owns the active encounter, the capture latch and the RNG
//!
//! Collaborators (world actors, inventory, party storage) are reached only
//! through the traits in [`world`], [`inventory`] and [`storage`]. Each module
//! also ships a small in-memory reference implementation used by tests and by
//! the headless driver.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wildcatch_core::service::{Collaborators, EncounterService};
//! use wildcatch_core::encounter::EncounterRequest;
//! use wildcatch_core::config::WildcatchConfig;
//!
//! let mut service = EncounterService::new(WildcatchConfig::default(), 42);
//! service.start_encounter(&mut world, EncounterRequest::new(player, wild), None)?;
//! loop {
//!     service.tick(&mut Collaborators::new(&mut world, &mut satchel, &mut party), 1.0 / 60.0);
//!     for event in service.drain_events() { /* drive UI */ }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actor;
pub mod capture;
pub mod capture_resolver;
pub mod combatant;
pub mod config;
pub mod creature;
pub mod encounter;
pub mod error;
pub mod event;
pub mod inventory;
pub mod move_resolver;
pub mod projectile;
pub mod rng;
pub mod service;
pub mod storage;
pub mod turn;
pub mod world;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use actor::{ActorFlags, ActorId, ActorKind, Transform};
pub use config::WildcatchConfig;
pub use creature::{CreatureId, CreatureRecord, MoveDef, Species};
pub use encounter::{EncounterRequest, EncounterResult, EncounterState};
pub use error::{CaptureError, ConfigError, EncounterError, StorageError};
pub use event::EncounterEvent;
pub use service::{Collaborators, EncounterService};
pub use turn::TurnAction;
