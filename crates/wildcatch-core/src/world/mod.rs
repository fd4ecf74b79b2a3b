//! World collaborator: live actors, their transforms and the terrain.
//!
//! The core never owns world actors. Encounters and capture sessions hold
//! [`ActorId`]s and read or write the live transforms through [`World`], so
//! every position change lands on the real actor rather than a copy.
//!
//! Creature records are bound to their actors in the world. The core borrows
//! them through [`World::record`] / [`World::record_mut`] for the duration of
//! a single operation and takes ownership only when a capture succeeds
//! ([`World::remove`]).
//!
//! # Modules
//!
//! - [`overworld`]: Deterministic in-memory reference world
//! - [`terrain`]: Heightfield with plateaus for ground probes

pub mod overworld;
pub mod terrain;

pub use overworld::{BehaviorState, Overworld, SpatialIndex, WorldActor};
pub use terrain::{Plateau, Terrain};

use glam::Vec3;

use crate::actor::{flat, ActorId, ActorKind, Transform};
use crate::creature::CreatureRecord;

/// Live actor access required by encounters and capture sessions.
///
/// Calls naming an unknown actor are no-ops (mutators) or return `None` /
/// `false` (queries). Implementations must honour the combat-mode contract:
///
/// - `set_combat_mode(id, true)` cancels in-flight autonomous movement and
///   suspends decisions; calling it again is a no-op.
/// - `set_combat_mode(id, false)` starts one fresh decision cycle; calling it
///   on an actor not in combat is a no-op.
pub trait World {
    /// True when the actor exists.
    fn contains(&self, id: ActorId) -> bool;

    /// Classification of the actor.
    fn kind(&self, id: ActorId) -> Option<ActorKind>;

    /// Current transform.
    fn transform(&self, id: ActorId) -> Option<Transform>;

    /// Moves the actor.
    fn set_position(&mut self, id: ActorId, position: Vec3);

    /// Turns the actor.
    fn set_yaw(&mut self, id: ActorId, yaw: f32);

    /// True when the actor is present (visible and collidable).
    fn is_active(&self, id: ActorId) -> bool;

    /// Shows or hides the actor.
    fn set_active(&mut self, id: ActorId, active: bool);

    /// Suspends or resumes autonomous behaviour.
    fn set_combat_mode(&mut self, id: ActorId, enabled: bool);

    /// True while autonomous behaviour is suspended.
    fn in_combat_mode(&self, id: ActorId) -> bool;

    /// Freezes or thaws rigid-body simulation.
    fn set_physics_frozen(&mut self, id: ActorId, frozen: bool);

    /// Marks or clears the "being evicted" status.
    fn set_evicting(&mut self, id: ActorId, evicting: bool);

    /// Radius of the actor's collider.
    fn collider_radius(&self, id: ActorId) -> Option<f32>;

    /// Actors whose horizontal distance to `center` is at most `radius`,
    /// in ascending id order.
    fn actors_within(&self, center: Vec3, radius: f32) -> Vec<ActorId>;

    /// Creature record bound to the actor.
    fn record(&self, id: ActorId) -> Option<&CreatureRecord>;

    /// Mutable creature record bound to the actor.
    fn record_mut(&mut self, id: ActorId) -> Option<&mut CreatureRecord>;

    /// Permanently removes the actor, returning its record if it had one.
    fn remove(&mut self, id: ActorId) -> Option<CreatureRecord>;

    /// Casts straight down from `origin` and returns the first ground point
    /// within `max_distance`.
    fn ground_probe(&self, origin: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Samples the terrain heightfield directly.
    fn ground_height(&self, x: f32, z: f32) -> Option<f32>;
}

/// Collider centre of an actor standing at `position` with `radius`.
///
/// Actor positions are at their feet; colliders sit on top of that point.
#[must_use]
pub fn collider_centre(position: Vec3, radius: f32) -> Vec3 {
    position + Vec3::Y * radius
}

/// Moves an actor horizontally towards `target` by at most `max_step`,
/// keeping its height.
///
/// Returns the horizontal distance still to go.
pub fn step_towards(world: &mut dyn World, id: ActorId, target: Vec3, max_step: f32) -> f32 {
    let Some(position) = world.transform(id).map(|t| t.position) else {
        return 0.0;
    };
    let delta = flat(target) - flat(position);
    let distance = delta.length();
    if distance <= max_step {
        world.set_position(id, Vec3::new(target.x, position.y, target.z));
        return 0.0;
    }
    let step = delta / distance * max_step;
    world.set_position(
        id,
        Vec3::new(position.x + step.x, position.y, position.z + step.y),
    );
    distance - max_step
}
