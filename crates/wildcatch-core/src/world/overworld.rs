//! Reference [`World`] implementation.
//!
//! The `Overworld` stores actors in a `BTreeMap` keyed by [`ActorId`] so
//! iteration order is deterministic, and keeps a horizontal
//! [`SpatialIndex`] in sync with every position write for radius queries.
//!
//! Autonomous behaviour (wandering, chasing) lives outside the core. The
//! overworld only models the part the core depends on: a per-actor
//! [`BehaviorState`] that tracks whether the actor is moving and how many
//! decision cycles it has started, so the combat-mode contract can be checked.
//!
//! # Example
//!
//! ```
//! use wildcatch_core::actor::ActorKind;
//! use wildcatch_core::world::{Overworld, Terrain, World};
//! use glam::Vec3;
//!
//! let mut world = Overworld::new(Terrain::flat(0.0));
//! let rock = world.spawn(ActorKind::Prop, Vec3::new(3.0, 0.0, 4.0), 0.5, None);
//!
//! let nearby = world.actors_within(Vec3::ZERO, 5.0);
//! assert_eq!(nearby, vec![rock]);
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::terrain::Terrain;
use super::World;
use crate::actor::{flat, ActorFlags, ActorId, ActorKind, Transform};
use crate::creature::CreatureRecord;

// =============================================================================
// Spatial Index
// =============================================================================

/// Horizontal position index for radius queries.
///
/// Positions are projected onto the xz plane. Results are sorted by id, so
/// the `HashMap` iteration order never leaks into callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: HashMap<ActorId, Vec2>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or moves an actor.
    pub fn insert(&mut self, id: ActorId, position: Vec3) {
        self.positions.insert(id, flat(position));
    }

    /// Removes an actor.
    pub fn remove(&mut self, id: ActorId) {
        self.positions.remove(&id);
    }

    /// Actors within `radius` of `center` on the horizontal plane, sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        let center = flat(center);
        let radius_sq = radius * radius;
        let mut results: Vec<ActorId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();
        results.sort();
        results
    }

    /// Number of indexed actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Actors
// =============================================================================

/// Autonomous behaviour bookkeeping for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehaviorState {
    /// An autonomous move is in progress.
    pub moving: bool,
    /// Number of decision cycles started so far.
    pub decision_cycles: u32,
}

/// One actor in the overworld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldActor {
    /// Classification.
    pub kind: ActorKind,
    /// Position and heading.
    pub transform: Transform,
    /// Status bits.
    pub flags: ActorFlags,
    /// Collider radius.
    pub collider_radius: f32,
    /// Bound creature record.
    pub record: Option<CreatureRecord>,
    /// Autonomous behaviour state.
    pub behavior: BehaviorState,
}

// =============================================================================
// Overworld
// =============================================================================

/// Deterministic in-memory world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overworld {
    next_id: u64,
    actors: BTreeMap<ActorId, WorldActor>,
    spatial: SpatialIndex,
    terrain: Terrain,
}

impl Overworld {
    /// Creates an empty world over `terrain`.
    #[must_use]
    pub fn new(terrain: Terrain) -> Self {
        Self {
            next_id: 1,
            actors: BTreeMap::new(),
            spatial: SpatialIndex::new(),
            terrain,
        }
    }

    /// Adds an actor and starts its first decision cycle.
    pub fn spawn(
        &mut self,
        kind: ActorKind,
        position: Vec3,
        collider_radius: f32,
        record: Option<CreatureRecord>,
    ) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;

        let actor = WorldActor {
            kind,
            transform: Transform::at(position),
            flags: ActorFlags::default(),
            collider_radius,
            record,
            behavior: BehaviorState {
                moving: false,
                decision_cycles: 1,
            },
        };
        self.spatial.insert(id, position);
        self.actors.insert(id, actor);
        id
    }

    /// Read access to an actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&WorldActor> {
        self.actors.get(&id)
    }

    /// Status bits of an actor.
    #[must_use]
    pub fn flags(&self, id: ActorId) -> Option<ActorFlags> {
        self.actors.get(&id).map(|a| a.flags)
    }

    /// Behaviour state of an actor.
    #[must_use]
    pub fn behavior(&self, id: ActorId) -> Option<BehaviorState> {
        self.actors.get(&id).map(|a| a.behavior)
    }

    /// Starts an autonomous move. Ignored while the actor is in combat.
    pub fn begin_wander(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            if !actor.flags.contains(ActorFlags::COMBAT_MODE) {
                actor.behavior.moving = true;
            }
        }
    }

    /// Displaces an actor as an outside force would (knockback, physics).
    pub fn shove(&mut self, id: ActorId, offset: Vec3) {
        if let Some(position) = self.actors.get(&id).map(|a| a.transform.position) {
            self.set_position(id, position + offset);
        }
    }

    /// Actor ids in ascending order.
    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Number of actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// The terrain.
    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// The spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    fn set_flag(&mut self, id: ActorId, flag: ActorFlags, on: bool) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.flags.set(flag, on);
        }
    }
}

impl World for Overworld {
    fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    fn kind(&self, id: ActorId) -> Option<ActorKind> {
        self.actors.get(&id).map(|a| a.kind)
    }

    fn transform(&self, id: ActorId) -> Option<Transform> {
        self.actors.get(&id).map(|a| a.transform)
    }

    fn set_position(&mut self, id: ActorId, position: Vec3) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.transform.position = position;
            self.spatial.insert(id, position);
        }
    }

    fn set_yaw(&mut self, id: ActorId, yaw: f32) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.transform.yaw = yaw;
        }
    }

    fn is_active(&self, id: ActorId) -> bool {
        self.actors
            .get(&id)
            .is_some_and(|a| a.flags.contains(ActorFlags::ACTIVE))
    }

    fn set_active(&mut self, id: ActorId, active: bool) {
        self.set_flag(id, ActorFlags::ACTIVE, active);
    }

    fn set_combat_mode(&mut self, id: ActorId, enabled: bool) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        if actor.flags.contains(ActorFlags::COMBAT_MODE) == enabled {
            return;
        }
        actor.flags.set(ActorFlags::COMBAT_MODE, enabled);
        actor.behavior.moving = false;
        if !enabled {
            actor.behavior.decision_cycles += 1;
        }
        debug!(actor = %id, enabled, "combat mode changed");
    }

    fn in_combat_mode(&self, id: ActorId) -> bool {
        self.actors
            .get(&id)
            .is_some_and(|a| a.flags.contains(ActorFlags::COMBAT_MODE))
    }

    fn set_physics_frozen(&mut self, id: ActorId, frozen: bool) {
        self.set_flag(id, ActorFlags::PHYSICS_FROZEN, frozen);
    }

    fn set_evicting(&mut self, id: ActorId, evicting: bool) {
        self.set_flag(id, ActorFlags::EVICTING, evicting);
    }

    fn collider_radius(&self, id: ActorId) -> Option<f32> {
        self.actors.get(&id).map(|a| a.collider_radius)
    }

    fn actors_within(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        self.spatial.query_radius(center, radius)
    }

    fn record(&self, id: ActorId) -> Option<&CreatureRecord> {
        self.actors.get(&id).and_then(|a| a.record.as_ref())
    }

    fn record_mut(&mut self, id: ActorId) -> Option<&mut CreatureRecord> {
        self.actors.get_mut(&id).and_then(|a| a.record.as_mut())
    }

    fn remove(&mut self, id: ActorId) -> Option<CreatureRecord> {
        self.spatial.remove(id);
        self.actors.remove(&id).and_then(|a| a.record)
    }

    fn ground_probe(&self, origin: Vec3, max_distance: f32) -> Option<Vec3> {
        self.terrain.probe_down(origin, max_distance)
    }

    fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        self.terrain.height_at(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_wild() -> (Overworld, ActorId) {
        let mut world = Overworld::new(Terrain::flat(0.0));
        let id = world.spawn(ActorKind::Wild, Vec3::ZERO, 0.5, None);
        (world, id)
    }

    mod combat_mode_tests {
        use super::*;

        #[test]
        fn entering_cancels_movement() {
            let (mut world, id) = world_with_wild();
            world.begin_wander(id);
            assert!(world.behavior(id).unwrap().moving);

            world.set_combat_mode(id, true);
            assert!(!world.behavior(id).unwrap().moving);
            assert!(world.in_combat_mode(id));

            world.begin_wander(id);
            assert!(!world.behavior(id).unwrap().moving);
        }

        #[test]
        fn toggles_are_reentrant() {
            let (mut world, id) = world_with_wild();
            let cycles = world.behavior(id).unwrap().decision_cycles;

            world.set_combat_mode(id, false);
            assert_eq!(world.behavior(id).unwrap().decision_cycles, cycles);

            world.set_combat_mode(id, true);
            world.set_combat_mode(id, true);
            world.set_combat_mode(id, false);
            world.set_combat_mode(id, false);
            assert_eq!(world.behavior(id).unwrap().decision_cycles, cycles + 1);
            assert!(!world.in_combat_mode(id));
        }

        #[test]
        fn unknown_actor_is_ignored() {
            let (mut world, _) = world_with_wild();
            world.set_combat_mode(ActorId::new(999), true);
            assert!(!world.in_combat_mode(ActorId::new(999)));
        }
    }

    mod spatial_tests {
        use super::*;

        #[test]
        fn query_ignores_height_and_sorts() {
            let mut world = Overworld::new(Terrain::flat(0.0));
            let far = world.spawn(ActorKind::Wild, Vec3::new(20.0, 0.0, 0.0), 0.5, None);
            let high = world.spawn(ActorKind::Wild, Vec3::new(1.0, 50.0, 0.0), 0.5, None);
            let near = world.spawn(ActorKind::Prop, Vec3::new(-1.0, 0.0, 1.0), 0.5, None);

            assert_eq!(world.actors_within(Vec3::ZERO, 5.0), vec![high, near]);

            world.set_position(far, Vec3::new(2.0, 0.0, 0.0));
            assert_eq!(world.actors_within(Vec3::ZERO, 5.0), vec![far, high, near]);
        }

        #[test]
        fn removal_clears_index() {
            let (mut world, id) = world_with_wild();
            assert!(world.remove(id).is_none());
            assert!(world.actors_within(Vec3::ZERO, 100.0).is_empty());
            assert!(!world.contains(id));
            assert!(world.spatial().is_empty());
        }
    }
}
