//! Actor identity and transform types shared by the core and the world.
//!
//! This module provides the handle types the core uses to talk about live
//! world actors without owning them:
//! - [`ActorId`]: Unique identifier for a world actor
//! - [`ActorKind`]: Classification used by eviction and capture targeting
//! - [`ActorFlags`]: Status bits (active, combat mode, frozen physics, evicting)
//! - [`Transform`]: Position plus horizontal heading
//!
//! # Coordinates
//!
//! The world is y-up. "Horizontal" always means the xz plane; arena geometry
//! and facing ignore height entirely.
//!
//! # Example
//!
//! ```
//! use wildcatch_core::actor::{ActorId, Transform};
//! use glam::Vec3;
//!
//! let id = ActorId::new(7);
//! assert_eq!(id.as_u64(), 7);
//!
//! let mut transform = Transform::at(Vec3::new(0.0, 1.0, 0.0));
//! transform.face(Vec3::new(0.0, 5.0, 10.0));
//! assert!(transform.yaw.abs() < 1e-5);
//! ```

use bitflags::bitflags;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a world actor.
///
/// `ActorId` is a newtype wrapper around `u64`. Ids are assigned by the world
/// collaborator and are stable for the actor's lifetime.
///
/// # Ordering
///
/// Actor ids are ordered by their numeric value, which the reference world
/// uses for deterministic iteration.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new `ActorId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ActorId> for u64 {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

/// Classification of a world actor.
///
/// # Variants
///
/// - `Wild`: Free-roaming creature; may be engaged, evicted or captured
/// - `Companion`: The player's summoned creature
/// - `Trainer`: The player character; leashed to the arena during encounters
/// - `Prop`: Anything else with a collider (rocks, fences)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Free-roaming wild creature
    Wild,
    /// Player-summoned creature
    Companion,
    /// The player character
    Trainer,
    /// Static scenery with a collider
    Prop,
}

impl ActorKind {
    /// Returns true for actors that carry a creature record.
    #[must_use]
    pub const fn is_creature(self) -> bool {
        matches!(self, Self::Wild | Self::Companion)
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wild => write!(f, "Wild"),
            Self::Companion => write!(f, "Companion"),
            Self::Trainer => write!(f, "Trainer"),
            Self::Prop => write!(f, "Prop"),
        }
    }
}

bitflags! {
    /// Status bits for a world actor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ActorFlags: u8 {
        /// Present in the world (visible, collidable).
        const ACTIVE = 1 << 0;
        /// Autonomous behaviour suspended.
        const COMBAT_MODE = 1 << 1;
        /// Rigid-body simulation frozen.
        const PHYSICS_FROZEN = 1 << 2;
        /// Being pushed out of an arena ring.
        const EVICTING = 1 << 3;
    }
}

impl Default for ActorFlags {
    fn default() -> Self {
        Self::ACTIVE
    }
}

/// Position and horizontal heading of an actor.
///
/// `yaw` is measured in radians around +y, with `0.0` facing +z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// World position (y-up).
    pub position: Vec3,
    /// Heading around the vertical axis in radians.
    pub yaw: f32,
}

impl Transform {
    /// Creates a transform at `position` facing +z.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self { position, yaw: 0.0 }
    }

    /// Creates a transform with an explicit heading.
    #[must_use]
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Turns to face `point` on the horizontal plane.
    ///
    /// Does nothing when `point` is (horizontally) on top of the actor.
    pub fn face(&mut self, point: Vec3) {
        if let Some(yaw) = yaw_towards(self.position, point) {
            self.yaw = yaw;
        }
    }

    /// Unit forward vector on the horizontal plane.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

/// Projects a point onto the horizontal plane.
#[must_use]
pub fn flat(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Horizontal distance between two points.
#[must_use]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flat(a).distance(flat(b))
}

/// Heading that looks from `from` towards `to`, or `None` when degenerate.
#[must_use]
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let dir = flat(to) - flat(from);
    if dir.length_squared() > 1e-5 {
        Some(dir.x.atan2(dir.y))
    } else {
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
