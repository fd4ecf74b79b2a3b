//! Binding of one creature record to one live world actor.
//!
//! A [`Combatant`] owns neither the actor nor the record. It holds the actor
//! id and a side tag, and every operation goes through the [`World`] so that
//! position writes hit the real transform.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::actor::{yaw_towards, ActorId};
use crate::creature::CreatureRecord;
use crate::world::{step_towards, World};

/// Which side of an encounter a combatant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player's creature.
    Player,
    /// The wild creature.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy => write!(f, "enemy"),
        }
    }
}

/// One side of an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combatant {
    actor: ActorId,
    side: Side,
}

impl Combatant {
    /// Binds `actor` to `side`.
    #[must_use]
    pub const fn new(actor: ActorId, side: Side) -> Self {
        Self { actor, side }
    }

    /// The bound actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// The side this combatant fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// True for the player's creature.
    #[must_use]
    pub const fn is_player_side(&self) -> bool {
        matches!(self.side, Side::Player)
    }

    /// Current position of the live actor.
    #[must_use]
    pub fn position(&self, world: &dyn World) -> Option<Vec3> {
        world.transform(self.actor).map(|t| t.position)
    }

    /// Writes the live actor's position.
    pub fn set_position(&self, world: &mut dyn World, position: Vec3) {
        world.set_position(self.actor, position);
    }

    /// Turns the live actor towards `point` on the horizontal plane.
    pub fn face(&self, world: &mut dyn World, point: Vec3) {
        let Some(position) = self.position(world) else {
            return;
        };
        if let Some(yaw) = yaw_towards(position, point) {
            world.set_yaw(self.actor, yaw);
        }
    }

    /// Moves horizontally towards `target` by at most `max_step`, keeping height.
    ///
    /// Returns the remaining horizontal distance.
    pub fn step_towards(&self, world: &mut dyn World, target: Vec3, max_step: f32) -> f32 {
        step_towards(world, self.actor, target, max_step)
    }

    /// The bound creature record.
    #[must_use]
    pub fn record<'w>(&self, world: &'w dyn World) -> Option<&'w CreatureRecord> {
        world.record(self.actor)
    }

    /// Removes HP and hides the actor if it faints. Returns HP removed.
    pub fn apply_damage(&self, world: &mut dyn World, amount: u16) -> u16 {
        let Some(record) = world.record_mut(self.actor) else {
            return 0;
        };
        let dealt = record.apply_damage(amount);
        let fainted = record.is_fainted();
        if fainted {
            debug!(actor = %self.actor, side = %self.side, "combatant fainted, hiding actor");
            world.set_active(self.actor, false);
        }
        dealt
    }

    /// Restores HP. Returns HP restored.
    pub fn heal(&self, world: &mut dyn World, amount: u16) -> u16 {
        world
            .record_mut(self.actor)
            .map_or(0, |record| record.heal(amount))
    }

    /// True at 0 HP. A combatant whose record has vanished counts as fainted.
    #[must_use]
    pub fn is_fainted(&self, world: &dyn World) -> bool {
        world.record(self.actor).map_or(true, CreatureRecord::is_fainted)
    }
}
