//! Factories and a small scene harness shared by the tests.

use std::sync::Arc;

use glam::Vec3;

use crate::actor::{ActorId, ActorKind};
use crate::capture::CaptureId;
use crate::config::WildcatchConfig;
use crate::creature::{
    BaseStats, BehaviorKind, CreatureId, CreatureRecord, ElementType, GrowthRate, LearnableMove,
    MoveCategory, MoveDef, Species,
};
use crate::encounter::{Encounter, EncounterId, EncounterRequest, EncounterResult};
use crate::error::CaptureError;
use crate::event::EncounterEvent;
use crate::inventory::{CaptureItem, Satchel};
use crate::projectile::{LaunchParams, FIXED_DT};
use crate::service::{Collaborators, EncounterService};
use crate::storage::PartyStorage;
use crate::turn::TurnAction;
use crate::world::{Overworld, Terrain, World};

// =============================================================================
// Data factories
// =============================================================================

/// A move; zero power makes it a status move.
pub fn mv(name: &str, element: ElementType, power: u16, accuracy: u8, uses: u8) -> Arc<MoveDef> {
    let category = if power == 0 {
        MoveCategory::Status
    } else {
        MoveCategory::Physical
    };
    Arc::new(MoveDef::new(name, element, category, power, accuracy, uses))
}

/// Flat base stats.
pub fn even_stats(value: u16) -> BaseStats {
    BaseStats {
        hp: value,
        attack: value,
        defense: value,
        sp_attack: value,
        sp_defense: value,
        speed: value,
    }
}

/// A species whose learnset unlocks every move at level 1.
pub fn species(
    name: &str,
    element: ElementType,
    catch_rate: f32,
    base_stats: BaseStats,
    moves: Vec<Arc<MoveDef>>,
) -> Arc<Species> {
    Arc::new(Species {
        name: name.to_string(),
        primary_type: element,
        secondary_type: None,
        catch_rate,
        base_stats,
        behavior: BehaviorKind::Friendly,
        growth_rate: GrowthRate::MediumFast,
        learnset: moves
            .into_iter()
            .map(|def| LearnableMove { level: 1, def })
            .collect(),
    })
}

/// A plain grass species with a single tackle.
pub fn sample_species() -> Arc<Species> {
    species_with_catch_rate(0.5)
}

/// [`sample_species`] with a custom catch rate.
pub fn species_with_catch_rate(catch_rate: f32) -> Arc<Species> {
    species(
        "Sproutle",
        ElementType::Grass,
        catch_rate,
        even_stats(50),
        vec![mv("Tackle", ElementType::Normal, 40, 100, 35)],
    )
}

/// A record of `species` at `level` with perfect IVs.
pub fn record_of(id: u64, species: &Arc<Species>, level: u8) -> CreatureRecord {
    CreatureRecord::new(CreatureId::new(id), Arc::clone(species), level)
}

/// A record whose species knows exactly `moves`.
pub fn creature_with_moves(
    id: u64,
    element: ElementType,
    level: u8,
    moves: Vec<Arc<MoveDef>>,
) -> CreatureRecord {
    let species = species("Testling", element, 0.5, even_stats(50), moves);
    record_of(id, &species, level)
}

// =============================================================================
// Scene
// =============================================================================

/// Item id stocked in every scene's satchel.
pub const ORB: &str = "orb";

/// A flat overworld with a trainer, the player's creature and one wild
/// creature, plus a service and collaborators to drive them.
pub struct Scene {
    pub world: Overworld,
    pub satchel: Satchel,
    pub storage: PartyStorage,
    pub service: EncounterService,
    pub trainer: ActorId,
    pub player: ActorId,
    pub enemy: ActorId,
    /// Every event drained so far, in order.
    pub log: Vec<EncounterEvent>,
}

impl Scene {
    /// Builds a scene from the two records.
    pub fn new(seed: u64, player: CreatureRecord, enemy: CreatureRecord) -> Self {
        Self::with_config(seed, WildcatchConfig::default(), player, enemy)
    }

    /// Builds a scene with a custom config.
    pub fn with_config(
        seed: u64,
        config: WildcatchConfig,
        player: CreatureRecord,
        enemy: CreatureRecord,
    ) -> Self {
        let mut world = Overworld::new(Terrain::flat(0.0));
        let trainer = world.spawn(ActorKind::Trainer, Vec3::new(0.0, 0.0, -5.0), 0.4, None);
        let player = world.spawn(
            ActorKind::Companion,
            Vec3::new(0.0, 0.0, -3.0),
            0.5,
            Some(player),
        );
        let enemy = world.spawn(ActorKind::Wild, Vec3::new(0.0, 0.0, 3.0), 0.5, Some(enemy));
        let mut satchel = Satchel::new();
        satchel.add(ORB, 5);

        Self {
            world,
            satchel,
            storage: PartyStorage::new(),
            service: EncounterService::new(config, seed),
            trainer,
            player,
            enemy,
            log: Vec::new(),
        }
    }

    /// Two evenly matched level-10 creatures; the wild one has `catch_rate`.
    pub fn duel(seed: u64, catch_rate: f32) -> Self {
        let ours = sample_species();
        let theirs = species_with_catch_rate(catch_rate);
        Self::new(seed, record_of(1, &ours, 10), record_of(2, &theirs, 10))
    }

    /// The standard request, trainer included.
    pub fn request(&self) -> EncounterRequest {
        EncounterRequest::new(self.player, self.enemy).with_trainer(self.trainer)
    }

    /// Starts the standard encounter.
    pub fn start(&mut self) -> EncounterId {
        let request = self.request();
        let id = self
            .service
            .start_encounter(&mut self.world, request, None)
            .expect("encounter should start");
        self.drain();
        id
    }

    /// One fixed step.
    pub fn tick(&mut self) {
        let mut collab = Collaborators::new(&mut self.world, &mut self.satchel, &mut self.storage);
        self.service.tick(&mut collab, FIXED_DT);
        self.drain();
    }

    /// Ticks until `done` holds, at most `max` times. Returns whether it held.
    pub fn tick_until(&mut self, max: usize, mut done: impl FnMut(&Self) -> bool) -> bool {
        for _ in 0..max {
            if done(self) {
                return true;
            }
            self.tick();
        }
        done(self)
    }

    /// Ticks through positioning until the first player turn waits for input.
    pub fn reach_player_turn(&mut self) {
        assert!(
            self.tick_until(600, Self::awaiting_player),
            "player turn never started"
        );
    }

    /// True while the encounter waits for the player.
    pub fn awaiting_player(&self) -> bool {
        self.service
            .active_encounter()
            .is_some_and(Encounter::awaiting_player)
    }

    /// Throws `item` from above the player's creature at the wild one.
    pub fn throw(&mut self, item: &CaptureItem) -> Result<CaptureId, CaptureError> {
        let from = self.position(self.player) + Vec3::Y * 1.5;
        let to = self.position(self.enemy) + Vec3::Y * 0.5;
        let mut collab = Collaborators::new(&mut self.world, &mut self.satchel, &mut self.storage);
        let result = self.service.throw_capture_item(
            item,
            LaunchParams::ballistic(from, to, 1.0),
            self.enemy,
            &mut collab,
        );
        self.drain();
        result
    }

    /// Plays `UseMove(0)` on every player turn until the encounter ends.
    pub fn fight(&mut self, max_ticks: usize) -> Option<EncounterResult> {
        for _ in 0..max_ticks {
            if let Some(result) = self.result() {
                return Some(result);
            }
            if self.awaiting_player() {
                self.service
                    .queue_player_action(TurnAction::UseMove(0))
                    .expect("queue move");
            }
            self.tick();
        }
        self.result()
    }

    /// Live position of `actor`.
    pub fn position(&self, actor: ActorId) -> Vec3 {
        self.world
            .transform(actor)
            .map(|t| t.position)
            .expect("actor exists")
    }

    /// Result from the logged `EncounterEnded`, if any.
    pub fn result(&self) -> Option<EncounterResult> {
        self.log.iter().find_map(|e| match e {
            EncounterEvent::EncounterEnded { result, .. } => Some(*result),
            _ => None,
        })
    }

    /// Number of logged events matching `pred`.
    pub fn count(&self, pred: impl Fn(&EncounterEvent) -> bool) -> usize {
        self.log.iter().filter(|e| pred(e)).count()
    }

    /// Moves queued service events into the log.
    pub fn drain(&mut self) {
        self.log.extend(self.service.drain_events());
    }
}

/// Default capture device with `multiplier`.
pub fn orb(multiplier: f32) -> CaptureItem {
    CaptureItem::new(ORB, "Orb", multiplier)
}
