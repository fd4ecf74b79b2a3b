//! Root-owned encounter service.
//!
//! The host constructs one [`EncounterService`] and drives it once per frame
//! with [`EncounterService::tick`]. It owns everything that must be unique:
//!
//! - the active encounter (at most one)
//! - the encounter's capture latch (at most one attempt in flight)
//! - the capture sessions still flying, shaking or lingering
//! - the seeded RNG, so identical seeds and inputs replay identically
//! - the event queue handed to the host by [`EncounterService::drain_events`]
//!
//! Collaborators are borrowed per call through [`Collaborators`]; the service
//! never holds on to them.
//!
//! # Capture protocol
//!
//! Every capture attempt follows the same three calls:
//!
//! 1. [`begin_capture_attempt`](EncounterService::begin_capture_attempt) takes
//!    the latch and returns a [`CaptureClearance`]
//! 2. the device flies and resolves
//! 3. [`notify_capture_success`](EncounterService::notify_capture_success) or
//!    [`notify_capture_failed`](EncounterService::notify_capture_failed) hands
//!    the clearance back, releasing the latch
//!
//! [`throw_capture_item`](EncounterService::throw_capture_item) runs all three
//! for a physical throw, with step 3 happening inside `tick`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::actor::ActorId;
use crate::capture::{
    CaptureClearance, CaptureId, CaptureSession, CaptureTicket, SessionContext,
};
use crate::config::WildcatchConfig;
use crate::encounter::{
    EndCallback, Encounter, EncounterId, EncounterRequest, EncounterResult, EncounterState,
    TickContext,
};
use crate::error::{CaptureError, EncounterError};
use crate::event::{EncounterEvent, RejectReason};
use crate::inventory::{CaptureItem, Inventory};
use crate::move_resolver::{NeutralChart, TypeChart};
use crate::projectile::LaunchParams;
use crate::storage::CreatureStorage;
use crate::turn::TurnAction;
use crate::world::World;

/// Collaborators borrowed for one service call.
pub struct Collaborators<'a> {
    /// Live actors.
    pub world: &'a mut dyn World,
    /// Capture item stock.
    pub inventory: &'a mut dyn Inventory,
    /// Destination for caught creatures.
    pub storage: &'a mut dyn CreatureStorage,
}

impl<'a> Collaborators<'a> {
    /// Bundles the three collaborators.
    #[must_use]
    pub fn new(
        world: &'a mut dyn World,
        inventory: &'a mut dyn Inventory,
        storage: &'a mut dyn CreatureStorage,
    ) -> Self {
        Self {
            world,
            inventory,
            storage,
        }
    }
}

/// Owner of the active encounter, the capture latch and in-flight captures.
pub struct EncounterService {
    config: WildcatchConfig,
    rng: ChaCha8Rng,
    chart: Box<dyn TypeChart>,
    encounter: Option<Encounter>,
    next_encounter: u64,
    next_capture: u64,
    next_attempt: u64,
    latch: Option<u64>,
    sessions: Vec<CaptureSession>,
    events: Vec<EncounterEvent>,
}

impl std::fmt::Debug for EncounterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterService")
            .field("encounter", &self.encounter)
            .field("latch", &self.latch)
            .field("sessions", &self.sessions.len())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl EncounterService {
    /// Creates a service with a neutral type chart and RNG seeded from `seed`.
    #[must_use]
    pub fn new(config: WildcatchConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            chart: Box::new(NeutralChart),
            encounter: None,
            next_encounter: 1,
            next_capture: 1,
            next_attempt: 1,
            latch: None,
            sessions: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Replaces the type chart used for damage.
    #[must_use]
    pub fn with_type_chart(mut self, chart: impl TypeChart + 'static) -> Self {
        self.chart = Box::new(chart);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &WildcatchConfig {
        &self.config
    }

    /// True while an encounter is running.
    #[must_use]
    pub fn is_in_encounter(&self) -> bool {
        self.encounter.as_ref().is_some_and(|e| !e.is_ended())
    }

    /// State of the active encounter, or `Idle`.
    #[must_use]
    pub fn encounter_state(&self) -> EncounterState {
        self.encounter
            .as_ref()
            .map_or(EncounterState::Idle, Encounter::state)
    }

    /// The active encounter.
    #[must_use]
    pub const fn active_encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    /// True while a capture attempt holds the encounter latch.
    #[must_use]
    pub const fn capture_latched(&self) -> bool {
        self.latch.is_some()
    }

    /// Capture devices not yet discarded.
    #[must_use]
    pub fn active_sessions(&self) -> &[CaptureSession] {
        &self.sessions
    }

    /// Starts an encounter.
    ///
    /// `on_end` is invoked exactly once with the result.
    ///
    /// # Errors
    ///
    /// Nothing is changed when an encounter is already active, when both sides
    /// name the same actor, or when an actor or its creature record is missing.
    /// [`EncounterError::TargetBusy`] when the enemy is hidden or an
    /// unresolved capture device is aimed at it.
    pub fn start_encounter(
        &mut self,
        world: &mut dyn World,
        request: EncounterRequest,
        on_end: Option<EndCallback>,
    ) -> Result<EncounterId, EncounterError> {
        if self.is_in_encounter() {
            warn!("encounter requested while another is active");
            return Err(EncounterError::AlreadyActive);
        }
        if request.player == request.enemy {
            warn!(actor = %request.player, "encounter requested against itself");
            return Err(EncounterError::SameActor(request.player));
        }
        let required = [Some(request.player), Some(request.enemy), request.trainer];
        for actor in required.into_iter().flatten() {
            if !world.contains(actor) {
                warn!(%actor, "encounter actor missing");
                return Err(EncounterError::MissingActor(actor));
            }
        }
        for actor in [request.player, request.enemy] {
            if world.record(actor).is_none() {
                warn!(%actor, "encounter actor has no creature record");
                return Err(EncounterError::MissingRecord(actor));
            }
        }
        let targeted = self
            .sessions
            .iter()
            .any(|s| s.target() == request.enemy && !s.is_resolved());
        if targeted || !world.is_active(request.enemy) {
            warn!(actor = %request.enemy, targeted, "encounter enemy is unavailable");
            return Err(EncounterError::TargetBusy(request.enemy));
        }

        let id = EncounterId::new(self.next_encounter);
        self.next_encounter += 1;
        self.latch = None;
        let mut ctx = TickContext {
            world,
            dice: &mut self.rng,
            chart: self.chart.as_ref(),
            events: &mut self.events,
        };
        self.encounter = Some(Encounter::begin(id, &request, &self.config, on_end, &mut ctx));
        Ok(id)
    }

    /// Ends the active encounter with [`EncounterResult::ForcedEnd`].
    ///
    /// Cancels any capture holding its latch and releases the latch. Does
    /// nothing outside an encounter.
    pub fn force_end(&mut self, world: &mut dyn World) {
        let Some(mut encounter) = self.encounter.take() else {
            return;
        };
        let id = encounter.id();
        encounter.end(EncounterResult::ForcedEnd, world, &mut self.events);
        for session in &mut self.sessions {
            if session.encounter() == Some(id) {
                session.abort(world, &mut self.events);
            }
        }
        self.sessions.retain(|s| !s.is_done());
        if self.latch.take().is_some() {
            debug!(encounter = %id, "capture latch released by forced end");
        }
    }

    /// Supplies the player's action for the current or next player turn.
    ///
    /// # Errors
    ///
    /// [`EncounterError::NoActiveEncounter`] outside an encounter, or
    /// [`EncounterError::ActionAlreadyQueued`] if one is waiting.
    pub fn queue_player_action(&mut self, action: TurnAction) -> Result<(), EncounterError> {
        match self.encounter.as_mut() {
            Some(encounter) => encounter.queue_player_action(action),
            None => Err(EncounterError::NoActiveEncounter),
        }
    }

    /// Marks the player's current or next turn as spent.
    ///
    /// # Errors
    ///
    /// [`EncounterError::NoActiveEncounter`] outside an encounter.
    pub fn consume_player_turn(&mut self) -> Result<(), EncounterError> {
        match self.encounter.as_mut() {
            Some(encounter) if !encounter.is_ended() => {
                encounter.consume_player_turn();
                Ok(())
            }
            _ => Err(EncounterError::NoActiveEncounter),
        }
    }

    /// Takes the capture latch for the active encounter.
    ///
    /// Outside an encounter this always succeeds with [`CaptureClearance::Free`].
    ///
    /// # Errors
    ///
    /// [`CaptureError::LatchHeld`] while another attempt is in flight.
    pub fn begin_capture_attempt(&mut self) -> Result<CaptureClearance, CaptureError> {
        let Some(encounter) = self.encounter.as_ref().filter(|e| !e.is_ended()) else {
            return Ok(CaptureClearance::Free);
        };
        if self.latch.is_some() {
            warn!(encounter = %encounter.id(), "capture attempt rejected, latch held");
            return Err(CaptureError::LatchHeld);
        }
        let attempt = self.next_attempt;
        self.next_attempt += 1;
        self.latch = Some(attempt);
        debug!(encounter = %encounter.id(), attempt, "capture latch taken");
        Ok(CaptureClearance::Latched(CaptureTicket::new(
            encounter.id(),
            attempt,
        )))
    }

    /// Reports a successful capture, ending the encounter with
    /// [`EncounterResult::Capture`] and releasing the latch.
    ///
    /// Stale clearances are ignored.
    pub fn notify_capture_success(&mut self, clearance: CaptureClearance, world: &mut dyn World) {
        if !self.release(clearance) {
            return;
        }
        if let Some(encounter) = self.encounter.as_mut() {
            encounter.notify_capture_success(world, &mut self.events);
        }
    }

    /// Reports a failed capture, consuming the player's turn and releasing the latch.
    ///
    /// Stale clearances are ignored.
    pub fn notify_capture_failed(&mut self, clearance: CaptureClearance) {
        if !self.release(clearance) {
            return;
        }
        if let Some(encounter) = self.encounter.as_mut() {
            encounter.notify_capture_failed();
        }
    }

    /// Releases the latch held by `clearance`. Returns false for `Free` or stale clearances.
    fn release(&mut self, clearance: CaptureClearance) -> bool {
        let CaptureClearance::Latched(ticket) = clearance else {
            return false;
        };
        let live = self
            .encounter
            .as_ref()
            .is_some_and(|e| !e.is_ended() && e.id() == ticket.encounter());
        if !live || self.latch != Some(ticket.attempt()) {
            debug!(
                encounter = %ticket.encounter(),
                attempt = ticket.attempt(),
                "stale capture ticket ignored"
            );
            return false;
        }
        self.latch = None;
        debug!(attempt = ticket.attempt(), "capture latch released");
        true
    }

    /// Throws a capture device.
    ///
    /// Inside an encounter the device always targets the wild combatant,
    /// whatever `target` says.
    ///
    /// # Errors
    ///
    /// Nothing is consumed when the item is out of stock, when another attempt
    /// holds the latch, or when the inventory refuses to hand one over.
    pub fn throw_capture_item(
        &mut self,
        item: &CaptureItem,
        launch: LaunchParams,
        target: ActorId,
        collab: &mut Collaborators<'_>,
    ) -> Result<CaptureId, CaptureError> {
        if !collab.inventory.is_available(&item.id) {
            warn!(item = %item.id, "capture item out of stock");
            self.reject(item, RejectReason::ItemUnavailable);
            return Err(CaptureError::ItemUnavailable(item.id.clone()));
        }

        let clearance = match self.begin_capture_attempt() {
            Ok(clearance) => clearance,
            Err(err) => {
                self.reject(item, RejectReason::LatchHeld);
                return Err(err);
            }
        };

        if !collab.inventory.consume_one(&item.id) {
            warn!(item = %item.id, "inventory refused to consume capture item");
            if let CaptureClearance::Latched(ticket) = clearance {
                if self.latch == Some(ticket.attempt()) {
                    self.latch = None;
                }
            }
            self.reject(item, RejectReason::ConsumeRefused);
            return Err(CaptureError::ConsumeRefused(item.id.clone()));
        }

        let target = match self.encounter.as_ref().filter(|e| !e.is_ended()) {
            Some(encounter) => encounter.enemy().actor(),
            None => target,
        };
        let id = CaptureId::new(self.next_capture);
        self.next_capture += 1;
        let session = CaptureSession::launch(
            id,
            item.clone(),
            target,
            &launch,
            clearance,
            &self.config.capture,
        );
        info!(session = %id, item = %item.id, %target, "capture device thrown");
        self.events.push(EncounterEvent::CaptureLaunched {
            session: id,
            item: item.id.clone(),
            target,
        });
        self.sessions.push(session);
        Ok(id)
    }

    fn reject(&mut self, item: &CaptureItem, reason: RejectReason) {
        self.events.push(EncounterEvent::CaptureRejected {
            item: item.id.clone(),
            reason,
        });
    }

    /// Advances the encounter and every capture session by `dt`.
    ///
    /// Turn timers hold still while a capture holds the latch.
    pub fn tick(&mut self, collab: &mut Collaborators<'_>, dt: f32) {
        if let Some(encounter) = self.encounter.as_mut() {
            let mut ctx = TickContext {
                world: &mut *collab.world,
                dice: &mut self.rng,
                chart: self.chart.as_ref(),
                events: &mut self.events,
            };
            encounter.tick(dt, self.latch.is_some(), &mut ctx);
        }

        let mut sessions = std::mem::take(&mut self.sessions);
        for session in &mut sessions {
            let encounter_active = self.is_in_encounter();
            let report = {
                let mut ctx = SessionContext {
                    world: &mut *collab.world,
                    storage: &mut *collab.storage,
                    dice: &mut self.rng,
                    events: &mut self.events,
                    config: &self.config.capture,
                    encounter_active,
                };
                session.tick(dt, &mut ctx)
            };
            if let Some(report) = report {
                if report.success {
                    self.notify_capture_success(report.clearance, collab.world);
                } else {
                    self.notify_capture_failed(report.clearance);
                }
            }
        }
        sessions.retain(|s| !s.is_done());
        self.sessions = sessions;

        if self.encounter.as_ref().is_some_and(Encounter::is_ended) {
            self.encounter = None;
            self.latch = None;
        }
    }

    /// Hands over every event queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<EncounterEvent> {
        std::mem::take(&mut self.events)
    }
}
