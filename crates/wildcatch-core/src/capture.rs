//! A thrown capture device, from launch to discard.
//!
//! ```text
//! Flying --hit creature--> Shaking (1..=3 shakes) --> Lingering --> Done
//!        --hit terrain---> Settling --------------------------------> Done
//!        --timeout-------------------------------------------------> Done
//! ```
//!
//! A session reports its outcome exactly once, carrying back the
//! [`CaptureClearance`] it was launched with so the service can release the
//! encounter latch. Lingering afterwards is purely presentational.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, info_span, warn, Span};

use crate::actor::ActorId;
use crate::capture_resolver::{resolve_capture, CaptureOutcome};
use crate::config::CaptureConfig;
use crate::encounter::EncounterId;
use crate::error::StorageError;
use crate::event::{EncounterEvent, MissReason};
use crate::inventory::CaptureItem;
use crate::projectile::{FlightStep, LaunchParams, Projectile, Sphere};
use crate::rng::Dice;
use crate::storage::CreatureStorage;
use crate::world::{collider_centre, World};

/// Identity of one thrown device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaptureId(u64);

impl CaptureId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Proof that the holder owns an encounter's capture latch.
///
/// Not `Clone`: handing it back to the service releases the latch, so it can
/// only ever be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct CaptureTicket {
    encounter: EncounterId,
    attempt: u64,
}

impl CaptureTicket {
    pub(crate) const fn new(encounter: EncounterId, attempt: u64) -> Self {
        Self { encounter, attempt }
    }

    /// Encounter whose latch this ticket holds.
    #[must_use]
    pub const fn encounter(&self) -> EncounterId {
        self.encounter
    }

    /// Attempt number within the service.
    #[must_use]
    pub const fn attempt(&self) -> u64 {
        self.attempt
    }
}

/// Permission to run a capture attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum CaptureClearance {
    /// No encounter is active; nothing to latch.
    Free,
    /// The encounter latch is held by this attempt.
    Latched(CaptureTicket),
}

impl CaptureClearance {
    /// The encounter this clearance is bound to, if any.
    #[must_use]
    pub const fn encounter(&self) -> Option<EncounterId> {
        match self {
            Self::Free => None,
            Self::Latched(ticket) => Some(ticket.encounter),
        }
    }
}

/// Final word from a session; produced once.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionReport {
    /// Clearance the session was launched with.
    pub clearance: CaptureClearance,
    /// The creature was caught.
    pub success: bool,
}

/// Borrowed collaborators for one session tick.
pub struct SessionContext<'a> {
    /// Live actors.
    pub world: &'a mut dyn World,
    /// Destination for caught creatures.
    pub storage: &'a mut dyn CreatureStorage,
    /// Random rolls.
    pub dice: &'a mut dyn Dice,
    /// Event sink.
    pub events: &'a mut Vec<EncounterEvent>,
    /// Device settings.
    pub config: &'a CaptureConfig,
    /// An encounter is still running; a creature that breaks free stays in combat mode.
    pub encounter_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Flying(Projectile),
    Shaking {
        outcome: CaptureOutcome,
        rest: Vec3,
        shake: u8,
        elapsed: f32,
        in_gap: bool,
    },
    Settling {
        remaining: f32,
    },
    Lingering {
        remaining: f32,
    },
    Done,
}

/// One thrown capture device.
#[derive(Debug)]
pub struct CaptureSession {
    id: CaptureId,
    item: CaptureItem,
    target: ActorId,
    clearance: Option<CaptureClearance>,
    phase: Phase,
    elapsed: f32,
    device_position: Vec3,
    target_hidden: bool,
    span: Span,
}

impl CaptureSession {
    /// Launches a device at `target`.
    #[must_use]
    pub fn launch(
        id: CaptureId,
        item: CaptureItem,
        target: ActorId,
        params: &LaunchParams,
        clearance: CaptureClearance,
        config: &CaptureConfig,
    ) -> Self {
        let projectile = Projectile::launch(params, config);
        let span = info_span!("capture", id = %id, item = %item.id);
        span.in_scope(|| debug!(%target, model = ?params.model, "device launched"));
        Self {
            id,
            item,
            target,
            clearance: Some(clearance),
            device_position: projectile.position(),
            phase: Phase::Flying(projectile),
            elapsed: 0.0,
            target_hidden: false,
            span,
        }
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> CaptureId {
        self.id
    }

    /// Intended target.
    #[must_use]
    pub const fn target(&self) -> ActorId {
        self.target
    }

    /// Device thrown.
    #[must_use]
    pub const fn item(&self) -> &CaptureItem {
        &self.item
    }

    /// Where the device is now, shake offset included.
    #[must_use]
    pub const fn device_position(&self) -> Vec3 {
        self.device_position
    }

    /// Seconds since launch.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Encounter whose latch this session holds, until it reports.
    #[must_use]
    pub fn encounter(&self) -> Option<EncounterId> {
        self.clearance.as_ref().and_then(CaptureClearance::encounter)
    }

    /// True while the device is still in the air.
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        matches!(self.phase, Phase::Flying(_))
    }

    /// True once the outcome has been reported.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.clearance.is_none()
    }

    /// True once the device can be discarded.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Advances by `dt`. Returns the outcome on the tick it is decided.
    pub fn tick(&mut self, dt: f32, ctx: &mut SessionContext<'_>) -> Option<SessionReport> {
        if self.is_done() {
            return None;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.elapsed += dt;
        if !self.is_resolved() && self.elapsed > ctx.config.safety_lifetime {
            return self.time_out(ctx);
        }

        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Flying(mut projectile) => {
                let sphere = self.target_sphere(ctx.world);
                let world: &dyn World = &*ctx.world;
                let ground = |x: f32, z: f32| world.ground_height(x, z);
                let step = projectile.step(dt, sphere, &ground);
                self.device_position = projectile.position();
                match step {
                    FlightStep::InFlight => {
                        self.phase = Phase::Flying(projectile);
                        None
                    }
                    FlightStep::HitTarget(_) => self.strike(ctx),
                    FlightStep::HitTerrain(contact) => {
                        debug!(?contact, "device hit terrain");
                        self.phase = Phase::Settling {
                            remaining: ctx.config.terrain_settle,
                        };
                        None
                    }
                    FlightStep::Expired => self.time_out(ctx),
                }
            }
            Phase::Settling { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::Settling { remaining };
                    return None;
                }
                info!("device settled without touching its target");
                self.miss(MissReason::Terrain, ctx)
            }
            Phase::Shaking {
                outcome,
                rest,
                shake,
                elapsed,
                in_gap,
            } => self.shake(outcome, rest, shake, elapsed + dt, in_gap, ctx),
            Phase::Lingering { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::Lingering { remaining };
                }
                None
            }
            Phase::Done => None,
        }
    }

    /// Cancels the session, putting a hidden target back into the world.
    ///
    /// The clearance is dropped; the caller owns the latch release.
    pub fn abort(&mut self, world: &mut dyn World, events: &mut Vec<EncounterEvent>) {
        if self.is_done() {
            return;
        }
        let span = self.span.clone();
        let _guard = span.enter();
        self.restore_target(world, false);
        self.clearance = None;
        self.phase = Phase::Done;
        info!("capture aborted");
        events.push(EncounterEvent::CaptureAborted { session: self.id });
    }

    fn target_sphere(&self, world: &dyn World) -> Option<Sphere> {
        if !world.is_active(self.target) {
            return None;
        }
        let position = world.transform(self.target)?.position;
        let radius = world.collider_radius(self.target)?;
        Some(Sphere {
            center: collider_centre(position, radius),
            radius,
        })
    }

    fn strike(&mut self, ctx: &mut SessionContext<'_>) -> Option<SessionReport> {
        let target = self.target;
        ctx.world.set_physics_frozen(target, true);
        ctx.world.set_combat_mode(target, true);
        ctx.world.set_active(target, false);
        self.target_hidden = true;

        let rest = self.rest_point(ctx.world, ctx.config);
        self.device_position = rest;
        ctx.events.push(EncounterEvent::CaptureStruck {
            session: self.id,
            target,
            rest,
        });

        let Some(catch_rate) = ctx.world.record(target).map(|r| r.species().catch_rate) else {
            warn!(%target, "struck creature has no record");
            return self.miss(MissReason::NoRecord, ctx);
        };

        let outcome = resolve_capture(
            catch_rate,
            self.item.effective_multiplier(),
            ctx.config.critical_capture_chance,
            ctx.dice,
        );
        debug!(
            chance = outcome.chance,
            success = outcome.success,
            critical = outcome.critical,
            shakes = outcome.shakes,
            "capture rolled"
        );
        ctx.events.push(EncounterEvent::CaptureShake {
            session: self.id,
            shake: 1,
        });
        self.phase = Phase::Shaking {
            outcome,
            rest,
            shake: 1,
            elapsed: 0.0,
            in_gap: false,
        };
        None
    }

    /// Where the device comes to rest under the struck creature.
    fn rest_point(&self, world: &dyn World, config: &CaptureConfig) -> Vec3 {
        let Some(base) = world.transform(self.target).map(|t| t.position) else {
            return self.device_position;
        };
        let lift = Vec3::Y * config.device_radius;
        let origin = base + Vec3::Y * config.ground_probe_height;
        if let Some(hit) = world.ground_probe(origin, config.ground_probe_distance) {
            return hit + lift;
        }
        debug!("ground probe missed, sampling terrain height");
        if let Some(height) = world.ground_height(base.x, base.z) {
            return Vec3::new(base.x, height, base.z) + lift;
        }
        debug!("no terrain under target, resting at its feet");
        base + lift
    }

    fn shake(
        &mut self,
        outcome: CaptureOutcome,
        rest: Vec3,
        shake: u8,
        elapsed: f32,
        in_gap: bool,
        ctx: &mut SessionContext<'_>,
    ) -> Option<SessionReport> {
        let config = ctx.config;
        if !in_gap {
            if elapsed < config.shake_duration {
                let offset = (elapsed * config.shake_frequency).sin() * config.shake_amplitude;
                self.device_position = rest + Vec3::X * offset;
                self.phase = Phase::Shaking {
                    outcome,
                    rest,
                    shake,
                    elapsed,
                    in_gap,
                };
                return None;
            }
            self.device_position = rest;
            self.phase = Phase::Shaking {
                outcome,
                rest,
                shake,
                elapsed: 0.0,
                in_gap: true,
            };
            return None;
        }

        if elapsed < config.shake_gap {
            self.phase = Phase::Shaking {
                outcome,
                rest,
                shake,
                elapsed,
                in_gap,
            };
            return None;
        }

        if shake < outcome.shakes {
            let next = shake + 1;
            ctx.events.push(EncounterEvent::CaptureShake {
                session: self.id,
                shake: next,
            });
            self.phase = Phase::Shaking {
                outcome,
                rest,
                shake: next,
                elapsed: 0.0,
                in_gap: false,
            };
            return None;
        }

        self.resolve(outcome, ctx)
    }

    fn resolve(
        &mut self,
        outcome: CaptureOutcome,
        ctx: &mut SessionContext<'_>,
    ) -> Option<SessionReport> {
        let target = self.target;
        if outcome.success && !ctx.storage.has_room() {
            warn!(%target, "storage is full, releasing caught creature");
            return self.miss(MissReason::StorageFull, ctx);
        }

        if outcome.success {
            let Some(record) = ctx.world.record(target).cloned() else {
                warn!(%target, "captured creature vanished before it could be stored");
                return self.miss(MissReason::NoRecord, ctx);
            };
            let (creature, species) = (record.id(), record.species().name.clone());
            if let Err(StorageError::Full(record)) = ctx.storage.add_captured(record) {
                warn!(creature = %record.id(), "storage refused captured creature, releasing it");
                return self.miss(MissReason::StorageFull, ctx);
            }
            // The stored copy is authoritative now.
            let _ = ctx.world.remove(target);
            info!(%target, %creature, %species, "creature captured");
            self.target_hidden = false;
        } else {
            info!(%target, shakes = outcome.shakes, "creature broke free");
            self.restore_target(ctx.world, ctx.encounter_active);
        }

        ctx.events.push(EncounterEvent::CaptureResolved {
            session: self.id,
            target,
            success: outcome.success,
            shakes: outcome.shakes,
            chance: outcome.chance,
        });
        self.phase = Phase::Lingering {
            remaining: ctx.config.result_linger,
        };
        self.report(outcome.success)
    }

    fn miss(&mut self, reason: MissReason, ctx: &mut SessionContext<'_>) -> Option<SessionReport> {
        self.restore_target(ctx.world, ctx.encounter_active);
        ctx.events.push(EncounterEvent::CaptureMissed {
            session: self.id,
            reason,
        });
        self.phase = Phase::Done;
        self.report(false)
    }

    fn time_out(&mut self, ctx: &mut SessionContext<'_>) -> Option<SessionReport> {
        warn!(elapsed = self.elapsed, "capture attempt timed out");
        self.miss(MissReason::Timeout, ctx)
    }

    fn restore_target(&mut self, world: &mut dyn World, encounter_active: bool) {
        if !std::mem::take(&mut self.target_hidden) {
            return;
        }
        world.set_active(self.target, true);
        world.set_physics_frozen(self.target, false);
        if !encounter_active {
            world.set_combat_mode(self.target, false);
        }
    }

    fn report(&mut self, success: bool) -> Option<SessionReport> {
        let clearance = self.clearance.take()?;
        Some(SessionReport { clearance, success })
    }
}
