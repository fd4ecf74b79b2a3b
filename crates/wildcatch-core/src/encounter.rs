//! One encounter between the player's creature and a wild creature.
//!
//! An [`Encounter`] is a tick-driven state machine:
//!
//! ```text
//! Positioning -> [faint] -> PlayerTurn -> [faint] -> EnemyTurn -> [faint] -> PlayerTurn ...
//!                              \-> Flee -----------------------------------> Ended(Run)
//! ```
//!
//! Each turn opens with an intro delay and closes with a pacing delay chosen
//! by the action outcome. Every "wait" is a stored phase with a countdown; the
//! encounter never blocks.
//!
//! Once positioning finishes, every tick also:
//! - pulls displaced combatants back onto the ring around the arena centre
//! - leashes the trainer to the arena radius
//! - scans for wild creatures inside the ring and pushes them out

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;
use tracing::{debug, info, info_span, warn, Span};

use crate::actor::{flat, horizontal_distance, yaw_towards, ActorId, ActorKind};
use crate::combatant::{Combatant, Side};
use crate::config::{EncounterConfig, TurnPacing, WildcatchConfig};
use crate::error::EncounterError;
use crate::event::{ActionOutcome, EncounterEvent};
use crate::move_resolver::TypeChart;
use crate::rng::Dice;
use crate::turn::{Execution, PlayerDecision, TurnAction, TurnController};
use crate::world::{step_towards, World};

/// Evictions count as complete this close to the clearance boundary.
const EVICTION_SLACK: f32 = 0.05;

/// Identity of one encounter, unique per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncounterId(u64);

impl EncounterId {
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

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Coarse lifecycle state, for hosts that drive UI off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterState {
    /// Not started.
    Idle,
    /// Combatants are gliding into place.
    Positioning,
    /// The player's turn (intro, waiting for input, or pacing).
    PlayerTurn,
    /// The enemy's turn.
    EnemyTurn,
    /// Terminal.
    Ended,
}

/// How an encounter finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterResult {
    /// The player's creature fainted (including double knock-outs).
    PlayerFainted,
    /// The wild creature fainted.
    EnemyFainted,
    /// The wild creature was caught.
    Capture,
    /// The player ran away.
    Run,
    /// The host cancelled the encounter.
    ForcedEnd,
}

impl fmt::Display for EncounterResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerFainted => write!(f, "player fainted"),
            Self::EnemyFainted => write!(f, "enemy fainted"),
            Self::Capture => write!(f, "capture"),
            Self::Run => write!(f, "run"),
            Self::ForcedEnd => write!(f, "forced end"),
        }
    }
}

/// Who takes part in a new encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterRequest {
    /// The player's creature.
    pub player: ActorId,
    /// The wild creature.
    pub enemy: ActorId,
    /// The player character, leashed to the arena while it lasts.
    pub trainer: Option<ActorId>,
}

impl EncounterRequest {
    /// A request without a trainer.
    #[must_use]
    pub const fn new(player: ActorId, enemy: ActorId) -> Self {
        Self {
            player,
            enemy,
            trainer: None,
        }
    }

    /// Adds the trainer to leash.
    #[must_use]
    pub const fn with_trainer(mut self, trainer: ActorId) -> Self {
        self.trainer = Some(trainer);
        self
    }
}

/// Arena geometry fixed when the encounter begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    /// Midpoint of the two combatants at the start.
    pub center: Vec3,
    /// Unit horizontal direction from the enemy's slot to the player's.
    pub axis: Vec3,
    /// Horizontal distance from the centre to each combatant.
    pub offset: f32,
    /// Trainer leash and eviction radius.
    pub ring_radius: f32,
}

impl Arena {
    /// Arena between two starting positions. Coincident positions use +Z as the axis.
    #[must_use]
    pub fn between(player: Vec3, enemy: Vec3, offset: f32, ring_radius: f32) -> Self {
        let dir = flat(player - enemy);
        let axis = if dir.length_squared() < 1e-4 {
            Vec2::Y
        } else {
            dir.normalize()
        };
        Self {
            center: (player + enemy) * 0.5,
            axis: Vec3::new(axis.x, 0.0, axis.y),
            offset,
            ring_radius,
        }
    }

    /// The player's slot, at `height`.
    #[must_use]
    pub fn player_slot(&self, height: f32) -> Vec3 {
        self.slot(self.axis, height)
    }

    /// The enemy's slot, at `height`.
    #[must_use]
    pub fn enemy_slot(&self, height: f32) -> Vec3 {
        self.slot(-self.axis, height)
    }

    fn slot(&self, dir: Vec3, height: f32) -> Vec3 {
        let p = self.center + dir * self.offset;
        Vec3::new(p.x, height, p.z)
    }

    /// Closest point on the combatant ring to `position`, at its height.
    #[must_use]
    pub fn ring_point(&self, position: Vec3) -> Vec3 {
        let mut from = flat(position) - flat(self.center);
        if from.length_squared() < 1e-4 {
            from = Vec2::Y * 0.01;
        }
        let p = flat(self.center) + from.normalize() * self.offset;
        Vec3::new(p.x, position.y, p.y)
    }

    /// `position` pulled back inside the ring radius, or `None` if it is inside.
    #[must_use]
    pub fn leash(&self, position: Vec3) -> Option<Vec3> {
        let from = flat(position) - flat(self.center);
        let dist = from.length();
        if dist <= self.ring_radius {
            return None;
        }
        let p = flat(self.center) + from / dist * self.ring_radius;
        Some(Vec3::new(p.x, position.y, p.y))
    }
}

/// Borrowed collaborators for one encounter tick.
pub struct TickContext<'a> {
    /// Live actors.
    pub world: &'a mut dyn World,
    /// Random rolls.
    pub dice: &'a mut dyn Dice,
    /// Type effectiveness.
    pub chart: &'a dyn TypeChart,
    /// Event sink.
    pub events: &'a mut Vec<EncounterEvent>,
}

/// Invoked exactly once when an encounter ends.
pub type EndCallback = Box<dyn FnOnce(EncounterResult)>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Positioning {
        elapsed: f32,
        player_from: Vec3,
        enemy_from: Vec3,
    },
    TurnIntro {
        side: Side,
        remaining: f32,
    },
    AwaitingPlayer,
    Pacing {
        side: Side,
        remaining: f32,
    },
    Ended,
}

/// A wild intruder being pushed out of the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EvictionTask {
    actor: ActorId,
    target: Vec3,
    elapsed: f32,
    max_time: f32,
}

/// A running encounter.
pub struct Encounter {
    id: EncounterId,
    config: EncounterConfig,
    pacing: TurnPacing,
    arena: Arena,
    turns: TurnController,
    trainer: Option<ActorId>,
    phase: Phase,
    state: EncounterState,
    turn: u32,
    result: Option<EncounterResult>,
    evictions: Vec<EvictionTask>,
    scan_timer: f32,
    on_end: Option<EndCallback>,
    span: Span,
}

impl fmt::Debug for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encounter")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("turn", &self.turn)
            .field("result", &self.result)
            .field("evictions", &self.evictions.len())
            .finish_non_exhaustive()
    }
}

impl Encounter {
    /// Binds both combatants, puts them in combat mode, runs the first
    /// intruder scan and starts positioning.
    ///
    /// The caller has already checked that both actors exist with records.
    pub fn begin(
        id: EncounterId,
        request: &EncounterRequest,
        config: &WildcatchConfig,
        on_end: Option<EndCallback>,
        ctx: &mut TickContext<'_>,
    ) -> Self {
        let player = Combatant::new(request.player, Side::Player);
        let enemy = Combatant::new(request.enemy, Side::Enemy);
        let player_from = player.position(ctx.world).unwrap_or(Vec3::ZERO);
        let enemy_from = enemy.position(ctx.world).unwrap_or(Vec3::ZERO);
        let arena = Arena::between(
            player_from,
            enemy_from,
            config.encounter.combatant_offset,
            config.encounter.ring_radius,
        );

        let span = info_span!("encounter", id = %id);
        let mut encounter = Self {
            id,
            config: config.encounter.clone(),
            pacing: config.pacing.clone(),
            arena,
            turns: TurnController::new(player, enemy),
            trainer: request.trainer,
            phase: Phase::Positioning {
                elapsed: 0.0,
                player_from,
                enemy_from,
            },
            state: EncounterState::Positioning,
            turn: 0,
            result: None,
            evictions: Vec::new(),
            scan_timer: scan_interval(&config.encounter),
            on_end,
            span,
        };

        let span = encounter.span.clone();
        let _guard = span.enter();
        ctx.world.set_combat_mode(request.player, true);
        ctx.world.set_combat_mode(request.enemy, true);
        encounter.scan_for_intruders(ctx);

        info!(
            player = %request.player,
            enemy = %request.enemy,
            center = ?arena.center,
            "encounter started"
        );
        ctx.events.push(EncounterEvent::EncounterStarted {
            encounter: id,
            player: request.player,
            enemy: request.enemy,
            center: arena.center,
        });
        encounter
    }

    /// Encounter id.
    #[must_use]
    pub const fn id(&self) -> EncounterId {
        self.id
    }

    /// Coarse state.
    #[must_use]
    pub const fn state(&self) -> EncounterState {
        self.state
    }

    /// Terminal result, once ended.
    #[must_use]
    pub const fn result(&self) -> Option<EncounterResult> {
        self.result
    }

    /// True once a result is set.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.result.is_some()
    }

    /// Arena geometry.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The player's combatant.
    #[must_use]
    pub const fn player(&self) -> Combatant {
        self.turns.player()
    }

    /// The wild combatant.
    #[must_use]
    pub const fn enemy(&self) -> Combatant {
        self.turns.enemy()
    }

    /// The leashed trainer, if any.
    #[must_use]
    pub const fn trainer(&self) -> Option<ActorId> {
        self.trainer
    }

    /// Current turn number; 0 until the first player turn starts.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn
    }

    /// True while the player turn is waiting for input.
    #[must_use]
    pub fn awaiting_player(&self) -> bool {
        self.phase == Phase::AwaitingPlayer
    }

    /// Number of intruders currently being pushed out.
    #[must_use]
    pub fn active_evictions(&self) -> usize {
        self.evictions.len()
    }

    /// True while `actor` is being evicted.
    #[must_use]
    pub fn is_evicting(&self, actor: ActorId) -> bool {
        self.evictions.iter().any(|t| t.actor == actor)
    }

    /// Supplies the player's action.
    ///
    /// # Errors
    ///
    /// [`EncounterError::NoActiveEncounter`] once ended, or
    /// [`EncounterError::ActionAlreadyQueued`] if one is waiting.
    pub fn queue_player_action(&mut self, action: TurnAction) -> Result<(), EncounterError> {
        if self.is_ended() {
            return Err(EncounterError::NoActiveEncounter);
        }
        self.turns.queue_player_action(action)
    }

    /// Marks the player's current or next turn as spent.
    pub fn consume_player_turn(&mut self) {
        if !self.is_ended() {
            debug!(encounter = %self.id, "player turn consumed");
            self.turns.consume_player_turn();
        }
    }

    /// A capture in this encounter succeeded.
    pub fn notify_capture_success(
        &mut self,
        world: &mut dyn World,
        events: &mut Vec<EncounterEvent>,
    ) {
        self.end(EncounterResult::Capture, world, events);
    }

    /// A capture in this encounter failed; the player's turn is spent.
    pub fn notify_capture_failed(&mut self) {
        self.consume_player_turn();
    }

    /// Advances by `dt`.
    ///
    /// With `turns_paused` set, turn timers and decisions hold still while
    /// arena upkeep keeps running.
    pub fn tick(&mut self, dt: f32, turns_paused: bool, ctx: &mut TickContext<'_>) {
        if self.is_ended() {
            return;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.update_evictions(dt, ctx);

        if let Phase::Positioning { .. } = self.phase {
            self.update_positioning(dt, ctx);
            return;
        }

        self.keep_on_ring(dt, ctx.world);
        self.leash_trainer(ctx.world);

        if !turns_paused {
            self.advance_turns(dt, ctx);
        }
    }

    /// Ends the encounter. Later calls are ignored.
    ///
    /// Cancels evictions, releases both combatants from combat mode, emits
    /// [`EncounterEvent::EncounterEnded`] and invokes the end callback.
    pub fn end(
        &mut self,
        result: EncounterResult,
        world: &mut dyn World,
        events: &mut Vec<EncounterEvent>,
    ) {
        if self.is_ended() {
            return;
        }
        let span = self.span.clone();
        let _guard = span.enter();

        self.result = Some(result);
        self.state = EncounterState::Ended;
        self.phase = Phase::Ended;
        self.turns.clear();
        self.cancel_evictions(world);
        world.set_combat_mode(self.player().actor(), false);
        world.set_combat_mode(self.enemy().actor(), false);

        info!(%result, turns = self.turn, "encounter ended");
        events.push(EncounterEvent::EncounterEnded {
            encounter: self.id,
            result,
        });
        if let Some(callback) = self.on_end.take() {
            callback(result);
        }
    }

    // -------------------------------------------------------------------------
    // Turn loop
    // -------------------------------------------------------------------------

    fn update_positioning(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        let Phase::Positioning {
            elapsed,
            player_from,
            enemy_from,
        } = self.phase
        else {
            return;
        };
        let elapsed = elapsed + dt;
        let duration = self.config.positioning_duration;
        let a = if duration <= 0.0 {
            1.0
        } else {
            (elapsed / duration).min(1.0)
        };

        let player = self.player();
        let enemy = self.enemy();
        let center = self.arena.center;
        player.set_position(
            ctx.world,
            player_from.lerp(self.arena.player_slot(player_from.y), a),
        );
        enemy.set_position(
            ctx.world,
            enemy_from.lerp(self.arena.enemy_slot(enemy_from.y), a),
        );
        player.face(ctx.world, center);
        enemy.face(ctx.world, center);

        if a < 1.0 {
            self.phase = Phase::Positioning {
                elapsed,
                player_from,
                enemy_from,
            };
            return;
        }
        debug!("positioning complete");
        self.next_turn(Side::Player, ctx);
    }

    fn advance_turns(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        match self.phase {
            Phase::TurnIntro { side, remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::TurnIntro { side, remaining };
                    return;
                }
                match side {
                    Side::Player => {
                        self.turn += 1;
                        ctx.events.push(EncounterEvent::PlayerTurnStarted {
                            encounter: self.id,
                            turn: self.turn,
                        });
                        self.phase = Phase::AwaitingPlayer;
                        self.poll_player(ctx);
                    }
                    Side::Enemy => {
                        ctx.events.push(EncounterEvent::EnemyTurnStarted {
                            encounter: self.id,
                            turn: self.turn,
                        });
                        self.run_enemy_turn(ctx);
                    }
                }
            }
            Phase::AwaitingPlayer => self.poll_player(ctx),
            Phase::Pacing { side, remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::Pacing { side, remaining };
                    return;
                }
                self.next_turn(side.opponent(), ctx);
            }
            Phase::Positioning { .. } | Phase::Ended => {}
        }
    }

    /// Ends on a knock-out, otherwise opens `side`'s turn.
    fn next_turn(&mut self, side: Side, ctx: &mut TickContext<'_>) {
        if self.resolve_knockouts(ctx) {
            return;
        }
        self.state = match side {
            Side::Player => EncounterState::PlayerTurn,
            Side::Enemy => EncounterState::EnemyTurn,
        };
        self.phase = Phase::TurnIntro {
            side,
            remaining: self.config.turn_intro_delay,
        };
    }

    fn resolve_knockouts(&mut self, ctx: &mut TickContext<'_>) -> bool {
        let player = self.player();
        let enemy = self.enemy();
        let player_down = player.is_fainted(ctx.world);
        let enemy_down = enemy.is_fainted(ctx.world);

        for (down, combatant) in [(player_down, player), (enemy_down, enemy)] {
            if down {
                ctx.events.push(EncounterEvent::CombatantFainted {
                    encounter: self.id,
                    side: combatant.side(),
                    actor: combatant.actor(),
                });
            }
        }

        let result = if player_down {
            EncounterResult::PlayerFainted
        } else if enemy_down {
            EncounterResult::EnemyFainted
        } else {
            return false;
        };
        self.end(result, ctx.world, ctx.events);
        true
    }

    fn poll_player(&mut self, ctx: &mut TickContext<'_>) {
        let Some(decision) = self.turns.take_player_decision() else {
            return;
        };
        let (action, execution) = match decision {
            PlayerDecision::Action(action) => (
                Some(action),
                self.turns.execute(
                    Side::Player,
                    action,
                    ctx.world,
                    ctx.chart,
                    ctx.dice,
                    &self.pacing,
                ),
            ),
            PlayerDecision::Consumed => (
                None,
                Execution {
                    outcome: ActionOutcome::TurnConsumed,
                    delay: self.pacing.non_move,
                },
            ),
        };
        self.resolved(Side::Player, action, execution.outcome, ctx);

        if execution.outcome == ActionOutcome::Fled {
            info!(turn = self.turn, "player fled");
            self.end(EncounterResult::Run, ctx.world, ctx.events);
            return;
        }
        self.phase = Phase::Pacing {
            side: Side::Player,
            remaining: execution.delay,
        };
    }

    fn run_enemy_turn(&mut self, ctx: &mut TickContext<'_>) {
        let action = self.turns.choose_enemy_action(ctx.world, ctx.dice);
        let execution = match action {
            Some(action) => self.turns.execute(
                Side::Enemy,
                action,
                ctx.world,
                ctx.chart,
                ctx.dice,
                &self.pacing,
            ),
            None => {
                warn!(turn = self.turn, "enemy has no usable move, skipping turn");
                Execution {
                    outcome: ActionOutcome::Skipped,
                    delay: self.pacing.wasted,
                }
            }
        };
        self.resolved(Side::Enemy, action, execution.outcome, ctx);
        self.phase = Phase::Pacing {
            side: Side::Enemy,
            remaining: execution.delay,
        };
    }

    fn resolved(
        &self,
        side: Side,
        action: Option<TurnAction>,
        outcome: ActionOutcome,
        ctx: &mut TickContext<'_>,
    ) {
        ctx.events.push(EncounterEvent::ActionResolved {
            encounter: self.id,
            side,
            action,
            outcome,
        });
    }

    // -------------------------------------------------------------------------
    // Arena upkeep
    // -------------------------------------------------------------------------

    fn keep_on_ring(&self, dt: f32, world: &mut dyn World) {
        let center = self.arena.center;
        for combatant in [self.player(), self.enemy()] {
            if !world.is_active(combatant.actor()) {
                continue;
            }
            let Some(position) = combatant.position(world) else {
                continue;
            };
            let desired = self.arena.ring_point(position);
            if position.distance(desired) > self.config.snap_tolerance {
                combatant.step_towards(world, desired, self.config.reposition_speed * dt);
                combatant.face(world, center);
            }
        }
    }

    fn leash_trainer(&self, world: &mut dyn World) {
        let Some(trainer) = self.trainer else {
            return;
        };
        let Some(position) = world.transform(trainer).map(|t| t.position) else {
            return;
        };
        if let Some(clamped) = self.arena.leash(position) {
            world.set_position(trainer, clamped);
        }
    }

    fn update_evictions(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        self.scan_timer -= dt;
        if self.scan_timer <= 0.0 {
            self.scan_timer = scan_interval(&self.config);
            self.scan_for_intruders(ctx);
        }

        let boundary = self.eviction_boundary();
        let speed = self.config.eviction_speed;
        let center = self.arena.center;
        let world = &mut *ctx.world;
        self.evictions.retain_mut(|task| {
            if !world.contains(task.actor) || !world.is_active(task.actor) {
                debug!(actor = %task.actor, "evicted actor vanished");
                world.set_evicting(task.actor, false);
                return false;
            }
            step_towards(world, task.actor, task.target, speed * dt);
            if let Some(position) = world.transform(task.actor).map(|t| t.position) {
                if let Some(yaw) = yaw_towards(position, task.target) {
                    world.set_yaw(task.actor, yaw);
                }
                if horizontal_distance(position, center) >= boundary - EVICTION_SLACK {
                    debug!(actor = %task.actor, "intruder cleared the ring");
                    release_evicted(world, task.actor);
                    return false;
                }
            }
            task.elapsed += dt;
            if task.elapsed >= task.max_time {
                debug!(actor = %task.actor, "eviction timed out");
                release_evicted(world, task.actor);
                return false;
            }
            true
        });
    }

    fn scan_for_intruders(&mut self, ctx: &mut TickContext<'_>) {
        let center = self.arena.center;
        let ring = self.arena.ring_radius;
        let participants = [
            Some(self.player().actor()),
            Some(self.enemy().actor()),
            self.trainer,
        ];

        for id in ctx.world.actors_within(center, ring) {
            if participants.contains(&Some(id))
                || ctx.world.kind(id) != Some(ActorKind::Wild)
                || !ctx.world.is_active(id)
                || self.is_evicting(id)
            {
                continue;
            }
            let Some(start) = ctx.world.transform(id).map(|t| t.position) else {
                continue;
            };
            if horizontal_distance(start, center) >= ring {
                continue;
            }
            let task = self.plan_eviction(id, start, ctx.dice);
            ctx.world.set_combat_mode(id, true);
            ctx.world.set_evicting(id, true);
            debug!(actor = %id, target = ?task.target, "evicting intruder");
            self.evictions.push(task);
        }
    }

    fn plan_eviction(&self, actor: ActorId, start: Vec3, dice: &mut dyn Dice) -> EvictionTask {
        let center = self.arena.center;
        let mut radial = flat(start) - flat(center);
        if radial.length_squared() < 1e-4 {
            let angle = dice.range(0.0, TAU);
            radial = Vec2::new(angle.sin(), angle.cos());
        }
        let radial = radial.normalize();
        let out = flat(center) + radial * self.eviction_boundary();
        let target = Vec3::new(out.x, start.y, out.y);
        let max_time = self.config.eviction_base_timeout
            + start.distance(target) / self.config.eviction_speed.max(0.01);
        EvictionTask {
            actor,
            target,
            elapsed: 0.0,
            max_time,
        }
    }

    fn eviction_boundary(&self) -> f32 {
        self.arena.ring_radius + self.config.eviction_clearance.max(0.1)
    }

    fn cancel_evictions(&mut self, world: &mut dyn World) {
        for task in self.evictions.drain(..) {
            release_evicted(world, task.actor);
        }
    }
}

fn scan_interval(config: &EncounterConfig) -> f32 {
    config.eviction_scan_interval.max(0.1)
}

/// Hands an evicted actor back to its own behaviour if it is still around.
fn release_evicted(world: &mut dyn World, actor: ActorId) {
    if world.contains(actor) && world.is_active(actor) {
        world.set_combat_mode(actor, false);
    }
    world.set_evicting(actor, false);
}
