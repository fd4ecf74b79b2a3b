//! Headless wildcatch driver.
//!
//! Spawns a trainer, their starter and one wild creature on flat ground,
//! starts an encounter and plays it out at a fixed 60 Hz step. Useful for
//! replaying a seed, tuning config files and eyeballing the event stream.
//!
//! Usage:
//!   cargo run -p wildcatch-sim -- --seed 7
//!   cargo run -p wildcatch-sim -- --seed 7 --throw-at-turn 2 --json
//!   RUST_LOG=wildcatch_core=debug cargo run -p wildcatch-sim -- --config tuning.json

mod roster;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::Vec3;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wildcatch_core::actor::{ActorId, ActorKind};
use wildcatch_core::creature::{CreatureId, CreatureRecord};
use wildcatch_core::encounter::Encounter;
use wildcatch_core::event::EncounterEvent;
use wildcatch_core::inventory::{CaptureItem, Satchel};
use wildcatch_core::projectile::{LaunchParams, FIXED_DT};
use wildcatch_core::storage::PartyStorage;
use wildcatch_core::world::{Overworld, Terrain, World};
use wildcatch_core::{
    Collaborators, EncounterRequest, EncounterResult, EncounterService, TurnAction,
    WildcatchConfig,
};

use roster::StarterChart;

#[derive(Parser, Debug)]
#[command(name = "wildcatch-sim", about = "Play out one wildcatch encounter headlessly")]
struct Args {
    /// RNG seed for the encounter service.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// JSON config file; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Give up after this many fixed steps.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u32,

    /// Throw a capture orb instead of attacking on this turn.
    #[arg(long)]
    throw_at_turn: Option<u32>,

    /// Catch multiplier of the thrown orb.
    #[arg(long, default_value_t = 1.0)]
    orb_multiplier: f32,

    /// Level of both creatures.
    #[arg(long, default_value_t = 10)]
    level: u8,

    /// Print events as JSON lines instead of text.
    #[arg(long)]
    json: bool,
}

const ORB: &str = "orb";

struct Scene {
    world: Overworld,
    satchel: Satchel,
    party: PartyStorage,
    trainer: ActorId,
    player: ActorId,
    wild: ActorId,
}

impl Scene {
    fn new(level: u8) -> Self {
        let mut world = Overworld::new(Terrain::flat(0.0));
        let trainer = world.spawn(ActorKind::Trainer, Vec3::new(0.0, 0.0, -6.0), 0.4, None);
        let player = world.spawn(
            ActorKind::Companion,
            Vec3::new(0.5, 0.0, -4.0),
            0.5,
            Some(CreatureRecord::new(CreatureId::new(1), roster::emberkit(), level)),
        );
        let wild = world.spawn(
            ActorKind::Wild,
            Vec3::new(0.0, 0.0, 4.0),
            0.5,
            Some(CreatureRecord::new(CreatureId::new(2), roster::sproutle(), level)),
        );
        // A bystander standing inside the ring.
        world.spawn(
            ActorKind::Wild,
            Vec3::new(2.0, 0.0, 1.0),
            0.5,
            Some(CreatureRecord::new(CreatureId::new(3), roster::sproutle(), level)),
        );

        let mut satchel = Satchel::new();
        satchel.add(ORB, 3);

        Self {
            world,
            satchel,
            party: PartyStorage::new(),
            trainer,
            player,
            wild,
        }
    }

    /// Strongest damaging move the player's creature can still use.
    fn best_move(&self) -> usize {
        self.world
            .record(self.player)
            .and_then(|record| {
                record
                    .moves()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, slot)| slot.as_ref().map(|s| (i, s)))
                    .filter(|(_, s)| s.is_usable() && s.def().is_damaging())
                    .max_by_key(|(_, s)| s.def().power)
                    .map(|(i, _)| i)
            })
            .unwrap_or(0)
    }

    fn position(&self, actor: ActorId) -> Vec3 {
        self.world
            .transform(actor)
            .map_or(Vec3::ZERO, |t| t.position)
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<WildcatchConfig> {
    let Some(path) = path else {
        return Ok(WildcatchConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    WildcatchConfig::from_json_str(&json)
        .with_context(|| format!("loading config {}", path.display()))
}

fn print_event(event: &EncounterEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{event:?}");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let mut scene = Scene::new(args.level);
    let mut service = EncounterService::new(config, args.seed).with_type_chart(StarterChart);
    let orb = CaptureItem::new(ORB, "Orb", args.orb_multiplier);

    let request = EncounterRequest::new(scene.player, scene.wild).with_trainer(scene.trainer);
    let id = service
        .start_encounter(&mut scene.world, request, None)
        .context("starting encounter")?;
    info!(encounter = %id, seed = args.seed, "simulation started");

    let mut thrown = false;
    let mut result: Option<EncounterResult> = None;
    for tick in 0..args.max_ticks {
        let waiting = service
            .active_encounter()
            .filter(|e| e.awaiting_player() && !service.capture_latched())
            .map(Encounter::turn_number);

        if let Some(turn) = waiting {
            if !thrown && args.throw_at_turn == Some(turn) {
                thrown = true;
                let from = scene.position(scene.player) + Vec3::Y * 1.5;
                let to = scene.position(scene.wild) + Vec3::Y * 0.5;
                let mut collab =
                    Collaborators::new(&mut scene.world, &mut scene.satchel, &mut scene.party);
                if let Err(err) = service.throw_capture_item(
                    &orb,
                    LaunchParams::ballistic(from, to, 1.0),
                    scene.wild,
                    &mut collab,
                ) {
                    warn!(%err, "throw refused, attacking instead");
                    service.queue_player_action(TurnAction::UseMove(scene.best_move()))?;
                }
            } else {
                service.queue_player_action(TurnAction::UseMove(scene.best_move()))?;
            }
        }

        let mut collab = Collaborators::new(&mut scene.world, &mut scene.satchel, &mut scene.party);
        service.tick(&mut collab, FIXED_DT);

        for event in service.drain_events() {
            print_event(&event, args.json)?;
            if let EncounterEvent::EncounterEnded { result: r, .. } = event {
                result = Some(r);
            }
        }
        if let Some(r) = result {
            info!(result = %r, ticks = tick + 1, caught = scene.party.len(), "simulation finished");
            return Ok(());
        }
    }

    bail!("encounter did not finish within {} ticks", args.max_ticks)
}
