//! End-to-end tests through [`EncounterService`](crate::service::EncounterService).
//!
//! Each test builds a [`Scene`] (trainer, player creature, wild creature on
//! flat ground) and drives it at the fixed step.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::actor::{horizontal_distance, ActorFlags, ActorId, ActorKind};
use crate::combatant::Side;
use crate::creature::ElementType;
use crate::encounter::{EncounterRequest, EncounterResult, EncounterState};
use crate::error::{CaptureError, EncounterError};
use crate::event::{ActionOutcome, EncounterEvent, RejectReason};
use crate::inventory::{Inventory, ItemId, Satchel};
use crate::storage::CreatureStorage;
use crate::turn::TurnAction;
use crate::world::World;

use super::helpers::{creature_with_moves, mv, orb, Scene, ORB};

fn turn_starts(scene: &Scene) -> Vec<(Side, u32)> {
    scene
        .log
        .iter()
        .filter_map(|e| match e {
            EncounterEvent::PlayerTurnStarted { turn, .. } => Some((Side::Player, *turn)),
            EncounterEvent::EnemyTurnStarted { turn, .. } => Some((Side::Enemy, *turn)),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Encounter lifecycle
// =============================================================================

#[test]
fn test_battle_alternates_turns_until_knockout() {
    let mut scene = Scene::duel(7, 0.5);
    scene.start();

    let result = scene.fight(10_000).expect("battle should finish");
    assert!(matches!(
        result,
        EncounterResult::PlayerFainted | EncounterResult::EnemyFainted
    ));

    let starts = turn_starts(&scene);
    assert!(starts.len() >= 2);
    for (i, (side, turn)) in starts.iter().enumerate() {
        let expected = if i % 2 == 0 { Side::Player } else { Side::Enemy };
        assert_eq!(*side, expected, "turn {i} out of order");
        assert_eq!(*turn as usize, i / 2 + 1);
    }

    assert_eq!(
        scene.count(|e| matches!(e, EncounterEvent::EncounterEnded { .. })),
        1
    );
    let fainted = if result == EncounterResult::PlayerFainted {
        scene.player
    } else {
        scene.enemy
    };
    assert!(!scene.world.is_active(fainted));
    assert!(!scene.world.in_combat_mode(scene.player));
    assert!(!scene.world.in_combat_mode(scene.enemy));
    assert!(!scene.service.is_in_encounter());
    assert_eq!(scene.service.encounter_state(), EncounterState::Idle);
}

#[test]
fn test_fainted_combatant_never_acts() {
    let mut scene = Scene::duel(11, 0.5);
    scene.start();
    scene.fight(10_000).expect("battle should finish");

    let faint_at = scene
        .log
        .iter()
        .position(|e| matches!(e, EncounterEvent::CombatantFainted { .. }))
        .expect("someone fainted");
    assert!(scene.log[faint_at..]
        .iter()
        .all(|e| !matches!(e, EncounterEvent::ActionResolved { .. })));
}

#[test]
fn test_flee_ends_with_run() {
    let mut scene = Scene::duel(1, 0.5);
    scene.start();
    scene.reach_player_turn();

    scene.service.queue_player_action(TurnAction::Flee).unwrap();
    scene.tick();

    assert_eq!(scene.result(), Some(EncounterResult::Run));
    assert_eq!(
        scene.count(|e| matches!(e, EncounterEvent::CombatantFainted { .. })),
        0
    );
    assert!(!scene.world.in_combat_mode(scene.player));
    assert!(!scene.world.in_combat_mode(scene.enemy));
    assert_eq!(
        scene.service.queue_player_action(TurnAction::UseMove(0)),
        Err(EncounterError::NoActiveEncounter)
    );
}

#[test]
fn test_double_knockout_resolves_as_player_fainted() {
    let mut scene = Scene::duel(2, 0.5);
    for actor in [scene.player, scene.enemy] {
        scene.world.record_mut(actor).unwrap().set_current_hp(0);
    }
    scene.start();
    assert!(scene.tick_until(600, |s| s.result().is_some()));

    assert_eq!(scene.result(), Some(EncounterResult::PlayerFainted));
    let fainted: Vec<Side> = scene
        .log
        .iter()
        .filter_map(|e| match e {
            EncounterEvent::CombatantFainted { side, .. } => Some(*side),
            _ => None,
        })
        .collect();
    assert_eq!(fainted, vec![Side::Player, Side::Enemy]);
    assert!(turn_starts(&scene).is_empty());
}

#[test]
fn test_start_rejects_bad_requests_without_side_effects() {
    let mut scene = Scene::duel(3, 0.5);
    let missing = ActorId::new(999);
    let (player, enemy, trainer) = (scene.player, scene.enemy, scene.trainer);

    let cases = [
        (
            EncounterRequest::new(player, player),
            EncounterError::SameActor(player),
        ),
        (
            EncounterRequest::new(player, missing),
            EncounterError::MissingActor(missing),
        ),
        (
            EncounterRequest::new(player, enemy).with_trainer(missing),
            EncounterError::MissingActor(missing),
        ),
        (
            EncounterRequest::new(trainer, enemy),
            EncounterError::MissingRecord(trainer),
        ),
    ];
    for (request, expected) in cases {
        let err = scene
            .service
            .start_encounter(&mut scene.world, request, None)
            .unwrap_err();
        assert_eq!(err, expected);
    }
    assert!(!scene.service.is_in_encounter());
    assert!(scene.service.drain_events().is_empty());
    assert!(!scene.world.in_combat_mode(enemy));

    scene.start();
    let request = scene.request();
    assert_eq!(
        scene
            .service
            .start_encounter(&mut scene.world, request, None)
            .unwrap_err(),
        EncounterError::AlreadyActive
    );
}

#[test]
fn test_end_callback_runs_once() {
    let mut scene = Scene::duel(4, 0.5);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let request = scene.request();
    scene
        .service
        .start_encounter(
            &mut scene.world,
            request,
            Some(Box::new(move |result: EncounterResult| {
                sink.borrow_mut().push(result);
            })),
        )
        .unwrap();

    scene.service.force_end(&mut scene.world);
    scene.service.force_end(&mut scene.world);
    scene.tick();

    assert_eq!(*seen.borrow(), vec![EncounterResult::ForcedEnd]);
}

#[test]
fn test_enemy_without_usable_moves_skips() {
    let player = creature_with_moves(
        1,
        ElementType::Fire,
        10,
        vec![mv("Growl", ElementType::Normal, 0, 100, 10)],
    );
    let mut enemy = creature_with_moves(
        2,
        ElementType::Grass,
        10,
        vec![mv("Tackle", ElementType::Normal, 40, 100, 1)],
    );
    assert!(enemy.consume_move_use(0));
    let mut scene = Scene::new(5, player, enemy);
    scene.start();

    let skipped = |s: &Scene| {
        s.count(|e| {
            matches!(
                e,
                EncounterEvent::ActionResolved {
                    side: Side::Enemy,
                    action: None,
                    outcome: ActionOutcome::Skipped,
                    ..
                }
            )
        }) > 0
    };
    for _ in 0..1000 {
        if skipped(&scene) {
            break;
        }
        if scene.awaiting_player() {
            scene.service.queue_player_action(TurnAction::UseMove(0)).unwrap();
        }
        scene.tick();
    }
    assert!(skipped(&scene));
    assert!(scene.service.is_in_encounter());
}

// =============================================================================
// Capture
// =============================================================================

#[test]
fn test_certain_capture_ends_encounter() {
    let mut scene = Scene::duel(3, 0.5);
    scene.start();
    scene.reach_player_turn();

    scene.throw(&orb(2.0)).unwrap();
    assert!(scene.service.capture_latched());
    assert_eq!(scene.satchel.quantity(&ItemId::from(ORB)), 4);

    assert!(scene.tick_until(600, |s| s.result().is_some()));
    assert_eq!(scene.result(), Some(EncounterResult::Capture));
    assert!(!scene.world.contains(scene.enemy));
    assert_eq!(scene.storage.len(), 1);
    assert!(!scene.service.capture_latched());
    assert!(!scene.service.is_in_encounter());
    assert!(!scene.world.in_combat_mode(scene.player));
    assert_eq!(
        scene.count(|e| matches!(e, EncounterEvent::CaptureShake { .. })),
        3
    );
    assert!(scene.log.iter().any(|e| matches!(
        e,
        EncounterEvent::CaptureResolved { success: true, chance, .. }
            if (*chance - 1.0).abs() < f32::EPSILON
    )));
    assert_eq!(
        scene.count(|e| matches!(e, EncounterEvent::ActionResolved { .. })),
        0
    );
}

#[test]
fn test_failed_capture_consumes_player_turn() {
    let mut scene = Scene::duel(5, 0.0);
    scene.start();
    scene.reach_player_turn();
    scene.throw(&orb(1.0)).unwrap();

    let acted = |s: &Scene| s.count(|e| matches!(e, EncounterEvent::ActionResolved { .. })) > 0;
    assert!(scene.tick_until(600, acted));

    let resolved_at = scene
        .log
        .iter()
        .position(|e| matches!(e, EncounterEvent::CaptureResolved { success: false, .. }))
        .expect("capture resolved");
    let acted_at = scene
        .log
        .iter()
        .position(|e| matches!(e, EncounterEvent::ActionResolved { .. }))
        .expect("turn resolved");
    assert!(resolved_at < acted_at);
    assert!(matches!(
        scene.log[acted_at],
        EncounterEvent::ActionResolved {
            side: Side::Player,
            action: None,
            outcome: ActionOutcome::TurnConsumed,
            ..
        }
    ));

    assert!(scene.world.is_active(scene.enemy));
    assert!(scene.world.in_combat_mode(scene.enemy));
    assert!(!scene.service.capture_latched());
    assert!(scene.tick_until(600, |s| turn_starts(s).len() >= 2));
    assert_eq!(turn_starts(&scene)[1].0, Side::Enemy);
}

#[test]
fn test_second_concurrent_throw_is_rejected() {
    let mut scene = Scene::duel(6, 0.5);
    scene.start();
    scene.reach_player_turn();

    scene.throw(&orb(1.0)).unwrap();
    let err = scene.throw(&orb(1.0)).unwrap_err();

    assert_eq!(err, CaptureError::LatchHeld);
    assert_eq!(scene.satchel.quantity(&ItemId::from(ORB)), 4);
    assert_eq!(scene.service.active_sessions().len(), 1);
    assert!(matches!(
        scene.log.last(),
        Some(EncounterEvent::CaptureRejected {
            reason: RejectReason::LatchHeld,
            ..
        })
    ));
}

#[test]
fn test_throw_without_stock_takes_no_latch() {
    let mut scene = Scene::duel(6, 0.5);
    scene.satchel = Satchel::new();
    scene.start();
    scene.reach_player_turn();

    let err = scene.throw(&orb(1.0)).unwrap_err();
    assert_eq!(err, CaptureError::ItemUnavailable(ItemId::from(ORB)));
    assert!(!scene.service.capture_latched());
    assert!(scene.service.active_sessions().is_empty());
}

#[test]
fn test_force_end_mid_capture_restores_everything() {
    let mut scene = Scene::duel(9, 0.0);
    scene.start();
    scene.reach_player_turn();
    scene.throw(&orb(1.0)).unwrap();

    let struck = |s: &Scene| s.count(|e| matches!(e, EncounterEvent::CaptureStruck { .. })) > 0;
    assert!(scene.tick_until(300, struck));
    assert!(!scene.world.is_active(scene.enemy));

    scene.service.force_end(&mut scene.world);
    scene.drain();

    assert_eq!(scene.result(), Some(EncounterResult::ForcedEnd));
    assert!(!scene.service.capture_latched());
    assert!(!scene.service.is_in_encounter());
    assert!(scene.service.active_sessions().is_empty());
    assert!(scene.world.is_active(scene.enemy));
    assert!(!scene.world.in_combat_mode(scene.enemy));
    assert!(!scene.world.in_combat_mode(scene.player));
    assert_eq!(
        scene.count(|e| matches!(e, EncounterEvent::CaptureAborted { .. })),
        1
    );

    for _ in 0..200 {
        scene.tick();
    }
    assert_eq!(
        scene.count(|e| matches!(e, EncounterEvent::CaptureResolved { .. })),
        0
    );
}

#[test]
fn test_stale_ticket_cannot_release_new_latch() {
    let mut scene = Scene::duel(10, 0.5);
    scene.start();
    let stale = scene.service.begin_capture_attempt().unwrap();
    scene.service.force_end(&mut scene.world);
    scene.tick();

    scene.start();
    let _fresh = scene.service.begin_capture_attempt().unwrap();
    assert!(scene.service.capture_latched());

    scene.service.notify_capture_failed(stale);
    assert!(scene.service.capture_latched());
}

#[test]
fn test_overworld_throw_needs_no_encounter() {
    let mut scene = Scene::duel(12, 0.5);
    scene.throw(&orb(2.0)).unwrap();
    assert!(!scene.service.capture_latched());

    let resolved = |s: &Scene| s.count(|e| matches!(e, EncounterEvent::CaptureResolved { .. })) > 0;
    assert!(scene.tick_until(600, resolved));
    assert!(!scene.world.contains(scene.enemy));
    assert_eq!(scene.storage.len(), 1);
    assert!(scene.storage.has_caught_first());
    assert!(scene.storage.has_room());
}

#[test]
fn test_encounter_refused_while_overworld_device_is_in_flight() {
    let mut scene = Scene::duel(12, 0.5);
    scene.throw(&orb(2.0)).unwrap();
    scene.tick();

    let request = scene.request();
    let err = scene
        .service
        .start_encounter(&mut scene.world, request, None)
        .unwrap_err();
    assert_eq!(err, EncounterError::TargetBusy(scene.enemy));
    assert!(!scene.service.is_in_encounter());
    assert!(!scene.world.in_combat_mode(scene.enemy));

    let resolved = |s: &Scene| s.count(|e| matches!(e, EncounterEvent::CaptureResolved { .. })) > 0;
    assert!(scene.tick_until(600, resolved));
    assert!(!scene.world.contains(scene.enemy));
    assert_eq!(scene.storage.len(), 1);
    assert!(!scene.service.is_in_encounter());
    assert_eq!(scene.result(), None);
}

#[test]
fn test_encounter_refused_against_hidden_enemy() {
    let mut scene = Scene::duel(13, 0.5);
    scene.world.set_active(scene.enemy, false);

    let request = scene.request();
    let err = scene
        .service
        .start_encounter(&mut scene.world, request, None)
        .unwrap_err();
    assert_eq!(err, EncounterError::TargetBusy(scene.enemy));
    assert!(scene.service.drain_events().is_empty());

    scene.world.set_active(scene.enemy, true);
    scene.start();
    assert!(scene.service.is_in_encounter());
}

// =============================================================================
// Arena upkeep
// =============================================================================

#[test]
fn test_intruder_is_evicted_then_released() {
    let mut scene = Scene::duel(13, 0.5);
    let intruder = scene
        .world
        .spawn(ActorKind::Wild, Vec3::new(1.0, 0.0, 0.5), 0.5, None);
    scene.start();

    assert!(scene.world.in_combat_mode(intruder));
    assert!(scene
        .world
        .flags(intruder)
        .unwrap()
        .contains(ActorFlags::EVICTING));

    assert!(scene.tick_until(400, |s| !s.world.in_combat_mode(intruder)));
    let config = &scene.service.config().encounter;
    let cleared = config.ring_radius + config.eviction_clearance - 0.05;
    let center = scene.service.active_encounter().unwrap().arena().center;
    assert!(horizontal_distance(scene.position(intruder), center) >= cleared - 1e-3);
    assert!(!scene
        .world
        .flags(intruder)
        .unwrap()
        .contains(ActorFlags::EVICTING));
}

#[test]
fn test_trainer_is_leashed_to_ring() {
    let mut scene = Scene::duel(14, 0.5);
    scene.start();
    scene.reach_player_turn();

    scene.world.set_position(scene.trainer, Vec3::new(0.0, 2.0, -30.0));
    scene.tick();

    let pos = scene.position(scene.trainer);
    let center = scene.service.active_encounter().unwrap().arena().center;
    let radius = scene.service.config().encounter.ring_radius;
    assert!((horizontal_distance(pos, center) - radius).abs() < 1e-3);
    assert!((pos.y - 2.0).abs() < f32::EPSILON);
}

#[test]
fn test_combatants_are_placed_facing_each_other() {
    let mut scene = Scene::duel(15, 0.5);
    scene.start();
    scene.reach_player_turn();

    let offset = scene.service.config().encounter.combatant_offset;
    assert!((scene.position(scene.player) - Vec3::new(0.0, 0.0, -offset)).length() < 1e-3);
    assert!((scene.position(scene.enemy) - Vec3::new(0.0, 0.0, offset)).length() < 1e-3);

    let forward = scene.world.transform(scene.player).unwrap().forward();
    assert!(forward.dot(Vec3::Z) > 0.99);
}
