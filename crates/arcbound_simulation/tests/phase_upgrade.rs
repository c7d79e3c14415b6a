//! Phase FSM integration test
//!
//! Incomplete → Upgrading → Complete (только вперёд), co-op assist с
//! hold-таймером, throw только владельцем и только после Complete.

use std::time::Duration;

use bevy::prelude::*;
use arcbound_simulation::*;
use arcbound_simulation::orb::cast::HAND_OFFSET;
use arcbound_simulation::orb::phase::{FLIGHT_LIFETIME, UPGRADE_SCALE_FACTOR};
use arcbound_simulation::orb::{OrbLifetime, OrbMotion, VisualLayers};

fn create_orb_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

fn tick(app: &mut App) {
    let period = Duration::from_secs_f64(1.0 / 60.0);
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(period);
    app.world_mut().run_schedule(FixedUpdate);
}

fn tick_n(app: &mut App, n: usize) {
    for _ in 0..n {
        tick(app);
    }
}

fn spawn_caster(app: &mut App, position: Vec3) -> (Entity, Entity) {
    let world = app.world_mut();
    let root = world
        .spawn((
            Transform::from_translation(position),
            Actor::default(),
            PlayerAvatar::new("caster"),
            InputState::default(),
            MovementController::default(),
        ))
        .id();
    let focus = world
        .spawn((
            CastingFocus::new(root),
            AttachedTo(root),
            Transform::from_translation(position),
        ))
        .id();
    (root, focus)
}

/// Ассистент: рядом с орбом, но без BodyVolume — contact не с чем делать,
/// participation только через proximity + assist input
fn spawn_assister(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            Actor::default(),
            PlayerAvatar::new("assister"),
            InputState {
                assist_held: true,
                ..default()
            },
        ))
        .id()
}

fn cast_maelstrom(app: &mut App, caster: Entity, focus: Entity) -> Entity {
    app.world_mut().send_event(CastOrbIntent {
        caster,
        focus,
        kind: OrbKind::Maelstrom,
        level: 1,
    });
    tick(app);
    let mut query = app.world_mut().query_filtered::<Entity, With<Orb>>();
    query.iter(app.world()).next().expect("orb spawned")
}

fn phase_of(app: &App, orb: Entity) -> OrbPhase {
    *app.world().get::<OrbPhase>(orb).unwrap()
}

#[test]
fn test_assist_hold_upgrades_to_complete() {
    let mut app = create_orb_app(42);
    let (caster, focus) = spawn_caster(&mut app, Vec3::ZERO);
    let orb = cast_maelstrom(&mut app, caster, focus);
    spawn_assister(&mut app, Vec3::ZERO + HAND_OFFSET + Vec3::new(0.5, 0.0, 0.0));

    assert!(matches!(phase_of(&app, orb), OrbPhase::Incomplete));

    // 0.5s hold → Upgrading
    tick_n(&mut app, 31);
    assert!(matches!(phase_of(&app, orb), OrbPhase::Upgrading { .. }));
    assert!(app.world().get::<VisualLayers>(orb).unwrap().secondary);

    // Ещё 2.5s → Complete, scale ×1.25, третий слой включён
    tick_n(&mut app, 151);
    assert!(phase_of(&app, orb).is_complete());
    let layers = app.world().get::<VisualLayers>(orb).unwrap();
    assert!(layers.secondary && layers.tertiary);

    let policy_scale = app.world().resource::<OrbTuning>().maelstrom.spawn_scale;
    let scale = app.world().get::<Transform>(orb).unwrap().scale;
    let expected = policy_scale * UPGRADE_SCALE_FACTOR;
    assert!((scale.x - expected).abs() < 1e-3);
}

#[test]
fn test_hold_timer_resets_on_input_lapse() {
    let mut app = create_orb_app(42);
    let (caster, focus) = spawn_caster(&mut app, Vec3::ZERO);
    let orb = cast_maelstrom(&mut app, caster, focus);
    let assister = spawn_assister(&mut app, HAND_OFFSET + Vec3::new(0.5, 0.0, 0.0));

    // 20 тиков удержания — меньше порога
    tick_n(&mut app, 20);
    assert!(matches!(phase_of(&app, orb), OrbPhase::Incomplete));

    // Разрыв input на один тик сбрасывает таймер
    app.world_mut()
        .get_mut::<InputState>(assister)
        .unwrap()
        .assist_held = false;
    tick(&mut app);
    app.world_mut()
        .get_mut::<InputState>(assister)
        .unwrap()
        .assist_held = true;

    // Ещё 20 тиков — всё ещё мало (таймер начал заново)
    tick_n(&mut app, 20);
    assert!(matches!(phase_of(&app, orb), OrbPhase::Incomplete));

    // Полные 0.5s непрерывно — апгрейд пошёл
    tick_n(&mut app, 15);
    assert!(matches!(phase_of(&app, orb), OrbPhase::Upgrading { .. }));
}

#[test]
fn test_hold_timer_resets_on_proximity_lapse() {
    let mut app = create_orb_app(42);
    let (caster, focus) = spawn_caster(&mut app, Vec3::ZERO);
    let orb = cast_maelstrom(&mut app, caster, focus);
    let assister = spawn_assister(&mut app, HAND_OFFSET + Vec3::new(0.5, 0.0, 0.0));

    tick_n(&mut app, 20);

    // Ассистент отошёл за радиус
    app.world_mut()
        .get_mut::<Transform>(assister)
        .unwrap()
        .translation = Vec3::new(50.0, 0.0, 0.0);
    tick(&mut app);
    app.world_mut()
        .get_mut::<Transform>(assister)
        .unwrap()
        .translation = HAND_OFFSET + Vec3::new(0.5, 0.0, 0.0);

    tick_n(&mut app, 20);
    assert!(matches!(phase_of(&app, orb), OrbPhase::Incomplete));
}

#[test]
fn test_owner_assist_does_not_upgrade() {
    let mut app = create_orb_app(42);
    let (caster, focus) = spawn_caster(&mut app, Vec3::ZERO);
    let orb = cast_maelstrom(&mut app, caster, focus);

    // Владелец сам держит assist рядом с орбом — не считается
    app.world_mut()
        .get_mut::<InputState>(caster)
        .unwrap()
        .assist_held = true;
    for _ in 0..60 {
        app.world_mut()
            .get_mut::<InputState>(caster)
            .unwrap()
            .assist_held = true;
        tick(&mut app);
    }
    assert!(matches!(phase_of(&app, orb), OrbPhase::Incomplete));
}

#[test]
fn test_throw_requires_complete_and_owner() {
    let mut app = create_orb_app(42);
    let (caster, focus) = spawn_caster(&mut app, Vec3::ZERO);
    let orb = cast_maelstrom(&mut app, caster, focus);
    spawn_assister(&mut app, HAND_OFFSET + Vec3::new(0.5, 0.0, 0.0));

    // Throw до Complete — no-op
    app.world_mut()
        .get_mut::<InputState>(caster)
        .unwrap()
        .throw_pressed = true;
    tick(&mut app);
    assert!(matches!(
        app.world().get::<OrbMotion>(orb).unwrap(),
        OrbMotion::KinematicFollow { .. }
    ));

    // Доводим до Complete
    tick_n(&mut app, 200);
    assert!(phase_of(&app, orb).is_complete());

    // Throw владельцем: полёт 26 м/с, lifetime урезан, латч отпущен
    app.world_mut()
        .get_mut::<InputState>(caster)
        .unwrap()
        .throw_pressed = true;
    tick(&mut app);

    match app.world().get::<OrbMotion>(orb).unwrap() {
        OrbMotion::Flight { velocity } => {
            assert!((velocity.length() - 26.0).abs() < 1e-3);
        }
        other => panic!("expected flight, got {:?}", other),
    }
    let lifetime = app.world().get::<OrbLifetime>(orb).unwrap();
    assert!(lifetime.remaining <= FLIGHT_LIFETIME);
    assert!(app.world().get::<CastingFocus>(focus).unwrap().visible);

    // Позиция уходит вперёд от кастера
    let before = app.world().get::<Transform>(orb).unwrap().translation;
    tick_n(&mut app, 10);
    let after = app.world().get::<Transform>(orb).unwrap().translation;
    assert!(before.distance(after) > 3.0);

    // Полёт конечен: fail-safe добирает орб
    tick_n(&mut app, (FLIGHT_LIFETIME * 60.0) as usize + 5);
    let mut query = app.world_mut().query::<&Orb>();
    assert_eq!(query.iter(app.world()).count(), 0);
    assert!(app.world().resource::<OrbRegistry>().is_empty());
}
