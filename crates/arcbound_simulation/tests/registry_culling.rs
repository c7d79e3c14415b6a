//! Registry culling integration test
//!
//! Смена активного слота и пропажа casting focus убирают ровно орбы
//! одного владельца; чужие орбы не трогаются.

use std::time::Duration;

use bevy::prelude::*;
use arcbound_simulation::*;

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

/// Кастер без жертв рядом: root + рука (вложенный node) + focus
fn spawn_caster(app: &mut App, position: Vec3) -> (Entity, Entity, Entity) {
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
    let hand = world
        .spawn((AttachedTo(root), Transform::from_translation(position)))
        .id();
    let focus = world
        .spawn((
            CastingFocus::new(root),
            AttachedTo(hand),
            Transform::from_translation(position),
        ))
        .id();
    (root, hand, focus)
}

fn cast(app: &mut App, caster: Entity, focus: Entity) {
    app.world_mut().send_event(CastOrbIntent {
        caster,
        focus,
        kind: OrbKind::Maelstrom,
        level: 1,
    });
}

fn live_orbs_of(app: &mut App, owner: Entity) -> usize {
    app.world_mut()
        .query::<&Orb>()
        .iter(app.world())
        .filter(|orb| orb.is_owned_by(owner))
        .count()
}

#[test]
fn test_slot_change_culls_only_that_owner() {
    let mut app = create_orb_app(42);
    // Разнесены, чтобы орбы не контактировали друг с другом
    let (root_a, hand_a, focus_a) = spawn_caster(&mut app, Vec3::ZERO);
    let (root_b, _, focus_b) = spawn_caster(&mut app, Vec3::new(100.0, 0.0, 0.0));

    cast(&mut app, root_a, focus_a);
    cast(&mut app, root_b, focus_b);
    tick(&mut app);

    assert_eq!(app.world().resource::<OrbRegistry>().len(), 2);
    assert!(!app.world().get::<CastingFocus>(focus_a).unwrap().visible);

    // Сигнал приходит на вложенный node (руку) — root резолвится по цепочке
    app.world_mut().send_event(ActiveSlotChanged { actor: hand_a });
    tick(&mut app);

    assert_eq!(live_orbs_of(&mut app, root_a), 0);
    assert_eq!(live_orbs_of(&mut app, root_b), 1);
    assert_eq!(app.world().resource::<OrbRegistry>().len(), 1);

    // Латч владельца A отпущен, B — нет
    assert!(app.world().get::<CastingFocus>(focus_a).unwrap().visible);
    assert!(!app.world().get::<CastingFocus>(focus_b).unwrap().visible);
}

#[test]
fn test_slot_change_without_orbs_is_noop() {
    let mut app = create_orb_app(42);
    let (root_a, _, _) = spawn_caster(&mut app, Vec3::ZERO);

    app.world_mut().send_event(ActiveSlotChanged { actor: root_a });
    tick_n(&mut app, 3);

    assert!(app.world().resource::<OrbRegistry>().is_empty());
}

#[test]
fn test_focus_sentinel_culls_owner_orbs() {
    let mut app = create_orb_app(42);
    let (root_a, _, focus_a) = spawn_caster(&mut app, Vec3::ZERO);
    let (root_b, _, focus_b) = spawn_caster(&mut app, Vec3::new(100.0, 0.0, 0.0));

    cast(&mut app, root_a, focus_a);
    cast(&mut app, root_b, focus_b);
    tick(&mut app);
    assert_eq!(app.world().resource::<OrbRegistry>().len(), 2);

    // Focus A исчезает, пока его орб жив
    app.world_mut().entity_mut(focus_a).despawn();
    tick(&mut app);

    assert_eq!(live_orbs_of(&mut app, root_a), 0);
    assert_eq!(live_orbs_of(&mut app, root_b), 1);
    assert_eq!(app.world().resource::<OrbRegistry>().len(), 1);
}

#[test]
fn test_repeated_slot_change_idempotent() {
    let mut app = create_orb_app(42);
    let (root_a, _, focus_a) = spawn_caster(&mut app, Vec3::ZERO);

    cast(&mut app, root_a, focus_a);
    tick(&mut app);

    app.world_mut().send_event(ActiveSlotChanged { actor: root_a });
    tick(&mut app);
    app.world_mut().send_event(ActiveSlotChanged { actor: root_a });
    tick(&mut app);

    assert!(app.world().resource::<OrbRegistry>().is_empty());
    // Латч не ушёл в минус: focus видим
    assert!(app.world().get::<CastingFocus>(focus_a).unwrap().visible);
    assert_eq!(app.world().get::<CastingFocus>(focus_a).unwrap().locks(), 0);
}
