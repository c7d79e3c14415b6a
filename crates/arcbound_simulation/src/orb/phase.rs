//! Фазовый FSM апгрейдируемого орба + движение и lifetime
//!
//! Incomplete → Upgrading → Complete, только вперёд. Апгрейд запускает
//! второй игрок (не владелец), удерживающий assist-вход вплотную к орбу;
//! Complete открывает владельцу throw. Damage base переключается
//! автоматически: dispatcher читает `OrbPhase::is_complete`.

use bevy::prelude::*;

use crate::components::{
    resolve_root, AttachedTo, Health, InputState, PlayerAvatar,
};
use crate::logger::{log, log_info};
use crate::orb::components::{
    AssistHold, Orb, OrbLifetime, OrbMotion, OrbPhase, UpgradeAnim, VisualLayers,
};
use crate::orb::focus::CastingFocus;
use crate::orb::registry::OrbRegistry;

/// Максимальная дистанция ассистента до орба (метры)
pub const ASSIST_RADIUS: f32 = 1.2;
/// Непрерывное удержание assist-входа до старта апгрейда (секунды)
pub const ASSIST_HOLD_SECS: f32 = 0.5;
/// Длительность scale-анимации апгрейда (секунды)
pub const UPGRADE_DURATION: f32 = 2.5;
/// Конечный множитель scale после апгрейда
pub const UPGRADE_SCALE_FACTOR: f32 = 1.25;
/// Скорость брошенного орба (м/с)
pub const THROW_SPEED: f32 = 26.0;
/// Fail-safe lifetime после броска (секунды)
pub const FLIGHT_LIFETIME: f32 = 4.0;

/// Классический smoothstep на [0,1]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Система: кинематическое следование за якорем (рука кастера)
pub fn follow_anchor(
    mut orbs: Query<(&mut Transform, &OrbMotion)>,
    anchors: Query<&Transform, Without<OrbMotion>>,
) {
    for (mut transform, motion) in orbs.iter_mut() {
        let OrbMotion::KinematicFollow { anchor, offset } = *motion else {
            continue;
        };
        // Якорь мог умереть — lifetime/registry доберут орб сами
        let Ok(anchor_transform) = anchors.get(anchor) else {
            continue;
        };
        transform.translation =
            anchor_transform.translation + anchor_transform.rotation * offset;
    }
}

/// Система: интеграция свободного полёта после броска
pub fn integrate_flight(
    time: Res<Time<Fixed>>,
    mut orbs: Query<(&mut Transform, &OrbMotion)>,
) {
    let delta = time.delta_secs();
    for (mut transform, motion) in orbs.iter_mut() {
        let OrbMotion::Flight { velocity } = *motion else {
            continue;
        };
        transform.translation += velocity * delta;
    }
}

/// Система: co-op assist → запуск апгрейда
///
/// Требование: второй player-capable живой актор (не владелец) в пределах
/// ASSIST_RADIUS от орба, assist-вход удерживается непрерывно
/// ASSIST_HOLD_SECS. Любой разрыв (дистанция или вход) сбрасывает таймер.
pub fn tick_coop_assist(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut orbs: Query<(
        Entity,
        &Orb,
        &Transform,
        &mut OrbPhase,
        &mut AssistHold,
        &mut VisualLayers,
    )>,
    assisters: Query<(Entity, &Health, &InputState, &Transform), With<PlayerAvatar>>,
    links: Query<&AttachedTo>,
) {
    let delta = time.delta_secs();

    for (orb_entity, orb, orb_transform, mut phase, mut hold, mut layers) in orbs.iter_mut() {
        if !matches!(*phase, OrbPhase::Incomplete) {
            continue;
        }

        let assisted = assisters.iter().any(|(avatar, health, input, transform)| {
            resolve_root(avatar, &links) != orb.owner_root
                && health.is_alive()
                && input.assist_held
                && transform.translation.distance(orb_transform.translation) <= ASSIST_RADIUS
        });

        if !assisted {
            hold.timer = 0.0;
            continue;
        }

        hold.timer += delta;
        if hold.timer < ASSIST_HOLD_SECS {
            continue;
        }

        *phase = OrbPhase::Upgrading { elapsed: 0.0 };
        layers.secondary = true;
        commands.entity(orb_entity).insert(UpgradeAnim {
            start_scale: orb_transform.scale,
        });
        log_info(&format!("✅ Orb {:?} upgrade started", orb_entity));
    }
}

/// Система: scale-анимация апгрейда + переход в Complete
pub fn tick_upgrade_animation(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut orbs: Query<(
        Entity,
        &mut OrbPhase,
        &mut Transform,
        &UpgradeAnim,
        &mut VisualLayers,
    )>,
) {
    let delta = time.delta_secs();

    for (orb_entity, mut phase, mut transform, anim, mut layers) in orbs.iter_mut() {
        let OrbPhase::Upgrading { elapsed } = &mut *phase else {
            continue;
        };
        *elapsed += delta;

        let t = (*elapsed / UPGRADE_DURATION).clamp(0.0, 1.0);
        let eased = smoothstep(t);
        transform.scale = anim.start_scale * (1.0 + (UPGRADE_SCALE_FACTOR - 1.0) * eased);

        if t >= 1.0 && phase.complete() {
            layers.tertiary = true;
            commands.entity(orb_entity).remove::<UpgradeAnim>();
            log_info(&format!("✅ Orb {:?} upgrade complete", orb_entity));
        }
    }
}

/// Система: throw — только владелец, только Complete, только пока в руке
pub fn tick_owner_throw(
    mut orbs: Query<(Entity, &Orb, &OrbPhase, &mut OrbMotion, &mut OrbLifetime)>,
    owners: Query<(&InputState, &Transform)>,
    mut foci: Query<&mut CastingFocus>,
    mut registry: ResMut<OrbRegistry>,
) {
    for (orb_entity, orb, phase, mut motion, mut lifetime) in orbs.iter_mut() {
        if !phase.is_complete() {
            continue;
        }
        if !matches!(*motion, OrbMotion::KinematicFollow { .. }) {
            continue;
        }
        let Ok((input, owner_transform)) = owners.get(orb.owner_root) else {
            continue;
        };
        if !input.throw_pressed {
            continue;
        }

        let forward: Vec3 = owner_transform.forward().into();
        *motion = OrbMotion::Flight {
            velocity: forward * THROW_SPEED,
        };
        lifetime.remaining = FLIGHT_LIFETIME;

        // Focus возвращается в руку сразу при броске, не дожидаясь despawn
        if let Some(record) = registry.record_mut(orb_entity) {
            if let Some(focus) = record.focus.take() {
                if let Ok(mut focus) = foci.get_mut(focus) {
                    focus.release();
                }
            }
        }

        log_info(&format!(
            "✅ Orb {:?} thrown by {:?} at {} m/s",
            orb_entity, orb.owner_root, THROW_SPEED
        ));
    }
}

/// Система: fail-safe lifetime — орб не живёт дольше положенного
pub fn tick_orb_lifetime(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut orbs: Query<(Entity, &mut OrbLifetime)>,
) {
    let delta = time.delta_secs();
    for (orb_entity, mut lifetime) in orbs.iter_mut() {
        lifetime.remaining -= delta;
        if lifetime.remaining <= 0.0 {
            if let Ok(mut entity) = commands.get_entity(orb_entity) {
                entity.despawn();
            }
            log(&format!("Orb {:?} lifetime expired", orb_entity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        // Клампы за пределами [0,1]
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn test_phase_forward_only() {
        let mut phase = OrbPhase::Incomplete;
        assert!(phase.complete());
        assert!(phase.is_complete());
        // Поглощающее состояние: повторный запрос — no-op
        assert!(!phase.complete());
        assert!(phase.is_complete());
    }
}
