//! Melee swings орба в руке (Ember)
//!
//! Пока базовый орб держится, strike-вход запускает swing-секвенцию
//! windup → active → recover. Active-фаза — это transient hitbox у руки
//! (forward reach), живущий один swing; повторные попадания по одному
//! root в пределах swing-а дедуплицируются.

use bevy::prelude::*;

use crate::components::{
    find_in_chain, resolve_root, AttachedTo, BodyVolume, InputState,
};
use crate::logger::{log, log_info};
use crate::orb::classifier::{MonsterLookup, PlayerLookup};
use crate::orb::components::{DamageDealt, Orb, OrbMotion};

/// Windup перед active-фазой (секунды)
pub const SWING_WINDUP: f32 = 0.08;
/// Длительность active hitbox (секунды)
pub const SWING_ACTIVE: f32 = 0.06;
/// Recover после swing-а (секунды)
pub const SWING_RECOVER: f32 = 0.12;
/// Максимум swing-ов на один орб
pub const MAX_SWINGS: u32 = 6;
/// Вынос hitbox вперёд от руки (метры)
pub const SWING_REACH: f32 = 1.7;
/// Радиус swing hitbox (метры)
pub const SWING_HIT_RADIUS: f32 = 1.1;
/// Базовый урон swing-а при level 1
pub const SWING_BASE_DAMAGE: f32 = 24.0;
/// Прибавка урона swing-а за level
pub const SWING_DAMAGE_PER_LEVEL: f32 = 6.0;
/// Горизонтальный velocity nudge цели (м/с), без physics impulse
pub const SWING_PUSH_SPEED: f32 = 4.0;
/// Cause tag урона swing-ов
pub const SWING_CAUSE: &str = "ember_swing";

/// Суммарная длительность melee-режима: 5 + 0.5·(level-1) секунд
pub fn melee_duration(level: u32) -> f32 {
    5.0 + 0.5 * level.saturating_sub(1) as f32
}

/// Урон одного swing-а
pub fn swing_damage(level: u32) -> u32 {
    (SWING_BASE_DAMAGE + SWING_DAMAGE_PER_LEVEL * level.saturating_sub(1) as f32).round() as u32
}

/// Фаза swing-секвенции
#[derive(Clone, Debug, Reflect)]
pub enum SwingPhase {
    /// Ждём strike-вход
    Ready,
    /// Замах (hitbox ещё выключен)
    Windup { elapsed: f32 },
    /// Hitbox активен; roots, уже задетые этим swing-ом
    Active { elapsed: f32, hit_roots: Vec<Entity> },
    /// Восстановление после swing-а
    Recover { elapsed: f32 },
}

/// Драйвер melee-режима орба в руке
#[derive(Component, Clone, Debug, Reflect)]
#[reflect(Component)]
pub struct MeleeDrive {
    pub swings_left: u32,
    /// Оставшееся время melee-режима (секунды)
    pub duration_left: f32,
    pub phase: SwingPhase,
}

impl MeleeDrive {
    pub fn new(level: u32) -> Self {
        Self {
            swings_left: MAX_SWINGS,
            duration_left: melee_duration(level.max(1)),
            phase: SwingPhase::Ready,
        }
    }

    /// Режим исчерпан: время вышло, либо swings кончились и секвенция дотикала
    pub fn is_exhausted(&self) -> bool {
        self.duration_left <= 0.0
            || (self.swings_left == 0 && matches!(self.phase, SwingPhase::Ready))
    }
}

/// Система: тик swing-секвенций + overlap активной фазы
pub fn tick_melee_swings(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut orbs: Query<(Entity, &Orb, &OrbMotion, &mut MeleeDrive)>,
    owners: Query<(&InputState, &Transform)>,
    volumes: Query<(Entity, &BodyVolume, &Transform)>,
    links: Query<&AttachedTo>,
    mut players: PlayerLookup,
    mut monsters: MonsterLookup,
    mut damage_events: EventWriter<DamageDealt>,
) {
    let delta = time.delta_secs();

    for (orb_entity, orb, motion, mut drive) in orbs.iter_mut() {
        // Swings только пока орб в руке
        if !matches!(*motion, OrbMotion::KinematicFollow { .. }) {
            continue;
        }

        drive.duration_left -= delta;
        if drive.is_exhausted() {
            if let Ok(mut entity) = commands.get_entity(orb_entity) {
                entity.despawn();
            }
            log(&format!("Orb {:?} melee exhausted, finishing", orb_entity));
            continue;
        }

        let Ok((input, owner_transform)) = owners.get(orb.owner_root) else {
            continue;
        };

        match &mut drive.phase {
            SwingPhase::Ready => {
                if input.strike_pressed && drive.swings_left > 0 {
                    drive.swings_left -= 1;
                    drive.phase = SwingPhase::Windup { elapsed: 0.0 };
                }
            }
            SwingPhase::Windup { elapsed } => {
                *elapsed += delta;
                if *elapsed >= SWING_WINDUP {
                    drive.phase = SwingPhase::Active {
                        elapsed: 0.0,
                        hit_roots: Vec::new(),
                    };
                }
            }
            SwingPhase::Active { elapsed, hit_roots } => {
                // Transient hitbox у руки: owner position + forward reach
                let forward: Vec3 = owner_transform.forward().into();
                let hitbox_pos = owner_transform.translation + forward * SWING_REACH;
                let amount = swing_damage(orb.casting_level);

                for (volume_entity, volume, volume_transform) in volumes.iter() {
                    if !volume.enabled {
                        continue;
                    }
                    let root = resolve_root(volume_entity, &links);
                    if root == orb.owner_root || hit_roots.contains(&root) {
                        continue;
                    }
                    let distance = hitbox_pos.distance(volume_transform.translation);
                    if distance >= SWING_HIT_RADIUS + volume.radius {
                        continue;
                    }

                    // Один hit на root за swing
                    hit_roots.push(root);

                    if let Some(avatar) =
                        find_in_chain(volume_entity, &links, |e| players.contains(e))
                    {
                        let Ok((_, mut health, mover)) = players.get_mut(avatar) else {
                            continue;
                        };
                        if !health.is_alive() {
                            continue;
                        }
                        health.take_damage(amount);
                        damage_events.write(DamageDealt {
                            target: avatar,
                            amount,
                            attacker: orb.owner_root,
                            cause: SWING_CAUSE.to_string(),
                        });
                        // Толчок без impulse: горизонтальный velocity nudge
                        if let Some(mut mover) = mover {
                            let mut push = volume_transform.translation
                                - owner_transform.translation;
                            push.y = 0.0;
                            let push = push.normalize_or_zero() * SWING_PUSH_SPEED;
                            mover.velocity.x += push.x;
                            mover.velocity.z += push.z;
                        }
                        log_info(&format!(
                            "💥 Orb {:?} swing hit player {:?} for {}",
                            orb_entity, avatar, amount
                        ));
                    } else if let Ok(mut vitals) = monsters.get_mut(volume_entity) {
                        vitals.apply_damage(amount);
                        damage_events.write(DamageDealt {
                            target: volume_entity,
                            amount,
                            attacker: orb.owner_root,
                            cause: SWING_CAUSE.to_string(),
                        });
                        log_info(&format!(
                            "💥 Orb {:?} swing hit monster '{}' for {}",
                            orb_entity, vitals.name, amount
                        ));
                    }
                }

                *elapsed += delta;
                if *elapsed >= SWING_ACTIVE {
                    drive.phase = SwingPhase::Recover { elapsed: 0.0 };
                }
            }
            SwingPhase::Recover { elapsed } => {
                *elapsed += delta;
                if *elapsed >= SWING_RECOVER {
                    drive.phase = SwingPhase::Ready;
                }
            }
        }
    }
}
