//! Damage & knockback dispatcher
//!
//! Exactly-once гарантия: consumed flag ставится ДО любого side-effecting
//! вызова; trigger volume выключается; disposal планируется через Commands.
//! Contact после consumption не имеет эффекта.
//!
//! Все capability-вызовы обёрнуты: провал (компонент исчез между
//! классификацией и диспатчем) логируется и трактуется как "no capability" —
//! орб остаётся непотреблённым, volume не помечается ignored, retry возможен
//! только на следующем независимом контакте.

use bevy::prelude::*;

use crate::components::AttachedTo;
use crate::logger::{log, log_info, log_warning};
use crate::orb::classifier::{classify_contact, ContactClass, MonsterLookup, PlayerLookup};
use crate::orb::components::{
    DamageDealt, Orb, OrbConsumed, OrbIgnoreSet, OrbPhase, OrbTuning,
};
use crate::physics::{IgnorePairs, OrbContact};

/// Урон по монстрам: фиксированная летальная константа,
/// уничтожает независимо от оставшегося HP
pub const MONSTER_LETHAL_DAMAGE: u32 = 10_000;

/// Горизонтальная дистанция knockback за уровень (метры)
pub const KNOCKBACK_DIST_PER_LEVEL: f32 = 1.2;
/// Максимум горизонтальной дистанции knockback
pub const KNOCKBACK_DIST_MAX: f32 = 9.0;
/// Базовая вертикальная скорость при knockback (м/с)
pub const KNOCKBACK_RISE_BASE: f32 = 10.0;

/// Velocity-authority knockback: горизонтальный толчок вдоль
/// displacement кастер→орб (scale по level, с клампом) + вертикальная
/// скорость level-scaled константой
pub fn knockback_vector(caster_pos: Vec3, orb_pos: Vec3, level: u32) -> (Vec3, f32) {
    let extra = (level as f32 * KNOCKBACK_DIST_PER_LEVEL).min(KNOCKBACK_DIST_MAX);

    let mut direction = orb_pos - caster_pos;
    direction.y = 0.0;
    let direction = direction.normalize_or_zero();

    (direction * extra, KNOCKBACK_RISE_BASE + extra / 4.0)
}

/// Система: классификация contact событий + диспатч урона
pub fn dispatch_orb_contacts(
    mut commands: Commands,
    mut contacts: EventReader<OrbContact>,
    mut orbs: Query<(&mut Orb, &OrbIgnoreSet, &Transform, Option<&OrbPhase>)>,
    links: Query<&AttachedTo>,
    mut players: PlayerLookup,
    mut monsters: MonsterLookup,
    transforms: Query<&Transform>,
    tuning: Res<OrbTuning>,
    mut ignores: ResMut<IgnorePairs>,
    mut damage_events: EventWriter<DamageDealt>,
    mut consumed_events: EventWriter<OrbConsumed>,
) {
    for contact in contacts.read() {
        // Stale contact: орб уже despawned (например потреблён ранее в этом тике)
        let Ok((mut orb, ignore_set, orb_transform, phase)) = orbs.get_mut(contact.orb) else {
            continue;
        };
        if orb.consumed || !orb.trigger_enabled {
            continue;
        }

        let class = classify_contact(
            &orb,
            ignore_set,
            contact.volume,
            &links,
            &players,
            &monsters,
        );

        match class {
            ContactClass::SelfOwner => {
                // Re-assert ignore, никакого эффекта
                ignores.ignore(contact.orb, contact.volume);
            }
            ContactClass::IgnoredAuxiliary => {
                ignores.ignore(contact.orb, contact.volume);
                log(&format!(
                    "Orb {:?}: contact with casting focus volume {:?} -> ignored",
                    contact.orb, contact.volume
                ));
            }
            ContactClass::Irrelevant => {
                // Перманентный ignore конкретного volume: повторные overlap
                // события по этой паре больше не классифицируются
                ignores.ignore(contact.orb, contact.volume);
            }
            ContactClass::PlayerTarget(avatar) => {
                let complete = phase.is_some_and(|p| p.is_complete());
                let policy = tuning.policy(orb.kind);
                let amount = policy.compute_damage(complete, orb.casting_level).round() as u32;

                let Ok((target, mut health, mover)) = players.get_mut(avatar) else {
                    log_warning(&format!(
                        "Orb {:?}: player capability on {:?} vanished before dispatch, skipping",
                        contact.orb, avatar
                    ));
                    continue;
                };

                // Exactly-once: consumed ставим до side effects
                orb.consumed = true;
                orb.trigger_enabled = false;

                health.take_damage(amount);
                damage_events.write(DamageDealt {
                    target: avatar,
                    amount,
                    attacker: orb.owner_root,
                    cause: policy.cause_tag(complete).to_string(),
                });
                log_info(&format!(
                    "💥 Orb {:?} *** PLAYER HIT *** target='{}' damage={} level={}",
                    contact.orb, target.display_name, amount, orb.casting_level
                ));

                // Knockback: velocity authority, не physics impulse
                if let Some(mut mover) = mover {
                    if let Ok(caster_transform) = transforms.get(orb.owner_root) {
                        let (horizontal, vertical) = knockback_vector(
                            caster_transform.translation,
                            orb_transform.translation,
                            orb.casting_level,
                        );
                        mover.apply_knockback(horizontal, vertical);
                    } else {
                        log("Knockback skipped: owner root has no transform");
                    }
                } else {
                    log("Knockback skipped: target has no movement controller");
                }

                consumed_events.write(OrbConsumed {
                    orb: contact.orb,
                    owner_root: orb.owner_root,
                    target: avatar,
                });
                commands.entity(contact.orb).despawn();
            }
            ContactClass::MonsterTarget => {
                let Ok(mut vitals) = monsters.get_mut(contact.volume) else {
                    log_warning(&format!(
                        "Orb {:?}: monster capability on {:?} vanished before dispatch, skipping",
                        contact.orb, contact.volume
                    ));
                    continue;
                };

                orb.consumed = true;
                orb.trigger_enabled = false;

                vitals.apply_damage(MONSTER_LETHAL_DAMAGE);
                damage_events.write(DamageDealt {
                    target: contact.volume,
                    amount: MONSTER_LETHAL_DAMAGE,
                    attacker: orb.owner_root,
                    cause: tuning.policy(orb.kind).cause_tag(false).to_string(),
                });
                log_info(&format!(
                    "💥 Orb {:?} monster hit '{}' (lethal)",
                    contact.orb, vitals.name
                ));

                consumed_events.write(OrbConsumed {
                    orb: contact.orb,
                    owner_root: orb.owner_root,
                    target: contact.volume,
                });
                commands.entity(contact.orb).despawn();
            }
        }
    }
}
