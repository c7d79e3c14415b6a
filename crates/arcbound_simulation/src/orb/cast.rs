//! Спавн орбов по intent-событиям
//!
//! Host (или AI) шлёт `CastOrbIntent`; вся инициализация — one-shot до
//! первого contact-тика: владелец, ignore set, lifetime, motion, латч
//! focus-а, регистрация в реестре.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use crate::components::{is_descendant_of, resolve_root, AttachedTo, BodyVolume, PrefabPath};
use crate::logger::{log_info, log_warning};
use crate::orb::components::{
    AssistHold, FlickerSeed, IgnoresPending, Orb, OrbIgnoreSet, OrbKind, OrbLifetime, OrbMotion,
    OrbPhase, OrbTuning, VisualLayers,
};
use crate::orb::focus::CastingFocus;
use crate::orb::melee::MeleeDrive;
use crate::orb::registry::OrbRegistry;
use crate::DeterministicRng;

/// Событие-intent: актор кастует орб
#[derive(Event, Debug, Clone, Copy)]
pub struct CastOrbIntent {
    /// Node кастера (рука/актор — root резолвится по цепочке)
    pub caster: Entity,
    /// Casting focus prop, порождающий орб
    pub focus: Entity,
    pub kind: OrbKind,
    pub level: u32,
}

/// Локальный offset орба от якоря (рука кастера)
pub const HAND_OFFSET: Vec3 = Vec3::new(0.35, 1.1, -0.45);

/// Подстановочный prefab, когда tuning не дал путь
pub const FALLBACK_PREFAB: &str = "res://fx/orb_fallback.tscn";

/// Collision group орбов (для rapier-коллайдера, который читает tactical layer)
pub const ORB_GROUP: Group = Group::GROUP_3;

/// Система: обработка cast intents, спавн полностью инициализированных орбов
pub fn process_cast_intents(
    mut commands: Commands,
    mut intents: EventReader<CastOrbIntent>,
    links: Query<&AttachedTo>,
    volumes: Query<Entity, With<BodyVolume>>,
    mut foci: Query<&mut CastingFocus>,
    transforms: Query<&Transform>,
    tuning: Res<OrbTuning>,
    mut rng: ResMut<DeterministicRng>,
    mut registry: ResMut<OrbRegistry>,
) {
    for intent in intents.read() {
        let owner_root = resolve_root(intent.caster, &links);
        let policy = tuning.policy(intent.kind);

        // MissingAsset degradation: геймплей работает и без визуала
        let prefab = if policy.prefab_path.is_empty() {
            log_warning(&format!(
                "⚠️ Orb kind {:?} has no prefab path, using fallback",
                intent.kind
            ));
            FALLBACK_PREFAB.to_string()
        } else {
            policy.prefab_path.clone()
        };

        // Снимок volumes focus-а на момент каста (для ignore set)
        let focus_volumes: Vec<Entity> = volumes
            .iter()
            .filter(|&v| is_descendant_of(v, intent.focus, &links))
            .collect();

        // Латч видимости: focus прячется, пока орб жив
        let focus_ref = match foci.get_mut(intent.focus) {
            Ok(mut focus) => {
                focus.acquire();
                Some(intent.focus)
            }
            Err(_) => {
                log_warning(&format!(
                    "⚠️ Cast intent without casting focus component on {:?}",
                    intent.focus
                ));
                None
            }
        };

        let anchor_transform = transforms.get(intent.caster).copied().unwrap_or_default();
        let spawn_pos = anchor_transform.translation + anchor_transform.rotation * HAND_OFFSET;

        let orb_entity = commands
            .spawn((
                Orb::new(
                    intent.kind,
                    owner_root,
                    intent.level,
                    policy.trigger_radius,
                ),
                OrbIgnoreSet {
                    focus_root: intent.focus,
                    focus_volumes,
                },
                IgnoresPending,
                OrbLifetime {
                    remaining: policy.lifetime,
                },
                OrbMotion::KinematicFollow {
                    anchor: intent.caster,
                    offset: HAND_OFFSET,
                },
                VisualLayers::default(),
                FlickerSeed(rng.rng.gen_range(0.0..1000.0)),
                PrefabPath(prefab),
                Transform::from_translation(spawn_pos)
                    .with_scale(Vec3::splat(policy.spawn_scale)),
                GlobalTransform::default(),
                // Rapier sensor — не физическое тело, только detection
                // в tactical layer; симуляция делает свой sphere-overlap
                Collider::ball(policy.trigger_radius),
                Sensor,
                CollisionGroups::new(ORB_GROUP, Group::ALL & !ORB_GROUP),
            ))
            .id();

        // Kind-специфичные компоненты
        match intent.kind {
            OrbKind::Ember => {
                commands
                    .entity(orb_entity)
                    .insert(MeleeDrive::new(intent.level));
            }
            OrbKind::Maelstrom => {
                commands
                    .entity(orb_entity)
                    .insert((OrbPhase::Incomplete, AssistHold::default()));
            }
        }

        registry.register(orb_entity, owner_root, focus_ref);
        log_info(&format!(
            "📋 Orb {:?} cast: kind={:?} level={} owner={:?}",
            orb_entity,
            intent.kind,
            intent.level.max(1),
            owner_root
        ));
    }
}
