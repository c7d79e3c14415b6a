//! Physics facade: contact detection + pairwise ignores
//!
//! # Architecture
//! - Орб несёт rapier `Collider::ball` + `Sensor` — их читает tactical layer
//! - Симуляция сама делает детерминированный sphere-overlap каждый тик
//!   и генерирует `OrbContact` события (как hitbox overlap в melee)
//! - `IgnorePairs` — аккумулятор pairwise ignore директив; overlap-система
//!   пропускает такие пары, tactical layer применяет их в своей физике

use bevy::prelude::*;
use std::collections::HashSet;

use crate::components::BodyVolume;
use crate::orb::Orb;

/// Событие: trigger volume орба пересёкся с foreign volume
///
/// Один contact за пару за тик; повторяется пока пара пересекается
/// (trigger-stay семантика). Classifier гасит повторы через ignore.
#[derive(Event, Debug, Clone, Copy)]
pub struct OrbContact {
    pub orb: Entity,
    pub volume: Entity,
}

/// Pairwise ignore директивы (ignore set)
///
/// Пара хранится в каноническом порядке (min, max) — симметрия бесплатно.
/// Директивы не отзываются: ignore перманентен на время жизни орба,
/// а пары мёртвых entity безвредны.
#[derive(Resource, Debug, Default)]
pub struct IgnorePairs {
    pairs: HashSet<(Entity, Entity)>,
}

impl IgnorePairs {
    fn key(a: Entity, b: Entity) -> (Entity, Entity) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Идемпотентная регистрация ignore-пары
    pub fn ignore(&mut self, a: Entity, b: Entity) {
        self.pairs.insert(Self::key(a, b));
    }

    pub fn is_ignored(&self, a: Entity, b: Entity) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Система: sphere-overlap всех живых орбов против contact volumes
///
/// Потреблённые орбы и выключенные volumes не участвуют. Ignore-пары
/// отфильтровываются до эмиссии — classifier их вообще не видит.
pub fn detect_orb_contacts(
    orbs: Query<(Entity, &Orb, &Transform)>,
    volumes: Query<(Entity, &BodyVolume, &Transform)>,
    ignores: Res<IgnorePairs>,
    mut contacts: EventWriter<OrbContact>,
) {
    for (orb_entity, orb, orb_transform) in orbs.iter() {
        if orb.consumed || !orb.trigger_enabled {
            continue;
        }
        let orb_pos = orb_transform.translation;

        for (volume_entity, volume, volume_transform) in volumes.iter() {
            if !volume.enabled {
                continue;
            }
            if ignores.is_ignored(orb_entity, volume_entity) {
                continue;
            }

            let distance = orb_pos.distance(volume_transform.translation);
            if distance < orb.trigger_radius + volume.radius {
                contacts.write(OrbContact {
                    orb: orb_entity,
                    volume: volume_entity,
                });
            }
        }
    }
}
