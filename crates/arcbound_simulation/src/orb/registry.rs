//! Реестр живых орбов + owner-scoped culling
//!
//! Явный `Resource`, передаётся системам через `ResMut` — никаких ambient
//! singleton-ов. Записи на уже despawned entity безвредны: disposal идёт
//! через `Commands::get_entity`, мёртвые записи вычищаются лениво в
//! `sync_registry`.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{resolve_root, AttachedTo};
use crate::equipment::ActiveSlotChanged;
use crate::logger::{log, log_info, log_warning};
use crate::orb::components::Orb;
use crate::orb::focus::CastingFocus;

/// Запись реестра: кто владеет орбом и какой focus его породил
#[derive(Debug, Clone, Copy)]
pub struct OrbRecord {
    pub owner: Entity,
    /// None после throw (латч уже отпущен)
    pub focus: Option<Entity>,
}

/// Реестр всех живых орбов симуляции
#[derive(Resource, Debug, Default)]
pub struct OrbRegistry {
    records: HashMap<Entity, OrbRecord>,
}

impl OrbRegistry {
    /// Идемпотентная регистрация (повторный register перезаписывает запись)
    pub fn register(&mut self, orb: Entity, owner: Entity, focus: Option<Entity>) {
        self.records.insert(orb, OrbRecord { owner, focus });
    }

    /// Идемпотентное снятие с учёта; возвращает запись, если была
    pub fn unregister(&mut self, orb: Entity) -> Option<OrbRecord> {
        self.records.remove(&orb)
    }

    pub fn record(&self, orb: Entity) -> Option<&OrbRecord> {
        self.records.get(&orb)
    }

    pub fn record_mut(&mut self, orb: Entity) -> Option<&mut OrbRecord> {
        self.records.get_mut(&orb)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Снимок орбов данного владельца (реестр может мутировать во время
    /// последующего disposal — итерируем по копии)
    pub fn orbs_of(&self, owner: Entity) -> Vec<Entity> {
        self.records
            .iter()
            .filter(|(_, record)| record.owner == owner)
            .map(|(&orb, _)| orb)
            .collect()
    }

    /// Снимок орбов, порождённых данным focus-ом
    pub fn orbs_with_focus(&self, focus: Entity) -> Vec<Entity> {
        self.records
            .iter()
            .filter(|(_, record)| record.focus == Some(focus))
            .map(|(&orb, _)| orb)
            .collect()
    }
}

/// Запрашивает disposal всех орбов владельца; возвращает число задетых.
///
/// Stale-записи (entity уже мёртв) пропускаются молча — их вычистит
/// `sync_registry`. Чужие орбы не трогаются никогда.
pub fn despawn_all_under(
    commands: &mut Commands,
    registry: &OrbRegistry,
    owner_root: Entity,
    reason: &str,
) -> usize {
    let snapshot = registry.orbs_of(owner_root);
    let mut count = 0;
    for orb in &snapshot {
        if let Ok(mut entity) = commands.get_entity(*orb) {
            entity.despawn();
            count += 1;
        }
    }
    if count > 0 {
        log_info(&format!(
            "🗑️ Culled {} orb(s) under owner {:?} (reason: {})",
            count, owner_root, reason
        ));
    }
    count
}

/// Система: смена активного слота → cull всех орбов этого актора
pub fn cull_on_slot_change(
    mut commands: Commands,
    mut events: EventReader<ActiveSlotChanged>,
    links: Query<&AttachedTo>,
    registry: Res<OrbRegistry>,
) {
    for event in events.read() {
        let owner_root = resolve_root(event.actor, &links);
        despawn_all_under(&mut commands, &registry, owner_root, "slot-changed");
    }
}

/// Система: сторож casting focus
///
/// Если focus entity исчез, пока его орбы живы, все орбы под тем же
/// владельцем уходят через реестр. False positives допустимы, пропуски нет.
pub fn watch_focus_sentinel(
    mut commands: Commands,
    mut removed: RemovedComponents<CastingFocus>,
    registry: Res<OrbRegistry>,
) {
    for focus in removed.read() {
        let orphans = registry.orbs_with_focus(focus);
        if orphans.is_empty() {
            continue;
        }
        log_warning(&format!(
            "⚠️ Casting focus {:?} vanished with {} live orb(s)",
            focus,
            orphans.len()
        ));
        // Владелец общий для всех орбов одного focus-а
        if let Some(record) = orphans.first().and_then(|&orb| registry.record(orb)) {
            despawn_all_under(&mut commands, &registry, record.owner, "focus-lost");
        }
    }
}

/// Система: снятие despawned орбов с учёта + release латча focus-а
pub fn sync_registry(
    mut removed: RemovedComponents<Orb>,
    mut registry: ResMut<OrbRegistry>,
    mut foci: Query<&mut CastingFocus>,
) {
    for orb in removed.read() {
        let Some(record) = registry.unregister(orb) else {
            continue;
        };
        log(&format!("Orb {:?} unregistered", orb));
        if let Some(focus) = record.focus {
            if let Ok(mut focus) = foci.get_mut(focus) {
                focus.release();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unregister_idempotent() {
        let mut registry = OrbRegistry::default();
        let orb = Entity::from_raw(7);
        let owner = Entity::from_raw(1);

        registry.register(orb, owner, None);
        registry.register(orb, owner, None);
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister(orb).is_some());
        assert!(registry.unregister(orb).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_orbs_of_filters_by_owner() {
        let mut registry = OrbRegistry::default();
        let owner_a = Entity::from_raw(1);
        let owner_b = Entity::from_raw(2);

        registry.register(Entity::from_raw(10), owner_a, None);
        registry.register(Entity::from_raw(11), owner_a, None);
        registry.register(Entity::from_raw(20), owner_b, None);

        assert_eq!(registry.orbs_of(owner_a).len(), 2);
        assert_eq!(registry.orbs_of(owner_b).len(), 1);
        assert!(registry.orbs_of(Entity::from_raw(99)).is_empty());
    }

    #[test]
    fn test_orbs_with_focus() {
        let mut registry = OrbRegistry::default();
        let focus = Entity::from_raw(5);

        registry.register(Entity::from_raw(10), Entity::from_raw(1), Some(focus));
        registry.register(Entity::from_raw(11), Entity::from_raw(1), None);

        assert_eq!(registry.orbs_with_focus(focus), vec![Entity::from_raw(10)]);
    }
}
