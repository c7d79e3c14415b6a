//! Contact volumes и node-иерархия
//!
//! # Architecture
//! Tactical layer владеет настоящей физикой; симуляция держит своё
//! лёгкое зеркало: sphere volumes + явные parent-ссылки (`AttachedTo`).
//! Physics root = вершина цепочки AttachedTo — аналог rigidbody root
//! в tactical layer.

use bevy::prelude::*;

/// Contact volume (non-solid): используется только для contact detection,
/// никогда для collision response
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct BodyVolume {
    /// Радиус сферы volume (метры)
    pub radius: f32,
    /// Выключенный volume не генерирует contacts
    pub enabled: bool,
}

impl BodyVolume {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            enabled: true,
        }
    }
}

/// Явная parent-ссылка в node-иерархии
///
/// Volume → limb → actor root. Цепочка конечна; root не имеет AttachedTo.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AttachedTo(pub Entity);

/// Предохранитель от циклов в битых иерархиях
const MAX_CHAIN_DEPTH: usize = 16;

/// Вершина цепочки AttachedTo (physics root)
pub fn resolve_root(entity: Entity, links: &Query<&AttachedTo>) -> Entity {
    let mut current = entity;
    for _ in 0..MAX_CHAIN_DEPTH {
        match links.get(current) {
            Ok(link) => current = link.0,
            Err(_) => return current,
        }
    }
    current
}

/// true если `entity` == `ancestor` или лежит под ним в цепочке
pub fn is_descendant_of(entity: Entity, ancestor: Entity, links: &Query<&AttachedTo>) -> bool {
    let mut current = entity;
    for _ in 0..MAX_CHAIN_DEPTH {
        if current == ancestor {
            return true;
        }
        match links.get(current) {
            Ok(link) => current = link.0,
            Err(_) => return false,
        }
    }
    false
}

/// Первый entity в цепочке (включая сам volume), для которого `probe` даёт true
pub fn find_in_chain(
    entity: Entity,
    links: &Query<&AttachedTo>,
    probe: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let mut current = entity;
    for _ in 0..MAX_CHAIN_DEPTH {
        if probe(current) {
            return Some(current);
        }
        match links.get(current) {
            Ok(link) => current = link.0,
            Err(_) => return None,
        }
    }
    None
}
