//! Target classifier: raw contact → семантическая категория
//!
//! Порядок разрешения жёсткий (первое совпадение выигрывает):
//! 1. SelfOwner — physics root контакта == owner root
//! 2. IgnoredAuxiliary — контакт внутри иерархии casting focus
//!    (containment по цепочке предков, не только exact match)
//! 3. PlayerTarget — player capability в цепочке, чужой root, жив
//! 4. MonsterTarget — monster capability на самом contacted volume
//!    (минус один literal-исключённый монстр)
//! 5. Irrelevant — volume перманентно игнорируется
//!
//! Self/auxiliary проверки идут ДО capability probing: кастер и его focus
//! никогда не классифицируются как цель. Player до Monster: player-identity
//! авторитетна, если присутствует.

use bevy::prelude::*;

use crate::components::{
    find_in_chain, is_descendant_of, resolve_root, AttachedTo, Health, MonsterVitals,
    MovementController, PlayerAvatar,
};
use crate::orb::components::{Orb, OrbIgnoreSet};

/// Lookup игроков: classifier читает, dispatcher мутирует через тот же Query
pub type PlayerLookup<'w, 's> = Query<
    'w,
    's,
    (
        &'static PlayerAvatar,
        &'static mut Health,
        Option<&'static mut MovementController>,
    ),
>;

/// Lookup монстров (vitals на contacted volume)
pub type MonsterLookup<'w, 's> = Query<'w, 's, &'static mut MonsterVitals>;

/// Монстр-страж исключён из MonsterTarget диспатча всегда.
/// Это literal-правило для одного конкретного entity, НЕ общий фильтр.
pub const PROTECTED_MONSTER_NAME: &str = "warden_trio (1)";

/// Семантическая категория контакта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactClass {
    /// Контакт с самим кастером — re-assert ignore, no-op
    SelfOwner,
    /// Контакт с casting focus — ignore, no-op
    IgnoredAuxiliary,
    /// Валидная цель-игрок (entity с PlayerAvatar)
    PlayerTarget(Entity),
    /// Валидная цель-монстр (vitals на contacted volume)
    MonsterTarget,
    /// Не цель: перманентный ignore этого конкретного volume
    Irrelevant,
}

/// Классификация одного контакта
pub fn classify_contact(
    orb: &Orb,
    ignore_set: &OrbIgnoreSet,
    volume: Entity,
    links: &Query<&AttachedTo>,
    players: &PlayerLookup,
    monsters: &MonsterLookup,
) -> ContactClass {
    // 1) Владелец
    let contact_root = resolve_root(volume, links);
    if contact_root == orb.owner_root {
        return ContactClass::SelfOwner;
    }

    // 2) Casting focus: containment по цепочке, не exact match
    if is_descendant_of(volume, ignore_set.focus_root, links)
        || ignore_set
            .focus_volumes
            .iter()
            .any(|&fv| is_descendant_of(volume, fv, links))
    {
        return ContactClass::IgnoredAuxiliary;
    }

    // 3) Player capability в цепочке предков
    if let Some(avatar) = find_in_chain(volume, links, |e| players.contains(e)) {
        if resolve_root(avatar, links) == orb.owner_root {
            // Avatar кастера добрался сюда через битый root — считаем self
            return ContactClass::SelfOwner;
        }
        match players.get(avatar) {
            Ok((_, health, _)) if health.is_alive() => {
                return ContactClass::PlayerTarget(avatar);
            }
            // Мёртвый игрок — не цель, дальше не пробуем
            _ => return ContactClass::Irrelevant,
        }
    }

    // 4) Monster capability строго на contacted volume (не на предках)
    if let Ok(vitals) = monsters.get(volume) {
        if vitals.name == PROTECTED_MONSTER_NAME {
            return ContactClass::Irrelevant;
        }
        return ContactClass::MonsterTarget;
    }

    // 5) Не цель
    ContactClass::Irrelevant
}
