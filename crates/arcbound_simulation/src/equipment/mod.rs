//! Equipment-change сигналы от host layer
//!
//! Hotbar/инвентарь живут снаружи; симуляция видит только факт смены
//! активного слота. Сигнал сознательно грубый: он может приходить и когда
//! слот сменился "вхолостую" — false positives допустимы, пропуски нет.

use bevy::prelude::*;

/// Событие: актор сменил активный слот экипировки
#[derive(Event, Debug, Clone, Copy)]
pub struct ActiveSlotChanged {
    /// Любой node актора; consumer сам резолвит root
    pub actor: Entity,
}
