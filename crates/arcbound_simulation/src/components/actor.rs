//! Базовые компоненты акторов: Actor, Health, PlayerAvatar, MonsterVitals

use bevy::prelude::*;

/// Актор (игрок, NPC, монстр) — базовый компонент для живых существ
///
/// Автоматически добавляет Health через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health)]
pub struct Actor {
    /// Stable ID фракции (для reputation, diplomacy)
    pub faction_id: u64,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Player-identity capability: entity является игроком
///
/// Статически декларируемый интерфейс вместо runtime probing по имени/типу:
/// classifier зависит только от наличия этого компонента в node-цепочке.
/// Контракт damage entry point — строго 3 аргумента (amount, attacker, cause),
/// см. событие `DamageDealt`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PlayerAvatar {
    /// Отображаемое имя (для логов и kill feed)
    pub display_name: String,
}

impl PlayerAvatar {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// Monster-hit capability: единственный numeric damage entry point
///
/// Живёт на contact volume самого монстра (не на предках) — classifier
/// проверяет только contacted entity.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MonsterVitals {
    /// Имя монстра (нужно для literal-исключения, см. classifier)
    pub name: String,
    pub hitpoints: u32,
}

impl MonsterVitals {
    pub fn new(name: impl Into<String>, hitpoints: u32) -> Self {
        Self {
            name: name.into(),
            hitpoints,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hitpoints > 0
    }

    /// Единственный entry point урона по монстру
    pub fn apply_damage(&mut self, amount: u32) {
        self.hitpoints = self.hitpoints.saturating_sub(amount);
    }
}
