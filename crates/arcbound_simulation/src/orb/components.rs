//! Orb компоненты: ядро lifecycle
//!
//! Один параметризованный orb (kind ∈ {Ember, Maelstrom}) вместо
//! копипасты collision-логики: kind-специфичная политика (урон, фазы,
//! throw) задаётся данными в `OrbTuning`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Вид орба
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum OrbKind {
    /// Базовый контактный орб: одно срабатывание, melee swings пока в руке
    Ember,
    /// Апгрейдируемый орб: incomplete → upgrading → complete, throw
    Maelstrom,
}

/// Orb — эфемерный area-damage entity
///
/// Инвариант: consumed монотонен (false→true, максимум один раз);
/// после consumed ни один contact не имеет эффекта.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Orb {
    pub kind: OrbKind,
    /// Root node кастера — владелец орба
    pub owner_root: Entity,
    /// Casting level, всегда ≥ 1 (клампится при init)
    pub casting_level: u32,
    /// Радиус trigger volume орба (метры)
    pub trigger_radius: f32,
    /// Выключается при consumption — contacts больше не генерируются
    pub trigger_enabled: bool,
    /// Side effect урона/knockback уже применён
    pub consumed: bool,
}

impl Orb {
    pub fn new(kind: OrbKind, owner_root: Entity, casting_level: u32, trigger_radius: f32) -> Self {
        Self {
            kind,
            owner_root,
            casting_level: casting_level.max(1),
            trigger_radius,
            trigger_enabled: true,
            consumed: false,
        }
    }

    pub fn owner_root(&self) -> Entity {
        self.owner_root
    }

    pub fn is_owned_by(&self, node: Entity) -> bool {
        self.owner_root == node
    }
}

/// Ignore set орба: владелец + casting focus
///
/// Immutable после инициализации; сами pairwise директивы выводятся
/// отложенно на первом тике (см. `apply_pending_ignores`), чтобы захватить
/// поздно приаттаченные volumes.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct OrbIgnoreSet {
    /// Casting focus (prop), породивший орб
    pub focus_root: Entity,
    /// Volumes focus-а, снятые на момент каста
    pub focus_volumes: Vec<Entity>,
}

/// Маркер: ignore-пары ещё не выведены (снимается после первого тика)
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct IgnoresPending;

/// Оставшееся время жизни орба
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct OrbLifetime {
    pub remaining: f32,
}

/// Режим движения орба
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub enum OrbMotion {
    /// Кинематическое следование за якорем (рука/focus) с локальным offset
    KinematicFollow { anchor: Entity, offset: Vec3 },
    /// Свободный полёт после броска
    Flight { velocity: Vec3 },
}

/// Фаза апгрейдируемого орба
///
/// Переходы строго вперёд: Incomplete → Upgrading → Complete.
/// Complete — поглощающее состояние.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum OrbPhase {
    Incomplete,
    Upgrading { elapsed: f32 },
    Complete,
}

impl OrbPhase {
    pub fn is_complete(&self) -> bool {
        matches!(self, OrbPhase::Complete)
    }

    /// Перевод в Complete. Поглощающий: повторный вызов — no-op,
    /// возвращает false.
    pub fn complete(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        *self = OrbPhase::Complete;
        true
    }
}

/// Таймер удержания assist-входа вторым игроком
///
/// Сбрасывается при любом разрыве proximity или input до порога.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct AssistHold {
    pub timer: f32,
}

/// Scale-анимация апгрейда (start снимается при входе в Upgrading)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct UpgradeAnim {
    pub start_scale: Vec3,
}

/// Флаги визуальных слоёв (сами эффекты рисует tactical layer)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct VisualLayers {
    pub primary: bool,
    pub secondary: bool,
    pub tertiary: bool,
}

impl Default for VisualLayers {
    fn default() -> Self {
        Self {
            primary: true,
            secondary: false,
            tertiary: false,
        }
    }
}

/// Детерминированный seed для emission flicker в tactical layer
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct FlickerSeed(pub f32);

/// Событие: урон нанесён (3-аргументный контракт: amount, attacker, cause)
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub target: Entity,
    pub amount: u32,
    pub attacker: Entity,
    pub cause: String,
}

/// Событие: орб потреблён (для VFX/аудио в tactical layer)
#[derive(Event, Debug, Clone, Copy)]
pub struct OrbConsumed {
    pub orb: Entity,
    pub owner_root: Entity,
    pub target: Entity,
}

// ============================================================================
// Tuning (kind policy как данные)
// ============================================================================

/// Политика одного вида орба
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbKindPolicy {
    /// Базовый урон при casting level 1
    pub base_damage: f32,
    /// Базовый урон в Complete-фазе (== base_damage для видов без фаз)
    pub base_damage_complete: f32,
    /// Прибавка урона за каждый level выше 1
    pub damage_per_level: f32,
    /// Радиус trigger volume (метры)
    pub trigger_radius: f32,
    /// Fail-safe время жизни (секунды)
    pub lifetime: f32,
    /// Начальный scale орба в руке
    pub spawn_scale: f32,
    /// Cause tag для damage contract
    pub cause: String,
    /// Cause tag после Complete
    pub cause_complete: String,
    /// Визуальный prefab (пустой → fallback при спавне)
    pub prefab_path: String,
}

impl OrbKindPolicy {
    /// `base + per_level * max(0, level-1)`; неубывающий по level
    pub fn compute_damage(&self, complete: bool, level: u32) -> f32 {
        let base = if complete {
            self.base_damage_complete
        } else {
            self.base_damage
        };
        base + self.damage_per_level * level.saturating_sub(1) as f32
    }

    pub fn cause_tag(&self, complete: bool) -> &str {
        if complete {
            &self.cause_complete
        } else {
            &self.cause
        }
    }
}

/// Tuning всех видов орбов (данные, не код)
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct OrbTuning {
    pub ember: OrbKindPolicy,
    pub maelstrom: OrbKindPolicy,
}

impl OrbTuning {
    pub fn policy(&self, kind: OrbKind) -> &OrbKindPolicy {
        match kind {
            OrbKind::Ember => &self.ember,
            OrbKind::Maelstrom => &self.maelstrom,
        }
    }
}

impl Default for OrbTuning {
    fn default() -> Self {
        Self {
            ember: OrbKindPolicy {
                base_damage: 24.0,
                base_damage_complete: 24.0,
                damage_per_level: 6.0,
                trigger_radius: 0.6,
                lifetime: 6.0,
                spawn_scale: 0.2,
                cause: "ember_orb".into(),
                cause_complete: "ember_orb".into(),
                prefab_path: "res://fx/ember_orb.tscn".into(),
            },
            maelstrom: OrbKindPolicy {
                base_damage: 24.0,
                base_damage_complete: 42.0,
                damage_per_level: 4.0,
                trigger_radius: 1.2,
                lifetime: 10.0,
                spawn_scale: 0.5,
                cause: "maelstrom_orb".into(),
                cause_complete: "maelstrom_storm".into(),
                prefab_path: "res://fx/maelstrom_orb.tscn".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_damage_level_scaling() {
        let tuning = OrbTuning::default();

        // level 1 == base
        assert_eq!(tuning.ember.compute_damage(false, 1), 24.0);
        // base 24 + 6 × 2 = 36
        assert_eq!(tuning.ember.compute_damage(false, 3), 36.0);
        // level 0 клампится как level 1 (saturating_sub)
        assert_eq!(tuning.ember.compute_damage(false, 0), 24.0);
    }

    #[test]
    fn test_compute_damage_monotonic_in_level() {
        let tuning = OrbTuning::default();
        let mut previous = 0.0;
        for level in 1..=10 {
            let damage = tuning.maelstrom.compute_damage(false, level);
            assert!(damage >= previous, "damage must be non-decreasing");
            previous = damage;
        }
    }

    #[test]
    fn test_complete_phase_damage_base() {
        let tuning = OrbTuning::default();
        assert_eq!(tuning.maelstrom.compute_damage(false, 1), 24.0);
        assert_eq!(tuning.maelstrom.compute_damage(true, 1), 42.0);
        assert_eq!(tuning.maelstrom.compute_damage(true, 3), 50.0); // 42 + 4×2
    }

    #[test]
    fn test_orb_level_clamped() {
        let orb = Orb::new(OrbKind::Ember, Entity::PLACEHOLDER, 0, 0.6);
        assert_eq!(orb.casting_level, 1);
    }

    #[test]
    fn test_phase_is_complete() {
        assert!(!OrbPhase::Incomplete.is_complete());
        assert!(!OrbPhase::Upgrading { elapsed: 1.0 }.is_complete());
        assert!(OrbPhase::Complete.is_complete());
    }
}
