//! Casting focus: prop-предмет, порождающий орбы
//!
//! Видимость focus-а — lock-counted latch: каждый живой орб держит lock,
//! последний release возвращает видимость. Сам prop рисует tactical layer,
//! симуляция держит только флаг.

use bevy::prelude::*;

/// Casting focus prop в руке актора
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CastingFocus {
    /// Root node владельца prop-а
    pub owner_root: Entity,
    /// false пока хотя бы один орб жив
    pub visible: bool,
    locks: u32,
}

impl CastingFocus {
    pub fn new(owner_root: Entity) -> Self {
        Self {
            owner_root,
            visible: true,
            locks: 0,
        }
    }

    /// Орб взял lock — focus прячется
    pub fn acquire(&mut self) {
        self.locks += 1;
        self.visible = false;
    }

    /// Орб отпустил lock; последний release показывает focus обратно
    pub fn release(&mut self) {
        self.locks = self.locks.saturating_sub(1);
        if self.locks == 0 {
            self.visible = true;
        }
    }

    pub fn locks(&self) -> u32 {
        self.locks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_reshow_on_last_release() {
        let mut focus = CastingFocus::new(Entity::PLACEHOLDER);
        assert!(focus.visible);

        focus.acquire();
        focus.acquire();
        assert!(!focus.visible);

        focus.release();
        assert!(!focus.visible); // Ещё один lock держится

        focus.release();
        assert!(focus.visible);

        // Лишний release безвреден
        focus.release();
        assert!(focus.visible);
        assert_eq!(focus.locks(), 0);
    }
}
