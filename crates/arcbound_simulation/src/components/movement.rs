//! Velocity authority акторов
//!
//! Скоростью игрока владеет movement controller, НЕ физическое тело:
//! knockback это velocity nudge, никогда не physics impulse. Tactical layer
//! синхронизирует это значение в своё character body каждый тик.

use bevy::prelude::*;

/// Movement controller — единственный владелец velocity актора
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementController {
    pub velocity: Vec3,
}

impl MovementController {
    /// Knockback как velocity-authority nudge: горизонтальный толчок +
    /// прямая установка вертикальной скорости
    pub fn apply_knockback(&mut self, horizontal: Vec3, vertical_speed: f32) {
        self.velocity.x = horizontal.x;
        self.velocity.z = horizontal.z;
        self.velocity.y = vertical_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knockback_overwrites_velocity() {
        let mut controller = MovementController {
            velocity: Vec3::new(1.0, -3.0, 1.0),
        };

        controller.apply_knockback(Vec3::new(4.0, 0.0, 2.0), 10.5);
        assert_eq!(controller.velocity, Vec3::new(4.0, 10.5, 2.0));
    }
}
