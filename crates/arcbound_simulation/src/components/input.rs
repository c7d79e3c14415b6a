//! Host-pushed input state
//!
//! Tactical layer (окно, биндинги, devices) снаружи; симуляция видит только
//! готовый снимок входа на акторе. Push-based: host пишет компонент до
//! FixedUpdate, edge-поля сбрасываются в конце тика системой
//! `clear_input_edges`.

use bevy::prelude::*;

/// Снимок входа игрока на этот тик
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct InputState {
    /// Assist-кнопка удерживается (level-triggered, не сбрасывается)
    pub assist_held: bool,
    /// Удар орбом в этом тике (edge-triggered)
    pub strike_pressed: bool,
    /// Бросок орба в этом тике (edge-triggered)
    pub throw_pressed: bool,
}

/// Система: сброс edge-полей в конце цепочки FixedUpdate
pub fn clear_input_edges(mut inputs: Query<&mut InputState>) {
    for mut input in inputs.iter_mut() {
        input.strike_pressed = false;
        input.throw_pressed = false;
    }
}
