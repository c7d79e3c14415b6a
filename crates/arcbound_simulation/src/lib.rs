//! ARCBOUND Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 (strategic layer)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (game state, orb lifecycle, combat rules)
//! - Host = tactical layer (physics, rendering, raw input)
//!
//! Host общается с симуляцией событиями (`CastOrbIntent`,
//! `ActiveSlotChanged`) и push-компонентами (`InputState`), читает обратно
//! `DamageDealt`/`OrbConsumed` и состояние компонентов.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod equipment;
pub mod logger;
pub mod orb;
pub mod physics;

// Re-export базовых компонентов для удобства
pub use components::*;
pub use equipment::ActiveSlotChanged;
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger,
    set_logger_if_needed, ConsoleLogger, LogLevel, LogPrinter,
};
pub use orb::{
    CastOrbIntent, CastingFocus, ContactClass, DamageDealt, Orb, OrbConsumed, OrbKind,
    OrbPhase, OrbPlugin, OrbRegistry, OrbTuning,
};
pub use physics::{IgnorePairs, OrbContact};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            // Подсистемы (ECS strategic layer)
            .add_plugins(OrbPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_deterministic_rng_same_seed_same_sequence() {
        let mut a = DeterministicRng::new(7);
        let mut b = DeterministicRng::new(7);
        for _ in 0..8 {
            let x: f32 = a.rng.gen_range(0.0..1000.0);
            let y: f32 = b.rng.gen_range(0.0..1000.0);
            assert_eq!(x, y);
        }
    }
}
