//! Позиционирование в мире и визуальные префабы

use bevy::prelude::*;

/// Путь к визуальному prefab в tactical layer
///
/// Симуляция не грузит ассеты; host резолвит путь сам. Пустой или
/// неизвестный путь заменяется fallback-префабом при спавне
/// (gameplay продолжает работать без визуала).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PrefabPath(pub String);
