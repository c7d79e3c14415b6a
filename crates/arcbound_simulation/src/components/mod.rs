//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: живые существа (Actor, Health, PlayerAvatar, MonsterVitals)
//! - volume: contact volumes и node-иерархия (BodyVolume, AttachedTo)
//! - input: host-pushed input state (InputState)
//! - movement: velocity authority (MovementController)
//! - world: позиционирование/префабы (PrefabPath)

pub mod actor;
pub mod input;
pub mod movement;
pub mod volume;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use input::*;
pub use movement::*;
pub use volume::*;
pub use world::*;
