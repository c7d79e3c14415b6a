//! Orb lifecycle: каст, ownership, классификация контактов, урон,
//! фазовый FSM, реестр и culling
//!
//! Порядок систем фиксирован (`.chain()`): intents → ignores → движение →
//! contacts → dispatch → фазы → lifetime → culling → registry sync →
//! сброс input edges. Despawn применяется на sync point между системами,
//! поэтому `RemovedComponents<Orb>` отрабатывает в том же тике.

use bevy::prelude::*;

pub mod cast;
pub mod classifier;
pub mod components;
pub mod dispatch;
pub mod focus;
pub mod melee;
pub mod ownership;
pub mod phase;
pub mod registry;

pub use cast::{process_cast_intents, CastOrbIntent};
pub use classifier::{classify_contact, ContactClass, PROTECTED_MONSTER_NAME};
pub use components::{
    AssistHold, DamageDealt, FlickerSeed, IgnoresPending, Orb, OrbConsumed, OrbIgnoreSet,
    OrbKind, OrbKindPolicy, OrbLifetime, OrbMotion, OrbPhase, OrbTuning, UpgradeAnim,
    VisualLayers,
};
pub use dispatch::{dispatch_orb_contacts, MONSTER_LETHAL_DAMAGE};
pub use focus::CastingFocus;
pub use melee::{tick_melee_swings, MeleeDrive, SwingPhase};
pub use ownership::apply_pending_ignores;
pub use phase::{
    follow_anchor, integrate_flight, tick_coop_assist, tick_orb_lifetime, tick_owner_throw,
    tick_upgrade_animation, THROW_SPEED,
};
pub use registry::{
    cull_on_slot_change, despawn_all_under, sync_registry, watch_focus_sentinel, OrbRecord,
    OrbRegistry,
};

use crate::components::input::clear_input_edges;
use crate::equipment::ActiveSlotChanged;
use crate::physics::{detect_orb_contacts, IgnorePairs, OrbContact};

/// Plugin всего orb-lifecycle (события, ресурсы, FixedUpdate цепочка)
pub struct OrbPlugin;

impl Plugin for OrbPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<CastOrbIntent>()
            .add_event::<OrbContact>()
            .add_event::<DamageDealt>()
            .add_event::<OrbConsumed>()
            .add_event::<ActiveSlotChanged>();

        // Ресурсы
        app.init_resource::<OrbTuning>()
            .init_resource::<IgnorePairs>()
            .init_resource::<OrbRegistry>();

        // Регистрация систем в FixedUpdate
        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Инициализация (каст + отложенные ignores)
                process_cast_intents,
                apply_pending_ignores,

                // Фаза 2: Движение (рука или полёт)
                follow_anchor,
                integrate_flight,

                // Фаза 3: Contacts → классификация → урон
                detect_orb_contacts,
                dispatch_orb_contacts,

                // Фаза 4: Upgrade FSM + throw + melee
                tick_coop_assist,
                tick_upgrade_animation,
                tick_owner_throw,
                tick_melee_swings,

                // Фаза 5: Lifetime и culling
                tick_orb_lifetime,
                cull_on_slot_change,
                watch_focus_sentinel,

                // Фаза 6: Registry sync + сброс edge-входов
                sync_registry,
                clear_input_edges,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
