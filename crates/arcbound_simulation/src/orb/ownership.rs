//! Отложенный вывод ignore-пар владельца
//!
//! Вывод идёт на ПЕРВОМ тике орба, не в момент каста: volumes, приаттаченные
//! между кастом и первым тиком, тоже попадают в набор. One-shot O(N) по
//! volumes, дальше маркер снимается.

use bevy::prelude::*;

use crate::components::{resolve_root, AttachedTo, BodyVolume};
use crate::logger::log;
use crate::orb::components::{IgnoresPending, Orb, OrbIgnoreSet};
use crate::physics::IgnorePairs;

/// Система: первый тик орба → pairwise ignores владельца и focus-а
pub fn apply_pending_ignores(
    mut commands: Commands,
    pending: Query<(Entity, &Orb, &OrbIgnoreSet), With<IgnoresPending>>,
    volumes: Query<Entity, With<BodyVolume>>,
    links: Query<&AttachedTo>,
    mut ignores: ResMut<IgnorePairs>,
) {
    for (orb_entity, orb, ignore_set) in pending.iter() {
        let mut count = 0usize;

        // Все volumes, чья цепочка ведёт к владельцу
        for volume in volumes.iter() {
            if resolve_root(volume, &links) == orb.owner_root {
                ignores.ignore(orb_entity, volume);
                count += 1;
            }
        }

        // Focus и его снятые на касте volumes
        ignores.ignore(orb_entity, ignore_set.focus_root);
        for &volume in &ignore_set.focus_volumes {
            ignores.ignore(orb_entity, volume);
            count += 1;
        }

        commands.entity(orb_entity).remove::<IgnoresPending>();
        log(&format!(
            "Orb {:?}: {} owner/focus ignore pair(s) registered",
            orb_entity, count
        ));
    }
}
