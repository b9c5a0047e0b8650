//! Cloud core lock state.

use bevy::prelude::*;

use super::components::CloudCore;
use super::spawning::boss_color;
use crate::combat::HitFlash;
use crate::stage::EnemyPopulation;

/// Make the cloud core vulnerable once every enemy is gone.
///
/// Follows the latched population flag, so a frame skipped while the shop is
/// open cannot leave the core locked.
pub fn unlock_boss(
    population: Res<EnemyPopulation>,
    mut bosses: Query<(&mut CloudCore, &mut HitFlash)>,
) {
    if !population.is_cleared() {
        return;
    }

    for (mut core, mut flash) in bosses.iter_mut() {
        if core.locked {
            core.locked = false;
            flash.base_color = boss_color(false);
            info!("Cloud core unlocked");
        }
    }
}

/// Brighten the core's material when it unlocks.
pub fn sync_boss_material(
    bosses: Query<(&CloudCore, &HitFlash, &MeshMaterial3d<StandardMaterial>), Changed<CloudCore>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let Some(mut materials) = materials else {
        return;
    };

    for (_, flash, handle) in bosses.iter() {
        if flash.is_flashing() {
            continue;
        }
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = flash.base_color;
        }
    }
}
