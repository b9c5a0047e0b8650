//! Combat plugin - projectiles, burns and damage.

use bevy::prelude::*;

use super::systems::*;
use crate::core::SimulationSet;

/// Combat plugin - resolves every hit of the frame after enemies have acted.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                move_projectiles,
                projectile_hits,
                apply_burning,
                apply_damage,
                tick_hit_flash,
            )
                .chain()
                .in_set(SimulationSet::Combat),
        )
        .add_systems(Update, sync_flash_material.in_set(SimulationSet::Presentation));
    }
}
