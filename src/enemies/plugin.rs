//! Enemy plugin - registers all enemy systems.

use bevy::prelude::*;

use super::ai;
use super::boss::{sync_boss_material, unlock_boss};
use super::data::{load_enemy_definitions, EnemyRegistry};
use super::spawning::run_spawners;
use super::teleport::teleport_enemies;
use crate::core::SimulationSet;

/// Enemy plugin - handles archetype data, brains, spawners and the cloud core.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyRegistry>()
            // Archetype overrides are read once; the builtins stay if none exist
            .add_systems(Startup, load_enemy_definitions)
            .add_systems(
                Update,
                (
                    teleport_enemies,
                    ai::think,
                    ai::charge_contacts,
                    ai::follow_ground,
                    ai::fall_enemies,
                    run_spawners,
                )
                    .chain()
                    .in_set(SimulationSet::Enemies),
            )
            .add_systems(Update, unlock_boss.in_set(SimulationSet::Stage))
            .add_systems(Update, sync_boss_material.in_set(SimulationSet::Presentation));
    }
}
