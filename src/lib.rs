//! Voxel Collapse - a sky-platform action game where the floor falls away.
//!
//! Every floor tile starts a countdown when stepped on and drops out of the
//! world when it runs out. Enemies with per-archetype state machines fight on
//! the same crumbling platform; clearing them exposes the cloud core, and
//! destroying the core opens a portal to a harder stage.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, global events, simulation ordering, timers
//! - **Stage**: Difficulty context, living-enemy population, portal flow
//! - **Terrain**: Collapsible tiles, the tile map, area effects
//! - **Enemies**: Archetype data, brains, teleports, spawners, the cloud core
//! - **Combat**: Health, damage dispatch, projectiles, burns
//! - **Progression**: Experience, levels, upgrades
//! - **Player**: Movement, follow camera, skills, respawning
//! - **World**: Stage files and stage construction
//! - **UI**: HUD and shop panel

pub mod combat;
pub mod core;
pub mod enemies;
pub mod player;
pub mod progression;
pub mod stage;
pub mod terrain;
pub mod ui;
pub mod world;

use bevy::prelude::*;

/// Every gameplay plugin, without any UI. Runs headless.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)
            .add_plugins(stage::StagePlugin)
            .add_plugins(progression::ProgressionPlugin)
            .add_plugins(terrain::TerrainPlugin)
            .add_plugins(player::PlayerPlugin)
            .add_plugins(combat::CombatPlugin)
            .add_plugins(enemies::EnemyPlugin)
            .add_plugins(world::WorldPlugin);
    }
}

/// Main game plugin that adds all sub-plugins.
pub struct VoxelCollapsePlugin;

impl Plugin for VoxelCollapsePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SimulationPlugin).add_plugins(ui::UiPlugin);
    }
}
