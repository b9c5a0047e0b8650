//! Terrain plugin - the collapsible tile network.

use bevy::prelude::*;

use super::map::TileMap;
use super::systems::*;
use crate::core::{GameState, SimulationSet};

/// Terrain plugin - tile triggers, area effects, and tile lifecycles.
pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileMap>()
            .add_systems(OnExit(GameState::InGame), clear_tile_map)
            .add_systems(
                Update,
                (
                    detect_controller_tile_contacts,
                    detect_tile_under_player,
                    handle_tile_steps,
                    apply_delay_fields,
                    advance_tiles,
                )
                    .chain()
                    .in_set(SimulationSet::Terrain),
            )
            // Bombers detonate in the Enemies set; the blast lands the same frame
            .add_systems(Update, apply_explosions.in_set(SimulationSet::Blasts))
            .add_systems(
                Update,
                sync_tile_materials.in_set(SimulationSet::Presentation),
            );
    }
}

/// Forget the old stage's tiles; their entities are despawned with the stage.
fn clear_tile_map(mut tile_map: ResMut<TileMap>) {
    let tile_size = tile_map.tile_size();
    tile_map.reset(tile_size);
}
