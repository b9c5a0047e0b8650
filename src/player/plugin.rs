//! Player plugin - movement, camera, skills, and respawning.

use bevy::prelude::*;

use super::components::*;
use super::movement::*;
use super::respawn::*;
use super::skills::*;
use crate::core::{GameState, PlayState, SimulationSet};

/// Player plugin - handles the controller, skills, safe zones and respawn.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerConfig>()
            .init_resource::<SpawnPoint>()
            .add_systems(OnEnter(PlayState::Exploring), grab_cursor)
            .add_systems(OnExit(PlayState::Exploring), release_cursor)
            .add_systems(
                Update,
                (
                    record_spawn_point,
                    receive_knockback,
                    tick_cooldowns,
                    mouse_look,
                    player_movement,
                    cast_delay_field,
                    shoot,
                )
                    .chain()
                    .in_set(SimulationSet::Input),
            )
            .add_systems(
                Update,
                (enter_safe_zones, respawn_player)
                    .chain()
                    .in_set(SimulationSet::Stage),
            )
            .add_systems(Update, follow_camera.in_set(SimulationSet::Presentation))
            // The shop toggle and purchases work while the simulation is paused
            .add_systems(
                Update,
                (toggle_shop, shop_input.run_if(in_state(PlayState::Shop)))
                    .run_if(in_state(GameState::InGame)),
            );
    }
}
