//! World plugin - stage loading and construction.

use bevy::prelude::*;

use crate::core::GameState;
use crate::enemies::EnemyRegistry;
use crate::player::Player;
use crate::stage::DifficultyContext;
use crate::terrain::TileMap;

use super::builder::{build_stage, ActiveStage, StageEntity};
use super::data::{load_stage_definitions, DataDir, StageRegistry};
use super::visuals::MeshAssets;

/// World plugin - reads stage files and builds the stage for the current level.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DataDir>()
            .init_resource::<StageRegistry>()
            .init_resource::<ActiveStage>()
            .add_systems(Startup, load_stage_definitions)
            .add_systems(OnEnter(GameState::InGame), setup_stage)
            .add_systems(OnExit(GameState::InGame), cleanup_stage);
    }
}

/// Build the stage for the current stage level.
#[allow(clippy::too_many_arguments)]
pub fn setup_stage(
    mut commands: Commands,
    registry: Res<StageRegistry>,
    difficulty: Res<DifficultyContext>,
    enemy_registry: Res<EnemyRegistry>,
    mut tile_map: ResMut<TileMap>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let Some(stage) = registry.for_stage_level(difficulty.stage_level()) else {
        error!("No stage available for level {}", difficulty.stage_level());
        return;
    };

    info!("Building stage {}: {}", difficulty.stage_level(), stage.name);

    let assets = MeshAssets::from_resources(meshes.as_deref_mut(), materials.as_deref_mut());
    let built = build_stage(
        &mut commands,
        stage,
        &difficulty,
        &enemy_registry,
        &mut tile_map,
        assets,
    );

    commands.insert_resource(ActiveStage {
        name: stage.name.clone(),
        dead_zone_y: stage.dead_zone_y,
    });

    info!(
        "Stage ready: {} tiles, {} enemies, player at {:?}",
        built.tiles, built.enemies, built.player_start
    );
}

/// Tear the stage down when leaving InGame.
fn cleanup_stage(
    mut commands: Commands,
    stage_query: Query<Entity, With<StageEntity>>,
    player_query: Query<Entity, With<Player>>,
) {
    for entity in stage_query.iter() {
        commands.entity(entity).despawn_recursive();
    }
    for entity in player_query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
