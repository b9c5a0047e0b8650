//! Stage construction from data definitions.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::data::StageDefinition;
use super::visuals::MeshAssets;
use crate::enemies::{spawn_boss, spawn_enemy, EnemyRegistry, EnemySpawner, ENEMY_HOVER};
use crate::player::{spawn_player, PLAYER_FOOT_OFFSET};
use crate::stage::DifficultyContext;
use crate::terrain::{CollapsibleTile, TileCell, TileMap, TileTint};

/// Marker for everything that belongs to the current stage and is removed with it.
#[derive(Component)]
pub struct StageEntity;

/// A tile that moves the player's respawn point and patches them up.
#[derive(Component, Debug, Clone, Copy)]
pub struct SafeZone {
    pub cell: IVec3,
}

/// Per-stage values other plugins read while the stage runs.
#[derive(Resource, Debug, Clone)]
pub struct ActiveStage {
    pub name: String,
    /// Anything below this height is out of the world
    pub dead_zone_y: f32,
}

impl Default for ActiveStage {
    fn default() -> Self {
        Self {
            name: String::new(),
            dead_zone_y: -12.0,
        }
    }
}

const TILE_COLOR_A: Color = Color::srgb(0.56, 0.62, 0.72);
const TILE_COLOR_B: Color = Color::srgb(0.5, 0.56, 0.66);
const SAFE_ZONE_COLOR: Color = Color::srgb(0.3, 0.9, 0.45);

/// Height of the cloud core above its cell's surface.
const BOSS_HOVER: f32 = 1.5;

/// What `build_stage` put into the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltStage {
    pub player_start: Vec3,
    pub tiles: usize,
    pub enemies: usize,
}

/// Build a stage: tiles, safe zones, enemies, spawners, the boss and the player.
pub fn build_stage(
    commands: &mut Commands,
    stage: &StageDefinition,
    difficulty: &DifficultyContext,
    enemy_registry: &EnemyRegistry,
    tile_map: &mut TileMap,
    mut assets: Option<MeshAssets>,
) -> BuiltStage {
    tile_map.reset(stage.tile_size);
    let size = tile_map.tile_size();
    let half = size * 0.5;

    // Lights only matter to a rendering app
    if assets.is_some() {
        setup_environment(commands);
    }

    // One mesh for every tile; materials stay per tile so each can tint on its own
    let tile_mesh = assets
        .as_mut()
        .map(|assets| assets.meshes.add(Cuboid::from_length(size)));

    for &cell in &stage.tiles {
        let tint = if (cell.x + cell.z) % 2 == 0 {
            TILE_COLOR_A
        } else {
            TILE_COLOR_B
        };

        let mut tile = commands.spawn((
            CollapsibleTile::new(difficulty.collapse_delay()),
            TileCell(cell),
            TileTint(tint),
            Transform::from_translation(tile_map.cell_center(cell)),
            Visibility::default(),
            RigidBody::Fixed,
            Collider::cuboid(half, half, half),
            StageEntity,
        ));
        if let (Some(assets), Some(mesh)) = (assets.as_mut(), tile_mesh.as_ref()) {
            tile.insert(assets.shared_mesh(mesh, tint));
        }
        tile_map.insert(cell, tile.id());
    }

    for &cell in &stage.safe_zones {
        let center = tile_map.cell_center(cell);
        let position = Vec3::new(center.x, tile_map.surface_height(cell.y) + 0.02, center.z);
        let mut zone = commands.spawn((
            SafeZone { cell },
            Name::new("Safe Zone"),
            Transform::from_translation(position),
            Visibility::default(),
            StageEntity,
        ));
        if let Some(assets) = assets.as_mut() {
            zone.insert(assets.glowing(Cuboid::new(size * 0.9, 0.04, size * 0.9), SAFE_ZONE_COLOR));
        }
    }

    let mut enemies = 0;
    for spawn in &stage.monster_spawns {
        let descriptor = match enemy_registry.require(&spawn.archetype) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("Skipping monster at {:?}: {}", spawn.cell, e);
                continue;
            }
        };
        let center = tile_map.cell_center(spawn.cell);
        let position = Vec3::new(
            center.x,
            tile_map.surface_height(spawn.cell.y) + ENEMY_HOVER,
            center.z,
        );
        spawn_enemy(
            commands,
            &spawn.archetype,
            descriptor,
            difficulty,
            position,
            assets.as_mut(),
        );
        enemies += 1;
    }

    for spawner in &stage.spawners {
        let cell = IVec3::new(spawner.cell.0, spawner.cell.1, spawner.cell.2);
        let center = tile_map.cell_center(cell);
        commands.spawn((
            EnemySpawner::new(
                spawner.archetype.clone(),
                spawner.interval,
                spawner.range,
                spawner.max_spawns,
            ),
            Name::new(format!("Spawner ({})", spawner.archetype)),
            Transform::from_xyz(center.x, tile_map.surface_height(cell.y) + 1.0, center.z),
            StageEntity,
        ));
    }

    if let Some(cell) = stage.boss {
        // Nothing to clear means nothing guards the core
        let locked = enemies > 0 || !stage.spawners.is_empty();
        let center = tile_map.cell_center(cell);
        let position = Vec3::new(
            center.x,
            tile_map.surface_height(cell.y) + BOSS_HOVER,
            center.z,
        );
        spawn_boss(commands, difficulty, position, locked, assets.as_mut());
    }

    let start = tile_map.cell_center(stage.player_start);
    let player_start = Vec3::new(
        start.x,
        tile_map.surface_height(stage.player_start.y) + PLAYER_FOOT_OFFSET + 0.01,
        start.z,
    );
    spawn_player(commands, player_start, assets.as_mut());

    BuiltStage {
        player_start,
        tiles: stage.tiles.len(),
        enemies,
    }
}

/// Daylight over the platform.
fn setup_environment(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.75, 0.8, 0.95),
        brightness: 400.0,
    });

    commands.spawn((
        DirectionalLight {
            color: Color::srgb(1.0, 0.97, 0.9),
            illuminance: 9000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
        StageEntity,
    ));
}
