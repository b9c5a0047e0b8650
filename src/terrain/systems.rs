//! Tile network systems: triggers, area effects, and the per-frame advance.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::map::TileMap;
use super::tile::{CollapsibleTile, TileCell, TilePhase, BURST_COLLAPSE_DELAY, FALL_DISTANCE};
use crate::core::{DamageEvent, DelayFieldEvent, ExplosionEvent, TileSteppedEvent};
use crate::player::{Player, PLAYER_FOOT_OFFSET};

/// Color a tile fades toward while its countdown runs.
const WARNING_COLOR: Color = Color::srgb(0.85, 0.12, 0.1);

/// Base color of a tile. Kept on the tile so the warning tint can blend from it.
#[derive(Component, Debug, Clone, Copy)]
pub struct TileTint(pub Color);

/// Report tiles the player's controller touched this frame.
pub fn detect_controller_tile_contacts(
    player_query: Query<&KinematicCharacterControllerOutput, With<Player>>,
    tiles: Query<(), With<CollapsibleTile>>,
    mut step_events: EventWriter<TileSteppedEvent>,
) {
    let Ok(output) = player_query.get_single() else {
        return;
    };

    let mut touched: Vec<Entity> = Vec::new();
    for collision in &output.collisions {
        if tiles.contains(collision.entity) && !touched.contains(&collision.entity) {
            touched.push(collision.entity);
        }
    }

    for tile in touched {
        step_events.send(TileSteppedEvent { tile });
    }
}

/// Report the tile directly under the player's feet.
///
/// The controller only reports contacts while it is pushed into something,
/// which a grounded player standing still is not.
pub fn detect_tile_under_player(
    player_query: Query<&Transform, With<Player>>,
    tile_map: Res<TileMap>,
    mut step_events: EventWriter<TileSteppedEvent>,
) {
    let Ok(transform) = player_query.get_single() else {
        return;
    };

    let feet = transform.translation - Vec3::Y * PLAYER_FOOT_OFFSET;
    let Some(surface) = tile_map.ground_below(feet, 0.2) else {
        return;
    };

    let cell = tile_map.cell_of(Vec3::new(feet.x, surface - 0.5 * tile_map.tile_size(), feet.z));
    if let Some(tile) = tile_map.tile_at(cell) {
        step_events.send(TileSteppedEvent { tile });
    }
}

/// Start the countdown of stepped-on tiles.
pub fn handle_tile_steps(
    mut step_events: EventReader<TileSteppedEvent>,
    mut tiles: Query<&mut CollapsibleTile>,
) {
    for event in step_events.read() {
        let Ok(mut tile) = tiles.get_mut(event.tile) else {
            continue;
        };
        // Checked first so repeated steps do not mark the tile changed
        if tile.phase() == TilePhase::Stable {
            tile.request_collapse();
        }
    }
}

/// Give every tile in the field a new delay, restarting running countdowns.
pub fn apply_delay_fields(
    mut field_events: EventReader<DelayFieldEvent>,
    tile_map: Res<TileMap>,
    mut tiles: Query<&mut CollapsibleTile>,
) {
    for event in field_events.read() {
        let mut affected = 0;
        let mut rearmed = 0;

        for entity in tile_map.tiles_within(event.center, event.radius) {
            let Ok(mut tile) = tiles.get_mut(entity) else {
                continue;
            };
            affected += 1;
            if tile.rearm(event.delay) {
                rearmed += 1;
            }
        }

        info!(
            "Delay field: {} tile(s) set to {:.1}s, {} countdown(s) restarted",
            affected, event.delay, rearmed
        );
    }
}

/// Collapse every tile in the blast and hurt the player if caught in it.
pub fn apply_explosions(
    mut explosion_events: EventReader<ExplosionEvent>,
    tile_map: Res<TileMap>,
    mut tiles: Query<&mut CollapsibleTile>,
    player_query: Query<(Entity, &Transform), With<Player>>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    for event in explosion_events.read() {
        let mut collapsed = 0;
        for entity in tile_map.tiles_within(event.center, event.radius) {
            if let Ok(mut tile) = tiles.get_mut(entity) {
                if tile.force_collapse(BURST_COLLAPSE_DELAY) {
                    collapsed += 1;
                }
            }
        }
        info!(
            "Explosion at {:?}: {} tile(s) collapsing",
            event.center, collapsed
        );

        if event.damage <= 0 {
            continue;
        }
        if let Ok((player, transform)) = player_query.get_single() {
            if transform.translation.distance(event.center) <= event.radius {
                damage_events.send(DamageEvent {
                    target: player,
                    source: None,
                    amount: event.damage,
                });
            }
        }
    }
}

/// Advance every active tile and apply the result to the world.
pub fn advance_tiles(
    mut commands: Commands,
    time: Res<Time>,
    mut tile_map: ResMut<TileMap>,
    mut tiles: Query<(Entity, &mut CollapsibleTile, &TileCell, &mut Transform)>,
) {
    let dt = time.delta_secs();

    for (entity, mut tile, cell, mut transform) in tiles.iter_mut() {
        if matches!(tile.phase(), TilePhase::Stable | TilePhase::Destroyed) {
            continue;
        }

        match tile.advance(dt) {
            Some(TilePhase::Falling) => {
                tile_map.remove(cell.0);
                commands.entity(entity).remove::<Collider>();
            }
            Some(TilePhase::Destroyed) => {
                tile_map.remove(cell.0);
                commands.entity(entity).despawn_recursive();
                continue;
            }
            _ => {}
        }

        if tile.phase() == TilePhase::Falling {
            let rest = tile_map.cell_center(cell.0);
            transform.translation.y = rest.y - FALL_DISTANCE * tile.fall_progress();
        }
    }
}

/// Tint counting-down tiles and fade falling ones.
pub fn sync_tile_materials(
    materials: Option<ResMut<Assets<StandardMaterial>>>,
    tiles: Query<
        (&CollapsibleTile, &TileTint, &MeshMaterial3d<StandardMaterial>),
        Changed<CollapsibleTile>,
    >,
) {
    let Some(mut materials) = materials else {
        return;
    };

    for (tile, tint, material_handle) in tiles.iter() {
        let Some(material) = materials.get_mut(&material_handle.0) else {
            continue;
        };

        let base = tint.0.mix(&WARNING_COLOR, tile.warning_progress());
        match tile.phase() {
            TilePhase::Falling | TilePhase::Destroyed => {
                material.base_color = WARNING_COLOR.with_alpha(tile.opacity());
                material.alpha_mode = AlphaMode::Blend;
            }
            _ => {
                material.base_color = base;
                material.alpha_mode = AlphaMode::Opaque;
            }
        }
    }
}
