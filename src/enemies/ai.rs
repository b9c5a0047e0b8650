//! Enemy AI behavior systems.

use bevy::prelude::*;

use super::brain::{BrainAction, EnemyBrain, EnemyState};
use super::components::*;
use super::data::CloseBehavior;
use crate::combat::{spawn_projectile, Faction, Health, Projectile};
use crate::core::{DamageEvent, DeathCause, EnemyDiedEvent, ExplosionEvent, KnockbackEvent};
use crate::player::Player;
use crate::terrain::TileMap;
use crate::world::{ActiveStage, MeshAssets};

/// Horizontal distance at which a charging enemy touches the player.
const CONTACT_DISTANCE: f32 = 1.0;

/// Horizontal offset between two points.
fn horizontal(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z)
}

/// Turn to face `target` without pitching.
fn face(transform: &mut Transform, target: Vec3) {
    let look_target = Vec3::new(target.x, transform.translation.y, target.z);
    if horizontal(transform.translation, look_target).length_squared() > 1e-4 {
        transform.look_at(look_target, Vec3::Y);
    }
}

/// Move horizontally, but only onto standing ground.
fn step_on_ground(transform: &mut Transform, direction: Vec3, distance: f32, tile_map: &TileMap) {
    let Some(direction) = direction.try_normalize() else {
        return;
    };
    let next = transform.translation + direction * distance;
    let feet = next - Vec3::Y * ENEMY_HOVER;
    if tile_map.ground_below(feet, GROUND_CHECK_DISTANCE).is_some() {
        transform.translation = next;
    }
}

/// Evaluate every brain and carry out what it decided.
#[allow(clippy::too_many_arguments)]
pub fn think(
    mut commands: Commands,
    time: Res<Time>,
    tile_map: Res<TileMap>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
    player_query: Query<(Entity, &Transform), (With<Player>, Without<Enemy>)>,
    mut enemies: Query<
        (Entity, &mut Transform, &mut EnemyBrain, &Health, &EnemyStats, &Archetype),
        (With<Enemy>, Without<Player>),
    >,
    mut damage_events: EventWriter<DamageEvent>,
    mut explosion_events: EventWriter<ExplosionEvent>,
    mut died_events: EventWriter<EnemyDiedEvent>,
) {
    let Ok((player, player_transform)) = player_query.get_single() else {
        return;
    };
    let player_pos = player_transform.translation;
    let dt = time.delta_secs();
    let mut assets = MeshAssets::from_resources(meshes.as_deref_mut(), materials.as_deref_mut());

    for (entity, mut transform, mut brain, health, stats, archetype) in enemies.iter_mut() {
        let to_player = horizontal(transform.translation, player_pos);
        let action = brain.tick(dt, to_player.length(), health.ratio());

        match action {
            BrainAction::None => {}
            BrainAction::Approach { speed } => {
                face(&mut transform, player_pos);
                step_on_ground(&mut transform, to_player, speed * dt, &tile_map);
            }
            BrainAction::Retreat { speed } => {
                let away = transform.translation - to_player;
                face(&mut transform, away);
                step_on_ground(&mut transform, -to_player, speed * dt, &tile_map);
            }
            BrainAction::Face => face(&mut transform, player_pos),
            BrainAction::Fire => {
                face(&mut transform, player_pos);
                let Some(projectile) = stats.projectile else {
                    continue;
                };
                let origin = transform.translation;
                let direction = (player_pos - origin).normalize_or_zero();
                spawn_projectile(
                    &mut commands,
                    origin + direction * 0.5,
                    Projectile {
                        velocity: direction * projectile.speed,
                        damage: projectile.damage as i32,
                        lifetime: projectile.lifetime,
                        faction: Faction::Enemy,
                        burn: projectile.burn,
                        source: Some(entity),
                    },
                    assets.as_mut(),
                );
            }
            BrainAction::Strike => {
                face(&mut transform, player_pos);
                damage_events.send(DamageEvent {
                    target: player,
                    source: Some(entity),
                    amount: stats.damage as i32,
                });
            }
            BrainAction::Detonate => {
                let radius = brain
                    .profile()
                    .suicide
                    .map_or(0.0, |rule| rule.explosion_radius);
                explosion_events.send(ExplosionEvent {
                    center: transform.translation,
                    radius,
                    damage: stats.damage as i32,
                });
                died_events.send(EnemyDiedEvent {
                    entity,
                    archetype: archetype.0.clone(),
                    cause: DeathCause::SelfDestruct,
                    experience: 0,
                });
                commands.entity(entity).despawn_recursive();
                info!("{} self-destructed", archetype.0);
            }
        }
    }
}

/// Charging enemies that reach the player hit and push it, then wait.
pub fn charge_contacts(
    player_query: Query<(Entity, &Transform), (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(Entity, &Transform, &mut EnemyBrain, &EnemyStats), With<Enemy>>,
    mut damage_events: EventWriter<DamageEvent>,
    mut knockback_events: EventWriter<KnockbackEvent>,
) {
    let Ok((player, player_transform)) = player_query.get_single() else {
        return;
    };

    for (entity, transform, mut brain, stats) in enemies.iter_mut() {
        if brain.state() != EnemyState::Charge {
            continue;
        }
        let CloseBehavior::Charge { knockback, .. } = brain.profile().close else {
            continue;
        };

        let offset = horizontal(transform.translation, player_transform.translation);
        let vertical = (player_transform.translation.y - transform.translation.y).abs();
        if offset.length() > CONTACT_DISTANCE || vertical > 1.5 {
            continue;
        }

        if brain.try_contact() {
            damage_events.send(DamageEvent {
                target: player,
                source: Some(entity),
                amount: stats.damage as i32,
            });
            knockback_events.send(KnockbackEvent {
                target: player,
                impulse: offset.normalize_or_zero() * knockback,
            });
        }
    }
}

/// Keep standing enemies on the tile surface; start a fall when it is gone.
pub fn follow_ground(
    tile_map: Res<TileMap>,
    mut enemies: Query<(&mut Transform, &mut EnemyBrain), With<Enemy>>,
) {
    for (mut transform, mut brain) in enemies.iter_mut() {
        if brain.is_dead() || brain.is_falling() || brain.state() == EnemyState::Teleporting {
            continue;
        }

        let feet = transform.translation - Vec3::Y * ENEMY_HOVER;
        match tile_map.ground_below(feet, GROUND_CHECK_DISTANCE) {
            Some(surface) => {
                let y = surface + ENEMY_HOVER;
                if (transform.translation.y - y).abs() > 1e-4 {
                    transform.translation.y = y;
                }
            }
            None => {
                brain.start_falling();
            }
        }
    }
}

/// Apply gravity to falling enemies; land them or remove them below the stage.
pub fn fall_enemies(
    mut commands: Commands,
    time: Res<Time>,
    tile_map: Res<TileMap>,
    stage: Res<ActiveStage>,
    mut enemies: Query<(Entity, &mut Transform, &mut EnemyBrain, &Archetype), With<Enemy>>,
    mut died_events: EventWriter<EnemyDiedEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut brain, archetype) in enemies.iter_mut() {
        let Some(drop) = brain.fall(dt, ENEMY_GRAVITY) else {
            continue;
        };

        let feet = transform.translation - Vec3::Y * ENEMY_HOVER;
        if let Some(surface) = tile_map.ground_below(feet, -drop) {
            transform.translation.y = surface + ENEMY_HOVER;
            brain.land();
            continue;
        }
        transform.translation.y += drop;

        if transform.translation.y < stage.dead_zone_y && brain.die() {
            info!("{} fell out of the world", archetype.0);
            died_events.send(EnemyDiedEvent {
                entity,
                archetype: archetype.0.clone(),
                cause: DeathCause::Environment,
                experience: 0,
            });
            commands.entity(entity).despawn_recursive();
        }
    }
}
