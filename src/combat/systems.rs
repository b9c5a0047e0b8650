//! Combat systems - projectiles, burns, damage dispatch and hit feedback.

use bevy::prelude::*;

use super::components::*;
use crate::core::{BossDefeatedEvent, DamageEvent, DeathCause, EnemyDiedEvent};
use crate::enemies::{Archetype, CloudCore, EnemyBrain, EnemyStats};
use crate::player::Player;
use crate::progression::PlayerProgression;
use crate::terrain::{CollapsibleTile, TileMap, TilePhase, BURST_COLLAPSE_DELAY};
use crate::world::{MeshAssets, StageEntity};

/// Color shown while an entity flashes.
const FLASH_COLOR: Color = Color::WHITE;

/// Spawn a projectile at `origin`.
pub fn spawn_projectile(
    commands: &mut Commands,
    origin: Vec3,
    projectile: Projectile,
    assets: Option<&mut MeshAssets>,
) -> Entity {
    let color = match (projectile.faction, projectile.burn.is_some()) {
        (Faction::Player, _) => Color::srgb(0.4, 0.8, 1.0),
        (Faction::Enemy, true) => Color::srgb(1.0, 0.45, 0.1),
        (Faction::Enemy, false) => Color::srgb(0.9, 0.2, 0.6),
    };

    let mut entity = commands.spawn((
        projectile,
        Name::new("Projectile"),
        Transform::from_translation(origin),
        Visibility::default(),
        StageEntity,
    ));

    if let Some(assets) = assets {
        entity.insert(assets.glowing(Sphere::new(0.15), color));
    }

    entity.id()
}

/// Move projectiles and expire them at the end of their lifetime.
pub fn move_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile)>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut projectile) in projectiles.iter_mut() {
        transform.translation += projectile.velocity * dt;
        projectile.lifetime -= dt;
        if projectile.lifetime <= 0.0 {
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// Resolve projectile hits against bodies and tiles.
///
/// Enemy shots hurt the player and knock out the tile they strike. Player
/// shots hurt enemies and the cloud core.
#[allow(clippy::too_many_arguments)]
pub fn projectile_hits(
    mut commands: Commands,
    tile_map: Res<TileMap>,
    projectiles: Query<(Entity, &Transform, &Projectile)>,
    player_query: Query<(Entity, &Transform), With<Player>>,
    mut burning: Query<&mut Burning, With<Player>>,
    targets: Query<(Entity, &Transform, &Damageable), Without<Player>>,
    mut tiles: Query<&mut CollapsibleTile>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let player = player_query.get_single().ok();

    for (entity, transform, projectile) in projectiles.iter() {
        // Already expired this frame
        if projectile.lifetime <= 0.0 {
            continue;
        }
        let position = transform.translation;

        let hit_body = match projectile.faction {
            Faction::Enemy => player
                .filter(|(_, player_transform)| {
                    player_transform.translation.distance(position) <= PROJECTILE_HIT_RADIUS
                })
                .map(|(player, _)| player),
            Faction::Player => targets
                .iter()
                .filter(|(target, _, kind)| {
                    **kind != Damageable::Player && Some(*target) != projectile.source
                })
                .find(|(_, target_transform, _)| {
                    target_transform.translation.distance(position) <= PROJECTILE_HIT_RADIUS + 0.3
                })
                .map(|(target, _, _)| target),
        };

        if let Some(target) = hit_body {
            damage_events.send(DamageEvent {
                target,
                source: projectile.source,
                amount: projectile.damage,
            });

            if let Some(burn) = projectile.burn {
                match burning.get_mut(target) {
                    Ok(mut active) => active.restart(burn),
                    Err(_) => {
                        commands.entity(target).insert(Burning::new(burn));
                    }
                }
            }
            commands.entity(entity).despawn_recursive();
            continue;
        }

        let Some(tile_entity) = tile_map.tile_containing(position) else {
            continue;
        };
        if projectile.faction == Faction::Enemy {
            if let Ok(mut tile) = tiles.get_mut(tile_entity) {
                if tile.phase() == TilePhase::Stable {
                    tile.set_pending_delay(BURST_COLLAPSE_DELAY);
                    tile.request_collapse();
                }
            }
        }
        commands.entity(entity).despawn_recursive();
    }
}

/// Deal burn damage to the player and drop finished burns.
pub fn apply_burning(
    mut commands: Commands,
    time: Res<Time>,
    mut burning: Query<(Entity, &mut Burning)>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    for (entity, mut burn) in burning.iter_mut() {
        let damage = burn.tick(time.delta_secs());
        if damage > 0 {
            damage_events.send(DamageEvent {
                target: entity,
                source: None,
                amount: damage as i32,
            });
        }
        if burn.is_finished() {
            commands.entity(entity).remove::<Burning>();
        }
    }
}

/// Dispatch damage by what the target is.
#[allow(clippy::type_complexity)]
pub fn apply_damage(
    mut commands: Commands,
    mut damage_events: EventReader<DamageEvent>,
    mut progression: ResMut<PlayerProgression>,
    mut targets: Query<(
        &Damageable,
        &Transform,
        Option<&mut Health>,
        Option<&mut HitFlash>,
        Option<&mut EnemyBrain>,
        Option<&EnemyStats>,
        Option<&Archetype>,
        Option<&CloudCore>,
    )>,
    mut died_events: EventWriter<EnemyDiedEvent>,
    mut boss_events: EventWriter<BossDefeatedEvent>,
) {
    for event in damage_events.read() {
        let Ok((kind, transform, health, flash, brain, stats, archetype, core)) =
            targets.get_mut(event.target)
        else {
            continue;
        };
        if event.amount <= 0 {
            continue;
        }

        match kind {
            Damageable::Player => {
                if progression.apply_damage(event.amount as u32) {
                    info!("Player was defeated");
                }
            }
            Damageable::Enemy => {
                let (Some(mut health), Some(mut brain)) = (health, brain) else {
                    continue;
                };
                if brain.is_dead() {
                    continue;
                }
                health.take_damage(event.amount);
                if let Some(mut flash) = flash {
                    flash.trigger();
                }
                if health.is_dead() && brain.die() {
                    let archetype = archetype.map(|a| a.0.clone()).unwrap_or_default();
                    debug!("{} slain", archetype);
                    died_events.send(EnemyDiedEvent {
                        entity: event.target,
                        archetype,
                        cause: DeathCause::Slain,
                        experience: stats.map_or(0, |s| s.experience),
                    });
                    commands.entity(event.target).despawn_recursive();
                }
            }
            Damageable::Boss => {
                let Some(core) = core else {
                    continue;
                };
                if core.locked {
                    info!("Cloud core is shielded until every enemy is gone");
                    continue;
                }
                let Some(mut health) = health else {
                    continue;
                };
                if health.is_dead() {
                    continue;
                }
                health.take_damage(event.amount);
                if let Some(mut flash) = flash {
                    flash.trigger();
                }
                if health.is_dead() {
                    info!("Cloud core destroyed");
                    boss_events.send(BossDefeatedEvent {
                        position: transform.translation,
                        experience: core.experience,
                    });
                    commands.entity(event.target).despawn_recursive();
                }
            }
        }
    }
}

/// Run flash timers.
pub fn tick_hit_flash(time: Res<Time>, mut query: Query<&mut HitFlash>) {
    for mut flash in query.iter_mut() {
        // Idle flashes are left untouched so their materials are not resynced
        if flash.is_flashing() {
            flash.tick(time.delta());
        }
    }
}

/// Show the flash color while flashing and restore the base color after.
pub fn sync_flash_material(
    query: Query<(&HitFlash, &MeshMaterial3d<StandardMaterial>), Changed<HitFlash>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let Some(mut materials) = materials else {
        return;
    };

    for (flash, handle) in query.iter() {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = if flash.is_flashing() {
                FLASH_COLOR
            } else {
                flash.base_color
            };
        }
    }
}
