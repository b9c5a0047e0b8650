//! Enemy, boss and spawner construction.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use super::brain::EnemyBrain;
use super::components::*;
use super::data::{ArchetypeDescriptor, EnemyRegistry};
use crate::combat::{Damageable, Health, HitFlash};
use crate::stage::DifficultyContext;
use crate::terrain::TileMap;
use crate::world::{rgb, MeshAssets, StageEntity};

/// Base HP of the cloud core before stage scaling.
pub const BOSS_BASE_HP: u32 = 10;

/// Experience for destroying the cloud core.
pub const BOSS_EXPERIENCE: u32 = 20;

/// How far below a spawn point a spawner looks for ground.
const SPAWN_GROUND_CHECK: f32 = 10.0;

/// Spawn one enemy standing at `position`, with stats scaled for the current stage.
pub fn spawn_enemy(
    commands: &mut Commands,
    archetype: &str,
    descriptor: &ArchetypeDescriptor,
    difficulty: &DifficultyContext,
    position: Vec3,
    assets: Option<&mut MeshAssets>,
) -> Entity {
    let stats = EnemyStats::derive(descriptor, difficulty);
    let color = rgb(descriptor.color);

    let mut enemy = commands.spawn((
        Enemy,
        Name::new(descriptor.name.clone()),
        Archetype(archetype.to_string()),
        EnemyBrain::new(descriptor.behavior, descriptor.move_speed),
        Health::new(stats.max_hp),
        stats,
        Damageable::Enemy,
        HitFlash::new(color),
        Transform::from_translation(position),
        Visibility::default(),
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(0.25, 0.3),
        StageEntity,
    ));

    if let Some(rule) = descriptor.teleport {
        enemy.insert(Teleporter::new(rule));
    }

    if let Some(assets) = assets {
        enemy.insert(assets.solid(Capsule3d::new(0.3, 0.5), color));
    }

    enemy.id()
}

/// Spawn the cloud core floating above `position`.
pub fn spawn_boss(
    commands: &mut Commands,
    difficulty: &DifficultyContext,
    position: Vec3,
    locked: bool,
    assets: Option<&mut MeshAssets>,
) -> Entity {
    let color = boss_color(locked);

    let mut boss = commands.spawn((
        CloudCore {
            locked,
            experience: BOSS_EXPERIENCE,
        },
        Name::new("Cloud Core"),
        Health::new(difficulty.scaled_hp(BOSS_BASE_HP)),
        Damageable::Boss,
        HitFlash::new(color),
        Transform::from_translation(position),
        Visibility::default(),
        RigidBody::Fixed,
        Collider::ball(0.8),
        StageEntity,
    ));

    if let Some(assets) = assets {
        boss.insert(assets.glowing(Sphere::new(0.8), color));
    }

    boss.id()
}

/// Color of the cloud core, dim while it cannot be hurt.
pub fn boss_color(locked: bool) -> Color {
    if locked {
        Color::srgb(0.45, 0.45, 0.5)
    } else {
        Color::srgb(0.95, 0.95, 1.0)
    }
}

/// Random spawn point within `range` of `center` that has ground below it.
///
/// A single attempt per call; a miss just waits for the next interval.
pub fn pick_spawn_point(
    rng: &mut impl Rng,
    center: Vec3,
    range: f32,
    mut ground_at: impl FnMut(Vec3) -> Option<f32>,
) -> Option<Vec3> {
    let range = range.max(0.0);
    let offset = Vec3::new(
        rng.gen_range(-range..=range),
        0.0,
        rng.gen_range(-range..=range),
    );
    let candidate = center + offset;
    ground_at(candidate).map(|surface| Vec3::new(candidate.x, surface + ENEMY_HOVER, candidate.z))
}

/// Tick spawners and add their enemies to the stage.
#[allow(clippy::too_many_arguments)]
pub fn run_spawners(
    mut commands: Commands,
    time: Res<Time>,
    registry: Res<EnemyRegistry>,
    difficulty: Res<DifficultyContext>,
    tile_map: Res<TileMap>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
    mut spawners: Query<(&Transform, &mut EnemySpawner)>,
) {
    let mut rng = rand::thread_rng();
    let mut assets = MeshAssets::from_resources(meshes.as_deref_mut(), materials.as_deref_mut());

    for (transform, mut spawner) in spawners.iter_mut() {
        if spawner.is_exhausted() || !spawner.timer.tick(time.delta()).just_finished() {
            continue;
        }

        let descriptor = match registry.require(&spawner.archetype) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("Spawner disabled: {}", e);
                spawner.spawned = spawner.max_spawns;
                continue;
            }
        };

        let Some(position) = pick_spawn_point(&mut rng, transform.translation, spawner.range, |p| {
            tile_map.ground_below(p, SPAWN_GROUND_CHECK)
        }) else {
            debug!("Spawner at {:?} found no ground", transform.translation);
            continue;
        };

        spawn_enemy(
            &mut commands,
            &spawner.archetype,
            descriptor,
            &difficulty,
            position,
            assets.as_mut(),
        );
        spawner.spawned += 1;
        debug!(
            "Spawned {} ({}/{})",
            spawner.archetype, spawner.spawned, spawner.max_spawns
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spawn_point_sits_on_ground() {
        let mut rng = StdRng::seed_from_u64(7);
        let point = pick_spawn_point(&mut rng, Vec3::new(5.0, 3.0, 5.0), 4.0, |_| Some(0.5))
            .unwrap();

        assert_eq!(point.y, 0.5 + ENEMY_HOVER);
        assert!((point.x - 5.0).abs() <= 4.0);
        assert!((point.z - 5.0).abs() <= 4.0);
    }

    #[test]
    fn spawn_point_without_ground_is_skipped() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(pick_spawn_point(&mut rng, Vec3::ZERO, 4.0, |_| None).is_none());
    }
}
