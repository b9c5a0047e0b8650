//! Safe zones and respawning.

use bevy::prelude::*;

use super::components::*;
use crate::combat::Burning;
use crate::progression::PlayerProgression;
use crate::terrain::TileMap;
use crate::world::{ActiveStage, SafeZone};

/// HP ratio at or below which a safe zone heals.
const SAFE_ZONE_HEAL_THRESHOLD: f32 = 0.6;

/// Safe zones heal to this share of max HP.
const SAFE_ZONE_HEAL_RATIO: f32 = 0.5;

/// Remember the start position as the first spawn point.
pub fn record_spawn_point(
    query: Query<&Transform, Added<Player>>,
    mut spawn_point: ResMut<SpawnPoint>,
) {
    if let Ok(transform) = query.get_single() {
        spawn_point.0 = transform.translation;
    }
}

/// HP a safe zone heals the player to, if it heals at all.
pub fn safe_zone_heal(progression: &PlayerProgression) -> Option<u32> {
    if progression.hp_ratio() > SAFE_ZONE_HEAL_THRESHOLD {
        return None;
    }
    Some((progression.max_hp() as f32 * SAFE_ZONE_HEAL_RATIO).floor() as u32)
}

/// Entering a safe zone moves the spawn point there and heals a hurt player.
pub fn enter_safe_zones(
    tile_map: Res<TileMap>,
    zones: Query<&SafeZone>,
    mut player_query: Query<(&Transform, &mut CurrentSafeZone), With<Player>>,
    mut spawn_point: ResMut<SpawnPoint>,
    mut progression: ResMut<PlayerProgression>,
) {
    let Ok((transform, mut current)) = player_query.get_single_mut() else {
        return;
    };

    let feet = transform.translation - Vec3::Y * PLAYER_FOOT_OFFSET;
    let column = tile_map.cell_of(feet);
    let standing_in = zones
        .iter()
        .find(|zone| {
            zone.cell.x == column.x
                && zone.cell.z == column.z
                && (feet.y - tile_map.surface_height(zone.cell.y)).abs() < 0.3
        })
        .map(|zone| zone.cell);

    if current.0 == standing_in {
        return;
    }
    current.0 = standing_in;

    let Some(cell) = standing_in else {
        return;
    };

    let center = tile_map.cell_center(cell);
    spawn_point.0 = Vec3::new(
        center.x,
        tile_map.surface_height(cell.y) + PLAYER_FOOT_OFFSET + 0.01,
        center.z,
    );

    if let Some(target) = safe_zone_heal(&progression) {
        progression.heal_to(target);
        info!("Safe zone reached, healed to {}", progression.current_hp());
    } else {
        info!("Safe zone reached, spawn point updated");
    }
}

/// Bring the player back to the spawn point after a fall or at zero HP.
pub fn respawn_player(
    mut commands: Commands,
    stage: Res<ActiveStage>,
    spawn_point: Res<SpawnPoint>,
    mut progression: ResMut<PlayerProgression>,
    mut query: Query<(Entity, &mut Transform, &mut MovementState, &mut Knockback), With<Player>>,
) {
    let Ok((entity, mut transform, mut movement, mut knockback)) = query.get_single_mut() else {
        return;
    };

    let fell = transform.translation.y < stage.dead_zone_y;
    let defeated = progression.current_hp() == 0;
    if !fell && !defeated {
        return;
    }

    if fell {
        info!("Player fell out of the world, respawning");
    } else {
        info!("Player ran out of HP, respawning");
    }

    transform.translation = spawn_point.0;
    *movement = MovementState::default();
    knockback.velocity = Vec3::ZERO;
    progression.restore_full_hp();
    commands.entity(entity).remove::<Burning>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_zone_heals_only_when_hurt() {
        let mut progression = PlayerProgression::default();
        assert_eq!(safe_zone_heal(&progression), None);

        progression.apply_damage(progression.max_hp() * 7 / 10);
        assert_eq!(safe_zone_heal(&progression), Some(progression.max_hp() / 2));

        progression.heal_to(progression.max_hp() / 2);
        assert_eq!(progression.current_hp(), progression.max_hp() / 2);
    }

    #[test]
    fn heal_never_lowers_hp() {
        let mut progression = PlayerProgression::default();
        progression.apply_damage(progression.max_hp() * 4 / 10);
        // 60% left: the threshold is inclusive, but the player is already above half
        let target = safe_zone_heal(&progression).unwrap();
        let before = progression.current_hp();
        progression.heal_to(target);
        assert_eq!(progression.current_hp(), before);
    }
}
