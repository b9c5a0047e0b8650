//! Periodic teleport next to the player.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use super::brain::EnemyBrain;
use super::components::{Teleporter, ENEMY_HOVER, GROUND_CHECK_DISTANCE};
use super::data::TeleportRule;
use crate::player::{Player, PLAYER_FOOT_OFFSET};
use crate::terrain::TileMap;

/// Where a teleport ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportOutcome {
    /// Found ground on the ring around the player
    Landed(Vec3),
    /// No candidate had ground: drop onto the player's position and fall
    Fallback(Vec3),
}

/// Try up to `max_attempts` random spots on a ring around the player.
///
/// `ground_at` returns the surface height below a point, if any.
pub fn plan_teleport(
    rng: &mut impl Rng,
    player_feet: Vec3,
    rule: &TeleportRule,
    mut ground_at: impl FnMut(Vec3) -> Option<f32>,
) -> TeleportOutcome {
    for _ in 0..rule.max_attempts {
        let angle = rng.gen_range(0.0..TAU);
        let candidate =
            player_feet + Vec3::new(angle.cos(), 0.0, angle.sin()) * rule.ring_radius;
        if let Some(surface) = ground_at(candidate) {
            return TeleportOutcome::Landed(Vec3::new(
                candidate.x,
                surface + ENEMY_HOVER,
                candidate.z,
            ));
        }
    }
    TeleportOutcome::Fallback(player_feet + Vec3::Y * ENEMY_HOVER)
}

/// Run teleport timers and relocate enemies whose timer fired.
pub fn teleport_enemies(
    time: Res<Time>,
    tile_map: Res<TileMap>,
    player_query: Query<&Transform, With<Player>>,
    mut enemies: Query<(&mut Transform, &mut EnemyBrain, &mut Teleporter), Without<Player>>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let player_feet = player_transform.translation - Vec3::Y * PLAYER_FOOT_OFFSET;
    let mut rng = rand::thread_rng();

    for (mut transform, mut brain, mut teleporter) in enemies.iter_mut() {
        if !teleporter.timer.tick(time.delta()).just_finished() {
            continue;
        }

        let offset = player_feet - transform.translation;
        let distance = Vec2::new(offset.x, offset.z).length();
        if distance < brain.profile().close.range() || !brain.begin_teleport() {
            continue;
        }

        match plan_teleport(&mut rng, player_feet, &teleporter.rule, |p| {
            tile_map.ground_below(p, GROUND_CHECK_DISTANCE)
        }) {
            TeleportOutcome::Landed(target) => {
                transform.translation = target;
                brain.finish_teleport(true);
            }
            TeleportOutcome::Fallback(target) => {
                warn!("Teleport found no ground around the player, dropping in at {:?}", target);
                transform.translation = target;
                brain.finish_teleport(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn lands_on_ring_when_ground_exists() {
        let mut rng = StdRng::seed_from_u64(1);
        let rule = TeleportRule::default();
        let player = Vec3::new(3.0, 0.5, 3.0);

        let TeleportOutcome::Landed(target) = plan_teleport(&mut rng, player, &rule, |_| Some(0.5))
        else {
            panic!("expected a landing spot");
        };
        let ring = Vec2::new(target.x - player.x, target.z - player.z).length();
        assert!((ring - rule.ring_radius).abs() < 1e-4);
        assert_eq!(target.y, 0.5 + ENEMY_HOVER);
    }

    #[test]
    fn no_ground_anywhere_falls_back_to_player_position() {
        let mut rng = StdRng::seed_from_u64(2);
        let rule = TeleportRule::default();
        let player = Vec3::new(-1.0, 0.5, 4.0);

        let mut attempts = 0;
        let outcome = plan_teleport(&mut rng, player, &rule, |_| {
            attempts += 1;
            None
        });

        assert_eq!(attempts, 10);
        assert_eq!(outcome, TeleportOutcome::Fallback(player + Vec3::Y * ENEMY_HOVER));
    }

    #[test]
    fn fallback_puts_the_brain_in_falling() {
        use crate::enemies::data::builtin_archetypes;

        let (_, descriptor) = builtin_archetypes()
            .into_iter()
            .find(|(id, _)| *id == "teleport")
            .unwrap();
        let mut brain = EnemyBrain::new(descriptor.behavior, descriptor.move_speed);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(brain.begin_teleport());
        let outcome = plan_teleport(&mut rng, Vec3::ZERO, &TeleportRule::default(), |_| None);
        brain.finish_teleport(matches!(outcome, TeleportOutcome::Landed(_)));

        assert!(brain.is_falling());
    }

    #[test]
    fn first_grounded_candidate_wins() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut calls = 0;
        let outcome = plan_teleport(&mut rng, Vec3::ZERO, &TeleportRule::default(), |_| {
            calls += 1;
            (calls == 3).then_some(0.5)
        });
        assert!(matches!(outcome, TeleportOutcome::Landed(_)));
        assert_eq!(calls, 3);
    }
}
