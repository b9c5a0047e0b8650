//! Enemy-related components.

use bevy::prelude::*;

use super::data::{ArchetypeDescriptor, ProjectileSpec, TeleportRule};
use crate::combat::BurnSpec;
use crate::stage::DifficultyContext;

/// Height of an enemy's center above the tile surface it stands on.
pub const ENEMY_HOVER: f32 = 0.6;

/// How far below its feet an enemy looks for ground.
pub const GROUND_CHECK_DISTANCE: f32 = 1.0;

/// Downward acceleration of falling enemies.
pub const ENEMY_GRAVITY: f32 = 9.81;

/// Marker component for all trash enemies (not the boss).
#[derive(Component)]
pub struct Enemy;

/// Archetype identifier (matches the RON file stem).
#[derive(Component, Clone, Debug)]
pub struct Archetype(pub String);

/// Combat numbers fixed when the enemy spawns.
///
/// Later stage advances do not touch enemies that are already alive.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct EnemyStats {
    pub max_hp: u32,
    /// Contact or melee damage
    pub damage: u32,
    pub experience: u32,
    pub projectile: Option<ProjectileStats>,
}

/// A projectile spec with its damage already scaled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileStats {
    pub damage: u32,
    pub speed: f32,
    pub lifetime: f32,
    pub burn: Option<BurnSpec>,
}

impl EnemyStats {
    /// Scale an archetype's base numbers by the current stage.
    pub fn derive(descriptor: &ArchetypeDescriptor, difficulty: &DifficultyContext) -> Self {
        Self {
            max_hp: difficulty.scaled_hp(descriptor.base_max_hp).max(1),
            damage: difficulty.scaled_damage(descriptor.base_damage),
            experience: descriptor.experience,
            projectile: descriptor
                .projectile
                .map(|spec| ProjectileStats::derive(&spec, difficulty)),
        }
    }
}

impl ProjectileStats {
    pub fn derive(spec: &ProjectileSpec, difficulty: &DifficultyContext) -> Self {
        Self {
            damage: difficulty.scaled_damage(spec.base_damage),
            speed: spec.speed,
            lifetime: spec.lifetime,
            burn: spec.burn.map(|burn| BurnSpec {
                damage_per_tick: difficulty.scaled_damage(burn.damage_per_tick),
                ..burn
            }),
        }
    }
}

/// Periodic teleport next to the player.
#[derive(Component, Debug, Clone)]
pub struct Teleporter {
    pub rule: TeleportRule,
    pub timer: Timer,
}

impl Teleporter {
    pub fn new(rule: TeleportRule) -> Self {
        Self {
            timer: Timer::from_seconds(rule.interval, TimerMode::Repeating),
            rule,
        }
    }
}

/// The stage boss. Cannot be damaged while `locked`.
#[derive(Component, Debug, Clone)]
pub struct CloudCore {
    pub locked: bool,
    pub experience: u32,
}

/// Periodically spawns an archetype around itself.
#[derive(Component, Debug, Clone)]
pub struct EnemySpawner {
    pub archetype: String,
    pub range: f32,
    pub max_spawns: u32,
    pub spawned: u32,
    pub timer: Timer,
}

impl EnemySpawner {
    pub fn new(archetype: String, interval: f32, range: f32, max_spawns: u32) -> Self {
        Self {
            archetype,
            range,
            max_spawns,
            spawned: 0,
            timer: Timer::from_seconds(interval, TimerMode::Repeating),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.spawned >= self.max_spawns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::data::builtin_archetypes;
    use crate::stage::DifficultyConfig;

    #[test]
    fn stats_scale_with_stage_and_stay_frozen() {
        let (_, fire) = builtin_archetypes()
            .into_iter()
            .find(|(id, _)| *id == "fire")
            .unwrap();

        let mut difficulty = DifficultyContext::new(DifficultyConfig::default());
        let stage_one = EnemyStats::derive(&fire, &difficulty);
        assert_eq!(stage_one.max_hp, 10);

        difficulty.advance_stage();
        difficulty.advance_stage();
        let stage_three = EnemyStats::derive(&fire, &difficulty);

        assert_eq!(stage_three.max_hp, 10 + 2 * 5);
        let projectile = stage_three.projectile.unwrap();
        assert_eq!(projectile.damage, 3 + 2);
        assert_eq!(projectile.burn.unwrap().damage_per_tick, 2 + 2);

        // Already-derived stats are plain data
        assert_eq!(stage_one.max_hp, 10);
    }
}
