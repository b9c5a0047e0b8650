//! Enemy archetype descriptors and their loading from RON files.
//!
//! Every enemy runs the same brain; an archetype only decides the numbers
//! and which close-range behavior, self-destruct, retreat and teleport rules
//! apply.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use crate::combat::BurnSpec;
use crate::world::{read_ron_file, DataDir, DataLoadError};

/// When a retreating enemy gives up and goes back to idle.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum RunAwayExit {
    /// Once the player is farther away than this
    Distance(f32),
    /// After running for this many seconds
    Elapsed(f32),
}

fn default_run_speed_multiplier() -> f32 {
    2.0
}

/// Low-health retreat.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RunAwayRule {
    pub exit: RunAwayExit,
    #[serde(default = "default_run_speed_multiplier")]
    pub speed_multiplier: f32,
}

/// Irreversible self-destruct once the player comes close.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SuicideRule {
    pub range: f32,
    /// Seconds between committing and detonating
    pub delay: f32,
    pub explosion_radius: f32,
}

/// What an enemy does once the player is within close range.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum CloseBehavior {
    /// Stand and shoot on a cooldown.
    Ranged { range: f32, cooldown: f32 },
    /// Rush the player; a hit knocks back and forces a wait.
    Charge {
        range: f32,
        speed: f32,
        contact_cooldown: f32,
        wait: f32,
        knockback: f32,
    },
    /// Hit the player directly on a cooldown.
    Melee { range: f32, cooldown: f32 },
}

impl CloseBehavior {
    pub fn range(&self) -> f32 {
        match *self {
            CloseBehavior::Ranged { range, .. }
            | CloseBehavior::Charge { range, .. }
            | CloseBehavior::Melee { range, .. } => range,
        }
    }
}

fn default_low_health_ratio() -> f32 {
    0.2
}

/// Everything the brain needs to pick a state.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BehaviorProfile {
    pub trace_range: f32,
    /// Health ratio at or below which a retreat starts
    #[serde(default = "default_low_health_ratio")]
    pub low_health_ratio: f32,
    pub close: CloseBehavior,
    #[serde(default)]
    pub suicide: Option<SuicideRule>,
    #[serde(default)]
    pub runaway: Option<RunAwayRule>,
}

/// Projectile fired by ranged archetypes.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSpec {
    pub base_damage: u32,
    pub speed: f32,
    pub lifetime: f32,
    #[serde(default)]
    pub burn: Option<BurnSpec>,
}

fn default_teleport_interval() -> f32 {
    5.0
}

fn default_ring_radius() -> f32 {
    2.0
}

fn default_max_attempts() -> u32 {
    10
}

/// Periodic jump to a spot next to the player.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TeleportRule {
    #[serde(default = "default_teleport_interval")]
    pub interval: f32,
    #[serde(default = "default_ring_radius")]
    pub ring_radius: f32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for TeleportRule {
    fn default() -> Self {
        Self {
            interval: default_teleport_interval(),
            ring_radius: default_ring_radius(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Enemy archetype loaded from a RON file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ArchetypeDescriptor {
    pub name: String,
    pub base_max_hp: u32,
    /// Contact or melee damage before difficulty scaling
    #[serde(default)]
    pub base_damage: u32,
    pub experience: u32,
    pub move_speed: f32,
    /// Body color (r, g, b)
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
    pub behavior: BehaviorProfile,
    #[serde(default)]
    pub projectile: Option<ProjectileSpec>,
    #[serde(default)]
    pub teleport: Option<TeleportRule>,
}

fn default_color() -> (f32, f32, f32) {
    (0.6, 0.6, 0.6)
}

/// Retreat rule shared by the ranged archetypes.
const RANGED_RUNAWAY: RunAwayRule = RunAwayRule {
    exit: RunAwayExit::Distance(15.0),
    speed_multiplier: 2.0,
};

/// Built-in archetypes, used for any RON file that is missing.
pub fn builtin_archetypes() -> Vec<(&'static str, ArchetypeDescriptor)> {
    vec![
        (
            "enemy",
            ArchetypeDescriptor {
                name: "Bomber".to_string(),
                base_max_hp: 5,
                // Only used by the self-destruct blast
                base_damage: 3,
                experience: 5,
                move_speed: 2.0,
                color: (0.35, 0.75, 0.35),
                behavior: BehaviorProfile {
                    trace_range: 15.0,
                    low_health_ratio: 0.2,
                    close: CloseBehavior::Ranged {
                        range: 6.0,
                        cooldown: 1.5,
                    },
                    suicide: Some(SuicideRule {
                        range: 3.0,
                        delay: 1.0,
                        explosion_radius: 3.0,
                    }),
                    runaway: Some(RANGED_RUNAWAY),
                },
                projectile: Some(ProjectileSpec {
                    base_damage: 1,
                    speed: 8.0,
                    lifetime: 3.0,
                    burn: None,
                }),
                teleport: None,
            },
        ),
        (
            "dash",
            ArchetypeDescriptor {
                name: "Dasher".to_string(),
                base_max_hp: 10,
                base_damage: 5,
                experience: 5,
                move_speed: 4.0,
                color: (0.85, 0.55, 0.15),
                behavior: BehaviorProfile {
                    trace_range: 10.0,
                    low_health_ratio: 0.2,
                    close: CloseBehavior::Charge {
                        range: 2.0,
                        speed: 10.0,
                        contact_cooldown: 3.0,
                        wait: 3.0,
                        knockback: 5.0,
                    },
                    suicide: None,
                    runaway: None,
                },
                projectile: None,
                teleport: None,
            },
        ),
        (
            "fire",
            ArchetypeDescriptor {
                name: "Fire Spirit".to_string(),
                base_max_hp: 10,
                base_damage: 0,
                experience: 5,
                move_speed: 2.0,
                color: (0.9, 0.25, 0.1),
                behavior: BehaviorProfile {
                    trace_range: 15.0,
                    low_health_ratio: 0.2,
                    close: CloseBehavior::Ranged {
                        range: 6.0,
                        cooldown: 5.0,
                    },
                    suicide: None,
                    runaway: Some(RANGED_RUNAWAY),
                },
                projectile: Some(ProjectileSpec {
                    base_damage: 3,
                    speed: 10.0,
                    lifetime: 3.0,
                    burn: Some(BurnSpec {
                        damage_per_tick: 2,
                        interval: 0.5,
                        duration: 2.0,
                    }),
                }),
                teleport: None,
            },
        ),
        (
            "tnt",
            ArchetypeDescriptor {
                name: "TNT".to_string(),
                base_max_hp: 10,
                base_damage: 0,
                experience: 5,
                move_speed: 2.0,
                color: (0.75, 0.1, 0.1),
                behavior: BehaviorProfile {
                    trace_range: 15.0,
                    low_health_ratio: 0.2,
                    close: CloseBehavior::Ranged {
                        range: 6.0,
                        cooldown: 1.5,
                    },
                    suicide: None,
                    runaway: Some(RANGED_RUNAWAY),
                },
                projectile: Some(ProjectileSpec {
                    base_damage: 1,
                    speed: 8.0,
                    lifetime: 3.0,
                    burn: None,
                }),
                teleport: None,
            },
        ),
        (
            "teleport",
            ArchetypeDescriptor {
                name: "Blinker".to_string(),
                base_max_hp: 10,
                base_damage: 3,
                experience: 5,
                move_speed: 2.0,
                color: (0.55, 0.3, 0.85),
                behavior: BehaviorProfile {
                    trace_range: 15.0,
                    low_health_ratio: 0.2,
                    close: CloseBehavior::Melee {
                        range: 1.0,
                        cooldown: 1.5,
                    },
                    suicide: None,
                    runaway: None,
                },
                projectile: None,
                teleport: Some(TeleportRule::default()),
            },
        ),
    ]
}

/// Resource holding all enemy archetypes by id (RON file stem).
#[derive(Resource, Debug)]
pub struct EnemyRegistry {
    pub definitions: HashMap<String, ArchetypeDescriptor>,
}

impl Default for EnemyRegistry {
    fn default() -> Self {
        Self {
            definitions: builtin_archetypes()
                .into_iter()
                .map(|(id, descriptor)| (id.to_string(), descriptor))
                .collect(),
        }
    }
}

impl EnemyRegistry {
    /// Get an archetype by id.
    pub fn get(&self, archetype: &str) -> Option<&ArchetypeDescriptor> {
        self.definitions.get(archetype)
    }

    /// Get an archetype by id, as a data error when it is unknown.
    pub fn require(&self, archetype: &str) -> Result<&ArchetypeDescriptor, DataLoadError> {
        self.get(archetype)
            .ok_or_else(|| DataLoadError::UnknownArchetype(archetype.to_string()))
    }
}

/// Load archetypes from `<data dir>/enemies/`, overriding the built-ins.
pub fn load_enemy_definitions(data_dir: Res<DataDir>, mut registry: ResMut<EnemyRegistry>) {
    let enemies_dir = data_dir.join("enemies");

    let Ok(entries) = fs::read_dir(&enemies_dir) else {
        warn!(
            "Enemy definitions directory not found: {:?}, using built-in archetypes",
            enemies_dir
        );
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "ron") {
            continue;
        }

        let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };

        match read_ron_file::<ArchetypeDescriptor>(&path) {
            Ok(descriptor) => {
                info!("Loaded enemy archetype: {} ({})", descriptor.name, id);
                registry.definitions.insert(id, descriptor);
            }
            Err(e) => {
                error!("{}. Keeping built-in archetype for '{}'", e, id);
            }
        }
    }

    info!("{} enemy archetype(s) available", registry.definitions.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_every_archetype() {
        let registry = EnemyRegistry::default();
        for id in ["enemy", "dash", "fire", "tnt", "teleport"] {
            assert!(registry.get(id).is_some(), "missing {id}");
        }
        assert!(matches!(
            registry.require("slime"),
            Err(DataLoadError::UnknownArchetype(_))
        ));
    }

    #[test]
    fn ranged_archetypes_carry_a_projectile() {
        for (id, descriptor) in builtin_archetypes() {
            if matches!(descriptor.behavior.close, CloseBehavior::Ranged { .. }) {
                assert!(descriptor.projectile.is_some(), "{id} cannot shoot");
            }
        }
    }

    #[test]
    fn parses_descriptor_from_ron() {
        let source = r#"(
            name: "Test",
            base_max_hp: 7,
            experience: 2,
            move_speed: 1.5,
            behavior: (
                trace_range: 9.0,
                close: Melee(range: 1.0, cooldown: 0.5),
                runaway: Some((exit: Elapsed(3.0))),
            ),
        )"#;
        let descriptor: ArchetypeDescriptor = ron::from_str(source).unwrap();

        assert_eq!(descriptor.base_damage, 0);
        assert_eq!(descriptor.behavior.low_health_ratio, 0.2);
        assert_eq!(
            descriptor.behavior.runaway,
            Some(RunAwayRule {
                exit: RunAwayExit::Elapsed(3.0),
                speed_multiplier: 2.0,
            })
        );
        assert!(descriptor.projectile.is_none());
    }
}
