//! Enemies module - archetypes, brains, spawners and the cloud core.

mod ai;
mod boss;
pub mod brain;
mod components;
pub mod data;
mod plugin;
mod spawning;
mod teleport;

pub use brain::{BrainAction, EnemyBrain, EnemyState};
pub use components::*;
pub use data::{ArchetypeDescriptor, EnemyRegistry};
pub use plugin::EnemyPlugin;
pub use spawning::{boss_color, spawn_boss, spawn_enemy, BOSS_BASE_HP, BOSS_EXPERIENCE};
pub use teleport::{plan_teleport, TeleportOutcome};
