//! Combat module - health, damage dispatch, projectiles and burns.

mod components;
mod plugin;
mod systems;

pub use components::*;
pub use plugin::CombatPlugin;
pub use systems::spawn_projectile;
