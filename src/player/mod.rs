//! Player module - player entity, controller, skills, and respawning.

mod components;
mod movement;
mod plugin;
mod respawn;
mod skills;

pub use components::*;
pub use movement::{spawn_player, PlayerCamera};
pub use plugin::PlayerPlugin;
pub use respawn::safe_zone_heal;
