//! Stage module - difficulty scaling, enemy population, and stage flow.

mod difficulty;
mod plugin;
mod population;
mod portal;

pub use difficulty::{DifficultyConfig, DifficultyContext};
pub use plugin::StagePlugin;
pub use population::EnemyPopulation;
pub use portal::{Portal, PORTAL_RADIUS};
