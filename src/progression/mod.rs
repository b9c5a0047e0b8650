//! Progression module - player experience, levels, and stat upgrades.

mod model;
mod plugin;

pub use model::{PlayerProgression, ProgressionConfig};
pub use plugin::ProgressionPlugin;
