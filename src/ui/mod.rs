//! UI module - HUD and shop panel.

mod hud;
mod plugin;

pub use plugin::UiPlugin;
