//! Voxel Collapse - Entry Point
//!
//! Controls:
//! - WASD: Move
//! - Mouse: Orbit camera
//! - Shift: Sprint
//! - Space: Jump
//! - Left click: Shoot
//! - Q: Delay field
//! - E: Open/close the shop (1 / 2 to buy)

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

fn main() {
    App::new()
        // Bevy default plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Voxel Collapse".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Our game plugin
        .add_plugins(voxel_collapse::VoxelCollapsePlugin)
        .run();
}
