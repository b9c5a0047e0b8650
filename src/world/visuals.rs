//! Mesh and material creation for stage entities.
//!
//! Headless apps have no asset storage, so every spawn function takes an
//! `Option<MeshAssets>` and spawns the gameplay entity either way.

use bevy::prelude::*;

/// Mutable access to the mesh and material stores.
pub struct MeshAssets<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<StandardMaterial>,
}

impl<'a> MeshAssets<'a> {
    /// Borrow both stores if the app has them.
    pub fn from_resources(
        meshes: Option<&'a mut Assets<Mesh>>,
        materials: Option<&'a mut Assets<StandardMaterial>>,
    ) -> Option<Self> {
        Some(Self {
            meshes: meshes?,
            materials: materials?,
        })
    }

    /// A mesh with its own material, so its color can change independently.
    pub fn solid(
        &mut self,
        mesh: impl Into<Mesh>,
        color: Color,
    ) -> (Mesh3d, MeshMaterial3d<StandardMaterial>) {
        (
            Mesh3d(self.meshes.add(mesh)),
            MeshMaterial3d(self.materials.add(StandardMaterial {
                base_color: color,
                perceptual_roughness: 0.85,
                ..default()
            })),
        )
    }

    /// An existing mesh with its own material.
    pub fn shared_mesh(
        &mut self,
        mesh: &Handle<Mesh>,
        color: Color,
    ) -> (Mesh3d, MeshMaterial3d<StandardMaterial>) {
        (
            Mesh3d(mesh.clone()),
            MeshMaterial3d(self.materials.add(StandardMaterial {
                base_color: color,
                perceptual_roughness: 0.9,
                ..default()
            })),
        )
    }

    /// A glowing material for markers like safe zones.
    pub fn glowing(
        &mut self,
        mesh: impl Into<Mesh>,
        color: Color,
    ) -> (Mesh3d, MeshMaterial3d<StandardMaterial>) {
        let emissive = color.to_linear() * 2.0;
        (
            Mesh3d(self.meshes.add(mesh)),
            MeshMaterial3d(self.materials.add(StandardMaterial {
                base_color: color,
                emissive,
                ..default()
            })),
        )
    }
}

/// Convert an (r, g, b) tuple from data files.
pub fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::srgb(r, g, b)
}
