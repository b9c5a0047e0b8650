//! Level-completion portal spawned where the boss falls.

use bevy::prelude::*;

use crate::core::{BossDefeatedEvent, GameState};
use crate::player::Player;
use crate::world::StageEntity;

/// Horizontal distance at which the player enters the portal.
pub const PORTAL_RADIUS: f32 = 1.5;

/// Marker for the portal to the next stage.
#[derive(Component)]
pub struct Portal;

/// Open a portal at the boss's position.
pub fn spawn_portal_on_boss_defeat(
    mut commands: Commands,
    mut boss_events: EventReader<BossDefeatedEvent>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let Some(event) = boss_events.read().last() else {
        return;
    };

    let mut portal = commands.spawn((
        Portal,
        Name::new("Portal"),
        Transform::from_translation(event.position),
        StageEntity,
    ));

    // Headless apps have no asset storage; the portal still works without a mesh
    if let (Some(mut meshes), Some(mut materials)) = (meshes, materials) {
        portal.insert((
            Mesh3d(meshes.add(Torus::new(0.6, 1.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.45, 0.3, 0.95),
                emissive: LinearRgba::rgb(0.9, 0.6, 2.0),
                ..default()
            })),
        ));
    }

    info!("Portal opened at {:?}", event.position);
}

/// Leave the stage when the player touches a portal.
pub fn enter_portal(
    player_query: Query<&Transform, With<Player>>,
    portal_query: Query<&Transform, With<Portal>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    let player_pos = player_transform.translation;
    let touching = portal_query.iter().any(|portal| {
        let offset = portal.translation - player_pos;
        Vec2::new(offset.x, offset.z).length() <= PORTAL_RADIUS && offset.y.abs() <= 2.0
    });

    if touching {
        next_state.set(GameState::StageTransition);
    }
}
