//! Third-person player movement and follow camera.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;

use super::components::*;
use crate::combat::Damageable;
use crate::core::KnockbackEvent;
use crate::terrain::TileMap;
use crate::world::{MeshAssets, StageEntity};

/// Orbiting camera behind the player.
#[derive(Component)]
pub struct PlayerCamera {
    /// Horizontal angle around the player in radians
    pub yaw: f32,
    /// Current pitch angle in radians (looking up/down)
    pub pitch: f32,
    pub distance: f32,
}

impl Default for PlayerCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: -0.5,
            distance: 7.0,
        }
    }
}

impl PlayerCamera {
    /// Rotation applying yaw then pitch.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Grab and hide cursor while exploring.
pub fn grab_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

/// Release cursor when gameplay pauses or ends.
pub fn release_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

/// Orbit the camera with the mouse.
pub fn mouse_look(
    mut mouse_motion: EventReader<MouseMotion>,
    config: Res<PlayerConfig>,
    mut camera_query: Query<&mut PlayerCamera>,
) {
    // Accumulate mouse movement
    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    let Ok(mut camera) = camera_query.get_single_mut() else {
        return;
    };

    let sensitivity = config.mouse_sensitivity * 0.001;
    let y_invert = if config.invert_y { -1.0 } else { 1.0 };

    camera.yaw -= delta.x * sensitivity;
    // Clamped so the camera never goes under the platform or flips over
    camera.pitch = (camera.pitch - delta.y * sensitivity * y_invert).clamp(-1.3, -0.1);
}

/// Queue knockback pushes onto the player.
pub fn receive_knockback(
    mut knockback_events: EventReader<KnockbackEvent>,
    mut query: Query<&mut Knockback, With<Player>>,
) {
    for event in knockback_events.read() {
        if let Ok(mut knockback) = query.get_mut(event.target) {
            knockback.push(event.impulse);
        }
    }
}

/// Handle WASD movement, jumping and knockback.
///
/// Uses Rapier's KinematicCharacterController for collision detection. Ground
/// is read from the tile map, so a tile that starts falling stops holding the
/// player up on the same frame.
#[allow(clippy::type_complexity)]
pub fn player_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    config: Res<PlayerConfig>,
    tile_map: Res<TileMap>,
    camera_query: Query<&PlayerCamera>,
    mut player_query: Query<
        (
            &mut Transform,
            &mut MovementState,
            &mut Knockback,
            &mut KinematicCharacterController,
        ),
        With<Player>,
    >,
) {
    let Ok((mut transform, mut movement_state, mut knockback, mut controller)) =
        player_query.get_single_mut()
    else {
        return;
    };
    let dt = time.delta_secs();

    let feet = transform.translation - Vec3::Y * PLAYER_FOOT_OFFSET;
    let is_grounded = movement_state.vertical_velocity <= 0.0
        && tile_map.ground_below(feet, 0.15).is_some();
    movement_state.is_grounded = is_grounded;

    // Handle jumping
    if is_grounded {
        // Only reset velocity if we're actually falling/landed
        if movement_state.vertical_velocity < 0.0 {
            movement_state.vertical_velocity = 0.0;
        }
        if keyboard.just_pressed(KeyCode::Space) {
            movement_state.vertical_velocity = config.jump_force;
        }
    } else {
        // Apply gravity
        movement_state.vertical_velocity -= config.gravity * dt;
    }

    // Build input direction from WASD
    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        direction.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }

    // Normalize to prevent faster diagonal movement
    if direction != Vec3::ZERO {
        direction = direction.normalize();
    }

    // Input is relative to where the camera looks, horizontally
    let yaw = camera_query.get_single().map_or(0.0, |camera| camera.yaw);
    let movement = Quat::from_rotation_y(yaw) * direction;

    // Face the walking direction
    if movement != Vec3::ZERO {
        let target = transform.translation + movement;
        transform.look_at(target, Vec3::Y);
    }

    // Apply sprint if shift is held
    let speed = if keyboard.pressed(KeyCode::ShiftLeft) {
        config.move_speed * config.sprint_multiplier
    } else {
        config.move_speed
    };

    // Calculate final translation
    let horizontal = movement * speed * dt + knockback.step(dt, config.knockback_decay);
    let vertical = Vec3::new(0.0, movement_state.vertical_velocity * dt, 0.0);

    controller.translation = Some(horizontal + vertical);
}

/// Keep the camera orbiting the player.
pub fn follow_camera(
    player_query: Query<&Transform, (With<Player>, Without<PlayerCamera>)>,
    mut camera_query: Query<(&mut Transform, &PlayerCamera)>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };
    let Ok((mut camera_transform, camera)) = camera_query.get_single_mut() else {
        return;
    };

    let focus = player_transform.translation + Vec3::Y * 0.5;
    camera_transform.translation = focus + camera.rotation() * Vec3::Z * camera.distance;
    camera_transform.look_at(focus, Vec3::Y);
}

/// Spawn the player entity, plus its camera when the app renders.
pub fn spawn_player(commands: &mut Commands, position: Vec3, assets: Option<&mut MeshAssets>) -> Entity {
    let mut player = commands.spawn((
        Player,
        Name::new("Player"),
        Damageable::Player,
        MovementState::default(),
        Knockback::default(),
        DelayFieldSkill::default(),
        Blaster::default(),
        CurrentSafeZone::default(),
        // Transform
        Transform::from_translation(position),
        Visibility::default(),
        // Rapier physics components
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(0.5, 0.3),
        KinematicCharacterController {
            offset: CharacterLength::Absolute(0.01),
            // Step up onto the next layer of tiles
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(0.4),
                min_width: CharacterLength::Absolute(0.3),
                include_dynamic_bodies: false,
            }),
            max_slope_climb_angle: 45_f32.to_radians(),
            min_slope_slide_angle: 30_f32.to_radians(),
            snap_to_ground: Some(CharacterLength::Absolute(0.2)),
            ..default()
        },
    ));

    let Some(assets) = assets else {
        return player.id();
    };

    player.insert(assets.solid(Capsule3d::new(0.3, 1.0), Color::srgb(0.95, 0.8, 0.35)));
    let player = player.id();

    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.55, 0.75, 0.95)),
            ..default()
        },
        PlayerCamera::default(),
        Transform::from_translation(position + Vec3::new(0.0, 4.0, 6.0))
            .looking_at(position, Vec3::Y),
        StageEntity,
    ));

    player
}
