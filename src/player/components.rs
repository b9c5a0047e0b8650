//! Player-related components and resources.

use std::time::Duration;

use bevy::prelude::*;

/// Distance from the player's center to the bottom of its capsule.
pub const PLAYER_FOOT_OFFSET: f32 = 0.8;

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Tracks player movement state for physics.
#[derive(Component)]
pub struct MovementState {
    pub is_grounded: bool,
    pub vertical_velocity: f32,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            is_grounded: true,
            vertical_velocity: 0.0,
        }
    }
}

/// Horizontal push from a charging enemy, decaying over time.
#[derive(Component, Debug, Default)]
pub struct Knockback {
    pub velocity: Vec3,
}

impl Knockback {
    /// Velocity below which the push is dropped.
    const REST_SPEED: f32 = 0.05;

    pub fn push(&mut self, impulse: Vec3) {
        self.velocity += Vec3::new(impulse.x, 0.0, impulse.z);
    }

    /// Displacement for this frame, then exponential decay.
    pub fn step(&mut self, dt: f32, decay: f32) -> Vec3 {
        let displacement = self.velocity * dt;
        self.velocity *= (-decay * dt).exp();
        if self.velocity.length() < Self::REST_SPEED {
            self.velocity = Vec3::ZERO;
        }
        displacement
    }
}

/// Area skill that slows the collapse of nearby tiles.
#[derive(Component, Debug, Clone)]
pub struct DelayFieldSkill {
    pub radius: f32,
    /// Delay given to every tile in the field
    pub delay: f32,
    /// Seconds before the skill can be used again
    pub cooldown_secs: f32,
    /// Running while the skill recharges
    pub cooldown: Option<Timer>,
}

impl Default for DelayFieldSkill {
    fn default() -> Self {
        Self {
            radius: 5.0,
            delay: 20.0,
            cooldown_secs: 10.0,
            cooldown: None,
        }
    }
}

impl DelayFieldSkill {
    pub fn is_ready(&self) -> bool {
        self.cooldown.is_none()
    }

    /// Seconds until the skill is ready again.
    pub fn remaining_secs(&self) -> Option<f32> {
        self.cooldown.as_ref().map(Timer::remaining_secs)
    }

    /// Start the cooldown if the skill is ready. Returns whether it fired.
    pub fn try_use(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.cooldown = Some(Timer::from_seconds(self.cooldown_secs, TimerMode::Once));
        true
    }
}

/// The player's ranged attack.
#[derive(Component, Debug, Clone)]
pub struct Blaster {
    pub speed: f32,
    pub lifetime: f32,
    pub fire_interval: f32,
    pub cooldown: Option<Timer>,
}

impl Default for Blaster {
    fn default() -> Self {
        Self {
            speed: 18.0,
            lifetime: 1.5,
            fire_interval: 0.3,
            cooldown: None,
        }
    }
}

/// Advance a cooldown, clearing it once it has run out.
pub fn tick_cooldown(cooldown: &mut Option<Timer>, delta: Duration) {
    if cooldown
        .as_mut()
        .is_some_and(|timer| timer.tick(delta).finished())
    {
        *cooldown = None;
    }
}

/// The safe zone the player is currently standing in, if any.
#[derive(Component, Debug, Default)]
pub struct CurrentSafeZone(pub Option<IVec3>);

/// Where the player comes back after falling out or running out of HP.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SpawnPoint(pub Vec3);

/// Configuration for the player controller and follow camera.
#[derive(Resource)]
pub struct PlayerConfig {
    /// Mouse sensitivity multiplier
    pub mouse_sensitivity: f32,
    /// Invert Y-axis for mouse look
    pub invert_y: bool,
    /// Base movement speed in units per second
    pub move_speed: f32,
    /// Sprint speed multiplier
    pub sprint_multiplier: f32,
    /// Jump velocity
    pub jump_force: f32,
    /// Gravity acceleration
    pub gravity: f32,
    /// How fast a knockback push dies down
    pub knockback_decay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 1.5,
            invert_y: false,
            move_speed: 5.0,
            sprint_multiplier: 1.5,
            jump_force: 6.0,
            gravity: 15.0,
            knockback_decay: 6.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_field_respects_cooldown() {
        let mut skill = DelayFieldSkill::default();
        assert!(skill.try_use());
        assert!(!skill.try_use());

        tick_cooldown(&mut skill.cooldown, Duration::from_secs_f32(9.5));
        assert!(!skill.is_ready());
        assert!(skill.remaining_secs().unwrap() > 0.4);

        tick_cooldown(&mut skill.cooldown, Duration::from_secs_f32(0.5));
        assert!(skill.try_use());
    }

    #[test]
    fn knockback_dies_down() {
        let mut knockback = Knockback::default();
        knockback.push(Vec3::new(4.0, 3.0, 0.0));
        assert_eq!(knockback.velocity.y, 0.0);

        let first = knockback.step(0.1, 6.0);
        assert!(first.x > 0.0);
        for _ in 0..60 {
            knockback.step(0.1, 6.0);
        }
        assert_eq!(knockback.velocity, Vec3::ZERO);
    }
}
