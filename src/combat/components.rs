//! Combat-related components.

use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;

/// Seconds a hit entity flashes.
pub const FLASH_DURATION: f32 = 0.1;

/// Shortest burn interval. Anything faster is treated as this.
pub const MIN_BURN_INTERVAL: f32 = 0.05;

/// Distance at which a projectile hits a body.
pub const PROJECTILE_HIT_RADIUS: f32 = 0.6;

/// Hit points of an enemy or the boss. The player's live in `PlayerProgression`.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Health {
    current: i32,
    maximum: i32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        let max = max.max(1) as i32;
        Self {
            current: max,
            maximum: max,
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    /// Remove up to `amount` HP, never going below zero. Returns the HP removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current);
        self.current -= actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn ratio(&self) -> f32 {
        self.current as f32 / self.maximum as f32
    }
}

/// Which damage path an entity takes.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damageable {
    /// Trash enemy: dies at zero HP and reports to the population
    Enemy,
    /// Cloud core: ignores damage while locked
    Boss,
    /// The player: damage goes to the progression model
    Player,
}

/// Short white flash after a hit. A new hit restarts it.
#[derive(Component, Debug, Clone)]
pub struct HitFlash {
    /// Running while the entity flashes
    pub timer: Option<Timer>,
    /// Color restored when the flash ends
    pub base_color: Color,
}

impl HitFlash {
    pub fn new(base_color: Color) -> Self {
        Self {
            timer: None,
            base_color,
        }
    }

    pub fn trigger(&mut self) {
        self.timer = Some(Timer::from_seconds(FLASH_DURATION, TimerMode::Once));
    }

    pub fn is_flashing(&self) -> bool {
        self.timer.is_some()
    }

    /// Advance the flash. Returns `true` on the tick it ends.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let ended = self
            .timer
            .as_mut()
            .is_some_and(|timer| timer.tick(delta).finished());
        if ended {
            self.timer = None;
        }
        ended
    }
}

/// Damage over time applied by fire projectiles.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BurnSpec {
    pub damage_per_tick: u32,
    /// Seconds between ticks, at least `MIN_BURN_INTERVAL`
    pub interval: f32,
    /// Total seconds the burn lasts
    pub duration: f32,
}

/// An active burn on the player.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Burning {
    spec: BurnSpec,
    remaining: f32,
    until_tick: f32,
}

impl Burning {
    pub fn new(spec: BurnSpec) -> Self {
        let spec = BurnSpec {
            interval: spec.interval.max(MIN_BURN_INTERVAL),
            ..spec
        };
        Self {
            remaining: spec.duration,
            until_tick: spec.interval,
            spec,
        }
    }

    /// Start over with a new burn. The latest hit wins.
    pub fn restart(&mut self, spec: BurnSpec) {
        *self = Self::new(spec);
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Advance by `dt`. Returns the damage dealt during this step.
    pub fn tick(&mut self, dt: f32) -> u32 {
        let mut damage = 0;
        let mut dt = dt.min(self.remaining.max(0.0));
        self.remaining -= dt;

        while dt > 0.0 {
            // Small slack so a tick that lands exactly on the last frame still counts
            if dt + 1e-4 >= self.until_tick {
                dt = (dt - self.until_tick).max(0.0);
                self.until_tick = self.spec.interval;
                damage += self.spec.damage_per_tick;
            } else {
                self.until_tick -= dt;
                dt = 0.0;
            }
        }
        damage
    }
}

/// Who fired a projectile, and therefore what it can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
}

/// A moving shot.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub velocity: Vec3,
    pub damage: i32,
    pub lifetime: f32,
    pub faction: Faction,
    pub burn: Option<BurnSpec>,
    pub source: Option<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BURN: BurnSpec = BurnSpec {
        damage_per_tick: 2,
        interval: 0.5,
        duration: 2.0,
    };

    #[test]
    fn health_clamps_at_zero() {
        let mut health = Health::new(5);
        assert_eq!(health.take_damage(3), 3);
        assert_eq!(health.take_damage(10), 2);
        assert_eq!(health.current(), 0);
        assert!(health.is_dead());
        assert_eq!(health.take_damage(1), 0);
    }

    #[test]
    fn burn_ticks_over_its_duration() {
        let mut burning = Burning::new(BURN);
        let mut total = 0;
        for _ in 0..40 {
            total += burning.tick(0.1);
        }
        assert_eq!(total, 8);
        assert!(burning.is_finished());
    }

    #[test]
    fn restarted_burn_lasts_full_duration_again() {
        let mut burning = Burning::new(BURN);
        burning.tick(1.7);
        burning.restart(BURN);
        assert!(!burning.is_finished());
        assert_eq!(burning.tick(5.0), 8);
    }

    #[test]
    fn zero_interval_burn_is_clamped() {
        let mut burning = Burning::new(BurnSpec {
            damage_per_tick: 1,
            interval: 0.0,
            duration: 1.0,
        });
        let total: u32 = (0..11).map(|_| burning.tick(0.1)).sum();
        assert_eq!(total, 20);
        assert!(burning.is_finished());
    }

    #[test]
    fn hit_flash_restarts_on_new_hit() {
        let mut flash = HitFlash::new(Color::WHITE);
        flash.trigger();
        assert!(!flash.tick(Duration::from_millis(80)));
        flash.trigger();
        assert!(!flash.tick(Duration::from_millis(50)));
        assert!(flash.is_flashing());
        assert!(flash.tick(Duration::from_millis(60)));
        assert!(!flash.is_flashing());
    }
}
