//! Process-wide difficulty context.
//!
//! Everything that scales with the stage (enemy HP and damage, projectile
//! damage, tile collapse delay) reads these values when it is created. The
//! context never pushes updates; entities keep the numbers they were born with.

use bevy::prelude::*;
use serde::Deserialize;

/// Scaling parameters loaded from assets/data/difficulty.ron.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Enemy HP added per stage above the first
    pub hp_bonus_per_level: u32,
    /// Enemy damage added per stage above the first
    pub damage_bonus_per_level: u32,
    /// Tile collapse delay on stage 1, in seconds
    pub base_collapse_delay: f32,
    /// Seconds removed from the collapse delay per stage
    pub collapse_delay_reduction_per_level: f32,
    /// Floor for the collapse delay
    pub min_collapse_delay: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            hp_bonus_per_level: 5,
            damage_bonus_per_level: 1,
            base_collapse_delay: 5.0,
            collapse_delay_reduction_per_level: 0.5,
            min_collapse_delay: 0.1,
        }
    }
}

/// Current stage level and the values derived from it.
#[derive(Resource, Debug, Clone)]
pub struct DifficultyContext {
    stage_level: u32,
    config: DifficultyConfig,
    current_collapse_delay: f32,
}

impl Default for DifficultyContext {
    fn default() -> Self {
        Self::new(DifficultyConfig::default())
    }
}

impl DifficultyContext {
    /// Start at stage 1.
    pub fn new(config: DifficultyConfig) -> Self {
        Self::at_stage(config, 1)
    }

    /// Start at an arbitrary stage (clamped to at least 1).
    pub fn at_stage(config: DifficultyConfig, stage_level: u32) -> Self {
        let mut context = Self {
            stage_level: stage_level.max(1),
            config,
            current_collapse_delay: 0.0,
        };
        context.recompute();
        context
    }

    pub fn stage_level(&self) -> u32 {
        self.stage_level
    }

    /// Move to the next stage and recompute the derived values.
    pub fn advance_stage(&mut self) -> u32 {
        self.stage_level += 1;
        self.recompute();
        self.stage_level
    }

    /// Collapse delay for tiles placed on the current stage.
    pub fn collapse_delay(&self) -> f32 {
        self.current_collapse_delay
    }

    /// HP added on top of an archetype's base HP.
    pub fn hp_bonus(&self) -> u32 {
        (self.stage_level - 1) * self.config.hp_bonus_per_level
    }

    /// Damage added on top of a base damage value.
    pub fn damage_bonus(&self) -> u32 {
        (self.stage_level - 1) * self.config.damage_bonus_per_level
    }

    pub fn scaled_hp(&self, base: u32) -> u32 {
        base + self.hp_bonus()
    }

    pub fn scaled_damage(&self, base: u32) -> u32 {
        base + self.damage_bonus()
    }

    fn recompute(&mut self) {
        let reduction =
            (self.stage_level - 1) as f32 * self.config.collapse_delay_reduction_per_level;
        self.current_collapse_delay = (self.config.base_collapse_delay - reduction)
            .max(self.config.min_collapse_delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_at(stage: u32) -> DifficultyContext {
        DifficultyContext::at_stage(DifficultyConfig::default(), stage)
    }

    #[test]
    fn collapse_delay_shrinks_per_stage() {
        assert!((context_at(1).collapse_delay() - 5.0).abs() < 1e-6);
        assert!((context_at(9).collapse_delay() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn collapse_delay_is_clamped_to_minimum() {
        assert!((context_at(20).collapse_delay() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn advance_stage_recomputes_delay() {
        let mut context = DifficultyContext::default();
        for _ in 0..8 {
            context.advance_stage();
        }
        assert_eq!(context.stage_level(), 9);
        assert!((context.collapse_delay() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn stat_bonuses_scale_from_stage_two() {
        let first = context_at(1);
        assert_eq!(first.scaled_hp(10), 10);
        assert_eq!(first.scaled_damage(5), 5);

        let third = context_at(3);
        assert_eq!(third.hp_bonus(), 10);
        assert_eq!(third.scaled_hp(10), 20);
        assert_eq!(third.scaled_damage(5), 7);
    }

    #[test]
    fn stage_level_never_drops_below_one() {
        assert_eq!(context_at(0).stage_level(), 1);
    }
}
