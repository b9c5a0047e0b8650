//! Player progression bookkeeping.
//!
//! Levels double as the shop currency: buying an upgrade spends levels, and
//! every purchase makes the next one of that kind cost one more level.

use bevy::prelude::*;
use serde::Deserialize;

/// Progression tuning loaded from assets/data/progression.ron.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience needed to go from level 1 to level 2
    pub base_exp: u32,
    /// Extra experience needed for each further level
    pub exp_increase_per_level: u32,
    pub starting_max_hp: u32,
    pub starting_attack: u32,
    /// Max HP gained per HP upgrade
    pub hp_upgrade_amount: u32,
    /// Attack damage gained per attack upgrade
    pub attack_upgrade_amount: u32,
    /// Level cost of the first HP upgrade
    pub hp_upgrade_cost: u32,
    /// Level cost of the first attack upgrade
    pub attack_upgrade_cost: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_exp: 25,
            exp_increase_per_level: 10,
            starting_max_hp: 100,
            starting_attack: 1,
            hp_upgrade_amount: 20,
            attack_upgrade_amount: 1,
            hp_upgrade_cost: 1,
            attack_upgrade_cost: 1,
        }
    }
}

/// Level, experience, HP and attack of the player for the whole session.
///
/// Lives as a resource rather than on the player entity so it survives stage
/// rebuilds.
#[derive(Resource, Debug, Clone)]
pub struct PlayerProgression {
    config: ProgressionConfig,
    current_level: u32,
    current_exp: u32,
    required_exp: u32,
    max_hp: u32,
    current_hp: u32,
    attack_damage: u32,
    hp_upgrade_cost: u32,
    attack_upgrade_cost: u32,
}

impl Default for PlayerProgression {
    fn default() -> Self {
        Self::new(ProgressionConfig::default())
    }
}

impl PlayerProgression {
    pub fn new(config: ProgressionConfig) -> Self {
        let mut progression = Self {
            current_level: 1,
            current_exp: 0,
            required_exp: 0,
            max_hp: config.starting_max_hp,
            current_hp: config.starting_max_hp,
            attack_damage: config.starting_attack,
            hp_upgrade_cost: config.hp_upgrade_cost.max(1),
            attack_upgrade_cost: config.attack_upgrade_cost.max(1),
            config,
        };
        progression.recompute_required_exp();
        progression
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn current_exp(&self) -> u32 {
        self.current_exp
    }

    pub fn required_exp(&self) -> u32 {
        self.required_exp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn attack_damage(&self) -> u32 {
        self.attack_damage
    }

    pub fn hp_upgrade_cost(&self) -> u32 {
        self.hp_upgrade_cost
    }

    pub fn attack_upgrade_cost(&self) -> u32 {
        self.attack_upgrade_cost
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.max_hp as f32
    }

    pub fn exp_ratio(&self) -> f32 {
        if self.required_exp == 0 {
            return 0.0;
        }
        self.current_exp as f32 / self.required_exp as f32
    }

    /// Add experience, levelling up as many times as it covers.
    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        self.current_exp += amount;

        let mut gained = 0;
        // A zero requirement would loop forever on misconfigured data
        while self.required_exp > 0 && self.current_exp >= self.required_exp {
            self.current_exp -= self.required_exp;
            self.current_level += 1;
            self.recompute_required_exp();
            gained += 1;
        }
        gained
    }

    /// Spend levels on max HP. Current HP is left as is.
    pub fn try_upgrade_max_hp(&mut self) -> bool {
        if self.current_level < self.hp_upgrade_cost {
            return false;
        }

        self.current_level -= self.hp_upgrade_cost;
        self.max_hp += self.config.hp_upgrade_amount;
        self.hp_upgrade_cost += 1;
        self.recompute_required_exp();
        true
    }

    /// Spend levels on attack damage.
    pub fn try_upgrade_attack_power(&mut self) -> bool {
        if self.current_level < self.attack_upgrade_cost {
            return false;
        }

        self.current_level -= self.attack_upgrade_cost;
        self.attack_damage += self.config.attack_upgrade_amount;
        self.attack_upgrade_cost += 1;
        self.recompute_required_exp();
        true
    }

    /// Reduce player HP. Returns `true` if this hit brought it to zero.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        if self.current_hp == 0 {
            return false;
        }
        self.current_hp = self.current_hp.saturating_sub(amount);
        self.current_hp == 0
    }

    /// Heal up to `target` HP; never lowers HP.
    pub fn heal_to(&mut self, target: u32) {
        self.current_hp = self.current_hp.max(target.min(self.max_hp));
    }

    pub fn restore_full_hp(&mut self) {
        self.current_hp = self.max_hp;
    }

    fn recompute_required_exp(&mut self) {
        self.required_exp = self.config.base_exp
            + self.current_level.saturating_sub(1) * self.config.exp_increase_per_level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_exp_follows_level() {
        let progression = PlayerProgression::default();
        assert_eq!(progression.current_level(), 1);
        assert_eq!(progression.required_exp(), 25);
    }

    #[test]
    fn overflow_levels_up_multiple_times() {
        let mut progression = PlayerProgression::default();

        // 25 to reach level 2, then 35 to reach level 3
        let gained = progression.add_experience(60);

        assert_eq!(gained, 2);
        assert_eq!(progression.current_level(), 3);
        assert_eq!(progression.current_exp(), 0);
        assert_eq!(progression.required_exp(), 45);
    }

    #[test]
    fn partial_experience_keeps_remainder() {
        let mut progression = PlayerProgression::default();
        assert_eq!(progression.add_experience(30), 1);
        assert_eq!(progression.current_level(), 2);
        assert_eq!(progression.current_exp(), 5);
        assert_eq!(progression.required_exp(), 35);
    }

    #[test]
    fn upgrade_spends_levels_and_escalates_cost() {
        let mut progression = PlayerProgression::default();
        progression.add_experience(60);
        assert_eq!(progression.current_level(), 3);

        assert!(progression.try_upgrade_max_hp());
        assert_eq!(progression.current_level(), 2);
        assert_eq!(progression.max_hp(), 120);
        assert_eq!(progression.current_hp(), 100);
        assert_eq!(progression.hp_upgrade_cost(), 2);

        assert!(progression.try_upgrade_max_hp());
        assert_eq!(progression.current_level(), 0);
        assert_eq!(progression.hp_upgrade_cost(), 3);
    }

    #[test]
    fn failed_upgrade_changes_nothing() {
        let mut progression = PlayerProgression::default();
        assert!(progression.try_upgrade_attack_power());
        assert_eq!(progression.current_level(), 0);

        let before = progression.clone();
        assert!(!progression.try_upgrade_attack_power());
        assert_eq!(progression.attack_damage(), before.attack_damage());
        assert_eq!(progression.attack_upgrade_cost(), before.attack_upgrade_cost());
        assert_eq!(progression.current_level(), before.current_level());
    }

    #[test]
    fn damage_reports_death_once() {
        let mut progression = PlayerProgression::default();
        assert!(!progression.apply_damage(60));
        assert!(progression.apply_damage(60));
        assert_eq!(progression.current_hp(), 0);
        assert!(!progression.apply_damage(10));
    }

    #[test]
    fn heal_to_never_lowers_hp() {
        let mut progression = PlayerProgression::default();
        progression.apply_damage(70);
        progression.heal_to(50);
        assert_eq!(progression.current_hp(), 50);
        progression.heal_to(20);
        assert_eq!(progression.current_hp(), 50);
    }
}
