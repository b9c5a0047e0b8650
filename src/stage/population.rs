//! Living-enemy counter for the current stage.

use bevy::prelude::*;

/// Counts registered enemies and latches the all-cleared transition.
///
/// Reset whenever a stage is (re)built.
#[derive(Resource, Debug, Default)]
pub struct EnemyPopulation {
    active: u32,
    cleared: bool,
}

impl EnemyPopulation {
    pub fn register_spawn(&mut self) {
        self.active += 1;
    }

    /// Record one death. Returns `true` only on the call that clears the stage.
    pub fn report_death(&mut self) -> bool {
        if self.active == 0 {
            warn!("Enemy death reported with no active enemies; ignoring");
            return false;
        }

        self.active -= 1;
        if self.active == 0 && !self.cleared {
            self.cleared = true;
            return true;
        }
        false
    }

    pub fn active_count(&self) -> u32 {
        self.active
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_cleared_fires_on_last_death_only() {
        let mut population = EnemyPopulation::default();
        for _ in 0..3 {
            population.register_spawn();
        }

        assert!(!population.report_death());
        assert!(!population.report_death());
        assert!(population.report_death());
        assert!(population.is_cleared());
    }

    #[test]
    fn extra_deaths_do_not_underflow_or_refire() {
        let mut population = EnemyPopulation::default();
        population.register_spawn();
        assert!(population.report_death());

        assert!(!population.report_death());
        assert!(!population.report_death());
        assert_eq!(population.active_count(), 0);
    }

    #[test]
    fn reset_rearms_the_latch() {
        let mut population = EnemyPopulation::default();
        population.register_spawn();
        population.report_death();
        population.reset();

        population.register_spawn();
        assert!(!population.is_cleared());
        assert!(population.report_death());
    }
}
