//! Stage plugin - difficulty context, population tracking, and stage flow.

use bevy::prelude::*;

use super::difficulty::{DifficultyConfig, DifficultyContext};
use super::population::EnemyPopulation;
use super::portal::{enter_portal, spawn_portal_on_boss_defeat};
use crate::core::{
    AllClearedEvent, BossDefeatedEvent, EnemyDiedEvent, GameState, LevelUpEvent,
    SimulationSet, StageAdvancedEvent,
};
use crate::enemies::Enemy;
use crate::progression::PlayerProgression;
use crate::world::{read_ron_file, DataDir, DataLoadError};

const DIFFICULTY_CONFIG_FILE: &str = "difficulty.ron";

/// Stage plugin - owns the session-wide difficulty and the per-stage population.
pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DifficultyContext>()
            .init_resource::<EnemyPopulation>()
            .add_systems(Startup, load_difficulty_config)
            .add_systems(OnEnter(GameState::InGame), reset_population)
            .add_systems(OnEnter(GameState::StageTransition), advance_stage)
            .add_systems(
                Update,
                (
                    register_spawned_enemies,
                    track_enemy_deaths,
                    route_boss_experience,
                    spawn_portal_on_boss_defeat,
                    enter_portal,
                )
                    .chain()
                    .in_set(SimulationSet::Stage),
            );
    }
}

/// Load difficulty scaling from RON, keeping defaults on any failure.
fn load_difficulty_config(data_dir: Res<DataDir>, mut difficulty: ResMut<DifficultyContext>) {
    let path = data_dir.join(DIFFICULTY_CONFIG_FILE);
    match read_ron_file::<DifficultyConfig>(&path) {
        Ok(config) => {
            info!("Loaded difficulty config from {:?}", path);
            *difficulty = DifficultyContext::new(config);
        }
        Err(DataLoadError::FileNotFound(path)) => {
            warn!("Difficulty config {} not found, using defaults", path);
        }
        Err(e) => {
            error!("{}. Using default difficulty.", e);
        }
    }
}

/// Empty the population counter whenever a stage is (re)built.
fn reset_population(mut population: ResMut<EnemyPopulation>, difficulty: Res<DifficultyContext>) {
    population.reset();
    info!(
        "Stage {} started, collapse delay {:.1}s",
        difficulty.stage_level(),
        difficulty.collapse_delay()
    );
}

/// Bump the stage level between two stages.
fn advance_stage(
    mut difficulty: ResMut<DifficultyContext>,
    mut stage_events: EventWriter<StageAdvancedEvent>,
) {
    let stage_level = difficulty.advance_stage();
    info!(
        "Advanced to stage {} (collapse delay {:.1}s)",
        stage_level,
        difficulty.collapse_delay()
    );
    stage_events.send(StageAdvancedEvent {
        stage_level,
        collapse_delay: difficulty.collapse_delay(),
    });
}

/// Count every enemy as it enters the world.
fn register_spawned_enemies(
    query: Query<(), Added<Enemy>>,
    mut population: ResMut<EnemyPopulation>,
) {
    for _ in query.iter() {
        population.register_spawn();
    }
}

/// Deregister dead enemies, fire all-cleared, and forward experience.
fn track_enemy_deaths(
    mut death_events: EventReader<EnemyDiedEvent>,
    mut population: ResMut<EnemyPopulation>,
    mut progression: ResMut<PlayerProgression>,
    mut cleared_events: EventWriter<AllClearedEvent>,
    mut level_events: EventWriter<LevelUpEvent>,
) {
    for event in death_events.read() {
        if population.report_death() {
            info!("All enemies cleared - the cloud core can now be destroyed");
            cleared_events.send(AllClearedEvent);
        }

        if event.experience > 0 {
            report_experience(&mut progression, event.experience, &mut level_events);
        }
    }
}

/// The boss is not part of the population but still pays out experience.
fn route_boss_experience(
    mut boss_events: EventReader<BossDefeatedEvent>,
    mut progression: ResMut<PlayerProgression>,
    mut level_events: EventWriter<LevelUpEvent>,
) {
    for event in boss_events.read() {
        report_experience(&mut progression, event.experience, &mut level_events);
    }
}

fn report_experience(
    progression: &mut PlayerProgression,
    amount: u32,
    level_events: &mut EventWriter<LevelUpEvent>,
) {
    let gained = progression.add_experience(amount);
    if gained > 0 {
        info!("Level up! Now level {}", progression.current_level());
        level_events.send(LevelUpEvent {
            new_level: progression.current_level(),
        });
    }
}
