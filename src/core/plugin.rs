//! Core plugin that sets up game states, events, and fundamental systems.

use bevy::prelude::*;

use super::events::*;
use super::states::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, InGame, StageTransition) and the shop sub-state
/// - Global events (DamageEvent, EnemyDiedEvent, TileSteppedEvent, etc.)
/// - Simulation phase ordering (SimulationSet)
/// - Stage flow between portal and rebuilt stage
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize game states
            .init_state::<GameState>()
            .add_sub_state::<PlayState>()

            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<EnemyDiedEvent>()
            .add_event::<AllClearedEvent>()
            .add_event::<BossDefeatedEvent>()
            .add_event::<LevelUpEvent>()
            .add_event::<TileSteppedEvent>()
            .add_event::<ExplosionEvent>()
            .add_event::<DelayFieldEvent>()
            .add_event::<KnockbackEvent>()
            .add_event::<UpgradeRequestEvent>()
            .add_event::<StageAdvancedEvent>()

            // Simulation phases, paused outside of Exploring
            .configure_sets(
                Update,
                (
                    SimulationSet::Input,
                    SimulationSet::Terrain,
                    SimulationSet::Enemies,
                    SimulationSet::Blasts,
                    SimulationSet::Combat,
                    SimulationSet::Stage,
                    SimulationSet::Presentation,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame))
                    .run_if(in_state(PlayState::Exploring)),
            )

            // Data files are read synchronously in Startup, so Loading is done
            // by the first frame
            .add_systems(OnEnter(GameState::Loading), transition_to_game)

            // A stage transition lasts exactly one frame
            .add_systems(OnEnter(GameState::StageTransition), transition_to_game);
    }
}

/// Enter (or re-enter) gameplay.
fn transition_to_game(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}
