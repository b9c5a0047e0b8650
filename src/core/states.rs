//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. Tile timers, enemy
//! brains and projectiles only advance while `InGame` + `Exploring`, so opening
//! the shop freezes the whole simulation.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` to read data files
/// - Enter `InGame` to build the current stage
/// - `StageTransition` is a single-frame hop used when a portal is taken:
///   leaving `InGame` tears the stage down, entering it again rebuilds it
///   with the advanced difficulty
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files
    #[default]
    Loading,
    /// Active gameplay
    InGame,
    /// Between two stages
    StageTransition,
}

/// Sub-states for gameplay - only active when GameState::InGame.
#[derive(SubStates, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[source(GameState = GameState::InGame)]
pub enum PlayState {
    /// Normal gameplay - movement, combat, collapsing terrain
    #[default]
    Exploring,
    /// Inventory/shop panel is open, simulation paused
    Shop,
}

/// Frame phases of the simulation, in order.
///
/// All of them only run while `InGame` + `Exploring`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Player input, movement and skills
    Input,
    /// Tile triggers, area effects and tile timers
    Terrain,
    /// Enemy brains, movement, teleports and spawners
    Enemies,
    /// Explosions set off this frame
    Blasts,
    /// Projectiles, damage and deaths
    Combat,
    /// Population, experience and stage flow
    Stage,
    /// Visual feedback that mirrors simulation state
    Presentation,
}
