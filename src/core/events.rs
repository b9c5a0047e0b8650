//! Global events used for cross-system communication.
//!
//! Events keep the tile network, enemy brains, population tracking and
//! progression independent of each other. For example, the combat system
//! sends `EnemyDiedEvent`s, and the stage system counts them down to the
//! all-cleared signal without knowing anything about combat.

use bevy::prelude::*;

/// Sent when an entity should take damage.
///
/// The combat system resolves the target's `Damageable` kind and applies
/// the damage (or ignores it, for dead targets and a locked boss).
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Entity that caused the damage (if any)
    pub source: Option<Entity>,
    /// Damage amount
    pub amount: i32,
}

/// How an enemy left the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// HP reached zero from damage; grants experience.
    Slain,
    /// Detonated itself.
    SelfDestruct,
    /// Fell out of the world.
    Environment,
}

/// Sent exactly once per enemy when it dies.
#[derive(Event, Debug, Clone)]
pub struct EnemyDiedEvent {
    pub entity: Entity,
    pub archetype: String,
    pub cause: DeathCause,
    /// Experience to route to the player (zero unless slain)
    pub experience: u32,
}

/// Sent once per stage when the last registered enemy dies.
#[derive(Event, Debug, Clone, Copy)]
pub struct AllClearedEvent;

/// Sent when the stage boss is destroyed.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDefeatedEvent {
    pub position: Vec3,
    pub experience: u32,
}

/// Sent when the player levels up.
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelUpEvent {
    /// New level
    pub new_level: u32,
}

/// Sent when something steps onto a collapsible tile.
#[derive(Event, Debug, Clone, Copy)]
pub struct TileSteppedEvent {
    pub tile: Entity,
}

/// An area burst that instantly collapses nearby tiles and hurts the player.
#[derive(Event, Debug, Clone, Copy)]
pub struct ExplosionEvent {
    pub center: Vec3,
    pub radius: f32,
    /// Damage dealt to the player if inside the radius
    pub damage: i32,
}

/// The player's delay-field skill: re-arms nearby tiles with a new delay.
#[derive(Event, Debug, Clone, Copy)]
pub struct DelayFieldEvent {
    pub center: Vec3,
    pub radius: f32,
    pub delay: f32,
}

/// Push applied to an entity (the player, for contact attacks).
#[derive(Event, Debug, Clone, Copy)]
pub struct KnockbackEvent {
    pub target: Entity,
    pub impulse: Vec3,
}

/// Shop requests routed to the progression model.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeRequestEvent {
    MaxHp,
    AttackPower,
}

/// Sent after the difficulty context has advanced to a new stage.
#[derive(Event, Debug, Clone, Copy)]
pub struct StageAdvancedEvent {
    pub stage_level: u32,
    pub collapse_delay: f32,
}
