//! The enemy state machine shared by every archetype.
//!
//! `EnemyBrain::tick` is a pure function of the current state, the distance
//! to the player, the health ratio and the brain's own clock. It either
//! changes state or returns an action for the systems to carry out, never
//! both in the same tick.

use bevy::prelude::*;

use super::data::{BehaviorProfile, CloseBehavior, RunAwayExit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyState {
    Idle,
    /// Walking toward the player
    Trace,
    /// Shooting or striking on a cooldown
    Attack,
    /// Rushing the player
    Charge,
    /// Recovering after a charge hit
    Wait { remaining: f32 },
    /// Committed to detonating
    Suicide { remaining: f32 },
    /// Mid-teleport
    Teleporting,
    /// Retreating at low health
    RunAway { elapsed: f32 },
    /// No ground below
    Falling { velocity: f32 },
    Dead,
}

impl EnemyState {
    fn same_kind(&self, other: &EnemyState) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// What the systems should do for an enemy this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrainAction {
    None,
    /// Move toward the player at `speed`
    Approach { speed: f32 },
    /// Move away from the player at `speed`
    Retreat { speed: f32 },
    /// Turn toward the player without acting
    Face,
    /// Launch a projectile at the player
    Fire,
    /// Hit the player directly
    Strike,
    /// Explode where the enemy stands; the brain is already dead
    Detonate,
}

/// Per-enemy behavior state.
#[derive(Component, Debug, Clone)]
pub struct EnemyBrain {
    profile: BehaviorProfile,
    move_speed: f32,
    state: EnemyState,
    /// Seconds since spawn, advanced only by `tick`
    clock: f32,
    last_action: f32,
    last_contact: f32,
    resume: Option<EnemyState>,
}

impl EnemyBrain {
    pub fn new(profile: BehaviorProfile, move_speed: f32) -> Self {
        let (cooldown, contact_cooldown) = match profile.close {
            CloseBehavior::Ranged { cooldown, .. } | CloseBehavior::Melee { cooldown, .. } => {
                (cooldown, 0.0)
            }
            CloseBehavior::Charge {
                contact_cooldown, ..
            } => (0.0, contact_cooldown),
        };

        Self {
            profile,
            move_speed,
            state: EnemyState::Idle,
            clock: 0.0,
            // The first attack is never held back by the cooldown
            last_action: -cooldown,
            last_contact: -contact_cooldown,
            resume: None,
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn profile(&self) -> &BehaviorProfile {
        &self.profile
    }

    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.state, EnemyState::Falling { .. })
    }

    /// Advance the brain by `dt` seconds.
    pub fn tick(&mut self, dt: f32, distance: f32, health_ratio: f32) -> BrainAction {
        self.clock += dt;

        match self.state {
            EnemyState::Dead | EnemyState::Teleporting | EnemyState::Falling { .. } => {
                return BrainAction::None;
            }
            EnemyState::Suicide { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.state = EnemyState::Dead;
                    return BrainAction::Detonate;
                }
                self.state = EnemyState::Suicide { remaining };
                return BrainAction::None;
            }
            EnemyState::Wait { remaining } => {
                let remaining = remaining - dt;
                self.state = if remaining <= 0.0 {
                    EnemyState::Idle
                } else {
                    EnemyState::Wait { remaining }
                };
                return BrainAction::None;
            }
            EnemyState::RunAway { elapsed } => {
                let elapsed = elapsed + dt;
                let Some(rule) = self.profile.runaway else {
                    self.state = EnemyState::Idle;
                    return BrainAction::None;
                };
                let done = match rule.exit {
                    RunAwayExit::Distance(limit) => distance > limit,
                    RunAwayExit::Elapsed(limit) => elapsed >= limit,
                };
                if done {
                    self.state = EnemyState::Idle;
                    return BrainAction::None;
                }
                self.state = EnemyState::RunAway { elapsed };
                return BrainAction::Retreat {
                    speed: self.move_speed * rule.speed_multiplier,
                };
            }
            _ => {}
        }

        let desired = self.evaluate(distance, health_ratio);
        if !desired.same_kind(&self.state) {
            self.state = desired;
            return BrainAction::None;
        }

        self.act()
    }

    /// Pick a state from scratch, in priority order.
    fn evaluate(&self, distance: f32, health_ratio: f32) -> EnemyState {
        if self.profile.runaway.is_some() && health_ratio <= self.profile.low_health_ratio {
            return EnemyState::RunAway { elapsed: 0.0 };
        }
        if let Some(suicide) = self.profile.suicide {
            if distance < suicide.range {
                return EnemyState::Suicide {
                    remaining: suicide.delay,
                };
            }
        }
        if distance < self.profile.close.range() {
            return match self.profile.close {
                CloseBehavior::Charge { .. } => EnemyState::Charge,
                CloseBehavior::Ranged { .. } | CloseBehavior::Melee { .. } => EnemyState::Attack,
            };
        }
        if distance < self.profile.trace_range {
            EnemyState::Trace
        } else {
            EnemyState::Idle
        }
    }

    /// Behavior of a state the brain stayed in.
    fn act(&mut self) -> BrainAction {
        match (self.state, self.profile.close) {
            (EnemyState::Trace, _) => BrainAction::Approach {
                speed: self.move_speed,
            },
            (EnemyState::Charge, CloseBehavior::Charge { speed, .. }) => {
                BrainAction::Approach { speed }
            }
            (EnemyState::Attack, CloseBehavior::Ranged { cooldown, .. }) => {
                self.try_action(cooldown, BrainAction::Fire)
            }
            (EnemyState::Attack, CloseBehavior::Melee { cooldown, .. }) => {
                self.try_action(cooldown, BrainAction::Strike)
            }
            _ => BrainAction::None,
        }
    }

    fn try_action(&mut self, cooldown: f32, action: BrainAction) -> BrainAction {
        if self.clock >= self.last_action + cooldown {
            self.last_action = self.clock;
            action
        } else {
            BrainAction::Face
        }
    }

    /// Register body contact with the player during a charge.
    ///
    /// Returns whether the contact lands; a landed hit starts the wait.
    pub fn try_contact(&mut self) -> bool {
        let CloseBehavior::Charge {
            contact_cooldown,
            wait,
            ..
        } = self.profile.close
        else {
            return false;
        };
        if self.state != EnemyState::Charge || self.clock < self.last_contact + contact_cooldown {
            return false;
        }
        self.last_contact = self.clock;
        self.state = EnemyState::Wait { remaining: wait };
        true
    }

    /// Enter `Teleporting`, remembering the state to return to.
    pub fn begin_teleport(&mut self) -> bool {
        match self.state {
            EnemyState::Dead
            | EnemyState::Teleporting
            | EnemyState::Falling { .. }
            | EnemyState::Suicide { .. } => false,
            current => {
                self.resume = Some(current);
                self.state = EnemyState::Teleporting;
                true
            }
        }
    }

    /// Leave `Teleporting`: back to the previous state when the landing spot
    /// had ground, falling otherwise.
    pub fn finish_teleport(&mut self, grounded: bool) {
        if self.state != EnemyState::Teleporting {
            return;
        }
        let resume = self.resume.take().unwrap_or(EnemyState::Idle);
        self.state = if grounded {
            resume
        } else {
            EnemyState::Falling { velocity: 0.0 }
        };
    }

    /// Lose the ground. A committed self-destruct keeps counting in place.
    pub fn start_falling(&mut self) -> bool {
        match self.state {
            EnemyState::Dead | EnemyState::Falling { .. } | EnemyState::Suicide { .. } => false,
            _ => {
                self.state = EnemyState::Falling { velocity: 0.0 };
                true
            }
        }
    }

    /// Integrate gravity. Returns the vertical displacement while falling.
    pub fn fall(&mut self, dt: f32, gravity: f32) -> Option<f32> {
        let EnemyState::Falling { velocity } = self.state else {
            return None;
        };
        let velocity = velocity - gravity * dt;
        self.state = EnemyState::Falling { velocity };
        Some(velocity * dt)
    }

    /// Back on the ground after a fall.
    pub fn land(&mut self) {
        if self.is_falling() {
            self.state = EnemyState::Idle;
        }
    }

    /// Enter the terminal state. Returns `false` if already dead.
    pub fn die(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = EnemyState::Dead;
        true
    }
}
