//! Per-tile collapse lifecycle.
//!
//! A tile is stepped on, counts down, falls while fading out, and is removed.
//! The countdown lives inside the `CountingDown` state, so a tile can never
//! hold more than one and cancelling it leaves nothing behind.

use bevy::prelude::*;

/// Seconds a tile spends falling and fading before it is removed.
pub const FALL_DURATION: f32 = 1.0;

/// How far a tile sinks over its fall.
pub const FALL_DISTANCE: f32 = 3.0;

/// Delay used by bursts that should collapse tiles immediately.
pub const BURST_COLLAPSE_DELAY: f32 = 0.001;

/// Lifecycle phase of a tile, without its timing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TilePhase {
    Stable,
    CountingDown,
    Falling,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileState {
    /// Solid ground. Waits for something to step on it.
    Stable,
    /// Collapse scheduled. `total` is the delay the countdown started with.
    CountingDown { remaining: f32, total: f32 },
    /// Sinking and fading out.
    Falling { elapsed: f32 },
    /// Gone; the entity is about to be despawned.
    Destroyed,
}

/// A destructible floor voxel.
#[derive(Component, Debug, Clone)]
pub struct CollapsibleTile {
    state: TileState,
    pending_delay: f32,
}

impl CollapsibleTile {
    pub fn new(pending_delay: f32) -> Self {
        Self {
            state: TileState::Stable,
            pending_delay: pending_delay.max(0.0),
        }
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn phase(&self) -> TilePhase {
        match self.state {
            TileState::Stable => TilePhase::Stable,
            TileState::CountingDown { .. } => TilePhase::CountingDown,
            TileState::Falling { .. } => TilePhase::Falling,
            TileState::Destroyed => TilePhase::Destroyed,
        }
    }

    pub fn pending_delay(&self) -> f32 {
        self.pending_delay
    }

    /// Start the countdown with the pending delay. Only a stable tile reacts.
    pub fn request_collapse(&mut self) -> bool {
        if self.state != TileState::Stable {
            return false;
        }
        self.state = TileState::CountingDown {
            remaining: self.pending_delay,
            total: self.pending_delay,
        };
        true
    }

    /// Abort a running countdown and go back to stable.
    pub fn cancel_collapse(&mut self) -> bool {
        if !matches!(self.state, TileState::CountingDown { .. }) {
            return false;
        }
        self.state = TileState::Stable;
        true
    }

    /// Change the delay used by the next countdown. A running one keeps its deadline.
    pub fn set_pending_delay(&mut self, delay: f32) {
        self.pending_delay = delay.max(0.0);
    }

    /// Apply a new delay, restarting the countdown if one is running.
    ///
    /// Stable tiles only get the new pending delay. Returns whether a
    /// countdown was restarted.
    pub fn rearm(&mut self, delay: f32) -> bool {
        self.set_pending_delay(delay);
        if self.cancel_collapse() {
            self.request_collapse()
        } else {
            false
        }
    }

    /// Collapse after `delay` no matter whether a countdown was running.
    pub fn force_collapse(&mut self, delay: f32) -> bool {
        self.rearm(delay) || self.request_collapse()
    }

    /// Advance timers by `dt`.
    ///
    /// Time left over when a phase ends carries into the next one, so a long
    /// frame can go from counting down straight to destroyed. Returns the
    /// phase the tile ended in when it changed.
    pub fn advance(&mut self, dt: f32) -> Option<TilePhase> {
        let before = self.phase();
        let mut dt = dt.max(0.0);

        if let TileState::CountingDown { remaining, total } = self.state {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                self.state = TileState::CountingDown { remaining, total };
                return None;
            }
            dt = -remaining;
            self.state = TileState::Falling { elapsed: 0.0 };
        }

        if let TileState::Falling { elapsed } = self.state {
            let elapsed = elapsed + dt;
            self.state = if elapsed >= FALL_DURATION {
                TileState::Destroyed
            } else {
                TileState::Falling { elapsed }
            };
        }

        let after = self.phase();
        (after != before).then_some(after)
    }

    /// Interpolation parameter of the fall, in `[0, 1]`.
    pub fn fall_progress(&self) -> f32 {
        match self.state {
            TileState::Stable | TileState::CountingDown { .. } => 0.0,
            TileState::Falling { elapsed } => (elapsed / FALL_DURATION).clamp(0.0, 1.0),
            TileState::Destroyed => 1.0,
        }
    }

    /// Render opacity. Driven by the same parameter as the fall.
    pub fn opacity(&self) -> f32 {
        1.0 - self.fall_progress()
    }

    /// How far along the countdown is, in `[0, 1]`. Zero when not counting down.
    pub fn warning_progress(&self) -> f32 {
        match self.state {
            TileState::CountingDown { remaining, total } if total > 0.0 => {
                (1.0 - remaining / total).clamp(0.0, 1.0)
            }
            TileState::CountingDown { .. } => 1.0,
            _ => 0.0,
        }
    }
}

/// Voxel coordinate of a tile.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCell(pub IVec3);

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1.0 / 60.0;

    fn run_for(tile: &mut CollapsibleTile, seconds: f32) -> Vec<TilePhase> {
        let mut changes = Vec::new();
        let mut t = 0.0;
        while t < seconds {
            if let Some(phase) = tile.advance(TICK) {
                changes.push(phase);
            }
            t += TICK;
        }
        changes
    }

    #[test]
    fn untouched_tile_stays_stable_forever() {
        let mut tile = CollapsibleTile::new(1.0);
        assert!(run_for(&mut tile, 30.0).is_empty());
        assert_eq!(tile.phase(), TilePhase::Stable);
    }

    #[test]
    fn full_lifecycle() {
        let mut tile = CollapsibleTile::new(2.0);
        assert!(tile.request_collapse());
        assert_eq!(tile.phase(), TilePhase::CountingDown);

        assert!(run_for(&mut tile, 1.9).is_empty());
        assert_eq!(tile.advance(0.2), Some(TilePhase::Falling));
        assert!(tile.fall_progress() > 0.0 && tile.fall_progress() < 0.2);

        assert_eq!(tile.advance(FALL_DURATION), Some(TilePhase::Destroyed));
        assert_eq!(tile.opacity(), 0.0);
    }

    #[test]
    fn second_request_does_not_restart_countdown() {
        let mut tile = CollapsibleTile::new(1.0);
        assert!(tile.request_collapse());
        tile.advance(0.6);
        assert!(!tile.request_collapse());
        assert_eq!(tile.advance(0.5), Some(TilePhase::Falling));
    }

    #[test]
    fn cancel_before_deadline_never_collapses() {
        let mut tile = CollapsibleTile::new(0.5);
        for _ in 0..25 {
            tile.request_collapse();
            tile.advance(0.3);
            assert!(tile.cancel_collapse());
        }
        assert!(run_for(&mut tile, 5.0).is_empty());
        assert_eq!(tile.state(), TileState::Stable);
    }

    #[test]
    fn cancel_is_a_no_op_outside_countdown() {
        let mut tile = CollapsibleTile::new(0.1);
        assert!(!tile.cancel_collapse());
        tile.request_collapse();
        tile.advance(0.2);
        assert_eq!(tile.phase(), TilePhase::Falling);
        assert!(!tile.cancel_collapse());
        assert_eq!(tile.phase(), TilePhase::Falling);
    }

    #[test]
    fn pending_delay_applies_to_next_countdown_only() {
        let mut tile = CollapsibleTile::new(1.0);
        tile.request_collapse();
        tile.set_pending_delay(10.0);
        assert_eq!(tile.advance(1.01), Some(TilePhase::Falling));
    }

    #[test]
    fn set_delay_then_request_collapses_after_that_delay() {
        let mut tile = CollapsibleTile::new(5.0);
        tile.set_pending_delay(0.75);
        tile.request_collapse();

        let mut elapsed = 0.0;
        while tile.phase() == TilePhase::CountingDown {
            tile.advance(TICK);
            elapsed += TICK;
        }
        assert!(elapsed >= 0.75 - 1e-4, "collapsed early at {elapsed}");
        assert!(elapsed <= 0.75 + TICK + 1e-4, "collapsed late at {elapsed}");
    }

    #[test]
    fn rearm_restarts_running_countdown_with_new_delay() {
        let mut tile = CollapsibleTile::new(1.0);
        tile.request_collapse();
        tile.advance(0.9);

        assert!(tile.rearm(20.0));
        assert!(run_for(&mut tile, 19.0).is_empty());
        assert_eq!(tile.phase(), TilePhase::CountingDown);
    }

    #[test]
    fn rearm_does_not_start_stable_tiles() {
        let mut tile = CollapsibleTile::new(1.0);
        assert!(!tile.rearm(20.0));
        assert_eq!(tile.phase(), TilePhase::Stable);
        assert_eq!(tile.pending_delay(), 20.0);
    }

    #[test]
    fn force_collapse_starts_or_shortens() {
        let mut stable = CollapsibleTile::new(5.0);
        assert!(stable.force_collapse(BURST_COLLAPSE_DELAY));
        assert_eq!(stable.advance(TICK), Some(TilePhase::Falling));

        let mut counting = CollapsibleTile::new(5.0);
        counting.request_collapse();
        assert!(counting.force_collapse(BURST_COLLAPSE_DELAY));
        assert_eq!(counting.advance(TICK), Some(TilePhase::Falling));
    }

    #[test]
    fn long_frame_carries_through_every_phase() {
        let mut tile = CollapsibleTile::new(0.5);
        tile.request_collapse();
        assert_eq!(tile.advance(0.5 + FALL_DURATION + 0.1), Some(TilePhase::Destroyed));
    }

    #[test]
    fn warning_progress_tracks_countdown() {
        let mut tile = CollapsibleTile::new(2.0);
        assert_eq!(tile.warning_progress(), 0.0);
        tile.request_collapse();
        tile.advance(1.0);
        assert!((tile.warning_progress() - 0.5).abs() < 1e-5);
    }
}
