//! Roll-up / roll-down state machine.
//!
//! The machine only tracks state and computes heights; it never touches the
//! record, the guard, or the window. The manager drives it with timestamps,
//! so tests can step through a transition without a real timer.

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::easing::{ease_in_out, lerp, progress};
use crate::constants::COLLAPSED_HEIGHT;

/// Direction of a running transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollDirection {
    Collapsing,
    Expanding,
}

impl fmt::Display for RollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collapsing => "collapse",
            Self::Expanding => "expand",
        })
    }
}

/// Roll state of one fence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollState {
    Expanded,
    Collapsed,
    Transitioning(RollDirection),
}

impl fmt::Display for RollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expanded => f.write_str("expanded"),
            Self::Collapsed => f.write_str("collapsed"),
            Self::Transitioning(direction) => write!(f, "transitioning ({direction})"),
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RollError {
    #[error("Cannot {requested} a fence that is {state}")]
    IllegalTransition { state: RollState, requested: RollDirection },
}

/// A height animation between two values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightTransition {
    pub direction: RollDirection,
    pub from: f64,
    pub to: f64,
    pub started: Instant,
    pub duration: Duration,
}

impl HeightTransition {
    /// Eased height at `now`.
    #[must_use]
    pub fn height_at(&self, now: Instant) -> f64 {
        let t = progress(now.saturating_duration_since(self.started), self.duration);
        lerp(self.from, self.to, ease_in_out(t))
    }

    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

/// One animation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RollFrame {
    /// Height to apply to the window.
    pub height: f64,
    /// Set on the final frame: the state the fence settled in.
    pub completed: Option<RollState>,
}

#[derive(Clone, Debug)]
pub struct RollMachine {
    state: RollState,
    transition: Option<HeightTransition>,
}

impl RollMachine {
    /// Initial state taken straight from the persisted flag; no animation.
    #[must_use]
    pub const fn from_rolled(is_rolled: bool) -> Self {
        Self {
            state: if is_rolled { RollState::Collapsed } else { RollState::Expanded },
            transition: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> RollState { self.state }

    #[must_use]
    pub const fn transition(&self) -> Option<&HeightTransition> { self.transition.as_ref() }

    #[must_use]
    pub const fn is_transitioning(&self) -> bool { matches!(self.state, RollState::Transitioning(_)) }

    /// Starts animating from `from_height` down to the collapsed height.
    ///
    /// While expanding, the expansion is reversed instead.
    pub fn begin_collapse(
        &mut self,
        from_height: f64,
        now: Instant,
        duration: Duration,
    ) -> Result<(), RollError> {
        self.begin(RollDirection::Collapsing, from_height, COLLAPSED_HEIGHT, now, duration)
    }

    /// Starts animating from `from_height` up to `to_height`.
    ///
    /// While collapsing, the collapse is reversed instead.
    pub fn begin_expand(
        &mut self,
        from_height: f64,
        to_height: f64,
        now: Instant,
        duration: Duration,
    ) -> Result<(), RollError> {
        self.begin(RollDirection::Expanding, from_height, to_height, now, duration)
    }

    /// Whether a transition in `direction` may start now: from the opposite
    /// settled state, or by reversing a transition running the other way.
    #[must_use]
    pub fn can_begin(&self, direction: RollDirection) -> bool {
        match self.state {
            RollState::Expanded => direction == RollDirection::Collapsing,
            RollState::Collapsed => direction == RollDirection::Expanding,
            RollState::Transitioning(running) => running != direction,
        }
    }

    /// Starts a transition. A transition running the other way is reversed
    /// from its current height, taking the share of `duration` it had used.
    fn begin(
        &mut self,
        direction: RollDirection,
        from: f64,
        to: f64,
        now: Instant,
        duration: Duration,
    ) -> Result<(), RollError> {
        if !self.can_begin(direction) {
            return Err(RollError::IllegalTransition { state: self.state, requested: direction });
        }

        let (from, duration) = match self.transition {
            Some(running) => {
                let elapsed = now.saturating_duration_since(running.started).min(running.duration);
                let scaled = if running.duration.is_zero() {
                    duration
                } else {
                    let nanos = duration.as_nanos() * elapsed.as_nanos() / running.duration.as_nanos();
                    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
                };
                (running.height_at(now), scaled)
            }
            None => (from, duration),
        };

        self.state = RollState::Transitioning(direction);
        self.transition = Some(HeightTransition { direction, from, to, started: now, duration });
        Ok(())
    }

    /// Computes the frame at `now`, settling the state when the animation is
    /// over. Returns `None` when nothing is animating.
    pub fn advance(&mut self, now: Instant) -> Option<RollFrame> {
        let transition = self.transition?;

        if !transition.is_finished(now) {
            return Some(RollFrame { height: transition.height_at(now), completed: None });
        }

        Some(self.settle(transition))
    }

    /// Jumps a running transition to its end state.
    pub fn finish(&mut self) -> Option<RollFrame> {
        let transition = self.transition?;
        Some(self.settle(transition))
    }

    fn settle(&mut self, transition: HeightTransition) -> RollFrame {
        let settled = match transition.direction {
            RollDirection::Collapsing => RollState::Collapsed,
            RollDirection::Expanding => RollState::Expanded,
        };
        self.state = settled;
        self.transition = None;
        RollFrame { height: transition.to, completed: Some(settled) }
    }
}
