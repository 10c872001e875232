//! Section navigation for full-screen, gesture-driven shows.
//!
//! The [`Navigator`] is the single authority for which panel is visible. It
//! accepts at most one transition at a time, drops out-of-range requests and
//! anything arriving while a transition is in flight, and debounces gesture
//! bursts with a per-class cooldown. Panels that own an internal
//! [`StepSequence`] swallow gestures while steps remain and hand control back
//! to the navigator at their first and last step.
//!
//! ```text
//!   RawInput ─▶ GestureNormalizer ─▶ Navigator::on_gesture
//!                                        │ self-handling panel?
//!                          ┌─────────────┴──────────────┐
//!                          ▼                            ▼
//!              StepSequence::on_gesture      exempt? cooldown? lock?
//!                  │ boundary                           │
//!                  └──────▶ request_transition ◀────────┘
//!                                   │
//!                     Choreographer::play_transition ─▶ Animator
//!                                   │
//!   Navigator::frame ◀── Completion { ticket } ◀────────┘
//! ```
//!
//! Nothing here returns an error for navigation input. Every rejection is a
//! [`DropReason`] so callers (and tests) can see why nothing happened.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

mod cards;
mod choreography;
mod cooldown;
mod gesture;
mod panel;
mod sections;
mod snapshot;
mod steps;

pub use cards::{CardBoard, CardError, CardState, Grab, Viewport};
pub use choreography::{Choreographer, Layer, LayerId, StepVisual};
pub use cooldown::{Cooldown, CooldownGate};
pub use gesture::{Gesture, GestureKind, GestureNormalizer, PointerTarget, RawInput, NO_SWIPE};
pub use panel::Panel;
pub use sections::{GestureOutcome, Navigator, Settled, TransitionOutcome};
pub use snapshot::{CardSnapshot, NavigatorSnapshot, PanelSnapshot, StepSnapshot};
pub use steps::{Boundaries, Edge, StepOutcome, StepSequence};

/// Which way a move travels; only affects which edge things slide from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Positive deltas move forward, negative ones backward.
    pub fn from_delta(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(Direction::Forward)
        } else if delta < 0.0 {
            Some(Direction::Backward)
        } else {
            None
        }
    }

    pub fn factor(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "next" | "down" | "+" => Ok(Direction::Forward),
            "backward" | "prev" | "previous" | "up" | "-" => Ok(Direction::Backward),
            other => Err(format!(
                "unknown direction '{other}'; expected forward or backward"
            )),
        }
    }
}

/// A transition request as bound to a panel's boundary slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavRequest {
    pub target: isize,
    pub direction: Direction,
}

impl NavRequest {
    pub fn new(target: isize, direction: Direction) -> Self {
        Self { target, direction }
    }
}

/// Why an input or request left navigation state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DropReason {
    /// Target index outside `0..N`; navigation never wraps.
    OutOfRange { target: isize },
    /// A transition or step animation is still running.
    Locked,
    /// Inside the cooldown window of a previously accepted gesture.
    Cooldown,
    /// Target is already the active panel.
    AlreadyActive,
    /// Wheel delta too small to count as a tick.
    BelowThreshold,
    /// Gesture started over an exempt element such as a draggable card.
    Exempt,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::OutOfRange { target } => write!(f, "target {target} out of range"),
            DropReason::Locked => f.write_str("animation in progress"),
            DropReason::Cooldown => f.write_str("cooling down"),
            DropReason::AlreadyActive => f.write_str("already active"),
            DropReason::BelowThreshold => f.write_str("below threshold"),
            DropReason::Exempt => f.write_str("exempt target"),
        }
    }
}
