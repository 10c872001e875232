use std::time::{Duration, Instant};

use serde::Serialize;
use timeline::{Animator, Ticket};
use tracing::debug;

use crate::choreography::{Choreographer, LayerId};
use crate::cooldown::CooldownGate;
use crate::gesture::{Gesture, GestureKind};
use crate::{Direction, DropReason, NavRequest};

/// Which end of a sequence was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Advanced past the last step.
    Complete,
    /// Retreated past the first step.
    Reverse,
}

/// The navigator requests bound to a sequence's two boundary slots. An
/// unbound slot leaves the user on the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub on_complete: Option<NavRequest>,
    pub on_reverse: Option<NavRequest>,
}

impl Boundaries {
    /// Binds both slots to the neighbouring panels of `ordinal`.
    pub fn adjacent(ordinal: usize, forward: bool, backward: bool) -> Self {
        let here = ordinal as isize;
        Self {
            on_complete: forward.then(|| NavRequest::new(here + 1, Direction::Forward)),
            on_reverse: backward.then(|| NavRequest::new(here - 1, Direction::Backward)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StepOutcome {
    Stepped {
        from: usize,
        to: usize,
    },
    /// The sequence is at an end; `request` is what the bound slot asks of
    /// the navigator.
    Boundary {
        edge: Edge,
        request: Option<NavRequest>,
    },
    Dropped(DropReason),
}

/// Panel-local stepping through slides, text blocks or tabs.
#[derive(Debug, Clone)]
pub struct StepSequence {
    panel: usize,
    len: usize,
    current: usize,
    in_flight: Option<Ticket>,
    cooldown: CooldownGate,
    wheel_threshold: f32,
    boundaries: Boundaries,
}

impl StepSequence {
    /// A sequence always has at least one step: a panel without declared
    /// steps still owns its own surface.
    pub fn new(
        panel: usize,
        len: usize,
        cooldown: Duration,
        wheel_threshold: f32,
        boundaries: Boundaries,
    ) -> Self {
        Self {
            panel,
            len: len.max(1),
            current: 0,
            in_flight: None,
            cooldown: CooldownGate::new(cooldown),
            wheel_threshold,
            boundaries,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn owns(&self, ticket: Ticket) -> bool {
        self.in_flight == Some(ticket)
    }

    pub fn advance<A: Animator<LayerId>>(
        &mut self,
        choreo: &mut Choreographer<A>,
        now: Instant,
    ) -> StepOutcome {
        if self.in_flight.is_some() {
            return StepOutcome::Dropped(DropReason::Locked);
        }
        if self.current + 1 < self.len {
            self.go_to(self.current + 1, Direction::Forward, choreo, now)
        } else {
            StepOutcome::Boundary {
                edge: Edge::Complete,
                request: self.boundaries.on_complete,
            }
        }
    }

    pub fn retreat<A: Animator<LayerId>>(
        &mut self,
        choreo: &mut Choreographer<A>,
        now: Instant,
    ) -> StepOutcome {
        if self.in_flight.is_some() {
            return StepOutcome::Dropped(DropReason::Locked);
        }
        if self.current > 0 {
            self.go_to(self.current - 1, Direction::Backward, choreo, now)
        } else {
            StepOutcome::Boundary {
                edge: Edge::Reverse,
                request: self.boundaries.on_reverse,
            }
        }
    }

    /// Gesture entry point: threshold, cooldown and lock must all pass before
    /// the sequence steps or reports a boundary.
    pub fn on_gesture<A: Animator<LayerId>>(
        &mut self,
        gesture: &Gesture,
        choreo: &mut Choreographer<A>,
        now: Instant,
    ) -> StepOutcome {
        if gesture.kind == GestureKind::Wheel && gesture.delta.abs() <= self.wheel_threshold {
            return StepOutcome::Dropped(DropReason::BelowThreshold);
        }
        let Some(direction) = Direction::from_delta(gesture.delta) else {
            return StepOutcome::Dropped(DropReason::BelowThreshold);
        };
        if self.cooldown.is_cooling(gesture.kind, now) {
            debug!(panel = self.panel, kind = ?gesture.kind, "step gesture dropped: cooling down");
            return StepOutcome::Dropped(DropReason::Cooldown);
        }
        if self.in_flight.is_some() {
            debug!(panel = self.panel, "step gesture dropped: step animating");
            return StepOutcome::Dropped(DropReason::Locked);
        }

        self.cooldown.start(gesture.kind, now);
        match direction {
            Direction::Forward => self.advance(choreo, now),
            Direction::Backward => self.retreat(choreo, now),
        }
    }

    /// Back to the first step with every step visual snapped into place.
    /// A step animation still running for this sequence is killed before the
    /// snap so it cannot overwrite it; its completion is never sent.
    pub fn reset<A: Animator<LayerId>>(&mut self, choreo: &mut Choreographer<A>) {
        if let Some(stale) = self.in_flight.take() {
            choreo.kill(stale);
        }
        self.current = 0;
        self.cooldown.clear();
        choreo.reset_steps(self.panel, self.len);
    }

    /// Releases the lock if `ticket` is the step currently animating.
    pub(crate) fn finish(&mut self, ticket: Ticket) -> bool {
        if self.owns(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    fn go_to<A: Animator<LayerId>>(
        &mut self,
        to: usize,
        direction: Direction,
        choreo: &mut Choreographer<A>,
        now: Instant,
    ) -> StepOutcome {
        let from = self.current;
        let ticket = choreo.play_step(self.panel, from, to, self.len, direction, now);
        self.in_flight = Some(ticket);
        self.current = to;
        debug!(panel = self.panel, from, to, %ticket, "step accepted");
        StepOutcome::Stepped { from, to }
    }
}
