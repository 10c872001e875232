use std::collections::BTreeSet;
use std::time::Instant;

use deckconfig::ShowConfig;
use timeline::{Animator, CompletionReceiver, Ticket, TimelineRunner};
use tracing::{debug, info};

use crate::cards::{CardBoard, Viewport};
use crate::choreography::{Choreographer, LayerId};
use crate::cooldown::CooldownGate;
use crate::gesture::{Gesture, GestureKind, GestureNormalizer, PointerTarget, RawInput};
use crate::panel::Panel;
use crate::snapshot::{CardSnapshot, NavigatorSnapshot, PanelSnapshot, StepSnapshot};
use crate::steps::StepOutcome;
use crate::{Direction, DropReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Accepted {
        from: usize,
        to: usize,
        direction: Direction,
        ticket: Ticket,
    },
    Dropped(DropReason),
}

impl TransitionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TransitionOutcome::Accepted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Handled by the navigator itself.
    Navigation(TransitionOutcome),
    /// Consumed by the active panel's step sequence. `chained` is the
    /// navigator's answer when the sequence hit a bound boundary.
    Step {
        panel: usize,
        outcome: StepOutcome,
        chained: Option<TransitionOutcome>,
    },
    /// Input that did not amount to a gesture.
    Ignored,
}

/// Animations that finished during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Transition { from: usize, to: usize },
    Step { panel: usize, step: usize },
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    from: usize,
    to: usize,
    ticket: Ticket,
}

/// Owns the ordered panels and decides which one is visible.
///
/// `active_index` and the transition lock are written only here: the lock is
/// taken in [`request_transition`](Self::request_transition) and released,
/// together with the index commit, when the matching completion arrives in
/// [`frame`](Self::frame).
pub struct Navigator<A> {
    panels: Vec<Panel>,
    active: usize,
    transition: Option<InFlight>,
    normalizer: GestureNormalizer,
    exempt: BTreeSet<String>,
    wheel_tolerance: f32,
    cooldown: CooldownGate,
    choreo: Choreographer<A>,
    completions: CompletionReceiver,
}

impl Navigator<TimelineRunner<LayerId>> {
    pub fn from_config(config: &ShowConfig) -> Self {
        let (runner, completions) = TimelineRunner::with_channel();
        Self::new(config, runner, completions)
    }
}

impl<A: Animator<LayerId>> Navigator<A> {
    /// Mounts every panel. Panel 0 starts active and every step sequence is
    /// snapped to its first step.
    pub fn new(config: &ShowConfig, animator: A, completions: CompletionReceiver) -> Self {
        let viewport = Viewport::from(config.viewport);
        let mut panels: Vec<Panel> = config
            .panels
            .iter()
            .enumerate()
            .map(|(ordinal, panel)| Panel::from_config(ordinal, panel, viewport))
            .collect();

        let mut choreo = Choreographer::new(animator, &config.navigation);
        choreo.mount(panels.len(), 0);
        for panel in panels.iter_mut() {
            panel.activate(&mut choreo);
        }

        debug!(
            panels = panels.len(),
            self_handling = panels.iter().filter(|p| p.is_self_handling()).count(),
            "navigator mounted"
        );

        Self {
            panels,
            active: 0,
            transition: None,
            normalizer: GestureNormalizer::from_settings(&config.navigation),
            exempt: config.exempt_markers.iter().cloned().collect(),
            wheel_tolerance: config.navigation.wheel_tolerance,
            cooldown: CooldownGate::new(config.navigation.cooldown),
            choreo,
            completions,
        }
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// The in-flight destination, or the active panel when idle.
    pub fn target_index(&self) -> usize {
        self.transition.map_or(self.active, |flight| flight.to)
    }

    /// The `isActive` signal handed to each panel.
    pub fn is_active(&self, ordinal: usize) -> bool {
        self.target_index() == ordinal
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, ordinal: usize) -> Option<&Panel> {
        self.panels.get(ordinal)
    }

    pub fn cards_mut(&mut self, ordinal: usize) -> Option<&mut CardBoard> {
        self.panels.get_mut(ordinal).map(Panel::cards_mut)
    }

    pub fn choreographer(&self) -> &Choreographer<A> {
        &self.choreo
    }

    pub fn animator(&self) -> &A {
        self.choreo.animator()
    }

    /// Move to `target`. Out-of-range targets, requests made while a
    /// transition is in flight and requests for the current panel are
    /// dropped without touching any state.
    pub fn request_transition(
        &mut self,
        target: isize,
        direction: Direction,
        now: Instant,
    ) -> TransitionOutcome {
        let Some(to) = usize::try_from(target)
            .ok()
            .filter(|index| *index < self.panels.len())
        else {
            debug!(target, len = self.panels.len(), "transition dropped: out of range");
            return TransitionOutcome::Dropped(DropReason::OutOfRange { target });
        };
        if let Some(flight) = self.transition {
            debug!(target, in_flight = %flight.ticket, "transition dropped: already transitioning");
            return TransitionOutcome::Dropped(DropReason::Locked);
        }
        if to == self.active {
            debug!(target, "transition dropped: already active");
            return TransitionOutcome::Dropped(DropReason::AlreadyActive);
        }

        let from = self.active;
        self.panels[to].activate(&mut self.choreo);
        let ticket = self.choreo.play_transition(from, to, direction, now);
        self.transition = Some(InFlight { from, to, ticket });
        info!(
            from = self.panels[from].name(),
            to = self.panels[to].name(),
            %direction,
            %ticket,
            "section transition accepted"
        );
        TransitionOutcome::Accepted {
            from,
            to,
            direction,
            ticket,
        }
    }

    /// Normalizes platform input, then routes it like [`on_gesture`](Self::on_gesture).
    pub fn on_input(&mut self, input: RawInput, target: PointerTarget, now: Instant) -> GestureOutcome {
        match self.normalizer.normalize(input, target) {
            Some(gesture) => self.on_gesture(gesture, now),
            None => GestureOutcome::Ignored,
        }
    }

    pub fn on_gesture(&mut self, gesture: Gesture, now: Instant) -> GestureOutcome {
        let Some(direction) = Direction::from_delta(gesture.delta) else {
            return GestureOutcome::Ignored;
        };
        if self.transition.is_some() {
            debug!(kind = ?gesture.kind, "gesture dropped: transition in flight");
            return GestureOutcome::Navigation(TransitionOutcome::Dropped(DropReason::Locked));
        }

        let active = self.active;
        if let Some(steps) = self.panels[active].steps_mut() {
            let outcome = steps.on_gesture(&gesture, &mut self.choreo, now);
            let chained = match outcome {
                StepOutcome::Boundary {
                    request: Some(request),
                    edge,
                } => {
                    debug!(panel = active, ?edge, target = request.target, "step boundary delegated");
                    Some(self.request_transition(request.target, request.direction, now))
                }
                _ => None,
            };
            return GestureOutcome::Step {
                panel: active,
                outcome,
                chained,
            };
        }

        if gesture.target.carries_any(&self.exempt) {
            debug!(markers = ?gesture.target.markers(), "gesture dropped: exempt target");
            return GestureOutcome::Navigation(TransitionOutcome::Dropped(DropReason::Exempt));
        }
        if gesture.kind == GestureKind::Wheel && gesture.delta.abs() <= self.wheel_tolerance {
            return GestureOutcome::Navigation(TransitionOutcome::Dropped(
                DropReason::BelowThreshold,
            ));
        }
        if self.cooldown.is_cooling(gesture.kind, now) {
            debug!(kind = ?gesture.kind, "gesture dropped: cooling down");
            return GestureOutcome::Navigation(TransitionOutcome::Dropped(DropReason::Cooldown));
        }

        let outcome = self.request_transition(active as isize + direction.step(), direction, now);
        if outcome.is_accepted() {
            self.cooldown.start(gesture.kind, now);
        }
        GestureOutcome::Navigation(outcome)
    }

    /// Advances animations to `now` and applies every completion they
    /// produced: transitions commit their index and release the lock, step
    /// changes release their sequence. Completions nobody is waiting for are
    /// ignored.
    pub fn frame(&mut self, now: Instant) -> Vec<Settled> {
        self.choreo.animator_mut().advance(now);

        let mut settled = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            let ticket = completion.ticket;
            if let Some(flight) = self.transition.filter(|flight| flight.ticket == ticket) {
                self.transition = None;
                self.active = flight.to;
                info!(
                    panel = self.panels[flight.to].name(),
                    index = flight.to,
                    "section transition complete"
                );
                settled.push(Settled::Transition {
                    from: flight.from,
                    to: flight.to,
                });
                continue;
            }
            if self.choreo.retire(ticket) {
                continue;
            }

            let mut matched = false;
            for panel in self.panels.iter_mut() {
                let ordinal = panel.ordinal();
                if let Some(steps) = panel.steps_mut() {
                    if steps.finish(ticket) {
                        settled.push(Settled::Step {
                            panel: ordinal,
                            step: steps.current(),
                        });
                        matched = true;
                        break;
                    }
                }
            }
            if !matched {
                debug!(%ticket, "ignoring completion with no pending owner");
            }
        }
        settled
    }

    pub fn snapshot(&self) -> NavigatorSnapshot {
        NavigatorSnapshot {
            active_index: self.active,
            target_index: self.target_index(),
            transitioning: self.is_transitioning(),
            panels: self
                .panels
                .iter()
                .map(|panel| PanelSnapshot {
                    ordinal: panel.ordinal(),
                    name: panel.name().to_string(),
                    active: self.is_active(panel.ordinal()),
                    self_handling: panel.is_self_handling(),
                    step: panel.steps().map(|steps| StepSnapshot {
                        current: steps.current(),
                        len: steps.len(),
                        animating: steps.is_animating(),
                    }),
                    caption: panel.caption().map(str::to_string),
                    cards: panel.cards().cards().iter().map(CardSnapshot::from).collect(),
                })
                .collect(),
        }
    }
}
