use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use deckconfig::ShowConfig;
use navigator::{
    CardSnapshot, Direction, DropReason, Edge, GestureOutcome, LayerId, Navigator,
    NavigatorSnapshot, PointerTarget, RawInput, Settled, StepOutcome, TransitionOutcome,
};
use serde::Serialize;
use timeline::TimelineRunner;
use tracing::debug;

use crate::script::{Command, PanelRef, Script, ScriptLine};

/// Upper bound on simulated time spent waiting for animations to settle.
const SETTLE_LIMIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Transition {
        from: usize,
        to: usize,
        direction: Direction,
    },
    Dropped {
        #[serde(flatten)]
        reason: DropReason,
    },
    Ignored,
    Stepped {
        panel: usize,
        from: usize,
        to: usize,
    },
    Boundary {
        panel: usize,
        edge: Edge,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<isize>,
    },
    StepDropped {
        panel: usize,
        #[serde(flatten)]
        reason: DropReason,
    },
    Settled {
        from: usize,
        to: usize,
    },
    StepSettled {
        panel: usize,
        step: usize,
    },
    Card {
        panel: usize,
        #[serde(flatten)]
        card: CardSnapshot,
    },
    Remounted {
        panel: usize,
    },
    Snapshot {
        #[serde(flatten)]
        snapshot: NavigatorSnapshot,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Transition {
                from,
                to,
                direction,
            } => write!(f, "transition {from} -> {to} ({direction})"),
            Event::Dropped { reason } => write!(f, "dropped: {reason}"),
            Event::Ignored => f.write_str("ignored"),
            Event::Stepped { panel, from, to } => {
                write!(f, "panel {panel} step {from} -> {to}")
            }
            Event::Boundary {
                panel,
                edge,
                target,
            } => {
                let edge = match edge {
                    Edge::Complete => "last",
                    Edge::Reverse => "first",
                };
                match target {
                    Some(target) => {
                        write!(f, "panel {panel} passed its {edge} step, requesting {target}")
                    }
                    None => write!(f, "panel {panel} passed its {edge} step, nothing bound"),
                }
            }
            Event::StepDropped { panel, reason } => {
                write!(f, "panel {panel} step dropped: {reason}")
            }
            Event::Settled { from, to } => write!(f, "settled {from} -> {to}"),
            Event::StepSettled { panel, step } => {
                write!(f, "panel {panel} settled on step {step}")
            }
            Event::Card { panel, card } => write!(
                f,
                "panel {panel} card {} at ({}, {}) size {}x{}",
                card.id, card.x, card.y, card.width, card.height
            ),
            Event::Remounted { panel } => write!(f, "panel {panel} remounted"),
            Event::Snapshot { snapshot } => {
                write!(
                    f,
                    "snapshot: active {} target {}{}",
                    snapshot.active_index,
                    snapshot.target_index,
                    if snapshot.transitioning {
                        " (transitioning)"
                    } else {
                        ""
                    }
                )?;
                for panel in &snapshot.panels {
                    write!(
                        f,
                        "\n  {} {:>2} {:<14}",
                        if panel.active { '*' } else { ' ' },
                        panel.ordinal,
                        panel.name
                    )?;
                    if let Some(step) = &panel.step {
                        write!(f, " step {}/{}", step.current + 1, step.len)?;
                        if step.animating {
                            f.write_str(" (animating)")?;
                        }
                    }
                    for card in &panel.cards {
                        write!(f, " [{} {},{}]", card.id, card.x, card.y)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// One line of replay output.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Script line that produced the event; absent for the closing settle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub t_ms: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Clone, Copy)]
pub struct ReplaySummary {
    pub commands: usize,
    pub simulated: Duration,
    pub active_index: usize,
}

/// Drives a [`Navigator`] from a script on a simulated clock.
pub struct Session {
    nav: Navigator<TimelineRunner<LayerId>>,
    start: Instant,
    now: Instant,
    frame: Duration,
}

impl Session {
    pub fn new(config: &ShowConfig, frame: Duration) -> Self {
        let start = Instant::now();
        Self {
            nav: Navigator::from_config(config),
            start,
            now: start,
            frame: frame.max(Duration::from_millis(1)),
        }
    }

    pub fn navigator(&self) -> &Navigator<TimelineRunner<LayerId>> {
        &self.nav
    }

    pub fn elapsed(&self) -> Duration {
        self.now - self.start
    }

    /// Runs every command, then settles and reports a final snapshot.
    pub fn replay<F>(&mut self, script: &Script, mut emit: F) -> Result<ReplaySummary>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        for line in &script.lines {
            self.apply(line, &mut emit)
                .with_context(|| format!("script line {}", line.line))?;
        }
        self.settle(None, &mut emit)?;
        let snapshot = self.nav.snapshot();
        self.emit(None, Event::Snapshot { snapshot }, &mut emit)?;

        Ok(ReplaySummary {
            commands: script.len(),
            simulated: self.elapsed(),
            active_index: self.nav.active_index(),
        })
    }

    pub fn apply<F>(&mut self, line: &ScriptLine, emit: &mut F) -> Result<()>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        let at = Some(line.line);
        match &line.command {
            Command::Wheel { delta, over } => {
                let outcome = self.nav.on_input(
                    RawInput::Wheel { delta_y: *delta },
                    self.pointer_target(over),
                    self.now,
                );
                self.emit_all(at, gesture_events(outcome), emit)
            }
            Command::Swipe {
                start_y,
                end_y,
                over,
            } => {
                let outcome = self.nav.on_input(
                    RawInput::Swipe {
                        start_y: *start_y,
                        end_y: *end_y,
                    },
                    self.pointer_target(over),
                    self.now,
                );
                self.emit_all(at, gesture_events(outcome), emit)
            }
            Command::Wait(duration) => self.wait(*duration, at, emit),
            Command::Goto { target, direction } => {
                let target = match target {
                    PanelRef::Index(index) => *index,
                    named => self.resolve(named)? as isize,
                };
                let direction = direction.unwrap_or(if target >= self.nav.active_index() as isize {
                    Direction::Forward
                } else {
                    Direction::Backward
                });
                let outcome = self.nav.request_transition(target, direction, self.now);
                self.emit(at, transition_event(outcome), emit)
            }
            Command::Drag {
                panel,
                card,
                dx,
                dy,
            } => {
                let ordinal = self.resolve(panel)?;
                let state = self
                    .nav
                    .cards_mut(ordinal)
                    .ok_or_else(|| anyhow!("no panel {panel}"))?
                    .drag(card, *dx, *dy)?;
                let card = CardSnapshot::from(&state);
                self.emit(at, Event::Card { panel: ordinal, card }, emit)
            }
            Command::Resize {
                panel,
                card,
                dw,
                dh,
            } => {
                let ordinal = self.resolve(panel)?;
                let state = self
                    .nav
                    .cards_mut(ordinal)
                    .ok_or_else(|| anyhow!("no panel {panel}"))?
                    .resize(card, *dw, *dh)?;
                let card = CardSnapshot::from(&state);
                self.emit(at, Event::Card { panel: ordinal, card }, emit)
            }
            Command::Remount(panel) => {
                let ordinal = self.resolve(panel)?;
                if let Some(cards) = self.nav.cards_mut(ordinal) {
                    cards.reset();
                }
                self.emit(at, Event::Remounted { panel: ordinal }, emit)
            }
            Command::Snapshot => {
                let snapshot = self.nav.snapshot();
                self.emit(at, Event::Snapshot { snapshot }, emit)
            }
            Command::Settle => self.settle(at, emit),
        }
    }

    fn wait<F>(&mut self, duration: Duration, at: Option<usize>, emit: &mut F) -> Result<()>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        let mut remaining = duration;
        while !remaining.is_zero() {
            let step = remaining.min(self.frame);
            self.tick(step, at, emit)?;
            remaining -= step;
        }
        Ok(())
    }

    /// Runs frames until no animation is playing and no transition is held.
    fn settle<F>(&mut self, at: Option<usize>, emit: &mut F) -> Result<()>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        let mut waited = Duration::ZERO;
        while self.nav.animator().playing() > 0 || self.nav.is_transitioning() {
            if waited >= SETTLE_LIMIT {
                bail!(
                    "animations did not settle within {}",
                    humantime::format_duration(SETTLE_LIMIT)
                );
            }
            self.tick(self.frame, at, emit)?;
            waited += self.frame;
        }
        debug!(waited_ms = waited.as_millis() as u64, "settled");
        Ok(())
    }

    fn tick<F>(&mut self, step: Duration, at: Option<usize>, emit: &mut F) -> Result<()>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        self.now += step;
        let settled = self.nav.frame(self.now);
        let events = settled.into_iter().map(|settled| match settled {
            Settled::Transition { from, to } => Event::Settled { from, to },
            Settled::Step { panel, step } => Event::StepSettled { panel, step },
        });
        self.emit_all(at, events, emit)
    }

    /// `card:<id>` naming a card on the current panel stands for that card's
    /// own markers; anything else is passed through as written.
    fn pointer_target(&self, markers: &[String]) -> PointerTarget {
        if markers.is_empty() {
            return PointerTarget::surface();
        }
        let cards = self.nav.panel(self.nav.target_index()).map(|panel| panel.cards());
        let mut resolved = Vec::new();
        for marker in markers {
            let card = marker
                .strip_prefix("card:")
                .and_then(|id| cards.and_then(|board| board.card(id)));
            match card {
                Some(card) => resolved.extend(card.pointer_target().markers().iter().cloned()),
                None => resolved.push(marker.clone()),
            }
        }
        PointerTarget::with_markers(resolved)
    }

    fn resolve(&self, panel: &PanelRef) -> Result<usize> {
        let found = match panel {
            PanelRef::Index(index) => usize::try_from(*index)
                .ok()
                .filter(|index| *index < self.nav.len()),
            PanelRef::Name(name) => self.nav.panels().iter().position(|p| p.name() == name),
        };
        found.ok_or_else(|| anyhow!("no panel {panel}"))
    }

    fn emit<F>(&self, line: Option<usize>, event: Event, emit: &mut F) -> Result<()>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        emit(&Record {
            line,
            t_ms: self.elapsed().as_millis() as u64,
            event,
        })
    }

    fn emit_all<F, I>(&self, line: Option<usize>, events: I, emit: &mut F) -> Result<()>
    where
        F: FnMut(&Record) -> Result<()>,
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            self.emit(line, event, emit)?;
        }
        Ok(())
    }
}


fn transition_event(outcome: TransitionOutcome) -> Event {
    match outcome {
        TransitionOutcome::Accepted {
            from,
            to,
            direction,
            ..
        } => Event::Transition {
            from,
            to,
            direction,
        },
        TransitionOutcome::Dropped(reason) => Event::Dropped { reason },
    }
}

fn gesture_events(outcome: GestureOutcome) -> Vec<Event> {
    match outcome {
        GestureOutcome::Navigation(outcome) => vec![transition_event(outcome)],
        GestureOutcome::Step {
            panel,
            outcome,
            chained,
        } => {
            let first = match outcome {
                StepOutcome::Stepped { from, to } => Event::Stepped { panel, from, to },
                StepOutcome::Boundary { edge, request } => Event::Boundary {
                    panel,
                    edge,
                    target: request.map(|request| request.target),
                },
                StepOutcome::Dropped(reason) => Event::StepDropped { panel, reason },
            };
            std::iter::once(first)
                .chain(chained.map(transition_event))
                .collect()
        }
        GestureOutcome::Ignored => vec![Event::Ignored],
    }
}
