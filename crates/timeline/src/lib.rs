//! Headless tween engine used to drive section choreography.
//!
//! Callers describe motion as a [`Timeline`] of tweens on keyed properties and
//! hand it to an [`Animator`] together with a [`Ticket`]. The animator samples
//! property values every frame; once the timeline's full length has elapsed it
//! writes the final values and emits exactly one [`Completion`] for that ticket
//! on its completion channel. A killed timeline stops in place and never
//! completes.
//!
//! ```text
//!   Timeline::add(..) ──▶ Animator::play(ticket) ──▶ advance(now) per frame
//!                                                        │
//!                                    values ◀────────────┤
//!                                                        └─▶ Completion { ticket }
//! ```
use std::fmt;
use std::hash::Hash;
use std::time::Instant;

mod builder;
mod ease;
mod runner;

pub use builder::{Position, ScheduledTween, Timeline, Track, Tween};
pub use ease::Ease;
pub use runner::TimelineRunner;

pub type CompletionSender = crossbeam_channel::Sender<Completion>;
pub type CompletionReceiver = crossbeam_channel::Receiver<Completion>;

/// Animatable properties of a visual layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// Opacity that also toggles visibility at zero.
    Opacity,
    ZIndex,
    YPercent,
    Y,
    Blur,
    Scale,
}

impl Property {
    /// Value a property is assumed to hold before anything has been written.
    pub fn rest_value(self) -> f32 {
        match self {
            Property::Opacity | Property::Scale => 1.0,
            Property::ZIndex | Property::YPercent | Property::Y | Property::Blur => 0.0,
        }
    }
}

/// Identifies one played timeline so its completion can be matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub ticket: Ticket,
    pub finished_at: Instant,
}

pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    crossbeam_channel::unbounded()
}

/// The "run this visual operation and call me back" primitive.
pub trait Animator<K> {
    /// Assigns a value immediately, without animating.
    fn snap(&mut self, key: K, property: Property, value: f32);

    /// Starts a timeline at `now`. Exactly one completion is emitted for the
    /// ticket once the timeline's duration has elapsed, unless it is killed.
    fn play(&mut self, timeline: Timeline<K>, ticket: Ticket, now: Instant);

    /// Stops a playing timeline where it stands. No completion is emitted for
    /// it. Returns false when the ticket is not playing.
    fn kill(&mut self, ticket: Ticket) -> bool;

    /// Samples every playing timeline at `now`.
    fn advance(&mut self, now: Instant);

    fn value(&self, key: &K, property: Property) -> Option<f32>;

    fn is_playing(&self, ticket: Ticket) -> bool;
}

/// Bounds every key type used with the runner.
pub trait LayerKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> LayerKey for T {}
