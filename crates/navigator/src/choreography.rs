//! Builds the timelines for section transitions and internal steps and hands
//! them to the animator. Every layer a panel exposes to the renderer is named
//! by a [`LayerId`].
use std::time::{Duration, Instant};

use deckconfig::{EaseSetting, NavigationSettings};
use timeline::{Animator, Ease, Position, Property, Ticket, Timeline, Tween};
use tracing::trace;

use crate::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// The fixed full-screen container; opacity doubles as visibility.
    Section,
    /// Outer clipping wrapper.
    Outer,
    /// Inner clipping wrapper, travels opposite to the outer one.
    Inner,
    /// Background layer that parallax-shifts during transitions.
    Background,
    StepText(usize),
    StepMedia(usize),
    StepDot(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId {
    pub panel: usize,
    pub layer: Layer,
}

impl LayerId {
    pub fn new(panel: usize, layer: Layer) -> Self {
        Self { panel, layer }
    }
}

/// Resting look of one step's text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepVisual {
    pub opacity: f32,
    pub y: f32,
    pub blur: f32,
}

impl StepVisual {
    pub const SHOWN: StepVisual = StepVisual {
        opacity: 1.0,
        y: 0.0,
        blur: 0.0,
    };

    pub const HIDDEN: StepVisual = StepVisual {
        opacity: 0.0,
        y: STEP_ENTER_Y,
        blur: STEP_BLUR,
    };
}

const STEP_EXIT_Y: f32 = 25.0;
const STEP_ENTER_Y: f32 = 30.0;
const STEP_BLUR: f32 = 6.0;
const DOT_ACTIVE_SCALE: f32 = 1.0;
const DOT_IDLE_SCALE: f32 = 0.7;
const DOT_ACTIVE_OPACITY: f32 = 0.9;
const DOT_IDLE_OPACITY: f32 = 0.15;

pub fn map_ease(setting: EaseSetting) -> Ease {
    match setting {
        EaseSetting::Linear => Ease::Linear,
        EaseSetting::Smoothstep => Ease::Smoothstep,
        EaseSetting::EaseInOut => Ease::EaseInOut,
        EaseSetting::Power2In => Ease::Power2In,
        EaseSetting::Power2Out => Ease::Power2Out,
    }
}

/// Owns the animator and allocates a fresh ticket for every timeline played.
pub struct Choreographer<A> {
    animator: A,
    next_ticket: u64,
    /// Media and dot timelines of step changes, keyed by ticket to their panel.
    /// Nothing waits on them, but a step reset has to stop them.
    trailing: Vec<(Ticket, usize)>,
    duration: Duration,
    ease: Ease,
    background_shift: f32,
    wrapper_travel: f32,
}

impl<A: Animator<LayerId>> Choreographer<A> {
    pub fn new(animator: A, settings: &NavigationSettings) -> Self {
        Self {
            animator,
            next_ticket: 1,
            trailing: Vec::new(),
            duration: settings.transition_duration,
            ease: map_ease(settings.ease),
            background_shift: settings.background_shift,
            wrapper_travel: settings.wrapper_travel,
        }
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    pub fn value(&self, panel: usize, layer: Layer, property: Property) -> Option<f32> {
        self.animator.value(&LayerId::new(panel, layer), property)
    }

    /// Stops a timeline in place; its completion is never sent.
    pub fn kill(&mut self, ticket: Ticket) -> bool {
        self.animator.kill(ticket)
    }

    /// Consumes the completion of a step's media and dot timeline. Returns
    /// false for tickets this choreographer does not track.
    pub fn retire(&mut self, ticket: Ticket) -> bool {
        let before = self.trailing.len();
        self.trailing.retain(|(trailing, _)| *trailing != ticket);
        self.trailing.len() != before
    }

    fn ticket(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    fn snap(&mut self, panel: usize, layer: Layer, property: Property, value: f32) {
        self.animator
            .snap(LayerId::new(panel, layer), property, value);
    }

    /// Initial layout: every wrapper parked off-screen, only `active` shown.
    pub fn mount(&mut self, panels: usize, active: usize) {
        for panel in 0..panels {
            self.snap(panel, Layer::Section, Property::Opacity, 0.0);
            self.snap(panel, Layer::Section, Property::ZIndex, 0.0);
            self.snap(panel, Layer::Outer, Property::YPercent, self.wrapper_travel);
            self.snap(panel, Layer::Inner, Property::YPercent, -self.wrapper_travel);
            self.snap(panel, Layer::Background, Property::YPercent, 0.0);
        }
        self.snap(active, Layer::Section, Property::Opacity, 1.0);
        self.snap(active, Layer::Section, Property::ZIndex, 1.0);
        self.snap(active, Layer::Outer, Property::YPercent, 0.0);
        self.snap(active, Layer::Inner, Property::YPercent, 0.0);
    }

    /// Exit `from` and enter `to` together. Both halves are anchored at the
    /// timeline start so they read as one motion.
    pub fn play_transition(
        &mut self,
        from: usize,
        to: usize,
        direction: Direction,
        now: Instant,
    ) -> Ticket {
        let d = direction.factor();
        let shift = self.background_shift;
        let travel = self.wrapper_travel;

        self.snap(from, Layer::Section, Property::ZIndex, 0.0);
        self.snap(to, Layer::Section, Property::Opacity, 1.0);
        self.snap(to, Layer::Section, Property::ZIndex, 1.0);

        let timeline = Timeline::with_defaults(self.duration, self.ease)
            .add(
                Tween::new(LayerId::new(from, Layer::Background))
                    .to(Property::YPercent, -shift * d),
                Position::Append,
            )
            .add(
                Tween::set(LayerId::new(from, Layer::Section)).to(Property::Opacity, 0.0),
                Position::Append,
            )
            .add(
                Tween::new(LayerId::new(to, Layer::Outer))
                    .from_to(Property::YPercent, travel * d, 0.0),
                Position::START,
            )
            .add(
                Tween::new(LayerId::new(to, Layer::Inner))
                    .from_to(Property::YPercent, -travel * d, 0.0),
                Position::START,
            )
            .add(
                Tween::new(LayerId::new(to, Layer::Background))
                    .from_to(Property::YPercent, shift * d, 0.0),
                Position::START,
            );

        let ticket = self.ticket();
        trace!(%ticket, from, to, %direction, "playing section transition");
        self.animator.play(timeline, ticket, now);
        ticket
    }

    /// Swap the visible step inside a panel: text out then in with a slight
    /// overlap, media crossfade, indicator dots retargeted.
    ///
    /// The returned ticket covers the text only. Media and dots run on a
    /// trailing timeline that can outlast it.
    pub fn play_step(
        &mut self,
        panel: usize,
        from: usize,
        to: usize,
        len: usize,
        direction: Direction,
        now: Instant,
    ) -> Ticket {
        let d = direction.factor();
        let text = Timeline::with_defaults(Duration::from_millis(450), Ease::Power2Out)
            .add(
                Tween::new(LayerId::new(panel, Layer::StepText(from)))
                    .to(Property::Opacity, 0.0)
                    .to(Property::Y, -STEP_EXIT_Y * d)
                    .to(Property::Blur, STEP_BLUR)
                    .duration(Duration::from_millis(350))
                    .ease(Ease::Power2In),
                Position::Append,
            )
            .add(
                Tween::new(LayerId::new(panel, Layer::StepText(to)))
                    .from_to(Property::Opacity, 0.0, 1.0)
                    .from_to(Property::Y, STEP_ENTER_Y * d, 0.0)
                    .from_to(Property::Blur, STEP_BLUR, 0.0),
                Position::Overlap(Duration::from_millis(100)),
            );

        let mut trailing = Timeline::with_defaults(Duration::from_millis(300), Ease::Power2Out)
            .add(
                Tween::new(LayerId::new(panel, Layer::StepMedia(from)))
                    .to(Property::Opacity, 0.0)
                    .to(Property::Scale, 1.05)
                    .duration(Duration::from_millis(500))
                    .ease(Ease::Power2In),
                Position::START,
            )
            .add(
                Tween::new(LayerId::new(panel, Layer::StepMedia(to)))
                    .from_to(Property::Opacity, 0.0, 1.0)
                    .from_to(Property::Scale, 0.95, 1.0)
                    .duration(Duration::from_millis(600))
                    .delay(Duration::from_millis(150))
                    .ease(Ease::Power2Out),
                Position::START,
            );
        for dot in 0..len {
            let (scale, opacity) = dot_look(dot == to);
            trailing = trailing.add(
                Tween::new(LayerId::new(panel, Layer::StepDot(dot)))
                    .to(Property::Scale, scale)
                    .to(Property::Opacity, opacity),
                Position::START,
            );
        }

        let ticket = self.ticket();
        let trailing_ticket = self.ticket();
        trace!(%ticket, %trailing_ticket, panel, from, to, "playing step change");
        self.trailing.push((trailing_ticket, panel));
        self.animator.play(text, ticket, now);
        self.animator.play(trailing, trailing_ticket, now);
        ticket
    }

    /// Snap a panel's steps to "first step only", without animating. Media
    /// and dot timelines still running for the panel are killed first.
    pub fn reset_steps(&mut self, panel: usize, len: usize) {
        let animator = &mut self.animator;
        self.trailing.retain(|&(ticket, owner)| {
            if owner == panel {
                animator.kill(ticket);
                false
            } else {
                true
            }
        });
        for step in 0..len {
            let first = step == 0;
            let text = if first {
                StepVisual::SHOWN
            } else {
                StepVisual::HIDDEN
            };
            self.snap(panel, Layer::StepText(step), Property::Opacity, text.opacity);
            self.snap(panel, Layer::StepText(step), Property::Y, text.y);
            self.snap(panel, Layer::StepText(step), Property::Blur, text.blur);

            self.snap(
                panel,
                Layer::StepMedia(step),
                Property::Opacity,
                if first { 1.0 } else { 0.0 },
            );
            self.snap(panel, Layer::StepMedia(step), Property::Scale, 1.0);

            let (scale, opacity) = dot_look(first);
            self.snap(panel, Layer::StepDot(step), Property::Scale, scale);
            self.snap(panel, Layer::StepDot(step), Property::Opacity, opacity);
        }
    }

    /// Reads back the text visual of one step.
    pub fn step_visual(&self, panel: usize, step: usize) -> Option<StepVisual> {
        let layer = Layer::StepText(step);
        Some(StepVisual {
            opacity: self.value(panel, layer, Property::Opacity)?,
            y: self.value(panel, layer, Property::Y)?,
            blur: self.value(panel, layer, Property::Blur)?,
        })
    }
}

fn dot_look(active: bool) -> (f32, f32) {
    if active {
        (DOT_ACTIVE_SCALE, DOT_ACTIVE_OPACITY)
    } else {
        (DOT_IDLE_SCALE, DOT_IDLE_OPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline::TimelineRunner;

    fn choreographer() -> (
        Choreographer<TimelineRunner<LayerId>>,
        timeline::CompletionReceiver,
    ) {
        let (runner, rx) = TimelineRunner::with_channel();
        let mut settings = NavigationSettings::default();
        settings.transition_duration = Duration::from_millis(1000);
        settings.ease = EaseSetting::Linear;
        (Choreographer::new(runner, &settings), rx)
    }

    #[test]
    fn mount_shows_only_the_active_panel() {
        let (mut choreo, _rx) = choreographer();
        choreo.mount(3, 0);
        assert_eq!(choreo.value(0, Layer::Section, Property::Opacity), Some(1.0));
        assert_eq!(choreo.value(1, Layer::Section, Property::Opacity), Some(0.0));
        assert_eq!(choreo.value(2, Layer::Outer, Property::YPercent), Some(100.0));
        assert_eq!(choreo.value(2, Layer::Inner, Property::YPercent), Some(-100.0));
        assert_eq!(choreo.value(0, Layer::Outer, Property::YPercent), Some(0.0));
    }

    #[test]
    fn forward_transition_enters_from_below_and_hides_the_old_panel() {
        let (mut choreo, rx) = choreographer();
        choreo.mount(2, 0);
        let start = Instant::now();
        let ticket = choreo.play_transition(0, 1, Direction::Forward, start);

        assert_eq!(choreo.value(1, Layer::Section, Property::Opacity), Some(1.0));
        assert_eq!(choreo.value(1, Layer::Outer, Property::YPercent), Some(100.0));
        assert_eq!(choreo.value(1, Layer::Inner, Property::YPercent), Some(-100.0));
        assert_eq!(choreo.value(1, Layer::Background, Property::YPercent), Some(15.0));

        choreo.animator_mut().advance(start + Duration::from_millis(500));
        let outer = choreo.value(1, Layer::Outer, Property::YPercent).unwrap();
        assert!((outer - 50.0).abs() < 0.5);
        assert_eq!(choreo.value(0, Layer::Section, Property::Opacity), Some(1.0));

        choreo.animator_mut().advance(start + Duration::from_millis(1000));
        assert_eq!(choreo.value(1, Layer::Outer, Property::YPercent), Some(0.0));
        assert_eq!(choreo.value(0, Layer::Background, Property::YPercent), Some(-15.0));
        assert_eq!(choreo.value(0, Layer::Section, Property::Opacity), Some(0.0));
        assert_eq!(rx.try_recv().map(|c| c.ticket), Ok(ticket));
    }

    #[test]
    fn backward_transition_mirrors_the_offsets() {
        let (mut choreo, _rx) = choreographer();
        choreo.mount(2, 1);
        choreo.play_transition(1, 0, Direction::Backward, Instant::now());
        assert_eq!(choreo.value(0, Layer::Outer, Property::YPercent), Some(-100.0));
        assert_eq!(choreo.value(0, Layer::Inner, Property::YPercent), Some(100.0));
        assert_eq!(choreo.value(0, Layer::Background, Property::YPercent), Some(-15.0));
    }

    #[test]
    fn tickets_are_unique() {
        let (mut choreo, _rx) = choreographer();
        choreo.mount(3, 0);
        let now = Instant::now();
        let first = choreo.play_transition(0, 1, Direction::Forward, now);
        let second = choreo.play_step(1, 0, 1, 3, Direction::Forward, now);
        assert_ne!(first, second);
    }

    #[test]
    fn step_reset_shows_first_step_only() {
        let (mut choreo, _rx) = choreographer();
        choreo.reset_steps(4, 3);
        assert_eq!(choreo.step_visual(4, 0), Some(StepVisual::SHOWN));
        assert_eq!(choreo.step_visual(4, 1), Some(StepVisual::HIDDEN));
        assert_eq!(choreo.step_visual(4, 2), Some(StepVisual::HIDDEN));
        assert_eq!(choreo.value(4, Layer::StepDot(0), Property::Scale), Some(1.0));
        assert_eq!(choreo.value(4, Layer::StepMedia(2), Property::Opacity), Some(0.0));
    }

    #[test]
    fn step_change_settles_on_the_new_step() {
        let (mut choreo, rx) = choreographer();
        choreo.reset_steps(0, 2);
        let start = Instant::now();
        let ticket = choreo.play_step(0, 0, 1, 2, Direction::Forward, start);
        choreo.animator_mut().advance(start + Duration::from_millis(800));
        assert_eq!(rx.try_recv().map(|c| c.ticket), Ok(ticket));
        assert_eq!(choreo.step_visual(0, 1), Some(StepVisual::SHOWN));
        let old = choreo.step_visual(0, 0).unwrap();
        assert_eq!(old.opacity, 0.0);
        assert_eq!(old.y, -25.0);
        assert_eq!(choreo.value(0, Layer::StepDot(1), Property::Scale), Some(1.0));
        assert_eq!(choreo.value(0, Layer::StepDot(0), Property::Scale), Some(0.7));
    }

    #[test]
    fn step_ticket_covers_the_text_only() {
        let (mut choreo, rx) = choreographer();
        choreo.reset_steps(0, 2);
        let start = Instant::now();
        let ticket = choreo.play_step(0, 0, 1, 2, Direction::Forward, start);

        choreo.animator_mut().advance(start + Duration::from_millis(690));
        assert!(rx.try_recv().is_err());

        choreo.animator_mut().advance(start + Duration::from_millis(710));
        assert_eq!(rx.try_recv().map(|c| c.ticket), Ok(ticket));
        assert_eq!(choreo.step_visual(0, 1), Some(StepVisual::SHOWN));
        let media = choreo.value(0, Layer::StepMedia(1), Property::Opacity).unwrap();
        assert!(media < 1.0);

        choreo.animator_mut().advance(start + Duration::from_millis(760));
        let trailing = rx.try_recv().expect("trailing completion").ticket;
        assert_ne!(trailing, ticket);
        assert!(choreo.retire(trailing));
        assert!(!choreo.retire(trailing));
        assert!(!choreo.retire(ticket));
        assert_eq!(choreo.value(0, Layer::StepMedia(1), Property::Opacity), Some(1.0));
    }

    #[test]
    fn step_reset_kills_running_step_timelines() {
        let (mut choreo, rx) = choreographer();
        choreo.reset_steps(2, 3);
        let start = Instant::now();
        let ticket = choreo.play_step(2, 0, 1, 3, Direction::Forward, start);
        choreo.animator_mut().advance(start + Duration::from_millis(150));

        assert!(choreo.kill(ticket));
        choreo.reset_steps(2, 3);
        choreo.animator_mut().advance(start + Duration::from_secs(1));

        assert!(rx.try_recv().is_err());
        assert_eq!(choreo.animator().playing(), 0);
        assert_eq!(choreo.step_visual(2, 0), Some(StepVisual::SHOWN));
        assert_eq!(choreo.step_visual(2, 1), Some(StepVisual::HIDDEN));
        assert_eq!(choreo.value(2, Layer::StepMedia(1), Property::Opacity), Some(0.0));
        assert_eq!(choreo.value(2, Layer::StepDot(0), Property::Scale), Some(1.0));
    }
}
