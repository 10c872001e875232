use std::time::Duration;

use crate::{Ease, Property};

/// Where a tween starts relative to the timeline built so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// After everything already on the timeline has finished.
    Append,
    /// At an absolute offset from the timeline start. `At(Duration::ZERO)` is
    /// the shared synchronization point used to start several tweens together.
    At(Duration),
    /// Overlapping the current end of the timeline by the given amount.
    Overlap(Duration),
}

impl Position {
    pub const START: Position = Position::At(Duration::ZERO);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub property: Property,
    /// `None` captures whatever value the property holds when the tween starts.
    pub from: Option<f32>,
    pub to: f32,
}

/// A group of property tracks on one key sharing timing and easing.
#[derive(Debug, Clone)]
pub struct Tween<K> {
    key: K,
    tracks: Vec<Track>,
    duration: Option<Duration>,
    ease: Option<Ease>,
    delay: Duration,
}

impl<K> Tween<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            tracks: Vec::new(),
            duration: None,
            ease: None,
            delay: Duration::ZERO,
        }
    }

    /// Instant assignment; the tween takes no time on the timeline.
    pub fn set(key: K) -> Self {
        Self::new(key).duration(Duration::ZERO)
    }

    pub fn to(mut self, property: Property, value: f32) -> Self {
        self.tracks.push(Track {
            property,
            from: None,
            to: value,
        });
        self
    }

    pub fn from_to(mut self, property: Property, from: f32, to: f32) -> Self {
        self.tracks.push(Track {
            property,
            from: Some(from),
            to,
        });
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A tween with its position, duration and easing resolved against the
/// timeline defaults.
#[derive(Debug, Clone)]
pub struct ScheduledTween<K> {
    pub key: K,
    pub tracks: Vec<Track>,
    pub offset: Duration,
    pub duration: Duration,
    pub ease: Ease,
}

impl<K> ScheduledTween<K> {
    pub fn end(&self) -> Duration {
        self.offset + self.duration
    }
}

#[derive(Debug, Clone)]
pub struct Timeline<K> {
    tweens: Vec<ScheduledTween<K>>,
    end: Duration,
    default_duration: Duration,
    default_ease: Ease,
}

impl<K> Default for Timeline<K> {
    fn default() -> Self {
        Self::with_defaults(Duration::from_millis(500), Ease::default())
    }
}

impl<K> Timeline<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(duration: Duration, ease: Ease) -> Self {
        Self {
            tweens: Vec::new(),
            end: Duration::ZERO,
            default_duration: duration,
            default_ease: ease,
        }
    }

    pub fn add(mut self, tween: Tween<K>, position: Position) -> Self {
        let base = match position {
            Position::Append => self.end,
            Position::At(offset) => offset,
            Position::Overlap(amount) => self.end.saturating_sub(amount),
        };
        let scheduled = ScheduledTween {
            key: tween.key,
            tracks: tween.tracks,
            offset: base + tween.delay,
            duration: tween.duration.unwrap_or(self.default_duration),
            ease: tween.ease.unwrap_or(self.default_ease),
        };
        self.end = self.end.max(scheduled.end());
        self.tweens.push(scheduled);
        self
    }

    /// Total length: the latest end of any tween on the timeline.
    pub fn duration(&self) -> Duration {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn tweens(&self) -> &[ScheduledTween<K>] {
        &self.tweens
    }

    pub(crate) fn into_tweens(self) -> Vec<ScheduledTween<K>> {
        self.tweens
    }
}
