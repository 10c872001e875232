use std::collections::BTreeSet;

use deckconfig::NavigationSettings;
use serde::Serialize;

/// Marker carried by draggable cards and other elements that must not drive
/// navigation.
pub const NO_SWIPE: &str = "no-swipe";

/// Gesture class; each class has its own cooldown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Wheel,
    Touch,
}

/// Input as it arrives from the platform, before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    /// One wheel event. Positive `delta_y` scrolls down.
    Wheel { delta_y: f32 },
    /// A completed touch or pointer swipe between two vertical positions.
    Swipe { start_y: f32, end_y: f32 },
}

/// The element stack under the pointer, described by the markers each
/// ancestor carries (innermost first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTarget {
    markers: Vec<String>,
}

impl PointerTarget {
    /// The bare panel surface; never exempt.
    pub fn surface() -> Self {
        Self::default()
    }

    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn carries_any(&self, exempt: &BTreeSet<String>) -> bool {
        self.markers.iter().any(|marker| exempt.contains(marker))
    }
}

/// One normalized gesture unit: a wheel tick or a recognized swipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub delta: f32,
    pub target: PointerTarget,
}

impl Gesture {
    pub fn wheel(delta: f32) -> Self {
        Self {
            kind: GestureKind::Wheel,
            delta,
            target: PointerTarget::surface(),
        }
    }

    pub fn swipe(delta: f32) -> Self {
        Self {
            kind: GestureKind::Touch,
            delta,
            target: PointerTarget::surface(),
        }
    }

    pub fn over(mut self, target: PointerTarget) -> Self {
        self.target = target;
        self
    }
}

/// Turns raw platform input into gesture units.
///
/// Wheel events pass through with their delta untouched so each consumer can
/// apply its own tolerance; swipes shorter than the threshold are discarded.
#[derive(Debug, Clone)]
pub struct GestureNormalizer {
    swipe_threshold: f32,
}

impl GestureNormalizer {
    pub fn new(swipe_threshold: f32) -> Self {
        Self { swipe_threshold }
    }

    pub fn from_settings(settings: &NavigationSettings) -> Self {
        Self::new(settings.swipe_threshold)
    }

    pub fn normalize(&self, input: RawInput, target: PointerTarget) -> Option<Gesture> {
        match input {
            RawInput::Wheel { delta_y } => {
                if delta_y == 0.0 || !delta_y.is_finite() {
                    return None;
                }
                Some(Gesture::wheel(delta_y).over(target))
            }
            RawInput::Swipe { start_y, end_y } => {
                // Finger travelling up reveals what is below: forward.
                let delta = start_y - end_y;
                if !delta.is_finite() || delta.abs() < self.swipe_threshold || delta == 0.0 {
                    return None;
                }
                Some(Gesture::swipe(delta).over(target))
            }
        }
    }
}
