use std::time::{Duration, Instant};

use crate::GestureKind;

/// Fixed wall-clock window opened by an accepted gesture.
///
/// Independent from the animation lock: the lock clears when an animation
/// completes, the cooldown when its window elapses.
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    until: Option<Instant>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            until: None,
        }
    }

    pub fn is_cooling(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn start(&mut self, now: Instant) {
        if !self.window.is_zero() {
            self.until = Some(now + self.window);
        }
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}

/// One cooldown per gesture class, so a wheel burst never blocks a swipe.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    wheel: Cooldown,
    touch: Cooldown,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self {
            wheel: Cooldown::new(window),
            touch: Cooldown::new(window),
        }
    }

    fn slot(&self, kind: GestureKind) -> &Cooldown {
        match kind {
            GestureKind::Wheel => &self.wheel,
            GestureKind::Touch => &self.touch,
        }
    }

    fn slot_mut(&mut self, kind: GestureKind) -> &mut Cooldown {
        match kind {
            GestureKind::Wheel => &mut self.wheel,
            GestureKind::Touch => &mut self.touch,
        }
    }

    pub fn is_cooling(&self, kind: GestureKind, now: Instant) -> bool {
        self.slot(kind).is_cooling(now)
    }

    pub fn start(&mut self, kind: GestureKind, now: Instant) {
        self.slot_mut(kind).start(now);
    }

    pub fn clear(&mut self) {
        self.wheel.clear();
        self.touch.clear();
    }
}
