use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::builder::ScheduledTween;
use crate::{
    completion_channel, Animator, Completion, CompletionReceiver, CompletionSender, LayerKey,
    Property, Ticket, Timeline,
};

/// In-memory [`Animator`] that keeps the current value of every property it
/// has touched. A renderer reads those values each frame.
pub struct TimelineRunner<K> {
    values: HashMap<(K, Property), f32>,
    playing: Vec<Playback<K>>,
    completions: CompletionSender,
}

struct Playback<K> {
    ticket: Ticket,
    started: Instant,
    total: Duration,
    tweens: Vec<LiveTween<K>>,
}

struct LiveTween<K> {
    spec: ScheduledTween<K>,
    starts: Option<Vec<f32>>,
}

impl<K: LayerKey> TimelineRunner<K> {
    pub fn new(completions: CompletionSender) -> Self {
        Self {
            values: HashMap::new(),
            playing: Vec::new(),
            completions,
        }
    }

    /// Builds a runner together with the receiving end of its completion channel.
    pub fn with_channel() -> (Self, CompletionReceiver) {
        let (tx, rx) = completion_channel();
        (Self::new(tx), rx)
    }

    pub fn playing(&self) -> usize {
        self.playing.len()
    }

    /// Samples one playback; returns true once it has run its full length.
    fn sample(&mut self, index: usize, now: Instant) -> bool {
        let playback = &mut self.playing[index];
        let elapsed = now.saturating_duration_since(playback.started);
        for live in playback.tweens.iter_mut() {
            if elapsed < live.spec.offset {
                continue;
            }
            if live.starts.is_none() {
                let captured = live
                    .spec
                    .tracks
                    .iter()
                    .map(|track| {
                        track
                            .from
                            .unwrap_or_else(|| lookup(&self.values, &live.spec.key, track.property))
                    })
                    .collect();
                live.starts = Some(captured);
            }
            let Some(starts) = live.starts.as_ref() else {
                continue;
            };
            let local = elapsed - live.spec.offset;
            let progress = if live.spec.duration.is_zero() {
                1.0
            } else {
                local.as_secs_f32() / live.spec.duration.as_secs_f32()
            };
            let mix = live.spec.ease.sample(progress);
            for (track, start) in live.spec.tracks.iter().zip(starts.iter()) {
                let value = start + (track.to - start) * mix;
                self.values
                    .insert((live.spec.key.clone(), track.property), value);
            }
        }
        elapsed >= playback.total
    }

    fn complete(&mut self, index: usize, now: Instant) {
        let playback = self.playing.remove(index);
        trace!(ticket = %playback.ticket, "timeline finished");
        let completion = Completion {
            ticket: playback.ticket,
            finished_at: now,
        };
        if self.completions.send(completion).is_err() {
            debug!(ticket = %playback.ticket, "completion receiver dropped; signal discarded");
        }
    }
}

impl<K: LayerKey> Animator<K> for TimelineRunner<K> {
    fn snap(&mut self, key: K, property: Property, value: f32) {
        self.values.insert((key, property), value);
    }

    fn play(&mut self, timeline: Timeline<K>, ticket: Ticket, now: Instant) {
        let total = timeline.duration();
        let tweens = timeline
            .into_tweens()
            .into_iter()
            .map(|spec| LiveTween { spec, starts: None })
            .collect();
        self.playing.push(Playback {
            ticket,
            started: now,
            total,
            tweens,
        });
        // Render the first frame immediately so `from` values are visible
        // before the next tick.
        let index = self.playing.len() - 1;
        if self.sample(index, now) {
            self.complete(index, now);
        }
    }

    fn kill(&mut self, ticket: Ticket) -> bool {
        let before = self.playing.len();
        self.playing.retain(|playback| playback.ticket != ticket);
        let killed = self.playing.len() != before;
        if killed {
            trace!(%ticket, "timeline killed");
        }
        killed
    }

    fn advance(&mut self, now: Instant) {
        let mut index = 0;
        while index < self.playing.len() {
            if self.sample(index, now) {
                self.complete(index, now);
            } else {
                index += 1;
            }
        }
    }

    fn value(&self, key: &K, property: Property) -> Option<f32> {
        self.values.get(&(key.clone(), property)).copied()
    }

    fn is_playing(&self, ticket: Ticket) -> bool {
        self.playing.iter().any(|playback| playback.ticket == ticket)
    }
}

fn lookup<K: LayerKey>(values: &HashMap<(K, Property), f32>, key: &K, property: Property) -> f32 {
    values
        .get(&(key.clone(), property))
        .copied()
        .unwrap_or_else(|| property.rest_value())
}
