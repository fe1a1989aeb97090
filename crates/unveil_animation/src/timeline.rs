//! Timeline orchestration for multiple animations
//!
//! A timeline places tweens at offsets on a shared playhead. It can play
//! forward, reverse from wherever the playhead currently is, or be seeked
//! directly (scroll scrubbing). Staggered groups are timelines whose entries
//! are offset by `index * interval`.

use crate::keyframe::KeyframeProperties;
use crate::tween::Tween;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct TimelineEntryId;
}

/// Playback direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayDirection {
    #[default]
    Forward,
    Reverse,
}

/// An entry in a timeline
struct TimelineEntry<T> {
    target: T,
    /// Offset in milliseconds from timeline start
    offset_ms: f32,
    tween: Tween,
}

/// A timeline that orchestrates multiple tweens
pub struct Timeline<T: Copy> {
    entries: SlotMap<TimelineEntryId, TimelineEntry<T>>,
    order: Vec<TimelineEntryId>,
    current_time: f32,
    duration_ms: f32,
    /// Earliest entry offset; reversing stops here instead of replaying the delay
    lead_in_ms: f32,
    direction: PlayDirection,
    playing: bool,
}

impl<T: Copy> Timeline<T> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            current_time: 0.0,
            duration_ms: 0.0,
            lead_in_ms: 0.0,
            direction: PlayDirection::Forward,
            playing: false,
        }
    }

    /// Add a tween for `target` starting `offset_ms` after the timeline start
    ///
    /// Negative offsets are clamped to 0.
    pub fn add(&mut self, offset_ms: f32, target: T, tween: Tween) -> TimelineEntryId {
        let offset_ms = offset_ms.max(0.0);
        let id = self.entries.insert(TimelineEntry {
            target,
            offset_ms,
            tween,
        });

        self.lead_in_ms = if self.order.is_empty() {
            offset_ms
        } else {
            self.lead_in_ms.min(offset_ms)
        };
        self.order.push(id);
        self.duration_ms = self.duration_ms.max(offset_ms + tween.duration_ms);

        id
    }

    /// Play forward from the current position
    pub fn play(&mut self) {
        self.direction = PlayDirection::Forward;
        self.playing = true;
    }

    /// Play backward from the current position toward the start
    pub fn reverse(&mut self) {
        self.direction = PlayDirection::Reverse;
        self.playing = true;
    }

    /// Restart from the beginning
    pub fn restart(&mut self) {
        self.current_time = 0.0;
        self.play();
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Playhead position as a fraction of the total duration
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return if self.current_time > 0.0 || self.is_complete() {
                1.0
            } else {
                0.0
            };
        }
        (self.current_time / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Whether forward playback has finished
    pub fn is_complete(&self) -> bool {
        !self.playing
            && self.direction == PlayDirection::Forward
            && self.current_time >= self.duration_ms
            && !self.order.is_empty()
    }

    /// Move the playhead without changing play state
    pub fn seek(&mut self, time_ms: f32) {
        self.current_time = time_ms.clamp(0.0, self.duration_ms);
    }

    /// Move the playhead to a fraction of the total duration
    pub fn seek_progress(&mut self, progress: f32) {
        self.seek(progress.clamp(0.0, 1.0) * self.duration_ms);
    }

    /// Advance the playhead; returns whether the timeline is still playing
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if !self.playing {
            return false;
        }
        let dt_ms = dt_ms.max(0.0);

        match self.direction {
            PlayDirection::Forward => {
                self.current_time += dt_ms;
                if self.current_time >= self.duration_ms {
                    self.current_time = self.duration_ms;
                    self.playing = false;
                }
            }
            PlayDirection::Reverse => {
                self.current_time -= dt_ms;
                if self.current_time <= self.lead_in_ms {
                    self.current_time = 0.0;
                    self.playing = false;
                }
            }
        }

        self.playing
    }

    /// Start offset of an entry
    pub fn entry_offset(&self, id: TimelineEntryId) -> Option<f32> {
        self.entries.get(id).map(|e| e.offset_ms)
    }

    /// Current value of an entry
    pub fn value(&self, id: TimelineEntryId) -> Option<KeyframeProperties> {
        let entry = self.entries.get(id)?;
        Some(entry.tween.sample_at(self.current_time - entry.offset_ms))
    }

    /// Current values of every entry, in insertion order
    pub fn values(&self) -> impl Iterator<Item = (T, KeyframeProperties)> + '_ {
        self.order.iter().filter_map(move |id| {
            let entry = self.entries.get(*id)?;
            Some((
                entry.target,
                entry.tween.sample_at(self.current_time - entry.offset_ms),
            ))
        })
    }

    /// Targets in insertion order
    pub fn targets(&self) -> impl Iterator<Item = T> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.entries.get(*id).map(|e| e.target))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<T: Copy> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    fn fade(duration_ms: f32) -> Tween {
        let from = KeyframeProperties::opacity(0.0);
        Tween::new(from, from.to_resting(), duration_ms, Easing::Linear)
    }

    #[test]
    fn test_duration_spans_offsets() {
        let mut timeline = Timeline::new();
        timeline.add(0.0, 0usize, fade(800.0));
        timeline.add(150.0, 1usize, fade(800.0));
        timeline.add(300.0, 2usize, fade(800.0));
        assert_eq!(timeline.duration_ms(), 1100.0);
    }

    #[test]
    fn test_forward_play_completes() {
        let mut timeline = Timeline::new();
        let id = timeline.add(0.0, (), fade(100.0));
        timeline.play();

        assert!(timeline.tick(50.0));
        assert!((timeline.value(id).unwrap().resolved_opacity() - 0.5).abs() < 1e-5);
        assert!(!timeline.tick(60.0));
        assert!(timeline.is_complete());
        assert_eq!(timeline.value(id).unwrap().opacity, Some(1.0));
    }

    #[test]
    fn test_reverse_from_midpoint() {
        let mut timeline = Timeline::new();
        let id = timeline.add(0.0, (), fade(100.0));
        timeline.play();
        timeline.tick(40.0);
        timeline.reverse();
        timeline.tick(20.0);
        assert!((timeline.value(id).unwrap().resolved_opacity() - 0.2).abs() < 1e-5);
        timeline.tick(100.0);
        assert!(!timeline.is_playing());
        assert_eq!(timeline.current_time(), 0.0);
        assert_eq!(timeline.value(id).unwrap().opacity, Some(0.0));
    }

    #[test]
    fn test_reverse_skips_lead_in() {
        let mut timeline = Timeline::new();
        timeline.add(500.0, (), fade(100.0));
        timeline.seek(600.0);
        timeline.reverse();
        // 100ms reaches the lead-in; the 500ms delay is not replayed
        assert!(!timeline.tick(100.0));
        assert_eq!(timeline.current_time(), 0.0);
    }

    #[test]
    fn test_entries_hold_from_state_before_offset() {
        let mut timeline = Timeline::new();
        timeline.add(0.0, 'a', fade(100.0));
        timeline.add(200.0, 'b', fade(100.0));
        timeline.seek(150.0);

        let values: Vec<_> = timeline.values().collect();
        assert_eq!(values[0].1.opacity, Some(1.0));
        assert_eq!(values[1].1.opacity, Some(0.0));
    }
}
