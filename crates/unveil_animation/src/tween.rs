//! Tweens
//!
//! A tween describes a single eased transition. It holds no clock of its own:
//! callers sample it at a local time, which lets a [`crate::Timeline`] place
//! many tweens at different offsets and play them forward or backward.

use crate::easing::Easing;
use crate::keyframe::KeyframeProperties;

/// Eased transition between two style snapshots
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: KeyframeProperties,
    pub to: KeyframeProperties,
    pub duration_ms: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(
        from: KeyframeProperties,
        to: KeyframeProperties,
        duration_ms: f32,
        easing: Easing,
    ) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            easing,
        }
    }

    /// Sample at a progress value (clamped to 0.0 to 1.0)
    pub fn sample(&self, progress: f32) -> KeyframeProperties {
        let progress = progress.clamp(0.0, 1.0);
        if progress >= 1.0 {
            return self.to;
        }
        if progress <= 0.0 {
            return self.from;
        }
        self.from.lerp(&self.to, self.easing.apply(progress))
    }

    /// Sample at a time in milliseconds relative to the tween start
    pub fn sample_at(&self, local_ms: f32) -> KeyframeProperties {
        self.sample(local_progress(local_ms, self.duration_ms))
    }
}

/// Eased transition of a single numeric value
///
/// Computed in f64 so large counter targets land exactly on their end value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueTween {
    pub from: f64,
    pub to: f64,
    pub duration_ms: f32,
    pub easing: Easing,
}

impl ValueTween {
    pub fn new(from: f64, to: f64, duration_ms: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            easing,
        }
    }

    /// Value at a time in milliseconds relative to the tween start
    pub fn value_at(&self, local_ms: f32) -> f64 {
        let progress = local_progress(local_ms, self.duration_ms);
        if progress >= 1.0 {
            return self.to;
        }
        if progress <= 0.0 {
            return self.from;
        }
        self.from + (self.to - self.from) * self.easing.apply(progress) as f64
    }
}

fn local_progress(local_ms: f32, duration_ms: f32) -> f32 {
    if local_ms < 0.0 {
        return 0.0;
    }
    if duration_ms <= 0.0 {
        return 1.0;
    }
    (local_ms / duration_ms).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_endpoints() {
        let from = KeyframeProperties::opacity(0.0).with_y(60.0);
        let tween = Tween::new(from, from.to_resting(), 800.0, Easing::POWER3_OUT);

        assert_eq!(tween.sample_at(-10.0), from);
        assert_eq!(tween.sample_at(0.0), from);
        assert_eq!(tween.sample_at(800.0), from.to_resting());
        assert_eq!(tween.sample_at(5000.0), from.to_resting());
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let from = KeyframeProperties::opacity(0.0);
        let tween = Tween::new(from, from.to_resting(), 0.0, Easing::Linear);
        assert_eq!(tween.sample_at(0.0).opacity, Some(1.0));
        assert_eq!(tween.sample_at(-1.0).opacity, Some(0.0));
    }

    #[test]
    fn test_value_tween_lands_exactly() {
        let tween = ValueTween::new(0.0, 78_000.0, 1500.0, Easing::POWER2_OUT);
        assert_eq!(tween.value_at(0.0), 0.0);
        assert_eq!(tween.value_at(1500.0), 78_000.0);
        let mid = tween.value_at(750.0);
        assert!(mid > 39_000.0 && mid < 78_000.0);
    }
}
