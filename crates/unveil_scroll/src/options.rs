//! Timing and binding options
//!
//! Option values are taken as given and sanitized when a binding is built:
//! negative or non-finite times clamp to zero, unknown easing names fall back
//! to the binding's default curve. Every fallback logs a warning.

use crate::plugin;
use unveil_animation::Easing;

/// Duration, delay (seconds) and easing of a tween
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub duration: f32,
    pub delay: f32,
    pub easing: Easing,
}

impl Timing {
    pub fn new(duration: f32, delay: f32, easing: Easing) -> Self {
        Self {
            duration,
            delay,
            easing,
        }
    }

    /// Registered reveal defaults
    pub fn reveal() -> Self {
        let reveal = &plugin::defaults().reveal;
        Self::new(
            reveal.duration,
            reveal.delay,
            easing_or(&reveal.ease, Easing::POWER3_OUT),
        )
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: easing by name, keeping the current curve if the name is unknown
    pub fn with_ease(mut self, name: &str) -> Self {
        self.easing = easing_or(name, self.easing);
        self
    }

    pub(crate) fn duration_ms(&self) -> f32 {
        seconds_to_ms("duration", self.duration)
    }

    pub(crate) fn delay_ms(&self) -> f32 {
        seconds_to_ms("delay", self.delay)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::reveal()
    }
}

/// Timing of a staggered group: per-child timing plus the interval between children
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stagger {
    pub timing: Timing,
    /// Seconds between consecutive child start times
    pub interval: f32,
}

impl Stagger {
    pub fn new(timing: Timing, interval: f32) -> Self {
        Self { timing, interval }
    }

    /// Registered stagger group defaults
    pub fn group() -> Self {
        let stagger = &plugin::defaults().stagger;
        Self::new(
            Timing::new(
                stagger.duration,
                0.0,
                easing_or(&stagger.ease, Easing::POWER3_OUT),
            ),
            stagger.interval,
        )
    }

    /// Registered text reveal defaults
    pub fn text() -> Self {
        let text = &plugin::defaults().text;
        Self::new(
            Timing::new(text.duration, 0.0, easing_or(&text.ease, Easing::POWER3_OUT)),
            text.interval,
        )
    }

    pub fn with_interval(mut self, seconds: f32) -> Self {
        self.interval = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.timing.delay = seconds;
        self
    }

    pub(crate) fn interval_ms(&self) -> f32 {
        seconds_to_ms("interval", self.interval)
    }
}

impl Default for Stagger {
    fn default() -> Self {
        Self::group()
    }
}

/// Upper bound for [`CounterBinding::decimals`]
pub const MAX_DECIMALS: usize = 100;

/// A numeric counter written into an element's text
#[derive(Clone, Debug, PartialEq)]
pub struct CounterBinding {
    pub start: f64,
    pub end: f64,
    pub timing: Timing,
    pub prefix: String,
    pub suffix: String,
    pub decimals: usize,
}

impl CounterBinding {
    /// Count from 0 to `end` with the registered counter defaults
    pub fn new(end: f64) -> Self {
        let counter = &plugin::defaults().counter;
        Self {
            start: 0.0,
            end,
            timing: Timing::new(
                counter.duration,
                0.0,
                easing_or(&counter.ease, Easing::POWER2_OUT),
            ),
            prefix: String::new(),
            suffix: String::new(),
            decimals: 0,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Fixed decimal places, capped at [`MAX_DECIMALS`]
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        if decimals > MAX_DECIMALS {
            tracing::warn!(decimals, max = MAX_DECIMALS, "counter decimals out of range, clamping");
        }
        self.decimals = decimals.min(MAX_DECIMALS);
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// `prefix + value with fixed decimals + suffix`
    ///
    /// Halves round away from zero, so `2.5` with no decimals prints `3`.
    pub fn format(&self, value: f64) -> String {
        let decimals = self.decimals.min(MAX_DECIMALS);
        let value = round_half_away(value, decimals);
        // Avoid printing "-0" for values that round to zero
        let value = if value == 0.0 { 0.0 } else { value };
        format!("{}{:.*}{}", self.prefix, decimals, value, self.suffix)
    }

    /// Finite start/end values, falling back to 0 with a warning
    pub(crate) fn sanitized_range(&self) -> (f64, f64) {
        let clean = |name: &str, v: f64| {
            if v.is_finite() {
                v
            } else {
                tracing::warn!(name, value = v, "non-finite counter value, using 0");
                0.0
            }
        };
        (clean("start", self.start), clean("end", self.end))
    }
}

/// Round to `decimals` places with halves going away from zero
///
/// Only applied while the scaled value is an exact integer in `f64`; past
/// that there is no fractional part left to round.
fn round_half_away(value: f64, decimals: usize) -> f64 {
    const EXACT: f64 = 9_007_199_254_740_992.0;
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= EXACT {
        return value;
    }
    scaled.round() / scale
}

/// Convert seconds to milliseconds, clamping negative or non-finite input to 0
pub(crate) fn seconds_to_ms(name: &str, seconds: f32) -> f32 {
    if seconds.is_finite() && seconds >= 0.0 {
        seconds * 1000.0
    } else {
        tracing::warn!(name, value = seconds, "out-of-range time, using 0");
        0.0
    }
}

/// Parse an easing name, falling back to `fallback` with a warning
pub fn easing_or(name: &str, fallback: Easing) -> Easing {
    name.parse().unwrap_or_else(|err: unveil_core::Error| {
        tracing::warn!(%err, "using fallback easing");
        fallback
    })
}

/// A finite factor, or `fallback` with a warning
pub(crate) fn finite_or(name: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        tracing::warn!(name, value, fallback, "non-finite value, using default");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_times_clamp() {
        let timing = Timing::new(-1.0, f32::NAN, Easing::Linear);
        assert_eq!(timing.duration_ms(), 0.0);
        assert_eq!(timing.delay_ms(), 0.0);
        assert_eq!(Timing::new(0.8, 0.2, Easing::Linear).duration_ms(), 800.0);
    }

    #[test]
    fn test_unknown_ease_keeps_curve() {
        let timing = Timing::new(1.0, 0.0, Easing::Linear).with_ease("wobble");
        assert_eq!(timing.easing, Easing::Linear);
        let timing = timing.with_ease("power2.out");
        assert_eq!(timing.easing, Easing::POWER2_OUT);
    }

    #[test]
    fn test_registered_defaults() {
        let reveal = Timing::reveal();
        assert_eq!(reveal.duration, 1.0);
        assert_eq!(reveal.easing, Easing::POWER3_OUT);

        let group = Stagger::group();
        assert_eq!(group.timing.duration, 0.8);
        assert!((group.interval_ms() - 150.0).abs() < 1e-3);

        let text = Stagger::text();
        assert!((text.interval_ms() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_counter_format() {
        let counter = CounterBinding::new(78_000.0).with_prefix("₹");
        assert_eq!(counter.format(0.0), "₹0");
        assert_eq!(counter.format(78_000.0), "₹78000");

        let rating = CounterBinding::new(4.9).with_decimals(1).with_suffix("/5");
        assert_eq!(rating.format(4.9), "4.9/5");
        assert_eq!(rating.format(-0.01), "0.0/5");
    }

    #[test]
    fn test_counter_rounds_half_away_from_zero() {
        let whole = CounterBinding::new(10.0);
        assert_eq!(whole.format(2.5), "3");
        assert_eq!(whole.format(-2.5), "-3");
        assert_eq!(whole.format(2.49), "2");

        let tenths = CounterBinding::new(10.0).with_decimals(1);
        assert_eq!(tenths.format(0.25), "0.3");
        assert_eq!(tenths.format(-0.04), "0.0");
    }

    #[test]
    fn test_counter_decimals_are_capped() {
        let counter = CounterBinding::new(5.0).with_decimals(70_000);
        assert_eq!(counter.decimals, MAX_DECIMALS);
        let text = counter.format(5.0);
        assert_eq!(text.len(), "5.".len() + MAX_DECIMALS);

        // Writing the public field directly is capped at format time
        let mut raw = CounterBinding::new(5.0);
        raw.decimals = usize::MAX;
        assert_eq!(raw.format(1.0).len(), "1.".len() + MAX_DECIMALS);
    }

    #[test]
    fn test_non_finite_counter_end() {
        let counter = CounterBinding::new(f64::INFINITY);
        assert_eq!(counter.sanitized_range(), (0.0, 0.0));
    }

    #[test]
    fn test_finite_or() {
        assert_eq!(finite_or("speed", f32::NAN, 0.5), 0.5);
        assert_eq!(finite_or("speed", -2.0, 0.5), -2.0);
    }
}
