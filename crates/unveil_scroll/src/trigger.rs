//! Scroll triggers
//!
//! A trigger position pairs an edge of the element with a line in the
//! viewport: `"top 85%"` fires when the element's top edge reaches 85% of the
//! viewport height. Resolving a position against the element's layout and
//! the viewport yields the scroll offset at which that happens.

use crate::plugin;
use std::fmt;
use std::str::FromStr;
use unveil_core::{Error, Rect, Viewport};

/// A line on the element or in the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Fraction of the height (`"85%"` is `Percent(0.85)`)
    Percent(f32),
    /// Offset in style units from the top (`"120px"` or `"120"`)
    Pixels(f32),
}

impl Edge {
    /// Resolve against a span starting at `origin` with `extent` height
    fn resolve(&self, origin: f32, extent: f32) -> f32 {
        match *self {
            Edge::Top => origin,
            Edge::Center => origin + extent / 2.0,
            Edge::Bottom => origin + extent,
            Edge::Percent(p) => origin + extent * p,
            Edge::Pixels(px) => origin + px,
        }
    }
}

impl FromStr for Edge {
    type Err = ();

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let edge = match token {
            "top" => Edge::Top,
            "center" => Edge::Center,
            "bottom" => Edge::Bottom,
            _ => {
                let (number, percent) = match token.strip_suffix('%') {
                    Some(n) => (n, true),
                    None => (token.strip_suffix("px").unwrap_or(token), false),
                };
                let value: f32 = number.parse().map_err(|_| ())?;
                if !value.is_finite() {
                    return Err(());
                }
                if percent {
                    Edge::Percent(value / 100.0)
                } else {
                    Edge::Pixels(value)
                }
            }
        };
        Ok(edge)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => f.write_str("top"),
            Edge::Center => f.write_str("center"),
            Edge::Bottom => f.write_str("bottom"),
            Edge::Percent(p) => write!(f, "{}%", p * 100.0),
            Edge::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// `"<element edge> <viewport edge>"`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerPosition {
    pub element: Edge,
    pub viewport: Edge,
}

impl TriggerPosition {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the element edge meets the viewport line
    pub fn scroll_offset(&self, rect: &Rect, viewport: &Viewport) -> f32 {
        self.element.resolve(rect.top(), rect.height) - self.viewport.resolve(0.0, viewport.height)
    }

    /// Parse, falling back to `fallback` with a warning
    pub fn parse_or(input: &str, fallback: TriggerPosition) -> TriggerPosition {
        input.parse().unwrap_or_else(|err: Error| {
            tracing::warn!(%err, fallback = %fallback, "using fallback trigger position");
            fallback
        })
    }
}

impl FromStr for TriggerPosition {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidTriggerPosition(input.to_string());
        let lowered = input.trim().to_ascii_lowercase();
        let mut tokens = lowered.split_whitespace();
        let (Some(element), Some(viewport), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(invalid());
        };
        Ok(TriggerPosition {
            element: element.parse().map_err(|_| invalid())?,
            viewport: viewport.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for TriggerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// Built-in fallback for a malformed start position
pub const DEFAULT_START: TriggerPosition = TriggerPosition::new(Edge::Top, Edge::Percent(0.85));
/// Built-in fallback for a malformed end position
pub const DEFAULT_END: TriggerPosition = TriggerPosition::new(Edge::Bottom, Edge::Percent(0.2));

/// When, relative to scroll position, an animation begins and ends
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerConfig {
    pub start: TriggerPosition,
    pub end: TriggerPosition,
    /// Bind progress to scroll position instead of playing a timed tween
    pub scrub: bool,
    /// Play backward when scrolling back above `start`
    pub reversible: bool,
    /// Log resolved trigger offsets
    pub markers: bool,
}

impl TriggerConfig {
    /// Trigger starting at `start`, other fields from the registered defaults
    pub fn new(start: &str) -> Self {
        Self {
            start: TriggerPosition::parse_or(start, DEFAULT_START),
            ..Self::default()
        }
    }

    /// Play-once trigger at the registered counter start
    pub fn counter() -> Self {
        Self {
            start: TriggerPosition::parse_or(&plugin::defaults().counter.start, DEFAULT_START),
            reversible: false,
            ..Self::default()
        }
    }

    /// Strictly parse both positions
    pub fn try_new(start: &str, end: &str) -> Result<Self, Error> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
            ..Self::default()
        })
    }

    /// Builder: set the end position
    pub fn end(mut self, end: &str) -> Self {
        self.end = TriggerPosition::parse_or(end, DEFAULT_END);
        self
    }

    /// Builder: scrub with scroll
    pub fn scrub(mut self, scrub: bool) -> Self {
        self.scrub = scrub;
        self
    }

    /// Builder: reverse on leave-back
    pub fn reversible(mut self, reversible: bool) -> Self {
        self.reversible = reversible;
        self
    }

    /// Builder: log trigger offsets
    pub fn markers(mut self, markers: bool) -> Self {
        self.markers = markers;
        self
    }

    /// Resolve `(start, end)` scroll offsets for an element
    pub fn resolve(&self, rect: &Rect, viewport: &Viewport) -> TriggerRange {
        TriggerRange {
            start: self.start.scroll_offset(rect, viewport),
            end: self.end.scroll_offset(rect, viewport),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        let reveal = &plugin::defaults().reveal;
        Self {
            start: TriggerPosition::parse_or(&reveal.start, DEFAULT_START),
            end: TriggerPosition::parse_or(&reveal.end, DEFAULT_END),
            scrub: false,
            reversible: reveal.reversible,
            markers: false,
        }
    }
}

/// Resolved scroll offsets of a trigger
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRange {
    pub start: f32,
    pub end: f32,
}

impl TriggerRange {
    /// Whether the scroll position is at or past the start
    pub fn is_entered(&self, scroll: f32) -> bool {
        scroll >= self.start
    }

    /// Linear progress between start and end (0.0 to 1.0)
    pub fn progress(&self, scroll: f32) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if scroll >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll - self.start) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positions() {
        let p: TriggerPosition = "top 85%".parse().unwrap();
        assert_eq!(p.element, Edge::Top);
        assert!(matches!(p.viewport, Edge::Percent(v) if (v - 0.85).abs() < 1e-6));

        let p: TriggerPosition = "bottom top".parse().unwrap();
        assert_eq!(p, TriggerPosition::new(Edge::Bottom, Edge::Top));

        let p: TriggerPosition = "center 120px".parse().unwrap();
        assert_eq!(p, TriggerPosition::new(Edge::Center, Edge::Pixels(120.0)));
    }

    #[test]
    fn test_parse_errors() {
        assert!("top".parse::<TriggerPosition>().is_err());
        assert!("top 85% extra".parse::<TriggerPosition>().is_err());
        assert!("middle 50%".parse::<TriggerPosition>().is_err());
        assert!("top abc%".parse::<TriggerPosition>().is_err());
    }

    #[test]
    fn test_malformed_falls_back() {
        assert_eq!(TriggerPosition::parse_or("sideways", DEFAULT_START), DEFAULT_START);
        assert_eq!(TriggerConfig::new("???").start, DEFAULT_START);
    }

    #[test]
    fn test_scroll_offset() {
        let viewport = Viewport::new(1000.0, 800.0);
        let rect = Rect::new(0.0, 2000.0, 400.0, 300.0);

        let start: TriggerPosition = "top 85%".parse().unwrap();
        assert!((start.scroll_offset(&rect, &viewport) - (2000.0 - 680.0)).abs() < 1e-3);

        // Parallax range: enters at the viewport bottom, leaves at the top
        let config = TriggerConfig::new("top bottom").end("bottom top");
        let range = config.resolve(&rect, &viewport);
        assert_eq!(range.start, 1200.0);
        assert_eq!(range.end, 2300.0);
        assert!((range.progress(1750.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_range_steps() {
        let range = TriggerRange {
            start: 100.0,
            end: 100.0,
        };
        assert_eq!(range.progress(99.0), 0.0);
        assert_eq!(range.progress(100.0), 1.0);
    }
}
