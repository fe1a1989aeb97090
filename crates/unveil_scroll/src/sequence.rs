//! Intro sequences
//!
//! A sequence is a timeline that plays as soon as it is bound, independent of
//! scroll. Steps run back to back by default; a step can instead start at an
//! absolute time or overlap the previous step with a negative offset. Steps
//! without their own duration or easing use the sequence defaults.

use crate::options::{seconds_to_ms, Timing};
use unveil_animation::{Easing, KeyframeProperties, Tween};
use unveil_core::{ElementId, ElementTree};

/// Where a step starts
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// Seconds after the previous step ends (negative overlaps it)
    After(f32),
    /// Seconds from the start of the sequence
    At(f32),
}

impl Default for Position {
    fn default() -> Self {
        Position::After(0.0)
    }
}

/// One entrance tween in a sequence
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceStep {
    pub element: Option<ElementId>,
    pub from: KeyframeProperties,
    /// Defaults to the resting style of `from`
    pub to: Option<KeyframeProperties>,
    pub duration: Option<f32>,
    pub easing: Option<Easing>,
    pub position: Position,
}

impl SequenceStep {
    pub fn new(element: Option<ElementId>, from: KeyframeProperties) -> Self {
        Self {
            element,
            from,
            to: None,
            duration: None,
            easing: None,
            position: Position::default(),
        }
    }

    pub fn to(mut self, to: KeyframeProperties) -> Self {
        self.to = Some(to);
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Start at an absolute time
    pub fn at(mut self, seconds: f32) -> Self {
        self.position = Position::At(seconds);
        self
    }

    /// Start relative to the end of the previous step
    pub fn after(mut self, offset_seconds: f32) -> Self {
        self.position = Position::After(offset_seconds);
        self
    }
}

/// Steps plus shared defaults; `defaults.delay` delays the whole sequence
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    pub defaults: Timing,
    pub steps: Vec<SequenceStep>,
}

/// A step placed on the timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacedStep {
    pub element: ElementId,
    pub offset_ms: f32,
    pub tween: Tween,
}

impl Sequence {
    pub fn new(defaults: Timing) -> Self {
        Self {
            defaults,
            steps: Vec::new(),
        }
    }

    /// Builder: append a step
    pub fn step(mut self, step: SequenceStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Resolve step offsets
    ///
    /// Steps whose element is missing still advance the cursor so the rest
    /// keep their authored timing. An element is animated by its first step
    /// only.
    pub(crate) fn layout(&self, elements: &ElementTree) -> Vec<PlacedStep> {
        let delay_ms = self.defaults.delay_ms();
        let mut cursor = delay_ms;
        let mut placed: Vec<PlacedStep> = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let duration_ms = match step.duration {
                Some(seconds) => seconds_to_ms("duration", seconds),
                None => self.defaults.duration_ms(),
            };
            let offset_ms = match step.position {
                Position::After(offset) if offset.is_finite() => cursor + offset * 1000.0,
                Position::At(at) if at.is_finite() => delay_ms + at * 1000.0,
                _ => {
                    tracing::warn!(?step.position, "non-finite step position, appending");
                    cursor
                }
            }
            .max(0.0);
            cursor = offset_ms + duration_ms;

            let Some(element) = step.element.filter(|id| elements.contains(*id)) else {
                tracing::debug!("sequence step element missing, skipping");
                continue;
            };
            if placed.iter().any(|p| p.element == element) {
                tracing::warn!("element already animated by an earlier sequence step, skipping");
                continue;
            }
            let to = step.to.unwrap_or_else(|| step.from.to_resting());
            let easing = step.easing.unwrap_or(self.defaults.easing);
            placed.push(PlacedStep {
                element,
                offset_ms,
                tween: Tween::new(step.from, to, duration_ms, easing),
            });
        }

        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_core::{Element, Rect};

    fn tree_with(n: usize) -> (ElementTree, Vec<ElementId>) {
        let mut tree = ElementTree::new();
        let ids = (0..n)
            .map(|i| tree.insert(Element::new(Rect::new(0.0, i as f32 * 50.0, 100.0, 40.0))))
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_steps_chain_with_overlap() {
        let (tree, ids) = tree_with(3);
        let fade = KeyframeProperties::opacity(0.0).with_y(30.0);
        let sequence = Sequence::new(Timing::new(1.0, 0.2, Easing::POWER3_OUT))
            .step(SequenceStep::new(Some(ids[0]), fade))
            .step(SequenceStep::new(Some(ids[1]), fade).after(-0.5))
            .step(SequenceStep::new(Some(ids[2]), fade).duration(0.4).at(0.0));

        let placed = sequence.layout(&tree);
        assert_eq!(placed.len(), 3);
        assert_eq!(placed[0].offset_ms, 200.0);
        assert_eq!(placed[1].offset_ms, 700.0);
        assert_eq!(placed[2].offset_ms, 200.0);
        assert_eq!(placed[2].tween.duration_ms, 400.0);
        assert_eq!(placed[0].tween.to.opacity, Some(1.0));
    }

    #[test]
    fn test_missing_elements_keep_timing() {
        let (tree, ids) = tree_with(1);
        let fade = KeyframeProperties::opacity(0.0);
        let sequence = Sequence::new(Timing::new(0.5, 0.0, Easing::Linear))
            .step(SequenceStep::new(None, fade))
            .step(SequenceStep::new(Some(ids[0]), fade))
            .step(SequenceStep::new(Some(ids[0]), fade));

        let placed = sequence.layout(&tree);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].offset_ms, 500.0);
    }
}
