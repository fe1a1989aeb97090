//! Animation presets for common entrance animations
//!
//! Every preset starts from an offset/hidden state and ends at the element's
//! natural resting style. Reveal presets travel further than the stagger
//! variants used for groups of cards.

use crate::keyframe::KeyframeProperties;
use std::fmt;
use std::str::FromStr;
use unveil_core::Error;

/// Named entrance animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    #[default]
    FadeUp,
    FadeDown,
    FadeLeft,
    FadeRight,
    FadeIn,
    ScaleUp,
    RotateIn,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 7] = [
        AnimationKind::FadeUp,
        AnimationKind::FadeDown,
        AnimationKind::FadeLeft,
        AnimationKind::FadeRight,
        AnimationKind::FadeIn,
        AnimationKind::ScaleUp,
        AnimationKind::RotateIn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnimationKind::FadeUp => "fadeUp",
            AnimationKind::FadeDown => "fadeDown",
            AnimationKind::FadeLeft => "fadeLeft",
            AnimationKind::FadeRight => "fadeRight",
            AnimationKind::FadeIn => "fadeIn",
            AnimationKind::ScaleUp => "scaleUp",
            AnimationKind::RotateIn => "rotateIn",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts `fadeUp`, `fade-up` and `fade_up` spellings
impl FromStr for AnimationKind {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let key: String = input
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        AnimationKind::ALL
            .into_iter()
            .find(|kind| kind.name().to_ascii_lowercase() == key)
            .ok_or_else(|| Error::UnknownAnimation(input.to_string()))
    }
}

/// A named pair of style snapshots
///
/// `to` is always the resting style for the properties `from` touches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    kind: AnimationKind,
    from: KeyframeProperties,
    to: KeyframeProperties,
}

impl AnimationSpec {
    fn new(kind: AnimationKind, from: KeyframeProperties) -> Self {
        Self {
            kind,
            from,
            to: from.to_resting(),
        }
    }

    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    pub fn from_state(&self) -> KeyframeProperties {
        self.from
    }

    pub fn to_state(&self) -> KeyframeProperties {
        self.to
    }
}

/// Pre-built animation presets
pub struct AnimationPreset;

impl AnimationPreset {
    /// Single-element reveal presets
    pub fn reveal(kind: AnimationKind) -> AnimationSpec {
        let from = match kind {
            AnimationKind::FadeUp => KeyframeProperties::opacity(0.0).with_y(60.0),
            AnimationKind::FadeDown => KeyframeProperties::opacity(0.0).with_y(-60.0),
            AnimationKind::FadeLeft => KeyframeProperties::opacity(0.0).with_x(-80.0),
            AnimationKind::FadeRight => KeyframeProperties::opacity(0.0).with_x(80.0),
            AnimationKind::FadeIn => KeyframeProperties::opacity(0.0),
            AnimationKind::ScaleUp => KeyframeProperties::opacity(0.0).with_scale(0.8),
            AnimationKind::RotateIn => KeyframeProperties::opacity(0.0)
                .with_rotate(-10.0)
                .with_y(40.0),
        };
        AnimationSpec::new(kind, from)
    }

    /// Group presets with shorter travel; kinds without one use the reveal preset
    pub fn stagger(kind: AnimationKind) -> AnimationSpec {
        let from = match kind {
            AnimationKind::FadeUp => KeyframeProperties::opacity(0.0).with_y(50.0),
            AnimationKind::FadeLeft => KeyframeProperties::opacity(0.0).with_x(-50.0),
            AnimationKind::FadeRight => KeyframeProperties::opacity(0.0).with_x(50.0),
            AnimationKind::ScaleUp => KeyframeProperties::opacity(0.0).with_scale(0.8),
            other => return Self::reveal(other),
        };
        AnimationSpec::new(kind, from)
    }

    /// Per-unit entrance used by text reveals
    pub fn text_unit() -> AnimationSpec {
        AnimationSpec::new(
            AnimationKind::FadeUp,
            KeyframeProperties::opacity(0.0).with_y(30.0),
        )
    }

    /// Resolve a kind by name, falling back to fadeUp
    pub fn kind_or_default(name: &str) -> AnimationKind {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(name, "unknown animation kind, using fadeUp");
            AnimationKind::FadeUp
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_core::Style;

    #[test]
    fn test_every_preset_ends_at_rest() {
        for kind in AnimationKind::ALL {
            for spec in [AnimationPreset::reveal(kind), AnimationPreset::stagger(kind)] {
                let mut style = Style {
                    opacity: 0.2,
                    translate_x: 5.0,
                    translate_y: 5.0,
                    scale: 0.5,
                    rotation: 3.0,
                };
                spec.to_state().apply_to(&mut style);
                for property in spec.from_state().properties().iter() {
                    let resting = Style::RESTING;
                    let (got, want) = match property {
                        unveil_core::StyleProperty::Opacity => (style.opacity, resting.opacity),
                        unveil_core::StyleProperty::TranslateX => {
                            (style.translate_x, resting.translate_x)
                        }
                        unveil_core::StyleProperty::TranslateY => {
                            (style.translate_y, resting.translate_y)
                        }
                        unveil_core::StyleProperty::Scale => (style.scale, resting.scale),
                        unveil_core::StyleProperty::Rotation => (style.rotation, resting.rotation),
                        unveil_core::StyleProperty::Text => continue,
                    };
                    assert_eq!(got, want, "{kind} {property:?}");
                }
            }
        }
    }

    #[test]
    fn test_fade_up_values() {
        let spec = AnimationPreset::reveal(AnimationKind::FadeUp);
        assert_eq!(spec.from_state().opacity, Some(0.0));
        assert_eq!(spec.from_state().translate_y, Some(60.0));
        assert_eq!(spec.to_state().translate_y, Some(0.0));

        let group = AnimationPreset::stagger(AnimationKind::FadeUp);
        assert_eq!(group.from_state().translate_y, Some(50.0));
    }

    #[test]
    fn test_stagger_falls_back_to_reveal() {
        assert_eq!(
            AnimationPreset::stagger(AnimationKind::RotateIn),
            AnimationPreset::reveal(AnimationKind::RotateIn)
        );
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("fadeUp".parse::<AnimationKind>().unwrap(), AnimationKind::FadeUp);
        assert_eq!("scale-up".parse::<AnimationKind>().unwrap(), AnimationKind::ScaleUp);
        assert_eq!("rotate_in".parse::<AnimationKind>().unwrap(), AnimationKind::RotateIn);
        assert!("spin".parse::<AnimationKind>().is_err());
        assert_eq!(AnimationPreset::kind_or_default("spin"), AnimationKind::FadeUp);
    }
}
