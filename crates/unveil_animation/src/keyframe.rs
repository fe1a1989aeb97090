//! Keyframe style properties
//!
//! A partial style snapshot: only the properties that are `Some` take part in
//! interpolation and are written to an element. Tweens interpolate between
//! two of these.

use unveil_core::element::{PropertySet, Style, StyleProperty};

/// Properties that can be animated by a tween
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeyframeProperties {
    /// Opacity (0.0 to 1.0)
    pub opacity: Option<f32>,
    /// Translation X in style units
    pub translate_x: Option<f32>,
    /// Translation Y in style units
    pub translate_y: Option<f32>,
    /// Uniform scale factor
    pub scale: Option<f32>,
    /// Rotation in degrees (Z-axis)
    pub rotate: Option<f32>,
}

impl KeyframeProperties {
    /// Create properties with only opacity set
    pub fn opacity(value: f32) -> Self {
        Self {
            opacity: Some(value),
            ..Default::default()
        }
    }

    /// Create properties with translation
    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: Some(x),
            translate_y: Some(y),
            ..Default::default()
        }
    }

    /// Builder: set opacity
    pub fn with_opacity(mut self, value: f32) -> Self {
        self.opacity = Some(value);
        self
    }

    /// Builder: set X translation
    pub fn with_x(mut self, x: f32) -> Self {
        self.translate_x = Some(x);
        self
    }

    /// Builder: set Y translation
    pub fn with_y(mut self, y: f32) -> Self {
        self.translate_y = Some(y);
        self
    }

    /// Builder: set translation
    pub fn with_translate(mut self, x: f32, y: f32) -> Self {
        self.translate_x = Some(x);
        self.translate_y = Some(y);
        self
    }

    /// Builder: set uniform scale
    pub fn with_scale(mut self, value: f32) -> Self {
        self.scale = Some(value);
        self
    }

    /// Builder: set rotation
    pub fn with_rotate(mut self, degrees: f32) -> Self {
        self.rotate = Some(degrees);
        self
    }

    /// The same property set, every value at its resting style
    pub fn to_resting(&self) -> Self {
        let rest = Style::RESTING;
        Self {
            opacity: self.opacity.map(|_| rest.opacity),
            translate_x: self.translate_x.map(|_| rest.translate_x),
            translate_y: self.translate_y.map(|_| rest.translate_y),
            scale: self.scale.map(|_| rest.scale),
            rotate: self.rotate.map(|_| rest.rotation),
        }
    }

    /// Read the current values of this property set from a style
    pub fn capture(&self, style: &Style) -> Self {
        Self {
            opacity: self.opacity.map(|_| style.opacity),
            translate_x: self.translate_x.map(|_| style.translate_x),
            translate_y: self.translate_y.map(|_| style.translate_y),
            scale: self.scale.map(|_| style.scale),
            rotate: self.rotate.map(|_| style.rotation),
        }
    }

    /// Write the set properties into a style, leaving the rest untouched
    pub fn apply_to(&self, style: &mut Style) {
        if let Some(v) = self.opacity {
            style.opacity = v;
        }
        if let Some(v) = self.translate_x {
            style.translate_x = v;
        }
        if let Some(v) = self.translate_y {
            style.translate_y = v;
        }
        if let Some(v) = self.scale {
            style.scale = v;
        }
        if let Some(v) = self.rotate {
            style.rotation = v;
        }
    }

    /// The style properties this snapshot touches
    pub fn properties(&self) -> PropertySet {
        let mut set = PropertySet::EMPTY;
        if self.opacity.is_some() {
            set.insert(StyleProperty::Opacity);
        }
        if self.translate_x.is_some() {
            set.insert(StyleProperty::TranslateX);
        }
        if self.translate_y.is_some() {
            set.insert(StyleProperty::TranslateY);
        }
        if self.scale.is_some() {
            set.insert(StyleProperty::Scale);
        }
        if self.rotate.is_some() {
            set.insert(StyleProperty::Rotation);
        }
        set
    }

    /// Interpolate between two property sets
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: lerp_opt(self.opacity, other.opacity, t),
            translate_x: lerp_opt(self.translate_x, other.translate_x, t),
            translate_y: lerp_opt(self.translate_y, other.translate_y, t),
            scale: lerp_opt(self.scale, other.scale, t),
            rotate: lerp_opt(self.rotate, other.rotate, t),
        }
    }

    /// Get the resolved opacity (defaults to 1.0 if not set)
    pub fn resolved_opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }

    /// Get the resolved translation (defaults to 0.0 if not set)
    pub fn resolved_translate(&self) -> (f32, f32) {
        (
            self.translate_x.unwrap_or(0.0),
            self.translate_y.unwrap_or(0.0),
        )
    }
}

/// Helper to interpolate optional values
fn lerp_opt(a: Option<f32>, b: Option<f32>, t: f32) -> Option<f32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_set_properties() {
        let mut style = Style {
            scale: 2.0,
            ..Style::RESTING
        };
        KeyframeProperties::opacity(0.0)
            .with_y(60.0)
            .apply_to(&mut style);

        assert_eq!(style.opacity, 0.0);
        assert_eq!(style.translate_y, 60.0);
        assert_eq!(style.scale, 2.0);
    }

    #[test]
    fn test_to_resting_keeps_property_set() {
        let from = KeyframeProperties::opacity(0.0).with_rotate(-10.0).with_y(40.0);
        let to = from.to_resting();
        assert_eq!(to.opacity, Some(1.0));
        assert_eq!(to.rotate, Some(0.0));
        assert_eq!(to.translate_y, Some(0.0));
        assert_eq!(to.scale, None);
        assert_eq!(from.properties(), to.properties());
    }

    #[test]
    fn test_lerp_midpoint() {
        let from = KeyframeProperties::opacity(0.0).with_scale(0.8);
        let mid = from.lerp(&from.to_resting(), 0.5);
        assert!((mid.resolved_opacity() - 0.5).abs() < 1e-6);
        assert!((mid.scale.unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_capture_round_trip() {
        let style = Style {
            opacity: 0.3,
            translate_x: 12.0,
            ..Style::RESTING
        };
        let captured = KeyframeProperties::opacity(0.0).with_x(0.0).capture(&style);
        let mut restored = Style::RESTING;
        captured.apply_to(&mut restored);
        assert!(restored.approx_eq(&style, 1e-6));
    }
}
