//! Assertion helpers for scenario steps.

use unveil_core::{BindingState, Style};

/// Assertion result with structured failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionResult {
    Passed,
    Failed { code: String, message: String },
}

impl AssertionResult {
    fn failed(code: &str, message: String) -> Self {
        AssertionResult::Failed {
            code: code.to_string(),
            message,
        }
    }
}

/// Expected style values; `None` fields are not checked
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedStyle {
    pub opacity: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale: Option<f32>,
    pub rotate: Option<f32>,
}

pub fn evaluate_assert_style(
    name: &str,
    style: Option<Style>,
    expected: &ExpectedStyle,
    tolerance: f32,
) -> AssertionResult {
    let Some(style) = style else {
        return AssertionResult::failed("missing_element", format!("{name}: element not found"));
    };
    let checks = [
        ("opacity", expected.opacity, style.opacity),
        ("x", expected.x, style.translate_x),
        ("y", expected.y, style.translate_y),
        ("scale", expected.scale, style.scale),
        ("rotate", expected.rotate, style.rotation),
    ];
    for (property, expected, actual) in checks {
        if let Some(expected) = expected {
            if (expected - actual).abs() > tolerance {
                return AssertionResult::failed(
                    "style_mismatch",
                    format!("{name}: expected {property} {expected}, got {actual}"),
                );
            }
        }
    }
    AssertionResult::Passed
}

pub fn evaluate_assert_text(
    name: &str,
    text: Option<String>,
    expected: &str,
    contains: bool,
) -> AssertionResult {
    let Some(text) = text else {
        return AssertionResult::failed("missing_element", format!("{name}: element not found"));
    };
    let matched = if contains {
        text.contains(expected)
    } else {
        text == expected
    };
    if matched {
        AssertionResult::Passed
    } else {
        let relation = if contains { "substring" } else { "text" };
        AssertionResult::failed(
            "text_mismatch",
            format!("{name}: expected {relation} '{expected}', got '{text}'"),
        )
    }
}

pub fn evaluate_assert_state(id: &str, actual: BindingState, expected: &str) -> AssertionResult {
    if actual.name() == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::failed(
            "state_mismatch",
            format!("{id}: expected state '{expected}', got '{}'", actual.name()),
        )
    }
}

pub fn evaluate_assert_listeners(actual: usize, expected: usize) -> AssertionResult {
    if actual == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::failed(
            "listener_mismatch",
            format!("expected {expected} listeners, got {actual}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_tolerance() {
        let style = Style {
            opacity: 0.4995,
            ..Style::RESTING
        };
        let expected = ExpectedStyle {
            opacity: Some(0.5),
            ..Default::default()
        };
        assert_eq!(
            evaluate_assert_style("card", Some(style), &expected, 1e-3),
            AssertionResult::Passed
        );
        assert!(matches!(
            evaluate_assert_style("card", Some(style), &expected, 1e-5),
            AssertionResult::Failed { ref code, .. } if code == "style_mismatch"
        ));
        assert!(matches!(
            evaluate_assert_style("card", None, &expected, 1e-3),
            AssertionResult::Failed { ref code, .. } if code == "missing_element"
        ));
    }

    #[test]
    fn test_text_exact_and_contains() {
        let text = Some("₹78000".to_string());
        assert_eq!(
            evaluate_assert_text("stat", text.clone(), "₹78000", false),
            AssertionResult::Passed
        );
        assert_eq!(
            evaluate_assert_text("stat", text.clone(), "78", true),
            AssertionResult::Passed
        );
        assert!(matches!(
            evaluate_assert_text("stat", text, "78", false),
            AssertionResult::Failed { .. }
        ));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(
            evaluate_assert_state("reveal", BindingState::AtRest, "at_rest"),
            AssertionResult::Passed
        );
        assert!(matches!(
            evaluate_assert_state("reveal", BindingState::Armed, "playing"),
            AssertionResult::Failed { .. }
        ));
    }
}
