//! Scenario definition for headless scroll runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Sequence of input, frame and assertion steps run against a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Frame length used by `wait` and `tick`; defaults to the plugin frame interval
    #[serde(default)]
    pub frame_ms: Option<f32>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("failed to parse scenario")
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in {}", path.display()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    ScrollTo {
        y: f32,
    },
    ScrollBy {
        dy: f32,
    },
    Resize {
        width: f32,
        height: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerLeave,
    /// Advance the clock in frames until `ms` has elapsed
    Wait {
        ms: f32,
    },
    Tick {
        frames: u32,
    },
    /// Release one binding by id
    Release {
        binding: String,
    },
    /// Release every binding of the scene
    Revert,
    AssertStyle {
        element: String,
        #[serde(default)]
        opacity: Option<f32>,
        #[serde(default)]
        x: Option<f32>,
        #[serde(default)]
        y: Option<f32>,
        #[serde(default)]
        scale: Option<f32>,
        #[serde(default)]
        rotate: Option<f32>,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
    /// Compare `text_content` (own text plus generated units)
    AssertText {
        element: String,
        value: String,
        #[serde(default)]
        contains: bool,
    },
    AssertState {
        binding: String,
        state: String,
    },
    AssertListeners {
        count: usize,
    },
}

fn default_tolerance() -> f32 {
    1e-3
}

impl ScenarioStep {
    /// Assertion name used in reports; `None` for non-assertion steps
    pub fn assertion(&self) -> Option<&'static str> {
        match self {
            ScenarioStep::AssertStyle { .. } => Some("assert_style"),
            ScenarioStep::AssertText { .. } => Some("assert_text"),
            ScenarioStep::AssertState { .. } => Some("assert_state"),
            ScenarioStep::AssertListeners { .. } => Some("assert_listeners"),
            _ => None,
        }
    }
}
