//! Runtime defaults (unveil.toml)
//!
//! Every section is optional; missing keys take the built-in defaults.

use crate::text::Granularity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use unveil_animation::Easing;
use unveil_core::{Error, Result};

use crate::trigger::TriggerPosition;

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct UnveilConfig {
    #[serde(default)]
    pub reveal: RevealDefaults,
    #[serde(default)]
    pub stagger: StaggerDefaults,
    #[serde(default)]
    pub text: TextDefaults,
    #[serde(default)]
    pub counter: CounterDefaults,
    #[serde(default)]
    pub parallax: ParallaxDefaults,
    #[serde(default)]
    pub magnetic: MagneticDefaults,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Single-element reveal defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RevealDefaults {
    /// Seconds
    #[serde(default = "default_reveal_duration")]
    pub duration: f32,
    #[serde(default)]
    pub delay: f32,
    #[serde(default = "default_ease")]
    pub ease: String,
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_end")]
    pub end: String,
    #[serde(default = "default_true")]
    pub reversible: bool,
}

fn default_reveal_duration() -> f32 {
    1.0
}

fn default_ease() -> String {
    "power3.out".to_string()
}

fn default_start() -> String {
    "top 85%".to_string()
}

fn default_end() -> String {
    "bottom 20%".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RevealDefaults {
    fn default() -> Self {
        Self {
            duration: default_reveal_duration(),
            delay: 0.0,
            ease: default_ease(),
            start: default_start(),
            end: default_end(),
            reversible: true,
        }
    }
}

/// Stagger group defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StaggerDefaults {
    #[serde(default = "default_stagger_duration")]
    pub duration: f32,
    /// Seconds between consecutive children
    #[serde(default = "default_stagger_interval")]
    pub interval: f32,
    #[serde(default = "default_ease")]
    pub ease: String,
    #[serde(default = "default_child_selector")]
    pub child_selector: String,
}

fn default_stagger_duration() -> f32 {
    0.8
}

fn default_stagger_interval() -> f32 {
    0.15
}

fn default_child_selector() -> String {
    ".stagger-item".to_string()
}

impl Default for StaggerDefaults {
    fn default() -> Self {
        Self {
            duration: default_stagger_duration(),
            interval: default_stagger_interval(),
            ease: default_ease(),
            child_selector: default_child_selector(),
        }
    }
}

/// Text reveal defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TextDefaults {
    #[serde(default = "default_stagger_duration")]
    pub duration: f32,
    #[serde(default = "default_text_interval")]
    pub interval: f32,
    #[serde(default = "default_ease")]
    pub ease: String,
    #[serde(default)]
    pub granularity: Granularity,
}

fn default_text_interval() -> f32 {
    0.05
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            duration: default_stagger_duration(),
            interval: default_text_interval(),
            ease: default_ease(),
            granularity: Granularity::default(),
        }
    }
}

/// Counter defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CounterDefaults {
    #[serde(default = "default_counter_duration")]
    pub duration: f32,
    #[serde(default = "default_counter_ease")]
    pub ease: String,
    #[serde(default = "default_start")]
    pub start: String,
}

fn default_counter_duration() -> f32 {
    2.0
}

fn default_counter_ease() -> String {
    "power2.out".to_string()
}

impl Default for CounterDefaults {
    fn default() -> Self {
        Self {
            duration: default_counter_duration(),
            ease: default_counter_ease(),
            start: default_start(),
        }
    }
}

/// Parallax axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// Parallax defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParallaxDefaults {
    #[serde(default = "default_half")]
    pub speed: f32,
    #[serde(default)]
    pub axis: Axis,
}

fn default_half() -> f32 {
    0.5
}

impl Default for ParallaxDefaults {
    fn default() -> Self {
        Self {
            speed: default_half(),
            axis: Axis::Vertical,
        }
    }
}

/// Magnetic pointer defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MagneticDefaults {
    #[serde(default = "default_half")]
    pub strength: f32,
    #[serde(default = "default_follow_duration")]
    pub follow_duration: f32,
    #[serde(default = "default_counter_ease")]
    pub follow_ease: String,
    #[serde(default = "default_half")]
    pub return_duration: f32,
    #[serde(default = "default_return_ease")]
    pub return_ease: String,
}

fn default_follow_duration() -> f32 {
    0.3
}

fn default_return_ease() -> String {
    "elastic.out(1, 0.3)".to_string()
}

impl Default for MagneticDefaults {
    fn default() -> Self {
        Self {
            strength: default_half(),
            follow_duration: default_follow_duration(),
            follow_ease: default_counter_ease(),
            return_duration: default_half(),
            return_ease: default_return_ease(),
        }
    }
}

/// Frame loop settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

fn default_target_fps() -> u32 {
    60
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
        }
    }
}

impl UnveilConfig {
    /// Load from a file, or from `unveil.toml` inside a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("unveil.toml")
        } else {
            path.to_path_buf()
        };
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Io(format!("{}: {e}", config_path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Strictly check every easing name, trigger position and timing value
    ///
    /// Bindings tolerate bad values by falling back; this reports them instead.
    pub fn validate(&self) -> Vec<Error> {
        let mut problems = Vec::new();

        for ease in [
            &self.reveal.ease,
            &self.stagger.ease,
            &self.text.ease,
            &self.counter.ease,
            &self.magnetic.follow_ease,
            &self.magnetic.return_ease,
        ] {
            if let Err(err) = ease.parse::<Easing>() {
                problems.push(err);
            }
        }
        for position in [&self.reveal.start, &self.reveal.end, &self.counter.start] {
            if let Err(err) = position.parse::<TriggerPosition>() {
                problems.push(err);
            }
        }
        if let Err(err) = unveil_core::Selector::parse(&self.stagger.child_selector) {
            problems.push(err);
        }
        for (name, value) in [
            ("reveal.duration", self.reveal.duration),
            ("reveal.delay", self.reveal.delay),
            ("stagger.duration", self.stagger.duration),
            ("stagger.interval", self.stagger.interval),
            ("text.duration", self.text.duration),
            ("text.interval", self.text.interval),
            ("counter.duration", self.counter.duration),
            ("magnetic.follow_duration", self.magnetic.follow_duration),
            ("magnetic.return_duration", self.magnetic.return_duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                problems.push(Error::InvalidDuration { name, value });
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = UnveilConfig::from_toml_str("").unwrap();
        assert_eq!(config, UnveilConfig::default());
        assert_eq!(config.reveal.duration, 1.0);
        assert_eq!(config.stagger.interval, 0.15);
        assert_eq!(config.text.interval, 0.05);
        assert_eq!(config.counter.ease, "power2.out");
        assert_eq!(config.magnetic.return_ease, "elastic.out(1, 0.3)");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_section() {
        let config = UnveilConfig::from_toml_str(
            r#"
            [reveal]
            duration = 0.6
            start = "top 70%"

            [parallax]
            axis = "horizontal"
            "#,
        )
        .unwrap();
        assert_eq!(config.reveal.duration, 0.6);
        assert_eq!(config.reveal.start, "top 70%");
        assert_eq!(config.reveal.ease, "power3.out");
        assert_eq!(config.parallax.axis, Axis::Horizontal);
        assert_eq!(config.parallax.speed, 0.5);
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = UnveilConfig::default();
        config.reveal.ease = "bouncy".to_string();
        config.counter.start = "halfway".to_string();
        config.stagger.interval = -1.0;
        let problems = config.validate();
        assert_eq!(problems.len(), 3);
        assert!(problems.contains(&Error::UnknownEasing("bouncy".to_string())));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = UnveilConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(UnveilConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(
            UnveilConfig::from_toml_str("[reveal\nduration = 1"),
            Err(Error::Config(_))
        ));
    }
}
