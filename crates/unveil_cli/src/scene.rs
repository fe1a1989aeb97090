//! Scene files
//!
//! A scene is a TOML description of a viewport, an element tree and the
//! bindings made on it:
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[elements]]
//! name = "card"
//! rect = [0, 1200, 400, 300]
//!
//! [[bindings]]
//! type = "reveal"
//! id = "card-reveal"
//! element = "card"
//! animation = "fadeUp"
//! duration = 0.8
//! ```
//!
//! Options left out take the registered plugin defaults. Unlike the bind
//! operations themselves, scene loading is strict: unknown element names,
//! easing curves, animation kinds and trigger positions are errors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use unveil_animation::{AnimationKind, AnimationPreset, Easing, KeyframeProperties};
use unveil_core::{Element, ElementId, Rect, Style, Viewport};
use unveil_scroll::options::MAX_DECIMALS;
use unveil_scroll::{
    plugin, Axis, BindingHandle, CounterBinding, Granularity, ScrollContext, ScrollRuntime,
    Sequence, SequenceStep, Stagger, Timing, TriggerConfig,
};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("duplicate element name '{0}'")]
    DuplicateElement(String),
    #[error("duplicate binding id '{0}'")]
    DuplicateBinding(String),
    #[error("unknown binding id '{0}'")]
    UnknownBinding(String),
    #[error("counter on '{element}' asks for {decimals} decimals (at most {max})")]
    InvalidDecimals {
        element: String,
        decimals: usize,
        max: usize,
    },
}

/// Top-level scene file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub viewport: ViewportSpec,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportSpec {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    /// Initial scroll offset, applied before any binding is made
    #[serde(default)]
    pub scroll_y: f32,
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    800.0
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            scroll_y: 0.0,
        }
    }
}

/// An element record; parents must be declared before their children
#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub name: String,
    /// `[x, y, width, height]` in document coordinates
    pub rect: [f32; 4],
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub style: Option<StyleSpec>,
}

/// Partial style; omitted properties are untouched
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StyleSpec {
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub rotate: Option<f32>,
}

impl StyleSpec {
    pub fn keyframes(&self) -> KeyframeProperties {
        KeyframeProperties {
            opacity: self.opacity,
            translate_x: self.x,
            translate_y: self.y,
            scale: self.scale,
            rotate: self.rotate,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimingSpec {
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub delay: Option<f32>,
    #[serde(default)]
    pub ease: Option<String>,
}

impl TimingSpec {
    fn resolve(&self, base: Timing) -> Result<Timing> {
        let mut timing = base;
        if let Some(duration) = self.duration {
            timing.duration = duration;
        }
        if let Some(delay) = self.delay {
            timing.delay = delay;
        }
        if let Some(ease) = &self.ease {
            timing.easing = parse_easing(ease)?;
        }
        Ok(timing)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerSpec {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub scrub: Option<bool>,
    #[serde(default)]
    pub reversible: Option<bool>,
    #[serde(default)]
    pub markers: bool,
}

impl TriggerSpec {
    fn resolve(&self, base: TriggerConfig) -> Result<TriggerConfig> {
        let mut trigger = base;
        if let Some(start) = &self.start {
            trigger.start = start.parse()?;
        }
        if let Some(end) = &self.end {
            trigger.end = end.parse()?;
        }
        if let Some(scrub) = self.scrub {
            trigger.scrub = scrub;
        }
        if let Some(reversible) = self.reversible {
            trigger.reversible = reversible;
        }
        trigger.markers |= self.markers;
        Ok(trigger)
    }
}

/// One binding; `id` makes it addressable from scenario steps
#[derive(Debug, Clone, Deserialize)]
pub struct BindingEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub spec: BindingSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BindingSpec {
    Reveal {
        element: String,
        #[serde(default = "default_animation")]
        animation: String,
        #[serde(flatten)]
        timing: TimingSpec,
        #[serde(flatten)]
        trigger: TriggerSpec,
    },
    Stagger {
        container: String,
        #[serde(default)]
        selector: Option<String>,
        #[serde(default = "default_animation")]
        animation: String,
        #[serde(default)]
        interval: Option<f32>,
        #[serde(flatten)]
        timing: TimingSpec,
        #[serde(flatten)]
        trigger: TriggerSpec,
    },
    Parallax {
        element: String,
        #[serde(default)]
        speed: Option<f32>,
        #[serde(default)]
        axis: Option<Axis>,
    },
    TextReveal {
        element: String,
        #[serde(default)]
        granularity: Option<Granularity>,
        #[serde(default)]
        interval: Option<f32>,
        #[serde(flatten)]
        timing: TimingSpec,
        #[serde(flatten)]
        trigger: TriggerSpec,
    },
    Counter {
        element: String,
        end: f64,
        #[serde(default)]
        from: f64,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
        #[serde(default)]
        decimals: usize,
        #[serde(flatten)]
        timing: TimingSpec,
        #[serde(flatten)]
        trigger: TriggerSpec,
    },
    Magnetic {
        element: String,
        #[serde(default)]
        strength: Option<f32>,
    },
    Set {
        element: String,
        #[serde(flatten)]
        style: StyleSpec,
    },
    Visibility {
        element: String,
        #[serde(default = "default_threshold")]
        threshold: f32,
        #[serde(default)]
        once: bool,
    },
    ScrollThreshold {
        offset: f32,
    },
    Sequence {
        #[serde(flatten)]
        timing: TimingSpec,
        steps: Vec<StepSpec>,
    },
}

fn default_animation() -> String {
    AnimationKind::FadeUp.name().to_string()
}

fn default_threshold() -> f32 {
    0.1
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    pub element: String,
    pub from: StyleSpec,
    #[serde(default)]
    pub to: Option<StyleSpec>,
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub ease: Option<String>,
    /// Absolute start in seconds
    #[serde(default)]
    pub at: Option<f32>,
    /// Seconds after the previous step ends; negative overlaps
    #[serde(default)]
    pub after: Option<f32>,
}

fn parse_easing(name: &str) -> Result<Easing> {
    name.parse::<Easing>()
        .with_context(|| format!("invalid easing '{name}'"))
}

fn parse_kind(name: &str) -> Result<AnimationKind> {
    name.parse::<AnimationKind>()
        .with_context(|| format!("invalid animation '{name}'"))
}

impl Scene {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse scene")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Create a runtime holding the element tree, then make every binding
    pub fn build(&self) -> Result<LoadedScene> {
        let viewport = Viewport::new(self.viewport.width, self.viewport.height);
        let runtime = ScrollRuntime::new(viewport);
        let mut elements: HashMap<String, ElementId> = HashMap::new();

        for spec in &self.elements {
            if elements.contains_key(&spec.name) {
                return Err(SceneError::DuplicateElement(spec.name.clone()).into());
            }
            let [x, y, width, height] = spec.rect;
            let mut style = Style::RESTING;
            if let Some(overrides) = &spec.style {
                overrides.keyframes().apply_to(&mut style);
            }
            let mut element = Element::new(Rect::new(x, y, width, height))
                .with_name(spec.name.as_str())
                .with_text(spec.text.as_str())
                .with_style(style);
            for class in &spec.classes {
                element = element.with_class(class.as_str());
            }

            let id = match &spec.parent {
                Some(parent) => {
                    let parent_id = *elements
                        .get(parent)
                        .ok_or_else(|| SceneError::UnknownElement(parent.clone()))?;
                    runtime
                        .insert_child(parent_id, element)
                        .ok_or_else(|| SceneError::UnknownElement(parent.clone()))?
                }
                None => runtime.insert(element),
            };
            elements.insert(spec.name.clone(), id);
        }

        if self.viewport.scroll_y != 0.0 {
            runtime.scroll_to(self.viewport.scroll_y);
        }

        let context = runtime.context();
        let mut scene = LoadedScene {
            runtime,
            context,
            elements,
            bindings: HashMap::new(),
        };
        for (index, entry) in self.bindings.iter().enumerate() {
            scene
                .bind(entry)
                .with_context(|| format!("binding #{index}"))?;
        }
        tracing::debug!(
            elements = scene.elements.len(),
            bindings = scene.context.len(),
            "scene built"
        );
        Ok(scene)
    }
}

/// A scene instantiated on a live runtime
pub struct LoadedScene {
    pub runtime: ScrollRuntime,
    pub context: ScrollContext,
    elements: HashMap<String, ElementId>,
    bindings: HashMap<String, BindingHandle>,
}

impl LoadedScene {
    pub fn element(&self, name: &str) -> Result<ElementId> {
        self.elements
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownElement(name.to_string()).into())
    }

    pub fn binding(&self, id: &str) -> Result<BindingHandle> {
        self.bindings
            .get(id)
            .copied()
            .ok_or_else(|| SceneError::UnknownBinding(id.to_string()).into())
    }

    /// Make one binding; a skipped binding is logged and yields `None`
    pub fn bind(&mut self, entry: &BindingEntry) -> Result<Option<BindingHandle>> {
        let handle = self.bind_spec(&entry.spec)?;
        match (&entry.id, handle) {
            (Some(id), Some(handle)) => {
                if self.bindings.insert(id.clone(), handle).is_some() {
                    return Err(SceneError::DuplicateBinding(id.clone()).into());
                }
            }
            (id, None) => tracing::warn!(id = id.as_deref(), "binding skipped"),
            (None, Some(_)) => {}
        }
        Ok(handle)
    }

    fn bind_spec(&self, spec: &BindingSpec) -> Result<Option<BindingHandle>> {
        let ctx = &self.context;
        let defaults = plugin::defaults();

        let handle = match spec {
            BindingSpec::Reveal {
                element,
                animation,
                timing,
                trigger,
            } => ctx.bind_reveal(
                Some(self.element(element)?),
                AnimationPreset::reveal(parse_kind(animation)?),
                trigger.resolve(TriggerConfig::default())?,
                timing.resolve(Timing::reveal())?,
            ),
            BindingSpec::Stagger {
                container,
                selector,
                animation,
                interval,
                timing,
                trigger,
            } => {
                let mut stagger = Stagger::group();
                stagger.timing = timing.resolve(stagger.timing)?;
                if let Some(interval) = interval {
                    stagger = stagger.with_interval(*interval);
                }
                let selector = selector
                    .as_deref()
                    .unwrap_or(defaults.stagger.child_selector.as_str());
                ctx.bind_stagger(
                    Some(self.element(container)?),
                    selector,
                    AnimationPreset::stagger(parse_kind(animation)?),
                    trigger.resolve(TriggerConfig::default())?,
                    stagger,
                )
            }
            BindingSpec::Parallax {
                element,
                speed,
                axis,
            } => ctx.bind_parallax(
                Some(self.element(element)?),
                speed.unwrap_or(defaults.parallax.speed),
                axis.unwrap_or(defaults.parallax.axis),
            ),
            BindingSpec::TextReveal {
                element,
                granularity,
                interval,
                timing,
                trigger,
            } => {
                let mut stagger = Stagger::text();
                stagger.timing = timing.resolve(stagger.timing)?;
                if let Some(interval) = interval {
                    stagger = stagger.with_interval(*interval);
                }
                ctx.bind_text_reveal(
                    Some(self.element(element)?),
                    granularity.unwrap_or(defaults.text.granularity),
                    trigger.resolve(TriggerConfig::default())?,
                    stagger,
                )
            }
            BindingSpec::Counter {
                element,
                end,
                from,
                prefix,
                suffix,
                decimals,
                timing,
                trigger,
            } => {
                if *decimals > MAX_DECIMALS {
                    return Err(SceneError::InvalidDecimals {
                        element: element.clone(),
                        decimals: *decimals,
                        max: MAX_DECIMALS,
                    }
                    .into());
                }
                let mut counter = CounterBinding::new(*end)
                    .with_prefix(prefix.as_str())
                    .with_suffix(suffix.as_str())
                    .with_decimals(*decimals);
                counter.start = *from;
                counter.timing = timing.resolve(counter.timing)?;
                ctx.bind_counter(
                    Some(self.element(element)?),
                    counter,
                    trigger.resolve(TriggerConfig::counter())?,
                )
            }
            BindingSpec::Magnetic { element, strength } => ctx.bind_magnetic(
                Some(self.element(element)?),
                strength.unwrap_or(defaults.magnetic.strength),
            ),
            BindingSpec::Set { element, style } => {
                ctx.set_style(Some(self.element(element)?), style.keyframes())
            }
            BindingSpec::Visibility {
                element,
                threshold,
                once,
            } => ctx.observe_visibility(Some(self.element(element)?), *threshold, *once),
            BindingSpec::ScrollThreshold { offset } => ctx.observe_scroll(*offset),
            BindingSpec::Sequence { timing, steps } => {
                let mut sequence = Sequence::new(timing.resolve(Timing::reveal())?);
                for step in steps {
                    sequence = sequence.step(self.sequence_step(step)?);
                }
                ctx.bind_sequence(&sequence)
            }
        };
        Ok(handle)
    }

    fn sequence_step(&self, spec: &StepSpec) -> Result<SequenceStep> {
        let mut step = SequenceStep::new(Some(self.element(&spec.element)?), spec.from.keyframes());
        if let Some(to) = &spec.to {
            step = step.to(to.keyframes());
        }
        if let Some(duration) = spec.duration {
            step = step.duration(duration);
        }
        if let Some(ease) = &spec.ease {
            step = step.easing(parse_easing(ease)?);
        }
        match (spec.at, spec.after) {
            (Some(at), _) => step = step.at(at),
            (None, Some(after)) => step = step.after(after),
            (None, None) => {}
        }
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_core::BindingState;

    const LANDING: &str = r#"
        [viewport]
        width = 1280
        height = 800

        [[elements]]
        name = "hero"
        rect = [0, 0, 1280, 600]
        text = "Power your farm"

        [[elements]]
        name = "grid"
        rect = [0, 1000, 1200, 400]

        [[elements]]
        name = "card-1"
        parent = "grid"
        rect = [0, 1000, 380, 400]
        classes = ["stagger-item"]

        [[elements]]
        name = "card-2"
        parent = "grid"
        rect = [400, 1000, 380, 400]
        classes = ["stagger-item"]

        [[bindings]]
        type = "text_reveal"
        id = "headline"
        element = "hero"
        granularity = "words"

        [[bindings]]
        type = "stagger"
        id = "cards"
        container = "grid"
        duration = 0.8
        interval = 0.15
        ease = "power3.out"
        start = "top 85%"
    "#;

    #[test]
    fn test_parse_and_build() {
        let scene = Scene::from_toml_str(LANDING).unwrap();
        assert_eq!(scene.elements.len(), 4);
        assert_eq!(scene.bindings.len(), 2);
        assert!(matches!(
            scene.bindings[1].spec,
            BindingSpec::Stagger { interval: Some(_), .. }
        ));

        let loaded = scene.build().unwrap();
        assert_eq!(loaded.context.len(), 2);
        let hero = loaded.element("hero").unwrap();
        assert_eq!(loaded.runtime.children(hero).len(), 3);

        let cards = loaded.binding("cards").unwrap();
        assert_eq!(loaded.runtime.state(cards), BindingState::Armed);
        let card = loaded.element("card-1").unwrap();
        assert_eq!(loaded.runtime.style(card).unwrap().opacity, 0.0);
    }

    #[test]
    fn test_unknown_element_is_an_error() {
        let scene = Scene::from_toml_str(
            r#"
            [[bindings]]
            type = "magnetic"
            element = "missing"
            "#,
        )
        .unwrap();
        let err = scene.build().err().unwrap();
        assert!(format!("{err:#}").contains("unknown element 'missing'"));
    }

    #[test]
    fn test_invalid_easing_is_an_error() {
        let scene = Scene::from_toml_str(
            r#"
            [[elements]]
            name = "card"
            rect = [0, 100, 100, 100]

            [[bindings]]
            type = "reveal"
            element = "card"
            ease = "bouncy"
            "#,
        )
        .unwrap();
        assert!(scene.build().is_err());
    }

    #[test]
    fn test_counter_decimals_out_of_range_rejected() {
        let scene = Scene::from_toml_str(
            r#"
            [[elements]]
            name = "stat"
            rect = [0, 100, 100, 40]
            text = "5"

            [[bindings]]
            type = "counter"
            element = "stat"
            end = 5
            decimals = 70000
            "#,
        )
        .unwrap();
        let err = scene.build().err().unwrap();
        assert!(format!("{err:#}").contains("asks for 70000 decimals"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let scene = Scene::from_toml_str(
            r#"
            [[elements]]
            name = "card"
            rect = [0, 0, 10, 10]

            [[elements]]
            name = "card"
            rect = [0, 20, 10, 10]
            "#,
        )
        .unwrap();
        let err = scene.build().err().unwrap();
        assert!(err.to_string().contains("duplicate element name"));
    }

    #[test]
    fn test_sequence_and_set_specs() {
        let scene = Scene::from_toml_str(
            r#"
            [[elements]]
            name = "logo"
            rect = [0, 0, 100, 40]

            [[elements]]
            name = "title"
            rect = [0, 100, 600, 80]

            [[bindings]]
            type = "set"
            element = "logo"
            opacity = 0.5

            [[bindings]]
            type = "sequence"
            id = "intro"
            duration = 0.5
            ease = "linear"

            [[bindings.steps]]
            element = "title"
            from = { opacity = 0, y = 40 }
            "#,
        )
        .unwrap();
        let loaded = scene.build().unwrap();
        let logo = loaded.element("logo").unwrap();
        assert_eq!(loaded.runtime.style(logo).unwrap().opacity, 0.5);

        let intro = loaded.binding("intro").unwrap();
        assert_eq!(loaded.runtime.state(intro), BindingState::Playing);
        loaded.runtime.advance(500.0, 16.0);
        assert_eq!(loaded.runtime.state(intro), BindingState::AtRest);
    }
}
