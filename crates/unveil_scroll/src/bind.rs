//! Bind operations
//!
//! Every operation follows the same order: resolve the element, release any
//! binding that owns the properties about to be claimed, capture pre-bind
//! values, write the starting state, then attach (claims, listeners, lifecycle
//! start). A missing element skips the binding.

use crate::binding::{
    Binding, BindingHandle, BindingKind, CounterAnimation, MagneticAnimation, Restore,
    ScrollAnimation,
};
use crate::config::Axis;
use crate::context::ScopeId;
use crate::observe::{ScrollThreshold, VisibilityObserver};
use crate::options::{easing_or, finite_or, seconds_to_ms, CounterBinding, Stagger, Timing};
use crate::plugin;
use crate::runtime::Inner;
use crate::sequence::Sequence;
use crate::text::{split_units, Granularity};
use crate::trigger::{Edge, TriggerConfig, TriggerPosition};
use smallvec::SmallVec;
use unveil_animation::{AnimationPreset, AnimationSpec, Easing, KeyframeProperties, Timeline, Tween, ValueTween};
use unveil_core::events::event_types::{POINTER_LEAVE, POINTER_MOVE, RESIZE, SCROLL};
use unveil_core::{
    Element, ElementId, EventType, ListenerId, PropertySet, Selector, StyleProperty,
};

const VIEWPORT_EVENTS: [EventType; 2] = [SCROLL, RESIZE];
const POINTER_EVENTS: [EventType; 2] = [POINTER_MOVE, POINTER_LEAVE];

/// Nominal length of a scrubbed parallax timeline; only its progress matters
const PARALLAX_SPAN_MS: f32 = 1000.0;

fn text_property() -> PropertySet {
    PropertySet::EMPTY.with(StyleProperty::Text)
}

impl Inner {
    fn resolve(&self, element: Option<ElementId>, operation: &'static str) -> Option<ElementId> {
        match element {
            Some(id) if self.stage.elements.contains(id) => Some(id),
            _ => {
                tracing::debug!(operation, "element missing, binding skipped");
                None
            }
        }
    }

    /// Release every binding owning any of the given properties
    fn release_owners(&mut self, claims: &[(ElementId, PropertySet)]) {
        for (element, props) in claims {
            for owner in self.stage.owners(*element, *props) {
                tracing::debug!("property already bound, releasing previous binding");
                self.release(owner);
            }
        }
    }

    fn attach(&mut self, binding: Binding, events: &[EventType]) -> BindingHandle {
        let label = binding.label;
        let scope = binding.scope;
        let claims = binding.claims.clone();
        let id = self.stage.bindings.insert(binding);

        for (element, props) in claims {
            self.stage.claim(element, props, id);
        }
        let listeners: SmallVec<[ListenerId; 2]> = events
            .iter()
            .map(|event_type| self.dispatcher.register(*event_type, id))
            .collect();
        if let Some(binding) = self.stage.bindings.get_mut(id) {
            binding.listeners = listeners;
        }
        if let Some(scope) = self.scopes.get_mut(scope) {
            scope.push(id);
        }

        if self.stage.start(id) {
            self.ensure_task(id);
        }
        tracing::debug!(binding = label, listeners = events.len(), "binding attached");
        BindingHandle(id)
    }

    pub fn bind_reveal(
        &mut self,
        scope: ScopeId,
        element: Option<ElementId>,
        spec: AnimationSpec,
        trigger: TriggerConfig,
        timing: Timing,
    ) -> Option<BindingHandle> {
        let element = self.resolve(element, "reveal")?;
        let from = spec.from_state();
        self.release_owners(&[(element, from.properties())]);

        let mut timeline = Timeline::new();
        timeline.add(
            timing.delay_ms(),
            element,
            Tween::new(from, spec.to_state(), timing.duration_ms(), timing.easing),
        );
        let animation = ScrollAnimation::new(element, trigger, timeline);
        let mut binding = Binding::new("reveal", scope, BindingKind::Scroll(animation));
        binding.claim_style(&self.stage.elements, element, from);

        Some(self.attach(binding, &VIEWPORT_EVENTS))
    }

    pub fn bind_stagger(
        &mut self,
        scope: ScopeId,
        container: Option<ElementId>,
        selector: &str,
        spec: AnimationSpec,
        trigger: TriggerConfig,
        stagger: Stagger,
    ) -> Option<BindingHandle> {
        let container = self.resolve(container, "stagger")?;
        let selector = Selector::parse(selector)
            .or_else(|err| {
                tracing::warn!(%err, "using default child selector");
                Selector::parse(&plugin::defaults().stagger.child_selector)
            })
            .ok()?;

        let from = spec.from_state();
        let children = self.stage.elements.query_all(container, &selector);
        let claims: Vec<_> = children.iter().map(|c| (*c, from.properties())).collect();
        self.release_owners(&claims);
        // Releasing a text reveal may have removed matched units
        let children: Vec<ElementId> = children
            .into_iter()
            .filter(|c| self.stage.elements.contains(*c))
            .collect();
        if children.is_empty() {
            tracing::debug!("no children matched the stagger selector, binding skipped");
            return None;
        }

        let timing = stagger.timing;
        let (delay_ms, interval_ms, duration_ms) =
            (timing.delay_ms(), stagger.interval_ms(), timing.duration_ms());
        let mut timeline = Timeline::new();
        for (i, child) in children.iter().enumerate() {
            timeline.add(
                delay_ms + i as f32 * interval_ms,
                *child,
                Tween::new(from, spec.to_state(), duration_ms, timing.easing),
            );
        }

        let animation = ScrollAnimation::new(container, trigger, timeline);
        let mut binding = Binding::new("stagger", scope, BindingKind::Scroll(animation));
        for child in &children {
            binding.claim_style(&self.stage.elements, *child, from);
        }

        Some(self.attach(binding, &VIEWPORT_EVENTS))
    }

    pub fn bind_parallax(
        &mut self,
        scope: ScopeId,
        element: Option<ElementId>,
        speed: f32,
        axis: Axis,
    ) -> Option<BindingHandle> {
        let element = self.resolve(element, "parallax")?;
        let speed = finite_or("speed", speed, plugin::defaults().parallax.speed);
        let distance = speed * 100.0;

        let property = match axis {
            Axis::Vertical => StyleProperty::TranslateY,
            Axis::Horizontal => StyleProperty::TranslateX,
        };
        self.release_owners(&[(element, PropertySet::EMPTY.with(property))]);

        let style = self.stage.elements.style(element)?;
        let (from, to) = match axis {
            Axis::Vertical => (
                KeyframeProperties::default().with_y(style.translate_y),
                KeyframeProperties::default().with_y(distance),
            ),
            Axis::Horizontal => (
                KeyframeProperties::default().with_x(style.translate_x),
                KeyframeProperties::default().with_x(distance),
            ),
        };

        let trigger = TriggerConfig {
            start: TriggerPosition::new(Edge::Top, Edge::Bottom),
            end: TriggerPosition::new(Edge::Bottom, Edge::Top),
            scrub: true,
            reversible: true,
            markers: false,
        };
        let mut timeline = Timeline::new();
        timeline.add(
            0.0,
            element,
            Tween::new(from, to, PARALLAX_SPAN_MS, Easing::Linear),
        );
        let animation = ScrollAnimation::new(element, trigger, timeline);
        let mut binding = Binding::new("parallax", scope, BindingKind::Scroll(animation));
        binding.claim_style(&self.stage.elements, element, from);

        Some(self.attach(binding, &VIEWPORT_EVENTS))
    }

    pub fn bind_text_reveal(
        &mut self,
        scope: ScopeId,
        element: Option<ElementId>,
        granularity: Granularity,
        trigger: TriggerConfig,
        stagger: Stagger,
    ) -> Option<BindingHandle> {
        let element = self.resolve(element, "text_reveal")?;
        // A previous split of this element is undone first, so the raw text is
        // always the source
        self.release_owners(&[(element, text_property())]);

        let elements = &mut self.stage.elements;
        let (raw, rect) = {
            let source = elements.get(element)?;
            (source.text.clone(), source.rect)
        };
        let spec = AnimationPreset::text_unit();
        let timing = stagger.timing;
        let (delay_ms, interval_ms, duration_ms) =
            (timing.delay_ms(), stagger.interval_ms(), timing.duration_ms());

        elements.set_text(element, "");
        let mut units = Vec::new();
        let mut timeline = Timeline::new();
        for (i, unit) in split_units(&raw, granularity).into_iter().enumerate() {
            let child = Element::new(rect)
                .with_class(granularity.unit_class())
                .with_text(unit);
            let Some(child) = elements.insert_child(element, child) else {
                continue;
            };
            units.push(child);
            timeline.add(
                delay_ms + i as f32 * interval_ms,
                child,
                Tween::new(spec.from_state(), spec.to_state(), duration_ms, timing.easing),
            );
        }

        let animation = ScrollAnimation::new(element, trigger, timeline);
        let mut binding = Binding::new("text_reveal", scope, BindingKind::Scroll(animation));
        binding.claim_text(element, raw);
        binding
            .restore
            .extend(units.into_iter().map(Restore::Created));

        Some(self.attach(binding, &VIEWPORT_EVENTS))
    }

    pub fn bind_counter(
        &mut self,
        scope: ScopeId,
        element: Option<ElementId>,
        counter: CounterBinding,
        trigger: TriggerConfig,
    ) -> Option<BindingHandle> {
        let element = self.resolve(element, "counter")?;
        self.release_owners(&[(element, text_property())]);

        let original = self.stage.elements.text(element)?.to_string();
        let (start, end) = counter.sanitized_range();
        let tween = ValueTween::new(
            start,
            end,
            counter.timing.duration_ms(),
            counter.timing.easing,
        );
        let delay_ms = counter.timing.delay_ms();
        self.stage.elements.set_text(element, counter.format(start));

        let animation = CounterAnimation {
            element,
            // Counters play once
            trigger: TriggerConfig {
                scrub: false,
                reversible: false,
                ..trigger
            },
            format: counter,
            tween,
            delay_ms,
            elapsed_ms: 0.0,
            fired: false,
        };
        let mut binding = Binding::new("counter", scope, BindingKind::Counter(animation));
        binding.claim_text(element, original);

        Some(self.attach(binding, &VIEWPORT_EVENTS))
    }

    pub fn bind_magnetic(
        &mut self,
        scope: ScopeId,
        element: Option<ElementId>,
        strength: f32,
    ) -> Option<BindingHandle> {
        let element = self.resolve(element, "magnetic")?;
        let offset = KeyframeProperties::translate(0.0, 0.0);
        self.release_owners(&[(element, offset.properties())]);

        let defaults = &plugin::defaults().magnetic;
        let animation = MagneticAnimation {
            element,
            strength: finite_or("strength", strength, defaults.strength),
            follow: (
                seconds_to_ms("follow_duration", defaults.follow_duration),
                easing_or(&defaults.follow_ease, Easing::POWER2_OUT),
            ),
            settle: (
                seconds_to_ms("return_duration", defaults.return_duration),
                easing_or(&defaults.return_ease, Easing::ELASTIC_OUT),
            ),
            timeline: Timeline::new(),
            hovered: false,
        };
        let mut binding = Binding::new("magnetic", scope, BindingKind::Magnetic(animation));
        binding.claim_style(&self.stage.elements, element, offset);

        Some(self.attach(binding, &POINTER_EVENTS))
    }

    pub fn bind_sequence(&mut self, scope: ScopeId, sequence: &Sequence) -> Option<BindingHandle> {
        let placed = sequence.layout(&self.stage.elements);
        // Union of the properties each step touches
        let touched = |from: &KeyframeProperties, to: &KeyframeProperties| from.lerp(to, 0.0);
        let claims: Vec<_> = placed
            .iter()
            .map(|p| (p.element, touched(&p.tween.from, &p.tween.to).properties()))
            .collect();
        self.release_owners(&claims);

        let placed: Vec<_> = placed
            .into_iter()
            .filter(|p| self.stage.elements.contains(p.element))
            .collect();
        if placed.is_empty() {
            tracing::debug!("sequence has no live elements, binding skipped");
            return None;
        }

        let mut timeline = Timeline::new();
        for step in &placed {
            timeline.add(step.offset_ms, step.element, step.tween);
        }
        let mut binding = Binding::new("sequence", scope, BindingKind::Sequence(timeline));
        for step in &placed {
            binding.claim_style(
                &self.stage.elements,
                step.element,
                touched(&step.tween.from, &step.tween.to),
            );
        }

        Some(self.attach(binding, &[]))
    }

    pub fn set_style(
        &mut self,
        scope: ScopeId,
        element: Option<ElementId>,
        props: KeyframeProperties,
    ) -> Option<BindingHandle> {
        let element = self.resolve(element, "set")?;
        self.release_owners(&[(element, props.properties())]);

        let mut binding = Binding::new("set", scope, BindingKind::Set);
        binding.claim_style(&self.stage.elements, element, props);
        if let Some(target) = self.stage.elements.get_mut(element) {
            props.apply_to(&mut target.style);
        }

        Some(self.attach(binding, &[]))
    }

    pub fn observe_visibility(
        &mut self,
        scope: ScopeId,
        element: Option<ElementId>,
        threshold: f32,
        once: bool,
    ) -> Option<BindingHandle> {
        let element = self.resolve(element, "visibility")?;
        let observer = VisibilityObserver::new(element, threshold, once);
        let binding = Binding::new("visibility", scope, BindingKind::Visibility(observer));
        Some(self.attach(binding, &VIEWPORT_EVENTS))
    }

    pub fn observe_scroll(&mut self, scope: ScopeId, offset: f32) -> BindingHandle {
        let offset = finite_or("offset", offset, 0.0);
        let binding = Binding::new(
            "scroll_threshold",
            scope,
            BindingKind::Threshold(ScrollThreshold::new(offset)),
        );
        self.attach(binding, &[SCROLL])
    }
}
