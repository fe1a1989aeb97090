//! Bindings
//!
//! A binding ties one animation (or observer) to the elements it owns. It
//! holds the pre-bind values it must restore, the listeners and frame task it
//! registered, and its lifecycle state machine. The runtime owns every
//! binding; handles returned to callers are plain copyable keys.

use crate::context::ScopeId;
use crate::observe::{ScrollThreshold, VisibilityObserver};
use crate::options::CounterBinding;
use crate::trigger::TriggerConfig;
use slotmap::new_key_type;
use smallvec::SmallVec;
use unveil_animation::{Easing, KeyframeProperties, TaskId, TaskStatus, Timeline, Tween, ValueTween};
use unveil_core::lifecycle::events::{ARM, COMPLETE, ENTER, LEAVE_BACK, RELEASE};
use unveil_core::{
    binding_machine, BindingState, ElementId, ElementTree, EventId, ListenerId, PropertySet,
    StateMachine, StyleProperty, Viewport,
};

new_key_type! {
    pub struct BindingId;
}

/// Handle to a live binding, returned by every bind operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingHandle(pub(crate) BindingId);

impl BindingHandle {
    pub fn id(&self) -> BindingId {
        self.0
    }
}

/// Lifecycle state machine of one binding
pub(crate) struct Lifecycle {
    machine: StateMachine,
    label: &'static str,
}

impl Lifecycle {
    pub fn new(label: &'static str) -> Self {
        Self {
            machine: binding_machine(label),
            label,
        }
    }

    pub fn send(&mut self, event: EventId) {
        let before = self.machine.current_state();
        let after = self.machine.send(event);
        if before != after {
            tracing::trace!(
                binding = self.label,
                from = BindingState::from_id(before).name(),
                to = BindingState::from_id(after).name(),
                "lifecycle transition"
            );
        }
    }

    pub fn state(&self) -> BindingState {
        BindingState::from_id(self.machine.current_state())
    }
}

/// Something a binding puts back on release
pub(crate) enum Restore {
    /// Pre-bind values of the claimed style properties
    Style(ElementId, KeyframeProperties),
    /// Pre-bind text content
    Text(ElementId, String),
    /// An element the binding created
    Created(ElementId),
}

/// A scroll-driven timeline: reveals, staggers, text reveals and parallax
pub(crate) struct ScrollAnimation {
    pub trigger_element: ElementId,
    pub trigger: TriggerConfig,
    pub timeline: Timeline<ElementId>,
    /// Whether the scroll position was past `start` at the last evaluation
    pub entered: bool,
}

impl ScrollAnimation {
    pub fn new(trigger_element: ElementId, trigger: TriggerConfig, timeline: Timeline<ElementId>) -> Self {
        Self {
            trigger_element,
            trigger,
            timeline,
            entered: false,
        }
    }

    /// React to a scroll or resize; returns whether a frame task is needed
    fn on_viewport(
        &mut self,
        lifecycle: &mut Lifecycle,
        elements: &mut ElementTree,
        viewport: &Viewport,
    ) -> bool {
        let Some(rect) = elements.get(self.trigger_element).map(|e| e.rect) else {
            return false;
        };
        let range = self.trigger.resolve(&rect, viewport);
        let scroll = viewport.scroll_y;

        if self.trigger.scrub {
            let before = self.timeline.progress();
            let progress = range.progress(scroll);
            self.timeline.seek_progress(progress);
            write_timeline(&self.timeline, elements);
            if progress > before {
                lifecycle.send(ENTER);
                if progress >= 1.0 {
                    lifecycle.send(COMPLETE);
                }
            } else if progress < before {
                lifecycle.send(LEAVE_BACK);
                if progress <= 0.0 {
                    lifecycle.send(COMPLETE);
                }
            }
            return false;
        }

        let entered = range.is_entered(scroll);
        if entered == self.entered {
            return false;
        }
        self.entered = entered;

        if entered {
            self.timeline.play();
            lifecycle.send(ENTER);
            true
        } else if self.trigger.reversible {
            self.timeline.reverse();
            lifecycle.send(LEAVE_BACK);
            true
        } else {
            false
        }
    }

    fn log_markers(&self, label: &'static str, elements: &ElementTree, viewport: &Viewport) {
        if !self.trigger.markers {
            return;
        }
        if let Some(element) = elements.get(self.trigger_element) {
            let range = self.trigger.resolve(&element.rect, viewport);
            tracing::info!(
                binding = label,
                start = %self.trigger.start,
                end = %self.trigger.end,
                start_scroll = range.start,
                end_scroll = range.end,
                "trigger markers"
            );
        }
    }
}

/// A play-once numeric counter written into text
pub(crate) struct CounterAnimation {
    pub element: ElementId,
    pub trigger: TriggerConfig,
    pub format: CounterBinding,
    pub tween: ValueTween,
    pub delay_ms: f32,
    pub elapsed_ms: f32,
    pub fired: bool,
}

impl CounterAnimation {
    fn on_viewport(
        &mut self,
        lifecycle: &mut Lifecycle,
        elements: &mut ElementTree,
        viewport: &Viewport,
    ) -> bool {
        if self.fired {
            return false;
        }
        let Some(rect) = elements.get(self.element).map(|e| e.rect) else {
            return false;
        };
        if !self.trigger.resolve(&rect, viewport).is_entered(viewport.scroll_y) {
            return false;
        }
        self.fired = true;
        lifecycle.send(ENTER);
        true
    }

    fn step(&mut self, lifecycle: &mut Lifecycle, elements: &mut ElementTree, dt_ms: f32) -> TaskStatus {
        self.elapsed_ms += dt_ms;
        let local = self.elapsed_ms - self.delay_ms;
        let finished = local >= self.tween.duration_ms;
        let value = if finished {
            self.tween.to
        } else {
            self.tween.value_at(local)
        };
        elements.set_text(self.element, self.format.format(value));

        if finished {
            lifecycle.send(COMPLETE);
            TaskStatus::Done
        } else {
            TaskStatus::Continue
        }
    }
}

/// Pointer-follow offset with an elastic return
pub(crate) struct MagneticAnimation {
    pub element: ElementId,
    pub strength: f32,
    pub follow: (f32, Easing),
    pub settle: (f32, Easing),
    pub timeline: Timeline<ElementId>,
    pub hovered: bool,
}

impl MagneticAnimation {
    /// Replace the running tween with one from the current offset to `target`
    fn retarget(&mut self, elements: &ElementTree, target: (f32, f32), (duration_ms, easing): (f32, Easing)) {
        let Some(style) = elements.style(self.element) else {
            return;
        };
        let from = KeyframeProperties::translate(style.translate_x, style.translate_y);
        let to = KeyframeProperties::translate(target.0, target.1);
        let mut timeline = Timeline::new();
        timeline.add(0.0, self.element, Tween::new(from, to, duration_ms, easing));
        timeline.play();
        self.timeline = timeline;
    }

    fn on_pointer_move(
        &mut self,
        lifecycle: &mut Lifecycle,
        elements: &ElementTree,
        viewport: &Viewport,
        x: f32,
        y: f32,
    ) -> bool {
        let Some(element) = elements.get(self.element) else {
            return false;
        };
        // Hit-test and center use the displaced box, like a bounding client rect
        let bounds = viewport
            .client_rect(&element.rect)
            .translate(element.style.translate_x, element.style.translate_y);

        if bounds.contains(x, y) {
            let (cx, cy) = bounds.center();
            self.hovered = true;
            lifecycle.send(ENTER);
            let target = ((x - cx) * self.strength, (y - cy) * self.strength);
            let follow = self.follow;
            self.retarget(elements, target, follow);
            true
        } else {
            self.on_pointer_leave(lifecycle, elements)
        }
    }

    fn on_pointer_leave(&mut self, lifecycle: &mut Lifecycle, elements: &ElementTree) -> bool {
        if !self.hovered {
            return false;
        }
        self.hovered = false;
        lifecycle.send(LEAVE_BACK);
        let settle = self.settle;
        self.retarget(elements, (0.0, 0.0), settle);
        true
    }
}

/// Per-kind state of a binding
pub(crate) enum BindingKind {
    Scroll(ScrollAnimation),
    Counter(CounterAnimation),
    Magnetic(MagneticAnimation),
    /// Plays once on bind
    Sequence(Timeline<ElementId>),
    /// Immediate style write, undone on release
    Set,
    Visibility(VisibilityObserver),
    Threshold(ScrollThreshold),
}

pub(crate) struct Binding {
    pub label: &'static str,
    pub scope: ScopeId,
    pub lifecycle: Lifecycle,
    pub kind: BindingKind,
    /// Properties owned on each element
    pub claims: SmallVec<[(ElementId, PropertySet); 1]>,
    pub restore: Vec<Restore>,
    pub listeners: SmallVec<[ListenerId; 2]>,
    pub task: Option<TaskId>,
}

impl Binding {
    pub fn new(label: &'static str, scope: ScopeId, kind: BindingKind) -> Self {
        Self {
            label,
            scope,
            lifecycle: Lifecycle::new(label),
            kind,
            claims: SmallVec::new(),
            restore: Vec::new(),
            listeners: SmallVec::new(),
            task: None,
        }
    }

    /// Claim properties on an element, capturing their current values
    pub fn claim_style(&mut self, elements: &ElementTree, element: ElementId, props: KeyframeProperties) {
        if let Some(style) = elements.style(element) {
            self.restore.push(Restore::Style(element, props.capture(&style)));
            self.claims.push((element, props.properties()));
        }
    }

    /// Claim an element's text; `original` is restored on release
    pub fn claim_text(&mut self, element: ElementId, original: String) {
        self.restore.push(Restore::Text(element, original));
        self.claims
            .push((element, PropertySet::EMPTY.with(StyleProperty::Text)));
    }

    pub fn state(&self) -> BindingState {
        self.lifecycle.state()
    }

    /// Arm and evaluate the starting condition; returns whether a frame task is needed
    pub fn start(&mut self, elements: &mut ElementTree, viewport: &Viewport) -> bool {
        self.lifecycle.send(ARM);
        match &mut self.kind {
            BindingKind::Scroll(animation) => {
                animation.log_markers(self.label, elements, viewport);
                write_timeline(&animation.timeline, elements);
            }
            BindingKind::Sequence(timeline) => {
                write_timeline(timeline, elements);
                timeline.play();
                self.lifecycle.send(ENTER);
                return true;
            }
            BindingKind::Set => {
                self.lifecycle.send(COMPLETE);
                return false;
            }
            _ => {}
        }
        self.on_viewport(elements, viewport)
    }

    /// React to a scroll or resize; returns whether a frame task is needed
    pub fn on_viewport(&mut self, elements: &mut ElementTree, viewport: &Viewport) -> bool {
        let lifecycle = &mut self.lifecycle;
        match &mut self.kind {
            BindingKind::Scroll(animation) => animation.on_viewport(lifecycle, elements, viewport),
            BindingKind::Counter(counter) => counter.on_viewport(lifecycle, elements, viewport),
            BindingKind::Visibility(observer) => {
                observe_change(lifecycle, observer.update(elements, viewport));
                false
            }
            BindingKind::Threshold(threshold) => {
                observe_change(lifecycle, threshold.update(viewport));
                false
            }
            BindingKind::Magnetic(_) | BindingKind::Sequence(_) | BindingKind::Set => false,
        }
    }

    pub fn on_pointer_move(&mut self, elements: &ElementTree, viewport: &Viewport, x: f32, y: f32) -> bool {
        match &mut self.kind {
            BindingKind::Magnetic(magnetic) => {
                magnetic.on_pointer_move(&mut self.lifecycle, elements, viewport, x, y)
            }
            _ => false,
        }
    }

    pub fn on_pointer_leave(&mut self, elements: &ElementTree) -> bool {
        match &mut self.kind {
            BindingKind::Magnetic(magnetic) => magnetic.on_pointer_leave(&mut self.lifecycle, elements),
            _ => false,
        }
    }

    /// Advance one frame
    pub fn step(&mut self, elements: &mut ElementTree, dt_ms: f32) -> TaskStatus {
        let lifecycle = &mut self.lifecycle;
        let timeline = match &mut self.kind {
            BindingKind::Scroll(animation) => &mut animation.timeline,
            BindingKind::Magnetic(magnetic) => &mut magnetic.timeline,
            BindingKind::Sequence(timeline) => timeline,
            BindingKind::Counter(counter) => return counter.step(lifecycle, elements, dt_ms),
            BindingKind::Set | BindingKind::Visibility(_) | BindingKind::Threshold(_) => {
                return TaskStatus::Done
            }
        };
        let playing = timeline.tick(dt_ms);
        write_timeline(timeline, elements);
        if playing {
            TaskStatus::Continue
        } else {
            lifecycle.send(COMPLETE);
            TaskStatus::Done
        }
    }

    /// Observer value, if this binding is an observer
    pub fn observed(&self) -> Option<bool> {
        match &self.kind {
            BindingKind::Visibility(observer) => Some(observer.visible),
            BindingKind::Threshold(threshold) => Some(threshold.passed),
            _ => None,
        }
    }

    /// Put back everything captured at bind time and end the lifecycle
    pub fn release(&mut self, elements: &mut ElementTree) {
        for restore in self.restore.drain(..).rev() {
            match restore {
                Restore::Style(element, props) => {
                    if let Some(element) = elements.get_mut(element) {
                        props.apply_to(&mut element.style);
                    }
                }
                Restore::Text(element, text) => elements.set_text(element, text),
                Restore::Created(element) => {
                    elements.remove(element);
                }
            }
        }
        self.lifecycle.send(RELEASE);
    }
}

fn observe_change(lifecycle: &mut Lifecycle, change: Option<bool>) {
    match change {
        Some(true) => {
            lifecycle.send(ENTER);
            lifecycle.send(COMPLETE);
        }
        Some(false) => {
            lifecycle.send(LEAVE_BACK);
            lifecycle.send(COMPLETE);
        }
        None => {}
    }
}

/// Write every timeline entry's current value into its element
pub(crate) fn write_timeline(timeline: &Timeline<ElementId>, elements: &mut ElementTree) {
    for (target, props) in timeline.values() {
        if let Some(element) = elements.get_mut(target) {
            props.apply_to(&mut element.style);
        }
    }
}
