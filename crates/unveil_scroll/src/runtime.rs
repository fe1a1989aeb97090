//! Scroll runtime
//!
//! Owns the element tree, the viewport, every binding, the listener registry
//! and the frame scheduler. The host feeds it input (`scroll_to`, `resize`,
//! `pointer_move`, `pointer_leave`) and calls [`ScrollRuntime::tick`] once per
//! display refresh. Bindings are created through a [`ScrollContext`].

use crate::binding::{BindingHandle, BindingId};
use crate::context::{ScopeId, ScrollContext};
use crate::plugin;
use crate::stage::Stage;
use slotmap::SlotMap;
use std::cell::RefCell;
use std::rc::Rc;
use unveil_animation::FrameScheduler;
use unveil_core::events::event_types::{POINTER_LEAVE, POINTER_MOVE, RESIZE, SCROLL};
use unveil_core::{
    BindingState, Element, ElementId, ElementTree, Event, EventData, EventDispatcher, Style,
    Viewport,
};

pub(crate) struct Inner {
    pub stage: Stage,
    pub scheduler: FrameScheduler<Stage>,
    pub dispatcher: EventDispatcher<BindingId>,
    pub scopes: SlotMap<ScopeId, Vec<BindingId>>,
}

impl Inner {
    fn new(viewport: Viewport) -> Self {
        let mut scheduler = FrameScheduler::new();
        scheduler.set_target_fps(plugin::defaults().runtime.target_fps);
        Self {
            stage: Stage::new(viewport),
            scheduler,
            dispatcher: EventDispatcher::new(),
            scopes: SlotMap::with_key(),
        }
    }

    pub fn dispatch(&mut self, event: &Event) {
        match event.data {
            EventData::Scroll { x, y } => {
                self.stage.viewport.scroll_x = x;
                self.stage.viewport.scroll_y = y;
            }
            EventData::Resize { width, height } => {
                self.stage.viewport.width = width.max(0.0);
                self.stage.viewport.height = height.max(0.0);
            }
            EventData::Pointer { .. } | EventData::None => {}
        }

        for id in self.dispatcher.dispatch(event) {
            let wants_frames = match (event.event_type, &event.data) {
                (SCROLL | RESIZE, _) => self.stage.on_viewport(id),
                (POINTER_MOVE, EventData::Pointer { x, y }) => {
                    self.stage.on_pointer_move(id, *x, *y)
                }
                (POINTER_LEAVE, _) => self.stage.on_pointer_leave(id),
                _ => false,
            };
            if wants_frames {
                self.ensure_task(id);
            }
        }
    }

    /// Make sure a binding has a frame task queued
    pub fn ensure_task(&mut self, id: BindingId) {
        let Some(binding) = self.stage.bindings.get_mut(id) else {
            return;
        };
        if let Some(task) = binding.task {
            if self.scheduler.is_scheduled(task) {
                return;
            }
        }
        binding.task = Some(
            self.scheduler
                .schedule(move |stage: &mut Stage, dt_ms| stage.step(id, dt_ms)),
        );
    }

    /// Release one binding; returns whether it was live
    pub fn release(&mut self, id: BindingId) -> bool {
        let Some(mut binding) = self.stage.bindings.remove(id) else {
            return false;
        };
        if let Some(task) = binding.task.take() {
            self.scheduler.cancel(task);
        }
        for listener in binding.listeners.drain(..) {
            self.dispatcher.unregister(listener);
        }
        self.stage.unclaim(id);
        binding.release(&mut self.stage.elements);
        if let Some(scope) = self.scopes.get_mut(binding.scope) {
            scope.retain(|b| *b != id);
        }
        tracing::debug!(binding = binding.label, "binding released");
        true
    }

    /// Release every binding of a scope, newest first
    pub fn release_scope(&mut self, scope: ScopeId) -> usize {
        let ids = match self.scopes.get_mut(scope) {
            Some(ids) => std::mem::take(ids),
            None => return 0,
        };
        ids.into_iter()
            .rev()
            .filter(|id| self.release(*id))
            .count()
    }
}

/// Headless scroll animation runtime
///
/// Cloning yields another handle to the same runtime.
#[derive(Clone)]
pub struct ScrollRuntime {
    inner: Rc<RefCell<Inner>>,
}

impl ScrollRuntime {
    /// Create a runtime for a viewport, registering the plugin if needed
    pub fn new(viewport: Viewport) -> Self {
        plugin::register();
        Self {
            inner: Rc::new(RefCell::new(Inner::new(viewport))),
        }
    }

    /// Open a scope; every binding made through it is released together
    pub fn context(&self) -> ScrollContext {
        ScrollContext::new(&self.inner)
    }

    pub fn insert(&self, element: Element) -> ElementId {
        self.inner.borrow_mut().stage.elements.insert(element)
    }

    pub fn insert_child(&self, parent: ElementId, element: Element) -> Option<ElementId> {
        self.inner
            .borrow_mut()
            .stage
            .elements
            .insert_child(parent, element)
    }

    /// Run a closure against the element tree
    pub fn with_elements<R>(&self, f: impl FnOnce(&mut ElementTree) -> R) -> R {
        f(&mut self.inner.borrow_mut().stage.elements)
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.inner.borrow().stage.elements.find_by_name(name)
    }

    pub fn style(&self, id: ElementId) -> Option<Style> {
        self.inner.borrow().stage.elements.style(id)
    }

    pub fn text(&self, id: ElementId) -> Option<String> {
        self.inner
            .borrow()
            .stage
            .elements
            .text(id)
            .map(str::to_string)
    }

    /// Text of an element including generated unit children
    pub fn text_content(&self, id: ElementId) -> Option<String> {
        self.inner.borrow().stage.elements.text_content(id)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.inner.borrow().stage.elements.children(id).to_vec()
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.borrow().stage.viewport
    }

    /// Feed an input event
    pub fn dispatch(&self, event: Event) {
        self.inner.borrow_mut().dispatch(&event);
    }

    /// Scroll vertically to an absolute offset
    pub fn scroll_to(&self, y: f32) {
        let x = self.viewport().scroll_x;
        self.dispatch(Event::scroll(x, y));
    }

    pub fn scroll_by(&self, dy: f32) {
        let viewport = self.viewport();
        self.dispatch(Event::scroll(viewport.scroll_x, viewport.scroll_y + dy));
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.dispatch(Event::resize(width, height));
    }

    /// Pointer position in client coordinates
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.dispatch(Event::pointer_move(x, y));
    }

    pub fn pointer_leave(&self) {
        self.dispatch(Event::pointer_leave());
    }

    /// Advance every running animation by `dt_ms`; returns the tasks that ran
    pub fn tick(&self, dt_ms: f32) -> usize {
        let mut inner = self.inner.borrow_mut();
        let Inner {
            stage, scheduler, ..
        } = &mut *inner;
        scheduler.tick(stage, dt_ms)
    }

    /// Advance by wall-clock time since the previous call
    pub fn tick_elapsed(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let Inner {
            stage, scheduler, ..
        } = &mut *inner;
        scheduler.tick_elapsed(stage)
    }

    /// Tick in fixed frames until `total_ms` has elapsed
    pub fn advance(&self, total_ms: f32, frame_ms: f32) {
        if frame_ms.is_nan() || frame_ms <= 0.0 || !total_ms.is_finite() {
            return;
        }
        let mut remaining = total_ms;
        while remaining > 0.0 {
            let dt = frame_ms.min(remaining);
            self.tick(dt);
            remaining -= dt;
        }
    }

    /// Nominal frame interval from the registered defaults
    pub fn frame_interval_ms(&self) -> f32 {
        self.inner.borrow().scheduler.frame_interval_ms()
    }

    /// Lifecycle state; released (or unknown) handles report `Released`
    pub fn state(&self, handle: BindingHandle) -> BindingState {
        self.inner
            .borrow()
            .stage
            .bindings
            .get(handle.0)
            .map_or(BindingState::Released, |b| b.state())
    }

    /// Current value of a visibility or scroll-threshold observer
    pub fn is_active(&self, handle: BindingHandle) -> Option<bool> {
        self.inner.borrow().stage.bindings.get(handle.0)?.observed()
    }

    pub fn is_bound(&self, handle: BindingHandle) -> bool {
        self.inner.borrow().stage.bindings.contains_key(handle.0)
    }

    pub fn binding_count(&self) -> usize {
        self.inner.borrow().stage.bindings.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().dispatcher.len()
    }

    pub fn active_tasks(&self) -> usize {
        self.inner.borrow().scheduler.len()
    }
}

impl Default for ScrollRuntime {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_core::Rect;

    #[test]
    fn test_scroll_and_resize_update_viewport() {
        let runtime = ScrollRuntime::new(Viewport::new(1000.0, 800.0));
        runtime.scroll_to(240.0);
        runtime.scroll_by(10.0);
        runtime.resize(500.0, 400.0);
        let viewport = runtime.viewport();
        assert_eq!(viewport.scroll_y, 250.0);
        assert_eq!((viewport.width, viewport.height), (500.0, 400.0));
    }

    #[test]
    fn test_clones_share_state() {
        let runtime = ScrollRuntime::default();
        let other = runtime.clone();
        let id = runtime.insert(Element::new(Rect::new(0.0, 0.0, 10.0, 10.0)).with_name("logo"));
        assert_eq!(other.find("logo"), Some(id));
    }

    #[test]
    fn test_advance_splits_frames() {
        let runtime = ScrollRuntime::default();
        runtime.advance(100.0, 16.0);
        runtime.advance(f32::NAN, 16.0);
        runtime.advance(100.0, 0.0);
        assert_eq!(runtime.active_tasks(), 0);
    }
}
