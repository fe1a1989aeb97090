//! Scoped teardown
//!
//! A [`ScrollContext`] groups the bindings made through it. Reverting it
//! cancels their frame tasks, unregisters their listeners and restores every
//! pre-bind style and text in one call. Dropping it reverts as well, so a
//! scope tied to a mounted view cleans up on every exit path.

use crate::binding::BindingHandle;
use crate::config::Axis;
use crate::options::{CounterBinding, Stagger, Timing};
use crate::runtime::Inner;
use crate::sequence::Sequence;
use crate::text::Granularity;
use crate::trigger::TriggerConfig;
use slotmap::new_key_type;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use unveil_animation::{AnimationSpec, KeyframeProperties};
use unveil_core::ElementId;

new_key_type! {
    pub struct ScopeId;
}

/// A binding scope
///
/// Element arguments are optional: a `None` or stale element id skips the
/// binding and returns `None`, matching a view whose node is not mounted.
pub struct ScrollContext {
    inner: Weak<RefCell<Inner>>,
    scope: ScopeId,
}

impl ScrollContext {
    pub(crate) fn new(inner: &Rc<RefCell<Inner>>) -> Self {
        let scope = inner.borrow_mut().scopes.insert(Vec::new());
        Self {
            inner: Rc::downgrade(inner),
            scope,
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner, ScopeId) -> Option<R>) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let mut inner = inner.borrow_mut();
        f(&mut inner, self.scope)
    }

    /// Entrance animation of one element when it scrolls into view
    pub fn bind_reveal(
        &self,
        element: Option<ElementId>,
        spec: AnimationSpec,
        trigger: TriggerConfig,
        timing: Timing,
    ) -> Option<BindingHandle> {
        self.with(|inner, scope| inner.bind_reveal(scope, element, spec, trigger, timing))
    }

    /// Entrance animation of a container's matching children, one after another
    pub fn bind_stagger(
        &self,
        container: Option<ElementId>,
        selector: &str,
        spec: AnimationSpec,
        trigger: TriggerConfig,
        stagger: Stagger,
    ) -> Option<BindingHandle> {
        self.with(|inner, scope| {
            inner.bind_stagger(scope, container, selector, spec, trigger, stagger)
        })
    }

    /// Displacement of `speed * 100` units while the element crosses the viewport
    pub fn bind_parallax(
        &self,
        element: Option<ElementId>,
        speed: f32,
        axis: Axis,
    ) -> Option<BindingHandle> {
        self.with(|inner, scope| inner.bind_parallax(scope, element, speed, axis))
    }

    /// Split text into word or character units and stagger them in
    pub fn bind_text_reveal(
        &self,
        element: Option<ElementId>,
        granularity: Granularity,
        trigger: TriggerConfig,
        stagger: Stagger,
    ) -> Option<BindingHandle> {
        self.with(|inner, scope| {
            inner.bind_text_reveal(scope, element, granularity, trigger, stagger)
        })
    }

    /// Count up in the element's text once it scrolls into view
    pub fn bind_counter(
        &self,
        element: Option<ElementId>,
        counter: CounterBinding,
        trigger: TriggerConfig,
    ) -> Option<BindingHandle> {
        self.with(|inner, scope| inner.bind_counter(scope, element, counter, trigger))
    }

    /// Pull the element toward the pointer while hovered
    pub fn bind_magnetic(&self, element: Option<ElementId>, strength: f32) -> Option<BindingHandle> {
        self.with(|inner, scope| inner.bind_magnetic(scope, element, strength))
    }

    /// Timeline that plays immediately
    pub fn bind_sequence(&self, sequence: &Sequence) -> Option<BindingHandle> {
        self.with(|inner, scope| inner.bind_sequence(scope, sequence))
    }

    /// Write style properties now; they are restored on revert
    pub fn set_style(
        &self,
        element: Option<ElementId>,
        props: KeyframeProperties,
    ) -> Option<BindingHandle> {
        self.with(|inner, scope| inner.set_style(scope, element, props))
    }

    /// Track whether at least `threshold` of the element is visible
    pub fn observe_visibility(
        &self,
        element: Option<ElementId>,
        threshold: f32,
        once: bool,
    ) -> Option<BindingHandle> {
        self.with(|inner, scope| inner.observe_visibility(scope, element, threshold, once))
    }

    /// Track whether the page is scrolled past `offset`
    pub fn observe_scroll(&self, offset: f32) -> Option<BindingHandle> {
        self.with(|inner, scope| Some(inner.observe_scroll(scope, offset)))
    }

    /// Release one binding of this scope
    pub fn release(&self, handle: BindingHandle) -> bool {
        self.with(|inner, scope| {
            let owned = inner
                .stage
                .bindings
                .get(handle.0)
                .is_some_and(|b| b.scope == scope);
            Some(owned && inner.release(handle.0))
        })
        .unwrap_or(false)
    }

    /// Release every binding of this scope; the scope stays usable
    pub fn revert(&self) -> usize {
        let released = self
            .with(|inner, scope| Some(inner.release_scope(scope)))
            .unwrap_or(0);
        if released > 0 {
            tracing::debug!(released, "scroll context reverted");
        }
        released
    }

    /// Live bindings in this scope
    pub fn len(&self) -> usize {
        self.with(|inner, scope| inner.scopes.get(scope).map(Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ScrollContext {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let Ok(mut inner) = inner.try_borrow_mut() else {
            tracing::warn!("runtime busy while dropping scroll context, bindings left in place");
            return;
        };
        inner.release_scope(self.scope);
        inner.scopes.remove(self.scope);
    }
}
