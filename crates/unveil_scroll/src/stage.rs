//! The state frame tasks run against
//!
//! Frame tasks only ever see the stage: the element tree, the viewport and
//! the bindings. Listener and task bookkeeping stays in the runtime.

use crate::binding::{Binding, BindingId};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use unveil_animation::TaskStatus;
use unveil_core::{ElementId, ElementTree, PropertySet, Viewport};

pub(crate) struct Stage {
    pub elements: ElementTree,
    pub viewport: Viewport,
    pub bindings: SlotMap<BindingId, Binding>,
    /// Owning binding of each claimed property set, per element
    claims: FxHashMap<ElementId, SmallVec<[(PropertySet, BindingId); 2]>>,
}

impl Stage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            elements: ElementTree::new(),
            viewport,
            bindings: SlotMap::with_key(),
            claims: FxHashMap::default(),
        }
    }

    /// Run one frame of a binding; clears its task handle when it finishes
    pub fn step(&mut self, id: BindingId, dt_ms: f32) -> TaskStatus {
        let Stage {
            elements, bindings, ..
        } = self;
        let Some(binding) = bindings.get_mut(id) else {
            return TaskStatus::Done;
        };
        let status = binding.step(elements, dt_ms);
        if status == TaskStatus::Done {
            binding.task = None;
        }
        status
    }

    pub fn start(&mut self, id: BindingId) -> bool {
        let Stage {
            elements,
            viewport,
            bindings,
            ..
        } = self;
        bindings
            .get_mut(id)
            .map_or(false, |binding| binding.start(elements, viewport))
    }

    pub fn on_viewport(&mut self, id: BindingId) -> bool {
        let Stage {
            elements,
            viewport,
            bindings,
            ..
        } = self;
        bindings
            .get_mut(id)
            .map_or(false, |binding| binding.on_viewport(elements, viewport))
    }

    pub fn on_pointer_move(&mut self, id: BindingId, x: f32, y: f32) -> bool {
        let Stage {
            elements,
            viewport,
            bindings,
            ..
        } = self;
        bindings
            .get_mut(id)
            .map_or(false, |binding| binding.on_pointer_move(elements, viewport, x, y))
    }

    pub fn on_pointer_leave(&mut self, id: BindingId) -> bool {
        let Stage {
            elements, bindings, ..
        } = self;
        bindings
            .get_mut(id)
            .map_or(false, |binding| binding.on_pointer_leave(elements))
    }

    /// Bindings owning any of `props` on `element`
    pub fn owners(&self, element: ElementId, props: PropertySet) -> SmallVec<[BindingId; 2]> {
        let mut owners = SmallVec::new();
        if let Some(claims) = self.claims.get(&element) {
            for (claimed, owner) in claims {
                if claimed.intersects(props) && !owners.contains(owner) {
                    owners.push(*owner);
                }
            }
        }
        owners
    }

    pub fn claim(&mut self, element: ElementId, props: PropertySet, owner: BindingId) {
        if props.is_empty() {
            return;
        }
        self.claims.entry(element).or_default().push((props, owner));
    }

    pub fn unclaim(&mut self, owner: BindingId) {
        self.claims.retain(|_, claims| {
            claims.retain(|(_, id)| *id != owner);
            !claims.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingKind;
    use crate::context::ScopeId;
    use unveil_core::{Element, Rect, StyleProperty};

    #[test]
    fn test_claims_track_owners() {
        let mut stage = Stage::new(Viewport::default());
        let element = stage.elements.insert(Element::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let a = stage
            .bindings
            .insert(Binding::new("set", ScopeId::default(), BindingKind::Set));
        let b = stage
            .bindings
            .insert(Binding::new("set", ScopeId::default(), BindingKind::Set));

        let fade = PropertySet::EMPTY.with(StyleProperty::Opacity);
        let slide = PropertySet::EMPTY.with(StyleProperty::TranslateY);
        stage.claim(element, fade, a);
        stage.claim(element, slide, b);

        assert_eq!(stage.owners(element, fade).as_slice(), &[a]);
        assert_eq!(stage.owners(element, fade.union(slide)).as_slice(), &[a, b]);
        assert!(stage
            .owners(element, PropertySet::EMPTY.with(StyleProperty::Scale))
            .is_empty());

        stage.unclaim(a);
        assert!(stage.owners(element, fade).is_empty());
        assert_eq!(stage.owners(element, slide).as_slice(), &[b]);
    }
}
