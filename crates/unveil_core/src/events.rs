//! Event listener registry
//!
//! Bindings register interest in scroll, resize and pointer input here. The
//! registry stores a small copyable key per listener (the owning binding) and
//! hands the matching keys back on dispatch, so every listener is revocable by
//! its [`ListenerId`].

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

/// Event type identifier
pub type EventType = u32;

/// Event types understood by the runtime
pub mod event_types {
    use super::EventType;

    pub const POINTER_MOVE: EventType = 3;
    pub const POINTER_LEAVE: EventType = 5;
    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;
}

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

/// An input event fed by the host
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    pub data: EventData,
}

impl Event {
    pub fn scroll(x: f32, y: f32) -> Self {
        Self {
            event_type: event_types::SCROLL,
            data: EventData::Scroll { x, y },
        }
    }

    pub fn resize(width: f32, height: f32) -> Self {
        Self {
            event_type: event_types::RESIZE,
            data: EventData::Resize { width, height },
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self {
            event_type: event_types::POINTER_MOVE,
            data: EventData::Pointer { x, y },
        }
    }

    pub fn pointer_leave() -> Self {
        Self {
            event_type: event_types::POINTER_LEAVE,
            data: EventData::None,
        }
    }
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    /// Pointer position in client (viewport) coordinates
    Pointer { x: f32, y: f32 },
    /// New absolute scroll position
    Scroll { x: f32, y: f32 },
    Resize { width: f32, height: f32 },
    None,
}

struct Listener<K> {
    event_type: EventType,
    key: K,
}

/// Registry of listeners keyed by event type
pub struct EventDispatcher<K: Copy> {
    listeners: SlotMap<ListenerId, Listener<K>>,
    /// Registration order per event type
    by_type: FxHashMap<EventType, SmallVec<[ListenerId; 8]>>,
}

impl<K: Copy> EventDispatcher<K> {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            by_type: FxHashMap::default(),
        }
    }

    /// Register a listener for an event type
    ///
    /// Listeners are not scoped to an element: a binding decides from the
    /// event data whether it applies, so pointer bindings still see the
    /// moves that carry the pointer out of their bounds.
    pub fn register(&mut self, event_type: EventType, key: K) -> ListenerId {
        let id = self.listeners.insert(Listener { event_type, key });
        self.by_type.entry(event_type).or_default().push(id);
        id
    }

    /// Remove a listener; returns its key if it was registered
    pub fn unregister(&mut self, id: ListenerId) -> Option<K> {
        let listener = self.listeners.remove(id)?;
        if let Some(ids) = self.by_type.get_mut(&listener.event_type) {
            ids.retain(|l| *l != id);
        }
        Some(listener.key)
    }

    /// Keys of every listener for the event, in registration order
    pub fn dispatch(&self, event: &Event) -> Vec<K> {
        self.by_type
            .get(&event.event_type)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.listeners.get(*id))
                    .map(|l| l.key)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners registered for an event type
    pub fn count(&self, event_type: EventType) -> usize {
        self.by_type.get(&event_type).map_or(0, |ids| ids.len())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<K: Copy> Default for EventDispatcher<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_in_registration_order() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(event_types::SCROLL, 1u32);
        dispatcher.register(event_types::RESIZE, 2u32);
        dispatcher.register(event_types::SCROLL, 3u32);

        assert_eq!(dispatcher.dispatch(&Event::scroll(0.0, 10.0)), vec![1, 3]);
        assert_eq!(dispatcher.dispatch(&Event::pointer_leave()), Vec::<u32>::new());
    }

    #[test]
    fn test_unregister() {
        let mut dispatcher = EventDispatcher::new();
        let a = dispatcher.register(event_types::SCROLL, 'a');
        dispatcher.register(event_types::SCROLL, 'b');

        assert_eq!(dispatcher.unregister(a), Some('a'));
        assert_eq!(dispatcher.unregister(a), None);
        assert_eq!(dispatcher.count(event_types::SCROLL), 1);
        assert_eq!(dispatcher.len(), 1);
    }
}
