//! State machine runtime
//!
//! Flat transition tables over numeric states and events. Each binding owns
//! one to track its lifecycle (see [`crate::lifecycle`]).

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Identifier for a state within a state machine
pub type StateId = u32;

/// Identifier for an event type
pub type EventId = u32;

/// Callback run when a state is entered
pub type EnterHook = Box<dyn FnMut() + Send>;

/// Which states a transition leaves from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    State(StateId),
    /// Every state but this one
    AnyExcept(StateId),
}

impl Source {
    fn matches(self, state: StateId) -> bool {
        match self {
            Source::State(s) => s == state,
            Source::AnyExcept(s) => s != state,
        }
    }
}

/// One row of the transition table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Source,
    pub event: EventId,
    pub to: StateId,
}

impl Transition {
    pub fn new(from: StateId, event: EventId, to: StateId) -> Self {
        Self {
            from: Source::State(from),
            event,
            to,
        }
    }

    /// Taken from every state except `except`, which makes `except` terminal
    /// when it is also the target
    pub fn from_any_except(except: StateId, event: EventId, to: StateId) -> Self {
        Self {
            from: Source::AnyExcept(except),
            event,
            to,
        }
    }

    fn applies(&self, state: StateId, event: EventId) -> bool {
        self.event == event && self.from.matches(state)
    }
}

pub struct StateMachineBuilder {
    initial: StateId,
    table: SmallVec<[Transition; 12]>,
    enter_hooks: FxHashMap<StateId, Vec<EnterHook>>,
}

impl StateMachineBuilder {
    pub fn new(initial: StateId) -> Self {
        Self {
            initial,
            table: SmallVec::new(),
            enter_hooks: FxHashMap::default(),
        }
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.table.push(transition);
        self
    }

    /// Shorthand for `transition(Transition::new(from, event, to))`
    pub fn on(self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transition(Transition::new(from, event, to))
    }

    /// Run `hook` every time `state` is entered
    pub fn on_enter<F: FnMut() + Send + 'static>(mut self, state: StateId, hook: F) -> Self {
        self.enter_hooks.entry(state).or_default().push(Box::new(hook));
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current: self.initial,
            table: self.table,
            enter_hooks: self.enter_hooks,
        }
    }
}

pub struct StateMachine {
    current: StateId,
    table: SmallVec<[Transition; 12]>,
    enter_hooks: FxHashMap<StateId, Vec<EnterHook>>,
}

impl StateMachine {
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder::new(initial)
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Whether `event` would move the machine from its current state
    pub fn can_send(&self, event: EventId) -> bool {
        self.find(event).is_some()
    }

    /// Apply `event` and return the resulting state
    ///
    /// Events with no matching row leave the state unchanged. The first
    /// matching row wins.
    pub fn send(&mut self, event: EventId) -> StateId {
        let Some(to) = self.find(event) else {
            return self.current;
        };
        self.current = to;
        if let Some(hooks) = self.enter_hooks.get_mut(&to) {
            hooks.iter_mut().for_each(|hook| hook());
        }
        to
    }

    fn find(&self, event: EventId) -> Option<StateId> {
        self.table
            .iter()
            .find(|t| t.applies(self.current, event))
            .map(|t| t.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const HIDDEN: StateId = 0;
    const SHOWING: StateId = 1;
    const SHOWN: StateId = 2;
    const GONE: StateId = 3;

    const REVEAL: EventId = 1;
    const SETTLE: EventId = 2;
    const HIDE: EventId = 3;
    const DROP: EventId = 4;

    fn machine() -> StateMachineBuilder {
        StateMachine::builder(HIDDEN)
            .on(HIDDEN, REVEAL, SHOWING)
            .on(SHOWING, SETTLE, SHOWN)
            .on(SHOWN, HIDE, HIDDEN)
    }

    #[test]
    fn test_table_transitions() {
        let mut fsm = machine().build();
        assert_eq!(fsm.send(REVEAL), SHOWING);
        assert_eq!(fsm.send(SETTLE), SHOWN);

        // No row for SHOWN + REVEAL
        assert_eq!(fsm.send(REVEAL), SHOWN);
        assert_eq!(fsm.send(HIDE), HIDDEN);
    }

    #[test]
    fn test_any_except_is_terminal() {
        let mut fsm = machine()
            .transition(Transition::from_any_except(GONE, DROP, GONE))
            .on(GONE, REVEAL, SHOWING)
            .build();

        fsm.send(REVEAL);
        assert_eq!(fsm.send(DROP), GONE);
        assert!(!fsm.can_send(DROP));
        // Explicit rows out of GONE still apply
        assert!(fsm.can_send(REVEAL));
    }

    #[test]
    fn test_enter_hooks_run_per_entry() {
        let entered = Arc::new(Mutex::new(0));
        let counter = entered.clone();

        let mut fsm = machine()
            .on_enter(SHOWING, move || *counter.lock().unwrap() += 1)
            .build();

        fsm.send(REVEAL);
        fsm.send(SETTLE);
        fsm.send(HIDE);
        fsm.send(REVEAL);
        // Ignored event does not re-enter
        fsm.send(HIDE);
        assert_eq!(*entered.lock().unwrap(), 2);
    }
}
