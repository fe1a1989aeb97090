//! Binding lifecycle
//!
//! Every binding moves through
//! `Unarmed -> Armed -> Playing -> AtRest`, may detour through `Reversing`
//! back to `Armed` when its element leaves back over the trigger start, and
//! ends in `Released` from any state.

use crate::fsm::{EventId, StateId, StateMachine, Transition};

/// Lifecycle states
pub mod states {
    use super::StateId;

    pub const UNARMED: StateId = 0;
    pub const ARMED: StateId = 1;
    pub const PLAYING: StateId = 2;
    pub const AT_REST: StateId = 3;
    pub const REVERSING: StateId = 4;
    pub const RELEASED: StateId = 5;
}

/// Lifecycle events
pub mod events {
    use super::EventId;

    /// Listeners registered
    pub const ARM: EventId = 1;
    /// Entrance condition met (or re-met)
    pub const ENTER: EventId = 2;
    /// Current animation direction finished
    pub const COMPLETE: EventId = 3;
    /// Element left back over the trigger start
    pub const LEAVE_BACK: EventId = 4;
    /// Teardown
    pub const RELEASE: EventId = 5;
}

/// Typed view of a lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
    Unarmed,
    Armed,
    Playing,
    AtRest,
    Reversing,
    Released,
}

impl BindingState {
    pub fn from_id(id: StateId) -> Self {
        match id {
            states::ARMED => BindingState::Armed,
            states::PLAYING => BindingState::Playing,
            states::AT_REST => BindingState::AtRest,
            states::REVERSING => BindingState::Reversing,
            states::RELEASED => BindingState::Released,
            _ => BindingState::Unarmed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BindingState::Unarmed => "unarmed",
            BindingState::Armed => "armed",
            BindingState::Playing => "playing",
            BindingState::AtRest => "at_rest",
            BindingState::Reversing => "reversing",
            BindingState::Released => "released",
        }
    }
}

/// Build the lifecycle machine for one binding
pub fn binding_machine(label: &'static str) -> StateMachine {
    use events::*;
    use states::*;

    StateMachine::builder(UNARMED)
        .on(UNARMED, ARM, ARMED)
        .on(ARMED, ENTER, PLAYING)
        .on(ARMED, COMPLETE, AT_REST)
        .on(PLAYING, COMPLETE, AT_REST)
        .on(PLAYING, LEAVE_BACK, REVERSING)
        .on(AT_REST, LEAVE_BACK, REVERSING)
        .on(AT_REST, ENTER, PLAYING)
        .on(REVERSING, ENTER, PLAYING)
        .on(REVERSING, COMPLETE, ARMED)
        .transition(Transition::from_any_except(RELEASED, RELEASE, RELEASED))
        .on_enter(RELEASED, move || tracing::trace!(binding = label, "released"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_reverse_cycle() {
        let mut fsm = binding_machine("test");
        fsm.send(events::ARM);
        fsm.send(events::ENTER);
        assert_eq!(BindingState::from_id(fsm.current_state()), BindingState::Playing);
        fsm.send(events::COMPLETE);
        assert_eq!(BindingState::from_id(fsm.current_state()), BindingState::AtRest);
        fsm.send(events::LEAVE_BACK);
        fsm.send(events::COMPLETE);
        assert_eq!(BindingState::from_id(fsm.current_state()), BindingState::Armed);
    }

    #[test]
    fn test_release_from_every_state() {
        for setup in [
            &[][..],
            &[events::ARM][..],
            &[events::ARM, events::ENTER][..],
            &[events::ARM, events::ENTER, events::COMPLETE][..],
            &[events::ARM, events::ENTER, events::LEAVE_BACK][..],
        ] {
            let mut fsm = binding_machine("test");
            for event in setup {
                fsm.send(*event);
            }
            assert_eq!(fsm.send(events::RELEASE), states::RELEASED);
            // Terminal: nothing leaves Released
            assert_eq!(fsm.send(events::ARM), states::RELEASED);
            assert_eq!(fsm.send(events::ENTER), states::RELEASED);
        }
    }

    #[test]
    fn test_enter_before_arm_is_ignored() {
        let mut fsm = binding_machine("test");
        assert_eq!(fsm.send(events::ENTER), states::UNARMED);
    }
}
