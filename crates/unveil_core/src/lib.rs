//! Unveil Core Runtime
//!
//! Foundational primitives shared by the Unveil crates:
//!
//! - **Element Tree**: element records with layout rectangles, animatable
//!   style and text, queried by simple selectors
//! - **Viewport**: the read-only scroll/size signal every binding observes
//! - **Event Dispatch**: revocable listener registration for scroll, resize
//!   and pointer input
//! - **State Machines**: flat statecharts, used for binding lifecycles
//!
//! # Example
//!
//! ```rust
//! use unveil_core::element::{Element, ElementTree, Rect, Selector};
//!
//! let mut tree = ElementTree::new();
//! let grid = tree.insert(Element::new(Rect::new(0.0, 900.0, 1200.0, 400.0)));
//! for i in 0..3 {
//!     let rect = Rect::new(i as f32 * 400.0, 900.0, 380.0, 400.0);
//!     tree.insert_child(grid, Element::new(rect).with_class("stagger-item"));
//! }
//!
//! let selector = Selector::parse(".stagger-item").unwrap();
//! assert_eq!(tree.query_all(grid, &selector).len(), 3);
//! ```

pub mod element;
pub mod error;
pub mod events;
pub mod fsm;
pub mod lifecycle;
pub mod viewport;

pub use element::{Element, ElementId, ElementTree, PropertySet, Rect, Selector, Style, StyleProperty};
pub use error::{Error, Result};
pub use events::{Event, EventData, EventDispatcher, EventType, ListenerId};
pub use fsm::{EventId, StateId, StateMachine, Transition};
pub use lifecycle::{binding_machine, BindingState};
pub use viewport::Viewport;
