//! Unveil Scroll Orchestration
//!
//! Binds declarative entrance animations to elements and drives them from
//! scroll position:
//!
//! - **Reveals**: single-element entrance presets fired by a scroll trigger
//! - **Staggers**: a container's children entering one after another
//! - **Parallax**: displacement scrubbed by scroll position
//! - **Text reveals**: text split into words or characters, staggered in
//! - **Counters**: numbers counted up into text, once
//! - **Magnetic**: pointer-follow offset with an elastic return
//! - **Sequences**: intro timelines that play on bind
//! - **Observers**: visibility and scroll-position flags
//!
//! Bindings are made through a [`ScrollContext`]; reverting or dropping it
//! releases them all and restores every element to its pre-bind state.
//!
//! # Example
//!
//! ```rust
//! use unveil_animation::{AnimationKind, AnimationPreset};
//! use unveil_core::{Element, Rect, Viewport};
//! use unveil_scroll::{ScrollRuntime, Timing, TriggerConfig};
//!
//! let runtime = ScrollRuntime::new(Viewport::new(1280.0, 800.0));
//! let card = runtime.insert(Element::new(Rect::new(0.0, 1200.0, 400.0, 300.0)));
//!
//! let ctx = runtime.context();
//! ctx.bind_reveal(
//!     Some(card),
//!     AnimationPreset::reveal(AnimationKind::FadeUp),
//!     TriggerConfig::new("top 85%"),
//!     Timing::reveal().with_duration(0.8),
//! );
//! assert_eq!(runtime.style(card).unwrap().opacity, 0.0);
//!
//! runtime.scroll_to(600.0);
//! runtime.advance(800.0, 16.0);
//! assert_eq!(runtime.style(card).unwrap().opacity, 1.0);
//!
//! drop(ctx);
//! assert_eq!(runtime.listener_count(), 0);
//! ```

mod bind;
pub mod binding;
pub mod config;
pub mod context;
mod observe;
pub mod options;
pub mod plugin;
pub mod runtime;
pub mod sequence;
mod stage;
pub mod text;
pub mod trigger;

pub use binding::{BindingHandle, BindingId};
pub use config::{Axis, UnveilConfig};
pub use context::{ScopeId, ScrollContext};
pub use options::{easing_or, CounterBinding, Stagger, Timing};
pub use runtime::ScrollRuntime;
pub use sequence::{Position, Sequence, SequenceStep};
pub use text::Granularity;
pub use trigger::{Edge, TriggerConfig, TriggerPosition, TriggerRange};
