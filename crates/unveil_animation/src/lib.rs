//! Unveil Animation System
//!
//! Easing curves, tweens, timelines and the per-frame scheduler that drive
//! scroll-triggered entrance animations.
//!
//! # Features
//!
//! - **Easing**: CSS-style and named curves (`power3.out`, `elastic.out(1, 0.3)`)
//! - **Tweens**: clock-free eased transitions sampled at a local time
//! - **Timelines**: tweens at offsets on a shared, reversible playhead
//! - **Scheduler**: per-frame task queue with explicit cancellation
//! - **Presets**: the fade/slide/scale/rotate entrance snapshots

pub mod easing;
pub mod keyframe;
pub mod presets;
pub mod scheduler;
pub mod timeline;
pub mod tween;

pub use easing::Easing;
pub use keyframe::KeyframeProperties;
pub use presets::{AnimationKind, AnimationPreset, AnimationSpec};
pub use scheduler::{FrameScheduler, TaskId, TaskStatus};
pub use timeline::{PlayDirection, Timeline, TimelineEntryId};
pub use tween::{Tween, ValueTween};
