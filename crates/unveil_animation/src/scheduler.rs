//! Frame scheduler
//!
//! Per-frame callback queue. In-flight animations are tasks that run once per
//! display refresh against a shared context `C` until they report
//! [`TaskStatus::Done`] or are cancelled through their [`TaskId`].

use slotmap::{new_key_type, SlotMap};
use std::time::Instant;

new_key_type! {
    /// Cancellation handle for a scheduled task
    pub struct TaskId;
}

/// Result of running a task for one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Continue,
    Done,
}

/// A per-frame callback receiving the shared context and the frame delta in ms
pub type FrameTask<C> = Box<dyn FnMut(&mut C, f32) -> TaskStatus>;

/// The scheduler that ticks all active tasks
pub struct FrameScheduler<C> {
    tasks: SlotMap<TaskId, FrameTask<C>>,
    /// Scheduling order; tasks run in the order they were queued
    order: Vec<TaskId>,
    last_frame: Option<Instant>,
    frame_count: u64,
    target_fps: u32,
}

impl<C> FrameScheduler<C> {
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            order: Vec::new(),
            last_frame: None,
            frame_count: 0,
            target_fps: 60,
        }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.max(1);
    }

    /// Nominal frame interval in milliseconds
    pub fn frame_interval_ms(&self) -> f32 {
        1000.0 / self.target_fps as f32
    }

    /// Queue a task; it first runs on the next tick
    pub fn schedule<F>(&mut self, task: F) -> TaskId
    where
        F: FnMut(&mut C, f32) -> TaskStatus + 'static,
    {
        let id = self.tasks.insert(Box::new(task));
        self.order.push(id);
        id
    }

    /// Cancel a task; returns whether it was still scheduled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if self.tasks.remove(id).is_some() {
            self.order.retain(|t| *t != id);
            true
        } else {
            false
        }
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Run every task once with the given frame delta
    ///
    /// Returns the number of tasks that ran.
    pub fn tick(&mut self, ctx: &mut C, dt_ms: f32) -> usize {
        self.frame_count += 1;
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        let mut ran = 0;
        let mut finished = Vec::new();
        for id in self.order.clone() {
            let Some(task) = self.tasks.get_mut(id) else {
                continue;
            };
            ran += 1;
            if task(ctx, dt_ms) == TaskStatus::Done {
                finished.push(id);
            }
        }
        for id in finished {
            self.cancel(id);
        }
        ran
    }

    /// Tick using wall-clock time elapsed since the previous call
    ///
    /// The first call uses the nominal frame interval.
    pub fn tick_elapsed(&mut self, ctx: &mut C) -> usize {
        let now = Instant::now();
        let dt_ms = match self.last_frame {
            Some(last) => (now - last).as_secs_f32() * 1000.0,
            None => self.frame_interval_ms(),
        };
        self.last_frame = Some(now);
        self.tick(ctx, dt_ms)
    }

    /// Check if any tasks are still queued
    pub fn has_active_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl<C> Default for FrameScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_runs_until_done() {
        let mut scheduler = FrameScheduler::new();
        let mut total = 0.0f32;

        scheduler.schedule(|total: &mut f32, dt| {
            *total += dt;
            if *total >= 50.0 {
                TaskStatus::Done
            } else {
                TaskStatus::Continue
            }
        });

        for _ in 0..10 {
            scheduler.tick(&mut total, 16.0);
        }
        assert_eq!(total, 64.0);
        assert!(!scheduler.has_active_tasks());
    }

    #[test]
    fn test_cancel_stops_further_runs() {
        let mut scheduler = FrameScheduler::new();
        let mut count = 0u32;
        let id = scheduler.schedule(|count: &mut u32, _| {
            *count += 1;
            TaskStatus::Continue
        });

        scheduler.tick(&mut count, 16.0);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.tick(&mut count, 16.0);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_tasks_run_in_schedule_order() {
        let mut scheduler = FrameScheduler::new();
        let mut log: Vec<u8> = Vec::new();
        scheduler.schedule(|log: &mut Vec<u8>, _| {
            log.push(1);
            TaskStatus::Done
        });
        scheduler.schedule(|log: &mut Vec<u8>, _| {
            log.push(2);
            TaskStatus::Done
        });
        assert_eq!(scheduler.tick(&mut log, 16.0), 2);
        assert_eq!(log, vec![1, 2]);
    }
}
