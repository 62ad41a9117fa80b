/*!
 * Task Record
 * Per-task scheduling state owned by the scheduler's task table
 */

use crate::core::limits::BURST_SMOOTHING;
use crate::core::types::{Priority, TaskId, TaskStatus, Tick};
use crate::scheduler::Tier;
use std::fmt;

/// Architectural state a task carries across context switches
///
/// Implemented by the runtime for tasks that own user registers or an
/// address space; kernel-only tasks have none.
pub trait TaskContext: fmt::Debug {
    /// Persist registers and address-space state before the task leaves the CPU
    fn save_state(&mut self);

    /// Reload state once the task is back on the CPU
    fn restore_state(&mut self);
}

/// Scheduling state of a single task
#[derive(Debug)]
pub struct TaskRecord {
    id: TaskId,
    name: String,
    priority: Priority,
    // Priority held when the task last entered a ready queue; aging is computed from it
    base_priority: Priority,
    remaining_burst: f64,
    burst_estimate: f64,
    burst_ticks: Tick,
    status: TaskStatus,
    wait_since: Tick,
    pub(crate) queued: Option<Tier>,
    context: Option<Box<dyn TaskContext>>,
}

impl TaskRecord {
    /// Create a new record in the READY state
    ///
    /// `burst` is the initial estimate of the task's first CPU burst.
    pub fn new(id: u32, name: impl Into<String>, priority: Priority, burst: f64) -> Self {
        let burst = burst.max(0.0);
        Self {
            id: TaskId(id),
            name: name.into(),
            priority,
            base_priority: priority,
            remaining_burst: burst,
            burst_estimate: burst,
            burst_ticks: 0,
            status: TaskStatus::Ready,
            wait_since: 0,
            queued: None,
            context: None,
        }
    }

    /// Attach architectural state saved and restored around context switches
    pub fn with_context(mut self, context: Box<dyn TaskContext>) -> Self {
        self.context = Some(context);
        self
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn base_priority(&self) -> Priority {
        self.base_priority
    }

    #[inline]
    pub fn remaining_burst(&self) -> f64 {
        self.remaining_burst
    }

    #[inline]
    pub fn burst_estimate(&self) -> f64 {
        self.burst_estimate
    }

    #[inline]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    #[inline]
    pub fn wait_since(&self) -> Tick {
        self.wait_since
    }

    /// Tier whose ready queue currently holds this task
    #[inline]
    pub fn queued_in(&self) -> Option<Tier> {
        self.queued
    }

    #[inline]
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub(crate) fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Start a new wait period in a ready queue
    pub(crate) fn enter_ready(&mut self, now: Tick) {
        self.status = TaskStatus::Ready;
        self.wait_since = now;
        self.base_priority = self.priority;
    }

    /// Account CPU ticks consumed since dispatch
    pub(crate) fn charge(&mut self, ticks: Tick) {
        self.burst_ticks += ticks;
        self.remaining_burst = (self.remaining_burst - ticks as f64).max(0.0);
    }

    /// Close the current CPU burst and refine the next-burst estimate
    ///
    /// Returns `(previous, updated)` estimates.
    pub(crate) fn complete_burst(&mut self) -> (f64, f64) {
        let previous = self.burst_estimate;
        let actual = self.burst_ticks as f64;
        let updated = BURST_SMOOTHING * actual + (1.0 - BURST_SMOOTHING) * previous;

        self.burst_estimate = updated;
        self.remaining_burst = updated;
        self.burst_ticks = 0;
        (previous, updated)
    }

    /// Returns whether the task had state to save
    pub(crate) fn save_state(&mut self) -> bool {
        match self.context.as_mut() {
            Some(context) => {
                context.save_state();
                true
            }
            None => false,
        }
    }

    /// Returns whether the task had state to restore
    pub(crate) fn restore_state(&mut self) -> bool {
        match self.context.as_mut() {
            Some(context) => {
                context.restore_state();
                true
            }
            None => false,
        }
    }
}
