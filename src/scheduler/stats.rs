/*!
 * Scheduler Statistics
 * Track and report scheduler activity
 */

use super::{AgingPolicy, Scheduler};
use crate::runtime::Runtime;
use serde::{Deserialize, Serialize};

/// Counters accumulated since the scheduler was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub total_dispatched: u64,
    pub context_switches: u64,
    pub preemptions: u64,
    pub migrations: u64,
    pub priority_updates: u64,
    pub reclaimed: u64,
    pub idle_transitions: u64,
    pub ready_tasks: usize,
    pub live_tasks: usize,
}

impl<R: Runtime, A: AgingPolicy> Scheduler<R, A> {
    /// Snapshot of scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            ready_tasks: self.ready_len(),
            live_tasks: self.tasks.len(),
            ..self.stats
        }
    }
}
