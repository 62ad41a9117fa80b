/*!
 * Preemption Decision
 * Decide at each tick whether the running task's quantum ends
 */

use super::{AgingPolicy, Scheduler, Tier};
use crate::core::errors::SchedulerResult;
use crate::core::types::Tick;
use crate::runtime::Runtime;
use tracing::debug;

impl<R: Runtime, A: AgingPolicy> Scheduler<R, A> {
    /// Whether the running task must give up the CPU at `now`
    ///
    /// - Tier3: quantum expired, or any higher tier has a ready task
    /// - Tier2: Tier1 has a ready task
    /// - Tier1: Tier1's head needs strictly less CPU than the running task has left
    ///
    /// Pure over scheduler state; false while the CPU is idle.
    pub fn to_yield(&self, now: Tick) -> bool {
        let Some(running) = self.current.and_then(|h| self.tasks.get(h).ok()) else {
            return false;
        };
        let elapsed = now.saturating_sub(self.dispatch_tick);

        match self.current_tier {
            Tier::Tier3 => {
                elapsed >= self.quantum
                    || !self.queue(Tier::Tier1).is_empty()
                    || !self.queue(Tier::Tier2).is_empty()
            }
            Tier::Tier2 => !self.queue(Tier::Tier1).is_empty(),
            Tier::Tier1 => {
                let current_remaining = running.remaining_burst() - elapsed as f64;
                self.queue(Tier::Tier1)
                    .front()
                    .and_then(|h| self.tasks.get(h).ok())
                    .is_some_and(|head| head.remaining_burst() < current_remaining)
            }
        }
    }

    /// Tick-time entry point: age waiting tasks, then evaluate preemption
    pub fn update_and_maybe_yield(&mut self, now: Tick) -> SchedulerResult<bool> {
        self.update_queues(now)?;
        let preempt = self.to_yield(now);
        if preempt {
            self.stats.preemptions += 1;
            debug!(
                tick = now,
                tier = %self.current_tier,
                elapsed = now.saturating_sub(self.dispatch_tick),
                "Preemption indicated"
            );
        }
        Ok(preempt)
    }
}
