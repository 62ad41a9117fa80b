/*!
 * Priority Aging
 * Priority recomputation for waiting tasks and tier migration
 */

use super::{Scheduler, Tier};
use crate::core::config::SchedulerConfig;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::limits::{DEFAULT_AGING_INTERVAL, DEFAULT_AGING_STEP, MAX_PRIORITY};
use crate::core::types::{Priority, Tick};
use crate::runtime::Runtime;
use crate::task::TaskHandle;
use tracing::debug;

/// Priority recomputation for tasks waiting in a ready queue
///
/// Implementations must be monotonic non-decreasing in `waited`. The
/// scheduler trusts this and acts on whatever value is returned.
pub trait AgingPolicy {
    /// Priority of a task that entered its queue with `base` and has waited `waited` ticks
    fn aged_priority(&self, base: Priority, waited: Tick) -> Priority;
}

/// Fixed priority gain per completed waiting interval, capped at a ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearAging {
    interval: Tick,
    step: Priority,
    ceiling: Priority,
}

impl LinearAging {
    pub fn new(interval: Tick, step: Priority, ceiling: Priority) -> Self {
        Self {
            interval: interval.max(1),
            step,
            ceiling,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.aging_interval, config.aging_step, config.aging_ceiling)
    }
}

impl Default for LinearAging {
    fn default() -> Self {
        Self::new(DEFAULT_AGING_INTERVAL, DEFAULT_AGING_STEP, MAX_PRIORITY)
    }
}

impl AgingPolicy for LinearAging {
    fn aged_priority(&self, base: Priority, waited: Tick) -> Priority {
        if base >= self.ceiling {
            return base;
        }
        let steps = i64::try_from(waited / self.interval).unwrap_or(i64::MAX);
        let aged = i64::from(base).saturating_add(steps.saturating_mul(i64::from(self.step)));
        aged.min(i64::from(self.ceiling)) as Priority
    }
}

impl<R: Runtime, A: AgingPolicy> Scheduler<R, A> {
    /// Age every waiting task and migrate tasks whose priority changed band
    ///
    /// Tier1 members only have their priority refreshed: their queue is keyed
    /// on remaining burst and there is no higher tier. A changed priority in
    /// Tier2 is re-sorted in place. Tasks are re-bucketed with the same rule
    /// `ready_to_run` uses, so a jump across two boundaries lands correctly.
    /// Migration keeps the task's wait period.
    pub fn update_queues(&mut self, now: Tick) -> SchedulerResult<()> {
        let waiting: Vec<TaskHandle> = self.queue(Tier::Tier1).iter().collect();
        for handle in waiting {
            self.age(handle, now)?;
        }

        for tier in [Tier::Tier2, Tier::Tier3] {
            let waiting: Vec<TaskHandle> = self.queue(tier).iter().collect();
            let mut migrating = Vec::new();
            let mut resorting = Vec::new();

            for handle in waiting {
                let (old, new, target) = self.age(handle, now)?;
                if old == new {
                    continue;
                }
                if target != tier {
                    migrating.push((handle, target));
                } else if tier == Tier::Tier2 {
                    resorting.push(handle);
                }
            }

            for (handle, target) in migrating {
                self.dequeue(handle, tier, now)?;
                self.enqueue(handle, target, now)?;
                self.stats.migrations += 1;
            }
            for handle in resorting {
                self.dequeue(handle, tier, now)?;
                self.enqueue(handle, tier, now)?;
            }
        }

        Ok(())
    }

    /// Recompute one task's priority, returning `(old, new, tier of new)`
    ///
    /// A result outside `[0, 150)` is rejected before the record is touched.
    fn age(
        &mut self,
        handle: TaskHandle,
        now: Tick,
    ) -> SchedulerResult<(Priority, Priority, Tier)> {
        let record = self.tasks.get(handle)?;
        let old = record.priority();
        let new = self
            .aging
            .aged_priority(record.base_priority(), now.saturating_sub(record.wait_since()));
        let Some(tier) = Tier::classify(new) else {
            return Err(SchedulerError::InvalidPriority {
                task: record.id(),
                priority: new,
            });
        };

        if new != old {
            let record = self.tasks.get_mut(handle)?;
            record.set_priority(new);
            self.stats.priority_updates += 1;
            debug!(
                tick = now,
                task = %record.id(),
                old_priority = old,
                new_priority = new,
                "Task priority changed"
            );
        }
        Ok((old, new, tier))
    }
}
