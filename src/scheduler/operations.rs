/*!
 * Scheduler Core Operations
 * Ready, select, dispatch, and deferred reclamation
 */

use super::{AgingPolicy, Scheduler, Tier};
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{TaskStatus, Tick};
use crate::runtime::Runtime;
use crate::task::{TaskHandle, TaskRecord};
use tracing::{debug, info};

impl<R: Runtime, A: AgingPolicy> Scheduler<R, A> {
    /// Mark a task ready and queue it in the tier its priority selects
    ///
    /// An out-of-range priority is rejected before anything is mutated.
    pub fn ready_to_run(&mut self, handle: TaskHandle, now: Tick) -> SchedulerResult<()> {
        let record = self.tasks.get(handle)?;
        let tier = Tier::of(record)?;

        if let Some(queued) = record.queued_in() {
            return Err(SchedulerError::AlreadyQueued {
                task: record.id(),
                queue: queued.label().into(),
            });
        }
        if record.status() == TaskStatus::Finished {
            return Err(SchedulerError::InvalidState(format!(
                "finished task {} cannot become ready",
                record.id()
            )));
        }

        self.tasks.get_mut(handle)?.enter_ready(now);
        self.enqueue(handle, tier, now)
    }

    /// Pop the next task by tier precedence, `None` when every queue is empty
    pub fn find_next_to_run(&mut self) -> SchedulerResult<Option<TaskHandle>> {
        let now = self.runtime.current_tick();

        for tier in Tier::ALL {
            if let Some(handle) = self.queues[tier.index()].remove_front() {
                self.current_tier = tier;
                let record = self.tasks.get_mut(handle)?;
                record.queued = None;
                debug!(
                    tick = now,
                    task = %record.id(),
                    queue = %tier,
                    "Task removed from ready queue"
                );
                return Ok(Some(handle));
            }
        }

        Ok(None)
    }

    /// Dispatch the CPU to `next`
    ///
    /// The caller has already moved the outgoing task to READY, BLOCKED or
    /// FINISHED. With `finishing` set, the outgoing task is held for
    /// reclamation on the next scheduling cycle, once its context is no
    /// longer in use.
    pub fn run(&mut self, next: TaskHandle, finishing: bool) -> SchedulerResult<()> {
        self.reclaim_pending()?;
        let now = self.runtime.current_tick();

        let incoming = self.tasks.get(next)?;
        if let Some(tier) = incoming.queued_in() {
            return Err(SchedulerError::InvalidState(format!(
                "task {} is still queued in {}",
                incoming.id(),
                tier
            )));
        }
        if incoming.status() == TaskStatus::Finished {
            return Err(SchedulerError::InvalidState(format!(
                "finished task {} cannot be dispatched",
                incoming.id()
            )));
        }
        let next_id = incoming.id();

        let previous = self.current;
        if previous == Some(next) {
            if finishing {
                return Err(SchedulerError::InvalidState(format!(
                    "task {} cannot finish into itself",
                    next_id
                )));
            }
            // Same task re-selected: restart its quantum without a switch
            self.dispatch_tick = now;
            self.tasks.get_mut(next)?.set_status(TaskStatus::Running);
            self.stats.total_dispatched += 1;
            debug!(tick = now, task = %next_id, tier = %self.current_tier, "Quantum restarted");
            return Ok(());
        }

        let previous_id = match previous {
            Some(outgoing) => {
                if finishing {
                    self.defer_reclaim(outgoing)?;
                }
                let record = self.tasks.get_mut(outgoing)?;
                record.save_state();
                Some(record.id())
            }
            None if finishing => {
                return Err(SchedulerError::InvalidState(
                    "no running task to finish".into(),
                ))
            }
            None => None,
        };

        let ran = now.saturating_sub(self.dispatch_tick);
        self.current = Some(next);
        self.dispatch_tick = now;
        self.tasks.get_mut(next)?.set_status(TaskStatus::Running);
        self.stats.total_dispatched += 1;

        info!(
            tick = now,
            task = %next_id,
            tier = %self.current_tier,
            replaced = ?previous_id,
            ran,
            "Task selected for execution"
        );
        self.runtime.context_switch(previous_id, Some(next_id));
        self.stats.context_switches += 1;

        // Handoff complete: the incoming task is back on the CPU
        self.tasks.get_mut(next)?.restore_state();
        Ok(())
    }

    /// Release the CPU to the idle loop when nothing is ready
    pub fn run_idle(&mut self, finishing: bool) -> SchedulerResult<()> {
        self.reclaim_pending()?;
        let now = self.runtime.current_tick();

        let Some(outgoing) = self.current else {
            if finishing {
                return Err(SchedulerError::InvalidState(
                    "no running task to finish".into(),
                ));
            }
            return Ok(());
        };

        if finishing {
            self.defer_reclaim(outgoing)?;
        }
        let record = self.tasks.get_mut(outgoing)?;
        record.save_state();
        let outgoing_id = record.id();

        let ran = now.saturating_sub(self.dispatch_tick);
        self.current = None;
        self.dispatch_tick = now;

        info!(tick = now, replaced = %outgoing_id, ran, "CPU idle");
        self.runtime.context_switch(Some(outgoing_id), None);
        self.stats.context_switches += 1;
        self.stats.idle_transitions += 1;
        Ok(())
    }

    /// Charge the running task for the ticks it used since dispatch
    pub fn charge_current(&mut self, now: Tick) -> SchedulerResult<TaskHandle> {
        let handle = self.require_current()?;
        let ran = now.saturating_sub(self.dispatch_tick);
        self.tasks.get_mut(handle)?.charge(ran);
        self.dispatch_tick = now;
        Ok(handle)
    }

    /// Drain the deferred-cleanup slot
    ///
    /// Returns the released record, if one was waiting.
    pub fn reclaim_pending(&mut self) -> SchedulerResult<Option<TaskRecord>> {
        let Some(handle) = self.pending_reclaim.take() else {
            return Ok(None);
        };

        let record = self.tasks.release(handle)?;
        self.stats.reclaimed += 1;
        debug!(task = %record.id(), "Finished task reclaimed");
        Ok(Some(record))
    }

    // Callers drain the slot first, so an occupied slot here means a finished
    // task was never reclaimed
    fn defer_reclaim(&mut self, outgoing: TaskHandle) -> SchedulerResult<()> {
        if let Some(pending) = self.pending_reclaim {
            return Err(SchedulerError::ReclaimPending {
                pending: self.tasks.get(pending)?.id(),
                task: self.tasks.get(outgoing)?.id(),
            });
        }
        self.tasks.get_mut(outgoing)?.set_status(TaskStatus::Finished);
        self.pending_reclaim = Some(outgoing);
        Ok(())
    }
}
