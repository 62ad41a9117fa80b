/*!
 * Kernel Tick Driver
 *
 * Bridges timer interrupts and thread lifecycle events to the scheduler:
 * the alarm callback, voluntary yield, sleep, finish, and wake-up.
 */

mod simulation;

pub use simulation::{Completion, Simulation, SimulationReport, Workload};

use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::TaskStatus;
use crate::monitoring::span_scheduling;
use crate::runtime::Runtime;
use crate::scheduler::{AgingPolicy, LinearAging, Scheduler};
use crate::task::{TaskHandle, TaskRecord};
use tracing::debug;

/// Thread lifecycle driver around the MLFQ scheduler
pub struct Kernel<R: Runtime, A: AgingPolicy = LinearAging> {
    scheduler: Scheduler<R, A>,
}

impl<R: Runtime, A: AgingPolicy> Kernel<R, A> {
    pub fn new(scheduler: Scheduler<R, A>) -> Self {
        Self { scheduler }
    }

    pub fn scheduler(&self) -> &Scheduler<R, A> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<R, A> {
        &mut self.scheduler
    }

    pub fn into_scheduler(self) -> Scheduler<R, A> {
        self.scheduler
    }

    /// Hand a newly created task to the scheduler and make it ready
    pub fn admit(&mut self, record: TaskRecord) -> SchedulerResult<TaskHandle> {
        let handle = self.scheduler.admit(record)?;
        let now = self.scheduler.now();
        self.scheduler.ready_to_run(handle, now)?;
        Ok(handle)
    }

    /// Timer interrupt callback
    ///
    /// Drains deferred cleanup, ages waiting tasks, and preempts the running
    /// task when the preemption decision says so. An idle CPU picks up any
    /// task that became ready since the last tick.
    pub fn on_tick(&mut self) -> SchedulerResult<()> {
        let now = self.scheduler.now();
        let span = span_scheduling("on_tick", now);
        let _guard = span.enter();
        self.scheduler.reclaim_pending()?;

        if self.scheduler.current().is_none() {
            self.scheduler.update_queues(now)?;
            if let Some(next) = self.scheduler.find_next_to_run()? {
                self.scheduler.run(next, false)?;
            }
            return Ok(());
        }

        if self.scheduler.update_and_maybe_yield(now)? {
            self.yield_cpu()?;
        }
        Ok(())
    }

    /// Put the running task back in its ready queue and dispatch the best task
    ///
    /// Returns the task now holding the CPU, which may be the same one.
    pub fn yield_cpu(&mut self) -> SchedulerResult<TaskHandle> {
        let now = self.scheduler.now();
        let current = self.scheduler.charge_current(now)?;
        self.scheduler.ready_to_run(current, now)?;

        let next = self.scheduler.find_next_to_run()?.ok_or_else(|| {
            SchedulerError::InvalidState("ready queues empty after re-enqueue".into())
        })?;
        self.scheduler.run(next, false)?;
        Ok(next)
    }

    /// Block the running task until [`Kernel::wake`] is called for it
    ///
    /// Closes the task's CPU burst and refines its next-burst estimate.
    pub fn sleep(&mut self) -> SchedulerResult<TaskHandle> {
        let now = self.scheduler.now();
        let span = span_scheduling("sleep", now);
        let _guard = span.enter();
        let current = self.scheduler.charge_current(now)?;

        let record = self.scheduler.task_mut(current)?;
        let (previous, updated) = record.complete_burst();
        record.set_status(TaskStatus::Blocked);
        debug!(
            tick = now,
            task = %record.id(),
            previous_estimate = previous,
            updated_estimate = updated,
            "Burst estimate updated"
        );

        self.dispatch_next(false)?;
        Ok(current)
    }

    /// Terminate the running task; its record is released after the handoff
    pub fn finish(&mut self) -> SchedulerResult<TaskHandle> {
        let now = self.scheduler.now();
        let span = span_scheduling("finish", now);
        let _guard = span.enter();
        let current = self.scheduler.charge_current(now)?;
        self.scheduler.task_mut(current)?.set_status(TaskStatus::Finished);

        self.dispatch_next(true)?;
        Ok(current)
    }

    /// Move a blocked task back to the ready queues
    pub fn wake(&mut self, handle: TaskHandle) -> SchedulerResult<()> {
        let record = self.scheduler.task(handle)?;
        if record.status() != TaskStatus::Blocked {
            return Err(SchedulerError::InvalidState(format!(
                "task {} is {}, not blocked",
                record.id(),
                record.status()
            )));
        }
        let now = self.scheduler.now();
        self.scheduler.ready_to_run(handle, now)
    }

    fn dispatch_next(&mut self, finishing: bool) -> SchedulerResult<()> {
        match self.scheduler.find_next_to_run()? {
            Some(next) => self.scheduler.run(next, finishing),
            None => self.scheduler.run_idle(finishing),
        }
    }
}
