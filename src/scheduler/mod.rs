/*!
 * MLFQ Scheduler
 * Three-tier multilevel feedback queue for a single processor
 */

use crate::core::config::SchedulerConfig;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::Tick;
use crate::runtime::Runtime;
use crate::task::{TaskHandle, TaskRecord, TaskTable};
use tracing::{debug, info};

mod aging;
mod operations;
mod preemption;
pub mod queue;
mod snapshot;
mod stats;
mod tier;

pub use aging::{AgingPolicy, LinearAging};
pub use queue::ReadyQueue;
pub use snapshot::{SchedulerSnapshot, TaskView, TierView};
pub use stats::SchedulerStats;
pub use tier::Tier;

/// MLFQ scheduler context
///
/// Every operation takes `&mut self`; exclusive access stands in for the
/// kernel running scheduler code with interrupts disabled.
pub struct Scheduler<R: Runtime, A: AgingPolicy = LinearAging> {
    tasks: TaskTable,

    // Indexed by `Tier::index`
    queues: [ReadyQueue; 3],

    // Task whose context is on the CPU
    current: Option<TaskHandle>,
    current_tier: Tier,
    dispatch_tick: Tick,

    // Finished task whose record is released on the next scheduling cycle
    pending_reclaim: Option<TaskHandle>,

    quantum: Tick,
    aging: A,
    runtime: R,
    stats: SchedulerStats,
}

impl<R: Runtime> Scheduler<R, LinearAging> {
    /// Create scheduler with default quantum and aging
    pub fn new(runtime: R) -> Self {
        Self::with_aging(runtime, SchedulerConfig::default().quantum, LinearAging::default())
    }

    /// Create scheduler from validated configuration
    pub fn with_config(runtime: R, config: SchedulerConfig) -> SchedulerResult<Self> {
        config.validate()?;
        Ok(Self::with_aging(
            runtime,
            config.quantum,
            LinearAging::from_config(&config),
        ))
    }
}

impl<R: Runtime, A: AgingPolicy> Scheduler<R, A> {
    /// Create scheduler with a custom aging policy
    pub fn with_aging(runtime: R, quantum: Tick, aging: A) -> Self {
        let dispatch_tick = runtime.current_tick();
        info!(quantum, "MLFQ scheduler initialized");

        Self {
            tasks: TaskTable::new(),
            queues: [
                ReadyQueue::new(Tier::Tier1.label(), queue::by_remaining_burst),
                ReadyQueue::new(Tier::Tier2.label(), queue::by_priority),
                ReadyQueue::new(Tier::Tier3.label(), queue::fifo),
            ],
            current: None,
            current_tier: Tier::Tier3,
            dispatch_tick,
            pending_reclaim: None,
            quantum,
            aging,
            runtime,
            stats: SchedulerStats::default(),
        }
    }

    /// Take ownership of a new task record
    ///
    /// The record is not queued until [`Scheduler::ready_to_run`] is called.
    pub fn admit(&mut self, record: TaskRecord) -> SchedulerResult<TaskHandle> {
        let id = record.id();
        let handle = self.tasks.insert(record)?;
        debug!(task = %id, %handle, "Task admitted");
        Ok(handle)
    }

    pub fn task(&self, handle: TaskHandle) -> SchedulerResult<&TaskRecord> {
        self.tasks.get(handle)
    }

    pub fn tasks(&self) -> &TaskTable {
        &self.tasks
    }

    pub fn queue(&self, tier: Tier) -> &ReadyQueue {
        &self.queues[tier.index()]
    }

    /// Number of tasks waiting in all ready queues
    pub fn ready_len(&self) -> usize {
        self.queues.iter().map(ReadyQueue::len).sum()
    }

    /// Task currently holding the CPU, `None` while idle
    pub fn current(&self) -> Option<TaskHandle> {
        self.current
    }

    /// Tier the running task was dispatched from
    pub fn current_tier(&self) -> Tier {
        self.current_tier
    }

    /// Tick at which the running task's quantum began
    pub fn dispatch_tick(&self) -> Tick {
        self.dispatch_tick
    }

    pub fn pending_reclaim(&self) -> Option<TaskHandle> {
        self.pending_reclaim
    }

    pub fn quantum(&self) -> Tick {
        self.quantum
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Current tick as reported by the runtime
    pub fn now(&self) -> Tick {
        self.runtime.current_tick()
    }

    pub(crate) fn task_mut(&mut self, handle: TaskHandle) -> SchedulerResult<&mut TaskRecord> {
        self.tasks.get_mut(handle)
    }

    /// Insert into a tier's queue and record membership
    fn enqueue(&mut self, handle: TaskHandle, tier: Tier, now: Tick) -> SchedulerResult<()> {
        self.queues[tier.index()].insert(handle, &self.tasks)?;
        let record = self.tasks.get_mut(handle)?;
        record.queued = Some(tier);
        debug!(
            tick = now,
            task = %record.id(),
            queue = %tier,
            priority = record.priority(),
            remaining_burst = record.remaining_burst(),
            "Task inserted into ready queue"
        );
        Ok(())
    }

    /// Remove from a tier's queue and clear membership
    fn dequeue(&mut self, handle: TaskHandle, tier: Tier, now: Tick) -> SchedulerResult<()> {
        self.queues[tier.index()].remove(handle, &self.tasks)?;
        let record = self.tasks.get_mut(handle)?;
        record.queued = None;
        debug!(tick = now, task = %record.id(), queue = %tier, "Task removed from ready queue");
        Ok(())
    }

    fn require_current(&self) -> SchedulerResult<TaskHandle> {
        self.current
            .ok_or_else(|| SchedulerError::InvalidState("no task is running".into()))
    }
}
