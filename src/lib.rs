/*!
 * MLFQ Kernel Library
 * Three-tier multilevel feedback queue scheduler for a single-CPU teaching kernel
 */

pub mod core;
pub mod kernel;
pub mod monitoring;
pub mod runtime;
pub mod scheduler;
pub mod task;

// Re-exports
pub use crate::core::{
    Priority, SchedulerConfig, SchedulerError, SchedulerResult, TaskId, TaskStatus, Tick,
};
pub use kernel::{Kernel, Simulation, SimulationReport, Workload};
pub use monitoring::init_tracing;
pub use runtime::{Runtime, SimulatedRuntime, SwitchEvent, SwitchLog};
pub use scheduler::{AgingPolicy, LinearAging, Scheduler, SchedulerSnapshot, SchedulerStats, Tier};
pub use task::{TaskContext, TaskHandle, TaskRecord, TaskTable};
