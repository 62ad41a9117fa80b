/*!
 * Workload Simulation
 *
 * Drives a kernel on the simulated runtime one tick at a time. Each task
 * alternates CPU bursts with fixed I/O waits and exits after its last burst.
 */

use super::Kernel;
use crate::core::config::SchedulerConfig;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{Priority, TaskId, Tick};
use crate::runtime::{SimulatedRuntime, SwitchEvent, SwitchLog};
use crate::scheduler::{AgingPolicy, LinearAging, Scheduler, SchedulerStats};
use crate::task::{TaskHandle, TaskRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::{debug, info, warn};

/// Scripted task: arrival time, CPU bursts, and I/O wait between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub id: u32,
    pub name: String,
    pub priority: Priority,
    #[serde(default)]
    pub arrival: Tick,
    pub bursts: Vec<Tick>,
    #[serde(default)]
    pub io_wait: Tick,
}

impl Workload {
    pub fn new(id: u32, name: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            arrival: 0,
            bursts: vec![1],
            io_wait: 0,
        }
    }

    pub fn arriving_at(mut self, tick: Tick) -> Self {
        self.arrival = tick;
        self
    }

    pub fn bursts(mut self, bursts: impl IntoIterator<Item = Tick>) -> Self {
        self.bursts = bursts.into_iter().collect();
        self
    }

    pub fn io_wait(mut self, ticks: Tick) -> Self {
        self.io_wait = ticks;
        self
    }

    fn validate(&self) -> SchedulerResult<()> {
        if self.bursts.is_empty() || self.bursts.contains(&0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "workload {} needs at least one non-empty burst",
                self.id
            )));
        }
        Ok(())
    }
}

/// Task exit recorded by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub task: TaskId,
    pub tick: Tick,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub ticks: Tick,
    pub completions: Vec<Completion>,
    pub dispatch_order: Vec<TaskId>,
    pub switches: Vec<SwitchEvent>,
    pub unfinished: usize,
    pub stats: SchedulerStats,
}

impl SimulationReport {
    /// Exit order of the tasks that completed
    pub fn completion_order(&self) -> Vec<TaskId> {
        self.completions.iter().map(|c| c.task).collect()
    }
}

// Actual CPU demand, hidden from the scheduler which only sees estimates
#[derive(Debug)]
struct Demand {
    left_in_burst: Tick,
    later_bursts: VecDeque<Tick>,
    io_wait: Tick,
}

pub struct Simulation<A: AgingPolicy = LinearAging> {
    kernel: Kernel<SimulatedRuntime, A>,
    log: SwitchLog,
    arrivals: BTreeMap<Tick, Vec<Workload>>,
    wakeups: BTreeMap<Tick, Vec<TaskHandle>>,
    demand: HashMap<TaskHandle, Demand>,
    completions: Vec<Completion>,
}

impl Simulation<LinearAging> {
    pub fn new() -> Self {
        Self::with_scheduler(Scheduler::new(SimulatedRuntime::new()))
    }

    pub fn with_config(config: SchedulerConfig) -> SchedulerResult<Self> {
        Ok(Self::with_scheduler(Scheduler::with_config(
            SimulatedRuntime::new(),
            config,
        )?))
    }
}

impl Default for Simulation<LinearAging> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AgingPolicy> Simulation<A> {
    pub fn with_scheduler(scheduler: Scheduler<SimulatedRuntime, A>) -> Self {
        let log = scheduler.runtime().switch_log();
        Self {
            kernel: Kernel::new(scheduler),
            log,
            arrivals: BTreeMap::new(),
            wakeups: BTreeMap::new(),
            demand: HashMap::new(),
            completions: Vec::new(),
        }
    }

    /// Schedule a workload to arrive at its arrival tick
    pub fn add(&mut self, workload: Workload) -> SchedulerResult<()> {
        workload.validate()?;
        self.arrivals.entry(workload.arrival).or_default().push(workload);
        Ok(())
    }

    pub fn kernel(&self) -> &Kernel<SimulatedRuntime, A> {
        &self.kernel
    }

    /// Run until every task has exited or `max_ticks` is reached
    pub fn run(&mut self, max_ticks: Tick) -> SchedulerResult<SimulationReport> {
        loop {
            let now = self.kernel.scheduler().now();
            self.release_arrivals(now)?;
            self.release_wakeups(now)?;
            self.kernel.on_tick()?;

            if self.is_drained() {
                break;
            }
            if now >= max_ticks {
                warn!(tick = now, unfinished = self.demand.len(), "Simulation tick limit reached");
                break;
            }

            self.kernel.scheduler_mut().runtime_mut().advance(1);
            self.consume_tick()?;
        }

        let report = SimulationReport {
            ticks: self.kernel.scheduler().now(),
            completions: self.completions.clone(),
            dispatch_order: self.log.dispatch_order(),
            switches: self.log.events(),
            unfinished: self.demand.len(),
            stats: self.kernel.scheduler().stats(),
        };
        info!(
            ticks = report.ticks,
            completed = report.completions.len(),
            unfinished = report.unfinished,
            context_switches = report.stats.context_switches,
            "Simulation finished"
        );
        Ok(report)
    }

    fn is_drained(&self) -> bool {
        self.kernel.scheduler().current().is_none()
            && self.kernel.scheduler().tasks().is_empty()
            && self.arrivals.is_empty()
            && self.wakeups.is_empty()
    }

    fn release_arrivals(&mut self, now: Tick) -> SchedulerResult<()> {
        while let Some(entry) = self.arrivals.first_entry() {
            if *entry.key() > now {
                break;
            }
            for workload in entry.remove() {
                let mut bursts: VecDeque<Tick> = workload.bursts.iter().copied().collect();
                let first = bursts.pop_front().unwrap_or(1);
                let record = TaskRecord::new(
                    workload.id,
                    workload.name.as_str(),
                    workload.priority,
                    first as f64,
                );

                let handle = self.kernel.admit(record)?;
                debug!(tick = now, task = workload.id, name = %workload.name, "Task arrived");
                self.demand.insert(
                    handle,
                    Demand {
                        left_in_burst: first,
                        later_bursts: bursts,
                        io_wait: workload.io_wait,
                    },
                );
            }
        }
        Ok(())
    }

    fn release_wakeups(&mut self, now: Tick) -> SchedulerResult<()> {
        while let Some(entry) = self.wakeups.first_entry() {
            if *entry.key() > now {
                break;
            }
            for handle in entry.remove() {
                self.kernel.wake(handle)?;
            }
        }
        Ok(())
    }

    // The running task used the tick that just elapsed
    fn consume_tick(&mut self) -> SchedulerResult<()> {
        let Some(handle) = self.kernel.scheduler().current() else {
            return Ok(());
        };
        let demand = self.demand.get_mut(&handle).ok_or_else(|| {
            SchedulerError::InvalidState(format!("running task {} has no workload", handle))
        })?;

        demand.left_in_burst = demand.left_in_burst.saturating_sub(1);
        if demand.left_in_burst > 0 {
            return Ok(());
        }

        let now = self.kernel.scheduler().now();
        match demand.later_bursts.pop_front() {
            Some(next_burst) => {
                demand.left_in_burst = next_burst;
                let wake_at = now + demand.io_wait.max(1);
                self.kernel.sleep()?;
                self.wakeups.entry(wake_at).or_default().push(handle);
            }
            None => {
                let task = self.kernel.scheduler().task(handle)?.id();
                self.demand.remove(&handle);
                self.kernel.finish()?;
                self.completions.push(Completion { task, tick: now });
            }
        }
        Ok(())
    }
}
