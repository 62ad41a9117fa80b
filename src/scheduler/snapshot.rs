/*!
 * Scheduler Snapshot
 * Diagnostic dump of the running task and ready queue contents
 */

use super::{AgingPolicy, Scheduler, Tier};
use crate::core::errors::SchedulerResult;
use crate::core::types::{Priority, TaskId, TaskStatus, Tick};
use crate::runtime::Runtime;
use crate::task::TaskRecord;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Point-in-time view of one task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub priority: Priority,
    pub remaining_burst: f64,
    pub status: TaskStatus,
    pub wait_since: Tick,
}

impl From<&TaskRecord> for TaskView {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: record.id(),
            name: record.name().to_string(),
            priority: record.priority(),
            remaining_burst: record.remaining_burst(),
            status: record.status(),
            wait_since: record.wait_since(),
        }
    }
}

/// One tier's queue in dispatch order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierView {
    pub tier: Tier,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerSnapshot {
    pub tick: Tick,
    pub current: Option<TaskView>,
    pub current_tier: Tier,
    pub pending_reclaim: Option<TaskId>,
    pub tiers: Vec<TierView>,
}

impl SchedulerSnapshot {
    /// Ids queued in a tier, head first
    pub fn queued_ids(&self, tier: Tier) -> Vec<TaskId> {
        self.tiers
            .iter()
            .find(|view| view.tier == tier)
            .map(|view| view.tasks.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for SchedulerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}: running ", self.tick)?;
        match &self.current {
            Some(task) => writeln!(f, "{} ({}) from {}", task.id, task.name, self.current_tier)?,
            None => writeln!(f, "idle")?,
        }
        for view in &self.tiers {
            write!(f, "{} contents:", view.tier)?;
            for task in &view.tasks {
                // L1 is keyed on burst, the others on priority
                if view.tier == Tier::Tier1 {
                    write!(f, " {}[burst={:.1}]", task.id, task.remaining_burst)?;
                } else {
                    write!(f, " {}[prio={}]", task.id, task.priority)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<R: Runtime, A: AgingPolicy> Scheduler<R, A> {
    /// Capture the running task and every ready queue in order
    pub fn snapshot(&self) -> SchedulerResult<SchedulerSnapshot> {
        let current = match self.current {
            Some(handle) => Some(TaskView::from(self.tasks.get(handle)?)),
            None => None,
        };
        let pending_reclaim = match self.pending_reclaim {
            Some(handle) => Some(self.tasks.get(handle)?.id()),
            None => None,
        };

        let mut tiers = Vec::with_capacity(Tier::ALL.len());
        for tier in Tier::ALL {
            let mut tasks = Vec::with_capacity(self.queue(tier).len());
            for handle in self.queue(tier).iter() {
                tasks.push(TaskView::from(self.tasks.get(handle)?));
            }
            tiers.push(TierView { tier, tasks });
        }

        Ok(SchedulerSnapshot {
            tick: self.runtime.current_tick(),
            current,
            current_tier: self.current_tier,
            pending_reclaim,
            tiers,
        })
    }

    /// Log the queue contents and return them
    pub fn print_state(&self) -> SchedulerResult<SchedulerSnapshot> {
        let snapshot = self.snapshot()?;
        info!("Scheduler state\n{}", snapshot);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::SimulatedRuntime;

    #[test]
    fn test_snapshot_lists_queues_in_order() {
        let mut scheduler = Scheduler::new(SimulatedRuntime::new());
        for (id, priority, burst) in [(1, 10, 5.0), (2, 120, 4.0), (3, 120, 1.0), (4, 70, 2.0)] {
            let handle = scheduler
                .admit(TaskRecord::new(id, format!("t{}", id), priority, burst))
                .unwrap();
            scheduler.ready_to_run(handle, 0).unwrap();
        }

        let snapshot = scheduler.print_state().unwrap();
        assert_eq!(snapshot.current, None);
        assert_eq!(snapshot.queued_ids(Tier::Tier1), vec![TaskId(3), TaskId(2)]);
        assert_eq!(snapshot.queued_ids(Tier::Tier2), vec![TaskId(4)]);
        assert_eq!(snapshot.queued_ids(Tier::Tier3), vec![TaskId(1)]);

        let text = snapshot.to_string();
        assert!(text.contains("running idle"));
        assert!(text.contains("L1 contents: 3[burst=1.0] 2[burst=4.0]"));
        assert!(text.contains("L3 contents: 1[prio=10]"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let scheduler = Scheduler::new(SimulatedRuntime::new());
        let json = serde_json::to_value(scheduler.snapshot().unwrap()).unwrap();
        assert_eq!(json["current_tier"], "tier3");
        assert_eq!(json["tiers"].as_array().unwrap().len(), 3);
    }
}
