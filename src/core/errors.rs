/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Priority, TaskId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler errors
///
/// Every variant is fatal to the kernel: the scheduler detects its own
/// inconsistencies but never attempts to continue past them.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Task {task} has priority {priority} outside [0, 150)")]
    #[diagnostic(
        code(scheduler::invalid_priority),
        help("Priority must be between 0 and 149 so the task can be placed in a tier.")
    )]
    InvalidPriority { task: TaskId, priority: Priority },

    #[error("Task {task} is not a member of ready queue {queue}")]
    #[diagnostic(
        code(scheduler::not_queued),
        help("The ready queues are inconsistent with the task table.")
    )]
    NotQueued { task: TaskId, queue: String },

    #[error("Task {task} is already in ready queue {queue}")]
    #[diagnostic(
        code(scheduler::double_insert),
        help("A task may be a member of at most one ready queue at a time.")
    )]
    AlreadyQueued { task: TaskId, queue: String },

    #[error("Task {pending} is still awaiting reclamation while task {task} finishes")]
    #[diagnostic(
        code(scheduler::reclaim_pending),
        help("The deferred-cleanup slot holds one task; it must drain before the next finish.")
    )]
    ReclaimPending { pending: TaskId, task: TaskId },

    #[error("Task handle {0} does not refer to a live task")]
    #[diagnostic(
        code(scheduler::stale_handle),
        help("The task was reclaimed or the handle was never issued by this table.")
    )]
    StaleHandle(String),

    #[error("Invalid task state: {0}")]
    #[diagnostic(
        code(scheduler::invalid_state),
        help("Operation cannot be performed in the task's current status.")
    )]
    InvalidState(String),

    #[error("Invalid scheduler configuration: {0}")]
    #[diagnostic(
        code(scheduler::invalid_config),
        help("Check quantum and aging parameters and the KERNEL_* environment overrides.")
    )]
    InvalidConfig(String),
}

/// Result alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SchedulerError::InvalidPriority {
            task: TaskId(4),
            priority: 150,
        };
        assert_eq!(err.to_string(), "Task 4 has priority 150 outside [0, 150)");

        let err = SchedulerError::ReclaimPending {
            pending: TaskId(1),
            task: TaskId(2),
        };
        assert!(err.to_string().contains("awaiting reclamation"));
    }

    #[test]
    fn test_error_serialization() {
        let err = SchedulerError::NotQueued {
            task: TaskId(9),
            queue: "L2".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error_type"], "not_queued");
        assert_eq!(json["details"]["task"], 9);

        let back: SchedulerError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }
}
