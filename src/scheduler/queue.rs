/*!
 * Ready Queue
 * Ordered container of task handles with a pluggable ordering predicate
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::task::{TaskHandle, TaskRecord, TaskTable};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Ordering predicate: `Less` means `a` runs before `b`
pub type OrderFn = fn(&TaskRecord, &TaskRecord) -> Ordering;

/// Shortest remaining burst first
pub fn by_remaining_burst(a: &TaskRecord, b: &TaskRecord) -> Ordering {
    a.remaining_burst().total_cmp(&b.remaining_burst())
}

/// Highest priority first
pub fn by_priority(a: &TaskRecord, b: &TaskRecord) -> Ordering {
    b.priority().cmp(&a.priority())
}

/// Arrival order only
pub fn fifo(_: &TaskRecord, _: &TaskRecord) -> Ordering {
    Ordering::Equal
}

/// Ready queue holding handles sorted by its ordering predicate
///
/// Insertion is stable: a task is placed after every member that does not
/// order strictly after it, so equal keys keep FIFO order.
///
/// # Performance
/// - O(1) `remove_front`
/// - O(n) `insert` and `remove`, with an O(1) fast path for appends
#[derive(Debug)]
pub struct ReadyQueue {
    label: &'static str,
    order: OrderFn,
    entries: VecDeque<TaskHandle>,
}

impl ReadyQueue {
    pub fn new(label: &'static str, order: OrderFn) -> Self {
        Self {
            label,
            order,
            entries: VecDeque::new(),
        }
    }

    /// Place a task according to the ordering predicate
    pub fn insert(&mut self, handle: TaskHandle, tasks: &TaskTable) -> SchedulerResult<()> {
        let record = tasks.get(handle)?;
        if self.contains(handle) {
            return Err(SchedulerError::AlreadyQueued {
                task: record.id(),
                queue: self.label.into(),
            });
        }

        if let Some(&back) = self.entries.back() {
            if (self.order)(tasks.get(back)?, record) != Ordering::Greater {
                self.entries.push_back(handle);
                return Ok(());
            }
        }

        let mut position = self.entries.len();
        for (index, &member) in self.entries.iter().enumerate() {
            if (self.order)(tasks.get(member)?, record) == Ordering::Greater {
                position = index;
                break;
            }
        }
        self.entries.insert(position, handle);
        Ok(())
    }

    /// Pop the head of the queue, `None` when empty
    #[inline]
    pub fn remove_front(&mut self) -> Option<TaskHandle> {
        self.entries.pop_front()
    }

    /// Delete an arbitrary member
    pub fn remove(&mut self, handle: TaskHandle, tasks: &TaskTable) -> SchedulerResult<()> {
        match self.entries.iter().position(|&member| member == handle) {
            Some(index) => {
                self.entries.remove(index);
                Ok(())
            }
            None => Err(SchedulerError::NotQueued {
                task: tasks.get(handle)?.id(),
                queue: self.label.into(),
            }),
        }
    }

    #[inline]
    pub fn front(&self) -> Option<TaskHandle> {
        self.entries.front().copied()
    }

    #[inline]
    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.entries.contains(&handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Members in queue order
    pub fn iter(&self) -> impl Iterator<Item = TaskHandle> + '_ {
        self.entries.iter().copied()
    }
}
