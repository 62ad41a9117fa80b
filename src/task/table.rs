/*!
 * Task Table
 * Arena of task records addressed by generational handles
 */

use super::record::TaskRecord;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::TaskId;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Stable reference to a task record
///
/// The generation changes every time a slot is reused, so a handle kept past
/// its task's reclamation is rejected instead of aliasing a newer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TaskHandle {
    index: u32,
    generation: u32,
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    record: Option<TaskRecord>,
}

/// Task record arena with slot recycling
#[derive(Debug, Default)]
pub struct TaskTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    // TaskId -> handle index for lookups by stable id
    by_id: HashMap<TaskId, TaskHandle>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a record, reusing a freed slot when one exists
    pub fn insert(&mut self, record: TaskRecord) -> SchedulerResult<TaskHandle> {
        let id = record.id();
        if self.by_id.contains_key(&id) {
            return Err(SchedulerError::InvalidState(format!(
                "task {} is already registered",
                id
            )));
        }

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.record = Some(record);
                TaskHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                TaskHandle {
                    index,
                    generation: 0,
                }
            }
        };

        self.by_id.insert(id, handle);
        Ok(handle)
    }

    pub fn get(&self, handle: TaskHandle) -> SchedulerResult<&TaskRecord> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_ref())
            .ok_or_else(|| SchedulerError::StaleHandle(handle.to_string()))
    }

    pub fn get_mut(&mut self, handle: TaskHandle) -> SchedulerResult<&mut TaskRecord> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_mut())
            .ok_or_else(|| SchedulerError::StaleHandle(handle.to_string()))
    }

    /// Remove a record and retire its handle
    pub fn release(&mut self, handle: TaskHandle) -> SchedulerResult<TaskRecord> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or_else(|| SchedulerError::StaleHandle(handle.to_string()))?;
        let record = slot
            .record
            .take()
            .ok_or_else(|| SchedulerError::StaleHandle(handle.to_string()))?;

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.by_id.remove(&record.id());
        Ok(record)
    }

    /// Look up the handle of a live task by its stable id
    pub fn find(&self, id: TaskId) -> Option<TaskHandle> {
        self.by_id.get(&id).copied()
    }

    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.get(handle).is_ok()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterate live records in slot order
    pub fn iter(&self) -> impl Iterator<Item = (TaskHandle, &TaskRecord)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.record.as_ref().map(|record| {
                (
                    TaskHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    record,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut table = TaskTable::new();
        let handle = table.insert(TaskRecord::new(1, "a", 10, 1.0)).unwrap();
        assert_eq!(table.get(handle).unwrap().id(), TaskId(1));
        assert_eq!(table.find(TaskId(1)), Some(handle));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut table = TaskTable::new();
        table.insert(TaskRecord::new(1, "a", 10, 1.0)).unwrap();
        let err = table.insert(TaskRecord::new(1, "b", 10, 1.0)).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidState(_)));
    }

    #[test]
    fn test_release_invalidates_handle() {
        let mut table = TaskTable::new();
        let old = table.insert(TaskRecord::new(1, "a", 10, 1.0)).unwrap();
        table.release(old).unwrap();

        assert!(matches!(table.get(old), Err(SchedulerError::StaleHandle(_))));
        assert!(table.release(old).is_err());
        assert!(table.is_empty());

        // The slot is recycled under a new generation
        let new = table.insert(TaskRecord::new(2, "b", 10, 1.0)).unwrap();
        assert_ne!(old, new);
        assert!(table.get(old).is_err());
        assert_eq!(table.get(new).unwrap().id(), TaskId(2));
    }

    #[test]
    fn test_iter_skips_released() {
        let mut table = TaskTable::new();
        let a = table.insert(TaskRecord::new(1, "a", 10, 1.0)).unwrap();
        table.insert(TaskRecord::new(2, "b", 10, 1.0)).unwrap();
        table.release(a).unwrap();

        let ids: Vec<TaskId> = table.iter().map(|(_, r)| r.id()).collect();
        assert_eq!(ids, vec![TaskId(2)]);
    }
}
