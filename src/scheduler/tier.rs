/*!
 * Priority Tiers
 * Classification of priorities into the three ready-queue bands
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::limits::{MIN_PRIORITY, PRIORITY_LIMIT, TIER1_FLOOR, TIER2_FLOOR};
use crate::core::types::Priority;
use crate::task::TaskRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority band, declared in dispatch precedence order (Tier1 first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// `[100, 150)`: shortest remaining burst first
    Tier1,
    /// `[50, 100)`: highest priority first
    Tier2,
    /// `[0, 50)`: round robin
    Tier3,
}

impl Tier {
    /// All tiers in precedence order
    pub const ALL: [Tier; 3] = [Tier::Tier1, Tier::Tier2, Tier::Tier3];

    /// Bucket a priority, or `None` when it is outside `[0, 150)`
    #[inline]
    pub const fn classify(priority: Priority) -> Option<Tier> {
        if priority < MIN_PRIORITY || priority >= PRIORITY_LIMIT {
            None
        } else if priority >= TIER1_FLOOR {
            Some(Tier::Tier1)
        } else if priority >= TIER2_FLOOR {
            Some(Tier::Tier2)
        } else {
            Some(Tier::Tier3)
        }
    }

    /// Bucket a task by its current priority
    pub fn of(record: &TaskRecord) -> SchedulerResult<Tier> {
        Self::classify(record.priority()).ok_or(SchedulerError::InvalidPriority {
            task: record.id(),
            priority: record.priority(),
        })
    }

    /// Queue level as numbered by the kernel (1 is highest)
    #[inline]
    pub const fn level(&self) -> u8 {
        match self {
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
        }
    }

    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Tier1 => "L1",
            Self::Tier2 => "L2",
            Self::Tier3 => "L3",
        }
    }

    #[inline]
    pub(crate) const fn index(&self) -> usize {
        self.level() as usize - 1
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
