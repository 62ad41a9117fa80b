/*!
 * Simulated Runtime
 * Deterministic tick clock that records every context switch
 */

use super::Runtime;
use crate::core::types::{TaskId, Tick};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

/// One handoff performed through the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchEvent {
    pub tick: Tick,
    pub from: Option<TaskId>,
    pub to: Option<TaskId>,
}

/// Shared view of the switch history
///
/// Cloned handles observe the same history, so callers can keep one while
/// the scheduler owns the runtime.
#[derive(Debug, Clone, Default)]
pub struct SwitchLog {
    events: Arc<Mutex<Vec<SwitchEvent>>>,
}

impl SwitchLog {
    fn record(&self, event: SwitchEvent) {
        self.events.lock().push(event);
    }

    /// Copy of all recorded switches in order
    pub fn events(&self) -> Vec<SwitchEvent> {
        self.events.lock().clone()
    }

    /// Tasks that were handed the CPU, in order, skipping idle handoffs
    pub fn dispatch_order(&self) -> Vec<TaskId> {
        self.events.lock().iter().filter_map(|e| e.to).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

/// Runtime whose clock only moves when told to
#[derive(Debug, Default)]
pub struct SimulatedRuntime {
    clock: Tick,
    log: SwitchLog,
}

impl SimulatedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at a given tick
    pub fn starting_at(tick: Tick) -> Self {
        Self {
            clock: tick,
            log: SwitchLog::default(),
        }
    }

    /// Move the clock forward
    pub fn advance(&mut self, ticks: Tick) -> Tick {
        self.clock += ticks;
        self.clock
    }

    /// Handle to the switch history
    pub fn switch_log(&self) -> SwitchLog {
        self.log.clone()
    }
}

impl Runtime for SimulatedRuntime {
    fn current_tick(&self) -> Tick {
        self.clock
    }

    fn context_switch(&mut self, from: Option<TaskId>, to: Option<TaskId>) {
        trace!(tick = self.clock, ?from, ?to, "context switch");
        self.log.record(SwitchEvent {
            tick: self.clock,
            from,
            to,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let mut runtime = SimulatedRuntime::starting_at(10);
        assert_eq!(runtime.current_tick(), 10);
        assert_eq!(runtime.advance(5), 15);
        assert_eq!(runtime.current_tick(), 15);
    }

    #[test]
    fn test_switch_log_is_shared() {
        let mut runtime = SimulatedRuntime::new();
        let log = runtime.switch_log();

        runtime.context_switch(None, Some(TaskId(1)));
        runtime.advance(3);
        runtime.context_switch(Some(TaskId(1)), None);

        assert_eq!(log.len(), 2);
        assert_eq!(log.dispatch_order(), vec![TaskId(1)]);
        assert_eq!(
            log.events()[1],
            SwitchEvent {
                tick: 3,
                from: Some(TaskId(1)),
                to: None
            }
        );
    }
}
