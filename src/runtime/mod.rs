/*!
 * Runtime Interface
 * Clock and context-switch primitives the scheduler consumes
 */

mod simulated;

pub use simulated::{SimulatedRuntime, SwitchEvent, SwitchLog};

use crate::core::types::{TaskId, Tick};

/// Machine services supplied to the scheduler
///
/// `context_switch` is atomic and opaque to the scheduler. It returns once
/// the handoff has completed; `to == None` parks the CPU in its idle loop.
pub trait Runtime {
    /// Current timer tick
    fn current_tick(&self) -> Tick;

    /// Hand the CPU from `from` to `to`
    fn context_switch(&mut self, from: Option<TaskId>, to: Option<TaskId>);
}
