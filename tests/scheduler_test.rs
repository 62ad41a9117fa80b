/*!
 * Scheduler Tests
 * Dispatch order, preemption, and lifecycle scenarios across the three tiers
 */

use mlfq_kernel::{
    Kernel, Scheduler, SchedulerError, SimulatedRuntime, TaskContext, TaskHandle, TaskId,
    TaskRecord, TaskStatus, Tier,
};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

/// Context that counts how often the scheduler saves and restores it
#[derive(Debug, Default, Clone)]
struct CountingContext {
    saves: Rc<Cell<u32>>,
    restores: Rc<Cell<u32>>,
}

impl TaskContext for CountingContext {
    fn save_state(&mut self) {
        self.saves.set(self.saves.get() + 1);
    }

    fn restore_state(&mut self) {
        self.restores.set(self.restores.get() + 1);
    }
}

fn kernel() -> Kernel<SimulatedRuntime> {
    Kernel::new(Scheduler::new(SimulatedRuntime::new()))
}

fn ready(
    scheduler: &mut Scheduler<SimulatedRuntime>,
    id: u32,
    priority: i32,
    burst: f64,
) -> TaskHandle {
    let handle = scheduler
        .admit(TaskRecord::new(id, format!("task-{}", id), priority, burst))
        .unwrap();
    let now = scheduler.now();
    scheduler.ready_to_run(handle, now).unwrap();
    handle
}

#[test]
fn test_tier_precedence_dispatch_order() {
    let mut scheduler = Scheduler::new(SimulatedRuntime::new());
    let a = ready(&mut scheduler, 1, 10, 5.0);
    let b = ready(&mut scheduler, 2, 60, 3.0);
    let c = ready(&mut scheduler, 3, 120, 2.0);

    let mut order = Vec::new();
    while let Some(next) = scheduler.find_next_to_run().unwrap() {
        order.push(next);
    }
    assert_eq!(order, vec![c, b, a]);
}

#[test]
fn test_dispatch_order_through_runtime() {
    let mut kernel = kernel();
    let log = kernel.scheduler().runtime().switch_log();
    kernel.admit(TaskRecord::new(1, "A", 10, 5.0)).unwrap();
    kernel.admit(TaskRecord::new(2, "B", 60, 3.0)).unwrap();
    kernel.admit(TaskRecord::new(3, "C", 120, 2.0)).unwrap();

    kernel.on_tick().unwrap();
    kernel.scheduler_mut().runtime_mut().advance(2);
    kernel.finish().unwrap();
    kernel.scheduler_mut().runtime_mut().advance(3);
    kernel.finish().unwrap();
    kernel.scheduler_mut().runtime_mut().advance(5);
    kernel.finish().unwrap();

    assert_eq!(log.dispatch_order(), vec![TaskId(3), TaskId(2), TaskId(1)]);
    assert_eq!(kernel.scheduler().current(), None);
}

#[test]
fn test_tier3_quantum_expiry_yields() {
    let mut scheduler = Scheduler::new(SimulatedRuntime::new());
    let a = ready(&mut scheduler, 1, 10, 500.0);
    let next = scheduler.find_next_to_run().unwrap().unwrap();
    scheduler.run(next, false).unwrap();
    assert_eq!(next, a);

    scheduler.runtime_mut().advance(100);
    assert!(scheduler.update_and_maybe_yield(100).unwrap());
}

#[test]
fn test_tier1_shortest_remaining_preemption() {
    let mut kernel = kernel();
    let log = kernel.scheduler().runtime().switch_log();
    let first = kernel.admit(TaskRecord::new(1, "long", 120, 4.0)).unwrap();
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(first));

    kernel.scheduler_mut().runtime_mut().advance(1);
    let second = kernel.admit(TaskRecord::new(2, "short", 110, 2.0)).unwrap();
    assert!(kernel.scheduler_mut().update_and_maybe_yield(1).unwrap());

    assert_eq!(kernel.yield_cpu().unwrap(), second);
    assert_eq!(kernel.scheduler().current(), Some(second));
    assert_eq!(log.dispatch_order(), vec![TaskId(1), TaskId(2)]);

    // The preempted task was charged one tick and requeued in Tier1
    let preempted = kernel.scheduler().task(first).unwrap();
    assert_eq!(preempted.remaining_burst(), 3.0);
    assert_eq!(preempted.queued_in(), Some(Tier::Tier1));
}

#[test]
fn test_tier2_runs_until_tier1_arrives() {
    let mut kernel = kernel();
    let mid = kernel.admit(TaskRecord::new(1, "mid", 80, 50.0)).unwrap();
    kernel.admit(TaskRecord::new(2, "peer", 90, 50.0)).unwrap();
    kernel.on_tick().unwrap();

    // A higher-priority Tier2 peer does not preempt
    assert_eq!(kernel.scheduler().task(mid).unwrap().queued_in(), Some(Tier::Tier2));
    let running = kernel.scheduler().current().unwrap();
    assert_eq!(kernel.scheduler().task(running).unwrap().id(), TaskId(2));

    for tick in 1..=300 {
        kernel.scheduler_mut().runtime_mut().advance(1);
        kernel.on_tick().unwrap();
        assert_eq!(kernel.scheduler().current(), Some(running), "tick {}", tick);
    }

    let urgent = kernel.admit(TaskRecord::new(3, "urgent", 140, 1.0)).unwrap();
    kernel.scheduler_mut().runtime_mut().advance(1);
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(urgent));
}

#[test]
fn test_finish_reclaims_on_next_cycle() {
    let mut kernel = kernel();
    let a = kernel.admit(TaskRecord::new(1, "a", 60, 2.0)).unwrap();
    let b = kernel.admit(TaskRecord::new(2, "b", 60, 2.0)).unwrap();
    kernel.on_tick().unwrap();

    kernel.scheduler_mut().runtime_mut().advance(2);
    kernel.finish().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(b));
    assert_eq!(kernel.scheduler().pending_reclaim(), Some(a));
    assert_eq!(kernel.scheduler().task(a).unwrap().status(), TaskStatus::Finished);

    kernel.scheduler_mut().runtime_mut().advance(1);
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().pending_reclaim(), None);
    assert!(matches!(
        kernel.scheduler().task(a),
        Err(SchedulerError::StaleHandle(_))
    ));
    assert_eq!(kernel.scheduler().stats().reclaimed, 1);
}

#[test]
fn test_idle_when_nothing_ready() {
    let mut kernel = kernel();
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), None);
    assert_eq!(kernel.scheduler().runtime().switch_log().len(), 0);
}

#[test]
fn test_invalid_priority_is_fatal() {
    let mut kernel = kernel();
    let err = kernel.admit(TaskRecord::new(1, "bad", 150, 1.0)).unwrap_err();
    assert_eq!(
        err,
        SchedulerError::InvalidPriority {
            task: TaskId(1),
            priority: 150
        }
    );
}

#[test]
fn test_print_state_reflects_queues() {
    let mut scheduler = Scheduler::new(SimulatedRuntime::new());
    ready(&mut scheduler, 1, 10, 5.0);
    ready(&mut scheduler, 2, 60, 3.0);
    ready(&mut scheduler, 3, 75, 3.0);
    let next = scheduler.find_next_to_run().unwrap().unwrap();
    scheduler.run(next, false).unwrap();

    let snapshot = scheduler.print_state().unwrap();
    assert_eq!(snapshot.current.as_ref().map(|t| t.id), Some(TaskId(3)));
    assert_eq!(snapshot.current_tier, Tier::Tier2);
    assert_eq!(snapshot.queued_ids(Tier::Tier2), vec![TaskId(2)]);
    assert_eq!(snapshot.queued_ids(Tier::Tier3), vec![TaskId(1)]);
}

#[test]
fn test_context_saved_and_restored_across_rotation() {
    let mut kernel = kernel();
    let context = CountingContext::default();
    let user = kernel
        .admit(TaskRecord::new(1, "user", 10, 500.0).with_context(Box::new(context.clone())))
        .unwrap();
    let other = kernel.admit(TaskRecord::new(2, "kernel", 20, 500.0)).unwrap();

    // First dispatch restores the incoming task only
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(user));
    assert_eq!((context.saves.get(), context.restores.get()), (0, 1));

    // Quantum expiry: the outgoing task's state is saved
    kernel.scheduler_mut().runtime_mut().advance(100);
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(other));
    assert_eq!((context.saves.get(), context.restores.get()), (1, 1));

    // Re-dispatched after the other task's quantum
    kernel.scheduler_mut().runtime_mut().advance(100);
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(user));
    assert_eq!((context.saves.get(), context.restores.get()), (1, 2));

    // Rotated out again
    kernel.scheduler_mut().runtime_mut().advance(100);
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(other));
    assert_eq!((context.saves.get(), context.restores.get()), (2, 2));
}

#[test]
fn test_reselected_task_keeps_context_on_cpu() {
    let mut kernel = kernel();
    let context = CountingContext::default();
    let solo = kernel
        .admit(TaskRecord::new(1, "solo", 10, 500.0).with_context(Box::new(context.clone())))
        .unwrap();
    kernel.on_tick().unwrap();

    kernel.scheduler_mut().runtime_mut().advance(100);
    kernel.on_tick().unwrap();
    assert_eq!(kernel.scheduler().current(), Some(solo));
    assert_eq!(kernel.scheduler().dispatch_tick(), 100);
    assert_eq!((context.saves.get(), context.restores.get()), (0, 1));
}
