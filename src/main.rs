/*!
 * MLFQ Kernel - Main Entry Point
 *
 * Runs a scripted workload through the scheduler on the simulated runtime
 * and prints the switch history and statistics as JSON.
 *
 * Usage: kernel [workload.json]
 */

use anyhow::Context;
use tracing::info;

use mlfq_kernel::{init_tracing, SchedulerConfig, Simulation, Workload};

// Upper bound on simulated time for the demo run
const MAX_TICKS: u64 = 100_000;

fn demo_workload() -> Vec<Workload> {
    vec![
        Workload::new(1, "shell", 120).bursts([3, 2, 4]).io_wait(20),
        Workload::new(2, "compiler", 70).bursts([250, 180]).io_wait(40),
        Workload::new(3, "indexer", 20).bursts([600]),
        Workload::new(4, "backup", 5).arriving_at(50).bursts([400]),
        Workload::new(5, "editor", 110).arriving_at(120).bursts([6, 6, 6]).io_wait(15),
    ]
}

fn load_workload(path: &str) -> anyhow::Result<Vec<Workload>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workload file {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("invalid workload file {}", path))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("MLFQ kernel starting...");
    let config = SchedulerConfig::from_env()?;

    let workloads = match std::env::args().nth(1) {
        Some(path) => load_workload(&path)?,
        None => demo_workload(),
    };
    info!(tasks = workloads.len(), "Workload loaded");

    let mut simulation = Simulation::with_config(config)?;
    for workload in workloads {
        simulation.add(workload)?;
    }

    let report = simulation.run(MAX_TICKS)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.unfinished > 0 {
        anyhow::bail!(
            "{} task(s) still running after {} ticks",
            report.unfinished,
            report.ticks
        );
    }
    Ok(())
}
