//! End-to-end branching walk example.
//!
//! Demonstrates: reference network → scheduler → record into a shared
//! log → branch the hidden chain twice → compare playback and storage →
//! refit the transition model from recorded history.
//!
//! Set `RUST_LOG=debug` (or `trace`) to watch branch and put events.

use std::error::Error;

use strand_bench::{reference_network, REFERENCE_STATES};
use strand_core::IdAllocator;
use strand_engine::Scheduler;
use strand_log::SharedLog;
use strand_model::FitWeights;
use strand_process::BranchOverrides;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    println!("=== strand branching walk ===\n");

    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut scheduler = Scheduler::new(reference_network(42, &ids, Some(&log))?)?;

    let report = scheduler.forward(200)?;
    println!(
        "network: {} ticks, {} advances in {}μs",
        report.ticks, report.advances, report.elapsed_us
    );

    let hidden = scheduler
        .instances()
        .next()
        .ok_or("network has no hidden chain")?;
    let hidden_id = hidden.id();
    let current = hidden.state().ok_or("hidden chain has not started")?;

    // One faithful copy and one pushed onto a different next state.
    let mut twin = hidden.branch(&BranchOverrides::default())?;
    let mut rebel = hidden.branch(&BranchOverrides::state((current + 1) % REFERENCE_STATES))?;
    twin.skip(100)?;
    rebel.skip(100)?;
    scheduler.forward(100)?;

    let original = log.playback_vec(hidden_id).ok_or("hidden chain not recorded")?;
    let twin_seq = log.playback_vec(twin.id()).ok_or("twin not recorded")?;
    let rebel_seq = log.playback_vec(rebel.id()).ok_or("rebel not recorded")?;
    let diverged = original
        .iter()
        .zip(&rebel_seq)
        .position(|(a, b)| a != b)
        .unwrap_or(original.len());
    println!("\nbranches of instance {hidden_id} at step 200:");
    println!("  twin  identical to parent: {}", twin_seq == original);
    println!("  rebel diverges at step:    {diverged}");

    let stats = log.stats();
    println!(
        "\nlog: {} instances, {} raw states in {} segments, {} referenced states",
        stats.instances, stats.raw_states, stats.raw_segments, stats.ref_states
    );

    let pairs = log
        .count(hidden_id, &[2], None)
        .ok_or("hidden chain not recorded")?;
    let top = pairs.iter().max_by_key(|(_, n)| **n);
    if let Some((pattern, n)) = top {
        println!("most frequent transition: {:?} ({n} times)", pattern.as_slice());
    }

    let model = scheduler
        .instance(hidden_id)
        .ok_or("hidden chain missing")?
        .model();
    let refit = model.fit(
        original.windows(2).map(|w| (w[0], w[1])),
        FitWeights {
            prior: 1.0,
            observed: 1.0,
        },
    )?;
    let drift: f64 = model
        .to_rows()
        .iter()
        .flatten()
        .zip(refit.to_rows().iter().flatten())
        .map(|(a, b)| (a - b).abs())
        .sum();
    println!("refit drift from the generating model: {drift:.4}");

    println!("\nDone.");
    Ok(())
}
