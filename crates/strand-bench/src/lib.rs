//! Benchmark profiles and utilities for the strand process simulator.
//!
//! Provides pre-built workloads for benchmarks and examples:
//!
//! - [`reference_model`]: seeded 8-state random chain
//! - [`emission_model`]: deterministic hidden-to-symbol emission matrix
//! - [`reference_network`]: hidden chain, emitter and a slow observer,
//!   ready for a [`Scheduler`](strand_engine::Scheduler)
//! - [`branch_fan`]: a set of branches of one parent, half of them
//!   forced onto a different next state

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use strand_core::{IdAllocator, ValidationError};
use strand_engine::{Node, SchedulerConfig};
use strand_log::SharedLog;
use strand_model::{InitialState, TransitionModel};
use strand_process::{BranchOverrides, ProcessInstance};

/// State count of [`reference_model`].
pub const REFERENCE_STATES: usize = 8;

/// Symbol count of the emitter in [`reference_network`].
pub const REFERENCE_SYMBOLS: usize = 5;

/// Seeded random chain with [`REFERENCE_STATES`] states.
pub fn reference_model(seed: u64) -> Result<Arc<TransitionModel>, ValidationError> {
    TransitionModel::random(REFERENCE_STATES, Some(seed)).map(Arc::new)
}

/// Rectangular `hidden x symbols` emission model with fixed, uneven weights.
///
/// Unseeded: dependent instances draw from their own stream anyway.
pub fn emission_model(
    hidden: usize,
    symbols: usize,
) -> Result<Arc<TransitionModel>, ValidationError> {
    let rows: Vec<Vec<f64>> = (0..hidden)
        .map(|i| {
            (0..symbols)
                .map(|j| 1.0 + ((i * 7 + j * 3) % 5) as f64)
                .collect()
        })
        .collect();
    TransitionModel::rectangular(&rows, InitialState::Fixed(0), None).map(Arc::new)
}

/// Three-node network: a hidden chain stepping every tick, an emitter
/// depending on it, and an independent observer stepping every 4th tick.
///
/// Every instance is subscribed to `log` when one is given.
pub fn reference_network(
    seed: u64,
    ids: &IdAllocator,
    log: Option<&SharedLog>,
) -> Result<SchedulerConfig, ValidationError> {
    let model = reference_model(seed)?;
    let mut hidden = ProcessInstance::endless(Arc::clone(&model), ids)?;
    let mut emitter =
        ProcessInstance::dependent(emission_model(REFERENCE_STATES, REFERENCE_SYMBOLS)?, &hidden, ids)?;
    let mut observer = ProcessInstance::builder(model)
        .seed(seed.wrapping_add(1))
        .build(ids)?;
    if let Some(log) = log {
        log.open(&mut hidden);
        log.open(&mut emitter);
        log.open(&mut observer);
    }
    Ok(SchedulerConfig {
        nodes: vec![
            Node::every_tick(hidden),
            Node::every_tick(emitter),
            Node::periodic(observer, 4, 0),
        ],
        stop_when_exhausted: false,
    })
}

/// `width` branches of `parent`. Odd-numbered branches are forced onto
/// the state after the parent's current one, so they diverge at once.
pub fn branch_fan(
    parent: &ProcessInstance,
    width: usize,
) -> Result<Vec<ProcessInstance>, ValidationError> {
    let states = parent.model().output_size();
    let shifted = parent.state().map_or(0, |s| (s + 1) % states);
    (0..width)
        .map(|i| {
            let overrides = if i % 2 == 1 {
                BranchOverrides::state(shifted)
            } else {
                BranchOverrides::default()
            };
            parent.branch(&overrides)
        })
        .collect()
}
