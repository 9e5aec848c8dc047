//! [`Scheduler`]: tick-driven driver for a set of instances.

use std::time::Instant;

use strand_core::{InstanceId, StepError};
use strand_process::ProcessInstance;
use tracing::{debug, info};

use crate::config::{ConfigError, Node, SchedulerConfig};
use crate::metrics::ForwardReport;

/// Advances a fixed set of process instances in lock step.
///
/// Created from a [`SchedulerConfig`] via [`new`](Self::new). Each
/// [`forward`](Self::forward) call runs a number of ticks; within a tick,
/// nodes fire in configuration order.
///
/// # Example
///
/// ```
/// use strand_core::IdAllocator;
/// use strand_engine::{Node, Scheduler, SchedulerConfig};
/// use strand_model::{InitialState, TransitionModel};
/// use strand_process::ProcessInstance;
/// use std::sync::Arc;
///
/// let ids = IdAllocator::new();
/// let model = Arc::new(
///     TransitionModel::new(&[[0.0, 1.0], [1.0, 0.0]], InitialState::Fixed(0), None).unwrap(),
/// );
/// let fast = ProcessInstance::endless(Arc::clone(&model), &ids).unwrap();
/// let slow = ProcessInstance::endless(model, &ids).unwrap();
/// let (fast_id, slow_id) = (fast.id(), slow.id());
///
/// let mut scheduler = Scheduler::new(SchedulerConfig {
///     nodes: vec![Node::every_tick(fast), Node::periodic(slow, 2, 0)],
///     stop_when_exhausted: false,
/// })
/// .unwrap();
/// let report = scheduler.forward(4).unwrap();
/// assert_eq!(report.advances, 6);
/// assert_eq!(scheduler.instance(fast_id).unwrap().step(), 4);
/// assert_eq!(scheduler.instance(slow_id).unwrap().step(), 2);
/// ```
#[derive(Debug)]
pub struct Scheduler {
    nodes: Vec<Node>,
    stop_when_exhausted: bool,
    tick: u64,
}

impl Scheduler {
    /// Validate `config` and take ownership of its instances.
    ///
    /// # Errors
    ///
    /// Whatever [`SchedulerConfig::validate`] reports.
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(nodes = config.nodes.len(), "scheduler created");
        Ok(Self {
            nodes: config.nodes,
            stop_when_exhausted: config.stop_when_exhausted,
            tick: 0,
        })
    }

    /// Run up to `ticks` ticks.
    ///
    /// Exhausted instances are skipped silently. With
    /// `stop_when_exhausted`, the call returns as soon as every instance
    /// is stopped.
    ///
    /// # Errors
    ///
    /// The first [`StepError`] raised by an instance. Ticks completed
    /// before the failing one stay applied; the failing tick is partial.
    pub fn forward(&mut self, ticks: u64) -> Result<ForwardReport, StepError> {
        let started = Instant::now();
        let mut report = ForwardReport::default();
        for _ in 0..ticks {
            if self.stop_when_exhausted && self.all_stopped() {
                debug!(tick = self.tick, "all instances exhausted");
                break;
            }
            for node in &mut self.nodes {
                if !node.fires_at(self.tick) {
                    continue;
                }
                match node.instance.advance()? {
                    Some(_) => report.advances += 1,
                    None => report.exhausted_skips += 1,
                }
            }
            self.tick += 1;
            report.ticks += 1;
        }
        report.elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        info!(
            ticks = report.ticks,
            advances = report.advances,
            exhausted_skips = report.exhausted_skips,
            elapsed_us = report.elapsed_us,
            tick = self.tick,
            "forward complete"
        );
        Ok(report)
    }

    /// Ticks executed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Whether every instance is exhausted.
    pub fn all_stopped(&self) -> bool {
        self.nodes.iter().all(|n| n.instance.is_stopped())
    }

    /// The scheduled instance with this id.
    pub fn instance(&self, id: InstanceId) -> Option<&ProcessInstance> {
        self.nodes
            .iter()
            .map(|n| &n.instance)
            .find(|i| i.id() == id)
    }

    /// Mutable access, e.g. to force a state or subscribe a log.
    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut ProcessInstance> {
        self.nodes
            .iter_mut()
            .map(|n| &mut n.instance)
            .find(|i| i.id() == id)
    }

    /// All instances in stepping order.
    pub fn instances(&self) -> impl Iterator<Item = &ProcessInstance> {
        self.nodes.iter().map(|n| &n.instance)
    }

    /// Give the instances back, in stepping order.
    pub fn into_instances(self) -> Vec<ProcessInstance> {
        self.nodes.into_iter().map(|n| n.instance).collect()
    }
}
