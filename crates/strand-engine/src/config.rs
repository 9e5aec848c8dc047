//! Scheduler configuration, validation, and error types.
//!
//! [`SchedulerConfig`] is the builder-input for a [`Scheduler`]. It is
//! consumed by [`Scheduler::new`], which calls
//! [`validate`](SchedulerConfig::validate) first.
//!
//! [`Scheduler`]: crate::Scheduler
//! [`Scheduler::new`]: crate::Scheduler::new

use indexmap::IndexSet;
use strand_core::InstanceId;
use strand_process::ProcessInstance;
use thiserror::Error;

// ── Node ───────────────────────────────────────────────────────────

/// One scheduled instance and its firing pattern.
///
/// At tick `t` the instance is advanced iff `pattern[t % pattern.len()]`.
#[derive(Debug)]
pub struct Node {
    /// The instance to drive.
    pub instance: ProcessInstance,
    /// Cyclic firing pattern. Must not be empty.
    pub pattern: Vec<bool>,
}

impl Node {
    /// A node with an explicit firing pattern.
    pub fn new(instance: ProcessInstance, pattern: Vec<bool>) -> Self {
        Self { instance, pattern }
    }

    /// A node that fires on every tick.
    pub fn every_tick(instance: ProcessInstance) -> Self {
        Self::new(instance, vec![true])
    }

    /// A node that fires on ticks `offset`, `offset + period`, ...
    ///
    /// A zero `period` yields an empty pattern, which validation rejects.
    pub fn periodic(instance: ProcessInstance, period: usize, offset: usize) -> Self {
        let pattern = (0..period).map(|t| t == offset % period.max(1)).collect();
        Self::new(instance, pattern)
    }

    /// Whether the node fires at `tick`.
    pub fn fires_at(&self, tick: u64) -> bool {
        if self.pattern.is_empty() {
            return false;
        }
        let len = self.pattern.len() as u64;
        // `tick % len < len`, so the index is in range.
        self.pattern[(tick % len) as usize]
    }
}

// ── SchedulerConfig ────────────────────────────────────────────────

/// Everything a [`Scheduler`](crate::Scheduler) is built from.
#[derive(Debug, Default)]
pub struct SchedulerConfig {
    /// Instances in stepping order.
    pub nodes: Vec<Node>,
    /// End a `forward` call early once every instance is exhausted.
    /// Default: `false`.
    pub stop_when_exhausted: bool,
}

impl SchedulerConfig {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// No nodes, a node with an empty pattern, or an instance listed twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }
        let mut seen = IndexSet::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            if node.pattern.is_empty() {
                return Err(ConfigError::EmptyPattern {
                    instance: node.instance.id(),
                });
            }
            if !seen.insert(node.instance.id()) {
                return Err(ConfigError::DuplicateInstance {
                    instance: node.instance.id(),
                    index,
                });
            }
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SchedulerConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No nodes configured.
    #[error("scheduler has no nodes")]
    NoNodes,
    /// A node's firing pattern is empty.
    #[error("instance {instance} has an empty firing pattern")]
    EmptyPattern {
        /// The node's instance.
        instance: InstanceId,
    },
    /// The same instance id appears in two nodes.
    #[error("instance {instance} is scheduled twice (node {index})")]
    DuplicateInstance {
        /// The repeated instance.
        instance: InstanceId,
        /// Position of the second occurrence.
        index: usize,
    },
}
