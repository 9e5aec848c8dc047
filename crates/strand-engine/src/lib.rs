//! Lock-step scheduling for strand process networks.
//!
//! A [`Scheduler`] owns a set of process instances and advances them on a
//! shared tick counter. Each instance fires according to a cyclic
//! pattern, so a network can mix instances that step every tick with
//! instances that step every second or third tick. Instances are stepped
//! in configuration order within a tick, which lets a dependent instance
//! listed after its upstream see the upstream's state from the same tick.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod scheduler;

pub use config::{ConfigError, Node, SchedulerConfig};
pub use metrics::ForwardReport;
pub use scheduler::Scheduler;
