//! Process instances for the strand simulator.
//!
//! A [`ProcessInstance`] turns a shared [`TransitionModel`] into a
//! resumable sequence of states. Three kinds exist:
//!
//! - **Endless**: samples forever.
//! - **Finite**: stops once a user predicate over `(step, state)` holds.
//! - **Dependent**: samples its next state from the current state of an
//!   upstream instance, observed through a read-only [`StateTap`], and
//!   stops when the upstream stops.
//!
//! Instances can be forced into a state for the next step and can
//! [`branch`](ProcessInstance::branch) into an independent continuation
//! whose random stream is an exact fork of the parent's.
//!
//! [`TransitionModel`]: strand_model::TransitionModel

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod instance;
pub mod iter;
pub mod stream;
pub mod tap;

pub use builder::ProcessBuilder;
pub use config::{ForcePolicy, ProcessConfig};
pub use instance::{BranchOverrides, Observation, Phase, ProcessInstance, StopPredicate};
pub use iter::States;
pub use stream::RandomStream;
pub use tap::StateTap;
