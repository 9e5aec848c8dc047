//! Strand: branchable discrete-time Markov processes with a
//! deduplicating event log.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all strand sub-crates. For most users, adding `strand` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use strand::prelude::*;
//!
//! let ids = IdAllocator::new();
//! let log = SharedLog::new(&ids);
//! let model = Arc::new(
//!     TransitionModel::new(&[[0.0, 1.0], [1.0, 0.0]], InitialState::Fixed(0), Some(7)).unwrap(),
//! );
//!
//! let mut parent = ProcessInstance::endless(model, &ids).unwrap();
//! log.open(&mut parent);
//! parent.skip(4).unwrap();
//!
//! // The branch shares the recorded prefix and stays subscribed.
//! let mut child = parent.branch(&BranchOverrides::state(1)).unwrap();
//! child.skip(2).unwrap();
//! assert_eq!(log.playback_vec(child.id()), Some(vec![0, 1, 0, 1, 1, 0]));
//! assert_eq!(log.stats().raw_states, 6);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strand-core` | IDs, events, error taxonomy, sink traits |
//! | [`model`] | `strand-model` | Transition models, loading, random generation, fitting |
//! | [`process`] | `strand-process` | Process instances, builders, random streams |
//! | [`log`] | `strand-log` | Deduplicating event log, playback, pattern counts |
//! | [`engine`] | `strand-engine` | Lock-step scheduler for instance networks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`strand-core`).
///
/// Contains [`types::Event`], the error taxonomy, and the
/// [`types::EventSink`] / [`types::Emitter`] subscription traits.
pub use strand_core as types;

/// Transition models (`strand-model`).
///
/// [`model::TransitionModel`] plus the text loader, random generation
/// and [`model::FitWeights`]-based refitting.
pub use strand_model as model;

/// Process instances (`strand-process`).
///
/// [`process::ProcessInstance`] in its endless, finite and dependent
/// kinds, with forcing and branching.
pub use strand_process as process;

/// Event recording (`strand-log`).
///
/// [`log::EventLog`] and its shared handle [`log::SharedLog`].
pub use strand_log as log;

/// Scheduling (`strand-engine`).
///
/// [`engine::Scheduler`] advances a network of instances tick by tick.
pub use strand_engine as engine;

/// Common imports for typical strand usage.
///
/// ```rust
/// use strand::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use strand_core::{Event, GroupKey, IdAllocator, InstanceId, LogId};
    pub use strand_core::{Emitter, EventSink};

    // Errors
    pub use strand_core::{InvariantViolation, StepError, ValidationError};

    // Models
    pub use strand_model::{FitWeights, InitialState, LoadError, ModelPatch, TransitionModel};

    // Processes
    pub use strand_process::{BranchOverrides, Observation, Phase, ProcessBuilder, ProcessInstance};

    // Log
    pub use strand_log::{EventLog, LogConfig, SharedLog};

    // Engine
    pub use strand_engine::{ForwardReport, Node, Scheduler, SchedulerConfig};
}
