//! Core types and traits for the strand process simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the rest of the workspace:
//! typed IDs and their allocator, the error taxonomy, the emitted
//! [`Event`], and the [`EventSink`] / [`Emitter`] subscription traits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod id;
pub mod traits;

pub use error::{InvariantViolation, StepError, ValidationError};
pub use event::{Event, TapeKey};
pub use id::{GroupKey, IdAllocator, InstanceId, LogId};
pub use traits::{Emitter, EventSink, SharedSink, SinkRef};
