//! Deduplicating event log for strand process instances.
//!
//! The log records the `(instance, step, state)` events pushed by the
//! instances subscribed to it. Histories that coincide (a branch and its
//! parent before the branch point, or two instances of the same seeded
//! model that happen to agree) are stored once: the first instance keeps
//! a *raw segment*, the others hold *reference segments* into it.
//!
//! ```
//! use strand_core::{Event, GroupKey, IdAllocator, InstanceId, TapeKey};
//! use strand_log::EventLog;
//!
//! let mut log = EventLog::new(IdAllocator::new().next_log(), Default::default());
//! let group = GroupKey::Seeded(1);
//! for (step, state) in [0, 1, 1].into_iter().enumerate() {
//!     log.put(Event { group, instance: InstanceId(0), step, state });
//! }
//! assert!(log.redirect(TapeKey::new(group, InstanceId(0)), TapeKey::new(group, InstanceId(1))));
//! log.put(Event { group, instance: InstanceId(1), step: 3, state: 0 });
//!
//! let replay: Vec<usize> = log.playback(InstanceId(1)).unwrap().collect();
//! assert_eq!(replay, [0, 1, 1, 0]);
//! assert_eq!(log.stats().raw_states, 4);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod log;
pub mod playback;
pub mod shared;
mod tape;

pub use config::LogConfig;
pub use log::{EventLog, LogStats, Pattern};
pub use playback::Playback;
pub use shared::SharedLog;
