//! The event emitted by a process for every state it produces.

use std::fmt;

use crate::id::{GroupKey, InstanceId};

/// Address of one instance's recording inside an event log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TapeKey {
    /// Deduplication group of the instance.
    pub group: GroupKey,
    /// The instance itself.
    pub instance: InstanceId,
}

impl TapeKey {
    /// Build a key from its parts.
    pub fn new(group: GroupKey, instance: InstanceId) -> Self {
        Self { group, instance }
    }
}

impl fmt::Display for TapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.instance)
    }
}

/// One `(instance, step, state)` triple, tagged with its group.
///
/// `step` is the zero-based index of the state in the instance's own
/// sequence, taken before the instance increments its step counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    /// Deduplication group (the model seed, if any).
    pub group: GroupKey,
    /// Emitting instance.
    pub instance: InstanceId,
    /// Step at which the state was produced.
    pub step: usize,
    /// The produced state.
    pub state: usize,
}

impl Event {
    /// The tape this event belongs to.
    pub fn key(&self) -> TapeKey {
        TapeKey::new(self.group, self.instance)
    }
}
