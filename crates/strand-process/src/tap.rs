//! Read-only view of an instance's current state.

use std::cell::Cell;
use std::rc::Rc;

use strand_core::InstanceId;

#[derive(Debug)]
struct Published {
    source: InstanceId,
    outputs: usize,
    state: Cell<Option<usize>>,
    stopped: Cell<bool>,
}

/// Shared, read-only window onto a process instance.
///
/// Dependent instances hold a tap of their upstream rather than the
/// upstream itself, so the upstream stays exclusively owned by whoever
/// drives it. The owning instance publishes into the tap after every
/// step; readers only see the latest value.
#[derive(Clone, Debug)]
pub struct StateTap(Rc<Published>);

impl StateTap {
    pub(crate) fn new(source: InstanceId, outputs: usize) -> Self {
        Self(Rc::new(Published {
            source,
            outputs,
            state: Cell::new(None),
            stopped: Cell::new(false),
        }))
    }

    pub(crate) fn publish(&self, state: Option<usize>, stopped: bool) {
        self.0.state.set(state);
        self.0.stopped.set(stopped);
    }

    /// The instance this tap observes.
    pub fn source(&self) -> InstanceId {
        self.0.source
    }

    /// Size of the observed instance's output space.
    pub fn output_size(&self) -> usize {
        self.0.outputs
    }

    /// Latest state, `None` before the first step.
    pub fn state(&self) -> Option<usize> {
        self.0.state.get()
    }

    /// Whether the observed instance is exhausted.
    pub fn is_stopped(&self) -> bool {
        self.0.stopped.get()
    }
}
