//! Test utilities and mock types for strand development.
//!
//! Provides a recording mock of [`EventSink`] and, in [`fixtures`], a
//! handful of small models with known behavior.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use strand_core::{Emitter, Event, EventSink, InstanceId, LogId, SharedSink, TapeKey};

pub use fixtures::{coin, fixed_emission, three_cycle, two_cycle};

/// Mock implementation of [`EventSink`].
///
/// Accepts every event while open and keeps a plain log of every call
/// for assertions. Redirects are recorded and reported as successful.
pub struct RecordingSink {
    id: LogId,
    open: bool,
    pub events: Vec<Event>,
    pub attached: Vec<TapeKey>,
    pub redirects: Vec<(TapeKey, TapeKey)>,
}

impl RecordingSink {
    pub fn new(id: LogId) -> Self {
        Self {
            id,
            open: true,
            events: Vec::new(),
            attached: Vec::new(),
            redirects: Vec::new(),
        }
    }

    /// A new sink behind the shared handle emitters bind to.
    pub fn shared(id: LogId) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(id)))
    }

    /// Stop accepting events.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// States recorded for `instance`, in arrival order.
    pub fn states_of(&self, instance: InstanceId) -> Vec<usize> {
        self.events
            .iter()
            .filter(|e| e.instance == instance)
            .map(|e| e.state)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn id(&self) -> LogId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn attach(&mut self, key: TapeKey) {
        self.attached.push(key);
    }

    fn put(&mut self, event: Event) -> bool {
        if !self.open {
            return false;
        }
        self.events.push(event);
        true
    }

    fn redirect(&mut self, src: TapeKey, dst: TapeKey) -> bool {
        self.redirects.push((src, dst));
        true
    }
}

/// Subscribe `emitter` to `sink` the way a real log does on `open`.
pub fn subscribe<E: Emitter>(emitter: &mut E, sink: &Rc<RefCell<RecordingSink>>) {
    let id = sink.borrow().id;
    sink.borrow_mut().attach(emitter.key());
    let shared: SharedSink = sink.clone();
    emitter.bind(id, Rc::downgrade(&shared));
}
