//! [`SharedLog`]: the handle instances subscribe to.

use std::cell::{Ref, RefCell};
use std::ops::Range;
use std::rc::Rc;

use indexmap::IndexMap;
use strand_core::{Emitter, IdAllocator, InstanceId, LogId, SharedSink};

use crate::config::LogConfig;
use crate::log::{EventLog, LogStats, Pattern};

/// Shared, single-threaded handle to an [`EventLog`].
///
/// Instances only keep weak references to the log, so dropping every
/// `SharedLog` clone unsubscribes all of them. Query helpers borrow the
/// log for the duration of the call; use [`borrow`](Self::borrow) for
/// borrowing iterators such as [`EventLog::playback`].
#[derive(Clone, Debug)]
pub struct SharedLog(Rc<RefCell<EventLog>>);

impl SharedLog {
    /// A new log with the default configuration.
    pub fn new(ids: &IdAllocator) -> Self {
        Self::with_config(ids, LogConfig::default())
    }

    /// A new log with `config`.
    pub fn with_config(ids: &IdAllocator, config: LogConfig) -> Self {
        Self(Rc::new(RefCell::new(EventLog::new(ids.next_log(), config))))
    }

    /// This log's id.
    pub fn id(&self) -> LogId {
        self.0.borrow().id()
    }

    /// Subscribe `emitter`: its tape is registered here and it starts
    /// pushing its events to this log.
    ///
    /// Returns `false` (and does nothing) once the log is closed.
    pub fn open<E: Emitter>(&self, emitter: &mut E) -> bool {
        let id = {
            let mut log = self.0.borrow_mut();
            if !log.is_open() {
                return false;
            }
            log.attach(emitter.key());
            log.id()
        };
        let sink: SharedSink = self.0.clone();
        emitter.bind(id, Rc::downgrade(&sink));
        true
    }

    /// Permanently stop accepting events. Subscribed instances unbind
    /// themselves on their next emit.
    pub fn close(&self) {
        self.0.borrow_mut().close();
    }

    /// Whether new events are accepted.
    pub fn is_open(&self) -> bool {
        self.0.borrow().is_open()
    }

    /// Borrow the log for queries.
    ///
    /// # Panics
    ///
    /// If the log is currently borrowed mutably, which only happens
    /// while an instance is emitting into it.
    pub fn borrow(&self) -> Ref<'_, EventLog> {
        self.0.borrow()
    }

    /// See [`EventLog::length`].
    pub fn length(&self, instance: InstanceId) -> Option<usize> {
        self.0.borrow().length(instance)
    }

    /// See [`EventLog::first_step`].
    pub fn first_step(&self, instance: InstanceId) -> Option<usize> {
        self.0.borrow().first_step(instance)
    }

    /// See [`EventLog::retrieve`].
    pub fn retrieve(&self, instance: InstanceId, step: usize) -> Option<usize> {
        self.0.borrow().retrieve(instance, step)
    }

    /// [`EventLog::playback`], collected.
    pub fn playback_vec(&self, instance: InstanceId) -> Option<Vec<usize>> {
        self.0.borrow().playback(instance).map(Iterator::collect)
    }

    /// See [`EventLog::count`].
    pub fn count(
        &self,
        instance: InstanceId,
        windows: &[usize],
        steps: Option<Range<usize>>,
    ) -> Option<IndexMap<Pattern, usize>> {
        self.0.borrow().count(instance, windows, steps)
    }

    /// See [`EventLog::stats`].
    pub fn stats(&self) -> LogStats {
        self.0.borrow().stats()
    }
}
