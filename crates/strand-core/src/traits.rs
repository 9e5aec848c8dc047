//! Subscription traits connecting process instances to event logs.
//!
//! An [`EventSink`] is anything that records [`Event`]s (the event log,
//! or a test mock). An [`Emitter`] is anything that can be subscribed to
//! sinks and pushes events into them (the process instance). Sinks are
//! shared through [`SharedSink`]; emitters only keep [`SinkRef`] back
//! references, so a dropped log silently unsubscribes itself.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::event::{Event, TapeKey};
use crate::id::LogId;

/// Shared, single-threaded handle to a sink.
pub type SharedSink = Rc<RefCell<dyn EventSink>>;

/// Non-owning back reference held by emitters.
pub type SinkRef = Weak<RefCell<dyn EventSink>>;

/// Receives events pushed by emitters.
///
/// Implementations never fail loudly: rejection is reported through the
/// boolean results so that an emitting instance is never disrupted.
pub trait EventSink {
    /// Identity of this sink.
    fn id(&self) -> LogId;

    /// Whether new events are still accepted.
    fn is_open(&self) -> bool;

    /// Remember that `key` is subscribed to this sink.
    fn attach(&mut self, key: TapeKey);

    /// Record one event. Returns `false` if it was rejected.
    fn put(&mut self, event: Event) -> bool;

    /// Make `dst`'s recording start with everything recorded for `src`.
    ///
    /// Called when `src` branches into `dst`. Returns `false` if the
    /// sink cannot represent the shared prefix.
    fn redirect(&mut self, src: TapeKey, dst: TapeKey) -> bool;
}

/// Typed capability of being subscribed to an [`EventSink`].
pub trait Emitter {
    /// The tape key this emitter records under.
    fn key(&self) -> TapeKey;

    /// Start pushing future events into `sink`.
    ///
    /// Binding a sink that is already bound (same [`LogId`]) is a no-op.
    fn bind(&mut self, id: LogId, sink: SinkRef);

    /// Stop pushing events into the sink with this id.
    fn unbind(&mut self, id: LogId);
}
