//! Event values dispatched through the bus.

use serde_json::Value;

/// An event: a kind string, a JSON payload, and propagation state.
///
/// Whether an event can be stopped mid-dispatch is fixed at
/// construction. [`Event::request_stop`] on a non-stoppable event is a
/// no-op, so listeners may call it unconditionally.
#[derive(Debug, Clone)]
pub struct Event {
    /// The event kind, used to select listeners.
    kind: String,

    /// Free-form payload carried to listeners.
    payload: Value,

    /// Whether listeners may halt propagation of this event.
    stoppable: bool,

    /// Whether a listener has requested that propagation stop.
    stopped: bool,
}

impl Event {
    /// Create a stoppable event with the given kind and payload.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            stoppable: true,
            stopped: false,
        }
    }

    /// Create an event whose propagation cannot be stopped; every
    /// listener for the kind will run.
    pub fn non_stoppable(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            stoppable: false,
            stopped: false,
        }
    }

    /// The event kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The event payload.
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Whether listeners may halt propagation of this event.
    pub const fn is_stoppable(&self) -> bool {
        self.stoppable
    }

    /// Whether propagation has been stopped.
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Request that propagation stop after the current listener.
    ///
    /// Has no effect on events constructed with
    /// [`Event::non_stoppable`].
    pub const fn request_stop(&mut self) {
        if self.stoppable {
            self.stopped = true;
        }
    }
}
