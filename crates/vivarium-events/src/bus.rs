//! The event bus: per-kind listener lists with priority-ordered dispatch.

use std::collections::BTreeMap;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::event::Event;

/// Opaque handle identifying one listener registration.
///
/// Returned by [`EventBus::subscribe`] and consumed by
/// [`EventBus::off`]. Boxed callbacks have no usable identity of their
/// own, so removal goes through this handle. Ids use UUID v7
/// (time-ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Mint a fresh listener id.
    fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered listener.
struct Listener {
    /// Registration handle.
    id: ListenerId,
    /// The callback invoked with each matching event.
    callback: Box<dyn FnMut(&mut Event)>,
    /// Whether to remove this listener after its first invocation.
    once: bool,
    /// Dispatch priority; higher runs earlier.
    priority: i32,
}

impl core::fmt::Debug for Listener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("once", &self.once)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Publish/subscribe event bus with priority-ordered, stoppable dispatch.
///
/// Listener lists are kept sorted by descending priority; listeners with
/// equal priority (including the default priority 0) run in registration
/// order.
#[derive(Debug, Default)]
pub struct EventBus {
    /// Listener lists per event kind.
    listeners: BTreeMap<String, Vec<Listener>>,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub const fn new() -> Self {
        Self {
            listeners: BTreeMap::new(),
        }
    }

    /// Register a listener for `kind` with explicit priority and `once`
    /// behavior. Returns the handle used to remove it.
    ///
    /// Higher priorities run earlier. A `once` listener is removed after
    /// the first event it actually handles; a propagation stop that
    /// prevents it from running leaves it registered.
    pub fn subscribe(
        &mut self,
        kind: &str,
        priority: i32,
        once: bool,
        callback: impl FnMut(&mut Event) + 'static,
    ) -> ListenerId {
        let id = ListenerId::new();
        let list = self.listeners.entry(kind.to_owned()).or_default();
        list.push(Listener {
            id,
            callback: Box::new(callback),
            once,
            priority,
        });
        // Re-sort only when the new listener could land anywhere but the
        // end. Stable sort keeps registration order within a priority.
        if priority != 0 {
            list.sort_by(|a, b| b.priority.cmp(&a.priority));
        }
        trace!(kind, %id, priority, once, "listener registered");
        id
    }

    /// Register a listener with default priority that fires on every
    /// matching event.
    pub fn on(&mut self, kind: &str, callback: impl FnMut(&mut Event) + 'static) -> ListenerId {
        self.subscribe(kind, 0, false, callback)
    }

    /// Register a listener with default priority that is removed after
    /// the first event it handles.
    pub fn once(&mut self, kind: &str, callback: impl FnMut(&mut Event) + 'static) -> ListenerId {
        self.subscribe(kind, 0, true, callback)
    }

    /// Dispatch `event` to every listener registered for its kind, in
    /// list order. Returns the number of listeners invoked.
    ///
    /// Dispatch stops early when a listener marks a stoppable event
    /// stopped. Listeners registered with `once` that ran during this
    /// dispatch are removed afterwards.
    pub fn emit(&mut self, event: &mut Event) -> usize {
        let Some(list) = self.listeners.get_mut(event.kind()) else {
            trace!(kind = event.kind(), "emit with no listeners");
            return 0;
        };

        let mut invoked: usize = 0;
        let mut fired_once: Vec<ListenerId> = Vec::new();

        for listener in list.iter_mut() {
            (listener.callback)(event);
            invoked = invoked.saturating_add(1);
            if listener.once {
                fired_once.push(listener.id);
            }
            if event.is_stopped() {
                debug!(
                    kind = event.kind(),
                    after = invoked,
                    "event propagation stopped"
                );
                break;
            }
        }

        if !fired_once.is_empty() {
            list.retain(|listener| !fired_once.contains(&listener.id));
        }

        invoked
    }

    /// Remove the listener registered under `id` for `kind`. Returns
    /// whether a listener was removed.
    pub fn off(&mut self, kind: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|listener| listener.id != id);
        list.len() < before
    }

    /// Remove every listener for `kind`. Returns how many were removed.
    pub fn off_all(&mut self, kind: &str) -> usize {
        self.listeners.remove(kind).map_or(0, |list| list.len())
    }

    /// Drop all listeners for all kinds.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of listeners currently registered for `kind`.
    pub fn listener_count(&self, kind: &str) -> usize {
        self.listeners.get(kind).map_or(0, Vec::len)
    }
}
