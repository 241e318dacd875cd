//! The host-owned context injected into every module hook.

use vivarium_events::EventBus;
use vivarium_store::DataStore;

/// Shared communication fabric for modules: the keyed data store and the
/// event bus.
///
/// The host constructs exactly one context and passes it `&mut` into
/// `install`, `tick`, and `uninstall`. Modules never reach these
/// collaborators any other way -- there are no process-wide globals, and
/// independent contexts can coexist (one per test, for instance).
#[derive(Debug, Default)]
pub struct ModuleContext {
    /// Keyed value store for shared state.
    pub store: DataStore,

    /// Publish/subscribe bus for side-effect communication.
    pub bus: EventBus,
}

impl ModuleContext {
    /// Create a context with an empty store and no listeners.
    pub const fn new() -> Self {
        Self {
            store: DataStore::new(),
            bus: EventBus::new(),
        }
    }
}
