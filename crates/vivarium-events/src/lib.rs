//! Event bus for the Vivarium runtime.
//!
//! Modules communicate side effects by emitting events and subscribing
//! listeners, never by calling each other directly. Dispatch is
//! synchronous and single-threaded: `emit` invokes every listener for
//! the event's kind, in descending priority order, before returning.
//!
//! # Design Principles
//!
//! - The bus is a plain owned struct injected by the host -- no
//!   process-wide global, no locking.
//! - Listener lists stay sorted by descending priority; ties keep
//!   registration order.
//! - A stoppable event can halt its own dispatch mid-flight; listeners
//!   later in the list are skipped.
//! - Listeners registered with `once` are removed after their first
//!   invocation.

pub mod bus;
pub mod event;

// Re-export primary types at crate root.
pub use bus::{EventBus, ListenerId};
pub use event::Event;
