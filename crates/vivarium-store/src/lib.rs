//! Keyed data store for the Vivarium runtime.
//!
//! Modules never call each other directly; they publish shared state into
//! this store and read what other modules have published. The store maps
//! the canonical string form of a [`StoreKey`] to a JSON value, detects
//! whether a write actually changed the stored value, and keeps a side
//! index of every value ever written under each key type.
//!
//! # Design Principles
//!
//! - The store is a plain owned struct. The host constructs it, wraps it
//!   in a module context, and passes it into module hooks -- there is no
//!   process-wide global.
//! - Backing maps are [`BTreeMap`]s so iteration order is deterministic.
//! - Values are [`serde_json::Value`]; typed accessors cross the serde
//!   boundary at the call site, not inside the store.
//!
//! [`BTreeMap`]: std::collections::BTreeMap

pub mod error;
pub mod key;
pub mod store;

// Re-export primary types at crate root.
pub use error::StoreError;
pub use key::StoreKey;
pub use store::DataStore;
