//! Production modules for the Vivarium runtime.
//!
//! Each module here conforms to the [`Module`] contract from
//! `vivarium-core` and communicates exclusively through the injected
//! store and bus.
//!
//! # Modules
//!
//! - [`time`] -- Simulated-clock module: paces the tick loop, advances a
//!   calendar date every round, publishes it to the store, and emits
//!   `time.advanced`.
//! - [`chronicle`] -- Observer module that depends on `time`, mirrors
//!   the latest observed date into the store, and logs periodic
//!   checkpoints.
//!
//! [`Module`]: vivarium_core::Module

pub mod chronicle;
pub mod time;

// Re-export primary types at crate root.
pub use chronicle::ChronicleModule;
pub use time::{TimeError, TimeModule, TimeSettings};
