//! Static module registry.
//!
//! The set of modules the engine runs is an explicit, statically
//! compiled list of constructors -- the host decides what exists, not a
//! filesystem scan. Registration order here is only a tiebreak: the
//! installer reorders by declared dependencies.

use vivarium_core::Module;
use vivarium_modules::{ChronicleModule, TimeModule};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Construct every module the engine installs, from configuration.
///
/// # Errors
///
/// Returns [`EngineError::Time`] if the time module settings are
/// invalid.
pub fn build_registry(config: &EngineConfig) -> Result<Vec<Box<dyn Module>>, EngineError> {
    let time = TimeModule::new(&config.time)?;
    let chronicle = ChronicleModule::new(config.chronicle.checkpoint_every);

    let registry: Vec<Box<dyn Module>> = vec![Box::new(time), Box::new(chronicle)];
    Ok(registry)
}
