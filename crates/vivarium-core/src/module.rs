//! The module contract: identity, dependencies, and lifecycle hooks.
//!
//! A module is a named unit of behavior. It is constructed by the host,
//! installed exactly once by the [`ModuleInstaller`], and then ticked
//! every scheduler round for the rest of the process lifetime.
//! Dependencies are declared as [`ModuleId`] values -- explicit
//! registration identities, not concrete types -- so two modules can
//! never silently shadow each other.
//!
//! [`ModuleInstaller`]: crate::installer::ModuleInstaller

use vivarium_store::StoreError;

use crate::context::ModuleContext;

/// Registration identity of a module.
///
/// Every module carries a stable, semantic id (e.g. `"time"`), and
/// declares its prerequisites as the ids of the modules it needs. The
/// installer resolves ids to instances at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(&'static str);

impl ModuleId {
    /// Create a module id from its stable string form.
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    /// Return the id's string form.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors surfaced by module lifecycle hooks.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// A data store operation failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// A module-domain failure.
    #[error("module failure: {reason}")]
    Failed {
        /// Explanation of what went wrong.
        reason: String,
    },
}

/// Contract implemented by every pluggable unit.
///
/// # Lifecycle
///
/// Uninstalled -> Installed (via [`Module::install`], exactly once) ->
/// ticking (via repeated [`Module::tick`] calls) until process shutdown.
/// `tick` is only invoked after `install` has completed for the module
/// and for every module in its dependency closure.
pub trait Module {
    /// The module's registration identity.
    fn id(&self) -> ModuleId;

    /// Human-readable module name.
    fn name(&self) -> &str;

    /// One-line description of what the module does.
    fn description(&self) -> &str;

    /// Ids of the modules that must be installed before this one.
    /// Declared order is preserved during install-order resolution.
    fn dependencies(&self) -> &[ModuleId] {
        &[]
    }

    /// One-time setup (e.g. seeding store keys, subscribing listeners).
    /// The installer guarantees at-most-once invocation per process
    /// lifetime; a returned error aborts the installation batch.
    fn install(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError>;

    /// Teardown hook. Never invoked automatically by the installer or
    /// scheduler; the host shutdown path may invoke it explicitly via
    /// [`TickScheduler::uninstall_all`].
    ///
    /// [`TickScheduler::uninstall_all`]: crate::scheduler::TickScheduler::uninstall_all
    fn uninstall(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError>;

    /// Per-round work. Invoked once per scheduler round for the module's
    /// entire active lifetime. May deliberately delay to pace the loop;
    /// the scheduler is single-threaded and cooperative.
    fn tick(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError>;
}

impl core::fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Module").field("id", &self.id()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_display_matches_str_form() {
        const TIME: ModuleId = ModuleId::new("time");
        assert_eq!(TIME.to_string(), "time");
        assert_eq!(TIME.as_str(), "time");
    }

    #[test]
    fn module_ids_compare_by_string_identity() {
        assert_eq!(ModuleId::new("a"), ModuleId::new("a"));
        assert_ne!(ModuleId::new("a"), ModuleId::new("b"));
    }
}
