//! Dependency-ordered, one-time module installation.
//!
//! Installation is plan-then-execute. A batch is first resolved into a
//! complete install plan -- a topological order over the dependency
//! graph, with explicit `Visiting`/`Visited` marks so cycles are
//! detected and reported rather than recursed into. Only when the whole
//! batch plans cleanly does any module's `install` hook run, so a
//! resolution failure mutates nothing: no module is installed and the
//! tick sequence is untouched.
//!
//! Ordering is deterministic: roots are visited in registration order,
//! and each module's dependencies are visited in declared order, so
//! modules with no dependency relationship keep their registration
//! order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::context::ModuleContext;
use crate::module::{Module, ModuleError, ModuleId};
use crate::scheduler::TickScheduler;

/// Errors that can occur during batch installation.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Two modules in one batch registered the same id.
    #[error("duplicate module in batch: {module}")]
    DuplicateModule {
        /// The id registered twice.
        module: ModuleId,
    },

    /// A declared dependency has no registered instance in this batch
    /// or any prior one.
    #[error("prerequisite not installed: {module} requires {dependency}")]
    MissingDependency {
        /// The module whose dependency failed to resolve.
        module: ModuleId,
        /// The dependency id that was never registered.
        dependency: ModuleId,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle detected: {}", format_cycle(.cycle))]
    DependencyCycle {
        /// The module ids along the cycle, closing on the repeated id.
        cycle: Vec<ModuleId>,
    },

    /// A module's `install` hook failed.
    #[error("install hook failed for {module}: {source}")]
    ModuleInstall {
        /// The module whose hook failed.
        module: ModuleId,
        /// The underlying module error.
        source: ModuleError,
    },
}

/// Render a cycle as `a -> b -> a` for error messages.
fn format_cycle(cycle: &[ModuleId]) -> String {
    cycle
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Depth-first visitation state for one module id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current visitation stack; seeing it again means a cycle.
    Visiting,
    /// Fully planned.
    Visited,
}

/// Resolves install order from declared dependencies and performs
/// one-time installation.
///
/// The installer accumulates state across batches: a module installed in
/// an earlier call satisfies dependencies in later calls, and a later
/// registration of an already-installed id is suppressed as a no-op.
#[derive(Debug, Default)]
pub struct ModuleInstaller {
    /// Ids installed by this or any prior batch.
    installed: BTreeSet<ModuleId>,

    /// Installed modules in install order -- the tick sequence.
    sequence: Vec<Box<dyn Module>>,
}

impl ModuleInstaller {
    /// Create an installer with nothing installed.
    pub const fn new() -> Self {
        Self {
            installed: BTreeSet::new(),
            sequence: Vec::new(),
        }
    }

    /// Install a batch of modules in dependency order.
    ///
    /// Each newly registered module's `install` hook runs exactly once,
    /// strictly after the hooks of everything in its dependency closure,
    /// and the module is appended to the tick sequence in the same
    /// order. Batch entries whose id is already installed are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::DuplicateModule`] if one batch registers
    /// an id twice, [`InstallError::MissingDependency`] if a declared
    /// dependency was never registered, [`InstallError::DependencyCycle`]
    /// if the declared edges form a cycle, and
    /// [`InstallError::ModuleInstall`] if an `install` hook fails.
    /// Resolution errors leave the installer unchanged.
    pub fn install(
        &mut self,
        ctx: &mut ModuleContext,
        batch: Vec<Box<dyn Module>>,
    ) -> Result<(), InstallError> {
        // Index the batch by id, suppressing re-registration of ids
        // installed by a prior batch.
        let mut by_id: BTreeMap<ModuleId, Box<dyn Module>> = BTreeMap::new();
        let mut roots: Vec<ModuleId> = Vec::new();

        for module in batch {
            let id = module.id();
            if self.installed.contains(&id) {
                debug!(module = %id, "already installed, skipping");
                continue;
            }
            if by_id.insert(id, module).is_some() {
                return Err(InstallError::DuplicateModule { module: id });
            }
            roots.push(id);
        }

        // Plan: topological order over the batch, registration order for
        // ties. No hook runs until the whole plan resolves.
        let mut marks: BTreeMap<ModuleId, Mark> = BTreeMap::new();
        let mut stack: Vec<ModuleId> = Vec::new();
        let mut plan: Vec<ModuleId> = Vec::new();

        for &root in &roots {
            visit(
                root,
                &by_id,
                &self.installed,
                &mut marks,
                &mut stack,
                &mut plan,
            )?;
        }

        // Execute: install in plan order, appending each module's tick
        // hook to the sequence as its install completes.
        for id in plan {
            let Some(mut module) = by_id.remove(&id) else {
                continue;
            };
            debug!(module = %id, name = module.name(), "installing module");
            module
                .install(ctx)
                .map_err(|source| InstallError::ModuleInstall { module: id, source })?;
            self.installed.insert(id);
            self.sequence.push(module);
            info!(module = %id, position = self.sequence.len(), "module installed");
        }

        Ok(())
    }

    /// Ids of every module installed so far, in install order.
    pub fn tick_order(&self) -> Vec<ModuleId> {
        self.sequence.iter().map(|module| module.id()).collect()
    }

    /// Whether the given id has been installed.
    pub fn is_installed(&self, id: ModuleId) -> bool {
        self.installed.contains(&id)
    }

    /// Number of installed modules.
    pub fn installed_count(&self) -> usize {
        self.sequence.len()
    }

    /// Finalize installation and hand the tick sequence to a scheduler.
    /// The sequence is immutable from here on.
    pub fn into_scheduler(self) -> TickScheduler {
        TickScheduler::new(self.sequence)
    }
}

/// Depth-first visit of one module id during planning.
///
/// A dependency satisfied by a prior batch ends the recursion; a
/// dependency found in this batch is planned before its dependent; a
/// dependency in neither is a fatal resolution error.
fn visit(
    id: ModuleId,
    by_id: &BTreeMap<ModuleId, Box<dyn Module>>,
    installed: &BTreeSet<ModuleId>,
    marks: &mut BTreeMap<ModuleId, Mark>,
    stack: &mut Vec<ModuleId>,
    plan: &mut Vec<ModuleId>,
) -> Result<(), InstallError> {
    if installed.contains(&id) {
        return Ok(());
    }

    match marks.get(&id) {
        Some(Mark::Visited) => return Ok(()),
        Some(Mark::Visiting) => {
            // The id is on the current stack: the path from its first
            // occurrence back to here is the cycle.
            let start = stack.iter().position(|entry| *entry == id).unwrap_or(0);
            let mut cycle: Vec<ModuleId> = stack.iter().skip(start).copied().collect();
            cycle.push(id);
            return Err(InstallError::DependencyCycle { cycle });
        }
        None => {}
    }

    // Roots come from the batch index and dependencies are checked for
    // presence before recursing, so an absent id was already installed.
    let Some(module) = by_id.get(&id) else {
        return Ok(());
    };

    marks.insert(id, Mark::Visiting);
    stack.push(id);

    for &dependency in module.dependencies() {
        if installed.contains(&dependency) {
            continue;
        }
        if !by_id.contains_key(&dependency) {
            return Err(InstallError::MissingDependency {
                module: id,
                dependency,
            });
        }
        visit(dependency, by_id, installed, marks, stack, plan)?;
    }

    stack.pop();
    marks.insert(id, Mark::Visited);
    plan.push(id);
    Ok(())
}
