//! The tick scheduler: the perpetual round loop over installed modules.
//!
//! One full pass over the tick sequence is a scheduler round. The loop
//! checks the shutdown signal once per round, then invokes every
//! module's `tick` hook in install order. There is no pacing at this
//! layer; a module that wants to pace the loop sleeps inside its own
//! `tick` (the slowest module sets the frame rate).
//!
//! # Failure Policy
//!
//! Fail-fast. The first tick error halts the loop and is returned to
//! the host as [`SchedulerError::Tick`], naming the failing module.
//! Skip-and-continue was rejected: a module that reads state written by
//! a failed dependency would run against a broken invariant.

use tracing::{debug, info, warn};

use crate::context::ModuleContext;
use crate::module::{Module, ModuleError, ModuleId};
use crate::signal::ShutdownSignal;

/// Errors that can occur while the scheduler is running.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A module's `tick` hook failed.
    #[error("tick failed in module {module}: {source}")]
    Tick {
        /// The module whose hook failed.
        module: ModuleId,
        /// The underlying module error.
        source: ModuleError,
    },
}

/// Bounds on a scheduler run.
///
/// `max_rounds == 0` means unbounded: the loop runs until shutdown is
/// requested. A positive bound stops the loop after that many rounds,
/// which gives tests and bounded hosts deterministic termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunBounds {
    /// Maximum rounds to execute (0 = unlimited).
    pub max_rounds: u64,
}

impl RunBounds {
    /// Bounds that never stop the loop.
    pub const fn unbounded() -> Self {
        Self { max_rounds: 0 }
    }

    /// Bounds that stop the loop after `max_rounds` rounds.
    pub const fn rounds(max_rounds: u64) -> Self {
        Self { max_rounds }
    }
}

/// Reason why a scheduler run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// The shutdown signal was raised.
    ShutdownRequested,
    /// The configured round limit was reached.
    RoundLimitReached,
}

/// Result of a completed scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// Rounds executed during this run.
    pub rounds: u64,
}

/// Drives every installed module's tick hook, forever, in install order.
///
/// Constructed from a finalized [`ModuleInstaller`]; the tick sequence
/// is immutable once the scheduler owns it. Install order and tick
/// order are identical and fixed for the process lifetime.
///
/// [`ModuleInstaller`]: crate::installer::ModuleInstaller
#[derive(Debug)]
pub struct TickScheduler {
    /// Installed modules in install order.
    sequence: Vec<Box<dyn Module>>,

    /// Total rounds completed over the scheduler's lifetime.
    rounds_completed: u64,
}

impl TickScheduler {
    /// Create a scheduler over a finalized tick sequence.
    pub(crate) const fn new(sequence: Vec<Box<dyn Module>>) -> Self {
        Self {
            sequence,
            rounds_completed: 0,
        }
    }

    /// Ids of the tick sequence, in tick order.
    pub fn tick_order(&self) -> Vec<ModuleId> {
        self.sequence.iter().map(|module| module.id()).collect()
    }

    /// Number of modules in the tick sequence.
    pub fn module_count(&self) -> usize {
        self.sequence.len()
    }

    /// Total rounds completed over the scheduler's lifetime.
    pub const fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    /// Execute one scheduler round: every module's `tick`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Tick`] from the first failing hook;
    /// later modules do not tick this round.
    pub fn run_round(&mut self, ctx: &mut ModuleContext) -> Result<(), SchedulerError> {
        for module in &mut self.sequence {
            module.tick(ctx).map_err(|source| SchedulerError::Tick {
                module: module.id(),
                source,
            })?;
        }
        self.rounds_completed = self.rounds_completed.saturating_add(1);
        Ok(())
    }

    /// Run rounds until the shutdown signal is raised, the round bound
    /// is reached, or a tick fails.
    ///
    /// The signal is checked once per round, before the round starts; a
    /// stop requested mid-round takes effect at the next round boundary.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Tick`] if a module's hook fails
    /// (fail-fast; the loop does not continue).
    pub fn run(
        &mut self,
        ctx: &mut ModuleContext,
        signal: &ShutdownSignal,
        bounds: RunBounds,
    ) -> Result<RunReport, SchedulerError> {
        info!(
            modules = self.sequence.len(),
            max_rounds = bounds.max_rounds,
            "scheduler starting"
        );

        let mut rounds: u64 = 0;
        loop {
            if signal.is_stop_requested() {
                info!(rounds, "shutdown requested, scheduler stopping");
                return Ok(RunReport {
                    end_reason: RunEndReason::ShutdownRequested,
                    rounds,
                });
            }

            self.run_round(ctx)?;
            rounds = rounds.saturating_add(1);
            debug!(round = rounds, "scheduler round complete");

            if bounds.max_rounds > 0 && rounds >= bounds.max_rounds {
                info!(rounds, "round limit reached, scheduler stopping");
                return Ok(RunReport {
                    end_reason: RunEndReason::RoundLimitReached,
                    rounds,
                });
            }
        }
    }

    /// Explicit host shutdown path: invoke every module's `uninstall`
    /// in reverse install order.
    ///
    /// Never called automatically. Teardown continues past individual
    /// failures; each failure is logged and returned alongside the
    /// failing module's id.
    pub fn uninstall_all(&mut self, ctx: &mut ModuleContext) -> Vec<(ModuleId, ModuleError)> {
        let mut failures = Vec::new();
        for module in self.sequence.iter_mut().rev() {
            let id = module.id();
            debug!(module = %id, "uninstalling module");
            if let Err(source) = module.uninstall(ctx) {
                warn!(module = %id, error = %source, "uninstall hook failed");
                failures.push((id, source));
            }
        }
        failures
    }
}
