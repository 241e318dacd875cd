//! Chronicle module: observes the simulated clock through the bus.
//!
//! The chronicle never calls the time module. It subscribes to
//! `time.advanced` at install, captures each observed date into a cell
//! shared with its listener, and mirrors the latest one into the raw
//! store key `chronicle.last_seen` on its own tick. Because it declares
//! a dependency on the time module, its tick always runs after the
//! clock's within a round, so the mirror is at most one event behind
//! within the same round and exact at the round boundary.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info};

use vivarium_core::{Module, ModuleContext, ModuleError, ModuleId};
use vivarium_events::ListenerId;
use vivarium_store::StoreKey;

use crate::time::{TIME_ADVANCED, TimeModule};

/// Raw store key holding the most recently observed simulated date.
pub const LAST_SEEN_KEY: &str = "chronicle.last_seen";

/// Module that records the simulated timeline as it is announced.
#[derive(Debug)]
pub struct ChronicleModule {
    /// Log a checkpoint every this many rounds (0 disables).
    checkpoint_every: u64,

    /// Rounds ticked so far.
    rounds: u64,

    /// Latest `time.advanced` payload, written by the bus listener and
    /// drained on tick.
    latest: Rc<RefCell<Option<Value>>>,

    /// Handle for the bus subscription, kept for teardown.
    subscription: Option<ListenerId>,
}

impl ChronicleModule {
    /// Registration identity of the chronicle module.
    pub const ID: ModuleId = ModuleId::new("chronicle");

    /// Modules that must be installed first.
    const DEPS: [ModuleId; 1] = [TimeModule::ID];

    /// Create a chronicle that logs a checkpoint every
    /// `checkpoint_every` rounds (0 disables checkpoint logging).
    pub fn new(checkpoint_every: u64) -> Self {
        Self {
            checkpoint_every,
            rounds: 0,
            latest: Rc::new(RefCell::new(None)),
            subscription: None,
        }
    }

    /// The raw store key the latest observed date is mirrored into.
    pub fn last_seen_key() -> StoreKey {
        StoreKey::raw(LAST_SEEN_KEY)
    }
}

impl Default for ChronicleModule {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Module for ChronicleModule {
    fn id(&self) -> ModuleId {
        Self::ID
    }

    fn name(&self) -> &str {
        "chronicle"
    }

    fn description(&self) -> &str {
        "records the simulated timeline announced by the time module"
    }

    fn dependencies(&self) -> &[ModuleId] {
        &Self::DEPS
    }

    fn install(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError> {
        let latest = Rc::clone(&self.latest);
        let id = ctx.bus.on(TIME_ADVANCED, move |event| {
            *latest.borrow_mut() = Some(event.payload().clone());
        });
        self.subscription = Some(id);
        info!(checkpoint_every = self.checkpoint_every, "chronicle module installed");
        Ok(())
    }

    fn uninstall(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError> {
        if let Some(id) = self.subscription.take() {
            let _ = ctx.bus.off(TIME_ADVANCED, id);
        }
        let _ = ctx.store.delete(&Self::last_seen_key());
        Ok(())
    }

    fn tick(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError> {
        self.rounds = self.rounds.saturating_add(1);

        if let Some(payload) = self.latest.borrow_mut().take() {
            let date = payload.get("date").cloned().unwrap_or(payload);
            let _ = ctx.store.set(&Self::last_seen_key(), date);
        }

        if self.checkpoint_every > 0
            && self.rounds.checked_rem(self.checkpoint_every) == Some(0)
        {
            let last_seen = ctx.store.get(&Self::last_seen_key());
            info!(rounds = self.rounds, last_seen = ?last_seen, "chronicle checkpoint");
        } else {
            debug!(rounds = self.rounds, "chronicle tick");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use vivarium_core::ModuleInstaller;
    use vivarium_events::Event;

    use super::*;
    use crate::time::{TimeModule, TimeSettings};

    fn no_sleep_settings() -> TimeSettings {
        TimeSettings {
            tick_interval_ms: 0,
            start_date: String::from("0001-01-01"),
            days_per_tick: 1,
        }
    }

    #[test]
    fn chronicle_declares_its_time_dependency() {
        let module = ChronicleModule::new(0);
        assert_eq!(module.dependencies(), &[TimeModule::ID]);
    }

    #[test]
    fn install_subscribes_to_time_advanced() {
        let mut ctx = ModuleContext::new();
        let mut module = ChronicleModule::new(0);

        module.install(&mut ctx).unwrap();
        assert_eq!(ctx.bus.listener_count(TIME_ADVANCED), 1);

        module.uninstall(&mut ctx).unwrap();
        assert_eq!(ctx.bus.listener_count(TIME_ADVANCED), 0);
    }

    #[test]
    fn tick_mirrors_the_latest_observed_date() {
        let mut ctx = ModuleContext::new();
        let mut module = ChronicleModule::new(0);
        module.install(&mut ctx).unwrap();

        let mut event = Event::new(TIME_ADVANCED, json!({ "date": "0001-01-02T00:00:00" }));
        let _ = ctx.bus.emit(&mut event);
        module.tick(&mut ctx).unwrap();

        assert_eq!(
            ctx.store.get(&ChronicleModule::last_seen_key()),
            Some(&json!("0001-01-02T00:00:00"))
        );
    }

    #[test]
    fn tick_without_a_new_event_keeps_the_previous_mirror() {
        let mut ctx = ModuleContext::new();
        let mut module = ChronicleModule::new(0);
        module.install(&mut ctx).unwrap();

        let mut event = Event::new(TIME_ADVANCED, json!({ "date": "0001-01-02T00:00:00" }));
        let _ = ctx.bus.emit(&mut event);
        module.tick(&mut ctx).unwrap();
        module.tick(&mut ctx).unwrap();

        assert_eq!(
            ctx.store.get(&ChronicleModule::last_seen_key()),
            Some(&json!("0001-01-02T00:00:00"))
        );
    }

    #[test]
    fn end_to_end_with_the_time_module() {
        let mut ctx = ModuleContext::new();
        let mut installer = ModuleInstaller::new();

        // Chronicle registered first; the installer reorders.
        let time = TimeModule::new(&no_sleep_settings()).unwrap();
        let batch: Vec<Box<dyn Module>> =
            vec![Box::new(ChronicleModule::new(0)), Box::new(time)];
        installer.install(&mut ctx, batch).unwrap();
        assert_eq!(
            installer.tick_order(),
            vec![TimeModule::ID, ChronicleModule::ID]
        );

        let mut scheduler = installer.into_scheduler();
        scheduler.run_round(&mut ctx).unwrap();

        // The clock advanced and the chronicle saw it within the round.
        let mirrored = ctx
            .store
            .get(&ChronicleModule::last_seen_key())
            .cloned()
            .unwrap();
        let current = ctx
            .store
            .get(&TimeModule::current_date_key())
            .cloned()
            .unwrap();
        assert_eq!(mirrored, current);
    }
}
