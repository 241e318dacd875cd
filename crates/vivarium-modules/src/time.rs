//! Simulated-clock module.
//!
//! Advances a calendar date by a configured number of days every tick,
//! publishes the current date to the store under `SimTime:current`, and
//! emits a `time.advanced` event. The module paces the whole loop by
//! sleeping for its configured interval at the start of each tick --
//! the scheduler itself enforces no pacing, so the clock's sleep sets
//! the frame rate for every module behind it.
//!
//! # Design Principles
//!
//! - Date arithmetic is checked; running the simulation past the
//!   calendar's end surfaces an error instead of wrapping.
//! - Every write goes through the typed store key, so the per-type
//!   history accumulates the full simulated timeline.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use vivarium_core::{Module, ModuleContext, ModuleError, ModuleId};
use vivarium_events::Event;
use vivarium_store::StoreKey;

/// Event kind emitted after each date advance.
pub const TIME_ADVANCED: &str = "time.advanced";

/// Store key type under which the simulated date history accrues.
pub const SIM_TIME_KEY_TYPE: &str = "SimTime";

/// Errors that can occur constructing the time module.
#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    /// The configured start date does not parse as `YYYY-MM-DD`.
    #[error("invalid start date: {value}")]
    InvalidStartDate {
        /// The rejected configuration value.
        value: String,
    },
}

/// Time module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeSettings {
    /// Real-time milliseconds slept at the start of each tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Simulated start date in `YYYY-MM-DD` form.
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// Simulated days advanced per tick.
    #[serde(default = "default_days_per_tick")]
    pub days_per_tick: u64,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            start_date: default_start_date(),
            days_per_tick: default_days_per_tick(),
        }
    }
}

/// One tick at roughly 60 frames per second.
const fn default_tick_interval_ms() -> u64 {
    16
}

fn default_start_date() -> String {
    String::from("0001-01-01")
}

const fn default_days_per_tick() -> u64 {
    1
}

/// The simulated-clock module.
#[derive(Debug)]
pub struct TimeModule {
    /// Sleep duration per tick.
    interval: Duration,

    /// Current simulated date, advanced every tick.
    current: NaiveDateTime,

    /// Simulated days advanced per tick.
    days_per_tick: u64,
}

impl TimeModule {
    /// Registration identity of the time module.
    pub const ID: ModuleId = ModuleId::new("time");

    /// Create a time module from settings.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidStartDate`] if the start date does
    /// not parse as `YYYY-MM-DD`.
    pub fn new(settings: &TimeSettings) -> Result<Self, TimeError> {
        let date = chrono::NaiveDate::parse_from_str(&settings.start_date, "%Y-%m-%d").map_err(
            |_err| TimeError::InvalidStartDate {
                value: settings.start_date.clone(),
            },
        )?;

        Ok(Self {
            interval: Duration::from_millis(settings.tick_interval_ms),
            current: date.and_time(NaiveTime::MIN),
            days_per_tick: settings.days_per_tick,
        })
    }

    /// The store key holding the current simulated date.
    pub fn current_date_key() -> StoreKey {
        StoreKey::typed(SIM_TIME_KEY_TYPE, "current")
    }

    /// The current simulated date.
    pub const fn current_date(&self) -> NaiveDateTime {
        self.current
    }

    /// Advance the simulated date by the configured days.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::Failed`] if the date would overflow the
    /// calendar range.
    fn advance(&mut self) -> Result<(), ModuleError> {
        self.current = self
            .current
            .checked_add_days(chrono::Days::new(self.days_per_tick))
            .ok_or_else(|| ModuleError::Failed {
                reason: String::from("simulated date overflowed the calendar range"),
            })?;
        Ok(())
    }
}

impl Module for TimeModule {
    fn id(&self) -> ModuleId {
        Self::ID
    }

    fn name(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "simulates and advances the calendar date"
    }

    fn install(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError> {
        let _ = ctx
            .store
            .set_value(&Self::current_date_key(), &self.current)?;
        info!(start = %self.current, days_per_tick = self.days_per_tick, "time module installed");
        Ok(())
    }

    fn uninstall(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError> {
        let _ = ctx.store.delete(&Self::current_date_key());
        Ok(())
    }

    fn tick(&mut self, ctx: &mut ModuleContext) -> Result<(), ModuleError> {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }

        self.advance()?;

        let changed = ctx
            .store
            .set_value(&Self::current_date_key(), &self.current)?;
        debug!(date = %self.current, changed, "simulated date advanced");

        let mut event = Event::new(TIME_ADVANCED, json!({ "date": self.current }));
        let _ = ctx.bus.emit(&mut event);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Settings with no sleep, for fast tests.
    fn test_settings() -> TimeSettings {
        TimeSettings {
            tick_interval_ms: 0,
            start_date: String::from("0001-01-01"),
            days_per_tick: 1,
        }
    }

    #[test]
    fn default_settings_match_the_reference_pace() {
        let settings = TimeSettings::default();
        assert_eq!(settings.tick_interval_ms, 16);
        assert_eq!(settings.start_date, "0001-01-01");
        assert_eq!(settings.days_per_tick, 1);
    }

    #[test]
    fn invalid_start_date_is_rejected() {
        let settings = TimeSettings {
            start_date: String::from("year one"),
            ..test_settings()
        };
        let err = TimeModule::new(&settings).unwrap_err();
        assert_eq!(err.to_string(), "invalid start date: year one");
    }

    #[test]
    fn install_seeds_the_current_date() {
        let mut ctx = ModuleContext::new();
        let mut module = TimeModule::new(&test_settings()).unwrap();

        module.install(&mut ctx).unwrap();

        let seeded: NaiveDateTime = ctx
            .store
            .fetch_as(&TimeModule::current_date_key())
            .unwrap();
        assert_eq!(seeded, module.current_date());
    }

    #[test]
    fn tick_advances_by_the_configured_days() {
        let mut ctx = ModuleContext::new();
        let settings = TimeSettings {
            days_per_tick: 3,
            ..test_settings()
        };
        let mut module = TimeModule::new(&settings).unwrap();
        module.install(&mut ctx).unwrap();

        module.tick(&mut ctx).unwrap();

        let stored: NaiveDateTime = ctx
            .store
            .fetch_as(&TimeModule::current_date_key())
            .unwrap();
        assert_eq!(stored.date().to_string(), "0001-01-04");
    }

    #[test]
    fn history_accrues_one_entry_per_write() {
        let mut ctx = ModuleContext::new();
        let mut module = TimeModule::new(&test_settings()).unwrap();
        module.install(&mut ctx).unwrap();

        module.tick(&mut ctx).unwrap();
        module.tick(&mut ctx).unwrap();

        // Seed write plus two tick writes.
        assert_eq!(ctx.store.list_by_type(SIM_TIME_KEY_TYPE).len(), 3);
    }

    #[test]
    fn tick_emits_the_advanced_event_with_the_new_date() {
        let mut ctx = ModuleContext::new();
        let mut module = TimeModule::new(&test_settings()).unwrap();
        module.install(&mut ctx).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _ = ctx.bus.on(TIME_ADVANCED, {
            let seen = Rc::clone(&seen);
            move |event: &mut Event| {
                if let Some(date) = event.payload().get("date") {
                    seen.borrow_mut().push(date.clone());
                }
            }
        });

        module.tick(&mut ctx).unwrap();

        let dates = seen.borrow();
        assert_eq!(dates.len(), 1);
        let date: NaiveDateTime =
            serde_json::from_value(dates.first().unwrap().clone()).unwrap();
        assert_eq!(date, module.current_date());
    }

    #[test]
    fn uninstall_clears_the_current_date_slot() {
        let mut ctx = ModuleContext::new();
        let mut module = TimeModule::new(&test_settings()).unwrap();
        module.install(&mut ctx).unwrap();

        module.uninstall(&mut ctx).unwrap();

        assert!(ctx.store.get(&TimeModule::current_date_key()).is_none());
        // History is not rewritten by teardown.
        assert_eq!(ctx.store.list_by_type(SIM_TIME_KEY_TYPE).len(), 1);
    }
}
