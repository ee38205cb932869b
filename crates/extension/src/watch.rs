//! Controller updates driven by timers, observers and storage callbacks.
//!
//! All of them can fire while a key handler holds the controller, so every update
//! uses `try_borrow_mut` and copes with the borrow being taken.

use aihotkeys_actions::Controller;
use aihotkeys_core::WatchConfig;
use aihotkeys_page::Location;

use serde_json::Value;
use std::cell::RefCell;

/// Poll interval baked in at build time through `AIHOTKEYS_POLL_INTERVAL_MS`
pub const BUILD_POLL_INTERVAL: Option<&str> = option_env!("AIHOTKEYS_POLL_INTERVAL_MS");

/// Watch settings from a raw millisecond value; unset, zero or unparsable means default
pub fn watch_config(raw: Option<&str>) -> WatchConfig {
    let Some(raw) = raw else { return WatchConfig::default() };
    match raw.trim().parse::<u64>() {
        Ok(poll_interval_ms) if poll_interval_ms > 0 => WatchConfig { poll_interval_ms },
        _ => {
            tracing::warn!(value = raw, "invalid poll interval, using default");
            WatchConfig::default()
        }
    }
}

/// Timeout argument for `setInterval`
pub fn timer_millis(config: &WatchConfig) -> i32 {
    i32::try_from(config.poll_interval().as_millis()).unwrap_or(i32::MAX)
}

/// Check the location; returns false when the controller was busy and the check was
/// skipped, leaving it to the next poll tick
pub fn refresh_location(controller: &RefCell<Controller>, location: &Location) -> bool {
    match controller.try_borrow_mut() {
        Ok(mut controller) => {
            controller.location_changed(location);
            true
        }
        Err(_) => {
            tracing::debug!("controller busy, location check skipped until the next poll");
            false
        }
    }
}

/// Latest shortcut record that arrived while the controller was busy
///
/// Only the newest record is kept; it is applied on the next [`PendingRecord::flush`].
#[derive(Debug, Default)]
pub struct PendingRecord {
    record: RefCell<Option<Option<Value>>>,
}

impl PendingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild now, or queue the record; true if it was applied
    pub fn offer(&self, controller: &RefCell<Controller>, record: Option<Value>) -> bool {
        match controller.try_borrow_mut() {
            Ok(mut controller) => {
                controller.rebuild(record.as_ref());
                self.record.replace(None);
                true
            }
            Err(_) => {
                tracing::debug!("controller busy, shortcut update queued");
                self.record.replace(Some(record));
                false
            }
        }
    }

    /// Apply the queued record, if any; true if one was applied
    pub fn flush(&self, controller: &RefCell<Controller>) -> bool {
        let queued = self.record.borrow_mut().take();
        match queued {
            Some(record) => self.offer(controller, record),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.record.borrow().is_some()
    }
}
