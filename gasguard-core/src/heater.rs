//! MQ-9B heater multiplexing
//!
//! ## Why a Scheduler?
//!
//! The MQ-9B reports two gases from one element by switching its heater
//! between two levels with a relay:
//!
//! ```text
//! heater   ──┐ high (CH4) ┌──────── low (CO) ────────┐ high (CH4) ┌──
//!            └────────────┘                          └────────────┘
//!            |<-settle->|  valid CH4                 |<-settle->| ...
//!                         |<--- settle --->| valid CO
//! ```
//!
//! After every step the element takes a while to reach chemical equilibrium
//! at the new temperature, and the time differs per level (20 s for CO,
//! 10 s for CH4). A reading taken inside that window reflects neither gas
//! and must not be evaluated.
//!
//! ## State
//!
//! The state is one tagged mode plus one `(switched_at, settle)` pair, so the
//! "which gas" and "since when" facts cannot drift apart. Only the gas of the
//! selected mode can ever be valid; the other is not being measured at all.
//!
//! ## Cadence
//!
//! The relay alternation runs on a fixed dwell per mode. `cadence_due`
//! reports when the dwell has run out; the caller drives the relay and then
//! records the switch with `switch_to`.

use crate::{
    constants::time::{
        HEATER_DWELL_CH4_MS, HEATER_DWELL_CO_MS, SETTLE_TIME_CH4_MS, SETTLE_TIME_CO_MS,
    },
    errors::{FaultResult, SensorFault},
    time::{elapsed_ms, Timestamp},
};

/// Heater level of the MQ-9B, i.e. which gas it currently measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaterMode {
    /// Low heater voltage, carbon monoxide
    Co,
    /// High heater voltage, methane
    Ch4,
}

impl HeaterMode {
    /// The other mode
    pub const fn toggled(self) -> Self {
        match self {
            HeaterMode::Co => HeaterMode::Ch4,
            HeaterMode::Ch4 => HeaterMode::Co,
        }
    }

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            HeaterMode::Co => "CO",
            HeaterMode::Ch4 => "CH4",
        }
    }
}

/// Settle and dwell durations for both heater levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaterTiming {
    /// Settle window after switching to CO (ms)
    pub co_settle_ms: u64,
    /// Settle window after switching to CH4 (ms)
    pub ch4_settle_ms: u64,
    /// Time in CO mode before switching back (ms)
    pub co_dwell_ms: u64,
    /// Time in CH4 mode before switching back (ms)
    pub ch4_dwell_ms: u64,
    /// Whether the engine alternates the heater itself
    pub auto_cadence: bool,
    /// Mode selected at boot
    pub initial_mode: HeaterMode,
}

impl Default for HeaterTiming {
    fn default() -> Self {
        Self {
            co_settle_ms: SETTLE_TIME_CO_MS,
            ch4_settle_ms: SETTLE_TIME_CH4_MS,
            co_dwell_ms: HEATER_DWELL_CO_MS,
            ch4_dwell_ms: HEATER_DWELL_CH4_MS,
            auto_cadence: true,
            initial_mode: HeaterMode::Co,
        }
    }
}

impl HeaterTiming {
    /// Settle window for a mode
    pub const fn settle_ms(&self, mode: HeaterMode) -> u64 {
        match mode {
            HeaterMode::Co => self.co_settle_ms,
            HeaterMode::Ch4 => self.ch4_settle_ms,
        }
    }

    /// Dwell for a mode
    pub const fn dwell_ms(&self, mode: HeaterMode) -> u64 {
        match mode {
            HeaterMode::Co => self.co_dwell_ms,
            HeaterMode::Ch4 => self.ch4_dwell_ms,
        }
    }
}

/// Tracks the MQ-9B heater mode and its settle window
#[derive(Debug, Clone)]
pub struct HeaterScheduler {
    timing: HeaterTiming,
    mode: HeaterMode,
    switched_at: Timestamp,
    settle_ms: u64,
}

impl HeaterScheduler {
    /// Start in `timing.initial_mode`, settling from `now`
    pub fn new(timing: HeaterTiming, now: Timestamp) -> Self {
        let mode = timing.initial_mode;
        Self {
            timing,
            mode,
            switched_at: now,
            settle_ms: timing.settle_ms(mode),
        }
    }

    /// Currently selected mode
    pub fn current_mode(&self) -> HeaterMode {
        self.mode
    }

    /// When the current mode was selected
    pub fn last_transition(&self) -> Timestamp {
        self.switched_at
    }

    /// Settle window required after switching to `mode`
    pub fn settle_duration(&self, mode: HeaterMode) -> u64 {
        self.timing.settle_ms(mode)
    }

    /// Record a heater switch at `now`
    ///
    /// Switching to the mode already selected restarts its settle window,
    /// since the relay was stepped again.
    pub fn switch_to(&mut self, mode: HeaterMode, now: Timestamp) {
        self.mode = mode;
        self.switched_at = now;
        self.settle_ms = self.timing.settle_ms(mode);
        log_debug!("MQ-9B heater -> {} at {} ms", mode.name(), now);
    }

    /// Whether a reading for `mode` taken at `now` can be trusted
    pub fn is_valid(&self, mode: HeaterMode, now: Timestamp) -> bool {
        mode == self.mode && elapsed_ms(self.switched_at, now) >= self.settle_ms
    }

    /// `is_valid` as a fault for the pipeline
    pub fn gate(&self, mode: HeaterMode, now: Timestamp) -> FaultResult<()> {
        if self.is_valid(mode, now) {
            Ok(())
        } else {
            Err(SensorFault::NotYetSettled)
        }
    }

    /// Milliseconds until the current mode settles (zero once settled)
    pub fn remaining_settle_ms(&self, now: Timestamp) -> u64 {
        self.settle_ms.saturating_sub(elapsed_ms(self.switched_at, now))
    }

    /// Whether the dwell of the current mode has run out
    pub fn dwell_elapsed(&self, now: Timestamp) -> bool {
        elapsed_ms(self.switched_at, now) >= self.timing.dwell_ms(self.mode)
    }

    /// Mode to switch to, once the dwell of the current one has run out
    ///
    /// Does not change state: the caller drives the relay first and calls
    /// `switch_to` only if that succeeded.
    pub fn cadence_due(&self, now: Timestamp) -> Option<HeaterMode> {
        if self.timing.auto_cadence && self.dwell_elapsed(now) {
            Some(self.mode.toggled())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> HeaterScheduler {
        HeaterScheduler::new(HeaterTiming::default(), 0)
    }

    #[test]
    fn invalid_inside_settle_window() {
        let mut heater = scheduler();
        heater.switch_to(HeaterMode::Co, 1_000);

        assert!(!heater.is_valid(HeaterMode::Co, 1_000));
        assert!(!heater.is_valid(HeaterMode::Co, 20_999));
        assert!(heater.is_valid(HeaterMode::Co, 21_000));
    }

    #[test]
    fn ch4_settles_faster() {
        let mut heater = scheduler();
        heater.switch_to(HeaterMode::Ch4, 0);

        assert_eq!(heater.settle_duration(HeaterMode::Ch4), 10_000);
        assert!(!heater.is_valid(HeaterMode::Ch4, 9_999));
        assert!(heater.is_valid(HeaterMode::Ch4, 10_000));
    }

    #[test]
    fn unselected_mode_is_never_valid() {
        let mut heater = scheduler();
        heater.switch_to(HeaterMode::Ch4, 0);

        assert!(!heater.is_valid(HeaterMode::Co, 1_000_000));
        assert_eq!(heater.gate(HeaterMode::Co, 1_000_000), Err(SensorFault::NotYetSettled));
    }

    #[test]
    fn clock_going_back_is_not_settled() {
        let mut heater = scheduler();
        heater.switch_to(HeaterMode::Co, 50_000);
        assert!(!heater.is_valid(HeaterMode::Co, 10_000));
    }

    #[test]
    fn cadence_alternates_on_dwell() {
        let mut heater = scheduler();
        assert_eq!(heater.current_mode(), HeaterMode::Co);

        assert_eq!(heater.cadence_due(HEATER_DWELL_CO_MS - 1), None);
        assert_eq!(heater.cadence_due(HEATER_DWELL_CO_MS), Some(HeaterMode::Ch4));
        // Nothing changes until the switch is confirmed
        assert_eq!(heater.current_mode(), HeaterMode::Co);

        heater.switch_to(HeaterMode::Ch4, HEATER_DWELL_CO_MS);
        assert_eq!(heater.last_transition(), HEATER_DWELL_CO_MS);

        let back = HEATER_DWELL_CO_MS + HEATER_DWELL_CH4_MS;
        assert_eq!(heater.cadence_due(back - 1), None);
        assert_eq!(heater.cadence_due(back), Some(HeaterMode::Co));
    }

    #[test]
    fn cadence_can_be_disabled() {
        let timing = HeaterTiming { auto_cadence: false, ..HeaterTiming::default() };
        let heater = HeaterScheduler::new(timing, 0);
        assert_eq!(heater.cadence_due(u64::MAX), None);
    }

    #[test]
    fn remaining_settle_counts_down() {
        let heater = scheduler();
        assert_eq!(heater.remaining_settle_ms(5_000), 15_000);
        assert_eq!(heater.remaining_settle_ms(25_000), 0);
    }
}
