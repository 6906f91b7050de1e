//! Time-Related Constants
//!
//! All durations are milliseconds on the monotonic device clock.

/// Interval between sampling ticks (ms).
pub const SAMPLING_INTERVAL_MS: u64 = 5_000;

/// MQ-9B settle time after switching the heater to the CO level (ms).
pub const SETTLE_TIME_CO_MS: u64 = 20_000;

/// MQ-9B settle time after switching the heater to the CH4 level (ms).
pub const SETTLE_TIME_CH4_MS: u64 = 10_000;

/// Time spent in CO mode before the relay flips back (ms).
///
/// Settle window plus two sampling ticks of settled readings.
pub const HEATER_DWELL_CO_MS: u64 = SETTLE_TIME_CO_MS + 2 * SAMPLING_INTERVAL_MS;

/// Time spent in CH4 mode before the relay flips back (ms).
pub const HEATER_DWELL_CH4_MS: u64 = SETTLE_TIME_CH4_MS + 2 * SAMPLING_INTERVAL_MS;

/// Clean-air samples averaged per sensor during calibration.
pub const CALIBRATION_SAMPLE_COUNT: u16 = 10;

/// Upper bound on calibration samples kept per sensor.
pub const MAX_CALIBRATION_SAMPLES: usize = 64;

/// Interval between calibration samples (ms).
pub const CALIBRATION_SAMPLE_INTERVAL_MS: u64 = 1_000;
