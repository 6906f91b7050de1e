//! Constants for GasGuard Core
//!
//! Every numeric default the engine uses is defined here with its source, so
//! `MonitorConfig::default()` reads as a list of references rather than magic
//! numbers.
//!
//! ## Organization
//!
//! - **Sensors**: MQ-series electrical characteristics, regression
//!   coefficients and calibration storage layout
//! - **Thresholds**: Two-tier (warning/danger) alarm limits per channel
//! - **Time**: Sampling, heater settle and calibration timing
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Cite a datasheet or exposure standard for every new limit
//! 3. Include units in names

/// MQ sensor characteristics, regression coefficients and storage slots.
pub mod sensors;

/// Warning and danger alarm thresholds.
pub mod thresholds;

/// Sampling, heater and calibration timing.
pub mod time;

pub use sensors::{
    ADC_MAX_COUNT, ADC_REFERENCE_VOLTAGE, LOAD_RESISTANCE_OHMS, SUPPLY_VOLTAGE,
    CALIBRATION_SLOT_SIZE, R0_FALLBACK_OHMS,
};

pub use time::{
    SAMPLING_INTERVAL_MS, SETTLE_TIME_CO_MS, SETTLE_TIME_CH4_MS,
};
