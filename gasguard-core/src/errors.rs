//! Error Types for the Gas Sensing Engine
//!
//! ## Design Philosophy
//!
//! Every fault in this crate is a local, per-channel condition. Nothing here
//! ever aborts the sampling loop:
//!
//! 1. **Small Size**: Variants carry inline data only (`f32`, `&'static str`),
//!    so faults can be stored in every `Reading` of a tick without allocation.
//!
//! 2. **Copy Semantics**: Faults are returned from the hot path and copied into
//!    published readings.
//!
//! 3. **Actionable Information**: The variant alone tells a collaborator how to
//!    surface the problem (wiring, calibration, warm-up, math).
//!
//! ## Fault Categories
//!
//! ### Channel faults (`SensorFault`)
//! - `SensorDisconnected`: ADC reads zero or full scale
//! - `InvalidCalibration`: persisted R0 missing or implausible, fallback in use
//! - `NotYetSettled`: multiplexed heater still inside its settle window
//! - `EstimationError`: non-positive resistance ratio reached the regression
//! - `OutOfRange`: environmental value outside physical limits
//! - `Unavailable`: the sample source had nothing for this channel this tick
//!
//! ### Persistence (`StorageError`, `CalibrationError`)
//! Only the calibration path touches storage, so these never surface during
//! normal sampling.
//!
//! ### Startup (`ConfigError`)
//! Raised once by `MonitorConfig::validate`.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use gasguard_core::SensorFault;
//!
//! fn describe(fault: SensorFault) -> &'static str {
//!     match fault {
//!         SensorFault::SensorDisconnected => "check wiring",
//!         SensorFault::InvalidCalibration => "run clean-air calibration",
//!         SensorFault::NotYetSettled => "warming up",
//!         _ => "reading unavailable",
//!     }
//! }
//! # assert_eq!(describe(SensorFault::NotYetSettled), "warming up");
//! ```

use thiserror_no_std::Error;

/// Result type for per-channel pipeline steps
pub type FaultResult<T> = Result<T, SensorFault>;

/// Result type for persistent storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Per-channel faults - mark one reading invalid for one tick
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorFault {
    /// Sensor voltage at zero or full scale, resistance undefined
    #[error("Sensor disconnected or saturated")]
    SensorDisconnected,

    /// Persisted R0 missing or out of range; estimate uses the fallback R0
    #[error("Calibration invalid, using fallback baseline")]
    InvalidCalibration,

    /// Heater mode switched recently, sensor output not yet stable
    #[error("Reading not yet settled after heater switch")]
    NotYetSettled,

    /// Resistance ratio was not a finite positive number
    #[error("Cannot estimate concentration from ratio {ratio}")]
    EstimationError {
        /// The offending RS/R0 ratio
        ratio: f32,
    },

    /// Environmental value outside physical plausibility limits
    #[error("Value {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// The reported value
        value: f32,
        /// Minimum plausible value
        min: f32,
        /// Maximum plausible value
        max: f32,
    },

    /// Sample source returned nothing for this channel
    #[error("No sample available")]
    Unavailable,
}

/// Errors from the byte-addressable calibration storage
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Access outside the store's capacity
    #[error("Access at {address}+{len} exceeds capacity {capacity}")]
    OutOfBounds {
        /// Start address of the access
        address: usize,
        /// Number of bytes accessed
        len: usize,
        /// Total store capacity
        capacity: usize,
    },

    /// Backend refused or failed the write
    #[error("Write failed")]
    WriteFailed,

    /// Read-back after write did not match what was written
    #[error("Verification after write failed")]
    VerifyFailed,

    /// Host filesystem error (file-backed storage only)
    #[error("I/O error: {reason}")]
    Io {
        /// Short description of the failing operation
        reason: &'static str,
    },
}

/// Errors from a clean-air calibration attempt
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    /// No usable clean-air resistance samples were collected
    #[error("No valid clean-air samples")]
    NoValidSamples,

    /// Computed R0 falls outside the sensor's plausible range
    #[error("Computed R0 {r0_ohms} ohm is implausible")]
    Implausible {
        /// The rejected baseline resistance
        r0_ohms: f32,
    },

    /// Persisting the new record failed; the previous record is kept
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors detected while validating a `MonitorConfig`
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Warning threshold above danger threshold, or not a number
    #[error("Thresholds for {channel} are not ordered")]
    ThresholdOrder {
        /// Channel name
        channel: &'static str,
    },

    /// A voltage, resistance or count that must be positive is not
    #[error("Parameter {name} must be positive")]
    NonPositive {
        /// Parameter name
        name: &'static str,
    },

    /// Two calibration slots share bytes
    #[error("Storage slots for {first} and {second} overlap")]
    SlotOverlap {
        /// First sensor name
        first: &'static str,
        /// Second sensor name
        second: &'static str,
    },

    /// Any other inconsistent setting
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorFault {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorDisconnected =>
                defmt::write!(fmt, "Sensor disconnected"),
            Self::InvalidCalibration =>
                defmt::write!(fmt, "Calibration invalid"),
            Self::NotYetSettled =>
                defmt::write!(fmt, "Not yet settled"),
            Self::EstimationError { ratio } =>
                defmt::write!(fmt, "Estimation error, ratio {}", ratio),
            Self::OutOfRange { value, min, max } =>
                defmt::write!(fmt, "Value {} outside [{}, {}]", value, min, max),
            Self::Unavailable =>
                defmt::write!(fmt, "Unavailable"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StorageError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfBounds { address, len, capacity } =>
                defmt::write!(fmt, "Access {}+{} beyond {}", address, len, capacity),
            Self::WriteFailed => defmt::write!(fmt, "Write failed"),
            Self::VerifyFailed => defmt::write!(fmt, "Verify failed"),
            Self::Io { reason } => defmt::write!(fmt, "I/O: {}", reason),
        }
    }
}
