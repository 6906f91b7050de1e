//! Gas sensing and alarm engine for GasGuard
//!
//! Turns raw ADC counts from MQ-series resistive gas sensors into calibrated
//! concentrations and raises tiered alarms when conditions become hazardous.
//! Designed for microcontroller main loops with no allocator.
//!
//! Key constraints:
//! - No heap allocation anywhere in the engine
//! - Single-threaded, non-blocking: every wait is a deadline check
//! - One faulty channel never takes the others down
//!
//! ```no_run
//! use gasguard_core::{MonitorConfig, SamplingLoop};
//! use gasguard_core::calibration::{CalibrationStore, MemoryStorage};
//!
//! let config = MonitorConfig::default();
//! let store = CalibrationStore::new(MemoryStorage::<64>::new(), &config).unwrap();
//! let mut monitor = SamplingLoop::new(config, store, 0);
//!
//! // In the main loop:
//! // monitor.poll(now_ms, &mut adc, &mut relay, &mut display);
//! # let _ = &mut monitor;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod alarm;
pub mod calibration;
pub mod channel;
pub mod config;
pub mod constants;
pub mod errors;
pub mod estimator;
pub mod heater;
pub mod reading;
pub mod resistance;
pub mod sampling;
pub mod sink;
pub mod time;
pub mod validators;

// Public API
pub use alarm::{AlarmEvaluator, AlarmState, Severity, ThresholdPair};
pub use channel::{ChannelId, GasSensor};
pub use config::MonitorConfig;
pub use errors::{CalibrationError, ConfigError, FaultResult, SensorFault, StorageError};
pub use estimator::Regression;
pub use heater::{HeaterMode, HeaterScheduler};
pub use reading::{Reading, ReadingSet, TickReport};
pub use resistance::ResistanceModel;
pub use sampling::{EnvironmentSample, HeaterControl, SampleSource, SamplingLoop, TickOutcome};
pub use sink::ResultSink;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
