//! Per-tick readings and the published tick report
//!
//! A `Reading` is recomputed for every channel on every tick and thrown away
//! once the report has been published. It keeps the intermediate values
//! (raw count, RS) next to the result so display and log collaborators can
//! show *why* a channel is invalid, not only that it is.
//!
//! ```text
//! Reading (one per channel)
//! ├── channel          which quantity
//! ├── raw              ADC count (gas channels)
//! ├── resistance_ohms  RS (gas channels)
//! ├── value            ppm / °C / %RH
//! ├── severity         Normal / Warning / Danger
//! └── fault            why the reading is excluded from aggregation
//! ```

use core::fmt;

use heapless::Vec;

use crate::{
    alarm::{AlarmState, Severity},
    calibration::CalibrationRecord,
    channel::{ChannelId, CHANNEL_COUNT, GAS_SENSOR_COUNT},
    errors::SensorFault,
    heater::HeaterMode,
    time::Timestamp,
};

/// One channel's result for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Channel this reading belongs to
    pub channel: ChannelId,
    /// Raw ADC count, gas channels only
    pub raw: Option<u16>,
    /// Derived sensor resistance RS (Ω), gas channels only
    pub resistance_ohms: Option<f32>,
    /// Concentration (ppm) or physical value (°C, %RH)
    pub value: Option<f32>,
    /// Severity of `value`, if one could be computed
    pub severity: Option<Severity>,
    /// Reason this reading is invalid
    pub fault: Option<SensorFault>,
}

impl Reading {
    /// A valid measurement
    pub const fn measured(channel: ChannelId, value: f32, severity: Severity) -> Self {
        Self {
            channel,
            raw: None,
            resistance_ohms: None,
            value: Some(value),
            severity: Some(severity),
            fault: None,
        }
    }

    /// A reading that produced no value
    pub const fn faulted(channel: ChannelId, fault: SensorFault) -> Self {
        Self {
            channel,
            raw: None,
            resistance_ohms: None,
            value: None,
            severity: None,
            fault: Some(fault),
        }
    }

    /// Attach the raw ADC count
    pub const fn with_raw(mut self, raw: u16) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Attach the derived resistance
    pub const fn with_resistance(mut self, rs_ohms: f32) -> Self {
        self.resistance_ohms = Some(rs_ohms);
        self
    }

    /// Mark an otherwise computed reading as faulted, keeping its value
    pub const fn with_fault(mut self, fault: SensorFault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Whether this reading takes part in alarm aggregation
    pub fn is_valid(&self) -> bool {
        self.fault.is_none() && self.value.is_some()
    }

    /// Value computed against the fallback R0
    pub fn is_low_confidence(&self) -> bool {
        self.fault == Some(SensorFault::InvalidCalibration) && self.value.is_some()
    }
}

/// Readings of one tick, in `ChannelId::ALL` order
pub type ReadingSet = Vec<Reading, CHANNEL_COUNT>;

/// Everything published to display, log and indicator collaborators per tick
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    /// Monotonic time of the tick (ms)
    pub timestamp: Timestamp,
    /// Per-channel readings
    pub readings: ReadingSet,
    /// Aggregate alarm state
    pub alarm: AlarmState,
    /// MQ-9B heater level during the tick
    pub heater_mode: HeaterMode,
    /// Total volatile organic compounds (ppb), informational
    pub tvoc_ppb: Option<f32>,
    /// Air quality index 1-5, informational
    pub aqi: Option<u8>,
    /// Baseline in use per MQ sensor
    pub calibration: [CalibrationRecord; GAS_SENSOR_COUNT],
}

impl TickReport {
    /// Reading for a channel
    pub fn reading(&self, channel: ChannelId) -> Option<&Reading> {
        self.readings.iter().find(|r| r.channel == channel)
    }

    /// Readings excluded from aggregation
    pub fn faulted(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter().filter(|r| !r.is_valid())
    }

    /// Any MQ sensor running on its fallback baseline
    pub fn uses_fallback_calibration(&self) -> bool {
        self.calibration.iter().any(|record| !record.valid)
    }
}

impl fmt::Display for Reading {
    /// `CO=12.3ppm(NORMAL)`, `CH4=--(Reading not yet settled after heater switch)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.channel)?;
        match self.value {
            Some(value) => write!(f, "{:.1}{}", value, self.channel.unit())?,
            None => f.write_str("--")?,
        }
        match (self.fault, self.severity) {
            (Some(SensorFault::InvalidCalibration), Some(level)) => {
                write!(f, "({}, uncalibrated)", level.label())
            }
            (Some(fault), _) => write!(f, "({})", fault),
            (None, Some(level)) => write!(f, "({})", level.label()),
            (None, None) => Ok(()),
        }
    }
}

impl fmt::Display for TickReport {
    /// One line per tick, the way the serial log prints it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}ms", self.timestamp)?;
        match self.alarm.severity() {
            Some(level) => write!(f, " alarm={}", level.label())?,
            None => f.write_str(" alarm=NO-VALID-CHANNELS")?,
        }
        write!(f, " heater={}", self.heater_mode.name())?;
        for reading in &self.readings {
            write!(f, " {}", reading)?;
        }
        if let Some(tvoc) = self.tvoc_ppb {
            write!(f, " TVOC={:.0}ppb", tvoc)?;
        }
        if let Some(aqi) = self.aqi {
            write!(f, " AQI={}", aqi)?;
        }
        Ok(())
    }
}
