//! Monitor configuration
//!
//! `MonitorConfig::default()` reproduces the deployed firmware: four MQ
//! sensors behind 10 kΩ load resistors on a 10-bit 5 V ADC, the MQ-9B
//! alternating between CO and CH4, a 5 s sampling interval and two-tier
//! thresholds for all eight channels.
//!
//! ```rust
//! use gasguard_core::{ChannelId, MonitorConfig, ThresholdPair};
//!
//! let config = MonitorConfig::default()
//!     .with_sampling_interval(2_000)
//!     .with_thresholds(ChannelId::Co, ThresholdPair::new(25.0, 50.0));
//! assert!(config.validate().is_ok());
//! ```

use crate::{
    alarm::ThresholdPair,
    calibration::StorageSlot,
    channel::{ChannelId, GasSensor, CHANNEL_COUNT, GAS_CHANNEL_COUNT, GAS_SENSOR_COUNT},
    constants::{sensors::*, thresholds::*, time::*},
    errors::ConfigError,
    estimator::Regression,
    heater::{HeaterMode, HeaterTiming},
    resistance::ResistanceModel,
    validators::EnvironmentLimits,
};

/// Per-sensor calibration parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasSensorSpec {
    /// Physical sensor
    pub sensor: GasSensor,
    /// RS/R0 in clean air, from the datasheet
    pub clean_air_ratio: f32,
    /// Where R0 is persisted
    pub slot: StorageSlot,
    /// R0 used when nothing plausible is stored (Ω)
    pub fallback_r0_ohms: f32,
    /// Smallest R0 accepted (Ω)
    pub r0_min_ohms: f32,
    /// Largest R0 accepted (Ω)
    pub r0_max_ohms: f32,
}

impl GasSensorSpec {
    /// Spec with the default fallback and plausibility range
    pub const fn new(sensor: GasSensor, clean_air_ratio: f32, slot_address: u16) -> Self {
        Self {
            sensor,
            clean_air_ratio,
            slot: StorageSlot::new(slot_address),
            fallback_r0_ohms: R0_FALLBACK_OHMS,
            r0_min_ohms: R0_PLAUSIBLE_MIN_OHMS,
            r0_max_ohms: R0_PLAUSIBLE_MAX_OHMS,
        }
    }

    /// Whether `r0` could be a real clean-air baseline for this sensor
    pub fn is_plausible_r0(&self, r0: f32) -> bool {
        r0.is_finite() && r0 >= self.r0_min_ohms && r0 <= self.r0_max_ohms
    }
}

/// How one gas channel is derived from a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasChannelSpec {
    /// Output channel
    pub channel: ChannelId,
    /// Sensor the channel reads
    pub sensor: GasSensor,
    /// Heater mode the channel needs, `None` for single-gas sensors
    pub heater_mode: Option<HeaterMode>,
    /// Power-law fit of the sensitivity curve
    pub regression: Regression,
}

/// Clean-air calibration settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationSettings {
    /// Good samples averaged per sensor
    pub samples_per_sensor: u16,
    /// Spacing between calibration samples (ms)
    pub sample_interval_ms: u64,
    /// Start a session on the first poll after boot
    pub on_boot: bool,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            samples_per_sensor: CALIBRATION_SAMPLE_COUNT,
            sample_interval_ms: CALIBRATION_SAMPLE_INTERVAL_MS,
            on_boot: false,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorConfig {
    /// ADC and voltage divider
    pub adc: ResistanceModel,
    /// MQ sensors in `GasSensor::ALL` order
    pub sensors: [GasSensorSpec; GAS_SENSOR_COUNT],
    /// Gas channels in `ChannelId::ALL` order
    pub gas_channels: [GasChannelSpec; GAS_CHANNEL_COUNT],
    /// Warning/danger pair per channel, indexed by `ChannelId::index`
    pub thresholds: [ThresholdPair; CHANNEL_COUNT],
    /// MQ-9B heater timing
    pub heater: HeaterTiming,
    /// Time between sampling ticks (ms)
    pub sampling_interval_ms: u64,
    /// Calibration settings
    pub calibration: CalibrationSettings,
    /// Plausibility limits for temperature, humidity and CO2
    pub environment: EnvironmentLimits,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            adc: ResistanceModel::default(),
            sensors: [
                GasSensorSpec::new(GasSensor::Mq8, MQ8_RATIO_CLEAN_AIR, SLOT_ADDRESS_MQ8),
                GasSensorSpec::new(GasSensor::Mq136, MQ136_RATIO_CLEAN_AIR, SLOT_ADDRESS_MQ136),
                GasSensorSpec::new(GasSensor::Mq137, MQ137_RATIO_CLEAN_AIR, SLOT_ADDRESS_MQ137),
                GasSensorSpec::new(GasSensor::Mq9b, MQ9B_RATIO_CLEAN_AIR, SLOT_ADDRESS_MQ9B),
            ],
            gas_channels: [
                GasChannelSpec {
                    channel: ChannelId::H2,
                    sensor: GasSensor::Mq8,
                    heater_mode: None,
                    regression: Regression::new(A_H2, B_H2),
                },
                GasChannelSpec {
                    channel: ChannelId::H2s,
                    sensor: GasSensor::Mq136,
                    heater_mode: None,
                    regression: Regression::new(A_H2S, B_H2S),
                },
                GasChannelSpec {
                    channel: ChannelId::Nh3,
                    sensor: GasSensor::Mq137,
                    heater_mode: None,
                    regression: Regression::new(A_NH3, B_NH3),
                },
                GasChannelSpec {
                    channel: ChannelId::Co,
                    sensor: GasSensor::Mq9b,
                    heater_mode: Some(HeaterMode::Co),
                    regression: Regression::new(A_CO, B_CO),
                },
                GasChannelSpec {
                    channel: ChannelId::Ch4,
                    sensor: GasSensor::Mq9b,
                    heater_mode: Some(HeaterMode::Ch4),
                    regression: Regression::new(A_CH4, B_CH4),
                },
            ],
            // ChannelId::ALL order
            thresholds: [
                ThresholdPair::new(H2_WARNING_PPM, H2_DANGER_PPM),
                ThresholdPair::new(H2S_WARNING_PPM, H2S_DANGER_PPM),
                ThresholdPair::new(NH3_WARNING_PPM, NH3_DANGER_PPM),
                ThresholdPair::new(CO_WARNING_PPM, CO_DANGER_PPM),
                ThresholdPair::new(CH4_WARNING_PPM, CH4_DANGER_PPM),
                ThresholdPair::new(CO2_WARNING_PPM, CO2_DANGER_PPM),
                ThresholdPair::new(TEMP_WARNING_C, TEMP_DANGER_C),
                ThresholdPair::new(HUMIDITY_WARNING_PCT, HUMIDITY_DANGER_PCT),
            ],
            heater: HeaterTiming::default(),
            sampling_interval_ms: SAMPLING_INTERVAL_MS,
            calibration: CalibrationSettings::default(),
            environment: EnvironmentLimits::default(),
        }
    }
}

impl MonitorConfig {
    /// Set the sampling interval
    pub fn with_sampling_interval(mut self, interval_ms: u64) -> Self {
        self.sampling_interval_ms = interval_ms;
        self
    }

    /// Replace the thresholds of one channel
    pub fn with_thresholds(mut self, channel: ChannelId, pair: ThresholdPair) -> Self {
        self.thresholds[channel.index()] = pair;
        self
    }

    /// Replace the heater timing
    pub fn with_heater(mut self, heater: HeaterTiming) -> Self {
        self.heater = heater;
        self
    }

    /// Run a calibration session right after boot
    pub fn with_calibration_on_boot(mut self, on_boot: bool) -> Self {
        self.calibration.on_boot = on_boot;
        self
    }

    /// Spec of one MQ sensor
    pub fn sensor(&self, sensor: GasSensor) -> &GasSensorSpec {
        &self.sensors[sensor.index()]
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.adc.reference_voltage > 0.0) {
            return Err(ConfigError::NonPositive { name: "reference_voltage" });
        }
        if !(self.adc.supply_voltage > 0.0) {
            return Err(ConfigError::NonPositive { name: "supply_voltage" });
        }
        if !(self.adc.load_resistance_ohms > 0.0) {
            return Err(ConfigError::NonPositive { name: "load_resistance_ohms" });
        }
        if self.adc.max_count == 0 {
            return Err(ConfigError::NonPositive { name: "max_count" });
        }
        if self.sampling_interval_ms == 0 {
            return Err(ConfigError::NonPositive { name: "sampling_interval_ms" });
        }

        for (i, spec) in self.sensors.iter().enumerate() {
            if spec.sensor.index() != i {
                return Err(ConfigError::Invalid("sensor specs out of order"));
            }
            if !(spec.clean_air_ratio > 0.0) || !spec.clean_air_ratio.is_finite() {
                return Err(ConfigError::NonPositive { name: "clean_air_ratio" });
            }
            if !spec.is_plausible_r0(spec.fallback_r0_ohms) {
                return Err(ConfigError::Invalid("fallback R0 outside plausible range"));
            }
            for other in &self.sensors[i + 1..] {
                if spec.slot.overlaps(&other.slot) {
                    return Err(ConfigError::SlotOverlap {
                        first: spec.sensor.name(),
                        second: other.sensor.name(),
                    });
                }
            }
        }

        for gas in &self.gas_channels {
            if gas.channel.gas_sensor() != Some(gas.sensor) {
                return Err(ConfigError::Invalid("gas channel bound to the wrong sensor"));
            }
            if (gas.sensor == GasSensor::Mq9b) != gas.heater_mode.is_some() {
                return Err(ConfigError::Invalid("heater mode set on the wrong sensor"));
            }
        }

        for channel in ChannelId::ALL {
            if !self.thresholds[channel.index()].is_ordered() {
                return Err(ConfigError::ThresholdOrder { channel: channel.name() });
            }
        }

        for mode in [HeaterMode::Co, HeaterMode::Ch4] {
            if self.heater.dwell_ms(mode) < self.heater.settle_ms(mode) {
                return Err(ConfigError::Invalid("heater dwell shorter than settle time"));
            }
        }

        let samples = self.calibration.samples_per_sensor as usize;
        if samples == 0 || samples > MAX_CALIBRATION_SAMPLES {
            return Err(ConfigError::Invalid("calibration sample count out of range"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(MonitorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_matches_firmware() {
        let config = MonitorConfig::default();
        assert_eq!(config.sampling_interval_ms, 5_000);
        assert_eq!(config.heater.co_settle_ms, 20_000);
        assert_eq!(config.heater.ch4_settle_ms, 10_000);
        assert_eq!(config.sensor(GasSensor::Mq8).clean_air_ratio, 70.0);
        assert_eq!(config.sensor(GasSensor::Mq9b).slot.address, 12);
        assert_eq!(config.thresholds[ChannelId::Co.index()], ThresholdPair::new(35.0, 50.0));
        assert_eq!(config.thresholds[ChannelId::Temperature.index()].danger, 35.0);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = MonitorConfig::default()
            .with_thresholds(ChannelId::Nh3, ThresholdPair::new(50.0, 25.0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { channel: "NH3" })
        );
    }

    #[test]
    fn overlapping_slots_rejected() {
        let mut config = MonitorConfig::default();
        config.sensors[1].slot = StorageSlot::new(2);
        assert!(matches!(config.validate(), Err(ConfigError::SlotOverlap { .. })));
    }

    #[test]
    fn zero_interval_rejected() {
        let config = MonitorConfig::default().with_sampling_interval(0);
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn dwell_must_cover_settle() {
        let config = MonitorConfig::default().with_heater(HeaterTiming {
            co_dwell_ms: 1_000,
            ..HeaterTiming::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn plausible_r0_range() {
        let spec = MonitorConfig::default().sensors[0];
        assert!(spec.is_plausible_r0(10_000.0));
        assert!(!spec.is_plausible_r0(f32::NAN));
        assert!(!spec.is_plausible_r0(1.0));
        assert!(!spec.is_plausible_r0(1e9));
    }
}
