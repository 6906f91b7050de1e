//! MQ Sensor Characteristics
//!
//! MQ sensors change the resistance of a heated tin-oxide element in the
//! presence of their target gas. The firmware reads the element through a
//! voltage divider with a fixed load resistor and converts the resulting
//! resistance ratio to ppm with a power-law fit of the datasheet sensitivity
//! curve:
//!
//! ```text
//! ppm = a * (RS / R0)^b
//! ```
//!
//! `a` and `b` below come from log-log regressions of those curves. R0 is the
//! element resistance in clean air and is obtained by calibration.

// ===== ADC AND DIVIDER =====

/// ADC reference voltage (V).
///
/// Arduino Nano class boards run the ADC from the 5 V rail.
pub const ADC_REFERENCE_VOLTAGE: f32 = 5.0;

/// Supply voltage across the sensor/load divider (V).
pub const SUPPLY_VOLTAGE: f32 = 5.0;

/// ADC resolution in bits.
pub const ADC_BIT_RESOLUTION: u8 = 10;

/// Full-scale ADC count (2^bits - 1).
pub const ADC_MAX_COUNT: u16 = (1 << ADC_BIT_RESOLUTION) - 1;

/// Load resistor in series with each sensor (Ω).
///
/// Source: MQ breakout boards ship with a 10 kΩ load resistor
pub const LOAD_RESISTANCE_OHMS: f32 = 10_000.0;

// ===== CALIBRATION STORAGE =====

/// Bytes per calibration slot: one little-endian `f32`.
pub const CALIBRATION_SLOT_SIZE: usize = 4;

/// EEPROM address of the MQ-8 R0 slot.
pub const SLOT_ADDRESS_MQ8: u16 = 0;

/// EEPROM address of the MQ-136 R0 slot.
pub const SLOT_ADDRESS_MQ136: u16 = 4;

/// EEPROM address of the MQ-137 R0 slot.
pub const SLOT_ADDRESS_MQ137: u16 = 8;

/// EEPROM address of the MQ-9B R0 slot.
pub const SLOT_ADDRESS_MQ9B: u16 = 12;

/// Conservative R0 used when the persisted value is missing or corrupt (Ω).
///
/// Midpoint of the typical 2 kΩ-20 kΩ clean-air resistance band quoted in
/// MQ-series datasheets.
pub const R0_FALLBACK_OHMS: f32 = 10_000.0;

/// Smallest R0 accepted as a real calibration (Ω).
pub const R0_PLAUSIBLE_MIN_OHMS: f32 = 100.0;

/// Largest R0 accepted as a real calibration (Ω).
pub const R0_PLAUSIBLE_MAX_OHMS: f32 = 1_000_000.0;

// ===== CLEAN AIR RATIOS (RS/R0 in clean air) =====

/// MQ-8 clean-air ratio.
pub const MQ8_RATIO_CLEAN_AIR: f32 = 70.0;

/// MQ-136 clean-air ratio.
pub const MQ136_RATIO_CLEAN_AIR: f32 = 3.6;

/// MQ-137 clean-air ratio.
pub const MQ137_RATIO_CLEAN_AIR: f32 = 4.2;

/// MQ-9B clean-air ratio.
pub const MQ9B_RATIO_CLEAN_AIR: f32 = 9.6;

// ===== REGRESSION COEFFICIENTS =====

/// Hydrogen (MQ-8) scale.
pub const A_H2: f32 = 71.7592;
/// Hydrogen (MQ-8) exponent.
pub const B_H2: f32 = -0.9760;

/// Hydrogen sulfide (MQ-136) scale.
pub const A_H2S: f32 = 1.0715;
/// Hydrogen sulfide (MQ-136) exponent.
pub const B_H2S: f32 = -0.8877;

/// Ammonia (MQ-137) scale.
pub const A_NH3: f32 = 1.0613;
/// Ammonia (MQ-137) exponent.
pub const B_NH3: f32 = -0.8905;

/// Methane (MQ-9B, high heater) scale.
pub const A_CH4: f32 = 4.9059;
/// Methane (MQ-9B, high heater) exponent.
pub const B_CH4: f32 = -0.6699;

/// Carbon monoxide (MQ-9B, low heater) scale.
pub const A_CO: f32 = 4.8726;
/// Carbon monoxide (MQ-9B, low heater) exponent.
pub const B_CO: f32 = -0.6989;

// ===== ENVIRONMENTAL PLAUSIBILITY =====

/// Lowest temperature the environmental sensor can report (°C).
///
/// Source: AHT2x operating range
pub const TEMP_SENSOR_MIN_C: f32 = -40.0;

/// Highest temperature the environmental sensor can report (°C).
pub const TEMP_SENSOR_MAX_C: f32 = 85.0;

/// Relative humidity lower bound (%).
pub const HUMIDITY_SENSOR_MIN_PCT: f32 = 0.0;

/// Relative humidity upper bound (%).
pub const HUMIDITY_SENSOR_MAX_PCT: f32 = 100.0;

/// Lowest equivalent CO2 the gas sensor reports (ppm).
pub const CO2_SENSOR_MIN_PPM: f32 = 0.0;

/// Highest equivalent CO2 the gas sensor reports (ppm).
///
/// Source: ENS160 eCO2 output register is 16 bit
pub const CO2_SENSOR_MAX_PPM: f32 = 65_000.0;
