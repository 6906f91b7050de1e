//! Plausibility checks for environmental readings
//!
//! ## Overview
//!
//! Temperature, humidity and CO2 arrive as ready-made floating-point values
//! from the environmental sensor. Before they are allowed to raise an alarm
//! they must at least be numbers the sensor can physically report:
//!
//! - **Valid number**: NaN and infinities come from failed bus transfers
//! - **Physical range**: a humidity of 130 % or a temperature of −200 °C is a
//!   broken sensor, not a hazard
//!
//! A failed check marks the channel `OutOfRange` for the tick and leaves it
//! out of aggregation, exactly like a disconnected gas sensor.
//!
//! ## Usage Example
//!
//! ```rust
//! use gasguard_core::validators::RangeValidator;
//!
//! let humidity = RangeValidator::humidity();
//! assert!(humidity.validate(45.0).is_ok());
//! assert!(humidity.validate(f32::NAN).is_err());
//! ```

use crate::{
    constants::sensors::{
        CO2_SENSOR_MAX_PPM, CO2_SENSOR_MIN_PPM, HUMIDITY_SENSOR_MAX_PCT,
        HUMIDITY_SENSOR_MIN_PCT, TEMP_SENSOR_MAX_C, TEMP_SENSOR_MIN_C,
    },
    errors::{FaultResult, SensorFault},
};

/// Values that can be checked for being real numbers
pub trait Validatable {
    /// Check if the value is a usable number (not NaN or infinite)
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

/// Check if a value is within `[min, max]`
pub fn check_range(value: f32, min: f32, max: f32) -> FaultResult<()> {
    if value < min || value > max {
        Err(SensorFault::OutOfRange { value, min, max })
    } else {
        Ok(())
    }
}

/// Inclusive physical range for one environmental quantity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeValidator {
    /// Minimum plausible value
    pub min: f32,
    /// Maximum plausible value
    pub max: f32,
}

impl RangeValidator {
    /// Create with custom limits (swapped if given in the wrong order)
    pub fn new(min: f32, max: f32) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        Self { min, max }
    }

    /// Air temperature in °C
    pub const fn temperature() -> Self {
        Self { min: TEMP_SENSOR_MIN_C, max: TEMP_SENSOR_MAX_C }
    }

    /// Relative humidity in %
    pub const fn humidity() -> Self {
        Self { min: HUMIDITY_SENSOR_MIN_PCT, max: HUMIDITY_SENSOR_MAX_PCT }
    }

    /// Equivalent CO2 in ppm
    pub const fn co2() -> Self {
        Self { min: CO2_SENSOR_MIN_PPM, max: CO2_SENSOR_MAX_PPM }
    }

    /// Return the value if it is a plausible reading
    pub fn validate(&self, value: f32) -> FaultResult<f32> {
        if !value.is_valid() {
            return Err(SensorFault::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }

        check_range(value, self.min, self.max)?;
        Ok(value)
    }
}

/// Plausibility limits for all environmental channels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentLimits {
    /// Temperature limits
    pub temperature: RangeValidator,
    /// Humidity limits
    pub humidity: RangeValidator,
    /// CO2 limits
    pub co2: RangeValidator,
}

impl Default for EnvironmentLimits {
    fn default() -> Self {
        Self {
            temperature: RangeValidator::temperature(),
            humidity: RangeValidator::humidity(),
            co2: RangeValidator::co2(),
        }
    }
}
