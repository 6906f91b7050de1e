//! Sensor resistance from raw ADC counts
//!
//! ## Divider Model
//!
//! Each MQ element sits in series with a load resistor `RL`; the ADC samples
//! the voltage across the load:
//!
//! ```text
//!   V_supply ──[ RS ]──┬──[ RL ]── GND
//!                      │
//!                     ADC  (V_sensor)
//!
//!   V_sensor = raw / max_count * V_ref
//!   RS       = (V_supply - V_sensor) * RL / V_sensor
//! ```
//!
//! ## Failure Modes
//!
//! - `raw == 0`: no current through the divider. The element is open or the
//!   connector is off; RS would be infinite.
//! - `raw >= max_count`: the divider is pinned at the rail. RS would be zero
//!   or negative, which later poisons the regression.
//!
//! Both report `SensorDisconnected` instead of returning a non-finite value.

use crate::{
    errors::{FaultResult, SensorFault},
    constants::sensors::{
        ADC_MAX_COUNT, ADC_REFERENCE_VOLTAGE, LOAD_RESISTANCE_OHMS, SUPPLY_VOLTAGE,
    },
};

/// ADC and voltage-divider parameters shared by all MQ sensors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResistanceModel {
    /// ADC reference voltage (V)
    pub reference_voltage: f32,
    /// Voltage across the sensor/load divider (V)
    pub supply_voltage: f32,
    /// Full-scale ADC count
    pub max_count: u16,
    /// Load resistor (Ω)
    pub load_resistance_ohms: f32,
}

impl Default for ResistanceModel {
    fn default() -> Self {
        Self {
            reference_voltage: ADC_REFERENCE_VOLTAGE,
            supply_voltage: SUPPLY_VOLTAGE,
            max_count: ADC_MAX_COUNT,
            load_resistance_ohms: LOAD_RESISTANCE_OHMS,
        }
    }
}

impl ResistanceModel {
    /// Model with the divider supply equal to the ADC reference
    pub const fn new(reference_voltage: f32, max_count: u16, load_resistance_ohms: f32) -> Self {
        Self {
            reference_voltage,
            supply_voltage: reference_voltage,
            max_count,
            load_resistance_ohms,
        }
    }

    /// Voltage at the ADC pin for a raw count
    pub fn sensor_voltage(&self, raw: u16) -> f32 {
        raw as f32 / self.max_count as f32 * self.reference_voltage
    }

    /// Sensor resistance RS (Ω) for a raw ADC count
    pub fn resistance(&self, raw: u16) -> FaultResult<f32> {
        if raw == 0 || raw >= self.max_count {
            return Err(SensorFault::SensorDisconnected);
        }

        let v_sensor = self.sensor_voltage(raw);
        let rs = (self.supply_voltage - v_sensor) * self.load_resistance_ohms / v_sensor;

        // Reference above supply can still put the pin at or over the rail
        if !rs.is_finite() || rs <= 0.0 {
            return Err(SensorFault::SensorDisconnected);
        }

        Ok(rs)
    }
}

/// Free-function form: supply equals the reference voltage
pub fn resistance(
    raw: u16,
    reference_voltage: f32,
    max_count: u16,
    load_resistance_ohms: f32,
) -> FaultResult<f32> {
    ResistanceModel::new(reference_voltage, max_count, load_resistance_ohms).resistance(raw)
}
