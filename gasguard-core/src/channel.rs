//! Channel and sensor identities
//!
//! A *channel* is one quantity that gets a severity every tick (a gas, or an
//! environmental variable). A *gas sensor* is one physical MQ element on one
//! ADC pin. The MQ-9B feeds two channels (CO and CH4) depending on its heater
//! level, so the two sets are kept apart.

use core::fmt;

/// Number of evaluated channels
pub const CHANNEL_COUNT: usize = 8;

/// Number of physical MQ sensors needing an R0
pub const GAS_SENSOR_COUNT: usize = 4;

/// Number of gas channels derived from MQ sensors
pub const GAS_CHANNEL_COUNT: usize = 5;

/// One evaluated quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ChannelId {
    /// Hydrogen, from the MQ-8
    H2 = 0,
    /// Hydrogen sulfide, from the MQ-136
    H2s = 1,
    /// Ammonia, from the MQ-137
    Nh3 = 2,
    /// Carbon monoxide, from the MQ-9B at low heater level
    Co = 3,
    /// Methane, from the MQ-9B at high heater level
    Ch4 = 4,
    /// Equivalent CO2, from the environmental sensor
    Co2 = 5,
    /// Air temperature
    Temperature = 6,
    /// Relative humidity
    Humidity = 7,
}

impl ChannelId {
    /// All channels in publication order
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [
        ChannelId::H2,
        ChannelId::H2s,
        ChannelId::Nh3,
        ChannelId::Co,
        ChannelId::Ch4,
        ChannelId::Co2,
        ChannelId::Temperature,
        ChannelId::Humidity,
    ];

    /// Position in per-channel tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short display name
    pub const fn name(self) -> &'static str {
        match self {
            ChannelId::H2 => "H2",
            ChannelId::H2s => "H2S",
            ChannelId::Nh3 => "NH3",
            ChannelId::Co => "CO",
            ChannelId::Ch4 => "CH4",
            ChannelId::Co2 => "CO2",
            ChannelId::Temperature => "Temp",
            ChannelId::Humidity => "Humidity",
        }
    }

    /// Unit of the published value
    pub const fn unit(self) -> &'static str {
        match self {
            ChannelId::Temperature => "°C",
            ChannelId::Humidity => "%RH",
            _ => "ppm",
        }
    }

    /// Physical MQ sensor behind this channel, if any
    pub const fn gas_sensor(self) -> Option<GasSensor> {
        match self {
            ChannelId::H2 => Some(GasSensor::Mq8),
            ChannelId::H2s => Some(GasSensor::Mq136),
            ChannelId::Nh3 => Some(GasSensor::Mq137),
            ChannelId::Co | ChannelId::Ch4 => Some(GasSensor::Mq9b),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One physical MQ sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GasSensor {
    /// Hydrogen sensor
    Mq8 = 0,
    /// Hydrogen sulfide sensor
    Mq136 = 1,
    /// Ammonia sensor
    Mq137 = 2,
    /// Dual CO/CH4 sensor with switched heater
    Mq9b = 3,
}

impl GasSensor {
    /// All sensors in storage-slot order
    pub const ALL: [GasSensor; GAS_SENSOR_COUNT] = [
        GasSensor::Mq8,
        GasSensor::Mq136,
        GasSensor::Mq137,
        GasSensor::Mq9b,
    ];

    /// Position in per-sensor tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Part number
    pub const fn name(self) -> &'static str {
        match self {
            GasSensor::Mq8 => "MQ-8",
            GasSensor::Mq136 => "MQ-136",
            GasSensor::Mq137 => "MQ-137",
            GasSensor::Mq9b => "MQ-9B",
        }
    }
}

impl fmt::Display for GasSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_table_order() {
        for (i, channel) in ChannelId::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
        for (i, sensor) in GasSensor::ALL.iter().enumerate() {
            assert_eq!(sensor.index(), i);
        }
    }

    #[test]
    fn mq9b_feeds_two_channels() {
        assert_eq!(ChannelId::Co.gas_sensor(), Some(GasSensor::Mq9b));
        assert_eq!(ChannelId::Ch4.gas_sensor(), Some(GasSensor::Mq9b));
        assert_eq!(ChannelId::Temperature.gas_sensor(), None);
    }
}
