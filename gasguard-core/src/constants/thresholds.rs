//! Alarm Thresholds
//!
//! Two tiers per channel. A value at or above the warning limit raises a
//! warning, at or above the danger limit raises danger.

// ===== ENVIRONMENT =====

/// Sustained temperatures around 30 °C raise heat-stress risk (°C).
pub const TEMP_WARNING_C: f32 = 30.0;
/// At 35 °C heat exhaustion and heat stroke become likely (°C).
pub const TEMP_DANGER_C: f32 = 35.0;

/// Above 60 %RH sweat cooling becomes less effective.
pub const HUMIDITY_WARNING_PCT: f32 = 60.0;
/// At 80 %RH sweat evaporation slows markedly.
pub const HUMIDITY_DANGER_PCT: f32 = 80.0;

/// OSHA PEL for CO2, 8-hour TWA (ppm).
///
/// Source: OSHA Table Z-1
pub const CO2_WARNING_PPM: f32 = 5_000.0;
/// Respiratory and cognitive effects above this level (ppm).
pub const CO2_DANGER_PPM: f32 = 15_000.0;

// ===== MQ GASES =====

/// 10 % of the hydrogen LEL (4 % vol) (ppm).
pub const H2_WARNING_PPM: f32 = 4_000.0;
/// 20 % of the hydrogen LEL (ppm).
pub const H2_DANGER_PPM: f32 = 8_000.0;

/// OSHA PEL for H2S (ppm).
///
/// Source: OSHA Table Z-2
pub const H2S_WARNING_PPM: f32 = 10.0;
/// Eye and respiratory damage (ppm).
pub const H2S_DANGER_PPM: f32 = 50.0;

/// 8-hour exposure limit for ammonia (ppm).
pub const NH3_WARNING_PPM: f32 = 25.0;
/// OSHA PEL for ammonia (ppm).
pub const NH3_DANGER_PPM: f32 = 50.0;

/// 10 % of the methane LEL (5 % vol) (ppm).
pub const CH4_WARNING_PPM: f32 = 5_000.0;
/// 20 % of the methane LEL (ppm).
pub const CH4_DANGER_PPM: f32 = 10_000.0;

/// Carbon monoxide early warning (ppm).
pub const CO_WARNING_PPM: f32 = 35.0;
/// OSHA PEL for carbon monoxide (ppm).
pub const CO_DANGER_PPM: f32 = 50.0;
