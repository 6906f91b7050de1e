//! Concentration estimate from the resistance ratio
//!
//! MQ datasheets plot RS/R0 against ppm on log-log axes; over the useful
//! range each curve is a straight line, i.e. a power law:
//!
//! ```text
//! ratio = RS / R0
//! ppm   = a * ratio^b        (b < 0 for every MQ gas)
//! ```
//!
//! Because `b` is negative, the estimate grows as the element resistance
//! collapses in the target gas. The exponentiation is evaluated directly with
//! `libm::powf` so the result matches the calibration fit exactly; no lookup
//! table or clamping is applied here. Capping absurd values is a display
//! concern.

use crate::errors::{FaultResult, SensorFault};

/// Power-law fit of one gas's sensitivity curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Regression {
    /// Scale coefficient
    pub a: f32,
    /// Exponent, typically negative
    pub b: f32,
}

impl Regression {
    /// Create from coefficients
    pub const fn new(a: f32, b: f32) -> Self {
        Self { a, b }
    }

    /// Estimate ppm from sensor resistance and baseline
    pub fn estimate(&self, rs_ohms: f32, r0_ohms: f32) -> FaultResult<f32> {
        estimate(rs_ohms, r0_ohms, self.a, self.b)
    }
}

/// `a * (rs / r0)^b`, rejecting ratios the power function must not see
pub fn estimate(rs_ohms: f32, r0_ohms: f32, a: f32, b: f32) -> FaultResult<f32> {
    let ratio = rs_ohms / r0_ohms;

    // Also catches NaN and a zero or negative R0
    if !(ratio > 0.0) || !ratio.is_finite() {
        return Err(SensorFault::EstimationError { ratio });
    }

    let ppm = a * libm::powf(ratio, b);
    if ppm.is_nan() {
        return Err(SensorFault::EstimationError { ratio });
    }

    Ok(ppm)
}
