//! Clean-air calibration session
//!
//! Collects RS samples for every MQ sensor while the device sits in clean
//! air, one non-blocking step at a time. Nothing is written until `finish`;
//! dropping or aborting a session leaves every stored record as it was.
//!
//! Samples taken while the MQ-9B heater is still settling are ignored rather
//! than counted as failures, so a session started mid-switch just waits.

use heapless::Vec;

use crate::{
    calibration::{CalibrationRecord, CalibrationStore, NvStorage},
    channel::{GasSensor, GAS_SENSOR_COUNT},
    constants::time::MAX_CALIBRATION_SAMPLES,
    errors::{CalibrationError, FaultResult, SensorFault},
    time::Timestamp,
};

/// Result of a completed session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationOutcome {
    /// Records written to storage
    pub records: Vec<CalibrationRecord, GAS_SENSOR_COUNT>,
    /// Sensors that could not be calibrated, with the reason
    pub failures: Vec<(GasSensor, CalibrationError), GAS_SENSOR_COUNT>,
}

impl CalibrationOutcome {
    /// Whether every sensor got a new record
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// In-progress clean-air calibration
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    required: u16,
    max_attempts: u16,
    started_at: Timestamp,
    samples: [Vec<f32, MAX_CALIBRATION_SAMPLES>; GAS_SENSOR_COUNT],
    attempts: [u16; GAS_SENSOR_COUNT],
}

impl CalibrationSession {
    /// Start a session needing `required` good samples per sensor
    ///
    /// `required` is clamped to `1..=MAX_CALIBRATION_SAMPLES`. A sensor that
    /// keeps failing gives up after twice that many attempts.
    pub fn new(required: u16, started_at: Timestamp) -> Self {
        let required = required.clamp(1, MAX_CALIBRATION_SAMPLES as u16);
        Self {
            required,
            max_attempts: required.saturating_mul(2),
            started_at,
            samples: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
            attempts: [0; GAS_SENSOR_COUNT],
        }
    }

    /// When the session started
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Good samples needed per sensor
    pub fn required(&self) -> u16 {
        self.required
    }

    /// Feed one resistance result for `sensor`
    pub fn push(&mut self, sensor: GasSensor, rs: FaultResult<f32>) {
        if self.is_sensor_done(sensor) {
            return;
        }

        let i = sensor.index();
        match rs {
            Err(SensorFault::NotYetSettled) => {}
            Ok(rs) if rs.is_finite() && rs > 0.0 => {
                self.attempts[i] = self.attempts[i].saturating_add(1);
                // Bounded by `required`, which never exceeds the capacity
                let _ = self.samples[i].push(rs);
            }
            Ok(_) | Err(_) => {
                self.attempts[i] = self.attempts[i].saturating_add(1);
                log_debug!("{}: calibration sample rejected", sensor);
            }
        }
    }

    /// Good samples collected for `sensor`
    pub fn samples(&self, sensor: GasSensor) -> &[f32] {
        &self.samples[sensor.index()]
    }

    /// Whether `sensor` needs no more samples
    pub fn is_sensor_done(&self, sensor: GasSensor) -> bool {
        let i = sensor.index();
        self.samples[i].len() >= self.required as usize || self.attempts[i] >= self.max_attempts
    }

    /// Whether every sensor is done
    pub fn is_complete(&self) -> bool {
        GasSensor::ALL.iter().all(|s| self.is_sensor_done(*s))
    }

    /// Fewest good samples any sensor has so far
    pub fn collected(&self) -> u16 {
        self.samples.iter().map(|s| s.len() as u16).min().unwrap_or(0)
    }

    /// Compute and persist R0 for every sensor with samples
    pub fn finish<S: NvStorage>(self, store: &mut CalibrationStore<S>) -> CalibrationOutcome {
        let mut outcome = CalibrationOutcome::default();

        for sensor in GasSensor::ALL {
            // Both vectors hold at most one entry per sensor
            match store.calibrate(sensor, self.samples(sensor)) {
                Ok(record) => {
                    let _ = outcome.records.push(record);
                }
                Err(err) => {
                    log_warn!("{}: calibration failed: {}", sensor, err);
                    let _ = outcome.failures.push((sensor, err));
                }
            }
        }

        outcome
    }

    /// Discard everything collected
    pub fn abort(self) {
        log_info!(
            "Calibration aborted after {} of {} samples",
            self.collected(),
            self.required
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{calibration::MemoryStorage, config::MonitorConfig};

    #[test]
    fn completes_after_required_samples() {
        let mut session = CalibrationSession::new(3, 0);
        for _ in 0..3 {
            for sensor in GasSensor::ALL {
                assert!(!session.is_complete());
                session.push(sensor, Ok(50_000.0));
            }
        }
        assert!(session.is_complete());
        assert_eq!(session.collected(), 3);
    }

    #[test]
    fn unsettled_samples_are_not_attempts() {
        let mut session = CalibrationSession::new(2, 0);
        for _ in 0..100 {
            session.push(GasSensor::Mq9b, Err(SensorFault::NotYetSettled));
        }
        assert!(!session.is_sensor_done(GasSensor::Mq9b));
        assert!(session.samples(GasSensor::Mq9b).is_empty());
    }

    #[test]
    fn failing_sensor_gives_up() {
        let mut session = CalibrationSession::new(2, 0);
        for _ in 0..4 {
            session.push(GasSensor::Mq8, Err(SensorFault::SensorDisconnected));
        }
        assert!(session.is_sensor_done(GasSensor::Mq8));
        assert!(session.samples(GasSensor::Mq8).is_empty());
    }

    #[test]
    fn finish_persists_and_reports_failures() {
        let config = MonitorConfig::default();
        let mut store = CalibrationStore::new(MemoryStorage::<64>::new(), &config).unwrap();

        let mut session = CalibrationSession::new(1, 0);
        session.push(GasSensor::Mq8, Ok(700_000.0));
        session.push(GasSensor::Mq136, Ok(36_000.0));
        session.push(GasSensor::Mq137, Ok(42_000.0));
        session.push(GasSensor::Mq9b, Err(SensorFault::SensorDisconnected));
        session.push(GasSensor::Mq9b, Err(SensorFault::SensorDisconnected));
        assert!(session.is_complete());

        let outcome = session.finish(&mut store);
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(
            outcome.failures.as_slice(),
            &[(GasSensor::Mq9b, CalibrationError::NoValidSamples)]
        );
        assert!(!outcome.is_complete());
        assert!(store.record(GasSensor::Mq8).valid);
        assert!(!store.record(GasSensor::Mq9b).valid);
    }

    #[test]
    fn required_is_clamped() {
        assert_eq!(CalibrationSession::new(0, 0).required(), 1);
        assert_eq!(
            CalibrationSession::new(u16::MAX, 0).required(),
            MAX_CALIBRATION_SAMPLES as u16
        );
    }
}
