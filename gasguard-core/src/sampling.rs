//! The sampling loop
//!
//! ## Architecture
//!
//! ```text
//! SampleSource ──raw──► ResistanceModel ──RS──► HeaterScheduler gate
//!                                                      │
//!        CalibrationStore (R0) ───────────────► Regression ──ppm──► AlarmEvaluator
//!                                                                        │
//! SampleSource ──env──► RangeValidator ─────────────────────────────────┤
//!                                                                        ▼
//!                                                     TickReport ──► ResultSink
//! ```
//!
//! `SamplingLoop::poll` is called from the firmware main loop as often as it
//! likes. It never blocks: the sampling interval, the heater dwell and the
//! calibration sample spacing are all deadline checks against the caller's
//! monotonic clock.
//!
//! ## Modes
//!
//! - **Sampling**: one tick per sampling interval, published to the sink.
//! - **Calibrating**: no ticks are published and the heater cadence is
//!   frozen. One calibration sample per sensor per calibration interval
//!   until the session completes or is aborted.
//!
//! ## Fault Isolation
//!
//! A source error, a zero ADC count or an unsettled heater turns that one
//! channel's reading invalid for the tick. All other channels are evaluated
//! as usual.

use core::fmt::Debug;

use crate::{
    alarm::{AlarmEvaluator, Severity},
    calibration::{CalibrationOutcome, CalibrationSession, CalibrationStore, NvStorage},
    channel::{ChannelId, GasSensor, GAS_SENSOR_COUNT},
    config::{GasChannelSpec, MonitorConfig},
    errors::{FaultResult, SensorFault},
    heater::{HeaterMode, HeaterScheduler},
    reading::{Reading, ReadingSet, TickReport},
    sink::ResultSink,
    time::{Interval, Timestamp},
    validators::RangeValidator,
};

/// Values reported by the environmental sensors
///
/// Temperature and humidity usually come from one device and CO2, TVOC and
/// AQI from another, so each field may be missing on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentSample {
    /// Air temperature (°C)
    pub temperature_c: Option<f32>,
    /// Relative humidity (%)
    pub humidity_pct: Option<f32>,
    /// Equivalent CO2 (ppm)
    pub co2_ppm: Option<f32>,
    /// Total volatile organic compounds (ppb)
    pub tvoc_ppb: Option<f32>,
    /// Air quality index, 1-5
    pub aqi: Option<u8>,
}

/// Raw sample provider, typically ADC pins plus I2C sensors
///
/// `WouldBlock` and errors both leave the affected channels unavailable for
/// the current tick; the loop never waits for a conversion.
pub trait SampleSource {
    /// Source error
    type Error: Debug;

    /// ADC count of one MQ sensor
    fn read_adc(&mut self, sensor: GasSensor) -> nb::Result<u16, Self::Error>;

    /// Latest environmental values
    fn read_environment(&mut self) -> nb::Result<EnvironmentSample, Self::Error>;
}

/// Relay (or MOSFET) selecting the MQ-9B heater level
pub trait HeaterControl {
    /// Driver error
    type Error: Debug;

    /// Apply the heater level for `mode`
    fn set_mode(&mut self, mode: HeaterMode) -> Result<(), Self::Error>;
}

/// What a call to `SamplingLoop::poll` did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing was due
    Idle,
    /// A tick was evaluated and published
    Published {
        /// Aggregate severity, `None` when no channel was valid
        severity: Option<Severity>,
    },
    /// One calibration sample was taken
    Calibrating {
        /// Fewest good samples any sensor has
        collected: u16,
        /// Good samples needed per sensor
        required: u16,
    },
    /// A calibration session completed and its records were persisted
    CalibrationFinished(CalibrationOutcome),
}

/// Periodic acquisition, evaluation and publishing
pub struct SamplingLoop<S: NvStorage> {
    config: MonitorConfig,
    store: CalibrationStore<S>,
    heater: HeaterScheduler,
    evaluator: AlarmEvaluator,
    sample_interval: Interval,
    calibration_interval: Interval,
    relay_retry: Interval,
    session: Option<CalibrationSession>,
    last_severity: Option<Severity>,
    boot_calibration_pending: bool,
}

impl<S: NvStorage> SamplingLoop<S> {
    /// Build the loop at boot time `now`
    ///
    /// The heater starts settling from `now`, so the MQ-9B channels stay
    /// invalid until the first settle window has passed.
    pub fn new(config: MonitorConfig, store: CalibrationStore<S>, now: Timestamp) -> Self {
        let heater = HeaterScheduler::new(config.heater, now);
        let evaluator = AlarmEvaluator::new(config.thresholds);

        if !store.is_fully_calibrated() {
            log_warn!("Not all MQ sensors are calibrated, fallback R0 in use");
        }

        Self {
            heater,
            evaluator,
            store,
            sample_interval: Interval::new(config.sampling_interval_ms),
            calibration_interval: Interval::new(config.calibration.sample_interval_ms),
            relay_retry: Interval::new(config.sampling_interval_ms),
            session: None,
            last_severity: None,
            boot_calibration_pending: config.calibration.on_boot,
            config,
        }
    }

    /// Run whatever is due at `now`
    pub fn poll<Src, H, K>(
        &mut self,
        now: Timestamp,
        source: &mut Src,
        heater: &mut H,
        sink: &mut K,
    ) -> TickOutcome
    where
        Src: SampleSource,
        H: HeaterControl,
        K: ResultSink,
    {
        if self.boot_calibration_pending {
            self.boot_calibration_pending = false;
            self.start_calibration(now);
        }

        if self.session.is_some() {
            return self.poll_calibration(now, source, sink);
        }

        self.poll_heater(now, heater);

        if !self.sample_interval.poll(now) {
            return TickOutcome::Idle;
        }

        let report = self.run_tick(now, source);
        sink.publish(&report);
        TickOutcome::Published {
            severity: report.alarm.severity(),
        }
    }

    fn poll_heater<H: HeaterControl>(&mut self, now: Timestamp, heater: &mut H) {
        let Some(next) = self.heater.cadence_due(now) else {
            return;
        };
        if !self.relay_retry.is_due(now) {
            return;
        }

        match heater.set_mode(next) {
            Ok(()) => {
                self.heater.switch_to(next, now);
                self.relay_retry.reset();
            }
            Err(err) => {
                log_warn!("MQ-9B heater switch to {} failed: {:?}", next.name(), err);
                self.relay_retry.mark(now);
            }
        }
    }

    fn poll_calibration<Src, K>(&mut self, now: Timestamp, source: &mut Src, sink: &mut K) -> TickOutcome
    where
        Src: SampleSource,
        K: ResultSink,
    {
        if !self.calibration_interval.poll(now) {
            return TickOutcome::Idle;
        }

        let samples = self.acquire_gas(now, source);
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };

        for sensor in GasSensor::ALL {
            let (_, rs) = samples[sensor.index()];
            session.push(sensor, rs);
        }

        if !session.is_complete() {
            return TickOutcome::Calibrating {
                collected: session.collected(),
                required: session.required(),
            };
        }

        let Some(session) = self.session.take() else {
            return TickOutcome::Idle;
        };
        let outcome = session.finish(&mut self.store);
        log_info!(
            "Calibration finished: {} sensors calibrated, {} failed",
            outcome.records.len(),
            outcome.failures.len()
        );

        sink.calibration_complete(&outcome.records);
        self.sample_interval.reset();
        TickOutcome::CalibrationFinished(outcome)
    }

    /// Acquire, evaluate and aggregate one tick
    ///
    /// Does not publish. `poll` calls this when the sampling interval is due.
    pub fn run_tick<Src: SampleSource>(&mut self, now: Timestamp, source: &mut Src) -> TickReport {
        let gas = self.acquire_gas(now, source);

        let environment = match source.read_environment() {
            Ok(sample) => sample,
            Err(nb::Error::WouldBlock) => EnvironmentSample::default(),
            Err(nb::Error::Other(err)) => {
                log_debug!("Environmental sensor read failed: {:?}", err);
                EnvironmentSample::default()
            }
        };

        let mut readings = ReadingSet::new();
        for channel in ChannelId::ALL {
            let reading = match channel {
                ChannelId::Co2 => self.environment_reading(
                    channel,
                    environment.co2_ppm,
                    &self.config.environment.co2,
                ),
                ChannelId::Temperature => self.environment_reading(
                    channel,
                    environment.temperature_c,
                    &self.config.environment.temperature,
                ),
                ChannelId::Humidity => self.environment_reading(
                    channel,
                    environment.humidity_pct,
                    &self.config.environment.humidity,
                ),
                _ => match self.config.gas_channels.iter().find(|g| g.channel == channel) {
                    Some(spec) => {
                        let (raw, rs) = gas[spec.sensor.index()];
                        self.gas_reading(spec, raw, rs, now)
                    }
                    None => Reading::faulted(channel, SensorFault::Unavailable),
                },
            };

            if let Some(fault) = reading.fault {
                log_debug!("{}: {}", channel, fault);
            }
            // One reading per channel, capacity is the channel count
            let _ = readings.push(reading);
        }

        let alarm = self.evaluator.aggregate(&readings);
        if alarm.changed_from(self.last_severity) {
            match alarm.severity() {
                Some(level) => log_info!(
                    "Alarm level {} -> {} ({} valid channels)",
                    self.last_severity.map_or("NONE", Severity::label),
                    level.label(),
                    alarm.valid_channel_count()
                ),
                None => log_warn!("No valid channels, alarm state unknown"),
            }
        }
        self.last_severity = alarm.severity();

        TickReport {
            timestamp: now,
            readings,
            alarm,
            heater_mode: self.heater.current_mode(),
            tvoc_ppb: environment.tvoc_ppb,
            aqi: environment.aqi,
            calibration: self.store.records(),
        }
    }

    /// Read every MQ sensor once and convert to RS
    ///
    /// The MQ-9B result is gated by the heater settle window of the current
    /// mode. Each gas channel checks its own mode again in `gas_reading`.
    fn acquire_gas<Src: SampleSource>(
        &self,
        now: Timestamp,
        source: &mut Src,
    ) -> [(Option<u16>, FaultResult<f32>); GAS_SENSOR_COUNT] {
        let mut samples = [(None, Err(SensorFault::Unavailable)); GAS_SENSOR_COUNT];

        for sensor in GasSensor::ALL {
            samples[sensor.index()] = match source.read_adc(sensor) {
                Ok(raw) => {
                    let rs = self.config.adc.resistance(raw).and_then(|rs| {
                        if sensor == GasSensor::Mq9b {
                            self.heater.gate(self.heater.current_mode(), now)?;
                        }
                        Ok(rs)
                    });
                    (Some(raw), rs)
                }
                Err(nb::Error::WouldBlock) => (None, Err(SensorFault::Unavailable)),
                Err(nb::Error::Other(err)) => {
                    log_debug!("{}: ADC read failed: {:?}", sensor, err);
                    (None, Err(SensorFault::Unavailable))
                }
            };
        }

        samples
    }

    fn gas_reading(
        &self,
        spec: &GasChannelSpec,
        raw: Option<u16>,
        rs: FaultResult<f32>,
        now: Timestamp,
    ) -> Reading {
        let faulted = |fault| {
            let reading = Reading::faulted(spec.channel, fault);
            match raw {
                Some(raw) => reading.with_raw(raw),
                None => reading,
            }
        };

        let rs = match rs {
            Ok(rs) => rs,
            Err(fault) => return faulted(fault),
        };

        if let Some(mode) = spec.heater_mode {
            if let Err(fault) = self.heater.gate(mode, now) {
                return faulted(fault).with_resistance(rs);
            }
        }

        let record = self.store.record(spec.sensor);
        let ppm = match spec.regression.estimate(rs, record.r0_ohms) {
            Ok(ppm) => ppm,
            Err(fault) => return faulted(fault).with_resistance(rs),
        };

        let level = self.evaluator.severity(spec.channel, ppm);
        let mut reading = Reading::measured(spec.channel, ppm, level).with_resistance(rs);
        if let Some(raw) = raw {
            reading = reading.with_raw(raw);
        }
        if !record.valid {
            reading = reading.with_fault(SensorFault::InvalidCalibration);
        }
        reading
    }

    fn environment_reading(
        &self,
        channel: ChannelId,
        value: Option<f32>,
        limits: &RangeValidator,
    ) -> Reading {
        let value = match value {
            Some(value) => value,
            None => return Reading::faulted(channel, SensorFault::Unavailable),
        };

        match limits.validate(value) {
            Ok(value) => Reading::measured(channel, value, self.evaluator.severity(channel, value)),
            Err(fault) => Reading::faulted(channel, fault),
        }
    }

    /// Enter calibration mode
    ///
    /// Returns false if a session is already running. Sampling stops until
    /// the session finishes or is aborted.
    pub fn start_calibration(&mut self, now: Timestamp) -> bool {
        if self.session.is_some() {
            return false;
        }

        let required = self.config.calibration.samples_per_sensor;
        log_info!("Calibration started, {} samples per sensor", required);
        self.session = Some(CalibrationSession::new(required, now));
        self.calibration_interval.reset();
        true
    }

    /// Leave calibration mode without touching stored records
    ///
    /// Returns false if no session was running.
    pub fn abort_calibration(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                session.abort();
                self.sample_interval.reset();
                true
            }
            None => false,
        }
    }

    /// Whether a calibration session is running
    pub fn is_calibrating(&self) -> bool {
        self.session.is_some()
    }

    /// `(collected, required)` of the running session
    pub fn calibration_progress(&self) -> Option<(u16, u16)> {
        self.session.as_ref().map(|s| (s.collected(), s.required()))
    }

    /// Configuration in use
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Calibration store
    pub fn store(&self) -> &CalibrationStore<S> {
        &self.store
    }

    /// MQ-9B heater state
    pub fn heater(&self) -> &HeaterScheduler {
        &self.heater
    }

    /// Aggregate severity of the last tick
    pub fn last_severity(&self) -> Option<Severity> {
        self.last_severity
    }

    /// Tear down and return the calibration store
    pub fn into_store(self) -> CalibrationStore<S> {
        self.store
    }
}
