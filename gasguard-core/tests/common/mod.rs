//! Shared fixtures for integration tests
//!
//! - `ScriptedSource`: sample source with per-sensor ADC responses
//! - `RecordingSink`: keeps every published report and calibration
//! - `FakeRelay`: heater control that records switches and can fail
//! - helpers converting between sensor resistance and ADC counts

#![allow(dead_code)]

use gasguard_core::{
    calibration::{CalibrationRecord, CalibrationStore, MemoryStorage, StorageSlot},
    EnvironmentSample, GasSensor, HeaterControl, HeaterMode, MonitorConfig, ResistanceModel,
    ResultSink, SampleSource, TickReport,
};

/// Error returned by the scripted source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceError;

/// Scripted answer of one ADC channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adc {
    /// Conversion result
    Count(u16),
    /// Conversion still running
    Busy,
    /// Bus or driver failure
    Broken,
}

/// Sample source returning fixed values until changed
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    pub adc: [Adc; 4],
    pub environment: Option<EnvironmentSample>,
    pub adc_reads: u32,
}

impl ScriptedSource {
    /// Every MQ sensor sits at its clean-air resistance for R0 = 10 kΩ,
    /// and the room is comfortable
    pub fn clean_air() -> Self {
        let config = MonitorConfig::default();
        let mut adc = [Adc::Busy; 4];
        for sensor in GasSensor::ALL {
            let rs = config.sensor(sensor).clean_air_ratio * 10_000.0;
            adc[sensor.index()] = Adc::Count(raw_for_resistance(rs));
        }

        Self {
            adc,
            environment: Some(comfortable_room()),
            adc_reads: 0,
        }
    }

    pub fn set_adc(&mut self, sensor: GasSensor, adc: Adc) {
        self.adc[sensor.index()] = adc;
    }

    pub fn set_resistance(&mut self, sensor: GasSensor, rs_ohms: f32) {
        self.set_adc(sensor, Adc::Count(raw_for_resistance(rs_ohms)));
    }

    pub fn set_temperature(&mut self, celsius: f32) {
        let mut env = self.environment.unwrap_or_default();
        env.temperature_c = Some(celsius);
        self.environment = Some(env);
    }
}

impl SampleSource for ScriptedSource {
    type Error = SourceError;

    fn read_adc(&mut self, sensor: GasSensor) -> nb::Result<u16, SourceError> {
        self.adc_reads += 1;
        match self.adc[sensor.index()] {
            Adc::Count(raw) => Ok(raw),
            Adc::Busy => Err(nb::Error::WouldBlock),
            Adc::Broken => Err(nb::Error::Other(SourceError)),
        }
    }

    fn read_environment(&mut self) -> nb::Result<EnvironmentSample, SourceError> {
        self.environment.ok_or(nb::Error::Other(SourceError))
    }
}

pub fn comfortable_room() -> EnvironmentSample {
    EnvironmentSample {
        temperature_c: Some(22.0),
        humidity_pct: Some(45.0),
        co2_ppm: Some(600.0),
        tvoc_ppb: Some(120.0),
        aqi: Some(1),
    }
}

/// Sink keeping everything it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<TickReport>,
    pub calibrations: Vec<Vec<CalibrationRecord>>,
}

impl RecordingSink {
    pub fn last(&self) -> &TickReport {
        self.reports.last().expect("no report published")
    }
}

impl ResultSink for RecordingSink {
    fn publish(&mut self, report: &TickReport) {
        self.reports.push(report.clone());
    }

    fn calibration_complete(&mut self, records: &[CalibrationRecord]) {
        self.calibrations.push(records.to_vec());
    }
}

/// Heater relay double
#[derive(Debug, Default)]
pub struct FakeRelay {
    pub switches: Vec<HeaterMode>,
    pub failing: bool,
    pub failures: u32,
}

impl HeaterControl for FakeRelay {
    type Error = SourceError;

    fn set_mode(&mut self, mode: HeaterMode) -> Result<(), SourceError> {
        if self.failing {
            self.failures += 1;
            return Err(SourceError);
        }
        self.switches.push(mode);
        Ok(())
    }
}

/// ADC count that reads back closest to `rs_ohms` with the default divider
pub fn raw_for_resistance(rs_ohms: f32) -> u16 {
    let model = ResistanceModel::default();
    let v_sensor = model.supply_voltage * model.load_resistance_ohms
        / (rs_ohms + model.load_resistance_ohms);
    (v_sensor / model.reference_voltage * model.max_count as f32).round() as u16
}

/// Resistance the engine derives from the count used for `rs_ohms`
pub fn quantized_resistance(rs_ohms: f32) -> f32 {
    ResistanceModel::default()
        .resistance(raw_for_resistance(rs_ohms))
        .expect("resistance in range")
}

/// Store with a persisted R0 for every sensor
pub fn calibrated_store(config: &MonitorConfig, r0_ohms: [f32; 4]) -> CalibrationStore<MemoryStorage<64>> {
    let mut store = CalibrationStore::new(MemoryStorage::new(), config).unwrap();
    for sensor in GasSensor::ALL {
        store
            .save(CalibrationRecord {
                sensor,
                r0_ohms: r0_ohms[sensor.index()],
                valid: true,
                slot: StorageSlot::new(config.sensor(sensor).slot.address),
            })
            .unwrap();
    }
    store
}
