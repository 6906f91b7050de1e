//! Integration tests for the sampling loop
//!
//! Drives `SamplingLoop` through scripted sources and checks what reaches
//! the sink: readings, faults, aggregation, heater gating and calibration.

mod common;

use gasguard_core::{
    calibration::{CalibrationStore, MemoryStorage},
    constants::sensors::{A_H2, B_H2},
    time::{ManualTime, TimeSource},
    ChannelId, GasSensor, HeaterMode, MonitorConfig, SamplingLoop, SensorFault, Severity,
    ThresholdPair, TickOutcome,
};

use common::{
    calibrated_store, quantized_resistance, Adc, FakeRelay, RecordingSink, ScriptedSource,
};

const SETTLED_CO_MS: u64 = 25_000;

fn calibrated_monitor(config: MonitorConfig, r0: [f32; 4]) -> SamplingLoop<MemoryStorage<64>> {
    let store = calibrated_store(&config, r0);
    SamplingLoop::new(config, store, 0)
}

#[test]
fn test_hydrogen_warning_scenario() {
    // Warning at 100 ppm, danger at 8000 ppm
    let config = MonitorConfig::default()
        .with_thresholds(ChannelId::H2, ThresholdPair::new(100.0, 8_000.0));
    let mut monitor = calibrated_monitor(config, [20_000.0, 10_000.0, 10_000.0, 10_000.0]);

    let mut source = ScriptedSource::clean_air();
    source.set_resistance(GasSensor::Mq8, 10_000.0);

    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);
    let h2 = report.reading(ChannelId::H2).unwrap();

    let rs = quantized_resistance(10_000.0);
    let expected = A_H2 * (rs / 20_000.0).powf(B_H2);
    let ppm = h2.value.unwrap();
    assert!((ppm - expected).abs() / expected < 1e-4, "ppm {} vs {}", ppm, expected);
    assert!(ppm > 135.0 && ppm < 145.0);

    assert!(h2.is_valid());
    assert_eq!(h2.severity, Some(Severity::Warning));
    assert_eq!(report.alarm.severity(), Some(Severity::Warning));
    assert_eq!(report.alarm.contributing(), &[ChannelId::H2]);
}

#[test]
fn test_temperature_danger_dominates() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);
    let mut source = ScriptedSource::clean_air();
    source.set_temperature(36.0);

    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);

    assert_eq!(
        report.reading(ChannelId::Temperature).unwrap().severity,
        Some(Severity::Danger)
    );
    for reading in report.readings.iter().filter(|r| r.is_valid()) {
        if reading.channel != ChannelId::Temperature {
            assert_eq!(reading.severity, Some(Severity::Normal), "{}", reading.channel);
        }
    }

    assert_eq!(report.alarm.severity(), Some(Severity::Danger));
    assert_eq!(report.alarm.contributing(), &[ChannelId::Temperature]);
    // Everything except CH4, which is not selected
    assert_eq!(report.alarm.valid_channel_count(), 7);
}

#[test]
fn test_disconnected_sensor_is_excluded() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);
    let mut source = ScriptedSource::clean_air();
    source.set_adc(GasSensor::Mq136, Adc::Count(0));

    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);

    let h2s = report.reading(ChannelId::H2s).unwrap();
    assert_eq!(h2s.fault, Some(SensorFault::SensorDisconnected));
    assert_eq!(h2s.raw, Some(0));
    assert!(!report.alarm.contributing().contains(&ChannelId::H2s));

    assert_eq!(report.alarm.severity(), Some(Severity::Normal));
    assert_eq!(report.alarm.valid_channel_count(), 6);
}

#[test]
fn test_saturated_sensor_is_disconnected() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);
    let mut source = ScriptedSource::clean_air();
    source.set_adc(GasSensor::Mq137, Adc::Count(1023));

    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);
    assert_eq!(
        report.reading(ChannelId::Nh3).unwrap().fault,
        Some(SensorFault::SensorDisconnected)
    );
}

#[test]
fn test_source_failures_stay_local() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);
    let mut source = ScriptedSource::clean_air();
    source.set_adc(GasSensor::Mq8, Adc::Broken);
    source.set_adc(GasSensor::Mq9b, Adc::Busy);

    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);

    for channel in [ChannelId::H2, ChannelId::Co, ChannelId::Ch4] {
        assert_eq!(
            report.reading(channel).unwrap().fault,
            Some(SensorFault::Unavailable),
            "{}",
            channel
        );
    }
    assert!(report.reading(ChannelId::H2s).unwrap().is_valid());
    assert!(report.reading(ChannelId::Nh3).unwrap().is_valid());
}

#[test]
fn test_environment_failure_and_implausible_values() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);

    let mut source = ScriptedSource::clean_air();
    source.environment = None;
    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);
    for channel in [ChannelId::Co2, ChannelId::Temperature, ChannelId::Humidity] {
        assert_eq!(report.reading(channel).unwrap().fault, Some(SensorFault::Unavailable));
    }
    assert_eq!(report.tvoc_ppb, None);

    let mut source = ScriptedSource::clean_air();
    source.set_temperature(-120.0);
    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);
    assert!(matches!(
        report.reading(ChannelId::Temperature).unwrap().fault,
        Some(SensorFault::OutOfRange { .. })
    ));
    assert_eq!(report.aqi, Some(1));
}

#[test]
fn test_total_loss_reports_no_valid_channels() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);
    let mut source = ScriptedSource {
        adc: [Adc::Broken; 4],
        environment: None,
        adc_reads: 0,
    };

    let report = monitor.run_tick(SETTLED_CO_MS, &mut source);
    assert_eq!(report.alarm.severity(), None);
    assert!(!report.alarm.has_valid_channels());
    assert_eq!(report.faulted().count(), ChannelId::ALL.len());
}

#[test]
fn test_uncalibrated_sensor_still_reports_value() {
    let config = MonitorConfig::default();
    let store = CalibrationStore::new(MemoryStorage::<64>::new(), &config).unwrap();
    let mut monitor = SamplingLoop::new(config, store, 0);

    let report = monitor.run_tick(SETTLED_CO_MS, &mut ScriptedSource::clean_air());
    let nh3 = report.reading(ChannelId::Nh3).unwrap();

    assert!(nh3.value.is_some());
    assert_eq!(nh3.fault, Some(SensorFault::InvalidCalibration));
    assert!(report.uses_fallback_calibration());
    assert!(!report.alarm.contributing().contains(&ChannelId::Nh3));
}

#[test]
fn test_heater_cadence_and_gating() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);
    let mut source = ScriptedSource::clean_air();
    let mut relay = FakeRelay::default();
    let mut sink = RecordingSink::default();
    let mut clock = ManualTime::new(0);

    while clock.now() <= 60_000 {
        monitor.poll(clock.now(), &mut source, &mut relay, &mut sink);
        clock.advance(5_000);
    }

    // CO dwell 30 s, CH4 dwell 20 s
    assert_eq!(relay.switches, vec![HeaterMode::Ch4, HeaterMode::Co]);
    assert_eq!(sink.reports.len(), 13);

    let at = |t: u64| sink.reports.iter().find(|r| r.timestamp == t).unwrap();
    let fault = |t: u64, channel: ChannelId| at(t).reading(channel).unwrap().fault;

    // CO settling from boot
    assert_eq!(fault(15_000, ChannelId::Co), Some(SensorFault::NotYetSettled));
    assert_eq!(fault(20_000, ChannelId::Co), None);
    assert_eq!(fault(20_000, ChannelId::Ch4), Some(SensorFault::NotYetSettled));

    // Switched to CH4 at 30 s, settles after 10 s
    assert_eq!(at(30_000).heater_mode, HeaterMode::Ch4);
    assert_eq!(fault(30_000, ChannelId::Ch4), Some(SensorFault::NotYetSettled));
    assert_eq!(fault(30_000, ChannelId::Co), Some(SensorFault::NotYetSettled));
    assert_eq!(fault(40_000, ChannelId::Ch4), None);

    // Back to CO at 50 s
    assert_eq!(at(50_000).heater_mode, HeaterMode::Co);
    assert_eq!(fault(60_000, ChannelId::Co), Some(SensorFault::NotYetSettled));
}

#[test]
fn test_relay_failure_keeps_mode_and_retries() {
    let mut monitor = calibrated_monitor(MonitorConfig::default(), [10_000.0; 4]);
    let mut source = ScriptedSource::clean_air();
    let mut relay = FakeRelay { failing: true, ..FakeRelay::default() };
    let mut sink = RecordingSink::default();

    for t in (30_000..33_000).step_by(500) {
        monitor.poll(t, &mut source, &mut relay, &mut sink);
    }
    assert_eq!(monitor.heater().current_mode(), HeaterMode::Co);
    assert_eq!(relay.failures, 1);

    relay.failing = false;
    monitor.poll(35_000, &mut source, &mut relay, &mut sink);
    assert_eq!(monitor.heater().current_mode(), HeaterMode::Ch4);
    assert_eq!(monitor.heater().last_transition(), 35_000);
}

#[test]
fn test_calibration_on_boot() {
    let mut config = MonitorConfig::default().with_calibration_on_boot(true);
    config.calibration.samples_per_sensor = 3;
    let store = CalibrationStore::new(MemoryStorage::<64>::new(), &config).unwrap();
    let mut monitor = SamplingLoop::new(config, store, 0);

    let mut source = ScriptedSource::clean_air();
    let mut relay = FakeRelay::default();
    let mut sink = RecordingSink::default();

    let mut finished = None;
    let mut t = 0;
    while t <= 40_000 {
        match monitor.poll(t, &mut source, &mut relay, &mut sink) {
            TickOutcome::CalibrationFinished(outcome) => {
                finished = Some((t, outcome));
                break;
            }
            TickOutcome::Published { .. } => panic!("published while calibrating"),
            _ => {}
        }
        t += 1_000;
    }

    // MQ-9B samples only count once the CO heater level has settled
    let (t, outcome) = finished.expect("calibration did not finish");
    assert_eq!(t, 22_000);
    assert!(outcome.is_complete());
    assert_eq!(outcome.records.len(), 4);
    assert!(relay.switches.is_empty());

    assert_eq!(sink.calibrations.len(), 1);
    assert!(sink.reports.is_empty());

    let store = monitor.store();
    assert!(store.is_fully_calibrated());
    for sensor in GasSensor::ALL {
        let r0 = store.record(sensor).r0_ohms;
        assert!((r0 - 10_000.0).abs() / 10_000.0 < 0.05, "{} R0 {}", sensor, r0);
    }

    // Sampling resumes right away
    assert!(matches!(
        monitor.poll(t, &mut source, &mut relay, &mut sink),
        TickOutcome::Published { .. }
    ));
    assert!(!sink.last().uses_fallback_calibration());
}

#[test]
fn test_aborted_calibration_leaves_storage_untouched() {
    let config = MonitorConfig::default();
    let store = calibrated_store(&config, [12_345.0; 4]);
    let before = *store.storage().as_bytes();
    let mut monitor = SamplingLoop::new(config, store, 0);

    let mut source = ScriptedSource::clean_air();
    let mut relay = FakeRelay::default();
    let mut sink = RecordingSink::default();

    assert!(monitor.start_calibration(0));
    for t in (0..5_000).step_by(1_000) {
        let outcome = monitor.poll(t, &mut source, &mut relay, &mut sink);
        assert!(matches!(outcome, TickOutcome::Calibrating { .. }));
    }
    assert_eq!(monitor.calibration_progress(), Some((0, 10)));
    assert!(monitor.abort_calibration());

    let store = monitor.into_store();
    assert_eq!(store.storage().as_bytes(), &before);
    assert_eq!(store.record(GasSensor::Mq8).r0_ohms, 12_345.0);
    assert!(sink.calibrations.is_empty());
}
