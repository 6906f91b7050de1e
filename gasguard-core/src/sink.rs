//! Publishing tick results to display, log and indicator collaborators
//!
//! The engine makes no assumption about how results are rendered. A sink
//! receives the full `TickReport` once per sampling tick and the new
//! calibration records once per completed calibration session.

use crate::{calibration::CalibrationRecord, reading::TickReport};

/// Receiver of published results
pub trait ResultSink {
    /// Called once per sampling tick
    fn publish(&mut self, report: &TickReport);

    /// Called when a calibration session has persisted new records
    fn calibration_complete(&mut self, records: &[CalibrationRecord]) {
        let _ = records;
    }
}

impl<T: ResultSink + ?Sized> ResultSink for &mut T {
    fn publish(&mut self, report: &TickReport) {
        (**self).publish(report)
    }

    fn calibration_complete(&mut self, records: &[CalibrationRecord]) {
        (**self).calibration_complete(records)
    }
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn publish(&mut self, _report: &TickReport) {}
}

/// Writes one line per tick through the `log` facade
///
/// Danger ticks and ticks without any valid channel go out at `warn`,
/// everything else at `info`.
#[cfg(feature = "log")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[cfg(feature = "log")]
impl ResultSink for LogSink {
    fn publish(&mut self, report: &TickReport) {
        let level = match report.alarm.severity() {
            Some(crate::alarm::Severity::Danger) | None => log::Level::Warn,
            Some(_) => log::Level::Info,
        };
        log::log!(target: "gasguard::tick", level, "{}", report);
    }

    fn calibration_complete(&mut self, records: &[CalibrationRecord]) {
        for record in records {
            log::info!(
                target: "gasguard::calibration",
                "{} R0={:.1} ohm slot={}",
                record.sensor,
                record.r0_ohms,
                record.slot.address
            );
        }
    }
}
