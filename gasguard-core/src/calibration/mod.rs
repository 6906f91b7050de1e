//! Baseline resistance (R0) calibration and persistence
//!
//! ## Overview
//!
//! Concentration math needs each MQ sensor's resistance in clean air, R0.
//! It is measured once, during an operator-triggered calibration, and must
//! survive power cycles. `CalibrationStore` is the only component that
//! touches persistent storage; everything else reads records by value.
//!
//! ## Storage Layout
//!
//! One fixed, non-overlapping slot per sensor, each holding a little-endian
//! `f32`:
//!
//! ```text
//! address  0      4      8      12     16
//!          ├──────┼──────┼──────┼──────┤
//!          │ MQ-8 │MQ-136│MQ-137│MQ-9B │
//!          └──────┴──────┴──────┴──────┘
//! ```
//!
//! Erased EEPROM reads `0xFF` bytes, which decode to NaN and fail the sanity
//! check like any other corrupt value.
//!
//! ## Load Contract
//!
//! A persisted R0 is accepted only if it is finite and inside the sensor's
//! plausible range. Otherwise the record is flagged invalid and carries the
//! configured fallback R0, so the concentration math stays defined and the
//! channel keeps producing a (flagged) estimate.
//!
//! ## Write Contract
//!
//! `save` refuses an implausible R0, then writes exactly one slot and reads
//! it back before reporting success. A failed or aborted calibration never reaches `save`, so the
//! previous record stays untouched.

mod session;
mod storage;

pub use session::{CalibrationOutcome, CalibrationSession};
pub use storage::{MemoryStorage, NvStorage};

#[cfg(feature = "std")]
pub use storage::FileStorage;

use crate::{
    channel::{GasSensor, GAS_SENSOR_COUNT},
    config::{GasSensorSpec, MonitorConfig},
    constants::sensors::CALIBRATION_SLOT_SIZE,
    errors::{CalibrationError, StorageError, StorageResult},
};

/// Fixed storage location of one sensor's R0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageSlot {
    /// Byte offset in the store
    pub address: u16,
}

impl StorageSlot {
    /// Slot at `address`
    pub const fn new(address: u16) -> Self {
        Self { address }
    }

    /// First byte
    pub const fn start(&self) -> usize {
        self.address as usize
    }

    /// One past the last byte
    pub const fn end(&self) -> usize {
        self.address as usize + CALIBRATION_SLOT_SIZE
    }

    /// Whether two slots share any byte
    pub const fn overlaps(&self, other: &StorageSlot) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}

/// R0 of one sensor as currently in effect
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationRecord {
    /// Sensor this baseline belongs to
    pub sensor: GasSensor,
    /// Baseline resistance (Ω), always finite and positive
    pub r0_ohms: f32,
    /// False when `r0_ohms` is the fallback
    pub valid: bool,
    /// Where the value lives in storage
    pub slot: StorageSlot,
}

impl CalibrationRecord {
    fn fallback(spec: &GasSensorSpec) -> Self {
        Self {
            sensor: spec.sensor,
            r0_ohms: spec.fallback_r0_ohms,
            valid: false,
            slot: spec.slot,
        }
    }
}

/// Sole owner of persisted calibration data
pub struct CalibrationStore<S: NvStorage> {
    storage: S,
    specs: [GasSensorSpec; GAS_SENSOR_COUNT],
    records: [CalibrationRecord; GAS_SENSOR_COUNT],
}

impl<S: NvStorage> CalibrationStore<S> {
    /// Take ownership of `storage` and load every sensor's record
    pub fn new(storage: S, config: &MonitorConfig) -> StorageResult<Self> {
        let specs = config.sensors;

        for spec in &specs {
            if spec.slot.end() > storage.capacity() {
                return Err(StorageError::OutOfBounds {
                    address: spec.slot.start(),
                    len: CALIBRATION_SLOT_SIZE,
                    capacity: storage.capacity(),
                });
            }
        }

        let records = [
            CalibrationRecord::fallback(&specs[0]),
            CalibrationRecord::fallback(&specs[1]),
            CalibrationRecord::fallback(&specs[2]),
            CalibrationRecord::fallback(&specs[3]),
        ];

        let mut store = Self { storage, specs, records };
        for sensor in GasSensor::ALL {
            store.load(sensor);
        }

        Ok(store)
    }

    fn spec(&self, sensor: GasSensor) -> &GasSensorSpec {
        &self.specs[sensor.index()]
    }

    /// Read and sanity-check the persisted R0 of `sensor`
    ///
    /// Falls back to the configured default and flags the record invalid
    /// when the slot is unreadable, erased, or out of range.
    pub fn load(&mut self, sensor: GasSensor) -> CalibrationRecord {
        let spec = *self.spec(sensor);
        let mut bytes = [0u8; CALIBRATION_SLOT_SIZE];

        let record = match self.storage.read(spec.slot.start(), &mut bytes) {
            Ok(()) => {
                let r0 = f32::from_le_bytes(bytes);
                if spec.is_plausible_r0(r0) {
                    CalibrationRecord {
                        sensor,
                        r0_ohms: r0,
                        valid: true,
                        slot: spec.slot,
                    }
                } else {
                    log_warn!(
                        "{}: stored R0 {} ohm is implausible, using fallback {} ohm",
                        sensor, r0, spec.fallback_r0_ohms
                    );
                    CalibrationRecord::fallback(&spec)
                }
            }
            Err(err) => {
                log_warn!("{}: cannot read calibration slot: {}", sensor, err);
                CalibrationRecord::fallback(&spec)
            }
        };

        self.records[sensor.index()] = record;
        record
    }

    /// Record currently in effect for `sensor`
    pub fn record(&self, sensor: GasSensor) -> CalibrationRecord {
        self.records[sensor.index()]
    }

    /// Records of all sensors in slot order
    pub fn records(&self) -> [CalibrationRecord; GAS_SENSOR_COUNT] {
        self.records
    }

    /// Whether every sensor has a persisted, plausible R0
    pub fn is_fully_calibrated(&self) -> bool {
        self.records.iter().all(|r| r.valid)
    }

    /// Derive R0 from clean-air RS samples, persist it and return the record
    ///
    /// `R0 = mean(RS) / clean_air_ratio`. Non-finite and non-positive samples
    /// are ignored. An implausible result is rejected without touching
    /// storage.
    pub fn calibrate(
        &mut self,
        sensor: GasSensor,
        clean_air_samples: &[f32],
    ) -> Result<CalibrationRecord, CalibrationError> {
        let spec = *self.spec(sensor);

        let (sum, count) = clean_air_samples
            .iter()
            .filter(|rs| rs.is_finite() && **rs > 0.0)
            .fold((0.0f64, 0u32), |(sum, n), rs| (sum + *rs as f64, n + 1));

        if count == 0 {
            return Err(CalibrationError::NoValidSamples);
        }

        let rs_clean_air = (sum / count as f64) as f32;
        let r0 = rs_clean_air / spec.clean_air_ratio;

        if !spec.is_plausible_r0(r0) {
            log_warn!("{}: calibration produced implausible R0 {} ohm", sensor, r0);
            return Err(CalibrationError::Implausible { r0_ohms: r0 });
        }

        let record = CalibrationRecord {
            sensor,
            r0_ohms: r0,
            valid: true,
            slot: spec.slot,
        };
        self.save(record)?;

        log_info!("{}: calibrated R0 = {} ohm from {} samples", sensor, r0, count);
        Ok(record)
    }

    /// Persist `record.r0_ohms` into the sensor's slot
    ///
    /// An implausible R0 is rejected before anything is written. Only the
    /// record's own slot is written. The slot is read back and compared
    /// before the in-memory record is replaced.
    pub fn save(&mut self, record: CalibrationRecord) -> Result<(), CalibrationError> {
        let spec = *self.spec(record.sensor);
        if !spec.is_plausible_r0(record.r0_ohms) {
            return Err(CalibrationError::Implausible { r0_ohms: record.r0_ohms });
        }
        let bytes = record.r0_ohms.to_le_bytes();

        self.storage.write(spec.slot.start(), &bytes)?;

        let mut readback = [0u8; CALIBRATION_SLOT_SIZE];
        self.storage.read(spec.slot.start(), &mut readback)?;
        if readback != bytes {
            return Err(StorageError::VerifyFailed.into());
        }

        self.records[record.sensor.index()] = CalibrationRecord {
            slot: spec.slot,
            valid: true,
            ..record
        };
        Ok(())
    }

    /// Borrow the underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrow the underlying storage
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give the storage back
    pub fn into_storage(self) -> S {
        self.storage
    }
}
