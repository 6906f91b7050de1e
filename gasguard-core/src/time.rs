//! Time management for the monitor main loop
//!
//! Everything time-based in the engine (sampling interval, heater settle
//! windows, calibration pacing) is a deadline check against a monotonic
//! millisecond counter. Nothing ever sleeps, so display refresh and alarm
//! output running in the same loop are never starved.

/// Milliseconds since device boot
pub type Timestamp = u64;

/// Source of monotonic time
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Host monotonic clock (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start counting from zero now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Manually driven time source for tests and simulation
#[derive(Debug, Clone)]
pub struct ManualTime {
    timestamp: Timestamp,
}

impl ManualTime {
    /// Create at the given timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Non-blocking periodic deadline
///
/// Due immediately after creation, then once per `period_ms`. Missed periods
/// are not replayed: after a long stall the next deadline is measured from
/// the moment the interval fired.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u64,
    next_due: Option<Timestamp>,
}

impl Interval {
    /// Create an interval that is due right away
    pub const fn new(period_ms: u64) -> Self {
        Self { period_ms, next_due: None }
    }

    /// Period in milliseconds
    pub const fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Check without consuming the deadline
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.next_due {
            Some(due) => now >= due,
            None => true,
        }
    }

    /// Record that the interval fired at `now`
    pub fn mark(&mut self, now: Timestamp) {
        self.next_due = Some(now.saturating_add(self.period_ms));
    }

    /// Fire if due; returns whether it fired
    pub fn poll(&mut self, now: Timestamp) -> bool {
        if self.is_due(now) {
            self.mark(now);
            true
        } else {
            false
        }
    }

    /// Make the interval due again immediately
    pub fn reset(&mut self) {
        self.next_due = None;
    }
}

/// Milliseconds elapsed from `earlier` to `later`, zero if the clock went back
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}
