//! Dual-threshold alarm evaluation and aggregation
//!
//! ## Per-channel severity
//!
//! Every channel carries a warning and a danger threshold:
//!
//! ```text
//! value >= danger   -> Danger
//! value >= warning  -> Warning
//! otherwise         -> Normal
//! ```
//!
//! Severity is a total order (`Normal < Warning < Danger`) and monotonic in
//! the value for fixed thresholds.
//!
//! ## Aggregation
//!
//! The system level is the maximum over *valid* channels only. A channel that
//! is disconnected, unsettled or uncalibrated is left out entirely rather than
//! counted as Normal, so a dead sensor can never mask or fake a hazard. All
//! channels tied at the worst level are reported; there is no tie-break.
//!
//! No hysteresis is applied: each tick is evaluated from scratch.

use heapless::Vec;

use crate::{
    channel::{ChannelId, CHANNEL_COUNT},
    reading::Reading,
};

/// Alarm tier for a reading or for the whole system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Severity {
    /// Below the warning threshold
    Normal = 0,
    /// At or above warning, below danger
    Warning = 1,
    /// At or above danger
    Danger = 2,
}

impl Severity {
    /// Display label
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Normal => "NORMAL",
            Severity::Warning => "WARNING",
            Severity::Danger => "DANGER",
        }
    }
}

/// Warning and danger limits for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdPair {
    /// Warning threshold (inclusive)
    pub warning: f32,
    /// Danger threshold (inclusive)
    pub danger: f32,
}

impl ThresholdPair {
    /// Create a pair
    pub const fn new(warning: f32, danger: f32) -> Self {
        Self { warning, danger }
    }

    /// Severity of `value` against this pair
    pub fn classify(&self, value: f32) -> Severity {
        severity(value, self.warning, self.danger)
    }

    /// Both finite and warning not above danger
    pub fn is_ordered(&self) -> bool {
        self.warning.is_finite() && self.danger.is_finite() && self.warning <= self.danger
    }
}

/// Classify a value against dual thresholds
pub fn severity(value: f32, warning: f32, danger: f32) -> Severity {
    if value >= danger {
        Severity::Danger
    } else if value >= warning {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

/// Channels sharing the worst severity of a tick
pub type ChannelSet = Vec<ChannelId, CHANNEL_COUNT>;

/// Aggregate alarm level for one tick
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmState {
    /// Worst severity across valid channels, `None` when none were valid
    worst: Option<Severity>,
    /// Every valid channel at the worst severity
    contributing: ChannelSet,
    /// Number of channels that took part
    valid_channels: u8,
}

impl AlarmState {
    /// State with no valid channels
    pub const fn empty() -> Self {
        Self {
            worst: None,
            contributing: Vec::new(),
            valid_channels: 0,
        }
    }

    /// Aggregate `(channel, severity)` pairs of valid channels
    pub fn from_severities<I>(severities: I) -> Self
    where
        I: IntoIterator<Item = (ChannelId, Severity)>,
    {
        let mut state = Self::empty();

        for (channel, level) in severities {
            state.valid_channels = state.valid_channels.saturating_add(1);

            match state.worst {
                Some(worst) if level < worst => continue,
                Some(worst) if level == worst => {}
                _ => {
                    state.worst = Some(level);
                    state.contributing.clear();
                }
            }

            // Capacity equals the channel count, and each channel appears once
            if !state.contributing.contains(&channel) {
                let _ = state.contributing.push(channel);
            }
        }

        state
    }

    /// Worst severity, `None` if every channel was invalid
    pub fn severity(&self) -> Option<Severity> {
        self.worst
    }

    /// Worst severity treating "nothing valid" as Normal (for indicators)
    pub fn severity_or_normal(&self) -> Severity {
        self.worst.unwrap_or(Severity::Normal)
    }

    /// Channels driving the worst severity
    pub fn contributing(&self) -> &[ChannelId] {
        &self.contributing
    }

    /// Number of channels included in the aggregation
    pub fn valid_channel_count(&self) -> usize {
        self.valid_channels as usize
    }

    /// False means a system-health problem, not a gas hazard
    pub fn has_valid_channels(&self) -> bool {
        self.valid_channels > 0
    }

    /// Whether the aggregate level differs from a previous tick's
    pub fn changed_from(&self, previous: Option<Severity>) -> bool {
        self.worst != previous
    }
}

impl Default for AlarmState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-channel thresholds plus aggregation
#[derive(Debug, Clone)]
pub struct AlarmEvaluator {
    thresholds: [ThresholdPair; CHANNEL_COUNT],
}

impl AlarmEvaluator {
    /// Create from a per-channel table indexed by `ChannelId::index`
    pub fn new(thresholds: [ThresholdPair; CHANNEL_COUNT]) -> Self {
        Self { thresholds }
    }

    /// Thresholds configured for a channel
    pub fn thresholds(&self, channel: ChannelId) -> ThresholdPair {
        self.thresholds[channel.index()]
    }

    /// Severity of a value on a channel
    pub fn severity(&self, channel: ChannelId, value: f32) -> Severity {
        self.thresholds(channel).classify(value)
    }

    /// Aggregate the valid readings of one tick
    pub fn aggregate(&self, readings: &[Reading]) -> AlarmState {
        AlarmState::from_severities(
            readings
                .iter()
                .filter(|r| r.is_valid())
                .filter_map(|r| r.severity.map(|s| (r.channel, s))),
        )
    }
}
