//! Scan configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// How a day is searched for free start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStrategy {
    /// Test every candidate start against every booking of the day.
    #[default]
    MinuteScan,
    /// Sort the day's blocked windows and walk the gaps between them.
    GapWalk,
}

/// Granularity and strategy used by the day and hour scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Spacing of candidate start times from local midnight.
    pub granularity_minutes: i64,
    /// Spacing of the sub-slots probed when deciding whether an hour is blocked.
    pub hour_substep_minutes: i64,
    pub strategy: ScanStrategy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            granularity_minutes: 1,
            hour_substep_minutes: 30,
            strategy: ScanStrategy::MinuteScan,
        }
    }
}

impl ScanConfig {
    pub fn with_granularity(mut self, minutes: i64) -> Self {
        self.granularity_minutes = minutes;
        self
    }

    pub fn with_hour_substep(mut self, minutes: i64) -> Self {
        self.hour_substep_minutes = minutes;
        self
    }

    pub fn with_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// # Errors
    /// `InvalidConfig` when the granularity is outside 1..=1440 minutes or the
    /// hour sub-step is outside 1..=60 minutes.
    pub fn validate(&self) -> Result<()> {
        if !(1..=1440).contains(&self.granularity_minutes) {
            return Err(SlotError::InvalidConfig(format!(
                "granularity_minutes must be between 1 and 1440, got {}",
                self.granularity_minutes
            )));
        }
        if !(1..=60).contains(&self.hour_substep_minutes) {
            return Err(SlotError::InvalidConfig(format!(
                "hour_substep_minutes must be between 1 and 60, got {}",
                self.hour_substep_minutes
            )));
        }
        Ok(())
    }

    // Out-of-range values are clamped so an unvalidated config cannot stall a scan.
    pub(crate) fn step(&self) -> Duration {
        Duration::minutes(self.granularity_minutes.clamp(1, 1440))
    }

    pub(crate) fn hour_substep(&self) -> Duration {
        Duration::minutes(self.hour_substep_minutes.clamp(1, 60))
    }
}
