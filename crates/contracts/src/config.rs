//! Clock subsystem configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

use crate::ClockError;

/// Clock subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Simulation tick rate (ticks per second, must be > 0)
    pub tick_rate: u32,

    /// Synchronizer configuration
    #[serde(default)]
    pub sync: SyncConfig,

    /// Snapshot interpolation configuration
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl ClockConfig {
    /// Create a configuration with default sub-sections for the given rate.
    pub fn with_tick_rate(tick_rate: u32) -> Self {
        Self {
            tick_rate,
            sync: SyncConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }

    /// Fail-fast validation of every field.
    pub fn validate(&self) -> Result<(), ClockError> {
        if self.tick_rate == 0 {
            return Err(ClockError::config_validation(
                "tick_rate",
                "must be a positive integer",
            ));
        }
        self.sync.validate()?;
        self.snapshot.validate()?;
        Ok(())
    }
}

/// Clock synchronizer configuration
///
/// The follower's local track targets a lead of
/// `rtt + reference_buffer_sec + local_buffer_sec` over the reference track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Extra lead margin on the local (predictive) track, seconds
    pub local_buffer_sec: f64,

    /// Extra lag margin budgeted for the reference track, seconds
    pub reference_buffer_sec: f64,

    /// Tracking error beyond which the local track snaps instead of scaling,
    /// seconds. Must sit above typical jitter.
    pub hard_reset_threshold_sec: f64,

    /// Proportional gain applied to the tracking error when deriving the
    /// time scale (per second of error)
    pub correction_gain: f64,

    /// Lower clamp of the local track's time scale
    pub min_time_scale: f64,

    /// Upper clamp of the local track's time scale
    pub max_time_scale: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            local_buffer_sec: 0.05,
            reference_buffer_sec: 0.05,
            hard_reset_threshold_sec: 0.2,
            correction_gain: 1.0,
            min_time_scale: 0.9,
            max_time_scale: 1.1,
        }
    }
}

impl SyncConfig {
    /// Fail-fast validation
    pub fn validate(&self) -> Result<(), ClockError> {
        if self.local_buffer_sec < 0.0 {
            return Err(ClockError::config_validation(
                "sync.local_buffer_sec",
                "must be non-negative",
            ));
        }
        if self.reference_buffer_sec < 0.0 {
            return Err(ClockError::config_validation(
                "sync.reference_buffer_sec",
                "must be non-negative",
            ));
        }
        if self.hard_reset_threshold_sec <= 0.0 {
            return Err(ClockError::config_validation(
                "sync.hard_reset_threshold_sec",
                "must be positive",
            ));
        }
        if self.correction_gain <= 0.0 {
            return Err(ClockError::config_validation(
                "sync.correction_gain",
                "must be positive",
            ));
        }
        if self.min_time_scale <= 0.0 || self.min_time_scale > 1.0 {
            return Err(ClockError::config_validation(
                "sync.min_time_scale",
                "must be in (0, 1]",
            ));
        }
        if self.max_time_scale < 1.0 {
            return Err(ClockError::config_validation(
                "sync.max_time_scale",
                "must be >= 1",
            ));
        }
        Ok(())
    }

    /// Combined buffer margin added on top of the RTT estimate.
    #[inline]
    pub fn buffer_sec(&self) -> f64 {
        self.local_buffer_sec + self.reference_buffer_sec
    }
}

/// Snapshot interpolator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Maximum buffered samples per interpolator; the oldest sample is
    /// evicted when full
    pub capacity: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl SnapshotConfig {
    /// Fail-fast validation
    pub fn validate(&self) -> Result<(), ClockError> {
        if self.capacity == 0 {
            return Err(ClockError::config_validation(
                "snapshot.capacity",
                "must be positive",
            ));
        }
        Ok(())
    }
}
