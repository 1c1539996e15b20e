//! Outbound event and diagnostics structures.

use serde::{Deserialize, Serialize};

use crate::TickTime;

/// Notification fired once per crossed tick boundary, in order.
///
/// The carried times are quantized to the boundary that was crossed, not the
/// fractional frame time, so consumers always observe tick-aligned snapshots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TickEvent {
    /// The integer tick that was crossed (previous tick + 1, never skipped)
    pub tick: i64,

    /// Local (predictive) track at the boundary
    pub local_time: TickTime,

    /// Reference track at the boundary
    pub reference_time: TickTime,
}

/// Per-frame synchronizer diagnostics sample.
///
/// Produced by the frame loop after `advance()` for metrics aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClockSample {
    /// Local track time, seconds
    pub local_time: f64,

    /// Reference track time, seconds
    pub reference_time: f64,

    /// Current time scale applied to the local track
    pub time_scale: f64,

    /// Tracking error against the target lead, seconds
    pub tracking_error: f64,

    /// Last observed round-trip time, seconds
    pub rtt: f64,

    /// Whether this frame performed a hard reset
    pub hard_reset: bool,
}

/// Snapshot interpolator status (for diagnostics)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InterpolatorStats {
    /// Samples currently buffered
    pub buffered: usize,

    /// Samples evicted because the buffer was full
    pub evicted: u64,

    /// Samples dropped because they were not newer than the consumed bracket
    pub stale_dropped: u64,

    /// Samples consumed over the interpolator's lifetime
    pub lifetime_consumed: u64,

    /// Oldest buffered timestamp, seconds
    pub oldest_timestamp: Option<f64>,

    /// Newest buffered timestamp, seconds
    pub newest_timestamp: Option<f64>,
}
