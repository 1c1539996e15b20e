//! Clock metrics collection module
//!
//! Records and aggregates runtime metrics of the clock synchronizer and the
//! snapshot interpolators from their per-frame diagnostics samples.

use contracts::{ClockSample, InterpolatorStats};
use metrics::{counter, gauge, histogram};

/// Record metrics from a per-frame clock sample.
///
/// Call once per frame after `advance()`.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_clock_sample;
///
/// clock.advance(frame_delta);
/// record_clock_sample(&clock.sample());
/// ```
pub fn record_clock_sample(sample: &ClockSample) {
    // current tracks
    gauge!("netclock_local_time_sec").set(sample.local_time);
    gauge!("netclock_reference_time_sec").set(sample.reference_time);

    // correction state
    gauge!("netclock_time_scale").set(sample.time_scale);
    histogram!("netclock_time_scale_hist").record(sample.time_scale);

    gauge!("netclock_tracking_error_ms").set(sample.tracking_error * 1000.0);
    histogram!("netclock_tracking_error_ms_hist").record(sample.tracking_error.abs() * 1000.0);

    // rtt estimate the target lead is sized from
    gauge!("netclock_rtt_ms").set(sample.rtt * 1000.0);
    histogram!("netclock_rtt_ms_hist").record(sample.rtt * 1000.0);

    if sample.hard_reset {
        counter!("netclock_hard_resets_total").increment(1);
    }
}

/// Record a fired tick notification (used to detect skipped ticks).
pub fn record_tick(tick: i64) {
    counter!("netclock_ticks_total").increment(1);
    gauge!("netclock_last_tick").set(tick as f64);
}

/// Record snapshot interpolator buffer diagnostics.
pub fn record_snapshot_stats(name: &str, stats: &InterpolatorStats) {
    gauge!(
        "netclock_snapshot_buffer_depth",
        "interpolator" => name.to_string()
    )
    .set(stats.buffered as f64);

    if stats.evicted > 0 {
        gauge!(
            "netclock_snapshot_evicted",
            "interpolator" => name.to_string()
        )
        .set(stats.evicted as f64);
    }

    if stats.stale_dropped > 0 {
        gauge!(
            "netclock_snapshot_stale_dropped",
            "interpolator" => name.to_string()
        )
        .set(stats.stale_dropped as f64);
    }
}

/// Clock metrics aggregator
///
/// Aggregates samples in memory for statistics and summary output.
#[derive(Debug, Clone, Default)]
pub struct ClockMetricsAggregator {
    /// Total frames sampled
    pub total_frames: u64,

    /// Hard resets observed
    pub total_hard_resets: u64,

    /// Tracking error statistics (milliseconds, absolute)
    pub error_stats: RunningStats,

    /// Time scale statistics
    pub time_scale_stats: RunningStats,

    /// RTT statistics (milliseconds)
    pub rtt_stats: RunningStats,
}

impl ClockMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics from one frame sample
    pub fn update(&mut self, sample: &ClockSample) {
        self.total_frames += 1;
        if sample.hard_reset {
            self.total_hard_resets += 1;
        }
        self.error_stats.push(sample.tracking_error.abs() * 1000.0);
        self.time_scale_stats.push(sample.time_scale);
        self.rtt_stats.push(sample.rtt * 1000.0);
    }

    /// Generate a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            total_hard_resets: self.total_hard_resets,
            tracking_error_ms: self.error_stats.summary(),
            time_scale: self.time_scale_stats.summary(),
            rtt_ms: self.rtt_stats.summary(),
        }
    }
}

/// Aggregated metrics summary
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub total_hard_resets: u64,
    pub tracking_error_ms: StatsSummary,
    pub time_scale: StatsSummary,
    pub rtt_ms: StatsSummary,
}

/// Running statistics over a stream of values (count/mean/min/max)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Push one value
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    /// Number of values pushed
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running mean
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Snapshot of the statistics
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            count: self.count,
            mean: self.mean,
            min: if self.count == 0 { 0.0 } else { self.min },
            max: if self.count == 0 { 0.0 } else { self.max },
        }
    }
}

/// Point-in-time statistics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}
