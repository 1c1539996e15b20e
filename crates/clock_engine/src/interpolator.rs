//! Buffered snapshot interpolator.
//!
//! Accepts timestamped samples of a remote value and produces a continuously
//! interpolated output for a render time that lags the reference clock,
//! hiding network jitter and reordering. Samples arriving out of order are
//! sorted on insert; samples older than the consumed bracket are dropped.
//!
//! Buffer consumption keeps two bracket endpoints around the render time.
//! When several samples become consumable in one update (a burst after a
//! stall) only the last two are kept as the bracket; intermediate states are
//! skipped rather than interpolated through.

use std::collections::VecDeque;

use contracts::{ClockError, InterpolatorStats, TickTime};

use crate::lerp::Interpolate;

/// Brackets shorter than this are treated as zero-length.
const MIN_BRACKET_SEC: f64 = 1.0e-10;

#[derive(Debug, Clone, Copy)]
struct Snapshot<V> {
    value: V,
    timestamp: TickTime,
}

/// Bounded, timestamp-sorted sample buffer with interpolated read-back.
///
/// One instance per replicated value; never shared.
#[derive(Debug)]
pub struct SnapshotInterpolator<V: Interpolate> {
    /// Buffered samples, oldest first
    buffer: VecDeque<Snapshot<V>>,
    capacity: usize,
    /// Bracket start (older consumed sample)
    interp_start: V,
    start_timestamp: TickTime,
    /// Bracket end (newer consumed sample)
    interp_end: V,
    end_timestamp: TickTime,
    /// Last produced output
    current: V,
    lifetime_consumed: u64,
    evicted: u64,
    stale_dropped: u64,
}

impl<V: Interpolate> SnapshotInterpolator<V> {
    /// Create an interpolator seeded with a known initial state, so it is
    /// never read before holding a real value.
    pub fn new(capacity: usize, value: V, timestamp: TickTime) -> Result<Self, ClockError> {
        if capacity == 0 {
            return Err(ClockError::InvalidCapacity { capacity });
        }
        Ok(Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            interp_start: value,
            start_timestamp: timestamp,
            interp_end: value,
            end_timestamp: timestamp,
            current: value,
            lifetime_consumed: 1,
            evicted: 0,
            stale_dropped: 0,
        })
    }

    /// Push a timestamped sample.
    ///
    /// Samples not newer than the consumed end bracket are dropped as stale.
    /// At capacity the oldest buffered sample is evicted first and a warning
    /// is raised; samples are never silently retained beyond capacity.
    pub fn add_measurement(&mut self, value: V, timestamp: TickTime) {
        if timestamp.time() <= self.end_timestamp.time() {
            self.stale_dropped += 1;
            tracing::trace!(
                timestamp = timestamp.time(),
                end = self.end_timestamp.time(),
                "stale snapshot dropped"
            );
            return;
        }

        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
            self.evicted += 1;
            tracing::warn!(
                capacity = self.capacity,
                "snapshot buffer full, evicting oldest sample"
            );
            metrics::counter!("clock_snapshots_evicted_total").increment(1);
        }

        // sorted insert; scan from the back since arrivals are mostly in order
        let position = self
            .buffer
            .iter()
            .rposition(|s| s.timestamp.time() <= timestamp.time())
            .map(|i| i + 1)
            .unwrap_or(0);
        self.buffer.insert(position, Snapshot { value, timestamp });
    }

    /// Advance the bracket to the render time and read back the blended value.
    ///
    /// Consumes, oldest first, every buffered sample with a timestamp at or
    /// before `render_time`, plus one look-ahead sample whenever the render
    /// time has passed the current end bracket, so the bracket straddles it.
    pub fn update(&mut self, render_time: TickTime) -> V {
        while let Some(front) = self.buffer.front() {
            let consumable = front.timestamp.time() <= render_time.time();
            let needs_bracket = self.end_timestamp.time() <= render_time.time();
            if !consumable && !needs_bracket {
                break;
            }

            // the last consumed sample becomes the new end bracket
            if let Some(snapshot) = self.buffer.pop_front() {
                self.start_timestamp = self.end_timestamp;
                self.interp_start = self.interp_end;
                self.end_timestamp = snapshot.timestamp;
                self.interp_end = snapshot.value;
                self.lifetime_consumed += 1;
            }
        }

        let range = self.end_timestamp.time() - self.start_timestamp.time();
        self.current = if range > MIN_BRACKET_SEC {
            let t = ((render_time.time() - self.start_timestamp.time()) / range).clamp(0.0, 1.0);
            V::lerp(self.interp_start, self.interp_end, t)
        } else {
            // zero-length bracket: both endpoints are the same sample
            self.interp_end
        };
        self.current
    }

    /// Clear the buffer and collapse both brackets onto a known value.
    ///
    /// Used on teleport/re-synchronization so the next updates do not
    /// interpolate through the discontinuity.
    pub fn reset(&mut self, value: V, timestamp: TickTime) {
        self.buffer.clear();
        self.interp_start = value;
        self.interp_end = value;
        self.current = value;
        self.start_timestamp = timestamp;
        self.end_timestamp = timestamp;
        self.lifetime_consumed = 1;
        tracing::debug!(timestamp = timestamp.time(), "interpolator reset");
    }

    /// Last produced output, without recomputation.
    pub fn get_interpolated_value(&self) -> V {
        self.current
    }

    /// Current buffer diagnostics.
    pub fn stats(&self) -> InterpolatorStats {
        InterpolatorStats {
            buffered: self.buffer.len(),
            evicted: self.evicted,
            stale_dropped: self.stale_dropped,
            lifetime_consumed: self.lifetime_consumed,
            oldest_timestamp: self.buffer.front().map(|s| s.timestamp.time()),
            newest_timestamp: self.buffer.back().map(|s| s.timestamp.time()),
        }
    }
}
