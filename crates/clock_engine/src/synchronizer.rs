//! Dual-track clock synchronizer.
//!
//! Owns two `TickTime` tracks: a reference track (best estimate of the
//! authority's current time) and a local track (a predictive, buffered lead
//! on the reference track). On a follower the local track is advanced through
//! a bounded time scale to close the tracking error continuously; when the
//! error exceeds the hard-reset threshold the local track snaps instead.
//! On an authority both tracks are identical at all times.

use contracts::{ClockError, ClockSample, SyncConfig, TickTime};
use tracing::instrument;

/// Role of a clock instance in the client-server topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRole {
    /// Ground-truth clock (server/host); no prediction needed
    Authority,
    /// Clock that predicts the authority's time ahead of its own knowledge
    Follower,
}

/// Clock synchronizer for one authority or one follower instance.
///
/// Each connection owns an independent instance; there is no shared state.
#[derive(Debug)]
pub struct ClockSynchronizer {
    /// Configuration
    config: SyncConfig,
    /// Role selected at construction
    role: ClockRole,
    /// Predictive/render clock, leads the reference track on a follower
    local: TickTime,
    /// Best estimate of the authority's current time
    reference: TickTime,
    /// Last observed round-trip time, seconds
    last_rtt_sec: f64,
    /// Current multiplier on the local track's advancement
    time_scale: f64,
    /// Hard resets performed since construction
    hard_reset_count: u64,
    /// Whether the most recent `advance` performed a hard reset
    last_advance_reset: bool,
}

impl ClockSynchronizer {
    /// Create a synchronizer with both tracks at the epoch.
    pub fn new(role: ClockRole, tick_rate: u32, config: SyncConfig) -> Result<Self, ClockError> {
        config.validate()?;
        let zero = TickTime::new(tick_rate, 0.0)?;
        Ok(Self {
            config,
            role,
            local: zero,
            reference: zero,
            last_rtt_sec: 0.0,
            time_scale: 1.0,
            hard_reset_count: 0,
            last_advance_reset: false,
        })
    }

    /// Set both tracks to the given reference time.
    ///
    /// Authority initialization; also usable to rebase either role.
    pub fn reset(&mut self, initial_reference_time: f64) {
        self.reference = TickTime::new(self.reference.tick_rate(), initial_reference_time)
            .unwrap_or(self.reference);
        self.local = self.reference;
        self.last_rtt_sec = 0.0;
        self.time_scale = 1.0;
        tracing::debug!(time = initial_reference_time, "clock reset");
    }

    /// Follower initialization: the local track starts with the full target
    /// lead already applied, avoiding an initial ramp-up transient.
    pub fn initialize_client(
        &mut self,
        initial_reference_time: f64,
        assumed_rtt_sec: f64,
    ) -> Result<(), ClockError> {
        if self.role == ClockRole::Authority {
            return Err(ClockError::role_violation(
                "initialize_client is only valid on a follower clock",
            ));
        }
        self.reference = TickTime::new(self.reference.tick_rate(), initial_reference_time)?;
        self.last_rtt_sec = assumed_rtt_sec;
        self.local = self.reference + (assumed_rtt_sec + self.config.buffer_sec());
        self.time_scale = 1.0;
        tracing::debug!(
            time = initial_reference_time,
            assumed_rtt = assumed_rtt_sec,
            lead = self.target_lead(),
            "follower clock initialized"
        );
        Ok(())
    }

    /// Feed a fresh authoritative time sample.
    ///
    /// The reference track is set directly from the observation (it tracks
    /// reality, never time-scaled) and the RTT estimate used to size the
    /// target lead is replaced. No-op on an authority.
    #[instrument(
        level = "trace",
        name = "clock_sync",
        skip(self),
        fields(observed = observed_reference_time, rtt = rtt_sec)
    )]
    pub fn sync(&mut self, observed_reference_time: f64, rtt_sec: f64) {
        if self.role == ClockRole::Authority {
            tracing::debug!("sync ignored on authority clock");
            return;
        }
        self.last_rtt_sec = rtt_sec;
        self.reference = TickTime::new(self.reference.tick_rate(), observed_reference_time)
            .unwrap_or(self.reference);
    }

    /// Advance both tracks by one frame of real time.
    ///
    /// Returns whether a hard reset occurred. The reference track always
    /// advances at wall-clock rate; only the local track is warped.
    #[instrument(
        level = "trace",
        name = "clock_advance",
        skip(self),
        fields(elapsed = elapsed_sec, role = ?self.role)
    )]
    pub fn advance(&mut self, elapsed_sec: f64) -> bool {
        // a negative frame delta is treated as a paused frame
        let elapsed = elapsed_sec.max(0.0);

        if self.role == ClockRole::Authority {
            self.local = self.local + elapsed;
            self.reference = self.local;
            self.last_advance_reset = false;
            return false;
        }

        let target = self.target_lead();
        let err = (self.local.time() - self.reference.time()) - target;

        if err.abs() > self.config.hard_reset_threshold_sec {
            self.reference = self.reference + elapsed;
            self.local = self.reference + target;
            self.time_scale = 1.0;
            self.hard_reset_count += 1;
            self.last_advance_reset = true;

            tracing::warn!(
                error = err,
                threshold = self.config.hard_reset_threshold_sec,
                rtt = self.last_rtt_sec,
                "tracking error exceeded threshold, hard reset"
            );
            metrics::counter!("clock_hard_resets_total").increment(1);
            return true;
        }

        self.time_scale = (1.0 - err * self.config.correction_gain)
            .clamp(self.config.min_time_scale, self.config.max_time_scale);
        self.local = self.local + elapsed * self.time_scale;
        self.reference = self.reference + elapsed;
        self.last_advance_reset = false;

        metrics::histogram!("clock_time_scale").record(self.time_scale);
        metrics::histogram!("clock_tracking_error").record(err.abs());
        false
    }

    /// Predictive/render clock.
    pub fn local_time(&self) -> TickTime {
        self.local
    }

    /// Best estimate of the authority's current time.
    pub fn reference_time(&self) -> TickTime {
        self.reference
    }

    /// Current multiplier applied to the local track's advancement.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Last observed round-trip time, seconds.
    pub fn last_rtt(&self) -> f64 {
        self.last_rtt_sec
    }

    /// Target lead of the local track over the reference track, seconds.
    pub fn target_lead(&self) -> f64 {
        self.last_rtt_sec + self.config.buffer_sec()
    }

    /// Current tracking error against the target lead, seconds.
    pub fn tracking_error(&self) -> f64 {
        (self.local.time() - self.reference.time()) - self.target_lead()
    }

    /// Hard resets performed since construction.
    pub fn hard_reset_count(&self) -> u64 {
        self.hard_reset_count
    }

    /// Role selected at construction.
    pub fn role(&self) -> ClockRole {
        self.role
    }

    /// Configured local lead margin, seconds.
    pub fn local_buffer_sec(&self) -> f64 {
        self.config.local_buffer_sec
    }

    /// Configured reference lag margin, seconds.
    pub fn reference_buffer_sec(&self) -> f64 {
        self.config.reference_buffer_sec
    }

    /// Diagnostics sample of the current state, for metrics aggregation.
    pub fn sample(&self) -> ClockSample {
        ClockSample {
            local_time: self.local.time(),
            reference_time: self.reference.time(),
            time_scale: self.time_scale,
            tracking_error: self.tracking_error(),
            rtt: self.last_rtt_sec,
            hard_reset: self.last_advance_reset,
        }
    }
}
