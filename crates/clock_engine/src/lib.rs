//! # Clock Engine
//!
//! Synchronized virtual clock for client-server real-time simulation.
//!
//! Components:
//! - Dual-track clock synchronizer (reference + predictive local track)
//! - Tick scheduler firing ordered, exactly-once boundary notifications
//! - Generic snapshot interpolator smoothing timestamped remote samples
//!
//! ## Usage example
//!
//! ```ignore
//! use clock_engine::{ClockRole, ClockSynchronizer, SnapshotInterpolator, TickScheduler};
//! use contracts::ClockConfig;
//!
//! let config = ClockConfig::with_tick_rate(60);
//! let mut clock = ClockSynchronizer::new(ClockRole::Follower, config.tick_rate, config.sync)?;
//! clock.initialize_client(server_time, assumed_rtt)?;
//! let mut scheduler = TickScheduler::new(config.tick_rate, clock.local_time(), clock.reference_time())?;
//!
//! // once per frame, after draining network receives:
//! clock.sync(observed_server_time, rtt);
//! let hard_reset = clock.advance(frame_delta);
//! scheduler.update(clock.local_time(), clock.reference_time());
//! ```

mod interpolator;
mod lerp;
mod scheduler;
mod synchronizer;

pub use interpolator::SnapshotInterpolator;
pub use lerp::Interpolate;
pub use scheduler::{SubscriptionId, TickScheduler};
pub use synchronizer::{ClockRole, ClockSynchronizer};

// Re-export contracts types
pub use contracts::{
    ClockConfig, ClockError, ClockSample, InterpolatorStats, SnapshotConfig, SyncConfig, TickEvent,
    TickTime,
};
