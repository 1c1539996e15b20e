//! Quantized network time value.
//!
//! A `TickTime` pairs a signed f64 second count with a fixed tick rate and
//! derives the integer tick and sub-tick remainder from it on demand. Values
//! are immutable; every arithmetic operation returns a fresh value at the
//! same rate.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::ClockError;

/// A point in time quantized to a fixed tick rate.
///
/// The tick is derived by flooring (`tick = floor(time * rate)`), so negative
/// times floor toward negative infinity and the sub-tick offset is always in
/// `[0, 1/rate)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickTime {
    tick_rate: u32,
    time: f64,
}

impl TickTime {
    /// Create a new time value. The tick rate must be positive; negative
    /// times are legal (before the epoch).
    pub fn new(tick_rate: u32, time_sec: f64) -> Result<Self, ClockError> {
        if tick_rate == 0 {
            return Err(ClockError::InvalidTickRate { tick_rate });
        }
        Ok(Self {
            tick_rate,
            time: time_sec,
        })
    }

    /// Create a time value from an elapsed (wall-clock) second count.
    /// Rejects negative input in addition to the tick rate check.
    pub fn elapsed(tick_rate: u32, time_sec: f64) -> Result<Self, ClockError> {
        if time_sec < 0.0 {
            return Err(ClockError::NegativeTime { seconds: time_sec });
        }
        Self::new(tick_rate, time_sec)
    }

    /// Create a time value sitting exactly on a tick boundary.
    pub fn from_ticks(tick_rate: u32, tick: i64) -> Result<Self, ClockError> {
        if tick_rate == 0 {
            return Err(ClockError::InvalidTickRate { tick_rate });
        }
        Ok(Self {
            tick_rate,
            time: tick as f64 / tick_rate as f64,
        })
    }

    /// Raw time in seconds.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Tick rate in ticks per second.
    #[inline]
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Duration of one tick in seconds.
    #[inline]
    pub fn fixed_delta_time(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }

    /// Integer tick, floored toward negative infinity.
    #[inline]
    pub fn tick(&self) -> i64 {
        self.split().0
    }

    /// Sub-tick remainder, always in `[0, 1/rate)`.
    #[inline]
    pub fn tick_offset(&self) -> f64 {
        self.split().1
    }

    /// Time of the containing tick boundary (`tick / rate`).
    #[inline]
    pub fn fixed_time(&self) -> f64 {
        let (tick, _) = self.split();
        tick as f64 * self.fixed_delta_time()
    }

    /// A copy of this value quantized down to its tick boundary.
    pub fn to_fixed_time(&self) -> Self {
        Self {
            tick_rate: self.tick_rate,
            time: self.fixed_time(),
        }
    }

    /// Add a raw second delta, keeping the rate. Fallible counterpart of the
    /// same-rate `+` operator does not exist for scalars; this never fails.
    #[inline]
    pub fn add_secs(&self, delta_sec: f64) -> Self {
        Self {
            tick_rate: self.tick_rate,
            time: self.time + delta_sec,
        }
    }

    /// Add another `TickTime` of the same rate.
    pub fn checked_add(&self, rhs: TickTime) -> Result<Self, ClockError> {
        self.require_same_rate(rhs)?;
        Ok(self.add_secs(rhs.time))
    }

    /// Subtract another `TickTime` of the same rate.
    pub fn checked_sub(&self, rhs: TickTime) -> Result<Self, ClockError> {
        self.require_same_rate(rhs)?;
        Ok(self.add_secs(-rhs.time))
    }

    /// Float-tolerant equality on the raw time.
    pub fn approx_eq(&self, other: TickTime, epsilon: f64) -> bool {
        self.tick_rate == other.tick_rate && (self.time - other.time).abs() <= epsilon
    }

    fn require_same_rate(&self, rhs: TickTime) -> Result<(), ClockError> {
        if self.tick_rate != rhs.tick_rate {
            return Err(ClockError::TickRateMismatch {
                left: self.tick_rate,
                right: rhs.tick_rate,
            });
        }
        Ok(())
    }

    /// Split into (tick, offset). Floors toward negative infinity, with a
    /// correction for double imprecision right below a tick boundary.
    fn split(&self) -> (i64, f64) {
        let interval = self.fixed_delta_time();
        let scaled = self.time * self.tick_rate as f64;
        let mut tick = scaled.floor();
        if scaled - tick >= 0.999_999_999_999 {
            tick += 1.0;
        }
        let tick = tick as i64;
        let offset = (self.time - tick as f64 * interval).max(0.0);
        (tick, offset)
    }
}

impl Add<f64> for TickTime {
    type Output = TickTime;

    fn add(self, rhs: f64) -> TickTime {
        self.add_secs(rhs)
    }
}

impl Sub<f64> for TickTime {
    type Output = TickTime;

    fn sub(self, rhs: f64) -> TickTime {
        self.add_secs(-rhs)
    }
}

impl Add<TickTime> for TickTime {
    type Output = TickTime;

    /// Panics on mismatched tick rates; use `checked_add` for a `Result`.
    fn add(self, rhs: TickTime) -> TickTime {
        assert_eq!(
            self.tick_rate, rhs.tick_rate,
            "tick rate mismatch in TickTime addition"
        );
        self.add_secs(rhs.time)
    }
}

impl Sub<TickTime> for TickTime {
    type Output = TickTime;

    /// Panics on mismatched tick rates; use `checked_sub` for a `Result`.
    fn sub(self, rhs: TickTime) -> TickTime {
        assert_eq!(
            self.tick_rate, rhs.tick_rate,
            "tick rate mismatch in TickTime subtraction"
        );
        self.add_secs(-rhs.time)
    }
}
