//! Tick boundary scheduler.
//!
//! Detects integer tick-boundary crossings on the local track and fires one
//! notification per crossed boundary, in order. A long frame that crosses
//! several boundaries fires several notifications; a sub-tick frame (or a
//! clock that paused or moved backward) fires none.

use contracts::{ClockError, TickEvent, TickTime};

/// Handle returned by `subscribe`, used to remove the callback again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type TickCallback = Box<dyn FnMut(&TickEvent)>;

/// Fires ordered tick notifications from a continuously-advancing clock.
///
/// Subscribers are invoked synchronously in registration order, exactly once
/// per crossed boundary.
pub struct TickScheduler {
    tick_rate: u32,
    /// Tick of the last fired notification; advances by exactly 1 per event
    previous_tick: i64,
    subscribers: Vec<(SubscriptionId, TickCallback)>,
    next_id: u64,
}

impl std::fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("tick_rate", &self.tick_rate)
            .field("previous_tick", &self.previous_tick)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl TickScheduler {
    /// Create a scheduler seeded at the current local tick, so no event fires
    /// for time that elapsed before creation. Both tracks must already be
    /// quantized at the scheduler's tick rate.
    pub fn new(
        tick_rate: u32,
        local_time: TickTime,
        reference_time: TickTime,
    ) -> Result<Self, ClockError> {
        if tick_rate == 0 {
            return Err(ClockError::InvalidTickRate { tick_rate });
        }
        for track in [local_time, reference_time] {
            if track.tick_rate() != tick_rate {
                return Err(ClockError::TickRateMismatch {
                    left: tick_rate,
                    right: track.tick_rate(),
                });
            }
        }
        Ok(Self {
            tick_rate,
            previous_tick: local_time.tick(),
            subscribers: Vec::new(),
            next_id: 0,
        })
    }

    /// Register a callback invoked once per crossed tick boundary, after all
    /// previously registered callbacks.
    pub fn subscribe(&mut self, callback: impl FnMut(&TickEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a previously registered callback. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Feed the latest tracks from the synchronizer; fires zero or more
    /// ordered notifications.
    ///
    /// The event times are quantized to the crossed boundary, not the frame's
    /// fractional time: the local time sits exactly on the tick, and the
    /// reference time is shifted back by the same in-frame fraction so the
    /// pair stays consistent.
    pub fn update(&mut self, local_time: TickTime, reference_time: TickTime) {
        let new_tick = local_time.tick();
        let offset = local_time.time() - reference_time.time();

        while new_tick > self.previous_tick {
            self.previous_tick += 1;

            let local_at_tick = TickTime::from_ticks(self.tick_rate, self.previous_tick)
                .unwrap_or(local_time.to_fixed_time());
            let reference_at_tick = local_at_tick - offset;

            let event = TickEvent {
                tick: self.previous_tick,
                local_time: local_at_tick,
                reference_time: reference_at_tick,
            };

            tracing::trace!(tick = event.tick, "tick boundary crossed");
            for (_, callback) in &mut self.subscribers {
                callback(&event);
            }
        }
    }

    /// Tick of the last fired notification.
    pub fn previous_tick(&self) -> i64 {
        self.previous_tick
    }
}
