//! Wall-clock access and cancellable waiting.
//!
//! Waits target an absolute UTC instant rather than a duration. The remaining
//! time is recomputed from the wall clock after every chunk, so a system clock
//! that jumps (NTP sync on a board without an RTC, suspend/resume) is noticed
//! within [`MAX_WAIT_CHUNK_SECS`] instead of after the full original sleep.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::constants::MAX_WAIT_CHUNK_SECS;
use crate::signals::{Shutdown, SignalMessage};

/// Why a wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The deadline has passed.
    Elapsed,
    /// Shutdown was requested; the caller should stop.
    Cancelled,
    /// A resync was requested before the deadline.
    Interrupted,
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Block until `deadline`, or earlier if `shutdown` fires.
    ///
    /// A deadline at or before `now()` returns [`WaitOutcome::Elapsed`] at once.
    fn wait_until(&self, deadline: DateTime<Utc>, shutdown: &Shutdown) -> WaitOutcome;
}

/// The real system clock.
///
/// Waits block on the signal channel in chunks of at most `max_chunk` and read
/// the wall time from `time_source` between chunks.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    time_source: fn() -> DateTime<Utc>,
    max_chunk: Duration,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            time_source: Utc::now,
            max_chunk: Duration::from_secs(MAX_WAIT_CHUNK_SECS),
        }
    }

    /// Read wall time from `time_source` instead of the system clock.
    pub fn with_time_source(mut self, time_source: fn() -> DateTime<Utc>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Bound a single sleep to `max_chunk`. Zero is raised to one millisecond.
    pub fn with_max_chunk(mut self, max_chunk: Duration) -> Self {
        self.max_chunk = max_chunk.max(Duration::from_millis(1));
        self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        (self.time_source)()
    }

    fn wait_until(&self, deadline: DateTime<Utc>, shutdown: &Shutdown) -> WaitOutcome {
        loop {
            if !shutdown.is_running() {
                return WaitOutcome::Cancelled;
            }

            let Some(remaining) = remaining_until(deadline, self.now()) else {
                return WaitOutcome::Elapsed;
            };

            let chunk = remaining.min(self.max_chunk);
            match shutdown.recv_timeout(chunk) {
                Some(SignalMessage::Shutdown) => return WaitOutcome::Cancelled,
                Some(SignalMessage::Resync) => return WaitOutcome::Interrupted,
                None => {}
            }
        }
    }
}

/// Time left until `deadline`, or `None` once it has been reached.
pub fn remaining_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    (deadline - now).to_std().ok().filter(|d| !d.is_zero())
}
