//! Shared test doubles for the scheduler integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration as TimeDelta, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use sunrelay::clock::{Clock, WaitOutcome};
use sunrelay::geo::{Location, SolarError, SunEventKind, SunEventSource, SunEvents};
use sunrelay::relay::{Relay, RelayState};
use sunrelay::signals::Shutdown;

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn test_location() -> Location {
    Location::new(42.7371, -90.4775, 302.0).unwrap()
}

/// Next instant strictly after `now` with the given UTC hour.
fn next_at_hour(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let candidate = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc();
    if candidate > now {
        candidate
    } else {
        candidate + TimeDelta::days(1)
    }
}

/// Sun rises at 06:00 UTC and sets at 18:00 UTC every day.
pub struct FixedDaySource;

impl SunEventSource for FixedDaySource {
    fn next_events(
        &self,
        _location: &Location,
        now: DateTime<Utc>,
    ) -> Result<SunEvents, SolarError> {
        Ok(SunEvents::new(next_at_hour(now, 6), next_at_hour(now, 18)))
    }
}

/// Behaves like [`FixedDaySource`] for the first `normal_calls` queries, then
/// reports polar day forever.
pub struct PolarAfter {
    pub normal_calls: usize,
    pub calls: Cell<usize>,
}

impl PolarAfter {
    pub fn new(normal_calls: usize) -> Self {
        Self {
            normal_calls,
            calls: Cell::new(0),
        }
    }
}

impl SunEventSource for PolarAfter {
    fn next_events(
        &self,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<SunEvents, SolarError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call < self.normal_calls {
            FixedDaySource.next_events(location, now)
        } else {
            Err(SolarError::NoEventInWindow {
                kind: SunEventKind::Sunset,
                window_days: 2,
            })
        }
    }
}

struct ManualClockInner {
    now: Cell<DateTime<Utc>>,
    deadlines: RefCell<Vec<DateTime<Utc>>>,
    script: RefCell<VecDeque<WaitOutcome>>,
    overshoot: Cell<TimeDelta>,
}

/// Simulated clock. Each wait consumes one scripted outcome; once the script
/// runs out the wait reports cancellation, which ends `Scheduler::run`.
///
/// `Elapsed` jumps time to the deadline plus the configured overshoot,
/// `Interrupted` advances time by one minute.
#[derive(Clone)]
pub struct ManualClock {
    inner: Rc<ManualClockInner>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>, script: Vec<WaitOutcome>) -> Self {
        Self {
            inner: Rc::new(ManualClockInner {
                now: Cell::new(start),
                deadlines: RefCell::new(Vec::new()),
                script: RefCell::new(script.into()),
                overshoot: Cell::new(TimeDelta::zero()),
            }),
        }
    }

    /// Elapsed waits wake `overshoot` after their deadline (negative wakes early).
    pub fn with_overshoot(self, overshoot: TimeDelta) -> Self {
        self.inner.overshoot.set(overshoot);
        self
    }

    pub fn deadlines(&self) -> Vec<DateTime<Utc>> {
        self.inner.deadlines.borrow().clone()
    }

    pub fn current(&self) -> DateTime<Utc> {
        self.inner.now.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.now.get()
    }

    fn wait_until(&self, deadline: DateTime<Utc>, shutdown: &Shutdown) -> WaitOutcome {
        self.inner.deadlines.borrow_mut().push(deadline);

        if !shutdown.is_running() {
            return WaitOutcome::Cancelled;
        }

        let outcome = self
            .inner
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or(WaitOutcome::Cancelled);

        match outcome {
            WaitOutcome::Elapsed => {
                let now = self.inner.now.get();
                self.inner
                    .now
                    .set(now.max(deadline) + self.inner.overshoot.get());
            }
            WaitOutcome::Interrupted => {
                let now = self.inner.now.get();
                self.inner.now.set(now + TimeDelta::minutes(1));
            }
            WaitOutcome::Cancelled => {}
        }
        outcome
    }
}

/// Relay that records every command.
#[derive(Clone, Default)]
pub struct RecordingRelay {
    commands: Rc<RefCell<Vec<RelayState>>>,
}

impl RecordingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<RelayState> {
        self.commands.borrow().clone()
    }
}

impl Relay for RecordingRelay {
    fn turn_on(&mut self) -> anyhow::Result<()> {
        self.commands.borrow_mut().push(RelayState::On);
        Ok(())
    }

    fn turn_off(&mut self) -> anyhow::Result<()> {
        self.commands.borrow_mut().push(RelayState::Off);
        Ok(())
    }

    fn toggle(&mut self) -> anyhow::Result<()> {
        let next = match self.commands.borrow().last() {
            Some(RelayState::On) => RelayState::Off,
            _ => RelayState::On,
        };
        self.commands.borrow_mut().push(next);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
