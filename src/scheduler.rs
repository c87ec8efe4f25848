//! The solar scheduling loop.
//!
//! One structured loop replaces the usual chain of self-rescheduling timers.
//! Every iteration asks the event source "what happens next from right now",
//! derives day or night from the answer, commands the relay if the phase
//! changed, and then blocks on a cancellable absolute-deadline wait. Because
//! nothing is precomputed, a restart, a suspended process or a clock jump all
//! self-correct on the next iteration.
//!
//! Failure policy:
//! - [`SolarError::NoEventInWindow`] (polar day or night) is logged, the relay
//!   is held, and the query is retried after the retry interval.
//! - Relay errors are fatal and propagate out of [`Scheduler::run`].
//! - Shutdown is not an error: `run` returns `Ok(())`.

use anyhow::{Context, Result};
use chrono::TimeDelta;
use std::time::Duration;

use crate::clock::{Clock, WaitOutcome};
use crate::constants::DEFAULT_RETRY_INTERVAL;
use crate::geo::{DayPhase, Location, SolarError, SunEventSource, SunEvents};
use crate::logger::Log;
use crate::relay::{Relay, RelayState};
use crate::signals::Shutdown;
use crate::utils::{format_duration, format_local_time};

/// Relay state that corresponds to a day phase.
pub fn relay_state_for(phase: DayPhase) -> RelayState {
    match phase {
        DayPhase::Day => RelayState::On,
        DayPhase::Night => RelayState::Off,
    }
}

pub struct Scheduler<S, R, C>
where
    S: SunEventSource,
    R: Relay,
    C: Clock,
{
    source: S,
    relay: R,
    clock: C,
    location: Location,
    retry_interval: Duration,
    /// Last phase the relay was commanded to, `None` before the first command.
    applied: Option<DayPhase>,
}

impl<S, R, C> Scheduler<S, R, C>
where
    S: SunEventSource,
    R: Relay,
    C: Clock,
{
    pub fn new(source: S, relay: R, clock: C, location: Location) -> Self {
        Self {
            source,
            relay,
            clock,
            location,
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL),
            applied: None,
        }
    }

    /// Override the wait used after a [`SolarError::NoEventInWindow`].
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Drive the relay until shutdown is requested.
    ///
    /// # Returns
    /// - `Ok(())` once `shutdown` fires; the relay keeps its last commanded state
    /// - `Err` if the relay could not be commanded or the location is unusable
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<()> {
        Log::log_block_start(&format!(
            "Scheduling relay ({}) for {}",
            self.relay.backend_name(),
            self.location
        ));

        while shutdown.is_running() {
            match self.step(shutdown)? {
                WaitOutcome::Cancelled => break,
                WaitOutcome::Interrupted => {
                    Log::log_decorated("Wait interrupted, recomputing schedule");
                }
                WaitOutcome::Elapsed => {}
            }
        }

        Log::log_block_start("Scheduler stopped");
        if let Some(phase) = self.applied {
            Log::log_indented(&format!(
                "Relay left {} ({})",
                relay_state_for(phase),
                phase
            ));
        }
        Ok(())
    }

    /// Run a single iteration: query, command if needed, wait.
    pub fn step(&mut self, shutdown: &Shutdown) -> Result<WaitOutcome> {
        let now = self.clock.now();

        match self.source.next_events(&self.location, now) {
            Ok(events) => {
                self.apply_phase(events.phase())?;
                let next = events.next_transition();
                log_next_transition(&events);
                Log::log_debug(&format!(
                    "Sleeping {} until {}",
                    format_duration((next.at - now).to_std().unwrap_or(Duration::ZERO)),
                    next.at.to_rfc3339()
                ));
                Ok(self.clock.wait_until(next.at, shutdown))
            }
            Err(SolarError::NoEventInWindow { kind, window_days }) => {
                Log::log_warning(&format!(
                    "No {} within {} days at {}; relay {}, retrying in {}",
                    kind,
                    window_days,
                    self.location,
                    held_relay_description(self.applied),
                    format_duration(self.retry_interval)
                ));
                let retry = TimeDelta::from_std(self.retry_interval)
                    .context("retry interval out of range")?;
                Ok(self.clock.wait_until(now + retry, shutdown))
            }
            Err(e) => Err(e).context("Failed to compute sun events"),
        }
    }

    /// Command the relay for `phase` unless it already is in that phase.
    fn apply_phase(&mut self, phase: DayPhase) -> Result<()> {
        if self.applied == Some(phase) {
            return Ok(());
        }

        let state = relay_state_for(phase);
        self.relay
            .set_state(state)
            .with_context(|| format!("Failed to switch relay {}", state))?;

        Log::log_block_start(&format!(
            "{} began, relay switched {}",
            match phase {
                DayPhase::Day => "Day",
                DayPhase::Night => "Night",
            },
            state
        ));
        self.applied = Some(phase);
        Ok(())
    }

    /// Last phase commanded, if any.
    pub fn applied_phase(&self) -> Option<DayPhase> {
        self.applied
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn into_relay(self) -> R {
        self.relay
    }
}

/// How the relay is left while no sun event is available.
fn held_relay_description(applied: Option<DayPhase>) -> String {
    match applied {
        Some(phase) => format!("held {}", relay_state_for(phase)),
        None => "not yet commanded".to_string(),
    }
}

fn log_next_transition(events: &SunEvents) {
    let next = events.next_transition();
    Log::log_indented(&format!(
        "Next {} at {}",
        next.kind,
        format_local_time(next.at)
    ));
}
