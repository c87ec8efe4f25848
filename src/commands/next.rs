//! Implementation of the --next command.
//!
//! Prints the current phase, the relay state the scheduler would command, and
//! the upcoming sunrise and sunset for the configured location. Nothing is
//! switched, so this is safe to run next to a live scheduler.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::config::Config;
use crate::geo::{DayPhase, Location, SolarCalculator, SolarError, SunEventKind, SunEventSource};
use crate::logger::Log;
use crate::scheduler::relay_state_for;
use crate::utils::{format_duration, format_local_time};

/// Handle the --next command.
pub fn handle_next_command(config_path: Option<&Path>) -> Result<()> {
    Log::log_version();

    let config = Config::load_from(config_path)?;
    config.log_config(config_path);

    let location = config.location()?;
    let calculator = SolarCalculator::new();
    report_next_events(&calculator, &location, Utc::now())?;

    Log::log_end();
    Ok(())
}

/// Log the schedule as seen from `now` and return the current phase.
///
/// Polar day or night is reported rather than treated as a failure.
pub fn report_next_events(
    calculator: &SolarCalculator,
    location: &Location,
    now: DateTime<Utc>,
) -> Result<DayPhase> {
    Log::log_block_start(&format!("Sun events for {}", location));

    match calculator.next_events(location, now) {
        Ok(events) => {
            let phase = events.phase();
            Log::log_indented(&format!(
                "Current phase: {} (relay {})",
                phase,
                relay_state_for(phase)
            ));
            for kind in [SunEventKind::Sunrise, SunEventKind::Sunset] {
                let event = events.get(kind);
                let until = (event.at - now).to_std().unwrap_or_default();
                Log::log_indented(&format!(
                    "Next {}: {} (in {})",
                    kind,
                    format_local_time(event.at),
                    format_duration(until)
                ));
            }
            Ok(phase)
        }
        Err(SolarError::NoEventInWindow { kind, window_days }) => {
            let phase = kind.ends_phase();
            Log::log_warning(&format!(
                "No {} within {} days: polar {} at this location",
                kind, window_days, phase
            ));

            let today = calculator.events_on(location, now.date_naive())?;
            let describe = |at: Option<DateTime<Utc>>| {
                at.map(format_local_time)
                    .unwrap_or_else(|| "none".to_string())
            };
            Log::log_indented(&format!("Sunrise today: {}", describe(today.0)));
            Log::log_indented(&format!("Sunset today: {}", describe(today.1)));
            Ok(phase)
        }
        Err(e) => Err(e.into()),
    }
}
