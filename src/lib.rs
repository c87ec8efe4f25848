//! # Sunrelay
//!
//! Switches a relay at sunrise and sunset.
//!
//! Sunrelay computes the next sunrise and sunset for a fixed location, turns the
//! relay on for the day and off for the night, and sleeps until the next
//! transition. It re-derives the phase from the sun on every iteration, so
//! restarts and clock jumps self-correct.
//!
//! ## Architecture
//!
//! - **args**: Command-line parsing
//! - **clock**: Wall clock and cancellable absolute-deadline waits
//! - **commands**: One-shot commands such as `--next`
//! - **config**: Configuration loading, validation, and default generation
//! - **constants**: Application-wide constants and defaults
//! - **geo**: Observer location and sunrise/sunset computation
//! - **logger**: Structured logging with visual formatting
//! - **relay**: Relay trait plus GPIO and virtual outputs
//! - **scheduler**: The day/night scheduling loop
//! - **signals**: Shutdown and resync signal handling
//! - **utils**: Formatting helpers

pub mod args;
pub mod clock;
pub mod commands;
pub mod config;
pub mod constants;
pub mod geo;
pub mod logger;
pub mod relay;
pub mod scheduler;
pub mod signals;
pub mod utils;

// Re-export important types for easier access
pub use clock::{Clock, SystemClock, WaitOutcome};
pub use config::Config;
pub use geo::{DayPhase, Location, SolarCalculator, SolarError, SunEventSource, SunEvents};
pub use logger::{Log, LogLevel};
pub use relay::{Relay, RelayState};
pub use scheduler::Scheduler;
pub use signals::{Shutdown, ShutdownHandle};
