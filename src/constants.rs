//! Application constants and default values for sunrelay.
//!
//! This module contains all the configuration defaults, validation limits,
//! and operational constants used throughout the application.

use crate::config::{Backend, RestState};

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_ELEVATION: f64 = 0.0; // meters above sea level
pub const DEFAULT_RELAY_PIN: u32 = 4; // BCM numbering
pub const DEFAULT_REST_STATE: RestState = RestState::High; // Active-low relay boards
pub const DEFAULT_BACKEND: Backend = Backend::Gpio;
pub const DEFAULT_RETRY_INTERVAL: u64 = 3600; // seconds - re-poll after NoEventInWindow

// Placeholder location written into freshly generated config files
pub const DEFAULT_LATITUDE: f64 = 42.7371;
pub const DEFAULT_LONGITUDE: f64 = -90.4775;
pub const DEFAULT_CONFIG_ELEVATION: f64 = 302.0;

// ═══ Validation Limits ═══
// These limits ensure user inputs are within reasonable and safe ranges

pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

// Dead Sea shore to well above any inhabited place
pub const MINIMUM_ELEVATION: f64 = -500.0;
pub const MAXIMUM_ELEVATION: f64 = 9000.0;

// sysfs GPIO numbers on common boards stay well below this
pub const MAXIMUM_RELAY_PIN: u32 = 1023;

pub const MINIMUM_RETRY_INTERVAL: u64 = 60; // seconds (prevents busy polling)
pub const MAXIMUM_RETRY_INTERVAL: u64 = 86400; // seconds (one day)

// ═══ Solar Search Constants ═══

/// Number of days after the reference date searched for the next event.
/// The day before the reference date is always searched as well.
pub const SEARCH_WINDOW_DAYS: i64 = 2;

/// Maximum distance of a sunrise or sunset from the approximate solar noon
/// of its day. Anything further away means the event does not occur.
pub const MAX_EVENT_OFFSET_FROM_NOON_MINUTES: i64 = 13 * 60;

// ═══ Operational Timing Constants ═══
// Internal timing values for application operation

/// Longest single sleep inside a wait; bounds how late a wall-clock jump is noticed.
pub const MAX_WAIT_CHUNK_SECS: u64 = 60;

// ═══ GPIO Constants ═══

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";
pub const SYSFS_EXPORT_SETTLE_MS: u64 = 100; // udev needs a moment to fix permissions

// ═══ Exit Codes ═══
// Standard exit codes for process termination

pub const EXIT_FAILURE: i32 = 1; // General failure
