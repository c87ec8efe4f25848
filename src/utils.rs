//! Utility functions shared across the codebase.
//!
//! Mostly formatting helpers for log output: paths, local times and durations.

use chrono::{DateTime, Local, Utc};
use std::path::Path;
use std::time::Duration;

/// Render a path for logs, abbreviating the home directory to `~`.
///
/// # Examples
/// ```
/// use sunrelay::utils::path_for_display;
/// assert_eq!(path_for_display(std::path::Path::new("/etc/sunrelay.toml")), "/etc/sunrelay.toml");
/// ```
pub fn path_for_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

/// Format a UTC instant in the local timezone, e.g. `2024-06-21 05:52:13 CDT`.
pub fn format_local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

/// Format a duration as a compact human-readable string.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sunrelay::utils::format_duration;
/// assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
/// assert_eq!(format_duration(Duration::from_secs(42)), "42s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
