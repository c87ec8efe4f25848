//! Configuration system for sunrelay with validation and geo coordinate overrides.
//!
//! This module handles the TOML configuration file, validation, default value
//! generation, and conversion into the values the scheduler consumes.
//!
//! ## Configuration Sources
//!
//! 1. An explicit path given with `--config` (must exist)
//! 2. **XDG_CONFIG_HOME**/sunrelay/sunrelay.toml (created with defaults when missing)
//! 3. An optional `geo.toml` next to the main file overriding the coordinates
//!
//! ## Configuration Structure
//!
//! ```toml
//! # Observer location
//! latitude = 42.7371        # Degrees, positive north
//! longitude = -90.4775      # Degrees, positive east
//! elevation = 302.0         # Meters above sea level
//!
//! # Relay output
//! backend = "gpio"          # "gpio" or "virtual"
//! relay_pin = 4             # sysfs GPIO number
//! rest_state = "high"       # Pin level while the relay is off: "high" or "low"
//!
//! # Polar day/night handling
//! retry_interval = 3600     # Seconds between retries when the sun never rises/sets
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::geo::Location;
use crate::logger::Log;

/// Geographic configuration structure for storing coordinates separately.
///
/// This represents the optional geo.toml file that keeps the location out of
/// the main configuration, so the main file can be shared or versioned.
#[derive(Debug, Deserialize, Clone)]
struct GeoConfig {
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<f64>,
}

/// Relay output implementation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Linux sysfs GPIO line driving a relay board.
    Gpio,
    /// In-memory pin that only logs level changes. Useful for dry runs.
    Virtual,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Gpio => "gpio",
            Backend::Virtual => "virtual",
        }
    }
}

/// Pin level while the relay is off.
///
/// Most hobbyist relay boards are active-low: the relay is released while the
/// input is held high, hence `High` as the default.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RestState {
    High,
    Low,
}

impl RestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestState::High => "high",
            RestState::Low => "low",
        }
    }
}

/// Configuration structure for sunrelay settings.
///
/// Loaded from `sunrelay.toml`. Everything except the coordinates is optional
/// and falls back to the defaults in [`crate::constants`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>, // meters
    pub relay_pin: Option<u32>,
    pub rest_state: Option<RestState>,
    pub backend: Option<Backend>,
    pub retry_interval: Option<u64>, // seconds
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("sunrelay").join("sunrelay.toml"))
    }

    /// Path of the geo.toml file belonging to a config file.
    pub fn geo_path_for(config_path: &Path) -> Option<PathBuf> {
        config_path.parent().map(|parent| parent.join("geo.toml"))
    }

    /// Write a commented default configuration to `path`.
    ///
    /// Parent directories are created as needed. The placeholder coordinates
    /// must be edited before the schedule means anything.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_content = ConfigBuilder::new()
            .add_section("Observer location")
            .add_setting(
                "latitude",
                &format!("{:.6}", DEFAULT_LATITUDE),
                "Degrees, positive north (-90 to 90)",
            )
            .add_setting(
                "longitude",
                &format!("{:.6}", DEFAULT_LONGITUDE),
                "Degrees, positive east (-180 to 180)",
            )
            .add_setting(
                "elevation",
                &format!("{:.1}", DEFAULT_CONFIG_ELEVATION),
                &format!(
                    "Meters above sea level ({} to {})",
                    MINIMUM_ELEVATION, MAXIMUM_ELEVATION
                ),
            )
            .add_section("Relay output")
            .add_setting(
                "backend",
                &format!("\"{}\"", DEFAULT_BACKEND.as_str()),
                "Output to use: \"gpio\" or \"virtual\"",
            )
            .add_setting(
                "relay_pin",
                &DEFAULT_RELAY_PIN.to_string(),
                &format!("sysfs GPIO number (0-{})", MAXIMUM_RELAY_PIN),
            )
            .add_setting(
                "rest_state",
                &format!("\"{}\"", DEFAULT_REST_STATE.as_str()),
                "Pin level while the relay is off: \"high\" or \"low\"",
            )
            .add_section("Polar day and night")
            .add_setting(
                "retry_interval",
                &DEFAULT_RETRY_INTERVAL.to_string(),
                &format!(
                    "Seconds to wait when no sunrise/sunset is found ({}-{})",
                    MINIMUM_RETRY_INTERVAL, MAXIMUM_RETRY_INTERVAL
                ),
            )
            .build();

        fs::write(path, config_content + "\n").context("Failed to write default config file")?;
        Ok(())
    }

    fn apply_defaults(config: &mut Config) {
        if config.elevation.is_none() {
            config.elevation = Some(DEFAULT_ELEVATION);
        }
        if config.relay_pin.is_none() {
            config.relay_pin = Some(DEFAULT_RELAY_PIN);
        }
        if config.rest_state.is_none() {
            config.rest_state = Some(DEFAULT_REST_STATE);
        }
        if config.backend.is_none() {
            config.backend = Some(DEFAULT_BACKEND);
        }
        if config.retry_interval.is_none() {
            config.retry_interval = Some(DEFAULT_RETRY_INTERVAL);
        }
    }

    /// Load a configuration file from a specific path.
    ///
    /// Unlike [`Config::load`] this never creates a default file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Self::load_geo_override_from_path(&mut config, path);
        Self::apply_defaults(&mut config);

        validate_config(&config)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Apply coordinates from geo.toml if present.
    ///
    /// A missing file is fine. An unreadable or malformed one is reported and
    /// ignored so the main config still loads.
    fn load_geo_override_from_path(config: &mut Config, config_path: &Path) {
        let Some(geo_path) = Self::geo_path_for(config_path) else {
            return;
        };

        if !geo_path.exists() {
            return;
        }

        match fs::read_to_string(&geo_path) {
            Ok(content) => match toml::from_str::<GeoConfig>(&content) {
                Ok(geo_config) => {
                    if let Some(lat) = geo_config.latitude {
                        config.latitude = Some(lat);
                    }
                    if let Some(lon) = geo_config.longitude {
                        config.longitude = Some(lon);
                    }
                    if let Some(elevation) = geo_config.elevation {
                        config.elevation = Some(elevation);
                    }

                    Log::log_indented(&format!(
                        "Loaded geographic overrides from {}",
                        crate::utils::path_for_display(&geo_path)
                    ));
                }
                Err(e) => {
                    Log::log_warning(&format!(
                        "Failed to parse geo.toml: {}. Using coordinates from main config.",
                        e
                    ));
                }
            },
            Err(e) => {
                Log::log_warning(&format!(
                    "Failed to read geo.toml: {}. Using coordinates from main config.",
                    e
                ));
            }
        }
    }

    /// Load the configuration from the default location, creating it first
    /// if it does not exist yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
            Log::log_block_start(&format!(
                "Created default configuration at {}",
                crate::utils::path_for_display(&config_path)
            ));
            Log::log_indented("Edit latitude, longitude and relay_pin for your installation");
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Load from an explicit path when given, otherwise from the default location.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// The validated observer location.
    pub fn location(&self) -> Result<Location> {
        let latitude = self
            .latitude
            .context("latitude is not configured")?;
        let longitude = self
            .longitude
            .context("longitude is not configured")?;
        Location::new(
            latitude,
            longitude,
            self.elevation.unwrap_or(DEFAULT_ELEVATION),
        )
        .context("Invalid observer location")
    }

    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or(DEFAULT_BACKEND)
    }

    pub fn relay_pin(&self) -> u32 {
        self.relay_pin.unwrap_or(DEFAULT_RELAY_PIN)
    }

    pub fn rest_state(&self) -> RestState {
        self.rest_state.unwrap_or(DEFAULT_REST_STATE)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval.unwrap_or(DEFAULT_RETRY_INTERVAL))
    }

    pub fn log_config(&self, source: Option<&Path>) {
        let config_path = match source {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_path()
                .unwrap_or_else(|_| PathBuf::from("~/.config/sunrelay/sunrelay.toml")),
        };

        Log::log_block_start(&format!(
            "Loaded configuration from {}",
            crate::utils::path_for_display(&config_path)
        ));

        match self.location() {
            Ok(location) => Log::log_indented(&format!("Location: {}", location)),
            Err(_) => Log::log_indented("Location: not configured"),
        }
        Log::log_indented(&format!("Backend: {}", self.backend().as_str()));
        Log::log_indented(&format!("Relay pin: {}", self.relay_pin()));
        Log::log_indented(&format!("Rest state: {}", self.rest_state().as_str()));
        Log::log_indented(&format!(
            "Retry interval: {} seconds",
            self.retry_interval().as_secs()
        ));
    }
}

/// Range validation for every configured value.
pub fn validate_config(config: &Config) -> Result<()> {
    let latitude = config
        .latitude
        .context("latitude is required (degrees, -90 to 90)")?;
    let longitude = config
        .longitude
        .context("longitude is required (degrees, -180 to 180)")?;

    if !(MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&latitude) {
        anyhow::bail!(
            "Latitude must be between {} and {} degrees, got {}",
            MINIMUM_LATITUDE,
            MAXIMUM_LATITUDE,
            latitude
        );
    }

    if !(MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&longitude) {
        anyhow::bail!(
            "Longitude must be between {} and {} degrees, got {}",
            MINIMUM_LONGITUDE,
            MAXIMUM_LONGITUDE,
            longitude
        );
    }

    if let Some(elevation) = config.elevation {
        if !(MINIMUM_ELEVATION..=MAXIMUM_ELEVATION).contains(&elevation) {
            anyhow::bail!(
                "Elevation must be between {} and {} meters, got {}",
                MINIMUM_ELEVATION,
                MAXIMUM_ELEVATION,
                elevation
            );
        }
    }

    if let Some(pin) = config.relay_pin {
        if pin > MAXIMUM_RELAY_PIN {
            anyhow::bail!(
                "Relay pin must be between 0 and {}, got {}",
                MAXIMUM_RELAY_PIN,
                pin
            );
        }
    }

    if let Some(interval) = config.retry_interval {
        if !(MINIMUM_RETRY_INTERVAL..=MAXIMUM_RETRY_INTERVAL).contains(&interval) {
            anyhow::bail!(
                "Retry interval must be between {} and {} seconds, got {}",
                MINIMUM_RETRY_INTERVAL,
                MAXIMUM_RETRY_INTERVAL,
                interval
            );
        }
    }

    if latitude.abs() > 66.0 {
        Log::log_warning(&format!(
            "Latitude {:.2}° is inside a polar circle; expect days without sunrise or sunset",
            latitude
        ));
    }

    Ok(())
}

/// Builds the commented default configuration with aligned comments.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

struct ConfigEntry {
    content: String,
    entry_type: EntryType,
}

enum EntryType {
    Section,
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry {
            content: format!("#[{}]", title),
            entry_type: EntryType::Section,
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        let line = format!("{} = {}", key, value);
        self.entries.push(ConfigEntry {
            content: line.clone(),
            entry_type: EntryType::Setting {
                line,
                comment: format!("# {}", comment),
            },
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.entry_type {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry.entry_type {
                EntryType::Section => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(entry.content);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.join("\n")
    }
}
