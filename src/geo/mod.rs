//! Geographic location and solar event types.
//!
//! This module holds the observer [`Location`] and the values produced by a sun
//! event query. The actual astronomy lives in [`solar`]; everything here is plain
//! data plus the day/night derivation the scheduler relies on.

pub mod solar;

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::constants::*;

pub use solar::{SolarCalculator, SunEventSource};

/// Errors produced while computing solar events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolarError {
    /// The sun does not rise (or set) within the searched horizon.
    ///
    /// This is how polar day and polar night show up. The scheduler treats it
    /// as recoverable and re-polls after its retry interval.
    #[error("no {kind} within {window_days} days of the reference instant")]
    NoEventInWindow { kind: SunEventKind, window_days: i64 },

    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("invalid elevation: {0} m")]
    InvalidElevation(f64),
}

/// Observer position used as the reference frame for every sun event query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

impl Location {
    /// Create a validated location.
    ///
    /// # Arguments
    /// * `latitude` - Degrees, positive north (-90 to +90)
    /// * `longitude` - Degrees, positive east (-180 to +180)
    /// * `elevation` - Meters above sea level
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Result<Self, SolarError> {
        if !(MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&latitude)
            || !(MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&longitude)
        {
            return Err(SolarError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        if !(MINIMUM_ELEVATION..=MAXIMUM_ELEVATION).contains(&elevation) {
            return Err(SolarError::InvalidElevation(elevation));
        }

        Ok(Self {
            latitude,
            longitude,
            elevation,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}°{}, {:.4}°{}, {:.0} m",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir,
            self.elevation
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SunEventKind {
    Sunrise,
    Sunset,
}

impl SunEventKind {
    /// The phase this event brings to an end.
    ///
    /// A missing sunrise means polar night; a missing sunset means polar day.
    pub fn ends_phase(&self) -> DayPhase {
        match self {
            SunEventKind::Sunrise => DayPhase::Night,
            SunEventKind::Sunset => DayPhase::Day,
        }
    }
}

impl fmt::Display for SunEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SunEventKind::Sunrise => write!(f, "sunrise"),
            SunEventKind::Sunset => write!(f, "sunset"),
        }
    }
}

/// A single refraction-corrected sunrise or sunset instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunEvent {
    pub kind: SunEventKind,
    pub at: DateTime<Utc>,
}

/// Day/night phase derived from the order of the next two sun events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    Day,
    Night,
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPhase::Day => write!(f, "day"),
            DayPhase::Night => write!(f, "night"),
        }
    }
}

/// The next sunrise and next sunset after some reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunEvents {
    pub sunrise: SunEvent,
    pub sunset: SunEvent,
}

impl SunEvents {
    pub fn new(sunrise: DateTime<Utc>, sunset: DateTime<Utc>) -> Self {
        Self {
            sunrise: SunEvent {
                kind: SunEventKind::Sunrise,
                at: sunrise,
            },
            sunset: SunEvent {
                kind: SunEventKind::Sunset,
                at: sunset,
            },
        }
    }

    /// If the sun rises before it next sets, it is currently below the horizon.
    pub fn phase(&self) -> DayPhase {
        if self.sunrise.at < self.sunset.at {
            DayPhase::Night
        } else {
            DayPhase::Day
        }
    }

    /// The event that ends the current phase.
    pub fn next_transition(&self) -> SunEvent {
        match self.phase() {
            DayPhase::Night => self.sunrise,
            DayPhase::Day => self.sunset,
        }
    }

    pub fn get(&self, kind: SunEventKind) -> SunEvent {
        match kind {
            SunEventKind::Sunrise => self.sunrise,
            SunEventKind::Sunset => self.sunset,
        }
    }
}
