//! Solar position calculations for the next sunrise and sunset.
//!
//! Event instants come from the `sunrise` crate, which uses the standard -0.833°
//! horizon (atmospheric refraction plus the solar semidiameter) and lowers it
//! further for the observer's elevation. Each calendar day is computed on its
//! own and the earliest event after the reference instant wins.
//!
//! Near the poles the hour-angle equation has no solution on some days. The
//! crate does not report that explicitly, so two guards decide whether an event
//! happens at all: a low-precision declination check that the sun actually
//! crosses the (elevation-adjusted) horizon that day, and a sanity band around
//! the day's solar noon that catches degenerate results. When nothing is left
//! inside the search window the query fails with [`SolarError::NoEventInWindow`].

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use super::{Location, SolarError, SunEvent, SunEventKind, SunEvents};
use crate::constants::*;

/// Anything that can answer "when do the sun next rise and set from here?".
///
/// Implementations must be pure: the same location and instant always yield
/// the same answer, and both returned events are strictly after `now`.
pub trait SunEventSource {
    fn next_events(
        &self,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<SunEvents, SolarError>;
}

/// Sunrise/sunset calculator backed by the `sunrise` crate.
#[derive(Debug, Clone, Copy)]
pub struct SolarCalculator {
    window_days: i64,
}

impl Default for SolarCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl SolarCalculator {
    pub fn new() -> Self {
        Self {
            window_days: SEARCH_WINDOW_DAYS,
        }
    }

    /// Use a custom search horizon (days after the reference date).
    pub fn with_window_days(window_days: i64) -> Self {
        Self {
            window_days: window_days.max(0),
        }
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Compute one event for one calendar day.
    ///
    /// # Returns
    /// * `Ok(Some(instant))` - The event happens on that day
    /// * `Ok(None)` - The sun stays above or below the horizon all day
    /// * `Err(_)` - The coordinates were rejected
    pub fn event_on(
        &self,
        location: &Location,
        date: NaiveDate,
        kind: SunEventKind,
    ) -> Result<Option<DateTime<Utc>>, SolarError> {
        let coord = Coordinates::new(location.latitude(), location.longitude()).ok_or(
            SolarError::InvalidCoordinates {
                latitude: location.latitude(),
                longitude: location.longitude(),
            },
        )?;

        if day_arc(location, date) != DayArc::Crosses {
            return Ok(None);
        }

        let event = match kind {
            SunEventKind::Sunrise => SolarEvent::Sunrise,
            SunEventKind::Sunset => SolarEvent::Sunset,
        };

        // The dip correction is a square root of the altitude; below sea level
        // the horizon is treated as flat.
        let at = SolarDay::new(coord, date)
            .with_altitude(location.elevation().max(0.0))
            .event_time(event);

        Ok(is_plausible_for_day(location, date, at).then_some(at))
    }

    /// Sunrise and sunset of a single calendar day, each optional.
    pub fn events_on(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), SolarError> {
        Ok((
            self.event_on(location, date, SunEventKind::Sunrise)?,
            self.event_on(location, date, SunEventKind::Sunset)?,
        ))
    }

    /// Earliest event of `kind` strictly after `now`.
    pub fn next_event(
        &self,
        location: &Location,
        now: DateTime<Utc>,
        kind: SunEventKind,
    ) -> Result<SunEvent, SolarError> {
        let reference_date = now.date_naive();
        let mut next: Option<DateTime<Utc>> = None;

        // Yesterday is included: at far western longitudes yesterday's sunset
        // falls after midnight UTC.
        for offset in -1..=self.window_days {
            let date = reference_date + Duration::days(offset);
            if let Some(at) = self.event_on(location, date, kind)? {
                if at > now && next.is_none_or(|best| at < best) {
                    next = Some(at);
                }
            }
        }

        next.map(|at| SunEvent { kind, at })
            .ok_or(SolarError::NoEventInWindow {
                kind,
                window_days: self.window_days,
            })
    }
}

impl SunEventSource for SolarCalculator {
    fn next_events(
        &self,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<SunEvents, SolarError> {
        let sunrise = self.next_event(location, now, SunEventKind::Sunrise);
        let sunset = self.next_event(location, now, SunEventKind::Sunset);

        match (sunrise, sunset) {
            (Ok(sunrise), Ok(sunset)) => Ok(SunEvents { sunrise, sunset }),
            // Neither event in the window: name the one that ends the current
            // polar phase, which depends on where the sun is today
            (
                Err(SolarError::NoEventInWindow { window_days, .. }),
                Err(SolarError::NoEventInWindow { .. }),
            ) => {
                let kind = match day_arc(location, now.date_naive()) {
                    DayArc::AlwaysAbove => SunEventKind::Sunset,
                    DayArc::AlwaysBelow | DayArc::Crosses => SunEventKind::Sunrise,
                };
                Err(SolarError::NoEventInWindow { kind, window_days })
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }
}

/// Approximate solar noon of `date` at the location's longitude, in UTC.
fn approximate_solar_noon(location: &Location, date: NaiveDate) -> DateTime<Utc> {
    let utc_noon = date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(12);
    // 4 minutes of time per degree of longitude
    utc_noon - Duration::seconds((location.longitude() * 240.0).round() as i64)
}

/// Horizon altitude in degrees: refraction plus semidiameter, lowered by the
/// dip of the horizon seen from `elevation` meters.
fn horizon_altitude(elevation: f64) -> f64 {
    -0.833 - 2.076 * elevation.max(0.0).sqrt() / 60.0
}

/// Low-precision solar declination in degrees for a UTC instant.
fn solar_declination(at: DateTime<Utc>) -> f64 {
    // Days since J2000.0
    let n = (at.timestamp() as f64 / 86400.0) + 2440587.5 - 2451545.0;

    let mean_longitude = (280.460 + 0.9856474 * n) % 360.0;
    let mean_anomaly = ((357.528 + 0.9856003 * n) % 360.0).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.0000004 * n).to_radians();

    (obliquity.sin() * ecliptic_longitude.sin()).asin().to_degrees()
}

/// Path of the sun's center relative to the horizon over one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayArc {
    /// Rises and sets.
    Crosses,
    /// Polar day.
    AlwaysAbove,
    /// Polar night.
    AlwaysBelow,
}

fn day_arc(location: &Location, date: NaiveDate) -> DayArc {
    let latitude = location.latitude().to_radians();
    let declination = solar_declination(approximate_solar_noon(location, date)).to_radians();
    let horizon = horizon_altitude(location.elevation()).to_radians().sin();

    let denominator = latitude.cos() * declination.cos();
    if denominator.abs() < f64::EPSILON {
        // Exactly at a pole the sun circles at constant altitude all day
        return if latitude.sin() * declination.sin() > horizon {
            DayArc::AlwaysAbove
        } else {
            DayArc::AlwaysBelow
        };
    }

    let cos_hour_angle = (horizon - latitude.sin() * declination.sin()) / denominator;
    if cos_hour_angle < -1.0 {
        DayArc::AlwaysAbove
    } else if cos_hour_angle > 1.0 {
        DayArc::AlwaysBelow
    } else {
        DayArc::Crosses
    }
}

/// Sunrise and sunset are always within half a day of solar noon (plus the
/// equation of time). Results outside that band come from a failed hour-angle
/// computation.
fn is_plausible_for_day(location: &Location, date: NaiveDate, at: DateTime<Utc>) -> bool {
    let offset = at.signed_duration_since(approximate_solar_noon(location, date));
    offset.num_minutes().abs() <= MAX_EVENT_OFFSET_FROM_NOON_MINUTES
}
