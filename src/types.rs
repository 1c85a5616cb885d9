use crate::error::WorkoutError;
use crate::taxonomy::WorkoutType;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Timestamped position along a workout route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub t: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
}

impl RoutePoint {
    pub const fn new(t: DateTime<Utc>, lat: f64, lon: f64) -> Self {
        Self {
            t,
            lat,
            lon,
            ele: None,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180], both finite.
    pub fn has_valid_coordinates(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn validate(&self) -> Result<(), WorkoutError> {
        if self.has_valid_coordinates() {
            Ok(())
        } else {
            Err(WorkoutError::InvalidInput(format!(
                "coordinates out of range: lat={} lon={}",
                self.lat, self.lon
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub distance_m: f64,
}

impl Lap {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// List-display projection of a workout record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub workout_type: WorkoutType,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub completed: bool,
    pub distance_m: f64,
    pub steps: u64,
    pub energy_joules: Option<f64>,
    pub pause_ms: u64,
}

impl WorkoutSummary {
    /// End minus start minus paused time, never negative. Zero while the workout has no end.
    pub fn time_difference(&self) -> Duration {
        self.end.map_or_else(Duration::zero, |end| {
            active_span(self.start, end, self.pause_ms)
        })
    }
}

pub(crate) fn active_span(start: DateTime<Utc>, end: DateTime<Utc>, pause_ms: u64) -> Duration {
    let Some(pause) = i64::try_from(pause_ms)
        .ok()
        .and_then(Duration::try_milliseconds)
    else {
        return Duration::zero();
    };
    (end - start)
        .checked_sub(&pause)
        .unwrap_or_else(Duration::zero)
        .max(Duration::zero())
}
