//! The workout aggregate.
//!
//! A record is either in progress or completed. Completed is terminal: the
//! tracking mutations (samples, pauses, distance, steps, laps, finish) are
//! refused with [`WorkoutError::AlreadyCompleted`], while corrective edits
//! (title, type, energy) stay available.

use crate::energy::{self, kcal_to_joules};
use crate::error::WorkoutError;
use crate::taxonomy::WorkoutType;
use crate::types::{Lap, RoutePoint, WorkoutSummary, active_span};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutRecord {
    pub(crate) id: Option<i64>,
    pub(crate) title: Option<String>,
    pub(crate) workout_type: WorkoutType,
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: Option<DateTime<Utc>>,
    pub(crate) completed: bool,
    pub(crate) pause_ms: u64,
    pub(crate) distance_m: f64,
    pub(crate) steps: u64,
    pub(crate) energy_joules: Option<f64>,
    pub(crate) route: Vec<RoutePoint>,
    pub(crate) laps: Vec<Lap>,
}

impl WorkoutRecord {
    pub const fn start(workout_type: WorkoutType, start: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: None,
            workout_type,
            start,
            end: None,
            completed: false,
            pause_ms: 0,
            distance_m: 0.0,
            steps: 0,
            energy_joules: None,
            route: Vec::new(),
            laps: Vec::new(),
        }
    }

    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub const fn workout_type(&self) -> WorkoutType {
        self.workout_type
    }

    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    pub const fn pause_ms(&self) -> u64 {
        self.pause_ms
    }

    pub const fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub const fn steps(&self) -> u64 {
        self.steps
    }

    pub const fn energy_joules(&self) -> Option<f64> {
        self.energy_joules
    }

    pub fn energy_kcal(&self) -> Option<f64> {
        self.energy_joules.map(energy::joules_to_kcal)
    }

    pub fn route(&self) -> &[RoutePoint] {
        &self.route
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    fn ensure_in_progress(&self) -> Result<(), WorkoutError> {
        if self.completed {
            Err(WorkoutError::AlreadyCompleted)
        } else {
            Ok(())
        }
    }

    /// Appends a sample. Timestamps may repeat but never go backwards.
    pub fn append_route_sample(&mut self, point: RoutePoint) -> Result<(), WorkoutError> {
        self.ensure_in_progress()?;
        point.validate()?;
        if let Some(last) = self.route.last()
            && point.t < last.t
        {
            return Err(WorkoutError::OutOfOrderSample {
                last: last.t,
                got: point.t,
            });
        }
        self.route.push(point);
        Ok(())
    }

    pub fn record_pause(&mut self, duration_ms: u64) -> Result<(), WorkoutError> {
        self.ensure_in_progress()?;
        self.pause_ms = self.pause_ms.saturating_add(duration_ms);
        Ok(())
    }

    pub fn add_distance(&mut self, meters: f64) -> Result<(), WorkoutError> {
        self.ensure_in_progress()?;
        if !meters.is_finite() || meters < 0.0 {
            return Err(WorkoutError::InvalidInput(format!(
                "distance increment must be non-negative, got {meters} m"
            )));
        }
        self.distance_m += meters;
        Ok(())
    }

    pub fn add_steps(&mut self, count: u64) -> Result<(), WorkoutError> {
        self.ensure_in_progress()?;
        self.steps = self.steps.saturating_add(count);
        Ok(())
    }

    /// Closes the current lap at `at`, covering everything since the previous lap (or the start).
    pub fn close_lap(&mut self, at: DateTime<Utc>) -> Result<&Lap, WorkoutError> {
        self.ensure_in_progress()?;
        let lap_start = self.laps.last().map_or(self.start, |l| l.end);
        if at < lap_start {
            return Err(WorkoutError::InvalidTimeRange {
                start: lap_start,
                end: at,
            });
        }
        let covered: f64 = self.laps.iter().map(|l| l.distance_m).sum();
        self.laps.push(Lap {
            start: lap_start,
            end: at,
            distance_m: (self.distance_m - covered).max(0.0),
        });
        Ok(&self.laps[self.laps.len() - 1])
    }

    /// Distance covered since the last closed lap.
    pub fn current_lap_distance_m(&self) -> f64 {
        let covered: f64 = self.laps.iter().map(|l| l.distance_m).sum();
        (self.distance_m - covered).max(0.0)
    }

    pub fn finish(&mut self, end: DateTime<Utc>) -> Result<(), WorkoutError> {
        self.ensure_in_progress()?;
        if end < self.start {
            return Err(WorkoutError::InvalidTimeRange {
                start: self.start,
                end,
            });
        }
        self.end = Some(end);
        self.completed = true;
        Ok(())
    }

    pub fn elapsed_active_duration(&self) -> Duration {
        self.elapsed_active_duration_at(Utc::now())
    }

    /// Active time, measured up to `now` while the workout is still running.
    pub fn elapsed_active_duration_at(&self, now: DateTime<Utc>) -> Duration {
        active_span(self.start, self.end.unwrap_or(now), self.pause_ms)
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title.filter(|t| !t.trim().is_empty());
    }

    pub fn set_workout_type(&mut self, workout_type: WorkoutType) {
        self.workout_type = workout_type;
    }

    pub fn set_energy_burned_kcal(&mut self, kcal: f64) -> Result<(), WorkoutError> {
        if !kcal.is_finite() || kcal < 0.0 {
            return Err(WorkoutError::InvalidInput(format!(
                "energy must be non-negative, got {kcal} kcal"
            )));
        }
        self.energy_joules = Some(kcal_to_joules(kcal));
        Ok(())
    }

    /// Estimates energy from the type's MET over the active duration and stores it.
    /// Returns the estimate in kcal.
    pub fn estimate_energy(
        &mut self,
        body_mass_kg: f64,
        now: DateTime<Utc>,
    ) -> Result<f64, WorkoutError> {
        let kcal = energy::estimate_for(
            self.workout_type,
            body_mass_kg,
            self.elapsed_active_duration_at(now),
        )?;
        self.set_energy_burned_kcal(kcal)?;
        Ok(kcal)
    }

    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary {
            id: self.id,
            title: self.title.clone(),
            workout_type: self.workout_type,
            start: self.start,
            end: self.end,
            completed: self.completed,
            distance_m: self.distance_m,
            steps: self.steps,
            energy_joules: self.energy_joules,
            pause_ms: self.pause_ms,
        }
    }
}
