//! Live workout tracking.
//!
//! A [`LiveSession`] is the only writer of the in-progress workout. It turns
//! location fixes, step counter readings and pause/resume signals into
//! aggregate mutations and persists the record through the store.

use crate::database::WorkoutStore;
use crate::dlog;
use crate::record::WorkoutRecord;
use crate::taxonomy::WorkoutType;
use crate::types::RoutePoint;
use crate::utils::haversine_m;
use anyhow::Result;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingOptions {
    /// Close a lap every time this distance is covered. `None` disables automatic laps.
    pub auto_lap_distance_m: Option<f64>,
    /// Used for the energy estimate when the workout finishes.
    pub body_mass_kg: Option<f64>,
    /// Persist after this many accepted location fixes. 0 is treated as 1.
    pub persist_every: u32,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            auto_lap_distance_m: Some(1000.0),
            body_mass_kg: None,
            persist_every: 1,
        }
    }
}

pub struct LiveSession<'s> {
    store: &'s mut WorkoutStore,
    options: TrackingOptions,
    record: WorkoutRecord,
    paused_since: Option<DateTime<Utc>>,
    step_base: Option<u64>,
    unsaved_fixes: u32,
}

impl<'s> LiveSession<'s> {
    /// Starts a new workout. Fails if one is already in progress in the store.
    pub fn begin(
        store: &'s mut WorkoutStore,
        workout_type: WorkoutType,
        start: DateTime<Utc>,
        options: TrackingOptions,
    ) -> Result<Self> {
        let record = store.start_workout(workout_type, start)?;
        Ok(Self::attach(store, record, options))
    }

    /// Reattaches to the workout left in progress, e.g. after a restart.
    pub fn recover(store: &'s mut WorkoutStore, options: TrackingOptions) -> Result<Option<Self>> {
        let Some(record) = store.active()? else {
            return Ok(None);
        };
        tracing::info!(id = ?record.id(), points = record.route().len(), "recovered live workout");
        Ok(Some(Self::attach(store, record, options)))
    }

    fn attach(
        store: &'s mut WorkoutStore,
        record: WorkoutRecord,
        options: TrackingOptions,
    ) -> Self {
        Self {
            store,
            options,
            record,
            paused_since: None,
            step_base: None,
            unsaved_fixes: 0,
        }
    }

    pub const fn record(&self) -> &WorkoutRecord {
        &self.record
    }

    pub const fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    pub fn on_location(&mut self, point: RoutePoint) -> Result<()> {
        if self.is_paused() {
            dlog!("fix_dropped_while_paused t={}", point.t);
            return Ok(());
        }
        point.validate()?;

        let delta = self
            .record
            .route()
            .last()
            .map_or(0.0, |last| haversine_m(last, &point));
        let at = point.t;

        self.record.append_route_sample(point)?;
        self.record.add_distance(delta)?;

        if let Some(lap_m) = self.options.auto_lap_distance_m
            && lap_m > 0.0
            && self.record.current_lap_distance_m() >= lap_m
        {
            let distance_m = self.record.close_lap(at)?.distance_m;
            tracing::info!(lap = self.record.laps().len(), distance_m, "lap");
        }

        self.unsaved_fixes += 1;
        if self.unsaved_fixes >= self.options.persist_every.max(1) {
            self.persist()?;
        }
        Ok(())
    }

    /// Takes a cumulative step counter reading.
    ///
    /// Counters restart from zero on reboot; a reading lower than the previous
    /// one is taken as a new baseline.
    pub fn on_steps(&mut self, cumulative: u64) -> Result<()> {
        let base = self.step_base.replace(cumulative);
        if self.is_paused() {
            return Ok(());
        }
        let delta = match base {
            Some(prev) if cumulative >= prev => cumulative - prev,
            Some(prev) => {
                dlog!("step_counter_reset prev={prev} now={cumulative}");
                cumulative
            }
            None => 0,
        };
        if delta > 0 {
            self.record.add_steps(delta)?;
        }
        Ok(())
    }

    pub fn pause(&mut self, at: DateTime<Utc>) {
        if self.paused_since.is_none() {
            self.paused_since = Some(at);
            dlog!("paused at={at}");
        }
    }

    pub fn resume(&mut self, at: DateTime<Utc>) -> Result<()> {
        let Some(since) = self.paused_since.take() else {
            return Ok(());
        };
        let paused = u64::try_from((at - since).num_milliseconds()).unwrap_or(0);
        self.record.record_pause(paused)?;
        dlog!("resumed at={at} paused_ms={paused}");
        self.persist()
    }

    /// Completes the workout and returns the stored record.
    pub fn finish(mut self, end: DateTime<Utc>) -> Result<WorkoutRecord> {
        if self.is_paused() {
            self.resume(end)?;
        }
        self.record.finish(end)?;

        if let Some(mass) = self.options.body_mass_kg {
            self.record.estimate_energy(mass, end)?;
        }

        self.store.save(&mut self.record)?;
        tracing::info!(
            id = ?self.record.id(),
            distance_m = self.record.distance_m(),
            steps = self.record.steps(),
            kcal = ?self.record.energy_kcal(),
            "workout finished"
        );
        Ok(self.record)
    }

    pub fn persist(&mut self) -> Result<()> {
        self.store.save(&mut self.record)?;
        self.unsaved_fixes = 0;
        Ok(())
    }
}
