use crate::dlog;
use crate::error::WorkoutError;
use crate::record::WorkoutRecord;
use crate::taxonomy::WorkoutType;
use crate::types::{Lap, RoutePoint, WorkoutSummary};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use std::path::Path;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS workouts (
      id             INTEGER PRIMARY KEY,
      title          TEXT,
      workout_type   TEXT NOT NULL,
      start_ms       INTEGER NOT NULL,
      end_ms         INTEGER,
      completed      INTEGER NOT NULL DEFAULT 0,
      pause_ms       INTEGER NOT NULL DEFAULT 0,
      distance_m     REAL NOT NULL DEFAULT 0,
      steps          INTEGER NOT NULL DEFAULT 0,
      energy_joules  REAL,
      laps_json      TEXT NOT NULL DEFAULT '[]'
    );

    CREATE INDEX IF NOT EXISTS workouts_start_idx ON workouts (start_ms DESC);

    -- at most one workout in progress
    CREATE UNIQUE INDEX IF NOT EXISTS workouts_single_active_idx
      ON workouts (completed) WHERE completed = 0;

    CREATE TABLE IF NOT EXISTS workout_points (
      workout_id  INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
      idx         INTEGER NOT NULL,
      t_ms        INTEGER NOT NULL,
      lat         REAL NOT NULL,
      lon         REAL NOT NULL,
      ele         REAL,
      PRIMARY KEY (workout_id, idx)
    );
";

const SUMMARY_COLUMNS: &str = "id, title, workout_type, start_ms, end_ms, completed, \
     pause_ms, distance_m, steps, energy_joules";

/// Local workout storage.
///
/// Owns its connection; callers that share a store across threads have to
/// serialize access themselves.
pub struct WorkoutStore {
    conn: Connection,
}

impl WorkoutStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening SQLite DB: {}", path.display()))?;
        tracing::info!(path = %path.display(), "opened workout store");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().context("Opening in-memory SQLite DB")?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .context("Enabling foreign keys")?;
        conn.execute_batch(SCHEMA)
            .context("Ensuring SQLite schema")?;
        Ok(Self { conn })
    }

    /// Creates and persists a new in-progress workout.
    ///
    /// Fails with [`WorkoutError::DuplicateActiveWorkout`] while another workout is running.
    pub fn start_workout(
        &mut self,
        workout_type: WorkoutType,
        start: DateTime<Utc>,
    ) -> Result<WorkoutRecord> {
        let mut record = WorkoutRecord::start(workout_type, start);
        self.save(&mut record)?;
        tracing::info!(id = ?record.id(), %workout_type, "workout started");
        Ok(record)
    }

    /// Inserts or updates `record` with its route, assigning an id on first save.
    pub fn save(&mut self, record: &mut WorkoutRecord) -> Result<i64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Starting transaction for workout")?;

        if !record.is_completed()
            && let Some(active_id) = active_id(&tx)?
            && Some(active_id) != record.id()
        {
            return Err(WorkoutError::DuplicateActiveWorkout { active_id }.into());
        }

        let title = record.title();
        let slug = record.workout_type().slug();
        let start_ms = record.start_time().timestamp_millis();
        let end_ms = record.end_time().map(|t| t.timestamp_millis());
        let completed = record.is_completed();
        let pause_ms = to_i64(record.pause_ms());
        let distance_m = record.distance_m();
        let steps = to_i64(record.steps());
        let energy_joules = record.energy_joules();
        let laps_json = serde_json::to_string(record.laps()).context("Encoding laps")?;

        let id = match record.id() {
            None => {
                tx.execute(
                    r"
                    INSERT INTO workouts (
                      title, workout_type, start_ms, end_ms, completed,
                      pause_ms, distance_m, steps, energy_joules, laps_json
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    ",
                    params![
                        title,
                        slug,
                        start_ms,
                        end_ms,
                        completed,
                        pause_ms,
                        distance_m,
                        steps,
                        energy_joules,
                        laps_json
                    ],
                )
                .context("Inserting workout")?;
                tx.last_insert_rowid()
            }
            Some(id) => {
                let stored_completed: Option<bool> = tx
                    .query_row(
                        "SELECT completed FROM workouts WHERE id = ?1",
                        params![id],
                        |r| r.get(0),
                    )
                    .optional()
                    .context("Reading stored workout state")?;
                if stored_completed == Some(true) && !completed {
                    dlog!("save_refused_stale id={id}");
                    return Err(WorkoutError::AlreadyCompleted.into());
                }
                let changed = tx
                    .execute(
                        r"
                        UPDATE workouts SET
                          title = ?1, workout_type = ?2, start_ms = ?3, end_ms = ?4,
                          completed = ?5, pause_ms = ?6, distance_m = ?7, steps = ?8,
                          energy_joules = ?9, laps_json = ?10
                        WHERE id = ?11
                        ",
                        params![
                            title,
                            slug,
                            start_ms,
                            end_ms,
                            completed,
                            pause_ms,
                            distance_m,
                            steps,
                            energy_joules,
                            laps_json,
                            id
                        ],
                    )
                    .context("Updating workout")?;
                if changed == 0 {
                    bail!("workout {id} does not exist");
                }
                id
            }
        };

        sync_points(&tx, id, record.route())?;
        tx.commit().context("Committing workout transaction")?;

        record.id = Some(id);
        dlog!(
            "saved workout id={id} points={} completed={}",
            record.route().len(),
            record.is_completed()
        );
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Option<WorkoutRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SUMMARY_COLUMNS}, laps_json FROM workouts WHERE id = ?1"),
                [id],
                |row| Ok((WorkoutRow::from_row(row)?, row.get::<_, String>(10)?)),
            )
            .optional()
            .with_context(|| format!("Loading workout {id}"))?;

        let Some((row, laps_json)) = row else {
            return Ok(None);
        };

        let summary = row.into_summary()?;
        let laps: Vec<Lap> = serde_json::from_str(&laps_json)
            .with_context(|| format!("Decoding laps of workout {id}"))?;
        let route = self.load_points(id)?;

        Ok(Some(WorkoutRecord {
            id: summary.id,
            title: summary.title,
            workout_type: summary.workout_type,
            start: summary.start,
            end: summary.end,
            completed: summary.completed,
            pause_ms: summary.pause_ms,
            distance_m: summary.distance_m,
            steps: summary.steps,
            energy_joules: summary.energy_joules,
            route,
            laps,
        }))
    }

    /// The workout currently in progress, if any.
    pub fn active(&self) -> Result<Option<WorkoutRecord>> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM workouts WHERE completed = 0 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .context("Looking up active workout")?;

        match id {
            Some(id) => self.get(id),
            None => Ok(None),
        }
    }

    /// All workouts, most recent start first.
    pub fn list_summaries(&self) -> Result<Vec<WorkoutSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM workouts ORDER BY start_ms DESC, id DESC"
        ))?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(WorkoutRow::from_row(row)?.into_summary()?);
        }
        Ok(out)
    }

    /// Removes a workout and its route. Returns whether it existed.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM workouts WHERE id = ?1", [id])
            .with_context(|| format!("Deleting workout {id}"))?;
        if n > 0 {
            tracing::info!(id, "workout deleted");
        }
        Ok(n > 0)
    }

    fn load_points(&self, id: i64) -> Result<Vec<RoutePoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT t_ms, lat, lon, ele FROM workout_points WHERE workout_id = ?1 ORDER BY idx",
        )?;
        let mut rows = stmt.query([id])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(RoutePoint {
                t: ms_to_utc(row.get(0)?)?,
                lat: row.get(1)?,
                lon: row.get(2)?,
                ele: row.get(3)?,
            });
        }
        Ok(out)
    }
}

fn active_id(tx: &Transaction<'_>) -> Result<Option<i64>> {
    tx.query_row(
        "SELECT id FROM workouts WHERE completed = 0 LIMIT 1",
        [],
        |row| row.get(0),
    )
    .optional()
    .context("Checking for an active workout")
}

/// Routes are append-only, so only points past the stored count need writing.
fn sync_points(tx: &Transaction<'_>, workout_id: i64, route: &[RoutePoint]) -> Result<()> {
    let stored: i64 = tx
        .query_row(
            "SELECT COUNT(*) FROM workout_points WHERE workout_id = ?1",
            [workout_id],
            |row| row.get(0),
        )
        .context("Counting stored points")?;
    let stored = usize::try_from(stored).unwrap_or(0);

    if stored > route.len() {
        tx.execute(
            "DELETE FROM workout_points WHERE workout_id = ?1 AND idx >= ?2",
            params![workout_id, to_i64(route.len() as u64)],
        )
        .context("Trimming stored points")?;
    }

    let mut stmt = tx
        .prepare_cached(
            "INSERT INTO workout_points (workout_id, idx, t_ms, lat, lon, ele) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .context("Preparing point insert")?;

    for (idx, p) in route.iter().enumerate().skip(stored) {
        stmt.execute(params![
            workout_id,
            to_i64(idx as u64),
            p.t.timestamp_millis(),
            p.lat,
            p.lon,
            p.ele
        ])
        .context("Inserting point")?;
    }

    Ok(())
}

struct WorkoutRow {
    id: i64,
    title: Option<String>,
    workout_type: String,
    start_ms: i64,
    end_ms: Option<i64>,
    completed: bool,
    pause_ms: i64,
    distance_m: f64,
    steps: i64,
    energy_joules: Option<f64>,
}

impl WorkoutRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            workout_type: row.get(2)?,
            start_ms: row.get(3)?,
            end_ms: row.get(4)?,
            completed: row.get(5)?,
            pause_ms: row.get(6)?,
            distance_m: row.get(7)?,
            steps: row.get(8)?,
            energy_joules: row.get(9)?,
        })
    }

    fn into_summary(self) -> Result<WorkoutSummary> {
        let workout_type = WorkoutType::from_slug_lossy(&self.workout_type);
        if workout_type == WorkoutType::Other && self.workout_type != WorkoutType::Other.slug() {
            tracing::warn!(
                id = self.id,
                stored = %self.workout_type,
                "unknown workout type, treating as other"
            );
        }

        Ok(WorkoutSummary {
            id: Some(self.id),
            title: self.title,
            workout_type,
            start: ms_to_utc(self.start_ms)?,
            end: self.end_ms.map(ms_to_utc).transpose()?,
            completed: self.completed,
            distance_m: self.distance_m,
            steps: u64::try_from(self.steps).unwrap_or(0),
            energy_joules: self.energy_joules,
            pause_ms: u64::try_from(self.pause_ms).unwrap_or(0),
        })
    }
}

fn ms_to_utc(ms: i64) -> Result<DateTime<Utc>> {
    let Some(t) = Utc.timestamp_millis_opt(ms).single() else {
        bail!("timestamp out of range: {ms} ms");
    };
    Ok(t)
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
