use crate::dlog;
use crate::error::WorkoutError;
use crate::gpx::parse_gpx_points;
use crate::record::WorkoutRecord;
use crate::taxonomy::WorkoutType;
use crate::types::RoutePoint;
use crate::utils::haversine_m;
use anyhow::{Context, Result, bail};
use std::path::Path;

pub fn workout_from_gpx(
    path: &Path,
    workout_type: WorkoutType,
    body_mass_kg: Option<f64>,
) -> Result<WorkoutRecord> {
    let pts = parse_gpx_points(path)
        .with_context(|| format!("Parsing GPX points: {}", path.display()))?;
    if pts.is_empty() {
        bail!("GPX file has no timed track points: {}", path.display());
    }
    tracing::info!(path = %path.display(), points = pts.len(), "parsed gpx");

    workout_from_points(pts, workout_type, body_mass_kg)
}

/// Builds a completed workout from a recorded track.
///
/// Points that go back in time or sit outside valid coordinates are dropped,
/// everything else is kept in file order.
pub fn workout_from_points(
    pts: Vec<RoutePoint>,
    workout_type: WorkoutType,
    body_mass_kg: Option<f64>,
) -> Result<WorkoutRecord> {
    let Some(first) = pts.iter().find(|p| p.has_valid_coordinates()) else {
        bail!("cannot build a workout from a track without valid points");
    };

    let mut record = WorkoutRecord::start(workout_type, first.t);
    let mut prev: Option<RoutePoint> = None;
    let mut skipped = 0usize;
    let mut invalid = 0usize;

    for p in pts {
        if !p.has_valid_coordinates() {
            dlog!("gpx_bad_coordinates lat={} lon={} t={}", p.lat, p.lon, p.t);
            invalid += 1;
            continue;
        }
        match record.append_route_sample(p.clone()) {
            Ok(()) => {}
            Err(WorkoutError::OutOfOrderSample { last, got }) => {
                dlog!("gpx_out_of_order last={last} got={got}");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        if let Some(prev) = &prev {
            record.add_distance(haversine_m(prev, &p))?;
        }
        prev = Some(p);
    }

    if skipped > 0 {
        tracing::warn!(skipped, "dropped out-of-order track points");
    }
    if invalid > 0 {
        tracing::warn!(invalid, "dropped track points with invalid coordinates");
    }

    let end = prev.map_or(record.start_time(), |p| p.t);
    record.finish(end)?;

    if let Some(mass) = body_mass_kg {
        let kcal = record.estimate_energy(mass, end)?;
        dlog!("estimated kcal={kcal:.1} mass={mass}");
    }

    Ok(record)
}
