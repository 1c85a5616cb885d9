use crate::energy::joules_to_kcal;
use crate::types::{RoutePoint, WorkoutSummary};
use chrono::Duration;
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,stridelog={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

pub fn format_duration(d: Duration) -> String {
    let secs = d.num_seconds().unsigned_abs();
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// One tab-separated `list` row: id, type and duration, plus start, distance,
/// steps and energy when `details` is set.
pub fn summary_line(s: &WorkoutSummary, details: bool) -> String {
    let id = s.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let dur_str = if s.completed {
        format_duration(s.time_difference())
    } else {
        "in progress".to_string()
    };

    if !details {
        return format!("{id}\t{}\t{dur_str}", s.workout_type);
    }

    let start_s = s.start.to_rfc3339();
    let km = s.distance_m / 1000.0;
    let kcal = s
        .energy_joules
        .map_or_else(|| "-".to_string(), |j| format!("{:.0}", joules_to_kcal(j)));
    format!(
        "{id}\t{start_s}\t{}\t{dur_str}\t{km:.2} km\t{} steps\t{kcal} kcal",
        s.workout_type, s.steps
    )
}

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points.
pub fn haversine_m(a: &RoutePoint, b: &RoutePoint) -> f64 {
    let (lat0, lat1) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat0.cos() * lat1.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Sum of haversine distances between consecutive points.
pub fn route_distance_m(points: &[RoutePoint]) -> f64 {
    points.windows(2).map(|w| haversine_m(&w[0], &w[1])).sum()
}
