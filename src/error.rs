use chrono::{DateTime, Utc};
use thiserror::Error;

/// Validation failures of the workout core.
///
/// None of these are transient: the caller has to fix the input before trying again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkoutError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("route sample at {got} precedes the last stored sample at {last}")]
    OutOfOrderSample {
        last: DateTime<Utc>,
        got: DateTime<Utc>,
    },

    #[error("end time {end} precedes start time {start}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("workout is already completed")]
    AlreadyCompleted,

    #[error("workout {active_id} is still in progress")]
    DuplicateActiveWorkout { active_id: i64 },
}
