//! Workout recording core: the workout taxonomy with MET values, energy
//! estimation, the workout record aggregate, and the local store, live
//! tracker and GPX plumbing around it.

pub mod cli;
pub mod database;
pub mod energy;
pub mod error;
pub mod gpx;
pub mod import;
pub mod record;
pub mod taxonomy;
pub mod tracker;
pub mod types;
pub mod utils;

pub use database::WorkoutStore;
pub use error::WorkoutError;
pub use record::WorkoutRecord;
pub use taxonomy::{Category, WorkoutType};
pub use tracker::{LiveSession, TrackingOptions};
pub use types::{Lap, RoutePoint, WorkoutSummary};
