use crate::taxonomy::{Category, WorkoutType};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "workouts.sqlite";

#[derive(Parser, Debug)]
#[command(
    name = "stridelog",
    about = "Record, import and summarize workouts with MET-based energy estimates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,

    /// Path to the SQLite workout database (created if missing).
    #[arg(long, global = true, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Body mass used for energy estimates.
    #[arg(long, global = true, value_name = "KG")]
    pub weight_kg: Option<f64>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// List workout types with their categories and MET values.
    Types {
        /// Only show types in this category.
        #[arg(long)]
        category: Option<Category>,
    },

    /// Estimate the energy of a workout without storing anything.
    Estimate {
        #[arg(long = "type", value_name = "TYPE")]
        workout_type: WorkoutType,

        #[arg(long)]
        minutes: f64,
    },

    /// Import a GPX track as a completed workout.
    Import {
        #[arg(value_name = "GPX")]
        path: PathBuf,

        #[arg(long = "type", value_name = "TYPE", default_value = "other")]
        workout_type: WorkoutType,

        #[arg(long)]
        title: Option<String>,
    },

    /// List stored workouts, most recent first.
    List {
        /// Number of workouts to print.
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,

        /// Print id, start, type, distance and energy columns.
        #[arg(long)]
        details: bool,
    },

    /// Show one workout.
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Write the route of a workout as GPX.
    Export {
        id: i64,

        #[arg(value_name = "OUT")]
        out: PathBuf,
    },

    /// Correct the type or title of a workout.
    Edit {
        id: i64,

        #[arg(long = "type", value_name = "TYPE")]
        workout_type: Option<WorkoutType>,

        #[arg(long)]
        title: Option<String>,
    },

    /// Delete a workout and its route.
    Delete { id: i64 },
}
