#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use stridelog::cli::{self, Cmd};
use stridelog::database::WorkoutStore;
use stridelog::taxonomy::{Category, WorkoutType};
use stridelog::{energy, gpx, import, utils};

#[macro_use]
extern crate stridelog;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    match cli.cmd {
        Cmd::Types { category } => {
            print_types(category);
            Ok(())
        }
        Cmd::Estimate {
            workout_type,
            minutes,
        } => {
            let mass = cli
                .weight_kg
                .context("--weight-kg is required to estimate energy")?;
            let kcal = energy::estimate_energy_burned(workout_type.met(), mass, minutes / 60.0)?;
            println!(
                "{workout_type}\t{kcal:.1} kcal\t{:.0} J",
                energy::kcal_to_joules(kcal)
            );
            Ok(())
        }
        Cmd::Import {
            path,
            workout_type,
            title,
        } => {
            dlog!(
                "mode=import gpx={} type={workout_type} db={}",
                path.display(),
                cli.db.display()
            );
            let mut store = WorkoutStore::open(&cli.db)?;
            let mut record = import::workout_from_gpx(&path, workout_type, cli.weight_kg)?;
            record.set_title(title);
            let id = store.save(&mut record)?;
            tracing::info!(
                id,
                distance_m = record.distance_m(),
                points = record.route().len(),
                "imported workout"
            );
            println!("{id}");
            Ok(())
        }
        Cmd::List { count, details } => {
            let store = WorkoutStore::open(&cli.db)?;
            let summaries = store.list_summaries()?;
            if summaries.is_empty() {
                tracing::info!(db = %cli.db.display(), "no workouts stored");
            }

            for s in summaries.iter().take(count) {
                println!("{}", utils::summary_line(s, details));
            }
            Ok(())
        }
        Cmd::Show { id, json } => {
            let store = WorkoutStore::open(&cli.db)?;
            let Some(record) = store.get(id)? else {
                bail!("No workout with id {id}");
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
                return Ok(());
            }

            println!("id:        {id}");
            if let Some(title) = record.title() {
                println!("title:     {title}");
            }
            println!("type:      {}", record.workout_type());
            println!("start:     {}", record.start_time().to_rfc3339());
            if let Some(end) = record.end_time() {
                println!("end:       {}", end.to_rfc3339());
            }
            println!(
                "active:    {}",
                utils::format_duration(record.elapsed_active_duration())
            );
            println!("distance:  {:.2} km", record.distance_m() / 1000.0);
            println!("steps:     {}", record.steps());
            if let Some(kcal) = record.energy_kcal() {
                println!("energy:    {kcal:.0} kcal");
            }
            println!("points:    {}", record.route().len());
            for (i, lap) in record.laps().iter().enumerate() {
                println!(
                    "lap {:>3}:   {}\t{:.2} km",
                    i + 1,
                    utils::format_duration(lap.duration()),
                    lap.distance_m / 1000.0
                );
            }
            Ok(())
        }
        Cmd::Export { id, out } => {
            let store = WorkoutStore::open(&cli.db)?;
            let Some(record) = store.get(id)? else {
                bail!("No workout with id {id}");
            };
            let file = File::create(&out)
                .with_context(|| format!("creating file: {}", out.display()))?;
            gpx::write_gpx(&record, BufWriter::new(file))?;
            tracing::info!(id, out = %out.display(), points = record.route().len(), "exported gpx");
            Ok(())
        }
        Cmd::Edit {
            id,
            workout_type,
            title,
        } => {
            let mut store = WorkoutStore::open(&cli.db)?;
            let Some(mut record) = store.get(id)? else {
                bail!("No workout with id {id}");
            };

            if let Some(t) = workout_type {
                record.set_workout_type(t);
            }
            if title.is_some() {
                record.set_title(title);
            }
            if let Some(mass) = cli.weight_kg {
                let until = record.end_time().unwrap_or_else(Utc::now);
                let kcal = record.estimate_energy(mass, until)?;
                dlog!("re-estimated id={id} kcal={kcal:.1}");
            }

            store.save(&mut record)?;
            tracing::info!(id, workout_type = %record.workout_type(), "workout updated");
            Ok(())
        }
        Cmd::Delete { id } => {
            let mut store = WorkoutStore::open(&cli.db)?;
            if !store.delete(id)? {
                bail!("No workout with id {id}");
            }
            Ok(())
        }
    }
}

fn print_types(category: Option<Category>) {
    let types: Vec<WorkoutType> = match category {
        Some(c) => WorkoutType::in_category(c).collect(),
        None => WorkoutType::ALL.to_vec(),
    };

    for t in types {
        let cats = t
            .categories()
            .iter()
            .map(|c| c.slug())
            .collect::<Vec<_>>()
            .join(",");
        println!("{t}\t{:.1}\t{cats}", t.met());
    }
}
