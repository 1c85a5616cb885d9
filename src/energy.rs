use crate::error::WorkoutError;
use crate::taxonomy::WorkoutType;
use chrono::Duration;

pub const JOULES_PER_KCAL: f64 = 4184.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Energy expenditure in kcal using the MET formula: `met * mass_kg * hours`.
pub fn estimate_energy_burned(
    met: f64,
    body_mass_kg: f64,
    duration_hours: f64,
) -> Result<f64, WorkoutError> {
    if !met.is_finite() || met <= 0.0 {
        return Err(WorkoutError::InvalidInput(format!(
            "MET coefficient must be positive, got {met}"
        )));
    }
    if !body_mass_kg.is_finite() || body_mass_kg <= 0.0 {
        return Err(WorkoutError::InvalidInput(format!(
            "body mass must be positive, got {body_mass_kg} kg"
        )));
    }
    if !duration_hours.is_finite() || duration_hours < 0.0 {
        return Err(WorkoutError::InvalidInput(format!(
            "duration must be non-negative, got {duration_hours} h"
        )));
    }

    Ok(met * body_mass_kg * duration_hours)
}

/// Same as [`estimate_energy_burned`], looking the MET up in the taxonomy.
pub fn estimate_for(
    workout_type: WorkoutType,
    body_mass_kg: f64,
    duration: Duration,
) -> Result<f64, WorkoutError> {
    estimate_energy_burned(workout_type.met(), body_mass_kg, duration_hours(duration))
}

#[allow(clippy::cast_precision_loss)]
pub fn duration_hours(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

pub fn kcal_to_joules(kcal: f64) -> f64 {
    kcal * JOULES_PER_KCAL
}

pub fn joules_to_kcal(joules: f64) -> f64 {
    joules / JOULES_PER_KCAL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn running_half_hour() {
        let kcal = estimate_energy_burned(WorkoutType::Running.met(), 70.0, 0.5).unwrap();
        assert!(close(kcal, 385.0));
        assert!(close(kcal_to_joules(kcal), 1_610_840.0));

        let via_type = estimate_for(WorkoutType::Running, 70.0, Duration::minutes(30)).unwrap();
        assert!(close(via_type, 385.0));
    }

    #[test]
    fn zero_duration_is_zero() {
        for t in WorkoutType::ALL {
            for mass in [0.5, 42.0, 180.0] {
                assert_eq!(estimate_energy_burned(t.met(), mass, 0.0).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn non_decreasing_in_duration() {
        let mut prev = 0.0;
        for step in 0..200 {
            let hours = f64::from(step) * 0.05;
            let kcal = estimate_energy_burned(6.0, 80.0, hours).unwrap();
            assert!(kcal >= prev);
            prev = kcal;
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        for (met, mass, hours) in [
            (0.0, 70.0, 1.0),
            (-1.0, 70.0, 1.0),
            (5.0, 0.0, 1.0),
            (5.0, -70.0, 1.0),
            (5.0, f64::NAN, 1.0),
            (5.0, 70.0, -0.1),
            (f64::INFINITY, 70.0, 1.0),
        ] {
            assert!(
                matches!(
                    estimate_energy_burned(met, mass, hours),
                    Err(WorkoutError::InvalidInput(_))
                ),
                "met={met} mass={mass} hours={hours}"
            );
        }
    }

    #[test]
    fn kcal_joules_round_trip() {
        for kcal in [0.0, 0.001, 1.0, 385.0, 1234.567, 1e6] {
            assert!(close(joules_to_kcal(kcal_to_joules(kcal)), kcal));
        }
    }
}
