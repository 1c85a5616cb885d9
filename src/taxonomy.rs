use crate::error::WorkoutError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Grouping used for filtering workout kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Aerobic,
    Weight,
    Water,
    Ball,
    Stretching,
    Winter,
    General,
    Hill,
    Gym,
    Sports,
    Other,
}

impl Category {
    pub const ALL: [Self; 11] = [
        Self::Aerobic,
        Self::Weight,
        Self::Water,
        Self::Ball,
        Self::Stretching,
        Self::Winter,
        Self::General,
        Self::Hill,
        Self::Gym,
        Self::Sports,
        Self::Other,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Aerobic => "aerobic",
            Self::Weight => "weight",
            Self::Water => "water",
            Self::Ball => "ball",
            Self::Stretching => "stretching",
            Self::Winter => "winter",
            Self::General => "general",
            Self::Hill => "hill",
            Self::Gym => "gym",
            Self::Sports => "sports",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = WorkoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| WorkoutError::InvalidInput(format!("unknown category: {s:?}")))
    }
}

/// Declares `WorkoutType` together with its slug, categories and MET table,
/// so a variant cannot exist without an entry.
macro_rules! workout_types {
    ($($variant:ident => $slug:literal, [$($cat:ident),+], $met:literal;)+) => {
        /// Closed catalogue of workout kinds.
        ///
        /// Serialized under its slug, so JSON, the database and the CLI share one name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum WorkoutType {
            #[default]
            $(#[serde(rename = $slug)] $variant,)+
        }

        impl WorkoutType {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            pub const fn slug(self) -> &'static str {
                match self {
                    $(Self::$variant => $slug,)+
                }
            }

            /// Categories this workout belongs to. Never empty.
            pub const fn categories(self) -> &'static [Category] {
                match self {
                    $(Self::$variant => &[$(Category::$cat),+],)+
                }
            }

            /// Metabolic equivalent of the activity, 1.0 being rest.
            pub const fn met(self) -> f64 {
                match self {
                    $(Self::$variant => $met,)+
                }
            }
        }
    };
}

// `Other` comes first so it is the derived default.
workout_types! {
    Other => "other", [Other], 1.0;
    Badminton => "badminton", [Ball, Sports], 5.5;
    Baseball => "baseball", [Ball, Sports], 5.0;
    Basketball => "basketball", [Ball, Sports], 6.5;
    Biking => "biking", [Aerobic, General], 7.5;
    BikingStationary => "biking_stationary", [Aerobic, Gym], 7.0;
    BootCamp => "boot_camp", [Aerobic, Gym], 8.0;
    Boxing => "boxing", [Sports, Aerobic], 7.8;
    Calisthenics => "calisthenics", [Weight, General], 3.8;
    Cricket => "cricket", [Ball, Sports], 4.8;
    Dancing => "dancing", [Aerobic, General], 5.0;
    Elliptical => "elliptical", [Aerobic, Gym], 5.0;
    ExerciseClass => "exercise_class", [Aerobic, Gym], 5.0;
    Fencing => "fencing", [Sports], 6.0;
    FootballAmerican => "football_american", [Ball, Sports], 8.0;
    FootballAustralian => "football_australian", [Ball, Sports], 8.0;
    Frisbee => "frisbee", [Ball, General], 3.0;
    Golf => "golf", [Ball, Sports], 4.8;
    GuidedBreathing => "guided_breathing", [Stretching], 1.3;
    Gymnastics => "gymnastics", [Sports, Stretching], 3.8;
    Handball => "handball", [Ball, Sports], 12.0;
    HighIntensityIntervalTraining => "hiit", [Aerobic, Gym], 8.0;
    Hiking => "hiking", [Hill, General], 6.0;
    IceHockey => "ice_hockey", [Winter, Sports], 8.0;
    IceSkating => "ice_skating", [Winter], 7.0;
    MartialArts => "martial_arts", [Sports], 10.3;
    Paddling => "paddling", [Water], 4.0;
    Paragliding => "paragliding", [Other], 3.5;
    Pilates => "pilates", [Stretching, Gym], 3.0;
    Racquetball => "racquetball", [Ball, Sports], 7.0;
    RockClimbing => "rock_climbing", [Hill, Sports], 8.0;
    RollerHockey => "roller_hockey", [Sports], 7.0;
    Rowing => "rowing", [Water, Aerobic], 7.0;
    RowingMachine => "rowing_machine", [Aerobic, Gym], 6.0;
    Rugby => "rugby", [Ball, Sports], 8.3;
    Running => "running", [Aerobic, General], 11.0;
    RunningTreadmill => "running_treadmill", [Aerobic, Gym], 9.0;
    Sailing => "sailing", [Water], 3.0;
    ScubaDiving => "scuba_diving", [Water], 7.0;
    Skating => "skating", [General], 7.0;
    Skiing => "skiing", [Winter, Hill], 7.0;
    Snowboarding => "snowboarding", [Winter, Hill], 5.3;
    Snowshoeing => "snowshoeing", [Winter, Hill], 5.3;
    Soccer => "soccer", [Ball, Sports], 7.0;
    Softball => "softball", [Ball, Sports], 5.0;
    Squash => "squash", [Ball, Sports], 7.3;
    StairClimbing => "stair_climbing", [Hill, Aerobic], 8.8;
    StairClimbingMachine => "stair_climbing_machine", [Aerobic, Gym], 9.0;
    StrengthTraining => "strength_training", [Weight, Gym], 5.0;
    Stretching => "stretching", [Stretching], 2.3;
    Surfing => "surfing", [Water], 3.0;
    SwimmingOpenWater => "swimming_open_water", [Water, Aerobic], 6.0;
    SwimmingPool => "swimming_pool", [Water, Aerobic], 5.8;
    TableTennis => "table_tennis", [Ball, Sports], 4.0;
    Tennis => "tennis", [Ball, Sports], 7.3;
    Volleyball => "volleyball", [Ball, Sports], 4.0;
    Walking => "walking", [Aerobic, General], 3.5;
    WaterPolo => "water_polo", [Water, Ball], 10.0;
    Weightlifting => "weightlifting", [Weight, Gym], 6.0;
    Wheelchair => "wheelchair", [General], 3.0;
    Yoga => "yoga", [Stretching], 2.5;
}

static BY_SLUG: Lazy<HashMap<&'static str, WorkoutType>> =
    Lazy::new(|| WorkoutType::ALL.iter().map(|t| (t.slug(), *t)).collect());

impl WorkoutType {
    /// Resolves a slug, falling back to `Other` when it is not known.
    pub fn from_slug_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn in_category(category: Category) -> impl Iterator<Item = Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |t| t.categories().contains(&category))
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for WorkoutType {
    type Err = WorkoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        BY_SLUG
            .get(key.as_str())
            .copied()
            .ok_or_else(|| WorkoutError::InvalidInput(format!("unknown workout type: {s:?}")))
    }
}

pub const fn categories_of(t: WorkoutType) -> &'static [Category] {
    t.categories()
}

pub const fn met_coefficient_of(t: WorkoutType) -> f64 {
    t.met()
}
