//! Workout catalog with per-minute calorie burn rates.
//!
//! Rates are kcal per minute for a 70 kg reference person. Labels are
//! matched lower-cased, and Russian labels are accepted as aliases of the
//! English keys.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Rate used for any label the catalog does not know
pub const DEFAULT_RATE_PER_MINUTE: f64 = 6.0;

/// A catalogued workout type
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorkoutKind {
    Run,
    Walk,
    Bike,
    Swim,
    Yoga,
    Strength,
    Cardio,
    Dance,
    Other(String),
}

/// Label lookup built once and reused
static LABELS: Lazy<HashMap<&'static str, WorkoutKind>> = Lazy::new(|| {
    let pairs = [
        (["run", "бег"], WorkoutKind::Run),
        (["walk", "ходьба"], WorkoutKind::Walk),
        (["bike", "велосипед"], WorkoutKind::Bike),
        (["swim", "плавание"], WorkoutKind::Swim),
        (["yoga", "йога"], WorkoutKind::Yoga),
        (["strength", "силовая"], WorkoutKind::Strength),
        (["cardio", "кардио"], WorkoutKind::Cardio),
        (["dance", "танцы"], WorkoutKind::Dance),
    ];

    let mut labels = HashMap::new();
    for (names, kind) in pairs {
        for name in names {
            labels.insert(name, kind.clone());
        }
    }
    labels
});

impl WorkoutKind {
    /// Resolve a free-form label; unknown labels become `Other`
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match LABELS.get(normalized.as_str()) {
            Some(kind) => kind.clone(),
            None => WorkoutKind::Other(normalized),
        }
    }

    /// Every catalogued kind, in display order
    pub fn all_known() -> [WorkoutKind; 8] {
        [
            WorkoutKind::Run,
            WorkoutKind::Walk,
            WorkoutKind::Bike,
            WorkoutKind::Swim,
            WorkoutKind::Yoga,
            WorkoutKind::Strength,
            WorkoutKind::Cardio,
            WorkoutKind::Dance,
        ]
    }

    /// Canonical lower-case key
    pub fn key(&self) -> &str {
        match self {
            WorkoutKind::Run => "run",
            WorkoutKind::Walk => "walk",
            WorkoutKind::Bike => "bike",
            WorkoutKind::Swim => "swim",
            WorkoutKind::Yoga => "yoga",
            WorkoutKind::Strength => "strength",
            WorkoutKind::Cardio => "cardio",
            WorkoutKind::Dance => "dance",
            WorkoutKind::Other(label) => label,
        }
    }

    /// kcal per minute at the 70 kg reference weight
    pub fn rate_per_minute(&self) -> f64 {
        match self {
            WorkoutKind::Run => 12.0,
            WorkoutKind::Walk => 5.0,
            WorkoutKind::Bike => 8.0,
            WorkoutKind::Swim => 10.0,
            WorkoutKind::Yoga => 4.0,
            WorkoutKind::Strength => 8.0,
            WorkoutKind::Cardio => 10.0,
            WorkoutKind::Dance => 7.0,
            WorkoutKind::Other(_) => DEFAULT_RATE_PER_MINUTE,
        }
    }
}
