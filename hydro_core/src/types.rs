//! Core domain types for the hydro tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Users and their biometric profiles
//! - Ledger entries (water, food, workouts) and recorded events
//! - Per-day aggregates consumed by the progress evaluator

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Input bounds
// ============================================================================

pub const WEIGHT_KG_RANGE: RangeInclusive<f64> = 30.0..=300.0;
pub const HEIGHT_CM_RANGE: RangeInclusive<f64> = 100.0..=250.0;
pub const AGE_RANGE: RangeInclusive<u32> = 14..=100;
pub const ACTIVITY_MINUTES_RANGE: RangeInclusive<u32> = 0..=480;

pub const WATER_INTAKE_ML_RANGE: RangeInclusive<u32> = 1..=2000;
pub const FOOD_WEIGHT_G_MAX: f64 = 5000.0;
pub const WORKOUT_MINUTES_RANGE: RangeInclusive<u32> = 1..=300;

// ============================================================================
// Users and profiles
// ============================================================================

/// Opaque user identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(Error::invalid(format!(
                "gender must be 'male' or 'female', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

/// Biometric answers collected by a front end before goals are computed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_minutes: u32,
    pub city: String,
}

impl ProfileInput {
    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        check_weight(self.weight_kg)?;
        check_height(self.height_cm)?;
        check_age(self.age)?;
        check_activity(self.activity_minutes)?;
        check_city(&self.city)?;
        Ok(())
    }
}

pub fn check_weight(weight_kg: f64) -> Result<()> {
    if !WEIGHT_KG_RANGE.contains(&weight_kg) {
        return Err(Error::invalid(format!(
            "weight must be between 30 and 300 kg, got {}",
            weight_kg
        )));
    }
    Ok(())
}

pub fn check_height(height_cm: f64) -> Result<()> {
    if !HEIGHT_CM_RANGE.contains(&height_cm) {
        return Err(Error::invalid(format!(
            "height must be between 100 and 250 cm, got {}",
            height_cm
        )));
    }
    Ok(())
}

pub fn check_age(age: u32) -> Result<()> {
    if !AGE_RANGE.contains(&age) {
        return Err(Error::invalid(format!(
            "age must be between 14 and 100, got {}",
            age
        )));
    }
    Ok(())
}

pub fn check_activity(minutes: u32) -> Result<()> {
    if !ACTIVITY_MINUTES_RANGE.contains(&minutes) {
        return Err(Error::invalid(format!(
            "activity must be between 0 and 480 minutes, got {}",
            minutes
        )));
    }
    Ok(())
}

pub fn check_city(city: &str) -> Result<()> {
    if city.trim().is_empty() {
        return Err(Error::invalid("city must not be empty"));
    }
    Ok(())
}

pub fn check_food_weight(weight_g: f64) -> Result<()> {
    if !(weight_g > 0.0 && weight_g <= FOOD_WEIGHT_G_MAX) {
        return Err(Error::invalid(format!(
            "food weight must be above 0 and at most 5000 g, got {}",
            weight_g
        )));
    }
    Ok(())
}

/// A saved profile with the goals derived at save time
///
/// Goals are never recomputed after saving; re-running setup replaces the
/// whole profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_minutes: u32,
    pub city: String,
    pub ambient_temperature_c: Option<f64>,
    pub calorie_goal: f64,
    pub water_goal_ml: f64,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Ledger events
// ============================================================================

/// Payload of a single logged action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEntry {
    WaterIntake {
        amount_ml: u32,
    },
    FoodIntake {
        product_name: String,
        calories: f64,
        weight_g: f64,
    },
    Workout {
        workout_type: String,
        duration_min: u32,
        calories_burned: f64,
        water_needed_ml: u32,
    },
}

impl LedgerEntry {
    /// Short label used in logs and the CSV archive
    pub fn kind_name(&self) -> &'static str {
        match self {
            LedgerEntry::WaterIntake { .. } => "water_intake",
            LedgerEntry::FoodIntake { .. } => "food_intake",
            LedgerEntry::Workout { .. } => "workout",
        }
    }

    /// Check the payload against its allowed ranges
    pub fn validate(&self) -> Result<()> {
        match self {
            LedgerEntry::WaterIntake { amount_ml } => {
                if !WATER_INTAKE_ML_RANGE.contains(amount_ml) {
                    return Err(Error::invalid(format!(
                        "water amount must be between 1 and 2000 ml, got {}",
                        amount_ml
                    )));
                }
            }
            LedgerEntry::FoodIntake {
                calories, weight_g, ..
            } => {
                if !calories.is_finite() || *calories < 0.0 {
                    return Err(Error::invalid(format!(
                        "calories must be zero or more, got {}",
                        calories
                    )));
                }
                check_food_weight(*weight_g)?;
            }
            LedgerEntry::Workout { duration_min, .. } => {
                if !WORKOUT_MINUTES_RANGE.contains(duration_min) {
                    return Err(Error::invalid(format!(
                        "workout duration must be between 1 and 300 minutes, got {}",
                        duration_min
                    )));
                }
            }
        }
        Ok(())
    }
}

/// An immutable, recorded ledger entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub id: Uuid,
    pub user_id: UserId,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: LedgerEntry,
}

impl LedgerEvent {
    pub fn new(user_id: UserId, entry: LedgerEntry, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            recorded_at,
            entry,
        }
    }
}

/// Same-day aggregates for one user
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub water_intake_ml: i64,
    pub calories_consumed: f64,
    pub calories_burned: f64,
    pub workout_water_ml: i64,
}

impl DailyTotals {
    /// Fold one entry into the running totals
    pub fn add(&mut self, entry: &LedgerEntry) {
        match entry {
            LedgerEntry::WaterIntake { amount_ml } => {
                self.water_intake_ml += i64::from(*amount_ml);
            }
            LedgerEntry::FoodIntake { calories, .. } => {
                self.calories_consumed += calories;
            }
            LedgerEntry::Workout {
                calories_burned,
                water_needed_ml,
                ..
            } => {
                self.calories_burned += calories_burned;
                self.workout_water_ml += i64::from(*water_needed_ml);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> ProfileInput {
        ProfileInput {
            weight_kg: 70.0,
            height_cm: 175.0,
            age: 30,
            gender: Gender::Male,
            activity_minutes: 45,
            city: "Moscow".into(),
        }
    }

    #[test]
    fn test_valid_profile_input() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_profile_bounds_are_inclusive() {
        let mut input = valid_input();
        input.weight_kg = 30.0;
        input.height_cm = 250.0;
        input.age = 14;
        input.activity_minutes = 480;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_profile_out_of_range_rejected() {
        let mut input = valid_input();
        input.weight_kg = 29.9;
        assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));

        let mut input = valid_input();
        input.age = 101;
        assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));

        let mut input = valid_input();
        input.activity_minutes = 481;
        assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));

        let mut input = valid_input();
        input.city = "  ".into();
        assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" f ".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn test_entry_validation() {
        assert!(LedgerEntry::WaterIntake { amount_ml: 2000 }.validate().is_ok());
        assert!(LedgerEntry::WaterIntake { amount_ml: 0 }.validate().is_err());
        assert!(LedgerEntry::WaterIntake { amount_ml: 2001 }.validate().is_err());

        let food = LedgerEntry::FoodIntake {
            product_name: "banana".into(),
            calories: 0.0,
            weight_g: 5000.0,
        };
        assert!(food.validate().is_ok());

        let food = LedgerEntry::FoodIntake {
            product_name: "banana".into(),
            calories: 10.0,
            weight_g: 0.0,
        };
        assert!(food.validate().is_err());

        let workout = LedgerEntry::Workout {
            workout_type: "run".into(),
            duration_min: 301,
            calories_burned: 0.0,
            water_needed_ml: 100,
        };
        assert!(workout.validate().is_err());
    }

    #[test]
    fn test_event_json_is_tagged_by_kind() {
        let event = LedgerEvent::new(
            UserId(7),
            LedgerEntry::WaterIntake { amount_ml: 250 },
            Utc::now(),
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"water_intake\""));
        assert!(json.contains("\"user_id\":7"));

        let parsed: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_totals_fold() {
        let mut totals = DailyTotals::default();
        totals.add(&LedgerEntry::WaterIntake { amount_ml: 300 });
        totals.add(&LedgerEntry::Workout {
            workout_type: "run".into(),
            duration_min: 30,
            calories_burned: 360.0,
            water_needed_ml: 300,
        });
        assert_eq!(totals.water_intake_ml, 300);
        assert_eq!(totals.workout_water_ml, 300);
        assert_eq!(totals.calories_burned, 360.0);
        assert_eq!(totals.calories_consumed, 0.0);
    }
}
