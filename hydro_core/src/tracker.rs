//! Tracker facade tying profiles, the ledger and the calculators together.
//!
//! A front end builds one `Tracker` from its chosen stores and drives every
//! user action through it. Inputs are validated here, before anything is
//! computed or persisted.

use crate::calculator::{self, Goals};
use crate::ledger::{DailyLedger, DayBoundary, LedgerStore};
use crate::profile_store::ProfileStore;
use crate::progress::{self, ProgressReport};
use crate::types::check_food_weight;
use crate::{DailyTotals, Error, LedgerEntry, LedgerEvent, Profile, ProfileInput, Result, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A day's totals with their evaluation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyProgress {
    pub day: NaiveDate,
    pub totals: DailyTotals,
    pub report: ProgressReport,
}

pub struct Tracker<L, P> {
    ledger: DailyLedger<L>,
    profiles: P,
}

impl<L: LedgerStore, P: ProfileStore> Tracker<L, P> {
    pub fn new(ledger_store: L, profiles: P, boundary: DayBoundary) -> Self {
        Self {
            ledger: DailyLedger::new(ledger_store, boundary),
            profiles,
        }
    }

    pub fn ledger(&self) -> &DailyLedger<L> {
        &self.ledger
    }

    /// Validate `input`, compute its goals and replace the user's profile
    pub fn save_profile(
        &mut self,
        user: UserId,
        input: ProfileInput,
        temperature_c: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<Profile> {
        input.validate()?;
        if let Some(t) = temperature_c {
            if !t.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "temperature must be a number, got {}",
                    t
                )));
            }
        }

        let goals = Goals::compute(&input, temperature_c);
        let profile = Profile {
            weight_kg: input.weight_kg,
            height_cm: input.height_cm,
            age: input.age,
            gender: input.gender,
            activity_minutes: input.activity_minutes,
            city: input.city,
            ambient_temperature_c: temperature_c,
            calorie_goal: goals.calorie_goal as f64,
            water_goal_ml: goals.water_goal_ml as f64,
            updated_at: now,
        };

        self.profiles.save(user, &profile)?;
        tracing::info!(
            "Profile saved for user {}: water goal {} ml, calorie goal {} kcal",
            user,
            goals.water_goal_ml,
            goals.calorie_goal
        );
        Ok(profile)
    }

    /// The user's saved profile
    pub fn profile(&self, user: UserId) -> Result<Profile> {
        self.profiles.load(user)?.ok_or(Error::MissingProfile(user))
    }

    /// Drop the user's profile; ledger history is kept
    pub fn reset_profile(&mut self, user: UserId) -> Result<bool> {
        self.profiles.remove(user)
    }

    pub fn log_water(
        &mut self,
        user: UserId,
        amount_ml: u32,
        at: DateTime<Utc>,
    ) -> Result<LedgerEvent> {
        self.profile(user)?;
        self.append(user, LedgerEntry::WaterIntake { amount_ml }, at)
    }

    /// Log a portion of food given the product's kcal per 100 g
    pub fn log_food(
        &mut self,
        user: UserId,
        product_name: &str,
        calories_per_100g: f64,
        weight_g: f64,
        at: DateTime<Utc>,
    ) -> Result<LedgerEvent> {
        if !calories_per_100g.is_finite() || calories_per_100g < 0.0 {
            return Err(Error::InvalidInput(format!(
                "calories per 100 g must be zero or more, got {}",
                calories_per_100g
            )));
        }
        check_food_weight(weight_g)?;
        self.profile(user)?;

        let entry = LedgerEntry::FoodIntake {
            product_name: product_name.trim().to_string(),
            calories: calculator::food_calories(calories_per_100g, weight_g),
            weight_g,
        };
        self.append(user, entry, at)
    }

    /// Log a workout; burn and water need are derived from the saved weight
    pub fn log_workout(
        &mut self,
        user: UserId,
        workout_type: &str,
        duration_min: u32,
        at: DateTime<Utc>,
    ) -> Result<LedgerEvent> {
        let profile = self.profile(user)?;

        let entry = LedgerEntry::Workout {
            workout_type: workout_type.trim().to_lowercase(),
            duration_min,
            calories_burned: calculator::workout_calories_burned(
                workout_type,
                duration_min,
                profile.weight_kg,
            ) as f64,
            water_needed_ml: calculator::workout_water_needed(duration_min),
        };
        self.append(user, entry, at)
    }

    /// Evaluate the day containing `now`
    pub fn progress(&self, user: UserId, now: DateTime<Utc>) -> Result<DailyProgress> {
        let profile = self.profile(user)?;
        let day = self.ledger.today(now);
        let totals = self.ledger.totals(user, day)?;
        Ok(DailyProgress {
            day,
            totals,
            report: progress::evaluate(&profile, &totals),
        })
    }

    fn append(
        &mut self,
        user: UserId,
        entry: LedgerEntry,
        at: DateTime<Utc>,
    ) -> Result<LedgerEvent> {
        entry.validate()?;
        let event = LedgerEvent::new(user, entry, at);
        self.ledger.record(&event)?;
        Ok(event)
    }
}
