//! Daily goal calculations.
//!
//! Everything here is a pure function of its arguments. Goals are computed
//! once when a profile is saved and then persisted, so results must be
//! reproducible bit for bit.
//!
//! All rounding is round-half-to-even (`2.5 -> 2`, `3.5 -> 4`).

use crate::catalog::WorkoutKind;
use crate::types::{Gender, ProfileInput};
use serde::{Deserialize, Serialize};

/// Activity factor applied below each minute threshold, checked in order
const ACTIVITY_FACTORS: [(u32, f64); 3] = [(30, 1.2), (60, 1.375), (90, 1.55)];
/// Activity factor once every threshold is passed
const MAX_ACTIVITY_FACTOR: f64 = 1.725;

const EXTRA_KCAL_PER_ACTIVITY_MINUTE: u32 = 5;
const EXTRA_KCAL_CAP: u32 = 400;

const WATER_ML_PER_KG: f64 = 35.0;
const ACTIVITY_BLOCK_MINUTES: u32 = 30;
const WATER_ML_PER_ACTIVITY_BLOCK: u32 = 250;

const WARM_THRESHOLD_C: f64 = 25.0;
const WEATHER_BASE_ML: f64 = 300.0;
const WEATHER_ML_PER_DEGREE: f64 = 20.0;
const WEATHER_CAP_ML: f64 = 800.0;

const WATER_GOAL_MIN_ML: f64 = 1500.0;
const WATER_GOAL_MAX_ML: f64 = 5000.0;

const REFERENCE_WEIGHT_KG: f64 = 70.0;

const WORKOUT_WATER_BLOCK_MINUTES: u32 = 30;
const WORKOUT_WATER_ML_PER_BLOCK: u32 = 200;
const WORKOUT_WATER_FLOOR_ML: u32 = 100;

/// Round to the nearest integer, ties to even
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Basal metabolic rate (Mifflin–St Jeor), kcal/day
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Multiplier for the daily activity level
pub fn activity_factor(activity_minutes: u32) -> f64 {
    ACTIVITY_FACTORS
        .iter()
        .find(|(below, _)| activity_minutes < *below)
        .map(|(_, factor)| *factor)
        .unwrap_or(MAX_ACTIVITY_FACTOR)
}

/// Daily calorie goal in kcal
pub fn calorie_goal(bmr: f64, activity_minutes: u32) -> i64 {
    let extra = activity_minutes
        .saturating_mul(EXTRA_KCAL_PER_ACTIVITY_MINUTE)
        .min(EXTRA_KCAL_CAP);
    round_half_even(bmr * activity_factor(activity_minutes) + f64::from(extra)) as i64
}

/// Extra water for hot weather; zero when the temperature is unknown
pub fn weather_bonus_ml(temperature_c: Option<f64>) -> f64 {
    match temperature_c {
        Some(t) if t > WARM_THRESHOLD_C => {
            (WEATHER_BASE_ML + (t - WARM_THRESHOLD_C) * WEATHER_ML_PER_DEGREE).min(WEATHER_CAP_ML)
        }
        _ => 0.0,
    }
}

/// Daily water goal in ml, always within [1500, 5000]
///
/// Only whole 30-minute activity blocks count towards the activity bonus,
/// so 29 minutes of activity adds nothing.
pub fn water_goal(weight_kg: f64, activity_minutes: u32, temperature_c: Option<f64>) -> i64 {
    let base = weight_kg * WATER_ML_PER_KG;
    let activity = f64::from((activity_minutes / ACTIVITY_BLOCK_MINUTES) * WATER_ML_PER_ACTIVITY_BLOCK);
    let total = base + activity + weather_bonus_ml(temperature_c);
    round_half_even(total.clamp(WATER_GOAL_MIN_ML, WATER_GOAL_MAX_ML)) as i64
}

/// Estimated kcal burned by a workout, scaled linearly from a 70 kg reference
pub fn workout_calories_burned(workout_type: &str, duration_min: u32, weight_kg: f64) -> i64 {
    let rate = WorkoutKind::parse(workout_type).rate_per_minute();
    let adjusted = rate * (weight_kg / REFERENCE_WEIGHT_KG);
    round_half_even(adjusted * f64::from(duration_min)) as i64
}

/// Extra water to drink after a workout, never less than 100 ml
pub fn workout_water_needed(duration_min: u32) -> u32 {
    (duration_min / WORKOUT_WATER_BLOCK_MINUTES) * WORKOUT_WATER_ML_PER_BLOCK
        + WORKOUT_WATER_FLOOR_ML
}

/// Calories in a portion, given the product's kcal per 100 g
///
/// Rounded to one decimal place.
pub fn food_calories(calories_per_100g: f64, weight_g: f64) -> f64 {
    round_half_even(calories_per_100g * weight_g / 100.0 * 10.0) / 10.0
}

/// Both daily goals for a profile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    pub calorie_goal: i64,
    pub water_goal_ml: i64,
}

impl Goals {
    pub fn compute(input: &ProfileInput, temperature_c: Option<f64>) -> Self {
        let bmr = bmr(input.weight_kg, input.height_cm, input.age, input.gender);
        Self {
            calorie_goal: calorie_goal(bmr, input.activity_minutes),
            water_goal_ml: water_goal(input.weight_kg, input.activity_minutes, temperature_c),
        }
    }
}
