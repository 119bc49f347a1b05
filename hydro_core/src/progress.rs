//! Progress of a day's totals against a profile's goals.
//!
//! A goal that is zero, negative or not finite cannot be divided by; its
//! percentage is reported as 0 until a proper goal is saved again.

use crate::calculator::round_half_even;
use crate::{DailyTotals, Profile};
use serde::{Deserialize, Serialize};

/// Number of cells in a rendered progress bar
pub const BAR_SEGMENTS: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterProgress {
    pub consumed_ml: i64,
    pub goal_ml: i64,
    pub percent: i64,
    pub remaining_ml: i64,
    pub complete: bool,
    /// Extra water recommended by today's workouts
    pub workout_extra_ml: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalorieProgress {
    pub consumed: f64,
    pub burned: f64,
    /// Consumed minus burned; negative when more was burned
    pub balance: f64,
    pub goal: f64,
    /// Can be negative along with the balance
    pub percent: i64,
    pub remaining: f64,
    pub exceeded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub water: WaterProgress,
    pub calories: CalorieProgress,
}

/// `value / goal` as a whole percentage capped at 100
fn percent_of(value: f64, goal: f64) -> i64 {
    if !goal.is_finite() || goal <= 0.0 {
        return 0;
    }
    round_half_even(value / goal * 100.0).min(100.0) as i64
}

/// Filled cells of a progress bar for `percent`
pub fn filled_segments(percent: i64) -> usize {
    (percent / (100 / BAR_SEGMENTS)).clamp(0, BAR_SEGMENTS) as usize
}

pub fn evaluate_water(goal_ml: i64, consumed_ml: i64, workout_extra_ml: i64) -> WaterProgress {
    WaterProgress {
        consumed_ml,
        goal_ml,
        percent: percent_of(consumed_ml as f64, goal_ml as f64),
        remaining_ml: (goal_ml - consumed_ml).max(0),
        complete: consumed_ml >= goal_ml,
        workout_extra_ml,
    }
}

pub fn evaluate_calories(goal: f64, consumed: f64, burned: f64) -> CalorieProgress {
    let balance = consumed - burned;
    CalorieProgress {
        consumed,
        burned,
        balance,
        goal,
        percent: percent_of(balance, goal),
        remaining: (goal - balance).max(0.0),
        exceeded: balance > goal,
    }
}

/// Combine a profile's goals with one day's totals
pub fn evaluate(profile: &Profile, totals: &DailyTotals) -> ProgressReport {
    ProgressReport {
        water: evaluate_water(
            profile.water_goal_ml as i64,
            totals.water_intake_ml,
            totals.workout_water_ml,
        ),
        calories: evaluate_calories(
            profile.calorie_goal,
            totals.calories_consumed,
            totals.calories_burned,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gender;
    use chrono::Utc;

    fn profile(water_goal_ml: f64, calorie_goal: f64) -> Profile {
        Profile {
            weight_kg: 70.0,
            height_cm: 175.0,
            age: 30,
            gender: Gender::Male,
            activity_minutes: 0,
            city: "Sochi".into(),
            ambient_temperature_c: None,
            calorie_goal,
            water_goal_ml,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_water_partial() {
        let water = evaluate_water(2450, 1000, 0);
        assert_eq!(water.percent, 41);
        assert_eq!(water.remaining_ml, 1450);
        assert!(!water.complete);
    }

    #[test]
    fn test_water_over_goal_caps_percent() {
        let water = evaluate_water(2000, 2600, 300);
        assert_eq!(water.percent, 100);
        assert_eq!(water.remaining_ml, 0);
        assert!(water.complete);
        assert_eq!(water.workout_extra_ml, 300);
    }

    #[test]
    fn test_percent_rounds_half_to_even() {
        // 25 / 200 = 12.5% -> 12, 35 / 200 = 17.5% -> 18
        assert_eq!(evaluate_water(200, 25, 0).percent, 12);
        assert_eq!(evaluate_water(200, 35, 0).percent, 18);
    }

    #[test]
    fn test_calories_balance_can_go_negative() {
        let calories = evaluate_calories(2000.0, 300.0, 500.0);
        assert_eq!(calories.balance, -200.0);
        assert_eq!(calories.percent, -10);
        assert_eq!(calories.remaining, 2200.0);
        assert!(!calories.exceeded);
    }

    #[test]
    fn test_calories_exceeded() {
        let calories = evaluate_calories(2000.0, 2600.0, 100.0);
        assert_eq!(calories.balance, 2500.0);
        assert_eq!(calories.percent, 100);
        assert_eq!(calories.remaining, 0.0);
        assert!(calories.exceeded);

        let at_goal = evaluate_calories(2000.0, 2000.0, 0.0);
        assert!(!at_goal.exceeded);
    }

    #[test]
    fn test_zero_goal_does_not_divide() {
        let water = evaluate_water(0, 500, 0);
        assert_eq!(water.percent, 0);
        assert_eq!(water.remaining_ml, 0);
        assert!(water.complete);

        let calories = evaluate_calories(0.0, 500.0, 0.0);
        assert_eq!(calories.percent, 0);
        assert!(calories.exceeded);

        let calories = evaluate_calories(f64::NAN, 500.0, 0.0);
        assert_eq!(calories.percent, 0);
    }

    #[test]
    fn test_evaluate_profile() {
        let totals = DailyTotals {
            water_intake_ml: 1225,
            calories_consumed: 1200.0,
            calories_burned: 300.0,
            workout_water_ml: 300,
        };
        let report = evaluate(&profile(2450.0, 1800.0), &totals);
        assert_eq!(report.water.percent, 50);
        assert_eq!(report.water.workout_extra_ml, 300);
        assert_eq!(report.calories.balance, 900.0);
        assert_eq!(report.calories.percent, 50);
        assert_eq!(report.calories.remaining, 900.0);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let totals = DailyTotals {
            water_intake_ml: 777,
            calories_consumed: 1234.5,
            calories_burned: 321.0,
            workout_water_ml: 100,
        };
        let p = profile(3100.0, 2345.0);
        assert_eq!(evaluate(&p, &totals), evaluate(&p, &totals));
    }

    #[test]
    fn test_filled_segments() {
        assert_eq!(filled_segments(-30), 0);
        assert_eq!(filled_segments(0), 0);
        assert_eq!(filled_segments(19), 0);
        assert_eq!(filled_segments(20), 1);
        assert_eq!(filled_segments(99), 4);
        assert_eq!(filled_segments(100), 5);
    }
}
