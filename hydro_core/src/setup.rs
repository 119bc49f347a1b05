//! Step-by-step profile setup.
//!
//! Front ends that ask one question at a time drive a [`ProfileSetup`]:
//! show [`ProfileSetup::prompt`], pass the user's reply to
//! [`ProfileSetup::feed`], repeat until it reports completion. A rejected
//! answer leaves the machine on the same question.

use crate::types::{check_activity, check_age, check_city, check_height, check_weight};
use crate::{Error, Gender, ProfileInput, Result};

/// Question currently being asked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupState {
    Weight,
    Height,
    Age,
    Gender,
    Activity,
    City,
    Complete,
}

/// Outcome of feeding one answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupStep {
    /// Answer accepted, another question follows
    Next(SetupState),
    /// Every answer collected
    Complete,
}

/// Answers gathered so far
#[derive(Clone, Debug, Default)]
struct Answers {
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age: Option<u32>,
    gender: Option<Gender>,
    activity_minutes: Option<u32>,
    city: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ProfileSetup {
    state: SetupState,
    answers: Answers,
}

impl Default for ProfileSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileSetup {
    pub fn new() -> Self {
        Self {
            state: SetupState::Weight,
            answers: Answers::default(),
        }
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    pub fn prompt(&self) -> &'static str {
        match self.state {
            SetupState::Weight => "Enter your weight (kg):",
            SetupState::Height => "Enter your height (cm):",
            SetupState::Age => "Enter your age:",
            SetupState::Gender => "Enter your gender (male/female):",
            SetupState::Activity => "How many minutes of activity do you get per day?",
            SetupState::City => "Which city are you in?",
            SetupState::Complete => "Profile complete.",
        }
    }

    /// Consume one answer for the current question
    pub fn feed(&mut self, input: &str) -> Result<SetupStep> {
        let input = input.trim();
        let next = match self.state {
            SetupState::Weight => {
                let weight = parse_decimal(input)?;
                check_weight(weight)?;
                self.answers.weight_kg = Some(weight);
                SetupState::Height
            }
            SetupState::Height => {
                let height = parse_decimal(input)?;
                check_height(height)?;
                self.answers.height_cm = Some(height);
                SetupState::Age
            }
            SetupState::Age => {
                let age = parse_whole(input)?;
                check_age(age)?;
                self.answers.age = Some(age);
                SetupState::Gender
            }
            SetupState::Gender => {
                self.answers.gender = Some(input.parse()?);
                SetupState::Activity
            }
            SetupState::Activity => {
                let minutes = parse_whole(input)?;
                check_activity(minutes)?;
                self.answers.activity_minutes = Some(minutes);
                SetupState::City
            }
            SetupState::City => {
                check_city(input)?;
                self.answers.city = Some(input.to_string());
                SetupState::Complete
            }
            SetupState::Complete => {
                return Err(Error::InvalidInput("profile setup already complete".into()));
            }
        };

        self.state = next;
        Ok(match next {
            SetupState::Complete => SetupStep::Complete,
            state => SetupStep::Next(state),
        })
    }

    /// The collected profile, once every question is answered
    pub fn finish(self) -> Result<ProfileInput> {
        let answers = self.answers;
        match (
            answers.weight_kg,
            answers.height_cm,
            answers.age,
            answers.gender,
            answers.activity_minutes,
            answers.city,
        ) {
            (
                Some(weight_kg),
                Some(height_cm),
                Some(age),
                Some(gender),
                Some(activity_minutes),
                Some(city),
            ) => Ok(ProfileInput {
                weight_kg,
                height_cm,
                age,
                gender,
                activity_minutes,
                city,
            }),
            _ => Err(Error::InvalidInput(format!(
                "profile setup stopped at {:?}",
                self.state
            ))),
        }
    }
}

/// Accepts both `72.5` and `72,5`
fn parse_decimal(input: &str) -> Result<f64> {
    input
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a number", input)))
}

fn parse_whole(input: &str) -> Result<u32> {
    input
        .parse::<u32>()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a whole number", input)))
}
