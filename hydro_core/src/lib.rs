#![forbid(unsafe_code)]

//! Core domain model and business logic for the hydro tracker.
//!
//! This crate provides:
//! - Domain types (profiles, ledger events, daily totals)
//! - Goal calculations (BMR, calorie and water goals, workout estimates)
//! - The daily ledger and progress evaluation
//! - Persistence (profile store, JSONL ledger, CSV archive)
//! - Step-by-step profile setup

pub mod types;
pub mod error;
pub mod catalog;
pub mod calculator;
pub mod config;
pub mod logging;
pub mod ledger;
pub mod event_log;
pub mod csv_rollup;
pub mod profile_store;
pub mod progress;
pub mod setup;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::WorkoutKind;
pub use calculator::Goals;
pub use config::Config;
pub use ledger::{DailyLedger, DayBoundary, LedgerStore, MemoryLedger};
pub use event_log::JsonlLedger;
pub use profile_store::{JsonProfileStore, MemoryProfiles, ProfileStore};
pub use progress::{evaluate, ProgressReport};
pub use setup::{ProfileSetup, SetupState, SetupStep};
pub use tracker::{DailyProgress, Tracker};
