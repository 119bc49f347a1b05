//! CSV archive for the JSONL ledger.
//!
//! Rolling up moves every event from the live JSONL file into an
//! append-only CSV archive. The CSV is fsynced before the JSONL file is
//! emptied, so an interrupted roll-up never loses events; at worst an event
//! is present in both places and readers de-duplicate by id. A copy of each
//! rolled-up log is kept as `*.processed` until cleaned up.

use crate::{Error, LedgerEntry, LedgerEvent, Result, UserId};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One archived event; payload columns not used by the kind stay empty
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: String,
    user_id: i64,
    kind: String,
    recorded_at: String,
    amount_ml: Option<u32>,
    product_name: Option<String>,
    calories: Option<f64>,
    weight_g: Option<f64>,
    workout_type: Option<String>,
    duration_min: Option<u32>,
    calories_burned: Option<f64>,
    water_needed_ml: Option<u32>,
}

impl From<&LedgerEvent> for CsvRow {
    fn from(event: &LedgerEvent) -> Self {
        let mut row = CsvRow {
            id: event.id.to_string(),
            user_id: event.user_id.0,
            kind: event.entry.kind_name().to_string(),
            recorded_at: event.recorded_at.to_rfc3339(),
            amount_ml: None,
            product_name: None,
            calories: None,
            weight_g: None,
            workout_type: None,
            duration_min: None,
            calories_burned: None,
            water_needed_ml: None,
        };

        match &event.entry {
            LedgerEntry::WaterIntake { amount_ml } => {
                row.amount_ml = Some(*amount_ml);
            }
            LedgerEntry::FoodIntake {
                product_name,
                calories,
                weight_g,
            } => {
                row.product_name = Some(product_name.clone());
                row.calories = Some(*calories);
                row.weight_g = Some(*weight_g);
            }
            LedgerEntry::Workout {
                workout_type,
                duration_min,
                calories_burned,
                water_needed_ml,
            } => {
                row.workout_type = Some(workout_type.clone());
                row.duration_min = Some(*duration_min);
                row.calories_burned = Some(*calories_burned);
                row.water_needed_ml = Some(*water_needed_ml);
            }
        }

        row
    }
}

fn required<T>(value: Option<T>, column: &str, kind: &str) -> Result<T> {
    value.ok_or_else(|| Error::State(format!("{} row missing {}", kind, column)))
}

impl TryFrom<CsvRow> for LedgerEvent {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::State(format!("Invalid UUID: {}", e)))?;

        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| Error::State(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let kind = row.kind.as_str();
        let entry = match kind {
            "water_intake" => LedgerEntry::WaterIntake {
                amount_ml: required(row.amount_ml, "amount_ml", kind)?,
            },
            "food_intake" => LedgerEntry::FoodIntake {
                // An empty product name reads back as a missing column
                product_name: row.product_name.unwrap_or_default(),
                calories: required(row.calories, "calories", kind)?,
                weight_g: required(row.weight_g, "weight_g", kind)?,
            },
            "workout" => LedgerEntry::Workout {
                workout_type: row.workout_type.unwrap_or_default(),
                duration_min: required(row.duration_min, "duration_min", kind)?,
                calories_burned: required(row.calories_burned, "calories_burned", kind)?,
                water_needed_ml: required(row.water_needed_ml, "water_needed_ml", kind)?,
            },
            other => {
                return Err(Error::State(format!("Unknown event kind '{}'", other)));
            }
        };

        Ok(LedgerEvent {
            id,
            user_id: UserId(row.user_id),
            recorded_at,
            entry,
        })
    }
}

/// Move all events from the JSONL ledger into the CSV archive
///
/// Returns the number of events archived. The log stays exclusively locked
/// from the read until it is emptied, so appends from other processes wait
/// and land in the emptied log afterwards.
pub fn roll_up(log_path: &Path, archive_path: &Path) -> Result<usize> {
    let log = match OpenOptions::new().read(true).write(true).open(log_path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No ledger at {:?} to roll up", log_path);
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    log.lock_exclusive()?;
    let result = archive_locked(&log, log_path, archive_path);
    log.unlock()?;
    result
}

fn archive_locked(log: &File, log_path: &Path, archive_path: &Path) -> Result<usize> {
    let events = crate::event_log::parse_events(BufReader::new(log), log_path)?;

    if events.is_empty() {
        tracing::info!("No events in {:?} to roll up", log_path);
        return Ok(0);
    }

    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(archive_path)?;

    // Header only goes into a fresh archive
    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for event in &events {
        writer.serialize(CsvRow::from(event))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Archived {} events to {:?}", events.len(), archive_path);

    let processed_path = processed_path(log_path);
    std::fs::copy(log_path, &processed_path)?;
    log.set_len(0)?;
    log.sync_all()?;
    tracing::info!("Kept rolled-up ledger as {:?}", processed_path);

    Ok(events.len())
}

/// `<name>.<timestamp>.processed`, unique per roll-up
fn processed_path(log_path: &Path) -> PathBuf {
    let mut name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(
        ".{}.processed",
        Utc::now().format("%Y%m%dT%H%M%S%.9fZ")
    ));
    log_path.with_file_name(name)
}

/// Read every event from the CSV archive
///
/// A missing archive is empty. Rows that cannot be decoded are logged and
/// skipped.
pub fn read_archive(path: &Path) -> Result<Vec<LedgerEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut events = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match LedgerEvent::try_from(row) {
                Ok(event) => events.push(event),
                Err(e) => tracing::warn!("Skipping archived row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize archived row: {}", e),
        }
    }

    Ok(events)
}

/// Delete `*.processed` ledger files left behind by roll-ups
pub fn remove_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed ledger {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Removed {} processed ledger files", count);
    }

    Ok(count)
}
