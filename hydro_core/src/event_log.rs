//! JSON Lines ledger store with file locking.
//!
//! Every event is appended as one JSON object per line under an exclusive
//! lock and flushed before `append` returns, so a following read from the
//! same session always sees it. Reads take a shared lock and also pull in
//! the CSV archive written by [`crate::csv_rollup`], skipping events that
//! appear in both.

use crate::ledger::LedgerStore;
use crate::{LedgerEvent, Result, UserId};
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-backed ledger store
pub struct JsonlLedger {
    path: PathBuf,
    archive_path: Option<PathBuf>,
}

impl JsonlLedger {
    /// Create a store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            archive_path: None,
        }
    }

    /// Also read rolled-up events from a CSV archive
    pub fn with_archive(mut self, archive_path: impl Into<PathBuf>) -> Self {
        self.archive_path = Some(archive_path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl LedgerStore for JsonlLedger {
    fn append(&mut self, event: &LedgerEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let line = serde_json::to_string(event)?;
        {
            let mut writer = BufWriter::new(&file);
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        file.unlock()?;

        tracing::debug!("Appended event {} to {:?}", event.id, self.path);
        Ok(())
    }

    fn events_for_user(&self, user: UserId) -> Result<Vec<LedgerEvent>> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for event in read_events(&self.path)? {
            if event.user_id == user && seen.insert(event.id) {
                events.push(event);
            }
        }

        if let Some(archive) = &self.archive_path {
            let mut archived = 0;
            for event in crate::csv_rollup::read_archive(archive)? {
                if event.user_id == user && seen.insert(event.id) {
                    events.push(event);
                    archived += 1;
                }
            }
            tracing::debug!("Loaded {} archived events for user {}", archived, user);
        }

        Ok(events)
    }
}

/// Read every event from a JSONL ledger file
///
/// A missing file is an empty ledger. Lines that fail to parse are logged
/// and skipped.
pub fn read_events(path: &Path) -> Result<Vec<LedgerEvent>> {
    // Opened directly; the log can be deleted between any check and the open
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    file.lock_shared()?;

    let events = parse_events(BufReader::new(&file), path);
    file.unlock()?;

    let events = events?;
    tracing::debug!("Read {} events from {:?}", events.len(), path);
    Ok(events)
}

/// Parse JSONL events from a reader whose file lock the caller holds
pub(crate) fn parse_events<R: BufRead>(reader: R, path: &Path) -> Result<Vec<LedgerEvent>> {
    let mut events = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LedgerEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable ledger line {} in {:?}: {}",
                    line_num + 1,
                    path,
                    e
                );
            }
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DailyLedger, DayBoundary};
    use crate::LedgerEntry;
    use chrono::Utc;

    fn water(user: i64, amount_ml: u32) -> LedgerEvent {
        LedgerEvent::new(
            UserId(user),
            LedgerEntry::WaterIntake { amount_ml },
            Utc::now(),
        )
    }

    #[test]
    fn test_append_and_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger/events.jsonl");

        let mut store = JsonlLedger::new(&path);
        let event = water(1, 250);
        store.append(&event).unwrap();

        let events = read_events(&path).unwrap();
        assert_eq!(events, vec![event]);
    }

    #[test]
    fn test_events_filtered_by_user() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlLedger::new(temp_dir.path().join("events.jsonl"));

        store.append(&water(1, 100)).unwrap();
        store.append(&water(2, 200)).unwrap();
        store.append(&water(1, 300)).unwrap();

        assert_eq!(store.events_for_user(UserId(1)).unwrap().len(), 2);
        assert_eq!(store.events_for_user(UserId(2)).unwrap().len(), 1);
        assert!(store.events_for_user(UserId(3)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let events = read_events(&temp_dir.path().join("nope.jsonl")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_log_vanishing_between_reads_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("events.jsonl");

        let churn_path = path.clone();
        let churn = std::thread::spawn(move || {
            for _ in 0..200 {
                JsonlLedger::new(&churn_path).append(&water(1, 100)).unwrap();
                std::fs::remove_file(&churn_path).unwrap();
            }
        });

        while !churn.is_finished() {
            let events = read_events(&path).unwrap();
            assert!(events.len() <= 1);
        }
        churn.join().unwrap();
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("events.jsonl");

        let mut store = JsonlLedger::new(&path);
        store.append(&water(1, 100)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{ not json").unwrap();
        }
        store.append(&water(1, 200)).unwrap();

        assert_eq!(read_events(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_file_ledger_aggregates_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("events.jsonl");
        let now = Utc::now();
        let user = UserId(5);

        {
            let mut ledger = DailyLedger::new(JsonlLedger::new(&path), DayBoundary::utc());
            ledger
                .append_at(user, LedgerEntry::WaterIntake { amount_ml: 600 }, now)
                .unwrap();
            ledger
                .append_at(
                    user,
                    LedgerEntry::FoodIntake {
                        product_name: "rice".into(),
                        calories: 260.0,
                        weight_g: 200.0,
                    },
                    now,
                )
                .unwrap();
        }

        let ledger = DailyLedger::new(JsonlLedger::new(&path), DayBoundary::utc());
        let totals = ledger.totals(user, ledger.today(now)).unwrap();
        assert_eq!(totals.water_intake_ml, 600);
        assert_eq!(totals.calories_consumed, 260.0);
    }
}
