//! Append-only daily ledger of water, food and workout events.
//!
//! Events are bucketed into calendar days in a fixed reference timezone
//! (see [`DayBoundary`]). Aggregates only ever look at a single user and a
//! single day.

use crate::{DailyTotals, Error, LedgerEntry, LedgerEvent, Result, UserId};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use uuid::Uuid;

/// Largest accepted offset from UTC, in minutes
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Maps instants to calendar days using a fixed UTC offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayBoundary {
    offset: FixedOffset,
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::utc()
    }
}

impl DayBoundary {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Boundary shifted east of UTC by `minutes` (negative = west)
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(Error::Config(format!(
                "day offset must be within ±{} minutes, got {}",
                MAX_OFFSET_MINUTES, minutes
            )));
        }
        let offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| Error::Config(format!("invalid day offset: {} minutes", minutes)))?;
        Ok(Self { offset })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Calendar day an instant falls on
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

/// Backing storage for ledger events
pub trait LedgerStore {
    /// Persist one event; must be visible to reads once this returns
    fn append(&mut self, event: &LedgerEvent) -> Result<()>;

    /// Every stored event belonging to `user`, in any order
    fn events_for_user(&self, user: UserId) -> Result<Vec<LedgerEvent>>;
}

/// In-process store, mainly for tests and embedding
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    events: Vec<LedgerEvent>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl LedgerStore for MemoryLedger {
    fn append(&mut self, event: &LedgerEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn events_for_user(&self, user: UserId) -> Result<Vec<LedgerEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.user_id == user)
            .cloned()
            .collect())
    }
}

/// Day-scoped view over a [`LedgerStore`]
pub struct DailyLedger<S> {
    store: S,
    boundary: DayBoundary,
}

impl<S: LedgerStore> DailyLedger<S> {
    pub fn new(store: S, boundary: DayBoundary) -> Self {
        Self { store, boundary }
    }

    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current day for `now`
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.boundary.day_of(now)
    }

    /// Append an entry stamped with the current time
    pub fn append(&mut self, user: UserId, entry: LedgerEntry) -> Result<Uuid> {
        self.append_at(user, entry, Utc::now())
    }

    /// Append an entry with a caller-supplied timestamp
    pub fn append_at(
        &mut self,
        user: UserId,
        entry: LedgerEntry,
        at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let event = LedgerEvent::new(user, entry, at);
        self.record(&event)
    }

    /// Append an already constructed event
    pub fn record(&mut self, event: &LedgerEvent) -> Result<Uuid> {
        self.store.append(event)?;
        tracing::debug!(
            "Recorded {} event {} for user {}",
            event.entry.kind_name(),
            event.id,
            event.user_id
        );
        Ok(event.id)
    }

    /// Events for `user` that fall on `day`, oldest first
    pub fn events_on(&self, user: UserId, day: NaiveDate) -> Result<Vec<LedgerEvent>> {
        let mut events: Vec<_> = self
            .store
            .events_for_user(user)?
            .into_iter()
            .filter(|e| self.boundary.day_of(e.recorded_at) == day)
            .collect();
        events.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(events)
    }

    /// All four aggregates for one user and day
    pub fn totals(&self, user: UserId, day: NaiveDate) -> Result<DailyTotals> {
        let mut totals = DailyTotals::default();
        for event in self.events_on(user, day)? {
            totals.add(&event.entry);
        }
        Ok(totals)
    }

    pub fn sum_water_intake(&self, user: UserId, day: NaiveDate) -> Result<i64> {
        Ok(self.totals(user, day)?.water_intake_ml)
    }

    pub fn sum_calories_consumed(&self, user: UserId, day: NaiveDate) -> Result<f64> {
        Ok(self.totals(user, day)?.calories_consumed)
    }

    pub fn sum_calories_burned(&self, user: UserId, day: NaiveDate) -> Result<f64> {
        Ok(self.totals(user, day)?.calories_burned)
    }

    pub fn sum_workout_water(&self, user: UserId, day: NaiveDate) -> Result<i64> {
        Ok(self.totals(user, day)?.workout_water_ml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn food(calories: f64) -> LedgerEntry {
        LedgerEntry::FoodIntake {
            product_name: "oats".into(),
            calories,
            weight_g: 100.0,
        }
    }

    fn workout(burned: f64, water: u32) -> LedgerEntry {
        LedgerEntry::Workout {
            workout_type: "run".into(),
            duration_min: 30,
            calories_burned: burned,
            water_needed_ml: water,
        }
    }

    #[test]
    fn test_empty_day_sums_to_zero() {
        let ledger = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        let user = UserId(1);
        assert_eq!(ledger.sum_water_intake(user, date(1)).unwrap(), 0);
        assert_eq!(ledger.sum_calories_consumed(user, date(1)).unwrap(), 0.0);
        assert_eq!(ledger.sum_calories_burned(user, date(1)).unwrap(), 0.0);
        assert_eq!(ledger.sum_workout_water(user, date(1)).unwrap(), 0);
    }

    #[test]
    fn test_sums_match_payloads() {
        let mut ledger = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        let user = UserId(1);

        for amount in [250, 500, 330] {
            ledger
                .append_at(user, LedgerEntry::WaterIntake { amount_ml: amount }, noon(3))
                .unwrap();
        }
        ledger.append_at(user, food(120.5), noon(3)).unwrap();
        ledger.append_at(user, food(80.0), noon(3)).unwrap();
        ledger.append_at(user, workout(360.0, 300), noon(3)).unwrap();
        ledger.append_at(user, workout(90.0, 100), noon(3)).unwrap();

        assert_eq!(ledger.sum_water_intake(user, date(3)).unwrap(), 1080);
        assert_eq!(ledger.sum_calories_consumed(user, date(3)).unwrap(), 200.5);
        assert_eq!(ledger.sum_calories_burned(user, date(3)).unwrap(), 450.0);
        assert_eq!(ledger.sum_workout_water(user, date(3)).unwrap(), 400);
    }

    #[test]
    fn test_sums_independent_of_insertion_order() {
        let entries = vec![
            LedgerEntry::WaterIntake { amount_ml: 200 },
            food(310.0),
            workout(150.0, 100),
            LedgerEntry::WaterIntake { amount_ml: 700 },
            food(45.5),
        ];
        let user = UserId(9);

        let mut forward = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        for entry in entries.iter().cloned() {
            forward.append_at(user, entry, noon(5)).unwrap();
        }

        let mut reverse = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        for entry in entries.iter().rev().cloned() {
            reverse.append_at(user, entry, noon(5)).unwrap();
        }

        assert_eq!(
            forward.totals(user, date(5)).unwrap(),
            reverse.totals(user, date(5)).unwrap()
        );
    }

    #[test]
    fn test_other_users_and_days_excluded() {
        let mut ledger = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        let alice = UserId(1);
        let bob = UserId(2);

        ledger
            .append_at(alice, LedgerEntry::WaterIntake { amount_ml: 500 }, noon(10))
            .unwrap();
        ledger
            .append_at(bob, LedgerEntry::WaterIntake { amount_ml: 900 }, noon(10))
            .unwrap();
        ledger
            .append_at(alice, LedgerEntry::WaterIntake { amount_ml: 300 }, noon(9))
            .unwrap();

        assert_eq!(ledger.sum_water_intake(alice, date(10)).unwrap(), 500);
        assert_eq!(ledger.sum_water_intake(bob, date(10)).unwrap(), 900);
        assert_eq!(ledger.sum_water_intake(alice, date(9)).unwrap(), 300);
    }

    #[test]
    fn test_day_boundary_at_midnight_utc() {
        let mut ledger = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        let user = UserId(1);
        let midnight = Utc.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap();

        ledger
            .append_at(
                user,
                LedgerEntry::WaterIntake { amount_ml: 100 },
                midnight - Duration::seconds(1),
            )
            .unwrap();
        ledger
            .append_at(user, LedgerEntry::WaterIntake { amount_ml: 200 }, midnight)
            .unwrap();

        assert_eq!(ledger.sum_water_intake(user, date(10)).unwrap(), 100);
        assert_eq!(ledger.sum_water_intake(user, date(11)).unwrap(), 200);
    }

    #[test]
    fn test_day_boundary_with_offset() {
        // UTC+3: 22:30 UTC on the 10th is already the 11th
        let boundary = DayBoundary::from_offset_minutes(180).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 10, 22, 30, 0).unwrap();
        assert_eq!(boundary.day_of(at), date(11));
        assert_eq!(DayBoundary::utc().day_of(at), date(10));
        assert_eq!(boundary.offset_minutes(), 180);
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        assert!(DayBoundary::from_offset_minutes(15 * 60).is_err());
        assert!(DayBoundary::from_offset_minutes(-14 * 60).is_ok());
        assert!(matches!(
            DayBoundary::from_offset_minutes(i32::MIN),
            Err(Error::Config(_))
        ));
        assert!(DayBoundary::from_offset_minutes(i32::MAX).is_err());
    }

    #[test]
    fn test_append_returns_unique_ids() {
        let mut ledger = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        let a = ledger
            .append(UserId(1), LedgerEntry::WaterIntake { amount_ml: 100 })
            .unwrap();
        let b = ledger
            .append(UserId(1), LedgerEntry::WaterIntake { amount_ml: 100 })
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.store().len(), 2);
    }

    #[test]
    fn test_read_after_write_sees_event() {
        let mut ledger = DailyLedger::new(MemoryLedger::new(), DayBoundary::utc());
        let now = Utc::now();
        let user = UserId(4);
        ledger
            .append_at(user, LedgerEntry::WaterIntake { amount_ml: 400 }, now)
            .unwrap();
        assert_eq!(
            ledger.sum_water_intake(user, ledger.today(now)).unwrap(),
            400
        );
    }
}
