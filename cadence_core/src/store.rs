//! Period record store.
//!
//! Mutations on [`CycleData`] keep the derived averages in step with the
//! record set. [`CycleRepository`] is the seam between the tracker and
//! wherever the data lives; [`MemoryCycleStore`] keeps it in process and
//! [`crate::state::FileCycleStore`] keeps it on disk.

use crate::{stats, CycleData, Error, IntegrityIssue, PeriodRecord, PeriodUpdate, Result};
use std::sync::Mutex;
use uuid::Uuid;

impl CycleData {
    /// Build cycle data from a record set, computing the averages
    pub fn from_periods(periods: Vec<PeriodRecord>) -> Self {
        let mut data = Self {
            periods,
            ..Self::default()
        };
        data.recompute_averages();
        data
    }

    /// All records in insertion order
    pub fn periods(&self) -> &[PeriodRecord] {
        &self.periods
    }

    /// Append a record. The caller assigns the id.
    pub fn add_period(&mut self, record: PeriodRecord) {
        if matches!(record.end_date, Some(end) if end < record.start_date) {
            tracing::warn!(
                "Period {} ends before it starts; it will be ignored by statistics",
                record.id
            );
        }
        tracing::debug!("Adding period {} starting {}", record.id, record.start_date);
        self.periods.push(record);
        self.recompute_averages();
    }

    /// Merge `update` into the record with `id`
    ///
    /// Returns `false` and leaves everything untouched if no record matches.
    pub fn update_period(&mut self, id: Uuid, update: PeriodUpdate) -> bool {
        let Some(record) = self.periods.iter_mut().find(|p| p.id == id) else {
            tracing::debug!("Update ignored, no period with id {}", id);
            return false;
        };
        update.apply(record);
        if matches!(record.end_date, Some(end) if end < record.start_date) {
            tracing::warn!(
                "Period {} now ends before it starts; it will be ignored by statistics",
                id
            );
        }
        self.recompute_averages();
        true
    }

    /// Remove the record with `id`
    ///
    /// Returns `false` if no record matches.
    pub fn delete_period(&mut self, id: Uuid) -> bool {
        let before = self.periods.len();
        self.periods.retain(|p| p.id != id);
        if self.periods.len() == before {
            tracing::debug!("Delete ignored, no period with id {}", id);
            return false;
        }
        self.recompute_averages();
        true
    }

    pub fn find_period(&self, id: Uuid) -> Option<&PeriodRecord> {
        self.periods.iter().find(|p| p.id == id)
    }

    /// The open period, if any
    ///
    /// When the one-open-period rule has been violated, the latest-starting
    /// open period wins.
    pub fn active_period(&self) -> Option<&PeriodRecord> {
        self.periods
            .iter()
            .filter(|p| p.is_open())
            .max_by_key(|p| p.start_date)
    }

    /// Most recent completed period by start date
    pub fn last_completed_period(&self) -> Option<&PeriodRecord> {
        stats::completed_periods(&self.periods).last().copied()
    }

    /// Re-derive both averages from the current records
    pub fn recompute_averages(&mut self) {
        let (cycle, period) = stats::compute_averages(&self.periods);
        self.average_cycle_length = cycle;
        self.average_period_length = period;
    }

    /// Report records that break the data model's invariants
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let open: Vec<Uuid> = self
            .periods
            .iter()
            .filter(|p| p.is_open())
            .map(|p| p.id)
            .collect();
        if open.len() > 1 {
            issues.push(IntegrityIssue::MultipleOpenPeriods { ids: open });
        }

        for record in &self.periods {
            if matches!(record.end_date, Some(end) if end < record.start_date) {
                issues.push(IntegrityIssue::EndBeforeStart { id: record.id });
            }
        }

        issues
    }
}

/// Storage backend for cycle data
pub trait CycleRepository {
    /// Current cycle data
    fn load(&self) -> Result<CycleData>;

    /// Run `f` against the stored data as one serialized read-modify-write
    ///
    /// The data is persisted only if `f` succeeds and actually changed it.
    fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut CycleData) -> Result<T>;
}

/// In-process repository guarded by a mutex
#[derive(Debug, Default)]
pub struct MemoryCycleStore {
    data: Mutex<CycleData>,
}

impl MemoryCycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_periods(periods: Vec<PeriodRecord>) -> Self {
        Self {
            data: Mutex::new(CycleData::from_periods(periods)),
        }
    }
}

impl CycleRepository for MemoryCycleStore {
    fn load(&self) -> Result<CycleData> {
        let data = self.data.lock().map_err(|e| Error::State(e.to_string()))?;
        Ok(data.clone())
    }

    fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut CycleData) -> Result<T>,
    {
        let mut data = self.data.lock().map_err(|e| Error::State(e.to_string()))?;
        let mut working = data.clone();
        let value = f(&mut working)?;
        *data = working;
        Ok(value)
    }
}
