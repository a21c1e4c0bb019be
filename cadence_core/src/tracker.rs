//! Read/write entry point used by logging front-ends.
//!
//! [`CycleTracker`] owns a repository and exposes the record mutations
//! alongside the derived views (snapshot, prediction, health, fertility).
//! Derived views are recomputed from the stored records on every call.

use crate::store::CycleRepository;
use crate::{
    fertility, health, phase, prediction, CycleData, DayKind, Error, FertilityWindow,
    HealthAnalysis, PeriodRecord, PeriodUpdate, PhaseInfo, PredictionResult, Result,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

/// Cycle tracking facade over a repository
#[derive(Debug)]
pub struct CycleTracker<R> {
    repo: R,
}

impl<R: CycleRepository> CycleTracker<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Store a new record
    pub fn add_period(&self, record: PeriodRecord) -> Result<()> {
        tracing::info!("Logging period {} starting {}", record.id, record.start_date);
        self.repo.mutate(|data| {
            data.add_period(record);
            Ok(())
        })
    }

    /// Merge fields into a record; `false` if the id is unknown
    pub fn update_period(&self, id: Uuid, update: PeriodUpdate) -> Result<bool> {
        let found = self.repo.mutate(|data| Ok(data.update_period(id, update)))?;
        if found {
            tracing::info!("Updated period {}", id);
        }
        Ok(found)
    }

    /// Remove a record; `false` if the id is unknown
    pub fn delete_period(&self, id: Uuid) -> Result<bool> {
        let found = self.repo.mutate(|data| Ok(data.delete_period(id)))?;
        if found {
            tracing::info!("Deleted period {}", id);
        }
        Ok(found)
    }

    /// Records plus the current averages
    pub fn cycle_snapshot(&self) -> Result<CycleData> {
        self.repo.load()
    }

    pub fn predict_next_period(&self) -> Result<Option<PredictionResult>> {
        let data = self.repo.load()?;
        Ok(prediction::predict_next_period(&data.periods))
    }

    pub fn analyze_cycle_health(&self) -> Result<HealthAnalysis> {
        let data = self.repo.load()?;
        Ok(health::analyze_cycle_health(&data.periods))
    }

    pub fn is_ovulation_phase(&self, date: NaiveDate) -> Result<bool> {
        let data = self.repo.load()?;
        Ok(prediction::is_ovulation_phase(&data, date))
    }

    /// Fertile window around the next forecast ovulation
    pub fn fertility_window(&self) -> Result<Option<FertilityWindow>> {
        Ok(self
            .predict_next_period()?
            .and_then(|p| fertility::fertility_window(&p)))
    }

    /// Calendar classification for `date`
    pub fn classify_day(&self, date: NaiveDate) -> Result<DayKind> {
        let data = self.repo.load()?;
        let window = prediction::predict_next_period(&data.periods)
            .and_then(|p| fertility::fertility_window(&p));
        Ok(fertility::classify_day(&data, window.as_ref(), date))
    }

    /// Cycle day and phase of `date`, if a completed period precedes it
    pub fn current_phase(&self, date: NaiveDate) -> Result<Option<PhaseInfo>> {
        let data = self.repo.load()?;
        Ok(phase::current_phase(&data, date))
    }

    pub fn active_period(&self) -> Result<Option<PeriodRecord>> {
        Ok(self.repo.load()?.active_period().cloned())
    }

    /// Open a new period on `date`
    ///
    /// Fails with [`Error::ActivePeriod`] while another period is open.
    pub fn start_period(&self, date: NaiveDate) -> Result<PeriodRecord> {
        self.repo.mutate(|data| {
            if let Some(active) = data.active_period() {
                return Err(Error::ActivePeriod(active.id));
            }
            let record = PeriodRecord::new(date);
            data.add_period(record.clone());
            tracing::info!("Started period {} on {}", record.id, date);
            Ok(record)
        })
    }

    /// Close the open period on `date`
    ///
    /// Fails with [`Error::NoActivePeriod`] if nothing is open, or
    /// [`Error::InvalidInput`] if `date` precedes the period start.
    pub fn end_period(&self, date: NaiveDate) -> Result<PeriodRecord> {
        self.repo.mutate(|data| {
            let active = data.active_period().ok_or(Error::NoActivePeriod)?;
            if date < active.start_date {
                return Err(Error::InvalidInput(format!(
                    "end date {} is before the period start {}",
                    date, active.start_date
                )));
            }
            let id = active.id;
            data.update_period(id, PeriodUpdate::end_on(date));
            tracing::info!("Ended period {} on {}", id, date);
            data.find_period(id)
                .cloned()
                .ok_or(Error::PeriodNotFound(id))
        })
    }

    /// Add records whose ids are not stored yet; returns how many were added
    pub fn import_periods(&self, records: Vec<PeriodRecord>) -> Result<usize> {
        self.repo.mutate(|data| {
            let mut known: HashSet<Uuid> = data.periods.iter().map(|p| p.id).collect();
            let mut added = 0;
            for record in records {
                if known.insert(record.id) {
                    data.add_period(record);
                    added += 1;
                } else {
                    tracing::debug!("Skipping already stored period {}", record.id);
                }
            }
            Ok(added)
        })
    }
}
