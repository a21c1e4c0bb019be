//! Core domain types for the Cadence cycle tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged period records and their partial updates
//! - The persisted cycle data (records plus derived averages)
//! - Prediction, health, fertility and cycle phase outputs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Cycle length assumed until two completed periods exist
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Period length assumed until one completed period exists
pub const DEFAULT_PERIOD_LENGTH: u32 = 5;

// ============================================================================
// Period Records
// ============================================================================

/// Self-reported flow intensity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Light,
    Normal,
    Heavy,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Flow::Light => "light",
            Flow::Normal => "normal",
            Flow::Heavy => "heavy",
        };
        f.write_str(label)
    }
}

impl FromStr for Flow {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Flow::Light),
            "normal" | "medium" => Ok(Flow::Normal),
            "heavy" => Ok(Flow::Heavy),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown flow level '{}'",
                other
            ))),
        }
    }
}

/// A single logged period
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub id: Uuid,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub flow: Option<Flow>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default = "Utc::now")]
    pub logged_at: DateTime<Utc>,
}

impl PeriodRecord {
    /// Create an open period starting on `start_date` with a fresh id
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date: None,
            flow: None,
            symptoms: Vec::new(),
            logged_at: Utc::now(),
        }
    }

    /// Create a period with both ends already known
    pub fn completed(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            end_date: Some(end_date),
            ..Self::new(start_date)
        }
    }

    /// True if this period has a valid end date (`end >= start`)
    pub fn is_completed(&self) -> bool {
        matches!(self.end_date, Some(end) if end >= self.start_date)
    }

    /// True if no end date has been logged yet
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// Inclusive length in days, only for completed periods
    pub fn duration_days(&self) -> Option<i64> {
        match self.end_date {
            Some(end) if end >= self.start_date => Some((end - self.start_date).num_days() + 1),
            _ => None,
        }
    }

    /// True if `date` falls on a logged bleeding day of this period
    ///
    /// Open periods only cover their start date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match self.end_date {
            Some(end) => date >= self.start_date && date <= end,
            None => date == self.start_date,
        }
    }
}

/// Partial update merged into an existing record
///
/// `None` leaves a field untouched. The nested options on `end_date` and
/// `flow` allow clearing a value with `Some(None)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeriodUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub flow: Option<Option<Flow>>,
    pub symptoms: Option<Vec<String>>,
}

impl PeriodUpdate {
    /// Update that only sets the end date
    pub fn end_on(date: NaiveDate) -> Self {
        Self {
            end_date: Some(Some(date)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn apply(self, record: &mut PeriodRecord) {
        if let Some(start) = self.start_date {
            record.start_date = start;
        }
        if let Some(end) = self.end_date {
            record.end_date = end;
        }
        if let Some(flow) = self.flow {
            record.flow = flow;
        }
        if let Some(symptoms) = self.symptoms {
            record.symptoms = symptoms;
        }
    }
}

// ============================================================================
// Persisted Cycle Data
// ============================================================================

/// All logged periods plus the averages derived from them
///
/// This is the single structure written to disk. The averages are never
/// edited directly; they are recomputed after every mutation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleData {
    #[serde(default)]
    pub periods: Vec<PeriodRecord>,
    #[serde(default = "default_cycle_length")]
    pub average_cycle_length: u32,
    #[serde(default = "default_period_length")]
    pub average_period_length: u32,
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_period_length() -> u32 {
    DEFAULT_PERIOD_LENGTH
}

impl Default for CycleData {
    fn default() -> Self {
        Self {
            periods: Vec::new(),
            average_cycle_length: DEFAULT_CYCLE_LENGTH,
            average_period_length: DEFAULT_PERIOD_LENGTH,
        }
    }
}

/// Data-quality problem found in a record set
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// More than one record has no end date
    MultipleOpenPeriods { ids: Vec<Uuid> },
    /// A record ends before it starts and is ignored by all statistics
    EndBeforeStart { id: Uuid },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::MultipleOpenPeriods { ids } => {
                write!(f, "{} periods are open at the same time", ids.len())
            }
            IntegrityIssue::EndBeforeStart { id } => {
                write!(f, "period {} ends before it starts and is ignored", id)
            }
        }
    }
}

// ============================================================================
// Prediction Types
// ============================================================================

/// Qualitative trust in a forecast
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Moderate,
    High,
}

/// Band of plausible start dates around the forecast start
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionWindow {
    pub earliest_start: NaiveDate,
    pub latest_start: NaiveDate,
}

/// Forecast of the next period
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ovulation_date: NaiveDate,
    pub confidence: Confidence,
    pub prediction_window: PredictionWindow,
    pub is_irregular: bool,
    pub cycles_used: usize,
    pub variation: f64,
    pub warnings: Vec<String>,
}

// ============================================================================
// Health Types
// ============================================================================

/// Overall regularity classification
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Irregular,
    Concerning,
    InsufficientData,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Irregular => "irregular",
            HealthStatus::Concerning => "concerning",
            HealthStatus::InsufficientData => "insufficient_data",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Numbers behind a health classification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HealthDetails {
    pub average_cycle_length: f64,
    pub standard_deviation: f64,
    pub cycle_lengths: Vec<i64>,
    pub irregularity_count: usize,
    pub total_cycles: usize,
}

/// Longitudinal regularity assessment over the full history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysis {
    pub status: HealthStatus,
    pub severity: Severity,
    pub message: String,
    pub details: HealthDetails,
    pub recommendations: Vec<String>,
}

// ============================================================================
// Fertility Types
// ============================================================================

/// Estimated fertile days around the forecast ovulation date
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FertilityWindow {
    pub ovulation_date: NaiveDate,
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
}

/// Calendar classification of a single day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Ovulation,
    Fertile,
    Period,
    None,
}

// ============================================================================
// Cycle Phase Types
// ============================================================================

/// Hormonal phase of the current cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CyclePhase::Menstrual => "menstrual",
            CyclePhase::Follicular => "follicular",
            CyclePhase::Ovulatory => "ovulatory",
            CyclePhase::Luteal => "luteal",
        };
        f.write_str(label)
    }
}

/// Position of a date within the cycle that started with the last completed period
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    /// 1-based; the period's start date is day 1
    pub cycle_day: u32,
    pub phase: CyclePhase,
}
