//! Fertile window and calendar day classification.
//!
//! The window runs from five days before the forecast ovulation date to one
//! day after it. Scores peak at 100 on ovulation day and drop by 20 per day.

use crate::stats;
use crate::{CycleData, DayKind, FertilityWindow, PredictionResult};
use chrono::NaiveDate;

const DAYS_BEFORE_OVULATION: i64 = 5;
const DAYS_AFTER_OVULATION: i64 = 1;
const SCORE_DROP_PER_DAY: i64 = 20;

/// Fertile window around a prediction's ovulation date
///
/// `None` if the window would run past either end of the calendar.
pub fn fertility_window(prediction: &PredictionResult) -> Option<FertilityWindow> {
    let ovulation_date = prediction.ovulation_date;
    Some(FertilityWindow {
        ovulation_date,
        fertile_start: stats::offset_date(ovulation_date, -DAYS_BEFORE_OVULATION)?,
        fertile_end: stats::offset_date(ovulation_date, DAYS_AFTER_OVULATION)?,
    })
}

impl FertilityWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.fertile_start && date <= self.fertile_end
    }
}

/// Relative fertility score for `date`, 0 to 100
pub fn fertility_score(window: &FertilityWindow, date: NaiveDate) -> u8 {
    if !window.contains(date) {
        return 0;
    }
    let distance = (date - window.ovulation_date).num_days().abs();
    (100 - distance * SCORE_DROP_PER_DAY).clamp(0, 100) as u8
}

/// Classify a calendar day
///
/// Forecast ovulation and fertile days take precedence over logged period
/// days.
pub fn classify_day(data: &CycleData, window: Option<&FertilityWindow>, date: NaiveDate) -> DayKind {
    if let Some(window) = window {
        if date == window.ovulation_date {
            return DayKind::Ovulation;
        }
        if window.contains(date) {
            return DayKind::Fertile;
        }
    }

    if data.periods.iter().any(|p| p.covers(date)) {
        return DayKind::Period;
    }

    DayKind::None
}
