//! Next-period prediction.
//!
//! Forecasts are built from the most recent completed periods only (up to six
//! cycle-length samples), so older history stops influencing the result once
//! enough new cycles are logged:
//! - Rounded mean cycle and period length over the recency window
//! - Confidence from sample count and variation
//! - Irregularity flag and ordered advisory warnings

use crate::stats;
use crate::{
    Confidence, CycleData, PeriodRecord, PredictionResult, PredictionWindow, DEFAULT_CYCLE_LENGTH,
};
use chrono::NaiveDate;

/// Most cycle-length samples a forecast will use
pub const MAX_RECENT_CYCLES: usize = 6;

/// Days from ovulation to the start of the next period
pub const LUTEAL_PHASE_DAYS: i64 = 14;

/// Deviation (days) beyond which a cycle counts as irregular
pub const IRREGULARITY_THRESHOLD_DAYS: f64 = 7.0;

/// Clinically typical cycle length range, inclusive
pub const NORMAL_CYCLE_RANGE: (u32, u32) = (21, 35);

/// Clinically typical period length range, inclusive
pub const NORMAL_PERIOD_RANGE: (u32, u32) = (2, 7);

/// Days either side of the expected ovulation day counted as ovulation phase
const OVULATION_PHASE_MARGIN_DAYS: i64 = 2;

const FEW_CYCLES_WARNING: &str =
    "Fewer than 3 cycles logged; predictions will become more accurate as you keep tracking.";
const IRREGULAR_WARNING: &str =
    "Your cycles vary considerably. Consider discussing this with a healthcare provider.";

/// Forecast the next period from the record set
///
/// Returns `None` when no completed period exists, or when a forecast date
/// would fall outside the representable calendar.
pub fn predict_next_period(periods: &[PeriodRecord]) -> Option<PredictionResult> {
    let completed = stats::completed_periods(periods);
    let last_period = *completed.last()?;

    let cycles_to_use = completed
        .len()
        .saturating_sub(1)
        .clamp(1, MAX_RECENT_CYCLES);
    let recent_start = completed.len().saturating_sub(cycles_to_use + 1);
    let recent = &completed[recent_start..];

    let cycle_lengths = stats::cycle_lengths(recent);
    let cycle_mean = stats::mean(&cycle_lengths);
    let average_cycle_length = cycle_mean
        .map(stats::round_whole)
        .unwrap_or(DEFAULT_CYCLE_LENGTH as i64);
    let average_period_length = stats::mean(&stats::period_lengths(recent))
        .map(stats::round_whole)
        .unwrap_or(crate::DEFAULT_PERIOD_LENGTH as i64);

    let variation = stats::round_one_decimal(stats::population_std_dev(&cycle_lengths));
    let confidence = confidence_for(cycle_lengths.len(), variation);

    let has_outlier = cycle_mean
        .map(|m| stats::count_deviating(&cycle_lengths, m, IRREGULARITY_THRESHOLD_DAYS) > 0)
        .unwrap_or(false);
    let is_irregular = variation > IRREGULARITY_THRESHOLD_DAYS || has_outlier;

    let warnings = build_warnings(
        cycle_lengths.len(),
        is_irregular,
        average_cycle_length,
        average_period_length,
    );

    let half_width = match confidence {
        Confidence::High => 3,
        Confidence::Moderate | Confidence::Low => 4,
    };

    let Some(start_date) = stats::offset_date(last_period.start_date, average_cycle_length) else {
        tracing::warn!(
            "Forecast start {} days after {} is out of the calendar range",
            average_cycle_length,
            last_period.start_date
        );
        return None;
    };
    let end_date = stats::offset_date(start_date, (average_period_length - 1).max(0))?;
    let ovulation_date = stats::offset_date(start_date, -LUTEAL_PHASE_DAYS)?;
    let prediction_window = PredictionWindow {
        earliest_start: stats::offset_date(start_date, -half_width)?,
        latest_start: stats::offset_date(start_date, half_width)?,
    };

    tracing::debug!(
        "Predicted next period {} ({} samples, variation {}, {:?} confidence)",
        start_date,
        cycle_lengths.len(),
        variation,
        confidence
    );

    Some(PredictionResult {
        start_date,
        end_date,
        ovulation_date,
        confidence,
        prediction_window,
        is_irregular,
        cycles_used: cycle_lengths.len(),
        variation,
        warnings,
    })
}

/// Confidence level for a sample count and (rounded) variation
pub fn confidence_for(samples: usize, variation: f64) -> Confidence {
    if samples >= 3 && variation <= 3.0 {
        Confidence::High
    } else if samples >= 2 && variation <= 5.0 {
        Confidence::Moderate
    } else {
        Confidence::Low
    }
}

fn outside(value: i64, (low, high): (u32, u32)) -> bool {
    value < low as i64 || value > high as i64
}

fn build_warnings(
    samples: usize,
    is_irregular: bool,
    average_cycle_length: i64,
    average_period_length: i64,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if samples < 3 {
        warnings.push(FEW_CYCLES_WARNING.to_string());
    }
    if is_irregular {
        warnings.push(IRREGULAR_WARNING.to_string());
    }
    if outside(average_cycle_length, NORMAL_CYCLE_RANGE) {
        warnings.push(format!(
            "Your average cycle of {} days is outside the typical {}-{} day range.",
            average_cycle_length, NORMAL_CYCLE_RANGE.0, NORMAL_CYCLE_RANGE.1
        ));
    }
    if outside(average_period_length, NORMAL_PERIOD_RANGE) {
        warnings.push(format!(
            "Your average period of {} days is outside the typical {}-{} day range.",
            average_period_length, NORMAL_PERIOD_RANGE.0, NORMAL_PERIOD_RANGE.1
        ));
    }

    warnings
}

/// True if `date` is within two days of the expected ovulation day
///
/// The expected day is `average_cycle_length - 14` days after the start of
/// the most recent completed period, using the stored average.
pub fn is_ovulation_phase(data: &CycleData, date: NaiveDate) -> bool {
    let Some(last_period) = data.last_completed_period() else {
        return false;
    };

    let days_since_start = (date - last_period.start_date).num_days();
    let expected_ovulation = data.average_cycle_length as i64 - LUTEAL_PHASE_DAYS;

    (days_since_start - expected_ovulation).abs() <= OVULATION_PHASE_MARGIN_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_support::*;
    use chrono::Duration;

    #[test]
    fn test_no_periods_no_prediction() {
        assert!(predict_next_period(&[]).is_none());
    }

    #[test]
    fn test_open_or_invalid_periods_only_no_prediction() {
        let periods = vec![open_period("2024-01-01"), period("2024-02-10", "2024-02-01")];
        assert!(predict_next_period(&periods).is_none());
    }

    #[test]
    fn test_single_period_uses_defaults() {
        let periods = vec![period("2024-01-01", "2024-01-05")];
        let prediction = predict_next_period(&periods).unwrap();

        assert_eq!(prediction.start_date, date("2024-01-29"));
        assert_eq!(prediction.end_date, date("2024-02-02"));
        assert_eq!(prediction.ovulation_date, date("2024-01-15"));
        assert_eq!(prediction.confidence, Confidence::Low);
        assert_eq!(prediction.cycles_used, 0);
        assert_eq!(prediction.variation, 0.0);
        assert!(!prediction.is_irregular);
        assert_eq!(prediction.warnings, vec![FEW_CYCLES_WARNING.to_string()]);
        assert_eq!(prediction.prediction_window.earliest_start, date("2024-01-25"));
        assert_eq!(prediction.prediction_window.latest_start, date("2024-02-02"));
    }

    #[test]
    fn test_three_periods_two_samples() {
        let periods = vec![
            period("2024-01-01", "2024-01-05"),
            period("2024-01-29", "2024-02-02"),
            period("2024-02-27", "2024-03-02"),
        ];
        let prediction = predict_next_period(&periods).unwrap();

        // 28.5 rounds up
        assert_eq!(prediction.start_date, date("2024-02-27") + Duration::days(29));
        assert_eq!(prediction.cycles_used, 2);
        assert_eq!(prediction.variation, 0.5);
        assert_eq!(prediction.confidence, Confidence::Moderate);
        assert!(!prediction.is_irregular);
        assert_eq!(prediction.warnings, vec![FEW_CYCLES_WARNING.to_string()]);
    }

    #[test]
    fn test_steady_history_is_high_confidence() {
        let periods = periods_with_gaps("2024-01-01", &[28, 29, 28, 27], 5);
        let prediction = predict_next_period(&periods).unwrap();

        assert_eq!(prediction.confidence, Confidence::High);
        assert!(prediction.warnings.is_empty());
        let half_width = (prediction.prediction_window.latest_start - prediction.start_date).num_days();
        assert_eq!(half_width, 3);
    }

    #[test]
    fn test_recency_window_ignores_old_history() {
        // Two very long early cycles, then six regular ones
        let periods = periods_with_gaps("2023-01-01", &[60, 60, 28, 28, 28, 28, 28, 28], 5);
        let prediction = predict_next_period(&periods).unwrap();

        assert_eq!(prediction.cycles_used, MAX_RECENT_CYCLES);
        assert_eq!(prediction.variation, 0.0);
        assert_eq!(prediction.confidence, Confidence::High);
        let last_start = periods.last().unwrap().start_date;
        assert_eq!(prediction.start_date, last_start + Duration::days(28));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut periods = periods_with_gaps("2024-01-01", &[30, 30, 30], 4);
        periods.reverse();
        let prediction = predict_next_period(&periods).unwrap();
        assert_eq!(prediction.start_date, date("2024-03-31") + Duration::days(30));
    }

    #[test]
    fn test_outlier_marks_irregular() {
        let periods = periods_with_gaps("2024-01-01", &[28, 28, 28, 45], 5);
        let prediction = predict_next_period(&periods).unwrap();

        assert!(prediction.is_irregular);
        assert_eq!(prediction.confidence, Confidence::Low);
        assert!(prediction.warnings.contains(&IRREGULAR_WARNING.to_string()));
    }

    #[test]
    fn test_warning_order_for_out_of_range_values() {
        let periods = periods_with_gaps("2024-01-01", &[40], 9);
        let prediction = predict_next_period(&periods).unwrap();

        assert_eq!(prediction.warnings.len(), 3);
        assert_eq!(prediction.warnings[0], FEW_CYCLES_WARNING);
        assert!(prediction.warnings[1].contains("cycle of 40 days"));
        assert!(prediction.warnings[2].contains("period of 9 days"));
    }

    #[test]
    fn test_prediction_is_idempotent() {
        let periods = periods_with_gaps("2024-01-01", &[27, 31, 29], 5);
        assert_eq!(predict_next_period(&periods), predict_next_period(&periods));
    }

    #[test]
    fn test_outlier_increases_variation() {
        let mut periods = periods_with_gaps("2024-01-01", &[28, 29, 28], 5);
        let before = predict_next_period(&periods).unwrap().variation;

        let last = periods.last().unwrap().start_date;
        let start = last + Duration::days(55);
        periods.push(crate::PeriodRecord::completed(start, start + Duration::days(4)));
        let after = predict_next_period(&periods).unwrap().variation;

        assert!(after > before);
    }

    #[test]
    fn test_forecast_past_calendar_end_is_none() {
        let start = NaiveDate::MAX - Duration::days(10);
        let periods = vec![crate::PeriodRecord::completed(start, start + Duration::days(4))];
        assert!(predict_next_period(&periods).is_none());
    }

    #[test]
    fn test_forecast_near_calendar_start() {
        let start = NaiveDate::MIN;
        let periods = vec![crate::PeriodRecord::completed(start, start + Duration::days(4))];
        // Every derived date still lands after the first representable day
        assert!(predict_next_period(&periods).is_some());
    }

    #[test]
    fn test_confidence_ordering() {
        assert_eq!(confidence_for(0, 0.0), Confidence::Low);
        assert_eq!(confidence_for(2, 5.0), Confidence::Moderate);
        assert_eq!(confidence_for(2, 5.1), Confidence::Low);
        assert_eq!(confidence_for(3, 3.0), Confidence::High);
        assert_eq!(confidence_for(3, 3.1), Confidence::Moderate);
        assert!(confidence_for(5, 1.0) >= confidence_for(2, 4.0));
    }

    #[test]
    fn test_ovulation_phase_window() {
        let data = CycleData::from_periods(periods_with_gaps("2024-01-01", &[30], 5));
        // Last start 2024-01-31, average 30, expected ovulation on day 16
        assert!(is_ovulation_phase(&data, date("2024-02-16")));
        assert!(is_ovulation_phase(&data, date("2024-02-14")));
        assert!(is_ovulation_phase(&data, date("2024-02-18")));
        assert!(!is_ovulation_phase(&data, date("2024-02-13")));
        assert!(!is_ovulation_phase(&data, date("2024-02-19")));
    }

    #[test]
    fn test_ovulation_phase_without_history() {
        assert!(!is_ovulation_phase(&CycleData::default(), date("2024-01-14")));
    }
}
