//! Cycle statistics shared by the record store, prediction engine and
//! health classifier.
//!
//! Every mean, standard deviation and rounding step in the crate goes through
//! this module so the derived numbers agree wherever they are shown.
//!
//! Rounding is half away from zero (`f64::round`): 28.5 becomes 29.

use crate::{PeriodRecord, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH};
use chrono::{Duration, NaiveDate};

/// Completed periods (valid end date), sorted by start date ascending
///
/// Open periods and periods whose end precedes their start are dropped.
pub fn completed_periods(periods: &[PeriodRecord]) -> Vec<&PeriodRecord> {
    let mut completed: Vec<&PeriodRecord> = periods.iter().filter(|p| p.is_completed()).collect();
    completed.sort_by_key(|p| p.start_date);

    let skipped = periods
        .iter()
        .filter(|p| p.end_date.is_some() && !p.is_completed())
        .count();
    if skipped > 0 {
        tracing::debug!("Ignoring {} period(s) that end before they start", skipped);
    }

    completed
}

/// Days between the starts of each adjacent pair
///
/// `ascending` must already be sorted by start date.
pub fn cycle_lengths(ascending: &[&PeriodRecord]) -> Vec<i64> {
    ascending
        .windows(2)
        .map(|w| (w[1].start_date - w[0].start_date).num_days())
        .collect()
}

/// Inclusive durations of completed periods, in input order
pub fn period_lengths(periods: &[&PeriodRecord]) -> Vec<i64> {
    periods.iter().filter_map(|p| p.duration_days()).collect()
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
}

/// Population standard deviation; 0 with fewer than two samples
pub fn population_std_dev(values: &[i64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = values.iter().sum::<i64>() as f64 / values.len() as f64;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - avg).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Round to the nearest whole number, halves away from zero
pub fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

/// Round to one decimal place, halves away from zero
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Count samples further than `threshold` days from `center`
pub fn count_deviating(values: &[i64], center: f64, threshold: f64) -> usize {
    values
        .iter()
        .filter(|&&v| (v as f64 - center).abs() > threshold)
        .count()
}

/// Rounded mean as a day count, falling back to `default` when empty
/// `date` shifted by `days`, or `None` past either end of the calendar
pub fn offset_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

fn rounded_mean_or(values: &[i64], default: u32) -> u32 {
    mean(values)
        .map(|m| round_whole(m).max(0) as u32)
        .unwrap_or(default)
}

/// Average cycle and period length of a full record set
///
/// Returns `(average_cycle_length, average_period_length)`, each falling back
/// to its default when there is not enough completed data.
pub fn compute_averages(periods: &[PeriodRecord]) -> (u32, u32) {
    let completed = completed_periods(periods);
    let average_period_length = rounded_mean_or(&period_lengths(&completed), DEFAULT_PERIOD_LENGTH);
    let average_cycle_length = rounded_mean_or(&cycle_lengths(&completed), DEFAULT_CYCLE_LENGTH);
    (average_cycle_length, average_period_length)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::PeriodRecord;
    use chrono::NaiveDate;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn period(start: &str, end: &str) -> PeriodRecord {
        PeriodRecord::completed(date(start), date(end))
    }

    pub fn open_period(start: &str) -> PeriodRecord {
        PeriodRecord::new(date(start))
    }

    /// Completed periods of `duration` days starting at `first` and spaced by `gaps`
    pub fn periods_with_gaps(first: &str, gaps: &[i64], duration: i64) -> Vec<PeriodRecord> {
        let mut start = date(first);
        let mut periods = vec![PeriodRecord::completed(
            start,
            start + chrono::Duration::days(duration - 1),
        )];
        for gap in gaps {
            start += chrono::Duration::days(*gap);
            periods.push(PeriodRecord::completed(
                start,
                start + chrono::Duration::days(duration - 1),
            ));
        }
        periods
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_completed_periods_filters_and_sorts() {
        let periods = vec![
            period("2024-02-27", "2024-03-02"),
            open_period("2024-03-27"),
            period("2024-01-01", "2024-01-05"),
            period("2024-01-29", "2024-01-28"), // ends before it starts
        ];

        let completed = completed_periods(&periods);
        let starts: Vec<_> = completed.iter().map(|p| p.start_date).collect();
        assert_eq!(starts, vec![date("2024-01-01"), date("2024-02-27")]);
    }

    #[test]
    fn test_single_day_period_counts_as_completed() {
        let periods = vec![period("2024-01-01", "2024-01-01")];
        assert_eq!(period_lengths(&completed_periods(&periods)), vec![1]);
    }

    #[test]
    fn test_cycle_lengths_between_adjacent_starts() {
        let periods = periods_with_gaps("2024-01-01", &[28, 29], 5);
        let completed = completed_periods(&periods);
        assert_eq!(cycle_lengths(&completed), vec![28, 29]);
    }

    #[test]
    fn test_mean_and_std_dev_guard_empty_input() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[30]), 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        assert!((population_std_dev(&[28, 29]) - 0.5).abs() < 1e-9);
        assert!((population_std_dev(&[2, 4, 4, 4, 5, 5, 7, 9]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_halves_away_from_zero() {
        assert_eq!(round_whole(28.5), 29);
        assert_eq!(round_whole(4.5), 5);
        assert_eq!(round_whole(28.49), 28);
        assert_eq!(round_one_decimal(0.25), 0.3);
        assert_eq!(round_one_decimal(9.5262), 9.5);
    }

    #[test]
    fn test_count_deviating_is_strict() {
        assert_eq!(count_deviating(&[21, 28, 36, 35], 28.0, 7.0), 1);
    }

    #[test]
    fn test_compute_averages_defaults() {
        assert_eq!(compute_averages(&[]), (28, 5));

        let one = vec![period("2024-01-01", "2024-01-03")];
        assert_eq!(compute_averages(&one), (28, 3));

        let open_only = vec![open_period("2024-01-01")];
        assert_eq!(compute_averages(&open_only), (28, 5));
    }

    #[test]
    fn test_compute_averages_rounds_half_up() {
        // Cycle samples 28 and 29 average to 28.5
        let periods = periods_with_gaps("2024-01-01", &[28, 29], 5);
        assert_eq!(compute_averages(&periods), (29, 5));

        // Durations 4 and 5 average to 4.5
        let periods = vec![
            period("2024-01-01", "2024-01-04"),
            period("2024-01-29", "2024-02-02"),
        ];
        assert_eq!(compute_averages(&periods), (28, 5));
    }

    #[test]
    fn test_compute_averages_ignores_inverted_records() {
        let mut periods = periods_with_gaps("2024-01-01", &[30], 4);
        periods.push(period("2024-03-10", "2024-03-01"));
        assert_eq!(compute_averages(&periods), (30, 4));
    }

    #[test]
    fn test_offset_date_is_checked() {
        assert_eq!(offset_date(date("2024-02-27"), 3), Some(date("2024-03-01")));
        assert_eq!(offset_date(date("2024-01-15"), -14), Some(date("2024-01-01")));
        assert_eq!(offset_date(NaiveDate::MAX, 1), None);
        assert_eq!(offset_date(NaiveDate::MIN, -1), None);
        assert_eq!(offset_date(date("2024-01-01"), i64::MAX), None);
    }
}
