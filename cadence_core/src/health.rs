//! Cycle health classification over the full logged history.
//!
//! Unlike the prediction engine this looks at every completed period, and
//! grades the pattern as healthy, irregular or concerning. The output is
//! informational only.

use crate::prediction::{IRREGULARITY_THRESHOLD_DAYS, NORMAL_CYCLE_RANGE, NORMAL_PERIOD_RANGE};
use crate::stats;
use crate::{HealthAnalysis, HealthDetails, HealthStatus, PeriodRecord, Severity};

/// Completed periods needed before any classification is attempted
pub const MIN_PERIODS_FOR_ANALYSIS: usize = 3;

/// Average cycle lengths outside this range are concerning
const CONCERNING_CYCLE_RANGE: (f64, f64) = (21.0, 45.0);

/// Standard deviation above which variability is concerning
const CONCERNING_STD_DEV: f64 = 10.0;

/// Classify cycle health from the record set
pub fn analyze_cycle_health(periods: &[PeriodRecord]) -> HealthAnalysis {
    let completed = stats::completed_periods(periods);
    if completed.len() < MIN_PERIODS_FOR_ANALYSIS {
        tracing::debug!(
            "Health analysis needs {} completed periods, have {}",
            MIN_PERIODS_FOR_ANALYSIS,
            completed.len()
        );
        return insufficient_data(completed.len());
    }

    let cycle_lengths = stats::cycle_lengths(&completed);
    let raw_mean = stats::mean(&cycle_lengths).unwrap_or(0.0);
    let average = stats::round_one_decimal(raw_mean);
    let std_dev = stats::round_one_decimal(stats::population_std_dev(&cycle_lengths));
    let irregularity_count =
        stats::count_deviating(&cycle_lengths, raw_mean, IRREGULARITY_THRESHOLD_DAYS);
    let long_periods = stats::period_lengths(&completed)
        .into_iter()
        .filter(|&days| days > NORMAL_PERIOD_RANGE.1 as i64)
        .count();

    let (normal_low, normal_high) = (NORMAL_CYCLE_RANGE.0 as f64, NORMAL_CYCLE_RANGE.1 as f64);
    let outside_normal = average < normal_low || average > normal_high;
    let majority_irregular = irregularity_count * 2 >= cycle_lengths.len();

    let (status, severity, message, mut recommendations) =
        if average < CONCERNING_CYCLE_RANGE.0 || average > CONCERNING_CYCLE_RANGE.1 {
            (
                HealthStatus::Concerning,
                Severity::High,
                "Your average cycle length is significantly outside the normal range.",
                vec![
                    "Please consult a healthcare provider promptly to discuss your cycle length.",
                ],
            )
        } else if std_dev > CONCERNING_STD_DEV {
            (
                HealthStatus::Concerning,
                Severity::Medium,
                "Your cycles show high variability from month to month.",
                vec![
                    "Consider consulting a healthcare provider about your cycle variability.",
                    "Track lifestyle factors such as stress, sleep, diet and exercise that may affect your cycle.",
                ],
            )
        } else if outside_normal
            || std_dev > IRREGULARITY_THRESHOLD_DAYS
            || majority_irregular
            || long_periods > 0
        {
            (
                HealthStatus::Irregular,
                Severity::Medium,
                "Your cycles show some irregularity.",
                vec![
                    "Continue tracking your cycles to monitor how the pattern develops.",
                    "Mention persistent changes to your healthcare provider at your next visit.",
                ],
            )
        } else {
            (
                HealthStatus::Healthy,
                Severity::Low,
                "Your cycles appear regular and within the normal range.",
                vec!["Keep tracking to maintain an accurate picture of your cycle."],
            )
        };

    if long_periods > 0 {
        recommendations.push(
            "Periods lasting longer than 7 days should be discussed with a healthcare provider.",
        );
    }
    if average < normal_low {
        recommendations.push(
            "Short cycles may indicate hormonal issues; a healthcare provider can help identify the cause.",
        );
    } else if average > normal_high {
        recommendations.push(
            "Long cycles may indicate PCOS or other conditions; consider getting checked by a healthcare provider.",
        );
    }

    tracing::debug!(
        "Cycle health {} (average {}, std-dev {}, {} irregular of {})",
        status,
        average,
        std_dev,
        irregularity_count,
        cycle_lengths.len()
    );

    HealthAnalysis {
        status,
        severity,
        message: message.to_string(),
        details: HealthDetails {
            average_cycle_length: average,
            standard_deviation: std_dev,
            total_cycles: cycle_lengths.len(),
            cycle_lengths,
            irregularity_count,
        },
        recommendations: recommendations.into_iter().map(String::from).collect(),
    }
}

fn insufficient_data(completed: usize) -> HealthAnalysis {
    HealthAnalysis {
        status: HealthStatus::InsufficientData,
        severity: Severity::Low,
        message: format!(
            "Log at least {} complete periods to receive a health analysis ({} so far).",
            MIN_PERIODS_FOR_ANALYSIS, completed
        ),
        details: HealthDetails::default(),
        recommendations: vec![
            "Keep logging the start and end of each period to unlock cycle health insights."
                .to_string(),
        ],
    }
}
