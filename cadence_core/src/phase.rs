//! Cycle day and phase for a calendar date.
//!
//! Days are counted from the start of the most recent completed period. The
//! phase boundaries scale with the stored average cycle length:
//! menstrual for the first five days after the start, follicular up to half
//! the cycle, ovulatory for two more days, then luteal.

use crate::{CycleData, CyclePhase, PhaseInfo};
use chrono::NaiveDate;

/// Days after the period start still counted as menstrual
const MENSTRUAL_PHASE_DAYS: i64 = 5;

/// Days past mid-cycle counted as ovulatory
const OVULATORY_PHASE_DAYS: i64 = 2;

/// Cycle day and phase of `date`
///
/// `None` without a completed period, or for dates before its start.
pub fn current_phase(data: &CycleData, date: NaiveDate) -> Option<PhaseInfo> {
    let last_period = data.last_completed_period()?;
    let days_since_start = (date - last_period.start_date).num_days();
    if days_since_start < 0 {
        tracing::debug!(
            "{} precedes the last completed period start {}",
            date,
            last_period.start_date
        );
        return None;
    }

    // Compare doubled values so odd averages split at the half day
    let cycle_length = data.average_cycle_length as i64;
    let phase = if days_since_start <= MENSTRUAL_PHASE_DAYS {
        CyclePhase::Menstrual
    } else if days_since_start * 2 <= cycle_length {
        CyclePhase::Follicular
    } else if days_since_start * 2 <= cycle_length + 2 * OVULATORY_PHASE_DAYS {
        CyclePhase::Ovulatory
    } else {
        CyclePhase::Luteal
    };

    Some(PhaseInfo {
        cycle_day: u32::try_from(days_since_start + 1).unwrap_or(u32::MAX),
        phase,
    })
}
