//! Period resolution and gating.

use chrono::{DateTime, Months, Utc};

use crate::error::{PeriodError, PeriodResult};
use crate::models::{Period, PeriodStatus, PeriodSummary};

/// Periods older than this many months get a staleness warning.
const STALE_AFTER_MONTHS: u32 = 12;

/// Resolve an optional `YYYY-MM` label, defaulting to the month containing `now`.
pub fn resolve_period(label: Option<&str>, now: DateTime<Utc>) -> PeriodResult<Period> {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => Period::parse(label),
        None => Ok(Period::containing(now)),
    }
}

/// Decide whether a calculation may run for `period`.
///
/// Future periods are rejected. Active and stale periods pass with a
/// warning each.
pub fn validate_period(period: &Period, now: DateTime<Utc>) -> PeriodResult<Vec<String>> {
    let mut warnings = Vec::new();

    match period.status(now) {
        PeriodStatus::Future => return Err(PeriodError::FuturePeriod(period.label())),
        PeriodStatus::Active => warnings.push(format!(
            "Period {} is still in progress; figures will change until {}",
            period.label(),
            period.end_date().format("%Y-%m-%d")
        )),
        PeriodStatus::Complete => {}
    }

    let stale_cutoff = now
        .checked_sub_months(Months::new(STALE_AFTER_MONTHS))
        .unwrap_or(now);
    if period.end_date() < stale_cutoff {
        warnings.push(format!(
            "Period {} ended more than a year ago; chain history may be pruned",
            period.label()
        ));
    }

    Ok(warnings)
}

/// Build the report's period metadata.
pub fn summarize(period: &Period, now: DateTime<Utc>, warnings: Vec<String>) -> PeriodSummary {
    let status = period.status(now);
    let days_total = period.days();

    let (progress_percent, days_elapsed) = match status {
        PeriodStatus::Future => (0.0, 0),
        PeriodStatus::Complete => (100.0, days_total),
        PeriodStatus::Active => {
            let start = period.start_date();
            let total = (period.end_date() - start).num_seconds() + 1;
            let elapsed = (now - start).num_seconds();
            let percent = (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0);
            // Rounded to one decimal for display.
            ((percent * 10.0).round() / 10.0, (now - start).num_days() + 1)
        }
    };

    PeriodSummary {
        period: period.label(),
        display_name: period.display_name(),
        status,
        start_date: period.start_date(),
        end_date: period.end_date(),
        progress_percent,
        days_total,
        days_elapsed,
        warnings,
    }
}
