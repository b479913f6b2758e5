//! Scheduled lifecycle jobs
//!
//! Three background loops, all on the same pattern: compute the duration
//! until the next local-time trigger, sleep on a `tokio::select!` against
//! the shutdown token, run once, repeat. A failed run is logged and the
//! loop continues; it never takes the process down.

use chrono::{Datelike, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;

mod lifecycle_sweep;
mod monthly_reset;
mod payment_reminders;

pub use lifecycle_sweep::LifecycleSweepJob;
pub use monthly_reset::MonthlyResetJob;
pub use payment_reminders::PaymentReminderJob;

/// Result of one job run, persisted to the log stream
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Completed { detail: serde_json::Value },
    Failed { detail: String },
}

/// Duration until the next occurrence of `hour`:00 local time in `tz`.
///
/// If today's trigger already passed, targets tomorrow. Nonexistent local
/// times (DST spring-forward) fall back to one minute later.
pub(crate) fn next_daily_run(hour: u32, tz: Tz) -> std::time::Duration {
    let now = chrono::Utc::now().with_timezone(&tz);
    let target_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive();

    let target_date = if now.time() >= target_time {
        today + chrono::Duration::days(1)
    } else {
        today
    };

    resolve_local(target_date.and_time(target_time), tz, now)
}

/// Duration until 00:00 local time on the 1st of the next month
pub(crate) fn next_monthly_run(tz: Tz) -> std::time::Duration {
    let now = chrono::Utc::now().with_timezone(&tz);
    let today = now.date_naive();
    let first_of_next = today
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.with_day(1))
        .unwrap_or(today + chrono::Duration::days(1));

    resolve_local(first_of_next.and_time(NaiveTime::MIN), tz, now)
}

fn resolve_local(
    naive: chrono::NaiveDateTime,
    tz: Tz,
    now: chrono::DateTime<Tz>,
) -> std::time::Duration {
    let target = naive.and_local_timezone(tz).single().unwrap_or_else(|| {
        // DST edge case: fallback to +1 min
        (naive + chrono::Duration::minutes(1))
            .and_local_timezone(tz)
            .latest()
            .unwrap_or_else(|| {
                tracing::error!(
                    year = naive.year(),
                    "Cannot resolve local trigger time, using fallback"
                );
                now + chrono::Duration::hours(1)
            })
    });

    let duration = target.signed_duration_since(now);
    if duration.num_seconds() <= 0 {
        std::time::Duration::from_secs(60)
    } else {
        duration
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TZ: Tz = chrono_tz::America::Argentina::Buenos_Aires;

    #[test]
    fn next_daily_run_is_positive_and_within_a_day() {
        for hour in [0, 9, 23] {
            let d = next_daily_run(hour, TZ);
            assert!(d.as_secs() > 0);
            assert!(d.as_secs() <= 24 * 3600 + 60);
        }
    }

    #[test]
    fn next_monthly_run_is_positive_and_within_a_month() {
        let d = next_monthly_run(TZ);
        assert!(d.as_secs() > 0);
        assert!(d.as_secs() <= 32 * 24 * 3600);
    }

    #[test]
    fn invalid_hour_falls_back_to_midnight() {
        let d = next_daily_run(99, TZ);
        assert!(d.as_secs() > 0);
        assert!(d.as_secs() <= 24 * 3600 + 60);
    }
}
