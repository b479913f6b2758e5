/// One day in Unix epoch milliseconds.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Current UTC timestamp (milliseconds).
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Add `days` to an epoch-millis timestamp.
pub fn add_days(ts: i64, days: i64) -> i64 {
    ts + days * MILLIS_PER_DAY
}

/// Add calendar months to an epoch-millis timestamp.
///
/// Uses chrono month arithmetic (Jan 31 + 1 month = Feb 28/29). A timestamp
/// that cannot be represented falls back to the input value unchanged rather
/// than panicking.
pub fn add_months(ts: i64, months: u32) -> i64 {
    chrono::DateTime::from_timestamp_millis(ts)
        .and_then(|dt| dt.checked_add_months(chrono::Months::new(months)))
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_months_rolls_calendar_months() {
        // 2026-01-15 00:00:00 UTC
        let jan_15 = 1_768_435_200_000;
        let feb_15 = add_months(jan_15, 1);
        assert_eq!(feb_15 - jan_15, 31 * MILLIS_PER_DAY);
    }

    #[test]
    fn add_months_clamps_end_of_month() {
        // 2026-01-31 -> 2026-02-28 (2026 is not a leap year)
        let jan_31 = 1_769_817_600_000;
        let feb_28 = add_months(jan_31, 1);
        assert_eq!(feb_28 - jan_31, 28 * MILLIS_PER_DAY);
    }

    #[test]
    fn add_months_six_spans_half_year() {
        let jan_15 = 1_768_435_200_000;
        let jul_15 = add_months(jan_15, 6);
        // Jan..Jul 2026: 31+28+31+30+31+30 days
        assert_eq!(jul_15 - jan_15, 181 * MILLIS_PER_DAY);
    }
}
