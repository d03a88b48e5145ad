use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Milliseconds per day
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Server-local calendar day for a millisecond timestamp, as `YYYY-MM-DD`.
///
/// Visits are keyed by this value, so two instants on either side of local
/// midnight always land on different days.
pub fn local_day(millis: i64) -> String {
    local_datetime(millis).date_naive().format("%Y-%m-%d").to_string()
}

/// Millisecond timestamp to a server-local datetime (falls back to now on overflow).
pub fn local_datetime(millis: i64) -> DateTime<Local> {
    match Local.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earliest, _) => earliest,
        chrono::LocalResult::None => Local::now(),
    }
}

/// Local midnight of a calendar day as epoch millis.
pub fn start_of_local_day(day: NaiveDate) -> i64 {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => dt.timestamp_millis(),
        chrono::LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        // DST gap at midnight: use the UTC interpretation
        chrono::LocalResult::None => midnight.and_utc().timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_fit_js_numbers() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn local_day_splits_at_midnight() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let midnight = start_of_local_day(day);
        let before = midnight - 60_000;
        let after = midnight + 60_000;
        assert_eq!(local_day(after), "2025-03-14");
        assert_eq!(local_day(before), "2025-03-13");
    }
}
