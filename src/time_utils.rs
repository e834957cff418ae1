// SPDX-License-Identifier: MIT

//! Shared helpers for the service day boundary.
//!
//! All calendar dates in the API are computed in Indian Standard Time.
//! IST is a fixed UTC+05:30 offset with no daylight saving, so a
//! `FixedOffset` is exact.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECONDS).expect("valid IST offset")
}

/// Today's date in IST as a `YYYY-MM-DD` string.
pub fn today_ist() -> String {
    date_ist(Utc::now())
}

/// The IST date `days_ago` days before today, as `YYYY-MM-DD`.
pub fn date_ist_days_ago(days_ago: i64) -> String {
    date_ist(Utc::now() - chrono::Duration::days(days_ago))
}

/// Format a UTC instant as an IST `YYYY-MM-DD` date string.
pub fn date_ist(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&ist()).format("%Y-%m-%d").to_string()
}

/// Current instant as RFC3339 with a `Z` suffix, for `createdAt`/`updatedAt`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ist_date_rolls_over_before_utc() {
        // 2024-06-01 20:00 UTC is already 2024-06-02 01:30 in IST
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        assert_eq!(date_ist(instant), "2024-06-02");
    }

    #[test]
    fn test_ist_date_before_rollover() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        assert_eq!(date_ist(instant), "2024-06-01");
    }

    #[test]
    fn test_days_ago_is_date_shaped() {
        let date = date_ist_days_ago(3);
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }
}
