//! Timestamp utilities
//!
//! All persisted timestamps are RFC 3339 UTC strings with microsecond
//! precision. Lexicographic order on the stored strings equals chronological
//! order, which duplicate-tier assignment depends on.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC timestamp in the canonical storage format
pub fn now_rfc3339() -> String {
    to_rfc3339(now())
}

/// Render a timestamp in the canonical storage format
pub fn to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Timestamp `days` days from now, canonical storage format
pub fn days_from_now_rfc3339(days: i64) -> String {
    to_rfc3339(now() + Duration::days(days))
}

/// Timestamp `seconds` seconds from now, canonical storage format
pub fn seconds_from_now_rfc3339(seconds: i64) -> String {
    to_rfc3339(now() + Duration::seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_format_is_sortable() {
        let earlier = to_rfc3339(now());
        let later = to_rfc3339(now() + Duration::microseconds(1));
        // String comparison must agree with chronological comparison
        assert!(earlier < later);
    }

    #[test]
    fn canonical_format_round_trips() {
        let ts = now();
        let s = to_rfc3339(ts);
        let parsed: DateTime<Utc> = s.parse().expect("canonical format parses back");
        assert_eq!(parsed, ts);
    }

    #[test]
    fn days_from_now_is_in_the_future() {
        let s = days_from_now_rfc3339(30);
        assert!(s > now_rfc3339());
    }
}
