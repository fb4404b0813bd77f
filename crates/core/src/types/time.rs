//! Timestamp normalization.
//!
//! Webhook payloads deliver `created_at` in three forms: absent, an RFC-3339
//! string (Shopify includes a UTC offset), or an already-parsed instant. All
//! of them are normalized to a timezone-naive UTC [`NaiveDateTime`] before
//! storage, so the database column carries exactly one convention.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Convert an offset-aware instant to a timezone-naive UTC instant.
#[must_use]
pub fn to_naive_utc(dt: DateTime<FixedOffset>) -> NaiveDateTime {
    dt.with_timezone(&Utc).naive_utc()
}

/// Normalize a raw `created_at` value from a webhook payload.
///
/// Absent or unparsable input defaults to the current instant. Strings
/// without an offset are taken as already being UTC.
#[must_use]
pub fn normalize_created_at(raw: Option<&str>) -> NaiveDateTime {
    let Some(raw) = raw else {
        return Utc::now().naive_utc();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return to_naive_utc(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return dt;
    }

    Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .expect("valid date")
            .and_hms_opt(h, mi, s)
            .expect("valid time")
    }

    #[test]
    fn test_rfc3339_with_offset_converts_to_utc() {
        // 10:00 at -05:00 is 15:00 UTC.
        let got = normalize_created_at(Some("2024-03-01T10:00:00-05:00"));
        assert_eq!(got, naive(2024, 3, 1, 15, 0, 0));
    }

    #[test]
    fn test_rfc3339_utc_round_trips() {
        let got = normalize_created_at(Some("2024-03-01T10:00:00Z"));
        assert_eq!(got, naive(2024, 3, 1, 10, 0, 0));
    }

    #[test]
    fn test_naive_string_taken_as_utc() {
        let got = normalize_created_at(Some("2024-03-01T10:00:00"));
        assert_eq!(got, naive(2024, 3, 1, 10, 0, 0));
    }

    #[test]
    fn test_space_separated_string() {
        let got = normalize_created_at(Some("2024-03-01 10:00:00"));
        assert_eq!(got, naive(2024, 3, 1, 10, 0, 0));
    }

    #[test]
    fn test_absent_defaults_to_now() {
        let before = Utc::now().naive_utc();
        let got = normalize_created_at(None);
        let after = Utc::now().naive_utc();
        assert!(got >= before && got <= after);
    }

    #[test]
    fn test_unparsable_defaults_to_now() {
        let before = Utc::now().naive_utc();
        let got = normalize_created_at(Some("not a timestamp"));
        let after = Utc::now().naive_utc();
        assert!(got >= before && got <= after);
    }

    #[test]
    fn test_to_naive_utc_drops_offset() {
        let dt = DateTime::parse_from_rfc3339("2024-06-15T23:30:00+02:00").expect("parse");
        assert_eq!(to_naive_utc(dt), naive(2024, 6, 15, 21, 30, 0));
    }
}
