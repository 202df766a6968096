//! Timezone Offsets
//!
//! Derives the current UTC offset of an IANA timezone name from the
//! compiled-in tz database.

use crate::domain::error::UpstreamError;
use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// UTC offset of `timezone` right now, in minutes.
pub fn utc_offset_minutes(timezone: &str) -> Result<i32, UpstreamError> {
    utc_offset_minutes_at(timezone, Utc::now())
}

/// UTC offset of `timezone` at the instant `at`, in minutes.
///
/// Unknown names are an error rather than a zero offset.
pub fn utc_offset_minutes_at(timezone: &str, at: DateTime<Utc>) -> Result<i32, UpstreamError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| UpstreamError::UnknownTimezone(timezone.to_string()))?;

    let seconds = tz
        .offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc();

    Ok(seconds / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winter() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn summer() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_fixed_offset_zones() {
        let tests = vec![
            ("Australia/Brisbane", 600),
            ("Asia/Tokyo", 540),
            ("Asia/Kolkata", 330),
            ("Asia/Kathmandu", 345),
            ("UTC", 0),
        ];

        for (tz, expected) in tests {
            assert_eq!(
                utc_offset_minutes_at(tz, winter()).unwrap(),
                expected,
                "Failed for timezone: {}",
                tz
            );
        }
    }

    #[test]
    fn test_negative_offsets() {
        assert_eq!(utc_offset_minutes_at("America/New_York", winter()).unwrap(), -300);
        assert_eq!(utc_offset_minutes_at("America/St_Johns", winter()).unwrap(), -210);
    }

    #[test]
    fn test_daylight_saving_is_applied_at_instant() {
        assert_eq!(utc_offset_minutes_at("America/New_York", summer()).unwrap(), -240);
        assert_eq!(utc_offset_minutes_at("Australia/Sydney", winter()).unwrap(), 660);
        assert_eq!(utc_offset_minutes_at("Australia/Sydney", summer()).unwrap(), 600);
    }

    #[test]
    fn test_unknown_timezone_is_error() {
        let result = utc_offset_minutes_at("Mars/Olympus_Mons", winter());
        assert_eq!(
            result,
            Err(UpstreamError::UnknownTimezone("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn test_empty_timezone_is_error() {
        assert!(utc_offset_minutes("").is_err());
    }

    #[test]
    fn test_current_offset_resolves() {
        assert_eq!(utc_offset_minutes("Asia/Tokyo").unwrap(), 540);
    }
}
