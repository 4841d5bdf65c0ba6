// libs/scheduling-cell/src/time.rs
//
// Pure interval arithmetic for slot computation. Everything operates on
// offset-aware instants; naive timestamps are rejected at the parsing
// boundary and never reach these functions.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::models::SchedulingError;

/// Half-open interval overlap: `[a_start, a_end)` intersects `[b_start, b_end)`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Whether `point` falls inside the half-open interval `[start, end)`.
pub fn contains(start: DateTime<Utc>, end: DateTime<Utc>, point: DateTime<Utc>) -> bool {
    start <= point && point < end
}

/// Clamp `[start, end)` to `[bounds_start, bounds_end)`. Returns `None`
/// when the intersection is empty.
pub fn clamp(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    bounds_start: DateTime<Utc>,
    bounds_end: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let clamped_start = start.max(bounds_start);
    let clamped_end = end.min(bounds_end);
    if clamped_start < clamped_end {
        Some((clamped_start, clamped_end))
    } else {
        None
    }
}

/// Round `instant` up to the next multiple of `step_minutes` on the epoch
/// timeline (14:07 -> 14:30 for a 30-minute step). An instant already on a
/// boundary is returned unchanged. Offset-independent for step sizes that
/// divide one hour, which is all the service accepts.
pub fn round_up_to_step(instant: DateTime<Utc>, step_minutes: u32) -> DateTime<Utc> {
    let step_secs = i64::from(step_minutes) * 60;
    let mut ts = instant.timestamp();
    if instant.timestamp_subsec_nanos() > 0 {
        ts += 1;
    }
    let rem = ts.rem_euclid(step_secs);
    let rounded = if rem == 0 { ts } else { ts - rem + step_secs };
    DateTime::from_timestamp(rounded, 0).unwrap()
}

/// Parse an RFC 3339 timestamp that must carry an explicit UTC offset.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, SchedulingError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| SchedulingError::InvalidTimeZone(raw.to_string()))
}

/// Start and end instants of a calendar day in the given reference offset,
/// as a half-open UTC interval.
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap();
    // Fixed offsets have no DST gaps, so local midnight is always unambiguous.
    let start = offset
        .from_local_datetime(&midnight)
        .unwrap()
        .with_timezone(&Utc);
    (start, start + Duration::days(1))
}

pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, SchedulingError> {
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| SchedulingError::InvalidTimeZone(format!("offset {} minutes", minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        parse_instant(s).unwrap()
    }

    #[test]
    fn overlap_is_half_open() {
        let a = utc("2025-05-10T09:00:00Z");
        let b = utc("2025-05-10T10:00:00Z");
        let c = utc("2025-05-10T11:00:00Z");
        assert!(overlaps(a, c, b, c));
        // Touching intervals do not overlap
        assert!(!overlaps(a, b, b, c));
    }

    #[test]
    fn contains_excludes_end() {
        let start = utc("2025-05-10T09:00:00Z");
        let end = utc("2025-05-10T10:00:00Z");
        assert!(contains(start, end, start));
        assert!(!contains(start, end, end));
    }

    #[test]
    fn clamp_truncates_and_rejects_disjoint() {
        let day_start = utc("2025-05-10T00:00:00Z");
        let day_end = utc("2025-05-11T00:00:00Z");
        let (s, e) = clamp(
            utc("2025-05-09T22:00:00Z"),
            utc("2025-05-10T02:00:00Z"),
            day_start,
            day_end,
        )
        .unwrap();
        assert_eq!(s, day_start);
        assert_eq!(e, utc("2025-05-10T02:00:00Z"));

        assert!(clamp(
            utc("2025-05-09T08:00:00Z"),
            utc("2025-05-09T10:00:00Z"),
            day_start,
            day_end
        )
        .is_none());
    }

    #[test]
    fn rounds_up_to_next_slot_boundary() {
        assert_eq!(
            round_up_to_step(utc("2025-05-10T14:07:00Z"), 30),
            utc("2025-05-10T14:30:00Z")
        );
        assert_eq!(
            round_up_to_step(utc("2025-05-10T14:30:00Z"), 30),
            utc("2025-05-10T14:30:00Z")
        );
        assert_eq!(
            round_up_to_step(utc("2025-05-10T14:31:00Z"), 15),
            utc("2025-05-10T14:45:00Z")
        );
    }

    #[test]
    fn rounding_respects_nonzero_offsets() {
        // 14:07 +07:00 rounds to 14:30 +07:00, never 14:00 or 14:07
        let rounded = round_up_to_step(utc("2025-05-10T14:07:00+07:00"), 30);
        assert_eq!(rounded, utc("2025-05-10T14:30:00+07:00"));
    }

    #[test]
    fn naive_timestamps_are_rejected() {
        assert_eq!(
            parse_instant("2025-05-10T09:30:00"),
            Err(SchedulingError::InvalidTimeZone(
                "2025-05-10T09:30:00".to_string()
            ))
        );
        assert!(parse_instant("2025-05-10T09:30:00+07:00").is_ok());
        assert!(parse_instant("2025-05-10T09:30:00Z").is_ok());
    }

    #[test]
    fn day_bounds_follow_reference_offset() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let bangkok = offset_from_minutes(7 * 60).unwrap();
        let (start, end) = day_bounds(date, bangkok);
        assert_eq!(start, utc("2025-05-10T00:00:00+07:00"));
        assert_eq!(end, utc("2025-05-11T00:00:00+07:00"));
        assert_eq!(start, utc("2025-05-09T17:00:00Z"));
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        assert!(offset_from_minutes(25 * 60).is_err());
        assert!(offset_from_minutes(-7 * 60).is_ok());
    }
}
