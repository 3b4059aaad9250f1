//! Booking-slot series generation.
//!
//! Pure arithmetic over a date range: for every selected weekday between
//! `first_day` and `last_day` (both inclusive), emit slots of
//! `slot_minutes` starting at `day_start`, separated by `break_minutes`,
//! as long as the slot still ends at or before `day_end`.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::Deserialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Upper bound on the generated range, inclusive of both endpoints.
pub const MAX_SERIES_DAYS: i64 = 366;

/// Parameters for one generated series.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotSeriesSpec {
    /// First calendar day of the series.
    pub first_day: NaiveDate,
    /// Last calendar day of the series, inclusive.
    pub last_day: NaiveDate,
    /// Weekdays to generate slots on.
    pub weekdays: Vec<Weekday>,
    /// Earliest slot start within a day.
    pub day_start: NaiveTime,
    /// Latest permitted slot end within a day.
    pub day_end: NaiveTime,
    /// Slot length in minutes.
    pub slot_minutes: i64,
    /// Pause between consecutive slots in minutes.
    pub break_minutes: i64,
}

/// One slot produced by [`generate_series`], not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDraft {
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

/// Generate all slots described by `spec`, ordered by start time.
///
/// A slot is emitted only if it ends at or before `day_end`, so the last
/// slot of a day never crosses the closing time. The `last_day` boundary
/// is inclusive: a one-day range produces that day's slots.
pub fn generate_series(spec: &SlotSeriesSpec) -> Result<Vec<SlotDraft>, CoreError> {
    validate(spec)?;

    let slot_len = Duration::minutes(spec.slot_minutes);
    let step = Duration::minutes(spec.slot_minutes + spec.break_minutes);

    let mut slots = Vec::new();
    let mut day = spec.first_day;
    while day <= spec.last_day {
        if spec.weekdays.contains(&day.weekday()) {
            let mut start = day.and_time(spec.day_start);
            let close = day.and_time(spec.day_end);
            loop {
                let end = start + slot_len;
                if end > close {
                    break;
                }
                slots.push(SlotDraft {
                    starts_at: Utc.from_utc_datetime(&start),
                    ends_at: Utc.from_utc_datetime(&end),
                });
                start = start + step;
            }
        }
        day = day.succ_opt().ok_or_else(|| {
            CoreError::Internal("Date overflow while generating slot series".into())
        })?;
    }

    Ok(slots)
}

fn validate(spec: &SlotSeriesSpec) -> Result<(), CoreError> {
    if spec.last_day < spec.first_day {
        return Err(CoreError::Validation(
            "Series end day must not be before its first day".into(),
        ));
    }

    let span_days = (spec.last_day - spec.first_day).num_days() + 1;
    if span_days > MAX_SERIES_DAYS {
        return Err(CoreError::Validation(format!(
            "Series spans {span_days} days, maximum is {MAX_SERIES_DAYS}"
        )));
    }

    if spec.weekdays.is_empty() {
        return Err(CoreError::Validation(
            "Series must select at least one weekday".into(),
        ));
    }

    if spec.slot_minutes <= 0 {
        return Err(CoreError::Validation(
            "Slot duration must be positive".into(),
        ));
    }

    if spec.break_minutes < 0 {
        return Err(CoreError::Validation(
            "Break duration must not be negative".into(),
        ));
    }

    if spec.day_start >= spec.day_end {
        return Err(CoreError::Validation(
            "Day start must be before day end".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Mondays only, 09:00-12:00, 60-minute slots, no breaks.
    fn monday_spec() -> SlotSeriesSpec {
        SlotSeriesSpec {
            first_day: date(2025, 3, 3), // a Monday
            last_day: date(2025, 3, 3),
            weekdays: vec![Weekday::Mon],
            day_start: time(9, 0),
            day_end: time(12, 0),
            slot_minutes: 60,
            break_minutes: 0,
        }
    }

    #[test]
    fn single_day_produces_full_day_of_slots() {
        let slots = generate_series(&monday_spec()).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].starts_at.to_rfc3339(), "2025-03-03T09:00:00+00:00");
        assert_eq!(slots[2].ends_at.to_rfc3339(), "2025-03-03T12:00:00+00:00");
    }

    #[test]
    fn last_slot_may_end_exactly_at_day_end() {
        // 09:00-10:30 with 45-minute slots: 09:00-09:45 and 09:45-10:30.
        let mut spec = monday_spec();
        spec.day_end = time(10, 30);
        spec.slot_minutes = 45;

        let slots = generate_series(&spec).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].ends_at.to_rfc3339(), "2025-03-03T10:30:00+00:00");
    }

    #[test]
    fn slot_crossing_day_end_is_dropped() {
        // 09:00-10:00 with 45-minute slots: only 09:00-09:45 fits;
        // 09:45-10:30 would cross the closing time.
        let mut spec = monday_spec();
        spec.day_end = time(10, 0);
        spec.slot_minutes = 45;

        let slots = generate_series(&spec).unwrap();
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn breaks_space_out_slots() {
        // 09:00-12:00, 60-minute slots with 30-minute breaks:
        // 09:00-10:00 and 10:30-11:30. The next start (12:00) has no room.
        let mut spec = monday_spec();
        spec.break_minutes = 30;

        let slots = generate_series(&spec).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].starts_at.to_rfc3339(), "2025-03-03T10:30:00+00:00");
    }

    #[test]
    fn weekdays_outside_selection_are_skipped() {
        // Mon 2025-03-03 through Sun 2025-03-09, Mondays and Thursdays.
        let mut spec = monday_spec();
        spec.last_day = date(2025, 3, 9);
        spec.weekdays = vec![Weekday::Mon, Weekday::Thu];

        let slots = generate_series(&spec).unwrap();
        // 3 slots each on Mon 03-03 and Thu 03-06.
        assert_eq!(slots.len(), 6);
        assert!(slots.iter().all(|s| {
            let wd = s.starts_at.date_naive().weekday();
            wd == Weekday::Mon || wd == Weekday::Thu
        }));
    }

    #[test]
    fn last_day_is_inclusive() {
        // Mon through next Mon: both Mondays generate slots.
        let mut spec = monday_spec();
        spec.last_day = date(2025, 3, 10);

        let slots = generate_series(&spec).unwrap();
        assert_eq!(slots.len(), 6);
        assert_eq!(
            slots.last().unwrap().starts_at.date_naive(),
            date(2025, 3, 10)
        );
    }

    #[test]
    fn day_too_short_for_one_slot_yields_nothing() {
        let mut spec = monday_spec();
        spec.day_end = time(9, 30);

        let slots = generate_series(&spec).unwrap();
        assert!(slots.is_empty());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn reversed_range_rejected() {
        let mut spec = monday_spec();
        spec.last_day = date(2025, 3, 2);
        assert!(generate_series(&spec).is_err());
    }

    #[test]
    fn empty_weekdays_rejected() {
        let mut spec = monday_spec();
        spec.weekdays.clear();
        assert!(generate_series(&spec).is_err());
    }

    #[test]
    fn zero_duration_rejected() {
        let mut spec = monday_spec();
        spec.slot_minutes = 0;
        assert!(generate_series(&spec).is_err());
    }

    #[test]
    fn negative_break_rejected() {
        let mut spec = monday_spec();
        spec.break_minutes = -15;
        assert!(generate_series(&spec).is_err());
    }

    #[test]
    fn day_start_after_day_end_rejected() {
        let mut spec = monday_spec();
        spec.day_start = time(13, 0);
        assert!(generate_series(&spec).is_err());
    }

    #[test]
    fn oversized_range_rejected() {
        let mut spec = monday_spec();
        spec.last_day = date(2026, 4, 1);
        assert!(generate_series(&spec).is_err());
    }
}
