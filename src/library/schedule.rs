use chrono::{DateTime, Days, TimeDelta, TimeZone};

const DAYS_PER_WEEK: u64 = 7;

/// Due date of a loan: `started_at` plus `duration_weeks * 7` calendar days in
/// the timestamp's own zone, so a loan started at 10:00 is due at 10:00 local
/// time even across a daylight-saving change.
///
/// When the shifted wall-clock time does not exist in the zone (it lands in a
/// DST gap), the fixed-length span is used instead. `None` only on overflow.
pub fn compute_due_date<Tz: TimeZone>(
    started_at: &DateTime<Tz>,
    duration_weeks: u32,
) -> Option<DateTime<Tz>> {
    let days = u64::from(duration_weeks) * DAYS_PER_WEEK;
    started_at
        .clone()
        .checked_add_days(Days::new(days))
        .or_else(|| {
            let span = TimeDelta::try_days(i64::try_from(days).ok()?)?;
            started_at.clone().checked_add_signed(span)
        })
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, FixedOffset, Local, Utc};

    use super::*;

    #[test]
    fn two_weeks_from_new_year() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let due = compute_due_date(&start, 2).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn crosses_month_and_leap_day() {
        let start = Utc.with_ymd_and_hms(2024, 2, 20, 9, 30, 0).unwrap();
        let due = compute_due_date(&start, 4).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 19, 9, 30, 0).unwrap());
    }

    #[test]
    fn keeps_the_original_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = offset.with_ymd_and_hms(2023, 12, 28, 23, 0, 0).unwrap();
        let due = compute_due_date(&start, 1).unwrap();
        assert_eq!(due.offset(), start.offset());
        assert_eq!((due.year(), due.month(), due.day()), (2024, 1, 4));
    }

    #[test]
    fn local_timestamps_advance_by_whole_days() {
        let start = Local::now();
        let due = compute_due_date(&start, 3).unwrap();
        let elapsed = due.date_naive() - start.date_naive();
        assert_eq!(elapsed.num_days(), 21);
    }
}
