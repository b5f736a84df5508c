//! Hijri (lunar) calendar conversions
//!
//! Months follow the mean synodic month of 29.5305882 days, counted from a
//! fixed offset so that 1970-01-01 is 22 Shawwal 1389. This is an arithmetic
//! approximation, not an observed calendar: individual month starts can be a
//! day off from the announced ones.
//!
//! All arithmetic is fixed point with seven decimal places, so a given day
//! count always lands on the same month on every target.

use super::{carry_months, compose_epoch, epoch_to_time, DateVar, TimeVar, Weekday, SECONDS_PER_DAY};

/// Hijri year containing 1970-01-01
pub const MIN_YEAR: u16 = 1389;
/// Last Hijri year accepted by [`hijri_date_time_to_epoch`]
pub const MAX_YEAR: u16 = 1529;

/// Fixed-point scale: one day
const ONE_DAY: i64 = 10_000_000;
/// Mean synodic month, 29.5305882 days
const SYNODIC_MONTH: i64 = 295_305_882;
/// Offset of 1970-01-01 into its lunar month count, 21.252353 days
const EPOCH_OFFSET: i64 = 212_523_530;
/// The month count starts at Shawwal 1389, nine months into the year
const MONTH_SHIFT: i64 = 9;
/// Day of the month of 1970-01-01
const EPOCH_DAY: i64 = EPOCH_OFFSET / ONE_DAY + 1;

/// Whole days from the start of the month count to the start of month `index`
fn days_before_month(index: i64) -> i64 {
    (index * SYNODIC_MONTH).div_euclid(ONE_DAY)
}

/// Hijri date of an epoch value
///
/// `weekday` matches the Gregorian one; `is_leap_year` is always false.
pub fn epoch_to_hijri_date(epoch: u32) -> DateVar {
    let number_of_days = (epoch / SECONDS_PER_DAY) as u16;
    let elapsed = i64::from(number_of_days) * ONE_DAY + EPOCH_OFFSET;

    let mut index = elapsed / SYNODIC_MONTH;
    let month_start = days_before_month(index);
    let month_length = days_before_month(index + 1) - month_start;
    let mut day = (elapsed - month_start * ONE_DAY) / ONE_DAY + 1;
    if day > month_length {
        day = 1;
        index += 1;
    }

    let index = index + MONTH_SHIFT;
    DateVar {
        number_of_days,
        year: (index / 12) as u16 + MIN_YEAR,
        month: (index % 12 + 1) as i16,
        day: day as i16,
        weekday: Weekday::from_days(number_of_days),
        is_leap_year: false,
    }
}

/// Epoch value of a Hijri date and time
///
/// `month` is carried into `year`, then `year` is clamped to
/// [`MIN_YEAR`]..=[`MAX_YEAR`]. Dates before 22 Shawwal 1389 saturate at the
/// epoch. Both arguments are overwritten with the canonical date and time of
/// the returned epoch.
pub fn hijri_date_time_to_epoch(date: &mut DateVar, time: &mut TimeVar) -> u32 {
    let (year, month) = carry_months(date.year, date.month);
    let year = year.clamp(i32::from(MIN_YEAR), i32::from(MAX_YEAR));

    let index = i64::from((year - i32::from(MIN_YEAR)) * 12 + i32::from(month)) - 1 - MONTH_SHIFT;
    let number_of_days = (days_before_month(index) + i64::from(date.day) - EPOCH_DAY)
        .clamp(0, i64::from(u16::MAX)) as u16;

    let epoch = compose_epoch(number_of_days, time);
    *date = epoch_to_hijri_date(epoch);
    *time = epoch_to_time(epoch);
    epoch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hijri_of(epoch: u32) -> (u16, i16, i16) {
        let date = epoch_to_hijri_date(epoch);
        (date.year, date.month, date.day)
    }

    fn epoch_of(year: u16, month: i16, day: i16) -> u32 {
        let mut date = DateVar::new(year, month, day);
        let mut time = TimeVar::default();
        hijri_date_time_to_epoch(&mut date, &mut time)
    }

    #[test]
    fn test_unix_epoch() {
        let date = epoch_to_hijri_date(0);
        assert_eq!((date.year, date.month, date.day), (1389, 10, 22));
        assert_eq!(date.weekday, Weekday::Thursday);
        assert!(!date.is_leap_year);
    }

    #[test]
    fn test_first_of_ramadan_1445() {
        // 2024-03-12T00:00:00Z
        assert_eq!(hijri_of(1_710_201_600), (1445, 9, 1));
        assert_eq!(hijri_of(1_710_115_200), (1445, 8, 30));
        assert_eq!(epoch_of(1445, 9, 1), 1_710_201_600);
    }

    #[test]
    fn test_months_are_29_or_30_days() {
        let mut previous = epoch_to_hijri_date(0);
        let mut complete_months = 0;
        for day in 1..20_000u32 {
            let date = epoch_to_hijri_date(day * SECONDS_PER_DAY);
            if date.month == previous.month {
                assert_eq!(date.day, previous.day + 1);
            } else {
                assert_eq!(date.day, 1);
                assert_eq!(date.month, previous.month % 12 + 1);
                if complete_months > 0 {
                    assert!(previous.day == 29 || previous.day == 30, "day {}", day);
                }
                complete_months += 1;
            }
            previous = date;
        }
        assert!(complete_months > 600);
    }

    #[test]
    fn test_round_trip_conversion() {
        let samples = (0..u32::MAX)
            .step_by(6_700_417)
            .chain([0, 86_399, 1_710_201_600, 2_147_483_647]);
        for epoch in samples {
            let mut date = epoch_to_hijri_date(epoch);
            if date.year > MAX_YEAR {
                continue;
            }
            let mut time = epoch_to_time(epoch);
            let converted_back = hijri_date_time_to_epoch(&mut date, &mut time);
            assert_eq!(epoch, converted_back, "Round trip failed for timestamp {}", epoch);
        }
    }

    #[test]
    fn test_month_normalization() {
        assert_eq!(epoch_of(1444, 13, 5), epoch_of(1445, 1, 5));
        assert_eq!(epoch_of(1445, 0, 5), epoch_of(1444, 12, 5));
        let mut date = DateVar::new(1444, 13, 5);
        let mut time = TimeVar::new(6, 30, 0);
        hijri_date_time_to_epoch(&mut date, &mut time);
        assert_eq!((date.year, date.month, date.day), (1445, 1, 5));
        assert_eq!(time, TimeVar::new(6, 30, 0));
    }

    #[test]
    fn test_year_clamped_to_range() {
        assert_eq!(epoch_of(1300, 10, 22), epoch_of(1389, 10, 22));
        assert_eq!(epoch_of(1600, 1, 1), epoch_of(1529, 1, 1));
    }

    #[test]
    fn test_dates_before_epoch_saturate() {
        assert_eq!(epoch_of(1389, 1, 1), 0);
        assert_eq!(epoch_of(1389, 10, 21), 0);
        assert_eq!(epoch_of(1389, 10, 23), SECONDS_PER_DAY);
    }
}
