//! Gregorian calendar conversions
//!
//! Years are located with a 365.25-day approximation rather than a full
//! proleptic Gregorian rule set. Over the range a `u32` epoch covers, the
//! only century to correct for is 2100, which is not a leap year.

use super::{carry_months, compose_epoch, DateTime, DateVar, TimeVar, Weekday, SECONDS_PER_DAY};

/// First year the epoch counter can represent
pub const MIN_YEAR: u16 = 1970;
/// Last full year the epoch counter can represent
pub const MAX_YEAR: u16 = 2105;

/// Days before the first of each month in a common year
const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Leap year rule for the epoch range: every fourth year counted from 1968,
/// except 2100
pub const fn is_leap_year(year: u16) -> bool {
    year.wrapping_sub(1968) % 4 == 0 && year != 2100
}

/// Days from 1970-01-01 to January 1st of `year`
pub fn days_before_year(year: u16) -> u16 {
    let years = u32::from(year.saturating_sub(MIN_YEAR));
    // In quarter days: 365.25 per year plus a quarter so that 1973 lands on 1096
    let mut quarters = years * 1461 + 1;
    if year > 2100 {
        quarters -= 4;
    }
    (quarters / 4) as u16
}

/// Days from January 1st to the first of the month at `month_index` (0 = January)
fn days_before_month(month_index: usize, is_leap_year: bool) -> u16 {
    let days = DAYS_BEFORE_MONTH[month_index];
    if is_leap_year && month_index > 1 {
        days + 1
    } else {
        days
    }
}

/// Gregorian date of an epoch value
pub fn epoch_to_date(epoch: u32) -> DateVar {
    let number_of_days = (epoch / SECONDS_PER_DAY) as u16;

    // The estimate overshoots by at most one year before 2106
    let mut year = number_of_days / 365 + MIN_YEAR;
    let mut year_start = days_before_year(year);
    if year_start > number_of_days {
        year -= 1;
        year_start = days_before_year(year);
    }

    let is_leap_year = is_leap_year(year);
    let day_of_year = number_of_days - year_start;

    // January always matches, its offset is 0
    let (month, day) = (0..12)
        .rev()
        .map(|index| (index, days_before_month(index, is_leap_year)))
        .find(|&(_, before)| before <= day_of_year)
        .map(|(index, before)| (index as i16 + 1, (day_of_year - before) as i16 + 1))
        .unwrap_or((1, day_of_year as i16 + 1));

    DateVar {
        number_of_days,
        year,
        month,
        day,
        weekday: Weekday::from_days(number_of_days),
        is_leap_year,
    }
}

/// Time of day of an epoch value
pub fn epoch_to_time(epoch: u32) -> TimeVar {
    let seconds_of_day = epoch % SECONDS_PER_DAY;
    TimeVar {
        hours: (seconds_of_day / 3600) as i16,
        minutes: (seconds_of_day % 3600 / 60) as i16,
        seconds: (seconds_of_day % 60) as i16,
    }
}

/// Gregorian date and time of day of an epoch value
pub fn epoch_to_date_time(epoch: u32) -> DateTime {
    DateTime {
        date: epoch_to_date(epoch),
        time: epoch_to_time(epoch),
    }
}

/// Epoch value of a Gregorian date and time
///
/// `month` is carried into `year` first, then `year` is clamped to
/// [`MIN_YEAR`]..=[`MAX_YEAR`]. `day` and the time fields are not checked:
/// they are added as offsets, so 30 February lands on 1 or 2 March and hour
/// 24 on the next day. Offsets that fall before the epoch saturate at day 0.
///
/// Both arguments are overwritten with the canonical date and time of the
/// returned epoch.
pub fn date_time_to_epoch(date: &mut DateVar, time: &mut TimeVar) -> u32 {
    let (year, month) = carry_months(date.year, date.month);
    let year = year.clamp(i32::from(MIN_YEAR), i32::from(MAX_YEAR)) as u16;
    let is_leap_year = is_leap_year(year);

    let number_of_days = i32::from(days_before_year(year))
        + i32::from(days_before_month((month - 1) as usize, is_leap_year))
        + i32::from(date.day)
        - 1;
    let number_of_days = number_of_days.clamp(0, i32::from(u16::MAX)) as u16;

    let epoch = compose_epoch(number_of_days, time);
    *date = epoch_to_date(epoch);
    *time = epoch_to_time(epoch);
    epoch
}
