//! Calendar views of the epoch counter
//!
//! The RTC counts seconds since 1970-01-01T00:00:00 in a `u32`, which wraps
//! early in 2106. Everything here is a view derived from that count:
//! - [`gregorian`]: civil dates, 1970 through 2105
//! - [`hijri`]: lunar dates from a mean synodic month, 1389 through 1529 AH
//!
//! The inverse conversions accept out-of-range months (carried into the
//! year) and write the canonical, re-derived date and time back into their
//! arguments.

pub mod gregorian;
pub mod hijri;

pub use gregorian::{date_time_to_epoch, epoch_to_date, epoch_to_date_time, epoch_to_time};
pub use hijri::{epoch_to_hijri_date, hijri_date_time_to_epoch};

/// Seconds in a day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Day of the week, numbered from Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// Weekday of a day count since the epoch (day 0 was a Thursday)
    pub const fn from_days(number_of_days: u16) -> Self {
        match (number_of_days as u32 + 4) % 7 {
            0 => Self::Sunday,
            1 => Self::Monday,
            2 => Self::Tuesday,
            3 => Self::Wednesday,
            4 => Self::Thursday,
            5 => Self::Friday,
            _ => Self::Saturday,
        }
    }
}

impl From<Weekday> for u8 {
    fn from(weekday: Weekday) -> Self {
        weekday as u8
    }
}

/// Calendar date
///
/// Conversions fill every field. As an input only `year`, `month` and `day`
/// are read; `month` may be out of range and is carried into `year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateVar {
    /// Days since 1970-01-01
    pub number_of_days: u16,
    pub year: u16,
    /// 1..=12 on output
    pub month: i16,
    /// 1-based day of the month
    pub day: i16,
    pub weekday: Weekday,
    /// Always false for Hijri dates
    pub is_leap_year: bool,
}

impl DateVar {
    /// A date to feed into an inverse conversion
    pub const fn new(year: u16, month: i16, day: i16) -> Self {
        Self {
            number_of_days: 0,
            year,
            month,
            day,
            weekday: Weekday::Thursday,
            is_leap_year: false,
        }
    }
}

impl Default for DateVar {
    /// 1970-01-01
    fn default() -> Self {
        Self::new(1970, 1, 1)
    }
}

/// Time of day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeVar {
    pub hours: i16,
    pub minutes: i16,
    pub seconds: i16,
}

impl TimeVar {
    pub const fn new(hours: i16, minutes: i16, seconds: i16) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }
}

/// Gregorian date and time of day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub date: DateVar,
    pub time: TimeVar,
}

impl DateTime {
    pub const fn new(date: DateVar, time: TimeVar) -> Self {
        Self { date, time }
    }

    /// Gregorian date and time of an epoch value
    pub fn from_epoch(epoch: u32) -> Self {
        epoch_to_date_time(epoch)
    }

    /// Epoch value of this date and time
    ///
    /// Normalizes `self` in place to the canonical calendar values.
    pub fn to_epoch(&mut self) -> u32 {
        date_time_to_epoch(&mut self.date, &mut self.time)
    }
}

/// Carry months outside 1..=12 into the year
///
/// Uses truncating division, with a separate branch for month <= 0 so that
/// month 0 is December of the previous year.
pub(crate) fn carry_months(year: u16, month: i16) -> (i32, i16) {
    let year = i32::from(year);
    let month = i32::from(month);
    if month > 0 {
        (year + (month - 1) / 12, ((month - 1) % 12 + 1) as i16)
    } else {
        (year - (1 - month / 12), (12 + month % 12) as i16)
    }
}

/// Epoch value of a day count plus a time of day
///
/// Wraps on overflow like the 32-bit counter does.
pub(crate) fn compose_epoch(number_of_days: u16, time: &TimeVar) -> u32 {
    let seconds = i32::from(time.hours) * 3600 + i32::from(time.minutes) * 60 + i32::from(time.seconds);
    u32::from(number_of_days)
        .wrapping_mul(SECONDS_PER_DAY)
        .wrapping_add_signed(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_from_days() {
        assert_eq!(Weekday::from_days(0), Weekday::Thursday);
        assert_eq!(Weekday::from_days(3), Weekday::Sunday);
        assert_eq!(Weekday::from_days(9), Weekday::Saturday);
        assert_eq!(u8::from(Weekday::Saturday), 6);
    }

    #[test]
    fn test_carry_months() {
        assert_eq!(carry_months(2023, 1), (2023, 1));
        assert_eq!(carry_months(2023, 12), (2023, 12));
        assert_eq!(carry_months(2023, 13), (2024, 1));
        assert_eq!(carry_months(2023, 25), (2025, 1));
        assert_eq!(carry_months(2023, 0), (2022, 12));
        assert_eq!(carry_months(2023, -1), (2022, 11));
        assert_eq!(carry_months(2023, -11), (2022, 1));
        assert_eq!(carry_months(2023, -12), (2021, 12));
    }

    #[test]
    fn test_compose_epoch_accepts_negative_time() {
        let time = TimeVar::new(0, 0, -1);
        assert_eq!(compose_epoch(1, &time), SECONDS_PER_DAY - 1);
        assert_eq!(compose_epoch(0, &time), u32::MAX);
    }
}
