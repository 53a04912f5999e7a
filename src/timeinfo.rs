//! Decoded contents of the DS3231 time registers.
//!
//! The DS3231 stores date and time in 7 consecutive registers starting at
//! [`RegAddr::Seconds`](crate::RegAddr::Seconds):
//!
//! | Offset | Field | Layout |
//! |---|---|---|
//! | 0 | seconds | BCD 0-59 |
//! | 1 | minutes | BCD 0-59 |
//! | 2 | hours | bits 4..0 BCD, bit 5 PM / 20-hour, bit 6 12-hour mode |
//! | 3 | day | plain integer 1-7 |
//! | 4 | date | BCD 1-31 |
//! | 5 | month | bits 4..0 BCD 1-12, bit 7 century |
//! | 6 | year | BCD 0-99 |
//!
//! [`TimeInfo`] is the field-by-field decoding of that block. It keeps the
//! clock's own conventions (1-based day and month, two digit year, 12-hour
//! values when the clock runs in 12-hour mode). [`TimeInfo::to_datetime`]
//! turns it into a chrono `NaiveDateTime`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::bcd::{bcd_to_decimal, decimal_to_bcd};
use crate::{Hours, Month, TimeRepresentation};

/// Number of registers in the time block.
pub const TIMEINFO_LEN: usize = 7;

/// Time and calendar fields as stored by the DS3231.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeInfo {
    /// Seconds (0-59)
    pub seconds: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Hours: 0-23 in 24-hour mode, 1-12 in 12-hour mode
    pub hours: u8,
    /// The clock is configured for 12-hour mode
    pub hours_12h_mode: bool,
    /// PM in 12-hour mode, the 20-hour bit in 24-hour mode
    pub hours_pm_flag: bool,
    /// Day of week (1-7)
    pub day: u8,
    /// Date of month (1-31)
    pub date: u8,
    /// Month (1-12)
    pub month: u8,
    /// Two digit year (0-99)
    pub year: u8,
    /// Toggled by the clock when the year wraps from 99 to 00
    pub year_century_flag: bool,
}

impl TimeInfo {
    /// The hour format the clock was running in.
    pub fn time_representation(&self) -> TimeRepresentation {
        if self.hours_12h_mode {
            TimeRepresentation::TwelveHour
        } else {
            TimeRepresentation::TwentyFourHour
        }
    }

    /// Hour of day in 24-hour form.
    ///
    /// # Errors
    /// Returns [`TimeInfoError::InvalidDateTime`] for a 12-hour value outside 1-12.
    pub fn hours_24h(&self) -> Result<u8, TimeInfoError> {
        if !self.hours_12h_mode {
            return Ok(self.hours);
        }
        match (self.hours, self.hours_pm_flag) {
            (12, false) => Ok(0),
            (12, true) => Ok(12),
            (h @ 1..=11, false) => Ok(h),
            (h @ 1..=11, true) => Ok(h + 12),
            _ => Err(TimeInfoError::InvalidDateTime),
        }
    }

    /// Day of week, counting day 1 as Sunday.
    ///
    /// Returns `None` if the register holds something outside 1-7.
    pub fn weekday(&self) -> Option<Weekday> {
        match self.day {
            1 => Some(Weekday::Sun),
            2 => Some(Weekday::Mon),
            3 => Some(Weekday::Tue),
            4 => Some(Weekday::Wed),
            5 => Some(Weekday::Thu),
            6 => Some(Weekday::Fri),
            7 => Some(Weekday::Sat),
            _ => None,
        }
    }

    /// Converts to a `NaiveDateTime`.
    ///
    /// The two digit year is taken relative to 2000, or 2100 when the century
    /// flag is set. The day-of-week register is not consulted.
    ///
    /// # Errors
    /// Returns [`TimeInfoError::InvalidDateTime`] if the fields do not form a
    /// valid date and time.
    pub fn to_datetime(&self) -> Result<NaiveDateTime, TimeInfoError> {
        let hours = self.hours_24h()?;
        let century_offset = if self.year_century_flag { 100 } else { 0 };
        let year = 2000 + century_offset + i32::from(self.year);
        debug!(
            "timeinfo to datetime: year={} month={} date={} h={} m={} s={}",
            year, self.month, self.date, hours, self.minutes, self.seconds
        );

        NaiveDate::from_ymd_opt(year, u32::from(self.month), u32::from(self.date))
            .and_then(|d| {
                d.and_hms_opt(
                    u32::from(hours),
                    u32::from(self.minutes),
                    u32::from(self.seconds),
                )
            })
            .ok_or(TimeInfoError::InvalidDateTime)
    }

    /// Builds the register contents for `datetime` in the given hour format.
    ///
    /// The day-of-week field is filled in from the date, with Sunday as 1.
    ///
    /// # Errors
    /// Years outside 2000-2199 cannot be represented.
    pub fn from_datetime(
        datetime: &NaiveDateTime,
        time_representation: TimeRepresentation,
    ) -> Result<Self, TimeInfoError> {
        let year = datetime.year();
        if year > 2199 {
            debug!("Year {} is too late! must be before 2200", year);
            return Err(TimeInfoError::YearNotBefore2200);
        }
        if year < 2000 {
            debug!("Year {} is too early! must be greater than 1999", year);
            return Err(TimeInfoError::YearNotAfter1999);
        }
        let year_offset = u8::try_from(year - 2000).map_err(|_| TimeInfoError::InvalidDateTime)?;
        let year_century_flag = year_offset > 99;

        let hour = u8::try_from(datetime.hour()).map_err(|_| TimeInfoError::InvalidDateTime)?;
        let (hours, hours_12h_mode, hours_pm_flag) = match time_representation {
            TimeRepresentation::TwentyFourHour => (hour, false, hour >= 20),
            TimeRepresentation::TwelveHour => match hour {
                0 => (12, true, false),
                1..=11 => (hour, true, false),
                12 => (12, true, true),
                _ => (hour - 12, true, true),
            },
        };

        // chrono keeps every remaining field well inside u8
        let info = TimeInfo {
            seconds: datetime.second() as u8,
            minutes: datetime.minute() as u8,
            hours,
            hours_12h_mode,
            hours_pm_flag,
            day: datetime.weekday().number_from_sunday() as u8,
            date: datetime.day() as u8,
            month: datetime.month() as u8,
            year: year_offset % 100,
            year_century_flag,
        };
        debug!("timeinfo from datetime: {:?}", info);
        Ok(info)
    }
}

impl From<[u8; TIMEINFO_LEN]> for TimeInfo {
    /// Decodes the raw register block.
    ///
    /// Flag bits are masked off before the BCD value is decoded. In 24-hour
    /// mode the PM / 20-hour bit adds 20 to the hour; in 12-hour mode it is
    /// only reported through `hours_pm_flag`.
    fn from(data: [u8; TIMEINFO_LEN]) -> Self {
        let hours = Hours::from(data[2]);
        let month = Month::from(data[5]);

        let hours_12h_mode = hours.time_representation() == TimeRepresentation::TwelveHour;
        let hours_pm_flag = hours.pm_or_twenty_hours();
        let mut hour = bcd_to_decimal(hours.value());
        if !hours_12h_mode && hours_pm_flag {
            hour += 20;
        }
        trace!("raw_hour={:?} h={}", hours, hour);

        TimeInfo {
            seconds: bcd_to_decimal(data[0]),
            minutes: bcd_to_decimal(data[1]),
            hours: hour,
            hours_12h_mode,
            hours_pm_flag,
            day: data[3],
            date: bcd_to_decimal(data[4]),
            month: bcd_to_decimal(month.value()),
            year: bcd_to_decimal(data[6]),
            year_century_flag: month.century(),
        }
    }
}

/// Converts a value to BCD after checking it lies in `min..=max`.
fn make_bcd(value: u8, min: u8, max: u8) -> Result<u8, TimeInfoError> {
    if !(min..=max).contains(&value) {
        return Err(TimeInfoError::InvalidDateTime);
    }
    Ok(decimal_to_bcd(value))
}

impl TryFrom<&TimeInfo> for [u8; TIMEINFO_LEN] {
    type Error = TimeInfoError;

    /// Encodes the fields back into register form.
    ///
    /// In 24-hour mode the 20-hour bit is derived from `hours`, so
    /// `hours_pm_flag` only matters in 12-hour mode.
    ///
    /// # Errors
    /// Returns [`TimeInfoError::InvalidDateTime`] if any field is outside the
    /// range its register can hold.
    fn try_from(info: &TimeInfo) -> Result<Self, Self::Error> {
        let mut hours = Hours::default();
        hours.set_time_representation(info.time_representation());
        if info.hours_12h_mode {
            hours.set_pm_or_twenty_hours(info.hours_pm_flag);
            hours.set_value(make_bcd(info.hours, 1, 12)?);
        } else if info.hours >= 20 {
            hours.set_pm_or_twenty_hours(true);
            hours.set_value(make_bcd(info.hours - 20, 0, 3)?);
        } else {
            hours.set_value(make_bcd(info.hours, 0, 19)?);
        }

        if !(1..=7).contains(&info.day) {
            return Err(TimeInfoError::InvalidDateTime);
        }

        let mut month = Month::default();
        month.set_value(make_bcd(info.month, 1, 12)?);
        month.set_century(info.year_century_flag);

        Ok([
            make_bcd(info.seconds, 0, 59)?,
            make_bcd(info.minutes, 0, 59)?,
            hours.into(),
            info.day,
            make_bcd(info.date, 1, 31)?,
            month.into(),
            make_bcd(info.year, 0, 99)?,
        ])
    }
}

/// Errors converting between [`TimeInfo`] and calendar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeInfoError {
    /// The fields do not form a valid date and time
    InvalidDateTime,
    /// The year is not before 2200 (the clock only covers 2000-2199)
    YearNotBefore2200,
    /// The year is not after 1999 (the clock only covers 2000-2199)
    YearNotAfter1999,
}
