//! Register definitions and bitfield views for the DS3231 time registers.
//!
//! Only two of the seven time registers mix flag bits with their BCD value:
//! the hours register (12/24-hour select and the PM / 20-hour bit) and the
//! month register (century bit). Those get bitfield views here so the value
//! bits can be isolated before decoding. The remaining registers hold a plain
//! BCD byte, or in the case of day-of-week a plain integer.

use bitfield::bitfield;

/// Register addresses of the DS3231 time block.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x02,
    /// Day register (1-7)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12) and century flag
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
}

impl From<RegAddr> for u8 {
    fn from(v: RegAddr) -> Self {
        v as u8
    }
}

/// Time representation format of the hours register.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl TryFrom<u8> for TimeRepresentation {
    /// The rejected raw value
    type Error = u8;

    /// Creates a `TimeRepresentation` from a raw register value.
    ///
    /// # Errors
    /// Returns the value back if it is not 0 or 1.
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(TimeRepresentation::TwentyFourHour),
            1 => Ok(TimeRepresentation::TwelveHour),
            _ => Err(v),
        }
    }
}
impl From<TimeRepresentation> for u8 {
    /// Converts a `TimeRepresentation` to its raw register value.
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Hours register: BCD value in bits 4..0 plus mode and PM / 20-hour flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// 12-hour mode select bit
    pub twelve_hour, set_twelve_hour: 6;
    /// PM flag (12-hour) or 20-hour bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5;
    /// BCD hour value (mask 0x1F)
    pub value, set_value: 4, 0;
}
from_register_u8!(Hours);

impl Hours {
    /// Time representation format (12/24 hour)
    pub fn time_representation(&self) -> TimeRepresentation {
        if self.twelve_hour() {
            TimeRepresentation::TwelveHour
        } else {
            TimeRepresentation::TwentyFourHour
        }
    }

    /// Selects the time representation format (12/24 hour)
    pub fn set_time_representation(&mut self, time_representation: TimeRepresentation) {
        self.set_twelve_hour(time_representation == TimeRepresentation::TwelveHour);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        let hours = crate::bcd::bcd_to_decimal(self.value());
        match self.time_representation() {
            TimeRepresentation::TwentyFourHour => {
                let hours = hours + 20 * u8::from(self.pm_or_twenty_hours());
                defmt::write!(f, "Hours({}h 24h)", hours);
            }
            TimeRepresentation::TwelveHour => {
                let is_pm = self.pm_or_twenty_hours();
                defmt::write!(f, "Hours({}h {})", hours, if is_pm { "PM" } else { "AM" });
            }
        }
    }
}

bitfield! {
    /// Month register: BCD value in bits 4..0 plus the century flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Century flag, toggled when the year wraps from 99 to 00
    pub century, set_century: 7;
    /// BCD month value (mask 0x1F)
    pub value, set_value: 4, 0;
}
from_register_u8!(Month);

#[cfg(feature = "defmt")]
impl defmt::Format for Month {
    fn format(&self, f: defmt::Formatter) {
        let month = crate::bcd::bcd_to_decimal(self.value());
        defmt::write!(f, "Month({}", month);
        if self.century() {
            defmt::write!(f, ", century");
        }
        defmt::write!(f, ")");
    }
}
