//! # DS3231 time info driver
//!
//! A platform-agnostic driver for reading the time registers of the DS3231
//! real-time clock over I2C, built on the `embedded-hal` traits.
//!
//! The driver reads the 7 time registers in one transaction and decodes them
//! into a [`TimeInfo`]: BCD digits become plain integers, and the 12/24-hour
//! mode, PM / 20-hour and century flags that share bytes with those digits are
//! split out. A [`TimeInfo`] can be turned into a chrono `NaiveDateTime`.
//!
//! ## Features
//!
//! - Blocking I2C through `embedded-hal` (default)
//! - Async I2C through `embedded-hal-async` (enable the `async` feature)
//! - Logging through `log` (enable the `log` feature)
//! - Logging through `defmt` (enable the `defmt` feature)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ds3231_timeinfo::{DS3231, DS3231_I2C_ADDRESS};
//!
//! let mut rtc = DS3231::create(i2c, DS3231_I2C_ADDRESS)?;
//! let info = rtc.raw_timeinfo()?;
//! let now = info.to_datetime()?;
//! let i2c = rtc.destroy();
//! ```
//!
//! ## Timeouts
//!
//! Every operation performs at most one bus transaction and waits for it to
//! finish. The driver adds no timeout of its own: a bus implementation
//! without one blocks until the transaction completes.

#![cfg_attr(not(test), no_std)]

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug {
            ($($arg:tt)*) => { defmt::debug!($($arg)*) };
        }
        macro_rules! trace {
            ($($arg:tt)*) => { defmt::trace!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug {
            ($($arg:tt)*) => { log::debug!($($arg)*) };
        }
        macro_rules! trace {
            ($($arg:tt)*) => { log::trace!($($arg)*) };
        }
    } else {
        macro_rules! debug {
            ($($arg:tt)*) => {{}};
        }
        macro_rules! trace {
            ($($arg:tt)*) => {{}};
        }
    }
}

pub mod bcd;
mod registers;
mod timeinfo;

#[cfg(feature = "async")]
pub mod asynch;

pub use registers::{Hours, Month, RegAddr, TimeRepresentation};
pub use timeinfo::{TimeInfo, TimeInfoError, TIMEINFO_LEN};

/// Default I2C address of the DS3231.
pub const DS3231_I2C_ADDRESS: u8 = 0x68;

/// SCL clock speed the DS3231 is operated at, in Hz.
///
/// The bus is configured by the caller; this is the rate the driver expects.
pub const I2C_CLK_SPEED_HZ: u32 = 1_000_000;

/// Size of the staging buffer used for register writes: one register
/// pointer byte followed by up to a full time block.
pub(crate) const WRITE_BUFF_SIZE: usize = TIMEINFO_LEN + 1;

/// Error type for DS3231 operations.
#[derive(Debug)]
pub enum DS3231Error<I2CE> {
    /// I2C bus error
    I2c(I2CE),
    /// The address does not fit in 7 bits
    InvalidAddress(u8),
    /// The payload does not fit in the write staging buffer
    PayloadTooLong(usize),
    /// `DateTime` conversion error
    DateTime(TimeInfoError),
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

/// Checks that `address` is a 7-bit I2C address.
pub(crate) fn check_address<I2CE>(address: u8) -> Result<(), DS3231Error<I2CE>> {
    if address > 0x7F {
        debug!("DS3231: address {} does not fit in 7 bits", address);
        return Err(DS3231Error::InvalidAddress(address));
    }
    Ok(())
}

/// Lays out `[register] ++ payload` in a staging buffer and returns the
/// number of bytes to transmit.
pub(crate) fn stage_write<I2CE>(
    register: u8,
    payload: &[u8],
) -> Result<([u8; WRITE_BUFF_SIZE], usize), DS3231Error<I2CE>> {
    if payload.len() >= WRITE_BUFF_SIZE {
        return Err(DS3231Error::PayloadTooLong(payload.len()));
    }
    let mut buffer = [0; WRITE_BUFF_SIZE];
    buffer[0] = register;
    buffer[1..=payload.len()].copy_from_slice(payload);
    Ok((buffer, payload.len() + 1))
}

/// DS3231 Real-Time Clock driver.
///
/// Owns the I2C binding for one device. Use [`DS3231::destroy`] to release
/// the binding and get the bus back.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    time_representation: TimeRepresentation,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new DS3231 driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device (typically 0x68)
    ///
    /// The address is not validated. Use [`DS3231::create`] to reject
    /// addresses above 0x7F before binding.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            time_representation: TimeRepresentation::TwentyFourHour,
        }
    }

    /// Creates a driver instance, rejecting addresses that are not 7-bit.
    ///
    /// On error the bus is dropped along with the partially built driver.
    ///
    /// # Returns
    /// * `Ok(DS3231)` on success
    /// * `Err(DS3231Error::InvalidAddress)` if `address` is above 0x7F
    pub fn create(i2c: I2C, address: u8) -> Result<Self, DS3231Error<I2C::Error>> {
        check_address::<I2C::Error>(address)?;
        debug!("DS3231: bound to address {}", address);
        Ok(Self::new(i2c, address))
    }

    /// Releases the device binding and returns the I2C bus.
    pub fn destroy(self) -> I2C {
        debug!("DS3231: releasing address {}", self.address);
        self.i2c
    }

    /// Sets the hour format used by [`DS3231::set_datetime`].
    #[must_use]
    pub fn with_time_representation(mut self, time_representation: TimeRepresentation) -> Self {
        self.time_representation = time_representation;
        self
    }

    /// The device address this driver is bound to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Writes `payload` to consecutive registers starting at `register`.
    ///
    /// The register pointer and payload go out as a single transaction.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error::PayloadTooLong)` if `payload` is longer than a time block
    /// * `Err(DS3231Error::I2c)` on bus error
    pub fn write_registers(
        &mut self,
        register: RegAddr,
        payload: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let (buffer, len) = stage_write::<I2C::Error>(register as u8, payload)?;
        trace!("DS3231: write {} bytes at {:?}", len, register);
        self.i2c.write(self.address, &buffer[..len])?;
        Ok(())
    }

    /// Reads consecutive registers starting at `register` into `buffer`.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error::I2c)` on bus error
    pub fn read_registers(
        &mut self,
        register: RegAddr,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        trace!("DS3231: read {} bytes at {:?}", buffer.len(), register);
        self.i2c
            .write_read(self.address, &[register as u8], buffer)?;
        Ok(())
    }

    /// Reads and decodes the time registers.
    ///
    /// # Returns
    /// * `Ok(TimeInfo)` - The decoded register values
    /// * `Err(DS3231Error)` on error
    pub fn raw_timeinfo(&mut self) -> Result<TimeInfo, DS3231Error<I2C::Error>> {
        let mut data = [0; TIMEINFO_LEN];
        self.read_registers(RegAddr::Seconds, &mut data)?;
        Ok(data.into())
    }

    /// Encodes `info` and writes it to the time registers.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub fn set_raw_timeinfo(&mut self, info: &TimeInfo) -> Result<(), DS3231Error<I2C::Error>> {
        let data = <[u8; TIMEINFO_LEN]>::try_from(info).map_err(DS3231Error::DateTime)?;
        self.write_registers(RegAddr::Seconds, &data)
    }

    /// Gets the current date and time from the device.
    ///
    /// # Returns
    /// * `Ok(NaiveDateTime)` - The current date and time
    /// * `Err(DS3231Error)` on error
    pub fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        let info = self.raw_timeinfo()?;
        info.to_datetime().map_err(DS3231Error::DateTime)
    }

    /// Sets the current date and time on the device.
    ///
    /// The hour register is written in the format chosen with
    /// [`DS3231::with_time_representation`] (24-hour by default).
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), DS3231Error<I2C::Error>> {
        let info = TimeInfo::from_datetime(datetime, self.time_representation)
            .map_err(DS3231Error::DateTime)?;
        self.set_raw_timeinfo(&info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = DS3231_I2C_ADDRESS;

    fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    #[test]
    fn test_create_and_destroy() {
        let mock = setup_mock(&[]);
        let dev = DS3231::create(mock, DEVICE_ADDRESS).unwrap();
        assert_eq!(dev.address(), DEVICE_ADDRESS);
        let mut mock = dev.destroy();
        mock.done();
    }

    #[test]
    fn test_create_rejects_ten_bit_address() {
        let mut mock = setup_mock(&[]);
        let result = DS3231::create(mock.clone(), 0x80);
        assert!(matches!(result, Err(DS3231Error::InvalidAddress(0x80))));
        mock.done();
    }

    #[test]
    fn test_new_does_not_validate_address() {
        let dev = DS3231::new(setup_mock(&[]), 0x80);
        assert_eq!(dev.address(), 0x80);
        dev.destroy().done();
    }

    #[test]
    fn test_read_timeinfo() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x45, 0x30, 0x12, 0x03, 0x15, 0x09, 0x23],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let info = dev.raw_timeinfo().unwrap();
        assert_eq!(info.seconds, 45);
        assert_eq!(info.minutes, 30);
        assert_eq!(info.hours, 12);
        assert!(!info.hours_12h_mode);
        assert!(!info.hours_pm_flag);
        assert_eq!(info.day, 3);
        assert_eq!(info.date, 15);
        assert_eq!(info.month, 9);
        assert_eq!(info.year, 23);
        assert!(!info.year_century_flag);
        dev.destroy().done();
    }

    #[test]
    fn test_read_timeinfo_bus_error() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0; TIMEINFO_LEN],
        )
        .with_error(ErrorKind::Other)]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let result = dev.raw_timeinfo();
        assert!(matches!(result, Err(DS3231Error::I2c(ErrorKind::Other))));
        dev.destroy().done();
    }

    #[test]
    fn test_read_registers() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Hours as u8],
            vec![0x72, 0x05],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let mut data = [0; 2];
        dev.read_registers(RegAddr::Hours, &mut data).unwrap();
        assert_eq!(data, [0x72, 0x05]);
        dev.destroy().done();
    }

    #[test]
    fn test_write_registers() {
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![RegAddr::Minutes as u8, 0x59, 0x23],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.write_registers(RegAddr::Minutes, &[0x59, 0x23]).unwrap();
        dev.destroy().done();
    }

    #[test]
    fn test_write_registers_rejects_long_payload() {
        let mock = setup_mock(&[]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let result = dev.write_registers(RegAddr::Seconds, &[0; TIMEINFO_LEN + 1]);
        assert!(matches!(
            result,
            Err(DS3231Error::PayloadTooLong(len)) if len == TIMEINFO_LEN + 1
        ));
        dev.destroy().done();
    }

    #[test]
    fn test_write_registers_bus_error() {
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8, 0x00],
        )
        .with_error(ErrorKind::NoAcknowledge(
            embedded_hal::i2c::NoAcknowledgeSource::Address,
        ))]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let result = dev.write_registers(RegAddr::Seconds, &[0x00]);
        assert!(matches!(
            result,
            Err(DS3231Error::I2c(ErrorKind::NoAcknowledge(_)))
        ));
        dev.destroy().done();
    }

    #[test]
    fn test_read_datetime() {
        // 2024-03-14 15:30:00
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x00, 0x30, 0x15, 0x05, 0x14, 0x03, 0x24],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let dt = dev.datetime().unwrap();
        assert_eq!(dt.hour(), 15);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.year(), 2024);
        dev.destroy().done();
    }

    #[test]
    fn test_read_datetime_invalid_registers() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x00, 0x00, 0x00, 0x01, 0x01, 0x13, 0x24],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let result = dev.datetime();
        assert!(matches!(
            result,
            Err(DS3231Error::DateTime(TimeInfoError::InvalidDateTime))
        ));
        dev.destroy().done();
    }

    #[test]
    fn test_set_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();

        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::Seconds as u8,
                0x00, // seconds
                0x30, // minutes
                0x15, // hours (24-hour mode)
                0x05, // day (Thursday)
                0x14, // date
                0x03, // month
                0x24, // year
            ],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.set_datetime(&dt).unwrap();
        dev.destroy().done();
    }

    #[test]
    fn test_set_datetime_twelve_hour() {
        let dt = NaiveDate::from_ymd_opt(2124, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();

        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::Seconds as u8,
                0x00, // seconds
                0x30, // minutes
                0x63, // hours (3 PM, 12-hour mode)
                0x03, // day (Tuesday)
                0x14, // date
                0x83, // month with century
                0x24, // year
            ],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS)
            .with_time_representation(TimeRepresentation::TwelveHour);

        dev.set_datetime(&dt).unwrap();
        dev.destroy().done();
    }

    #[test]
    fn test_set_datetime_year_out_of_range() {
        let dt = NaiveDate::from_ymd_opt(1999, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let mock = setup_mock(&[]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let result = dev.set_datetime(&dt);
        assert!(matches!(
            result,
            Err(DS3231Error::DateTime(TimeInfoError::YearNotAfter1999))
        ));
        dev.destroy().done();
    }

    #[test]
    fn test_set_raw_timeinfo() {
        let info = TimeInfo {
            seconds: 1,
            minutes: 2,
            hours: 3,
            hours_12h_mode: false,
            hours_pm_flag: false,
            day: 4,
            date: 5,
            month: 6,
            year: 7,
            year_century_flag: false,
        };
        let mock = setup_mock(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::Seconds as u8,
                0x01,
                0x02,
                0x03,
                0x04,
                0x05,
                0x06,
                0x07,
            ],
        )]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        dev.set_raw_timeinfo(&info).unwrap();
        dev.destroy().done();
    }

    #[test]
    fn test_set_raw_timeinfo_rejects_out_of_range() {
        let info = TimeInfo {
            seconds: 100,
            minutes: 0,
            hours: 40,
            hours_12h_mode: false,
            hours_pm_flag: false,
            day: 1,
            date: 1,
            month: 20,
            year: 0,
            year_century_flag: false,
        };
        let mock = setup_mock(&[]);
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let result = dev.set_raw_timeinfo(&info);
        assert!(matches!(
            result,
            Err(DS3231Error::DateTime(TimeInfoError::InvalidDateTime))
        ));
        dev.destroy().done();
    }

    #[test]
    fn test_stage_write() {
        let (buffer, len) = stage_write::<ErrorKind>(0x05, &[0x12, 0x24]).unwrap();
        assert_eq!(len, 3);
        assert_eq!(&buffer[..len], &[0x05, 0x12, 0x24]);

        let (buffer, len) = stage_write::<ErrorKind>(0x00, &[]).unwrap();
        assert_eq!(len, 1);
        assert_eq!(buffer[0], 0x00);

        let (_, len) = stage_write::<ErrorKind>(0x00, &[0; TIMEINFO_LEN]).unwrap();
        assert_eq!(len, WRITE_BUFF_SIZE);
    }
}
