//! Async implementation of the DS3231 time info driver.
//!
//! This module provides an async interface to the DS3231 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled.
//!
//! The awaited I2C call is the only suspension point of each operation, so a
//! read can be bounded by wrapping it in the executor's timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_timeinfo::asynch::DS3231;
//!
//! // Initialize device
//! let mut rtc = DS3231::create(i2c, 0x68)?;
//!
//! // Read the time registers asynchronously
//! let info = rtc.raw_timeinfo().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;

use crate::{
    check_address, stage_write, DS3231Error, RegAddr, TimeInfo, TimeRepresentation, TIMEINFO_LEN,
};

/// DS3231 Real-Time Clock async driver.
///
/// This struct provides the async interface to the DS3231 RTC device.
/// It supports async I2C operations through the `embedded-hal-async` traits.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    time_representation: TimeRepresentation,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new DS3231 async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
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
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error::PayloadTooLong)` if `payload` is longer than a time block
    /// * `Err(DS3231Error::I2c)` on bus error
    pub async fn write_registers(
        &mut self,
        register: RegAddr,
        payload: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let (buffer, len) = stage_write::<I2C::Error>(register as u8, payload)?;
        trace!("DS3231: write {} bytes at {:?}", len, register);
        self.i2c.write(self.address, &buffer[..len]).await?;
        Ok(())
    }

    /// Reads consecutive registers starting at `register` into `buffer`.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error::I2c)` on bus error
    pub async fn read_registers(
        &mut self,
        register: RegAddr,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        trace!("DS3231: read {} bytes at {:?}", buffer.len(), register);
        self.i2c
            .write_read(self.address, &[register as u8], buffer)
            .await?;
        Ok(())
    }

    /// Reads and decodes the time registers.
    ///
    /// # Returns
    /// * `Ok(TimeInfo)` - The decoded register values
    /// * `Err(DS3231Error)` on error
    pub async fn raw_timeinfo(&mut self) -> Result<TimeInfo, DS3231Error<I2C::Error>> {
        let mut data = [0; TIMEINFO_LEN];
        self.read_registers(RegAddr::Seconds, &mut data).await?;
        Ok(data.into())
    }

    /// Encodes `info` and writes it to the time registers.
    pub async fn set_raw_timeinfo(
        &mut self,
        info: &TimeInfo,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data = <[u8; TIMEINFO_LEN]>::try_from(info).map_err(DS3231Error::DateTime)?;
        self.write_registers(RegAddr::Seconds, &data).await
    }

    /// Gets the current date and time from the device.
    ///
    /// # Returns
    /// * `Ok(NaiveDateTime)` - The current date and time
    /// * `Err(DS3231Error)` on error
    pub async fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        let info = self.raw_timeinfo().await?;
        info.to_datetime().map_err(DS3231Error::DateTime)
    }

    /// Sets the current date and time on the device.
    ///
    /// # Arguments
    /// * `datetime` - The date and time to set
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(DS3231Error)` on error
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let info = TimeInfo::from_datetime(datetime, self.time_representation)
            .map_err(DS3231Error::DateTime)?;
        self.set_raw_timeinfo(&info).await
    }
}
