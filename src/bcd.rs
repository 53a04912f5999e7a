//! Packed binary-coded decimal helpers.
//!
//! The DS3231 keeps its time registers as two BCD digits per byte: the high
//! nibble is the tens digit and the low nibble the ones digit. Flag bits that
//! share a byte with a value must be masked off (see [`crate::registers`])
//! before the byte is handed to [`bcd_to_decimal`].

/// Decodes a packed BCD byte into its decimal value.
///
/// Nibbles are not range checked. A byte such as `0xA5` decodes to
/// `10 * 10 + 5 = 105`, the same thing the hardware counters would mean by it.
pub const fn bcd_to_decimal(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Encodes a decimal value in the range 0-99 as packed BCD.
pub const fn decimal_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}
