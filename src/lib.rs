#![no_std]
//! This is a platform agnostic library for the Atmel/Microchip AT24Cxx I2C serial EEPROM series using [embedded-hal](https://github.com/rust-embedded/embedded-hal).
//!
//! The driver hides the page write boundary of the chip: any byte range can be written or read,
//! it is split into page aligned segments and every bus transaction is retried while the chip is busy.
//!
//! Multiple chips are supported:
//! * AT24C01 / AT24C02
//! * AT24C04 / AT24C08
//! * AT24C16
//! * AT24C32
//! * AT24C64
//! * AT24C128
//! * AT24C256
//! * AT24C512
//!
//! ```ignore
//! use at24cx::{address::Address, blocking::At24Cx, bus::WireBus, device::AT24C256};
//!
//! let mut eeprom = At24Cx::new(WireBus::new(i2c), delay, AT24C256, 0);
//! eeprom.write(Address(0x1fe), &[1, 2, 3, 4])?;
//! let mut buff = [0; 4];
//! eeprom.read(Address(0x1fe), &mut buff)?;
//! ```

pub mod address;
pub mod blocking;
pub mod bus;
pub mod device;
pub mod error;

use crate::error::Error;

/// Check that `length` bytes starting at `offset` fit in a chip of `capacity` bytes
pub(crate) fn check_range(capacity: u32, offset: u32, length: usize) -> Result<(), Error> {
    let Ok(length) = u32::try_from(length) else {
        return Err(Error::OutOfBounds);
    };
    if length > capacity || offset > capacity - length {
        return Err(Error::OutOfBounds);
    }
    Ok(())
}

/// Check that a single byte can be accessed at `offset`
pub(crate) fn check_address(capacity: u32, offset: u32) -> Result<(), Error> {
    if offset >= capacity {
        return Err(Error::OutOfBounds);
    }
    Ok(())
}
