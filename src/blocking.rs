use crate::{
    address::{Address, Segment, Segments},
    bus::Bus,
    check_address, check_range,
    device::{bus_address, Device},
    error::{BusError, Error},
};
use embedded_hal::delay::DelayNs;

/// Bus clock speeds supported by the whole family
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSpeed {
    /// 100kHz
    Standard = 100_000,
    /// 400kHz
    Fast = 400_000,
}

/// Retry and transfer settings of the driver
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Attempts per bus transaction before giving up, at least one is always made
    pub attempts: usize,
    /// Pause between two attempts, in microseconds
    pub retry_delay_us: u32,
    /// Upper bound on a single read request, on top of [`Bus::max_bulk_read`]
    pub bulk_read_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attempts: 10,
            retry_delay_us: 1_000,
            bulk_read_limit: None,
        }
    }
}

impl Config {
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn retry_delay_us(mut self, retry_delay_us: u32) -> Self {
        self.retry_delay_us = retry_delay_us;
        self
    }

    pub fn bulk_read_limit(mut self, limit: usize) -> Self {
        self.bulk_read_limit = Some(limit);
        self
    }
}

/// The generic AT24Cx driver.
///
/// Ranges are split on page boundaries, every bus transaction is retried while the chip
/// does not answer (it ignores its address during an internal write cycle).
/// A failure stops the operation, bytes transferred before it stay transferred.
pub struct At24Cx<BUS, D> {
    bus: BUS,
    delay: D,
    device: Device,
    address: u8,
    config: Config,
}

impl<BUS, D> At24Cx<BUS, D>
where
    BUS: Bus,
    D: DelayNs,
{
    /// Create a new instance with the default [`Config`].
    /// `pins` is the state of the A2..A0 chip select pins.
    pub fn new(bus: BUS, delay: D, device: Device, pins: u8) -> Self {
        Self::with_config(bus, delay, device, pins, Config::default())
    }

    /// Create a new instance
    pub fn with_config(bus: BUS, delay: D, device: Device, pins: u8, config: Config) -> Self {
        Self {
            bus,
            delay,
            device,
            address: bus_address(pins),
            config,
        }
    }

    /// Initialize the bus. Not needed if it was already initialized for another device
    pub fn begin(&mut self) {
        self.bus.begin();
    }

    /// Initialize the bus and set its clock
    pub fn begin_with_clock(&mut self, speed: ClockSpeed) {
        self.begin();
        self.bus.set_clock(speed as u32);
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// 7-bit bus address of the chip
    pub fn bus_address(&self) -> u8 {
        self.address
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give back the bus and the delay
    pub fn release(self) -> (BUS, D) {
        (self.bus, self.delay)
    }

    /// Write a single byte
    pub fn write_byte(&mut self, addr: Address, byte: u8) -> Result<(), Error> {
        check_address(self.device.total_size(), addr.into())?;
        let target = self.address;
        self.transaction(|bus| {
            select(bus, target, addr.0)?;
            if bus.write(&[byte]) != 1 {
                return Err(BusError::Finish);
            }
            bus.end_transmission()
        })
    }

    /// Read a single byte
    pub fn read_byte(&mut self, addr: Address) -> Result<u8, Error> {
        check_address(self.device.total_size(), addr.into())?;
        let target = self.address;
        self.transaction(|bus| {
            select(bus, target, addr.0)?;
            bus.end_transmission()?;
            bus.request_from(target, 1);
            if bus.available() == 0 {
                return Err(BusError::NoDataAvailable);
            }
            bus.read().ok_or(BusError::NoDataAvailable)
        })
    }

    /// Write n bytes starting at an address, page boundaries are handled internally
    pub fn write(&mut self, addr: Address, bytes: &[u8]) -> Result<(), Error> {
        check_range(self.device.total_size(), addr.into(), bytes.len())?;
        for segment in Segments::new(&self.device, addr, bytes.len()) {
            self.write_segment(&segment, &bytes[segment.range()])?;
        }
        Ok(())
    }

    /// Read n bytes starting at an address
    pub fn read(&mut self, addr: Address, buff: &mut [u8]) -> Result<(), Error> {
        check_range(self.device.total_size(), addr.into(), buff.len())?;
        for segment in Segments::new(&self.device, addr, buff.len()) {
            self.read_segment(&segment, &mut buff[segment.range()])?;
        }
        Ok(())
    }

    /// Write a segment, in as many transactions as the bus needs
    fn write_segment(&mut self, segment: &Segment, bytes: &[u8]) -> Result<(), Error> {
        debug_assert!(segment.page & self.device.page_offset_mask() == 0);
        debug_assert!(segment.offset as usize + bytes.len() <= self.device.page_size() as usize);

        let target = self.address;
        let mut written = 0;
        while written < bytes.len() {
            let addr = (segment.address() as usize + written) as u16;
            let pending = &bytes[written..];

            #[cfg(feature = "defmt")]
            defmt::trace!("Write to {=u16} len {=usize}", addr, pending.len());
            written += self.transaction(|bus| {
                select(bus, target, addr)?;
                let n = bus.write(pending);
                // Nothing queued, the chip would only see an address
                if n == 0 {
                    return Err(BusError::Finish);
                }
                bus.end_transmission()?;
                Ok(n)
            })?;
        }
        Ok(())
    }

    /// Read a segment, each request being capped by the bulk read limit
    fn read_segment(&mut self, segment: &Segment, buff: &mut [u8]) -> Result<(), Error> {
        debug_assert!(segment.page & self.device.page_offset_mask() == 0);
        debug_assert!(segment.offset as usize + buff.len() <= self.device.page_size() as usize);

        let target = self.address;
        let limit = self.bulk_read_limit();
        let mut read = 0;
        while read < buff.len() {
            let addr = (segment.address() as usize + read) as u16;
            let pending = &mut buff[read..];
            let quantity = pending.len().min(limit);

            #[cfg(feature = "defmt")]
            defmt::trace!("Read from {=u16} len {=usize}", addr, quantity);
            read += self.transaction(|bus| {
                // Dummy write to set the address pointer of the chip
                select(bus, target, addr)?;
                bus.end_transmission()?;

                let n = bus.request_from(target, quantity).min(quantity);
                if n == 0 || bus.available() == 0 {
                    return Err(BusError::NoDataAvailable);
                }
                for byte in &mut pending[..n] {
                    *byte = bus.read().ok_or(BusError::NoDataAvailable)?;
                }
                Ok(n)
            })?;
        }
        Ok(())
    }

    fn bulk_read_limit(&self) -> usize {
        let limit = match self.config.bulk_read_limit {
            Some(limit) => limit.min(self.bus.max_bulk_read()),
            None => self.bus.max_bulk_read(),
        };
        limit.max(1)
    }

    /// Run a whole transaction until it succeeds or the attempts are exhausted.
    /// A failed transaction is restarted from the beginning, address included.
    fn transaction<T>(
        &mut self,
        mut attempt: impl FnMut(&mut BUS) -> Result<T, BusError>,
    ) -> Result<T, Error> {
        let attempts = self.config.attempts.max(1);
        let mut tries = 0;
        loop {
            match attempt(&mut self.bus) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tries += 1;
                    if tries >= attempts {
                        #[cfg(feature = "defmt")]
                        defmt::error!("Transaction failed after {=usize} attempts: {}", tries, e);
                        return Err(Error::Bus(e));
                    }
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Attempt {=usize} failed: {}, retrying", tries, e);
                    self.delay.delay_us(self.config.retry_delay_us);
                }
            }
        }
    }
}

/// Start a transaction to `target` with the memory address queued
fn select<BUS: Bus>(bus: &mut BUS, target: u8, addr: u16) -> Result<(), BusError> {
    bus.begin_transmission(target);
    if bus.write(&addr.to_be_bytes()) != 2 {
        return Err(BusError::Finish);
    }
    Ok(())
}

/// Implementation of the `Storage` traits of the `embedded_storage` crate
mod es {
    use super::*;
    use embedded_storage::{ReadStorage, Storage};

    impl<BUS, D> ReadStorage for At24Cx<BUS, D>
    where
        BUS: Bus,
        D: DelayNs,
    {
        type Error = Error;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            check_range(self.device.total_size(), offset, bytes.len())?;
            if bytes.is_empty() {
                return Ok(());
            }
            At24Cx::read(self, Address(offset as u16), bytes)
        }

        fn capacity(&self) -> usize {
            self.device.total_size() as usize
        }
    }

    impl<BUS, D> Storage for At24Cx<BUS, D>
    where
        BUS: Bus,
        D: DelayNs,
    {
        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            check_range(self.device.total_size(), offset, bytes.len())?;
            if bytes.is_empty() {
                return Ok(());
            }
            At24Cx::write(self, Address(offset as u16), bytes)
        }
    }
}
