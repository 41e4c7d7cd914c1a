//! The two-wire transport used by the driver.
//!
//! [`Bus`] models a buffered master: a transaction is started, bytes are queued, and the whole
//! transaction is sent when it is ended. Reads are requested as a block and drained byte by byte.
//! A transport may accept fewer bytes than offered, and return fewer than requested, the driver
//! always works with the counts it gets back.
//!
//! [`WireBus`] implements it on top of any [`embedded_hal::i2c::I2c`].

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};

use crate::error::BusError;

/// Default buffer length of [`WireBus`]
pub const BUFFER_LENGTH: usize = 32;

/// Transport capability consumed by the driver
pub trait Bus {
    /// Initialize the bus. The default does nothing, for buses configured by their HAL
    fn begin(&mut self) {}

    /// Set the bus clock frequency in Hz. The default does nothing, for buses configured by their HAL
    fn set_clock(&mut self, _hz: u32) {}

    /// Start a write transaction to a device
    fn begin_transmission(&mut self, address: u8);

    /// Queue bytes in the current transaction, returns how many were accepted
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Send the queued transaction
    fn end_transmission(&mut self) -> Result<(), BusError>;

    /// Read up to `quantity` bytes from a device, returns how many were received
    fn request_from(&mut self, address: u8, quantity: usize) -> usize;

    /// Number of received bytes not drained yet
    fn available(&mut self) -> usize;

    /// Drain one received byte
    fn read(&mut self) -> Option<u8>;

    /// Largest quantity that can safely be passed to [`Bus::request_from`]
    fn max_bulk_read(&self) -> usize {
        usize::MAX
    }
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn begin(&mut self) {
        B::begin(self)
    }

    fn set_clock(&mut self, hz: u32) {
        B::set_clock(self, hz)
    }

    fn begin_transmission(&mut self, address: u8) {
        B::begin_transmission(self, address)
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        B::write(self, bytes)
    }

    fn end_transmission(&mut self) -> Result<(), BusError> {
        B::end_transmission(self)
    }

    fn request_from(&mut self, address: u8, quantity: usize) -> usize {
        B::request_from(self, address, quantity)
    }

    fn available(&mut self) -> usize {
        B::available(self)
    }

    fn read(&mut self) -> Option<u8> {
        B::read(self)
    }

    fn max_bulk_read(&self) -> usize {
        B::max_bulk_read(self)
    }
}

/// Map an I2C error to a transaction outcome
pub fn classify(kind: ErrorKind) -> BusError {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        | ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown) => BusError::AddressNack,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => BusError::DataNack,
        _ => BusError::Finish,
    }
}

/// Buffered [`Bus`] over an [`I2c`] implementation.
///
/// Queued bytes are held in a `N` bytes buffer and sent with a single I2C write, received bytes
/// land in another `N` bytes buffer. Like the Arduino `Wire` library, a transaction therefore
/// carries at most `N` bytes, address included.
pub struct WireBus<I2C, const N: usize = BUFFER_LENGTH> {
    i2c: I2C,
    target: u8,
    tx: [u8; N],
    tx_len: usize,
    rx: [u8; N],
    rx_len: usize,
    rx_pos: usize,
}

impl<I2C> WireBus<I2C>
where
    I2C: I2c,
{
    /// Create a bus with buffers of [`BUFFER_LENGTH`] bytes
    pub fn new(i2c: I2C) -> Self {
        Self::with_buffer(i2c)
    }
}

impl<I2C, const N: usize> WireBus<I2C, N>
where
    I2C: I2c,
{
    const ROOM_FOR_PAYLOAD: () = assert!(N > 2, "the buffer must hold the address and a byte");

    /// Create a bus with buffers of `N` bytes. `N` must leave room for the two address bytes and
    /// at least one byte of payload, which is checked at compile time
    pub fn with_buffer(i2c: I2C) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::ROOM_FOR_PAYLOAD;
        Self {
            i2c,
            target: 0,
            tx: [0; N],
            tx_len: 0,
            rx: [0; N],
            rx_len: 0,
            rx_pos: 0,
        }
    }

    /// Give back the underlying I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, const N: usize> Bus for WireBus<I2C, N>
where
    I2C: I2c,
{
    fn begin_transmission(&mut self, address: u8) {
        self.target = address;
        self.tx_len = 0;
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(N - self.tx_len);
        self.tx[self.tx_len..self.tx_len + n].copy_from_slice(&bytes[..n]);
        self.tx_len += n;
        n
    }

    fn end_transmission(&mut self) -> Result<(), BusError> {
        let len = core::mem::take(&mut self.tx_len);
        self.i2c
            .write(self.target, &self.tx[..len])
            .map_err(|e| classify(e.kind()))
    }

    fn request_from(&mut self, address: u8, quantity: usize) -> usize {
        let quantity = quantity.min(N);
        self.rx_pos = 0;
        self.rx_len = match self.i2c.read(address, &mut self.rx[..quantity]) {
            Ok(()) => quantity,
            Err(_) => 0,
        };
        self.rx_len
    }

    fn available(&mut self) -> usize {
        self.rx_len - self.rx_pos
    }

    fn read(&mut self) -> Option<u8> {
        if self.rx_pos >= self.rx_len {
            return None;
        }
        let byte = self.rx[self.rx_pos];
        self.rx_pos += 1;
        Some(byte)
    }

    fn max_bulk_read(&self) -> usize {
        N
    }
}
