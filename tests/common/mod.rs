#![allow(dead_code)]

use std::collections::VecDeque;

use at24cx::{bus::Bus, device::Device, error::BusError};
use embedded_hal::delay::DelayNs;

/// A transaction seen by the simulated chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Address and payload length of a write
    Write { address: u16, len: usize },
    /// Address only write, setting the read pointer
    Seek { address: u16 },
    /// Read request and the quantity asked for
    Request { quantity: usize },
    /// A transaction rejected with the given error
    Failed(BusError),
}

/// Simulated AT24 chip behind a buffered bus.
///
/// Writes wrap inside their page like the real chip, so a driver crossing a page
/// in one transaction corrupts the start of the page.
pub struct SimBus {
    pub device: Device,
    pub bus_address: u8,
    pub memory: Vec<u8>,
    pub events: Vec<Event>,
    /// Bytes a single transaction can carry, address included
    pub tx_capacity: usize,
    /// Largest read request served at once
    pub rx_capacity: usize,
    /// Errors returned by the next transactions, in order
    pub faults: VecDeque<BusError>,
    /// Number of next read requests returning no data
    pub empty_reads: usize,
    /// Fail every transaction after this many succeeded
    pub fail_after: Option<usize>,
    pub clock: Option<u32>,
    pub begun: bool,
    target: u8,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
    pointer: u32,
    succeeded: usize,
}

impl SimBus {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            bus_address: 0x50,
            memory: vec![0xff; device.total_size() as usize],
            events: Vec::new(),
            tx_capacity: usize::MAX,
            rx_capacity: usize::MAX,
            faults: VecDeque::new(),
            empty_reads: 0,
            fail_after: None,
            clock: None,
            begun: false,
            target: 0,
            tx: Vec::new(),
            rx: VecDeque::new(),
            pointer: 0,
            succeeded: 0,
        }
    }

    pub fn fail(&mut self, error: BusError, times: usize) {
        self.faults.extend(std::iter::repeat(error).take(times));
    }

    pub fn writes(&self) -> Vec<(u16, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write { address, len } => Some((*address, *len)),
                _ => None,
            })
            .collect()
    }

    pub fn requests(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Request { quantity } => Some(*quantity),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Failed(_)))
            .count()
    }

    fn injected_fault(&mut self) -> Option<BusError> {
        if let Some(limit) = self.fail_after {
            if self.succeeded >= limit {
                return Some(BusError::AddressNack);
            }
        }
        self.faults.pop_front()
    }
}

impl Bus for SimBus {
    fn begin(&mut self) {
        self.begun = true;
    }

    fn set_clock(&mut self, hz: u32) {
        self.clock = Some(hz);
    }

    fn begin_transmission(&mut self, address: u8) {
        self.target = address;
        self.tx.clear();
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.tx_capacity - self.tx.len());
        self.tx.extend_from_slice(&bytes[..n]);
        n
    }

    fn end_transmission(&mut self) -> Result<(), BusError> {
        let fault = if self.target != self.bus_address {
            Some(BusError::AddressNack)
        } else {
            self.injected_fault()
        };
        if let Some(error) = fault {
            self.events.push(Event::Failed(error));
            return Err(error);
        }
        assert!(self.tx.len() >= 2, "transaction without address");

        let address = u16::from_be_bytes([self.tx[0], self.tx[1]]);
        let payload = &self.tx[2..];
        let size = self.device.total_size();
        let page = address as u32 & self.device.page_mask();
        let mut offset = address as u32 & self.device.page_offset_mask();
        for byte in payload {
            self.memory[((page + offset) % size) as usize] = *byte;
            offset = (offset + 1) & self.device.page_offset_mask();
        }
        self.pointer = (page + offset) % size;

        if payload.is_empty() {
            self.events.push(Event::Seek { address });
        } else {
            self.events.push(Event::Write {
                address,
                len: payload.len(),
            });
        }
        self.succeeded += 1;
        Ok(())
    }

    fn request_from(&mut self, address: u8, quantity: usize) -> usize {
        self.events.push(Event::Request { quantity });
        self.rx.clear();
        if address != self.bus_address {
            return 0;
        }
        if self.empty_reads > 0 {
            self.empty_reads -= 1;
            return 0;
        }
        let size = self.device.total_size();
        let n = quantity.min(self.rx_capacity);
        for _ in 0..n {
            self.rx.push_back(self.memory[self.pointer as usize]);
            self.pointer = (self.pointer + 1) % size;
        }
        n
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn max_bulk_read(&self) -> usize {
        self.rx_capacity
    }
}

/// Delay recording the total time waited
#[derive(Debug, Default)]
pub struct NoDelay {
    pub waited_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_ns += ns as u64;
    }
}

pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
