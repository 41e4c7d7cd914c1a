use crate::device::Device;

/// An address on the memory chip
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(pub u16);

impl From<u16> for Address {
    fn from(addr: u16) -> Address {
        Address(addr)
    }
}

impl From<Address> for u16 {
    fn from(addr: Address) -> u16 {
        addr.0
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> u32 {
        addr.0 as u32
    }
}

/// The part of a transfer that fits in a single page
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Address of the first byte of the page
    pub page: u32,
    /// Offset of the segment inside the page
    pub offset: u32,
    /// Number of bytes in the segment
    pub len: usize,
    /// Position of the segment in the caller buffer
    pub start: usize,
}

impl Segment {
    /// Address of the first byte of the segment
    pub fn address(&self) -> u32 {
        self.page + self.offset
    }

    /// Range of the caller buffer covered by the segment
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Splits a byte range into page bounded segments.
///
/// The first segment runs from the start address to the end of its page,
/// every following one starts on a page boundary and is at most one page long.
#[derive(Debug, Clone)]
pub struct Segments {
    page_size: u32,
    page: u32,
    offset: u32,
    cursor: usize,
    count: usize,
}

impl Segments {
    pub fn new(device: &Device, address: Address, count: usize) -> Self {
        let address: u32 = address.into();
        Self {
            page_size: device.page_size(),
            page: address & device.page_mask(),
            offset: address & device.page_offset_mask(),
            cursor: 0,
            count,
        }
    }
}

impl Iterator for Segments {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let remaining = self.count - self.cursor;
        if remaining == 0 {
            return None;
        }

        let room = (self.page_size - self.offset) as usize;
        let segment = Segment {
            page: self.page,
            offset: self.offset,
            len: remaining.min(room),
            start: self.cursor,
        };

        // u32 arithmetic, the page after the last one of a 64kB chip is 0x10000
        self.page += self.page_size;
        self.offset = 0;
        self.cursor += segment.len;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.cursor;
        if remaining == 0 {
            return (0, Some(0));
        }
        let first = ((self.page_size - self.offset) as usize).min(remaining);
        let n = 1 + (remaining - first).div_ceil(self.page_size as usize);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Segments {}
