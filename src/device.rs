use bit::BitIndex;

/// Base 7-bit bus address of the AT24 family, the chip select pins A2..A0 are the three low bits
pub const BASE_ADDRESS: u8 = 0x50;

/// Geometry of a chip: total addressable size and physical page size, both powers of two
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    total_size: u32,
    page_size: u32,
}

impl Device {
    /// Describe a chip. Panics if the sizes are not powers of two, if the page is larger than the chip
    /// or if the chip does not fit in a 16-bit address space.
    pub const fn new(total_size: u32, page_size: u32) -> Self {
        assert!(total_size.is_power_of_two());
        assert!(page_size.is_power_of_two());
        assert!(page_size <= total_size);
        assert!(total_size <= 0x10000);
        Self {
            total_size,
            page_size,
        }
    }

    /// Total size of the chip in bytes
    pub const fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Size of a page in bytes, the largest write the chip accepts without wrapping
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub const fn page_offset_mask(&self) -> u32 {
        self.page_size - 1
    }

    pub const fn page_mask(&self) -> u32 {
        !self.page_offset_mask()
    }
}

/// 1Kb, 8 bytes pages
pub const AT24C01: Device = Device::new(0x80, 8);

/// 2Kb, 8 bytes pages
pub const AT24C02: Device = Device::new(0x100, 8);

/// 4Kb, 16 bytes pages
pub const AT24C04: Device = Device::new(0x200, 16);

/// 8Kb, 16 bytes pages
pub const AT24C08: Device = Device::new(0x400, 16);

/// 16Kb, 16 bytes pages
pub const AT24C16: Device = Device::new(0x800, 16);

/// 32Kb, 32 bytes pages
pub const AT24C32: Device = Device::new(0x1000, 32);

/// 64Kb, 32 bytes pages
pub const AT24C64: Device = Device::new(0x2000, 32);

/// 128Kb, 64 bytes pages
pub const AT24C128: Device = Device::new(0x4000, 64);

/// 256Kb, 64 bytes pages
pub const AT24C256: Device = Device::new(0x8000, 64);

/// 512Kb, 128 bytes pages
pub const AT24C512: Device = Device::new(0x10000, 128);

/// Every chip of the family, smallest first
pub const ALL: [Device; 10] = [
    AT24C01, AT24C02, AT24C04, AT24C08, AT24C16, AT24C32, AT24C64, AT24C128, AT24C256, AT24C512,
];

/// 7-bit bus address for the given state of the A2..A0 pins. Only the three low bits of `pins` are used.
pub fn bus_address(pins: u8) -> u8 {
    let mut address = BASE_ADDRESS;
    address.set_bit_range(0..3, pins.bit_range(0..3));
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(AT24C256.page_offset_mask(), 0x3f);
        assert_eq!(AT24C256.page_mask(), 0xffff_ffc0);
        assert_eq!(AT24C01.page_offset_mask(), 0x07);
    }

    #[test]
    fn chips_grow() {
        for pair in ALL.windows(2) {
            assert!(pair[0].total_size() < pair[1].total_size());
            assert!(pair[0].page_size() <= pair[1].page_size());
        }
    }

    #[test]
    fn addresses() {
        assert_eq!(bus_address(0), 0x50);
        assert_eq!(bus_address(0b101), 0x55);
        assert_eq!(bus_address(7), 0x57);
        // Upper bits are ignored
        assert_eq!(bus_address(0xf9), 0x51);
    }

    #[test]
    #[should_panic]
    fn page_larger_than_chip() {
        Device::new(8, 16);
    }

    #[test]
    #[should_panic]
    fn page_not_power_of_two() {
        Device::new(0x100, 24);
    }
}
