#![no_std]
#![no_main]

use at24cx::{address::Address, blocking::At24Cx, bus::WireBus, device::AT24C256};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    config::Config,
    peripherals,
    twim::{self, Twim},
};
use embassy_time::Delay;
use panic_probe as _;

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(Config::default());

    // AT24C256 on the Arduino header of the DK, A2..A0 tied low
    let mut twim_config = twim::Config::default();
    twim_config.frequency = twim::Frequency::K400;
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim_config);
    let mut memory = At24Cx::new(WireBus::new(i2c), Delay, AT24C256, 0);

    // Start 6 bytes before the end of a page and cross two boundaries
    const START: u16 = 64 - 6;
    const LEN: usize = 6 + 64 + 10;
    let mut data = [0u8; LEN];
    for (i, e) in data.iter_mut().enumerate() {
        *e = i as u8;
    }
    let mut buf = [0u8; LEN];

    memory.write(Address(START), &data).unwrap();
    memory.read(Address(START), &mut buf).unwrap();
    assert_eq!(buf, data);

    let byte = memory.read_byte(Address(0)).unwrap();
    memory.write_byte(Address(0), !byte).unwrap();
    assert_eq!(memory.read_byte(Address(0)).unwrap(), !byte);

    defmt::info!("Example completed");
    cortex_m::asm::bkpt();
}
