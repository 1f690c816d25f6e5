//! Software SPI
//!
//! Transports without an SPI controller, such as `linux_gpio_spi`, drive
//! the four bus lines themselves through [`BitbangPins`] and use the
//! helpers here to generate the waveform. Controllers with hardware SPI
//! implement [`SpiTransport`](super::SpiTransport) directly.
//!
//! Bytes are shifted MSB first. Data changes while the clock is low and is
//! sampled on the rising edge, which the 23xx04M accepts in both SPI mode 0
//! and mode 3. The clock idles low.

/// Line-level access to a software SPI bus
pub trait BitbangPins {
    /// Drive CS#; `asserted` pulls the line low
    fn drive_cs(&mut self, asserted: bool);

    /// Drive SCK
    fn drive_clock(&mut self, high: bool);

    /// Drive the host-to-chip data line (SI on the chip)
    fn drive_data(&mut self, high: bool);

    /// Sample the chip-to-host data line (SO on the chip)
    fn sample_data(&mut self) -> bool;

    /// Wait half a clock period
    fn wait_half_period(&mut self);

    /// Pull the clock low and present the next data bit
    ///
    /// Backends that can change two lines in one operation may override it.
    fn clock_low_with_data(&mut self, data: bool) {
        self.drive_clock(false);
        self.drive_data(data);
    }
}

/// Clock one byte out while clocking one byte in
pub fn exchange_byte<P: BitbangPins + ?Sized>(pins: &mut P, out: u8) -> u8 {
    let mut input = 0u8;
    for bit in (0..8).rev() {
        pins.clock_low_with_data(out & (1 << bit) != 0);
        pins.wait_half_period();
        pins.drive_clock(true);
        input = (input << 1) | u8::from(pins.sample_data());
        pins.wait_half_period();
    }
    input
}

/// Clock out `data`, discarding what comes back
pub fn shift_out<P: BitbangPins + ?Sized>(pins: &mut P, data: &[u8]) {
    for &byte in data {
        exchange_byte(pins, byte);
    }
}

/// Fill `buf` while holding the data line low
pub fn shift_in<P: BitbangPins + ?Sized>(pins: &mut P, buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        *byte = exchange_byte(pins, 0x00);
    }
}

/// Start a transaction: clock low, then CS# low
pub fn assert_cs<P: BitbangPins + ?Sized>(pins: &mut P) {
    pins.drive_clock(false);
    pins.drive_cs(true);
    pins.wait_half_period();
}

/// End a transaction: clock low, then CS# high
pub fn release_cs<P: BitbangPins + ?Sized>(pins: &mut P) {
    pins.drive_clock(false);
    pins.wait_half_period();
    pins.drive_cs(false);
    pins.wait_half_period();
}
