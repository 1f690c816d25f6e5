//! sram23-linux-gpio - Linux GPIO bit-bang SPI transport
//!
//! This crate drives a 23xx04M from four GPIO lines using the Linux
//! character device GPIO interface (gpiocdev). No SPI controller is needed,
//! which makes it useful on boards where the hardware SPI pins are taken.
//!
//! # Example
//!
//! ```no_run
//! use sram23_core::device::Sram;
//! use sram23_linux_gpio::{LinuxGpioSpi, LinuxGpioSpiConfig, Pins};
//!
//! let pins = Pins { cs: 25, sck: 11, mosi: 10, miso: 9 };
//! let config = LinuxGpioSpiConfig::new("/dev/gpiochip0", pins).with_clock_hz(200_000);
//! let spi = LinuxGpioSpi::open(&config)?;
//!
//! let mut sram = Sram::new(spi);
//! println!("{}", sram.decoded_status()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the sram23 CLI
//!
//! ```bash
//! # Default wiring (cs=17, sck=18, mosi=19, miso=16 on gpiochip0)
//! sram23 -t linux_gpio_spi status
//!
//! # Custom wiring and clock
//! sram23 -t linux_gpio_spi:gpiochip=1,cs=25,sck=11,mosi=10,miso=9,spispeed=500 stress
//! ```
//!
//! # Wiring
//!
//! | 23xx04M | Option | Direction |
//! |---------|--------|-----------|
//! | CS#     | `cs`   | output    |
//! | SCK     | `sck`  | output    |
//! | SI      | `mosi` | output    |
//! | SO      | `miso` | input     |
//!
//! HOLD# is tied high. The user needs read/write access to the
//! `/dev/gpiochipN` node.

pub mod device;
pub mod error;

pub use device::{parse_options, LinuxGpioSpi, LinuxGpioSpiConfig, Pins};
pub use error::{LinuxGpioError, Result};

use sram23_core::transport::SpiTransport;

/// Open a Linux GPIO SPI transport and return it boxed
///
/// Options are the (key, value) pairs of a transport string, see
/// [`parse_options`].
pub fn open_linux_gpio_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn SpiTransport + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxGpioSpi::open(&config)?;
    Ok(Box::new(spi))
}
