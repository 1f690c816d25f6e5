//! sram23-linux-spi - Linux spidev transport
//!
//! This crate drives a 23xx04M through a Linux SPI controller exposed as
//! `/dev/spidevX.Y`, where X is the bus number and Y is the chip select.
//!
//! # Example
//!
//! ```no_run
//! use sram23_core::device::Sram;
//! use sram23_linux_spi::{LinuxSpi, LinuxSpiConfig, SpiMode};
//!
//! let config = LinuxSpiConfig::new("/dev/spidev0.0")
//!     .clock_hz(10_000_000)
//!     .mode(SpiMode::Mode3);
//! let spi = LinuxSpi::open(&config)?;
//!
//! let mut sram = Sram::new(spi);
//! println!("{}", sram.decoded_status()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the sram23 CLI
//!
//! ```bash
//! sram23 -t linux_spi:dev=/dev/spidev0.0 status
//! sram23 -t linux_spi:dev=/dev/spidev0.0,spispeed=10000,mode=3 stress
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y`
//! - A controller driver that honors `cs_change` on the last transfer

pub mod device;
pub mod error;

pub use device::{parse_options, LinuxSpi, LinuxSpiConfig, SpiMode};
pub use error::{LinuxSpiError, Result};

use sram23_core::transport::SpiTransport;

/// Open a Linux SPI device and return a boxed transport
///
/// Options are the (key, value) pairs of a transport string, see
/// [`parse_options`].
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn SpiTransport + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(Box::new(spi))
}
