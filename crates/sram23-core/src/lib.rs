//! sram23-core - Core driver for Microchip 23AA04M/23LCV04M serial SRAM
//!
//! This crate implements the command protocol of the 23xx04M family of
//! 4-Mbit serial SRAMs: instruction framing, the byte and sequential
//! read/write operations, and the 16-bit status register with its
//! configuration fields. It is `no_std` compatible and talks to the chip
//! through the [`transport::SpiTransport`] trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc` and serde
//!   derives on the status field types)
//! - `alloc` - Enable the boxed transport blanket impl
//!
//! # Example
//!
//! ```ignore
//! use sram23_core::{device::Sram, status::Mode, transport::SpiTransport};
//!
//! fn roundtrip<T: SpiTransport>(transport: T) -> sram23_core::Result<()> {
//!     let mut sram = Sram::new(transport);
//!     sram.set_mode(Mode::Sequential)?;
//!     sram.sequential_write(0x001337, b"foo")?;
//!
//!     let mut buf = [0u8; 3];
//!     let n = sram.sequential_read(0x001337, &mut buf)?;
//!     assert_eq!(&buf[..n], b"foo");
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod device;
pub mod error;
pub mod protocol;
pub mod spi;
pub mod status;
pub mod transport;

pub use error::{Error, Result};
