//! 23xx04M instruction opcodes
//!
//! Opcodes as listed in the Microchip 23AA04M/23LCV04M datasheet. Only the
//! single-wire SPI subset is driven by this crate; the rest are defined so
//! that emulators and decoders can name them.

// Array access

/// Read data from memory starting at the selected address
pub const READ: u8 = 0x03;
/// High-speed read with a dummy byte (not driven by this crate)
pub const FAST_READ: u8 = 0x0B;
/// Write data to memory starting at the selected address
pub const WRITE: u8 = 0x02;

// I/O mode control

/// Enter SDI (dual I/O) access
pub const EDIO: u8 = 0x3B;
/// Enter SQI (quad I/O) access
pub const EQIO: u8 = 0x38;
/// Reset dual/quad I/O access back to SPI
pub const RSTIO: u8 = 0xFF;

// Status register

/// Read the 16-bit status register
pub const RDSR: u8 = 0x05;
/// Write the 16-bit status register
pub const WRSR: u8 = 0x01;
