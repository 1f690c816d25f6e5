//! SRAM device handle
//!
//! [`Sram`] owns a transport and exposes the chip's operations as methods.
//! On top of the raw protocol it can reject accesses that run past the end
//! of the array and apply several status fields in one read-modify-write.

use crate::error::{Error, Result};
use crate::protocol;
use crate::spi::address_at;
use crate::status::{DecodedStatus, DriveStrength, Mode, PageSize, Settings, SlewRate, Status};
use crate::transport::SpiTransport;

/// Static description of a supported part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipInfo {
    /// Part names covered by this entry
    pub names: &'static [&'static str],
    /// Array size in bytes
    pub capacity: u32,
    /// Status register value after power-up
    pub default_status: Status,
    /// Highest SPI clock in Hz
    pub max_clock_hz: u32,
}

/// 23AA04M (1.7-2.2 V) and 23LCV04M (2.5-5.5 V), 4 Mbit
pub const SRAM_23XX04M: ChipInfo = ChipInfo {
    names: &["23AA04M", "23LCV04M"],
    capacity: 512 * 1024,
    default_status: Status::DEFAULT,
    max_clock_hz: 143_000_000,
};

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SramConfig {
    /// Array size in bytes
    pub capacity: u32,
    /// Reject accesses past `capacity` with [`Error::AddressOutOfBounds`]
    pub check_bounds: bool,
}

impl SramConfig {
    /// Configuration for a known part, bounds checking on
    pub const fn for_chip(chip: &ChipInfo) -> Self {
        Self {
            capacity: chip.capacity,
            check_bounds: true,
        }
    }

    /// Set the capacity
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Enable or disable bounds checking
    pub fn check_bounds(mut self, enabled: bool) -> Self {
        self.check_bounds = enabled;
        self
    }

    /// Whether `len` bytes starting at `addr` fit in the array
    pub fn is_valid_range(&self, addr: u32, len: usize) -> bool {
        (addr as u64) + (len as u64) <= self.capacity as u64
    }
}

impl Default for SramConfig {
    fn default() -> Self {
        Self::for_chip(&SRAM_23XX04M)
    }
}

/// A 23xx04M on a transport
///
/// Each method runs one transaction, except the status setters which run
/// two (read, then write) under the same `&mut self` borrow.
pub struct Sram<T: SpiTransport> {
    transport: T,
    config: SramConfig,
}

impl<T: SpiTransport> Sram<T> {
    /// Create a driver with the default 23xx04M configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SramConfig::default())
    }

    /// Create a driver with an explicit configuration
    pub fn with_config(transport: T, config: SramConfig) -> Self {
        Self { transport, config }
    }

    /// Driver configuration
    pub fn config(&self) -> &SramConfig {
        &self.config
    }

    /// Array size in bytes
    pub fn capacity(&self) -> u32 {
        self.config.capacity
    }

    /// Borrow the transport
    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back
    pub fn release(self) -> T {
        self.transport
    }

    fn check(&self, addr: u32, len: usize) -> Result<()> {
        if self.config.check_bounds && !self.config.is_valid_range(addr, len) {
            return Err(Error::AddressOutOfBounds);
        }
        Ok(())
    }

    /// Write one byte
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<()> {
        self.check(addr, 1)?;
        protocol::write_byte(&mut self.transport, addr, value)
    }

    /// Write `data` starting at `addr` in one transaction
    pub fn sequential_write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.check(addr, data.len())?;
        protocol::sequential_write(&mut self.transport, addr, data)
    }

    /// Read one byte
    pub fn read_byte(&mut self, addr: u32) -> Result<u8> {
        self.check(addr, 1)?;
        protocol::read_byte(&mut self.transport, addr)
    }

    /// Fill `buf` from `addr` in one transaction, returning the count read
    pub fn sequential_read(&mut self, addr: u32, buf: &mut [u8]) -> Result<usize> {
        self.check(addr, buf.len())?;
        protocol::sequential_read(&mut self.transport, addr, buf)
    }

    /// Fill `buf` completely, failing with [`Error::ShortRead`] otherwise
    pub fn read_exact(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let n = self.sequential_read(addr, buf)?;
        if n != buf.len() {
            return Err(Error::ShortRead {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }

    /// Read back `expected.len()` bytes from `addr` and compare
    ///
    /// Reads in 256-byte pieces. Returns [`Error::VerifyError`] on the first
    /// mismatching piece.
    pub fn verify(&mut self, addr: u32, expected: &[u8]) -> Result<()> {
        self.check(addr, expected.len())?;
        let mut buf = [0u8; 256];
        let mut done = 0usize;
        for chunk in expected.chunks(buf.len()) {
            let offset = address_at(addr, done);
            let got = &mut buf[..chunk.len()];
            self.read_exact(offset, got)?;
            if got != chunk {
                if let Some(i) = got.iter().zip(chunk).position(|(a, b)| a != b) {
                    log::debug!(
                        "mismatch at {:#08x}: read {:#04x}, expected {:#04x}",
                        offset as usize + i,
                        got[i],
                        chunk[i]
                    );
                }
                return Err(Error::VerifyError);
            }
            done += chunk.len();
        }
        Ok(())
    }

    /// Read the status register
    pub fn status(&mut self) -> Result<Status> {
        protocol::read_status(&mut self.transport)
    }

    /// Read and decode the status register
    pub fn decoded_status(&mut self) -> Result<DecodedStatus> {
        protocol::read_decoded_status(&mut self.transport)
    }

    /// Overwrite the whole status register
    pub fn set_status(&mut self, status: Status) -> Result<()> {
        protocol::write_status(&mut self.transport, status)
    }

    /// Change the operating mode
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        protocol::set_mode(&mut self.transport, mode)
    }

    /// Change the page size
    pub fn set_page_size(&mut self, size: PageSize) -> Result<()> {
        protocol::set_page_size(&mut self.transport, size)
    }

    /// Change the output slew rate
    pub fn set_slew_rate(&mut self, rate: SlewRate) -> Result<()> {
        protocol::set_slew_rate(&mut self.transport, rate)
    }

    /// Change the output drive strength
    pub fn set_drive_strength(&mut self, strength: DriveStrength) -> Result<()> {
        protocol::set_drive_strength(&mut self.transport, strength)
    }

    /// Apply several field changes with one read-modify-write
    ///
    /// Returns the value written to the register.
    pub fn apply(&mut self, settings: &Settings) -> Result<Status> {
        protocol::update_status(&mut self.transport, settings)
    }
}
