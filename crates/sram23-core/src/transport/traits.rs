//! Transport trait definitions
//!
//! A transport is the leaf of the stack: it asserts and releases chip select
//! and clocks bytes over a full-duplex serial channel. It knows nothing
//! about SRAM instructions.

use crate::error::Result;
use bitflags::bitflags;

bitflags! {
    /// Transport capability flags
    ///
    /// These flags describe how a transport drives the bus, for diagnostics
    /// and for callers that want to pick a transport.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransportFeatures: u32 {
        /// Chip select is driven by an SPI controller rather than a GPIO
        const HW_CHIP_SELECT = 1 << 0;
        /// Stalled transfers are bounded and reported as `Error::Timeout`
        const TIMEOUT        = 1 << 1;
        /// Clocks are generated in software
        const BITBANG        = 1 << 2;
        /// No physical bus, the chip is modelled in memory
        const EMULATED       = 1 << 3;
    }
}

impl Default for TransportFeatures {
    fn default() -> Self {
        TransportFeatures::empty()
    }
}

/// SPI transport trait
///
/// Every method maps to one step of a framed exchange. Callers bracket
/// transfers with [`select`](SpiTransport::select) and
/// [`deselect`](SpiTransport::deselect); the
/// [`Session`](super::Session) guard does this and guarantees the release
/// on every exit path.
///
/// ## Counts vs. errors
///
/// `transfer` and `receive` return how many bytes actually went over the
/// wire. A count lower than requested is an incomplete transfer and is
/// reported as-is, without retrying. Hard failures (a stalled bus, a driver
/// error) are returned as `Err`.
///
/// ## Example
///
/// ```ignore
/// impl SpiTransport for MyBus {
///     fn features(&self) -> TransportFeatures {
///         TransportFeatures::HW_CHIP_SELECT
///     }
///
///     fn max_transfer_len(&self) -> usize {
///         4096
///     }
///
///     fn select(&mut self) -> Result<()> {
///         self.cs.set_low();
///         Ok(())
///     }
///
///     fn deselect(&mut self) -> Result<()> {
///         self.cs.set_high();
///         Ok(())
///     }
///
///     fn transfer(&mut self, data: &[u8]) -> Result<usize> {
///         self.spi.write(data).map_err(|_| Error::BusFault)
///     }
///
///     fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
///         self.spi.read(buf).map_err(|_| Error::BusFault)
///     }
/// }
/// ```
pub trait SpiTransport {
    /// Get the capabilities of this transport
    fn features(&self) -> TransportFeatures;

    /// Largest number of bytes a single `transfer`/`receive` call accepts
    ///
    /// Longer transfers are split into several calls inside the same
    /// session, so chip select stays asserted across them.
    fn max_transfer_len(&self) -> usize;

    /// Assert chip select
    fn select(&mut self) -> Result<()>;

    /// Release chip select
    fn deselect(&mut self) -> Result<()>;

    /// Clock out `data`, discarding what comes back on MISO
    ///
    /// Returns the number of bytes actually sent.
    fn transfer(&mut self, data: &[u8]) -> Result<usize>;

    /// Clock in `buf.len()` bytes while sending don't-care bytes
    ///
    /// Returns the number of bytes actually received. Bytes of `buf` past
    /// that count are left as they were.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn features(&self) -> TransportFeatures {
        (**self).features()
    }

    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }

    fn select(&mut self) -> Result<()> {
        (**self).select()
    }

    fn deselect(&mut self) -> Result<()> {
        (**self).deselect()
    }

    fn transfer(&mut self, data: &[u8]) -> Result<usize> {
        (**self).transfer(data)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }
}

// Blanket impl for boxed transports to allow trait objects
#[cfg(feature = "alloc")]
impl SpiTransport for alloc::boxed::Box<dyn SpiTransport + Send> {
    fn features(&self) -> TransportFeatures {
        (**self).features()
    }

    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }

    fn select(&mut self) -> Result<()> {
        (**self).select()
    }

    fn deselect(&mut self) -> Result<()> {
        (**self).deselect()
    }

    fn transfer(&mut self, data: &[u8]) -> Result<usize> {
        (**self).transfer(data)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }
}

/// Information about a transport
#[derive(Debug, Clone)]
pub struct TransportInfo {
    /// Name of the transport
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
    /// Whether this transport requires elevated privileges
    pub requires_root: bool,
}
