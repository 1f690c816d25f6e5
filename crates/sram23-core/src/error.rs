//! Error types for sram23-core
//!
//! Every driver and transport operation reports failures with [`Error`].
//! It is `Copy` and needs no allocator.

use core::fmt;

/// Failure of a driver or transport operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Transfer errors
    /// Transport accepted fewer bytes than the frame required
    ShortWrite {
        /// Number of bytes in the frame
        expected: usize,
        /// Number of bytes actually clocked out
        actual: usize,
    },
    /// Transport returned fewer bytes than the operation required
    ShortRead {
        /// Number of bytes requested
        expected: usize,
        /// Number of bytes actually received
        actual: usize,
    },
    /// Transfer stalled past the transport's timeout
    Timeout,
    /// The transport reported a hardware or driver fault
    BusFault,
    /// Chip select could not be asserted or released
    ChipSelectFailed,

    // Protocol errors
    /// Instruction is not implemented by this driver or transport
    UnsupportedInstruction(u8),
    /// A raw value does not belong to the field it was given for
    InvalidArgument,

    // Address errors
    /// Access extends beyond the chip's capacity
    AddressOutOfBounds,

    // Verification
    /// Data read back does not match what was written
    VerifyError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortWrite { expected, actual } => {
                write!(f, "short write: {} of {} bytes sent", actual, expected)
            }
            Self::ShortRead { expected, actual } => {
                write!(f, "short read: {} of {} bytes received", actual, expected)
            }
            Self::Timeout => write!(f, "transfer timed out"),
            Self::BusFault => write!(f, "bus fault"),
            Self::ChipSelectFailed => write!(f, "chip select failed"),
            Self::UnsupportedInstruction(op) => {
                write!(f, "instruction 0x{:02X} not supported", op)
            }
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::AddressOutOfBounds => write!(f, "access extends past the end of the array"),
            Self::VerifyError => write!(f, "data read back differs from data written"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result of a driver or transport operation
pub type Result<T> = core::result::Result<T, Error>;
