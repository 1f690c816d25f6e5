//! SRAM instruction set and command structure

use super::address::{encode_address, ADDRESS_BYTES};
use super::opcodes;
use crate::error::Error;

/// Longest header: one instruction byte plus a 3-byte address
pub const MAX_HEADER_LEN: usize = 1 + ADDRESS_BYTES;

/// Instructions understood by the 23xx04M family
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Instruction {
    /// Read data from memory
    Read = opcodes::READ,
    /// High-speed read with dummy cycles
    FastRead = opcodes::FAST_READ,
    /// Write data to memory
    Write = opcodes::WRITE,
    /// Enter dual I/O access
    EnterDualIo = opcodes::EDIO,
    /// Enter quad I/O access
    EnterQuadIo = opcodes::EQIO,
    /// Reset dual/quad I/O access
    ResetIo = opcodes::RSTIO,
    /// Read the status register
    ReadStatus = opcodes::RDSR,
    /// Write the status register
    WriteStatus = opcodes::WRSR,
}

impl Instruction {
    /// Every instruction of the family, in datasheet order
    pub const ALL: [Instruction; 8] = [
        Self::Read,
        Self::FastRead,
        Self::Write,
        Self::EnterDualIo,
        Self::EnterQuadIo,
        Self::ResetIo,
        Self::ReadStatus,
        Self::WriteStatus,
    ];

    /// The opcode byte sent on the wire
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Whether the instruction carries a 3-byte address
    pub const fn has_address(self) -> bool {
        matches!(self, Self::Read | Self::FastRead | Self::Write)
    }

    /// Whether this driver issues the instruction
    ///
    /// Fast read and the dual/quad I/O mode switches are not driven.
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Read | Self::Write | Self::ReadStatus | Self::WriteStatus
        )
    }

    /// Datasheet mnemonic
    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::FastRead => "FAST_READ",
            Self::Write => "WRITE",
            Self::EnterDualIo => "EDIO",
            Self::EnterQuadIo => "EQIO",
            Self::ResetIo => "RSTIO",
            Self::ReadStatus => "RDSR",
            Self::WriteStatus => "WRSR",
        }
    }
}

impl TryFrom<u8> for Instruction {
    type Error = Error;

    fn try_from(opcode: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.opcode() == opcode)
            .ok_or(Error::UnsupportedInstruction(opcode))
    }
}

impl core::fmt::Display for Instruction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.opcode())
    }
}

/// Encoded instruction + address bytes of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    bytes: [u8; MAX_HEADER_LEN],
    len: usize,
}

impl Header {
    /// The header bytes in wire order
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of header bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a header carries at least the instruction byte
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A single SRAM transaction
///
/// Designed to avoid allocation - uses slices for data.
/// The lifetime parameter `'a` ties the command to the buffers it references.
pub struct SramCommand<'a> {
    /// The instruction
    pub instruction: Instruction,

    /// Address (for READ/WRITE)
    pub address: Option<u32>,

    /// Data to write after the instruction/address
    pub write_data: &'a [u8],

    /// Buffer to read into after the write phase
    pub read_buf: &'a mut [u8],
}

impl<'a> SramCommand<'a> {
    /// Create a READ command filling `buf` from `addr`
    pub fn read(addr: u32, buf: &'a mut [u8]) -> Self {
        Self {
            instruction: Instruction::Read,
            address: Some(addr),
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a WRITE command storing `data` at `addr`
    pub fn write(addr: u32, data: &'a [u8]) -> Self {
        Self {
            instruction: Instruction::Write,
            address: Some(addr),
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Create a RDSR command
    pub fn read_status(buf: &'a mut [u8]) -> Self {
        Self {
            instruction: Instruction::ReadStatus,
            address: None,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a WRSR command
    pub fn write_status(data: &'a [u8]) -> Self {
        Self {
            instruction: Instruction::WriteStatus,
            address: None,
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Number of instruction + address bytes
    pub fn header_len(&self) -> usize {
        1 + if self.address.is_some() { ADDRESS_BYTES } else { 0 }
    }

    /// Encode the instruction and address
    pub fn header(&self) -> Header {
        let mut bytes = [0u8; MAX_HEADER_LEN];
        bytes[0] = self.instruction.opcode();
        if let Some(addr) = self.address {
            bytes[1..].copy_from_slice(&encode_address(addr));
        }
        Header {
            bytes,
            len: self.header_len(),
        }
    }

    /// Number of bytes clocked out by the host (header + write data)
    pub fn write_len(&self) -> usize {
        self.header_len() + self.write_data.len()
    }

    /// Returns true if this command has a read phase
    pub fn has_read(&self) -> bool {
        !self.read_buf.is_empty()
    }

    /// Returns true if this command has a write data phase
    pub fn has_write(&self) -> bool {
        !self.write_data.is_empty()
    }
}
