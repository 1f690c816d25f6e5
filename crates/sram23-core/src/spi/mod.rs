//! SPI framing types
//!
//! This module provides the instruction set of the 23xx04M family, the
//! 3-byte address encoding and the command structure every transaction is
//! built from.

mod address;
mod command;
pub mod opcodes;

pub use address::{address_at, decode_address, encode_address, ADDRESS_BYTES, ADDRESS_MASK};
pub use command::{Header, Instruction, SramCommand, MAX_HEADER_LEN};
