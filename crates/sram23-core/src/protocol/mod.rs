//! SRAM protocol implementations
//!
//! Free functions that build the instruction frames of the 23xx04M family
//! and run them over any [`SpiTransport`](crate::transport::SpiTransport).

pub mod sram;

pub use crate::status::decode_status;
pub use sram::*;
