//! Status register model
//!
//! The register holds the operating mode, the page size and the output
//! driver settings, plus read-only state (error-correction latch, active
//! protocol) and reserved bits that must survive every write.

mod fields;
mod register;

pub use fields::{DriveStrength, Mode, PageSize, Protocol, SlewRate};
pub use register::{decode_status, DecodedStatus, Settings, Status, StatusBits};
