//! Transport traits and abstractions
//!
//! This module defines the trait every bus backend implements, the scoped
//! session that brackets a transaction with chip select, and helpers for
//! bit-banged backends.

pub mod bitbang;
#[cfg(test)]
pub(crate) mod mock;
mod session;
mod traits;

pub use bitbang::BitbangPins;
pub use session::{execute, Session};
pub use traits::*;
