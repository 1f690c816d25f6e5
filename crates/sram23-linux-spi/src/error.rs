//! Errors raised while opening a spidev device

use thiserror::Error;

/// Failure to open or set up a spidev device
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// The device node could not be opened
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The controller rejected a bus parameter
    #[error("cannot set {parameter} = {value} on {path}: {source}")]
    Setup {
        path: String,
        parameter: &'static str,
        value: u32,
        #[source]
        source: nix::Error,
    },

    /// No `dev=` option was given
    #[error("missing device path (dev=/dev/spidevX.Y)")]
    MissingDevice,
}

/// Result of opening a spidev device
pub type Result<T> = std::result::Result<T, LinuxSpiError>;
