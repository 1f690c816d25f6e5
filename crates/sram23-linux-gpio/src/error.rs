//! Errors raised while setting up the GPIO lines

use gpiocdev::line::Offset;
use thiserror::Error;

/// Failure to set up a GPIO bit-bang bus
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// The kernel refused the line request
    #[error("cannot request lines on {chip}: {source}")]
    Request {
        chip: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// The chip path is empty
    #[error("missing GPIO chip (dev=/dev/gpiochipN or gpiochip=N)")]
    MissingChip,

    /// Two signals were assigned the same line
    #[error("line {0} is assigned to more than one signal")]
    SharedLine(Offset),
}

/// Result of setting up a GPIO bit-bang bus
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
