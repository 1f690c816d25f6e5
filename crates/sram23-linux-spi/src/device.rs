//! spidev backed transport
//!
//! spidev drives chip select per `SPI_IOC_MESSAGE` call. To keep the chip
//! selected between the separate `transfer`/`receive` calls of one session,
//! every message is sent with `cs_change` set on its last transfer, which
//! tells the controller to leave CS asserted afterwards. `deselect` sends an
//! empty transfer without `cs_change` so CS is released when it completes.

use crate::error::{LinuxSpiError, Result};
use nix::errno::Errno;
use sram23_core::error::{Error as CoreError, Result as CoreResult};
use sram23_core::transport::{SpiTransport, TransportFeatures};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::str::FromStr;

/// spidev's per-message buffer limit, a module parameter
const SPIDEV_BUFSIZ: &str = "/sys/module/spidev/parameters/bufsiz";

/// Clock used when `spispeed` is not given
const DEFAULT_CLOCK_HZ: u32 = 20_000_000;

/// Clock polarity and phase
///
/// The 23xx04M samples on the rising edge and accepts both idle levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Value of the `SPI_IOC_WR_MODE` argument
    pub const fn bits(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode3 => 3,
        }
    }
}

impl FromStr for SpiMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "0" => Ok(Self::Mode0),
            "3" => Ok(Self::Mode3),
            _ => Err(format!("unsupported SPI mode '{}' (0 or 3)", s)),
        }
    }
}

impl fmt::Display for SpiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

mod ioctl {
    use super::SpiIocTransfer;

    const SPI_IOC_MAGIC: u8 = b'k';

    nix::ioctl_write_ptr!(write_mode, SPI_IOC_MAGIC, 1, u8);
    nix::ioctl_write_ptr!(write_bits_per_word, SPI_IOC_MAGIC, 3, u8);
    nix::ioctl_write_ptr!(write_max_speed_hz, SPI_IOC_MAGIC, 4, u32);
    // SPI_IOC_MESSAGE(n): the size field covers all n transfers
    nix::ioctl_write_buf!(message, SPI_IOC_MAGIC, 0, SpiIocTransfer);
}

/// `struct spi_ioc_transfer` from `<linux/spi/spidev.h>`
#[repr(C)]
#[derive(Debug, Default, Clone)]
pub struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    pad: u8,
}

/// Settings for [`LinuxSpi::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxSpiConfig {
    /// spidev node, e.g. `/dev/spidev0.0`
    pub device: String,
    /// Bus clock in Hz
    pub clock_hz: u32,
    /// Clock polarity and phase
    pub mode: SpiMode,
}

impl LinuxSpiConfig {
    /// Defaults for the given spidev node
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            clock_hz: DEFAULT_CLOCK_HZ,
            mode: SpiMode::default(),
        }
    }

    /// Set the bus clock in Hz
    pub fn clock_hz(mut self, hz: u32) -> Self {
        self.clock_hz = hz;
        self
    }

    /// Set clock polarity and phase
    pub fn mode(mut self, mode: SpiMode) -> Self {
        self.mode = mode;
        self
    }
}

/// 23xx04M transport over a spidev node
pub struct LinuxSpi {
    file: File,
    /// Largest message spidev accepts
    bufsiz: usize,
    clock_hz: u32,
    /// CS is held asserted between messages
    selected: bool,
}

impl LinuxSpi {
    /// Open and set up a spidev node
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::MissingDevice);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|source| LinuxSpiError::Open {
                path: config.device.clone(),
                source,
            })?;
        let fd = file.as_raw_fd();

        let setup_err = |parameter: &'static str, value: u32| {
            let path = config.device.clone();
            move |source| LinuxSpiError::Setup {
                path,
                parameter,
                value,
                source,
            }
        };

        let mode = config.mode.bits();
        let bits_per_word = 8u8;
        // SAFETY: fd is an open spidev node and each pointer outlives its call
        unsafe {
            ioctl::write_mode(fd, &mode).map_err(setup_err("mode", mode.into()))?;
            ioctl::write_bits_per_word(fd, &bits_per_word)
                .map_err(setup_err("bits per word", bits_per_word.into()))?;
            ioctl::write_max_speed_hz(fd, &config.clock_hz)
                .map_err(setup_err("max speed", config.clock_hz))?;
        }

        let bufsiz = spidev_bufsiz();
        log::info!(
            "linux_spi: {} ready (mode {}, {} kHz, {} byte messages)",
            config.device,
            config.mode,
            config.clock_hz / 1000,
            bufsiz
        );

        Ok(Self {
            file,
            bufsiz,
            clock_hz: config.clock_hz,
            selected: false,
        })
    }

    /// Open a node with the default clock and mode
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxSpiConfig::new(device))
    }

    /// Bus clock in Hz
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Run one single-transfer message
    ///
    /// With `hold_cs` the controller leaves chip select asserted once the
    /// message is done. Returns the number of bytes clocked.
    fn message(&mut self, tx: &[u8], rx: &mut [u8], hold_cs: bool) -> CoreResult<usize> {
        let len = tx.len().max(rx.len());
        let transfer = SpiIocTransfer {
            tx_buf: if tx.is_empty() { 0 } else { tx.as_ptr() as u64 },
            rx_buf: if rx.is_empty() { 0 } else { rx.as_mut_ptr() as u64 },
            len: len as u32,
            speed_hz: self.clock_hz,
            bits_per_word: 8,
            cs_change: hold_cs.into(),
            ..Default::default()
        };

        // SAFETY: both buffers stay borrowed until the ioctl returns
        let ret = unsafe { ioctl::message(self.file.as_raw_fd(), std::slice::from_ref(&transfer)) };
        match ret {
            Ok(n) => Ok((n.max(0) as usize).min(len)),
            Err(errno) => {
                log::error!("linux_spi: SPI_IOC_MESSAGE failed: {}", errno);
                Err(map_errno(errno))
            }
        }
    }
}

/// Driver error for a failed message
fn map_errno(errno: Errno) -> CoreError {
    match errno {
        Errno::ETIMEDOUT => CoreError::Timeout,
        _ => CoreError::BusFault,
    }
}

impl SpiTransport for LinuxSpi {
    fn features(&self) -> TransportFeatures {
        TransportFeatures::HW_CHIP_SELECT
    }

    fn max_transfer_len(&self) -> usize {
        self.bufsiz
    }

    fn select(&mut self) -> CoreResult<()> {
        // CS goes low with the first message of the session
        self.selected = true;
        Ok(())
    }

    fn deselect(&mut self) -> CoreResult<()> {
        if !self.selected {
            return Ok(());
        }
        self.selected = false;
        self.message(&[], &mut [], false)
            .map(|_| ())
            .map_err(|_| CoreError::ChipSelectFailed)
    }

    fn transfer(&mut self, data: &[u8]) -> CoreResult<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        self.message(data, &mut [], true)
    }

    fn receive(&mut self, buf: &mut [u8]) -> CoreResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.message(&[], buf, true)
    }
}

impl Drop for LinuxSpi {
    fn drop(&mut self) {
        if let Err(e) = self.deselect() {
            log::warn!("linux_spi: chip select still asserted on close: {}", e);
        }
    }
}

/// spidev message limit, falling back to the page size
fn spidev_bufsiz() -> usize {
    let from_sysfs = std::fs::read_to_string(SPIDEV_BUFSIZ)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0);
    if let Some(n) = from_sysfs {
        return n;
    }

    // SAFETY: sysconf has no preconditions
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    log::debug!("linux_spi: {} unreadable, using page size {}", SPIDEV_BUFSIZ, page);
    if page > 0 {
        page as usize
    } else {
        4096
    }
}

/// Build a [`LinuxSpiConfig`] from transport string options
///
/// - `dev=<path>`: spidev node, required
/// - `spispeed=<kHz>`: bus clock (20000 by default)
/// - `mode=<0|3>`: clock polarity and phase (0 by default)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut device = None;
    let mut config = LinuxSpiConfig::new("");

    for &(key, value) in options {
        match key {
            "dev" => device = Some(value),
            "spispeed" => {
                let khz = value
                    .parse::<u32>()
                    .ok()
                    .filter(|&k| k > 0)
                    .ok_or_else(|| format!("spispeed must be a non-zero kHz value, got '{}'", value))?;
                config = config.clock_hz(khz.saturating_mul(1000));
            }
            "mode" => config = config.mode(value.parse()?),
            _ => log::warn!("linux_spi: ignoring option {}={}", key, value),
        }
    }

    config.device = device
        .ok_or_else(|| LinuxSpiError::MissingDevice.to_string())?
        .to_string();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[
            ("dev", "/dev/spidev0.0"),
            ("spispeed", "8000"),
            ("mode", "3"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/spidev0.0");
        assert_eq!(config.clock_hz, 8_000_000);
        assert_eq!(config.mode, SpiMode::Mode3);
    }

    #[test]
    fn test_parse_options_defaults() {
        let config = parse_options(&[("dev", "/dev/spidev1.1")]).unwrap();
        assert_eq!(config, LinuxSpiConfig::new("/dev/spidev1.1"));
        assert_eq!(config.clock_hz, 20_000_000);
        assert_eq!(config.mode, SpiMode::Mode0);
    }

    #[test]
    fn test_parse_options_rejects() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("mode", "1")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "fast")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "0")]).is_err());
    }

    #[test]
    fn test_transfer_struct_layout() {
        assert_eq!(std::mem::size_of::<SpiIocTransfer>(), 32);
    }

    #[test]
    fn test_open_without_device() {
        assert!(matches!(
            LinuxSpi::open(&LinuxSpiConfig::new("")),
            Err(LinuxSpiError::MissingDevice)
        ));
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(map_errno(Errno::ETIMEDOUT), CoreError::Timeout);
        assert_eq!(map_errno(Errno::EIO), CoreError::BusFault);
    }
}
