//! GPIO bit-bang transport
//!
//! Chip select is an ordinary output line, so it is held for exactly as long
//! as the session lasts. Each session gets a deadline; a transfer that is
//! still clocking when it passes fails with `Error::Timeout`.

use crate::error::{LinuxGpioError, Result};
use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};
use sram23_core::error::{Error as CoreError, Result as CoreResult};
use sram23_core::transport::bitbang::{self, BitbangPins};
use sram23_core::transport::{SpiTransport, TransportFeatures};
use std::time::{Duration, Instant};

/// Bytes clocked between deadline checks
const BYTES_PER_DEADLINE_CHECK: usize = 64;

/// Line offsets of the four bus signals
///
/// The default is the reference wiring: CS# on 17, SCK on 18, SI on 19 and
/// SO on 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pins {
    /// CS#, output
    pub cs: Offset,
    /// SCK, output
    pub sck: Offset,
    /// Host to chip data (chip SI), output
    pub mosi: Offset,
    /// Chip to host data (chip SO), input
    pub miso: Offset,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            cs: 17,
            sck: 18,
            mosi: 19,
            miso: 16,
        }
    }
}

impl Pins {
    fn as_array(&self) -> [Offset; 4] {
        [self.cs, self.sck, self.mosi, self.miso]
    }

    /// First offset used for two signals, if any
    fn duplicate(&self) -> Option<Offset> {
        let lines = self.as_array();
        lines
            .iter()
            .enumerate()
            .find(|&(i, line)| lines[i + 1..].contains(line))
            .map(|(_, &line)| line)
    }
}

/// Settings for [`LinuxGpioSpi::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxGpioSpiConfig {
    /// GPIO chip, e.g. `/dev/gpiochip0`
    pub chip: String,
    /// Bus lines
    pub pins: Pins,
    /// Time SCK stays in each state
    pub half_period: Duration,
    /// Longest a session may take, `None` for no limit
    pub timeout: Option<Duration>,
}

impl Default for LinuxGpioSpiConfig {
    fn default() -> Self {
        Self {
            chip: "/dev/gpiochip0".to_string(),
            pins: Pins::default(),
            // about 100 kHz
            half_period: Duration::from_micros(5),
            timeout: Some(Duration::from_secs(1)),
        }
    }
}

impl LinuxGpioSpiConfig {
    /// Defaults with the given chip and wiring
    pub fn new(chip: impl Into<String>, pins: Pins) -> Self {
        Self {
            chip: chip.into(),
            pins,
            ..Default::default()
        }
    }

    /// Approximate the given SCK frequency; 0 clocks as fast as the lines toggle
    pub fn with_clock_hz(mut self, hz: u32) -> Self {
        self.half_period = match hz {
            0 => Duration::ZERO,
            hz => Duration::from_nanos(500_000_000 / u64::from(hz)),
        };
        self
    }

    /// Set the per-session time limit
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.chip.is_empty() {
            return Err(LinuxGpioError::MissingChip);
        }
        match self.pins.duplicate() {
            Some(line) => Err(LinuxGpioError::SharedLine(line)),
            None => Ok(()),
        }
    }
}

/// 23xx04M transport over four GPIO lines
pub struct LinuxGpioSpi {
    request: Request,
    pins: Pins,
    half_period: Duration,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    /// A line operation failed since the last check
    line_error: bool,
    selected: bool,
}

impl LinuxGpioSpi {
    /// Request the lines and park the bus idle: CS# high, SCK and SI low
    pub fn open(config: &LinuxGpioSpiConfig) -> Result<Self> {
        config.validate()?;

        let pins = config.pins;
        let mut lines = Config::default();
        lines.with_line(pins.cs).as_output(Value::Active);
        lines.with_line(pins.sck).as_output(Value::Inactive);
        lines.with_line(pins.mosi).as_output(Value::Inactive);
        lines.with_line(pins.miso).as_input();

        let request = Request::from_config(lines)
            .on_chip(&config.chip)
            .with_consumer("sram23")
            .request()
            .map_err(|source| LinuxGpioError::Request {
                chip: config.chip.clone(),
                source,
            })?;

        log::info!(
            "linux_gpio_spi: {} cs={} sck={} mosi={} miso={}, half period {:?}",
            config.chip,
            pins.cs,
            pins.sck,
            pins.mosi,
            pins.miso,
            config.half_period
        );

        Ok(Self {
            request,
            pins,
            half_period: config.half_period,
            timeout: config.timeout,
            deadline: None,
            line_error: false,
            selected: false,
        })
    }

    fn set(&mut self, line: Offset, high: bool) {
        let value = if high { Value::Active } else { Value::Inactive };
        if let Err(e) = self.request.set_value(line, value) {
            log::error!("linux_gpio_spi: cannot drive line {}: {}", line, e);
            self.line_error = true;
        }
    }

    /// Fail on a pending line error or a passed deadline
    fn check(&mut self) -> CoreResult<()> {
        if std::mem::take(&mut self.line_error) {
            return Err(CoreError::BusFault);
        }
        match self.deadline {
            Some(deadline) if Instant::now() > deadline => {
                log::warn!("linux_gpio_spi: session took longer than {:?}", self.timeout);
                Err(CoreError::Timeout)
            }
            _ => Ok(()),
        }
    }

    /// Clock `len` bytes in pieces, checking the deadline between them
    fn clocked(
        &mut self,
        len: usize,
        mut piece: impl FnMut(&mut Self, usize, usize),
    ) -> CoreResult<usize> {
        if !self.selected {
            return Err(CoreError::ChipSelectFailed);
        }
        let mut start = 0;
        while start < len {
            self.check()?;
            let end = (start + BYTES_PER_DEADLINE_CHECK).min(len);
            piece(self, start, end);
            start = end;
        }
        self.check()?;
        Ok(len)
    }
}

impl BitbangPins for LinuxGpioSpi {
    fn drive_cs(&mut self, asserted: bool) {
        self.set(self.pins.cs, !asserted);
    }

    fn drive_clock(&mut self, high: bool) {
        self.set(self.pins.sck, high);
    }

    fn drive_data(&mut self, high: bool) {
        self.set(self.pins.mosi, high);
    }

    fn sample_data(&mut self) -> bool {
        match self.request.value(self.pins.miso) {
            Ok(value) => value == Value::Active,
            Err(e) => {
                log::error!("linux_gpio_spi: cannot read line {}: {}", self.pins.miso, e);
                self.line_error = true;
                false
            }
        }
    }

    fn wait_half_period(&mut self) {
        if !self.half_period.is_zero() {
            std::thread::sleep(self.half_period);
        }
    }
}

impl SpiTransport for LinuxGpioSpi {
    fn features(&self) -> TransportFeatures {
        match self.timeout {
            Some(_) => TransportFeatures::BITBANG | TransportFeatures::TIMEOUT,
            None => TransportFeatures::BITBANG,
        }
    }

    fn max_transfer_len(&self) -> usize {
        4096
    }

    fn select(&mut self) -> CoreResult<()> {
        self.line_error = false;
        self.deadline = session_deadline(Instant::now(), self.timeout);
        bitbang::assert_cs(self);
        self.selected = true;
        self.check().map_err(|_| CoreError::ChipSelectFailed)
    }

    fn deselect(&mut self) -> CoreResult<()> {
        bitbang::release_cs(self);
        self.selected = false;
        self.deadline = None;
        if std::mem::take(&mut self.line_error) {
            return Err(CoreError::ChipSelectFailed);
        }
        Ok(())
    }

    fn transfer(&mut self, data: &[u8]) -> CoreResult<usize> {
        self.clocked(data.len(), |bus, start, end| {
            bitbang::shift_out(bus, &data[start..end])
        })
    }

    fn receive(&mut self, buf: &mut [u8]) -> CoreResult<usize> {
        self.clocked(buf.len(), |bus, start, end| {
            bitbang::shift_in(bus, &mut buf[start..end])
        })
    }
}

/// When a session started at `now` times out
///
/// A timeout too large to represent as an `Instant` means no deadline.
fn session_deadline(now: Instant, timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| now.checked_add(t))
}

fn parse_line(key: &str, value: &str) -> std::result::Result<Offset, String> {
    value
        .parse()
        .map_err(|_| format!("{} must be a line offset, got '{}'", key, value))
}

/// Build a [`LinuxGpioSpiConfig`] from transport string options
///
/// Every option has a default, see [`LinuxGpioSpiConfig::default`].
///
/// - `dev=<path>` or `gpiochip=<n>`: GPIO chip
/// - `cs=<n>`, `sck=<n>`, `mosi=<n>`, `miso=<n>`: line offsets
/// - `spispeed=<kHz>`: approximate clock
/// - `timeout=<ms>`: per-session limit, 0 disables it
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxGpioSpiConfig, String> {
    let mut config = LinuxGpioSpiConfig::default();
    let mut chip_given = false;

    for &(key, value) in options {
        match key {
            "dev" | "gpiochip" => {
                if chip_given {
                    return Err("give either dev or gpiochip, not both".to_string());
                }
                chip_given = true;
                config.chip = if key == "dev" {
                    value.to_string()
                } else {
                    let n: u32 = value
                        .parse()
                        .map_err(|_| format!("gpiochip must be a number, got '{}'", value))?;
                    format!("/dev/gpiochip{}", n)
                };
            }
            "cs" => config.pins.cs = parse_line(key, value)?,
            "sck" => config.pins.sck = parse_line(key, value)?,
            "mosi" => config.pins.mosi = parse_line(key, value)?,
            "miso" => config.pins.miso = parse_line(key, value)?,
            "spispeed" => {
                let khz: u32 = value
                    .parse()
                    .map_err(|_| format!("spispeed must be in kHz, got '{}'", value))?;
                config = config.with_clock_hz(khz.saturating_mul(1000));
            }
            "timeout" => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| format!("timeout must be in ms, got '{}'", value))?;
                config = config.with_timeout((ms > 0).then(|| Duration::from_millis(ms)));
            }
            _ => log::warn!("linux_gpio_spi: ignoring option {}={}", key, value),
        }
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}
