//! sram23-dummy - In-memory 23xx04M emulator for testing
//!
//! This crate provides a transport with a serial SRAM model behind it. The
//! model decodes the byte stream of each chip-select session the way the
//! chip does, so the driver can be exercised without hardware. Faults can
//! be injected per session to test short transfers and stalled buses.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::collections::VecDeque;
#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use sram23_core::error::{Error, Result};
use sram23_core::spi::{decode_address, Instruction, ADDRESS_BYTES};
use sram23_core::status::{Mode, Status, StatusBits};
use sram23_core::transport::{SpiTransport, TransportFeatures};

/// Configuration for the emulated chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Array size in bytes
    pub capacity: usize,
    /// Status register value at power-up
    pub status: Status,
    /// Largest single transfer the transport accepts
    pub max_transfer_len: usize,
    /// Initial content of every array byte
    pub fill: u8,
    /// Number of finished sessions kept for inspection, oldest dropped first
    pub log_limit: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            capacity: 512 * 1024,
            status: Status::DEFAULT,
            max_transfer_len: 4096,
            fill: 0x00,
            log_limit: 1024,
        }
    }
}

/// Faults applied to every session until cleared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    /// Accept at most this many MOSI bytes per session
    pub write_limit: Option<usize>,
    /// Return at most this many MISO bytes per session
    pub read_limit: Option<usize>,
    /// Every transfer fails with `Error::Timeout`
    pub stall: bool,
    /// Chip select cannot be asserted
    pub fail_select: bool,
}

/// Where the chip is within the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Opcode,
    Address {
        instruction: Instruction,
        bytes: [u8; ADDRESS_BYTES],
        filled: usize,
    },
    Write {
        addr: usize,
    },
    Read {
        addr: usize,
    },
    StatusWrite {
        bytes: [u8; 2],
        filled: usize,
    },
    StatusRead {
        pos: usize,
    },
}

/// Emulated 23xx04M behind a transport
#[cfg(feature = "alloc")]
pub struct DummySram {
    config: DummyConfig,
    data: Vec<u8>,
    status: Status,
    faults: Faults,
    selected: bool,
    phase: Phase,
    sent: usize,
    received: usize,
    mosi: Vec<u8>,
    log: VecDeque<Vec<u8>>,
}

#[cfg(feature = "alloc")]
impl DummySram {
    /// Create a new emulator with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![config.fill; config.capacity];
        let status = config.status;
        Self {
            config,
            data,
            status,
            faults: Faults::default(),
            selected: false,
            phase: Phase::Opcode,
            sent: 0,
            received: 0,
            mosi: Vec::new(),
            log: VecDeque::new(),
        }
    }

    /// Create a 512 KiB chip in its power-up state
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a default chip with a preset status register
    ///
    /// Unlike a WRSR, this sets read-only and reserved bits too.
    pub fn with_status(status: Status) -> Self {
        Self::new(DummyConfig {
            status,
            ..Default::default()
        })
    }

    /// Get a reference to the array
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the array
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Current status register value
    pub fn status(&self) -> Status {
        self.status
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Install faults for the following sessions
    pub fn set_faults(&mut self, faults: Faults) {
        self.faults = faults;
    }

    /// Remove all injected faults
    pub fn clear_faults(&mut self) {
        self.faults = Faults::default();
    }

    /// MOSI bytes of the last [`DummyConfig::log_limit`] sessions, oldest first
    pub fn transactions(&self) -> &VecDeque<Vec<u8>> {
        &self.log
    }

    /// MOSI bytes of the last finished session
    pub fn last_transaction(&self) -> Option<&[u8]> {
        self.log.back().map(Vec::as_slice)
    }

    /// Forget recorded sessions
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Address of the byte after `addr` according to the current mode
    fn next_addr(&self, addr: usize) -> usize {
        match self.status.mode() {
            Some(Mode::Sequential) => (addr + 1) % self.config.capacity,
            Some(Mode::Page) => {
                // an array smaller than a page wraps at its own end
                let page = self.status.page_size().bytes();
                ((addr & !(page - 1)) | ((addr + 1) & (page - 1))) % self.config.capacity
            }
            // byte mode, and the undefined pattern, keep the pointer
            Some(Mode::Byte) | None => addr,
        }
    }

    fn clock_in(&mut self, byte: u8) -> Result<()> {
        self.phase = match self.phase {
            Phase::Opcode => {
                let instruction = Instruction::try_from(byte)?;
                match instruction {
                    Instruction::Read | Instruction::Write => Phase::Address {
                        instruction,
                        bytes: [0; ADDRESS_BYTES],
                        filled: 0,
                    },
                    Instruction::ReadStatus => Phase::StatusRead { pos: 0 },
                    Instruction::WriteStatus => Phase::StatusWrite {
                        bytes: [0; 2],
                        filled: 0,
                    },
                    _ => {
                        log::debug!("dummy: {} not emulated", instruction);
                        return Err(Error::UnsupportedInstruction(byte));
                    }
                }
            }
            Phase::Address {
                instruction,
                mut bytes,
                filled,
            } => {
                bytes[filled] = byte;
                if filled + 1 < ADDRESS_BYTES {
                    Phase::Address {
                        instruction,
                        bytes,
                        filled: filled + 1,
                    }
                } else {
                    let addr = decode_address(bytes) as usize % self.config.capacity;
                    if instruction == Instruction::Write {
                        Phase::Write { addr }
                    } else {
                        Phase::Read { addr }
                    }
                }
            }
            Phase::Write { addr } => {
                self.data[addr] = byte;
                Phase::Write {
                    addr: self.next_addr(addr),
                }
            }
            Phase::StatusWrite { mut bytes, filled } => {
                if filled < bytes.len() {
                    bytes[filled] = byte;
                }
                Phase::StatusWrite {
                    bytes,
                    filled: filled + 1,
                }
            }
            // host bytes during an output phase are don't-care
            phase @ (Phase::Read { .. } | Phase::StatusRead { .. }) => phase,
        };
        Ok(())
    }

    fn clock_out(&mut self) -> u8 {
        match self.phase {
            Phase::Read { addr } => {
                let byte = self.data[addr];
                self.phase = Phase::Read {
                    addr: self.next_addr(addr),
                };
                byte
            }
            Phase::StatusRead { pos } => {
                self.phase = Phase::StatusRead { pos: pos + 1 };
                self.status.to_be_bytes()[pos % 2]
            }
            // MISO is not driven
            _ => 0xFF,
        }
    }

    fn latch_status(&mut self, bytes: [u8; 2]) {
        let writable = StatusBits::WRITABLE.bits();
        let new = u16::from_be_bytes(bytes);
        let old = self.status;
        self.status = Status::from_raw((old.raw() & !writable) | (new & writable));
        log::debug!("dummy: status {} -> {}", old, self.status);
    }
}

#[cfg(feature = "alloc")]
impl SpiTransport for DummySram {
    fn features(&self) -> TransportFeatures {
        TransportFeatures::EMULATED | TransportFeatures::TIMEOUT
    }

    fn max_transfer_len(&self) -> usize {
        self.config.max_transfer_len
    }

    fn select(&mut self) -> Result<()> {
        if self.faults.fail_select {
            return Err(Error::ChipSelectFailed);
        }
        self.selected = true;
        self.phase = Phase::Opcode;
        self.sent = 0;
        self.received = 0;
        self.mosi.clear();
        Ok(())
    }

    fn deselect(&mut self) -> Result<()> {
        if !self.selected {
            return Ok(());
        }
        self.selected = false;
        // WRSR takes effect when chip select rises after both bytes
        if let Phase::StatusWrite { bytes, filled } = self.phase {
            if filled >= bytes.len() {
                self.latch_status(bytes);
            }
        }
        self.phase = Phase::Opcode;
        let mosi = core::mem::take(&mut self.mosi);
        if self.config.log_limit > 0 {
            if self.log.len() >= self.config.log_limit {
                self.log.pop_front();
            }
            self.log.push_back(mosi);
        }
        Ok(())
    }

    fn transfer(&mut self, data: &[u8]) -> Result<usize> {
        if !self.selected {
            return Err(Error::BusFault);
        }
        if self.faults.stall {
            return Err(Error::Timeout);
        }
        let room = match self.faults.write_limit {
            Some(limit) => limit.saturating_sub(self.sent),
            None => data.len(),
        };
        let n = room.min(data.len());
        for &byte in &data[..n] {
            self.mosi.push(byte);
            self.sent += 1;
            self.clock_in(byte)?;
        }
        Ok(n)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.selected {
            return Err(Error::BusFault);
        }
        if self.faults.stall {
            return Err(Error::Timeout);
        }
        let room = match self.faults.read_limit {
            Some(limit) => limit.saturating_sub(self.received),
            None => buf.len(),
        };
        let n = room.min(buf.len());
        for byte in buf[..n].iter_mut() {
            *byte = self.clock_out();
        }
        self.received += n;
        Ok(n)
    }
}

#[cfg(feature = "std")]
fn parse_int(value: &str) -> core::result::Result<u32, core::num::ParseIntError> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    }
}

/// Parse programmer options into a DummyConfig
///
/// Supported options:
/// - `size=<bytes>`: Array size (default 524288, `k` suffix for KiB)
/// - `status=<value>`: Power-up status register (default 0x4014)
/// - `maxlen=<bytes>`: Largest single transfer (default 4096)
/// - `fill=<byte>`: Initial array content (default 0)
/// - `log=<sessions>`: Sessions kept for inspection (default 1024, 0 disables)
#[cfg(feature = "std")]
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "size" => {
                let (digits, scale) = match value.strip_suffix(['k', 'K']) {
                    Some(d) => (d, 1024),
                    None => (*value, 1),
                };
                let size = parse_int(digits)
                    .map_err(|_| format!("Invalid size value: {}", value))?
                    as usize
                    * scale;
                if size == 0 || !size.is_power_of_two() {
                    return Err(format!("Invalid size: {} (must be a power of two)", value));
                }
                config.capacity = size;
            }
            "status" => {
                let raw = parse_int(value)
                    .ok()
                    .and_then(|v| u16::try_from(v).ok())
                    .ok_or_else(|| format!("Invalid status value: {}", value))?;
                config.status = Status::from_raw(raw);
            }
            "maxlen" => {
                let len = parse_int(value)
                    .map_err(|_| format!("Invalid maxlen value: {}", value))?;
                if len == 0 {
                    return Err("maxlen must be at least 1".to_string());
                }
                config.max_transfer_len = len as usize;
            }
            "fill" => {
                config.fill = parse_int(value)
                    .ok()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| format!("Invalid fill value: {}", value))?;
            }
            "log" => {
                config.log_limit = parse_int(value)
                    .map_err(|_| format!("Invalid log value: {}", value))?
                    as usize;
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram23_core::device::Sram;
    use sram23_core::status::{DriveStrength, PageSize, Protocol, SlewRate};

    #[test]
    fn test_power_up_status() {
        let mut sram = Sram::new(DummySram::new_default());
        let d = sram.decoded_status().unwrap();
        assert_eq!(d.mode, Some(Mode::Sequential));
        assert!(!d.ecs);
        assert_eq!(d.protocol, Some(Protocol::Spi));
        assert_eq!(d.page_size, PageSize::Small);
        assert_eq!(d.slew_rate, SlewRate::Rate3);
        assert_eq!(d.drive_strength, DriveStrength::Str5);
    }

    #[test]
    fn test_sequential_roundtrip() {
        let mut sram = Sram::new(DummySram::new_default());
        let payload: Vec<u8> = (0..=255u8).collect();

        for (addr, len) in [(0u32, 0usize), (0x1337, 1), (0x001F, 33), (0x7FF00, 256)] {
            sram.sequential_write(addr, &payload[..len]).unwrap();
            let mut buf = vec![0u8; len];
            assert_eq!(sram.sequential_read(addr, &mut buf), Ok(len));
            assert_eq!(buf, &payload[..len]);
        }
    }

    #[test]
    fn test_write_byte_frame_logged() {
        let mut sram = Sram::new(DummySram::new_default());
        sram.write_byte(0x001337, 0x42).unwrap();
        assert_eq!(sram.read_byte(0x001337), Ok(0x42));

        let dummy = sram.release();
        assert_eq!(
            dummy.transactions()[0].as_slice(),
            &[0x02, 0x00, 0x13, 0x37, 0x42]
        );
        assert_eq!(dummy.last_transaction(), Some(&[0x03, 0x00, 0x13, 0x37][..]));
    }

    #[test]
    fn test_page_mode_wraps() {
        let mut sram = Sram::new(DummySram::new_default());
        sram.set_mode(Mode::Page).unwrap();

        let data: Vec<u8> = (1..=40u8).collect();
        sram.sequential_write(0x20, &data).unwrap();

        let dummy = sram.release();
        // the last 8 bytes wrapped to the start of the 32-byte page
        assert_eq!(&dummy.data()[0x20..0x28], &data[32..40]);
        assert_eq!(&dummy.data()[0x28..0x40], &data[8..32]);
        assert_eq!(dummy.data()[0x40], 0);
    }

    #[test]
    fn test_large_page_wraps_at_256() {
        let status = Status::DEFAULT
            .with_mode(Mode::Page)
            .with_page_size(PageSize::Large);
        let mut sram = Sram::new(DummySram::with_status(status));
        sram.sequential_write(0x1FF, b"xy").unwrap();
        let dummy = sram.release();
        assert_eq!(dummy.data()[0x1FF], b'x');
        assert_eq!(dummy.data()[0x100], b'y');
        assert_eq!(dummy.data()[0x200], 0);
    }

    #[test]
    fn test_byte_mode_keeps_pointer() {
        let mut sram = Sram::new(DummySram::new_default());
        sram.set_mode(Mode::Byte).unwrap();
        sram.sequential_write(5, b"ab").unwrap();
        let dummy = sram.release();
        assert_eq!(dummy.data()[5], b'b');
        assert_eq!(dummy.data()[6], 0);
    }

    #[test]
    fn test_sequential_wraps_at_end_of_array() {
        let mut sram = Sram::with_config(
            DummySram::new_default(),
            sram23_core::device::SramConfig::default().check_bounds(false),
        );
        sram.sequential_write(0x7FFFF, b"ab").unwrap();
        let dummy = sram.release();
        assert_eq!(dummy.data()[0x7FFFF], b'a');
        assert_eq!(dummy.data()[0], b'b');
    }

    #[test]
    fn test_set_slew_rate_isolation() {
        let preset = Status::from_raw(0xA5A5);
        let mut sram = Sram::new(DummySram::with_status(preset));
        sram.set_slew_rate(SlewRate::Rate4).unwrap();

        let after = sram.status().unwrap();
        let outside = !StatusBits::SLEW.bits();
        assert_eq!(after.raw() & outside, preset.raw() & outside);
        assert_eq!(after.slew_rate(), SlewRate::Rate4);
    }

    #[test]
    fn test_wrsr_preserves_read_only_bits() {
        // ECS latched, reserved bit 10 set
        let preset = Status::from_raw(0x6414);
        let mut sram = Sram::new(DummySram::with_status(preset));
        sram.set_status(Status::from_raw(0x0000)).unwrap();
        assert_eq!(sram.status(), Ok(Status::from_raw(0x2400)));
    }

    #[test]
    fn test_short_read_leaves_tail() {
        let mut dummy = DummySram::new(DummyConfig {
            fill: 0x5A,
            ..Default::default()
        });
        dummy.set_faults(Faults {
            read_limit: Some(100),
            ..Default::default()
        });
        let mut sram = Sram::new(dummy);
        let mut buf = [0u8; 256];
        assert_eq!(sram.sequential_read(0, &mut buf), Ok(100));
        assert!(buf[..100].iter().all(|&b| b == 0x5A));
        assert!(buf[100..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_short_write_is_an_error() {
        let mut dummy = DummySram::new_default();
        dummy.set_faults(Faults {
            write_limit: Some(4),
            ..Default::default()
        });
        let mut sram = Sram::new(dummy);
        assert_eq!(
            sram.write_byte(0x10, 0x42),
            Err(Error::ShortWrite {
                expected: 5,
                actual: 4
            })
        );
        let mut dummy = sram.release();
        assert_eq!(dummy.data()[0x10], 0);
        dummy.clear_faults();
        assert!(!dummy.selected);
    }

    #[test]
    fn test_stall_times_out_and_releases() {
        let mut dummy = DummySram::new_default();
        dummy.set_faults(Faults {
            stall: true,
            ..Default::default()
        });
        let mut sram = Sram::new(dummy);
        assert_eq!(sram.read_byte(0), Err(Error::Timeout));
        let dummy = sram.release();
        assert!(!dummy.selected);
        assert_eq!(dummy.transactions().len(), 1);
    }

    #[test]
    fn test_chunked_transfers_stay_in_one_session() {
        let dummy = DummySram::new(DummyConfig {
            max_transfer_len: 7,
            ..Default::default()
        });
        let mut sram = Sram::new(dummy);
        let data = [0xC3u8; 50];
        sram.sequential_write(0x100, &data).unwrap();
        let mut buf = [0u8; 50];
        assert_eq!(sram.sequential_read(0x100, &mut buf), Ok(50));
        assert_eq!(buf, data);
        assert_eq!(sram.release().transactions().len(), 2);
    }

    #[test]
    fn test_unemulated_opcode_rejected() {
        let mut dummy = DummySram::new_default();
        dummy.select().unwrap();
        assert_eq!(
            dummy.transfer(&[0x0B]),
            Err(Error::UnsupportedInstruction(0x0B))
        );
        dummy.deselect().unwrap();
    }

    #[test]
    fn test_page_mode_on_array_smaller_than_page() {
        let mut config = parse_options(&[("size", "64")]).unwrap();
        config.status = Status::DEFAULT
            .with_mode(Mode::Page)
            .with_page_size(PageSize::Large);
        let mut sram = Sram::with_config(
            DummySram::new(config),
            sram23_core::device::SramConfig::default().check_bounds(false),
        );

        let data: Vec<u8> = (0..65u8).collect();
        sram.sequential_write(0, &data).unwrap();
        let mut buf = [0u8; 66];
        assert_eq!(sram.sequential_read(0x3F, &mut buf), Ok(66));

        let dummy = sram.release();
        assert_eq!(dummy.data().len(), 64);
        // byte 64 wrapped onto address 0
        assert_eq!(dummy.data()[0], 64);
        assert_eq!(&dummy.data()[1..], &data[1..64]);
        assert_eq!(buf[0], 63);
        assert_eq!(buf[1], 64);
    }

    #[test]
    fn test_session_log_is_bounded() {
        let mut sram = Sram::new(DummySram::new(DummyConfig {
            log_limit: 4,
            ..Default::default()
        }));
        for i in 0..10u8 {
            sram.write_byte(0x100, i).unwrap();
        }
        let dummy = sram.release();
        assert_eq!(dummy.transactions().len(), 4);
        assert_eq!(dummy.transactions()[0].as_slice(), &[0x02, 0x00, 0x01, 0x00, 6]);
        assert_eq!(dummy.last_transaction(), Some(&[0x02, 0x00, 0x01, 0x00, 9][..]));

        let mut sram = Sram::new(DummySram::new(parse_options(&[("log", "0")]).unwrap()));
        sram.sequential_write(0, &[0u8; 256]).unwrap();
        assert!(sram.release().transactions().is_empty());
    }

    #[test]
    fn test_verify_steps_past_top_of_address_space() {
        let mut sram = Sram::with_config(
            DummySram::new(DummyConfig {
                fill: 0x11,
                ..Default::default()
            }),
            sram23_core::device::SramConfig::default().check_bounds(false),
        );
        assert_eq!(sram.verify(0xFFFF_FF80, &[0x11; 512]), Ok(()));
        // second piece starts at 0xFFFF_FF80 + 256, wrapped to 24 bits
        assert_eq!(
            &sram.release().transactions()[1][..4],
            &[0x03, 0x00, 0x00, 0x80]
        );
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("size", "128k"), ("status", "0x8114"), ("fill", "0xff")])
            .unwrap();
        assert_eq!(config.capacity, 128 * 1024);
        assert_eq!(config.status.raw(), 0x8114);
        assert_eq!(config.fill, 0xFF);

        assert!(parse_options(&[("size", "1000")]).is_err());
        assert!(parse_options(&[("status", "0x10000")]).is_err());
    }
}
