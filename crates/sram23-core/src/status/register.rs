//! The 16-bit status register

use super::fields::{DriveStrength, Mode, PageSize, Protocol, SlewRate};
use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Status register bit masks
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusBits: u16 {
        /// Operating mode (2 bits)
        const MODE     = 0b1100_0000_0000_0000;
        /// Error-correction latch, read-only
        const ECS      = 0b0010_0000_0000_0000;
        /// Bus protocol (2 bits), read-only
        const PROTOCOL = 0b0001_1000_0000_0000;
        /// Page size
        const PAGE     = 0b0000_0001_0000_0000;
        /// Slew rate (2 bits)
        const SLEW     = 0b0000_0000_0001_1000;
        /// Drive strength (3 bits)
        const DRIVE    = 0b0000_0000_0000_0111;
    }
}

impl StatusBits {
    /// Reserved bits 10, 9, 7, 6 and 5
    pub const RESERVED: u16 = 0b0000_0110_1110_0000;

    /// Bits the host may change with WRSR
    pub const WRITABLE: StatusBits = StatusBits::MODE
        .union(StatusBits::PAGE)
        .union(StatusBits::SLEW)
        .union(StatusBits::DRIVE);
}

const fn field(raw: u16, mask: StatusBits) -> u8 {
    let m = mask.bits();
    ((raw & m) >> m.trailing_zeros()) as u8
}

const fn replace(raw: u16, mask: StatusBits, value: u8) -> u16 {
    let m = mask.bits();
    (raw & !m) | (((value as u16) << m.trailing_zeros()) & m)
}

/// Raw status register value
///
/// The `with_*` methods return a copy with one field replaced and every
/// other bit, reserved ones included, carried over unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(u16);

impl Status {
    /// Power-up value
    pub const DEFAULT: Status = Status(0x4014);

    /// Wrap a raw register value
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Build from the two bytes as they come off the wire
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    /// Raw register value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The two bytes as they go on the wire, high byte first
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Operating mode, or `None` for the undefined `11` pattern
    pub fn mode(self) -> Option<Mode> {
        Mode::try_from(field(self.0, StatusBits::MODE)).ok()
    }

    /// Error-correction latch
    pub const fn ecs(self) -> bool {
        self.0 & StatusBits::ECS.bits() != 0
    }

    /// Bus protocol, or `None` for the undefined `11` pattern
    pub fn protocol(self) -> Option<Protocol> {
        Protocol::try_from(field(self.0, StatusBits::PROTOCOL)).ok()
    }

    /// Page size
    pub fn page_size(self) -> PageSize {
        if self.0 & StatusBits::PAGE.bits() != 0 {
            PageSize::Large
        } else {
            PageSize::Small
        }
    }

    /// Output slew rate
    pub fn slew_rate(self) -> SlewRate {
        SlewRate::ALL[field(self.0, StatusBits::SLEW) as usize]
    }

    /// Output drive strength
    pub fn drive_strength(self) -> DriveStrength {
        DriveStrength::ALL[field(self.0, StatusBits::DRIVE) as usize]
    }

    /// Reserved bits as they are in the register
    pub const fn reserved(self) -> u16 {
        self.0 & StatusBits::RESERVED
    }

    /// Replace the operating mode
    pub const fn with_mode(self, mode: Mode) -> Self {
        Self(replace(self.0, StatusBits::MODE, mode.bits()))
    }

    /// Replace the page size
    pub const fn with_page_size(self, size: PageSize) -> Self {
        Self(replace(self.0, StatusBits::PAGE, size.bits()))
    }

    /// Replace the slew rate
    pub const fn with_slew_rate(self, rate: SlewRate) -> Self {
        Self(replace(self.0, StatusBits::SLEW, rate.bits()))
    }

    /// Replace the drive strength
    pub const fn with_drive_strength(self, strength: DriveStrength) -> Self {
        Self(replace(self.0, StatusBits::DRIVE, strength.bits()))
    }

    /// Split into individual fields
    pub fn decode(self) -> DecodedStatus {
        DecodedStatus {
            raw: self.0,
            mode: self.mode(),
            ecs: self.ecs(),
            protocol: self.protocol(),
            page_size: self.page_size(),
            slew_rate: self.slew_rate(),
            drive_strength: self.drive_strength(),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u16> for Status {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({:#06x})", self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Status register split into its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedStatus {
    /// Raw value the fields were taken from
    pub raw: u16,
    /// Operating mode (`None` if the bits hold the undefined pattern)
    pub mode: Option<Mode>,
    /// Error-correction latch
    pub ecs: bool,
    /// Bus protocol (`None` if the bits hold the undefined pattern)
    pub protocol: Option<Protocol>,
    /// Page size
    pub page_size: PageSize,
    /// Slew rate
    pub slew_rate: SlewRate,
    /// Drive strength
    pub drive_strength: DriveStrength,
}

impl fmt::Display for DecodedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status:        {:#06x}", self.raw)?;
        match self.mode {
            Some(m) => writeln!(f, "Mode:          {}", m)?,
            None => writeln!(f, "Mode:          Unknown")?,
        }
        writeln!(f, "ECS:           {}", if self.ecs { "on" } else { "off" })?;
        match self.protocol {
            Some(p) => writeln!(f, "Protocol:      {}", p)?,
            None => writeln!(f, "Protocol:      Unknown")?,
        }
        writeln!(f, "Page Size:     {}", self.page_size)?;
        writeln!(f, "Slew Rate:     {}", self.slew_rate)?;
        write!(f, "Drive:         {}", self.drive_strength)
    }
}

/// Decode a raw status value into its fields
pub fn decode_status(raw: u16) -> DecodedStatus {
    Status(raw).decode()
}

/// Field changes applied in one read-modify-write
///
/// `None` leaves a field as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "kebab-case")
)]
pub struct Settings {
    /// Operating mode
    pub mode: Option<Mode>,
    /// Page size
    pub page_size: Option<PageSize>,
    /// Slew rate
    pub slew_rate: Option<SlewRate>,
    /// Drive strength
    pub drive_strength: Option<DriveStrength>,
}

impl Settings {
    /// True if no field would change
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.page_size.is_none()
            && self.slew_rate.is_none()
            && self.drive_strength.is_none()
    }

    /// Apply the requested fields to `status`
    pub fn apply_to(&self, mut status: Status) -> Status {
        if let Some(mode) = self.mode {
            status = status.with_mode(mode);
        }
        if let Some(size) = self.page_size {
            status = status.with_page_size(size);
        }
        if let Some(rate) = self.slew_rate {
            status = status.with_slew_rate(rate);
        }
        if let Some(strength) = self.drive_strength {
            status = status.with_drive_strength(strength);
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_power_up_value() {
        let d = decode_status(0x4014);
        assert_eq!(d.mode, Some(Mode::Sequential));
        assert!(!d.ecs);
        assert_eq!(d.protocol, Some(Protocol::Spi));
        assert_eq!(d.page_size, PageSize::Small);
        assert_eq!(d.slew_rate, SlewRate::Rate3);
        assert_eq!(d.drive_strength, DriveStrength::Str5);
    }

    #[test]
    fn test_undefined_patterns_decode_to_none() {
        let d = decode_status(0xC000 | 0x1800);
        assert_eq!(d.mode, None);
        assert_eq!(d.protocol, None);
    }

    #[test]
    fn test_setters_touch_only_their_field() {
        let base = Status::from_raw(0xA5A5);
        let s = base.with_slew_rate(SlewRate::Rate1);
        assert_eq!(s.raw() & !StatusBits::SLEW.bits(), 0xA5A5 & !StatusBits::SLEW.bits());
        assert_eq!(s.slew_rate(), SlewRate::Rate1);

        let s = base.with_mode(Mode::Page);
        assert_eq!(s.raw() & !StatusBits::MODE.bits(), 0xA5A5 & !StatusBits::MODE.bits());
        assert_eq!(s.mode(), Some(Mode::Page));

        let s = base.with_drive_strength(DriveStrength::Str1);
        assert_eq!(s.raw(), 0xA5A0);
        assert_eq!(s.reserved(), base.reserved());
    }

    #[test]
    fn test_page_size_bit() {
        let s = Status::DEFAULT.with_page_size(PageSize::Large);
        assert_eq!(s.raw(), 0x4114);
        assert_eq!(s.with_page_size(PageSize::Small), Status::DEFAULT);
    }

    #[test]
    fn test_settings_apply_in_one_pass() {
        let settings = Settings {
            mode: Some(Mode::Byte),
            drive_strength: Some(DriveStrength::Str8),
            ..Default::default()
        };
        let s = settings.apply_to(Status::DEFAULT);
        assert_eq!(s.raw(), 0x0017);
        assert!(Settings::default().is_empty());
        assert_eq!(Settings::default().apply_to(Status::DEFAULT), Status::DEFAULT);
    }

    #[test]
    fn test_wire_order() {
        assert_eq!(Status::from_be_bytes([0x40, 0x14]), Status::DEFAULT);
        assert_eq!(Status::DEFAULT.to_be_bytes(), [0x40, 0x14]);
    }
}
