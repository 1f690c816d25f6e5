//! Status register field values
//!
//! Each configuration field of the status register has a closed set of
//! values. Converting a raw value that is not in the set fails with
//! [`Error::InvalidArgument`].

use crate::error::Error;
use core::fmt;
use core::str::FromStr;

/// Read/write operating mode (bits 15,14)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Mode {
    /// One byte per transaction
    Byte,
    /// Address pointer advances across the whole array
    Sequential,
    /// Address pointer wraps within the current page
    Page,
}

impl Mode {
    /// Field value as stored in the register
    pub const fn bits(self) -> u8 {
        match self {
            Self::Byte => 0b00,
            Self::Sequential => 0b01,
            Self::Page => 0b10,
        }
    }

    /// Name used in configuration files and on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Sequential => "sequential",
            Self::Page => "page",
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0b00 => Ok(Self::Byte),
            0b01 => Ok(Self::Sequential),
            0b10 => Ok(Self::Page),
            _ => Err(Error::InvalidArgument),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => write!(f, "Byte"),
            Self::Sequential => write!(f, "Sequential"),
            Self::Page => write!(f, "Page"),
        }
    }
}

/// Bus protocol currently in use (bits 12,11, read-only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Protocol {
    /// Single-wire SPI
    Spi,
    /// Dual I/O
    Sdi,
    /// Quad I/O
    Sqi,
}

impl Protocol {
    /// Field value as stored in the register
    pub const fn bits(self) -> u8 {
        match self {
            Self::Spi => 0b00,
            Self::Sdi => 0b01,
            Self::Sqi => 0b10,
        }
    }
}

impl TryFrom<u8> for Protocol {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0b00 => Ok(Self::Spi),
            0b01 => Ok(Self::Sdi),
            0b10 => Ok(Self::Sqi),
            _ => Err(Error::InvalidArgument),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spi => write!(f, "SPI"),
            Self::Sdi => write!(f, "SDI"),
            Self::Sqi => write!(f, "SQI"),
        }
    }
}

/// Bytes per page (bit 8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum PageSize {
    /// 32-byte pages
    #[cfg_attr(feature = "std", serde(rename = "32"))]
    Small,
    /// 256-byte pages
    #[cfg_attr(feature = "std", serde(rename = "256"))]
    Large,
}

impl PageSize {
    /// Field value as stored in the register
    pub const fn bits(self) -> u8 {
        match self {
            Self::Small => 0,
            Self::Large => 1,
        }
    }

    /// Page length in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Self::Small => 32,
            Self::Large => 256,
        }
    }

    /// Name used in configuration files and on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Small => "32",
            Self::Large => "256",
        }
    }
}

impl TryFrom<u8> for PageSize {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0 => Ok(Self::Small),
            1 => Ok(Self::Large),
            _ => Err(Error::InvalidArgument),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Bytes", self.bytes())
    }
}

/// Output slew rate (bits 4,3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SlewRate {
    /// 1.44 V/ns
    #[cfg_attr(feature = "std", serde(rename = "1.44"))]
    Rate1,
    /// 2.88 V/ns
    #[cfg_attr(feature = "std", serde(rename = "2.88"))]
    Rate2,
    /// 4.33 V/ns
    #[cfg_attr(feature = "std", serde(rename = "4.33"))]
    Rate3,
    /// 6.00 V/ns
    #[cfg_attr(feature = "std", serde(rename = "6.00"))]
    Rate4,
}

impl SlewRate {
    /// All rates, slowest first
    pub const ALL: [SlewRate; 4] = [Self::Rate1, Self::Rate2, Self::Rate3, Self::Rate4];

    /// Field value as stored in the register
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Slew rate in hundredths of a V/ns
    pub const fn centivolts_per_ns(self) -> u16 {
        match self {
            Self::Rate1 => 144,
            Self::Rate2 => 288,
            Self::Rate3 => 433,
            Self::Rate4 => 600,
        }
    }

    /// Name used in configuration files and on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rate1 => "1.44",
            Self::Rate2 => "2.88",
            Self::Rate3 => "4.33",
            Self::Rate4 => "6.00",
        }
    }
}

impl TryFrom<u8> for SlewRate {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(bits as usize)
            .copied()
            .ok_or(Error::InvalidArgument)
    }
}

impl fmt::Display for SlewRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.centivolts_per_ns();
        write!(f, "{}.{:02} V/ns", c / 100, c % 100)
    }
}

/// Output drive strength (bits 2,1,0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum DriveStrength {
    /// 12.5 %
    #[cfg_attr(feature = "std", serde(rename = "12.5"))]
    Str1,
    /// 25 %
    #[cfg_attr(feature = "std", serde(rename = "25"))]
    Str2,
    /// 35 %
    #[cfg_attr(feature = "std", serde(rename = "35"))]
    Str3,
    /// 42.5 %
    #[cfg_attr(feature = "std", serde(rename = "42.5"))]
    Str4,
    /// 50 %
    #[cfg_attr(feature = "std", serde(rename = "50"))]
    Str5,
    /// 60 %
    #[cfg_attr(feature = "std", serde(rename = "60"))]
    Str6,
    /// 75 %
    #[cfg_attr(feature = "std", serde(rename = "75"))]
    Str7,
    /// 100 %
    #[cfg_attr(feature = "std", serde(rename = "100"))]
    Str8,
}

impl DriveStrength {
    /// All strengths, weakest first
    pub const ALL: [DriveStrength; 8] = [
        Self::Str1,
        Self::Str2,
        Self::Str3,
        Self::Str4,
        Self::Str5,
        Self::Str6,
        Self::Str7,
        Self::Str8,
    ];

    /// Field value as stored in the register
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Drive strength in tenths of a percent
    pub const fn per_mille(self) -> u16 {
        match self {
            Self::Str1 => 125,
            Self::Str2 => 250,
            Self::Str3 => 350,
            Self::Str4 => 425,
            Self::Str5 => 500,
            Self::Str6 => 600,
            Self::Str7 => 750,
            Self::Str8 => 1000,
        }
    }

    /// Name used in configuration files and on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Str1 => "12.5",
            Self::Str2 => "25",
            Self::Str3 => "35",
            Self::Str4 => "42.5",
            Self::Str5 => "50",
            Self::Str6 => "60",
            Self::Str7 => "75",
            Self::Str8 => "100",
        }
    }
}

impl TryFrom<u8> for DriveStrength {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(bits as usize)
            .copied()
            .ok_or(Error::InvalidArgument)
    }
}

impl fmt::Display for DriveStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.per_mille();
        write!(f, "{}.{}%", m / 10, m % 10)
    }
}

/// Match `s` against the names of `values`
fn parse_named<T: Copy>(s: &str, values: &[T], name: fn(T) -> &'static str) -> Result<T, Error> {
    values
        .iter()
        .copied()
        .find(|&v| name(v).eq_ignore_ascii_case(s))
        .ok_or(Error::InvalidArgument)
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(s, &[Self::Byte, Self::Sequential, Self::Page], Self::name)
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(s, &[Self::Small, Self::Large], Self::name)
    }
}

impl FromStr for SlewRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "6" for "6.00"
        let s = if s == "6" { "6.00" } else { s };
        parse_named(s, &Self::ALL, Self::name)
    }
}

impl FromStr for DriveStrength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(s.trim_end_matches('%'), &Self::ALL, Self::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_values_roundtrip() {
        for m in [Mode::Byte, Mode::Sequential, Mode::Page] {
            assert_eq!(Mode::try_from(m.bits()), Ok(m));
        }
        for s in SlewRate::ALL {
            assert_eq!(SlewRate::try_from(s.bits()), Ok(s));
        }
        for d in DriveStrength::ALL {
            assert_eq!(DriveStrength::try_from(d.bits()), Ok(d));
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(Mode::try_from(0b11), Err(Error::InvalidArgument));
        assert_eq!(Protocol::try_from(0b11), Err(Error::InvalidArgument));
        assert_eq!(PageSize::try_from(2), Err(Error::InvalidArgument));
        assert_eq!(SlewRate::try_from(4), Err(Error::InvalidArgument));
        assert_eq!(DriveStrength::try_from(8), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_top_drive_levels_distinct() {
        assert_eq!(DriveStrength::try_from(0b110), Ok(DriveStrength::Str7));
        assert_eq!(DriveStrength::try_from(0b111), Ok(DriveStrength::Str8));
        assert_eq!(DriveStrength::Str7.per_mille(), 750);
        assert_eq!(DriveStrength::Str8.per_mille(), 1000);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Sequential".parse(), Ok(Mode::Sequential));
        assert_eq!("256".parse(), Ok(PageSize::Large));
        assert_eq!("4.33".parse(), Ok(SlewRate::Rate3));
        assert_eq!("6".parse(), Ok(SlewRate::Rate4));
        assert_eq!("42.5%".parse(), Ok(DriveStrength::Str4));
        assert_eq!("quad".parse::<Mode>(), Err(Error::InvalidArgument));
        assert_eq!("64".parse::<PageSize>(), Err(Error::InvalidArgument));
    }
}
