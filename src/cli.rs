//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use sram23_core::status::{DriveStrength, Mode, PageSize, Settings, SlewRate};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a status register value
fn parse_status(s: &str) -> Result<u16, String> {
    let value = parse_hex_u32(s)?;
    u16::try_from(value).map_err(|_| format!("Status value out of range: {}", s))
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse()
        .map_err(|_| format!("Invalid mode '{}' (byte, sequential, page)", s))
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    s.parse()
        .map_err(|_| format!("Invalid page size '{}' (32, 256)", s))
}

fn parse_slew_rate(s: &str) -> Result<SlewRate, String> {
    s.parse()
        .map_err(|_| format!("Invalid slew rate '{}' (1.44, 2.88, 4.33, 6.00)", s))
}

fn parse_drive_strength(s: &str) -> Result<DriveStrength, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid drive strength '{}' (12.5, 25, 35, 42.5, 50, 60, 75, 100)",
            s
        )
    })
}

#[derive(Parser)]
#[command(name = "sram23")]
#[command(author, version, about = "Microchip 23AA04M/23LCV04M serial SRAM tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Transport to use, e.g. "linux_spi:dev=/dev/spidev0.0" (see list-transports)
    #[arg(short, long, global = true)]
    pub transport: Option<String>,

    /// Configuration file (defaults to ./sram23.toml, then /etc/sram23.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Array size in bytes
    #[arg(long, global = true, value_parser = parse_hex_u32)]
    pub capacity: Option<u32>,

    /// Allow accesses past the end of the array
    #[arg(long, global = true)]
    pub no_bounds_check: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Status fields to change
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Operating mode (byte, sequential, page)
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<Mode>,

    /// Page size in bytes (32, 256)
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<PageSize>,

    /// Output slew rate in V/ns (1.44, 2.88, 4.33, 6.00)
    #[arg(long, value_parser = parse_slew_rate)]
    pub slew: Option<SlewRate>,

    /// Output drive strength in percent (12.5, 25, 35, 42.5, 50, 60, 75, 100)
    #[arg(long, value_parser = parse_drive_strength)]
    pub drive: Option<DriveStrength>,
}

impl SettingsArgs {
    /// Fields given on the command line
    pub fn to_settings(&self) -> Settings {
        Settings {
            mode: self.mode,
            page_size: self.page_size,
            slew_rate: self.slew,
            drive_strength: self.drive,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read and decode the status register
    Status,

    /// Change status register fields
    Set {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Write this raw value instead of changing individual fields
        #[arg(long, value_parser = parse_status, conflicts_with_all = ["mode", "page_size", "slew", "drive"])]
        raw: Option<u16>,
    },

    /// Apply the [settings] of the configuration file, overridden by flags
    Configure {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Read memory to a file or as a hexdump
    Read {
        /// Start address
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes (defaults to the rest of the array)
        #[arg(short, long, value_parser = parse_hex_u32)]
        length: Option<u32>,

        /// Output file path (hexdump on stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a file to memory
    Write {
        /// Start address
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Skip reading back after writing
        #[arg(long)]
        no_verify: bool,
    },

    /// Compare memory against a file
    Verify {
        /// Start address
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write random pages and read them back
    Stress {
        /// Seed for the pseudo-random generator
        #[arg(long, default_value = "1337")]
        seed: u64,

        /// Number of pages to write and check (0 runs until a failure)
        #[arg(short = 'n', long, default_value = "1000")]
        iterations: u64,

        /// Print every page as a hexdump
        #[arg(long)]
        dump: bool,
    },

    /// List available transports
    ListTransports,
}
