//! sram23 - Microchip 23AA04M/23LCV04M serial SRAM tool
//!
//! Reads and changes the status register, moves data between files and the
//! array, and runs a seeded write/read-back stress test.
//!
//! # Architecture
//!
//! The driver lives in `sram23-core` and talks to the chip through the
//! `SpiTransport` trait. Backends are separate crates behind cargo features:
//! - **dummy** - in-memory emulator of the chip
//! - **linux_spi** - Linux spidev
//! - **linux_gpio_spi** - bit-banged SPI over GPIO character device lines
//!
//! The CLI opens one transport from its string description, wraps it in a
//! `Sram` handle and runs a single command against it.

mod cli;
mod commands;
mod config;
mod transports;

use clap::Parser;
use cli::{Cli, Commands};
use config::{load_config, Config};
use sram23_core::device::{Sram, SramConfig};
use sram23_core::transport::SpiTransport;

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::ListTransports = cli.command {
        commands::list_transports();
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    let transport_str = cli
        .transport
        .as_deref()
        .or(config.transport.as_deref())
        .ok_or_else(|| {
            format!(
                "No transport specified (use --transport or set `transport` in the config file)\n{}",
                transports::transport_help().trim_end()
            )
        })?;

    let transport = transports::open_transport(transport_str)?;
    let sram_config = sram_config(&cli, &config)?;
    log::debug!(
        "Array size {} bytes, bounds checking {}",
        sram_config.capacity,
        if sram_config.check_bounds { "on" } else { "off" }
    );

    let mut sram = Sram::with_config(transport, sram_config);
    dispatch(&mut sram, cli.command, &config)
}

/// Driver configuration from the config file with command line overrides
fn sram_config(cli: &Cli, config: &Config) -> Result<SramConfig, Box<dyn std::error::Error>> {
    let mut sram_config = config.sram_config();
    if let Some(capacity) = cli.capacity {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(format!("Invalid capacity: {} (must be a power of two)", capacity).into());
        }
        sram_config = sram_config.capacity(capacity);
    }
    if cli.no_bounds_check {
        sram_config = sram_config.check_bounds(false);
    }
    Ok(sram_config)
}

fn dispatch<T: SpiTransport>(
    sram: &mut Sram<T>,
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Status => commands::run_status(sram),
        Commands::Set { settings, raw } => commands::run_set(sram, &settings.to_settings(), raw),
        Commands::Configure { settings } => {
            commands::run_configure(sram, &config.settings, &settings.to_settings())
        }
        Commands::Read {
            address,
            length,
            output,
        } => commands::run_read(sram, address, length, output.as_deref()),
        Commands::Write {
            address,
            input,
            no_verify,
        } => commands::run_write(sram, address, &input, !no_verify),
        Commands::Verify { address, input } => commands::run_verify(sram, address, &input),
        Commands::Stress {
            seed,
            iterations,
            dump,
        } => commands::run_stress(sram, &config.settings, seed, iterations, dump),
        Commands::ListTransports => {
            commands::list_transports();
            Ok(())
        }
    }
}
