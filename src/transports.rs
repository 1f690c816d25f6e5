//! Transport registration and dispatch
//!
//! Transports are selected with a string of the form `name` or
//! `name:key1=value1,key2=value2`. Each backend is feature-gated; the
//! registry only lists what was compiled in.

use sram23_core::transport::{SpiTransport, TransportInfo};

/// Get information about all available transports (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "In-memory 23xx04M emulator (size=<bytes>,status=<hex>,maxlen=<n>,fill=<byte>)",
        requires_root: false,
    });

    #[cfg(feature = "linux-spi")]
    transports.push(TransportInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev interface (dev=/dev/spidevX.Y,spispeed=<kHz>,mode=<0|3>)",
        requires_root: true,
    });

    #[cfg(feature = "linux-gpio")]
    transports.push(TransportInfo {
        name: "linux_gpio_spi",
        aliases: &["linux_gpio", "linux-gpio", "gpio"],
        description:
            "Bit-banged SPI over GPIO lines (dev=/dev/gpiochipN,cs=,sck=,mosi=,miso=,spispeed=<kHz>,timeout=<ms>)",
        requires_root: true,
    });

    transports
}

/// Generate help text listing all available transports
pub fn transport_help() -> String {
    let transports = available_transports();

    if transports.is_empty() {
        return "No transports available (recompile with transport features enabled)".to_string();
    }

    let mut help = String::from("Available transports:\n");
    for t in &transports {
        let root = if t.requires_root { " [root]" } else { "" };
        help.push_str(&format!("  {:12} - {}{}\n", t.name, t.description, root));
    }
    help
}

/// Resolve a name or alias to the canonical transport name
pub fn find_transport(name: &str) -> Option<&'static str> {
    available_transports()
        .into_iter()
        .find(|t| t.name == name || t.aliases.contains(&name))
        .map(|t| t.name)
}

/// Split a transport string into its name and `key=value` options
///
/// `"linux_spi:dev=/dev/spidev0.0,spispeed=8000"` gives
/// `("linux_spi", [("dev", "/dev/spidev0.0"), ("spispeed", "8000")])`.
pub fn parse_transport_string(s: &str) -> Result<(&str, Vec<(&str, &str)>), String> {
    let (name, opts) = s.split_once(':').unwrap_or((s, ""));

    let mut options = Vec::new();
    for opt in opts.split(',').filter(|o| !o.is_empty()) {
        match opt.split_once('=') {
            Some((key, value)) => options.push((key.trim(), value.trim())),
            None => {
                return Err(format!(
                    "Invalid transport option: '{}' (expected key=value)",
                    opt
                ))
            }
        }
    }

    Ok((name, options))
}

fn unknown_transport_error(name: &str) -> Box<dyn std::error::Error> {
    format!(
        "Unknown transport: {}\n{}",
        name,
        transport_help().trim_end()
    )
    .into()
}

/// Open a transport from its string description
pub fn open_transport(
    transport_str: &str,
) -> Result<Box<dyn SpiTransport + Send>, Box<dyn std::error::Error>> {
    let (name, options) = parse_transport_string(transport_str)?;
    let canonical = find_transport(name).ok_or_else(|| unknown_transport_error(name))?;

    log::debug!("Opening transport {} with {:?}", canonical, options);

    match canonical {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&options),

        #[cfg(feature = "linux-spi")]
        "linux_spi" => {
            log::info!("Opening Linux spidev transport...");
            sram23_linux_spi::open_linux_spi(&options)
        }

        #[cfg(feature = "linux-gpio")]
        "linux_gpio_spi" => {
            log::info!("Opening Linux GPIO bit-bang transport...");
            sram23_linux_gpio::open_linux_gpio_spi(&options)
        }

        _ => Err(unknown_transport_error(name)),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(
    options: &[(&str, &str)],
) -> Result<Box<dyn SpiTransport + Send>, Box<dyn std::error::Error>> {
    let config = sram23_dummy::parse_options(options)?;
    log::info!(
        "Using emulated SRAM ({} bytes, status {})",
        config.capacity,
        config.status
    );
    Ok(Box::new(sram23_dummy::DummySram::new(config)))
}
