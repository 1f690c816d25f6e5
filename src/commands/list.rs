//! List command implementation

use crate::transports;
use sram23_core::device::SRAM_23XX04M;

/// List transports compiled into this binary and the supported parts
pub fn list_transports() {
    println!("{}", transports::transport_help());

    for t in transports::available_transports() {
        if !t.aliases.is_empty() {
            println!("  {:12}   aliases: {}", t.name, t.aliases.join(", "));
        }
    }

    println!();
    println!(
        "Supported parts: {} ({} KiB, up to {} MHz)",
        SRAM_23XX04M.names.join(", "),
        SRAM_23XX04M.capacity / 1024,
        SRAM_23XX04M.max_clock_hz / 1_000_000
    );
}
