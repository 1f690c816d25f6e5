//! CLI command implementations
//!
//! Every command takes an open [`Sram`](sram23_core::device::Sram) over a
//! boxed transport. Transfers are split into [`CHUNK_SIZE`] pieces so the
//! progress bars move and each transaction stays within what the Linux
//! transports can send in one message.

mod configure;
mod list;
mod read;
mod status;
mod stress;
mod verify;
mod write;

pub use configure::{run_configure, run_set};
pub use list::list_transports;
pub use read::run_read;
pub use status::run_status;
pub use stress::run_stress;
pub use verify::run_verify;
pub use write::run_write;

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;

/// Bytes moved per transaction by read, write and verify
pub const CHUNK_SIZE: usize = 4096;

/// Byte progress bar with an optional trailing label
pub fn progress_bar(
    total: u64,
    label: &str,
) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                label
            ))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Format `data` as 16 bytes per line, each line prefixed with its address
pub fn hexdump(addr: u32, data: &[u8]) -> String {
    let mut out = String::new();
    for (i, line) in data.chunks(16).enumerate() {
        let _ = write!(out, "0x{:06x}:", addr as usize + i * 16);
        for byte in line {
            let _ = write!(out, " {:02x}", byte);
        }
        // pad short lines so the ASCII column lines up
        for _ in line.len()..16 {
            out.push_str("   ");
        }
        out.push_str("  |");
        out.extend(line.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexdump_layout() {
        let dump = hexdump(0x7FFF0, b"ABCDEFGHIJKLMNOPQR");
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0x07fff0: 41 42 43"));
        assert!(lines[0].ends_with("|ABCDEFGHIJKLMNOP|"));
        assert!(lines[1].starts_with("0x080000: 51 52 "));
        assert!(lines[1].ends_with("|QR|"));
        // ASCII column aligned on both lines
        assert_eq!(lines[0].find('|'), lines[1].find('|'));
    }

    #[test]
    fn test_hexdump_non_printable() {
        let dump = hexdump(0, &[0x00, 0x41, 0xFF]);
        assert!(dump.ends_with("|.A.|\n"));
    }
}
