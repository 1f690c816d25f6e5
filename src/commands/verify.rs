//! `verify`: compare memory against a file

use super::{progress_bar, CHUNK_SIZE};
use sram23_core::device::Sram;
use sram23_core::spi::address_at;
use sram23_core::transport::SpiTransport;
use std::fs;
use std::path::Path;

/// Compare memory starting at `address` against a file
pub fn run_verify<T: SpiTransport>(
    sram: &mut Sram<T>,
    address: u32,
    input: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let expected = fs::read(input)?;
    println!(
        "Comparing {} bytes of {} at 0x{:06X}",
        expected.len(),
        input.display(),
        address
    );

    verify_with_progress(sram, address, &expected)?;

    println!("Memory matches {}", input.display());
    Ok(())
}

/// Read back `expected.len()` bytes and report every differing byte
pub fn verify_with_progress<T: SpiTransport>(
    sram: &mut Sram<T>,
    address: u32,
    expected: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = vec![0u8; CHUNK_SIZE];

    let pb = progress_bar(expected.len() as u64, "Verifying")?;

    let mut offset = 0usize;
    let mut differing = 0usize;
    let mut first: Option<(u32, u8, u8)> = None;

    for expected_chunk in expected.chunks(CHUNK_SIZE) {
        let chunk = &mut buf[..expected_chunk.len()];
        sram.read_exact(address_at(address, offset), chunk)?;

        for (i, (actual, expected)) in chunk.iter().zip(expected_chunk).enumerate() {
            if actual != expected {
                if first.is_none() {
                    first = Some((address_at(address, offset + i), *actual, *expected));
                }
                differing += 1;
            }
        }

        offset += expected_chunk.len();
        pb.set_position(offset as u64);
    }

    if let Some((addr, actual, expected)) = first {
        pb.abandon_with_message("mismatch");
        return Err(format!(
            "{} byte(s) differ, first at 0x{:06X}: expected 0x{:02X}, read 0x{:02X}",
            differing, addr, expected, actual
        )
        .into());
    }

    pb.finish_with_message("match");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram23_core::device::SramConfig;
    use sram23_dummy::{DummyConfig, DummySram};

    #[test]
    fn test_verify_reports_first_mismatch() {
        let mut dummy = DummySram::new_default();
        dummy.data_mut()[0x2000..0x2100].fill(0xAA);
        dummy.data_mut()[0x2042] = 0x55;
        dummy.data_mut()[0x20F0] = 0x00;
        let mut sram = Sram::new(dummy);

        let err = verify_with_progress(&mut sram, 0x2000, &[0xAA; 0x100]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2 byte(s) differ"), "{}", msg);
        assert!(msg.contains("0x002042"), "{}", msg);
    }

    #[test]
    fn test_verify_mismatch_address_wraps_to_24_bits() {
        let mut dummy = DummySram::new(DummyConfig {
            fill: 0x11,
            ..Default::default()
        });
        dummy.data_mut()[0x10] = 0x00;
        let mut sram = Sram::with_config(dummy, SramConfig::default().check_bounds(false));

        // 0xFFFF_F000 + 0x1010 wraps to 0x000010, which holds the odd byte
        let err = verify_with_progress(&mut sram, 0xFFFF_F000, &[0x11; 0x2000]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1 byte(s) differ"), "{}", msg);
        assert!(msg.contains("0x000010"), "{}", msg);
    }

    #[test]
    fn test_verify_matching() {
        let mut dummy = DummySram::new_default();
        dummy.data_mut()[..5].copy_from_slice(b"hello");
        let mut sram = Sram::new(dummy);
        verify_with_progress(&mut sram, 0, b"hello").unwrap();
    }
}
