//! `write`: copy a file into memory

use super::verify::verify_with_progress;
use super::{progress_bar, CHUNK_SIZE};
use sram23_core::device::Sram;
use sram23_core::spi::address_at;
use sram23_core::transport::SpiTransport;
use std::fs;
use std::path::Path;

/// Write a file to memory starting at `address`
pub fn run_write<T: SpiTransport>(
    sram: &mut Sram<T>,
    address: u32,
    input: &Path,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    println!(
        "Writing {} bytes of {} at 0x{:06X}",
        data.len(),
        input.display(),
        address
    );

    if sram.config().check_bounds && !sram.config().is_valid_range(address, data.len()) {
        return Err(format!(
            "File size ({} bytes) at 0x{:06X} exceeds array size ({} bytes)",
            data.len(),
            address,
            sram.capacity()
        )
        .into());
    }

    write_with_progress(sram, address, &data)?;

    if verify {
        verify_with_progress(sram, address, &data)?;
        println!("Read back OK");
    }

    Ok(())
}

/// Write `data` in [`CHUNK_SIZE`] transactions
pub fn write_with_progress<T: SpiTransport>(
    sram: &mut Sram<T>,
    address: u32,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = progress_bar(data.len() as u64, "Writing")?;

    let mut offset = 0usize;
    for chunk in data.chunks(CHUNK_SIZE) {
        sram.sequential_write(address_at(address, offset), chunk)?;
        offset += chunk.len();
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram23_core::device::SramConfig;
    use sram23_dummy::DummySram;

    #[test]
    fn test_write_chunks_land_in_order() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i * 7) as u8).collect();
        let mut sram = Sram::new(DummySram::new_default());
        write_with_progress(&mut sram, 0x100, &data).unwrap();
        let dummy = sram.release();
        assert_eq!(&dummy.data()[0x100..0x100 + data.len()], &data[..]);
        assert_eq!(dummy.transactions().len(), 3);
        // each chunk carries its own address
        assert_eq!(&dummy.transactions()[1][..4], &[0x02, 0x00, 0x11, 0x00]);
    }

    #[test]
    fn test_write_near_top_of_u32_without_bounds_check() {
        let mut sram = Sram::with_config(
            DummySram::new_default(),
            SramConfig::default().check_bounds(false),
        );
        write_with_progress(&mut sram, 0xFFFF_F800, &[0x11; 8192]).unwrap();

        let dummy = sram.release();
        assert_eq!(&dummy.transactions()[0][..4], &[0x02, 0xFF, 0xF8, 0x00]);
        assert_eq!(&dummy.transactions()[1][..4], &[0x02, 0x00, 0x08, 0x00]);
        // 0xFFF800 lands at 0x7F800 in a 512 KiB array and runs over its end
        assert!(dummy.data()[0x7F800..].iter().all(|&b| b == 0x11));
        assert!(dummy.data()[..0x1800].iter().all(|&b| b == 0x11));
        assert_eq!(dummy.data()[0x1800], 0);
    }
}
