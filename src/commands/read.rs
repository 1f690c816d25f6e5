//! Read command implementation

use super::{hexdump, progress_bar, CHUNK_SIZE};
use sram23_core::device::Sram;
use sram23_core::spi::address_at;
use sram23_core::transport::SpiTransport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Read `length` bytes from `address` into a file, or print them as a hexdump
///
/// Without a length the read runs to the end of the array.
pub fn run_read<T: SpiTransport>(
    sram: &mut Sram<T>,
    address: u32,
    length: Option<u32>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let length = match length {
        Some(len) => len,
        None => sram
            .capacity()
            .checked_sub(address)
            .ok_or_else(|| format!("Address 0x{:06X} is past the end of the array", address))?,
    };

    let data = read_with_progress(sram, address, length as usize, output.is_some())?;

    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(&data)?;
            println!("Wrote {} bytes to {:?}", data.len(), path);
        }
        None => print!("{}", hexdump(address, &data)),
    }

    Ok(())
}

/// Read a range in [`CHUNK_SIZE`] transactions
pub fn read_with_progress<T: SpiTransport>(
    sram: &mut Sram<T>,
    address: u32,
    length: usize,
    show_progress: bool,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; length];

    let pb = if show_progress {
        Some(progress_bar(length as u64, "Reading")?)
    } else {
        None
    };

    let mut offset = 0usize;
    for chunk in data.chunks_mut(CHUNK_SIZE) {
        sram.read_exact(address_at(address, offset), chunk)?;
        offset += chunk.len();
        if let Some(pb) = &pb {
            pb.set_position(offset as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Read complete");
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram23_core::device::SramConfig;
    use sram23_core::error::Error;
    use sram23_dummy::DummySram;

    #[test]
    fn test_read_across_chunks() {
        let mut dummy = DummySram::new_default();
        for (i, b) in dummy.data_mut()[0x1000..0x3000].iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut sram = Sram::new(dummy);
        let data = read_with_progress(&mut sram, 0x1000, 0x2000, false).unwrap();
        assert_eq!(data.len(), 0x2000);
        assert!(data.iter().enumerate().all(|(i, &b)| b == i as u8));
        // two 4 KiB transactions
        assert_eq!(sram.release().transactions().len(), 2);
    }

    #[test]
    fn test_read_to_end_of_array() {
        let mut sram = Sram::new(DummySram::new_default());
        run_read(&mut sram, 0x7FFF0, None, None).unwrap();
        assert!(run_read(&mut sram, 0x80001, None, None).is_err());
    }

    #[test]
    fn test_read_near_top_of_u32_without_bounds_check() {
        let mut sram = Sram::with_config(
            DummySram::new_default(),
            SramConfig::default().check_bounds(false),
        );
        let data = read_with_progress(&mut sram, u32::MAX, 0x2000, false).unwrap();
        assert_eq!(data.len(), 0x2000);
        let dummy = sram.release();
        assert_eq!(&dummy.transactions()[0][..], &[0x03, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&dummy.transactions()[1][..], &[0x03, 0x00, 0x0F, 0xFF]);
    }

    #[test]
    fn test_read_past_end_rejected() {
        let mut sram = Sram::new(DummySram::new_default());
        let err = read_with_progress(&mut sram, 0x7FF00, 0x200, false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::AddressOutOfBounds)
        );
    }
}
