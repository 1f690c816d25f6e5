//! Stress command implementation
//!
//! Configures the chip for sequential access with 256-byte pages, then
//! writes pages of random uppercase letters at random page-aligned
//! addresses and reads each one back. The generator is seeded so a failing
//! run can be repeated exactly.

use super::configure::merge;
use super::hexdump;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sram23_core::device::Sram;
use sram23_core::status::{DriveStrength, Mode, PageSize, Settings, SlewRate};
use sram23_core::transport::SpiTransport;

/// Bytes written and checked per iteration
pub const STRESS_PAGE_SIZE: usize = 256;

/// Status fields set before the run unless the configuration overrides them
pub const STRESS_SETTINGS: Settings = Settings {
    mode: Some(Mode::Sequential),
    page_size: Some(PageSize::Large),
    slew_rate: Some(SlewRate::Rate3),
    drive_strength: Some(DriveStrength::Str5),
};

/// Run `iterations` write/read/compare rounds, or until a failure when 0
pub fn run_stress<T: SpiTransport>(
    sram: &mut Sram<T>,
    overrides: &Settings,
    seed: u64,
    iterations: u64,
    dump: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = merge(&STRESS_SETTINGS, overrides);
    sram.apply(&settings)?;
    println!("{}", sram.decoded_status()?);

    let pages = sram.capacity() / STRESS_PAGE_SIZE as u32;
    if pages == 0 {
        return Err(format!("Array too small for {}-byte pages", STRESS_PAGE_SIZE).into());
    }

    log::info!("Stress test with seed {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let pb = if iterations == 0 {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::new(iterations)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({per_sec}) {msg}")?
            .progress_chars("#>-"),
    );

    let mut source = [0u8; STRESS_PAGE_SIZE];
    let mut readback = [0u8; STRESS_PAGE_SIZE];
    let mut done = 0u64;

    while iterations == 0 || done < iterations {
        source.iter_mut().for_each(|b| *b = rng.gen_range(b'A'..=b'Z'));
        let addr = rng.gen_range(0..pages) * STRESS_PAGE_SIZE as u32;
        pb.set_message(format!("@ 0x{:06x}", addr));

        if let Err(e) = check_page(sram, addr, &source, &mut readback) {
            pb.abandon_with_message("Stress test failed!");
            return Err(format!("Page {} @ 0x{:06x}: {}", done, addr, e).into());
        }

        let dumped = hexdump(addr, &readback);
        if dump {
            pb.suspend(|| print!("{}", dumped));
        } else {
            log::trace!("page @ 0x{:06x}\n{}", addr, dumped);
        }

        done += 1;
        pb.inc(1);
    }

    pb.finish_with_message("done");
    println!("{} pages written and verified", done);
    Ok(())
}

/// Write one page, read it back and compare
fn check_page<T: SpiTransport>(
    sram: &mut Sram<T>,
    addr: u32,
    source: &[u8],
    readback: &mut [u8],
) -> Result<(), Box<dyn std::error::Error>> {
    sram.sequential_write(addr, source)
        .map_err(|e| format!("Failed to write the whole page: {}", e))?;

    readback.fill(0);
    sram.read_exact(addr, readback)
        .map_err(|e| format!("Failed to read the whole page: {}", e))?;

    if let Some(i) = source.iter().zip(readback.iter()).position(|(a, b)| a != b) {
        return Err(format!(
            "Read does not match write at 0x{:06x} (expected {:02x}, got {:02x})",
            addr as usize + i,
            source[i],
            readback[i]
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram23_core::status::Status;
    use sram23_dummy::{DummySram, Faults};

    #[test]
    fn test_stress_passes_on_emulator() {
        let mut sram = Sram::new(DummySram::new_default());
        run_stress(&mut sram, &Settings::default(), 1337, 32, false).unwrap();

        let dummy = sram.release();
        assert_eq!(dummy.status(), Status::from_raw(0x4114));
        // every written byte is an uppercase letter
        let written = dummy.data().iter().filter(|&&b| b != 0).count();
        assert!(written >= STRESS_PAGE_SIZE);
        assert!(dummy
            .data()
            .iter()
            .all(|&b| b == 0 || b.is_ascii_uppercase()));
    }

    #[test]
    fn test_stress_same_seed_same_pages() {
        let mut a = Sram::new(DummySram::new_default());
        let mut b = Sram::new(DummySram::new_default());
        run_stress(&mut a, &Settings::default(), 7, 8, false).unwrap();
        run_stress(&mut b, &Settings::default(), 7, 8, false).unwrap();
        assert_eq!(a.release().data(), b.release().data());
    }

    #[test]
    fn test_stress_short_read_fails() {
        let mut dummy = DummySram::new_default();
        dummy.set_faults(Faults {
            read_limit: Some(100),
            ..Default::default()
        });
        let mut sram = Sram::new(dummy);
        // status read needs 2 bytes, page read needs 256
        let err = run_stress(&mut sram, &Settings::default(), 1337, 4, false).unwrap_err();
        assert!(err.to_string().contains("Failed to read the whole page"), "{}", err);
    }

    #[test]
    fn test_stress_detects_corruption() {
        // pointer stuck in byte mode: only the first byte of each page lands
        let mut sram = Sram::new(DummySram::new_default());
        let overrides = Settings {
            mode: Some(Mode::Byte),
            ..Default::default()
        };
        let err = run_stress(&mut sram, &overrides, 1337, 4, false).unwrap_err();
        assert!(err.to_string().contains("Read does not match write"), "{}", err);
    }
}
