//! Set and configure command implementations

use sram23_core::device::Sram;
use sram23_core::status::{Settings, Status, StatusBits};
use sram23_core::transport::SpiTransport;

/// Change individual status fields, or write a raw register value
pub fn run_set<T: SpiTransport>(
    sram: &mut Sram<T>,
    settings: &Settings,
    raw: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(raw) = raw {
        let ignored = raw & !StatusBits::WRITABLE.bits();
        if ignored != 0 {
            log::warn!("Bits {:#06x} are read-only and will be ignored", ignored);
        }
        sram.set_status(Status::from_raw(raw))?;
    } else if settings.is_empty() {
        return Err("Nothing to set (use --mode, --page-size, --slew, --drive or --raw)".into());
    } else {
        sram.apply(settings)?;
    }

    report(sram)
}

/// Apply the configuration file's settings, with command line fields taking precedence
pub fn run_configure<T: SpiTransport>(
    sram: &mut Sram<T>,
    from_file: &Settings,
    from_flags: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = merge(from_file, from_flags);
    if settings.is_empty() {
        log::warn!("No settings in the configuration file or on the command line");
    } else {
        sram.apply(&settings)?;
    }

    report(sram)
}

pub(super) fn merge(base: &Settings, overrides: &Settings) -> Settings {
    Settings {
        mode: overrides.mode.or(base.mode),
        page_size: overrides.page_size.or(base.page_size),
        slew_rate: overrides.slew_rate.or(base.slew_rate),
        drive_strength: overrides.drive_strength.or(base.drive_strength),
    }
}

/// Read back and print the register after a change
fn report<T: SpiTransport>(sram: &mut Sram<T>) -> Result<(), Box<dyn std::error::Error>> {
    let decoded = sram.decoded_status()?;
    log::info!("Status register now {:#06x}", decoded.raw);
    println!("{}", decoded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram23_core::status::{DriveStrength, Mode, PageSize, SlewRate};
    use sram23_dummy::DummySram;

    #[test]
    fn test_set_fields() {
        let mut sram = Sram::new(DummySram::new_default());
        let settings = Settings {
            mode: Some(Mode::Page),
            drive_strength: Some(DriveStrength::Str8),
            ..Default::default()
        };
        run_set(&mut sram, &settings, None).unwrap();
        assert_eq!(sram.release().status(), Status::from_raw(0x8017));
    }

    #[test]
    fn test_set_raw_keeps_read_only_bits() {
        let mut sram = Sram::new(DummySram::new_default());
        run_set(&mut sram, &Settings::default(), Some(0x7FFF)).unwrap();
        // ECS and protocol are not writable, reserved bits are masked out
        assert_eq!(sram.release().status(), Status::from_raw(0x411F));
    }

    #[test]
    fn test_set_requires_something() {
        let mut sram = Sram::new(DummySram::new_default());
        assert!(run_set(&mut sram, &Settings::default(), None).is_err());
    }

    #[test]
    fn test_configure_flags_override_file() {
        let mut sram = Sram::new(DummySram::new_default());
        let file = Settings {
            mode: Some(Mode::Byte),
            page_size: Some(PageSize::Large),
            ..Default::default()
        };
        let flags = Settings {
            mode: Some(Mode::Page),
            slew_rate: Some(SlewRate::Rate1),
            ..Default::default()
        };
        run_configure(&mut sram, &file, &flags).unwrap();
        let status = sram.release().status();
        assert_eq!(status.mode(), Some(Mode::Page));
        assert_eq!(status.page_size(), PageSize::Large);
        assert_eq!(status.slew_rate(), SlewRate::Rate1);
        assert_eq!(status.drive_strength(), DriveStrength::Str5);
    }
}
