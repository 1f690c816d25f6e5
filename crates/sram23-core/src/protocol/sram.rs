//! 23xx04M command sequences
//!
//! Every function here is one framed transaction on the transport, except
//! the field setters which read the status register and write it back.
//! Addresses are sent as given; range checks live in [`crate::device`].

use crate::error::{Error, Result};
use crate::spi::SramCommand;
use crate::status::{DecodedStatus, DriveStrength, Mode, PageSize, Settings, SlewRate, Status};
use crate::transport::{execute, SpiTransport};

/// Write a single byte
///
/// Frame: `02 AH AM AL V`.
pub fn write_byte<T: SpiTransport + ?Sized>(transport: &mut T, addr: u32, value: u8) -> Result<()> {
    let data = [value];
    let mut cmd = SramCommand::write(addr, &data);
    execute(transport, &mut cmd)?;
    Ok(())
}

/// Write `data` starting at `addr` in one continuous transaction
///
/// The chip only advances across the whole array in sequential mode; in
/// page mode the pointer wraps inside the current page.
pub fn sequential_write<T: SpiTransport + ?Sized>(
    transport: &mut T,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    let mut cmd = SramCommand::write(addr, data);
    execute(transport, &mut cmd)?;
    Ok(())
}

/// Read a single byte
pub fn read_byte<T: SpiTransport + ?Sized>(transport: &mut T, addr: u32) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SramCommand::read(addr, &mut buf);
    let n = execute(transport, &mut cmd)?;
    if n != 1 {
        return Err(Error::ShortRead {
            expected: 1,
            actual: n,
        });
    }
    Ok(buf[0])
}

/// Fill `buf` starting at `addr` in one continuous transaction
///
/// Returns the number of bytes actually read. It may be lower than
/// `buf.len()`; the tail of `buf` is then left untouched.
pub fn sequential_read<T: SpiTransport + ?Sized>(
    transport: &mut T,
    addr: u32,
    buf: &mut [u8],
) -> Result<usize> {
    let mut cmd = SramCommand::read(addr, buf);
    execute(transport, &mut cmd)
}

/// Read the 16-bit status register
pub fn read_status<T: SpiTransport + ?Sized>(transport: &mut T) -> Result<Status> {
    let mut buf = [0u8; 2];
    let mut cmd = SramCommand::read_status(&mut buf);
    let n = execute(transport, &mut cmd)?;
    if n != buf.len() {
        return Err(Error::ShortRead {
            expected: buf.len(),
            actual: n,
        });
    }
    Ok(Status::from_be_bytes(buf))
}

/// Write the full 16-bit status register
pub fn write_status<T: SpiTransport + ?Sized>(transport: &mut T, status: Status) -> Result<()> {
    let data = status.to_be_bytes();
    let mut cmd = SramCommand::write_status(&data);
    execute(transport, &mut cmd)?;
    Ok(())
}

/// Read the status register, apply `settings` and write it back
///
/// Returns the value written. Nothing is written when `settings` is empty.
pub fn update_status<T: SpiTransport + ?Sized>(
    transport: &mut T,
    settings: &Settings,
) -> Result<Status> {
    let current = read_status(transport)?;
    if settings.is_empty() {
        return Ok(current);
    }
    let updated = settings.apply_to(current);
    log::debug!("status {} -> {}", current, updated);
    write_status(transport, updated)?;
    Ok(updated)
}

/// Change the operating mode, keeping every other bit
pub fn set_mode<T: SpiTransport + ?Sized>(transport: &mut T, mode: Mode) -> Result<()> {
    let settings = Settings {
        mode: Some(mode),
        ..Default::default()
    };
    update_status(transport, &settings).map(|_| ())
}

/// Change the page size, keeping every other bit
pub fn set_page_size<T: SpiTransport + ?Sized>(transport: &mut T, size: PageSize) -> Result<()> {
    let settings = Settings {
        page_size: Some(size),
        ..Default::default()
    };
    update_status(transport, &settings).map(|_| ())
}

/// Change the output slew rate, keeping every other bit
pub fn set_slew_rate<T: SpiTransport + ?Sized>(transport: &mut T, rate: SlewRate) -> Result<()> {
    let settings = Settings {
        slew_rate: Some(rate),
        ..Default::default()
    };
    update_status(transport, &settings).map(|_| ())
}

/// Change the output drive strength, keeping every other bit
pub fn set_drive_strength<T: SpiTransport + ?Sized>(
    transport: &mut T,
    strength: DriveStrength,
) -> Result<()> {
    let settings = Settings {
        drive_strength: Some(strength),
        ..Default::default()
    };
    update_status(transport, &settings).map(|_| ())
}

/// Read the status register and split it into fields
pub fn read_decoded_status<T: SpiTransport + ?Sized>(transport: &mut T) -> Result<DecodedStatus> {
    read_status(transport).map(Status::decode)
}
