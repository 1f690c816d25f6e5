//! Scoped chip-select sessions
//!
//! A [`Session`] asserts chip select when it begins and releases it when it
//! is finished or dropped, so an early return through `?` never leaves the
//! chip selected.

use super::SpiTransport;
use crate::error::{Error, Result};
use crate::spi::SramCommand;

/// One chip-select-asserted transaction
pub struct Session<'a, T: SpiTransport + ?Sized> {
    transport: &'a mut T,
    active: bool,
}

impl<'a, T: SpiTransport + ?Sized> Session<'a, T> {
    /// Assert chip select and start a transaction
    pub fn begin(transport: &'a mut T) -> Result<Self> {
        if let Err(e) = transport.select() {
            if let Err(release) = transport.deselect() {
                log::warn!("release after failed select also failed: {}", release);
            }
            return Err(e);
        }
        Ok(Self {
            transport,
            active: true,
        })
    }

    /// Clock out `data`, splitting it to the transport's transfer limit
    ///
    /// Returns the number of bytes sent. Stops at the first short chunk.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        let max_len = self.transport.max_transfer_len().max(1);
        let mut sent = 0;

        for chunk in data.chunks(max_len) {
            let n = self.transport.transfer(chunk)?;
            sent += n.min(chunk.len());
            if n < chunk.len() {
                break;
            }
        }

        Ok(sent)
    }

    /// Clock in `buf.len()` bytes, splitting to the transport's transfer limit
    ///
    /// Returns the number of bytes received. Stops at the first short chunk,
    /// leaving the rest of `buf` untouched.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let max_len = self.transport.max_transfer_len().max(1);
        let mut received = 0;

        for chunk in buf.chunks_mut(max_len) {
            let want = chunk.len();
            let n = self.transport.receive(chunk)?;
            received += n.min(want);
            if n < want {
                break;
            }
        }

        Ok(received)
    }

    /// Release chip select and end the transaction
    pub fn finish(mut self) -> Result<()> {
        self.active = false;
        self.transport.deselect()
    }
}

impl<T: SpiTransport + ?Sized> Drop for Session<'_, T> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.transport.deselect() {
                log::warn!("failed to release chip select: {}", e);
            }
        }
    }
}

/// Run a command as one session
///
/// Sends the header and write data, then fills the read buffer. Returns the
/// number of bytes read back. A short write phase is an error; a short read
/// phase is reported through the returned count. Instructions the driver
/// does not support are rejected before chip select is touched.
pub fn execute<T: SpiTransport + ?Sized>(
    transport: &mut T,
    cmd: &mut SramCommand<'_>,
) -> Result<usize> {
    if !cmd.instruction.is_supported() {
        return Err(Error::UnsupportedInstruction(cmd.instruction.opcode()));
    }

    let header = cmd.header();
    let expected = cmd.write_len();

    log::trace!(
        "{} addr={:?} write={} read={}",
        cmd.instruction,
        cmd.address,
        cmd.write_data.len(),
        cmd.read_buf.len()
    );

    let mut session = Session::begin(transport)?;

    let mut sent = session.write(header.as_slice())?;
    if sent == header.len() && cmd.has_write() {
        sent += session.write(cmd.write_data)?;
    }
    if sent != expected {
        return Err(Error::ShortWrite {
            expected,
            actual: sent,
        });
    }

    let received = if cmd.has_read() {
        session.read(cmd.read_buf)?
    } else {
        0
    };

    session.finish()?;
    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::Recorder;

    #[test]
    fn test_execute_single_session() {
        let mut bus = Recorder::default();
        let data = [0x42];
        let mut cmd = SramCommand::write(0x001337, &data);
        assert_eq!(execute(&mut bus, &mut cmd), Ok(0));
        assert_eq!(bus.mosi, [0x02, 0x00, 0x13, 0x37, 0x42]);
        assert_eq!(bus.selects, 1);
        assert_eq!(bus.deselects, 1);
        assert!(!bus.selected);
    }

    #[test]
    fn test_short_write_releases_chip_select() {
        let mut bus = Recorder {
            write_limit: Some(4),
            ..Default::default()
        };
        let data = [0x42];
        let mut cmd = SramCommand::write(0x001337, &data);
        assert_eq!(
            execute(&mut bus, &mut cmd),
            Err(Error::ShortWrite {
                expected: 5,
                actual: 4
            })
        );
        assert!(!bus.selected);
        assert_eq!(bus.deselects, 1);
    }

    #[test]
    fn test_transfer_error_releases_chip_select() {
        let mut bus = Recorder {
            fail_transfer: true,
            ..Default::default()
        };
        let mut buf = [0u8; 2];
        let mut cmd = SramCommand::read_status(&mut buf);
        assert_eq!(execute(&mut bus, &mut cmd), Err(Error::BusFault));
        assert!(!bus.selected);
    }

    #[test]
    fn test_long_write_is_split_within_one_session() {
        let mut bus = Recorder {
            max_len: Some(3),
            ..Default::default()
        };
        let data = [0xAAu8; 10];
        let mut cmd = SramCommand::write(0, &data);
        assert_eq!(execute(&mut bus, &mut cmd), Ok(0));
        // header: 3 + 1, data: 3 + 3 + 3 + 1
        assert_eq!(bus.transfer_calls, 6);
        assert_eq!(bus.selects, 1);
        assert_eq!(bus.mosi.len(), 14);
    }

    #[test]
    fn test_unsupported_instruction_not_driven() {
        let mut bus = Recorder::default();
        let mut buf = [0u8; 4];
        let mut cmd = SramCommand::read(0, &mut buf);
        cmd.instruction = crate::spi::Instruction::FastRead;
        assert_eq!(
            execute(&mut bus, &mut cmd),
            Err(Error::UnsupportedInstruction(0x0B))
        );
        assert_eq!(bus.selects, 0);
    }

    #[test]
    fn test_short_read_is_a_count() {
        let mut bus = Recorder::with_miso(&[1, 2, 3, 4]);
        bus.read_limit = Some(2);
        let mut buf = [0xEEu8; 4];
        let mut cmd = SramCommand::read(0x10, &mut buf);
        assert_eq!(execute(&mut bus, &mut cmd), Ok(2));
        assert_eq!(buf, [1, 2, 0xEE, 0xEE]);
    }
}
