//! Recording transport for unit tests

extern crate std;

use super::{SpiTransport, TransportFeatures};
use crate::error::{Error, Result};
use std::vec::Vec;

/// Records what goes over MOSI and plays back a fixed MISO script
#[derive(Debug, Default)]
pub struct Recorder {
    /// CS is currently asserted
    pub selected: bool,
    /// Number of `select` calls
    pub selects: usize,
    /// Number of `deselect` calls
    pub deselects: usize,
    /// Bytes clocked out during the current or last session
    pub mosi: Vec<u8>,
    /// Bytes handed out by `receive`, in order
    pub miso: Vec<u8>,
    /// Next index into `miso`
    pub miso_pos: usize,
    /// Stop accepting bytes once this many were sent in a session
    pub write_limit: Option<usize>,
    /// Stop returning bytes once this many were received in a session
    pub read_limit: Option<usize>,
    /// Reported `max_transfer_len`, unlimited if `None`
    pub max_len: Option<usize>,
    /// Number of `transfer` calls that were not failed
    pub transfer_calls: usize,
    /// Every `transfer` fails with `Error::BusFault`
    pub fail_transfer: bool,
    /// Bytes received in the current session
    pub received: usize,
}

impl Recorder {
    /// Recorder that plays back `miso`
    pub fn with_miso(miso: &[u8]) -> Self {
        Self {
            miso: miso.to_vec(),
            ..Default::default()
        }
    }
}

impl SpiTransport for Recorder {
    fn features(&self) -> TransportFeatures {
        TransportFeatures::EMULATED
    }

    fn max_transfer_len(&self) -> usize {
        self.max_len.unwrap_or(usize::MAX)
    }

    fn select(&mut self) -> Result<()> {
        self.selected = true;
        self.selects += 1;
        self.mosi.clear();
        self.received = 0;
        Ok(())
    }

    fn deselect(&mut self) -> Result<()> {
        self.selected = false;
        self.deselects += 1;
        Ok(())
    }

    fn transfer(&mut self, data: &[u8]) -> Result<usize> {
        assert!(self.selected, "transfer outside of a session");
        if self.fail_transfer {
            return Err(Error::BusFault);
        }
        self.transfer_calls += 1;
        let room = match self.write_limit {
            Some(limit) => limit.saturating_sub(self.mosi.len()),
            None => data.len(),
        };
        let n = room.min(data.len());
        self.mosi.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        assert!(self.selected, "receive outside of a session");
        let room = match self.read_limit {
            Some(limit) => limit.saturating_sub(self.received),
            None => buf.len(),
        };
        let n = room.min(buf.len());
        for byte in buf[..n].iter_mut() {
            *byte = self.miso.get(self.miso_pos).copied().unwrap_or(0xFF);
            self.miso_pos += 1;
        }
        self.received += n;
        Ok(n)
    }
}
