//! Status command implementation

use sram23_core::device::Sram;
use sram23_core::transport::SpiTransport;

/// Read the status register and print its fields
pub fn run_status<T: SpiTransport>(sram: &mut Sram<T>) -> Result<(), Box<dyn std::error::Error>> {
    let status = sram.status()?;

    println!("--- Memory Status ---");
    println!("{}", status.decode());

    let reserved = status.reserved();
    if reserved != 0 {
        log::warn!("Reserved status bits set: {:#06x}", reserved);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram23_dummy::DummySram;

    #[test]
    fn test_status_reads_register() {
        let mut sram = Sram::new(DummySram::new_default());
        run_status(&mut sram).unwrap();
        let bus = sram.release();
        assert_eq!(bus.last_transaction(), Some(&[0x05][..]));
    }
}
