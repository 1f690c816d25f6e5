//! Address encoding

/// Number of address bytes sent after READ/WRITE
pub const ADDRESS_BYTES: usize = 3;

/// Bits of an address that fit in the 3-byte address field
///
/// The chip ignores the bits above its capacity, the host only drops what
/// does not fit on the wire.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Encode an address as 3 bytes, most significant byte first
pub const fn encode_address(address: u32) -> [u8; ADDRESS_BYTES] {
    [(address >> 16) as u8, (address >> 8) as u8, address as u8]
}

/// Address `offset` bytes past `base`, wrapped to the 3-byte address field
///
/// Used to step through a long access in chunks. The result is what the
/// chip would see, so stepping past 0xFFFFFF continues at 0.
pub const fn address_at(base: u32, offset: usize) -> u32 {
    base.wrapping_add(offset as u32) & ADDRESS_MASK
}

/// Decode a 3-byte big-endian address
pub const fn decode_address(bytes: [u8; ADDRESS_BYTES]) -> u32 {
    ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_msb_first() {
        assert_eq!(encode_address(0x001337), [0x00, 0x13, 0x37]);
        assert_eq!(encode_address(0x07FFFF), [0x07, 0xFF, 0xFF]);
    }

    #[test]
    fn test_address_at_wraps_without_overflow() {
        assert_eq!(address_at(0x1000, 0x800), 0x1800);
        assert_eq!(address_at(0xFFFF_F800, 0), 0xFF_F800);
        assert_eq!(address_at(0xFFFF_F800, 0x1000), 0x00_0800);
        assert_eq!(address_at(u32::MAX, usize::MAX), 0xFF_FFFE);
    }

    #[test]
    fn test_encode_drops_high_byte() {
        assert_eq!(encode_address(0xAB12_3456), [0x12, 0x34, 0x56]);
        assert_eq!(
            decode_address(encode_address(0xAB12_3456)),
            0xAB12_3456 & ADDRESS_MASK
        );
    }
}
