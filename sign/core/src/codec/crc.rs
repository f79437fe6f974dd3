use crate::constants::CRC32_IEEE_POLY;

const IEEE_TABLE: [u32; 256] = build_table(CRC32_IEEE_POLY);

const fn build_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

fn update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = IEEE_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/**
    Standard CRC-32 (IEEE 802.3).
*/
pub fn crc32_ieee(data: &[u8]) -> u32 {
    !update(0xFFFF_FFFF, data)
}

/**
    Content-platform checksum: CRC-32 with the result masked by the
    polynomial constant. Computed over raw bytes, so callers pass the UTF-8
    encoding of text.
*/
pub fn mrc(data: &[u8]) -> u32 {
    crc32_ieee(data) ^ CRC32_IEEE_POLY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_reference_entries() {
        assert_eq!(IEEE_TABLE[1], 1996959894);
        assert_eq!(IEEE_TABLE[128], 3988292384);
        assert_eq!(IEEE_TABLE[255], 755167117);
    }

    #[test]
    fn crc32_check_value() {
        assert_eq!(crc32_ieee(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn mrc_reference_pairs() {
        assert_eq!(mrc(b""), 3988292384);
        assert_eq!(mrc(b"abc"), 3634152162);
        assert_eq!(mrc(b"1700000000000XYW_abcb1value"), 2331116146);
    }
}
