//! USB link-layer checksums.
//!
//! CRC5 protects token and SOF packets, CRC16 protects data packets. Both are
//! defined in chapter 8.3.5 of the USB 2.0 specification.

/// CRC16 polynomial x^16 + x^15 + x^2 + 1 (0x8005), reflected.
pub const CRC16_POLY_REFLECTED: u16 = 0xA001;

/// Value left in a CRC16 register after feeding a data field followed by its
/// own little-endian CRC (after the final inversion).
pub const CRC16_RESIDUE: u16 = 0x4FFE;

pub static CRC16_TABLE: [u16; 256] = crc16_table();

const fn crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC16_POLY_REFLECTED
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Expected CRC16 of a data field.
pub fn crc16(buffer: &[u8]) -> u16 {
    let crc = buffer.iter().fold(0xFFFFu16, |crc, &b| {
        (crc >> 8) ^ CRC16_TABLE[usize::from((crc ^ u16::from(b)) as u8)]
    });
    crc ^ 0xFFFF
}

/// Checks a data field that still carries its trailing CRC16 bytes.
pub fn crc16_residue_ok(packet: &[u8]) -> bool {
    crc16(packet) == CRC16_RESIDUE
}

/// Mirrors the bits of a byte.
pub fn swap8(b: u8) -> u8 {
    let b = (b & 0xF0) >> 4 | (b & 0x0F) << 4;
    let b = (b & 0xCC) >> 2 | (b & 0x33) << 2;
    (b & 0xAA) >> 1 | (b & 0x55) << 1
}

/// Mirrors the 5 low bits of `value`.
pub fn swap5(value: u8) -> u8 {
    ((value & 0x01) << 4)
        | ((value & 0x02) << 2)
        | (value & 0x04)
        | ((value & 0x08) >> 2)
        | ((value & 0x10) >> 4)
}

/// Expected CRC5 of an 11-bit token or SOF payload.
///
/// The payload must already be masked to 11 bits. The result is laid out the
/// way it sits on the wire next to the payload: for a token
/// `byte2 = (endpoint >> 1) | (crc5 << 3)`.
pub fn crc5(data: u16) -> u8 {
    let lsb = swap8(data as u8);
    let msb = swap8(((data >> 8) & 0x7) as u8);
    let mut a = (u32::from(lsb) << 8) | u32::from(msb);
    let mut crc: u32 = 0x1F << 11;

    for _ in 0..11 {
        let mut crc_n = (crc << 1) & 0xFFFF;
        if (a ^ crc) & (1 << 15) != 0 {
            crc_n ^= 0x05 << 11;
        }
        crc = crc_n;
        a = (a << 1) & 0xFFFF;
    }

    swap5(((crc >> 11) ^ 0x1F) as u8)
}

#[cfg(test)]
mod test {
    use super::*;

    /// LSB first shift register over whole wire bytes.
    fn crc5_serial(v: &[u8]) -> u8 {
        let mut acc = 0x1F;
        for b in v {
            let mut b = *b;
            for _ in 0..8 {
                let do_xor = (b & 1) != ((acc >> 4) & 1);
                acc <<= 1;
                if do_xor {
                    acc ^= 5
                }
                acc &= 0x1F;
                b >>= 1;
            }
        }
        acc
    }

    fn crc16_serial(v: &[u8]) -> u16 {
        let mut acc = 0xFFFF;
        for b in v {
            let mut b = *b;
            for _ in 0..8 {
                let do_xor = (b as u16 & 1) != (acc & 1);
                acc >>= 1;
                if do_xor {
                    acc ^= CRC16_POLY_REFLECTED
                }
                b >>= 1;
            }
        }
        acc ^ 0xFFFF
    }

    #[test]
    fn table_matches_reference() {
        #[rustfmt::skip]
        let head: [u16; 16] = [
            0x0000, 0xC0C1, 0xC181, 0x0140, 0xC301, 0x03C0, 0x0280, 0xC241,
            0xC601, 0x06C0, 0x0780, 0xC741, 0x0500, 0xC5C1, 0xC481, 0x0440,
        ];
        #[rustfmt::skip]
        let tail: [u16; 16] = [
            0x4400, 0x84C1, 0x8581, 0x4540, 0x8701, 0x47C0, 0x4680, 0x8641,
            0x8201, 0x42C0, 0x4380, 0x8341, 0x4100, 0x81C1, 0x8081, 0x4040,
        ];
        assert_eq!(&CRC16_TABLE[..16], &head[..]);
        assert_eq!(&CRC16_TABLE[240..], &tail[..]);
        assert_eq!(CRC16_TABLE[0x80], 0xA001);
    }

    #[test]
    fn crc16_empty() {
        assert_eq!(crc16(&[]), 0x0000);
    }

    #[test]
    fn crc16_check_value() {
        assert_eq!(crc16(b"123456789"), 0xB4C8);
        assert_eq!(crc16(&[0x00, 0x01, 0x02, 0x03]), 0x7AEF);
    }

    #[test]
    fn crc16_single_bytes() {
        for b in 0..=255u8 {
            assert_eq!(crc16(&[b]), crc16_serial(&[b]), "byte {:#04x}", b);
        }
        assert_eq!(crc16(&[0x00]), 0xBF40);
        assert_eq!(crc16(&[0xFF]), 0xFF00);
    }

    #[test]
    fn crc16_residue() {
        let mut packet = b"usb-log-convert".to_vec();
        let crc = crc16(&packet);
        packet.extend_from_slice(&crc.to_le_bytes());
        assert!(crc16_residue_ok(&packet));

        packet[3] ^= 0x10;
        assert!(!crc16_residue_ok(&packet));
    }

    #[test]
    fn swaps() {
        assert_eq!(swap8(0x01), 0x80);
        assert_eq!(swap8(0xA0), 0x05);
        assert_eq!(swap8(0x3C), 0x3C);
        assert_eq!(swap5(0x01), 0x10);
        assert_eq!(swap5(0x06), 0x0C);
        assert_eq!(swap5(0x1F), 0x1F);
        for v in 0..32u8 {
            assert_eq!(swap5(swap5(v)), v);
        }
    }

    #[test]
    fn crc5_vectors() {
        // SETUP addr 0 ep 0 is sent as 2D 00 10
        assert_eq!(crc5(0x000), 0x02);
        // addr 0x15 ep 0xE
        assert_eq!(crc5(0x715), 0x1D);
        // addr 0x3A ep 0xA
        assert_eq!(crc5(0x53A), 0x07);
        // SOF frame 0x710
        assert_eq!(crc5(0x710), 0x05);
    }

    #[test]
    fn crc5_matches_wire_residue() {
        for payload in 0..0x800u16 {
            let crc = crc5(payload);
            assert!(crc < 32);
            let lsb = payload as u8;
            let msb = (payload >> 8) as u8 | (crc << 3);
            assert_eq!(crc5_serial(&[lsb, msb]), 0x0C, "payload {:#05x}", payload);
        }
    }
}
