use crate::error::{Error, Result};

/// Length of the temperature/pressure block at 0x88 - 0xA1.
pub const BLOCK_A_LEN: usize = 26;
/// Length of the humidity block at 0xE1 - 0xE7.
pub const BLOCK_B_LEN: usize = 7;

/// Factory trimming parameters of one BME280, decoded once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationSet {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,

    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,

    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    /// 12 bits, see [`CalibrationSet::decode`].
    pub h4: u16,
    /// 12 bits, see [`CalibrationSet::decode`].
    pub h5: u16,
    pub h6: i8,
}

fn le_u16(block: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([block[at], block[at + 1]])
}

fn le_i16(block: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([block[at], block[at + 1]])
}

impl CalibrationSet {
    /// Decodes the two raw calibration blocks.
    ///
    /// `block_a` is the 26 bytes starting at register 0x88 (`dig_T*`,
    /// `dig_P*`, one reserved byte at 0xA0, `dig_H1` at 0xA1). `block_b` is
    /// the 7 bytes starting at 0xE1.
    ///
    /// 0xE5 is shared: its low nibble is the bottom of `h4` and its high
    /// nibble the bottom of `h5`.
    ///
    /// Fails with [`Error::MalformedCalibration`] when either block has the
    /// wrong length; nothing is decoded in that case.
    pub fn decode(block_a: &[u8], block_b: &[u8]) -> Result<Self> {
        if block_a.len() != BLOCK_A_LEN {
            return Err(Error::MalformedCalibration {
                block: "0x88..0xA1",
                expected: BLOCK_A_LEN,
                actual: block_a.len(),
            });
        }
        if block_b.len() != BLOCK_B_LEN {
            return Err(Error::MalformedCalibration {
                block: "0xE1..0xE7",
                expected: BLOCK_B_LEN,
                actual: block_b.len(),
            });
        }

        Ok(CalibrationSet {
            t1: le_u16(block_a, 0),
            t2: le_i16(block_a, 2),
            t3: le_i16(block_a, 4),

            p1: le_u16(block_a, 6),
            p2: le_i16(block_a, 8),
            p3: le_i16(block_a, 10),
            p4: le_i16(block_a, 12),
            p5: le_i16(block_a, 14),
            p6: le_i16(block_a, 16),
            p7: le_i16(block_a, 18),
            p8: le_i16(block_a, 20),
            p9: le_i16(block_a, 22),

            // 0xA0 (block_a[24]) is reserved
            h1: block_a[25],
            h2: le_i16(block_b, 0),
            h3: block_b[2],
            h4: (u16::from(block_b[3]) << 4) | (u16::from(block_b[4]) & 0x0F),
            h5: (u16::from(block_b[5]) << 4) | ((u16::from(block_b[4]) >> 4) & 0x0F),
            h6: block_b[6] as i8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_signed_and_unsigned_words() {
        let mut a = [0u8; BLOCK_A_LEN];
        a[0..2].copy_from_slice(&0xFFFEu16.to_le_bytes());
        a[2..4].copy_from_slice(&(-2i16).to_le_bytes());
        a[6..8].copy_from_slice(&40000u16.to_le_bytes());
        a[22..24].copy_from_slice(&i16::MIN.to_le_bytes());
        a[24] = 0xAA;
        a[25] = 0xC8;

        let cal = CalibrationSet::decode(&a, &[0u8; BLOCK_B_LEN]).unwrap();
        assert_eq!(cal.t1, 0xFFFE);
        assert_eq!(cal.t2, -2);
        assert_eq!(cal.p1, 40000);
        assert_eq!(cal.p9, i16::MIN);
        assert_eq!(cal.h1, 200);
    }

    #[test]
    fn shared_nibble_splits_between_h4_and_h5() {
        let b = [0x6A, 0x01, 0x00, 0x13, 0x52, 0x03, 0xE2];
        let cal = CalibrationSet::decode(&[0u8; BLOCK_A_LEN], &b).unwrap();

        assert_eq!(cal.h2, 362);
        assert_eq!(cal.h3, 0);
        assert_eq!(cal.h4, (0x13 << 4) | 0x2);
        assert_eq!(cal.h5, (0x03 << 4) | 0x5);
        assert_eq!(cal.h6, -30);
    }

    #[test]
    fn h4_h5_are_twelve_bit_unsigned() {
        let b = [0, 0, 0, 0xFF, 0xFF, 0xFF, 0];
        let cal = CalibrationSet::decode(&[0u8; BLOCK_A_LEN], &b).unwrap();
        assert_eq!(cal.h4, 0x0FFF);
        assert_eq!(cal.h5, 0x0FFF);
    }

    #[test]
    fn rejects_short_block_a() {
        match CalibrationSet::decode(&[0u8; 24], &[0u8; BLOCK_B_LEN]) {
            Err(Error::MalformedCalibration {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 26);
                assert_eq!(actual, 24);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_long_block_b() {
        match CalibrationSet::decode(&[0u8; BLOCK_A_LEN], &[0u8; 8]) {
            Err(Error::MalformedCalibration {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 7);
                assert_eq!(actual, 8);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
