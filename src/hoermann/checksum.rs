//! # Checksum Engine
//!
//! The two integrity algorithms used on Hoermann links.
//!
//! - **Seeded sum**: modulo-256 sum seeded with the sync byte (0x55). Used by
//!   the direct link and the gateway link.
//! - **CRC8**: polynomial 0x07, initial value 0xF3, table driven. Used on the
//!   UAP1 bus. Validation is self-checking: the CRC over a frame *including*
//!   its check byte is 0x00 exactly when the frame is intact.
//!
//! All functions are pure. Accumulators are passed in and returned so the
//! same code serves the byte path and the tick path.

use super::protocol::{CRC8_INITIAL_VALUE, SUM_SEED};

/// CRC-8 polynomial (x^8 + x^2 + x + 1)
const CRC8_POLY: u8 = 0x07;

/// Precomputed CRC8 lookup table
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Feed `data` into a running CRC8 accumulator
pub fn crc8_update(mut crc: u8, data: &[u8]) -> u8 {
    for &byte in data {
        crc = CRC8_TABLE[(byte ^ crc) as usize];
    }
    crc
}

/// CRC8 of `data` starting from the bus initial value
///
/// # Examples
///
/// ```
/// use hoermann_bridge::hoermann::checksum::crc8;
///
/// let mut frame = vec![0x80, 0x02, 0x14, 0x28];
/// frame.push(crc8(&frame));
/// assert_eq!(crc8(&frame), 0x00);
/// ```
pub fn crc8(data: &[u8]) -> u8 {
    crc8_update(CRC8_INITIAL_VALUE, data)
}

/// Feed `data` into a running modulo-256 sum
pub fn sum_update(acc: u8, data: &[u8]) -> u8 {
    data.iter().fold(acc, |acc, &byte| acc.wrapping_add(byte))
}

/// Additive checksum of `data` seeded with the sync byte
///
/// The seed stands in for the sync byte, which is never part of the buffer.
pub fn seeded_sum(data: &[u8]) -> u8 {
    sum_update(SUM_SEED, data)
}

/// Integrity discipline of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    /// Modulo-256 sum starting at the given seed, compared to the last byte
    SeededSum(u8),
    /// Self-checking CRC8 over the whole frame
    Crc8,
}

impl Integrity {
    /// Compute the check byte to append after `data`
    pub fn seal(&self, data: &[u8]) -> u8 {
        match self {
            Integrity::SeededSum(seed) => sum_update(*seed, data),
            Integrity::Crc8 => crc8(data),
        }
    }

    /// Validate a complete frame whose last byte is the check byte
    pub fn verify(&self, frame: &[u8]) -> bool {
        match self {
            Integrity::SeededSum(seed) => match frame.split_last() {
                Some((&check, body)) => sum_update(*seed, body) == check,
                None => false,
            },
            Integrity::Crc8 => !frame.is_empty() && crc8(frame) == 0x00,
        }
    }
}

/// Bitwise CRC8, used to cross-check the lookup table
#[cfg(test)]
fn crc8_slow(data: &[u8]) -> u8 {
    let mut crc = CRC8_INITIAL_VALUE;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc8_table_matches_reference_entries() {
        assert_eq!(CRC8_TABLE[0x00], 0x00);
        assert_eq!(CRC8_TABLE[0x01], 0x07);
        assert_eq!(CRC8_TABLE[0x10], 0x70);
        assert_eq!(CRC8_TABLE[0x80], 0x89);
        assert_eq!(CRC8_TABLE[0xFF], 0xF3);
    }

    #[test]
    fn test_crc8_empty_is_initial_value() {
        assert_eq!(crc8(&[]), CRC8_INITIAL_VALUE);
    }

    #[test]
    fn test_crc8_lookup_table_matches_slow() {
        let test_data = [
            vec![0x28, 0x31, 0x01],
            vec![0x80, 0x03, 0x29, 0x01, 0x10],
            vec![0x00, 0x92, 0x03, 0x10],
            vec![0x00; 17],
            vec![0xFF; 10],
        ];

        for data in test_data.iter() {
            assert_eq!(crc8(data), crc8_slow(data), "CRC mismatch for data: {:02X?}", data);
        }
    }

    #[test]
    fn test_crc8_known_bus_frames() {
        // Scan request to the UAP1, counter 3
        assert_eq!(crc8(&[0x28, 0x31, 0x01]), 0x28);
        // Scan response to the master, counter 4
        assert_eq!(crc8(&[0x80, 0x42, 0x14, 0x28]), 0x83);
        // Status broadcast 0x1003
        assert_eq!(crc8(&[0x00, 0x92, 0x03, 0x10]), 0x09);
    }

    #[test]
    fn test_crc8_self_check_is_zero() {
        let mut frame = vec![0x80, 0x03, 0x29, 0x01, 0x10];
        frame.push(crc8(&frame));
        assert_eq!(frame[5], 0x1E);
        assert_eq!(crc8(&frame), 0x00);
    }

    #[test]
    fn test_crc8_detects_every_single_bit_error() {
        let mut frame = vec![0x80, 0x63, 0x29, 0x00, 0x10];
        frame.push(crc8(&frame));

        for index in 0..frame.len() {
            for bit in 0..8 {
                let mut corrupted = frame.clone();
                corrupted[index] ^= 1 << bit;
                assert_ne!(crc8(&corrupted), 0x00, "flip of bit {} in byte {} went unnoticed", bit, index);
            }
        }
    }

    #[test]
    fn test_seeded_sum_known_frames() {
        // Action frame body: command 0x01, length 0x01, action open
        assert_eq!(seeded_sum(&[0x01, 0x01, 0x01]), 0x58);
        // Status frame body: command 0x00, length 0x02, 0x1234 little-endian
        assert_eq!(seeded_sum(&[0x00, 0x02, 0x34, 0x12]), 0x9D);
    }

    #[test]
    fn test_seeded_sum_equals_sum_including_sync_byte() {
        let body = [0x00, 0x02, 0x10, 0x03];
        let mut with_sync = vec![0x55];
        with_sync.extend_from_slice(&body);
        assert_eq!(seeded_sum(&body), sum_update(0, &with_sync));
    }

    #[test]
    fn test_seeded_sum_wraps() {
        assert_eq!(seeded_sum(&[0xFF, 0xFF]), 0x53);
    }

    #[test]
    fn test_integrity_seal_and_verify() {
        for integrity in [Integrity::SeededSum(SUM_SEED), Integrity::Crc8] {
            let mut frame = vec![0x01, 0x01, 0x04];
            frame.push(integrity.seal(&frame));
            assert!(integrity.verify(&frame), "{:?} rejected its own frame", integrity);

            frame[2] ^= 0x01;
            assert!(!integrity.verify(&frame), "{:?} accepted a corrupted frame", integrity);
        }
    }

    #[test]
    fn test_integrity_verify_empty_frame() {
        assert!(!Integrity::SeededSum(SUM_SEED).verify(&[]));
        assert!(!Integrity::Crc8.verify(&[]));
    }
}
