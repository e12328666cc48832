//! CRC-8 as used by Sensirion humidity sensors.
//!
//! Polynomial 0x31 (x^8 + x^5 + x^4 + 1), initial value 0xFF, MSB first, no reflection, no final
//! XOR. This is the catalog's CRC-8/NRSC-5.

const CRC8: crc::Crc<u8> = crc::Crc::<u8>::new(&crc::CRC_8_NRSC_5);

/// Computes the checksum of `data`.
pub fn crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

/// Outcome of comparing a computed checksum against the one received from the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Checksum {
    Valid,
    Mismatch { expected: u8, received: u8 },
}

impl Checksum {
    pub fn is_valid(&self) -> bool {
        matches!(self, Checksum::Valid)
    }
}

/// Checks a payload against the checksum byte that followed it on the wire.
pub fn verify(data: &[u8], received: u8) -> Checksum {
    let expected = crc8(data);
    if expected == received {
        Checksum::Valid
    } else {
        Checksum::Mismatch { expected, received }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensirion_vectors() {
        assert_eq!(0x81, crc8(&[0x00, 0x00]));
        assert_eq!(0x92, crc8(&[0xBE, 0xEF]));
        assert_eq!(0x93, crc8(&[0x66, 0x66]));
        assert_eq!(0xA2, crc8(&[0x80, 0x00]));
    }

    #[test]
    fn catalog_check_value() {
        assert_eq!(0xF7, crc8(b"123456789"));
    }

    #[test]
    fn empty_payload_is_initial_value() {
        assert_eq!(0xFF, crc8(&[]));
    }

    #[test]
    fn verify_reports_both_values() {
        assert_eq!(Checksum::Valid, verify(&[0xBE, 0xEF], 0x92));
        assert_eq!(
            Checksum::Mismatch { expected: 0x92, received: 0x91 },
            verify(&[0xBE, 0xEF], 0x91)
        );
        assert!(!verify(&[0x00, 0x00], 0x00).is_valid());
    }
}
