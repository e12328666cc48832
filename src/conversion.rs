//! Bit-level helpers shared by the calibration parsers and output conversions.
//!
//! Signed fields are always rebuilt from their unsigned encoding with [`sign_extend`]; bytes are
//! never reinterpreted as a signed type directly. This keeps 12-bit and 13-bit fields, which have
//! no native Rust type, on exactly the same code path as 8-bit and 16-bit ones.

/// Reconstructs a two's complement value from the low `bits` bits of `raw`.
///
/// If bit `bits - 1` is set the result is `raw - 2^bits`, otherwise `raw` unchanged.
/// Bits above `bits` are ignored.
pub const fn sign_extend(raw: u32, bits: u32) -> i32 {
    let mask = (1u32 << bits) - 1;
    let value = (raw & mask) as i32;

    if raw & (1 << (bits - 1)) != 0 {
        value - (1i32 << bits)
    } else {
        value
    }
}

/// `low | high << 8`
pub const fn le_u16(low: u8, high: u8) -> u16 {
    (low as u16) | ((high as u16) << 8)
}

/// Rounds to two decimal digits, half away from zero.
///
/// Only for presentation. Every intermediate computation keeps full precision.
pub fn round2(value: f64) -> f64 {
    libm::round(value * 100.0) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_bit_fields() {
        assert_eq!(0x7FFF, sign_extend(0x7FFF, 16));
        assert_eq!(-32768, sign_extend(0x8000, 16));
        assert_eq!(-1000, sign_extend(0xFC18, 16));
        assert_eq!(-1, sign_extend(0xFFFF, 16));
        assert_eq!(26435, sign_extend(26435, 16));
    }

    #[test]
    fn twelve_bit_fields() {
        assert_eq!(2047, sign_extend(0x7FF, 12));
        assert_eq!(-2048, sign_extend(0x800, 12));
        assert_eq!(-1, sign_extend(0xFFF, 12));
        assert_eq!(313, sign_extend(313, 12));
    }

    #[test]
    fn eight_bit_fields() {
        assert_eq!(127, sign_extend(0x7F, 8));
        assert_eq!(-128, sign_extend(0x80, 8));
        assert_eq!(-2, sign_extend(0xFE, 8));
    }

    #[test]
    fn thirteen_bit_boundary() {
        assert_eq!(4095, sign_extend(4095, 13));
        assert_eq!(-4096, sign_extend(4096, 13));
    }

    #[test]
    fn high_bits_are_ignored() {
        assert_eq!(-1, sign_extend(0xF_FFFF, 12));
        assert_eq!(1, sign_extend(0x1_0001, 16));
    }

    #[test]
    fn low_byte_first() {
        assert_eq!(0x6B70, le_u16(0x70, 0x6B));
    }

    #[test]
    fn rounding() {
        assert_eq!(25.08, round2(25.08247793081682));
        assert_eq!(1006.53, round2(1006.5326677582515));
        assert_eq!(-256.0, round2(-256.0));
        assert_eq!(255.94, round2(255.9375));
        assert_eq!(-0.13, round2(-0.125));
    }
}
