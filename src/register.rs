//! Typed register markers shared by every driver.
//!
//! Each device module declares one marker type per register (or fixed-length register block).
//! The marker carries the address and transfer length, and knows how to decode the bytes read
//! from the device into a value and/or encode a value into the bytes written to it.

/// Returned by [`Readable::decode`] when a register holds a bit pattern the driver cannot map
/// to a value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidRegisterField {
    pub register: u8,
    pub value: u8,
    pub bit_offset: u8,
}

impl InvalidRegisterField {
    pub fn new(register: u8, value: u8, bit_offset: u8) -> Self {
        Self { register, value, bit_offset }
    }
}

pub trait Reg { const ADDR: u8; }

pub trait Readable: Reg {
    type Out;
    const N: usize = 1;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField>;
}

pub trait Writable: Reg {
    type In;
    const N: usize = 1;
    fn encode(v: &Self::In, out: &mut [u8]);
}
