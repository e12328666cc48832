//! Register access over a byte-addressed bus.
//!
//! The drivers never talk to a HAL directly. They go through [`Bus`], which exposes the four
//! transfer shapes the supported chips use and derives typed register access from them.
//! [`I2c`] implements it for any blocking `embedded-hal` 1.0 I2C peripheral.
//!
//! All transactions on one physical bus must be serialized by the caller. A multi-byte burst read
//! (e.g. the BME280 8-byte data block) must not be interleaved with another device's transfer;
//! wrap a shared peripheral in a mutex-style device (such as the ones in `embedded-hal-bus`)
//! before handing it to several drivers.

use embedded_hal::i2c::SevenBitAddress;

use crate::error::{SensorError, SensorResult};
use crate::register::{Readable, Writable};

/// Largest register block any driver transfers in one go.
pub const MAX_REG_BYTES: usize = 32;

pub trait Bus {
    type Error;

    /// The 7-bit address of the device this bus handle talks to.
    fn address(&self) -> u8;

    /// Writes `data` to consecutive registers starting at `reg`.
    fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Writes the register address, then reads `data.len()` bytes in the same transaction.
    fn read_register(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes raw bytes with no register address prefix.
    ///
    /// Used for 16-bit command protocols and PMBus "send byte" commands.
    fn write_command(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads raw bytes without addressing a register first.
    fn read_bytes(&mut self, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Reads and decodes the register (or register block) described by the marker `R`.
    fn read<R: Readable>(&mut self) -> SensorResult<R::Out, Self::Error> {
        let mut buf = [0u8; MAX_REG_BYTES];
        let data = &mut buf[..R::N];
        self.read_register(R::ADDR, data).map_err(SensorError::Bus)?;

        Ok(R::decode(data)?)
    }

    /// Encodes `v` and writes it to the register described by the marker `W`.
    fn write<W: Writable>(&mut self, v: &W::In) -> SensorResult<(), Self::Error> {
        let mut buf = [0u8; MAX_REG_BYTES];
        let data = &mut buf[..W::N];
        W::encode(v, data);

        self.write_register(W::ADDR, data).map_err(SensorError::Bus)
    }

    fn read_byte(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_register(reg, &mut buf)?;

        Ok(buf[0])
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        self.write_register(reg, &[value])
    }

    /// Reads an SMBus word (low byte first).
    fn read_word(&mut self, reg: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.read_register(reg, &mut buf)?;

        Ok(u16::from_le_bytes(buf))
    }

    /// Writes an SMBus word (low byte first).
    fn write_word(&mut self, reg: u8, value: u16) -> Result<(), Self::Error> {
        self.write_register(reg, &value.to_le_bytes())
    }
}

/// A device at a fixed 7-bit address on an `embedded-hal` I2C bus.
pub struct I2c<I2cType> {
    i2c: I2cType,
    address: SevenBitAddress,
}

impl<I2cType> I2c<I2cType>
where
    I2cType: embedded_hal::i2c::I2c,
{
    pub fn new(i2c: I2cType, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// Gives the underlying peripheral back.
    pub fn release(self) -> I2cType {
        self.i2c
    }
}

impl<I2cType> Bus for I2c<I2cType>
where
    I2cType: embedded_hal::i2c::I2c,
{
    type Error = <I2cType as embedded_hal::i2c::ErrorType>::Error;

    fn address(&self) -> u8 {
        self.address
    }

    fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        let mut buf = [0u8; MAX_REG_BYTES + 1];
        buf[0] = reg;
        buf[1..=data.len()].copy_from_slice(data);

        self.i2c.write(self.address, &buf[..=data.len()])
    }

    fn read_register(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[reg], data)
    }

    fn write_command(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, bytes)
    }

    fn read_bytes(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(self.address, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;

    #[test]
    fn words_are_little_endian() {
        let mut bus = FakeBus::new();
        bus.with_register(0xD4, &[0x34, 0x12]);

        assert_eq!(0x1234, bus.read_word(0xD4).unwrap());

        bus.write_word(0xD0, 0x4527).unwrap();
        assert_eq!(Some(&[0x27, 0x45][..]), bus.last_write_to(0xD0));
    }

    #[test]
    fn bus_errors_are_wrapped() {
        let mut bus = FakeBus::new();
        bus.fail_next_write_to(0xF2);

        struct CtrlHum;
        impl crate::register::Reg for CtrlHum { const ADDR: u8 = 0xF2; }
        impl Writable for CtrlHum {
            type In = u8;
            fn encode(v: &Self::In, out: &mut [u8]) { out[0] = *v; }
        }

        assert!(matches!(bus.write::<CtrlHum>(&5), Err(SensorError::Bus(()))));
        assert!(bus.write::<CtrlHum>(&5).is_ok());
    }
}
