//! Driver for the Microchip MCP9808 digital temperature sensor.
//!
//! The sensor converts continuously. The ambient temperature register holds a 13-bit two's
//! complement value whose LSB size depends on the configured resolution.

use embedded_hal::i2c::SevenBitAddress;

use crate::bus::{Bus, I2c};
use crate::conversion::{round2, sign_extend};
use crate::device::{DeviceKind, Driver};
use crate::error::{SensorError, SensorResult};
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker struct for CONFIG (0x01)
///
/// Written as zero: continuous conversion, no hysteresis, alert output disabled.
pub struct Config;
impl Reg for Config { const ADDR: u8 = 0x01; }

impl Writable for Config {
    type In = u16;
    const N: usize = 2;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out.copy_from_slice(&v.to_be_bytes());
    }
}

/// Marker struct for T_A (0x05), the ambient temperature register
pub struct AmbientTemperature;
impl Reg for AmbientTemperature { const ADDR: u8 = 0x05; }

impl Readable for AmbientTemperature {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Marker struct for the manufacturer ID register (0x06)
pub struct ManufacturerId;
impl Reg for ManufacturerId { const ADDR: u8 = 0x06; }

impl Readable for ManufacturerId {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Marker struct for the device ID register (0x07). Only the ID byte is read, not the revision.
pub struct DeviceId;
impl Reg for DeviceId { const ADDR: u8 = 0x07; }

impl Readable for DeviceId {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(b[0])
    }
}

/// Marker struct for the resolution register (0x08)
pub struct ResolutionReg;
impl Reg for ResolutionReg { const ADDR: u8 = 0x08; }

impl Readable for ResolutionReg {
    type Out = Resolution;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(Resolution::from(b[0]))
    }
}

impl Writable for ResolutionReg {
    type In = Resolution;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = u8::from(*v);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 0.5 °C
    Half,
    /// 0.25 °C
    Quarter,
    /// 0.125 °C
    Eighth,
    /// 0.0625 °C, the power-on default
    Sixteenth,
}

impl Resolution {
    /// Degrees Celsius per LSB.
    pub fn lsb(&self) -> f64 {
        match self {
            Resolution::Half => 0.5,
            Resolution::Quarter => 0.25,
            Resolution::Eighth => 0.125,
            Resolution::Sixteenth => 0.0625,
        }
    }
}

/// Codes above 3 are treated as the finest resolution.
impl From<u8> for Resolution {
    fn from(code: u8) -> Self {
        match code {
            0 => Resolution::Half,
            1 => Resolution::Quarter,
            2 => Resolution::Eighth,
            _ => Resolution::Sixteenth,
        }
    }
}

impl From<Resolution> for u8 {
    fn from(value: Resolution) -> Self {
        match value {
            Resolution::Half => 0,
            Resolution::Quarter => 1,
            Resolution::Eighth => 2,
            Resolution::Sixteenth => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Configuration {
    pub(crate) resolution: Resolution,
    pub(crate) temperature_offset: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            resolution: Resolution::Sixteenth,
            temperature_offset: 0.0,
        }
    }
}

impl Configuration {
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;

        self
    }

    /// Added to every converted temperature, in °C.
    pub fn temperature_offset(mut self, offset: f64) -> Self {
        self.temperature_offset = offset;

        self
    }
}

/// Converts a raw T_A word to °C. Flag bits 15:13 are ignored.
pub fn convert(raw: u16, resolution: Resolution) -> f64 {
    sign_extend(raw as u32 & 0x1FFF, 13) as f64 * resolution.lsb()
}

pub struct Mcp9808<B> {
    bus: B,
    config: Configuration,
}

impl<T> Mcp9808<I2c<T>>
where
    T: embedded_hal::i2c::I2c,
{
    pub fn new_i2c(i2c: T, address: SevenBitAddress, config: Configuration) -> SensorResult<Self, T::Error> {
        Self::new(I2c::new(i2c, address), config)
    }
}

impl<B> Mcp9808<B>
where
    B: Bus,
{
    /// Clears CONFIG, programs the resolution and reads the identity registers.
    pub fn new(mut bus: B, config: Configuration) -> SensorResult<Self, B::Error> {
        bus.write::<Config>(&0x0000)?;
        bus.write::<ResolutionReg>(&config.resolution)?;

        let device_id = bus.read::<DeviceId>()?;
        let manufacturer_id = bus.read::<ManufacturerId>()?;
        log::debug!(
            "MCP9808 0x{:02X}: manufacturer id 0x{:04X}, device id 0x{:02X}, {:?}",
            bus.address(), manufacturer_id, device_id, config.resolution
        );

        Ok(Self { bus, config })
    }

    pub fn read_raw(&mut self) -> SensorResult<u16, B::Error> {
        self.bus.read::<AmbientTemperature>()
    }

    /// Temperature in °C including the configured offset. Not rounded.
    pub fn compensate(&self, raw: u16) -> f64 {
        convert(raw, self.config.resolution) + self.config.temperature_offset
    }

    /// Temperature in °C, rounded to two decimals.
    pub fn read_temperature(&mut self) -> SensorResult<f64, B::Error> {
        let raw = self.read_raw()?;

        Ok(round2(self.compensate(raw)))
    }

    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: Bus> Driver for Mcp9808<B> {
    type Raw = u16;
    type Output = f64;
    type Error = SensorError<B::Error>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Mcp9808
    }

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        Mcp9808::read_raw(self)
    }

    fn compensate(&self, raw: &u16) -> f64 {
        Mcp9808::compensate(self, *raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;

    fn connected_bus() -> FakeBus {
        let mut bus = FakeBus::new();
        bus.with_register(DeviceId::ADDR, &[0x04]);
        bus.with_register(ManufacturerId::ADDR, &[0x00, 0x54]);
        bus
    }

    #[test]
    fn sign_boundary() {
        assert_eq!(-256.0, convert(0x1000, Resolution::Sixteenth));
        assert_eq!(255.9375, convert(0x0FFF, Resolution::Sixteenth));
    }

    #[test]
    fn flag_bits_are_ignored() {
        assert_eq!(25.0, convert(0xE190, Resolution::Sixteenth));
    }

    #[test]
    fn resolution_scales_lsb() {
        assert_eq!(200.0, convert(0x0190, Resolution::Half));
        assert_eq!(100.0, convert(0x0190, Resolution::Quarter));
        assert_eq!(50.0, convert(0x0190, Resolution::Eighth));
        assert_eq!(Resolution::Sixteenth, Resolution::from(7));
    }

    #[test]
    fn mcp9808_init_writes_config_and_resolution() {
        let device = Mcp9808::new(connected_bus(), Configuration::default().resolution(Resolution::Quarter)).unwrap();

        let bus = device.release();
        assert_eq!(Some(&[0x00, 0x00][..]), bus.last_write_to(0x01));
        assert_eq!(Some(&[0x01][..]), bus.last_write_to(0x08));
    }

    #[test]
    fn mcp9808_read_temperature() {
        let mut bus = connected_bus();
        bus.with_register(AmbientTemperature::ADDR, &[0x0F, 0xFF]);
        let mut device = Mcp9808::new(bus, Configuration::default()).unwrap();

        assert_eq!(255.94, device.read_temperature().unwrap());
    }

    #[test]
    fn mcp9808_offset_is_added_before_rounding() {
        let mut bus = connected_bus();
        bus.with_register(AmbientTemperature::ADDR, &[0x10, 0x00]);
        let mut device = Mcp9808::new(bus, Configuration::default().temperature_offset(1.5)).unwrap();

        assert_eq!(-254.5, device.read_temperature().unwrap());
    }
}
