//! Driver for the NXP MPL3115A2 barometric pressure / altitude sensor.

pub mod register;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::SevenBitAddress;

use crate::bus::{Bus, I2c};
use crate::conversion::{round2, sign_extend};
use crate::device::{DeviceKind, Driver};
use crate::diagnostic::{Diagnostic, LogObserver, Observer};
use crate::error::{SensorError, SensorResult};
use crate::mpl3115a2::register::{
    CtrlReg1, CtrlReg1Fields, CtrlReg2, CtrlReg2Fields, DrStatus, DrStatusFlags, OutP, OutT,
    PtDataCfg, PtDataCfgFields,
};
use crate::register::Reg;

/// Fixed 7-bit address of the MPL3115A2.
pub const ADDRESS: SevenBitAddress = 0x60;

/// Time the device needs to come back after a software reset.
const RESET_DELAY_MS: u32 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementMode {
    Altimeter,
    Barometer,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Configuration {
    pub(crate) mode: MeasurementMode,
    pub(crate) oversampling: u8,
    pub(crate) altitude_offset: f64,
    pub(crate) pressure_offset: f64,
    pub(crate) temperature_offset: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mode: MeasurementMode::Barometer,
            oversampling: 1,
            altitude_offset: 0.0,
            pressure_offset: 0.0,
            temperature_offset: 0.0,
        }
    }
}

impl Configuration {
    pub fn mode(mut self, mode: MeasurementMode) -> Self {
        self.mode = mode;

        self
    }

    /// Oversample ratio as a power of two, 0..=7.
    pub fn oversampling(mut self, os: u8) -> Self {
        self.oversampling = os & 0b111;

        self
    }

    /// Added to every altitude, in meters.
    pub fn altitude_offset(mut self, offset: f64) -> Self {
        self.altitude_offset = offset;

        self
    }

    /// Added to every pressure, in hPa.
    pub fn pressure_offset(mut self, offset: f64) -> Self {
        self.pressure_offset = offset;

        self
    }

    /// Added to every temperature, in °C.
    pub fn temperature_offset(mut self, offset: f64) -> Self {
        self.temperature_offset = offset;

        self
    }
}

/// The OUT_P value, interpreted according to the measurement mode.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BarometricReading {
    /// m
    Altitude(f64),
    /// hPa
    Pressure(f64),
}

impl BarometricReading {
    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            BarometricReading::Altitude(m) => BarometricReading::Altitude(f(m)),
            BarometricReading::Pressure(hpa) => BarometricReading::Pressure(f(hpa)),
        }
    }

    pub fn rounded(self) -> Self {
        self.map(round2)
    }
}

#[cfg(feature = "uom")]
impl BarometricReading {
    pub fn altitude_uom(&self) -> Option<uom::si::f64::Length> {
        match self {
            BarometricReading::Altitude(m) => Some(uom::si::length::Length::new::<uom::si::length::meter>(*m)),
            BarometricReading::Pressure(_) => None,
        }
    }

    pub fn pressure_uom(&self) -> Option<uom::si::f64::Pressure> {
        match self {
            BarometricReading::Pressure(hpa) => Some(uom::si::pressure::Pressure::new::<uom::si::pressure::hectopascal>(*hpa)),
            BarometricReading::Altitude(_) => None,
        }
    }
}

/// Raw OUT_P and OUT_T blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawBarometric {
    pub pressure: [u8; 3],
    pub temperature: [u8; 2],
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BarometricMeasurement {
    pub reading: BarometricReading,
    /// °C
    pub temperature: f64,
}

/// Altitude in meters: 16-bit two's complement integer part, 4-bit fraction.
pub fn altitude(out_p: [u8; 3]) -> f64 {
    let integer = sign_extend((out_p[0] as u32) << 8 | out_p[1] as u32, 16);

    integer as f64 + (out_p[2] >> 4) as f64 * 0.0625
}

/// Pressure in hPa: 18-bit unsigned integer pascal, 2-bit quarter-pascal fraction.
pub fn pressure(out_p: [u8; 3]) -> f64 {
    let integer = (out_p[0] as u32) << 10 | (out_p[1] as u32) << 2 | (out_p[2] as u32 & 0xC0) >> 6;
    let fraction = (out_p[2] & 0x30) >> 4;

    (integer as f64 + fraction as f64 * 0.25) / 100.0
}

/// Temperature in °C: 8-bit two's complement integer part, 4-bit fraction.
pub fn temperature(out_t: [u8; 2]) -> f64 {
    sign_extend(out_t[0] as u32, 8) as f64 + (out_t[1] >> 4) as f64 * 0.0625
}

pub struct Mpl3115a2<B, O = LogObserver> {
    bus: B,
    observer: O,
    config: Configuration,
}

impl<T> Mpl3115a2<I2c<T>>
where
    T: embedded_hal::i2c::I2c,
{
    pub fn new_i2c<D: DelayNs>(i2c: T, config: Configuration, delay: &mut D) -> SensorResult<Self, T::Error> {
        Self::new(I2c::new(i2c, ADDRESS), config, delay)
    }
}

impl<B> Mpl3115a2<B>
where
    B: Bus,
{
    pub fn new<D: DelayNs>(bus: B, config: Configuration, delay: &mut D) -> SensorResult<Self, B::Error> {
        Self::new_with_observer(bus, config, LogObserver, delay)
    }
}

impl<B, O> Mpl3115a2<B, O>
where
    B: Bus,
    O: Observer,
{
    /// Resets the device, enables data-ready events and starts continuous measurements in the
    /// configured mode.
    pub fn new_with_observer<D: DelayNs>(
        bus: B,
        config: Configuration,
        observer: O,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        let mut device = Mpl3115a2 { bus, observer, config };

        device.reset(delay)?;

        device.bus.write::<PtDataCfg>(&PtDataCfgFields { drem: true, pdefe: false, tdefe: false })?;
        device.bus.write::<CtrlReg1>(&CtrlReg1Fields {
            alt: config.mode == MeasurementMode::Altimeter,
            os: config.oversampling,
            rst: false,
            ost: false,
            sbyb: true,
        })?;

        let ctrl1 = device.control1()?;
        let ctrl2 = device.control2()?;
        log::debug!("MPL3115A2 0x{:02X}: {:?}, {:?}", device.bus.address(), ctrl1, ctrl2);

        Ok(device)
    }

    /// Issues a software reset and waits for the device to come back.
    ///
    /// The device resets before it acknowledges the write, so a failed transfer here is expected.
    /// It is reported as [`Diagnostic::ResetNotAcknowledged`] rather than as an error.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<(), B::Error> {
        match self.bus.write::<CtrlReg1>(&CtrlReg1Fields::RESET) {
            Ok(()) => {}
            Err(SensorError::Bus(_)) => self.observer.notify(Diagnostic::ResetNotAcknowledged {
                device: DeviceKind::Mpl3115a2,
                address: self.bus.address(),
                register: CtrlReg1::ADDR,
            }),
            Err(e) => return Err(e),
        }

        delay.delay_ms(RESET_DELAY_MS);

        Ok(())
    }

    pub fn control1(&mut self) -> SensorResult<CtrlReg1Fields, B::Error> {
        self.bus.read::<CtrlReg1>()
    }

    pub fn control2(&mut self) -> SensorResult<CtrlReg2Fields, B::Error> {
        self.bus.read::<CtrlReg2>()
    }

    pub fn set_control2(&mut self, fields: &CtrlReg2Fields) -> SensorResult<(), B::Error> {
        self.bus.write::<CtrlReg2>(fields)
    }

    pub fn data_config(&mut self) -> SensorResult<PtDataCfgFields, B::Error> {
        self.bus.read::<PtDataCfg>()
    }

    pub fn data_status(&mut self) -> SensorResult<DrStatusFlags, B::Error> {
        self.bus.read::<DrStatus>()
    }

    fn convert_out_p(&self, out_p: [u8; 3]) -> BarometricReading {
        match self.config.mode {
            MeasurementMode::Altimeter => BarometricReading::Altitude(altitude(out_p) + self.config.altitude_offset),
            MeasurementMode::Barometer => BarometricReading::Pressure(pressure(out_p) + self.config.pressure_offset),
        }
    }

    /// Altitude or pressure depending on the configured mode, rounded to two decimals.
    pub fn read_pressure(&mut self) -> SensorResult<BarometricReading, B::Error> {
        let out_p = self.bus.read::<OutP>()?;
        let reading = self.convert_out_p(out_p).rounded();
        log::trace!("MPL3115A2 0x{:02X}: {:?}", self.bus.address(), reading);

        Ok(reading)
    }

    /// Temperature in °C, rounded to two decimals.
    pub fn read_temperature(&mut self) -> SensorResult<f64, B::Error> {
        let out_t = self.bus.read::<OutT>()?;

        Ok(round2(temperature(out_t) + self.config.temperature_offset))
    }

    pub fn release(self) -> (B, O) {
        (self.bus, self.observer)
    }
}

impl<B, O> Driver for Mpl3115a2<B, O>
where
    B: Bus,
    O: Observer,
{
    type Raw = RawBarometric;
    type Output = BarometricMeasurement;
    type Error = SensorError<B::Error>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Mpl3115a2
    }

    fn read_raw(&mut self) -> Result<RawBarometric, Self::Error> {
        Ok(RawBarometric {
            pressure: self.bus.read::<OutP>()?,
            temperature: self.bus.read::<OutT>()?,
        })
    }

    fn compensate(&self, raw: &RawBarometric) -> BarometricMeasurement {
        BarometricMeasurement {
            reading: self.convert_out_p(raw.pressure),
            temperature: temperature(raw.temperature) + self.config.temperature_offset,
        }
    }
}
