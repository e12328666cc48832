//! DS18B20 1-Wire thermometer.
//!
//! The 1-Wire transport (typically the Linux `w1` kernel driver) is not implemented here. The
//! driver wraps any [`OneWireThermometer`] and maps its failures onto the crate's error kinds so
//! callers can tell a missing sensor from one that is still converting or has reset.

use crate::conversion::round2;
use crate::device::{DeviceKind, Driver};
use crate::error::{SensorError, SensorResult};

/// What went wrong in the 1-Wire layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneWireErrorKind {
    /// No sensor with the requested id is on the bus.
    NoSensorFound,
    /// The 1-Wire kernel modules could not be loaded.
    KernelModuleLoad,
    /// The sensor has not finished its conversion.
    NotReady,
    /// The sensor returned its power-on reset value (85 °C).
    ResetValue,
    Other,
}

pub trait OneWireError: core::fmt::Debug {
    fn kind(&self) -> OneWireErrorKind;
}

/// A single thermometer reached through a 1-Wire library.
pub trait OneWireThermometer {
    type Error: OneWireError;

    /// Sets the conversion resolution, 9 to 12 bits.
    fn set_resolution(&mut self, bits: u8) -> Result<(), Self::Error>;

    /// Temperature in °C.
    fn temperature(&mut self) -> Result<f64, Self::Error>;
}

fn map_error<E: OneWireError>(error: E) -> SensorError<E> {
    match error.kind() {
        OneWireErrorKind::NoSensorFound | OneWireErrorKind::KernelModuleLoad => SensorError::NotConnected,
        OneWireErrorKind::NotReady => SensorError::NotReady,
        OneWireErrorKind::ResetValue => SensorError::DeviceReset,
        OneWireErrorKind::Other => SensorError::Bus(error),
    }
}

pub struct Ds18b20<S> {
    sensor: S,
    temperature_offset: f64,
}

impl<S: OneWireThermometer> Ds18b20<S> {
    /// 9 bits, 0.5 °C per LSB.
    pub const DEFAULT_RESOLUTION: u8 = 9;

    /// Programs the resolution. A missing sensor or unloadable kernel module is
    /// [`SensorError::NotConnected`].
    pub fn new(mut sensor: S, resolution: u8, temperature_offset: f64) -> SensorResult<Self, S::Error> {
        if let Err(e) = sensor.set_resolution(resolution) {
            log::debug!("DS18B20: setting {} bit resolution failed: {:?}", resolution, e);
            return Err(map_error(e));
        }

        Ok(Self { sensor, temperature_offset })
    }

    /// Temperature in °C including the offset, rounded to two decimals.
    pub fn read_temperature(&mut self) -> SensorResult<f64, S::Error> {
        let raw = self.read_raw()?;

        Ok(round2(self.compensate(raw)))
    }

    pub fn read_raw(&mut self) -> SensorResult<f64, S::Error> {
        self.sensor.temperature().map_err(map_error)
    }

    pub fn compensate(&self, raw: f64) -> f64 {
        raw + self.temperature_offset
    }

    pub fn release(self) -> S {
        self.sensor
    }
}

impl<S: OneWireThermometer> Driver for Ds18b20<S> {
    type Raw = f64;
    type Output = f64;
    type Error = SensorError<S::Error>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Ds18b20
    }

    fn read_raw(&mut self) -> Result<f64, Self::Error> {
        Ds18b20::read_raw(self)
    }

    fn compensate(&self, raw: &f64) -> f64 {
        Ds18b20::compensate(self, *raw)
    }
}

#[cfg(test)]
mod tests {
    use heapless::Deque;
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FakeError(OneWireErrorKind);

    impl OneWireError for FakeError {
        fn kind(&self) -> OneWireErrorKind {
            self.0
        }
    }

    struct FakeSensor {
        resolution: Option<u8>,
        fail_resolution: Option<OneWireErrorKind>,
        readings: Deque<Result<f64, OneWireErrorKind>, 4>,
    }

    impl FakeSensor {
        fn new() -> Self {
            FakeSensor { resolution: None, fail_resolution: None, readings: Deque::new() }
        }

        fn with_reading(mut self, reading: Result<f64, OneWireErrorKind>) -> Self {
            self.readings.push_back(reading).unwrap();
            self
        }
    }

    impl OneWireThermometer for FakeSensor {
        type Error = FakeError;

        fn set_resolution(&mut self, bits: u8) -> Result<(), FakeError> {
            match self.fail_resolution {
                Some(kind) => Err(FakeError(kind)),
                None => {
                    self.resolution = Some(bits);
                    Ok(())
                }
            }
        }

        fn temperature(&mut self) -> Result<f64, FakeError> {
            self.readings.pop_front().unwrap().map_err(FakeError)
        }
    }

    #[test]
    fn ds18b20_sets_resolution() {
        let device = Ds18b20::new(FakeSensor::new(), 12, 0.0).unwrap();

        assert_eq!(Some(12), device.release().resolution);
    }

    #[test]
    fn ds18b20_missing_sensor_is_not_connected() {
        for kind in [OneWireErrorKind::NoSensorFound, OneWireErrorKind::KernelModuleLoad] {
            let mut sensor = FakeSensor::new();
            sensor.fail_resolution = Some(kind);

            assert!(matches!(Ds18b20::new(sensor, 9, 0.0), Err(SensorError::NotConnected)));
        }
    }

    #[test]
    fn ds18b20_read_applies_offset_and_rounds() {
        let sensor = FakeSensor::new().with_reading(Ok(21.4375));
        let mut device = Ds18b20::new(sensor, Ds18b20::<FakeSensor>::DEFAULT_RESOLUTION, -0.5).unwrap();

        assert_eq!(20.94, device.read_temperature().unwrap());
    }

    #[test]
    fn ds18b20_errors_keep_their_kind() {
        let sensor = FakeSensor::new()
            .with_reading(Err(OneWireErrorKind::NoSensorFound))
            .with_reading(Err(OneWireErrorKind::NotReady))
            .with_reading(Err(OneWireErrorKind::ResetValue))
            .with_reading(Err(OneWireErrorKind::Other));
        let mut device = Ds18b20::new(sensor, 9, 0.0).unwrap();

        assert!(matches!(device.read_temperature(), Err(SensorError::NotConnected)));
        assert!(matches!(device.read_temperature(), Err(SensorError::NotReady)));
        assert!(matches!(device.read_temperature(), Err(SensorError::DeviceReset)));
        assert!(matches!(device.read_temperature(), Err(SensorError::Bus(FakeError(OneWireErrorKind::Other)))));
    }
}
