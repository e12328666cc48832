//! Driver for the Sensirion SHT31 humidity and temperature sensor.
//!
//! Every 16-bit word the sensor sends is followed by a CRC-8. A failed checksum is reported as a
//! [`Diagnostic::ChecksumMismatch`] and the value is still returned; discarding it is up to the
//! caller's observer.

pub mod commands;

use embedded_hal::i2c::SevenBitAddress;

use crate::bus::{Bus, I2c};
use crate::conversion::round2;
use crate::crc::{self, Checksum};
use crate::device::{DeviceKind, Driver};
use crate::diagnostic::{ChecksumField, Diagnostic, LogObserver, Observer};
use crate::error::{SensorError, SensorResult};
use crate::sht31::commands::{
    StatusWord, HEATER_DISABLE, HEATER_ENABLE, MEASURE_SINGLE_SHOT_HIGH, READ_STATUS, SOFT_RESET,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Configuration {
    pub(crate) verify_checksum: bool,
    pub(crate) temperature_offset: f64,
    pub(crate) humidity_offset: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            verify_checksum: true,
            temperature_offset: 0.0,
            humidity_offset: 0.0,
        }
    }
}

impl Configuration {
    pub fn verify_checksum(mut self, enable: bool) -> Self {
        self.verify_checksum = enable;

        self
    }

    /// Added to every temperature, in °C.
    pub fn temperature_offset(mut self, offset: f64) -> Self {
        self.temperature_offset = offset;

        self
    }

    /// Added to every humidity, in %RH.
    pub fn humidity_offset(mut self, offset: f64) -> Self {
        self.humidity_offset = offset;

        self
    }
}

/// Raw temperature and humidity ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawHumidity {
    pub temperature: u16,
    pub humidity: u16,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HumidityMeasurement {
    /// °C
    pub temperature: f64,
    /// %RH
    pub humidity: f64,
}

#[cfg(feature = "uom")]
impl HumidityMeasurement {
    pub fn temperature_uom(&self) -> uom::si::f64::ThermodynamicTemperature {
        uom::si::thermodynamic_temperature::ThermodynamicTemperature::new::<uom::si::thermodynamic_temperature::degree_celsius>(self.temperature)
    }

    pub fn humidity_uom(&self) -> uom::si::f64::Ratio {
        uom::si::ratio::Ratio::new::<uom::si::ratio::percent>(self.humidity)
    }
}

/// `-45 + 175 * ticks / 65535` °C
pub fn temperature(ticks: u16) -> f64 {
    -45.0 + 175.0 * (ticks as f64 / 65535.0)
}

/// `100 * ticks / 65535` %RH
pub fn humidity(ticks: u16) -> f64 {
    100.0 * (ticks as f64 / 65535.0)
}

pub struct Sht31<B, O = LogObserver> {
    bus: B,
    observer: O,
    config: Configuration,
}

impl<T> Sht31<I2c<T>>
where
    T: embedded_hal::i2c::I2c,
{
    pub fn new_i2c(i2c: T, address: SevenBitAddress, config: Configuration) -> SensorResult<Self, T::Error> {
        Self::new(I2c::new(i2c, address), config)
    }
}

impl<B> Sht31<B>
where
    B: Bus,
{
    pub fn new(bus: B, config: Configuration) -> SensorResult<Self, B::Error> {
        Self::new_with_observer(bus, config, LogObserver)
    }
}

impl<B, O> Sht31<B, O>
where
    B: Bus,
    O: Observer,
{
    /// Soft resets the sensor.
    pub fn new_with_observer(bus: B, config: Configuration, observer: O) -> SensorResult<Self, B::Error> {
        let mut device = Sht31 { bus, observer, config };

        log::debug!(
            "SHT31 0x{:02X}: checksum verification {}",
            device.bus.address(), device.config.verify_checksum
        );
        device.soft_reset()?;

        Ok(device)
    }

    fn command(&mut self, command: u16) -> SensorResult<(), B::Error> {
        self.bus.write_command(&command.to_be_bytes()).map_err(SensorError::Bus)
    }

    pub fn soft_reset(&mut self) -> SensorResult<(), B::Error> {
        self.command(SOFT_RESET)
    }

    pub fn heater(&mut self, enable: bool) -> SensorResult<(), B::Error> {
        self.command(if enable { HEATER_ENABLE } else { HEATER_DISABLE })
    }

    /// Splits `word, crc` and reports a failed checksum. The word is returned either way.
    fn checked_word(&mut self, bytes: &[u8], field: ChecksumField) -> u16 {
        let word = u16::from_be_bytes([bytes[0], bytes[1]]);
        if !self.config.verify_checksum {
            return word;
        }

        if let Checksum::Mismatch { expected, received } = crc::verify(&bytes[..2], bytes[2]) {
            self.observer.notify(Diagnostic::ChecksumMismatch {
                device: DeviceKind::Sht31,
                address: self.bus.address(),
                field,
                expected,
                received,
            });
        }

        word
    }

    /// Runs a single-shot measurement and returns the checksum-checked ticks.
    pub fn read_raw(&mut self) -> SensorResult<RawHumidity, B::Error> {
        self.command(MEASURE_SINGLE_SHOT_HIGH)?;

        let mut data = [0u8; 6];
        self.bus.read_bytes(&mut data).map_err(SensorError::Bus)?;

        Ok(RawHumidity {
            temperature: self.checked_word(&data[0..3], ChecksumField::Temperature),
            humidity: self.checked_word(&data[3..6], ChecksumField::Humidity),
        })
    }

    /// Converts ticks and applies the offsets. Not rounded.
    pub fn compensate(&self, raw: &RawHumidity) -> HumidityMeasurement {
        HumidityMeasurement {
            temperature: temperature(raw.temperature) + self.config.temperature_offset,
            humidity: humidity(raw.humidity) + self.config.humidity_offset,
        }
    }

    /// Single-shot measurement, rounded to two decimals.
    pub fn read_measurement(&mut self) -> SensorResult<HumidityMeasurement, B::Error> {
        let raw = self.read_raw()?;
        let measurement = self.compensate(&raw);

        Ok(HumidityMeasurement {
            temperature: round2(measurement.temperature),
            humidity: round2(measurement.humidity),
        })
    }

    pub fn status(&mut self) -> SensorResult<StatusWord, B::Error> {
        self.command(READ_STATUS)?;

        let mut data = [0u8; 3];
        self.bus.read_bytes(&mut data).map_err(SensorError::Bus)?;

        let status = StatusWord(self.checked_word(&data, ChecksumField::Status));
        log::debug!("SHT31 0x{:02X}: {:?}", self.bus.address(), status);

        Ok(status)
    }

    pub fn release(self) -> (B, O) {
        (self.bus, self.observer)
    }
}

impl<B, O> Driver for Sht31<B, O>
where
    B: Bus,
    O: Observer,
{
    type Raw = RawHumidity;
    type Output = HumidityMeasurement;
    type Error = SensorError<B::Error>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Sht31
    }

    fn read_raw(&mut self) -> Result<RawHumidity, Self::Error> {
        Sht31::read_raw(self)
    }

    fn compensate(&self, raw: &RawHumidity) -> HumidityMeasurement {
        Sht31::compensate(self, raw)
    }
}
