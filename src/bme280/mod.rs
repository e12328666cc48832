//! Driver for the Bosch BME280 combined temperature, pressure and humidity sensor.
//!
//! The device is configured once at construction, its trimming parameters are read from NVM and
//! every subsequent sample is a single 8-byte burst read compensated in double precision.

pub mod calibration;
pub mod config;
pub mod register;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::SevenBitAddress;

use crate::bme280::calibration::TrimParameters;
use crate::bme280::config::Configuration;
use crate::bme280::register::{
    ChipId, Config, CtrlHum, CtrlMeas, Data, HumidityCalibration, RawSample, Reset, ResetCommand,
    Status, StatusFlags, BME280_CHIP_ID,
};
use crate::bus::{Bus, I2c};
use crate::conversion::round2;
use crate::device::{DeviceKind, Driver};
use crate::diagnostic::{LogObserver, Observer};
use crate::error::{SensorError, SensorResult};
use crate::verify::{write_verified, SETTLE_DELAY_MS};

/// Type alias for a BME280 communicating over I2C
pub type Bme280I2c<T, O = LogObserver> = Bme280<I2c<T>, O>;

/// Main BME280 driver struct
pub struct Bme280<B, O = LogObserver> {
    bus: B,
    observer: O,
    trim: TrimParameters,
}

/// One compensated sample.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// °C
    pub temperature: f64,
    /// hPa
    pub pressure: f64,
    /// %RH
    pub humidity: f64,
}

impl Measurement {
    /// Every value rounded to two decimals.
    pub fn rounded(&self) -> Self {
        Self {
            temperature: round2(self.temperature),
            pressure: round2(self.pressure),
            humidity: round2(self.humidity),
        }
    }
}

#[cfg(feature = "uom")]
impl Measurement {
    pub fn temperature_uom(&self) -> uom::si::f64::ThermodynamicTemperature {
        uom::si::thermodynamic_temperature::ThermodynamicTemperature::new::<uom::si::thermodynamic_temperature::degree_celsius>(self.temperature)
    }

    pub fn pressure_uom(&self) -> uom::si::f64::Pressure {
        uom::si::pressure::Pressure::new::<uom::si::pressure::hectopascal>(self.pressure)
    }

    pub fn humidity_uom(&self) -> uom::si::f64::Ratio {
        uom::si::ratio::Ratio::new::<uom::si::ratio::percent>(self.humidity)
    }
}

impl<T> Bme280I2c<T>
where
    T: embedded_hal::i2c::I2c,
{
    /// Constructs a new driver for a BME280 on an I2C bus.
    ///
    /// This function will:
    /// - Probe for a connected BME280.
    /// - Load the trimming parameters from NVM.
    /// - Write CTRL_HUM, CONFIG and CTRL_MEAS, verifying each one after a 100 ms settle time.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use embedded_hal::delay::DelayNs;
    /// # use embedded_hal::i2c::I2c;
    /// # use envsense::SensorResult;
    /// use envsense::bme280::{Bme280, SdoPinState};
    /// use envsense::bme280::config::Configuration;
    /// # fn demo<I: I2c, D: DelayNs>(i2c: I, mut delay: D) -> SensorResult<(), I::Error> {
    ///
    /// let mut device = Bme280::new_i2c(i2c, SdoPinState::Low, Configuration::default(), &mut delay)?;
    /// let measurement = device.read_measurement()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new_i2c<D: DelayNs>(
        i2c: T,
        sdo_pin_state: SdoPinState,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, T::Error> {
        Self::new(I2c::new(i2c, sdo_pin_state.into()), config, delay)
    }
}

impl<B> Bme280<B>
where
    B: Bus,
{
    /// Constructs a driver that reports diagnostics through [`LogObserver`].
    pub fn new<D: DelayNs>(bus: B, config: Configuration, delay: &mut D) -> SensorResult<Self, B::Error> {
        Self::new_with_observer(bus, config, LogObserver, delay)
    }
}

impl<B, O> Bme280<B, O>
where
    B: Bus,
    O: Observer,
{
    /// Probes if the device is ready by attempting to read ChipId `attempts` times with a 1 ms delay.
    ///
    /// Returns [`SensorError::NotConnected`] if no response is received, or the device does not
    /// identify as a BME280.
    fn probe_ready<D: DelayNs>(bus: &mut B, delay: &mut D, attempts: u32) -> SensorResult<(), B::Error> {
        for _ in 0..attempts {
            if let Ok(id) = bus.read::<ChipId>() {
                if id == BME280_CHIP_ID {
                    return Ok(());
                }

                log::debug!("BME280 0x{:02X}: unexpected chip id 0x{:02X}", bus.address(), id);
            }

            delay.delay_ms(1);
        }

        Err(SensorError::NotConnected)
    }

    pub fn new_with_observer<D: DelayNs>(
        mut bus: B,
        config: Configuration,
        observer: O,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        // 2 ms start-up time after power on (datasheet section 1, table 1)
        Self::probe_ready(&mut bus, delay, 5)?;

        let trim = Self::read_trim_parameters(&mut bus)?;
        log::debug!("BME280 0x{:02X}: {:?}", bus.address(), trim);

        let mut device = Bme280 { bus, observer, trim };
        device.apply_configuration(&config, delay)?;

        Ok(device)
    }

    /// Writes CTRL_HUM, CONFIG and CTRL_MEAS in that order, verifying each one.
    ///
    /// A register that does not read back as written is reported to the observer and the sequence
    /// carries on. Returns `true` when all three registers verified.
    pub fn apply_configuration<D: DelayNs>(
        &mut self,
        config: &Configuration,
        delay: &mut D,
    ) -> SensorResult<bool, B::Error> {
        let checks = [
            write_verified::<CtrlHum, _, _, _>(
                &mut self.bus, delay, &mut self.observer, DeviceKind::Bme280, &config.ctrl_hum(), SETTLE_DELAY_MS,
            )?,
            write_verified::<Config, _, _, _>(
                &mut self.bus, delay, &mut self.observer, DeviceKind::Bme280, &config.config(), SETTLE_DELAY_MS,
            )?,
            write_verified::<CtrlMeas, _, _, _>(
                &mut self.bus, delay, &mut self.observer, DeviceKind::Bme280, &config.ctrl_meas(), SETTLE_DELAY_MS,
            )?,
        ];

        Ok(checks.iter().all(|check| !check.is_mismatch()))
    }

    fn read_trim_parameters(bus: &mut B) -> SensorResult<TrimParameters, B::Error> {
        let block = bus.read::<register::Calibration>()?;
        let humidity = bus.read::<HumidityCalibration>()?;

        Ok(TrimParameters::parse(&block, &humidity))
    }

    /// Trimming parameters loaded at construction.
    pub fn trim_parameters(&self) -> &TrimParameters {
        &self.trim
    }

    pub fn chip_id(&mut self) -> SensorResult<u8, B::Error> {
        self.bus.read::<ChipId>()
    }

    pub fn status(&mut self) -> SensorResult<StatusFlags, B::Error> {
        self.bus.read::<Status>()
    }

    /// Issues a soft reset and waits for the start-up time.
    ///
    /// All configuration registers return to their power-on values; call
    /// [`apply_configuration`](Self::apply_configuration) afterwards.
    pub fn soft_reset<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<(), B::Error> {
        self.bus.write::<Reset>(&ResetCommand::SoftReset)?;
        delay.delay_ms(2);

        log::debug!("BME280 0x{:02X}: reset", self.bus.address());
        Ok(())
    }

    /// Reads the pressure, temperature and humidity ADC outputs in one burst.
    pub fn read_raw(&mut self) -> SensorResult<RawSample, B::Error> {
        self.bus.read::<Data>()
    }

    /// Compensates a raw sample. Values are not rounded.
    pub fn compensate(&self, raw: &RawSample) -> Measurement {
        let t_fine = self.trim.fine_temperature(raw.temperature);

        Measurement {
            temperature: self.trim.temperature(t_fine),
            pressure: self.trim.pressure(raw.pressure, t_fine),
            humidity: self.trim.humidity(raw.humidity, t_fine),
        }
    }

    /// Reads and compensates one sample, rounded to two decimals.
    pub fn read_measurement(&mut self) -> SensorResult<Measurement, B::Error> {
        let raw = self.read_raw()?;
        let measurement = self.compensate(&raw).rounded();
        log::trace!("BME280 0x{:02X}: {:?}", self.bus.address(), measurement);

        Ok(measurement)
    }

    /// Gives the bus and observer back.
    pub fn release(self) -> (B, O) {
        (self.bus, self.observer)
    }
}

impl<B, O> Driver for Bme280<B, O>
where
    B: Bus,
    O: Observer,
{
    type Raw = RawSample;
    type Output = Measurement;
    type Error = SensorError<B::Error>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Bme280
    }

    fn read_raw(&mut self) -> Result<RawSample, Self::Error> {
        Bme280::read_raw(self)
    }

    fn compensate(&self, raw: &RawSample) -> Measurement {
        Bme280::compensate(self, raw)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SdoPinState {
    /// SDO is pulled high by connection to VDDIO
    High,
    /// SDO is pulled low by connection to GND
    Low,
}

impl From<SdoPinState> for SevenBitAddress {
    fn from(value: SdoPinState) -> Self {
        match value {
            SdoPinState::High => 0x77,
            SdoPinState::Low => 0x76,
        }
    }
}
