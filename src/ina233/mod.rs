//! Driver for the TI INA233 PMBus current, voltage and power monitor.
//!
//! Readings are returned in volts, amperes, watts and kWh without rounding.

pub mod config;
pub mod energy;
pub mod register;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::SevenBitAddress;

use crate::bus::{Bus, I2c};
use crate::clock::Clock;
use crate::conversion::sign_extend;
use crate::device::{DeviceKind, Driver, EnergyMeter};
use crate::diagnostic::{LogObserver, Observer};
use crate::error::{SensorError, SensorResult};
use crate::ina233::config::Configuration;
use crate::ina233::energy::EnergyState;
use crate::ina233::register::{
    AdcConfigFields, Capability, DeviceConfigFields, MfrAdcConfig, MfrCalibration,
    MfrDeviceConfig, MfrId, MfrModel, MfrRevision, ReadEin, ReadIin, ReadPin, ReadVin,
    StatusByte, StatusCml, StatusInput, StatusIout, StatusMfrSpecific, StatusWord,
    RESTORE_DEFAULT_ALL,
};
use crate::verify::write_verified;

/// Type alias for an INA233 communicating over I2C
pub type Ina233I2c<T, O = LogObserver> = Ina233<I2c<T>, O>;

pub struct Ina233<B, O = LogObserver> {
    bus: B,
    observer: O,
    current_lsb: f64,
    energy: EnergyState,
}

/// Raw READ_VIN, READ_IIN and READ_PIN words.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawPower {
    pub voltage: u16,
    pub current: u16,
    pub power: u16,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerMeasurement {
    /// V
    pub voltage: f64,
    /// A
    pub current: f64,
    /// W
    pub power: f64,
}

#[cfg(feature = "uom")]
impl PowerMeasurement {
    pub fn voltage_uom(&self) -> uom::si::f64::ElectricPotential {
        uom::si::electric_potential::ElectricPotential::new::<uom::si::electric_potential::volt>(self.voltage)
    }

    pub fn current_uom(&self) -> uom::si::f64::ElectricCurrent {
        uom::si::electric_current::ElectricCurrent::new::<uom::si::electric_current::ampere>(self.current)
    }

    pub fn power_uom(&self) -> uom::si::f64::Power {
        uom::si::power::Power::new::<uom::si::power::watt>(self.power)
    }
}

/// Identity, status and configuration registers, read in one go for troubleshooting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceReport {
    pub mfr_id: [u8; 3],
    pub mfr_model: [u8; 7],
    pub mfr_revision: u16,
    pub calibration: u16,
    pub device_config: DeviceConfigFields,
    pub capability: u8,
    pub status_byte: u8,
    pub status_word: u16,
    pub status_iout: u8,
    pub status_input: u8,
    pub status_cml: u8,
    pub status_mfr: u8,
    pub adc_config: AdcConfigFields,
}

impl DeviceReport {
    /// MFR_ID as text, `None` if it is not valid UTF-8.
    pub fn manufacturer(&self) -> Option<&str> {
        core::str::from_utf8(&self.mfr_id).ok()
    }

    /// MFR_MODEL as text, `None` if it is not valid UTF-8.
    pub fn model(&self) -> Option<&str> {
        core::str::from_utf8(&self.mfr_model).ok()
    }
}

impl<T> Ina233I2c<T>
where
    T: embedded_hal::i2c::I2c,
{
    pub fn new_i2c<C: Clock, D: DelayNs>(
        i2c: T,
        address: SevenBitAddress,
        config: Configuration,
        clock: &mut C,
        delay: &mut D,
    ) -> SensorResult<Self, T::Error> {
        Self::new(I2c::new(i2c, address), config, clock, delay)
    }
}

impl<B> Ina233<B>
where
    B: Bus,
{
    pub fn new<C: Clock, D: DelayNs>(
        bus: B,
        config: Configuration,
        clock: &mut C,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        Self::new_with_observer(bus, config, LogObserver, clock, delay)
    }
}

impl<B, O> Ina233<B, O>
where
    B: Bus,
    O: Observer,
{
    /// Restores the power-on defaults, then programs and verifies MFR_CALIBRATION,
    /// MFR_DEVICE_CONFIG and MFR_ADC_CONFIG.
    ///
    /// Readback mismatches are reported to `observer`; only bus failures abort.
    pub fn new_with_observer<C: Clock, D: DelayNs>(
        bus: B,
        config: Configuration,
        observer: O,
        clock: &mut C,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        let mut device = Ina233 {
            bus,
            observer,
            current_lsb: config.current_lsb(),
            energy: EnergyState::new(clock.now()),
        };

        device.restore_defaults(clock)?;

        let calibration = config.calibration();
        log::debug!(
            "INA233 0x{:02X}: max current {} A, shunt {} ohm, current LSB {} A, MFR_CALIBRATION 0x{:04X}",
            device.bus.address(), config.max_current, config.shunt_resistance, device.current_lsb, calibration
        );

        write_verified::<MfrCalibration, _, _, _>(
            &mut device.bus, delay, &mut device.observer, DeviceKind::Ina233, &calibration, config.settle_ms,
        )?;
        write_verified::<MfrDeviceConfig, _, _, _>(
            &mut device.bus, delay, &mut device.observer, DeviceKind::Ina233, &config.device, config.settle_ms,
        )?;
        write_verified::<MfrAdcConfig, _, _, _>(
            &mut device.bus, delay, &mut device.observer, DeviceKind::Ina233, &config.adc, config.settle_ms,
        )?;

        Ok(device)
    }

    /// Sends RESTORE_DEFAULT_ALL and zeroes the energy total.
    ///
    /// Calibration and configuration are lost; the driver must be constructed again to measure
    /// current and power.
    pub fn restore_defaults<C: Clock>(&mut self, clock: &mut C) -> SensorResult<(), B::Error> {
        self.bus.write_command(&[RESTORE_DEFAULT_ALL]).map_err(SensorError::Bus)?;
        self.energy.reset(clock.now());

        Ok(())
    }

    /// Amperes per current LSB.
    pub fn current_lsb(&self) -> f64 {
        self.current_lsb
    }

    /// Bus voltage in V.
    pub fn voltage(&mut self) -> SensorResult<f64, B::Error> {
        let raw = self.bus.read::<ReadVin>()?;

        Ok(bus_voltage(raw))
    }

    /// Input current in A, negative when flowing backwards through the shunt.
    pub fn current(&mut self) -> SensorResult<f64, B::Error> {
        let raw = self.bus.read::<ReadIin>()?;

        Ok(current(raw, self.current_lsb))
    }

    /// Input power in W.
    pub fn power(&mut self) -> SensorResult<f64, B::Error> {
        let raw = self.bus.read::<ReadPin>()?;

        Ok(power(raw, self.current_lsb))
    }

    /// Total energy in kWh since construction or the last [`restore_defaults`](Self::restore_defaults).
    ///
    /// Returns 0.0 when the device has not taken a power sample since the previous call.
    pub fn energy<C: Clock>(&mut self, clock: &mut C) -> SensorResult<f64, B::Error> {
        let sample = self.bus.read::<ReadEin>()?;
        let now = clock.now();

        let energy = self.energy.integrate(&sample, self.current_lsb, now);
        log::trace!("INA233 0x{:02X}: {:?}, {} kWh", self.bus.address(), sample, energy);

        Ok(energy)
    }

    pub fn energy_state(&self) -> &EnergyState {
        &self.energy
    }

    pub fn report(&mut self) -> SensorResult<DeviceReport, B::Error> {
        Ok(DeviceReport {
            mfr_id: self.bus.read::<MfrId>()?,
            mfr_model: self.bus.read::<MfrModel>()?,
            mfr_revision: self.bus.read::<MfrRevision>()?,
            calibration: self.bus.read::<MfrCalibration>()?,
            device_config: self.bus.read::<MfrDeviceConfig>()?,
            capability: self.bus.read::<Capability>()?,
            status_byte: self.bus.read::<StatusByte>()?,
            status_word: self.bus.read::<StatusWord>()?,
            status_iout: self.bus.read::<StatusIout>()?,
            status_input: self.bus.read::<StatusInput>()?,
            status_cml: self.bus.read::<StatusCml>()?,
            status_mfr: self.bus.read::<StatusMfrSpecific>()?,
            adc_config: self.bus.read::<MfrAdcConfig>()?,
        })
    }

    pub fn release(self) -> (B, O) {
        (self.bus, self.observer)
    }
}

fn bus_voltage(raw: u16) -> f64 {
    // 1.25 mV per LSB
    (1.0 / 8.0) * (raw as f64 * 0.01)
}

fn current(raw: u16, current_lsb: f64) -> f64 {
    current_lsb * sign_extend(raw as u32, 16) as f64
}

fn power(raw: u16, current_lsb: f64) -> f64 {
    current_lsb * 25.0 * raw as f64
}

impl<B, O> Driver for Ina233<B, O>
where
    B: Bus,
    O: Observer,
{
    type Raw = RawPower;
    type Output = PowerMeasurement;
    type Error = SensorError<B::Error>;

    fn kind(&self) -> DeviceKind {
        DeviceKind::Ina233
    }

    fn read_raw(&mut self) -> Result<RawPower, Self::Error> {
        Ok(RawPower {
            voltage: self.bus.read::<ReadVin>()?,
            current: self.bus.read::<ReadIin>()?,
            power: self.bus.read::<ReadPin>()?,
        })
    }

    fn compensate(&self, raw: &RawPower) -> PowerMeasurement {
        PowerMeasurement {
            voltage: bus_voltage(raw.voltage),
            current: current(raw.current, self.current_lsb),
            power: power(raw.power, self.current_lsb),
        }
    }
}

impl<B, O> EnergyMeter for Ina233<B, O>
where
    B: Bus,
    O: Observer,
{
    fn energy<C: Clock>(&mut self, clock: &mut C) -> Result<f64, Self::Error> {
        Ina233::energy(self, clock)
    }

    fn reset_energy<C: Clock>(&mut self, clock: &mut C) -> Result<(), Self::Error> {
        self.restore_defaults(clock)
    }
}
