//! Family-independent access to the drivers.
//!
//! Every driver implements [`Driver`]: read the raw register values, then compensate them into
//! physical units. [`Device`] wraps the register-bus families in one enum so a heterogeneous set
//! of sensors can be polled in a loop.

use crate::bme280::{Bme280, Measurement};
use crate::bus::Bus;
use crate::clock::Clock;
use crate::conversion::round2;
use crate::diagnostic::{LogObserver, Observer};
use crate::error::SensorResult;
use crate::ina233::{Ina233, PowerMeasurement};
use crate::mcp9808::Mcp9808;
use crate::mpl3115a2::{BarometricMeasurement, Mpl3115a2};
use crate::sht31::{HumidityMeasurement, Sht31};

/// Names a sensor family in diagnostics and logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceKind {
    Bme280,
    Ina233,
    Mcp9808,
    Mpl3115a2,
    Sht31,
    Ds18b20,
}

pub trait Driver {
    /// Uncompensated register contents.
    type Raw;
    /// Compensated values in datasheet units.
    type Output;
    type Error;

    fn kind(&self) -> DeviceKind;

    fn read_raw(&mut self) -> Result<Self::Raw, Self::Error>;

    /// Pure conversion of `raw` using the calibration and configuration held by the driver.
    fn compensate(&self, raw: &Self::Raw) -> Self::Output;

    /// Reads and compensates one sample at full precision.
    fn sample(&mut self) -> Result<Self::Output, Self::Error> {
        let raw = self.read_raw()?;

        Ok(self.compensate(&raw))
    }
}

/// A driver that integrates energy over successive reads.
pub trait EnergyMeter: Driver {
    /// Running total in kWh, folded forward from the previous call.
    fn energy<C: Clock>(&mut self, clock: &mut C) -> Result<f64, Self::Error>;

    /// Clears the hardware accumulator and zeroes the running total.
    fn reset_energy<C: Clock>(&mut self, clock: &mut C) -> Result<(), Self::Error>;
}

/// A reading from any [`Device`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    Environment(Measurement),
    Power {
        measurement: PowerMeasurement,
        /// kWh
        energy: f64,
    },
    Temperature(f64),
    Barometric(BarometricMeasurement),
    Humidity(HumidityMeasurement),
}

impl Reading {
    /// Rounds every value to two decimals, except energy whose magnitude is usually far smaller.
    pub fn rounded(&self) -> Self {
        match *self {
            Reading::Environment(m) => Reading::Environment(m.rounded()),
            Reading::Power { measurement, energy } => Reading::Power {
                measurement: PowerMeasurement {
                    voltage: round2(measurement.voltage),
                    current: round2(measurement.current),
                    power: round2(measurement.power),
                },
                energy,
            },
            Reading::Temperature(t) => Reading::Temperature(round2(t)),
            Reading::Barometric(m) => Reading::Barometric(BarometricMeasurement {
                reading: m.reading.rounded(),
                temperature: round2(m.temperature),
            }),
            Reading::Humidity(m) => Reading::Humidity(HumidityMeasurement {
                temperature: round2(m.temperature),
                humidity: round2(m.humidity),
            }),
        }
    }
}

/// One sensor on a register bus, of any supported family.
pub enum Device<B, O = LogObserver> {
    Bme280(Bme280<B, O>),
    Ina233(Ina233<B, O>),
    Mcp9808(Mcp9808<B>),
    Mpl3115a2(Mpl3115a2<B, O>),
    Sht31(Sht31<B, O>),
}

impl<B, O> Device<B, O>
where
    B: Bus,
    O: Observer,
{
    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Bme280(d) => d.kind(),
            Device::Ina233(d) => d.kind(),
            Device::Mcp9808(d) => d.kind(),
            Device::Mpl3115a2(d) => d.kind(),
            Device::Sht31(d) => d.kind(),
        }
    }

    /// Samples the device at full precision. An INA233 also folds its energy accumulator into the
    /// running total, timed by `clock`.
    pub fn sample<C: Clock>(&mut self, clock: &mut C) -> SensorResult<Reading, B::Error> {
        Ok(match self {
            Device::Bme280(d) => Reading::Environment(d.sample()?),
            Device::Ina233(d) => {
                let measurement = d.sample()?;
                let energy = d.energy(clock)?;

                Reading::Power { measurement, energy }
            }
            Device::Mcp9808(d) => Reading::Temperature(d.sample()?),
            Device::Mpl3115a2(d) => Reading::Barometric(d.sample()?),
            Device::Sht31(d) => Reading::Humidity(d.sample()?),
        })
    }
}

impl<B, O> From<Bme280<B, O>> for Device<B, O> {
    fn from(d: Bme280<B, O>) -> Self {
        Device::Bme280(d)
    }
}

impl<B, O> From<Ina233<B, O>> for Device<B, O> {
    fn from(d: Ina233<B, O>) -> Self {
        Device::Ina233(d)
    }
}

impl<B, O> From<Mcp9808<B>> for Device<B, O> {
    fn from(d: Mcp9808<B>) -> Self {
        Device::Mcp9808(d)
    }
}

impl<B, O> From<Mpl3115a2<B, O>> for Device<B, O> {
    fn from(d: Mpl3115a2<B, O>) -> Self {
        Device::Mpl3115a2(d)
    }
}

impl<B, O> From<Sht31<B, O>> for Device<B, O> {
    fn from(d: Sht31<B, O>) -> Self {
        Device::Sht31(d)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use super::*;
    use crate::mcp9808;
    use crate::ina233;
    use crate::sht31;
    use crate::diagnostic::NoopObserver;
    use crate::testing::{FakeBus, FakeClock, FakeDelay, RecordingObserver};

    #[test]
    fn mcp9808_through_device() {
        let mut bus = FakeBus::new();
        bus.with_register(0x07, &[0x04]);
        bus.with_register(0x06, &[0x00, 0x54]);
        bus.with_register(0x05, &[0x01, 0x91]);
        let mut device: Device<FakeBus, RecordingObserver> =
            Mcp9808::new(bus, mcp9808::Configuration::default()).unwrap().into();

        assert_eq!(DeviceKind::Mcp9808, device.kind());
        let reading = device.sample(&mut FakeClock::at_secs(0)).unwrap();
        assert_eq!(Reading::Temperature(25.0625), reading);
        assert_eq!(Reading::Temperature(25.06), reading.rounded());
    }

    #[test]
    fn sht31_through_device() {
        let mut bus = FakeBus::new();
        bus.with_read(&[0x66, 0x66, 0x93, 0x80, 0x00, 0xA2]);
        let sht31 = Sht31::new_with_observer(bus, sht31::Configuration::default(), RecordingObserver::new()).unwrap();
        let mut device = Device::from(sht31);

        let reading = device.sample(&mut FakeClock::at_secs(0)).unwrap().rounded();

        assert_eq!(
            Reading::Humidity(HumidityMeasurement { temperature: 25.0, humidity: 50.0 }),
            reading
        );
    }

    #[test]
    fn ina233_through_device_integrates_energy() {
        let mut bus = FakeBus::new();
        bus.with_register(0x88, &9600u16.to_le_bytes());
        bus.with_register(0x89, &0x0400u16.to_le_bytes());
        bus.with_register(0x97, &1000u16.to_le_bytes());
        bus.with_register(0x86, &[0x06, 0x64, 0x00, 0x00, 0x0A, 0x00, 0x00]);
        let mut clock = FakeClock::at_secs(0);
        let ina = Ina233::new_with_observer(
            bus, ina233::config::Configuration::default(), RecordingObserver::new(), &mut clock, &mut FakeDelay::new(),
        )
        .unwrap();
        let mut device = Device::from(ina);
        assert_eq!(DeviceKind::Ina233, device.kind());

        clock.advance_secs(60);
        let reading = device.sample(&mut clock).unwrap();

        match reading {
            Reading::Power { measurement, energy } => {
                assert_eq!(0.46875, measurement.current);
                assert!(approx_eq!(f64, energy, 1.9073486328125e-06, epsilon = 1e-18));
            }
            other => panic!("unexpected reading {:?}", other),
        }
    }

    fn total_through_meter<M: EnergyMeter>(meter: &mut M, clock: &mut FakeClock) -> Result<f64, M::Error> {
        meter.energy(clock)
    }

    #[test]
    fn energy_meter_integrates_and_resets() {
        let mut bus = FakeBus::new();
        bus.with_register(0x86, &[0x06, 0x64, 0x00, 0x00, 0x0A, 0x00, 0x00]);
        let mut clock = FakeClock::at_secs(0);
        let mut ina = Ina233::new_with_observer(
            bus, ina233::config::Configuration::default(), NoopObserver, &mut clock, &mut FakeDelay::new(),
        )
        .unwrap();

        clock.advance_secs(60);
        let first = total_through_meter(&mut ina, &mut clock).unwrap();
        assert!(approx_eq!(f64, first, 1.9073486328125e-06, epsilon = 1e-18));

        clock.advance_secs(30);
        EnergyMeter::reset_energy(&mut ina, &mut clock).unwrap();
        assert_eq!(0.0, ina.energy_state().accumulated_kwh());

        clock.advance_secs(60);
        let after_reset = total_through_meter(&mut ina, &mut clock).unwrap();
        assert!(approx_eq!(f64, after_reset, 1.9073486328125e-06, epsilon = 1e-18));

        let (bus, _) = ina.release();
        let commands: heapless::Vec<&[u8], 4> = bus.commands().collect();
        assert_eq!(&[&[0x12u8][..], &[0x12u8][..]][..], &commands[..]);
    }
}
