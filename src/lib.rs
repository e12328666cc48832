//! Register-level drivers for a set of environmental and power sensors.
//!
//! Supported devices: BME280, INA233, MCP9808, MPL3115A2 and SHT31 over I2C (any
//! [`embedded_hal::i2c::I2c`]), and DS18B20 through a caller-supplied 1-Wire library.
//!
//! Each driver owns its bus handle, reads raw register values and compensates them in double
//! precision. Non-fatal anomalies are reported through an [`Observer`]; the default
//! [`LogObserver`] forwards them to the `log` facade.
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod clock;
pub mod conversion;
pub mod crc;
pub mod device;
pub mod diagnostic;
pub mod error;
pub mod register;
pub mod verify;

pub mod bme280;
pub mod ds18b20;
pub mod ina233;
pub mod mcp9808;
pub mod mpl3115a2;
pub mod sht31;

#[cfg(test)]
mod testing;

pub use crate::bus::{Bus, I2c};
pub use crate::clock::{Clock, Instant};
pub use crate::device::{Device, DeviceKind, Driver, EnergyMeter, Reading};
pub use crate::diagnostic::{Diagnostic, LogObserver, NoopObserver, Observer};
pub use crate::error::{SensorError, SensorResult};

#[cfg(feature = "std")]
pub use crate::clock::SystemClock;
