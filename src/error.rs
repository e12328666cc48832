//! Errors that can occur when talking to a sensor.
//!
//! This module provides an error type that encapsulates every failure a driver can report.
//! It is generic over the underlying transport error type.
//!
//! Anomalies that do not make a reading unusable, such as a configuration register that does not
//! read back as written or a payload that fails its checksum, are *not* errors. They are reported
//! as [`Diagnostic`](crate::diagnostic::Diagnostic) events and the driver carries on.

use core::fmt::{Debug, Display, Formatter};

use crate::register::InvalidRegisterField;

/// This represents all possible errors that can occur when using one of the drivers.
#[derive(Debug)]
pub enum SensorError<BusError> {
    /// An error has occurred in the I2C driver (or the 1-Wire library).
    Bus(BusError),

    /// The device cannot be reached, or it does not identify as the expected chip.
    ///
    /// Fatal during construction. Could possibly indicate an error with wiring or addressing.
    NotConnected,

    /// A measurement was requested before the conversion completed.
    ///
    /// No data is returned. Retrying later is safe.
    NotReady,

    /// The device reported an unexpected internal reset.
    ///
    /// Configuration and calibration held by the driver may no longer match the chip; the driver
    /// should be constructed again.
    DeviceReset,

    /// Reading from a register returned a bit pattern that the driver cannot decode.
    UnexpectedRegisterData(InvalidRegisterField),
}

/// Type alias used to simplify return types throughout the drivers
pub type SensorResult<T, BusError> = Result<T, SensorError<BusError>>;

impl<BusError> From<InvalidRegisterField> for SensorError<BusError> {
    fn from(field: InvalidRegisterField) -> Self {
        SensorError::UnexpectedRegisterData(field)
    }
}

impl<BusError: Debug> Display for SensorError<BusError> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorError::Bus(e) => write!(f, "bus error: {:?}", e),
            SensorError::NotConnected => f.write_str("device not connected"),
            SensorError::NotReady => f.write_str("conversion not ready"),
            SensorError::DeviceReset => f.write_str("device reported an unexpected reset"),
            SensorError::UnexpectedRegisterData(field) => write!(
                f,
                "unexpected value 0x{:02X} at bit {} of register 0x{:02X}",
                field.value, field.bit_offset, field.register
            ),
        }
    }
}

#[cfg(feature = "std")]
impl<BusError: Debug> std::error::Error for SensorError<BusError> {}
