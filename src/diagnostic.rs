//! Structured diagnostics for anomalies that do not stop a driver.
//!
//! A register that does not read back as written, a payload with a bad checksum or a reset
//! command the device did not acknowledge are all worth knowing about, but none of them makes the
//! device unusable. Drivers report them as [`Diagnostic`] values to an [`Observer`] they own and
//! continue with best-effort data. What to do about them (log, count, discard the sample,
//! reinitialize) is the caller's decision.

use crate::device::DeviceKind;

/// Identifies which checksummed word a [`Diagnostic::ChecksumMismatch`] refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumField {
    Temperature,
    Humidity,
    Status,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// A configuration register read back a different value after the settle delay.
    ConfigurationMismatch {
        device: DeviceKind,
        address: u8,
        register: u8,
        written: u16,
        read: u16,
    },

    /// A received word failed its CRC-8 check. The paired value was still returned.
    ChecksumMismatch {
        device: DeviceKind,
        address: u8,
        field: ChecksumField,
        expected: u8,
        received: u8,
    },

    /// The transfer carrying a reset command failed, typically because the device reset before
    /// acknowledging it.
    ResetNotAcknowledged {
        device: DeviceKind,
        address: u8,
        register: u8,
    },
}

pub trait Observer {
    fn notify(&mut self, diagnostic: Diagnostic);
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn notify(&mut self, diagnostic: Diagnostic) {
        (**self).notify(diagnostic)
    }
}

/// Forwards every diagnostic to the `log` facade at warn level.
///
/// This is the observer drivers use unless one is provided.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::ConfigurationMismatch { device, address, register, written, read } => {
                log::warn!(
                    "{:?} 0x{:02X}: register 0x{:02X} readback mismatch, wrote 0x{:04X}, read 0x{:04X}",
                    device, address, register, written, read
                );
            }
            Diagnostic::ChecksumMismatch { device, address, field, expected, received } => {
                log::warn!(
                    "{:?} 0x{:02X}: {:?} checksum mismatch, expected 0x{:02X}, received 0x{:02X}",
                    device, address, field, expected, received
                );
            }
            Diagnostic::ResetNotAcknowledged { device, address, register } => {
                log::warn!(
                    "{:?} 0x{:02X}: reset via register 0x{:02X} was not acknowledged",
                    device, address, register
                );
            }
        }
    }
}

/// Drops every diagnostic.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&mut self, _: Diagnostic) {}
}
