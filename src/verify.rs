//! Write-then-verify for configuration registers.
//!
//! A configuration value is written, the device is given a fixed settle time, and the register is
//! read back. A mismatch is reported to the driver's observer and returned as
//! [`WriteCheck::Mismatch`]; it is never an error; initialization carries on with the next step.
//! Only transport failures abort.

use embedded_hal::delay::DelayNs;

use crate::bus::Bus;
use crate::device::DeviceKind;
use crate::diagnostic::{Diagnostic, Observer};
use crate::error::{SensorError, SensorResult};
use crate::register::Writable;

/// Settle time used by the BME280 configuration sequence.
pub const SETTLE_DELAY_MS: u32 = 100;

/// Outcome of a verified register write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteCheck {
    Verified,
    Mismatch { written: u16, read: u16 },
}

impl WriteCheck {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, WriteCheck::Mismatch { .. })
    }
}

/// Writes `value` to the register `W`, waits `settle_ms`, reads it back and compares.
///
/// `W` must be a one- or two-byte register. Multi-byte values are compared as little-endian
/// words, matching how SMBus word registers are transferred.
pub fn write_verified<W, B, D, O>(
    bus: &mut B,
    delay: &mut D,
    observer: &mut O,
    device: DeviceKind,
    value: &W::In,
    settle_ms: u32,
) -> SensorResult<WriteCheck, B::Error>
where
    W: Writable,
    B: Bus,
    D: DelayNs,
    O: Observer,
{
    let mut written = [0u8; 2];
    let written = &mut written[..W::N];
    W::encode(value, written);
    bus.write_register(W::ADDR, written).map_err(SensorError::Bus)?;

    delay.delay_ms(settle_ms);

    let mut read = [0u8; 2];
    let read = &mut read[..W::N];
    bus.read_register(W::ADDR, read).map_err(SensorError::Bus)?;

    if written == read {
        log::trace!("{:?}: register 0x{:02X} verified", device, W::ADDR);
        return Ok(WriteCheck::Verified);
    }

    let (written, read) = (to_word(written), to_word(read));
    observer.notify(Diagnostic::ConfigurationMismatch {
        device,
        address: bus.address(),
        register: W::ADDR,
        written,
        read,
    });

    Ok(WriteCheck::Mismatch { written, read })
}

fn to_word(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .rev()
        .fold(0u16, |word, byte| (word << 8) | *byte as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::Reg;
    use crate::testing::{FakeBus, FakeDelay, RecordingObserver};

    struct Config;
    impl Reg for Config { const ADDR: u8 = 0xF5; }
    impl Writable for Config {
        type In = u8;
        fn encode(v: &Self::In, out: &mut [u8]) { out[0] = *v; }
    }

    struct Calibration;
    impl Reg for Calibration { const ADDR: u8 = 0xD4; }
    impl Writable for Calibration {
        type In = u16;
        const N: usize = 2;
        fn encode(v: &Self::In, out: &mut [u8]) { out.copy_from_slice(&v.to_le_bytes()); }
    }

    #[test]
    fn matching_readback_is_verified() {
        let mut bus = FakeBus::new();
        let mut delay = FakeDelay::new();
        let mut observer = RecordingObserver::new();

        let check = write_verified::<Config, _, _, _>(
            &mut bus, &mut delay, &mut observer, DeviceKind::Bme280, &0x90, SETTLE_DELAY_MS,
        )
        .unwrap();

        assert_eq!(WriteCheck::Verified, check);
        assert_eq!(100_000_000, delay.elapsed_ns());
        assert!(observer.events().is_empty());
    }

    #[test]
    fn mismatch_is_flagged_not_fatal() {
        let mut bus = FakeBus::new();
        bus.with_stuck_register(0xF5, &[0x00]);
        let mut delay = FakeDelay::new();
        let mut observer = RecordingObserver::new();

        let check = write_verified::<Config, _, _, _>(
            &mut bus, &mut delay, &mut observer, DeviceKind::Bme280, &0x90, SETTLE_DELAY_MS,
        )
        .unwrap();

        assert_eq!(WriteCheck::Mismatch { written: 0x90, read: 0x00 }, check);
        assert_eq!(
            &[Diagnostic::ConfigurationMismatch {
                device: DeviceKind::Bme280,
                address: FakeBus::ADDRESS,
                register: 0xF5,
                written: 0x90,
                read: 0x00,
            }][..],
            observer.events()
        );
    }

    #[test]
    fn words_compare_little_endian() {
        let mut bus = FakeBus::new();
        bus.with_stuck_register(0xD4, &[0xD8, 0x15]);
        let mut delay = FakeDelay::new();
        let mut observer = RecordingObserver::new();

        let check = write_verified::<Calibration, _, _, _>(
            &mut bus, &mut delay, &mut observer, DeviceKind::Ina233, &0x15D8, 0,
        )
        .unwrap();
        assert_eq!(WriteCheck::Verified, check);

        let check = write_verified::<Calibration, _, _, _>(
            &mut bus, &mut delay, &mut observer, DeviceKind::Ina233, &0x15D9, 0,
        )
        .unwrap();
        assert_eq!(WriteCheck::Mismatch { written: 0x15D9, read: 0x15D8 }, check);
    }

    #[test]
    fn transport_failure_aborts() {
        let mut bus = FakeBus::new();
        bus.fail_next_write_to(0xF5);
        let mut delay = FakeDelay::new();
        let mut observer = RecordingObserver::new();

        let result = write_verified::<Config, _, _, _>(
            &mut bus, &mut delay, &mut observer, DeviceKind::Bme280, &0x90, SETTLE_DELAY_MS,
        );

        assert!(matches!(result, Err(SensorError::Bus(()))));
    }
}
