//! SHT3x command words and the status register layout.
//!
//! Commands are 16 bits, sent MSB first with no register prefix.

/// Single shot, high repeatability, clock stretching enabled.
pub const MEASURE_SINGLE_SHOT_HIGH: u16 = 0x2C06;
pub const SOFT_RESET: u16 = 0x30A2;
pub const HEATER_ENABLE: u16 = 0x306D;
pub const HEATER_DISABLE: u16 = 0x3066;
pub const READ_STATUS: u16 = 0xF32D;

/// Decoded status register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusWord(pub u16);

impl StatusWord {
    /// At least one alert is pending.
    pub fn alert_pending(&self) -> bool {
        self.0 & (1 << 15) != 0
    }

    pub fn heater_on(&self) -> bool {
        self.0 & (1 << 13) != 0
    }

    pub fn humidity_tracking_alert(&self) -> bool {
        self.0 & (1 << 11) != 0
    }

    pub fn temperature_tracking_alert(&self) -> bool {
        self.0 & (1 << 10) != 0
    }

    /// A reset (hard, soft or supply fail) was detected since the last status clear.
    pub fn system_reset_detected(&self) -> bool {
        self.0 & (1 << 4) != 0
    }

    /// The last command was not processed.
    pub fn command_failed(&self) -> bool {
        self.0 & (1 << 1) != 0
    }

    /// The checksum of the last write transfer failed.
    pub fn write_checksum_failed(&self) -> bool {
        self.0 & 1 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bits() {
        let status = StatusWord(0x8010);

        assert!(status.alert_pending());
        assert!(status.system_reset_detected());
        assert!(!status.heater_on());
        assert!(!status.command_failed());

        let status = StatusWord(0x2C03);
        assert!(status.heater_on());
        assert!(status.humidity_tracking_alert());
        assert!(status.temperature_tracking_alert());
        assert!(status.command_failed());
        assert!(status.write_checksum_failed());
    }
}
