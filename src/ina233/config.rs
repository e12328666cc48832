use crate::ina233::register::{
    Accumulation, AdcConfigFields, Averaging, ConversionTime, DeviceConfigFields, OperatingMode,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Configuration {
    pub(crate) max_current: f64,
    pub(crate) shunt_resistance: f64,
    pub(crate) adc: AdcConfigFields,
    pub(crate) device: DeviceConfigFields,
    pub(crate) settle_ms: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_current: 15.0,
            shunt_resistance: 0.002,
            adc: AdcConfigFields {
                averaging: Averaging::X256,
                bus_conversion_time: ConversionTime::Us2116,
                shunt_conversion_time: ConversionTime::Us1100,
                mode: OperatingMode::ShuntAndBusContinuous,
            },
            device: DeviceConfigFields {
                ein_status: false,
                ein_accum: Accumulation::All,
                i2c_filter: false,
                read_ein: true,
                alert: true,
                alert_polarity: false,
            },
            settle_ms: 0,
        }
    }
}

impl Configuration {
    /// Largest expected current in amperes. Sets the current LSB to `max_current / 2^15`.
    pub fn max_current(mut self, amperes: f64) -> Self {
        self.max_current = amperes;

        self
    }

    /// Shunt resistor value in ohms.
    pub fn shunt_resistance(mut self, ohms: f64) -> Self {
        self.shunt_resistance = ohms;

        self
    }

    pub fn adc(mut self, adc: AdcConfigFields) -> Self {
        self.adc = adc;

        self
    }

    /// Device configuration. `read_ein` should stay set: energy integration assumes the
    /// accumulator clears on every read.
    pub fn device(mut self, device: DeviceConfigFields) -> Self {
        self.device = device;

        self
    }

    /// Wait between writing a configuration register and reading it back.
    pub fn settle_ms(mut self, ms: u32) -> Self {
        self.settle_ms = ms;

        self
    }

    /// Amperes per current register LSB.
    pub fn current_lsb(&self) -> f64 {
        self.max_current / 32768.0
    }

    /// MFR_CALIBRATION value, `round(0.00512 / (current_lsb * r_shunt))` truncated to 15 bits.
    ///
    /// Values that do not fit keep their low 15 bits.
    pub fn calibration(&self) -> u16 {
        let cal = 0.00512 / (self.current_lsb() * self.shunt_resistance);

        ((libm::round(cal) as u32) & 0x7FFF) as u16
    }
}
