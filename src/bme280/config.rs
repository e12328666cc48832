use crate::bme280::register::{
    ConfigFields, CtrlHumFields, CtrlMeasFields, Filter, Mode, Oversampling, Standby,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Configuration {
    pub(crate) mode: Mode,
    pub(crate) temperature_oversampling: Oversampling,
    pub(crate) pressure_oversampling: Oversampling,
    pub(crate) humidity_oversampling: Oversampling,
    pub(crate) standby: Standby,
    pub(crate) filter: Filter,
    pub(crate) spi3w: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            temperature_oversampling: Oversampling::X16,
            pressure_oversampling: Oversampling::X16,
            humidity_oversampling: Oversampling::X16,
            standby: Standby::Ms10,
            filter: Filter::X16,
            spi3w: false,
        }
    }
}

impl Configuration {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;

        self
    }

    pub fn temperature_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.temperature_oversampling = oversampling;

        self
    }

    pub fn pressure_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.pressure_oversampling = oversampling;

        self
    }

    /// Humidity oversampling. Only takes effect once CTRL_MEAS has been written after it.
    pub fn humidity_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.humidity_oversampling = oversampling;

        self
    }

    pub fn standby(mut self, standby: Standby) -> Self {
        self.standby = standby;

        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;

        self
    }

    pub fn spi3w(mut self, enable: bool) -> Self {
        self.spi3w = enable;

        self
    }

    /// Recommended modes of operation, datasheet section 3.5.
    pub fn from_preset(p: Preset) -> Self {
        match p {
            Preset::WeatherMonitoring => Configuration::default()
                .mode(Mode::Forced)
                .temperature_oversampling(Oversampling::X1)
                .pressure_oversampling(Oversampling::X1)
                .humidity_oversampling(Oversampling::X1)
                .filter(Filter::Off),
            Preset::HumiditySensing => Configuration::default()
                .mode(Mode::Forced)
                .temperature_oversampling(Oversampling::X1)
                .pressure_oversampling(Oversampling::Skipped)
                .humidity_oversampling(Oversampling::X1)
                .filter(Filter::Off),
            Preset::IndoorNavigation => Configuration::default()
                .standby(Standby::Ms0_5)
                .temperature_oversampling(Oversampling::X2)
                .pressure_oversampling(Oversampling::X16)
                .humidity_oversampling(Oversampling::X1)
                .filter(Filter::X16),
            Preset::Gaming => Configuration::default()
                .standby(Standby::Ms0_5)
                .temperature_oversampling(Oversampling::X1)
                .pressure_oversampling(Oversampling::X4)
                .humidity_oversampling(Oversampling::Skipped)
                .filter(Filter::X16),
        }
    }

    pub(crate) fn ctrl_hum(&self) -> CtrlHumFields {
        CtrlHumFields { osrs_h: self.humidity_oversampling }
    }

    pub(crate) fn ctrl_meas(&self) -> CtrlMeasFields {
        CtrlMeasFields {
            osrs_t: self.temperature_oversampling,
            osrs_p: self.pressure_oversampling,
            mode: self.mode,
        }
    }

    pub(crate) fn config(&self) -> ConfigFields {
        ConfigFields {
            standby: self.standby,
            filter: self.filter,
            spi3w_en: self.spi3w,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Preset {
    WeatherMonitoring,
    HumiditySensing,
    IndoorNavigation,
    Gaming,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bme280::register::{Config, CtrlHum, CtrlMeas};
    use crate::register::Writable;

    fn encode<W: Writable>(v: &W::In) -> u8 {
        let mut buffer = [0u8; 1];
        W::encode(v, &mut buffer);
        buffer[0]
    }

    #[test]
    fn default_register_values() {
        let config = Configuration::default();

        assert_eq!(0x05, encode::<CtrlHum>(&config.ctrl_hum()));
        assert_eq!(0xD0, encode::<Config>(&config.config()));
        assert_eq!(0xB7, encode::<CtrlMeas>(&config.ctrl_meas()));
    }

    #[test]
    fn weather_monitoring_preset() {
        let config = Configuration::from_preset(Preset::WeatherMonitoring);

        assert_eq!(0x01, encode::<CtrlHum>(&config.ctrl_hum()));
        // osrs_t x1, osrs_p x1, forced
        assert_eq!(0b001_001_01, encode::<CtrlMeas>(&config.ctrl_meas()));
        // standby untouched, filter off
        assert_eq!(0b110_000_0_0, encode::<Config>(&config.config()));
    }

    #[test]
    fn gaming_preset_skips_humidity() {
        let config = Configuration::from_preset(Preset::Gaming);

        assert_eq!(0x00, encode::<CtrlHum>(&config.ctrl_hum()));
        assert_eq!(Mode::Normal, config.mode);
        assert_eq!(0b000_100_0_0, encode::<Config>(&config.config()));
    }
}
