//! BME280 register catalog.
//!
//! Marker types for every register the driver touches. See section 5.3 ("Register description")
//! of the BME280 datasheet for the memory map.

use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Value of CHIP_ID for a BME280.
pub const BME280_CHIP_ID: u8 = 0x60;

/// Marker struct for the CHIP_ID (0xD0) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
pub struct ChipId;
impl Reg for ChipId { const ADDR: u8 = 0xD0; }

impl Readable for ChipId {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(b[0])
    }
}

/// Marker struct for the RESET (0xE0) register
///
/// - **Length:** 1 byte
/// - **Access:** Write-only
pub struct Reset;
impl Reg for Reset { const ADDR: u8 = 0xE0; }

/// The payload for the RESET (0xE0) register. Any other value is ignored by the device.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResetCommand {
    /// Power-on-reset procedure. Calibration NVM is reloaded, configuration returns to defaults.
    SoftReset,
}

impl Writable for Reset {
    type In = ResetCommand;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = match v {
            ResetCommand::SoftReset => 0xB6,
        };
    }
}

/// Marker struct for the CTRL_HUM (0xF2) register
///
/// Changes only become effective after a write to CTRL_MEAS.
pub struct CtrlHum;
impl Reg for CtrlHum { const ADDR: u8 = 0xF2; }

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtrlHumFields {
    pub osrs_h: Oversampling,
}

impl Readable for CtrlHum {
    type Out = CtrlHumFields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlHumFields { osrs_h: Oversampling::from(b[0] & 0b111) })
    }
}

impl Writable for CtrlHum {
    type In = CtrlHumFields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = u8::from(v.osrs_h) & 0b111;
    }
}

/// Marker struct for the STATUS (0xF3) register
pub struct Status;
impl Reg for Status { const ADDR: u8 = 0xF3; }

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StatusFlags {
    measuring: bool,
    im_update: bool,
}

impl StatusFlags {
    /// A conversion is running. Cleared once the results are in the data registers.
    pub fn measuring(&self) -> bool { self.measuring }

    /// NVM data is being copied to the image registers (at power-on and after a reset).
    pub fn nvm_updating(&self) -> bool { self.im_update }
}

impl Readable for Status {
    type Out = StatusFlags;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(StatusFlags {
            measuring: b[0] & 0b1000 != 0,
            im_update: b[0] & 0b0001 != 0,
        })
    }
}

/// Marker struct for the CTRL_MEAS (0xF4) register
pub struct CtrlMeas;
impl Reg for CtrlMeas { const ADDR: u8 = 0xF4; }

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtrlMeasFields {
    pub osrs_t: Oversampling,
    pub osrs_p: Oversampling,
    pub mode: Mode,
}

impl Readable for CtrlMeas {
    type Out = CtrlMeasFields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlMeasFields {
            osrs_t: Oversampling::from((b[0] >> 5) & 0b111),
            osrs_p: Oversampling::from((b[0] >> 2) & 0b111),
            mode: Mode::from(b[0] & 0b11),
        })
    }
}

impl Writable for CtrlMeas {
    type In = CtrlMeasFields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (u8::from(v.osrs_t) & 0b111) << 5
            | (u8::from(v.osrs_p) & 0b111) << 2
            | (u8::from(v.mode) & 0b11);
    }
}

/// Marker struct for the CONFIG (0xF5) register
///
/// Writes in Normal mode may be ignored by the device; write it while in Sleep mode.
pub struct Config;
impl Reg for Config { const ADDR: u8 = 0xF5; }

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConfigFields {
    pub standby: Standby,
    pub filter: Filter,
    pub spi3w_en: bool,
}

impl Readable for Config {
    type Out = ConfigFields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(ConfigFields {
            standby: Standby::from((b[0] >> 5) & 0b111),
            filter: Filter::from((b[0] >> 2) & 0b111),
            spi3w_en: b[0] & 0b1 != 0,
        })
    }
}

impl Writable for Config {
    type In = ConfigFields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (u8::from(v.standby) & 0b111) << 5
            | (u8::from(v.filter) & 0b111) << 2
            | v.spi3w_en as u8;
    }
}

/// Marker struct for the temperature/pressure trimming block, calib00..calib25 (0x88 - 0xA1)
///
/// - **Length:** 26 bytes
/// - **Access:** Read-only
pub struct Calibration;
impl Reg for Calibration { const ADDR: u8 = 0x88; }

impl Readable for Calibration {
    type Out = [u8; 26];
    const N: usize = 26;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut out = [0u8; 26];
        out.copy_from_slice(b);
        Ok(out)
    }
}

/// Marker struct for the humidity trimming block, calib26..calib32 (0xE1 - 0xE7)
///
/// - **Length:** 7 bytes
/// - **Access:** Read-only
pub struct HumidityCalibration;
impl Reg for HumidityCalibration { const ADDR: u8 = 0xE1; }

impl Readable for HumidityCalibration {
    type Out = [u8; 7];
    const N: usize = 7;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut out = [0u8; 7];
        out.copy_from_slice(b);
        Ok(out)
    }
}

/// Marker struct for the data registers press_msb..hum_lsb (0xF7 - 0xFE)
///
/// All eight bytes are read in one burst so that the three values belong to the same conversion
/// (datasheet section 4).
pub struct Data;
impl Reg for Data { const ADDR: u8 = 0xF7; }

/// Uncompensated ADC output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// 20-bit pressure
    pub pressure: u32,
    /// 20-bit temperature
    pub temperature: u32,
    /// 16-bit humidity
    pub humidity: u16,
}

impl Readable for Data {
    type Out = RawSample;
    const N: usize = 8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(RawSample {
            pressure: (b[0] as u32) << 12 | (b[1] as u32) << 4 | (b[2] as u32) >> 4,
            temperature: (b[3] as u32) << 12 | (b[4] as u32) << 4 | (b[5] as u32) >> 4,
            humidity: (b[6] as u16) << 8 | b[7] as u16,
        })
    }
}

/// Oversampling setting shared by the osrs_t, osrs_p and osrs_h fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    /// Measurement skipped, output set to 0x80000 (0x8000 for humidity)
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl From<u8> for Oversampling {
    fn from(field: u8) -> Self {
        match field {
            0b000 => Oversampling::Skipped,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }
}

impl From<Oversampling> for u8 {
    fn from(value: Oversampling) -> Self {
        match value {
            Oversampling::Skipped => 0b000,
            Oversampling::X1 => 0b001,
            Oversampling::X2 => 0b010,
            Oversampling::X4 => 0b011,
            Oversampling::X8 => 0b100,
            Oversampling::X16 => 0b101,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// No measurements. Default after power-on.
    Sleep,
    /// One measurement, then back to Sleep.
    Forced,
    /// Continuous measurements separated by the standby time.
    Normal,
}

impl From<u8> for Mode {
    fn from(field: u8) -> Self {
        match field {
            0b00 => Mode::Sleep,
            0b01 | 0b10 => Mode::Forced,
            _ => Mode::Normal,
        }
    }
}

impl From<Mode> for u8 {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Sleep => 0b00,
            Mode::Forced => 0b01,
            Mode::Normal => 0b11,
        }
    }
}

/// IIR filter coefficient
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    Off,
    X2,
    X4,
    X8,
    X16,
}

impl From<u8> for Filter {
    fn from(field: u8) -> Self {
        match field {
            0b000 => Filter::Off,
            0b001 => Filter::X2,
            0b010 => Filter::X4,
            0b011 => Filter::X8,
            _ => Filter::X16,
        }
    }
}

impl From<Filter> for u8 {
    fn from(value: Filter) -> Self {
        match value {
            Filter::Off => 0b000,
            Filter::X2 => 0b001,
            Filter::X4 => 0b010,
            Filter::X8 => 0b011,
            Filter::X16 => 0b100,
        }
    }
}

/// Inactive time between two measurements in Normal mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Standby {
    Ms0_5,
    Ms62_5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
    Ms10,
    Ms20,
}

impl From<u8> for Standby {
    fn from(field: u8) -> Self {
        match field {
            0b000 => Standby::Ms0_5,
            0b001 => Standby::Ms62_5,
            0b010 => Standby::Ms125,
            0b011 => Standby::Ms250,
            0b100 => Standby::Ms500,
            0b101 => Standby::Ms1000,
            0b110 => Standby::Ms10,
            _ => Standby::Ms20,
        }
    }
}

impl From<Standby> for u8 {
    fn from(value: Standby) -> Self {
        match value {
            Standby::Ms0_5 => 0b000,
            Standby::Ms62_5 => 0b001,
            Standby::Ms125 => 0b010,
            Standby::Ms250 => 0b011,
            Standby::Ms500 => 0b100,
            Standby::Ms1000 => 0b101,
            Standby::Ms10 => 0b110,
            Standby::Ms20 => 0b111,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_decode() {
        let sample = Data::decode(&[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30]).unwrap();

        assert_eq!(415148, sample.pressure);
        assert_eq!(519888, sample.temperature);
        assert_eq!(30000, sample.humidity);
    }

    #[test]
    fn data_decode_ignores_low_nibble_of_xlsb() {
        let sample = Data::decode(&[0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x0F, 0x00, 0x00]).unwrap();

        assert_eq!(0xFFFFF, sample.pressure);
        assert_eq!(0, sample.temperature);
    }

    #[test]
    fn ctrl_meas_encode() {
        let mut buffer = [0u8; 1];
        CtrlMeas::encode(&CtrlMeasFields {
            osrs_t: Oversampling::X16,
            osrs_p: Oversampling::X16,
            mode: Mode::Normal,
        }, &mut buffer);
        assert_eq!([0xB7], buffer);

        let reg = CtrlMeas::decode(&buffer).unwrap();
        assert_eq!(Mode::Normal, reg.mode);
        assert_eq!(Oversampling::X16, reg.osrs_p);
    }

    #[test]
    fn config_encode() {
        let mut buffer = [0u8; 1];
        Config::encode(&ConfigFields {
            standby: Standby::Ms10,
            filter: Filter::X16,
            spi3w_en: false,
        }, &mut buffer);
        assert_eq!([0xD0], buffer);
    }

    #[test]
    fn oversampling_codes_above_five_are_x16() {
        assert_eq!(Oversampling::X16, Oversampling::from(0b111));
        assert_eq!(Oversampling::X16, CtrlHum::decode(&[0b110]).unwrap().osrs_h);
    }

    #[test]
    fn status_decode() {
        let reg = Status::decode(&[0b1000]).unwrap();
        assert_eq!([true, false], [reg.measuring(), reg.nvm_updating()]);

        let reg = Status::decode(&[0b0001]).unwrap();
        assert_eq!([false, true], [reg.measuring(), reg.nvm_updating()]);
    }

    #[test]
    fn reset_encode() {
        let mut buffer = [0u8; 1];
        Reset::encode(&ResetCommand::SoftReset, &mut buffer);
        assert_eq!([0xB6], buffer);
    }
}
