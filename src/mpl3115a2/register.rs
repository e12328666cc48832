use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// Marker struct for OUT_P_MSB..OUT_P_LSB (0x01 - 0x03)
///
/// Altitude in meters or pressure in pascal depending on CTRL_REG1.ALT.
pub struct OutP;
impl Reg for OutP { const ADDR: u8 = 0x01; }

impl Readable for OutP {
    type Out = [u8; 3];
    const N: usize = 3;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok([b[0], b[1], b[2]])
    }
}

/// Marker struct for OUT_T_MSB..OUT_T_LSB (0x04 - 0x05)
pub struct OutT;
impl Reg for OutT { const ADDR: u8 = 0x04; }

impl Readable for OutT {
    type Out = [u8; 2];
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok([b[0], b[1]])
    }
}

/// Marker struct for DR_STATUS (0x07)
pub struct DrStatus;
impl Reg for DrStatus { const ADDR: u8 = 0x07; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrStatusFlags {
    /// Pressure or temperature data overwritten before it was read
    pub pt_overwrite: bool,
    pub pressure_overwrite: bool,
    pub temperature_overwrite: bool,
    /// New pressure or temperature data available
    pub pt_ready: bool,
    pub pressure_ready: bool,
    pub temperature_ready: bool,
}

impl Readable for DrStatus {
    type Out = DrStatusFlags;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(DrStatusFlags {
            pt_overwrite: b[0] & 0x80 != 0,
            pressure_overwrite: b[0] & 0x40 != 0,
            temperature_overwrite: b[0] & 0x20 != 0,
            pt_ready: b[0] & 0x08 != 0,
            pressure_ready: b[0] & 0x04 != 0,
            temperature_ready: b[0] & 0x02 != 0,
        })
    }
}

/// Marker struct for PT_DATA_CFG (0x13)
pub struct PtDataCfg;
impl Reg for PtDataCfg { const ADDR: u8 = 0x13; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PtDataCfgFields {
    /// Data ready event mode
    pub drem: bool,
    /// Event flag on new pressure/altitude data
    pub pdefe: bool,
    /// Event flag on new temperature data
    pub tdefe: bool,
}

impl Readable for PtDataCfg {
    type Out = PtDataCfgFields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(PtDataCfgFields {
            drem: b[0] & 0b100 != 0,
            pdefe: b[0] & 0b010 != 0,
            tdefe: b[0] & 0b001 != 0,
        })
    }
}

impl Writable for PtDataCfg {
    type In = PtDataCfgFields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.drem as u8) << 2 | (v.pdefe as u8) << 1 | v.tdefe as u8;
    }
}

/// Marker struct for CTRL_REG1 (0x26)
pub struct CtrlReg1;
impl Reg for CtrlReg1 { const ADDR: u8 = 0x26; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtrlReg1Fields {
    /// Altimeter mode when set, barometer mode otherwise
    pub alt: bool,
    /// Oversample ratio, 2^os samples
    pub os: u8,
    /// Software reset
    pub rst: bool,
    /// One-shot measurement
    pub ost: bool,
    /// Active mode when set, standby otherwise
    pub sbyb: bool,
}

impl CtrlReg1Fields {
    /// A software reset. The device resets before acknowledging this write.
    pub const RESET: Self = Self { alt: false, os: 0, rst: true, ost: false, sbyb: false };
}

impl Readable for CtrlReg1 {
    type Out = CtrlReg1Fields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlReg1Fields {
            alt: b[0] & 0x80 != 0,
            os: (b[0] >> 3) & 0b111,
            rst: b[0] & 0x04 != 0,
            ost: b[0] & 0x02 != 0,
            sbyb: b[0] & 0x01 != 0,
        })
    }
}

impl Writable for CtrlReg1 {
    type In = CtrlReg1Fields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.alt as u8) << 7
            | (v.os & 0b111) << 3
            | (v.rst as u8) << 2
            | (v.ost as u8) << 1
            | v.sbyb as u8;
    }
}

/// Marker struct for CTRL_REG2 (0x27)
pub struct CtrlReg2;
impl Reg for CtrlReg2 { const ADDR: u8 = 0x27; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtrlReg2Fields {
    /// Load output target values into the alarm registers
    pub load_output: bool,
    pub alarm_select: bool,
    /// Auto-acquisition time step, 2^st seconds
    pub st: u8,
}

impl Readable for CtrlReg2 {
    type Out = CtrlReg2Fields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlReg2Fields {
            load_output: b[0] & 0x20 != 0,
            alarm_select: b[0] & 0x10 != 0,
            st: b[0] & 0x0F,
        })
    }
}

impl Writable for CtrlReg2 {
    type In = CtrlReg2Fields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.load_output as u8) << 5 | (v.alarm_select as u8) << 4 | (v.st & 0x0F);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_reg1_encode() {
        let mut buffer = [0u8; 1];

        CtrlReg1::encode(&CtrlReg1Fields { alt: true, os: 1, rst: false, ost: false, sbyb: true }, &mut buffer);
        assert_eq!([0x89], buffer);

        CtrlReg1::encode(&CtrlReg1Fields::RESET, &mut buffer);
        assert_eq!([0x04], buffer);
    }

    #[test]
    fn ctrl_reg2_roundtrip_fields() {
        let reg = CtrlReg2::decode(&[0x35]).unwrap();

        assert!(reg.load_output);
        assert!(reg.alarm_select);
        assert_eq!(5, reg.st);
    }

    #[test]
    fn dr_status_decode() {
        let flags = DrStatus::decode(&[0x0E]).unwrap();

        assert!(flags.pt_ready && flags.pressure_ready && flags.temperature_ready);
        assert!(!flags.pt_overwrite);
    }
}
