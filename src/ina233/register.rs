//! INA233 PMBus command catalog.
//!
//! PMBus words are transferred low byte first.

use crate::conversion::le_u16;
use crate::register::{InvalidRegisterField, Readable, Reg, Writable};

/// RESTORE_DEFAULT_ALL (0x12), a send-byte command with no payload.
pub const RESTORE_DEFAULT_ALL: u8 = 0x12;

/// Marker struct for CAPABILITY (0x19)
pub struct Capability;
impl Reg for Capability { const ADDR: u8 = 0x19; }

/// Marker struct for STATUS_BYTE (0x78)
pub struct StatusByte;
impl Reg for StatusByte { const ADDR: u8 = 0x78; }

/// Marker struct for STATUS_WORD (0x79)
pub struct StatusWord;
impl Reg for StatusWord { const ADDR: u8 = 0x79; }

/// Marker struct for STATUS_IOUT (0x7B)
pub struct StatusIout;
impl Reg for StatusIout { const ADDR: u8 = 0x7B; }

/// Marker struct for STATUS_INPUT (0x7C)
pub struct StatusInput;
impl Reg for StatusInput { const ADDR: u8 = 0x7C; }

/// Marker struct for STATUS_CML (0x7E), communication faults
pub struct StatusCml;
impl Reg for StatusCml { const ADDR: u8 = 0x7E; }

/// Marker struct for STATUS_MFR_SPECIFIC (0x80)
pub struct StatusMfrSpecific;
impl Reg for StatusMfrSpecific { const ADDR: u8 = 0x80; }

impl Readable for Capability {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(b[0]) }
}

impl Readable for StatusByte {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(b[0]) }
}

impl Readable for StatusWord {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(le_u16(b[0], b[1])) }
}

impl Readable for StatusIout {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(b[0]) }
}

impl Readable for StatusInput {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(b[0]) }
}

impl Readable for StatusCml {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(b[0]) }
}

impl Readable for StatusMfrSpecific {
    type Out = u8;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(b[0]) }
}

/// Marker struct for READ_EIN (0x86)
///
/// - **Length:** 7 bytes (block read)
/// - **Access:** Read-only
///
/// With `read_ein` set in MFR_DEVICE_CONFIG the accumulator and sample count clear on every read.
pub struct ReadEin;
impl Reg for ReadEin { const ADDR: u8 = 0x86; }

/// Energy accumulator snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EinSample {
    /// Power accumulator, in power LSBs
    pub pow_acc: u16,
    /// Number of times `pow_acc` wrapped
    pub rollover: u8,
    /// Number of power samples summed in `pow_acc` (24 bits)
    pub samples: u32,
}

impl Readable for ReadEin {
    type Out = EinSample;
    const N: usize = 7;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        // b[0] is the block byte count / status byte and carries no energy data
        Ok(EinSample {
            pow_acc: le_u16(b[1], b[2]),
            rollover: b[3],
            samples: b[4] as u32 | (b[5] as u32) << 8 | (b[6] as u32) << 16,
        })
    }
}

/// Marker struct for READ_VIN (0x88), bus voltage
pub struct ReadVin;
impl Reg for ReadVin { const ADDR: u8 = 0x88; }

/// Marker struct for READ_IIN (0x89), signed input current
pub struct ReadIin;
impl Reg for ReadIin { const ADDR: u8 = 0x89; }

/// Marker struct for READ_PIN (0x97), input power
pub struct ReadPin;
impl Reg for ReadPin { const ADDR: u8 = 0x97; }

/// Marker struct for MFR_REVISION (0x9B)
pub struct MfrRevision;
impl Reg for MfrRevision { const ADDR: u8 = 0x9B; }

impl Readable for ReadVin {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(le_u16(b[0], b[1])) }
}

impl Readable for ReadIin {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(le_u16(b[0], b[1])) }
}

impl Readable for ReadPin {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(le_u16(b[0], b[1])) }
}

impl Readable for MfrRevision {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(le_u16(b[0], b[1])) }
}

/// Marker struct for MFR_ID (0x99), three ASCII characters
pub struct MfrId;
impl Reg for MfrId { const ADDR: u8 = 0x99; }

impl Readable for MfrId {
    type Out = [u8; 3];
    const N: usize = 3;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok([b[0], b[1], b[2]])
    }
}

/// Marker struct for MFR_MODEL (0x9A), seven ASCII characters
pub struct MfrModel;
impl Reg for MfrModel { const ADDR: u8 = 0x9A; }

impl Readable for MfrModel {
    type Out = [u8; 7];
    const N: usize = 7;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut out = [0u8; 7];
        out.copy_from_slice(b);
        Ok(out)
    }
}

/// Marker struct for MFR_ADC_CONFIG (0xD0)
///
/// - **Length:** 2 bytes
/// - **Access:** Read/Write
pub struct MfrAdcConfig;
impl Reg for MfrAdcConfig { const ADDR: u8 = 0xD0; }

/// Bits 15:12 are reserved and must be written as 0b0100.
const ADC_CONFIG_RESERVED: u16 = 0x4 << 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcConfigFields {
    pub averaging: Averaging,
    pub bus_conversion_time: ConversionTime,
    pub shunt_conversion_time: ConversionTime,
    pub mode: OperatingMode,
}

impl Readable for MfrAdcConfig {
    type Out = AdcConfigFields;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let word = le_u16(b[0], b[1]);
        let field = |shift: u16| ((word >> shift) & 0b111) as u8;

        Ok(AdcConfigFields {
            averaging: Averaging::from(field(9)),
            bus_conversion_time: ConversionTime::from(field(6)),
            shunt_conversion_time: ConversionTime::from(field(3)),
            mode: OperatingMode::from(field(0)),
        })
    }
}

impl Writable for MfrAdcConfig {
    type In = AdcConfigFields;
    const N: usize = 2;
    fn encode(v: &Self::In, out: &mut [u8]) {
        let word = ADC_CONFIG_RESERVED
            | (u8::from(v.averaging) as u16) << 9
            | (u8::from(v.bus_conversion_time) as u16) << 6
            | (u8::from(v.shunt_conversion_time) as u16) << 3
            | u8::from(v.mode) as u16;
        out.copy_from_slice(&word.to_le_bytes());
    }
}

/// Marker struct for MFR_CALIBRATION (0xD4)
///
/// Only the low 15 bits are used.
pub struct MfrCalibration;
impl Reg for MfrCalibration { const ADDR: u8 = 0xD4; }

impl Readable for MfrCalibration {
    type Out = u16;
    const N: usize = 2;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> { Ok(le_u16(b[0], b[1])) }
}

impl Writable for MfrCalibration {
    type In = u16;
    const N: usize = 2;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out.copy_from_slice(&(v & 0x7FFF).to_le_bytes());
    }
}

/// Marker struct for MFR_DEVICE_CONFIG (0xD5)
pub struct MfrDeviceConfig;
impl Reg for MfrDeviceConfig { const ADDR: u8 = 0xD5; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfigFields {
    /// Energy accumulator overflow status
    pub ein_status: bool,
    pub ein_accum: Accumulation,
    /// Input filter on the I2C lines
    pub i2c_filter: bool,
    /// Clear the energy accumulator on every READ_EIN
    pub read_ein: bool,
    /// Enable the ALERT pin
    pub alert: bool,
    /// ALERT pin polarity, `true` is active high
    pub alert_polarity: bool,
}

impl Readable for MfrDeviceConfig {
    type Out = DeviceConfigFields;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(DeviceConfigFields {
            ein_status: b[0] & (1 << 7) != 0,
            ein_accum: Accumulation::from((b[0] >> 4) & 0b11),
            i2c_filter: b[0] & (1 << 3) != 0,
            read_ein: b[0] & (1 << 2) != 0,
            alert: b[0] & (1 << 1) != 0,
            alert_polarity: b[0] & 1 != 0,
        })
    }
}

impl Writable for MfrDeviceConfig {
    type In = DeviceConfigFields;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (v.ein_status as u8) << 7
            | u8::from(v.ein_accum) << 4
            | (v.i2c_filter as u8) << 3
            | (v.read_ein as u8) << 2
            | (v.alert as u8) << 1
            | v.alert_polarity as u8;
    }
}

/// Number of ADC samples averaged per result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Averaging {
    X1,
    X4,
    X16,
    X64,
    X128,
    X256,
    X512,
    X1024,
}

impl From<u8> for Averaging {
    fn from(field: u8) -> Self {
        match field & 0b111 {
            0 => Averaging::X1,
            1 => Averaging::X4,
            2 => Averaging::X16,
            3 => Averaging::X64,
            4 => Averaging::X128,
            5 => Averaging::X256,
            6 => Averaging::X512,
            _ => Averaging::X1024,
        }
    }
}

impl From<Averaging> for u8 {
    fn from(value: Averaging) -> Self {
        value as u8
    }
}

/// ADC conversion time, shared by the bus and shunt voltage fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionTime {
    Us140,
    Us204,
    Us332,
    Us588,
    Us1100,
    Us2116,
    Us4156,
    Us8244,
}

impl From<u8> for ConversionTime {
    fn from(field: u8) -> Self {
        match field & 0b111 {
            0 => ConversionTime::Us140,
            1 => ConversionTime::Us204,
            2 => ConversionTime::Us332,
            3 => ConversionTime::Us588,
            4 => ConversionTime::Us1100,
            5 => ConversionTime::Us2116,
            6 => ConversionTime::Us4156,
            _ => ConversionTime::Us8244,
        }
    }
}

impl From<ConversionTime> for u8 {
    fn from(value: ConversionTime) -> Self {
        value as u8
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    PowerDown,
    ShuntTriggered,
    BusTriggered,
    ShuntAndBusTriggered,
    ShuntContinuous,
    BusContinuous,
    ShuntAndBusContinuous,
}

impl From<u8> for OperatingMode {
    fn from(field: u8) -> Self {
        match field & 0b111 {
            // 0b100 is a second power-down code
            0 | 4 => OperatingMode::PowerDown,
            1 => OperatingMode::ShuntTriggered,
            2 => OperatingMode::BusTriggered,
            3 => OperatingMode::ShuntAndBusTriggered,
            5 => OperatingMode::ShuntContinuous,
            6 => OperatingMode::BusContinuous,
            _ => OperatingMode::ShuntAndBusContinuous,
        }
    }
}

impl From<OperatingMode> for u8 {
    fn from(value: OperatingMode) -> Self {
        match value {
            OperatingMode::PowerDown => 0,
            OperatingMode::ShuntTriggered => 1,
            OperatingMode::BusTriggered => 2,
            OperatingMode::ShuntAndBusTriggered => 3,
            OperatingMode::ShuntContinuous => 5,
            OperatingMode::BusContinuous => 6,
            OperatingMode::ShuntAndBusContinuous => 7,
        }
    }
}

/// Which power samples are summed into the energy accumulator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Accumulation {
    All,
    PositiveOnly,
    NegativeOnly,
}

impl From<u8> for Accumulation {
    fn from(field: u8) -> Self {
        match field & 0b11 {
            0b01 => Accumulation::PositiveOnly,
            0b10 => Accumulation::NegativeOnly,
            _ => Accumulation::All,
        }
    }
}

impl From<Accumulation> for u8 {
    fn from(value: Accumulation) -> Self {
        match value {
            Accumulation::All => 0b00,
            Accumulation::PositiveOnly => 0b01,
            Accumulation::NegativeOnly => 0b10,
        }
    }
}
