use crate::conversion::{le_u16, sign_extend};

/// Trimming parameters burned into the BME280 NVM.
///
/// Parsed once from the two calibration blocks and immutable afterwards. Field names follow the
/// datasheet (`dig_T1` becomes `t1` and so on). Signed fields are stored already sign extended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrimParameters {
    pub t1: u16,
    pub t2: i32,
    pub t3: i32,
    pub p1: u16,
    pub p2: i32,
    pub p3: i32,
    pub p4: i32,
    pub p5: i32,
    pub p6: i32,
    pub p7: i32,
    pub p8: i32,
    pub p9: i32,
    pub h1: u8,
    pub h2: i32,
    pub h3: u8,
    pub h4: i32,
    pub h5: i32,
    pub h6: i32,
}

impl TrimParameters {
    /// Builds the parameter set from the 26-byte block at 0x88 and the 7-byte block at 0xE1.
    pub fn parse(block: &[u8; 26], humidity: &[u8; 7]) -> Self {
        let word = |i: usize| le_u16(block[i], block[i + 1]);
        let signed = |i: usize| sign_extend(word(i) as u32, 16);

        let h4 = (humidity[3] as u32) << 4 | (humidity[4] & 0x0F) as u32;
        let h5 = (humidity[4] >> 4) as u32 | (humidity[5] as u32) << 4;

        Self {
            t1: word(0),
            t2: signed(2),
            t3: signed(4),
            p1: word(6),
            p2: signed(8),
            p3: signed(10),
            p4: signed(12),
            p5: signed(14),
            p6: signed(16),
            p7: signed(18),
            p8: signed(20),
            p9: signed(22),
            // byte 24 is unused
            h1: block[25],
            h2: sign_extend(le_u16(humidity[0], humidity[1]) as u32, 16),
            h3: humidity[2],
            h4: sign_extend(h4, 12),
            h5: sign_extend(h5, 12),
            h6: sign_extend(humidity[6] as u32, 8),
        }
    }

    /// Fine temperature, the intermediate shared by all three compensations.
    pub fn fine_temperature(&self, raw_t: u32) -> f64 {
        let raw_t = raw_t as f64;
        let t1 = self.t1 as f64;

        let var1 = (raw_t / 16384.0 - t1 / 1024.0) * self.t2 as f64;
        let var2 = (raw_t / 131072.0 - t1 / 8192.0)
            * (raw_t / 131072.0 - t1 / 8192.0)
            * self.t3 as f64;

        var1 + var2
    }

    /// Temperature in °C.
    pub fn temperature(&self, t_fine: f64) -> f64 {
        t_fine / 5120.0
    }

    /// Pressure in hPa. Returns 0.0 when the pressure scale term is zero.
    pub fn pressure(&self, raw_p: u32, t_fine: f64) -> f64 {
        let mut var1 = t_fine / 2.0 - 64000.0;
        let mut var2 = (var1 / 4.0) * (var1 / 4.0) / 2048.0 * self.p6 as f64;
        var2 += var1 * self.p5 as f64 * 2.0;
        var2 = var2 / 4.0 + self.p4 as f64 * 65536.0;

        var1 = (self.p3 as f64 * ((var1 / 4.0) * (var1 / 4.0) / 8192.0) / 8.0
            + self.p2 as f64 * var1 / 2.0)
            / 262144.0;
        var1 = (32768.0 + var1) * self.p1 as f64 / 32768.0;

        if var1 == 0.0 {
            return 0.0;
        }

        let mut pressure = ((1048576.0 - raw_p as f64) - var2 / 4096.0) * 3125.0;
        if pressure < 2147483648.0 {
            pressure = pressure * 2.0 / var1;
        } else {
            pressure = pressure / var1 * 2.0;
        }

        let var1 = self.p9 as f64 * ((pressure / 8.0) * (pressure / 8.0) / 8192.0) / 4096.0;
        let var2 = (pressure / 4.0) * self.p8 as f64 / 8192.0;
        pressure += (var1 + var2 + self.p7 as f64) / 16.0;

        pressure / 100.0
    }

    /// Relative humidity in %, clamped to `[0, 100]`.
    pub fn humidity(&self, raw_h: u16, t_fine: f64) -> f64 {
        let h = t_fine - 76800.0;
        if h == 0.0 {
            return 0.0;
        }

        let mut h = (raw_h as f64 - (self.h4 as f64 * 64.0 + self.h5 as f64 / 16384.0 * h))
            * (self.h2 as f64 / 65536.0
                * (1.0 + self.h6 as f64 / 67108864.0 * h * (1.0 + self.h3 as f64 / 67108864.0 * h)));
        h *= 1.0 - self.h1 as f64 * h / 524288.0;

        // NaN lands on 0
        if !(h > 0.0) {
            0.0
        } else if h > 100.0 {
            100.0
        } else {
            h
        }
    }
}
