//! Factory calibration coefficients and the integer compensation formulas.
//!
//! The formulas follow the Bosch BMP280 datasheet (section 8.2): a 32-bit
//! temperature compensation producing `t_fine`, and a 64-bit pressure
//! compensation that consumes it and returns Pa in Q24.8.

/// Size of the calibration block starting at `dig_T1` (register 0x88).
pub const CALIBRATION_LEN: usize = 24;

/// Size of the raw data frame starting at `press_msb` (register 0xF7).
pub const DATA_FRAME_LEN: usize = 6;

/// Factory calibration coefficients, read once at init.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Calibration {
    /// Temperature coefficient T1.
    pub dig_t1: u16,
    /// Temperature coefficient T2.
    pub dig_t2: i16,
    /// Temperature coefficient T3.
    pub dig_t3: i16,
    /// Pressure coefficient P1.
    pub dig_p1: u16,
    /// Pressure coefficient P2.
    pub dig_p2: i16,
    /// Pressure coefficient P3.
    pub dig_p3: i16,
    /// Pressure coefficient P4.
    pub dig_p4: i16,
    /// Pressure coefficient P5.
    pub dig_p5: i16,
    /// Pressure coefficient P6.
    pub dig_p6: i16,
    /// Pressure coefficient P7.
    pub dig_p7: i16,
    /// Pressure coefficient P8.
    pub dig_p8: i16,
    /// Pressure coefficient P9.
    pub dig_p9: i16,
}

/// One raw ADC sample: 20-bit pressure and temperature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    /// Raw pressure (`adc_P`).
    pub pressure: i32,
    /// Raw temperature (`adc_T`).
    pub temperature: i32,
}

impl RawSample {
    /// Decodes the `press_msb..temp_xlsb` frame.
    pub fn from_bytes(frame: &[u8; DATA_FRAME_LEN]) -> Self {
        Self {
            pressure: adc20(frame[0], frame[1], frame[2]),
            temperature: adc20(frame[3], frame[4], frame[5]),
        }
    }
}

fn adc20(msb: u8, lsb: u8, xlsb: u8) -> i32 {
    ((u32::from(msb) << 12) | (u32::from(lsb) << 4) | (u32::from(xlsb) >> 4)) as i32
}

impl Calibration {
    /// Decodes the 24-byte little-endian calibration block.
    pub fn from_bytes(block: &[u8; CALIBRATION_LEN]) -> Self {
        let u = |i: usize| u16::from_le_bytes([block[i], block[i + 1]]);
        let s = |i: usize| i16::from_le_bytes([block[i], block[i + 1]]);
        Self {
            dig_t1: u(0),
            dig_t2: s(2),
            dig_t3: s(4),
            dig_p1: u(6),
            dig_p2: s(8),
            dig_p3: s(10),
            dig_p4: s(12),
            dig_p5: s(14),
            dig_p6: s(16),
            dig_p7: s(18),
            dig_p8: s(20),
            dig_p9: s(22),
        }
    }

    /// Encodes the coefficients back into register layout.
    pub fn to_bytes(&self) -> [u8; CALIBRATION_LEN] {
        let words: [[u8; 2]; 12] = [
            self.dig_t1.to_le_bytes(),
            self.dig_t2.to_le_bytes(),
            self.dig_t3.to_le_bytes(),
            self.dig_p1.to_le_bytes(),
            self.dig_p2.to_le_bytes(),
            self.dig_p3.to_le_bytes(),
            self.dig_p4.to_le_bytes(),
            self.dig_p5.to_le_bytes(),
            self.dig_p6.to_le_bytes(),
            self.dig_p7.to_le_bytes(),
            self.dig_p8.to_le_bytes(),
            self.dig_p9.to_le_bytes(),
        ];
        let mut out = [0u8; CALIBRATION_LEN];
        for (chunk, word) in out.chunks_exact_mut(2).zip(words.iter()) {
            chunk.copy_from_slice(word);
        }
        out
    }

    /// Compensates a raw temperature.
    ///
    /// Returns `(centi_celsius, t_fine)`; `5123` means 51.23 °C. `t_fine` is
    /// the input to [`compensate_pressure`](Self::compensate_pressure) for
    /// the same sample.
    pub fn compensate_temperature(&self, adc_t: i32) -> (i32, i32) {
        // 32-bit arithmetic wraps like the reference C code on the device
        let t1 = i32::from(self.dig_t1);
        let t2 = i32::from(self.dig_t2);
        let t3 = i32::from(self.dig_t3);

        let var1 = ((adc_t >> 3).wrapping_sub(t1 << 1)).wrapping_mul(t2) >> 11;
        let d = (adc_t >> 4).wrapping_sub(t1);
        let var2 = ((d.wrapping_mul(d) >> 12).wrapping_mul(t3)) >> 14;
        let t_fine = var1.wrapping_add(var2);
        let centi = (t_fine.wrapping_mul(5).wrapping_add(128)) >> 8;
        (centi, t_fine)
    }

    /// Compensates a raw pressure using `t_fine` from the same sample.
    ///
    /// Returns Pa in Q24.8 (`24674867` is 96386.2 Pa). Returns 0 when the
    /// first-pass divisor is zero.
    pub fn compensate_pressure(&self, adc_p: i32, t_fine: i32) -> u32 {
        let p1 = i64::from(self.dig_p1);
        let p2 = i64::from(self.dig_p2);
        let p3 = i64::from(self.dig_p3);
        let p4 = i64::from(self.dig_p4);
        let p5 = i64::from(self.dig_p5);
        let p6 = i64::from(self.dig_p6);
        let p7 = i64::from(self.dig_p7);
        let p8 = i64::from(self.dig_p8);
        let p9 = i64::from(self.dig_p9);

        let mut var1 = i64::from(t_fine) - 128_000;
        let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
        var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 17);
        var2 = var2.wrapping_add(p4 << 35);
        var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) >> 8)
            .wrapping_add(var1.wrapping_mul(p2) << 12);
        var1 = ((1i64 << 47).wrapping_add(var1)).wrapping_mul(p1) >> 33;
        if var1 == 0 {
            return 0;
        }

        let mut p = 1_048_576 - i64::from(adc_p);
        p = ((p << 31).wrapping_sub(var2)).wrapping_mul(3125).wrapping_div(var1);
        var1 = p9.wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
        var2 = p8.wrapping_mul(p) >> 19;
        p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add(p7 << 4);
        p as u32
    }
}
