//! BH1750FVI ambient light sensor.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::I2cMaster;
use crate::error::Result;
use crate::traits::{preflight, Device};

/// Default address (ADDR pin low).
pub const DEFAULT_ADDRESS: u8 = 0x23;

const CMD_POWER_ON: u8 = 0x01;
const CMD_CONTINUOUS_HIGH_RES: u8 = 0x10;

/// Worst-case high resolution conversion time.
const MEASUREMENT_MS: u32 = 200;

/// Counts per lux at the default measurement time.
const COUNTS_PER_LUX: f32 = 1.2;

/// An ambient light sensor that answered its probe.
pub struct Bh1750<'a, B: I2c> {
    bus: &'a I2cMaster<B>,
    address: u8,
}

impl<B: I2c> Device for Bh1750<'_, B> {
    const NAME: &'static str = "BH1750";

    fn address(&self) -> u8 {
        self.address
    }
}

impl<'a, B: I2c> Bh1750<'a, B> {
    /// Probes the sensor. No commands are sent until the first reading.
    pub fn init(bus: &'a I2cMaster<B>, address: u8) -> Result<Self> {
        preflight::<Self, B>(bus, address)?;
        log::info!("BH1750: ready at 0x{:02x}", address);
        Ok(Self { bus, address })
    }

    /// Powers on, starts a high resolution conversion and reads it.
    pub fn read_lux(&self, delay: &mut impl DelayNs) -> Result<f32> {
        self.bus.write(self.address, &[CMD_POWER_ON])?;
        self.bus.write(self.address, &[CMD_CONTINUOUS_HIGH_RES])?;
        delay.delay_ms(MEASUREMENT_MS);

        let mut raw = [0u8; 2];
        self.bus.read(self.address, &mut raw)?;
        Ok(counts_to_lux(u16::from_be_bytes(raw)))
    }
}

/// Converts a raw big-endian count to lux.
pub fn counts_to_lux(counts: u16) -> f32 {
    f32::from(counts) / COUNTS_PER_LUX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_scale() {
        assert_eq!(counts_to_lux(0), 0.0);
        assert!((counts_to_lux(120) - 100.0).abs() < 1e-3);
    }
}
