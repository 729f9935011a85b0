//! AHT20 humidity and temperature sensor.
//!
//! The sensor needs a calibration handshake after power-up. [`Aht20::init`]
//! runs it and only returns a handle once the status register reports the
//! device calibrated.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::I2cMaster;
use crate::error::{Error, Result};
use crate::traits::{preflight, Device};

/// Default address.
pub const DEFAULT_ADDRESS: u8 = 0x38;

const REG_STATUS: u8 = 0x71;
const CMD_INIT: u8 = 0xBE;
const CMD_SOFT_RESET: u8 = 0xBA;
const CMD_TRIGGER: u8 = 0xAC;

const STATUS_CALIBRATED: u8 = 1 << 3;
const STATUS_BUSY: u8 = 1 << 7;

const RESET_ROUNDS: usize = 2;
const INIT_ATTEMPTS: usize = 2;
const BUSY_POLLS: usize = 10;

/// Full-scale value of the 20-bit outputs.
const FULL_SCALE: f32 = (1u32 << 20) as f32;

/// One humidity / temperature measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aht20Reading {
    /// Relative humidity in percent.
    pub humidity_pct: f32,
    /// Temperature in °C.
    pub temperature_c: f32,
}

impl Aht20Reading {
    /// Converts the 5 data bytes following the status byte.
    pub fn from_bytes(data: &[u8; 5]) -> Self {
        let humidity =
            (u32::from(data[0]) << 12) | (u32::from(data[1]) << 4) | (u32::from(data[2]) >> 4);
        let temperature =
            (u32::from(data[2] & 0x0F) << 16) | (u32::from(data[3]) << 8) | u32::from(data[4]);
        Self {
            humidity_pct: humidity as f32 / FULL_SCALE * 100.0,
            temperature_c: temperature as f32 / FULL_SCALE * 200.0 - 50.0,
        }
    }
}

/// A calibrated AHT20.
pub struct Aht20<'a, B: I2c> {
    bus: &'a I2cMaster<B>,
    address: u8,
}

impl<B: I2c> Device for Aht20<'_, B> {
    const NAME: &'static str = "AHT20";

    fn address(&self) -> u8 {
        self.address
    }
}

impl<'a, B: I2c> Aht20<'a, B> {
    /// Probes the sensor and runs the calibration handshake.
    ///
    /// # Errors
    ///
    /// [`Error::NotCalibrated`] if the calibrated bit never comes up, plus
    /// the usual preflight and transport errors.
    pub fn init(bus: &'a I2cMaster<B>, address: u8, delay: &mut impl DelayNs) -> Result<Self> {
        preflight::<Self, B>(bus, address)?;
        let sensor = Self { bus, address };

        for round in 0..RESET_ROUNDS {
            delay.delay_ms(40);

            let mut attempts = 0;
            while !sensor.is_calibrated()? && attempts < INIT_ATTEMPTS {
                delay.delay_ms(10);
                bus.write_reg(address, CMD_INIT, &[0x08, 0x00])?;
                delay.delay_ms(200);
                attempts += 1;
            }

            if sensor.is_calibrated()? {
                delay.delay_ms(200);
                log::info!("AHT20: calibrated at 0x{:02x}", address);
                return Ok(sensor);
            }

            log::warn!("AHT20: not calibrated, soft reset (round {})", round + 1);
            bus.write_reg(address, CMD_SOFT_RESET, &[0x00])?;
            delay.delay_ms(200);
        }

        log::error!("AHT20: calibration failed");
        Err(Error::NotCalibrated)
    }

    /// Reads the status register.
    pub fn status(&self) -> Result<u8> {
        let mut status = [0u8; 1];
        self.bus.read_reg(self.address, REG_STATUS, &mut status)?;
        Ok(status[0])
    }

    /// Returns true once the calibration bit is set.
    pub fn is_calibrated(&self) -> Result<bool> {
        Ok(self.status()? & STATUS_CALIBRATED != 0)
    }

    /// Triggers a measurement and waits for the result.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] if the busy bit is still set after 10 polls.
    pub fn measure(&self, delay: &mut impl DelayNs) -> Result<Aht20Reading> {
        self.bus.write_reg(self.address, CMD_TRIGGER, &[0x33, 0x00])?;
        delay.delay_ms(80);

        let mut frame = [0u8; 6];
        self.bus.read_reg(self.address, REG_STATUS, &mut frame)?;
        let mut polls = 0;
        while frame[0] & STATUS_BUSY != 0 {
            if polls == BUSY_POLLS {
                log::warn!("AHT20: measurement still busy");
                return Err(Error::Busy);
            }
            delay.delay_ms(10);
            self.bus.read_reg(self.address, REG_STATUS, &mut frame)?;
            polls += 1;
        }

        let mut data = [0u8; 5];
        data.copy_from_slice(&frame[1..]);
        Ok(Aht20Reading::from_bytes(&data))
    }
}
