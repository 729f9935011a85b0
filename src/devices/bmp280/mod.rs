//! BMP280 barometric pressure and temperature sensor.
//!
//! # Pipeline
//!
//! | Stage | Where | Output |
//! |-------|-------|--------|
//! | Calibration load | [`Bmp280::init`] | [`Calibration`] (24 bytes at 0x88) |
//! | Raw sample | [`Bmp280::read_raw`] | [`RawSample`] (6 bytes at 0xF7) |
//! | Temperature | [`Calibration::compensate_temperature`] | centi-°C and `t_fine` |
//! | Pressure | [`Calibration::compensate_pressure`] | Pa in Q24.8 |
//! | Smoothing | [`LimitingAverageFilter`] | hPa |
//! | Altitude | [`pressure_to_altitude`] | meters |
//!
//! A handle is only returned once calibration is loaded and the measurement
//! registers are configured, so compensation never runs on missing
//! coefficients.
//!
//! # Example
//!
//! ```rust
//! use rubik_i2c::bus::I2cMaster;
//! use rubik_i2c::config::BusConfig;
//! use rubik_i2c::devices::bmp280::{Bmp280, Bmp280State};
//! use rubik_i2c::hal::MockI2c;
//!
//! let mock = MockI2c::new().with_device(0x77);
//! let bus = I2cMaster::new(BusConfig::default(), mock.clone());
//!
//! let mut sensor = Bmp280::init(&bus, 0x77).unwrap();
//! assert_eq!(sensor.state(), Bmp280State::Ready);
//! assert_eq!(mock.registers(0x77, 0xF4, 2), vec![0xB3, 0x14]);
//!
//! // All-zero calibration compensates to zero pressure and altitude
//! let reading = sensor.read().unwrap();
//! assert_eq!(reading.pressure_hpa, 0.0);
//! assert_eq!(reading.altitude_m, 0.0);
//! ```

mod calibration;
mod filter;
mod pipeline;

pub use calibration::{Calibration, RawSample, CALIBRATION_LEN, DATA_FRAME_LEN};
pub use filter::{LimitingAverageFilter, DEFAULT_FILTER_LEN, DEFAULT_THRESHOLD_HPA};
pub use pipeline::{pressure_to_altitude, Pipeline, Reading, REFERENCE_TEMP_C, SEA_LEVEL_HPA};

use embedded_hal::i2c::I2c;

use crate::bus::I2cMaster;
use crate::config::BarometerConfig;
use crate::error::Result;
use crate::traits::{preflight, Device};

/// Default address (SDO pulled high).
pub const DEFAULT_ADDRESS: u8 = 0x77;

/// Register map.
pub mod reg {
    /// First calibration register (`dig_T1` LSB).
    pub const CALIB_00: u8 = 0x88;
    /// Measurement control: oversampling and power mode.
    pub const CTRL_MEAS: u8 = 0xF4;
    /// Standby time and IIR filter.
    pub const CONFIG: u8 = 0xF5;
    /// First data register (`press_msb`).
    pub const PRESS_MSB: u8 = 0xF7;
}

/// Pressure ×8, temperature ×16, normal mode.
pub const CTRL_MEAS_VALUE: u8 = (0b100 << 2) | (0b101 << 5) | 0b11;

/// 0.5 ms standby, IIR coefficient 16.
pub const CONFIG_VALUE: u8 = 0x14;

/// Bring-up progress of a sensor handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bmp280State {
    /// Nothing read from the device yet.
    Uninitialized,
    /// Coefficients loaded, measurement not configured.
    CalibrationLoaded,
    /// Configured and sampling.
    Ready,
}

/// A configured BMP280 on a shared bus.
pub struct Bmp280<'a, B: I2c> {
    bus: &'a I2cMaster<B>,
    address: u8,
    pipeline: Pipeline,
    state: Bmp280State,
}

impl<B: I2c> Device for Bmp280<'_, B> {
    const NAME: &'static str = "BMP280";

    fn address(&self) -> u8 {
        self.address
    }
}

impl<'a, B: I2c> Bmp280<'a, B> {
    /// Brings up the sensor at `address` with the default filter.
    pub fn init(bus: &'a I2cMaster<B>, address: u8) -> Result<Self> {
        Self::bring_up(bus, address, LimitingAverageFilter::default())
    }

    /// Brings up the sensor using board configuration.
    pub fn init_with(bus: &'a I2cMaster<B>, config: &BarometerConfig) -> Result<Self> {
        Self::bring_up(
            bus,
            config.address,
            LimitingAverageFilter::new(config.filter_threshold_hpa),
        )
    }

    fn bring_up(
        bus: &'a I2cMaster<B>,
        address: u8,
        filter: LimitingAverageFilter,
    ) -> Result<Self> {
        preflight::<Self, B>(bus, address)?;

        let mut state = Bmp280State::Uninitialized;
        let calibration = read_calibration(bus, address).inspect_err(|e| {
            log::error!("BMP280: calibration read failed in {:?}: {}", state, e);
        })?;
        state = Bmp280State::CalibrationLoaded;
        log::debug!("BMP280: calibration {:?}", calibration);

        bus.write_reg(address, reg::CTRL_MEAS, &[CTRL_MEAS_VALUE])
            .and_then(|()| bus.write_reg(address, reg::CONFIG, &[CONFIG_VALUE]))
            .inspect_err(|e| {
                log::error!("BMP280: configuration failed in {:?}: {}", state, e);
            })?;
        state = Bmp280State::Ready;

        log::info!("BMP280: ready at 0x{:02x}", address);
        Ok(Self {
            bus,
            address,
            pipeline: Pipeline::with_filter(calibration, filter),
            state,
        })
    }

    /// Reads one sample and returns compensated, filtered values.
    ///
    /// A failed bus read leaves the filter untouched.
    pub fn read(&mut self) -> Result<Reading> {
        let raw = self.read_raw()?;
        Ok(self.pipeline.process(raw))
    }

    /// Reads the raw ADC values without compensation.
    pub fn read_raw(&self) -> Result<RawSample> {
        let mut frame = [0u8; DATA_FRAME_LEN];
        self.bus.read_reg(self.address, reg::PRESS_MSB, &mut frame)?;
        Ok(RawSample::from_bytes(&frame))
    }

    /// Coefficients loaded at init.
    pub fn calibration(&self) -> &Calibration {
        self.pipeline.calibration()
    }

    /// Pressure filter of this handle.
    pub fn filter(&self) -> &LimitingAverageFilter {
        self.pipeline.filter()
    }

    /// Bring-up state.
    pub fn state(&self) -> Bmp280State {
        self.state
    }
}

fn read_calibration<B: I2c>(bus: &I2cMaster<B>, address: u8) -> Result<Calibration> {
    let mut block = [0u8; CALIBRATION_LEN];
    bus.read_reg(address, reg::CALIB_00, &mut block)?;
    Ok(Calibration::from_bytes(&block))
}
