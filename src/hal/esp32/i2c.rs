//! ESP-IDF I2C master driver wired into [`I2cMaster`].
//!
//! # Wiring
//!
//! - SDA → GPIO21
//! - SCL → GPIO22
//! - 400 kHz, internal pull-ups enabled

use esp_idf_hal::gpio::{InputPin, OutputPin};
use esp_idf_hal::i2c::{I2c, I2cConfig, I2cDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::units::Hertz;
use esp_idf_sys::EspError;

use crate::bus::I2cMaster;
use crate::config::BusConfig;

/// Bus master backed by the ESP-IDF driver.
pub type Esp32Bus<'d> = I2cMaster<I2cDriver<'d>>;

/// Installs the ESP-IDF driver for one controller and wraps it in a master.
///
/// `config.sda_pin` and `config.scl_pin` are informational here; the pins
/// actually used are the peripherals passed in.
///
/// # Errors
///
/// Returns the ESP-IDF error if the driver cannot be installed (invalid pin
/// or controller already in use).
pub fn open_bus<'d, I2C: I2c>(
    i2c: impl Peripheral<P = I2C> + 'd,
    sda: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
    scl: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
    config: &BusConfig,
) -> Result<Esp32Bus<'d>, EspError> {
    let driver_config = I2cConfig::new()
        .baudrate(Hertz(config.clock_hz))
        .sda_enable_pullup(true)
        .scl_enable_pullup(true);

    let driver = I2cDriver::new(i2c, sda, scl, &driver_config)?;
    Ok(I2cMaster::new(*config, driver))
}
