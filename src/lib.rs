//! # rubik-i2c
//!
//! Board support for the sensors on an ESP32 board's shared I2C bus: a
//! thread-safe bus master, register helpers, and drivers for a BMP280
//! barometer, an AHT20 hygrometer, a BH1750 light sensor and a PCA9554 GPIO
//! expander.
//!
//! ## Features
//!
//! - **Shared bus**: one [`I2cMaster`] per physical bus, borrowed by every driver
//! - **Atomic bit updates**: read-modify-write cycles hold the bus lock
//! - **Uniform bring-up**: every driver checks bus state, clock ceiling and
//!   presence before touching registers
//! - **Barometric altitude**: BMP280 compensation with a spike-rejecting
//!   moving average
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `bus` - Shared I2C master and register transactions
//! - `traits` - Driver contract (init gate and teardown)
//! - `devices` - Concrete sensor drivers
//! - `config` - Board, bus and barometer configuration
//! - `hal` - Transports (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rubik_i2c::{hal::MockI2c, BusConfig, I2cMaster};
//! use rubik_i2c::devices::Bmp280;
//!
//! // Simulated bus with a barometer at its default address
//! let bus = I2cMaster::new(BusConfig::default(), MockI2c::new().with_device(0x77));
//!
//! let mut baro = Bmp280::init(&bus, 0x77).unwrap();
//! let reading = baro.read().unwrap();
//! println!("{:.2} hPa, {:.1} m", reading.pressure_hpa, reading.altitude_m);
//! ```

#![warn(missing_docs)]

/// Shared I2C master with register-level transactions.
pub mod bus;
/// Board, bus and barometer configuration.
pub mod config;
/// Drivers for the devices on the bus.
pub mod devices;
/// Error type and result alias.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Driver contract shared by every device.
pub mod traits;

// Re-exports for convenience
pub use bus::I2cMaster;
pub use devices::{
    Aht20, Aht20Reading, Bh1750, Bmp280, Bmp280State, Level, Pca9554, PinDirection, Reading,
};
pub use error::{Error, ErrorCategory, Result};
pub use traits::{deinit, preflight, Device};

// Config re-exports
pub use config::{Addresses, BarometerConfig, BoardConfig, BusConfig};
