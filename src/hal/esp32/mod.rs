//! ESP32 hardware support for the Rubik board.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 (Xtensa dual core)
//! - **Bus**: one I2C master shared by every on-board sensor
//! - **Sensors**: BMP280, AHT20, BH1750FVI, PCA9554 expander
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO and address assignments.

mod i2c;

pub use i2c::{open_bus, Esp32Bus};

/// Blocking delay for driver waits, backed by the FreeRTOS tick.
pub use esp_idf_hal::delay::FreeRtos as Esp32Delay;

/// Pin and address assignments for the Rubik board.
pub mod pins {
    // =========================================================================
    // I2C Bus
    // =========================================================================

    /// I2C clock line
    pub const I2C_SCL: i32 = 22;

    /// I2C data line
    pub const I2C_SDA: i32 = 21;

    // =========================================================================
    // Device Addresses
    // =========================================================================

    /// BMP280 barometer (SDO high)
    pub const BMP280_ADDR: u8 = 0x77;

    /// AHT20 humidity sensor
    pub const AHT20_ADDR: u8 = 0x38;

    /// BH1750 light sensor (ADDR low)
    pub const BH1750_ADDR: u8 = 0x23;

    /// PCA9554 GPIO expander (A2..A0 low)
    pub const PCA9554_ADDR: u8 = 0x20;
}
