//! Hardware Abstraction Layer implementations.
//!
//! Concrete transports and delays for the drivers in [`crate::devices`].
//!
//! # Available Implementations
//!
//! - `mock`: simulated bus and delay for desktop development and tests
//! - `esp32`: ESP-IDF I2C driver and FreeRTOS delay (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
