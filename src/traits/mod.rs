//! Trait definitions shared by the device drivers.
//!
//! # Submodules
//!
//! - `device`: the init / deinit contract every peripheral driver follows
//!
//! The bus itself is abstracted by [`embedded_hal::i2c::I2c`] and blocking
//! waits by [`embedded_hal::delay::DelayNs`], so the same drivers run on the
//! ESP-IDF transport and on the desktop mocks in [`crate::hal::mock`].

pub mod device;

pub use device::*;
