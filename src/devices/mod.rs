//! Drivers for the devices on the board's I2C bus.
//!
//! | Driver | Default address | Bring-up |
//! |--------|-----------------|----------|
//! | [`Bmp280`] | 0x77 | calibration load, oversampling, IIR filter |
//! | [`Aht20`] | 0x38 | calibration handshake |
//! | [`Bh1750`] | 0x23 | probe only |
//! | [`Pca9554`] | 0x20 | probe only |
//!
//! Every driver follows the contract in [`crate::traits::device`].

pub mod aht20;
pub mod bh1750;
pub mod bmp280;
pub mod pca9554;

pub use aht20::{Aht20, Aht20Reading};
pub use bh1750::Bh1750;
pub use bmp280::{Bmp280, Bmp280State, Reading};
pub use pca9554::{Level, Pca9554, PinDirection};
