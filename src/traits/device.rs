//! The contract every peripheral driver on the shared bus follows.
//!
//! A driver is created by a fallible `init` that:
//!
//! 1. refuses a closed bus,
//! 2. refuses a bus clock above the device's rated maximum (before any bus
//!    traffic),
//! 3. probes the device address and refuses an absent device,
//! 4. runs device-specific bring-up, returning an error (and no handle) if any
//!    step fails.
//!
//! Steps 1-3 are [`preflight`]. Teardown is [`deinit`], which empties the
//! caller's handle slot and never touches the bus.
//!
//! Drivers borrow their [`I2cMaster`], so the borrow checker rejects any
//! driver that would outlive the bus object itself. Closing the bus while a
//! driver still holds it is allowed; the driver then fails every call with
//! [`Error::BusClosed`].
//!
//! # Example
//!
//! ```rust
//! use rubik_i2c::bus::I2cMaster;
//! use rubik_i2c::config::BusConfig;
//! use rubik_i2c::devices::Pca9554;
//! use rubik_i2c::hal::MockI2c;
//! use rubik_i2c::traits::deinit;
//! use rubik_i2c::Error;
//!
//! let bus = I2cMaster::new(BusConfig::default(), MockI2c::new().with_device(0x20));
//!
//! let mut expander = Some(Pca9554::init(&bus, 0x20).unwrap());
//! assert!(deinit(&mut expander).is_ok());
//! assert!(expander.is_none());
//!
//! // Releasing twice is reported, not a crash
//! assert_eq!(deinit(&mut expander), Err(Error::NotInitialized));
//! ```

use embedded_hal::i2c::I2c;

use crate::bus::I2cMaster;
use crate::error::{Error, Result};

/// Highest bus clock rated for every device in this package.
pub const STANDARD_MAX_CLOCK_HZ: u32 = 400_000;

/// A peripheral driver bound to one address on a shared bus.
pub trait Device {
    /// Short device name used in log messages.
    const NAME: &'static str;

    /// Highest bus clock the device supports.
    const MAX_CLOCK_HZ: u32 = STANDARD_MAX_CLOCK_HZ;

    /// 7-bit address the driver talks to.
    fn address(&self) -> u8;
}

/// Runs the common init gate for device `D` at `address`.
///
/// Checks, in order, that the bus is open, that its clock does not exceed
/// `D::MAX_CLOCK_HZ`, and that the device acknowledges a probe. Only the
/// probe touches the bus.
pub fn preflight<D, B>(bus: &I2cMaster<B>, address: u8) -> Result<()>
where
    D: Device,
    B: I2c,
{
    if !bus.is_open() {
        log::error!("{}: bus is not open", D::NAME);
        return Err(Error::BusClosed);
    }

    let clock_hz = bus.clock_hz();
    if clock_hz > D::MAX_CLOCK_HZ {
        log::error!(
            "{}: I2C supports up to {} Hz, bus runs at {} Hz",
            D::NAME,
            D::MAX_CLOCK_HZ,
            clock_hz
        );
        return Err(Error::ClockTooFast {
            clock_hz,
            max_hz: D::MAX_CLOCK_HZ,
        });
    }

    if !bus.probe(address) {
        log::error!("{}: device not alive at 0x{:02x}", D::NAME, address);
        return Err(Error::DeviceNotFound(address));
    }

    Ok(())
}

/// Releases the driver held in `slot`, leaving `None` behind.
///
/// Only device state is dropped; the bus stays open for other drivers.
///
/// # Errors
///
/// [`Error::NotInitialized`] if the slot was already empty.
pub fn deinit<D: Device>(slot: &mut Option<D>) -> Result<()> {
    match slot.take() {
        Some(device) => {
            log::info!("{}: handle at 0x{:02x} released", D::NAME, device.address());
            Ok(())
        }
        None => {
            log::warn!("{}: deinit on empty handle", D::NAME);
            Err(Error::NotInitialized)
        }
    }
}
