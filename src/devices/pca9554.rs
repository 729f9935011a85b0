//! PCA9554 8-bit GPIO expander.
//!
//! Single-pin operations are read-modify-write cycles on the shared bus and
//! hold the bus lock for the whole cycle, so pins on the same expander can be
//! driven from different threads.
//!
//! # Example
//!
//! ```rust
//! use rubik_i2c::bus::I2cMaster;
//! use rubik_i2c::config::BusConfig;
//! use rubik_i2c::devices::{Level, Pca9554, PinDirection};
//! use rubik_i2c::hal::MockI2c;
//!
//! let mock = MockI2c::new().with_device(0x20);
//! let bus = I2cMaster::new(BusConfig::default(), mock.clone());
//! let io = Pca9554::init(&bus, 0x20).unwrap();
//!
//! io.set_pin_direction(3, PinDirection::Output).unwrap();
//! io.set_pin_level(3, Level::High).unwrap();
//! assert_eq!(mock.registers(0x20, 0x01, 1), vec![0x08]);
//! ```

use embedded_hal::i2c::I2c;

use crate::bus::I2cMaster;
use crate::error::{Error, Result};
use crate::traits::{preflight, Device};

/// Default address (A2..A0 low).
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Register map.
pub mod reg {
    /// Input port (pin levels as read).
    pub const INPUT: u8 = 0x00;
    /// Output port latch.
    pub const OUTPUT: u8 = 0x01;
    /// Input polarity inversion.
    pub const POLARITY: u8 = 0x02;
    /// Direction, 1 = input.
    pub const CONFIG: u8 = 0x03;
}

/// Direction of one expander pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinDirection {
    /// High impedance input.
    Input,
    /// Push-pull output driven from the output latch.
    Output,
}

/// Logic level of one pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Logic 0.
    Low,
    /// Logic 1.
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

/// A GPIO expander that answered its probe.
pub struct Pca9554<'a, B: I2c> {
    bus: &'a I2cMaster<B>,
    address: u8,
}

impl<B: I2c> Device for Pca9554<'_, B> {
    const NAME: &'static str = "PCA9554";

    fn address(&self) -> u8 {
        self.address
    }
}

impl<'a, B: I2c> Pca9554<'a, B> {
    /// Probes the expander. Register state is left as found.
    pub fn init(bus: &'a I2cMaster<B>, address: u8) -> Result<Self> {
        preflight::<Self, B>(bus, address)?;
        log::info!("PCA9554: ready at 0x{:02x}", address);
        Ok(Self { bus, address })
    }

    /// Sets one pin as input or output.
    pub fn set_pin_direction(&self, pin: u8, direction: PinDirection) -> Result<()> {
        check_pin(pin)?;
        self.bus.write_reg_bit(
            self.address,
            reg::CONFIG,
            pin,
            direction == PinDirection::Input,
        )
    }

    /// Drives one output pin.
    pub fn set_pin_level(&self, pin: u8, level: Level) -> Result<()> {
        check_pin(pin)?;
        self.bus
            .write_reg_bit(self.address, reg::OUTPUT, pin, level.into())
    }

    /// Reads the level present on one pin.
    pub fn pin_level(&self, pin: u8) -> Result<Level> {
        check_pin(pin)?;
        self.bus
            .read_reg_bit(self.address, reg::INPUT, pin)
            .map(Level::from)
    }

    /// Writes all eight output latches at once.
    pub fn set_levels(&self, levels: u8) -> Result<()> {
        self.bus.write_reg(self.address, reg::OUTPUT, &[levels])
    }

    /// Reads all eight input levels at once.
    pub fn levels(&self) -> Result<u8> {
        let mut value = [0u8; 1];
        self.bus.read_reg(self.address, reg::INPUT, &mut value)?;
        Ok(value[0])
    }
}

fn check_pin(pin: u8) -> Result<()> {
    if pin > 7 {
        return Err(Error::InvalidParameter("expander pin out of range"));
    }
    Ok(())
}
