//! Shared I2C master: addressed register transactions over one physical bus.
//!
//! An [`I2cMaster`] owns a transport implementing [`embedded_hal::i2c::I2c`]
//! (the ESP-IDF driver on hardware, [`MockI2c`](crate::hal::MockI2c) on a
//! desktop) and is shared by reference across every device driver on that
//! bus. Drivers borrow it, so none of them can outlive the master.
//!
//! # Locking
//!
//! Each master holds one mutex around its transport. The lock is held for a
//! whole logical register transaction, including read-modify-write sequences
//! such as [`I2cMaster::write_reg_bit`]; two threads updating different bits
//! of the same register never lose each other's write. Single-threaded
//! behavior is identical to an unlocked bus.
//!
//! # Example
//!
//! ```rust
//! use rubik_i2c::bus::I2cMaster;
//! use rubik_i2c::config::BusConfig;
//! use rubik_i2c::hal::MockI2c;
//!
//! let mock = MockI2c::new().with_device(0x20);
//! let bus = I2cMaster::new(BusConfig::default(), mock);
//!
//! assert!(bus.probe(0x20));
//! bus.write_reg(0x20, 0x01, &[0xA5]).unwrap();
//!
//! let mut buf = [0u8; 1];
//! bus.read_reg(0x20, 0x01, &mut buf).unwrap();
//! assert_eq!(buf, [0xA5]);
//!
//! bus.write_reg_bit(0x20, 0x01, 1, true).unwrap();
//! assert_eq!(bus.read_reg_bit(0x20, 0x01, 1), Ok(true));
//! ```

use std::sync::{Mutex, MutexGuard};

use embedded_hal::i2c::I2c;
use heapless::Vec;

use crate::config::BusConfig;
use crate::error::{Error, Result};

/// Largest payload accepted by a single register write.
pub const MAX_WRITE_LEN: usize = 32;

/// One physical I2C bus shared by several device drivers.
pub struct I2cMaster<B> {
    config: BusConfig,
    bus: Mutex<Option<B>>,
}

impl<B: I2c> I2cMaster<B> {
    /// Wraps an already configured transport.
    pub fn new(config: BusConfig, bus: B) -> Self {
        log::info!(
            "I2C{} open: scl={} sda={} clk={}Hz",
            config.port,
            config.scl_pin,
            config.sda_pin,
            config.clock_hz
        );
        Self {
            config,
            bus: Mutex::new(Some(bus)),
        }
    }

    /// Bus parameters this master was opened with.
    #[inline]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Configured bus clock in Hz.
    #[inline]
    pub fn clock_hz(&self) -> u32 {
        self.config.clock_hz
    }

    /// Returns false once [`close`](Self::close) has been called.
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Releases the transport and hands it back to the caller.
    ///
    /// Every driver still borrowing this master gets [`Error::BusClosed`]
    /// from then on.
    ///
    /// # Errors
    ///
    /// [`Error::BusClosed`] if the bus was already closed.
    pub fn close(&self) -> Result<B> {
        match self.lock().take() {
            Some(bus) => {
                log::info!("I2C{} closed", self.config.port);
                Ok(bus)
            }
            None => {
                log::warn!("I2C{} close: bus already closed", self.config.port);
                Err(Error::BusClosed)
            }
        }
    }

    /// Checks whether a device acknowledges its address.
    ///
    /// Issues a zero-length write. A closed bus reports every device absent.
    pub fn probe(&self, address: u8) -> bool {
        match self.lock().as_mut() {
            Some(bus) => bus.write(address, &[]).is_ok(),
            None => false,
        }
    }

    /// Plain read of `buf.len()` bytes, without a register address.
    pub fn read(&self, address: u8, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Err(Error::InvalidParameter("empty read buffer"));
        }
        self.with_bus(|bus| {
            bus.read(address, buf)
                .map_err(|e| Error::transport(address, e))
        })
    }

    /// Plain write of `data`, without a register address.
    pub fn write(&self, address: u8, data: &[u8]) -> Result<()> {
        self.with_bus(|bus| {
            bus.write(address, data)
                .map_err(|e| Error::transport(address, e))
        })
    }

    /// Reads `buf.len()` bytes starting at register `reg`.
    ///
    /// Writes the register address, then reads with a repeated start.
    pub fn read_reg(&self, address: u8, reg: u8, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Err(Error::InvalidParameter("empty read buffer"));
        }
        self.with_bus(|bus| read_reg_on(bus, address, reg, buf))
    }

    /// Writes `data` starting at register `reg` in a single transaction.
    pub fn write_reg(&self, address: u8, reg: u8, data: &[u8]) -> Result<()> {
        let frame = register_frame(reg, data)?;
        self.with_bus(|bus| {
            bus.write(address, &frame)
                .map_err(|e| Error::transport(address, e))
        })
    }

    /// Reads one bit of a register.
    pub fn read_reg_bit(&self, address: u8, reg: u8, bit: u8) -> Result<bool> {
        let mask = bit_mask(bit)?;
        let mut value = [0u8; 1];
        self.read_reg(address, reg, &mut value)?;
        Ok(value[0] & mask != 0)
    }

    /// Sets or clears one bit of a register (read-modify-write).
    pub fn write_reg_bit(&self, address: u8, reg: u8, bit: u8, value: bool) -> Result<()> {
        let mask = bit_mask(bit)?;
        self.update_reg(address, reg, |current| {
            if value {
                current | mask
            } else {
                current & !mask
            }
        })
        .map(|_| ())
    }

    /// Reads a register, applies `f`, and writes the result back.
    ///
    /// The bus stays locked for the whole sequence. Returns the value written.
    pub fn update_reg<F>(&self, address: u8, reg: u8, f: F) -> Result<u8>
    where
        F: FnOnce(u8) -> u8,
    {
        self.with_bus(|bus| {
            let mut current = [0u8; 1];
            read_reg_on(bus, address, reg, &mut current)?;
            let next = f(current[0]);
            bus.write(address, &[reg, next])
                .map_err(|e| Error::transport(address, e))?;
            Ok(next)
        })
    }

    /// Runs `f` with exclusive access to the open transport.
    fn with_bus<T>(&self, f: impl FnOnce(&mut B) -> Result<T>) -> Result<T> {
        let mut guard = self.lock();
        let bus = guard.as_mut().ok_or(Error::BusClosed)?;
        f(bus)
    }

    fn lock(&self) -> MutexGuard<'_, Option<B>> {
        // A panic in another holder cannot leave the transport half-updated
        self.bus.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_reg_on<B: I2c>(bus: &mut B, address: u8, reg: u8, buf: &mut [u8]) -> Result<()> {
    bus.write_read(address, &[reg], buf)
        .map_err(|e| Error::transport(address, e))
}

fn register_frame(reg: u8, data: &[u8]) -> Result<Vec<u8, { MAX_WRITE_LEN + 1 }>> {
    if data.len() > MAX_WRITE_LEN {
        return Err(Error::InvalidParameter("register write longer than 32 bytes"));
    }
    let mut frame = Vec::new();
    // Capacity checked above
    let _ = frame.push(reg);
    let _ = frame.extend_from_slice(data);
    Ok(frame)
}

fn bit_mask(bit: u8) -> Result<u8> {
    if bit > 7 {
        return Err(Error::InvalidParameter("bit index out of range"));
    }
    Ok(1 << bit)
}
