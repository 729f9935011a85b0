//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the bus and delay traits, enabling
//! driver development and testing on a desktop.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockI2c`] | [`I2c`] | Simulated register-file devices with fault injection |
//! | [`MockDelay`] | [`DelayNs`] | Records requested delay instead of sleeping |
//!
//! # Register model
//!
//! Each simulated device has 256 byte registers and a register pointer. The
//! first byte of a write sets the pointer and any following bytes are stored
//! with auto-increment. Reads stream from the pointer, also auto-incrementing.
//! Command-style devices (e.g. BH1750) therefore see their command byte as the
//! pointer, so a test preloads the response at that register.
//!
//! # Example
//!
//! ```rust
//! use rubik_i2c::hal::{MockI2c, MockTransaction};
//! use embedded_hal::i2c::I2c;
//!
//! let mock = MockI2c::new().with_device(0x77);
//! let mut bus = mock.clone();
//!
//! bus.write(0x77, &[0xF4, 0xB3]).unwrap();
//! assert_eq!(mock.registers(0x77, 0xF4, 1), vec![0xB3]);
//!
//! // Absent devices NACK
//! assert!(bus.write(0x10, &[]).is_err());
//!
//! assert_eq!(
//!     mock.transactions()[0],
//!     MockTransaction::Write { address: 0x77, bytes: vec![0xF4, 0xB3] }
//! );
//! ```
//!
//! [`I2c`]: embedded_hal::i2c::I2c
//! [`DelayNs`]: embedded_hal::delay::DelayNs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

// ============================================================================
// I2C Bus Mock
// ============================================================================

/// One recorded bus operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockTransaction {
    /// Write of `bytes` (empty for a liveness probe).
    Write {
        /// Target address.
        address: u8,
        /// Bytes written, register address first.
        bytes: Vec<u8>,
    },
    /// Read of `len` bytes.
    Read {
        /// Target address.
        address: u8,
        /// Number of bytes requested.
        len: usize,
    },
}

impl MockTransaction {
    /// Returns true for a zero-length write (a liveness probe).
    pub fn is_probe(&self) -> bool {
        matches!(self, MockTransaction::Write { bytes, .. } if bytes.is_empty())
    }

    /// Returns the address this operation targeted.
    pub fn address(&self) -> u8 {
        match self {
            MockTransaction::Write { address, .. } | MockTransaction::Read { address, .. } => {
                *address
            }
        }
    }
}

/// Error returned by [`MockI2c`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockI2cError(pub ErrorKind);

impl embedded_hal::i2c::Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct MockDevice {
    registers: [u8; 256],
    pointer: u8,
}

impl Default for MockDevice {
    fn default() -> Self {
        Self {
            registers: [0; 256],
            pointer: 0,
        }
    }
}

impl MockDevice {
    fn write(&mut self, bytes: &[u8]) {
        if let Some((&reg, data)) = bytes.split_first() {
            self.pointer = reg;
            for &b in data {
                self.registers[self.pointer as usize] = b;
                self.pointer = self.pointer.wrapping_add(1);
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = self.registers[self.pointer as usize];
            self.pointer = self.pointer.wrapping_add(1);
        }
    }
}

/// A write to `trigger` on `address` also stores `value` at `target`.
#[derive(Clone, Copy, Debug)]
struct WriteLink {
    address: u8,
    trigger: u8,
    target: u8,
    value: u8,
}

#[derive(Debug, Default)]
struct MockBusState {
    devices: HashMap<u8, MockDevice>,
    log: Vec<MockTransaction>,
    links: Vec<WriteLink>,
    /// Transactions that still succeed before injected failures start.
    ok_before_fail: usize,
    /// Injected failures remaining.
    failures: usize,
}

impl MockBusState {
    fn next_fails(&mut self) -> bool {
        if self.failures == 0 {
            return false;
        }
        if self.ok_before_fail > 0 {
            self.ok_before_fail -= 1;
            return false;
        }
        self.failures -= 1;
        true
    }
}

/// Simulated I2C bus with register-file devices.
///
/// Clones share state, so a test can keep one clone for inspection after
/// moving another into an [`I2cMaster`](crate::bus::I2cMaster).
#[derive(Clone, Debug, Default)]
pub struct MockI2c {
    state: Arc<Mutex<MockBusState>>,
}

impl MockI2c {
    /// Creates a bus with no devices attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a device at `address` (builder form).
    pub fn with_device(self, address: u8) -> Self {
        self.add_device(address);
        self
    }

    /// Attaches a device at `address` with all registers zeroed.
    pub fn add_device(&self, address: u8) {
        self.lock().devices.entry(address).or_default();
    }

    /// Detaches the device at `address`; it stops acknowledging.
    pub fn remove_device(&self, address: u8) {
        self.lock().devices.remove(&address);
    }

    /// Preloads registers starting at `reg`. No-op for unknown addresses.
    pub fn set_registers(&self, address: u8, reg: u8, data: &[u8]) {
        if let Some(dev) = self.lock().devices.get_mut(&address) {
            for (i, &b) in data.iter().enumerate() {
                dev.registers[reg.wrapping_add(i as u8) as usize] = b;
            }
        }
    }

    /// Returns `len` registers starting at `reg` (empty for unknown addresses).
    pub fn registers(&self, address: u8, reg: u8, len: usize) -> Vec<u8> {
        self.lock()
            .devices
            .get(&address)
            .map(|dev| {
                (0..len)
                    .map(|i| dev.registers[reg.wrapping_add(i as u8) as usize])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// After any write that starts at register `trigger`, sets `target` to `value`.
    ///
    /// Models devices whose status changes in response to a command.
    pub fn link_write(&self, address: u8, trigger: u8, target: u8, value: u8) {
        self.lock().links.push(WriteLink {
            address,
            trigger,
            target,
            value,
        });
    }

    /// Makes the next `count` transactions fail with a data NACK.
    pub fn fail_next(&self, count: usize) {
        self.fail_after(0, count);
    }

    /// Lets `successes` transactions through, then fails the next `count`.
    pub fn fail_after(&self, successes: usize, count: usize) {
        let mut state = self.lock();
        state.ok_before_fail = successes;
        state.failures = count;
    }

    /// All operations attempted so far, including failed ones.
    pub fn transactions(&self) -> Vec<MockTransaction> {
        self.lock().log.clone()
    }

    /// Writes to `address` that stored data: register address plus payload.
    ///
    /// Probes and bare register-pointer writes (the first half of a register
    /// read) are left out.
    pub fn register_writes(&self, address: u8) -> Vec<Vec<u8>> {
        self.lock()
            .log
            .iter()
            .filter_map(|t| match t {
                MockTransaction::Write { address: a, bytes } if *a == address && bytes.len() > 1 => {
                    Some(bytes.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Forgets the recorded transactions.
    pub fn clear_transactions(&self) {
        self.lock().log.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockBusState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ErrorType for MockI2c {
    type Error = MockI2cError;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut guard = self.lock();
        let state = &mut *guard;

        for op in operations.iter() {
            state.log.push(match op {
                Operation::Write(bytes) => MockTransaction::Write {
                    address,
                    bytes: bytes.to_vec(),
                },
                Operation::Read(buf) => MockTransaction::Read {
                    address,
                    len: buf.len(),
                },
            });
        }

        if state.next_fails() {
            return Err(MockI2cError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Data,
            )));
        }

        let device = state
            .devices
            .get_mut(&address)
            .ok_or(MockI2cError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )))?;

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    let bytes: &[u8] = *bytes;
                    device.write(bytes);
                    if let Some(&reg) = bytes.first() {
                        for link in state.links.iter() {
                            if link.address == address && link.trigger == reg {
                                device.registers[link.target as usize] = link.value;
                            }
                        }
                    }
                }
                Operation::Read(buf) => device.read(&mut buf[..]),
            }
        }
        Ok(())
    }
}

// ============================================================================
// Delay Mock
// ============================================================================

/// Mock delay that records elapsed time instead of sleeping.
///
/// # Example
///
/// ```rust
/// use rubik_i2c::hal::MockDelay;
/// use embedded_hal::delay::DelayNs;
///
/// let mut delay = MockDelay::new();
/// delay.delay_ms(40);
/// delay.delay_ms(200);
/// assert_eq!(delay.elapsed_ms(), 240);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MockDelay {
    /// Total requested delay in nanoseconds.
    pub elapsed_ns: u64,
}

impl MockDelay {
    /// Creates a delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requested delay in whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_streams_from_pointer() {
        let mut bus = MockI2c::new().with_device(0x20);
        bus.write(0x20, &[0x10, 0xAA, 0xBB]).unwrap();

        let mut buf = [0u8; 2];
        bus.write_read(0x20, &[0x10], &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xBB]);
    }

    #[test]
    fn pointer_wraps_at_end_of_register_file() {
        let mut bus = MockI2c::new().with_device(0x20);
        bus.write(0x20, &[0xFF, 1, 2]).unwrap();
        let check = bus.clone();
        assert_eq!(check.registers(0x20, 0xFF, 2), vec![1, 2]);
        assert_eq!(check.registers(0x20, 0x00, 1), vec![2]);
    }

    #[test]
    fn absent_device_nacks_address() {
        let mut bus = MockI2c::new();
        let err = bus.write(0x42, &[]).unwrap_err();
        assert_eq!(
            err.0,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
    }

    #[test]
    fn fail_after_lets_some_through() {
        let mut bus = MockI2c::new().with_device(0x20);
        bus.clone().fail_after(1, 1);
        assert!(bus.write(0x20, &[0x00, 1]).is_ok());
        assert!(bus.write(0x20, &[0x00, 2]).is_err());
        assert!(bus.write(0x20, &[0x00, 3]).is_ok());
    }

    #[test]
    fn link_write_updates_target() {
        let mut bus = MockI2c::new().with_device(0x38);
        bus.clone().link_write(0x38, 0xBE, 0x71, 0x08);
        bus.write(0x38, &[0xBE, 0x08, 0x00]).unwrap();
        assert_eq!(bus.registers(0x38, 0x71, 1), vec![0x08]);
    }

    #[test]
    fn transactions_record_probes() {
        let mut bus = MockI2c::new().with_device(0x20);
        bus.write(0x20, &[]).unwrap();
        let log = bus.transactions();
        assert_eq!(log.len(), 1);
        assert!(log[0].is_probe());
        assert_eq!(log[0].address(), 0x20);
        assert!(bus.register_writes(0x20).is_empty());
    }
}
