//! Error types shared by the bus transport and every device driver.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors fall into
//! two categories (see [`ErrorCategory`]):
//!
//! - **Precondition** errors are detected at call entry (closed bus, clock
//!   too fast for the device, absent device, malformed arguments) and never
//!   leave resources allocated.
//! - **Transport** errors come from the bus itself (NACK, arbitration loss,
//!   timeout) or from a device that never finishes its bring-up handshake.
//!
//! Nothing in the crate retries. Errors propagate unchanged to the caller.

use embedded_hal::i2c::ErrorKind;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the bus transport and device drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The bus handle has been closed.
    #[error("I2C bus is closed")]
    BusClosed,

    /// The device handle slot is empty (never initialized or already released).
    #[error("driver handle is not initialized")]
    NotInitialized,

    /// The bus clock exceeds the rated maximum of the device.
    #[error("bus clock {clock_hz} Hz exceeds device maximum of {max_hz} Hz")]
    ClockTooFast {
        /// Configured bus clock.
        clock_hz: u32,
        /// Highest clock the device supports.
        max_hz: u32,
    },

    /// No device acknowledged the liveness probe.
    #[error("no device acknowledged at address 0x{0:02x}")]
    DeviceNotFound(u8),

    /// An argument was out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// A bus transaction failed.
    #[error("I2C transaction with 0x{address:02x} failed: {kind}")]
    Transport {
        /// Device address of the failed transaction.
        address: u8,
        /// Bus-level failure reported by the transport.
        kind: ErrorKind,
    },

    /// The device never reported itself calibrated during bring-up.
    #[error("device calibration handshake did not complete")]
    NotCalibrated,

    /// The device stayed busy past the polling budget.
    #[error("device stayed busy")]
    Busy,
}

/// The two error categories of the driver layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Detected synchronously at call entry; nothing was sent on the bus.
    Precondition,
    /// Reported by (or caused by) a bus transaction.
    Transport,
}

impl Error {
    /// Returns the category this error belongs to.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Error::BusClosed
            | Error::NotInitialized
            | Error::ClockTooFast { .. }
            | Error::DeviceNotFound(_)
            | Error::InvalidParameter(_) => ErrorCategory::Precondition,
            Error::Transport { .. } | Error::NotCalibrated | Error::Busy => {
                ErrorCategory::Transport
            }
        }
    }

    /// Returns true if this is a bus-level transport failure.
    pub const fn is_transport(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transport)
    }

    /// Builds a transport error from any `embedded-hal` I2C error.
    pub fn transport<E: embedded_hal::i2c::Error>(address: u8, err: E) -> Self {
        Error::Transport {
            address,
            kind: err.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;

    #[test]
    fn precondition_category() {
        assert_eq!(Error::BusClosed.category(), ErrorCategory::Precondition);
        assert_eq!(Error::NotInitialized.category(), ErrorCategory::Precondition);
        assert_eq!(
            Error::ClockTooFast {
                clock_hz: 1_000_000,
                max_hz: 400_000
            }
            .category(),
            ErrorCategory::Precondition
        );
        assert_eq!(
            Error::DeviceNotFound(0x77).category(),
            ErrorCategory::Precondition
        );
        assert!(!Error::InvalidParameter("bit").is_transport());
    }

    #[test]
    fn transport_category() {
        let err = Error::Transport {
            address: 0x20,
            kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
        };
        assert!(err.is_transport());
        assert!(Error::NotCalibrated.is_transport());
        assert!(Error::Busy.is_transport());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::DeviceNotFound(0x38).to_string(),
            "no device acknowledged at address 0x38"
        );
        assert_eq!(
            Error::ClockTooFast {
                clock_hz: 1_000_000,
                max_hz: 400_000
            }
            .to_string(),
            "bus clock 1000000 Hz exceeds device maximum of 400000 Hz"
        );
    }
}
