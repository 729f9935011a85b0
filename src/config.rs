//! Board configuration for the I2C bus and the attached sensors.
//!
//! Uses `heapless::String` for text fields so the same types can be kept in
//! static storage on the target.
//!
//! # Example
//!
//! ```rust
//! use rubik_i2c::config::{BarometerConfig, BoardConfig, BusConfig};
//!
//! // Use defaults (I2C0, SCL=22, SDA=21, 400 kHz)
//! let config = BoardConfig::default();
//! assert_eq!(config.bus.clock_hz, 400_000);
//!
//! // Or customize
//! let config = BoardConfig::default()
//!     .with_bus(BusConfig::default().with_clock_hz(100_000))
//!     .with_barometer(BarometerConfig::default().with_address(0x76));
//! assert_eq!(config.barometer.address, 0x76);
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (board names)
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Stop at the last whole char that fits
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= MAX_SHORT_STRING)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Board Config
// ============================================================================

/// Complete board configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardConfig {
    /// Board name used in log output
    pub name: BoardName,
    /// Shared I2C bus parameters
    pub bus: BusConfig,
    /// Barometer (BMP280) settings
    pub barometer: BarometerConfig,
    /// Device addresses of the remaining peripherals
    pub addresses: Addresses,
}

/// Board name wrapper with a sensible default.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardName(pub ShortString);

impl Default for BoardName {
    fn default() -> Self {
        Self(short_string("rubik-bit"))
    }
}

impl BoardName {
    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl BoardConfig {
    /// Set the board name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = BoardName(short_string(name));
        self
    }

    /// Set bus configuration
    pub fn with_bus(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }

    /// Set barometer configuration
    pub fn with_barometer(mut self, barometer: BarometerConfig) -> Self {
        self.barometer = barometer;
        self
    }

    /// Set peripheral addresses
    pub fn with_addresses(mut self, addresses: Addresses) -> Self {
        self.addresses = addresses;
        self
    }
}

// ============================================================================
// Bus Config
// ============================================================================

/// Physical I2C bus parameters.
///
/// The clock ceiling is not checked here: each device checks the clock
/// against its own rated maximum when it is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusConfig {
    /// I2C controller number
    pub port: u8,
    /// Clock line GPIO
    pub scl_pin: i32,
    /// Data line GPIO
    pub sda_pin: i32,
    /// Bus clock in Hz
    pub clock_hz: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            port: 0,
            scl_pin: 22,
            sda_pin: 21,
            clock_hz: 400_000,
        }
    }
}

impl BusConfig {
    /// Set the controller number
    pub fn with_port(mut self, port: u8) -> Self {
        self.port = port;
        self
    }

    /// Set clock and data pins
    pub fn with_pins(mut self, scl_pin: i32, sda_pin: i32) -> Self {
        self.scl_pin = scl_pin;
        self.sda_pin = sda_pin;
        self
    }

    /// Set the bus clock
    pub fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }
}

// ============================================================================
// Barometer Config
// ============================================================================

/// BMP280 settings
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarometerConfig {
    /// 7-bit device address (0x77 with SDO high, 0x76 with SDO low)
    pub address: u8,
    /// Largest step (hPa) the pressure filter accepts into its window
    pub filter_threshold_hpa: f32,
    /// Interval between samples in the example loop
    pub sample_interval_ms: u32,
}

impl Default for BarometerConfig {
    fn default() -> Self {
        Self {
            address: 0x77,
            filter_threshold_hpa: 0.1,
            sample_interval_ms: 1000,
        }
    }
}

impl BarometerConfig {
    /// Set the device address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the filter rejection threshold (negative values are clamped to 0)
    pub fn with_filter_threshold_hpa(mut self, threshold: f32) -> Self {
        self.filter_threshold_hpa = threshold.max(0.0);
        self
    }

    /// Set the sample interval
    pub fn with_sample_interval_ms(mut self, ms: u32) -> Self {
        self.sample_interval_ms = ms;
        self
    }
}

// ============================================================================
// Peripheral Addresses
// ============================================================================

/// Default 7-bit addresses of the board peripherals
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Addresses {
    /// AHT20 humidity sensor
    pub aht20: u8,
    /// BH1750FVI light sensor
    pub bh1750: u8,
    /// PCA9554 GPIO expander
    pub pca9554: u8,
}

impl Default for Addresses {
    fn default() -> Self {
        Self {
            aht20: 0x38,
            bh1750: 0x23,
            pca9554: 0x20,
        }
    }
}

impl Addresses {
    /// Set the AHT20 address
    pub fn with_aht20(mut self, address: u8) -> Self {
        self.aht20 = address;
        self
    }

    /// Set the BH1750 address (0x23 with ADDR low, 0x5C with ADDR high)
    pub fn with_bh1750(mut self, address: u8) -> Self {
        self.bh1750 = address;
        self
    }

    /// Set the PCA9554 address
    pub fn with_pca9554(mut self, address: u8) -> Self {
        self.pca9554 = address;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.name.as_str(), "rubik-bit");
        assert_eq!(config.bus.port, 0);
        assert_eq!(config.bus.scl_pin, 22);
        assert_eq!(config.bus.sda_pin, 21);
        assert_eq!(config.bus.clock_hz, 400_000);
        assert_eq!(config.barometer.address, 0x77);
    }

    #[test]
    fn short_string_truncation() {
        let long = "a".repeat(100);
        let s = short_string(&long);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn short_string_respects_char_boundary() {
        // 31 ASCII bytes + a 2-byte char does not fit in 32
        let s = format!("{}é", "a".repeat(31));
        let hs = short_string(&s);
        assert_eq!(hs.len(), 31);
    }

    #[test]
    fn builder_pattern() {
        let config = BoardConfig::default()
            .with_name("bench")
            .with_bus(
                BusConfig::default()
                    .with_port(1)
                    .with_pins(5, 4)
                    .with_clock_hz(100_000),
            )
            .with_barometer(
                BarometerConfig::default()
                    .with_address(0x76)
                    .with_sample_interval_ms(250),
            )
            .with_addresses(Addresses::default().with_bh1750(0x5C));

        assert_eq!(config.name.as_str(), "bench");
        assert_eq!(config.bus.port, 1);
        assert_eq!(config.bus.scl_pin, 5);
        assert_eq!(config.bus.sda_pin, 4);
        assert_eq!(config.bus.clock_hz, 100_000);
        assert_eq!(config.barometer.address, 0x76);
        assert_eq!(config.barometer.sample_interval_ms, 250);
        assert_eq!(config.addresses.bh1750, 0x5C);
    }

    #[test]
    fn barometer_defaults() {
        let baro = BarometerConfig::default();
        assert!((baro.filter_threshold_hpa - 0.1).abs() < f32::EPSILON);
        assert_eq!(baro.sample_interval_ms, 1000);
    }

    #[test]
    fn filter_threshold_clamped() {
        let baro = BarometerConfig::default().with_filter_threshold_hpa(-1.0);
        assert_eq!(baro.filter_threshold_hpa, 0.0);
    }

    #[test]
    fn address_defaults() {
        let addrs = Addresses::default();
        assert_eq!(addrs.aht20, 0x38);
        assert_eq!(addrs.bh1750, 0x23);
        assert_eq!(addrs.pca9554, 0x20);
    }
}
