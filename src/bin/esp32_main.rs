//! ESP32 altitude barometer.
//!
//! Brings up the BMP280 on the board's shared I2C bus and logs pressure,
//! temperature and altitude once per sample interval. A failed read is
//! logged and the loop carries on with the next sample.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//!
//! # Flash and monitor
//! espflash flash --monitor target/xtensa-esp32-espidf/release/esp32_main
//! ```

use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use rubik_i2c::devices::Bmp280;
use rubik_i2c::hal::esp32::open_bus;
use rubik_i2c::{deinit, BoardConfig};
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();
    EspLogger::initialize_default();

    let config = BoardConfig::default();
    log::info!("{} altitude barometer", config.name.as_str());

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // I2C bus (GPIO21 SDA / GPIO22 SCL)
    // =========================================================================
    let bus = open_bus(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &config.bus,
    )?;

    let peers = [
        ("AHT20", config.addresses.aht20),
        ("BH1750", config.addresses.bh1750),
        ("PCA9554", config.addresses.pca9554),
    ];
    for (name, address) in peers {
        if bus.probe(address) {
            log::info!("[OK] {} at 0x{:02x}", name, address);
        } else {
            log::info!("[SKIP] {} not found at 0x{:02x}", name, address);
        }
    }

    // =========================================================================
    // Barometer
    // =========================================================================
    // Release and bring up again so a warm restart starts from a clean filter
    let mut baro = Some(Bmp280::init_with(&bus, &config.barometer)?);
    deinit(&mut baro)?;
    let mut baro = Bmp280::init_with(&bus, &config.barometer)?;

    let interval = Duration::from_millis(u64::from(config.barometer.sample_interval_ms));
    log::info!("sampling every {} ms", config.barometer.sample_interval_ms);

    loop {
        match baro.read() {
            Ok(reading) => log::info!(
                "pressure {:.2} hPa, temperature {:.2} C, altitude {:.2} m",
                reading.pressure_hpa,
                reading.temperature_c,
                reading.altitude_m
            ),
            Err(e) => log::warn!("BMP280 read failed: {}", e),
        }
        thread::sleep(interval);
    }
}
