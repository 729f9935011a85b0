//! AHT20, BH1750 and PCA9554 drivers through the mock bus

use rubik_i2c::hal::{MockDelay, MockI2c, MockTransaction};
use rubik_i2c::{
    deinit, Aht20, Bh1750, BusConfig, Device, Error, I2cMaster, Level, Pca9554, PinDirection,
};

fn open(mock: &MockI2c) -> I2cMaster<MockI2c> {
    I2cMaster::new(BusConfig::default(), mock.clone())
}

// ============================================================================
// AHT20
// ============================================================================

const AHT20: u8 = 0x38;

#[test]
fn aht20_already_calibrated_skips_handshake() {
    let mock = MockI2c::new().with_device(AHT20);
    mock.set_registers(AHT20, 0x71, &[0x08]);
    let bus = open(&mock);
    let mut delay = MockDelay::new();

    let sensor = Aht20::init(&bus, AHT20, &mut delay).unwrap();

    assert_eq!(sensor.address(), AHT20);
    assert!(mock.register_writes(AHT20).is_empty());
    assert_eq!(delay.elapsed_ms(), 240);
}

#[test]
fn aht20_init_command_sets_calibration() {
    let mock = MockI2c::new().with_device(AHT20);
    mock.link_write(AHT20, 0xBE, 0x71, 0x08);
    let bus = open(&mock);
    let mut delay = MockDelay::new();

    assert!(Aht20::init(&bus, AHT20, &mut delay).is_ok());

    assert_eq!(mock.register_writes(AHT20), vec![vec![0xBE, 0x08, 0x00]]);
    assert_eq!(delay.elapsed_ms(), 40 + 10 + 200 + 200);
}

#[test]
fn aht20_never_calibrated_gives_up_after_two_resets() {
    let mock = MockI2c::new().with_device(AHT20);
    let bus = open(&mock);
    let mut delay = MockDelay::new();

    let result = Aht20::init(&bus, AHT20, &mut delay);

    assert_eq!(result.err(), Some(Error::NotCalibrated));
    let init = vec![0xBE, 0x08, 0x00];
    let reset = vec![0xBA, 0x00];
    assert_eq!(
        mock.register_writes(AHT20),
        vec![
            init.clone(),
            init.clone(),
            reset.clone(),
            init.clone(),
            init,
            reset
        ]
    );
}

#[test]
fn aht20_measurement_converts_frame() {
    let mock = MockI2c::new().with_device(AHT20);
    mock.set_registers(AHT20, 0x71, &[0x08, 0x80, 0x00, 0x08, 0x00, 0x00]);
    let bus = open(&mock);
    let mut delay = MockDelay::new();
    let sensor = Aht20::init(&bus, AHT20, &mut delay).unwrap();
    mock.clear_transactions();

    let reading = sensor.measure(&mut delay).unwrap();

    assert_eq!(reading.humidity_pct, 50.0);
    assert_eq!(reading.temperature_c, 50.0);
    assert_eq!(mock.register_writes(AHT20), vec![vec![0xAC, 0x33, 0x00]]);
}

#[test]
fn aht20_stuck_busy_times_out() {
    let mock = MockI2c::new().with_device(AHT20);
    mock.set_registers(AHT20, 0x71, &[0x88]);
    let bus = open(&mock);
    let mut delay = MockDelay::new();
    let sensor = Aht20::init(&bus, AHT20, &mut delay).unwrap();
    mock.clear_transactions();
    let mut delay = MockDelay::new();

    assert_eq!(sensor.measure(&mut delay).err(), Some(Error::Busy));

    let reads = mock
        .transactions()
        .iter()
        .filter(|t| matches!(t, MockTransaction::Read { len: 6, .. }))
        .count();
    assert_eq!(reads, 11);
    assert_eq!(delay.elapsed_ms(), 80 + 10 * 10);
}

#[test]
fn aht20_absent_device() {
    let mock = MockI2c::new();
    let bus = open(&mock);
    let mut delay = MockDelay::new();

    assert_eq!(
        Aht20::init(&bus, AHT20, &mut delay).err(),
        Some(Error::DeviceNotFound(AHT20))
    );
    assert_eq!(delay.elapsed_ns, 0);
}

// ============================================================================
// BH1750
// ============================================================================

const BH1750: u8 = 0x23;

#[test]
fn bh1750_reads_lux() {
    let mock = MockI2c::new().with_device(BH1750);
    // Raw count 300 served after the measurement command
    mock.set_registers(BH1750, 0x10, &[0x01, 0x2C]);
    let bus = open(&mock);
    let sensor = Bh1750::init(&bus, BH1750).unwrap();
    mock.clear_transactions();
    let mut delay = MockDelay::new();

    let lux = sensor.read_lux(&mut delay).unwrap();

    assert!((lux - 250.0).abs() < 1e-3);
    assert_eq!(delay.elapsed_ms(), 200);
    assert_eq!(
        mock.transactions(),
        vec![
            MockTransaction::Write {
                address: BH1750,
                bytes: vec![0x01]
            },
            MockTransaction::Write {
                address: BH1750,
                bytes: vec![0x10]
            },
            MockTransaction::Read {
                address: BH1750,
                len: 2
            },
        ]
    );
}

#[test]
fn bh1750_init_sends_no_commands() {
    let mock = MockI2c::new().with_device(BH1750);
    let bus = open(&mock);

    let mut slot = Some(Bh1750::init(&bus, BH1750).unwrap());

    assert!(mock.transactions().iter().all(MockTransaction::is_probe));
    assert_eq!(deinit(&mut slot), Ok(()));
    assert_eq!(deinit(&mut slot), Err(Error::NotInitialized));
}

#[test]
fn bh1750_read_failure_propagates() {
    let mock = MockI2c::new().with_device(BH1750);
    let bus = open(&mock);
    let sensor = Bh1750::init(&bus, BH1750).unwrap();
    mock.remove_device(BH1750);

    let err = sensor.read_lux(&mut MockDelay::new()).unwrap_err();
    assert!(err.is_transport());
}

// ============================================================================
// PCA9554
// ============================================================================

const PCA9554: u8 = 0x20;

fn expander() -> (MockI2c, I2cMaster<MockI2c>) {
    let mock = MockI2c::new().with_device(PCA9554);
    // Power-on state: all pins input
    mock.set_registers(PCA9554, 0x03, &[0xFF]);
    let bus = open(&mock);
    (mock, bus)
}

#[test]
fn pca9554_direction_and_output() {
    let (mock, bus) = expander();
    let io = Pca9554::init(&bus, PCA9554).unwrap();

    io.set_pin_direction(0, PinDirection::Output).unwrap();
    io.set_pin_direction(5, PinDirection::Output).unwrap();
    assert_eq!(mock.registers(PCA9554, 0x03, 1), vec![0b1101_1110]);

    io.set_pin_level(5, Level::High).unwrap();
    io.set_pin_level(0, Level::High).unwrap();
    io.set_pin_level(0, Level::Low).unwrap();
    assert_eq!(mock.registers(PCA9554, 0x01, 1), vec![0b0010_0000]);

    io.set_pin_direction(5, PinDirection::Input).unwrap();
    assert_eq!(mock.registers(PCA9554, 0x03, 1), vec![0b1111_1110]);
}

#[test]
fn pca9554_reads_input_register() {
    let (mock, bus) = expander();
    mock.set_registers(PCA9554, 0x00, &[0b1000_0010]);
    let io = Pca9554::init(&bus, PCA9554).unwrap();

    assert_eq!(io.pin_level(1), Ok(Level::High));
    assert_eq!(io.pin_level(2), Ok(Level::Low));
    assert_eq!(io.pin_level(7), Ok(Level::High));
    assert_eq!(io.levels(), Ok(0b1000_0010));
}

#[test]
fn pca9554_set_levels_writes_whole_port() {
    let (mock, bus) = expander();
    let io = Pca9554::init(&bus, PCA9554).unwrap();
    mock.clear_transactions();

    io.set_levels(0x5A).unwrap();

    assert_eq!(mock.register_writes(PCA9554), vec![vec![0x01, 0x5A]]);
}

#[test]
fn pca9554_pin_out_of_range() {
    let (mock, bus) = expander();
    let io = Pca9554::init(&bus, PCA9554).unwrap();
    mock.clear_transactions();

    assert!(matches!(
        io.set_pin_direction(8, PinDirection::Output),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(
        io.set_pin_level(8, Level::High),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(io.pin_level(8), Err(Error::InvalidParameter(_))));
    assert!(mock.transactions().is_empty());
}

#[test]
fn pca9554_pins_from_several_threads() {
    let (mock, bus) = expander();
    let io = Pca9554::init(&bus, PCA9554).unwrap();

    std::thread::scope(|s| {
        for pin in 0..8u8 {
            let io = &io;
            s.spawn(move || {
                io.set_pin_direction(pin, PinDirection::Output).unwrap();
                io.set_pin_level(pin, Level::from(pin % 2 == 0)).unwrap();
            });
        }
    });

    assert_eq!(mock.registers(PCA9554, 0x03, 1), vec![0x00]);
    assert_eq!(mock.registers(PCA9554, 0x01, 1), vec![0b0101_0101]);
}

#[test]
fn pca9554_after_bus_close() {
    let (_mock, bus) = expander();
    let io = Pca9554::init(&bus, PCA9554).unwrap();

    bus.close().unwrap();

    assert_eq!(io.levels(), Err(Error::BusClosed));
    assert_eq!(Pca9554::init(&bus, PCA9554).err(), Some(Error::BusClosed));
}
