//! Unit tests for temperature sensor functionality

use crate::common::{assert_float_eq, create_mock_driver};
use invensense_mpu::ChipProfile;

#[test]
fn test_temperature_reference_points() {
    // MPU6050: -521 LSB at 35°C
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.set_temperature_data(-521);
    assert_float_eq(driver.read_temperature_celsius().unwrap(), 35.0, 0.01);
    assert_float_eq(driver.read_temperature_fahrenheit().unwrap(), 95.0, 0.01);

    // MPU6500: 0 LSB at 21°C
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    interface.set_temperature_data(0);
    assert_float_eq(driver.read_temperature_celsius().unwrap(), 21.0, 0.01);
    assert_float_eq(driver.read_temperature_fahrenheit().unwrap(), 69.8, 0.01);
}

#[test]
fn test_temperature_formula_follows_profile() {
    let (mut mpu6050, interface_6050) = create_mock_driver(&ChipProfile::MPU9150);
    let (mut mpu9250, interface_9250) = create_mock_driver(&ChipProfile::MPU9250);
    interface_6050.set_temperature_data(1000);
    interface_9250.set_temperature_data(1000);

    let t6050 = mpu6050.read_temperature_celsius().unwrap();
    let t9250 = mpu9250.read_temperature_celsius().unwrap();
    // Offsets differ, scale is shared
    let lsb = 98.67 / 32767.0;
    assert_float_eq(t6050, 35.0 + 1521.0 * lsb, 0.01);
    assert_float_eq(t9250, 21.0 + 1000.0 * lsb, 0.01);
}

#[test]
fn test_temperature_monotonic() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    let mut previous = f32::MIN;
    for raw in [i16::MIN, -10_000, -1, 0, 1, 10_000, i16::MAX] {
        interface.set_temperature_data(raw);
        let celsius = driver.read_temperature_celsius().unwrap();
        assert!(celsius > previous, "{} not above {}", celsius, previous);
        previous = celsius;
    }
}

#[test]
fn test_fahrenheit_matches_celsius() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    for raw in [-5000, 0, 4000] {
        interface.set_temperature_data(raw);
        let celsius = driver.read_temperature_celsius().unwrap();
        let fahrenheit = driver.read_temperature_fahrenheit().unwrap();
        assert_float_eq(fahrenheit, celsius * 1.8 + 32.0, 0.01);
    }
}
