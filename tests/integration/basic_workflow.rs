//! Integration tests for basic workflow scenarios

use crate::common::{MockDelay, create_compass_driver, create_mock_driver};
use invensense_mpu::fifo::parser::FifoParser;
use invensense_mpu::{
    AccelFullScale, ChipProfile, FifoSources, GyroFullScale, InterruptConfig, InterruptMask,
    IntLevel, IntMode, MagMode, StandbyMask,
};

#[test]
fn test_complete_initialization_workflow() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);

    driver.reset(&mut MockDelay).unwrap();
    driver.initialize().unwrap();
    driver.set_accel_full_scale(AccelFullScale::G2).unwrap();
    driver.set_gyro_full_scale(GyroFullScale::Dps250).unwrap();
    assert_eq!(driver.set_sample_rate(200).unwrap(), 200);

    interface.set_accel_data(100, -50, 16384);
    interface.set_gyro_data(131, -262, 0);
    interface.set_temperature_data(-521);

    let accel = driver.read_accelerometer().unwrap();
    assert!((accel.z - 1.0).abs() < 0.01);
    assert!(accel.y < 0.0);

    let gyro = driver.read_gyroscope().unwrap();
    assert!((gyro.x - 1.0).abs() < 0.01);
    assert!((gyro.y + 2.0).abs() < 0.01);

    let temp = driver.read_temperature_celsius().unwrap();
    assert!((temp - 35.0).abs() < 0.1);
}

#[test]
fn test_data_ready_workflow() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    driver.initialize().unwrap();
    driver
        .set_interrupt_config(InterruptConfig {
            level: IntLevel::ActiveLow,
            mode: IntMode::Latch,
            ..Default::default()
        })
        .unwrap();
    driver
        .set_interrupt_enabled(InterruptMask::RAW_DATA_READY)
        .unwrap();

    interface.set_register(0x3A, 0x01);
    interface.set_gyro_data(1, 2, 3);
    driver
        .wait_for_interrupt(InterruptMask::RAW_DATA_READY, 100, &mut MockDelay)
        .unwrap();
    let motion = driver.read_motion().unwrap();
    assert_eq!((motion.gyro.x, motion.gyro.y, motion.gyro.z), (1, 2, 3));
}

#[test]
fn test_fifo_streaming_workflow() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU9250);
    driver.initialize().unwrap();
    driver
        .set_fifo_config(FifoSources::ACCEL | FifoSources::TEMPERATURE)
        .unwrap();
    driver.reset_fifo().unwrap();
    driver.set_fifo_enabled(true).unwrap();

    for sample in 0..5i16 {
        let mut packet = Vec::new();
        for word in [sample, -sample, 1000, sample * 10] {
            packet.extend_from_slice(&word.to_be_bytes());
        }
        interface.push_fifo(&packet);
    }
    // A partial packet at the tail
    interface.push_fifo(&[0xAB, 0xCD]);

    let level = driver.read_fifo_level().unwrap();
    assert_eq!(level.packet_size, 8);
    assert_eq!(level.packets(), 5);

    let mut buffer = [0u8; 128];
    let n = level.packets() * usize::from(level.packet_size);
    assert_eq!(driver.read_fifo(&mut buffer[..n]).unwrap(), n);
    assert_eq!(interface.fifo_len(), 2);

    let parser = FifoParser::new(&driver.read_fifo_layout().unwrap());
    let packets = parser.parse(&buffer[..n]).unwrap();
    assert_eq!(packets.len(), 5);
    for (sample, packet) in packets.iter().enumerate() {
        let accel = packet.accel.unwrap();
        assert_eq!(accel.x, sample as i16);
        assert_eq!(accel.y, -(sample as i16));
        assert_eq!(packet.temperature, Some(sample as i16 * 10));
        assert_eq!(packet.gyro, None);
    }
}

#[test]
fn test_nine_axis_workflow() {
    let (mut driver, interface) = create_compass_driver(&ChipProfile::MPU9250, [170, 128, 86]);
    let adjustment = driver.compass_read_adjustment(&mut MockDelay).unwrap();
    assert_eq!((adjustment.x, adjustment.y, adjustment.z), (170, 128, 86));

    driver
        .compass_set_mode(MagMode::Continuous100Hz, &mut MockDelay)
        .unwrap();

    interface.set_mag_data(1000, 1000, 1000, 0x10);
    let field = driver.compass_heading_ut(&adjustment).unwrap();
    assert!(field.x > field.y);
    assert!(field.y > field.z);
    assert!((field.y - 150.0).abs() < 0.01);
}

#[test]
fn test_low_power_workflow() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    driver.initialize().unwrap();

    driver
        .set_low_power_accel_rate(invensense_mpu::LpAccelRate::Hz5)
        .unwrap();
    driver.set_low_power_accel_mode(true).unwrap();
    assert!(driver.read_low_power_accel_mode().unwrap());
    assert_eq!(driver.read_standby_mask().unwrap(), StandbyMask::GYRO | StandbyMask::TEMP);
    // Rate survives the mode switch
    assert_eq!(interface.get_register(0x6C) >> 6, 1);

    driver.set_low_power_accel_mode(false).unwrap();
    assert_eq!(driver.read_standby_mask().unwrap(), StandbyMask::empty());
    assert!(!driver.read_sleep().unwrap());
}
