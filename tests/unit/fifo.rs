//! Unit tests for FIFO configuration and draining

use crate::common::create_mock_driver;
use invensense_mpu::fifo::parser::FifoParser;
use invensense_mpu::{
    AccelData, AuxSlave, AuxSlaveConfig, AuxTransfer, ChipProfile, Error, FifoMode, FifoSources,
    GyroData,
};

#[test]
fn test_sources_round_trip() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    let sources = FifoSources::ACCEL | FifoSources::GYRO | FifoSources::TEMPERATURE;
    driver.set_fifo_config(sources).unwrap();
    assert_eq!(interface.get_register(0x23), 0xF8);
    assert_eq!(driver.read_fifo_config().unwrap(), sources);
    assert_eq!(driver.read_fifo_packet_size().unwrap(), 14);
}

#[test]
fn test_slave3_lives_in_master_control() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    // Clock select must survive
    interface.set_register(0x24, 0x0D);

    driver
        .set_fifo_config(FifoSources::SLAVE3 | FifoSources::SLAVE0)
        .unwrap();
    assert_eq!(interface.get_register(0x23), 0x01);
    assert_eq!(interface.get_register(0x24), 0x2D);
    // FIFO_EN and I2C_MST_CTRL go out in one burst
    assert_eq!(interface.written_registers(), vec![0x23, 0x24]);

    driver.set_fifo_config(FifoSources::ACCEL).unwrap();
    assert_eq!(interface.get_register(0x24), 0x0D);
}

#[test]
fn test_packet_size_includes_slots() {
    let (mut driver, _interface) = create_mock_driver(&ChipProfile::MPU9250);
    for (slave, length) in [(AuxSlave::Slave0, 8), (AuxSlave::Slave1, 5)] {
        driver
            .set_aux_i2c_slave_config(&AuxSlaveConfig {
                slave,
                address: 0x0C,
                register: 0x02,
                register_disabled: false,
                sample_delay: false,
                transfer: AuxTransfer::read(length),
            })
            .unwrap();
    }

    driver
        .set_fifo_config(FifoSources::ACCEL | FifoSources::SLAVE0)
        .unwrap();
    let layout = driver.read_fifo_layout().unwrap();
    assert_eq!(layout.slave_lengths, [8, 0, 0, 0]);
    assert_eq!(layout.packet_size(), 14);

    driver
        .set_fifo_config(FifoSources::GYRO_Z | FifoSources::SLAVE0 | FifoSources::SLAVE1)
        .unwrap();
    assert_eq!(driver.read_fifo_packet_size().unwrap(), 15);
}

#[test]
fn test_enable_and_reset() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    driver.set_fifo_enabled(true).unwrap();
    assert!(driver.read_fifo_enabled().unwrap());

    interface.push_fifo(&[1, 2, 3, 4]);
    assert_eq!(driver.read_fifo_count().unwrap(), 4);

    driver.reset_fifo().unwrap();
    assert_eq!(driver.read_fifo_count().unwrap(), 0);
    // Reset bit clears itself, enable stays
    assert_eq!(interface.get_register(0x6A) & 0x44, 0x40);
}

#[test]
fn test_count_spans_both_registers() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.push_fifo(&[0; 300]);
    assert_eq!(driver.read_fifo_count().unwrap(), 300);
}

#[test]
fn test_read_drains_count_bytes() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    driver
        .set_fifo_config(FifoSources::ACCEL | FifoSources::GYRO)
        .unwrap();
    let packet = [0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0xFF, 0xFF, 0x00, 0x00, 0x40, 0x00];
    interface.push_fifo(&packet);
    interface.push_fifo(&packet);

    let level = driver.read_fifo_level().unwrap();
    assert_eq!(level.bytes, 24);
    assert_eq!(level.packet_size, 12);
    assert_eq!(level.packets(), 2);

    let mut buffer = [0u8; 64];
    let n = driver.read_fifo(&mut buffer).unwrap();
    assert_eq!(n, 24);
    assert_eq!(interface.fifo_len(), 0);

    let parser = FifoParser::new(&driver.read_fifo_layout().unwrap());
    let packets = parser.parse(&buffer[..n]).unwrap();
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[1].accel, Some(AccelData { x: 1, y: 2, z: 3 }));
    assert_eq!(
        packets[1].gyro,
        Some(GyroData {
            x: -1,
            y: 0,
            z: 0x4000
        })
    );
}

#[test]
fn test_read_limited_by_buffer() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.push_fifo(&[9; 10]);

    let mut buffer = [0u8; 4];
    assert_eq!(driver.read_fifo(&mut buffer).unwrap(), 4);
    assert_eq!(interface.fifo_len(), 6);

    let mut empty: [u8; 0] = [];
    assert_eq!(driver.read_fifo(&mut empty).unwrap(), 0);
}

#[test]
fn test_read_empty_fifo_reads_count_only() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    let mut buffer = [0u8; 16];
    assert_eq!(driver.read_fifo(&mut buffer).unwrap(), 0);
    assert_eq!(interface.operations().len(), 2);
}

#[test]
fn test_write_fifo() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    driver.write_fifo(&[0xAA, 0xBB]).unwrap();
    assert_eq!(interface.fifo_len(), 2);
    assert_eq!(driver.read_fifo_count().unwrap(), 2);
}

#[test]
fn test_fifo_mode() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    interface.set_register(0x1A, 0x03);
    driver.set_fifo_mode(FifoMode::StopWhenFull).unwrap();
    assert_eq!(interface.get_register(0x1A), 0x43);
    assert_eq!(driver.read_fifo_mode().unwrap(), FifoMode::StopWhenFull);

    let (mut driver, _interface) = create_mock_driver(&ChipProfile::MPU6050);
    assert_eq!(
        driver.set_fifo_mode(FifoMode::Overwrite),
        Err(Error::Unsupported)
    );
    assert_eq!(driver.read_fifo_mode(), Err(Error::Unsupported));
}
