//! Unit tests for interrupt pin configuration and status

use crate::common::{MockDelay, create_mock_driver};
use invensense_mpu::{
    ChipProfile, Error, ErrorKind, FsyncLevel, IntClear, IntDrive, IntLevel, IntMode,
    InterruptConfig, InterruptMask,
};

#[test]
fn test_pin_config_preserves_low_bits() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    // FSYNC level, FSYNC enable and bypass already set
    interface.set_register(0x37, 0x0E);

    let config = InterruptConfig {
        level: IntLevel::ActiveLow,
        drive: IntDrive::OpenDrain,
        mode: IntMode::Latch,
        clear: IntClear::StatusRead,
    };
    driver.set_interrupt_config(config).unwrap();
    assert_eq!(interface.get_register(0x37), 0xEE);
    assert_eq!(driver.read_interrupt_config().unwrap(), config);

    driver.set_interrupt_config(InterruptConfig::default()).unwrap();
    assert_eq!(interface.get_register(0x37), 0x0E);
}

#[test]
fn test_enable_mask() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    let mask = InterruptMask::RAW_DATA_READY | InterruptMask::FIFO_OVERFLOW | InterruptMask::PLL_READY;
    driver.set_interrupt_enabled(mask).unwrap();
    assert_eq!(interface.get_register(0x38), 0x15);
    assert_eq!(driver.read_interrupt_enabled().unwrap(), mask);
}

#[test]
fn test_enable_mask_rejects_missing_source() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    assert_eq!(
        driver.set_interrupt_enabled(InterruptMask::PLL_READY | InterruptMask::RAW_DATA_READY),
        Err(Error::InvalidArgument)
    );
    assert_eq!(interface.write_count(), 0);
    assert_eq!(driver.last_error(), Some(ErrorKind::InvalidArgument));

    driver
        .set_interrupt_enabled(InterruptMask::MOTION_DETECT)
        .unwrap();
    assert_eq!(interface.get_register(0x38), 0x40);
}

#[test]
fn test_status_decoding() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    // Bit 5 is reserved and dropped
    interface.set_register(0x3A, 0x31);
    assert_eq!(
        driver.read_interrupt_status().unwrap(),
        InterruptMask::FIFO_OVERFLOW | InterruptMask::RAW_DATA_READY
    );
}

#[test]
fn test_wait_for_interrupt() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    interface.set_register(0x3A, 0x01);

    let status = driver
        .wait_for_interrupt(InterruptMask::RAW_DATA_READY, 10, &mut MockDelay)
        .unwrap();
    assert!(status.contains(InterruptMask::RAW_DATA_READY));
}

#[test]
fn test_wait_for_interrupt_timeout() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    interface.set_register(0x3A, 0x10);

    assert_eq!(
        driver.wait_for_interrupt(InterruptMask::RAW_DATA_READY, 5, &mut MockDelay),
        Err(Error::Timeout)
    );
    let polls = interface
        .operations()
        .iter()
        .filter(|op| matches!(op, crate::common::Operation::ReadRegister { address: 0x3A, .. }))
        .count();
    assert_eq!(polls, 5);
}

#[test]
fn test_fsync_settings() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    driver.set_fsync_interrupt_level(FsyncLevel::ActiveLow).unwrap();
    driver.set_fsync_interrupt_enabled(true).unwrap();
    assert_eq!(interface.get_register(0x37), 0x0C);
    assert_eq!(
        driver.read_fsync_interrupt_level().unwrap(),
        FsyncLevel::ActiveLow
    );
    assert!(driver.read_fsync_interrupt_enabled().unwrap());

    driver.set_fsync_interrupt_enabled(false).unwrap();
    assert_eq!(interface.get_register(0x37), 0x08);
}

#[test]
fn test_pin_config_all_combinations() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    interface.set_register(0x37, 0x06);

    for bits in 0..16u8 {
        let config = InterruptConfig::from_bits(bits);
        driver.set_interrupt_config(config).unwrap();
        assert_eq!(driver.read_interrupt_config().unwrap(), config);
        assert_eq!(interface.get_register(0x37), bits << 4 | 0x06);
    }
}

#[test]
fn test_dmp_bit_not_exposed() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    interface.set_register(0x3A, 0x03);
    assert_eq!(
        driver.read_interrupt_status().unwrap(),
        InterruptMask::RAW_DATA_READY
    );

    assert_eq!(
        driver.set_interrupt_enabled(InterruptMask::from_bits_retain(0x02)),
        Err(Error::InvalidArgument)
    );
    assert_eq!(interface.write_count(), 0);
}
