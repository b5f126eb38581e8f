//! Unit tests for error handling and recovery

use crate::common::{MockDelay, MockError, Operation, create_mock_driver};
use invensense_mpu::{
    AuxI2cConfig, ChipProfile, Dlpf, Error, ErrorKind, GyroFullScale, InterruptMask,
};

fn writes(operations: &[Operation]) -> usize {
    operations
        .iter()
        .filter(|op| matches!(op, Operation::WriteRegister { .. }))
        .count()
}

#[test]
fn test_read_failure_basic() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.fail_next_read();

    let result = driver.read_accel();
    assert_eq!(result, Err(Error::Bus(MockError::Communication)));
}

#[test]
fn test_read_failure_recovery() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.fail_next_read();
    assert!(driver.read_accel().is_err(), "First read should fail");

    interface.set_accel_data(100, 200, 300);
    let accel = driver.read_accel().unwrap();
    assert_eq!((accel.x, accel.y, accel.z), (100, 200, 300));
}

#[test]
fn test_read_modify_write_stops_on_read_failure() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    interface.set_register(0x1B, 0x03);
    interface.fail_next_read();

    assert!(driver.set_gyro_full_scale(GyroFullScale::Dps2000).is_err());
    assert_eq!(writes(&interface.operations()), 0);
    assert_eq!(interface.get_register(0x1B), 0x03);
}

#[test]
fn test_write_failure_leaves_register() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.fail_next_write();

    assert_eq!(
        driver.set_dlpf(Dlpf::Hz5),
        Err(Error::Bus(MockError::Communication))
    );
    assert_eq!(driver.read_dlpf().unwrap(), Dlpf::Hz256NoLpf);

    driver.set_dlpf(Dlpf::Hz5).unwrap();
    assert_eq!(driver.read_dlpf().unwrap(), Dlpf::Hz5);
}

#[test]
fn test_invalid_arguments_touch_no_register() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);

    assert_eq!(
        driver.set_interrupt_enabled(InterruptMask::PLL_READY),
        Err(Error::InvalidArgument)
    );
    assert_eq!(
        driver.set_aux_i2c_config(AuxI2cConfig {
            sample_delay: 40,
            ..Default::default()
        }),
        Err(Error::InvalidArgument)
    );
    let mut buffer = [0u8; 25];
    assert_eq!(
        driver.read_external_sensor_data(0, &mut buffer),
        Err(Error::InvalidArgument)
    );

    assert!(interface.operations().is_empty());
}

#[test]
fn test_unsupported_touch_no_register() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);

    assert_eq!(driver.read_fchoice(), Err(Error::Unsupported));
    assert_eq!(
        driver.compass_read_mode(&mut MockDelay),
        Err(Error::Unsupported)
    );
    assert!(interface.operations().is_empty());
}

#[test]
fn test_last_error_slot() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    assert_eq!(driver.last_error(), None);

    interface.fail_next_read();
    let _ = driver.read_gyro();
    assert_eq!(driver.last_error(), Some(ErrorKind::Bus));

    // Success does not clear the slot
    driver.read_gyro().unwrap();
    assert_eq!(driver.last_error(), Some(ErrorKind::Bus));

    // A newer error replaces it
    driver.set_interrupt_enabled(InterruptMask::RAW_DATA_READY).unwrap();
    assert_eq!(driver.last_error(), Some(ErrorKind::Bus));
    let _ = driver.set_interrupt_enabled(InterruptMask::PLL_READY);
    assert_eq!(driver.take_last_error(), Some(ErrorKind::InvalidArgument));
    assert_eq!(driver.take_last_error(), None);
}

#[test]
fn test_error_kinds() {
    assert_eq!(Error::Bus(MockError::Communication).kind(), ErrorKind::Bus);
    assert_eq!(Error::<MockError>::Timeout.kind(), ErrorKind::Timeout);
    assert_eq!(Error::<MockError>::NotFound.kind(), ErrorKind::NotFound);
    assert_eq!(
        Error::<MockError>::InvalidDevice(0x12).kind(),
        ErrorKind::InvalidDevice
    );

    let from: Error<MockError> = MockError::Communication.into();
    assert_eq!(from, Error::Bus(MockError::Communication));
}

#[test]
fn test_release_returns_interface() {
    let (driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.set_register(0x19, 0x42);
    let released = driver.release();
    assert_eq!(released.get_register(0x19), 0x42);
}
