//! Unit tests for the auxiliary I2C master

use crate::common::{MockDelay, create_mock_driver};
use invensense_mpu::{
    AuxI2cClock, AuxI2cConfig, AuxI2cState, AuxI2cStatus, AuxI2cTransition, AuxSlave,
    AuxSlaveConfig, AuxTransfer, ChipProfile, Error, ErrorKind,
};

#[test]
fn test_state_transitions() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    assert_eq!(driver.read_aux_i2c_state().unwrap(), AuxI2cState::Disabled);

    driver.set_bypass(true).unwrap();
    assert_eq!(driver.read_aux_i2c_state().unwrap(), AuxI2cState::Bypass);
    assert!(driver.read_bypass().unwrap());

    // Enabling the master clears bypass first
    driver.set_aux_i2c_enabled(true).unwrap();
    assert_eq!(driver.read_aux_i2c_state().unwrap(), AuxI2cState::MasterActive);
    assert_eq!(interface.get_register(0x37) & 0x02, 0);
    assert_eq!(interface.get_register(0x6A) & 0x20, 0x20);

    // Enabling bypass switches the master off first
    driver.set_bypass(true).unwrap();
    assert_eq!(driver.read_aux_i2c_state().unwrap(), AuxI2cState::Bypass);
    assert!(!driver.read_aux_i2c_enabled().unwrap());

    driver.set_bypass(false).unwrap();
    assert_eq!(driver.read_aux_i2c_state().unwrap(), AuxI2cState::Disabled);
}

#[test]
fn test_master_and_bypass_never_both_set() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU9250);
    driver.set_aux_i2c_enabled(true).unwrap();
    interface.clear_operations();
    driver.set_bypass(true).unwrap();

    // USER_CTRL is written before INT_PIN_CFG
    let writes = interface.written_registers();
    assert_eq!(writes, vec![0x6A, 0x37]);
}

#[test]
fn test_master_config_round_trip() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6500);
    let config = AuxI2cConfig {
        clock: AuxI2cClock::Khz258,
        multi_master: true,
        transition: AuxI2cTransition::Stop,
        sample_delay: 31,
        shadow_delay: true,
        wait_for_external_sensor: true,
    };
    driver.set_aux_i2c_config(config).unwrap();
    assert_eq!(interface.get_register(0x24), 0xD8);
    assert_eq!(interface.get_register(0x34) & 0x1F, 31);
    assert_eq!(interface.get_register(0x67) & 0x80, 0x80);
    assert_eq!(driver.read_aux_i2c_config().unwrap(), config);

    driver.set_aux_i2c_config(AuxI2cConfig::default()).unwrap();
    assert_eq!(driver.read_aux_i2c_config().unwrap(), AuxI2cConfig::default());
}

#[test]
fn test_master_config_preserves_fifo_bit() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.set_register(0x24, 0x20);
    driver.set_aux_i2c_config(AuxI2cConfig::default()).unwrap();
    assert_eq!(interface.get_register(0x24), 0x2D);
}

#[test]
fn test_master_config_rejects_long_delay() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    let config = AuxI2cConfig {
        sample_delay: 32,
        ..Default::default()
    };
    assert_eq!(driver.set_aux_i2c_config(config), Err(Error::InvalidArgument));
    assert_eq!(interface.write_count(), 0);
}

#[test]
fn test_slave_read_config_round_trip() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    let config = AuxSlaveConfig {
        slave: AuxSlave::Slave2,
        address: 0x1E,
        register: 0x03,
        register_disabled: false,
        sample_delay: true,
        transfer: AuxTransfer::Read {
            length: 6,
            swap_bytes: true,
            group_end_of_word: false,
        },
    };
    driver.set_aux_i2c_slave_config(&config).unwrap();

    assert_eq!(interface.get_register(0x2B), 0x9E);
    assert_eq!(interface.get_register(0x2C), 0x03);
    assert_eq!(interface.get_register(0x2D), 0x46);
    assert_eq!(interface.get_register(0x67), 0x04);
    assert_eq!(
        driver.read_aux_i2c_slave_config(AuxSlave::Slave2).unwrap(),
        config
    );
    assert!(!driver.read_aux_i2c_slave_enabled(AuxSlave::Slave2).unwrap());
}

#[test]
fn test_slave_write_config_round_trip() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU9150);
    let config = AuxSlaveConfig {
        slave: AuxSlave::Slave1,
        address: 0x0C,
        register: 0x0A,
        register_disabled: false,
        sample_delay: false,
        transfer: AuxTransfer::write(0x01),
    };
    driver.set_aux_i2c_slave_config(&config).unwrap();
    assert_eq!(interface.get_register(0x28), 0x0C);
    assert_eq!(interface.get_register(0x64), 0x01);
    assert_eq!(
        driver.read_aux_i2c_slave_config(AuxSlave::Slave1).unwrap(),
        config
    );
}

#[test]
fn test_slave_config_keeps_enable_bit() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    driver
        .set_aux_i2c_slave_enabled(AuxSlave::Slave0, true)
        .unwrap();
    driver
        .set_aux_i2c_slave_config(&AuxSlaveConfig {
            slave: AuxSlave::Slave0,
            address: 0x77,
            register: 0xF7,
            register_disabled: true,
            sample_delay: false,
            transfer: AuxTransfer::read(3),
        })
        .unwrap();
    assert_eq!(interface.get_register(0x27), 0x80 | 0x20 | 3);
    assert!(driver.read_aux_i2c_slave_enabled(AuxSlave::Slave0).unwrap());

    driver
        .set_aux_i2c_slave_enabled(AuxSlave::Slave0, false)
        .unwrap();
    assert_eq!(interface.get_register(0x27), 0x23);
}

#[test]
fn test_slave_config_validation() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    let too_long = AuxSlaveConfig {
        slave: AuxSlave::Slave3,
        address: 0x1E,
        register: 0,
        register_disabled: false,
        sample_delay: false,
        transfer: AuxTransfer::read(16),
    };
    assert_eq!(
        driver.set_aux_i2c_slave_config(&too_long),
        Err(Error::InvalidArgument)
    );

    let bad_address = AuxSlaveConfig {
        address: 0x80,
        transfer: AuxTransfer::read(1),
        ..too_long
    };
    assert_eq!(
        driver.set_aux_i2c_slave_config(&bad_address),
        Err(Error::InvalidArgument)
    );
    assert!(interface.operations().is_empty());
}

#[test]
fn test_single_byte_transfers() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU9250);
    interface.attach_compass([128, 128, 128]);
    driver.set_aux_i2c_enabled(true).unwrap();

    assert_eq!(
        driver.aux_i2c_read_byte(0x0C, 0x00, &mut MockDelay).unwrap(),
        0x48
    );
    driver
        .aux_i2c_write_byte(0x0C, 0x0A, 0x16, &mut MockDelay)
        .unwrap();
    assert_eq!(interface.compass_register(0x0A), 0x16);

    assert_eq!(
        interface.aux_transfers(),
        vec![(0x8C, 0x00, 0x00), (0x0C, 0x0A, 0x16)]
    );
}

#[test]
fn test_transfer_requires_master() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU9250);
    interface.attach_compass([128, 128, 128]);

    assert_eq!(
        driver.aux_i2c_read_byte(0x0C, 0x00, &mut MockDelay),
        Err(Error::InvalidState)
    );
    assert_eq!(interface.write_count(), 0);

    driver.set_bypass(true).unwrap();
    assert_eq!(
        driver.aux_i2c_write_byte(0x0C, 0x0A, 0, &mut MockDelay),
        Err(Error::InvalidState)
    );
}

#[test]
fn test_transfer_nack() {
    let (mut driver, _interface) = create_mock_driver(&ChipProfile::MPU6050);
    driver.set_aux_i2c_enabled(true).unwrap();

    assert_eq!(
        driver.aux_i2c_read_byte(0x1E, 0x0A, &mut MockDelay),
        Err(Error::NotFound)
    );
    assert_eq!(driver.last_error(), Some(ErrorKind::NotFound));
}

#[test]
fn test_transfer_timeout() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.set_aux_hang(true);
    driver.set_aux_i2c_enabled(true).unwrap();
    driver.set_aux_i2c_retries(7);
    assert_eq!(driver.aux_i2c_retries(), 7);
    interface.clear_operations();

    assert_eq!(
        driver.aux_i2c_write_byte(0x0C, 0x0A, 0x01, &mut MockDelay),
        Err(Error::Timeout)
    );
    let polls = interface
        .operations()
        .iter()
        .filter(|op| matches!(op, crate::common::Operation::ReadRegister { address: 0x36, .. }))
        .count();
    // One read clears stale status, then the retry budget
    assert_eq!(polls, 1 + 7);
    // The stuck transfer is cancelled
    assert_eq!(interface.get_register(0x34) & 0x80, 0);
}

#[test]
fn test_transfer_rejects_bad_address() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    driver.set_aux_i2c_enabled(true).unwrap();
    interface.clear_operations();

    assert_eq!(
        driver.aux_i2c_read_byte(0x80, 0, &mut MockDelay),
        Err(Error::InvalidArgument)
    );
    assert!(interface.operations().is_empty());
}

#[test]
fn test_status_and_external_data() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.set_register(0x36, 0x41);
    assert_eq!(
        driver.read_aux_i2c_status().unwrap(),
        AuxI2cStatus::SLV4_DONE | AuxI2cStatus::SLV0_NACK
    );
    // Cleared on read
    assert_eq!(driver.read_aux_i2c_status().unwrap(), AuxI2cStatus::empty());

    for i in 0..24u8 {
        interface.set_register(0x49 + i, i);
    }
    let mut buffer = [0u8; 4];
    driver.read_external_sensor_data(20, &mut buffer).unwrap();
    assert_eq!(buffer, [20, 21, 22, 23]);

    assert_eq!(
        driver.read_external_sensor_data(21, &mut buffer),
        Err(Error::InvalidArgument)
    );
}

#[test]
fn test_clock_all_values() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    for code in 0..16u8 {
        let clock = AuxI2cClock::from_bits(code);
        assert_eq!(clock as u8, code);
        driver
            .set_aux_i2c_config(AuxI2cConfig {
                clock,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(driver.read_aux_i2c_config().unwrap().clock, clock);
        assert_eq!(interface.get_register(0x24) & 0x0F, code);
    }
}

#[test]
fn test_config_read_failure_writes_nothing() {
    for failing in [0x34, 0x67] {
        let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
        interface.set_register(0x24, 0x0D);
        interface.fail_reads_at(failing);

        let config = AuxI2cConfig {
            clock: AuxI2cClock::Khz500,
            multi_master: true,
            sample_delay: 4,
            ..Default::default()
        };
        assert!(driver.set_aux_i2c_config(config).is_err());
        assert_eq!(interface.write_count(), 0);
        assert_eq!(interface.get_register(0x24), 0x0D);
    }
}

#[test]
fn test_slave_config_read_failure_writes_nothing() {
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.fail_reads_at(0x67);

    let config = AuxSlaveConfig {
        slave: AuxSlave::Slave2,
        address: 0x1E,
        register: 0x03,
        register_disabled: false,
        sample_delay: true,
        transfer: AuxTransfer::Write { data: 0x55 },
    };
    assert!(driver.set_aux_i2c_slave_config(&config).is_err());
    assert_eq!(interface.write_count(), 0);
}

#[test]
fn test_mode_switch_read_failure_writes_nothing() {
    // Bypass with the master on: USER_CTRL must stay untouched
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.set_register(0x6A, 0x20);
    interface.fail_reads_at(0x6A);
    assert!(driver.set_bypass(true).is_err());
    assert_eq!(interface.write_count(), 0);
    assert_eq!(interface.get_register(0x6A), 0x20);

    // Master with bypass on: INT_PIN_CFG must stay untouched
    let (mut driver, interface) = create_mock_driver(&ChipProfile::MPU6050);
    interface.set_register(0x37, 0x02);
    interface.fail_reads_at(0x37);
    assert!(driver.set_aux_i2c_enabled(true).is_err());
    assert_eq!(interface.write_count(), 0);
    assert_eq!(interface.get_register(0x37), 0x02);
}
