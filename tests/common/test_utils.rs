//! Test utilities and helper functions

use crate::common::mock_interface::MockInterface;
use invensense_mpu::{ChipProfile, Mpu};

/// Mock delay implementation for testing
///
/// This is a no-op delay that implements the embedded-hal DelayNs trait
/// for use in tests where actual delays are not needed.
#[derive(Debug, Clone, Copy)]
pub struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {
        // No-op for testing
    }

    fn delay_us(&mut self, _us: u32) {
        // No-op for testing
    }

    fn delay_ms(&mut self, _ms: u32) {
        // No-op for testing
    }
}

/// Create a mock driver for testing
/// Returns (driver, interface) where interface is a clone that shares state with the driver
pub fn create_mock_driver(
    profile: &'static ChipProfile,
) -> (Mpu<MockInterface>, MockInterface) {
    let interface = MockInterface::new(profile);
    let interface_clone = interface.clone();
    let driver = Mpu::new(interface, profile).expect("Failed to create mock driver");
    interface_clone.clear_operations();
    (driver, interface_clone)
}

/// Create a 9-axis driver with the auxiliary master running and an AK89xx attached
pub fn create_compass_driver(
    profile: &'static ChipProfile,
    asa: [u8; 3],
) -> (Mpu<MockInterface>, MockInterface) {
    let (mut driver, interface) = create_mock_driver(profile);
    interface.attach_compass(asa);
    driver
        .compass_init(&mut MockDelay)
        .expect("Failed to initialize compass");
    interface.clear_operations();
    (driver, interface)
}

/// Assert that two floating point values are approximately equal
pub fn assert_float_eq(a: f32, b: f32, epsilon: f32) {
    let diff = (a - b).abs();
    assert!(
        diff < epsilon,
        "Values not equal within epsilon: {} vs {} (diff: {}, epsilon: {})",
        a,
        b,
        diff,
        epsilon
    );
}
