//! Common test utilities and mock implementations

#![allow(dead_code)]

pub mod test_utils;

pub use mock_interface::{MockError, MockInterface, Operation};
pub use test_utils::{MockDelay, assert_float_eq, create_compass_driver, create_mock_driver};
