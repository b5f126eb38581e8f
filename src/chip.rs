//! Chip profiles for the supported MPU variants
//!
//! A [`ChipProfile`] is chosen once, when the driver is constructed, and tells
//! the driver everything that differs between the parts: the expected
//! `WHO_AM_I` value, the family-specific register fields, the temperature
//! formula, the FIFO depth, which interrupt sources exist and whether an
//! AK89xx magnetometer sits on the auxiliary bus.
//!
//! # Example
//!
//! ```ignore
//! use invensense_mpu::{I2cInterface, Mpu, chip::ChipProfile};
//!
//! let interface = I2cInterface::default(i2c);
//! let mut imu = Mpu::new(interface, &ChipProfile::MPU9250)?;
//! ```

use crate::interrupt::InterruptMask;
use crate::registers::RegisterMap;
use crate::sensors::{Ak89xx, TemperatureFormula};

/// Register-compatible chip generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipFamily {
    /// MPU6000, MPU6050, MPU9150
    Mpu6050,
    /// MPU6500, MPU9250
    Mpu6500,
}

/// Description of one chip variant
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipProfile {
    /// Part name
    pub name: &'static str,
    /// Register generation
    pub family: ChipFamily,
    /// Expected `WHO_AM_I` register value
    pub who_am_i: u8,
    /// Family-specific register fields
    pub registers: RegisterMap,
    /// Temperature conversion constants
    pub temperature: TemperatureFormula,
    /// FIFO depth in bytes
    pub fifo_size: u16,
    /// Interrupt sources present on the part
    pub interrupts: InterruptMask,
    /// Magnetometer reachable through the auxiliary I2C master
    pub magnetometer: Option<Ak89xx>,
}

impl ChipProfile {
    /// MPU6000 (I2C and SPI)
    pub const MPU6000: Self = Self {
        name: "MPU6000",
        ..Self::MPU6050
    };

    /// MPU6050 (I2C only)
    pub const MPU6050: Self = Self {
        name: "MPU6050",
        family: ChipFamily::Mpu6050,
        who_am_i: 0x68,
        registers: RegisterMap::MPU6050,
        temperature: TemperatureFormula::MPU6050,
        fifo_size: 1024,
        interrupts: InterruptMask::MOTION_DETECT
            .union(InterruptMask::FIFO_OVERFLOW)
            .union(InterruptMask::I2C_MST_FSYNC)
            .union(InterruptMask::PLL_READY)
            .union(InterruptMask::RAW_DATA_READY),
        magnetometer: None,
    };

    /// MPU9150: MPU6050 die with an AK8975
    pub const MPU9150: Self = Self {
        name: "MPU9150",
        magnetometer: Some(Ak89xx::Ak8975),
        ..Self::MPU6050
    };

    /// MPU6500
    pub const MPU6500: Self = Self {
        name: "MPU6500",
        family: ChipFamily::Mpu6500,
        who_am_i: 0x70,
        registers: RegisterMap::MPU6500,
        temperature: TemperatureFormula::MPU6500,
        fifo_size: 512,
        interrupts: InterruptMask::MOTION_DETECT
            .union(InterruptMask::FIFO_OVERFLOW)
            .union(InterruptMask::I2C_MST_FSYNC)
            .union(InterruptMask::RAW_DATA_READY),
        magnetometer: None,
    };

    /// MPU9250: MPU6500 die with an AK8963
    pub const MPU9250: Self = Self {
        name: "MPU9250",
        who_am_i: 0x71,
        magnetometer: Some(Ak89xx::Ak8963),
        ..Self::MPU6500
    };

    /// Whether the external 32.768 kHz and 19.2 MHz clock inputs exist
    #[must_use]
    pub const fn has_external_clock(&self) -> bool {
        matches!(self.family, ChipFamily::Mpu6050)
    }
}
