//! Power management types
//!
//! The MPU supports several ways to reduce power consumption:
//! - **Sleep mode**: everything off, registers retained
//! - **Standby**: individual accelerometer and gyroscope axes switched off
//! - **Low-power accelerometer mode**: the chip cycles between sleep and a
//!   single accelerometer sample at a fixed wake-up rate, gyros in standby
//!
//! # Example
//!
//! ```ignore
//! # use invensense_mpu::power::{LpAccelRate, StandbyMask};
//! # let mut imu: invensense_mpu::Mpu<_> = todo!();
//! // Keep the accelerometer, switch the gyros off
//! imu.set_standby_mask(StandbyMask::GYRO)?;
//!
//! // Or wake up periodically for a single accelerometer sample
//! imu.set_low_power_accel_rate(LpAccelRate::Hz20)?;
//! imu.set_low_power_accel_mode(true)?;
//! # Ok::<(), invensense_mpu::Error<()>>(())
//! ```

use bitflags::bitflags;

use crate::chip::ChipFamily;

/// Clock source selection (`PWR_MGMT_1.CLKSEL`)
///
/// On the MPU6500 family every PLL setting auto-selects the best available
/// source; the external references exist only on the MPU6050 family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal oscillator
    Internal = 0,
    /// PLL referenced to the X gyro (auto-select on the MPU6500 family)
    Pll = 1,
    /// PLL referenced to the Y gyro
    PllGyroY = 2,
    /// PLL referenced to the Z gyro
    PllGyroZ = 3,
    /// PLL referenced to an external 32.768 kHz clock (MPU6050 family)
    PllExternal32k = 4,
    /// PLL referenced to an external 19.2 MHz clock (MPU6050 family)
    PllExternal19M = 5,
    /// Stop the clock and keep timing generation in reset
    KeepReset = 7,
}

impl ClockSource {
    /// Decode the 3-bit `CLKSEL` field
    ///
    /// The reserved code 6 selects the internal oscillator on every part.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            1 => Self::Pll,
            2 => Self::PllGyroY,
            3 => Self::PllGyroZ,
            4 => Self::PllExternal32k,
            5 => Self::PllExternal19M,
            7 => Self::KeepReset,
            _ => Self::Internal,
        }
    }

    /// Whether the source needs an external clock input
    #[must_use]
    pub const fn is_external(self) -> bool {
        matches!(self, Self::PllExternal32k | Self::PllExternal19M)
    }
}

bitflags! {
    /// Sensors held in standby
    ///
    /// The low six bits match `PWR_MGMT_2`. `TEMP` and `LOWPWR_GYRO_PLL_ON`
    /// are stored three bits lower in `PWR_MGMT_1` (`TEMP_DIS` and
    /// `GYRO_STANDBY`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StandbyMask: u8 {
        /// Gyroscope Z axis
        const GYRO_Z = 1 << 0;
        /// Gyroscope Y axis
        const GYRO_Y = 1 << 1;
        /// Gyroscope X axis
        const GYRO_X = 1 << 2;
        /// Accelerometer Z axis
        const ACCEL_Z = 1 << 3;
        /// Accelerometer Y axis
        const ACCEL_Y = 1 << 4;
        /// Accelerometer X axis
        const ACCEL_X = 1 << 5;
        /// Temperature sensor
        const TEMP = 1 << 6;
        /// Gyro drive and PLL kept on while the gyro sense path sleeps
        const LOWPWR_GYRO_PLL_ON = 1 << 7;

        /// All accelerometer axes
        const ACCEL = Self::ACCEL_X.bits() | Self::ACCEL_Y.bits() | Self::ACCEL_Z.bits();
        /// All gyroscope axes
        const GYRO = Self::GYRO_X.bits() | Self::GYRO_Y.bits() | Self::GYRO_Z.bits();
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StandbyMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StandbyMask({=u8:#04x})", self.bits());
    }
}

impl StandbyMask {
    /// `PWR_MGMT_1` bits owned by the mask
    #[must_use]
    pub const fn pwr_mgmt_1_bits(self) -> u8 {
        (self.bits() >> 3) & crate::registers::PWR1_STANDBY_MASK
    }

    /// `PWR_MGMT_2` bits owned by the mask
    #[must_use]
    pub const fn pwr_mgmt_2_bits(self) -> u8 {
        self.bits() & crate::registers::PWR2_STANDBY_MASK
    }

    /// Rebuild the mask from the two power management registers
    #[must_use]
    pub const fn from_registers(pwr_mgmt_1: u8, pwr_mgmt_2: u8) -> Self {
        let high = (pwr_mgmt_1 & crate::registers::PWR1_STANDBY_MASK) << 3;
        let low = pwr_mgmt_2 & crate::registers::PWR2_STANDBY_MASK;
        Self::from_bits_retain(high | low)
    }
}

/// Wake-up rate of the low-power accelerometer mode
///
/// The MPU6050 family offers 1.25, 5, 20 and 40 Hz through
/// `PWR_MGMT_2.LP_WAKE_CTRL`. The MPU6500 family offers the twelve rates of
/// `LP_ACCEL_ODR`, which include 5 Hz and 20 Hz only approximately, so each
/// family rejects the rates of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LpAccelRate {
    /// 0.24 Hz (MPU6500 family)
    Hz0_24,
    /// 0.49 Hz (MPU6500 family)
    Hz0_49,
    /// 0.98 Hz (MPU6500 family)
    Hz0_98,
    /// 1.25 Hz (MPU6050 family)
    Hz1_25,
    /// 1.95 Hz (MPU6500 family)
    Hz1_95,
    /// 3.91 Hz (MPU6500 family)
    Hz3_91,
    /// 5 Hz (MPU6050 family)
    Hz5,
    /// 7.81 Hz (MPU6500 family)
    Hz7_81,
    /// 15.63 Hz (MPU6500 family)
    Hz15_63,
    /// 20 Hz (MPU6050 family)
    Hz20,
    /// 31.25 Hz (MPU6500 family)
    Hz31_25,
    /// 40 Hz (MPU6050 family)
    Hz40,
    /// 62.50 Hz (MPU6500 family)
    Hz62_50,
    /// 125 Hz (MPU6500 family)
    Hz125,
    /// 250 Hz (MPU6500 family)
    Hz250,
    /// 500 Hz (MPU6500 family)
    Hz500,
}

const LP_RATES_6050: [LpAccelRate; 4] = [
    LpAccelRate::Hz1_25,
    LpAccelRate::Hz5,
    LpAccelRate::Hz20,
    LpAccelRate::Hz40,
];

const LP_RATES_6500: [LpAccelRate; 12] = [
    LpAccelRate::Hz0_24,
    LpAccelRate::Hz0_49,
    LpAccelRate::Hz0_98,
    LpAccelRate::Hz1_95,
    LpAccelRate::Hz3_91,
    LpAccelRate::Hz7_81,
    LpAccelRate::Hz15_63,
    LpAccelRate::Hz31_25,
    LpAccelRate::Hz62_50,
    LpAccelRate::Hz125,
    LpAccelRate::Hz250,
    LpAccelRate::Hz500,
];

impl LpAccelRate {
    /// Rates available on `family`, in register code order
    #[must_use]
    pub const fn rates(family: ChipFamily) -> &'static [Self] {
        match family {
            ChipFamily::Mpu6050 => &LP_RATES_6050,
            ChipFamily::Mpu6500 => &LP_RATES_6500,
        }
    }

    /// Register code of the rate on `family`, if the family supports it
    #[must_use]
    pub fn code(self, family: ChipFamily) -> Option<u8> {
        Self::rates(family)
            .iter()
            .position(|&rate| rate == self)
            .map(|index| index as u8)
    }

    /// Rate for a register code on `family`
    #[must_use]
    pub fn from_code(family: ChipFamily, code: u8) -> Option<Self> {
        Self::rates(family).get(usize::from(code)).copied()
    }

    /// Get the wake-up rate in Hz
    #[must_use]
    pub const fn rate_hz(self) -> f32 {
        match self {
            Self::Hz0_24 => 0.24,
            Self::Hz0_49 => 0.49,
            Self::Hz0_98 => 0.98,
            Self::Hz1_25 => 1.25,
            Self::Hz1_95 => 1.95,
            Self::Hz3_91 => 3.91,
            Self::Hz5 => 5.0,
            Self::Hz7_81 => 7.81,
            Self::Hz15_63 => 15.63,
            Self::Hz20 => 20.0,
            Self::Hz31_25 => 31.25,
            Self::Hz40 => 40.0,
            Self::Hz62_50 => 62.50,
            Self::Hz125 => 125.0,
            Self::Hz250 => 250.0,
            Self::Hz500 => 500.0,
        }
    }
}
