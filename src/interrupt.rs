//! Interrupt configuration and status types
//!
//! The MPU has a single interrupt pin. Its electrical behaviour lives in the
//! upper half of `INT_PIN_CFG`, the sources that drive it in `INT_ENABLE`, and
//! the latched causes in `INT_STATUS`. Wiring the pin to a host interrupt is
//! left to the application; the driver only configures and decodes registers.
//!
//! # Example
//!
//! ```ignore
//! # use invensense_mpu::interrupt::{InterruptConfig, InterruptMask, IntLevel, IntMode};
//! # let mut imu: invensense_mpu::Mpu<_> = todo!();
//! let config = InterruptConfig {
//!     level: IntLevel::ActiveLow,
//!     mode: IntMode::Latch,
//!     ..Default::default()
//! };
//! imu.set_interrupt_config(config)?;
//! imu.set_interrupt_enabled(InterruptMask::RAW_DATA_READY)?;
//! # Ok::<(), invensense_mpu::Error<()>>(())
//! ```

use bitflags::bitflags;

/// Interrupt pin active level (`INT_PIN_CFG.ACTL`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntLevel {
    /// Pin is high while an interrupt is pending
    #[default]
    ActiveHigh = 0,
    /// Pin is low while an interrupt is pending
    ActiveLow = 1,
}

/// Interrupt pin driver (`INT_PIN_CFG.OPEN`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntDrive {
    /// Push-pull output
    #[default]
    PushPull = 0,
    /// Open-drain output
    OpenDrain = 1,
}

/// Interrupt pin latching (`INT_PIN_CFG.LATCH_INT_EN`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntMode {
    /// 50 µs pulse
    #[default]
    Pulse = 0,
    /// Held until cleared
    Latch = 1,
}

/// How a latched interrupt is cleared (`INT_PIN_CFG.INT_ANYRD_2CLEAR`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntClear {
    /// Only reading `INT_STATUS` clears the interrupt
    #[default]
    StatusRead = 0,
    /// Any register read clears the interrupt
    AnyRead = 1,
}

/// Interrupt pin configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptConfig {
    /// Active level
    pub level: IntLevel,
    /// Output driver
    pub drive: IntDrive,
    /// Pulse or latch
    pub mode: IntMode,
    /// Clear condition
    pub clear: IntClear,
}

impl InterruptConfig {
    /// Pack into `INT_PIN_CFG` bits 7:4 (right-aligned)
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        (self.level as u8) << 3 | (self.drive as u8) << 2 | (self.mode as u8) << 1 | self.clear as u8
    }

    /// Unpack from `INT_PIN_CFG` bits 7:4 (right-aligned)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            level: if bits & 0x08 != 0 {
                IntLevel::ActiveLow
            } else {
                IntLevel::ActiveHigh
            },
            drive: if bits & 0x04 != 0 {
                IntDrive::OpenDrain
            } else {
                IntDrive::PushPull
            },
            mode: if bits & 0x02 != 0 {
                IntMode::Latch
            } else {
                IntMode::Pulse
            },
            clear: if bits & 0x01 != 0 {
                IntClear::AnyRead
            } else {
                IntClear::StatusRead
            },
        }
    }
}

bitflags! {
    /// Interrupt sources, laid out as in `INT_ENABLE` and `INT_STATUS`
    ///
    /// Bit 1 belongs to the DMP, which the driver does not run; it is never
    /// enabled and is dropped from status reads.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptMask: u8 {
        /// Motion detection (wake-on-motion on the MPU6500 family)
        const MOTION_DETECT = 1 << 6;
        /// FIFO overflow
        const FIFO_OVERFLOW = 1 << 4;
        /// Auxiliary I2C master or FSYNC interrupt
        const I2C_MST_FSYNC = 1 << 3;
        /// PLL ready (MPU6050 family)
        const PLL_READY = 1 << 2;
        /// New sensor data available
        const RAW_DATA_READY = 1 << 0;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InterruptMask({=u8:#04x})", self.bits());
    }
}

/// FSYNC pin active level (`INT_PIN_CFG.ACTL_FSYNC`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FsyncLevel {
    /// FSYNC interrupt on a high level
    #[default]
    ActiveHigh = 0,
    /// FSYNC interrupt on a low level
    ActiveLow = 1,
}
