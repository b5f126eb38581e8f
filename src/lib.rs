#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod chip;
pub mod device;
pub mod interface;
pub mod registers;
pub mod sensors;

pub mod aux_i2c;
pub mod fifo;
pub mod interrupt;
pub mod power;

// Re-export main types
pub use chip::{ChipFamily, ChipProfile};
pub use device::{AccelData, GyroData, MagData, MotionData, Mpu};
pub use interface::{I2cInterface, SpiInterface};
pub use sensors::{
    AccelDataG, AccelFullScale, Dlpf, Fchoice, GyroDataDps, GyroDataRps, GyroFullScale,
    MagAdjustment, MagDataUT, MagMode, MagSelfTest, MagSensitivity, TemperatureFormula,
};

pub use aux_i2c::{
    AuxI2cClock, AuxI2cConfig, AuxI2cState, AuxI2cStatus, AuxI2cTransition, AuxSlave,
    AuxSlaveConfig, AuxTransfer,
};
pub use fifo::{FifoLayout, FifoLevel, FifoMode, FifoSources};
pub use interrupt::{FsyncLevel, IntClear, IntDrive, IntLevel, IntMode, InterruptConfig, InterruptMask};
pub use power::{ClockSource, LpAccelRate, StandbyMask};

/// MPU I2C address when AD0 pin is low (default: 0x68)
///
/// Use [`I2cInterface::default()`] for this configuration.
pub const I2C_ADDRESS_AD0_LOW: u8 = 0x68;

/// MPU I2C address when AD0 pin is high (alternative: 0x69)
///
/// Use [`I2cInterface::alternative()`] for this configuration.
pub const I2C_ADDRESS_AD0_HIGH: u8 = 0x69;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// Argument outside the values the selected chip accepts
    InvalidArgument,
    /// Auxiliary I2C device did not acknowledge
    NotFound,
    /// Bounded status poll ran out of retries
    Timeout,
    /// Operation needs a mode that is not active
    InvalidState,
    /// Feature not present on the selected chip
    Unsupported,
    /// Invalid `WHO_AM_I` register value (contains the actual value read)
    InvalidDevice(u8),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}

impl<E> Error<E> {
    /// Kind of the error without the transport payload
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Bus(_) => ErrorKind::Bus,
            Self::InvalidArgument => ErrorKind::InvalidArgument,
            Self::NotFound => ErrorKind::NotFound,
            Self::Timeout => ErrorKind::Timeout,
            Self::InvalidState => ErrorKind::InvalidState,
            Self::Unsupported => ErrorKind::Unsupported,
            Self::InvalidDevice(_) => ErrorKind::InvalidDevice,
        }
    }
}

/// Error kind recorded in the driver's last-error slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// See [`Error::Bus`]
    Bus,
    /// See [`Error::InvalidArgument`]
    InvalidArgument,
    /// See [`Error::NotFound`]
    NotFound,
    /// See [`Error::Timeout`]
    Timeout,
    /// See [`Error::InvalidState`]
    InvalidState,
    /// See [`Error::Unsupported`]
    Unsupported,
    /// See [`Error::InvalidDevice`]
    InvalidDevice,
}
