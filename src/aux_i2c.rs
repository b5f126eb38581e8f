//! Auxiliary I2C master types
//!
//! The MPU contains a second I2C controller that talks to external sensors on
//! the auxiliary bus (AUX_DA/AUX_CL). It can run in two ways:
//! - **Master**: the MPU polls up to four slots (0..=3) every sample and
//!   stores the bytes in `EXT_SENS_DATA`; slot 4 performs single-byte
//!   transfers on request.
//! - **Bypass**: the host I2C bus is connected straight through to the
//!   auxiliary bus and the master is off.
//!
//! The driver never leaves both enabled: enabling the master clears bypass,
//! and enabling bypass switches the master off first.
//!
//! # Example
//!
//! ```ignore
//! # use invensense_mpu::aux_i2c::{AuxI2cConfig, AuxI2cClock, AuxSlave, AuxSlaveConfig, AuxTransfer};
//! # let mut imu: invensense_mpu::Mpu<_> = todo!();
//! imu.set_aux_i2c_config(AuxI2cConfig { clock: AuxI2cClock::Khz400, ..Default::default() })?;
//! imu.set_aux_i2c_slave_config(&AuxSlaveConfig {
//!     slave: AuxSlave::Slave0,
//!     address: 0x1E,
//!     register: 0x03,
//!     register_disabled: false,
//!     sample_delay: false,
//!     transfer: AuxTransfer::read(6),
//! })?;
//! imu.set_aux_i2c_slave_enabled(AuxSlave::Slave0, true)?;
//! imu.set_aux_i2c_enabled(true)?;
//! # Ok::<(), invensense_mpu::Error<()>>(())
//! ```

use bitflags::bitflags;

/// Auxiliary I2C master clock (`I2C_MST_CTRL.I2C_MST_CLK`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxI2cClock {
    /// 348 kHz
    Khz348 = 0,
    /// 333 kHz
    Khz333 = 1,
    /// 320 kHz
    Khz320 = 2,
    /// 308 kHz
    Khz308 = 3,
    /// 296 kHz
    Khz296 = 4,
    /// 286 kHz
    Khz286 = 5,
    /// 276 kHz
    Khz276 = 6,
    /// 267 kHz
    Khz267 = 7,
    /// 258 kHz
    Khz258 = 8,
    /// 500 kHz
    Khz500 = 9,
    /// 471 kHz
    Khz471 = 10,
    /// 444 kHz
    Khz444 = 11,
    /// 421 kHz
    Khz421 = 12,
    /// 400 kHz
    #[default]
    Khz400 = 13,
    /// 381 kHz
    Khz381 = 14,
    /// 364 kHz
    Khz364 = 15,
}

impl AuxI2cClock {
    const ALL: [Self; 16] = [
        Self::Khz348,
        Self::Khz333,
        Self::Khz320,
        Self::Khz308,
        Self::Khz296,
        Self::Khz286,
        Self::Khz276,
        Self::Khz267,
        Self::Khz258,
        Self::Khz500,
        Self::Khz471,
        Self::Khz444,
        Self::Khz421,
        Self::Khz400,
        Self::Khz381,
        Self::Khz364,
    ];

    /// Decode the 4-bit `I2C_MST_CLK` field
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0x0F) as usize]
    }
}

/// What the master does between slot transfers (`I2C_MST_CTRL.I2C_MST_P_NSR`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxI2cTransition {
    /// Repeated start between reads
    #[default]
    Restart = 0,
    /// Stop followed by start
    Stop = 1,
}

/// Auxiliary I2C master configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct AuxI2cConfig {
    /// Bus clock
    pub clock: AuxI2cClock,
    /// Multi-master arbitration
    pub multi_master: bool,
    /// Restart or stop between slot transfers
    pub transition: AuxI2cTransition,
    /// Slots with sample delay enabled are accessed every `1 + sample_delay`
    /// samples (0..=31)
    pub sample_delay: u8,
    /// Delay shadowing of external sensor data until all slots completed
    pub shadow_delay: bool,
    /// Delay the data ready interrupt until external sensor data is loaded
    pub wait_for_external_sensor: bool,
}

/// Periodic transfer slot of the auxiliary master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxSlave {
    /// Slot 0
    Slave0 = 0,
    /// Slot 1
    Slave1 = 1,
    /// Slot 2
    Slave2 = 2,
    /// Slot 3
    Slave3 = 3,
}

impl AuxSlave {
    /// All slots in order
    pub const ALL: [Self; 4] = [Self::Slave0, Self::Slave1, Self::Slave2, Self::Slave3];

    /// Address of the slot's `I2C_SLVx_ADDR` register
    #[must_use]
    pub const fn addr_register(self) -> u8 {
        crate::registers::slave_base(self as u8)
    }

    /// Address of the slot's `I2C_SLVx_REG` register
    #[must_use]
    pub const fn reg_register(self) -> u8 {
        self.addr_register() + 1
    }

    /// Address of the slot's `I2C_SLVx_CTRL` register
    #[must_use]
    pub const fn ctrl_register(self) -> u8 {
        self.addr_register() + 2
    }

    /// Address of the slot's `I2C_SLVx_DO` register
    #[must_use]
    pub const fn do_register(self) -> u8 {
        crate::registers::I2C_SLV0_DO + self as u8
    }

    /// `I2C_MST_DELAY_CTRL` bit enabling the sample delay for the slot
    #[must_use]
    pub const fn delay_enable_bit(self) -> u8 {
        1 << self as u8
    }
}

/// Direction and payload of a slot transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxTransfer {
    /// Read bytes into `EXT_SENS_DATA`
    Read {
        /// Number of bytes (0..=15)
        length: u8,
        /// Swap the bytes of each word
        swap_bytes: bool,
        /// Words end on odd register addresses instead of even
        group_end_of_word: bool,
    },
    /// Write one byte from `I2C_SLVx_DO`
    Write {
        /// Byte to write
        data: u8,
    },
}

impl AuxTransfer {
    /// Plain read of `length` bytes
    #[must_use]
    pub const fn read(length: u8) -> Self {
        Self::Read {
            length,
            swap_bytes: false,
            group_end_of_word: false,
        }
    }

    /// Plain write of one byte
    #[must_use]
    pub const fn write(data: u8) -> Self {
        Self::Write { data }
    }
}

/// Configuration of one periodic transfer slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AuxSlaveConfig {
    /// Slot to program
    pub slave: AuxSlave,
    /// 7-bit device address
    pub address: u8,
    /// Device register the transfer starts at
    pub register: u8,
    /// Transfer data only, without sending the register address
    pub register_disabled: bool,
    /// Apply `AuxI2cConfig::sample_delay` to the slot
    pub sample_delay: bool,
    /// Direction and payload
    pub transfer: AuxTransfer,
}

impl AuxSlaveConfig {
    /// Largest read length of a slot
    pub const MAX_READ_LENGTH: u8 = crate::registers::SLV_LEN_MASK;

    /// Number of bytes the slot contributes to `EXT_SENS_DATA` and the FIFO
    #[must_use]
    pub const fn read_length(&self) -> u8 {
        match self.transfer {
            AuxTransfer::Read { length, .. } => length,
            AuxTransfer::Write { .. } => 0,
        }
    }
}

bitflags! {
    /// Auxiliary master status (`I2C_MST_STATUS`), cleared when read
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuxI2cStatus: u8 {
        /// Level of the FSYNC pin
        const PASS_THROUGH = 1 << 7;
        /// Slot 4 transfer finished
        const SLV4_DONE = 1 << 6;
        /// Lost arbitration on the auxiliary bus
        const LOST_ARBITRATION = 1 << 5;
        /// Slot 4 not acknowledged
        const SLV4_NACK = 1 << 4;
        /// Slot 3 not acknowledged
        const SLV3_NACK = 1 << 3;
        /// Slot 2 not acknowledged
        const SLV2_NACK = 1 << 2;
        /// Slot 1 not acknowledged
        const SLV1_NACK = 1 << 1;
        /// Slot 0 not acknowledged
        const SLV0_NACK = 1 << 0;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AuxI2cStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AuxI2cStatus({=u8:#04x})", self.bits());
    }
}

/// Who drives the auxiliary bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxI2cState {
    /// Master off, bypass off
    Disabled,
    /// Host bus connected through to the auxiliary bus
    Bypass,
    /// Auxiliary master running
    MasterActive,
}
