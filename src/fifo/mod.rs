//! FIFO (First In First Out) buffer management
//!
//! The MPU6050 family has a 1024-byte FIFO, the MPU6500 family a 512-byte one.
//! Every sample period the chip appends one packet holding the enabled sources
//! in register order:
//! 1. Accelerometer (6 bytes)
//! 2. Temperature (2 bytes)
//! 3. Gyroscope X, Y, Z (2 bytes per enabled axis)
//! 4. Auxiliary slots 0..=3 (their configured read length)
//!
//! The byte count register is not cleared when the sources change, so call
//! [`Mpu::reset_fifo`](crate::Mpu::reset_fifo) after reconfiguring. When the
//! FIFO is full in [`FifoMode::StopWhenFull`] new samples are dropped
//! silently; only `INT_STATUS.FIFO_OVERFLOW` reports it.
//!
//! # Example
//!
//! ```ignore
//! # use invensense_mpu::fifo::FifoSources;
//! # let mut imu: invensense_mpu::Mpu<_> = todo!();
//! imu.set_fifo_config(FifoSources::ACCEL | FifoSources::GYRO)?;
//! imu.reset_fifo()?;
//! imu.set_fifo_enabled(true)?;
//!
//! let level = imu.read_fifo_level()?;
//! let mut buffer = [0u8; 512];
//! let n = level.packets() * usize::from(level.packet_size);
//! imu.read_fifo(&mut buffer[..n])?;
//! # Ok::<(), invensense_mpu::Error<()>>(())
//! ```

pub mod parser;

use bitflags::bitflags;

bitflags! {
    /// Data sources written to the FIFO
    ///
    /// The low byte matches `FIFO_EN`; `SLAVE3` is `I2C_MST_CTRL.SLV_3_FIFO_EN`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FifoSources: u16 {
        /// Auxiliary slot 0
        const SLAVE0 = 1 << 0;
        /// Auxiliary slot 1
        const SLAVE1 = 1 << 1;
        /// Auxiliary slot 2
        const SLAVE2 = 1 << 2;
        /// Accelerometer X, Y and Z
        const ACCEL = 1 << 3;
        /// Gyroscope Z axis
        const GYRO_Z = 1 << 4;
        /// Gyroscope Y axis
        const GYRO_Y = 1 << 5;
        /// Gyroscope X axis
        const GYRO_X = 1 << 6;
        /// Temperature sensor
        const TEMPERATURE = 1 << 7;
        /// Auxiliary slot 3
        const SLAVE3 = 1 << 8;

        /// All gyroscope axes
        const GYRO = Self::GYRO_X.bits() | Self::GYRO_Y.bits() | Self::GYRO_Z.bits();
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FifoSources {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FifoSources({=u16:#06x})", self.bits());
    }
}

impl FifoSources {
    /// Slot sources in slot order
    pub const SLAVES: [Self; 4] = [Self::SLAVE0, Self::SLAVE1, Self::SLAVE2, Self::SLAVE3];

    /// Value of the `FIFO_EN` register
    #[must_use]
    pub const fn fifo_en_bits(self) -> u8 {
        (self.bits() & 0xFF) as u8
    }

    /// Rebuild from `FIFO_EN` and the `SLV_3_FIFO_EN` bit
    #[must_use]
    pub const fn from_registers(fifo_en: u8, slave3: bool) -> Self {
        let high = if slave3 { Self::SLAVE3.bits() } else { 0 };
        Self::from_bits_retain(fifo_en as u16 | high)
    }
}

/// Behaviour when the FIFO is full (`CONFIG.FIFO_MODE`, MPU6500 family)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoMode {
    /// Oldest data is overwritten
    #[default]
    Overwrite = 0,
    /// New samples are dropped
    StopWhenFull = 1,
}

/// Geometry of a FIFO packet
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoLayout {
    /// Enabled sources
    pub sources: FifoSources,
    /// Read length of each auxiliary slot
    pub slave_lengths: [u8; 4],
}

impl Default for FifoSources {
    fn default() -> Self {
        Self::empty()
    }
}

impl FifoLayout {
    /// Layout with sensor sources only
    #[must_use]
    pub const fn new(sources: FifoSources) -> Self {
        Self {
            sources,
            slave_lengths: [0; 4],
        }
    }

    /// Bytes per packet
    #[must_use]
    pub const fn packet_size(&self) -> u16 {
        packet_size(self.sources, self.slave_lengths)
    }
}

/// Bytes per FIFO packet for `sources`
///
/// Accelerometer contributes 6 bytes, temperature 2, each gyroscope axis 2,
/// and each enabled slot the length in `slave_lengths`.
#[must_use]
pub const fn packet_size(sources: FifoSources, slave_lengths: [u8; 4]) -> u16 {
    let mut size = 0u16;
    if sources.contains(FifoSources::ACCEL) {
        size += 6;
    }
    if sources.contains(FifoSources::TEMPERATURE) {
        size += 2;
    }
    if sources.contains(FifoSources::GYRO_X) {
        size += 2;
    }
    if sources.contains(FifoSources::GYRO_Y) {
        size += 2;
    }
    if sources.contains(FifoSources::GYRO_Z) {
        size += 2;
    }
    let mut slot = 0;
    while slot < FifoSources::SLAVES.len() {
        if sources.contains(FifoSources::SLAVES[slot]) {
            size += slave_lengths[slot] as u16;
        }
        slot += 1;
    }
    size
}

/// FIFO fill level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoLevel {
    /// Bytes in the FIFO
    pub bytes: u16,
    /// Bytes per packet for the current configuration
    pub packet_size: u16,
}

impl FifoLevel {
    /// Number of complete packets in the FIFO
    #[must_use]
    pub const fn packets(&self) -> usize {
        if self.packet_size == 0 {
            0
        } else {
            (self.bytes / self.packet_size) as usize
        }
    }
}
