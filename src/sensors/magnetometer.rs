//! AK8975 / AK8963 magnetometer types and unit conversion
//!
//! The MPU9150 carries an AK8975 and the MPU9250 an AK8963. Both answer at
//! I2C address 0x0C on the auxiliary bus and share most of their register map.
//! Measurement registers are little-endian, unlike the MPU's own big-endian
//! data registers.

/// AK89xx I2C address on the auxiliary bus
pub const AK89XX_I2C_ADDRESS: u8 = 0x0C;
/// Expected `WIA` (device ID) value
pub const AK89XX_WHO_AM_I: u8 = 0x48;

/// AK89xx register addresses
pub mod registers {
    /// Device ID
    pub const WIA: u8 = 0x00;
    /// Status 1 (data ready)
    pub const ST1: u8 = 0x02;
    /// First measurement register (X low byte)
    pub const HXL: u8 = 0x03;
    /// Status 2 (overflow)
    pub const ST2: u8 = 0x09;
    /// Control 1 (mode and output bit width)
    pub const CNTL1: u8 = 0x0A;
    /// Control 2 (soft reset, AK8963 only)
    pub const CNTL2: u8 = 0x0B;
    /// Self-test control
    pub const ASTC: u8 = 0x0C;
    /// Sensitivity adjustment X (fuse ROM)
    pub const ASAX: u8 = 0x10;

    /// `CNTL1` operating mode bits
    pub const CNTL1_MODE_MASK: u8 = 0x0F;
    /// `CNTL1.BIT` selects 16-bit output (AK8963)
    pub const CNTL1_BIT: u8 = 1 << 4;
    /// `CNTL2.SRST`
    pub const CNTL2_SRST: u8 = 0x01;
    /// `ST2.HOFL` magnetic overflow
    pub const ST2_HOFL: u8 = 1 << 3;
    /// `ST1.DRDY` data ready
    pub const ST1_DRDY: u8 = 1 << 0;
    /// `ASTC.SELF` generates the self-test field
    pub const ASTC_SELF: u8 = 1 << 6;

    /// Bytes from `ST1` through `ST2`
    pub const ST1_TO_ST2_LEN: u8 = ST2 - ST1 + 1;
}

/// Magnetometer part fitted on the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ak89xx {
    /// AK8975 (MPU9150), 13-bit output
    Ak8975,
    /// AK8963 (MPU9250), 14 or 16-bit output
    Ak8963,
}

impl Ak89xx {
    /// Whether the part has a soft reset and selectable output width
    #[must_use]
    pub const fn has_extended_control(self) -> bool {
        matches!(self, Self::Ak8963)
    }

    /// Whether the part supports `mode`
    #[must_use]
    pub const fn supports_mode(self, mode: MagMode) -> bool {
        match self {
            Self::Ak8975 => matches!(
                mode,
                MagMode::PowerDown | MagMode::SingleMeasurement | MagMode::SelfTest | MagMode::FuseRom
            ),
            Self::Ak8963 => true,
        }
    }
}

/// Magnetometer operating mode (`CNTL1.MODE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagMode {
    /// Power-down mode
    PowerDown = 0x00,
    /// Single measurement, returns to power-down afterwards
    SingleMeasurement = 0x01,
    /// Continuous measurement at 8 Hz (AK8963)
    Continuous8Hz = 0x02,
    /// External trigger measurement (AK8963)
    ExternalTrigger = 0x04,
    /// Continuous measurement at 100 Hz (AK8963)
    Continuous100Hz = 0x06,
    /// Self-test mode
    SelfTest = 0x08,
    /// Fuse ROM access
    FuseRom = 0x0F,
}

impl MagMode {
    /// Decode the 4-bit `CNTL1.MODE` field
    ///
    /// Returns `None` for codes the parts do not define.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & registers::CNTL1_MODE_MASK {
            0x00 => Some(Self::PowerDown),
            0x01 => Some(Self::SingleMeasurement),
            0x02 => Some(Self::Continuous8Hz),
            0x04 => Some(Self::ExternalTrigger),
            0x06 => Some(Self::Continuous100Hz),
            0x08 => Some(Self::SelfTest),
            0x0F => Some(Self::FuseRom),
            _ => None,
        }
    }
}

/// Magnetometer output resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagSensitivity {
    /// 13-bit output, 0.3 µT/LSB (AK8975)
    Bits13,
    /// 14-bit output, 0.6 µT/LSB (AK8963)
    Bits14,
    /// 16-bit output, 0.15 µT/LSB (AK8963)
    Bits16,
}

impl MagSensitivity {
    /// Resolution in µT/LSB
    #[must_use]
    pub const fn micro_tesla_per_lsb(self) -> f32 {
        match self {
            Self::Bits13 => 0.3,
            Self::Bits14 => 0.6,
            Self::Bits16 => 0.15,
        }
    }

    /// Whether a raw self-test reading lies inside the datasheet limits for
    /// this output width
    ///
    /// X and Y must stay within `±xy`, Z within `z_min..=z_max`.
    #[must_use]
    pub const fn self_test_passes(self, raw: crate::device::MagData) -> bool {
        let (xy, z_min, z_max) = match self {
            Self::Bits13 => (100, -1000, -300),
            Self::Bits14 => (50, -800, -200),
            Self::Bits16 => (200, -3200, -800),
        };
        raw.x >= -xy && raw.x <= xy && raw.y >= -xy && raw.y <= xy && raw.z >= z_min && raw.z <= z_max
    }
}

/// Outcome of the magnetometer self-test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagSelfTest {
    /// Field measured with the internal self-test coil on
    pub raw: crate::device::MagData,
    /// Whether every axis is inside the limits for the part
    pub passed: bool,
}

/// Factory sensitivity adjustment bytes (`ASAX`..`ASAZ`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagAdjustment {
    /// X-axis adjustment
    pub x: u8,
    /// Y-axis adjustment
    pub y: u8,
    /// Z-axis adjustment
    pub z: u8,
}

impl Default for MagAdjustment {
    /// Neutral adjustment (scale factor of exactly 1)
    fn default() -> Self {
        Self {
            x: 128,
            y: 128,
            z: 128,
        }
    }
}

impl MagAdjustment {
    /// Apply the adjustment to raw axes
    #[must_use]
    pub fn apply(&self, raw: crate::device::MagData) -> crate::device::MagData {
        crate::device::MagData {
            x: mag_adjust(raw.x, self.x),
            y: mag_adjust(raw.y, self.y),
            z: mag_adjust(raw.z, self.z),
        }
    }
}

/// Apply a factory sensitivity adjustment byte to one raw axis
///
/// `adjusted = raw * ((adj - 128) * 0.5 / 128 + 1)`, truncated toward zero.
/// An adjustment of 128 leaves the value unchanged.
#[must_use]
pub fn mag_adjust(raw: i16, adj: u8) -> i16 {
    let factor = (f32::from(adj) - 128.0) * (0.5 / 128.0) + 1.0;
    (f32::from(raw) * factor) as i16
}

/// Magnetometer data in microtesla
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagDataUT {
    /// X-axis field in µT
    pub x: f32,
    /// Y-axis field in µT
    pub y: f32,
    /// Z-axis field in µT
    pub z: f32,
}

impl MagDataUT {
    /// Convert (already adjusted) raw axes using `sensitivity`
    #[must_use]
    pub fn from_raw(raw: crate::device::MagData, sensitivity: MagSensitivity) -> Self {
        let scale = sensitivity.micro_tesla_per_lsb();
        Self {
            x: f32::from(raw.x) * scale,
            y: f32::from(raw.y) * scale,
            z: f32::from(raw.z) * scale,
        }
    }

    /// Calculate the magnitude of the magnetic field vector
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}
