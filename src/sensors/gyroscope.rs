//! Gyroscope full-scale ranges, filter settings and unit conversion

use super::INT16_MAX;

/// Gyroscope full-scale range (`GYRO_CONFIG.FS_SEL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFullScale {
    /// ±250 dps (most sensitive)
    Dps250 = 0,
    /// ±500 dps
    Dps500 = 1,
    /// ±1000 dps
    Dps1000 = 2,
    /// ±2000 dps (widest range)
    Dps2000 = 3,
}

impl GyroFullScale {
    /// All ranges in register order
    pub const ALL: [Self; 4] = [Self::Dps250, Self::Dps500, Self::Dps1000, Self::Dps2000];

    /// Decode the 2-bit `FS_SEL` field
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Dps250,
            1 => Self::Dps500,
            2 => Self::Dps1000,
            _ => Self::Dps2000,
        }
    }

    /// Full-scale value in degrees per second (`250 << fs`)
    #[must_use]
    pub const fn fsr_value(self) -> u16 {
        250 << self as u16
    }

    /// Sensitivity in LSB/dps (`131 / 2^fs`)
    #[must_use]
    pub fn sensitivity(self) -> f32 {
        131.0 / f32::from(1u8 << self as u8)
    }

    /// Resolution in dps/LSB (full-scale over 32767)
    #[must_use]
    pub fn resolution(self) -> f32 {
        f32::from(self.fsr_value()) / INT16_MAX
    }

    /// Convert one raw axis sample to degrees per second
    #[must_use]
    pub fn to_dps(self, raw: i16) -> f32 {
        f32::from(raw) * self.resolution()
    }

    /// Convert one raw axis sample to radians per second
    #[must_use]
    pub fn to_rad_per_sec(self, raw: i16) -> f32 {
        (core::f32::consts::PI / 180.0) * self.to_dps(raw)
    }
}

/// Digital low-pass filter setting (`CONFIG.DLPF_CFG`)
///
/// Names give the gyroscope bandwidth. Settings 0 and 7 leave the filter
/// disabled, which moves the internal sample clock from 1 kHz to 8 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dlpf {
    /// 256 Hz, no filtering
    Hz256NoLpf = 0,
    /// 188 Hz
    Hz188 = 1,
    /// 98 Hz
    Hz98 = 2,
    /// 42 Hz
    Hz42 = 3,
    /// 20 Hz
    Hz20 = 4,
    /// 10 Hz
    Hz10 = 5,
    /// 5 Hz
    Hz5 = 6,
    /// 3600 Hz, no filtering
    Hz3600NoLpf = 7,
}

impl Dlpf {
    /// All settings in register order
    pub const ALL: [Self; 8] = [
        Self::Hz256NoLpf,
        Self::Hz188,
        Self::Hz98,
        Self::Hz42,
        Self::Hz20,
        Self::Hz10,
        Self::Hz5,
        Self::Hz3600NoLpf,
    ];

    /// Decode the 3-bit `DLPF_CFG` field
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Hz256NoLpf,
            1 => Self::Hz188,
            2 => Self::Hz98,
            3 => Self::Hz42,
            4 => Self::Hz20,
            5 => Self::Hz10,
            6 => Self::Hz5,
            _ => Self::Hz3600NoLpf,
        }
    }

    /// Whether the filter is active (1 kHz internal rate)
    #[must_use]
    pub const fn is_filtering(self) -> bool {
        !matches!(self, Self::Hz256NoLpf | Self::Hz3600NoLpf)
    }

    /// Gyroscope 3dB bandwidth in Hz
    #[must_use]
    pub const fn bandwidth_hz(self) -> u16 {
        match self {
            Self::Hz256NoLpf => 256,
            Self::Hz188 => 188,
            Self::Hz98 => 98,
            Self::Hz42 => 42,
            Self::Hz20 => 20,
            Self::Hz10 => 10,
            Self::Hz5 => 5,
            Self::Hz3600NoLpf => 3600,
        }
    }
}

/// Filter bypass selection (MPU6500 family)
///
/// The register stores the inverse (`FCHOICE_B`). Any value other than
/// `Fchoice3` bypasses the low-pass filter and the sample rate divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fchoice {
    /// Bypass, 8800 Hz bandwidth
    Fchoice0 = 0,
    /// Bypass, 3600 Hz bandwidth
    Fchoice1 = 1,
    /// Bypass, 8800 Hz bandwidth (same as `Fchoice0`)
    Fchoice2 = 2,
    /// Low-pass filter and divider active
    Fchoice3 = 3,
}

impl Fchoice {
    /// Decode from the 2-bit `FCHOICE_B` register field
    #[must_use]
    pub const fn from_fchoice_b(bits: u8) -> Self {
        match !bits & 0x03 {
            0 => Self::Fchoice0,
            1 => Self::Fchoice1,
            2 => Self::Fchoice2,
            _ => Self::Fchoice3,
        }
    }

    /// Encode as the 2-bit `FCHOICE_B` register field
    #[must_use]
    pub const fn fchoice_b(self) -> u8 {
        !(self as u8) & 0x03
    }

    /// Whether the filter and sample rate divider are bypassed
    #[must_use]
    pub const fn is_bypass(self) -> bool {
        !matches!(self, Self::Fchoice3)
    }
}

/// Gyroscope data in degrees per second
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroDataDps {
    /// X-axis rotation rate in dps
    pub x: f32,
    /// Y-axis rotation rate in dps
    pub y: f32,
    /// Z-axis rotation rate in dps
    pub z: f32,
}

impl GyroDataDps {
    /// Convert raw axes using the resolution of `fs`
    #[must_use]
    pub fn from_raw(raw: crate::device::GyroData, fs: GyroFullScale) -> Self {
        Self {
            x: fs.to_dps(raw.x),
            y: fs.to_dps(raw.y),
            z: fs.to_dps(raw.z),
        }
    }

    /// Convert to radians per second
    #[must_use]
    pub fn to_rps(&self) -> GyroDataRps {
        const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
        GyroDataRps {
            x: self.x * DEG_TO_RAD,
            y: self.y * DEG_TO_RAD,
            z: self.z * DEG_TO_RAD,
        }
    }
}

/// Gyroscope data in radians per second
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroDataRps {
    /// X-axis rotation rate in rad/s
    pub x: f32,
    /// Y-axis rotation rate in rad/s
    pub y: f32,
    /// Z-axis rotation rate in rad/s
    pub z: f32,
}
