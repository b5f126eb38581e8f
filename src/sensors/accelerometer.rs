//! Accelerometer full-scale ranges and unit conversion

use super::INT16_MAX;

/// Accelerometer full-scale range (`ACCEL_CONFIG.AFS_SEL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFullScale {
    /// ±2g range (most sensitive, least range)
    G2 = 0,
    /// ±4g range
    G4 = 1,
    /// ±8g range
    G8 = 2,
    /// ±16g range (least sensitive, most range)
    G16 = 3,
}

impl AccelFullScale {
    /// All ranges in register order
    pub const ALL: [Self; 4] = [Self::G2, Self::G4, Self::G8, Self::G16];

    /// Decode the 2-bit `AFS_SEL` field
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::G2,
            1 => Self::G4,
            2 => Self::G8,
            _ => Self::G16,
        }
    }

    /// Full-scale value in g (`2 << fs`)
    #[must_use]
    pub const fn fsr_value(self) -> u16 {
        2 << self as u16
    }

    /// Sensitivity in LSB/g (`16384 >> fs`)
    #[must_use]
    pub const fn sensitivity(self) -> u16 {
        16384 >> self as u16
    }

    /// Resolution in g/LSB
    ///
    /// Computed as full-scale over 32767, so it is slightly larger than the
    /// inverse of [`sensitivity`](Self::sensitivity).
    #[must_use]
    pub fn resolution(self) -> f32 {
        f32::from(self.fsr_value()) / INT16_MAX
    }

    /// Convert one raw axis sample to g
    #[must_use]
    pub fn to_gravity(self, raw: i16) -> f32 {
        f32::from(raw) * self.resolution()
    }
}

/// Accelerometer data in physical units (g-force)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelDataG {
    /// X-axis acceleration in g
    pub x: f32,
    /// Y-axis acceleration in g
    pub y: f32,
    /// Z-axis acceleration in g
    pub z: f32,
}

impl AccelDataG {
    /// Convert raw axes using the resolution of `fs`
    #[must_use]
    pub fn from_raw(raw: crate::device::AccelData, fs: AccelFullScale) -> Self {
        Self {
            x: fs.to_gravity(raw.x),
            y: fs.to_gravity(raw.y),
            z: fs.to_gravity(raw.z),
        }
    }

    /// Calculate the magnitude of the acceleration vector
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}
