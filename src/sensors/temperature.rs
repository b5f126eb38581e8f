//! Temperature sensor conversion
//!
//! The two chip families use different offsets and sensitivities, so the
//! formula is a value selected by the [`ChipProfile`](crate::chip::ChipProfile)
//! rather than a single shared function.

use super::INT16_MAX;

/// Temperature span covered by the full 16-bit range, in °C
const TEMP_SPAN_C: f32 = 98.67;

/// Constants of a temperature conversion formula
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureFormula {
    /// Raw reading at the reference temperature, in LSB
    pub room_temp_offset: i16,
    /// Reference temperature in °C
    pub celsius_offset: f32,
    /// Datasheet sensitivity in LSB/°C
    pub sensitivity: f32,
}

impl TemperatureFormula {
    /// MPU6000, MPU6050 and MPU9150
    pub const MPU6050: Self = Self {
        room_temp_offset: -521,
        celsius_offset: 35.0,
        sensitivity: 340.0,
    };

    /// MPU6500 and MPU9250
    pub const MPU6500: Self = Self {
        room_temp_offset: 0,
        celsius_offset: 21.0,
        sensitivity: 333.87,
    };

    /// Resolution in °C/LSB
    #[must_use]
    pub fn resolution(&self) -> f32 {
        TEMP_SPAN_C / INT16_MAX
    }

    fn scaled(&self, raw: i16) -> f32 {
        (f32::from(raw) - f32::from(self.room_temp_offset)) * self.resolution()
    }

    /// Convert a raw reading to °C
    #[must_use]
    pub fn celsius(&self, raw: i16) -> f32 {
        self.scaled(raw) + self.celsius_offset
    }

    /// Convert a raw reading to °F
    #[must_use]
    pub fn fahrenheit(&self, raw: i16) -> f32 {
        self.scaled(raw) * 1.8 + (self.celsius_offset * 1.8 + 32.0)
    }
}
