//! Sensor ranges and raw-to-physical unit conversion
//!
//! Everything in this module is pure arithmetic on register values and raw
//! samples:
//! - Accelerometer (3-axis)
//! - Gyroscope (3-axis) and the shared digital low-pass filter
//! - Temperature sensor
//! - Magnetometer (AK8975 / AK8963, on the 9-axis parts)
//!
//! Bus operations that produce the raw values live on [`Mpu`](crate::Mpu).

pub mod accelerometer;
pub mod gyroscope;
pub mod magnetometer;
pub mod temperature;

// Re-export main types
pub use accelerometer::{AccelDataG, AccelFullScale};
pub use gyroscope::{Dlpf, Fchoice, GyroDataDps, GyroDataRps, GyroFullScale};
pub use magnetometer::{
    Ak89xx, MagAdjustment, MagDataUT, MagMode, MagSelfTest, MagSensitivity, mag_adjust,
};
pub use temperature::TemperatureFormula;

/// Largest positive signed 16-bit sample, used as the resolution denominator
pub(crate) const INT16_MAX: f32 = 32767.0;
