//! High-level driver API for the MPU family
//!
//! [`Mpu`] owns the bus interface and translates every logical setting into
//! register accesses. Setters validate their argument before touching the bus,
//! then perform one read-modify-write when they own part of a register or one
//! blind write when they own all of it. Getters read the registers back and
//! decode them; nothing is cached, so a getter always reflects the chip.
//!
//! Every error returned by a method is also stored in the driver's last-error
//! slot, see [`Mpu::last_error`].

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

use crate::aux_i2c::{
    AuxI2cClock, AuxI2cConfig, AuxI2cState, AuxI2cStatus, AuxI2cTransition, AuxSlave,
    AuxSlaveConfig, AuxTransfer,
};
use crate::chip::ChipProfile;
use crate::fifo::{FifoLayout, FifoLevel, FifoMode, FifoSources};
use crate::interrupt::{FsyncLevel, InterruptConfig, InterruptMask};
use crate::power::{ClockSource, LpAccelRate, StandbyMask};
use crate::registers::{self as reg, Field};
use crate::sensors::magnetometer::{self as ak, AK89XX_I2C_ADDRESS, AK89XX_WHO_AM_I};
use crate::sensors::{
    AccelDataG, AccelFullScale, Ak89xx, Dlpf, Fchoice, GyroDataDps, GyroFullScale,
    MagAdjustment, MagDataUT, MagMode, MagSelfTest, MagSensitivity,
};
use crate::{Error, ErrorKind};

/// Internal sample clock with the low-pass filter active
const GYRO_RATE_FILTERED_HZ: u16 = 1_000;
/// Internal sample clock with the low-pass filter disabled
const GYRO_RATE_UNFILTERED_HZ: u16 = 8_000;
/// Output rate when FCHOICE bypasses the filter and the divider
const GYRO_RATE_BYPASS_HZ: u16 = 32_000;

/// Default number of `I2C_MST_STATUS` polls for a slot 4 transfer.
/// With 1ms delay per poll this gives a 50ms timeout.
pub const DEFAULT_AUX_I2C_RETRIES: u16 = 50;

/// Slots [`Mpu::compass_init`] programs for periodic magnetometer sampling
const COMPASS_SLOTS: [AuxSlave; 2] = [AuxSlave::Slave0, AuxSlave::Slave1];

/// Polls of `DEVICE_RESET` before a reset is considered stuck
const RESET_POLL_RETRIES: u32 = 100;

/// Accelerometer data (raw 16-bit values)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelData {
    /// X-axis acceleration (raw)
    pub x: i16,
    /// Y-axis acceleration (raw)
    pub y: i16,
    /// Z-axis acceleration (raw)
    pub z: i16,
}

/// Gyroscope data (raw 16-bit values)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroData {
    /// X-axis rotation (raw)
    pub x: i16,
    /// Y-axis rotation (raw)
    pub y: i16,
    /// Z-axis rotation (raw)
    pub z: i16,
}

/// Magnetometer data (raw 16-bit values)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagData {
    /// X-axis magnetic field (raw)
    pub x: i16,
    /// Y-axis magnetic field (raw)
    pub y: i16,
    /// Z-axis magnetic field (raw)
    pub z: i16,
}

/// Accelerometer, temperature and gyroscope sampled together
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionData {
    /// Accelerometer (raw)
    pub accel: AccelData,
    /// Temperature (raw)
    pub temperature: i16,
    /// Gyroscope (raw)
    pub gyro: GyroData,
}

fn axes(bytes: &[u8]) -> [i16; 3] {
    [
        i16::from_be_bytes([bytes[0], bytes[1]]),
        i16::from_be_bytes([bytes[2], bytes[3]]),
        i16::from_be_bytes([bytes[4], bytes[5]]),
    ]
}

/// Main driver for the MPU family
pub struct Mpu<I> {
    interface: I,
    profile: &'static ChipProfile,
    last_error: Option<ErrorKind>,
    aux_retries: u16,
}

impl<I> Mpu<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Create a new driver instance for the chip described by `profile`
    ///
    /// This verifies the `WHO_AM_I` register but does not configure the
    /// device. Call [`initialize`](Self::initialize) afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails
    /// - The `WHO_AM_I` register does not match the profile
    pub fn new(interface: I, profile: &'static ChipProfile) -> Result<Self, Error<I::Error>> {
        let mut driver = Self {
            interface,
            profile,
            last_error: None,
            aux_retries: DEFAULT_AUX_I2C_RETRIES,
        };

        driver.test_connection()?;
        Ok(driver)
    }

    /// Chip profile selected at construction
    pub const fn profile(&self) -> &'static ChipProfile {
        self.profile
    }

    /// Consume the driver and return the interface
    pub fn release(self) -> I {
        self.interface
    }

    /// Kind of the most recent error, if any
    pub const fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Return and clear the most recent error
    pub const fn take_last_error(&mut self) -> Option<ErrorKind> {
        self.last_error.take()
    }

    // Register access helpers

    fn fail<T>(&mut self, error: Error<I::Error>) -> Result<T, Error<I::Error>> {
        self.last_error = Some(error.kind());
        Err(error)
    }

    fn read_bytes(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error<I::Error>> {
        let size_bits = (buffer.len() * 8) as u32;
        match self.interface.read_register(register, size_bits, buffer) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(Error::Bus(e)),
        }
    }

    fn write_bytes(&mut self, register: u8, data: &[u8]) -> Result<(), Error<I::Error>> {
        let size_bits = (data.len() * 8) as u32;
        match self.interface.write_register(register, size_bits, data) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(Error::Bus(e)),
        }
    }

    fn read_byte(&mut self, register: u8) -> Result<u8, Error<I::Error>> {
        let mut buffer = [0u8; 1];
        self.read_bytes(register, &mut buffer)?;
        Ok(buffer[0])
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.write_bytes(register, &[value])
    }

    /// Read-modify-write of one register; nothing is written if the read fails
    fn modify<F>(&mut self, register: u8, f: F) -> Result<(), Error<I::Error>>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read_byte(register)?;
        self.write_byte(register, f(value))
    }

    fn read_field(&mut self, field: Field) -> Result<u8, Error<I::Error>> {
        Ok(field.extract(self.read_byte(field.register)?))
    }

    fn write_field(&mut self, field: Field, value: u8) -> Result<(), Error<I::Error>> {
        self.modify(field.register, |current| field.insert(current, value))
    }

    fn read_flag(&mut self, field: Field) -> Result<bool, Error<I::Error>> {
        Ok(self.read_field(field)? != 0)
    }

    fn write_flag(&mut self, field: Field, enable: bool) -> Result<(), Error<I::Error>> {
        self.write_field(field, u8::from(enable))
    }

    /// Resolve a field that only some chips have
    fn chip_field(&mut self, field: Option<Field>) -> Result<Field, Error<I::Error>> {
        match field {
            Some(field) => Ok(field),
            None => self.fail(Error::Unsupported),
        }
    }

    // Identity and reset

    /// Read the `WHO_AM_I` register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_who_am_i(&mut self) -> Result<u8, Error<I::Error>> {
        self.read_byte(reg::WHO_AM_I)
    }

    /// Check that the device answers with the profile's `WHO_AM_I` value
    ///
    /// # Errors
    ///
    /// Returns `InvalidDevice` with the value read on mismatch, or a bus error.
    pub fn test_connection(&mut self) -> Result<(), Error<I::Error>> {
        let who_am_i = self.read_who_am_i()?;
        if who_am_i != self.profile.who_am_i {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{}: unexpected WHO_AM_I {=u8:#04x}",
                self.profile.name,
                who_am_i
            );
            return self.fail(Error::InvalidDevice(who_am_i));
        }
        Ok(())
    }

    /// Reset all registers to their power-on values
    ///
    /// The chip comes out of reset asleep.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if `DEVICE_RESET` does not clear within 100ms, or a
    /// bus error.
    pub fn reset<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.write_byte(reg::PWR_MGMT_1, reg::DEVICE_RESET.mask())?;

        for _ in 0..RESET_POLL_RETRIES {
            delay.delay_ms(1);
            if !self.read_flag(reg::DEVICE_RESET)? {
                #[cfg(feature = "defmt")]
                defmt::debug!("{}: reset complete", self.profile.name);
                return Ok(());
            }
        }

        self.fail(Error::Timeout)
    }

    /// Bring the chip into a known operating state
    ///
    /// Wakes the chip and selects the PLL clock, ±500 dps, ±4 g, a 42 Hz low
    /// pass filter and a 100 Hz sample rate. On the MPU6500 family the filter
    /// bypass is cleared. Only registers are written, so calling this again
    /// after a power cycle or a [`reset`](Self::reset) restores the same
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn initialize(&mut self) -> Result<(), Error<I::Error>> {
        self.set_sleep(false)?;
        self.set_clock_source(ClockSource::Pll)?;
        self.set_gyro_full_scale(GyroFullScale::Dps500)?;
        self.set_accel_full_scale(AccelFullScale::G4)?;
        self.set_dlpf(Dlpf::Hz42)?;
        if self.profile.registers.fchoice_b.is_some() {
            self.set_fchoice(Fchoice::Fchoice3)?;
        }
        self.set_sample_rate(100)?;
        Ok(())
    }

    /// Disable the I2C slave interface so the chip only listens on SPI
    ///
    /// Call this right after construction when using [`SpiInterface`](crate::SpiInterface).
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn enable_spi_mode(&mut self) -> Result<(), Error<I::Error>> {
        self.write_flag(reg::I2C_IF_DIS, true)
    }

    /// Reset the analog and digital signal paths of all sensors
    ///
    /// Sensor registers are cleared; configuration is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn reset_signal_path(&mut self) -> Result<(), Error<I::Error>> {
        self.write_byte(reg::SIGNAL_PATH_RESET, reg::SIGNAL_PATH_RESET_ALL)
    }

    // Power management

    /// Enter or leave sleep mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_sleep(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        self.write_flag(reg::SLEEP, enable)
    }

    /// Whether the chip is in sleep mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_sleep(&mut self) -> Result<bool, Error<I::Error>> {
        self.read_flag(reg::SLEEP)
    }

    /// Select the clock source
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an external reference on a chip without
    /// clock inputs, or a bus error.
    pub fn set_clock_source(&mut self, source: ClockSource) -> Result<(), Error<I::Error>> {
        if source.is_external() && !self.profile.has_external_clock() {
            return self.fail(Error::InvalidArgument);
        }
        self.write_field(reg::CLKSEL, source as u8)
    }

    /// Read the clock source
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_clock_source(&mut self) -> Result<ClockSource, Error<I::Error>> {
        Ok(ClockSource::from_bits(self.read_field(reg::CLKSEL)?))
    }

    /// Put sensors into standby
    ///
    /// `PWR_MGMT_1` and `PWR_MGMT_2` are adjacent, so both are read and then
    /// written back in one burst each. Bits outside the mask are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_standby_mask(&mut self, mask: StandbyMask) -> Result<(), Error<I::Error>> {
        let mut pwr = [0u8; 2];
        self.read_bytes(reg::PWR_MGMT_1, &mut pwr)?;
        pwr[0] = (pwr[0] & !reg::PWR1_STANDBY_MASK) | mask.pwr_mgmt_1_bits();
        pwr[1] = (pwr[1] & !reg::PWR2_STANDBY_MASK) | mask.pwr_mgmt_2_bits();
        self.write_bytes(reg::PWR_MGMT_1, &pwr)
    }

    /// Read the sensors in standby
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_standby_mask(&mut self) -> Result<StandbyMask, Error<I::Error>> {
        let mut pwr = [0u8; 2];
        self.read_bytes(reg::PWR_MGMT_1, &mut pwr)?;
        Ok(StandbyMask::from_registers(pwr[0], pwr[1]))
    }

    /// Enter or leave the low-power accelerometer mode
    ///
    /// Entering sets `CYCLE`, clears `SLEEP`, disables the temperature sensor
    /// and puts the gyroscope axes into standby. On the MPU6500 family the
    /// accelerometer filter is bypassed as the datasheet requires. Leaving
    /// reverses these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_low_power_accel_mode(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        let gyro = StandbyMask::GYRO.bits();
        let mut pwr = [0u8; 2];
        self.read_bytes(reg::PWR_MGMT_1, &mut pwr)?;
        let accel = match self.profile.registers.accel_fchoice_b {
            Some(field) => Some((field, self.read_byte(field.register)?)),
            None => None,
        };

        pwr[0] = reg::CYCLE.insert(pwr[0], u8::from(enable));
        pwr[0] = reg::TEMP_DIS.insert(pwr[0], u8::from(enable));
        pwr[0] = reg::GYRO_STANDBY.insert(pwr[0], 0);
        if enable {
            pwr[0] = reg::SLEEP.insert(pwr[0], 0);
            pwr[1] = (pwr[1] & !StandbyMask::ACCEL.bits()) | gyro;
        } else {
            pwr[1] &= !gyro;
        }
        self.write_bytes(reg::PWR_MGMT_1, &pwr)?;

        if let Some((field, value)) = accel {
            self.write_byte(field.register, field.insert(value, u8::from(enable)))?;
        }
        Ok(())
    }

    /// Whether the low-power accelerometer mode is active
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_low_power_accel_mode(&mut self) -> Result<bool, Error<I::Error>> {
        let gyro = StandbyMask::GYRO.bits();
        let mut pwr = [0u8; 2];
        self.read_bytes(reg::PWR_MGMT_1, &mut pwr)?;
        Ok(reg::CYCLE.extract(pwr[0]) != 0
            && reg::SLEEP.extract(pwr[0]) == 0
            && reg::TEMP_DIS.extract(pwr[0]) != 0
            && pwr[1] & gyro == gyro)
    }

    /// Select the wake-up rate of the low-power accelerometer mode
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the chip family does not offer `rate`, or
    /// a bus error.
    pub fn set_low_power_accel_rate(&mut self, rate: LpAccelRate) -> Result<(), Error<I::Error>> {
        let Some(code) = rate.code(self.profile.family) else {
            return self.fail(Error::InvalidArgument);
        };
        let field = self.low_power_rate_field()?;
        self.write_field(field, code)
    }

    /// Read the wake-up rate of the low-power accelerometer mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_low_power_accel_rate(&mut self) -> Result<LpAccelRate, Error<I::Error>> {
        let field = self.low_power_rate_field()?;
        let code = self.read_field(field)?;
        match LpAccelRate::from_code(self.profile.family, code) {
            Some(rate) => Ok(rate),
            None => self.fail(Error::InvalidState),
        }
    }

    fn low_power_rate_field(&mut self) -> Result<Field, Error<I::Error>> {
        let map = self.profile.registers;
        self.chip_field(map.lp_accel_odr.or(map.lp_wake_ctrl))
    }

    // Sensor configuration

    /// Set the gyroscope full-scale range
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_gyro_full_scale(&mut self, fs: GyroFullScale) -> Result<(), Error<I::Error>> {
        self.write_field(reg::GYRO_FS_SEL, fs as u8)
    }

    /// Read the gyroscope full-scale range
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyro_full_scale(&mut self) -> Result<GyroFullScale, Error<I::Error>> {
        Ok(GyroFullScale::from_bits(self.read_field(reg::GYRO_FS_SEL)?))
    }

    /// Set the accelerometer full-scale range
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_accel_full_scale(&mut self, fs: AccelFullScale) -> Result<(), Error<I::Error>> {
        self.write_field(reg::ACCEL_FS_SEL, fs as u8)
    }

    /// Read the accelerometer full-scale range
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accel_full_scale(&mut self) -> Result<AccelFullScale, Error<I::Error>> {
        Ok(AccelFullScale::from_bits(self.read_field(reg::ACCEL_FS_SEL)?))
    }

    /// Set the digital low-pass filter
    ///
    /// On the MPU6500 family the accelerometer has its own filter setting,
    /// which is set to the same code. The sample rate may change base clock
    /// with the filter; re-read it with [`read_sample_rate`](Self::read_sample_rate).
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_dlpf(&mut self, dlpf: Dlpf) -> Result<(), Error<I::Error>> {
        let config = self.read_byte(reg::DLPF_CFG.register)?;
        let accel = match self.profile.registers.accel_dlpf {
            Some(field) => Some((field, self.read_byte(field.register)?)),
            None => None,
        };

        self.write_byte(reg::DLPF_CFG.register, reg::DLPF_CFG.insert(config, dlpf as u8))?;
        if let Some((field, value)) = accel {
            self.write_byte(field.register, field.insert(value, dlpf as u8))?;
        }
        Ok(())
    }

    /// Read the digital low-pass filter
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_dlpf(&mut self) -> Result<Dlpf, Error<I::Error>> {
        Ok(Dlpf::from_bits(self.read_field(reg::DLPF_CFG)?))
    }

    /// Select the filter bypass (MPU6500 family)
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on the MPU6050 family, or a bus error.
    pub fn set_fchoice(&mut self, fchoice: Fchoice) -> Result<(), Error<I::Error>> {
        let field = self.chip_field(self.profile.registers.fchoice_b)?;
        self.write_field(field, fchoice.fchoice_b())
    }

    /// Read the filter bypass (MPU6500 family)
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on the MPU6050 family, or a bus error.
    pub fn read_fchoice(&mut self) -> Result<Fchoice, Error<I::Error>> {
        let field = self.chip_field(self.profile.registers.fchoice_b)?;
        Ok(Fchoice::from_fchoice_b(self.read_field(field)?))
    }

    /// Internal clock the divider applies to for the `CONFIG` value
    const fn divider_base(config: u8) -> u16 {
        if Dlpf::from_bits(reg::DLPF_CFG.extract(config)).is_filtering() {
            GYRO_RATE_FILTERED_HZ
        } else {
            GYRO_RATE_UNFILTERED_HZ
        }
    }

    fn rate_bypassed(&self, gyro_config: u8) -> bool {
        self.profile
            .registers
            .fchoice_b
            .is_some_and(|field| Fchoice::from_fchoice_b(field.extract(gyro_config)).is_bypass())
    }

    /// Decode `[SMPLRT_DIV, CONFIG, GYRO_CONFIG]` into the output rate in Hz
    fn decode_sample_rate(&self, regs: [u8; 3]) -> u16 {
        if self.rate_bypassed(regs[2]) {
            return GYRO_RATE_BYPASS_HZ;
        }
        Self::divider_base(regs[1]) / (u16::from(regs[0]) + 1)
    }

    /// Set the sample rate in Hz
    ///
    /// The divider counts from 1 kHz while the low-pass filter is active and
    /// from 8 kHz while it is disabled. Requests outside
    /// `[ceil(base / 256), base]` are clamped to the nearest achievable rate.
    /// While the MPU6500 filter bypass is active the divider has no effect; it
    /// is still written and applies once the bypass is cleared.
    ///
    /// Returns the rate the chip now produces, which may differ from `rate`
    /// because the divider is an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_sample_rate(&mut self, rate: u16) -> Result<u16, Error<I::Error>> {
        // SMPLRT_DIV, CONFIG and GYRO_CONFIG are adjacent
        let mut regs = [0u8; 3];
        self.read_bytes(reg::SMPLRT_DIV, &mut regs)?;

        let base = Self::divider_base(regs[1]);
        let clamped = rate.clamp(base.div_ceil(256), base);
        if clamped != rate {
            #[cfg(feature = "defmt")]
            defmt::warn!("sample rate {=u16} Hz clamped to {=u16} Hz", rate, clamped);
        }
        if self.rate_bypassed(regs[2]) {
            #[cfg(feature = "defmt")]
            defmt::warn!("sample rate divider has no effect while FCHOICE bypasses the filter");
        }

        regs[0] = (base / clamped - 1) as u8;
        self.write_byte(reg::SMPLRT_DIV, regs[0])?;
        Ok(self.decode_sample_rate(regs))
    }

    /// Read the current sample rate in Hz
    ///
    /// Derived from the divider, the filter and the filter bypass each time.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_sample_rate(&mut self) -> Result<u16, Error<I::Error>> {
        let mut regs = [0u8; 3];
        self.read_bytes(reg::SMPLRT_DIV, &mut regs)?;
        Ok(self.decode_sample_rate(regs))
    }

    // Sensor data

    /// Read raw accelerometer data
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accel(&mut self) -> Result<AccelData, Error<I::Error>> {
        let mut data = [0u8; 6];
        self.read_bytes(reg::ACCEL_XOUT_H, &mut data)?;
        let [x, y, z] = axes(&data);
        Ok(AccelData { x, y, z })
    }

    /// Read raw gyroscope data
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyro(&mut self) -> Result<GyroData, Error<I::Error>> {
        let mut data = [0u8; 6];
        self.read_bytes(reg::GYRO_XOUT_H, &mut data)?;
        let [x, y, z] = axes(&data);
        Ok(GyroData { x, y, z })
    }

    /// Read the raw temperature
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_temperature(&mut self) -> Result<i16, Error<I::Error>> {
        let mut data = [0u8; 2];
        self.read_bytes(reg::TEMP_OUT_H, &mut data)?;
        Ok(i16::from_be_bytes(data))
    }

    /// Read accelerometer, temperature and gyroscope in one burst
    ///
    /// All values come from the same sample.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_motion(&mut self) -> Result<MotionData, Error<I::Error>> {
        let mut data = [0u8; 14];
        self.read_bytes(reg::ACCEL_XOUT_H, &mut data)?;
        let [ax, ay, az] = axes(&data[0..6]);
        let [gx, gy, gz] = axes(&data[8..14]);
        Ok(MotionData {
            accel: AccelData {
                x: ax,
                y: ay,
                z: az,
            },
            temperature: i16::from_be_bytes([data[6], data[7]]),
            gyro: GyroData {
                x: gx,
                y: gy,
                z: gz,
            },
        })
    }

    /// Read accelerometer data in g using the current full-scale range
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accelerometer(&mut self) -> Result<AccelDataG, Error<I::Error>> {
        let fs = self.read_accel_full_scale()?;
        let raw = self.read_accel()?;
        Ok(AccelDataG::from_raw(raw, fs))
    }

    /// Read gyroscope data in degrees per second using the current full-scale range
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyroscope(&mut self) -> Result<GyroDataDps, Error<I::Error>> {
        let fs = self.read_gyro_full_scale()?;
        let raw = self.read_gyro()?;
        Ok(GyroDataDps::from_raw(raw, fs))
    }

    /// Read the temperature in °C using the profile's formula
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_temperature_celsius(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_temperature()?;
        Ok(self.profile.temperature.celsius(raw))
    }

    /// Read the temperature in °F using the profile's formula
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_temperature_fahrenheit(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_temperature()?;
        Ok(self.profile.temperature.fahrenheit(raw))
    }

    // Interrupts

    /// Configure the interrupt pin
    ///
    /// Only `INT_PIN_CFG` bits 7:4 are changed; FSYNC and bypass settings are
    /// preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_interrupt_config(&mut self, config: InterruptConfig) -> Result<(), Error<I::Error>> {
        self.write_field(reg::INT_PIN_SETTINGS, config.to_bits())
    }

    /// Read the interrupt pin configuration
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_interrupt_config(&mut self) -> Result<InterruptConfig, Error<I::Error>> {
        Ok(InterruptConfig::from_bits(
            self.read_field(reg::INT_PIN_SETTINGS)?,
        ))
    }

    /// Select the interrupt sources that drive the pin
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `mask` names a source the chip does not
    /// have, or a bus error.
    pub fn set_interrupt_enabled(&mut self, mask: InterruptMask) -> Result<(), Error<I::Error>> {
        if !self.profile.interrupts.contains(mask) {
            return self.fail(Error::InvalidArgument);
        }
        self.write_byte(reg::INT_ENABLE, mask.bits())
    }

    /// Read the enabled interrupt sources
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_interrupt_enabled(&mut self) -> Result<InterruptMask, Error<I::Error>> {
        Ok(InterruptMask::from_bits_truncate(
            self.read_byte(reg::INT_ENABLE)?,
        ))
    }

    /// Read and clear the interrupt status
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_interrupt_status(&mut self) -> Result<InterruptMask, Error<I::Error>> {
        Ok(InterruptMask::from_bits_truncate(
            self.read_byte(reg::INT_STATUS)?,
        ))
    }

    /// Poll the interrupt status until any source in `mask` is pending
    ///
    /// Polls up to `max_polls` times, 1ms apart. Returns the full status of
    /// the successful poll; reading it clears the latched sources.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if no source in `mask` fires in time, or a bus error.
    pub fn wait_for_interrupt<D>(
        &mut self,
        mask: InterruptMask,
        max_polls: u16,
        delay: &mut D,
    ) -> Result<InterruptMask, Error<I::Error>>
    where
        D: DelayNs,
    {
        for _ in 0..max_polls {
            let status = self.read_interrupt_status()?;
            if status.intersects(mask) {
                return Ok(status);
            }
            delay.delay_ms(1);
        }
        self.fail(Error::Timeout)
    }

    /// Set the FSYNC interrupt level
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_fsync_interrupt_level(&mut self, level: FsyncLevel) -> Result<(), Error<I::Error>> {
        self.write_field(reg::FSYNC_INT_LEVEL, level as u8)
    }

    /// Read the FSYNC interrupt level
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fsync_interrupt_level(&mut self) -> Result<FsyncLevel, Error<I::Error>> {
        Ok(if self.read_flag(reg::FSYNC_INT_LEVEL)? {
            FsyncLevel::ActiveLow
        } else {
            FsyncLevel::ActiveHigh
        })
    }

    /// Use the FSYNC pin as an interrupt source (`I2C_MST_FSYNC` status bit)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_fsync_interrupt_enabled(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        self.write_flag(reg::FSYNC_INT_MODE_EN, enable)
    }

    /// Whether FSYNC is used as an interrupt source
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fsync_interrupt_enabled(&mut self) -> Result<bool, Error<I::Error>> {
        self.read_flag(reg::FSYNC_INT_MODE_EN)
    }

    // Auxiliary I2C master

    /// Who currently drives the auxiliary bus
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_aux_i2c_state(&mut self) -> Result<AuxI2cState, Error<I::Error>> {
        if self.read_flag(reg::I2C_MST_EN)? {
            Ok(AuxI2cState::MasterActive)
        } else if self.read_flag(reg::I2C_BYPASS_EN)? {
            Ok(AuxI2cState::Bypass)
        } else {
            Ok(AuxI2cState::Disabled)
        }
    }

    /// Enable or disable the auxiliary I2C master
    ///
    /// Enabling clears bypass first, so the host bus is never connected to
    /// an auxiliary bus the master is driving. Slot configuration is kept
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_aux_i2c_enabled(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        let user_ctrl = self.read_byte(reg::I2C_MST_EN.register)?;
        if enable {
            let pin_cfg = self.read_byte(reg::I2C_BYPASS_EN.register)?;
            if reg::I2C_BYPASS_EN.extract(pin_cfg) != 0 {
                self.write_byte(
                    reg::I2C_BYPASS_EN.register,
                    reg::I2C_BYPASS_EN.insert(pin_cfg, 0),
                )?;
            }
        }
        self.write_byte(
            reg::I2C_MST_EN.register,
            reg::I2C_MST_EN.insert(user_ctrl, u8::from(enable)),
        )
    }

    /// Whether the auxiliary I2C master is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_aux_i2c_enabled(&mut self) -> Result<bool, Error<I::Error>> {
        self.read_flag(reg::I2C_MST_EN)
    }

    /// Connect the host bus straight through to the auxiliary bus
    ///
    /// Enabling bypass switches the auxiliary master off first.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_bypass(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        let pin_cfg = self.read_byte(reg::I2C_BYPASS_EN.register)?;
        if enable {
            let user_ctrl = self.read_byte(reg::I2C_MST_EN.register)?;
            if reg::I2C_MST_EN.extract(user_ctrl) != 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("disabling auxiliary I2C master to enable bypass");
                self.write_byte(
                    reg::I2C_MST_EN.register,
                    reg::I2C_MST_EN.insert(user_ctrl, 0),
                )?;
            }
        }
        self.write_byte(
            reg::I2C_BYPASS_EN.register,
            reg::I2C_BYPASS_EN.insert(pin_cfg, u8::from(enable)),
        )
    }

    /// Whether bypass is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_bypass(&mut self) -> Result<bool, Error<I::Error>> {
        self.read_flag(reg::I2C_BYPASS_EN)
    }

    /// Configure the auxiliary I2C master
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `sample_delay` exceeds 31, or a bus error.
    pub fn set_aux_i2c_config(&mut self, config: AuxI2cConfig) -> Result<(), Error<I::Error>> {
        if config.sample_delay > reg::I2C_MST_DLY.max_value() {
            return self.fail(Error::InvalidArgument);
        }

        // Three registers; all are read before any is written
        let mst_ctrl = self.read_byte(reg::I2C_MST_CTRL)?;
        let slv4_ctrl = self.read_byte(reg::I2C_MST_DLY.register)?;
        let delay_ctrl = self.read_byte(reg::DELAY_ES_SHADOW.register)?;

        let mst_ctrl = reg::MULT_MST_EN.insert(mst_ctrl, u8::from(config.multi_master));
        let mst_ctrl = reg::WAIT_FOR_ES.insert(mst_ctrl, u8::from(config.wait_for_external_sensor));
        let mst_ctrl = reg::I2C_MST_P_NSR.insert(mst_ctrl, config.transition as u8);
        let mst_ctrl = reg::I2C_MST_CLK.insert(mst_ctrl, config.clock as u8);
        let slv4_ctrl = reg::I2C_MST_DLY.insert(slv4_ctrl, config.sample_delay);
        let delay_ctrl = reg::DELAY_ES_SHADOW.insert(delay_ctrl, u8::from(config.shadow_delay));

        self.write_byte(reg::I2C_MST_CTRL, mst_ctrl)?;
        self.write_byte(reg::I2C_MST_DLY.register, slv4_ctrl)?;
        self.write_byte(reg::DELAY_ES_SHADOW.register, delay_ctrl)
    }

    /// Read the auxiliary I2C master configuration
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_aux_i2c_config(&mut self) -> Result<AuxI2cConfig, Error<I::Error>> {
        let ctrl = self.read_byte(reg::I2C_MST_CTRL)?;
        let sample_delay = self.read_field(reg::I2C_MST_DLY)?;
        let shadow_delay = self.read_flag(reg::DELAY_ES_SHADOW)?;

        Ok(AuxI2cConfig {
            clock: AuxI2cClock::from_bits(reg::I2C_MST_CLK.extract(ctrl)),
            multi_master: reg::MULT_MST_EN.extract(ctrl) != 0,
            transition: if reg::I2C_MST_P_NSR.extract(ctrl) != 0 {
                AuxI2cTransition::Stop
            } else {
                AuxI2cTransition::Restart
            },
            sample_delay,
            shadow_delay,
            wait_for_external_sensor: reg::WAIT_FOR_ES.extract(ctrl) != 0,
        })
    }

    /// Program a periodic transfer slot
    ///
    /// The slot's enable bit is preserved; use
    /// [`set_aux_i2c_slave_enabled`](Self::set_aux_i2c_slave_enabled) to start
    /// or stop it. Slots can be programmed while the master is disabled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an address above 0x7F or a read length
    /// above 15, or a bus error.
    pub fn set_aux_i2c_slave_config(
        &mut self,
        config: &AuxSlaveConfig,
    ) -> Result<(), Error<I::Error>> {
        if config.address > 0x7F || config.read_length() > AuxSlaveConfig::MAX_READ_LENGTH {
            return self.fail(Error::InvalidArgument);
        }

        let slave = config.slave;
        let enabled = self.read_byte(slave.ctrl_register())? & reg::SLV_EN;
        let bit = slave.delay_enable_bit();
        let delay_ctrl = self.read_byte(reg::I2C_MST_DELAY_CTRL)?;
        let delay_ctrl = if config.sample_delay {
            delay_ctrl | bit
        } else {
            delay_ctrl & !bit
        };

        let mut ctrl = enabled;
        if config.register_disabled {
            ctrl |= reg::SLV_REG_DIS;
        }
        let addr = match config.transfer {
            AuxTransfer::Read {
                length,
                swap_bytes,
                group_end_of_word,
            } => {
                if swap_bytes {
                    ctrl |= reg::SLV_BYTE_SW;
                }
                if group_end_of_word {
                    ctrl |= reg::SLV_GRP;
                }
                ctrl |= length;
                config.address | reg::I2C_SLV_RNW
            }
            AuxTransfer::Write { data } => {
                self.write_byte(slave.do_register(), data)?;
                ctrl |= 1;
                config.address
            }
        };

        // ADDR, REG and CTRL are adjacent
        self.write_bytes(slave.addr_register(), &[addr, config.register, ctrl])?;
        self.write_byte(reg::I2C_MST_DELAY_CTRL, delay_ctrl)
    }

    /// Read back the programming of a periodic transfer slot
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_aux_i2c_slave_config(
        &mut self,
        slave: AuxSlave,
    ) -> Result<AuxSlaveConfig, Error<I::Error>> {
        let mut regs = [0u8; 3];
        self.read_bytes(slave.addr_register(), &mut regs)?;
        let [addr, register, ctrl] = regs;

        let transfer = if addr & reg::I2C_SLV_RNW != 0 {
            AuxTransfer::Read {
                length: ctrl & reg::SLV_LEN_MASK,
                swap_bytes: ctrl & reg::SLV_BYTE_SW != 0,
                group_end_of_word: ctrl & reg::SLV_GRP != 0,
            }
        } else {
            AuxTransfer::Write {
                data: self.read_byte(slave.do_register())?,
            }
        };
        let delay_ctrl = self.read_byte(reg::I2C_MST_DELAY_CTRL)?;

        Ok(AuxSlaveConfig {
            slave,
            address: addr & !reg::I2C_SLV_RNW,
            register,
            register_disabled: ctrl & reg::SLV_REG_DIS != 0,
            sample_delay: delay_ctrl & slave.delay_enable_bit() != 0,
            transfer,
        })
    }

    /// Start or stop a periodic transfer slot
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_aux_i2c_slave_enabled(
        &mut self,
        slave: AuxSlave,
        enable: bool,
    ) -> Result<(), Error<I::Error>> {
        self.modify(slave.ctrl_register(), |value| {
            if enable {
                value | reg::SLV_EN
            } else {
                value & !reg::SLV_EN
            }
        })
    }

    /// Whether a periodic transfer slot is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_aux_i2c_slave_enabled(&mut self, slave: AuxSlave) -> Result<bool, Error<I::Error>> {
        Ok(self.read_byte(slave.ctrl_register())? & reg::SLV_EN != 0)
    }

    /// Set how many times a slot 4 transfer polls for completion
    pub const fn set_aux_i2c_retries(&mut self, retries: u16) {
        self.aux_retries = retries;
    }

    /// Number of completion polls of a slot 4 transfer
    pub const fn aux_i2c_retries(&self) -> u16 {
        self.aux_retries
    }

    /// Read and clear the auxiliary I2C master status
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_aux_i2c_status(&mut self) -> Result<AuxI2cStatus, Error<I::Error>> {
        Ok(AuxI2cStatus::from_bits_retain(
            self.read_byte(reg::I2C_MST_STATUS)?,
        ))
    }

    /// Read bytes the periodic slots stored in `EXT_SENS_DATA`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the range exceeds the 24 data registers,
    /// or a bus error.
    pub fn read_external_sensor_data(
        &mut self,
        offset: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error<I::Error>> {
        if usize::from(offset) + buffer.len() > reg::EXT_SENS_DATA_LEN {
            return self.fail(Error::InvalidArgument);
        }
        self.read_bytes(reg::EXT_SENS_DATA_00 + offset, buffer)
    }

    /// Run one slot 4 transfer and wait for it to finish
    fn aux_i2c_transfer<D>(
        &mut self,
        address: u8,
        register: u8,
        data: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        if !self.read_flag(reg::I2C_MST_EN)? {
            return self.fail(Error::InvalidState);
        }

        // Clear stale status bits from a previous transfer
        self.read_byte(reg::I2C_MST_STATUS)?;

        let ctrl = self.read_byte(reg::I2C_SLV4_CTRL)?;
        let ctrl = reg::SLV4_EN.insert(ctrl, 1);
        let ctrl = reg::SLV4_INT_EN.insert(ctrl, 0);
        let ctrl = reg::SLV4_REG_DIS.insert(ctrl, 0);

        // ADDR, REG and DO are adjacent
        self.write_bytes(reg::I2C_SLV4_ADDR, &[address, register, data])?;
        self.write_byte(reg::I2C_SLV4_CTRL, ctrl)?;

        for _ in 0..self.aux_retries {
            let status = self.read_byte(reg::I2C_MST_STATUS)?;
            if status & (reg::MST_STATUS_SLV4_NACK | reg::MST_STATUS_LOST_ARB) != 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "aux I2C device {=u8:#04x} did not acknowledge",
                    address & 0x7F
                );
                return self.fail(Error::NotFound);
            }
            if status & reg::MST_STATUS_SLV4_DONE != 0 {
                return Ok(());
            }
            delay.delay_ms(1);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("aux I2C transfer to {=u8:#04x} timed out", address & 0x7F);
        self.write_flag(reg::SLV4_EN, false)?;
        self.fail(Error::Timeout)
    }

    /// Read one register of a device on the auxiliary bus
    ///
    /// Uses slot 4 and polls `I2C_MST_STATUS` up to
    /// [`aux_i2c_retries`](Self::aux_i2c_retries) times, 1ms apart.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidArgument` for an address above 0x7F
    /// - `InvalidState` if the auxiliary master is disabled
    /// - `NotFound` if the device does not acknowledge
    /// - `Timeout` if the transfer does not complete within the retry budget
    /// - a bus error
    pub fn aux_i2c_read_byte<D>(
        &mut self,
        address: u8,
        register: u8,
        delay: &mut D,
    ) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        if address > 0x7F {
            return self.fail(Error::InvalidArgument);
        }
        self.aux_i2c_transfer(address | reg::I2C_SLV_RNW, register, 0, delay)?;
        self.read_byte(reg::I2C_SLV4_DI)
    }

    /// Write one register of a device on the auxiliary bus
    ///
    /// # Errors
    ///
    /// Same as [`aux_i2c_read_byte`](Self::aux_i2c_read_byte).
    pub fn aux_i2c_write_byte<D>(
        &mut self,
        address: u8,
        register: u8,
        data: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        if address > 0x7F {
            return self.fail(Error::InvalidArgument);
        }
        self.aux_i2c_transfer(address, register, data, delay)
    }

    // FIFO

    /// Select the sources written to the FIFO
    ///
    /// `FIFO_EN` is owned entirely; `SLV_3_FIFO_EN` is updated in the adjacent
    /// `I2C_MST_CTRL`. Call [`reset_fifo`](Self::reset_fifo) afterwards since
    /// the byte count is not cleared by reconfiguration.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_fifo_config(&mut self, sources: FifoSources) -> Result<(), Error<I::Error>> {
        let mst_ctrl = self.read_byte(reg::I2C_MST_CTRL)?;
        let mst_ctrl = reg::SLV_3_FIFO_EN.insert(
            mst_ctrl,
            u8::from(sources.contains(FifoSources::SLAVE3)),
        );
        self.write_bytes(reg::FIFO_EN, &[sources.fifo_en_bits(), mst_ctrl])
    }

    /// Read the sources written to the FIFO
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fifo_config(&mut self) -> Result<FifoSources, Error<I::Error>> {
        let mut regs = [0u8; 2];
        self.read_bytes(reg::FIFO_EN, &mut regs)?;
        Ok(FifoSources::from_registers(
            regs[0],
            reg::SLV_3_FIFO_EN.extract(regs[1]) != 0,
        ))
    }

    /// Enable or disable the FIFO
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_fifo_enabled(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        self.write_flag(reg::USER_FIFO_EN, enable)
    }

    /// Whether the FIFO is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fifo_enabled(&mut self) -> Result<bool, Error<I::Error>> {
        self.read_flag(reg::USER_FIFO_EN)
    }

    /// Select what happens when the FIFO is full (MPU6500 family)
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on the MPU6050 family, or a bus error.
    pub fn set_fifo_mode(&mut self, mode: FifoMode) -> Result<(), Error<I::Error>> {
        let field = self.chip_field(self.profile.registers.fifo_mode)?;
        self.write_field(field, mode as u8)
    }

    /// Read the FIFO full behaviour (MPU6500 family)
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on the MPU6050 family, or a bus error.
    pub fn read_fifo_mode(&mut self) -> Result<FifoMode, Error<I::Error>> {
        let field = self.chip_field(self.profile.registers.fifo_mode)?;
        Ok(if self.read_field(field)? != 0 {
            FifoMode::StopWhenFull
        } else {
            FifoMode::Overwrite
        })
    }

    /// Discard the FIFO contents and clear the byte count
    ///
    /// The reset bit clears itself.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn reset_fifo(&mut self) -> Result<(), Error<I::Error>> {
        self.write_flag(reg::FIFO_RESET, true)
    }

    /// Number of bytes in the FIFO
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fifo_count(&mut self) -> Result<u16, Error<I::Error>> {
        let mut count = [0u8; 2];
        self.read_bytes(reg::FIFO_COUNT_H, &mut count)?;
        Ok(u16::from_be_bytes([count[0] & reg::FIFO_COUNT_H_MASK, count[1]]))
    }

    /// Packet geometry of the current FIFO configuration
    ///
    /// Slot lengths are read from the slots that feed the FIFO.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fifo_layout(&mut self) -> Result<FifoLayout, Error<I::Error>> {
        let sources = self.read_fifo_config()?;
        let mut layout = FifoLayout::new(sources);
        for (slot, slave) in AuxSlave::ALL.iter().enumerate() {
            if sources.contains(FifoSources::SLAVES[slot]) {
                layout.slave_lengths[slot] = self.read_aux_i2c_slave_config(*slave)?.read_length();
            }
        }
        Ok(layout)
    }

    /// Bytes per FIFO packet for the current configuration
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fifo_packet_size(&mut self) -> Result<u16, Error<I::Error>> {
        Ok(self.read_fifo_layout()?.packet_size())
    }

    /// Byte count together with the packet size
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fifo_level(&mut self) -> Result<FifoLevel, Error<I::Error>> {
        let packet_size = self.read_fifo_packet_size()?;
        let bytes = self.read_fifo_count()?;
        Ok(FifoLevel { bytes, packet_size })
    }

    /// Drain bytes from the FIFO
    ///
    /// Reads the byte count once, then reads up to `buffer.len()` bytes in a
    /// single burst.
    ///
    /// # Returns
    /// Number of bytes read
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_fifo(&mut self, buffer: &mut [u8]) -> Result<usize, Error<I::Error>> {
        let count = usize::from(self.read_fifo_count()?);
        let len = count.min(buffer.len());
        if len > 0 {
            self.read_bytes(reg::FIFO_R_W, &mut buffer[..len])?;
        }
        Ok(len)
    }

    /// Push bytes into the FIFO
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn write_fifo(&mut self, data: &[u8]) -> Result<(), Error<I::Error>> {
        self.write_bytes(reg::FIFO_R_W, data)
    }

    // Compass (AK89xx on the 9-axis parts)

    fn magnetometer(&mut self) -> Result<Ak89xx, Error<I::Error>> {
        match self.profile.magnetometer {
            Some(part) => Ok(part),
            None => self.fail(Error::Unsupported),
        }
    }

    fn compass_read<D>(&mut self, register: u8, delay: &mut D) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        self.aux_i2c_read_byte(AK89XX_I2C_ADDRESS, register, delay)
    }

    fn compass_write<D>(
        &mut self,
        register: u8,
        value: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.aux_i2c_write_byte(AK89XX_I2C_ADDRESS, register, value, delay)
    }

    /// Whether slots 0 and 1 hold the layout [`compass_init`](Self::compass_init)
    /// programs
    fn compass_owns_slots(&mut self) -> Result<bool, Error<I::Error>> {
        // SLV0_ADDR, SLV0_REG, SLV0_CTRL, SLV1_ADDR, SLV1_REG
        let mut regs = [0u8; 5];
        self.read_bytes(AuxSlave::Slave0.addr_register(), &mut regs)?;
        Ok(regs[..2] == [AK89XX_I2C_ADDRESS | reg::I2C_SLV_RNW, ak::registers::ST1]
            && regs[3..] == [AK89XX_I2C_ADDRESS, ak::registers::CNTL1])
    }

    /// Stop slots 0 and 1 so no periodic transfer reaches the AK89xx, and
    /// return which of them were running
    fn compass_pause_slots(&mut self) -> Result<[bool; 2], Error<I::Error>> {
        let ctrl = [
            self.read_byte(COMPASS_SLOTS[0].ctrl_register())?,
            self.read_byte(COMPASS_SLOTS[1].ctrl_register())?,
        ];
        for (slave, value) in COMPASS_SLOTS.into_iter().zip(ctrl) {
            if value & reg::SLV_EN != 0 {
                self.write_byte(slave.ctrl_register(), value & !reg::SLV_EN)?;
            }
        }
        Ok(ctrl.map(|value| value & reg::SLV_EN != 0))
    }

    fn compass_resume_slots(&mut self, running: [bool; 2]) -> Result<(), Error<I::Error>> {
        for (slave, running) in COMPASS_SLOTS.into_iter().zip(running) {
            if running {
                self.set_aux_i2c_slave_enabled(slave, true)?;
            }
        }
        Ok(())
    }

    /// Run `f` with slots 0 and 1 stopped, restarting them afterwards even
    /// when `f` fails
    fn compass_with_slots_paused<T, F>(&mut self, f: F) -> Result<T, Error<I::Error>>
    where
        F: FnOnce(&mut Self) -> Result<T, Error<I::Error>>,
    {
        let running = self.compass_pause_slots()?;
        let result = f(self);
        let resumed = self.compass_resume_slots(running);
        let value = result?;
        resumed?;
        Ok(value)
    }

    /// Write the `CNTL1` mode bits, passing through power-down as the part
    /// requires, and return the output width bit
    fn compass_switch_mode<D>(&mut self, mode: MagMode, delay: &mut D) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        let current = self.compass_read(ak::registers::CNTL1, delay)?;
        let bit = current & ak::registers::CNTL1_BIT;
        let power_down = MagMode::PowerDown as u8;
        if current & ak::registers::CNTL1_MODE_MASK != power_down && mode != MagMode::PowerDown {
            self.compass_write(ak::registers::CNTL1, bit | power_down, delay)?;
            delay.delay_us(100);
        }
        self.compass_write(ak::registers::CNTL1, bit | mode as u8, delay)?;
        Ok(bit)
    }

    /// Set up the AK89xx for periodic sampling
    ///
    /// Configures and enables the auxiliary master, verifies the device ID,
    /// soft-resets the AK8963, then programs slot 0 to read `ST1`..`ST2`
    /// into `EXT_SENS_DATA` and slot 1 to trigger a single measurement every
    /// sample.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer, `InvalidDevice`
    /// if the device ID does not match, or any auxiliary transfer error.
    pub fn compass_init<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let part = self.magnetometer()?;

        let config = AuxI2cConfig {
            clock: AuxI2cClock::Khz400,
            transition: AuxI2cTransition::Stop,
            ..self.read_aux_i2c_config()?
        };
        self.set_aux_i2c_config(config)?;
        self.compass_pause_slots()?;
        self.set_aux_i2c_enabled(true)?;
        self.compass_test_connection(delay)?;

        let mut bit = 0;
        if part.has_extended_control() {
            self.compass_write(ak::registers::CNTL2, ak::registers::CNTL2_SRST, delay)?;
            delay.delay_ms(1);
            bit = ak::registers::CNTL1_BIT;
        }
        self.compass_write(ak::registers::CNTL1, bit | MagMode::PowerDown as u8, delay)?;

        self.set_aux_i2c_slave_config(&AuxSlaveConfig {
            slave: AuxSlave::Slave0,
            address: AK89XX_I2C_ADDRESS,
            register: ak::registers::ST1,
            register_disabled: false,
            sample_delay: false,
            transfer: AuxTransfer::read(ak::registers::ST1_TO_ST2_LEN),
        })?;
        self.set_aux_i2c_slave_config(&AuxSlaveConfig {
            slave: AuxSlave::Slave1,
            address: AK89XX_I2C_ADDRESS,
            register: ak::registers::CNTL1,
            register_disabled: false,
            sample_delay: false,
            transfer: AuxTransfer::write(bit | MagMode::SingleMeasurement as u8),
        })?;
        self.set_aux_i2c_slave_enabled(AuxSlave::Slave0, true)?;
        self.set_aux_i2c_slave_enabled(AuxSlave::Slave1, true)
    }

    /// Read the AK89xx device ID
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer, or any
    /// auxiliary transfer error.
    pub fn compass_who_am_i<D>(&mut self, delay: &mut D) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        self.magnetometer()?;
        self.compass_read(ak::registers::WIA, delay)
    }

    /// Check the AK89xx device ID
    ///
    /// # Errors
    ///
    /// Returns `InvalidDevice` with the value read on mismatch, plus the
    /// errors of [`compass_who_am_i`](Self::compass_who_am_i).
    pub fn compass_test_connection<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let wia = self.compass_who_am_i(delay)?;
        if wia != AK89XX_WHO_AM_I {
            return self.fail(Error::InvalidDevice(wia));
        }
        Ok(())
    }

    /// Set the AK89xx operating mode
    ///
    /// The output bit width is kept. When slots 0 and 1 hold the layout of
    /// [`compass_init`](Self::compass_init), they follow the mode:
    /// - single measurement: slot 1 triggers a measurement every sample and
    ///   slot 0 collects it
    /// - continuous and external trigger: only slot 0 runs
    /// - power-down, self-test and fuse ROM: both slots are stopped, leaving
    ///   them free for other use
    ///
    /// Slots programmed for other devices keep their enable state.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer,
    /// `InvalidArgument` for a mode the part lacks, or any auxiliary transfer
    /// error.
    pub fn compass_set_mode<D>(&mut self, mode: MagMode, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let part = self.magnetometer()?;
        if !part.supports_mode(mode) {
            return self.fail(Error::InvalidArgument);
        }

        let owned = self.compass_owns_slots()?;
        let running = self.compass_pause_slots()?;
        let bit = match self.compass_switch_mode(mode, delay) {
            Ok(bit) => bit,
            Err(e) => {
                self.compass_resume_slots(running)?;
                return Err(e);
            }
        };
        if !owned {
            return self.compass_resume_slots(running);
        }

        match mode {
            MagMode::SingleMeasurement => {
                self.write_byte(AuxSlave::Slave1.do_register(), bit | mode as u8)?;
                self.compass_resume_slots([true, true])
            }
            MagMode::Continuous8Hz | MagMode::Continuous100Hz | MagMode::ExternalTrigger => {
                self.compass_resume_slots([true, false])
            }
            MagMode::PowerDown | MagMode::SelfTest | MagMode::FuseRom => Ok(()),
        }
    }

    /// Read the AK89xx operating mode
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if `CNTL1` holds an undefined mode code, plus
    /// the errors of [`compass_who_am_i`](Self::compass_who_am_i).
    pub fn compass_read_mode<D>(&mut self, delay: &mut D) -> Result<MagMode, Error<I::Error>>
    where
        D: DelayNs,
    {
        self.magnetometer()?;
        let cntl1 = self.compass_read(ak::registers::CNTL1, delay)?;
        match MagMode::from_bits(cntl1) {
            Some(mode) => Ok(mode),
            None => self.fail(Error::InvalidState),
        }
    }

    /// Select the AK8963 output width
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` unless the part is an AK8963,
    /// `InvalidArgument` for [`MagSensitivity::Bits13`], or any auxiliary
    /// transfer error.
    pub fn compass_set_sensitivity<D>(
        &mut self,
        sensitivity: MagSensitivity,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        if !self.magnetometer()?.has_extended_control() {
            return self.fail(Error::Unsupported);
        }
        let bit = match sensitivity {
            MagSensitivity::Bits14 => 0,
            MagSensitivity::Bits16 => ak::registers::CNTL1_BIT,
            MagSensitivity::Bits13 => return self.fail(Error::InvalidArgument),
        };
        let owned = self.compass_owns_slots()?;
        let cntl1 = self.compass_read(ak::registers::CNTL1, delay)?;

        // Slot 1 rewrites CNTL1 every sample, so its copy changes first
        if owned {
            self.modify(AuxSlave::Slave1.do_register(), |value| {
                (value & !ak::registers::CNTL1_BIT) | bit
            })?;
        }
        self.compass_write(
            ak::registers::CNTL1,
            (cntl1 & !ak::registers::CNTL1_BIT) | bit,
            delay,
        )
    }

    /// Read the magnetometer output width
    ///
    /// The AK8975 has a fixed 13-bit output and needs no bus access.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer, or any
    /// auxiliary transfer error.
    pub fn compass_read_sensitivity<D>(
        &mut self,
        delay: &mut D,
    ) -> Result<MagSensitivity, Error<I::Error>>
    where
        D: DelayNs,
    {
        if !self.magnetometer()?.has_extended_control() {
            return Ok(MagSensitivity::Bits13);
        }
        let cntl1 = self.compass_read(ak::registers::CNTL1, delay)?;
        Ok(if cntl1 & ak::registers::CNTL1_BIT != 0 {
            MagSensitivity::Bits16
        } else {
            MagSensitivity::Bits14
        })
    }

    /// Read the factory sensitivity adjustment from the fuse ROM
    ///
    /// Slots 0 and 1 are stopped for the duration so slot 1 cannot switch the
    /// part out of fuse ROM mode. The part passes through power-down into
    /// fuse ROM mode and back, then the previous `CNTL1` value and the slots
    /// are restored.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer, or any
    /// auxiliary transfer error.
    pub fn compass_read_adjustment<D>(
        &mut self,
        delay: &mut D,
    ) -> Result<MagAdjustment, Error<I::Error>>
    where
        D: DelayNs,
    {
        self.magnetometer()?;
        self.compass_with_slots_paused(|this| this.compass_read_fuse_rom(delay))
    }

    fn compass_read_fuse_rom<D>(&mut self, delay: &mut D) -> Result<MagAdjustment, Error<I::Error>>
    where
        D: DelayNs,
    {
        let previous = self.compass_read(ak::registers::CNTL1, delay)?;
        let bit = previous & ak::registers::CNTL1_BIT;

        self.compass_write(ak::registers::CNTL1, bit | MagMode::PowerDown as u8, delay)?;
        self.compass_write(ak::registers::CNTL1, bit | MagMode::FuseRom as u8, delay)?;
        let x = self.compass_read(ak::registers::ASAX, delay)?;
        let y = self.compass_read(ak::registers::ASAX + 1, delay)?;
        let z = self.compass_read(ak::registers::ASAX + 2, delay)?;
        self.compass_write(ak::registers::CNTL1, bit | MagMode::PowerDown as u8, delay)?;
        if previous & ak::registers::CNTL1_MODE_MASK != MagMode::PowerDown as u8 {
            self.compass_write(ak::registers::CNTL1, previous, delay)?;
        }

        Ok(MagAdjustment { x, y, z })
    }

    /// Run the AK89xx self-test
    ///
    /// With slots 0 and 1 stopped, the part is powered down, the internal
    /// field is switched on through `ASTC.SELF` and one self-test
    /// measurement is taken. The raw reading is checked against the
    /// datasheet limits for the part and output width. `ASTC`, `CNTL1` and
    /// the slots are restored afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer, `Timeout` if
    /// no measurement becomes ready within
    /// [`aux_i2c_retries`](Self::aux_i2c_retries) polls, or any auxiliary
    /// transfer error. A reading outside the limits is not an error; see
    /// [`MagSelfTest::passed`].
    pub fn compass_self_test<D>(&mut self, delay: &mut D) -> Result<MagSelfTest, Error<I::Error>>
    where
        D: DelayNs,
    {
        let part = self.magnetometer()?;
        self.compass_with_slots_paused(|this| this.compass_run_self_test(part, delay))
    }

    fn compass_run_self_test<D>(
        &mut self,
        part: Ak89xx,
        delay: &mut D,
    ) -> Result<MagSelfTest, Error<I::Error>>
    where
        D: DelayNs,
    {
        let previous = self.compass_read(ak::registers::CNTL1, delay)?;
        let bit = previous & ak::registers::CNTL1_BIT;

        self.compass_write(ak::registers::CNTL1, bit | MagMode::PowerDown as u8, delay)?;
        self.compass_write(ak::registers::ASTC, ak::registers::ASTC_SELF, delay)?;
        self.compass_write(ak::registers::CNTL1, bit | MagMode::SelfTest as u8, delay)?;
        let sample = self.compass_self_test_sample(delay);

        // The self-test field is switched off whatever the outcome
        self.compass_write(ak::registers::ASTC, 0, delay)?;
        self.compass_write(ak::registers::CNTL1, bit | MagMode::PowerDown as u8, delay)?;
        let raw = sample?;
        if previous & ak::registers::CNTL1_MODE_MASK != MagMode::PowerDown as u8 {
            self.compass_write(ak::registers::CNTL1, previous, delay)?;
        }

        let sensitivity = match part {
            Ak89xx::Ak8975 => MagSensitivity::Bits13,
            Ak89xx::Ak8963 if bit != 0 => MagSensitivity::Bits16,
            Ak89xx::Ak8963 => MagSensitivity::Bits14,
        };
        let passed = sensitivity.self_test_passes(raw);
        if !passed {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "magnetometer self-test out of range: {=i16} {=i16} {=i16}",
                raw.x,
                raw.y,
                raw.z
            );
        }
        Ok(MagSelfTest { raw, passed })
    }

    /// Wait for `ST1.DRDY`, then read `HXL`..`HZH` and `ST2`
    fn compass_self_test_sample<D>(&mut self, delay: &mut D) -> Result<MagData, Error<I::Error>>
    where
        D: DelayNs,
    {
        let mut ready = false;
        for _ in 0..self.aux_retries {
            if self.compass_read(ak::registers::ST1, delay)? & ak::registers::ST1_DRDY != 0 {
                ready = true;
                break;
            }
            delay.delay_ms(1);
        }
        if !ready {
            return self.fail(Error::Timeout);
        }

        // Reading ST2 releases the data registers
        let mut data = [0u8; 7];
        for (register, byte) in (ak::registers::HXL..).zip(data.iter_mut()) {
            *byte = self.compass_read(register, delay)?;
        }
        Ok(MagData {
            x: i16::from_le_bytes([data[0], data[1]]),
            y: i16::from_le_bytes([data[2], data[3]]),
            z: i16::from_le_bytes([data[4], data[5]]),
        })
    }

    /// Read the raw field from the bytes slot 0 stored in `EXT_SENS_DATA`
    ///
    /// Requires [`compass_init`](Self::compass_init). No adjustment is applied.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer, or a bus error.
    pub fn compass_heading(&mut self) -> Result<MagData, Error<I::Error>> {
        let (raw, _) = self.compass_sample()?;
        Ok(raw)
    }

    /// Read the field in µT, applying the factory adjustment
    ///
    /// The output width is taken from the `ST2.BITM` flag of the sample.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on chips without a magnetometer, or a bus error.
    pub fn compass_heading_ut(
        &mut self,
        adjustment: &MagAdjustment,
    ) -> Result<MagDataUT, Error<I::Error>> {
        let (raw, sensitivity) = self.compass_sample()?;
        Ok(MagDataUT::from_raw(adjustment.apply(raw), sensitivity))
    }

    fn compass_sample(&mut self) -> Result<(MagData, MagSensitivity), Error<I::Error>> {
        let part = self.magnetometer()?;

        // ST1, HXL..HZH, ST2
        let mut data = [0u8; 8];
        self.read_bytes(reg::EXT_SENS_DATA_00, &mut data)?;
        let st2 = data[7];
        if st2 & ak::registers::ST2_HOFL != 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("magnetometer overflow");
        }

        let raw = MagData {
            x: i16::from_le_bytes([data[1], data[2]]),
            y: i16::from_le_bytes([data[3], data[4]]),
            z: i16::from_le_bytes([data[5], data[6]]),
        };
        let sensitivity = match part {
            Ak89xx::Ak8975 => MagSensitivity::Bits13,
            Ak89xx::Ak8963 if st2 & ak::registers::CNTL1_BIT != 0 => MagSensitivity::Bits16,
            Ak89xx::Ak8963 => MagSensitivity::Bits14,
        };
        Ok((raw, sensitivity))
    }
}
