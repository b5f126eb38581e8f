//! Bus interface implementations for the MPU family
//!
//! Both transports implement `device_driver::RegisterInterface`, which is the
//! only thing [`Mpu`](crate::Mpu) needs from a bus: read or write a run of
//! consecutive registers starting at an 8-bit address. Framing details such as
//! the SPI read bit stay in this module.
//!
//! The bus must already be initialized and, if shared, serialized by the
//! caller (for example with `embedded-hal-bus`).

use crate::{I2C_ADDRESS_AD0_HIGH, I2C_ADDRESS_AD0_LOW};

use device_driver::RegisterInterface;
use embedded_hal::{i2c, spi};

/// SPI address byte flag selecting a register read
const SPI_READ: u8 = 0x80;

/// I2C interface for the MPU family
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface with the default address (0x68, AD0 pin LOW)
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::default(i2c);
    /// let mut imu = Mpu::new(interface, &ChipProfile::MPU6050)?;
    /// ```
    pub const fn default(i2c: I2C) -> Self {
        Self::new(i2c, I2C_ADDRESS_AD0_LOW)
    }

    /// Create a new I2C interface with the alternative address (0x69, AD0 pin HIGH)
    pub const fn alternative(i2c: I2C) -> Self {
        Self::new(i2c, I2C_ADDRESS_AD0_HIGH)
    }

    /// Create a new I2C interface with a custom 7-bit device address
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Device address used on the bus
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        // Adjacent write operations are merged into one I2C transfer, so the
        // register address and payload go out without an intermediate buffer.
        self.i2c.transaction(
            self.address,
            &mut [i2c::Operation::Write(&[address]), i2c::Operation::Write(write_data)],
        )
    }
}

/// SPI interface for the MPU6000, MPU6500 and MPU9250
///
/// # Note on Chip Select
///
/// This interface uses the `SpiDevice` trait from `embedded-hal`, which manages
/// the chip select (CS) pin. If using `embedded-hal-bus`:
/// ```ignore
/// let spi_device = embedded_hal_bus::spi::ExclusiveDevice::new(spi_bus, cs_pin, delay);
/// let interface = SpiInterface::new(spi_device);
/// ```
///
/// The MPU accepts SPI at up to 1 MHz for configuration registers.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Create a new SPI interface with the given SPI device
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Consume the interface and return the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI, E> RegisterInterface for SpiInterface<SPI>
where
    SPI: spi::SpiDevice<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            spi::Operation::Write(&[address | SPI_READ]),
            spi::Operation::Read(read_data),
        ])
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            spi::Operation::Write(&[address & !SPI_READ]),
            spi::Operation::Write(write_data),
        ])
    }
}
