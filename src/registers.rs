//! Register map for the MPU6000/6050/6500/9150/9250 family
//!
//! Register addresses are shared by every chip in the family. Settings that
//! own only part of a register are described by a [`Field`], which carries the
//! register address together with the bit offset and width and provides the
//! shift/mask arithmetic used by the driver's read-modify-write helpers.
//!
//! Fields that exist on only one chip family are exposed through
//! [`RegisterMap`], which is carried by the selected
//! [`ChipProfile`](crate::chip::ChipProfile).

/// A bit field inside a single 8-bit register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Register address
    pub register: u8,
    /// Position of the least significant bit
    pub offset: u8,
    /// Number of bits
    pub width: u8,
}

impl Field {
    /// Describe a field of `width` bits starting at bit `offset`
    #[must_use]
    pub const fn new(register: u8, offset: u8, width: u8) -> Self {
        Self {
            register,
            offset,
            width,
        }
    }

    /// Describe a single-bit field
    #[must_use]
    pub const fn bit(register: u8, offset: u8) -> Self {
        Self::new(register, offset, 1)
    }

    /// Mask of the field bits in register position
    #[must_use]
    pub const fn mask(self) -> u8 {
        (((1u16 << self.width) - 1) << self.offset) as u8
    }

    /// Largest value the field can hold
    #[must_use]
    pub const fn max_value(self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Extract the field value from a full register value
    #[must_use]
    pub const fn extract(self, register_value: u8) -> u8 {
        (register_value & self.mask()) >> self.offset
    }

    /// Replace the field bits of `register_value` with `value`
    ///
    /// Bits of `value` above the field width are discarded.
    #[must_use]
    pub const fn insert(self, register_value: u8, value: u8) -> u8 {
        (register_value & !self.mask()) | ((value << self.offset) & self.mask())
    }
}

// Register addresses

/// Sample rate divider
pub const SMPLRT_DIV: u8 = 0x19;
/// FSYNC and digital low-pass filter configuration
pub const CONFIG: u8 = 0x1A;
/// Gyroscope full scale and filter bypass
pub const GYRO_CONFIG: u8 = 0x1B;
/// Accelerometer full scale
pub const ACCEL_CONFIG: u8 = 0x1C;
/// Accelerometer filter configuration (MPU6500 family)
pub const ACCEL_CONFIG2: u8 = 0x1D;
/// Low-power accelerometer output data rate (MPU6500 family)
pub const LP_ACCEL_ODR: u8 = 0x1E;
/// FIFO source enable
pub const FIFO_EN: u8 = 0x23;
/// Auxiliary I2C master control
pub const I2C_MST_CTRL: u8 = 0x24;
/// First auxiliary slave address register; slot `n` starts at `0x25 + 3 * n`
pub const I2C_SLV0_ADDR: u8 = 0x25;
/// Slot 4 device address
pub const I2C_SLV4_ADDR: u8 = 0x31;
/// Slot 4 register
pub const I2C_SLV4_REG: u8 = 0x32;
/// Slot 4 data out
pub const I2C_SLV4_DO: u8 = 0x33;
/// Slot 4 control
pub const I2C_SLV4_CTRL: u8 = 0x34;
/// Slot 4 data in
pub const I2C_SLV4_DI: u8 = 0x35;
/// Auxiliary I2C master status (cleared on read)
pub const I2C_MST_STATUS: u8 = 0x36;
/// Interrupt pin and bypass configuration
pub const INT_PIN_CFG: u8 = 0x37;
/// Interrupt enable
pub const INT_ENABLE: u8 = 0x38;
/// Interrupt status
pub const INT_STATUS: u8 = 0x3A;
/// First accelerometer data register (X high byte)
pub const ACCEL_XOUT_H: u8 = 0x3B;
/// Temperature high byte
pub const TEMP_OUT_H: u8 = 0x41;
/// First gyroscope data register (X high byte)
pub const GYRO_XOUT_H: u8 = 0x43;
/// First external sensor data register
pub const EXT_SENS_DATA_00: u8 = 0x49;
/// Number of external sensor data registers
pub const EXT_SENS_DATA_LEN: usize = 24;
/// Slot 0 data out; slot `n` uses `0x63 + n`
pub const I2C_SLV0_DO: u8 = 0x63;
/// Auxiliary I2C delay control
pub const I2C_MST_DELAY_CTRL: u8 = 0x67;
/// Signal path reset
pub const SIGNAL_PATH_RESET: u8 = 0x68;
/// User control
pub const USER_CTRL: u8 = 0x6A;
/// Power management 1
pub const PWR_MGMT_1: u8 = 0x6B;
/// Power management 2
pub const PWR_MGMT_2: u8 = 0x6C;
/// FIFO byte count high byte
pub const FIFO_COUNT_H: u8 = 0x72;
/// FIFO read/write port
pub const FIFO_R_W: u8 = 0x74;
/// Device identity
pub const WHO_AM_I: u8 = 0x75;

/// Number of auxiliary slots that can be configured for periodic transfers
pub const AUX_SLAVE_COUNT: usize = 4;

/// Address of the first register of auxiliary slot `n` (0..=3)
#[must_use]
pub const fn slave_base(n: u8) -> u8 {
    I2C_SLV0_ADDR + 3 * n
}

/// Bit 7 of an auxiliary slave address register selects a read transfer
pub const I2C_SLV_RNW: u8 = 1 << 7;

// Field descriptions

/// `CONFIG.DLPF_CFG`
pub const DLPF_CFG: Field = Field::new(CONFIG, 0, 3);
/// `GYRO_CONFIG.FS_SEL`
pub const GYRO_FS_SEL: Field = Field::new(GYRO_CONFIG, 3, 2);
/// `ACCEL_CONFIG.AFS_SEL`
pub const ACCEL_FS_SEL: Field = Field::new(ACCEL_CONFIG, 3, 2);

/// `I2C_MST_CTRL.MULT_MST_EN`
pub const MULT_MST_EN: Field = Field::bit(I2C_MST_CTRL, 7);
/// `I2C_MST_CTRL.WAIT_FOR_ES`
pub const WAIT_FOR_ES: Field = Field::bit(I2C_MST_CTRL, 6);
/// `I2C_MST_CTRL.SLV_3_FIFO_EN`
pub const SLV_3_FIFO_EN: Field = Field::bit(I2C_MST_CTRL, 5);
/// `I2C_MST_CTRL.I2C_MST_P_NSR`
pub const I2C_MST_P_NSR: Field = Field::bit(I2C_MST_CTRL, 4);
/// `I2C_MST_CTRL.I2C_MST_CLK`
pub const I2C_MST_CLK: Field = Field::new(I2C_MST_CTRL, 0, 4);

/// `I2C_SLVx_CTRL.I2C_SLVx_EN`
pub const SLV_EN: u8 = 1 << 7;
/// `I2C_SLVx_CTRL.I2C_SLVx_BYTE_SW`
pub const SLV_BYTE_SW: u8 = 1 << 6;
/// `I2C_SLVx_CTRL.I2C_SLVx_REG_DIS`
pub const SLV_REG_DIS: u8 = 1 << 5;
/// `I2C_SLVx_CTRL.I2C_SLVx_GRP`
pub const SLV_GRP: u8 = 1 << 4;
/// `I2C_SLVx_CTRL.I2C_SLVx_LEN` (slots 0..=3)
pub const SLV_LEN_MASK: u8 = 0x0F;

/// `I2C_SLV4_CTRL.I2C_SLV4_EN`
pub const SLV4_EN: Field = Field::bit(I2C_SLV4_CTRL, 7);
/// `I2C_SLV4_CTRL.I2C_SLV4_INT_EN`
pub const SLV4_INT_EN: Field = Field::bit(I2C_SLV4_CTRL, 6);
/// `I2C_SLV4_CTRL.I2C_SLV4_REG_DIS`
pub const SLV4_REG_DIS: Field = Field::bit(I2C_SLV4_CTRL, 5);
/// `I2C_SLV4_CTRL.I2C_MST_DLY`
pub const I2C_MST_DLY: Field = Field::new(I2C_SLV4_CTRL, 0, 5);

/// `I2C_MST_STATUS.PASS_THROUGH` (FSYNC level)
pub const MST_STATUS_PASS_THROUGH: u8 = 1 << 7;
/// `I2C_MST_STATUS.I2C_SLV4_DONE`
pub const MST_STATUS_SLV4_DONE: u8 = 1 << 6;
/// `I2C_MST_STATUS.I2C_LOST_ARB`
pub const MST_STATUS_LOST_ARB: u8 = 1 << 5;
/// `I2C_MST_STATUS.I2C_SLV4_NACK`
pub const MST_STATUS_SLV4_NACK: u8 = 1 << 4;

/// `INT_PIN_CFG.ACTL`
pub const INT_LEVEL: Field = Field::bit(INT_PIN_CFG, 7);
/// `INT_PIN_CFG.OPEN`
pub const INT_OPEN: Field = Field::bit(INT_PIN_CFG, 6);
/// `INT_PIN_CFG.LATCH_INT_EN`
pub const LATCH_INT_EN: Field = Field::bit(INT_PIN_CFG, 5);
/// `INT_PIN_CFG.INT_ANYRD_2CLEAR`
pub const INT_ANYRD_2CLEAR: Field = Field::bit(INT_PIN_CFG, 4);
/// `INT_PIN_CFG` bits 7:4, the four interrupt pin settings together
pub const INT_PIN_SETTINGS: Field = Field::new(INT_PIN_CFG, 4, 4);
/// `INT_PIN_CFG.ACTL_FSYNC`
pub const FSYNC_INT_LEVEL: Field = Field::bit(INT_PIN_CFG, 3);
/// `INT_PIN_CFG.FSYNC_INT_MODE_EN`
pub const FSYNC_INT_MODE_EN: Field = Field::bit(INT_PIN_CFG, 2);
/// `INT_PIN_CFG.BYPASS_EN`
pub const I2C_BYPASS_EN: Field = Field::bit(INT_PIN_CFG, 1);

/// `I2C_MST_DELAY_CTRL.DELAY_ES_SHADOW`
pub const DELAY_ES_SHADOW: Field = Field::bit(I2C_MST_DELAY_CTRL, 7);

/// `SIGNAL_PATH_RESET` gyro, accel and temperature reset bits
pub const SIGNAL_PATH_RESET_ALL: u8 = 0x07;

/// `USER_CTRL.FIFO_EN`
pub const USER_FIFO_EN: Field = Field::bit(USER_CTRL, 6);
/// `USER_CTRL.I2C_MST_EN`
pub const I2C_MST_EN: Field = Field::bit(USER_CTRL, 5);
/// `USER_CTRL.I2C_IF_DIS`
pub const I2C_IF_DIS: Field = Field::bit(USER_CTRL, 4);
/// `USER_CTRL.FIFO_RESET`
pub const FIFO_RESET: Field = Field::bit(USER_CTRL, 2);
/// `USER_CTRL.I2C_MST_RESET`
pub const I2C_MST_RESET: Field = Field::bit(USER_CTRL, 1);

/// `PWR_MGMT_1.DEVICE_RESET`
pub const DEVICE_RESET: Field = Field::bit(PWR_MGMT_1, 7);
/// `PWR_MGMT_1.SLEEP`
pub const SLEEP: Field = Field::bit(PWR_MGMT_1, 6);
/// `PWR_MGMT_1.CYCLE`
pub const CYCLE: Field = Field::bit(PWR_MGMT_1, 5);
/// `PWR_MGMT_1.GYRO_STANDBY`
pub const GYRO_STANDBY: Field = Field::bit(PWR_MGMT_1, 4);
/// `PWR_MGMT_1.TEMP_DIS`
pub const TEMP_DIS: Field = Field::bit(PWR_MGMT_1, 3);
/// `PWR_MGMT_1.CLKSEL`
pub const CLKSEL: Field = Field::new(PWR_MGMT_1, 0, 3);
/// `PWR_MGMT_1` bits owned by the standby mask (`GYRO_STANDBY` and `TEMP_DIS`)
pub const PWR1_STANDBY_MASK: u8 = 0x18;
/// `PWR_MGMT_2` bits owned by the standby mask (`STBY_XA` .. `STBY_ZG`)
pub const PWR2_STANDBY_MASK: u8 = 0x3F;

/// `FIFO_COUNT_H` valid bits (count is 13 bits wide)
pub const FIFO_COUNT_H_MASK: u8 = 0x1F;

/// Fields that exist on only one chip family
///
/// `None` means the chip has no such field; operations that need it return
/// [`Error::Unsupported`](crate::Error::Unsupported).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// `GYRO_CONFIG.FCHOICE_B`
    pub fchoice_b: Option<Field>,
    /// `ACCEL_CONFIG2.A_DLPF_CFG`
    pub accel_dlpf: Option<Field>,
    /// `ACCEL_CONFIG2.ACCEL_FCHOICE_B`
    pub accel_fchoice_b: Option<Field>,
    /// `LP_ACCEL_ODR.LPOSC_CLKSEL`
    pub lp_accel_odr: Option<Field>,
    /// `PWR_MGMT_2.LP_WAKE_CTRL`
    pub lp_wake_ctrl: Option<Field>,
    /// `CONFIG.FIFO_MODE`
    pub fifo_mode: Option<Field>,
}

impl RegisterMap {
    /// Fields of the MPU6000/MPU6050/MPU9150
    pub const MPU6050: Self = Self {
        fchoice_b: None,
        accel_dlpf: None,
        accel_fchoice_b: None,
        lp_accel_odr: None,
        lp_wake_ctrl: Some(Field::new(PWR_MGMT_2, 6, 2)),
        fifo_mode: None,
    };

    /// Fields of the MPU6500/MPU9250
    pub const MPU6500: Self = Self {
        fchoice_b: Some(Field::new(GYRO_CONFIG, 0, 2)),
        accel_dlpf: Some(Field::new(ACCEL_CONFIG2, 0, 3)),
        accel_fchoice_b: Some(Field::bit(ACCEL_CONFIG2, 3)),
        lp_accel_odr: Some(Field::new(LP_ACCEL_ODR, 0, 4)),
        lp_wake_ctrl: None,
        fifo_mode: Some(Field::bit(CONFIG, 6)),
    };
}
