//! FIFO data parsing
//!
//! Splits a byte stream read from the FIFO into packets. The layout of each
//! packet follows from the enabled sources (see the [module docs](super)).
//! Sensor words are big-endian; auxiliary bytes are returned untouched since
//! their encoding depends on the external device.
//!
//! # Example
//!
//! ```ignore
//! # use invensense_mpu::fifo::{parser::FifoParser, FifoLayout, FifoSources};
//! # let buffer = [0u8; 512];
//! let parser = FifoParser::new(&FifoLayout::new(FifoSources::ACCEL | FifoSources::GYRO));
//! for packet in parser.parse(&buffer)? {
//!     let _ = packet.accel;
//! }
//! # Ok::<(), invensense_mpu::Error<()>>(())
//! ```

use super::{FifoLayout, FifoSources};
use crate::Error;
use crate::device::{AccelData, GyroData};

/// Maximum number of packets returned by one [`FifoParser::parse`] call
pub const MAX_PACKETS: usize = 64;

/// Largest number of auxiliary bytes in one packet (4 slots of 15 bytes)
pub const MAX_EXTERNAL_BYTES: usize = 60;

/// One decoded FIFO packet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FifoPacket {
    /// Accelerometer sample, if enabled
    pub accel: Option<AccelData>,
    /// Raw temperature, if enabled
    pub temperature: Option<i16>,
    /// Gyroscope sample; axes that are not enabled read as 0
    pub gyro: Option<GyroData>,
    /// Bytes of the enabled auxiliary slots, in slot order
    pub external: heapless::Vec<u8, MAX_EXTERNAL_BYTES>,
}

#[cfg(feature = "defmt")]
impl defmt::Format for FifoPacket {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "FifoPacket {{ accel: {}, temperature: {}, gyro: {}, external: {=[u8]} }}",
            self.accel,
            self.temperature,
            self.gyro,
            self.external.as_slice()
        );
    }
}

/// FIFO data parser
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoParser {
    /// Packet layout
    layout: FifoLayout,
    /// Bytes per packet
    packet_size: usize,
}

impl FifoParser {
    /// Create a parser for `layout`
    #[must_use]
    pub const fn new(layout: &FifoLayout) -> Self {
        Self {
            layout: *layout,
            packet_size: layout.packet_size() as usize,
        }
    }

    /// Bytes per packet
    #[must_use]
    pub const fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// Parse complete packets from `data`
    ///
    /// Trailing bytes that do not form a complete packet are ignored.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `data` holds more than [`MAX_PACKETS`]
    /// packets.
    pub fn parse(&self, data: &[u8]) -> Result<heapless::Vec<FifoPacket, MAX_PACKETS>, Error<()>> {
        let mut packets = heapless::Vec::new();
        if self.packet_size == 0 {
            return Ok(packets);
        }

        for chunk in data.chunks_exact(self.packet_size) {
            packets
                .push(self.parse_packet(chunk)?)
                .map_err(|_| Error::InvalidArgument)?;
        }

        Ok(packets)
    }

    fn parse_packet(&self, data: &[u8]) -> Result<FifoPacket, Error<()>> {
        let sources = self.layout.sources;
        let mut words = Cursor { data, offset: 0 };
        let mut packet = FifoPacket::default();

        if sources.contains(FifoSources::ACCEL) {
            packet.accel = Some(AccelData {
                x: words.next_i16(),
                y: words.next_i16(),
                z: words.next_i16(),
            });
        }
        if sources.contains(FifoSources::TEMPERATURE) {
            packet.temperature = Some(words.next_i16());
        }
        if sources.intersects(FifoSources::GYRO) {
            let mut axis = |flag| {
                if sources.contains(flag) {
                    words.next_i16()
                } else {
                    0
                }
            };
            packet.gyro = Some(GyroData {
                x: axis(FifoSources::GYRO_X),
                y: axis(FifoSources::GYRO_Y),
                z: axis(FifoSources::GYRO_Z),
            });
        }
        for (slot, flag) in FifoSources::SLAVES.iter().enumerate() {
            if sources.contains(*flag) {
                let bytes = words.take(usize::from(self.layout.slave_lengths[slot]));
                packet
                    .external
                    .extend_from_slice(bytes)
                    .map_err(|()| Error::InvalidArgument)?;
            }
        }

        Ok(packet)
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> &'a [u8] {
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        bytes
    }

    fn next_i16(&mut self) -> i16 {
        let bytes = self.take(2);
        i16::from_be_bytes([bytes[0], bytes[1]])
    }
}
