//! Tunnel packet header definitions and parsing
//!
//! Implements the fixed-size header carried in front of every tunnel
//! packet. The scrambler receives the header as opaque per-packet context;
//! nothing reads it there today, but the plumbing reserves room for
//! per-packet keying.

use crate::constants::HEADER_SIZE;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur while parsing a packet header off the wire.
#[derive(Error, Debug)]
pub enum PacketError {
    /// Underlying IO error from reading header fields.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Header shorter than the fixed wire size.
    #[error("Invalid length")]
    InvalidLength,
    /// Unrecognized opcode byte.
    #[error("Invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),
}

/// Sync flag: sender requests connection (re)synchronization
pub const F_SYNC: u8 = 0x01;

/// Packet opcodes in the tunnel protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Keepalive and connection establishment
    Hello = 0x01,
    /// Tunneled payload
    Data = 0x02,
    /// Human-readable status message
    Message = 0x03,
}

impl TryFrom<u8> for Opcode {
    type Error = PacketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Opcode::Hello),
            0x02 => Ok(Opcode::Data),
            0x03 => Ok(Opcode::Message),
            _ => Err(PacketError::InvalidOpcode(value)),
        }
    }
}

/// Fixed per-packet header: opcode, flags, sequence number, Unix timestamp.
///
/// Multi-byte fields travel in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub opcode: Opcode,
    pub flags: u8,
    pub seq: u16,
    pub timestamp: u32,
}

impl PacketHeader {
    /// Create a header stamped with the current Unix time.
    pub fn new(opcode: Opcode, seq: u16) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as u32);
        Self {
            opcode,
            flags: 0,
            seq,
            timestamp,
        }
    }

    /// Serialize the header to wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.push(self.opcode as u8);
        buf.push(self.flags);
        buf.extend_from_slice(&self.seq.to_be_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf
    }

    /// Parse a header from wire format.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < HEADER_SIZE {
            return Err(PacketError::InvalidLength);
        }

        let mut cursor = Cursor::new(data);
        let opcode = Opcode::try_from(cursor.read_u8()?)?;
        let flags = cursor.read_u8()?;
        let seq = cursor.read_u16::<BigEndian>()?;
        let timestamp = cursor.read_u32::<BigEndian>()?;

        Ok(Self {
            opcode,
            flags,
            seq,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let mut header = PacketHeader::new(Opcode::Hello, 42);
        header.flags |= F_SYNC;

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);

        let parsed = PacketHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_wire_layout() {
        let header = PacketHeader {
            opcode: Opcode::Data,
            flags: 0,
            seq: 0x0102,
            timestamp: 0x0A0B0C0D,
        };

        let bytes = header.to_bytes();
        assert_eq!(bytes, [0x02, 0x00, 0x01, 0x02, 0x0A, 0x0B, 0x0C, 0x0D]);
    }

    #[test]
    fn test_header_truncated() {
        let result = PacketHeader::from_bytes(&[0x01, 0x00, 0x00]);
        assert!(matches!(result, Err(PacketError::InvalidLength)));
    }

    #[test]
    fn test_header_invalid_opcode() {
        let bytes = [0x7F, 0, 0, 0, 0, 0, 0, 0];
        let result = PacketHeader::from_bytes(&bytes);
        assert!(matches!(result, Err(PacketError::InvalidOpcode(0x7F))));
    }
}
