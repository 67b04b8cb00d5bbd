//! NetBIOS over TCP (NBT) session service
//!
//! This module implements the NetBIOS Session Service as defined in RFC 1001/1002:
//! the 4 byte frame header, name encoding for the session request, and the
//! client side session with its reusable packet buffer.

use crate::error::{Error, Result};
use crate::protocol::constants::NBT_HDR_SIZE;
use crate::protocol::NetBiosMessageType;
use std::convert::TryFrom;
use std::fmt;
use std::net::SocketAddrV4;

pub mod frame;
pub mod name;
pub mod packet;
pub mod session;

pub use frame::NetBiosFrame;
pub use packet::PacketBuffer;
pub use session::{NetBiosSession, SessionState};

/// NetBIOS Session Service header (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetBiosHeader {
    /// Message type
    pub message_type: NetBiosMessageType,
    /// Length of the message payload (17 bits max)
    pub length: u32,
}

impl NetBiosHeader {
    /// Maximum payload length (17 bits)
    pub const MAX_LENGTH: u32 = 0x1FFFF;

    /// Header size in bytes
    pub const SIZE: usize = NBT_HDR_SIZE;

    /// Only the low bit of the flags byte is defined (length extension)
    const FLAGS_LENGTH_BIT: u8 = 0x01;

    /// Create a new NetBIOS header
    pub fn new(message_type: NetBiosMessageType, length: u32) -> Result<Self> {
        if length > Self::MAX_LENGTH {
            return Err(Error::InvalidParameter(format!(
                "NetBIOS length {} exceeds maximum {}",
                length,
                Self::MAX_LENGTH
            )));
        }
        Ok(Self {
            message_type,
            length,
        })
    }

    /// Parse a NetBIOS header from bytes
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(Error::BufferTooSmall {
                need: Self::SIZE,
                have: buf.len(),
            });
        }

        let message_type = NetBiosMessageType::try_from(buf[0])?;

        if buf[1] & !Self::FLAGS_LENGTH_BIT != 0 {
            return Err(Error::MalformedHeader(format!(
                "reserved NetBIOS flag bits set: 0x{:02x}",
                buf[1]
            )));
        }

        // Length is in the lower 17 bits of bytes 1-3
        let length = (((buf[1] & Self::FLAGS_LENGTH_BIT) as u32) << 16)
            | ((buf[2] as u32) << 8)
            | (buf[3] as u32);

        Ok(Self {
            message_type,
            length,
        })
    }

    /// Serialize the header to bytes
    pub fn to_bytes(&self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        bytes[0] = self.message_type as u8;

        // Length goes in the lower 17 bits
        bytes[1] = ((self.length >> 16) & 0x01) as u8;
        bytes[2] = ((self.length >> 8) & 0xFF) as u8;
        bytes[3] = (self.length & 0xFF) as u8;

        bytes
    }
}

/// Error codes carried by a negative session response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegativeResponseCode {
    NotListeningOnCalledName,
    NotListeningForCallingName,
    CalledNameNotPresent,
    InsufficientResources,
    Unspecified,
    Other(u8),
}

impl From<u8> for NegativeResponseCode {
    fn from(code: u8) -> Self {
        match code {
            0x80 => NegativeResponseCode::NotListeningOnCalledName,
            0x81 => NegativeResponseCode::NotListeningForCallingName,
            0x82 => NegativeResponseCode::CalledNameNotPresent,
            0x83 => NegativeResponseCode::InsufficientResources,
            0x8F => NegativeResponseCode::Unspecified,
            other => NegativeResponseCode::Other(other),
        }
    }
}

impl fmt::Display for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegativeResponseCode::NotListeningOnCalledName => {
                write!(f, "not listening on called name (0x80)")
            }
            NegativeResponseCode::NotListeningForCallingName => {
                write!(f, "not listening for calling name (0x81)")
            }
            NegativeResponseCode::CalledNameNotPresent => {
                write!(f, "called name not present (0x82)")
            }
            NegativeResponseCode::InsufficientResources => {
                write!(f, "called name present, but insufficient resources (0x83)")
            }
            NegativeResponseCode::Unspecified => write!(f, "unspecified error (0x8f)"),
            NegativeResponseCode::Other(code) => write!(f, "error code 0x{:02x}", code),
        }
    }
}

/// Why the server turned down a session request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// NEGATIVE SESSION RESPONSE
    Negative(NegativeResponseCode),
    /// RETARGET SESSION RESPONSE: the server asked us to dial elsewhere
    Retarget(SocketAddrV4),
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefusalReason::Negative(code) => write!(f, "negative session response: {}", code),
            RefusalReason::Retarget(addr) => write!(f, "retargeted to {}", addr),
        }
    }
}
