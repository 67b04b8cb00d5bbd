//! SMB1 messages: an owned header plus a growable payload

use super::header::SmbHeader;
use crate::error::{Error, Result};
use bytes::BufMut;

/// A fixed-layout structure that is appended to a message verbatim.
///
/// Implementations write every multi-byte field little-endian.
pub trait WireStruct {
    /// Encoded size in bytes
    const SIZE: usize;

    fn encode<B: BufMut>(&self, buf: &mut B);
}

/// One logical SMB request or response.
///
/// The payload is everything after the 32 byte header. A received message
/// owns a copy of its frame so it stays valid after the transport buffer is
/// reused, and may be grown to stitch further TRANS2 fragments onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbMessage {
    header: SmbHeader,
    payload: Vec<u8>,
    cursor: usize,
}

impl SmbMessage {
    /// Fresh outbound message for `command` with zeroed identifiers
    pub fn new(command: u8) -> Self {
        Self {
            header: SmbHeader::new(command),
            payload: Vec::new(),
            cursor: 0,
        }
    }

    /// Wrap a received SMB frame, copying it out of the transport buffer
    pub fn from_bytes(frame: &[u8]) -> Result<Self> {
        let header = SmbHeader::parse(frame)?;
        let body = &frame[SmbHeader::SIZE..];
        let mut payload = Vec::new();
        payload.try_reserve_exact(body.len())?;
        payload.extend_from_slice(body);
        Ok(Self {
            header,
            payload,
            cursor: 0,
        })
    }

    pub fn header(&self) -> &SmbHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut SmbHeader {
        &mut self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) -> Result<()> {
        if cursor > self.payload.len() {
            return Err(Error::InvalidParameter(format!(
                "cursor {} beyond payload of {} bytes",
                cursor,
                self.payload.len()
            )));
        }
        self.cursor = cursor;
        Ok(())
    }

    /// Append a fixed-size structure
    pub fn put<S: WireStruct>(&mut self, value: &S) -> Result<()> {
        self.payload.try_reserve(S::SIZE)?;
        let before = self.payload.len();
        value.encode(&mut self.payload);
        debug_assert_eq!(self.payload.len() - before, S::SIZE);
        self.cursor = self.payload.len();
        Ok(())
    }

    pub fn put8(&mut self, byte: u8) -> Result<()> {
        self.append(&[byte])
    }

    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.payload.try_reserve(bytes.len())?;
        self.payload.extend_from_slice(bytes);
        self.cursor = self.payload.len();
        Ok(())
    }

    /// Append `count` zero bytes
    pub fn pad(&mut self, count: usize) -> Result<()> {
        self.payload.try_reserve(count)?;
        self.payload.resize(self.payload.len() + count, 0);
        self.cursor = self.payload.len();
        Ok(())
    }

    /// Reserve room for `extra_bytes` more payload. Header and existing
    /// payload are untouched.
    pub fn grow(&mut self, extra_bytes: usize) -> Result<()> {
        self.payload.try_reserve_exact(extra_bytes)?;
        Ok(())
    }

    /// Copy `src` at the cursor, which must sit at the end of the logical
    /// payload, and advance it
    pub fn append_payload(&mut self, src: &[u8]) -> Result<()> {
        if self.cursor != self.payload.len() {
            return Err(Error::InvalidState(format!(
                "append at cursor {} but payload ends at {}",
                self.cursor,
                self.payload.len()
            )));
        }
        self.append(src)
    }

    /// Drop payload bytes past `len`, e.g. alignment padding behind the first
    /// fragment's data
    pub fn truncate_payload(&mut self, len: usize) {
        self.payload.truncate(len);
        self.cursor = self.cursor.min(self.payload.len());
    }

    /// Wire form: header followed by payload
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = self.header.serialize()?;
        bytes.try_reserve_exact(self.payload.len())?;
        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }
}
