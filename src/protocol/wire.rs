//! Bounds-checked little-endian field reader over a received buffer

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Reads fixed-width fields out of a borrowed slice.
///
/// Every read is checked against the end of the slice before anything is
/// consumed; running out of bytes yields [`Error::BufferTooSmall`].
pub struct WireReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn require(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::BufferTooSmall {
                need: self.position() + n,
                have: self.cursor.get_ref().len(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.require(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.require(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.require(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.require(8)?;
        Ok(self.cursor.read_u64::<LittleEndian>()?)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        self.cursor.set_position((self.position() + n) as u64);
        Ok(())
    }

    /// Borrow the next `n` bytes
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.require(n)?;
        let start = self.position();
        let buf: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + n) as u64);
        Ok(&buf[start..start + n])
    }
}

/// Borrow `len` bytes at `offset`, failing instead of reading past the end
pub fn slice_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).ok_or_else(|| {
        Error::Protocol(format!("offset {} + length {} overflows", offset, len))
    })?;
    if end > buf.len() {
        return Err(Error::BufferTooSmall {
            need: end,
            have: buf.len(),
        });
    }
    Ok(&buf[offset..end])
}
