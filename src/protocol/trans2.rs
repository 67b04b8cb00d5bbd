//! SMB1 TRANS2 request and response structures

use super::constants::{FileAttributes, Find2Flags, Trans2Subcommand, SMB_HEADER_SIZE};
use super::message::WireStruct;
use super::wire::{slice_at, WireReader};
use crate::error::{Error, Result};
use bytes::BufMut;

/// TRANS2 primary request words, byte count and the 3 pad bytes that align
/// the parameter block to offset 68
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trans2Request {
    pub total_param_count: u16,
    pub total_data_count: u16,
    pub max_param_count: u16,
    pub max_data_count: u16,
    pub max_setup_count: u8,
    pub flags: u16,
    pub timeout: u32,
    pub param_count: u16,
    pub param_offset: u16,
    pub data_count: u16,
    pub data_offset: u16,
    pub subcommand: Trans2Subcommand,
    pub byte_count: u16,
}

impl Trans2Request {
    /// Word count of a TRANS2 request with one setup word
    pub const WORD_COUNT: u8 = 15;
}

impl WireStruct for Trans2Request {
    const SIZE: usize = 36;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(Self::WORD_COUNT);
        buf.put_u16_le(self.total_param_count);
        buf.put_u16_le(self.total_data_count);
        buf.put_u16_le(self.max_param_count);
        buf.put_u16_le(self.max_data_count);
        buf.put_u8(self.max_setup_count);
        buf.put_u8(0); // reserved
        buf.put_u16_le(self.flags);
        buf.put_u32_le(self.timeout);
        buf.put_u16_le(0); // reserved2
        buf.put_u16_le(self.param_count);
        buf.put_u16_le(self.param_offset);
        buf.put_u16_le(self.data_count);
        buf.put_u16_le(self.data_offset);
        buf.put_u8(1); // setup_count
        buf.put_u8(0); // reserved3
        buf.put_u16_le(self.subcommand as u16);
        buf.put_u16_le(self.byte_count);
        buf.put_slice(&[0; 3]);
    }
}

/// Byte count and trailing zero padding for a TRANS2 request whose
/// parameter block (fixed params plus encoded name) is `param_len` bytes.
///
/// The byte count covers the 3 byte pad before the parameters, the
/// parameters and the trailing padding, and is always `3 (mod 4)` so the
/// whole message ends on a 4 byte boundary.
pub fn request_byte_count(param_len: usize) -> Result<(u16, usize)> {
    let unpadded = param_len + 3;
    let padding = (3 + 4 - unpadded % 4) % 4;
    let byte_count = u16::try_from(unpadded + padding).map_err(|_| {
        Error::InvalidParameter(format!(
            "TRANS2 parameter block of {} bytes does not fit a byte count",
            param_len
        ))
    })?;
    Ok((byte_count, padding))
}

/// FIND_FIRST2 request parameters (the search pattern follows)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindFirst2Request {
    pub search_attributes: u16,
    pub search_count: u16,
    pub flags: Find2Flags,
    pub information_level: u16,
    pub search_storage_type: u32,
}

impl WireStruct for FindFirst2Request {
    const SIZE: usize = 12;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.search_attributes);
        buf.put_u16_le(self.search_count);
        buf.put_u16_le(self.flags.bits());
        buf.put_u16_le(self.information_level);
        buf.put_u32_le(self.search_storage_type);
    }
}

/// FIND_NEXT2 request parameters (the search pattern follows)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindNext2Request {
    pub sid: u16,
    pub search_count: u16,
    pub information_level: u16,
    pub resume_key: u32,
    pub flags: Find2Flags,
}

impl WireStruct for FindNext2Request {
    const SIZE: usize = 12;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.sid);
        buf.put_u16_le(self.search_count);
        buf.put_u16_le(self.information_level);
        buf.put_u32_le(self.resume_key);
        buf.put_u16_le(self.flags.bits());
    }
}

/// QUERY_PATH_INFORMATION request parameters (the path follows)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPathRequest {
    pub information_level: u16,
}

impl WireStruct for QueryPathRequest {
    const SIZE: usize = 6;

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.information_level);
        buf.put_u32_le(0); // reserved
    }
}

/// Fixed part of a TRANS2 response, parsed from the payload after the SMB
/// header. Offsets are relative to the start of the SMB header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trans2ResponseHeader {
    pub word_count: u8,
    pub total_param_count: u16,
    pub total_data_count: u16,
    pub param_count: u16,
    pub param_offset: u16,
    pub param_displacement: u16,
    pub data_count: u16,
    pub data_offset: u16,
    pub data_displacement: u16,
    pub setup_count: u8,
    pub byte_count: u16,
}

impl Trans2ResponseHeader {
    /// Word count of a TRANS2 response without setup words
    pub const MIN_WORD_COUNT: u8 = 10;

    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(payload);
        let word_count = reader.u8()?;
        if word_count < Self::MIN_WORD_COUNT {
            return Err(Error::Protocol(format!(
                "TRANS2 response word count {} < {}",
                word_count,
                Self::MIN_WORD_COUNT
            )));
        }
        let total_param_count = reader.u16()?;
        let total_data_count = reader.u16()?;
        reader.skip(2)?; // reserved
        let param_count = reader.u16()?;
        let param_offset = reader.u16()?;
        let param_displacement = reader.u16()?;
        let data_count = reader.u16()?;
        let data_offset = reader.u16()?;
        let data_displacement = reader.u16()?;
        let setup_count = reader.u8()?;
        reader.skip(1)?; // reserved2
        reader.skip(2 * setup_count as usize)?;
        let byte_count = reader.u16()?;

        Ok(Self {
            word_count,
            total_param_count,
            total_data_count,
            param_count,
            param_offset,
            param_displacement,
            data_count,
            data_offset,
            data_displacement,
            setup_count,
            byte_count,
        })
    }

    /// Bytes still expected after this fragment. Zero or less ends reassembly.
    pub fn remaining(&self) -> i64 {
        self.total_data_count as i64 - (self.data_displacement as i64 + self.data_count as i64)
    }

    /// Payload index and length of this fragment's parameter block
    pub fn param_range(&self, payload_size: usize) -> Result<(usize, usize)> {
        Self::range("parameter", self.param_offset, self.param_count, payload_size)
    }

    /// Payload index and length of this fragment's data block
    pub fn data_range(&self, payload_size: usize) -> Result<(usize, usize)> {
        Self::range("data", self.data_offset, self.data_count, payload_size)
    }

    pub fn parameters<'a>(&self, payload: &'a [u8]) -> Result<&'a [u8]> {
        let (start, len) = self.param_range(payload.len())?;
        slice_at(payload, start, len)
    }

    pub fn data<'a>(&self, payload: &'a [u8]) -> Result<&'a [u8]> {
        let (start, len) = self.data_range(payload.len())?;
        slice_at(payload, start, len)
    }

    fn range(what: &str, offset: u16, count: u16, payload_size: usize) -> Result<(usize, usize)> {
        if count == 0 {
            return Ok((payload_size, 0));
        }
        let start = (offset as usize)
            .checked_sub(SMB_HEADER_SIZE)
            .ok_or_else(|| Error::Protocol(format!("{} offset {} inside SMB header", what, offset)))?;
        if start + count as usize > payload_size {
            return Err(Error::Protocol(format!(
                "{} block {}+{} exceeds payload of {} bytes",
                what, start, count, payload_size
            )));
        }
        Ok((start, count as usize))
    }
}

/// FIND_FIRST2 response parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindFirst2Response {
    pub sid: u16,
    pub search_count: u16,
    pub end_of_search: bool,
    pub ea_error_offset: u16,
    pub last_name_offset: u16,
}

impl FindFirst2Response {
    pub const SIZE: usize = 10;

    pub fn parse(params: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(params);
        Ok(Self {
            sid: reader.u16()?,
            search_count: reader.u16()?,
            end_of_search: reader.u16()? != 0,
            ea_error_offset: reader.u16()?,
            last_name_offset: reader.u16()?,
        })
    }
}

/// FIND_NEXT2 response parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindNext2Response {
    pub search_count: u16,
    pub end_of_search: bool,
    pub ea_error_offset: u16,
    pub last_name_offset: u16,
}

impl FindNext2Response {
    pub const SIZE: usize = 8;

    pub fn parse(params: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(params);
        Ok(Self {
            search_count: reader.u16()?,
            end_of_search: reader.u16()? != 0,
            ea_error_offset: reader.u16()?,
            last_name_offset: reader.u16()?,
        })
    }
}

/// SMB_FIND_FILE_BOTH_DIRECTORY_INFO entry, borrowing its name bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BothDirectoryInfo<'a> {
    pub next_entry_offset: u32,
    pub file_index: u32,
    pub created: u64,
    pub accessed: u64,
    pub written: u64,
    pub changed: u64,
    pub size: u64,
    pub alloc_size: u64,
    pub attributes: FileAttributes,
    pub ea_size: u32,
    pub short_name: &'a [u8],
    pub name: &'a [u8],
}

impl<'a> BothDirectoryInfo<'a> {
    /// Fixed part preceding the variable-length name
    pub const FIXED_SIZE: usize = 94;

    /// Parse the entry at the start of `buf`, where `buf` extends to the end
    /// of the received data. Neither the fixed part nor the name may run
    /// past it.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let mut reader = WireReader::new(buf);
        let next_entry_offset = reader.u32()?;
        let file_index = reader.u32()?;
        let created = reader.u64()?;
        let accessed = reader.u64()?;
        let written = reader.u64()?;
        let changed = reader.u64()?;
        let size = reader.u64()?;
        let alloc_size = reader.u64()?;
        let attributes = FileAttributes::from_bits_retain(reader.u32()?);
        let name_len = reader.u32()? as usize;
        let ea_size = reader.u32()?;
        let short_name_len = reader.u8()? as usize;
        reader.skip(1)?; // reserved
        let short_name_field = reader.bytes(24)?;
        let short_name = &short_name_field[..short_name_len.min(24)];
        let name = reader.bytes(name_len)?;

        Ok(Self {
            next_entry_offset,
            file_index,
            created,
            accessed,
            written,
            changed,
            size,
            alloc_size,
            attributes,
            ea_size,
            short_name,
            name,
        })
    }
}

/// SMB_QUERY_FILE_ALL_INFO structure, borrowing its name bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAllInfo<'a> {
    pub created: u64,
    pub accessed: u64,
    pub written: u64,
    pub changed: u64,
    pub attributes: FileAttributes,
    pub alloc_size: u64,
    pub size: u64,
    pub link_count: u32,
    pub delete_pending: bool,
    pub is_dir: bool,
    pub ea_size: u32,
    pub name: &'a [u8],
}

impl<'a> FileAllInfo<'a> {
    pub const FIXED_SIZE: usize = 72;

    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let mut reader = WireReader::new(buf);
        let created = reader.u64()?;
        let accessed = reader.u64()?;
        let written = reader.u64()?;
        let changed = reader.u64()?;
        let attributes = FileAttributes::from_bits_retain(reader.u32()?);
        reader.skip(4)?; // reserved
        let alloc_size = reader.u64()?;
        let size = reader.u64()?;
        let link_count = reader.u32()?;
        let delete_pending = reader.u8()? != 0;
        let is_dir = reader.u8()? != 0;
        reader.skip(2)?; // reserved
        let ea_size = reader.u32()?;
        let name_len = reader.u32()? as usize;
        let name = reader.bytes(name_len)?;

        Ok(Self {
            created,
            accessed,
            written,
            changed,
            attributes,
            alloc_size,
            size,
            link_count,
            delete_pending,
            is_dir,
            ea_size,
            name,
        })
    }
}
