//! Protocol constants for NetBIOS and SMB1

use bitflags::bitflags;
use std::convert::TryFrom;

/// NetBIOS header size
pub const NBT_HDR_SIZE: usize = 4;

/// SMB1 magic (0xFF 'S' 'M' 'B')
pub const SMB_MAGIC: [u8; 4] = [0xFF, b'S', b'M', b'B'];

/// SMB1 header size
pub const SMB_HEADER_SIZE: usize = 32;

/// NetBIOS message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NetBiosMessageType {
    SessionMessage = 0x00,
    SessionRequest = 0x81,
    PositiveResponse = 0x82,
    NegativeResponse = 0x83,
    RetargetResponse = 0x84,
    Keepalive = 0x85,
}

impl TryFrom<u8> for NetBiosMessageType {
    type Error = crate::error::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(NetBiosMessageType::SessionMessage),
            0x81 => Ok(NetBiosMessageType::SessionRequest),
            0x82 => Ok(NetBiosMessageType::PositiveResponse),
            0x83 => Ok(NetBiosMessageType::NegativeResponse),
            0x84 => Ok(NetBiosMessageType::RetargetResponse),
            0x85 => Ok(NetBiosMessageType::Keepalive),
            _ => Err(crate::error::Error::MalformedHeader(format!(
                "Invalid NetBIOS message type: 0x{:02x}",
                value
            ))),
        }
    }
}

/// SMB1 command codes used by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SmbCommand {
    Trans2 = 0x32,
}

/// TRANS2 subcommands (carried in the setup word)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Trans2Subcommand {
    FindFirst2 = 0x0001,
    FindNext2 = 0x0002,
    QueryPathInformation = 0x0005,
}

/// Information levels
pub mod info_level {
    /// SMB_FIND_FILE_BOTH_DIRECTORY_INFO
    pub const FIND_FILE_BOTH_DIRECTORY_INFO: u16 = 0x0104;
    /// SMB_QUERY_FILE_ALL_INFO
    pub const QUERY_FILE_ALL_INFO: u16 = 0x0107;
}

/// Fixed TRANS2 request layout.
///
/// The parameter block always starts right after the 32 byte header, the
/// 36 byte TRANS2 request words and their 3 byte pad.
pub mod trans2_layout {
    pub const PARAM_OFFSET: u16 = 68;
    pub const FIND_DATA_OFFSET: u16 = 88;
    pub const QUERY_PATH_DATA_OFFSET: u16 = 96;
    pub const FIND_MAX_PARAM_COUNT: u16 = 10;
    pub const QUERY_PATH_MAX_PARAM_COUNT: u16 = 2;
    pub const MAX_DATA_COUNT: u16 = 0xFFFF;
}

/// Entries requested by FIND_FIRST2
pub const FIND_FIRST_SEARCH_COUNT: u16 = 1366;

/// Entries requested by each FIND_NEXT2; servers cap continuation batches lower
pub const FIND_NEXT_SEARCH_COUNT: u16 = 255;

bitflags! {
    /// SMB1 header flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SmbFlags: u8 {
        const LOCK_AND_READ_OK   = 0x01;
        const CASE_INSENSITIVE   = 0x08;
        const CANONICALIZED_PATHS = 0x10;
        const OPLOCK             = 0x20;
        const REPLY              = 0x80;
    }
}

bitflags! {
    /// SMB1 header flags2
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SmbFlags2: u16 {
        const LONG_NAMES          = 0x0001;
        const EAS                 = 0x0002;
        const SECURITY_SIGNATURE  = 0x0004;
        const IS_LONG_NAME        = 0x0040;
        const EXTENDED_SECURITY   = 0x0800;
        const DFS                 = 0x1000;
        const PAGING_IO           = 0x2000;
        const NT_STATUS           = 0x4000;
        const UNICODE             = 0x8000;
    }
}

bitflags! {
    /// FIND_FIRST2 / FIND_NEXT2 request flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Find2Flags: u16 {
        const CLOSE_AFTER_REQUEST = 0x0001;
        const CLOSE_AT_EOS        = 0x0002;
        const RETURN_RESUME_KEYS  = 0x0004;
        const CONTINUE_FROM_LAST  = 0x0008;
        const WITH_BACKUP_INTENT  = 0x0010;
    }
}

bitflags! {
    /// Extended file attributes as defined in MS-FSCC
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileAttributes: u32 {
        const READONLY            = 0x00000001;
        const HIDDEN              = 0x00000002;
        const SYSTEM              = 0x00000004;
        const VOLUME              = 0x00000008;
        const DIRECTORY           = 0x00000010;
        const ARCHIVE             = 0x00000020;
        const NORMAL              = 0x00000080;
        const TEMPORARY           = 0x00000100;
        const SPARSE_FILE         = 0x00000200;
        const REPARSE_POINT       = 0x00000400;
        const COMPRESSED          = 0x00000800;
        const OFFLINE             = 0x00001000;
        const NOT_CONTENT_INDEXED = 0x00002000;
        const ENCRYPTED           = 0x00004000;
    }
}

/// Search attribute mask for FIND_FIRST2: include hidden, system and directory
/// entries along with plain files
pub const DEFAULT_SEARCH_ATTRIBUTES: u16 = (FileAttributes::READONLY.bits()
    | FileAttributes::HIDDEN.bits()
    | FileAttributes::SYSTEM.bits()
    | FileAttributes::DIRECTORY.bits()
    | FileAttributes::ARCHIVE.bits()) as u16;
