//! Error types for the SMB1 client core

use crate::netbios::RefusalReason;
use std::collections::TryReserveError;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for SMB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SMB protocol operations
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer could not be grown
    #[error("Allocation failure: {0}")]
    Allocation(#[from] TryReserveError),

    /// I/O error occurred on the socket
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the connection
    #[error("Connection closed")]
    ConnectionClosed,

    /// A NetBIOS frame header could not be decoded
    #[error("Malformed NetBIOS header: {0}")]
    MalformedHeader(String),

    /// Timeout occurred
    #[error("Operation timed out")]
    Timeout,

    /// The session has no usable socket
    #[error("Not connected")]
    NotConnected,

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Buffer too small
    #[error("Buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    /// The server refused the NetBIOS session
    #[error("Session refused: {0}")]
    Refused(RefusalReason),

    /// An SMB response carried a non-success status
    #[error("Server returned {}", status_text(.0))]
    ServerError(u32),

    /// Text could not be converted to or from the wire encoding
    #[error("Encoding failure: {0}")]
    Encoding(String),

    /// Invalid NetBIOS name
    #[error("Invalid NetBIOS name: {0}")]
    InvalidNetBiosName(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

fn status_text(code: &u32) -> String {
    NtStatus::describe(*code)
}

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AllocationFailure,
    SocketError,
    ProtocolViolation,
    ServerRefused,
    ServerError,
    EncodingFailure,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Allocation(_) => ErrorKind::AllocationFailure,
            Error::Io(_)
            | Error::ConnectionClosed
            | Error::Timeout
            | Error::NotConnected
            | Error::InvalidState(_) => ErrorKind::SocketError,
            Error::MalformedHeader(_)
            | Error::Protocol(_)
            | Error::BufferTooSmall { .. }
            | Error::InvalidParameter(_) => ErrorKind::ProtocolViolation,
            Error::Refused(_) => ErrorKind::ServerRefused,
            Error::ServerError(_) => ErrorKind::ServerError,
            Error::Encoding(_) | Error::InvalidNetBiosName(_) => ErrorKind::EncodingFailure,
        }
    }

    /// Raw NT status code, if this is a server error
    pub fn nt_status(&self) -> Option<u32> {
        match self {
            Error::ServerError(code) => Some(*code),
            _ => None,
        }
    }
}

/// SMB protocol status codes (subset of NTSTATUS)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NtStatus {
    /// The operation completed successfully
    Success = 0x00000000,
    /// The data was too large to fit into the specified buffer
    BufferOverflow = 0x80000005,
    /// No more files
    NoMoreFiles = 0x80000006,
    /// The specified handle is invalid
    InvalidHandle = 0xC0000008,
    /// The parameter is incorrect
    InvalidParameter = 0xC000000D,
    /// The file does not exist
    NoSuchFile = 0xC000000F,
    /// More processing required
    MoreProcessingRequired = 0xC0000016,
    /// Access denied
    AccessDenied = 0xC0000022,
    /// The buffer is too small
    BufferTooSmall = 0xC0000023,
    /// The object name is invalid
    ObjectNameInvalid = 0xC0000033,
    /// The object name is not found
    ObjectNameNotFound = 0xC0000034,
    /// The path does not exist
    ObjectPathNotFound = 0xC000003A,
    /// The user name or password is incorrect
    LogonFailure = 0xC000006D,
    /// Insufficient resources
    InsufficientResources = 0xC000009A,
    /// The request is not supported
    NotSupported = 0xC00000BB,
    /// Bad network name
    BadNetworkName = 0xC00000CC,
    /// The handle is not a directory
    NotADirectory = 0xC0000103,
    /// The user session was deleted
    UserSessionDeleted = 0xC0000203,
    /// The specified network name is no longer available
    NetworkNameDeleted = 0xC00000C9,
}

impl NtStatus {
    /// Look up a known status code
    pub fn from_u32(value: u32) -> Option<Self> {
        let status = match value {
            0x00000000 => NtStatus::Success,
            0x80000005 => NtStatus::BufferOverflow,
            0x80000006 => NtStatus::NoMoreFiles,
            0xC0000008 => NtStatus::InvalidHandle,
            0xC000000D => NtStatus::InvalidParameter,
            0xC000000F => NtStatus::NoSuchFile,
            0xC0000016 => NtStatus::MoreProcessingRequired,
            0xC0000022 => NtStatus::AccessDenied,
            0xC0000023 => NtStatus::BufferTooSmall,
            0xC0000033 => NtStatus::ObjectNameInvalid,
            0xC0000034 => NtStatus::ObjectNameNotFound,
            0xC000003A => NtStatus::ObjectPathNotFound,
            0xC000006D => NtStatus::LogonFailure,
            0xC000009A => NtStatus::InsufficientResources,
            0xC00000BB => NtStatus::NotSupported,
            0xC00000CC => NtStatus::BadNetworkName,
            0xC0000103 => NtStatus::NotADirectory,
            0xC0000203 => NtStatus::UserSessionDeleted,
            0xC00000C9 => NtStatus::NetworkNameDeleted,
            _ => return None,
        };
        Some(status)
    }

    /// Check if this is a success status
    pub fn is_success(self) -> bool {
        self == NtStatus::Success
    }

    /// Human readable form of a raw status code
    pub fn describe(code: u32) -> String {
        match NtStatus::from_u32(code) {
            Some(status) => status.to_string(),
            None => format!("unknown status (0x{:08X})", code),
        }
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NtStatus::Success => "Success",
            NtStatus::BufferOverflow => "Buffer overflow",
            NtStatus::NoMoreFiles => "No more files",
            NtStatus::InvalidHandle => "Invalid handle",
            NtStatus::InvalidParameter => "Invalid parameter",
            NtStatus::NoSuchFile => "No such file",
            NtStatus::MoreProcessingRequired => "More processing required",
            NtStatus::AccessDenied => "Access denied",
            NtStatus::BufferTooSmall => "Buffer too small",
            NtStatus::ObjectNameInvalid => "Object name invalid",
            NtStatus::ObjectNameNotFound => "Object name not found",
            NtStatus::ObjectPathNotFound => "Object path not found",
            NtStatus::LogonFailure => "Logon failure",
            NtStatus::InsufficientResources => "Insufficient resources",
            NtStatus::NotSupported => "Not supported",
            NtStatus::BadNetworkName => "Bad network name",
            NtStatus::NotADirectory => "Not a directory",
            NtStatus::UserSessionDeleted => "User session deleted",
            NtStatus::NetworkNameDeleted => "Network name deleted",
        };
        write!(f, "{} (0x{:08X})", msg, *self as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netbios::NegativeResponseCode;

    #[test]
    fn test_ntstatus_severity() {
        assert!(NtStatus::Success.is_success());
        assert!(!NtStatus::AccessDenied.is_success());
    }

    #[test]
    fn test_ntstatus_from_u32() {
        assert_eq!(NtStatus::from_u32(0x00000000), Some(NtStatus::Success));
        assert_eq!(NtStatus::from_u32(0xC000000F), Some(NtStatus::NoSuchFile));
        assert_eq!(NtStatus::from_u32(0xFFFFFFFF), None);
    }

    #[test]
    fn test_server_error_display() {
        let err = Error::ServerError(0xC0000022);
        let display = err.to_string();
        assert!(display.contains("Access denied"));
        assert!(display.contains("0xC0000022"));

        let unknown = Error::ServerError(0xC0DEC0DE).to_string();
        assert!(unknown.contains("0xC0DEC0DE"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::ConnectionClosed.kind(), ErrorKind::SocketError);
        assert_eq!(
            Error::MalformedHeader("bad".into()).kind(),
            ErrorKind::ProtocolViolation
        );
        assert_eq!(
            Error::Refused(RefusalReason::Negative(NegativeResponseCode::CalledNameNotPresent))
                .kind(),
            ErrorKind::ServerRefused
        );
        assert_eq!(Error::ServerError(0xC0000022).kind(), ErrorKind::ServerError);
        assert_eq!(Error::Encoding("x".into()).kind(), ErrorKind::EncodingFailure);
        assert_eq!(Error::ServerError(7).nt_status(), Some(7));
        assert_eq!(Error::Timeout.nt_status(), None);

        let mut v: Vec<u8> = Vec::new();
        let reserve = v.try_reserve(usize::MAX).unwrap_err();
        assert_eq!(Error::from(reserve).kind(), ErrorKind::AllocationFailure);
    }
}
