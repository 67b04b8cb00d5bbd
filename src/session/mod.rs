//! SMB1 session on top of a NetBIOS session
//!
//! Stamps outbound messages with the session identifiers, wraps received
//! frames as [`SmbMessage`]s and checks the NT status of replies. Negotiate,
//! session setup and tree connect are driven by the caller, which hands the
//! resulting uid / tid to this type and to the queries.

use crate::error::{Error, NtStatus, Result};
use crate::netbios::NetBiosSession;
use crate::protocol::constants::{SmbFlags, SmbFlags2};
use crate::protocol::{NetBiosMessageType, SmbMessage};
use crate::transport::SmbTransport;
use std::net::TcpStream;
use tracing::{debug, trace};

/// Header flags sent on every request
pub const DEFAULT_FLAGS: SmbFlags = SmbFlags::CASE_INSENSITIVE.union(SmbFlags::CANONICALIZED_PATHS);

/// Header flags2 sent on every request
pub const DEFAULT_FLAGS2: SmbFlags2 = SmbFlags2::UNICODE
    .union(SmbFlags2::NT_STATUS)
    .union(SmbFlags2::LONG_NAMES)
    .union(SmbFlags2::IS_LONG_NAME)
    .union(SmbFlags2::EAS);

/// SMB1 client session
pub struct SmbSession<T = TcpStream> {
    transport: NetBiosSession<T>,
    uid: u16,
    pid: u32,
    mid: u16,
    last_status: u32,
}

impl<T: SmbTransport> SmbSession<T> {
    /// Wrap an established NetBIOS session
    pub fn new(transport: NetBiosSession<T>) -> Self {
        Self {
            transport,
            uid: 0,
            pid: std::process::id(),
            mid: 0,
            last_status: 0,
        }
    }

    pub fn transport(&self) -> &NetBiosSession<T> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut NetBiosSession<T> {
        &mut self.transport
    }

    /// Hand back the NetBIOS session, e.g. to close it
    pub fn into_transport(self) -> NetBiosSession<T> {
        self.transport
    }

    pub fn uid(&self) -> u16 {
        self.uid
    }

    /// Store the user id assigned by session setup
    pub fn set_uid(&mut self, uid: u16) {
        self.uid = uid;
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn set_pid(&mut self, pid: u32) {
        self.pid = pid;
    }

    /// NT status of the last received message
    pub fn last_status(&self) -> u32 {
        self.last_status
    }

    fn next_mid(&mut self) -> u16 {
        self.mid = self.mid.wrapping_add(1);
        self.mid
    }

    /// Stamp `msg` with this session's identifiers and send it as one frame.
    ///
    /// The caller's tid is left untouched.
    pub fn send_msg(&mut self, msg: &mut SmbMessage) -> Result<()> {
        let mid = self.next_mid();
        let header = msg.header_mut();
        header.flags = DEFAULT_FLAGS;
        header.flags2 = DEFAULT_FLAGS2;
        header.uid = self.uid;
        header.pid = (self.pid & 0xFFFF) as u16;
        header.pid_high = (self.pid >> 16) as u16;
        header.mid = mid;
        let command = header.command;

        let bytes = msg.to_bytes()?;
        trace!(
            "Sending SMB command 0x{:02x} mid={} ({} bytes)",
            command,
            mid,
            bytes.len()
        );
        self.transport.packet_init();
        self.transport.packet_append(&bytes)?;
        self.transport.packet_send()
    }

    /// Receive the next SMB message, skipping keepalives
    pub fn recv_msg(&mut self) -> Result<SmbMessage> {
        loop {
            let frame = self.transport.packet_recv()?;
            match frame.message_type() {
                NetBiosMessageType::SessionMessage => {
                    let msg = SmbMessage::from_bytes(frame.payload())?;
                    self.last_status = msg.header().status;
                    trace!(
                        "Received SMB command 0x{:02x} mid={} status=0x{:08x}",
                        msg.header().command,
                        msg.header().mid,
                        self.last_status
                    );
                    return Ok(msg);
                }
                NetBiosMessageType::Keepalive => {
                    debug!("Skipping NetBIOS keepalive");
                }
                other => {
                    return Err(Error::Protocol(format!(
                        "unexpected {:?} frame on an established session",
                        other
                    )));
                }
            }
        }
    }

    /// Fail with the server's status unless `msg` reports success
    pub fn check_nt_status(&self, msg: &SmbMessage) -> Result<()> {
        let status = msg.header().status;
        if status == NtStatus::Success as u32 {
            return Ok(());
        }
        debug!("Server returned {}", NtStatus::describe(status));
        Err(Error::ServerError(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_flags() {
        assert_eq!(DEFAULT_FLAGS.bits(), 0x18);
        assert_eq!(DEFAULT_FLAGS2.bits(), 0xC043);
    }
}
