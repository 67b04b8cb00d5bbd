//! Client side NetBIOS session
//!
//! A session owns one connected stream and one [`PacketBuffer`]. Requests are
//! staged in the buffer with `packet_init` / `packet_append` and framed by
//! `packet_send`; `packet_recv` reads exactly one frame back into the same
//! buffer.

use super::name::session_request_payload;
use super::{NegativeResponseCode, NetBiosFrame, NetBiosHeader, PacketBuffer, RefusalReason};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::protocol::NetBiosMessageType;
use crate::transport::{self, read_full, write_full, SmbTransport};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Connection state of a NetBIOS session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no socket yet
    New,
    /// TCP connect or session request in flight
    Connecting,
    /// Ready for session messages
    Connected,
    /// A socket or framing error occurred; the session must be recreated
    Error,
    /// The server turned down the session request
    Refused,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::New => "new",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Error => "error",
            SessionState::Refused => "refused",
        };
        f.write_str(name)
    }
}

/// NetBIOS session over a blocking stream, TCP by default
pub struct NetBiosSession<T = TcpStream> {
    config: SessionConfig,
    state: SessionState,
    remote: Option<SocketAddr>,
    stream: Option<T>,
    packet: PacketBuffer,
}

/// Session over a real TCP socket
pub type TcpSession = NetBiosSession<TcpStream>;

impl NetBiosSession<TcpStream> {
    /// New unconnected session whose packet buffer holds `buffer_size`
    /// payload bytes before growing
    pub fn new(buffer_size: usize) -> Result<Self> {
        Self::with_config(SessionConfig::default().with_buffer_size(buffer_size))
    }

    /// Dial `remote_ip` and establish the session.
    ///
    /// With `direct_transport` the connection goes to the direct SMB port and
    /// no session request is exchanged; otherwise the NetBIOS session port is
    /// used and `remote_name` is sent as the called name.
    pub fn connect(
        &mut self,
        remote_ip: Ipv4Addr,
        remote_name: &str,
        direct_transport: bool,
    ) -> Result<()> {
        self.require_state(SessionState::New)?;
        let request = self.build_request(remote_name, direct_transport)?;

        let addr = SocketAddrV4::new(remote_ip, self.config.port_for(direct_transport));
        self.set_state(SessionState::Connecting);
        let stream = match transport::tcp::connect(addr, self.config.connect_timeout) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("TCP connect to {} failed: {}", addr, e);
                self.set_state(SessionState::Error);
                return Err(e);
            }
        };
        self.establish(stream, request)
    }
}

impl<T: SmbTransport> NetBiosSession<T> {
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        let packet = PacketBuffer::new(config.buffer_size)?;
        Ok(Self {
            config,
            state: SessionState::New,
            remote: None,
            stream: None,
            packet,
        })
    }

    /// Establish the session over an already connected stream
    pub fn connect_with(
        &mut self,
        stream: T,
        remote_name: &str,
        direct_transport: bool,
    ) -> Result<()> {
        self.require_state(SessionState::New)?;
        let request = self.build_request(remote_name, direct_transport)?;
        self.set_state(SessionState::Connecting);
        self.establish(stream, request)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// The underlying stream, while one is attached
    pub fn stream(&self) -> Option<&T> {
        self.stream.as_ref()
    }

    pub fn stream_mut(&mut self) -> Option<&mut T> {
        self.stream.as_mut()
    }

    /// Reset the write cursor for a new outbound payload
    pub fn packet_init(&mut self) {
        self.packet.init();
    }

    /// Append `data` to the outbound payload, growing the buffer if needed
    pub fn packet_append(&mut self, data: &[u8]) -> Result<()> {
        self.packet.append(data)
    }

    /// Frame the staged payload as a session message and write all of it
    pub fn packet_send(&mut self) -> Result<()> {
        self.require_state(SessionState::Connected)?;
        self.send_frame(NetBiosMessageType::SessionMessage)
    }

    /// Block until one complete frame has arrived.
    ///
    /// The returned view borrows the session buffer and is only valid until
    /// the next call on this session.
    pub fn packet_recv(&mut self) -> Result<NetBiosFrame<'_>> {
        self.require_state(SessionState::Connected)?;
        self.recv_frame()
    }

    /// Close the socket and return to `New`. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown() {
                debug!("Ignoring shutdown error: {}", e);
            }
            debug!("NetBIOS session closed");
        }
        self.remote = None;
        self.packet.init();
        self.set_state(SessionState::New);
    }

    /// Close the socket and release the buffer
    pub fn destroy(mut self) {
        self.close();
    }

    fn require_state(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            return Ok(());
        }
        if expected == SessionState::Connected {
            return Err(Error::NotConnected);
        }
        Err(Error::InvalidState(format!(
            "session is {}, expected {}",
            self.state, expected
        )))
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("NetBIOS session {} -> {}", self.state, state);
            self.state = state;
        }
    }

    /// Session request payload, needed only on the NetBIOS port. Built before
    /// dialing so a bad name never leaves a half-open session behind.
    fn build_request(&self, remote_name: &str, direct_transport: bool) -> Result<Option<Vec<u8>>> {
        if direct_transport {
            return Ok(None);
        }
        session_request_payload(remote_name, &self.config.calling_name).map(Some)
    }

    fn establish(&mut self, stream: T, request: Option<Vec<u8>>) -> Result<()> {
        self.remote = stream.remote_addr();
        self.stream = Some(stream);

        let result = match request {
            Some(payload) => self.handshake(&payload),
            None => Ok(()),
        }
        .and_then(|()| self.apply_timeouts(self.config.read_timeout, None));

        match result {
            Ok(()) => {
                self.set_state(SessionState::Connected);
                Ok(())
            }
            Err(e) => {
                let state = match e {
                    Error::Refused(_) => SessionState::Refused,
                    _ => SessionState::Error,
                };
                self.set_state(state);
                Err(e)
            }
        }
    }

    fn apply_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        stream.set_read_timeout(read)?;
        stream.set_write_timeout(write)
    }

    /// Send the session request and wait for the verdict. Both the write and
    /// each read are bounded by the handshake timeout.
    fn handshake(&mut self, request: &[u8]) -> Result<()> {
        let bound = Some(self.config.handshake_timeout);
        self.apply_timeouts(bound, bound)?;

        self.packet.init();
        self.packet.append(request)?;
        self.send_frame(NetBiosMessageType::SessionRequest)?;

        loop {
            let frame = self.recv_frame()?;
            match frame.message_type() {
                NetBiosMessageType::PositiveResponse => {
                    debug!("NetBIOS session request accepted");
                    return Ok(());
                }
                NetBiosMessageType::NegativeResponse => {
                    let code = frame
                        .payload()
                        .first()
                        .copied()
                        .map(NegativeResponseCode::from)
                        .unwrap_or(NegativeResponseCode::Unspecified);
                    warn!("NetBIOS session request refused: {}", code);
                    return Err(Error::Refused(RefusalReason::Negative(code)));
                }
                NetBiosMessageType::RetargetResponse => {
                    let payload = frame.payload();
                    if payload.len() < 6 {
                        return Err(Error::Protocol(format!(
                            "retarget response of {} bytes",
                            payload.len()
                        )));
                    }
                    let ip = Ipv4Addr::new(payload[0], payload[1], payload[2], payload[3]);
                    let port = u16::from_be_bytes([payload[4], payload[5]]);
                    let addr = SocketAddrV4::new(ip, port);
                    warn!("NetBIOS session retargeted to {}", addr);
                    return Err(Error::Refused(RefusalReason::Retarget(addr)));
                }
                NetBiosMessageType::Keepalive => {
                    trace!("Keepalive during session request");
                }
                other => {
                    return Err(Error::Protocol(format!(
                        "unexpected {:?} in reply to session request",
                        other
                    )));
                }
            }
        }
    }

    fn send_frame(&mut self, message_type: NetBiosMessageType) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        let frame = self.packet.frame(message_type)?;
        trace!("Sending {:?} frame of {} bytes", message_type, frame.len());
        if let Err(e) = write_full(stream, frame) {
            self.fail(&e);
            return Err(e);
        }
        Ok(())
    }

    fn recv_frame(&mut self) -> Result<NetBiosFrame<'_>> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        let message_type = match Self::read_frame(stream, &mut self.packet) {
            Ok(message_type) => message_type,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };
        let frame = NetBiosFrame::new(message_type, self.packet.payload());
        trace!("Received {:?} frame of {} bytes", message_type, frame.len());
        Ok(frame)
    }

    fn read_frame(stream: &mut T, packet: &mut PacketBuffer) -> Result<NetBiosMessageType> {
        let mut raw = [0u8; NetBiosHeader::SIZE];
        read_full(stream, &mut raw)?;
        let header = NetBiosHeader::parse(&raw)?;
        let body = packet.prepare_recv(header.length as usize)?;
        read_full(stream, body)?;
        Ok(header.message_type)
    }

    /// Transport failures poison the session; allocation failures don't
    fn fail(&mut self, err: &Error) {
        match err {
            Error::Io(_) | Error::ConnectionClosed | Error::MalformedHeader(_) | Error::Timeout => {
                warn!("NetBIOS transport failure: {}", err);
                self.set_state(SessionState::Error);
            }
            _ => {}
        }
    }
}

impl<T> fmt::Debug for NetBiosSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetBiosSession")
            .field("state", &self.state)
            .field("remote", &self.remote)
            .field("buffer_capacity", &self.packet.capacity())
            .finish()
    }
}
