//! Session configuration

use std::time::Duration;

/// Initial size of the NetBIOS packet buffer
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// TCP port for direct SMB transport
pub const DIRECT_TCP_PORT: u16 = 445;

/// TCP port for the NetBIOS session service
pub const NETBIOS_SESSION_PORT: u16 = 139;

/// Configuration for a NetBIOS/SMB session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Initial payload capacity of the packet buffer; it grows on demand
    pub buffer_size: usize,
    /// Upper bound on the TCP connect
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the NetBIOS session response
    pub handshake_timeout: Duration,
    /// Read timeout applied to steady-state receives (`None` blocks)
    pub read_timeout: Option<Duration>,
    /// Our NetBIOS name, sent as the calling name
    pub calling_name: String,
    /// Port used when `direct_transport` is requested
    pub direct_port: u16,
    /// Port used for NetBIOS-over-TCP
    pub netbios_port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            connect_timeout: Duration::from_secs(5),
            handshake_timeout: Duration::from_secs(5),
            read_timeout: None,
            calling_name: String::from("RUSTCIFS"),
            direct_port: DIRECT_TCP_PORT,
            netbios_port: NETBIOS_SESSION_PORT,
        }
    }
}

impl SessionConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_calling_name(mut self, name: impl Into<String>) -> Self {
        self.calling_name = name.into();
        self
    }

    /// Override both ports, mostly useful against test servers
    pub fn with_ports(mut self, direct_port: u16, netbios_port: u16) -> Self {
        self.direct_port = direct_port;
        self.netbios_port = netbios_port;
        self
    }

    /// Port to dial for the requested transport flavour
    pub fn port_for(&self, direct_transport: bool) -> u16 {
        if direct_transport {
            self.direct_port
        } else {
            self.netbios_port
        }
    }
}
