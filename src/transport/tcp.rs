//! TCP transport implementation for SMB

use super::SmbTransport;
use crate::error::{Error, Result};
use std::io;
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;
use tracing::debug;

/// Open a TCP connection to `addr`, giving up after `timeout`
pub fn connect(addr: SocketAddrV4, timeout: Duration) -> Result<TcpStream> {
    debug!("Connecting to {} (timeout {:?})", addr, timeout);
    let stream = TcpStream::connect_timeout(&SocketAddr::V4(addr), timeout).map_err(|e| {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout,
            _ => Error::Io(e),
        }
    })?;
    // Requests are written as single frames; don't hold them back
    stream.set_nodelay(true)?;
    Ok(stream)
}

impl SmbTransport for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        TcpStream::set_read_timeout(self, timeout)?;
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        TcpStream::set_write_timeout(self, timeout)?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already torn down by the peer
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.peer_addr().ok()
    }
}
