//! Transport layer for SMB protocol
//!
//! This module provides the blocking byte streams the NetBIOS session runs
//! over, keeping the framing logic in `netbios` independent of the socket
//! type so the same code can be driven by an in-memory stream in tests.

use crate::error::{Error, Result};
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

pub mod tcp;

/// A connected, blocking byte stream carrying NetBIOS frames
pub trait SmbTransport: Read + Write {
    /// Bound blocking reads; `None` blocks indefinitely
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Bound blocking writes; `None` blocks indefinitely
    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Close both directions of the stream
    fn shutdown(&mut self) -> Result<()>;

    /// Get the remote address, when the stream has one
    fn remote_addr(&self) -> Option<SocketAddr>;
}

fn classify(err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Error::Timeout,
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => Error::ConnectionClosed,
        _ => Error::Io(err),
    }
}

/// Fill `buf` completely, retrying short reads.
///
/// A read of zero bytes before `buf` is full means the peer closed the
/// connection.
pub fn read_full<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(classify(e)),
        }
    }
    Ok(())
}

/// Write all of `buf`, retrying partial writes, then flush
pub fn write_full<W: Write + ?Sized>(stream: &mut W, buf: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match stream.write(&buf[written..]) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(classify(e)),
        }
    }
    stream.flush().map_err(classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per call and fails once with EINTR
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        interrupted: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_read_full_joins_short_reads() {
        let mut src = Trickle {
            data: (0u8..10).collect(),
            pos: 0,
            step: 3,
            interrupted: false,
        };
        let mut buf = [0u8; 10];
        read_full(&mut src, &mut buf).unwrap();
        assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_read_full_reports_closed_peer() {
        let mut src = Cursor::new(vec![1u8, 2]);
        let mut buf = [0u8; 4];
        assert!(matches!(
            read_full(&mut src, &mut buf),
            Err(Error::ConnectionClosed)
        ));
    }

    #[test]
    fn test_write_full_reports_zero_write() {
        let mut backing = [0u8; 2];
        let mut sink = Cursor::new(&mut backing[..]);
        assert!(matches!(
            write_full(&mut sink, &[1, 2, 3]),
            Err(Error::ConnectionClosed)
        ));
    }

    #[test]
    fn test_timeouts_are_classified() {
        assert!(matches!(
            classify(io::ErrorKind::WouldBlock.into()),
            Error::Timeout
        ));
        assert!(matches!(
            classify(io::ErrorKind::PermissionDenied.into()),
            Error::Io(_)
        ));
    }
}
