//! In-memory stream for driving sessions without a socket

use crate::error::Result;
use crate::transport::SmbTransport;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

/// Scripted inbound bytes plus a capture of everything written.
///
/// Reads drain the script and report a closed peer once it is empty.
/// Optional chunk limits force short reads and writes.
#[derive(Debug, Default)]
pub struct MockStream {
    inbound: VecDeque<u8>,
    written: Vec<u8>,
    read_chunk: Option<usize>,
    write_chunk: Option<usize>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    timeouts_set: usize,
    bounded_writes: usize,
    shut_down: bool,
}

impl MockStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream that will deliver `frames` back to back
    pub fn with_inbound<I, B>(frames: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut stream = Self::new();
        for frame in frames {
            stream.push_inbound(frame.as_ref());
        }
        stream
    }

    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    /// Hand out at most `n` bytes per read
    pub fn read_chunk(mut self, n: usize) -> Self {
        self.read_chunk = Some(n);
        self
    }

    /// Accept at most `n` bytes per write
    pub fn write_chunk(mut self, n: usize) -> Self {
        self.write_chunk = Some(n);
        self
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn unread(&self) -> usize {
        self.inbound.len()
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    /// Writes made while a write timeout was in effect
    pub fn bounded_writes(&self) -> usize {
        self.bounded_writes
    }

    /// Read timeout changes so far
    pub fn timeouts_set(&self) -> usize {
        self.timeouts_set
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = self.read_chunk.unwrap_or(usize::MAX);
        let n = buf.len().min(limit).min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.shut_down {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let n = buf.len().min(self.write_chunk.unwrap_or(usize::MAX));
        if self.write_timeout.is_some() {
            self.bounded_writes += 1;
        }
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SmbTransport for MockStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.read_timeout = timeout;
        self.timeouts_set += 1;
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.write_timeout = timeout;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.shut_down = true;
        Ok(())
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        None
    }
}
