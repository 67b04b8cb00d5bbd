//! Reusable frame buffer owned by a NetBIOS session

use crate::error::Result;
use crate::netbios::NetBiosHeader;
use crate::protocol::NetBiosMessageType;

/// Growable byte buffer with room for the 4 byte NetBIOS header in front
/// of the payload.
///
/// Outbound payloads are appended at the cursor and framed in place; inbound
/// frames are read straight into the payload area. Growth is geometric and
/// fallible, so an allocation failure surfaces as an error instead of an
/// abort. Any slice handed out is invalidated by the next append or receive.
#[derive(Debug)]
pub struct PacketBuffer {
    buf: Vec<u8>,
    cursor: usize,
}

impl PacketBuffer {
    /// Allocate room for a header plus `capacity` payload bytes
    pub fn new(capacity: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(NetBiosHeader::SIZE + capacity)?;
        buf.resize(NetBiosHeader::SIZE, 0);
        Ok(Self { buf, cursor: 0 })
    }

    /// Payload bytes that fit without reallocating
    pub fn capacity(&self) -> usize {
        self.buf.capacity() - NetBiosHeader::SIZE
    }

    /// Payload bytes written or received so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Start a new outbound payload
    pub fn init(&mut self) {
        self.cursor = 0;
        self.buf.truncate(NetBiosHeader::SIZE);
    }

    fn ensure(&mut self, payload_len: usize) -> Result<()> {
        let needed = NetBiosHeader::SIZE + payload_len;
        if needed > self.buf.capacity() {
            let target = needed.max(self.buf.capacity().saturating_mul(2));
            self.buf.try_reserve_exact(target - self.buf.len())?;
        }
        Ok(())
    }

    /// Copy `data` at the cursor and advance it
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.ensure(self.cursor + data.len())?;
        self.buf.truncate(NetBiosHeader::SIZE + self.cursor);
        self.buf.extend_from_slice(data);
        self.cursor += data.len();
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.buf[NetBiosHeader::SIZE..NetBiosHeader::SIZE + self.cursor]
    }

    /// Write the header for the current payload and return the whole frame
    pub fn frame(&mut self, message_type: NetBiosMessageType) -> Result<&[u8]> {
        let header = NetBiosHeader::new(message_type, self.cursor as u32)?;
        self.buf[..NetBiosHeader::SIZE].copy_from_slice(&header.to_bytes());
        Ok(&self.buf[..NetBiosHeader::SIZE + self.cursor])
    }

    /// Size the payload area to exactly `len` bytes for an inbound frame
    pub fn prepare_recv(&mut self, len: usize) -> Result<&mut [u8]> {
        self.ensure(len)?;
        self.buf.resize(NetBiosHeader::SIZE + len, 0);
        self.cursor = len;
        Ok(&mut self.buf[NetBiosHeader::SIZE..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_grows_past_capacity() {
        let mut packet = PacketBuffer::new(4).unwrap();
        packet.init();
        packet.append(&[1, 2, 3]).unwrap();
        packet.append(&[4, 5, 6, 7, 8, 9]).unwrap();

        assert_eq!(packet.payload(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(packet.capacity() >= 9);
    }

    #[test]
    fn test_init_resets_cursor() {
        let mut packet = PacketBuffer::new(16).unwrap();
        packet.append(b"stale").unwrap();
        packet.init();
        packet.append(b"ok").unwrap();
        assert_eq!(packet.payload(), b"ok");
        assert_eq!(packet.cursor(), 2);
    }

    #[test]
    fn test_frame_prefixes_header() {
        let mut packet = PacketBuffer::new(0).unwrap();
        packet.append(&[0xAB; 3]).unwrap();
        let frame = packet.frame(NetBiosMessageType::SessionMessage).unwrap();
        assert_eq!(frame, &[0x00, 0x00, 0x00, 0x03, 0xAB, 0xAB, 0xAB]);
    }

    #[test]
    fn test_frame_sets_length_extension_bit() {
        let mut packet = PacketBuffer::new(0).unwrap();
        packet.append(&vec![0u8; 0x10002]).unwrap();
        let frame = packet.frame(NetBiosMessageType::SessionMessage).unwrap();
        assert_eq!(&frame[..4], &[0x00, 0x01, 0x00, 0x02]);
        assert_eq!(frame.len(), 4 + 0x10002);
    }

    #[test]
    fn test_prepare_recv_resizes() {
        let mut packet = PacketBuffer::new(2).unwrap();
        packet.append(b"outbound").unwrap();
        let body = packet.prepare_recv(3).unwrap();
        assert_eq!(body.len(), 3);
        body.copy_from_slice(b"xyz");
        assert_eq!(packet.payload(), b"xyz");
    }
}
