//! Received NetBIOS frames

use crate::protocol::NetBiosMessageType;

/// A frame as delivered by [`NetBiosSession::packet_recv`].
///
/// The payload borrows the session's receive buffer, so the frame has to be
/// consumed (or copied) before the next receive.
///
/// [`NetBiosSession::packet_recv`]: crate::netbios::NetBiosSession::packet_recv
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetBiosFrame<'a> {
    message_type: NetBiosMessageType,
    payload: &'a [u8],
}

impl<'a> NetBiosFrame<'a> {
    pub fn new(message_type: NetBiosMessageType, payload: &'a [u8]) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    pub fn message_type(&self) -> NetBiosMessageType {
        self.message_type
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_view() {
        let payload = b"abc";
        let frame = NetBiosFrame::new(NetBiosMessageType::SessionMessage, payload);

        assert_eq!(frame.message_type(), NetBiosMessageType::SessionMessage);
        assert_eq!(frame.payload(), b"abc");
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
        assert!(NetBiosFrame::new(NetBiosMessageType::Keepalive, &[]).is_empty());
    }
}
