//! Testing utilities and end-to-end scenarios

pub mod fake_server;
pub mod mock;



pub use mock::MockStream;

use crate::config::SessionConfig;
use crate::netbios::NetBiosSession;
use crate::session::SmbSession;

/// NetBIOS session already established over `stream` (direct transport, no
/// handshake)
pub fn connected(stream: MockStream) -> NetBiosSession<MockStream> {
    let mut session = NetBiosSession::with_config(SessionConfig::default()).unwrap();
    session.connect_with(stream, "SERVER", true).unwrap();
    session
}

/// SMB session that will read `frames` in order
pub fn smb_session<I, B>(frames: I) -> SmbSession<MockStream>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    SmbSession::new(connected(MockStream::with_inbound(frames)))
}

/// Bytes the client wrote so far
pub fn written(session: &SmbSession<MockStream>) -> Vec<u8> {
    session
        .transport()
        .stream()
        .map(|s| s.written().to_vec())
        .unwrap_or_default()
}
