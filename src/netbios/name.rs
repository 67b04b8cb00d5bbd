//! NetBIOS name encoding and decoding
//!
//! NetBIOS names are 16 bytes: up to 15 characters padded with spaces plus a
//! suffix byte naming the service. On the wire they use the RFC 1001
//! first-level encoding, which turns every byte into two letters.

use crate::error::{Error, Result};
use std::convert::TryFrom;

/// Maximum NetBIOS name length (before padding)
pub const NETBIOS_NAME_MAX_LEN: usize = 15;

/// NetBIOS name length after padding
pub const NETBIOS_NAME_LEN: usize = 16;

/// NetBIOS encoded name length (after encoding, each byte becomes 2 bytes)
pub const NETBIOS_ENCODED_NAME_LEN: usize = 32;

/// Length of one name as carried in a session request: length byte,
/// encoded name, empty scope terminator
pub const NETBIOS_SESSION_NAME_LEN: usize = 1 + NETBIOS_ENCODED_NAME_LEN + 1;

/// NetBIOS name types (16th byte)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetBiosNameType {
    /// Workstation service, used for the calling name
    Workstation = 0x00,
    /// File server service, used for the called name
    FileServer = 0x20,
}

impl TryFrom<u8> for NetBiosNameType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x00 => Ok(NetBiosNameType::Workstation),
            0x20 => Ok(NetBiosNameType::FileServer),
            other => Err(other),
        }
    }
}

/// Encode a NetBIOS name using the RFC 1001 algorithm
///
/// The name is uppercased first. Each byte is split into two 4-bit values
/// and added to 'A' (0x41): 'A' (0x41) becomes "EB".
pub fn encode_netbios_name(
    name: &str,
    name_type: NetBiosNameType,
) -> Result<[u8; NETBIOS_ENCODED_NAME_LEN]> {
    if !name.is_ascii() {
        return Err(Error::InvalidNetBiosName(format!(
            "Name '{}' contains non-ASCII characters",
            name
        )));
    }
    if name.len() > NETBIOS_NAME_MAX_LEN {
        return Err(Error::InvalidNetBiosName(format!(
            "Name '{}' exceeds maximum length {}",
            name, NETBIOS_NAME_MAX_LEN
        )));
    }

    let mut padded = [b' '; NETBIOS_NAME_LEN];
    for (slot, byte) in padded.iter_mut().zip(name.bytes()) {
        *slot = byte.to_ascii_uppercase();
    }
    padded[NETBIOS_NAME_MAX_LEN] = name_type as u8;

    let mut encoded = [0u8; NETBIOS_ENCODED_NAME_LEN];
    for (i, &byte) in padded.iter().enumerate() {
        encoded[i * 2] = b'A' + ((byte >> 4) & 0x0F);
        encoded[i * 2 + 1] = b'A' + (byte & 0x0F);
    }

    Ok(encoded)
}

/// Decode a first-level encoded name into its trimmed text and raw suffix
#[cfg(test)]
pub(crate) fn decode_netbios_name(encoded: &[u8]) -> Result<(String, u8)> {
    if encoded.len() != NETBIOS_ENCODED_NAME_LEN {
        return Err(Error::InvalidNetBiosName(format!(
            "Encoded name length {} != {}",
            encoded.len(),
            NETBIOS_ENCODED_NAME_LEN
        )));
    }

    let mut decoded = [0u8; NETBIOS_NAME_LEN];
    for (i, pair) in encoded.chunks_exact(2).enumerate() {
        let (high, low) = (pair[0], pair[1]);
        if !(b'A'..=b'P').contains(&high) || !(b'A'..=b'P').contains(&low) {
            return Err(Error::InvalidNetBiosName(format!(
                "Invalid encoded characters at position {}",
                i
            )));
        }
        decoded[i] = ((high - b'A') << 4) | (low - b'A');
    }

    let name = String::from_utf8_lossy(&decoded[..NETBIOS_NAME_MAX_LEN])
        .trim_end()
        .to_string();
    Ok((name, decoded[NETBIOS_NAME_MAX_LEN]))
}

/// Append one name in session request form: length(1) + encoded_name(32) + empty scope(1)
fn push_session_name(out: &mut Vec<u8>, name: &str, name_type: NetBiosNameType) -> Result<()> {
    let encoded = encode_netbios_name(name, name_type)?;
    out.push(NETBIOS_ENCODED_NAME_LEN as u8);
    out.extend_from_slice(&encoded);
    out.push(0);
    Ok(())
}

/// Build the SESSION REQUEST payload: the called (server) name followed by
/// the calling (client) name
pub fn session_request_payload(called: &str, calling: &str) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    payload.try_reserve_exact(2 * NETBIOS_SESSION_NAME_LEN)?;
    push_session_name(&mut payload, called, NetBiosNameType::FileServer)?;
    push_session_name(&mut payload, calling, NetBiosNameType::Workstation)?;
    Ok(payload)
}
