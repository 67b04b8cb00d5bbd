//! UTF-16LE text codec used for SMB names and patterns

use crate::error::{Error, Result};

/// Encode `text` as NUL-terminated UTF-16LE bytes
pub fn to_utf16(text: &str) -> Result<Vec<u8>> {
    if text.contains('\0') {
        return Err(Error::Encoding(format!(
            "'{}' contains an interior NUL",
            text.escape_debug()
        )));
    }

    let mut encoded = Vec::with_capacity((text.len() + 1) * 2);
    for unit in text.encode_utf16().chain(std::iter::once(0)) {
        encoded.extend_from_slice(&unit.to_le_bytes());
    }
    Ok(encoded)
}

/// Decode UTF-16LE bytes, dropping any trailing NUL terminators
pub fn from_utf16(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding(format!(
            "odd UTF-16 byte length {}",
            bytes.len()
        )));
    }

    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    while units.last() == Some(&0) {
        units.pop();
    }

    String::from_utf16(&units).map_err(|e| Error::Encoding(e.to_string()))
}
