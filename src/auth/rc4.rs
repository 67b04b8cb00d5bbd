//! RC4 keystream cipher over RustCrypto's `rc4`
//!
//! `rc4::Rc4` fixes the key length in its type. SMB keys are picked at run
//! time (40, 56 and 64 bit export keys, 128 bit session keys), so [`Rc4`]
//! holds one instance per supported length and dispatches on it.

use crate::error::{Error, Result};
use ::rc4::cipher::inout::InOutBuf;
use ::rc4::cipher::StreamCipherError;
use ::rc4::consts::{U1, U10, U11, U12, U13, U14, U15, U16, U2, U3, U32, U4, U5, U6, U7, U8, U9};
use ::rc4::{KeyInit, StreamCipher};

macro_rules! key_lengths {
    ($($len:literal => $variant:ident($size:ty)),+ $(,)?) => {
        enum Keyed {
            $($variant(::rc4::Rc4<$size>),)+
        }

        impl Keyed {
            fn new(key: &[u8]) -> Option<Self> {
                match key.len() {
                    $($len => ::rc4::Rc4::<$size>::new_from_slice(key).ok().map(Keyed::$variant),)+
                    _ => None,
                }
            }
        }

        impl StreamCipher for Rc4 {
            fn try_apply_keystream_inout(
                &mut self,
                buf: InOutBuf<'_, '_, u8>,
            ) -> std::result::Result<(), StreamCipherError> {
                match &mut self.keyed {
                    $(Keyed::$variant(cipher) => cipher.try_apply_keystream_inout(buf),)+
                }
            }
        }
    };
}

key_lengths! {
    1 => K1(U1),
    2 => K2(U2),
    3 => K3(U3),
    4 => K4(U4),
    5 => K5(U5),
    6 => K6(U6),
    7 => K7(U7),
    8 => K8(U8),
    9 => K9(U9),
    10 => K10(U10),
    11 => K11(U11),
    12 => K12(U12),
    13 => K13(U13),
    14 => K14(U14),
    15 => K15(U15),
    16 => K16(U16),
    32 => K32(U32),
}

/// RC4 keyed with a run time length key
pub struct Rc4 {
    keyed: Keyed,
}

impl Rc4 {
    /// Key schedule. Keys are 1 to 16 or 32 bytes long.
    pub fn new(key: &[u8]) -> Result<Self> {
        Keyed::new(key)
            .map(|keyed| Self { keyed })
            .ok_or_else(|| Error::InvalidParameter(format!("RC4 key of {} bytes", key.len())))
    }
}

impl std::fmt::Debug for Rc4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key-derived state
        f.write_str("Rc4 { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encrypt(key: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let mut data = plaintext.to_vec();
        Rc4::new(key).unwrap().apply_keystream(&mut data);
        data
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            encrypt(b"Key", b"Plaintext"),
            [0xBB, 0xF3, 0x16, 0xE8, 0xD9, 0x40, 0xAF, 0x0A, 0xD3]
        );
        assert_eq!(encrypt(b"Wiki", b"pedia"), [0x10, 0x21, 0xBF, 0x04, 0x20]);
        assert_eq!(
            encrypt(b"Secret", b"Attack at dawn"),
            [
                0x45, 0xA0, 0x1F, 0x64, 0x5F, 0xC3, 0x5B, 0x38, 0x35, 0x52, 0x54, 0x4B, 0x9B,
                0xF5
            ]
        );
    }

    #[test]
    fn test_keystream_continues_across_calls() {
        let mut whole = b"Attack at dawn".to_vec();
        Rc4::new(b"Secret").unwrap().apply_keystream(&mut whole);

        let mut split = b"Attack at dawn".to_vec();
        let mut cipher = Rc4::new(b"Secret").unwrap();
        let (head, tail) = split.split_at_mut(6);
        cipher.apply_keystream(head);
        cipher.apply_keystream(tail);

        assert_eq!(whole, split);
    }

    #[test]
    fn test_decrypt_is_encrypt() {
        let ciphertext = encrypt(b"Key", b"Plaintext");
        assert_eq!(encrypt(b"Key", &ciphertext), b"Plaintext");
    }

    #[test]
    fn test_session_key_lengths() {
        assert!(Rc4::new(&[0x11; 5]).is_ok());
        assert!(Rc4::new(&[0x11; 16]).is_ok());
        assert!(Rc4::new(&[0x11; 32]).is_ok());
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(Rc4::new(b"").is_err());
        assert!(Rc4::new(&[0u8; 17]).is_err());
        assert!(Rc4::new(&[0u8; 257]).is_err());
    }
}
