//! Cryptographic primitives used by SMB authentication

pub mod rc4;

pub use self::rc4::Rc4;
pub use ::rc4::{KeyInit, StreamCipher};
