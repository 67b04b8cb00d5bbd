//! SMB1/CIFS client core in Rust
//!
//! NetBIOS session transport over blocking TCP, SMB1 message framing and the
//! TRANS2 directory listing (`find`) and path metadata (`fstat`) queries.

#![allow(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod config;
pub mod encoding;
pub mod error;
pub mod netbios;
pub mod protocol;
pub mod session;
pub mod stat;
pub mod transport;

#[cfg(feature = "client")]
pub mod client;

#[cfg(test)]
pub mod e2e_tests;

pub use config::SessionConfig;
pub use error::{Error, ErrorKind, Result};
pub use netbios::{NetBiosSession, SessionState};
pub use session::SmbSession;
pub use stat::{stat_get, SmbStat, StatField, StatList};

#[cfg(feature = "client")]
pub use client::{find, fstat};
