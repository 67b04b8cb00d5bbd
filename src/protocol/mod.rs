//! SMB1 protocol definitions

pub mod constants;
pub mod header;
pub mod message;
pub mod trans2;
pub mod wire;

pub use constants::{NetBiosMessageType, SmbCommand, Trans2Subcommand};
pub use header::SmbHeader;
pub use message::{SmbMessage, WireStruct};
