//! SMB client queries
//!
//! `find` enumerates a directory through FIND_FIRST2 followed by as many
//! FIND_NEXT2 rounds as the server asks for; `fstat` reads the metadata of a
//! single path. Both run over an [`SmbSession`](crate::session::SmbSession)
//! whose tree connect has already produced the `tid`.

mod find;
mod query;
pub(crate) mod trans2;

pub use find::find;
pub use query::fstat;

#[cfg(test)]
pub(crate) use find::parse_entries;
