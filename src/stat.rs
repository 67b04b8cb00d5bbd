//! File metadata returned by `find` and `fstat`

use crate::protocol::constants::FileAttributes;
use std::collections::VecDeque;
use std::convert::TryFrom;

/// Metadata of one file or directory.
///
/// Timestamps are the raw 64-bit FILETIME values from the wire (100ns
/// intervals since 1601-01-01 UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbStat {
    pub(crate) name: String,
    pub(crate) created: u64,
    pub(crate) accessed: u64,
    pub(crate) written: u64,
    pub(crate) changed: u64,
    pub(crate) size: u64,
    pub(crate) alloc_size: u64,
    pub(crate) attributes: FileAttributes,
    pub(crate) is_dir: bool,
}

/// Numeric selectors accepted by [`stat_get`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatField {
    Size = 0,
    AllocSize = 1,
    /// Creation time
    Ctime = 2,
    /// Last access time
    Atime = 3,
    /// Last write time
    Wtime = 4,
    /// Last change time
    Mtime = 5,
    IsDir = 6,
}

impl TryFrom<i32> for StatField {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatField::Size),
            1 => Ok(StatField::AllocSize),
            2 => Ok(StatField::Ctime),
            3 => Ok(StatField::Atime),
            4 => Ok(StatField::Wtime),
            5 => Ok(StatField::Mtime),
            6 => Ok(StatField::IsDir),
            other => Err(other),
        }
    }
}

impl SmbStat {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn alloc_size(&self) -> u64 {
        self.alloc_size
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn accessed(&self) -> u64 {
        self.accessed
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn changed(&self) -> u64 {
        self.changed
    }

    pub fn attributes(&self) -> FileAttributes {
        self.attributes
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn get(&self, field: StatField) -> u64 {
        match field {
            StatField::Size => self.size,
            StatField::AllocSize => self.alloc_size,
            StatField::Ctime => self.created,
            StatField::Atime => self.accessed,
            StatField::Wtime => self.written,
            StatField::Mtime => self.changed,
            StatField::IsDir => self.is_dir as u64,
        }
    }
}

/// Read a field by numeric selector.
///
/// Returns 0 for a missing entry or an unknown selector, so callers cannot
/// tell those apart from a genuine zero; use [`SmbStat::get`] when that
/// matters.
pub fn stat_get(stat: Option<&SmbStat>, what: i32) -> u64 {
    match (stat, StatField::try_from(what)) {
        (Some(stat), Ok(field)) => stat.get(field),
        _ => 0,
    }
}

#[cfg(feature = "chrono")]
mod time {
    use super::SmbStat;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    /// Convert a FILETIME to a naive UTC timestamp
    pub fn filetime_to_date_time(filetime: u64) -> Option<NaiveDateTime> {
        let epoch = NaiveDate::from_ymd_opt(1601, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let micros = i64::try_from(filetime / 10).ok()?;
        let nanos = (filetime % 10 * 100) as i64;
        epoch
            .checked_add_signed(Duration::microseconds(micros))?
            .checked_add_signed(Duration::nanoseconds(nanos))
    }

    impl SmbStat {
        pub fn created_at(&self) -> Option<NaiveDateTime> {
            filetime_to_date_time(self.created)
        }

        pub fn accessed_at(&self) -> Option<NaiveDateTime> {
            filetime_to_date_time(self.accessed)
        }

        pub fn written_at(&self) -> Option<NaiveDateTime> {
            filetime_to_date_time(self.written)
        }

        pub fn changed_at(&self) -> Option<NaiveDateTime> {
            filetime_to_date_time(self.changed)
        }
    }
}

#[cfg(feature = "chrono")]
pub use time::filetime_to_date_time;

/// Entries of one listing, most recently parsed first.
///
/// Entries parsed later in a listing precede earlier ones, so the order is
/// the reverse of what the server sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatList {
    entries: VecDeque<SmbStat>,
}

impl StatList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_front(&mut self, stat: SmbStat) {
        self.entries.push_front(stat);
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index` (constant time), `None` past the end
    pub fn at(&self, index: usize) -> Option<&SmbStat> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SmbStat> {
        self.entries.iter()
    }

    /// Drop every entry. Fine on an empty list.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl IntoIterator for StatList {
    type Item = SmbStat;
    type IntoIter = std::collections::vec_deque::IntoIter<SmbStat>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a StatList {
    type Item = &'a SmbStat;
    type IntoIter = std::collections::vec_deque::Iter<'a, SmbStat>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
pub(crate) fn stat_for_test(name: &str, size: u64, attributes: FileAttributes) -> SmbStat {
    SmbStat {
        name: name.to_string(),
        created: 1,
        accessed: 2,
        written: 3,
        changed: 4,
        size,
        alloc_size: (size + 4095) / 4096 * 4096,
        attributes,
        is_dir: attributes.contains(FileAttributes::DIRECTORY),
    }
}
