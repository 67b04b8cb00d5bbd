//! Directory enumeration with TRANS2 FIND_FIRST2 / FIND_NEXT2

use super::trans2::{build_request, trans2_receive, Trans2Reply};
use crate::encoding::{from_utf16, to_utf16};
use crate::error::{Error, Result};
use crate::protocol::constants::trans2_layout::{FIND_DATA_OFFSET, FIND_MAX_PARAM_COUNT};
use crate::protocol::constants::{
    info_level, FileAttributes, Find2Flags, Trans2Subcommand, DEFAULT_SEARCH_ATTRIBUTES,
    FIND_FIRST_SEARCH_COUNT, FIND_NEXT_SEARCH_COUNT,
};
use crate::protocol::trans2::{
    BothDirectoryInfo, FindFirst2Request, FindFirst2Response, FindNext2Request, FindNext2Response,
};
use crate::session::SmbSession;
use crate::stat::{SmbStat, StatList};
use crate::transport::SmbTransport;
use std::fmt;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FindState {
    Start,
    FindFirstSent,
    FindFirstParsed,
    FindNextSent,
    FindNextParsed,
    Done,
    Failed,
}

impl fmt::Display for FindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One enumeration in progress
struct Search<'s, T> {
    session: &'s mut SmbSession<T>,
    tid: u16,
    pattern: Vec<u8>,
    state: FindState,
    files: StatList,
}

impl<'s, T: SmbTransport> Search<'s, T> {
    fn advance(&mut self, state: FindState) {
        trace!("find: {} -> {}", self.state, state);
        self.state = state;
    }

    fn find_first(&mut self) -> Result<FindFirst2Response> {
        let mut msg = build_request(
            self.tid,
            Trans2Subcommand::FindFirst2,
            &FindFirst2Request {
                search_attributes: DEFAULT_SEARCH_ATTRIBUTES,
                search_count: FIND_FIRST_SEARCH_COUNT,
                flags: Find2Flags::CLOSE_AT_EOS | Find2Flags::RETURN_RESUME_KEYS,
                information_level: info_level::FIND_FILE_BOTH_DIRECTORY_INFO,
                search_storage_type: 0,
            },
            &self.pattern,
            FIND_MAX_PARAM_COUNT,
            FIND_DATA_OFFSET,
        )?;
        self.session.send_msg(&mut msg)?;
        self.advance(FindState::FindFirstSent);

        let reply = trans2_receive(self.session)?;
        let params = FindFirst2Response::parse(reply.parameters())?;
        let added = parse_entries(&mut self.files, reply.data(), params.search_count);
        debug!(
            "FIND_FIRST2: sid={} {} of {} entries, eos={}",
            params.sid, added, params.search_count, params.end_of_search
        );
        if added == 0 {
            return Err(Error::Protocol(
                "FIND_FIRST2 response contained no entries".to_string(),
            ));
        }
        self.advance(FindState::FindFirstParsed);
        Ok(params)
    }

    fn find_next(&mut self, sid: u16, resume_key: u16) -> Result<(FindNext2Response, usize)> {
        let mut msg = build_request(
            self.tid,
            Trans2Subcommand::FindNext2,
            &FindNext2Request {
                sid,
                search_count: FIND_NEXT_SEARCH_COUNT,
                information_level: info_level::FIND_FILE_BOTH_DIRECTORY_INFO,
                resume_key: resume_key as u32,
                flags: Find2Flags::CLOSE_AT_EOS | Find2Flags::CONTINUE_FROM_LAST,
            },
            &self.pattern,
            FIND_MAX_PARAM_COUNT,
            FIND_DATA_OFFSET,
        )?;
        self.session.send_msg(&mut msg)?;
        self.advance(FindState::FindNextSent);

        let reply: Trans2Reply = trans2_receive(self.session)?;
        let params = FindNext2Response::parse(reply.parameters())?;
        let added = parse_entries(&mut self.files, reply.data(), params.search_count);
        debug!(
            "FIND_NEXT2: {} of {} entries, eos={}",
            added, params.search_count, params.end_of_search
        );
        self.advance(FindState::FindNextParsed);
        Ok((params, added))
    }

    fn run(&mut self) -> Result<()> {
        let first = self.find_first()?;
        let sid = first.sid;
        let mut end_of_search = first.end_of_search;
        let mut error_offset = first.ea_error_offset;
        let mut resume_key = first.last_name_offset;

        while !end_of_search && error_offset == 0 {
            let (next, added) = self.find_next(sid, resume_key)?;
            if added == 0 && !next.end_of_search && next.last_name_offset == resume_key {
                warn!("FIND_NEXT2 made no progress at resume key {}", resume_key);
                return Err(Error::Protocol(format!(
                    "FIND_NEXT2 returned no entries without ending the search (sid {})",
                    sid
                )));
            }
            end_of_search = next.end_of_search;
            error_offset = next.ea_error_offset;
            resume_key = next.last_name_offset;
        }
        Ok(())
    }
}

/// List the entries matching `pattern` in the share bound to `tid`.
///
/// The list holds every batch the server returned, most recently parsed
/// entry first. Any failure along the way discards everything gathered so
/// far.
pub fn find<T: SmbTransport>(
    session: &mut SmbSession<T>,
    tid: u16,
    pattern: &str,
) -> Result<StatList> {
    let mut search = Search {
        session,
        tid,
        pattern: to_utf16(pattern)?,
        state: FindState::Start,
        files: StatList::new(),
    };

    match search.run() {
        Ok(()) => {
            search.advance(FindState::Done);
            Ok(search.files)
        }
        Err(e) => {
            debug!("find '{}' failed in state {}: {}", pattern, search.state, e);
            search.advance(FindState::Failed);
            Err(e)
        }
    }
}

/// Prepend up to `count` BOTH_DIRECTORY_INFO entries from `data` to `files`.
///
/// Stops early at the end of the data, at an entry that would run past it,
/// at an entry whose name does not decode, or after an entry that links to
/// no successor. Returns the number of entries added.
pub(crate) fn parse_entries(files: &mut StatList, data: &[u8], count: u16) -> usize {
    let mut offset = 0;
    let mut added = 0;

    while added < count as usize && offset < data.len() {
        let entry = match BothDirectoryInfo::parse(&data[offset..]) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Truncated directory entry at offset {}: {}", offset, e);
                break;
            }
        };
        let name = match from_utf16(entry.name) {
            Ok(name) if !name.is_empty() => name,
            Ok(_) => {
                warn!("Directory entry at offset {} has an empty name", offset);
                break;
            }
            Err(e) => {
                warn!("Undecodable name in entry at offset {}: {}", offset, e);
                break;
            }
        };

        files.push_front(SmbStat {
            name,
            created: entry.created,
            accessed: entry.accessed,
            written: entry.written,
            changed: entry.changed,
            size: entry.size,
            alloc_size: entry.alloc_size,
            attributes: entry.attributes,
            is_dir: entry.attributes.contains(FileAttributes::DIRECTORY),
        });
        added += 1;

        if entry.next_entry_offset == 0 {
            break;
        }
        offset += entry.next_entry_offset as usize;
    }

    added
}
