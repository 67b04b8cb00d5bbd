//! Path metadata with TRANS2 QUERY_PATH_INFORMATION

use super::trans2::{build_request, trans2_receive};
use crate::encoding::{from_utf16, to_utf16};
use crate::error::Result;
use crate::protocol::constants::trans2_layout::{
    QUERY_PATH_DATA_OFFSET, QUERY_PATH_MAX_PARAM_COUNT,
};
use crate::protocol::constants::{info_level, Trans2Subcommand};
use crate::protocol::trans2::{FileAllInfo, QueryPathRequest};
use crate::session::SmbSession;
use crate::stat::SmbStat;
use crate::transport::SmbTransport;
use tracing::debug;

/// Fetch the metadata of `path` in the share bound to `tid`
pub fn fstat<T: SmbTransport>(session: &mut SmbSession<T>, tid: u16, path: &str) -> Result<SmbStat> {
    let utf_path = to_utf16(path)?;
    let mut msg = build_request(
        tid,
        Trans2Subcommand::QueryPathInformation,
        &QueryPathRequest {
            information_level: info_level::QUERY_FILE_ALL_INFO,
        },
        &utf_path,
        QUERY_PATH_MAX_PARAM_COUNT,
        QUERY_PATH_DATA_OFFSET,
    )?;
    session.send_msg(&mut msg)?;

    let reply = trans2_receive(session)?;
    let info = FileAllInfo::parse(reply.data())?;
    let name = from_utf16(info.name)?;
    debug!(
        "QUERY_PATH_INFORMATION '{}': size={} dir={}",
        path, info.size, info.is_dir
    );

    Ok(SmbStat {
        name,
        created: info.created,
        accessed: info.accessed,
        written: info.written,
        changed: info.changed,
        size: info.size,
        alloc_size: info.alloc_size,
        attributes: info.attributes,
        is_dir: info.is_dir,
    })
}
