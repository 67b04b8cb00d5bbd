//! TRANS2 request building and response reassembly shared by the queries

use crate::error::{Error, Result};
use crate::protocol::constants::trans2_layout::{MAX_DATA_COUNT, PARAM_OFFSET};
use crate::protocol::constants::{SmbCommand, Trans2Subcommand};
use crate::protocol::trans2::{request_byte_count, Trans2Request, Trans2ResponseHeader};
use crate::protocol::{SmbMessage, WireStruct};
use crate::session::SmbSession;
use crate::transport::SmbTransport;
use std::convert::TryFrom;
use tracing::trace;

/// Build a TRANS2 request whose parameter block is `params` followed by the
/// encoded `name`, zero padded so the byte count is `3 (mod 4)`
pub(crate) fn build_request<P: WireStruct>(
    tid: u16,
    subcommand: Trans2Subcommand,
    params: &P,
    name: &[u8],
    max_param_count: u16,
    data_offset: u16,
) -> Result<SmbMessage> {
    let param_len = P::SIZE + name.len();
    let param_count = u16::try_from(param_len).map_err(|_| {
        Error::InvalidParameter(format!("TRANS2 parameters of {} bytes", param_len))
    })?;
    let (byte_count, padding) = request_byte_count(param_len)?;

    let mut msg = SmbMessage::new(SmbCommand::Trans2 as u8);
    msg.header_mut().tid = tid;
    msg.put(&Trans2Request {
        total_param_count: param_count,
        total_data_count: 0,
        max_param_count,
        max_data_count: MAX_DATA_COUNT,
        max_setup_count: 0,
        flags: 0,
        timeout: 0,
        param_count,
        param_offset: PARAM_OFFSET,
        data_count: 0,
        data_offset,
        subcommand,
        byte_count,
    })?;
    msg.put(params)?;
    msg.append(name)?;
    msg.pad(padding)?;
    Ok(msg)
}

/// A complete TRANS2 response with its data block reassembled
#[derive(Debug)]
pub(crate) struct Trans2Reply {
    message: SmbMessage,
    params: (usize, usize),
    data: (usize, usize),
}

impl Trans2Reply {
    pub(crate) fn parameters(&self) -> &[u8] {
        let (start, len) = self.params;
        self.message.payload().get(start..start + len).unwrap_or_default()
    }

    /// Data block across every fragment
    pub(crate) fn data(&self) -> &[u8] {
        let (start, len) = self.data;
        self.message.payload().get(start..start + len).unwrap_or_default()
    }
}

/// Receive one TRANS2 response, following up with further messages until
/// the declared total data count has arrived.
///
/// Fragment data is stitched onto the first message right behind its own
/// data block, so the result reads as if the server had sent one message.
pub(crate) fn trans2_receive<T: SmbTransport>(session: &mut SmbSession<T>) -> Result<Trans2Reply> {
    let mut message = session.recv_msg()?;
    session.check_nt_status(&message)?;

    let first = Trans2ResponseHeader::parse(message.payload())?;
    let params = first.param_range(message.payload_size())?;
    let (data_start, first_len) = first.data_range(message.payload_size())?;

    if first.param_count < first.total_param_count {
        return Err(Error::Protocol(format!(
            "TRANS2 parameters split across messages ({} of {})",
            first.param_count, first.total_param_count
        )));
    }
    if first.data_displacement != 0 {
        return Err(Error::Protocol(format!(
            "first TRANS2 fragment starts at displacement {}",
            first.data_displacement
        )));
    }
    // an empty block has no real offset to compare
    if first.param_count > 0 && first_len > 0 && params.0 + params.1 > data_start {
        return Err(Error::Protocol(
            "TRANS2 parameter block overlaps data block".to_string(),
        ));
    }

    let total = first.total_data_count as usize;
    let mut assembled = first_len;
    let mut remaining = first.remaining();

    if remaining > 0 {
        trace!(
            "TRANS2 response fragmented: {} of {} data bytes in first message",
            first_len,
            total
        );
        message.truncate_payload(data_start + first_len);
        message.grow(total - first_len)?;
        message.set_cursor(message.payload_size())?;
    }

    while remaining > 0 {
        let fragment = session.recv_msg()?;
        session.check_nt_status(&fragment)?;
        let header = Trans2ResponseHeader::parse(fragment.payload())?;

        if header.data_displacement as usize != assembled {
            return Err(Error::Protocol(format!(
                "TRANS2 fragment at displacement {}, expected {}",
                header.data_displacement, assembled
            )));
        }
        if header.data_count == 0 {
            return Err(Error::Protocol(
                "TRANS2 fragment carries no data".to_string(),
            ));
        }
        if assembled + header.data_count as usize > total {
            return Err(Error::Protocol(format!(
                "TRANS2 fragments exceed total data count {}",
                total
            )));
        }

        let chunk = header.data(fragment.payload())?;
        message.append_payload(chunk)?;
        assembled += chunk.len();
        remaining = header.remaining();
        trace!("TRANS2 reassembled {} of {} data bytes", assembled, total);
    }

    Ok(Trans2Reply {
        message,
        params,
        data: (data_start, assembled),
    })
}
