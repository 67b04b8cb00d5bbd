//! Server side frame builders and request decoders for the end-to-end tests

use crate::netbios::NetBiosHeader;
use crate::protocol::constants::{SmbCommand, SmbFlags};
use crate::protocol::SmbHeader;
use crate::transport::{read_full, write_full};
use byteorder::{ByteOrder, LittleEndian};
use bytes::BufMut;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::thread::{self, JoinHandle};

pub const STATUS_NO_SUCH_FILE: u32 = 0xC000000F;

/// Raw NetBIOS frame of any type
pub fn netbios_frame(message_type: u8, payload: &[u8]) -> Vec<u8> {
    let len = payload.len();
    let mut frame = vec![message_type, (len >> 16) as u8 & 0x01, (len >> 8) as u8, len as u8];
    frame.extend_from_slice(payload);
    frame
}

pub fn session_frame(payload: &[u8]) -> Vec<u8> {
    netbios_frame(0x00, payload)
}

pub fn positive_response() -> Vec<u8> {
    netbios_frame(0x82, &[])
}

pub fn negative_response(code: u8) -> Vec<u8> {
    netbios_frame(0x83, &[code])
}

pub fn retarget_response(addr: SocketAddrV4) -> Vec<u8> {
    let mut payload = addr.ip().octets().to_vec();
    payload.extend_from_slice(&addr.port().to_be_bytes());
    netbios_frame(0x84, &payload)
}

pub fn keepalive() -> Vec<u8> {
    netbios_frame(0x85, &[])
}

/// SMB reply message (header plus body) with the given status
pub fn smb_reply(status: u32, body: &[u8]) -> Vec<u8> {
    let mut header = SmbHeader::new(SmbCommand::Trans2 as u8);
    header.status = status;
    header.flags = SmbFlags::REPLY;
    let mut bytes = header.serialize().unwrap();
    bytes.extend_from_slice(body);
    bytes
}

/// One TRANS2 response message body.
///
/// Parameters start one pad byte after the byte count; `data_pad` zero bytes
/// separate them from the data.
pub struct Trans2Body<'a> {
    pub params: &'a [u8],
    pub data: &'a [u8],
    pub total_data: u16,
    pub data_displacement: u16,
    pub data_pad: usize,
}

impl<'a> Trans2Body<'a> {
    /// Unfragmented response carrying all of `data`
    pub fn whole(params: &'a [u8], data: &'a [u8]) -> Self {
        Self {
            params,
            data,
            total_data: data.len() as u16,
            data_displacement: 0,
            data_pad: 0,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        // wct + 10 words + setup count/reserved + byte count
        const FIXED: usize = 23;
        let param_start = FIXED + 1;
        let data_start = param_start + self.params.len() + self.data_pad;
        let offset = |start: usize, count: usize| {
            if count == 0 {
                0
            } else {
                (SmbHeader::SIZE + start) as u16
            }
        };

        let mut body = Vec::new();
        body.put_u8(10);
        body.put_u16_le(self.params.len() as u16);
        body.put_u16_le(self.total_data);
        body.put_u16_le(0);
        body.put_u16_le(self.params.len() as u16);
        body.put_u16_le(offset(param_start, self.params.len()));
        body.put_u16_le(0);
        body.put_u16_le(self.data.len() as u16);
        body.put_u16_le(offset(data_start, self.data.len()));
        body.put_u16_le(self.data_displacement);
        body.put_u8(0);
        body.put_u8(0);
        body.put_u16_le((data_start + self.data.len() - FIXED) as u16);
        body.put_u8(0);
        body.put_slice(self.params);
        body.put_bytes(0, self.data_pad);
        body.put_slice(self.data);
        body
    }

    /// The body wrapped as a successful SMB reply in a session frame
    pub fn frame(&self) -> Vec<u8> {
        session_frame(&smb_reply(0, &self.encode()))
    }
}

pub fn find_first_params(sid: u16, count: u16, eos: bool, ea_error: u16, last_name: u16) -> Vec<u8> {
    let mut params = Vec::new();
    params.put_u16_le(sid);
    params.put_u16_le(count);
    params.put_u16_le(eos as u16);
    params.put_u16_le(ea_error);
    params.put_u16_le(last_name);
    params
}

pub fn find_next_params(count: u16, eos: bool, ea_error: u16, last_name: u16) -> Vec<u8> {
    let mut params = Vec::new();
    params.put_u16_le(count);
    params.put_u16_le(eos as u16);
    params.put_u16_le(ea_error);
    params.put_u16_le(last_name);
    params
}

fn utf16(name: &str) -> Vec<u8> {
    name.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Directory entry as the server describes it
#[derive(Debug, Clone)]
pub struct FakeEntry {
    pub name: String,
    pub size: u64,
    pub attributes: u32,
    pub times: [u64; 4],
}

impl FakeEntry {
    pub fn file(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            attributes: 0x20,
            times: [
                0x01d9fb8c14a5ee49,
                0x01d9fb8c14a5ee4a,
                0x01d9fb8c14a5ee4b,
                0x01d9fb8c14a5ee4c,
            ],
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            attributes: 0x10,
            ..Self::file(name, 0)
        }
    }

    pub fn alloc_size(&self) -> u64 {
        (self.size + 4095) / 4096 * 4096
    }
}

/// BOTH_DIRECTORY_INFO records, each 8 byte aligned and chained through
/// `next_entry_offset`; the last one links to nothing
pub fn both_directory_entries(entries: &[FakeEntry]) -> Vec<u8> {
    let mut data = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let name = utf16(&entry.name);
        let len = 94 + name.len();
        let padded = (len + 7) / 8 * 8;
        let last = i + 1 == entries.len();

        data.put_u32_le(if last { 0 } else { padded as u32 });
        data.put_u32_le(i as u32);
        for time in entry.times {
            data.put_u64_le(time);
        }
        data.put_u64_le(entry.size);
        data.put_u64_le(entry.alloc_size());
        data.put_u32_le(entry.attributes);
        data.put_u32_le(name.len() as u32);
        data.put_u32_le(0);
        data.put_u8(0);
        data.put_u8(0);
        data.put_bytes(0, 24);
        data.put_slice(&name);
        if !last {
            data.put_bytes(0, padded - len);
        }
    }
    data
}

/// QUERY_FILE_ALL_INFO record
pub fn file_all_info(entry: &FakeEntry) -> Vec<u8> {
    let name = utf16(&entry.name);
    let mut data = Vec::new();
    for time in entry.times {
        data.put_u64_le(time);
    }
    data.put_u32_le(entry.attributes);
    data.put_u32_le(0);
    data.put_u64_le(entry.alloc_size());
    data.put_u64_le(entry.size);
    data.put_u32_le(1);
    data.put_u8(0);
    data.put_u8((entry.attributes & 0x10 != 0) as u8);
    data.put_u16_le(0);
    data.put_u32_le(0);
    data.put_u32_le(name.len() as u32);
    data.put_slice(&name);
    data
}

/// Split a capture of written bytes into NetBIOS frames: (type, payload)
pub fn split_frames(mut bytes: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        let header = NetBiosHeader::parse(bytes).unwrap();
        let end = NetBiosHeader::SIZE + header.length as usize;
        frames.push((bytes[0], bytes[NetBiosHeader::SIZE..end].to_vec()));
        bytes = &bytes[end..];
    }
    frames
}

/// A TRANS2 request as the client sent it
#[derive(Debug, Clone)]
pub struct SentTrans2 {
    pub header: SmbHeader,
    pub subcommand: u16,
    pub max_param_count: u16,
    pub param_offset: u16,
    pub data_offset: u16,
    pub byte_count: u16,
    /// Fixed parameters and the encoded name
    pub params: Vec<u8>,
    /// Everything after the SMB header
    pub payload_len: usize,
}

impl SentTrans2 {
    pub fn parse(message: &[u8]) -> Self {
        let header = SmbHeader::parse(message).unwrap();
        let payload = &message[SmbHeader::SIZE..];
        let word = |at: usize| LittleEndian::read_u16(&payload[at..at + 2]);
        let param_count = word(19) as usize;
        let param_offset = word(21);
        let start = param_offset as usize - SmbHeader::SIZE;
        Self {
            header,
            subcommand: word(29),
            max_param_count: word(5),
            param_offset,
            data_offset: word(25),
            byte_count: word(31),
            params: payload[start..start + param_count].to_vec(),
            payload_len: payload.len(),
        }
    }

    pub fn param_u16(&self, at: usize) -> u16 {
        LittleEndian::read_u16(&self.params[at..at + 2])
    }

    pub fn param_u32(&self, at: usize) -> u32 {
        LittleEndian::read_u32(&self.params[at..at + 4])
    }

    /// Encoded name behind the `fixed` parameter bytes, terminator included
    pub fn name(&self, fixed: usize) -> &[u8] {
        &self.params[fixed..]
    }
}

/// All TRANS2 requests found in a capture of written bytes
pub fn sent_trans2(written: &[u8]) -> Vec<SentTrans2> {
    split_frames(written)
        .into_iter()
        .filter(|(kind, _)| *kind == 0x00)
        .map(|(_, payload)| SentTrans2::parse(&payload))
        .collect()
}

/// Listen on loopback and play `replies`: for each one, read one request
/// frame and answer with it. The thread returns the request frames.
pub fn spawn_listener(replies: Vec<Vec<u8>>) -> (u16, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut peer, _) = listener.accept().unwrap();
        let mut requests = Vec::new();
        for reply in replies {
            let mut raw = [0u8; NetBiosHeader::SIZE];
            read_full(&mut peer, &mut raw).unwrap();
            let header = NetBiosHeader::parse(&raw).unwrap();
            let mut frame = raw.to_vec();
            frame.resize(NetBiosHeader::SIZE + header.length as usize, 0);
            read_full(&mut peer, &mut frame[NetBiosHeader::SIZE..]).unwrap();
            requests.push(frame);
            write_full(&mut peer, &reply).unwrap();
        }
        requests
    });
    (port, handle)
}
