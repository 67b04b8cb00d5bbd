//! SMB1 protocol header

use super::constants::{SmbFlags, SmbFlags2, SMB_HEADER_SIZE, SMB_MAGIC};
use super::wire::WireReader;
use crate::error::{Error, Result};
use byteorder::{LittleEndian, WriteBytesExt};

/// SMB1 Header structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbHeader {
    pub command: u8,
    pub status: u32,
    pub flags: SmbFlags,
    pub flags2: SmbFlags2,
    pub pid_high: u16,
    pub signature: [u8; 8],
    pub tid: u16,
    pub pid: u16,
    pub uid: u16,
    pub mid: u16,
}

impl SmbHeader {
    pub const SIZE: usize = SMB_HEADER_SIZE;

    pub fn new(command: u8) -> Self {
        Self {
            command,
            status: 0,
            flags: SmbFlags::empty(),
            flags2: SmbFlags2::empty(),
            pid_high: 0,
            signature: [0; 8],
            tid: 0,
            pid: 0,
            uid: 0,
            mid: 0,
        }
    }

    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(Error::BufferTooSmall {
                need: Self::SIZE,
                have: buf.len(),
            });
        }

        if buf[0..4] != SMB_MAGIC {
            return Err(Error::Protocol(format!(
                "Invalid SMB1 magic: {:02x?}",
                &buf[0..4]
            )));
        }

        let mut reader = WireReader::new(&buf[4..Self::SIZE]);
        let command = reader.u8()?;
        let status = reader.u32()?;
        let flags = SmbFlags::from_bits_retain(reader.u8()?);
        let flags2 = SmbFlags2::from_bits_retain(reader.u16()?);
        let pid_high = reader.u16()?;
        let mut signature = [0u8; 8];
        signature.copy_from_slice(reader.bytes(8)?);
        reader.skip(2)?; // reserved
        let tid = reader.u16()?;
        let pid = reader.u16()?;
        let uid = reader.u16()?;
        let mid = reader.u16()?;

        Ok(Self {
            command,
            status,
            flags,
            flags2,
            pid_high,
            signature,
            tid,
            pid,
            uid,
            mid,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(&SMB_MAGIC);
        buf.write_u8(self.command)?;
        buf.write_u32::<LittleEndian>(self.status)?;
        buf.write_u8(self.flags.bits())?;
        buf.write_u16::<LittleEndian>(self.flags2.bits())?;
        buf.write_u16::<LittleEndian>(self.pid_high)?;
        buf.extend_from_slice(&self.signature);
        buf.write_u16::<LittleEndian>(0)?; // reserved
        buf.write_u16::<LittleEndian>(self.tid)?;
        buf.write_u16::<LittleEndian>(self.pid)?;
        buf.write_u16::<LittleEndian>(self.uid)?;
        buf.write_u16::<LittleEndian>(self.mid)?;
        Ok(buf)
    }

    pub fn is_reply(&self) -> bool {
        self.flags.contains(SmbFlags::REPLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::SmbCommand;

    #[test]
    fn test_smb_header_new() {
        let header = SmbHeader::new(SmbCommand::Trans2 as u8);
        assert_eq!(header.command, 0x32);
        assert_eq!(header.tid, 0);
        assert_eq!(header.mid, 0);
        assert!(!header.is_reply());
    }

    #[test]
    fn test_smb_header_layout() {
        let mut header = SmbHeader::new(SmbCommand::Trans2 as u8);
        header.status = 0xC000000F;
        header.flags = SmbFlags::CASE_INSENSITIVE | SmbFlags::CANONICALIZED_PATHS;
        header.flags2 = SmbFlags2::UNICODE | SmbFlags2::NT_STATUS;
        header.tid = 0x0102;
        header.pid = 0x0304;
        header.uid = 0x0506;
        header.mid = 0x0708;

        let bytes = header.serialize().unwrap();
        assert_eq!(bytes.len(), SmbHeader::SIZE);
        assert_eq!(&bytes[0..4], b"\xFFSMB");
        assert_eq!(bytes[4], 0x32);
        assert_eq!(&bytes[5..9], &[0x0F, 0x00, 0x00, 0xC0]);
        assert_eq!(bytes[9], 0x18);
        assert_eq!(&bytes[10..12], &[0x00, 0xC0]);
        assert_eq!(&bytes[24..26], &[0x02, 0x01]);
        assert_eq!(&bytes[30..32], &[0x08, 0x07]);

        assert_eq!(SmbHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn test_smb_header_rejects_bad_magic() {
        let mut bytes = SmbHeader::new(0x32).serialize().unwrap();
        bytes[0] = 0xFE;
        assert!(SmbHeader::parse(&bytes).is_err());
        assert!(SmbHeader::parse(&bytes[..10]).is_err());
    }
}
