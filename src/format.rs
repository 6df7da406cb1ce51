#![forbid(unsafe_code)]

use std::io::{Cursor, Read};

use crate::error::{AcfError, AcfResult};
use crate::io::{read_u16, read_u32, read_u64, read_u8};

/// ACF header magic, "ACF9" little-endian.
pub const MAGIC: u32 = 0x3946_4341;

/// ACF format version.
pub const VERSION: u32 = 0x1000_0900;

/// On-disk size of the file header.
pub const HEADER_LEN: usize = 32;

/// On-disk size of the fixed part of an entry descriptor.
pub const ENTRY_FIXED_LEN: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryKind {
    File = 0,
    Directory = 1,
}

/// One entry of the central directory.
///
/// Entry paths are UTF-8 with `\` separators; directory paths carry a
/// trailing `\`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub original_size: u64,
    pub compressed_size: u64,
    pub data_offset: u64,
    /// CRC-32 of the uncompressed entry contents.
    pub crc32: u32,
    /// Packed DOS date/time (high 16 bits date, low 16 bits time).
    pub dos_datetime: u32,
    /// Opaque host-defined attribute byte.
    pub attributes: u8,
    pub path: String,
}

impl Entry {
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Append the 36-byte descriptor and the path bytes to `buf`.
    pub(crate) fn encode_into(&self, buf: &mut Vec<u8>) -> AcfResult<()> {
        let path = self.path.as_bytes();
        if path.len() > u16::MAX as usize {
            return Err(AcfError::Invalid(format!("path too long: {}", self.path)));
        }
        buf.push(self.kind as u8);
        buf.extend_from_slice(&self.original_size.to_le_bytes());
        buf.extend_from_slice(&self.compressed_size.to_le_bytes());
        buf.extend_from_slice(&self.data_offset.to_le_bytes());
        buf.extend_from_slice(&self.crc32.to_le_bytes());
        buf.extend_from_slice(&self.dos_datetime.to_le_bytes());
        buf.push(self.attributes);
        buf.extend_from_slice(&(path.len() as u16).to_le_bytes());
        buf.extend_from_slice(path);
        Ok(())
    }

    /// Parse one descriptor and its path from a central-directory buffer.
    ///
    /// Anything that would read past the end of the buffer means the
    /// archive is corrupt.
    pub(crate) fn decode_from(cur: &mut Cursor<&[u8]>) -> AcfResult<Entry> {
        let total = cur.get_ref().len() as u64;
        if total - cur.position() < ENTRY_FIXED_LEN as u64 {
            return Err(AcfError::BadArchive(
                "entry descriptor past end of central directory".into(),
            ));
        }
        let kind = match read_u8(cur)? {
            0 => EntryKind::File,
            1 => EntryKind::Directory,
            other => return Err(AcfError::BadArchive(format!("unknown entry type {other}"))),
        };
        let original_size = read_u64(cur)?;
        let compressed_size = read_u64(cur)?;
        let data_offset = read_u64(cur)?;
        let crc32 = read_u32(cur)?;
        let dos_datetime = read_u32(cur)?;
        let attributes = read_u8(cur)?;
        let path_len = read_u16(cur)? as u64;
        if total - cur.position() < path_len {
            return Err(AcfError::BadArchive(
                "entry path past end of central directory".into(),
            ));
        }
        let mut path_bytes = vec![0u8; path_len as usize];
        cur.read_exact(&mut path_bytes)?;
        let path = String::from_utf8(path_bytes)
            .map_err(|_| AcfError::BadArchive("entry path is not utf-8".into()))?;

        Ok(Entry {
            kind,
            original_size,
            compressed_size,
            data_offset,
            crc32,
            dos_datetime,
            attributes,
            path,
        })
    }
}

/// The file header. Written as a placeholder when creation starts and
/// rewritten with the final values once the central directory is on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub central_dir_offset: u64,
    pub entry_count: u64,
    pub central_dir_crc32: u32,
}

impl Header {
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        buf[4..8].copy_from_slice(&VERSION.to_le_bytes());
        buf[8..16].copy_from_slice(&self.central_dir_offset.to_le_bytes());
        buf[16..24].copy_from_slice(&self.entry_count.to_le_bytes());
        buf[24..28].copy_from_slice(&self.central_dir_crc32.to_le_bytes());
        // bytes 28..32 are reserved and stay zero
        buf
    }

    pub fn decode(buf: &[u8]) -> AcfResult<Header> {
        let mut cur = Cursor::new(buf);
        let magic = read_u32(&mut cur)?;
        if magic != MAGIC {
            return Err(AcfError::UnknownFormat);
        }
        let _version = read_u32(&mut cur)?;
        let central_dir_offset = read_u64(&mut cur)?;
        let entry_count = read_u64(&mut cur)?;
        let central_dir_crc32 = read_u32(&mut cur)?;
        Ok(Header {
            central_dir_offset,
            entry_count,
            central_dir_crc32,
        })
    }
}
